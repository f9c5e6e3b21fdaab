//! Mock gateway for tests.
//!
//! Hand-rolled in the usual shape: queued responses, call recording, and a
//! visible token slot so assertions can check what the controller pushed.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use gymkit_api::{GatewayError, MemberProfile, OtpSendResponse, OtpVerifyResponse};

use crate::gateway::BaseAuthGateway;

pub struct MockGateway {
    send_responses: Mutex<VecDeque<Result<OtpSendResponse, GatewayError>>>,
    verify_responses: Mutex<VecDeque<Result<OtpVerifyResponse, GatewayError>>>,
    send_calls: Mutex<Vec<String>>,
    verify_calls: Mutex<Vec<(String, String)>>,
    token: Mutex<Option<String>>,
    verify_delay: Mutex<Option<Duration>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            send_responses: Mutex::new(VecDeque::new()),
            verify_responses: Mutex::new(VecDeque::new()),
            send_calls: Mutex::new(Vec::new()),
            verify_calls: Mutex::new(Vec::new()),
            token: Mutex::new(None),
            verify_delay: Mutex::new(None),
        }
    }

    /// Queue a successful send-OTP response with this session id.
    pub fn with_session(self, session_id: &str) -> Self {
        self.send_responses
            .lock()
            .unwrap()
            .push_back(Ok(OtpSendResponse {
                session_id: session_id.to_string(),
                message: None,
            }));
        self
    }

    pub fn with_send_error(self, error: GatewayError) -> Self {
        self.send_responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a verify response carrying a token + user pair.
    pub fn with_verify_success(self, token: &str, user: MemberProfile) -> Self {
        self.verify_responses
            .lock()
            .unwrap()
            .push_back(Ok(OtpVerifyResponse {
                token: Some(token.to_string()),
                user: Some(user),
                message: None,
            }));
        self
    }

    /// Queue a 2xx verify response carrying only a message.
    pub fn with_verify_message(self, message: &str) -> Self {
        self.verify_responses
            .lock()
            .unwrap()
            .push_back(Ok(OtpVerifyResponse {
                token: None,
                user: None,
                message: Some(message.to_string()),
            }));
        self
    }

    pub fn with_verify_error(self, error: GatewayError) -> Self {
        self.verify_responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Delay every verify call, to widen the in-flight window in tests.
    pub fn with_verify_delay(self, delay: Duration) -> Self {
        *self.verify_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Phone numbers passed to send-OTP, in order.
    pub fn send_calls(&self) -> Vec<String> {
        self.send_calls.lock().unwrap().clone()
    }

    /// `(session_id, code)` pairs passed to verify-OTP, in order.
    pub fn verify_calls(&self) -> Vec<(String, String)> {
        self.verify_calls.lock().unwrap().clone()
    }

    /// The bearer token as last set by the controller.
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAuthGateway for MockGateway {
    async fn send_otp(&self, phone_number: &str) -> Result<OtpSendResponse, GatewayError> {
        self.send_calls
            .lock()
            .unwrap()
            .push(phone_number.to_string());

        match self.send_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(OtpSendResponse {
                session_id: "mock-session".to_string(),
                message: None,
            }),
        }
    }

    async fn verify_otp(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<OtpVerifyResponse, GatewayError> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((session_id.to_string(), code.to_string()));

        let delay = *self.verify_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.verify_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Err(GatewayError::Network("mock: no verify response queued".into())),
        }
    }

    async fn set_token(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }

    async fn clear_token(&self) {
        *self.token.lock().unwrap() = None;
    }
}

/// A member profile for test fixtures.
pub fn profile_fixture(phone_number: &str) -> MemberProfile {
    MemberProfile {
        user_id: "u-1".to_string(),
        email: "asha@example.org".to_string(),
        full_name: "Asha Rao".to_string(),
        membership_id: "GYM-0042".to_string(),
        phone_number: phone_number.to_string(),
        photo_url: None,
    }
}
