// Trait definition for the gateway surface the auth controller needs.
//
// This is an infrastructure seam, not business logic: the controller only
// ever sends/verifies OTP codes and pushes the bearer token, so the trait
// carries exactly that. The full typed client lives in gymkit-api.

use async_trait::async_trait;
use gymkit_api::{GatewayClient, GatewayError, OtpSendResponse, OtpVerifyResponse};

#[async_trait]
pub trait BaseAuthGateway: Send + Sync {
    /// Request an OTP challenge for a phone number.
    async fn send_otp(&self, phone_number: &str) -> Result<OtpSendResponse, GatewayError>;

    /// Verify a code against a session id.
    async fn verify_otp(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<OtpVerifyResponse, GatewayError>;

    /// Install the bearer token used on subsequent requests.
    async fn set_token(&self, token: &str);

    /// Drop the bearer token.
    async fn clear_token(&self);
}

#[async_trait]
impl BaseAuthGateway for GatewayClient {
    async fn send_otp(&self, phone_number: &str) -> Result<OtpSendResponse, GatewayError> {
        GatewayClient::send_otp(self, phone_number).await
    }

    async fn verify_otp(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<OtpVerifyResponse, GatewayError> {
        GatewayClient::verify_otp(self, session_id, code).await
    }

    async fn set_token(&self, token: &str) {
        GatewayClient::set_token(self, token).await;
    }

    async fn clear_token(&self) {
        GatewayClient::clear_token(self).await;
    }
}
