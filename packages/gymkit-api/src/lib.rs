//! REST gateway client for the GymKit membership service.
//!
//! A thin HTTP client holding a single mutable bearer-token slot, with
//! typed wrappers over the service's JSON endpoints and uniform error
//! translation for non-2xx responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use gymkit_api::GatewayClient;
//!
//! let client = GatewayClient::new("https://api.example.org/v1");
//!
//! let otp = client.send_otp("9876543210").await?;
//! let verified = client.verify_otp(&otp.session_id, "000000").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GatewayError, Result};
pub use types::*;

use reqwest::{multipart, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Gateway client. Cheap to share behind an `Arc`; the token slot is the
/// only mutable state and is written exclusively by the auth layer.
pub struct GatewayClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl GatewayClient {
    /// Create a client against the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    /// Create from the `GYMKIT_API_URL` environment variable.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GYMKIT_API_URL")
            .map_err(|_| GatewayError::Config("GYMKIT_API_URL not set".into()))?;
        Ok(Self::new(base_url))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer token. An empty string clears the slot.
    pub async fn set_token(&self, token: &str) {
        let mut slot = self.token.write().await;
        *slot = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }

    /// Clear the bearer token.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Current bearer token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Core request path: optional JSON body, bearer header when a token is
    /// set, uniform error translation.
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);

        if let Some(token) = self.token.read().await.as_ref() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(path, error = %e, "gateway request failed to complete");
            GatewayError::Network(e.to_string())
        })?;

        Self::translate_response(path, response).await
    }

    async fn translate_response(path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body, status.as_u16());
            warn!(path, status = status.as_u16(), %message, "gateway returned an error");
            return Err(GatewayError::Request {
                status: status.as_u16(),
                message,
            });
        }

        debug!(path, status = status.as_u16(), "gateway request succeeded");
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Request an OTP for a phone number. Returns the session id that must
    /// accompany the verification call.
    pub async fn send_otp(&self, phone_number: &str) -> Result<OtpSendResponse> {
        let body = json!({ "phoneNumber": phone_number });
        let value = self
            .request(Method::POST, "/auth/otp/send", Some(&body))
            .await?;
        decode(value)
    }

    /// Verify an OTP code against a previously issued session id.
    pub async fn verify_otp(&self, session_id: &str, code: &str) -> Result<OtpVerifyResponse> {
        let body = json!({ "sessionId": session_id, "otp": code });
        let value = self
            .request(Method::POST, "/auth/otp/verify", Some(&body))
            .await?;
        decode(value)
    }

    /// Register a new member. Multipart because of the photo upload; the
    /// content-type (and its boundary) is left to reqwest to negotiate —
    /// hand-setting it breaks the upload.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse> {
        let mut form = multipart::Form::new()
            .text("fullName", req.full_name)
            .text("email", req.email)
            .text("phoneNumber", req.phone_number);
        if let Some(code) = req.gym_code {
            form = form.text("gymCode", code);
        }
        if let Some(plan_id) = req.plan_id {
            form = form.text("planId", plan_id);
        }
        if let Some(photo) = req.photo {
            let part = multipart::Part::bytes(photo.bytes).file_name(photo.file_name);
            form = form.part("photo", part);
        }

        let mut request = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .multipart(form);
        if let Some(token) = self.token.read().await.as_ref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "registration request failed to complete");
            GatewayError::Network(e.to_string())
        })?;

        decode(Self::translate_response("/auth/register", response).await?)
    }

    // -------------------------------------------------------------------------
    // Member resources
    // -------------------------------------------------------------------------

    pub async fn get_profile(&self) -> Result<MemberProfile> {
        let value = self.request(Method::GET, "/members/profile", None).await?;
        decode(value)
    }

    pub async fn update_profile(&self, profile: &MemberProfile) -> Result<MemberProfile> {
        let body = serde_json::to_value(profile)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        let value = self
            .request(Method::PUT, "/members/profile", Some(&body))
            .await?;
        decode(value)
    }

    pub async fn get_dashboard(&self) -> Result<DashboardSummary> {
        let value = self.request(Method::GET, "/members/dashboard", None).await?;
        decode(value)
    }

    pub async fn get_payment_history(&self) -> Result<Vec<PaymentRecord>> {
        let value = self.request(Method::GET, "/members/payments", None).await?;
        decode(value)
    }

    pub async fn get_assigned_trainer(&self) -> Result<Trainer> {
        let value = self.request(Method::GET, "/members/trainer", None).await?;
        decode(value)
    }

    pub async fn get_membership_plans(&self) -> Result<Vec<MembershipPlan>> {
        let value = self.request(Method::GET, "/membership-plans", None).await?;
        decode(value)
    }

    // -------------------------------------------------------------------------
    // Attendance
    // -------------------------------------------------------------------------

    pub async fn check_in(&self, gym_code: Option<&str>) -> Result<AttendanceRecord> {
        let body = match gym_code {
            Some(code) => json!({ "gymCode": code }),
            None => json!({}),
        };
        let value = self
            .request(Method::POST, "/attendance/check-in", Some(&body))
            .await?;
        decode(value)
    }

    pub async fn check_out(&self) -> Result<AttendanceRecord> {
        let value = self
            .request(Method::POST, "/attendance/check-out", None)
            .await?;
        decode(value)
    }

    pub async fn validate_gym_code(&self, code: &str) -> Result<CodeValidation> {
        let body = json!({ "gymCode": code });
        let value = self
            .request(Method::POST, "/gyms/validate-code", Some(&body))
            .await?;
        decode(value)
    }

    pub async fn validate_qr_code(&self, payload: &str) -> Result<CodeValidation> {
        let body = json!({ "qrCode": payload });
        let value = self
            .request(Method::POST, "/gyms/validate-qr", Some(&body))
            .await?;
        decode(value)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Extract a human-readable message from an error response body: the JSON
/// `error` field first, then `message`, then a plain `HTTP <status>`.
fn extract_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_wins_over_message() {
        let body = r#"{"error": "bad code", "message": "ignored"}"#;
        assert_eq!(extract_error_message(body, 400), "bad code");
    }

    #[test]
    fn message_field_used_when_no_error() {
        let body = r#"{"message": "Member not found with this phone number"}"#;
        assert_eq!(
            extract_error_message(body, 404),
            "Member not found with this phone number"
        );
    }

    #[test]
    fn non_json_body_falls_back_to_status() {
        assert_eq!(extract_error_message("<html>oops</html>", 502), "HTTP 502");
        assert_eq!(extract_error_message("", 500), "HTTP 500");
    }

    #[test]
    fn non_string_fields_fall_back_to_status() {
        let body = r#"{"error": {"code": 7}}"#;
        assert_eq!(extract_error_message(body, 422), "HTTP 422");
    }

    #[tokio::test]
    async fn token_slot_set_and_clear() {
        let client = GatewayClient::new("https://api.example.org/v1");
        assert_eq!(client.token().await, None);

        client.set_token("tok1").await;
        assert_eq!(client.token().await.as_deref(), Some("tok1"));

        client.set_token("tok2").await;
        assert_eq!(client.token().await.as_deref(), Some("tok2"));

        // Empty string clears, matching the mobile client's contract.
        client.set_token("").await;
        assert_eq!(client.token().await, None);

        client.set_token("tok3").await;
        client.clear_token().await;
        assert_eq!(client.token().await, None);
    }

    #[test]
    fn from_env_requires_base_url() {
        std::env::remove_var("GYMKIT_API_URL");
        assert!(matches!(
            GatewayClient::from_env(),
            Err(GatewayError::Config(_))
        ));
    }
}
