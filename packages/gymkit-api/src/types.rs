//! Wire types for the membership service API (camelCase JSON).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response to a send-OTP request. The session id binds the challenge to
/// the eventual verification call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSendResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a verify-OTP request.
///
/// Exactly one of two shapes in practice: `token` + `user` on success, or a
/// bare `message` (including the member-not-found case). All fields are
/// optional so either shape decodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<MemberProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// An authenticated member identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    /// Gym-assigned member number, distinct from `user_id`.
    pub membership_id: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Registration form data, sent as multipart.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub gym_code: Option<String>,
    pub plan_id: Option<String>,
    pub photo: Option<PhotoUpload>,
}

/// A photo file picked by the user, attached to registration.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token: String,
    pub user: MemberProfile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub visits_this_month: u32,
    #[serde(default)]
    pub active_plan: Option<String>,
    #[serde(default)]
    pub plan_expires_on: Option<String>,
    #[serde(default)]
    pub last_check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub announcements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub trainer_id: String,
    pub full_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub plan_id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub duration_days: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub attendance_id: String,
    pub checked_in_at: DateTime<Utc>,
    #[serde(default)]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gym_name: Option<String>,
}

/// Result of validating a gym code or scanned QR payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeValidation {
    pub valid: bool,
    #[serde(default)]
    pub gym_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_response_decodes_success_shape() {
        let body = r#"{
            "token": "tok1",
            "user": {
                "userId": "u-1",
                "email": "asha@example.org",
                "fullName": "Asha Rao",
                "membershipId": "GYM-0042",
                "phoneNumber": "9876543210",
                "photoUrl": "https://cdn.example.org/asha.jpg"
            }
        }"#;

        let resp: OtpVerifyResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.token.as_deref(), Some("tok1"));
        let user = resp.user.unwrap();
        assert_eq!(user.membership_id, "GYM-0042");
        assert!(resp.message.is_none());
    }

    #[test]
    fn verify_response_decodes_message_shape() {
        let body = r#"{"message": "Member not found with this phone number"}"#;
        let resp: OtpVerifyResponse = serde_json::from_str(body).unwrap();
        assert!(resp.token.is_none());
        assert!(resp.user.is_none());
        assert_eq!(
            resp.message.as_deref(),
            Some("Member not found with this phone number")
        );
    }

    #[test]
    fn member_profile_round_trips_through_json() {
        let profile = MemberProfile {
            user_id: "u-1".into(),
            email: "asha@example.org".into(),
            full_name: "Asha Rao".into(),
            membership_id: "GYM-0042".into(),
            phone_number: "9876543210".into(),
            photo_url: None,
        };

        let encoded = serde_json::to_string(&profile).unwrap();
        let decoded: MemberProfile = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, profile);
        // camelCase on the wire
        assert!(encoded.contains("membershipId"));
    }

    #[test]
    fn plan_list_decodes_with_missing_optionals() {
        let body = r#"[{
            "planId": "p-1",
            "name": "Monthly",
            "price": 49.0,
            "currency": "USD",
            "durationDays": 30
        }]"#;

        let plans: Vec<MembershipPlan> = serde_json::from_str(body).unwrap();
        assert_eq!(plans[0].duration_days, 30);
        assert!(plans[0].features.is_empty());
    }
}
