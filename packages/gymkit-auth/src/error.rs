//! Error types for the auth controller.

use thiserror::Error;

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Auth controller errors. These are values for callers to branch on;
/// nothing in the controller panics or propagates transport errors raw.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The send-OTP call failed (network or rejected by the server).
    #[error("failed to send verification code: {0}")]
    OtpSend(String),

    /// The verify-OTP call failed for a reason other than "member not
    /// found". The challenge is retained so the user can retry.
    #[error("verification failed: {0}")]
    Verification(String),

    /// Verification was attempted with no outstanding challenge.
    #[error("no verification code has been requested")]
    NoChallenge,

    /// The supplied session id no longer matches the current challenge
    /// (a resend superseded it).
    #[error("this code was superseded, request a new one")]
    StaleSession,

    /// Another verification attempt is already in flight.
    #[error("a verification attempt is already in progress")]
    VerificationInFlight,
}
