//! OTP session and identity lifecycle for the GymKit client.
//!
//! The [`AuthController`] orchestrates the OTP challenge/response protocol
//! against the gateway, owns the bearer token + identity pair, and persists
//! both through a [`gymkit_storage::BaseKeyValueStore`]. It is constructed
//! with its collaborators (no ambient context) and is the only component in
//! the client with real state-transition logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gymkit_api::GatewayClient;
//! use gymkit_auth::{AuthController, VerifyOutcome};
//! use gymkit_storage::FileStore;
//!
//! let gateway = Arc::new(GatewayClient::from_env()?);
//! let store = Arc::new(FileStore::new("/data/gymkit"));
//! let auth = AuthController::new(gateway, store);
//!
//! auth.load_persisted().await; // the startup gate
//!
//! let challenge = auth.send_otp("9876543210").await?;
//! match auth.verify_otp(&challenge.session_id, "000000").await? {
//!     VerifyOutcome::Authenticated(profile) => println!("hi {}", profile.full_name),
//!     VerifyOutcome::NewUser { phone_number } => redirect_to_registration(phone_number),
//! }
//! ```

pub mod controller;
pub mod error;
pub mod gateway;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::{
    AuthController, AuthState, SessionChallenge, VerifyOutcome, AUTH_TOKEN_KEY, AUTH_USER_KEY,
};
pub use error::{AuthError, Result};
pub use gateway::BaseAuthGateway;
