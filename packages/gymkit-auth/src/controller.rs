//! The session/auth controller: OTP challenge lifecycle, bearer-token
//! adoption, and persisted identity.
//!
//! States move `Loading -> Unauthenticated -> OtpRequested -> Authenticated`,
//! with logout returning to `Unauthenticated`. The controller is the only
//! writer of the gateway's token slot and of the persisted auth entries.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use gymkit_api::MemberProfile;
use gymkit_storage::{BaseKeyValueStore, KeyValueStoreExt};

use crate::error::{AuthError, Result};
use crate::gateway::BaseAuthGateway;

/// Storage key for the raw bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Storage key for the persisted identity (JSON).
pub const AUTH_USER_KEY: &str = "auth_user";

/// Exact server wording for an unregistered phone number. Part of the
/// backend contract until it grows a structured error code; the substring
/// fallback below covers the same signal arriving wrapped in a transport
/// error.
const MEMBER_NOT_FOUND_MESSAGE: &str = "Member not found with this phone number";
const MEMBER_NOT_FOUND_FRAGMENT: &str = "Member not found";

/// An outstanding OTP challenge. Never persisted; a process restart always
/// starts a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChallenge {
    pub session_id: String,
    pub phone_number: String,
    pub issued_at: DateTime<Utc>,
}

/// Controller state as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// The startup load has not completed; identity is unknown.
    Loading,
    Unauthenticated,
    /// An OTP was sent and its challenge is awaiting verification.
    OtpRequested(SessionChallenge),
    Authenticated(MemberProfile),
}

/// Non-error outcomes of a verification call.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    /// The code checked out; the controller is now authenticated.
    Authenticated(MemberProfile),
    /// The phone number has no account. The caller should redirect to
    /// registration; the phone number is the only state carried forward.
    NewUser { phone_number: String },
}

pub struct AuthController {
    gateway: Arc<dyn BaseAuthGateway>,
    store: Arc<dyn BaseKeyValueStore>,
    state: RwLock<AuthState>,
    /// Single-slot de-dup for verification: holds the session id of the
    /// attempt currently on the wire, if any.
    verify_in_flight: Mutex<Option<String>>,
}

impl AuthController {
    /// Build a controller. State starts as [`AuthState::Loading`] until
    /// [`load_persisted`](Self::load_persisted) runs.
    pub fn new(gateway: Arc<dyn BaseAuthGateway>, store: Arc<dyn BaseKeyValueStore>) -> Self {
        Self {
            gateway,
            store,
            state: RwLock::new(AuthState::Loading),
            verify_in_flight: Mutex::new(None),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<MemberProfile> {
        match &*self.state.read().await {
            AuthState::Authenticated(profile) => Some(profile.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read().await, AuthState::Authenticated(_))
    }

    /// True before the startup load has completed. Callers must not act on
    /// identity state while this holds.
    pub async fn is_loading(&self) -> bool {
        matches!(&*self.state.read().await, AuthState::Loading)
    }

    pub async fn current_challenge(&self) -> Option<SessionChallenge> {
        match &*self.state.read().await {
            AuthState::OtpRequested(challenge) => Some(challenge.clone()),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Startup gate: restore a persisted token + identity pair, if both
    /// exist. With only one of the two present the pair is invalid, so the
    /// orphan is removed and the user re-authenticates.
    pub async fn load_persisted(&self) {
        let token = self.store.get_string(AUTH_TOKEN_KEY).await;
        let identity: Option<MemberProfile> = self.store.get_json(AUTH_USER_KEY).await;

        match (token, identity) {
            (Some(token), Some(identity)) => {
                self.gateway.set_token(&token).await;
                info!(user_id = %identity.user_id, "restored persisted session");
                *self.state.write().await = AuthState::Authenticated(identity);
            }
            (None, None) => {
                *self.state.write().await = AuthState::Unauthenticated;
            }
            _ => {
                debug!("found orphaned auth entry, clearing both");
                self.store.remove(AUTH_TOKEN_KEY).await;
                self.store.remove(AUTH_USER_KEY).await;
                *self.state.write().await = AuthState::Unauthenticated;
            }
        }
    }

    /// Request an OTP for `phone_number`. Phone format validation is the
    /// caller's job. On success the returned challenge is also recorded as
    /// the current state; on failure the state is left untouched.
    pub async fn send_otp(&self, phone_number: &str) -> Result<SessionChallenge> {
        let response = self
            .gateway
            .send_otp(phone_number)
            .await
            .map_err(|e| AuthError::OtpSend(e.message()))?;

        let challenge = SessionChallenge {
            session_id: response.session_id,
            phone_number: phone_number.to_string(),
            issued_at: Utc::now(),
        };
        debug!(session_id = %challenge.session_id, "OTP challenge issued");
        *self.state.write().await = AuthState::OtpRequested(challenge.clone());
        Ok(challenge)
    }

    /// Drop the current challenge and request a fresh one for the same
    /// phone number. The old session id becomes stale: a verification
    /// carrying it will fail without reaching the server.
    pub async fn resend_otp(&self) -> Result<SessionChallenge> {
        let phone_number = {
            let mut state = self.state.write().await;
            match &*state {
                AuthState::OtpRequested(challenge) => {
                    let phone = challenge.phone_number.clone();
                    *state = AuthState::Unauthenticated;
                    phone
                }
                _ => return Err(AuthError::NoChallenge),
            }
        };
        self.send_otp(&phone_number).await
    }

    /// Verify `code` against the challenge identified by `session_id`.
    ///
    /// Three outcomes: [`VerifyOutcome::Authenticated`] when the server
    /// returns a token + user pair, [`VerifyOutcome::NewUser`] when it
    /// signals an unregistered phone number (or any other tokenless 2xx
    /// shape), and `Err` for everything else — in which case the challenge
    /// is retained so the same session can be retried.
    pub async fn verify_otp(&self, session_id: &str, code: &str) -> Result<VerifyOutcome> {
        let challenge = self
            .current_challenge()
            .await
            .ok_or(AuthError::NoChallenge)?;
        if challenge.session_id != session_id {
            return Err(AuthError::StaleSession);
        }

        let _guard = InFlightGuard::acquire(&self.verify_in_flight, session_id)?;

        match self.gateway.verify_otp(session_id, code).await {
            Ok(response) => {
                if let (Some(token), Some(user)) = (response.token, response.user) {
                    self.adopt_session(&token, user.clone()).await;
                    return Ok(VerifyOutcome::Authenticated(user));
                }
                // Either the literal member-not-found message or some other
                // tokenless response shape. Both mean "no account here".
                if response.message.as_deref() != Some(MEMBER_NOT_FOUND_MESSAGE) {
                    debug!("tokenless verify response, treating as unregistered");
                }
                *self.state.write().await = AuthState::Unauthenticated;
                Ok(VerifyOutcome::NewUser {
                    phone_number: challenge.phone_number,
                })
            }
            Err(e) => {
                let message = e.message();
                if message.contains(MEMBER_NOT_FOUND_FRAGMENT) {
                    *self.state.write().await = AuthState::Unauthenticated;
                    return Ok(VerifyOutcome::NewUser {
                        phone_number: challenge.phone_number,
                    });
                }
                warn!(session_id, %message, "OTP verification failed");
                Err(AuthError::Verification(message))
            }
        }
    }

    /// Direct login with an independently obtained token + identity pair
    /// (the registration flow). Allowed from any state.
    pub async fn login(&self, token: &str, identity: MemberProfile) {
        self.adopt_session(token, identity).await;
    }

    /// Clear the session. In-memory state is cleared first and is
    /// authoritative; storage removal failures are swallowed by the store
    /// layer, so this cannot fail observably.
    pub async fn logout(&self) {
        *self.state.write().await = AuthState::Unauthenticated;
        self.gateway.clear_token().await;
        self.store.remove(AUTH_TOKEN_KEY).await;
        self.store.remove(AUTH_USER_KEY).await;
        info!("session cleared");
    }

    /// Replace the in-memory identity and re-persist it, leaving the token
    /// untouched. Outside `Authenticated` this is a logged no-op.
    pub async fn update_identity(&self, identity: MemberProfile) {
        let mut state = self.state.write().await;
        match &*state {
            AuthState::Authenticated(_) => {
                self.store.set_json(AUTH_USER_KEY, &identity).await;
                *state = AuthState::Authenticated(identity);
            }
            _ => warn!("update_identity called while not authenticated, ignoring"),
        }
    }

    async fn adopt_session(&self, token: &str, identity: MemberProfile) {
        self.gateway.set_token(token).await;
        self.store.set_string(AUTH_TOKEN_KEY, token).await;
        self.store.set_json(AUTH_USER_KEY, &identity).await;
        info!(user_id = %identity.user_id, "session established");
        *self.state.write().await = AuthState::Authenticated(identity);
    }
}

/// Holds the single verification slot for the duration of one attempt.
struct InFlightGuard<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(slot: &'a Mutex<Option<String>>, session_id: &str) -> Result<Self> {
        let mut current = slot.lock().unwrap();
        if current.is_some() {
            return Err(AuthError::VerificationInFlight);
        }
        *current = Some(session_id.to_string());
        Ok(Self { slot })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.lock().unwrap().take();
    }
}
