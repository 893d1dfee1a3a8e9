//! Cookie-backed console session.
//!
//! The whole [`ConsoleSession`] is serialised under one key. Handlers load it,
//! apply a transition, and store it back before responding. A cookie whose
//! payload no longer deserialises is treated as signed out.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{ConsoleSession, Error, Principal};

pub(crate) const CONSOLE_KEY: &str = "console";

/// Newtype wrapper that exposes console-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Current console state; `Landing` when nothing usable is stored.
    pub fn console(&self) -> Result<ConsoleSession, Error> {
        match self.0.get::<ConsoleSession>(CONSOLE_KEY) {
            Ok(state) => Ok(state.unwrap_or_default()),
            Err(error) => {
                warn!(%error, "discarding unreadable console session");
                self.0.remove(CONSOLE_KEY);
                Ok(ConsoleSession::Landing)
            }
        }
    }

    /// Persist `state`, replacing whatever was stored.
    pub fn store(&self, state: &ConsoleSession) -> Result<(), Error> {
        self.0
            .insert(CONSOLE_KEY, state)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Start a fresh session for `principal`.
    pub fn sign_in(&self, principal: Principal) -> Result<ConsoleSession, Error> {
        self.0.renew();
        let state = ConsoleSession::login(principal);
        self.store(&state)?;
        Ok(state)
    }

    /// Drop every piece of session state and expire the cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// Principal of the signed-in user or `401 Unauthorized`.
    pub fn require_principal(&self) -> Result<Principal, Error> {
        Ok(self.console()?.principal()?.clone())
    }

    /// Principal of a signed-in admin; `403` for client-role users.
    pub fn require_admin(&self) -> Result<Principal, Error> {
        Ok(self.console()?.require_admin()?.clone())
    }

    /// Load the state, apply `transition`, and store the result when it
    /// succeeds.
    pub fn update<T, F>(&self, transition: F) -> Result<(ConsoleSession, T), Error>
    where
        F: FnOnce(&mut ConsoleSession) -> Result<T, Error>,
    {
        let mut state = self.console()?;
        let outcome = transition(&mut state)?;
        self.store(&state)?;
        Ok((state, outcome))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
