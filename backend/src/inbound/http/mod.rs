//! HTTP inbound adapter exposing the console REST endpoints.
//!
//! Handlers stay thin: they load the cookie session, parse request input into
//! domain types, call a driving port from [`state::HttpState`], and map the
//! result onto a response.

pub mod certificates;
pub mod clients;
pub mod console;
pub mod error;
pub mod focus;
pub mod groups;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
