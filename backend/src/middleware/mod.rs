//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside individual handlers,
//! currently trace identifiers and request logging.

pub mod trace;

pub use trace::Trace;
