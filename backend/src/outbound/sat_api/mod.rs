//! Remote SAT API outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `SatGateway` port.

mod http_gateway;

pub use http_gateway::{SatApiHttpGateway, normalise_base_url};
