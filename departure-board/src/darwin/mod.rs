//! Darwin OpenLDBWS (Live Departure Boards Web Service) client.
//!
//! Key characteristics of Darwin:
//! - Requests and responses are SOAP envelopes
//! - Service IDs are **ephemeral** - only valid while the service appears
//!   on a departure board
//! - Times are "HH:MM" strings in UK local time, while estimates may also be
//!   a status such as "On time", "Delayed" or "Cancelled"
//! - The `...WithDetails` operations return calling points inline
//! - Faults come back as HTTP 500 with a `soap:Fault` body

mod client;
pub mod envelope;
mod error;
mod types;

pub use client::{DarwinClient, DarwinConfig, build_request};
pub use envelope::parse_envelope;
pub use error::DarwinError;
pub use types::{CallingPoint, CallingPoints, Location, RawService, ServiceType};
