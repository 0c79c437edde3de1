//! Live departure board.
//!
//! Queries National Rail's Darwin OpenLDBWS service and turns the SOAP
//! response into display-ready departure records, each with a scrolling
//! "calling at" narrative.

pub mod board;
pub mod config;
pub mod darwin;
pub mod domain;
