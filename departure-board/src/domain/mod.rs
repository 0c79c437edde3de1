//! Domain types for departure boards.
//!
//! These types validate the handful of identifiers the engine relies on:
//! station codes for requests and filters, service IDs for deduplication,
//! and "HH:MM" board times for ordering.

mod service_id;
mod station;
mod time;

pub use service_id::{InvalidServiceId, ServiceId};
pub use station::{Crs, InvalidCrs, MAX_FILTER_STATIONS};
pub use time::{
    MINUTES_PER_DAY, TimeError, board_sort_key, contains_hhmm, minutes_since_midnight,
    parse_hhmm,
};
