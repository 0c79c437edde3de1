//! Departure board extraction and formatting.
//!
//! Turns a parsed Darwin envelope into display-ready [`DepartureRecord`]s:
//!
//! - [`collect`] finds the services for a board kind and resolves the
//!   single-vs-list and train-vs-bus quirks
//! - [`render`] builds the "calling at" narrative for one service
//! - [`assemble`] puts both together into records
//! - [`fetch`] pages through next departures one service at a time

pub mod assemble;
pub mod collect;
pub mod fetch;
pub mod render;
pub mod text;

pub use assemble::{
    AssembledBoard, BoardTimes, DepartureRecord, assemble, assemble_services, assemble_xml,
    records_for_platform,
};
pub use collect::{Collected, DestinationEntry, NextDeparturesBoard, collect};
pub use fetch::{BoardSource, Clock, SystemClock, fetch_next_services};

use crate::darwin::{CallingPoints, RawService};
use crate::domain::Crs;

/// Which query and response shape is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardKind {
    /// Departures from a station (`GetDepBoardWithDetails`).
    Departures,

    /// Arrivals at a station (`GetArrBoardWithDetails`).
    Arrivals,

    /// The next departure to each of one or more destinations
    /// (`GetNextDeparturesWithDetails`).
    NextDepartures,
}

impl BoardKind {
    /// The calling points relevant to this board.
    ///
    /// Departure boards describe where a service goes next; arrival boards
    /// describe where it has come from.
    pub fn calling_points(self, service: &RawService) -> &CallingPoints {
        match self {
            BoardKind::Departures | BoardKind::NextDepartures => {
                &service.subsequent_calling_points
            }
            BoardKind::Arrivals => &service.previous_calling_points,
        }
    }

    /// Scheduled time at the board station.
    pub fn scheduled_time(self, service: &RawService) -> Option<&str> {
        match self {
            BoardKind::Departures | BoardKind::NextDepartures => service.std.as_deref(),
            BoardKind::Arrivals => service.sta.as_deref(),
        }
    }

    /// Expected time (or status) at the board station.
    pub fn expected_time(self, service: &RawService) -> Option<&str> {
        match self {
            BoardKind::Departures | BoardKind::NextDepartures => service.etd.as_deref(),
            BoardKind::Arrivals => service.eta.as_deref(),
        }
    }
}

/// A board request, carrying the stations each kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardQuery {
    /// Departures from `station`, optionally only those calling at `filter`.
    Departures { station: Crs, filter: Option<Crs> },

    /// Arrivals at `station`, optionally only those that called at `from`.
    Arrivals { station: Crs, from: Option<Crs> },

    /// The next departure from `station` to each destination.
    NextDepartures {
        station: Crs,
        destinations: Vec<Crs>,
    },
}

impl BoardQuery {
    /// The response shape this query produces.
    pub fn kind(&self) -> BoardKind {
        match self {
            BoardQuery::Departures { .. } => BoardKind::Departures,
            BoardQuery::Arrivals { .. } => BoardKind::Arrivals,
            BoardQuery::NextDepartures { .. } => BoardKind::NextDepartures,
        }
    }

    /// The board station.
    pub fn station(&self) -> Crs {
        match self {
            BoardQuery::Departures { station, .. }
            | BoardQuery::Arrivals { station, .. }
            | BoardQuery::NextDepartures { station, .. } => *station,
        }
    }
}

/// Options affecting how records are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Append each calling point's time, e.g. "Reading (10:25)".
    pub show_per_stop_time: bool,
}
