//! Board assembly: parsed response in, display records out.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::darwin::envelope::{fault_message, is_fault};
use crate::darwin::{DarwinError, Location, RawService, parse_envelope};

use super::collect::{collect, collect_next_departures};
use super::render::render;
use super::text::{join_non_empty, strip_qualifier};
use super::{BoardKind, DisplayOptions};

/// Shown when a service has no destination at all.
const UNKNOWN_DESTINATION: &str = "Unknown";

/// Board-station times. Departure-style boards carry departure times and
/// arrival boards carry arrival times, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoardTimes {
    Departure {
        aimed_departure_time: String,
        expected_departure_time: String,
    },
    Arrival {
        aimed_arrival_time: String,
        expected_arrival_time: String,
    },
}

/// One service, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(flatten)]
    pub times: BoardTimes,

    /// Coaches, or 0 when unknown.
    pub carriages: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Destination without qualifiers; split services list every portion's
    /// destination joined with " & ".
    pub destination_name: String,

    /// The rendered "calling at" narrative.
    pub calling_at_list: String,
}

impl DepartureRecord {
    /// Build the record for one service on a board of the given kind.
    pub fn from_service(service: &RawService, kind: BoardKind, options: &DisplayOptions) -> Self {
        let aimed = kind.scheduled_time(service).unwrap_or_default().to_string();
        let expected = kind.expected_time(service).unwrap_or_default().to_string();
        let times = match kind {
            BoardKind::Departures | BoardKind::NextDepartures => BoardTimes::Departure {
                aimed_departure_time: aimed,
                expected_departure_time: expected,
            },
            BoardKind::Arrivals => BoardTimes::Arrival {
                aimed_arrival_time: aimed,
                expected_arrival_time: expected,
            },
        };

        let destination_name = destination_name(&service.destination);
        let calling_at_list = render(service, kind, options);

        Self {
            platform: service.platform.clone(),
            times,
            carriages: service.length,
            operator: service.operator.clone(),
            destination_name,
            calling_at_list,
        }
    }

    pub fn aimed_departure_time(&self) -> Option<&str> {
        match &self.times {
            BoardTimes::Departure {
                aimed_departure_time,
                ..
            } => Some(aimed_departure_time),
            BoardTimes::Arrival { .. } => None,
        }
    }

    pub fn expected_departure_time(&self) -> Option<&str> {
        match &self.times {
            BoardTimes::Departure {
                expected_departure_time,
                ..
            } => Some(expected_departure_time),
            BoardTimes::Arrival { .. } => None,
        }
    }

    pub fn aimed_arrival_time(&self) -> Option<&str> {
        match &self.times {
            BoardTimes::Arrival {
                aimed_arrival_time, ..
            } => Some(aimed_arrival_time),
            BoardTimes::Departure { .. } => None,
        }
    }

    pub fn expected_arrival_time(&self) -> Option<&str> {
        match &self.times {
            BoardTimes::Arrival {
                expected_arrival_time,
                ..
            } => Some(expected_arrival_time),
            BoardTimes::Departure { .. } => None,
        }
    }

    /// Whether `station` appears in the destination or the calling-at text.
    ///
    /// This is a substring match, so "Bristol" matches "Bristol Temple Meads".
    pub fn calls_at(&self, station: &str) -> bool {
        self.destination_name.contains(station) || self.calling_at_list.contains(station)
    }
}

impl fmt::Display for DepartureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (aimed, expected) = match &self.times {
            BoardTimes::Departure {
                aimed_departure_time,
                expected_departure_time,
            } => (aimed_departure_time, expected_departure_time),
            BoardTimes::Arrival {
                aimed_arrival_time,
                expected_arrival_time,
            } => (aimed_arrival_time, expected_arrival_time),
        };
        let platform = self
            .platform
            .as_deref()
            .map(|p| format!("Plat {p}"))
            .unwrap_or_default();
        write!(
            f,
            "{}",
            join_non_empty(
                [
                    aimed.as_str(),
                    self.destination_name.as_str(),
                    platform.as_str(),
                    expected.as_str(),
                ],
                "  "
            )
        )
    }
}

/// The outcome of assembling one board response.
///
/// | departures | station_name | meaning                         |
/// |------------|--------------|---------------------------------|
/// | `Some`     | `Some`       | services to show                |
/// | `None`     | `Some`       | the board is empty              |
/// | `None`     | `None`       | fault or unusable response      |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledBoard {
    pub departures: Option<Vec<DepartureRecord>>,
    pub station_name: Option<String>,
}

impl AssembledBoard {
    fn new(departures: Vec<DepartureRecord>, station_name: Option<String>) -> Self {
        Self {
            departures: (!departures.is_empty()).then_some(departures),
            station_name,
        }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.departures.as_ref().is_none_or(Vec::is_empty)
    }
}

/// Destination display name: qualifiers stripped, "via" appended, split
/// portions joined with " & ".
pub fn destination_name(locations: &[Location]) -> String {
    if locations.is_empty() {
        return UNKNOWN_DESTINATION.to_string();
    }
    locations
        .iter()
        .map(|loc| {
            join_non_empty(
                [strip_qualifier(&loc.name), loc.via.as_deref().unwrap_or_default()],
                " ",
            )
        })
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Build display records from a parsed board response.
pub fn assemble(options: &DisplayOptions, tree: &Value, kind: BoardKind) -> AssembledBoard {
    if is_fault(tree) {
        warn!(
            fault = fault_message(tree).unwrap_or("unknown"),
            "board request resulted in a SOAP fault"
        );
        return AssembledBoard::default();
    }

    let board = match kind {
        BoardKind::NextDepartures => assemble_next_departures(options, tree),
        BoardKind::Departures | BoardKind::Arrivals => collect(tree, kind).map(|collected| {
            let records = assemble_services(options, kind, &collected.services);
            AssembledBoard::new(records, collected.station_name)
        }),
    };

    board.unwrap_or_else(|| {
        warn!(?kind, "response does not contain a board of the requested kind");
        AssembledBoard::default()
    })
}

/// Each requested destination carries its own service; destinations Darwin
/// reports as having no service are left out.
fn assemble_next_departures(options: &DisplayOptions, tree: &Value) -> Option<AssembledBoard> {
    let board = collect_next_departures(tree)?;
    let records = board
        .entries
        .iter()
        .filter_map(|entry| {
            if entry.service.is_none() {
                debug!(crs = entry.crs.as_deref().unwrap_or("?"), "no service to destination");
            }
            entry.service.as_ref()
        })
        .map(|service| DepartureRecord::from_service(service, BoardKind::NextDepartures, options))
        .collect();
    Some(AssembledBoard::new(records, board.station_name))
}

/// Parse a SOAP response body and assemble it.
pub fn assemble_xml(
    options: &DisplayOptions,
    body: &str,
    kind: BoardKind,
) -> Result<AssembledBoard, DarwinError> {
    let tree = parse_envelope(body)?;
    Ok(assemble(options, &tree, kind))
}

/// Build records for services that have already been collected.
pub fn assemble_services(
    options: &DisplayOptions,
    kind: BoardKind,
    services: &[RawService],
) -> Vec<DepartureRecord> {
    services
        .iter()
        .map(|service| DepartureRecord::from_service(service, kind, options))
        .collect()
}

/// Keep only the records at `platform`.
pub fn records_for_platform(records: Vec<DepartureRecord>, platform: &str) -> Vec<DepartureRecord> {
    records
        .into_iter()
        .filter(|r| r.platform.as_deref() == Some(platform))
        .collect()
}
