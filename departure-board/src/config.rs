//! Runtime configuration from environment variables.
//!
//! Variable names follow the board's deployment convention:
//!
//! | variable                         | meaning                                   |
//! |----------------------------------|-------------------------------------------|
//! | `departureStation`               | board station CRS (required)              |
//! | `destinationStation`             | only services calling here                |
//! | `callingAtStation`               | next departures to these (comma list)     |
//! | `arrivalStation`                 | arrivals here from `departureStation`     |
//! | `timeOffset`                     | minutes from now, -120 to 120             |
//! | `individualStationDepartureTime` | `True` to show a time per calling point   |
//! | `numberOfDepartures`             | services to show, default 3               |
//! | `screen1Platform`                | only services at this platform            |
//! | `apiKey`                         | OpenLDBWS access token (required)         |
//! | `debug`                          | `True` or a non-zero number for logging   |

use thiserror::Error;

use crate::board::{BoardQuery, DisplayOptions};
use crate::domain::{Crs, InvalidCrs};

/// Default number of services on the board.
pub const DEFAULT_DEPARTURE_COUNT: u8 = 3;

/// Darwin rejects offsets outside this range.
const TIME_OFFSET_RANGE: std::ops::RangeInclusive<i16> = -120..=120;

/// Placeholder values some deployment tools write for unset variables.
const UNSET_MARKERS: [&str; 2] = ["null", "undefined"];

/// Configuration errors. All are raised before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please configure the departureStation environment variable")]
    MissingDepartureStation,

    #[error("please configure the apiKey environment variable")]
    MissingApiKey,

    #[error("{field}: {source}")]
    InvalidStation {
        field: &'static str,
        #[source]
        source: InvalidCrs,
    },

    #[error("{field}: expected {expected}, got {value:?}")]
    InvalidNumber {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which stations and how to show them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyConfig {
    pub departure_station: Crs,
    pub destination_station: Option<Crs>,
    /// Up to 10 stations; non-empty selects the next-departures board.
    pub calling_at_stations: Vec<Crs>,
    pub arrival_station: Option<Crs>,
    pub time_offset: i16,
    pub individual_station_departure_time: bool,
    /// Validated platform, such as "3", "12B" or "A".
    pub platform: Option<String>,
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub journey: JourneyConfig,
    pub api_key: String,
    pub debug: bool,
    pub departure_count: u8,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && !UNSET_MARKERS.contains(&v.as_str()))
        };
        let station = |field: &'static str| {
            get(field)
                .map(|v| Crs::parse_lenient(&v))
                .transpose()
                .map_err(|source| ConfigError::InvalidStation { field, source })
        };

        let departure_station =
            station("departureStation")?.ok_or(ConfigError::MissingDepartureStation)?;
        let destination_station = station("destinationStation")?;
        let arrival_station = station("arrivalStation")?;
        let calling_at_stations = get("callingAtStation")
            .map(|v| Crs::parse_list(&v))
            .transpose()
            .map_err(|source| ConfigError::InvalidStation {
                field: "callingAtStation",
                source,
            })?
            .unwrap_or_default();

        let time_offset = match get("timeOffset") {
            None => 0,
            Some(v) => v
                .parse::<i16>()
                .ok()
                .filter(|offset| TIME_OFFSET_RANGE.contains(offset))
                .ok_or(ConfigError::InvalidNumber {
                    field: "timeOffset",
                    expected: "minutes between -120 and 120",
                    value: v,
                })?,
        };

        let departure_count = match get("numberOfDepartures") {
            None => DEFAULT_DEPARTURE_COUNT,
            Some(v) => v
                .parse::<u8>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    field: "numberOfDepartures",
                    expected: "a number between 1 and 255",
                    value: v,
                })?,
        };

        let api_key = get("apiKey").ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            journey: JourneyConfig {
                departure_station,
                destination_station,
                calling_at_stations,
                arrival_station,
                time_offset,
                individual_station_departure_time: get("individualStationDepartureTime")
                    .as_deref()
                    == Some("True"),
                platform: get("screen1Platform").and_then(|p| parse_platform(&p)),
            },
            api_key,
            debug: parse_debug(get("debug").as_deref()),
            departure_count,
        })
    }

    /// The board request this configuration asks for.
    ///
    /// `callingAtStation` wins over `arrivalStation`, which wins over a
    /// plain (optionally filtered) departure board.
    pub fn board_query(&self) -> BoardQuery {
        let journey = &self.journey;
        if !journey.calling_at_stations.is_empty() {
            return BoardQuery::NextDepartures {
                station: journey.departure_station,
                destinations: journey.calling_at_stations.clone(),
            };
        }
        if let Some(arrival) = journey.arrival_station {
            return BoardQuery::Arrivals {
                station: arrival,
                from: Some(journey.departure_station),
            };
        }
        BoardQuery::Departures {
            station: journey.departure_station,
            filter: journey.destination_station,
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_per_stop_time: self.journey.individual_station_departure_time,
        }
    }
}

/// Accept "True" or a non-zero number.
fn parse_debug(value: Option<&str>) -> bool {
    match value {
        Some("True") => true,
        Some(v) => v.parse::<u32>().is_ok_and(|n| n > 0),
        None => false,
    }
}

/// Validate a platform: one or two digits with an optional letter A-D, or a
/// lone letter A-D.
pub fn parse_platform(value: &str) -> Option<String> {
    let value = value.trim();
    let (digits, suffix) = match value.as_bytes() {
        [init @ .., last @ b'A'..=b'D'] => (init, Some(*last)),
        all => (all, None),
    };
    let digits_ok = match digits.len() {
        0 => suffix.is_some(),
        1 | 2 => digits.iter().all(u8::is_ascii_digit),
        _ => false,
    };
    digits_ok.then(|| value.to_string())
}
