//! Darwin service records, normalized from the envelope tree.
//!
//! The feed omits fields rather than sending empty values, and it returns a
//! lone service, destination or calling point as an object where several
//! would be a list. Everything here is built from the loosely-typed tree
//! with those quirks resolved, so the board engine only ever sees one shape
//! per concept.

use serde_json::Value;
use tracing::trace;

use crate::board::text::looks_like_time;
use crate::domain::ServiceId;

use super::envelope::{is_nil, one_or_many, text};

/// Service type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Train,
    Bus,
    Ferry,
}

impl ServiceType {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Some(ServiceType::Train),
            "bus" => Some(ServiceType::Bus),
            "ferry" => Some(ServiceType::Ferry),
            _ => None,
        }
    }
}

/// Origin or destination location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Human-readable station name, possibly with a qualifier like "(Berks)".
    pub name: String,

    /// CRS code.
    pub crs: Option<String>,

    /// "via" text (e.g., "via Bristol Parkway").
    pub via: Option<String>,
}

impl Location {
    fn from_node(node: &Value) -> Option<Self> {
        let Some(name) = text(node, "locationName") else {
            trace!("skipping location without a name");
            return None;
        };
        Some(Self {
            name: name.to_string(),
            crs: text(node, "crs").map(str::to_string),
            via: text(node, "via").map(str::to_string),
        })
    }
}

/// A single calling point (station stop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallingPoint {
    /// Human-readable station name.
    pub location_name: String,

    /// CRS code of the station.
    pub crs: Option<String>,

    /// Scheduled time.
    pub st: Option<String>,

    /// Estimated time, or a status such as "On time".
    pub et: Option<String>,

    /// Actual time (only sent once the train has called, in place of `et`).
    pub at: Option<String>,
}

impl CallingPoint {
    /// Create a calling point with only a name and scheduled time.
    pub fn new(location_name: impl Into<String>, st: impl Into<String>) -> Self {
        Self {
            location_name: location_name.into(),
            crs: None,
            st: Some(st.into()),
            et: None,
            at: None,
        }
    }

    /// Set the estimated time.
    pub fn with_et(mut self, et: impl Into<String>) -> Self {
        self.et = Some(et.into());
        self
    }

    /// Set the actual time.
    pub fn with_at(mut self, at: impl Into<String>) -> Self {
        self.at = Some(at.into());
        self
    }

    /// The best time to show for this stop.
    ///
    /// The live value is `et`, or `at` when Darwin sent no `et`. If that is a
    /// status phrase rather than a time, the scheduled time is used.
    pub fn best_known_time(&self) -> Option<&str> {
        let live = self.et.as_deref().or(self.at.as_deref());
        match live {
            Some(t) if looks_like_time(t) => Some(t),
            _ => self.st.as_deref(),
        }
    }

    fn from_node(node: &Value) -> Option<Self> {
        let Some(name) = text(node, "locationName") else {
            trace!("skipping calling point without a name");
            return None;
        };
        let field = |key| text(node, key).map(str::to_string);
        Some(Self {
            location_name: name.to_string(),
            crs: field("crs"),
            st: field("st"),
            et: field("et"),
            at: field("at"),
        })
    }
}

/// The shapes a calling-point structure can take.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallingPoints {
    /// No calling-point data.
    #[default]
    Absent,

    /// One stop.
    Single(CallingPoint),

    /// Several stops on a service that does not split.
    Many(Vec<CallingPoint>),

    /// A splitting service: one list of stops per portion.
    Split(Vec<Vec<CallingPoint>>),
}

impl CallingPoints {
    /// Build from a flat list of stops.
    pub fn from_points(mut points: Vec<CallingPoint>) -> Self {
        match points.len() {
            0 => CallingPoints::Absent,
            1 => CallingPoints::Single(points.remove(0)),
            _ => CallingPoints::Many(points),
        }
    }

    /// Build from a split service's sections.
    ///
    /// Empty sections are dropped, and a single remaining section is
    /// treated as an ordinary, non-splitting list.
    pub fn from_sections(sections: Vec<Vec<CallingPoint>>) -> Self {
        let mut sections: Vec<_> = sections.into_iter().filter(|s| !s.is_empty()).collect();
        match sections.len() {
            0 => CallingPoints::Absent,
            1 => Self::from_points(sections.remove(0)),
            _ => CallingPoints::Split(sections),
        }
    }

    /// Normalize a `subsequentCallingPoints`/`previousCallingPoints` node.
    ///
    /// `callingPointList` is an object for a service that runs as one
    /// portion, and a list of objects for a service that splits.
    pub fn from_node(node: Option<&Value>) -> Self {
        if is_nil(node) {
            return CallingPoints::Absent;
        }
        let lists = node.and_then(|n| n.get("callingPointList"));
        match lists {
            Some(Value::Array(_)) => {
                let sections = one_or_many(lists)
                    .into_iter()
                    .map(points_in_list)
                    .collect();
                Self::from_sections(sections)
            }
            Some(list) => Self::from_points(points_in_list(list)),
            None => CallingPoints::Absent,
        }
    }

    /// Whether there are no stops at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, CallingPoints::Absent)
    }

    /// Number of stops across every portion.
    pub fn len(&self) -> usize {
        match self {
            CallingPoints::Absent => 0,
            CallingPoints::Single(_) => 1,
            CallingPoints::Many(points) => points.len(),
            CallingPoints::Split(sections) => sections.iter().map(Vec::len).sum(),
        }
    }

    /// Whether there are no stops at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn points_in_list(list: &Value) -> Vec<CallingPoint> {
    one_or_many(list.get("callingPoint"))
        .into_iter()
        .filter_map(CallingPoint::from_node)
        .collect()
}

/// One service as listed on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawService {
    /// Ephemeral Darwin service ID.
    pub service_id: Option<ServiceId>,

    /// Train, bus or ferry.
    pub service_type: ServiceType,

    /// Scheduled time of departure from the board station.
    pub std: Option<String>,

    /// Estimated time of departure: "On time", "Delayed", "Cancelled" or a time.
    pub etd: Option<String>,

    /// Scheduled time of arrival at the board station.
    pub sta: Option<String>,

    /// Estimated time of arrival.
    pub eta: Option<String>,

    /// Platform number/letter.
    pub platform: Option<String>,

    /// Train length in coaches; 0 when Darwin does not say.
    pub length: u32,

    /// Train operating company name.
    pub operator: Option<String>,

    /// Train operating company ATOC code.
    pub operator_code: Option<String>,

    /// Whether this service is cancelled.
    pub is_cancelled: bool,

    /// Origin station(s).
    pub origin: Vec<Location>,

    /// Destination station(s). More than one only for splitting services.
    pub destination: Vec<Location>,

    /// Stops before the board station.
    pub previous_calling_points: CallingPoints,

    /// Stops after the board station.
    pub subsequent_calling_points: CallingPoints,
}

impl RawService {
    /// Normalize one `service` node.
    ///
    /// `listed_as` is the type implied by the list the node came from, used
    /// when the node has no `serviceType` of its own.
    pub fn from_node(node: &Value, listed_as: ServiceType) -> Self {
        let field = |key| text(node, key).map(str::to_string);

        let locations = |key: &str| -> Vec<Location> {
            one_or_many(node.get(key).and_then(|n| n.get("location")))
                .into_iter()
                .filter_map(Location::from_node)
                .collect()
        };

        Self {
            service_id: text(node, "serviceID").and_then(|id| ServiceId::new(id).ok()),
            service_type: text(node, "serviceType")
                .and_then(ServiceType::parse)
                .unwrap_or(listed_as),
            std: field("std"),
            etd: field("etd"),
            sta: field("sta"),
            eta: field("eta"),
            platform: field("platform"),
            length: text(node, "length")
                .and_then(|l| l.parse().ok())
                .unwrap_or(0),
            operator: field("operator"),
            operator_code: field("operatorCode"),
            is_cancelled: text(node, "isCancelled") == Some("true"),
            origin: locations("origin"),
            destination: locations("destination"),
            previous_calling_points: CallingPoints::from_node(node.get("previousCallingPoints")),
            subsequent_calling_points: CallingPoints::from_node(
                node.get("subsequentCallingPoints"),
            ),
        }
    }
}
