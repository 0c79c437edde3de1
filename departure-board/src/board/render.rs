//! "Calling at" narrative rendering.
//!
//! Each service gets one free-text line describing where it stops, who runs
//! it and how long it is, for example:
//!
//! ```text
//! Reading, Swindon and Bath Spa.  --   A Great Western Railway Service formed of 8 coaches.
//! ```
//!
//! The line is rendered once, when the record is built, so displays only
//! ever scroll a ready-made string.

use crate::darwin::{CallingPoint, CallingPoints, RawService};

use super::assemble::destination_name;
use super::{BoardKind, DisplayOptions};
use super::text::{
    carriages_phrase, join_non_empty, join_with_and, service_phrase, strip_qualifier,
};

const ONLY: &str = "only.";

/// Separator before the service description after a lone or split stop list.
const SEPARATOR: &str = "  --  ";

/// Separator after a full stop list, which already ends in ".".
const LIST_SEPARATOR: &str = " --  ";

const PORTION_JOINER: &str = " with a portion going to ";

/// Who runs a service and how long it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trailer<'a> {
    pub operator: Option<&'a str>,
    /// Coaches, or 0 when unknown.
    pub carriages: u32,
}

impl Trailer<'_> {
    fn service_phrase(&self) -> String {
        service_phrase(self.operator)
    }

    fn carriages_phrase(&self) -> String {
        carriages_phrase(self.carriages)
    }
}

/// A stop's display name, with its best-known time when asked for.
///
/// The time is left off if the stop has none at all.
pub fn rendered_point(point: &CallingPoint, show_per_stop_time: bool) -> String {
    let name = strip_qualifier(&point.location_name);
    match point.best_known_time() {
        Some(time) if show_per_stop_time => format!("{name} ({time})"),
        _ => name.to_string(),
    }
}

/// The "calling at" narrative for a service on a board of the given kind.
pub fn render(service: &RawService, kind: BoardKind, options: &DisplayOptions) -> String {
    let trailer = Trailer {
        operator: service.operator.as_deref(),
        carriages: service.length,
    };
    render_calling_at(
        kind.calling_points(service),
        &destination_name(&service.destination),
        &trailer,
        options,
    )
}

/// Build the "calling at" narrative from a calling-point structure.
///
/// `destination_name` is only used when there are no calling points.
pub fn render_calling_at(
    points: &CallingPoints,
    destination_name: &str,
    trailer: &Trailer<'_>,
    options: &DisplayOptions,
) -> String {
    let show_time = options.show_per_stop_time;

    match points {
        CallingPoints::Absent => join_non_empty(
            [
                destination_name.to_string(),
                ONLY.to_string(),
                trailer.service_phrase(),
                trailer.carriages_phrase(),
            ],
            " ",
        ),
        CallingPoints::Single(point) => join_non_empty(
            [
                rendered_point(point, show_time),
                ONLY.to_string(),
                SEPARATOR.to_string(),
                trailer.service_phrase(),
                trailer.carriages_phrase(),
            ],
            " ",
        ),
        CallingPoints::Many(points) => join_non_empty(
            [
                format!("{}.", render_list(points, show_time)),
                LIST_SEPARATOR.to_string(),
                trailer.service_phrase(),
                trailer.carriages_phrase(),
            ],
            " ",
        ),
        CallingPoints::Split(sections) => {
            let portions = sections
                .iter()
                .map(|section| render_list(section, show_time))
                .collect::<Vec<_>>()
                .join(PORTION_JOINER);
            join_non_empty(
                [
                    portions,
                    SEPARATOR.to_string(),
                    trailer.service_phrase(),
                    trailer.carriages_phrase(),
                ],
                " ",
            )
        }
    }
}

fn render_list(points: &[CallingPoint], show_time: bool) -> String {
    let names: Vec<String> = points
        .iter()
        .map(|point| rendered_point(point, show_time))
        .collect();
    join_with_and(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GWR: Trailer<'static> = Trailer {
        operator: Some("Great Western Railway"),
        carriages: 8,
    };

    fn plain() -> DisplayOptions {
        DisplayOptions::default()
    }

    fn timed() -> DisplayOptions {
        DisplayOptions {
            show_per_stop_time: true,
        }
    }

    #[test]
    fn no_calling_points() {
        let line = render_calling_at(&CallingPoints::Absent, "Taunton", &GWR, &plain());
        assert_eq!(
            line,
            "Taunton only. A Great Western Railway Service formed of 8 coaches."
        );
    }

    #[test]
    fn no_calling_points_unknown_operator_and_length() {
        let line = render_calling_at(
            &CallingPoints::Absent,
            "Taunton",
            &Trailer::default(),
            &plain(),
        );
        assert_eq!(line, "Taunton only.");
    }

    #[test]
    fn single_calling_point() {
        let points = CallingPoints::Single(CallingPoint::new("Reading (Berks)", "10:25"));
        let line = render_calling_at(&points, "Reading", &GWR, &plain());
        assert_eq!(
            line,
            "Reading only.   --   A Great Western Railway Service formed of 8 coaches."
        );
    }

    #[test]
    fn many_calling_points() {
        let points = CallingPoints::Many(vec![
            CallingPoint::new("Reading", "10:25"),
            CallingPoint::new("Swindon", "10:52"),
            CallingPoint::new("Bath Spa", "11:11"),
        ]);
        let trailer = Trailer {
            operator: Some("Great Western Railway"),
            carriages: 0,
        };
        let line = render_calling_at(&points, "Bath Spa", &trailer, &plain());
        assert_eq!(
            line,
            "Reading, Swindon and Bath Spa.  --   A Great Western Railway Service"
        );
    }

    #[test]
    fn splitting_service() {
        let points = CallingPoints::Split(vec![
            vec![CallingPoint::new("Bath Spa", "11:11")],
            vec![
                CallingPoint::new("Bristol Temple Meads", "11:25"),
                CallingPoint::new("Taunton", "12:00"),
            ],
        ]);
        let line = render_calling_at(&points, "Bath Spa & Taunton", &GWR, &plain());
        assert_eq!(
            line,
            "Bath Spa with a portion going to Bristol Temple Meads and Taunton   --   \
             A Great Western Railway Service formed of 8 coaches."
        );
        assert!(line.contains(" with a portion going to "));
    }

    #[test]
    fn per_stop_times() {
        let points = CallingPoints::Many(vec![
            CallingPoint::new("Reading", "10:25").with_et("10:27"),
            CallingPoint::new("Swindon", "10:52").with_et("On time"),
        ]);
        let trailer = Trailer {
            operator: Some("Great Western Railway"),
            carriages: 0,
        };
        let line = render_calling_at(&points, "Swindon", &trailer, &timed());
        assert_eq!(
            line,
            "Reading (10:27) and Swindon (10:52).  --   A Great Western Railway Service"
        );
    }

    #[test]
    fn point_without_time_flag_never_has_parenthetical() {
        let point = CallingPoint::new("Chippenham", "11:00").with_et("11:03");
        assert_eq!(rendered_point(&point, false), "Chippenham");
    }

    #[test]
    fn point_with_status_falls_back_to_scheduled() {
        let point = CallingPoint::new("Chippenham", "11:00").with_et("On time");
        assert_eq!(rendered_point(&point, true), "Chippenham (11:00)");
    }

    #[test]
    fn point_with_actual_time() {
        let point = CallingPoint::new("Chippenham", "11:00").with_at("11:02");
        assert_eq!(rendered_point(&point, true), "Chippenham (11:02)");
    }

    #[test]
    fn point_without_any_time() {
        let point = CallingPoint {
            location_name: "Yatton".into(),
            crs: None,
            st: None,
            et: Some("Cancelled".into()),
            at: None,
        };
        assert_eq!(rendered_point(&point, true), "Yatton");
    }

    #[test]
    fn arrival_and_departure_narratives_differ() {
        let tree = crate::darwin::parse_envelope(
            "<service><operator>Great Western Railway</operator><length>5</length>
                <destination><location><locationName>Taunton</locationName></location></destination>
                <previousCallingPoints><callingPointList>
                    <callingPoint><locationName>Reading</locationName><st>09:40</st></callingPoint>
                </callingPointList></previousCallingPoints>
            </service>",
        )
        .unwrap();
        let service = RawService::from_node(&tree["service"], crate::darwin::ServiceType::Train);

        assert_eq!(
            render(&service, BoardKind::Departures, &plain()),
            "Taunton only. A Great Western Railway Service formed of 5 coaches."
        );
        assert_eq!(
            render(&service, BoardKind::Arrivals, &plain()),
            "Reading only.   --   A Great Western Railway Service formed of 5 coaches."
        );
    }

    #[test]
    fn avanti_takes_an() {
        let trailer = Trailer {
            operator: Some("Avanti West Coast"),
            carriages: 11,
        };
        let line = render_calling_at(&CallingPoints::Absent, "Manchester Piccadilly", &trailer, &plain());
        assert_eq!(
            line,
            "Manchester Piccadilly only. An Avanti West Coast Service formed of 11 coaches."
        );
    }
}
