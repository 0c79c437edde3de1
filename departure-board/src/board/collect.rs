//! Service extraction from a parsed board response.
//!
//! Station boards (departures and arrivals) list services under
//! `GetStationBoardResult`, split by mode into `trainServices`,
//! `busServices` and `ferryServices`. The next-departures board instead
//! nests one service under each requested destination, so it has its own
//! extraction path.

use serde_json::Value;
use tracing::{debug, trace};

use crate::darwin::envelope::{get_path, is_nil, one_or_many, soap_body, text};
use crate::darwin::{RawService, ServiceType};
use crate::domain::board_sort_key;

use super::BoardKind;

/// Service lists on a station board, with the type each implies.
const SERVICE_LISTS: [(&str, ServiceType); 3] = [
    ("trainServices", ServiceType::Train),
    ("busServices", ServiceType::Bus),
    ("ferryServices", ServiceType::Ferry),
];

/// Services extracted from a board, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// The board station's display name.
    pub station_name: Option<String>,

    /// Services in display order.
    pub services: Vec<RawService>,
}

/// A next-departures board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextDeparturesBoard {
    /// The departure station's display name.
    pub station_name: Option<String>,

    /// One entry per requested destination, in response order.
    pub entries: Vec<DestinationEntry>,
}

impl NextDeparturesBoard {
    /// The services found, skipping destinations with no service.
    pub fn into_services(self) -> Vec<RawService> {
        self.entries.into_iter().filter_map(|e| e.service).collect()
    }
}

/// The next service towards one requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationEntry {
    /// The destination's CRS, from the entry's `crs` attribute.
    pub crs: Option<String>,

    /// The service, or `None` when Darwin reports no further service.
    pub service: Option<RawService>,
}

/// Extract the station name and services for a board kind.
///
/// Returns `None` if the response has no board for this kind at all (for
/// example a fault, or a response to a different request). A board with
/// no services is `Some` with an empty list.
pub fn collect(tree: &Value, kind: BoardKind) -> Option<Collected> {
    match kind {
        BoardKind::Departures => collect_station_board(tree, kind, "GetDepBoardWithDetailsResponse"),
        BoardKind::Arrivals => collect_station_board(tree, kind, "GetArrBoardWithDetailsResponse"),
        BoardKind::NextDepartures => {
            let board = collect_next_departures(tree)?;
            Some(Collected {
                station_name: board.station_name.clone(),
                services: board.into_services(),
            })
        }
    }
}

fn collect_station_board(tree: &Value, kind: BoardKind, response: &str) -> Option<Collected> {
    let result = get_path(soap_body(tree)?, &[response, "GetStationBoardResult"])?;
    let station_name = text(result, "locationName").map(str::to_string);

    let lists: Vec<Vec<RawService>> = SERVICE_LISTS
        .iter()
        .map(|(key, listed_as)| services_in(result, key, *listed_as))
        .collect();

    let services = merge_service_lists(lists, kind);
    debug!(
        station = station_name.as_deref().unwrap_or("?"),
        count = services.len(),
        ?kind,
        "collected board services"
    );

    Some(Collected {
        station_name,
        services,
    })
}

/// Normalize one `xxxServices/service` list; a lone service arrives as an
/// object rather than a list.
fn services_in(result: &Value, key: &str, listed_as: ServiceType) -> Vec<RawService> {
    let nodes = one_or_many(result.get(key).and_then(|list| list.get("service")));
    trace!(key, count = nodes.len(), "service list");
    nodes
        .into_iter()
        .map(|node| RawService::from_node(node, listed_as))
        .collect()
}

/// Concatenate per-mode lists.
///
/// A single mode keeps Darwin's order. Mixed modes are re-sorted by
/// scheduled time, since each list is only ordered within itself.
pub fn merge_service_lists(lists: Vec<Vec<RawService>>, kind: BoardKind) -> Vec<RawService> {
    let modes = lists.iter().filter(|l| !l.is_empty()).count();
    let mut services: Vec<RawService> = lists.into_iter().flatten().collect();
    if modes > 1 {
        order_by_schedule(&mut services, kind);
    }
    services
}

/// Stable sort by scheduled time with the early-morning rollover rule.
/// Services without a usable time go last.
pub fn order_by_schedule(services: &mut [RawService], kind: BoardKind) {
    services.sort_by_key(|s| {
        kind.scheduled_time(s)
            .and_then(board_sort_key)
            .unwrap_or(u32::MAX)
    });
}

/// Extract a next-departures board.
///
/// Returns `None` when the response carries no `DeparturesBoard`.
pub fn collect_next_departures(tree: &Value) -> Option<NextDeparturesBoard> {
    let board = get_path(
        soap_body(tree)?,
        &["GetNextDeparturesWithDetailsResponse", "DeparturesBoard"],
    )?;
    let station_name = text(board, "locationName").map(str::to_string);

    let destinations = board.get("departures").and_then(|d| d.get("destination"));
    let entries: Vec<DestinationEntry> = one_or_many(destinations)
        .into_iter()
        .map(|dest| {
            let service = dest.get("service").filter(|node| !is_nil(Some(node)));
            DestinationEntry {
                crs: dest.get("@crs").and_then(Value::as_str).map(str::to_string),
                service: service.map(|node| RawService::from_node(node, ServiceType::Train)),
            }
        })
        .collect();

    debug!(
        station = station_name.as_deref().unwrap_or("?"),
        destinations = entries.len(),
        "collected next departures"
    );

    Some(NextDeparturesBoard {
        station_name,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::darwin::parse_envelope;

    fn envelope(response: &str, inner: &str) -> Value {
        let xml = format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
                <{response} xmlns="http://thalesgroup.com/RTTI/2017-10-01/ldb/">{inner}</{response}>
            </soap:Body></soap:Envelope>"#
        );
        parse_envelope(&xml).unwrap()
    }

    fn station_board(response: &str, lists: &str) -> Value {
        envelope(
            response,
            &format!(
                "<GetStationBoardResult><locationName>London Paddington</locationName>{lists}</GetStationBoardResult>"
            ),
        )
    }

    fn service(id: &str, std: &str) -> String {
        format!("<service><std>{std}</std><serviceID>{id}</serviceID></service>")
    }

    fn ids(services: &[RawService]) -> Vec<&str> {
        services
            .iter()
            .map(|s| s.service_id.as_ref().map(|id| id.as_str()).unwrap_or("-"))
            .collect()
    }

    #[test]
    fn train_only_keeps_feed_order() {
        let lists = format!(
            "<trainServices>{}{}{}</trainServices>",
            service("a", "10:30"),
            service("b", "10:00"),
            service("c", "10:15")
        );
        let tree = station_board("GetDepBoardWithDetailsResponse", &lists);
        let collected = collect(&tree, BoardKind::Departures).unwrap();

        assert_eq!(collected.station_name.as_deref(), Some("London Paddington"));
        assert_eq!(ids(&collected.services), vec!["a", "b", "c"]);
    }

    #[test]
    fn lone_train_becomes_one_element_list() {
        let lists = format!("<trainServices>{}</trainServices>", service("a", "10:30"));
        let tree = station_board("GetDepBoardWithDetailsResponse", &lists);
        let collected = collect(&tree, BoardKind::Departures).unwrap();
        assert_eq!(ids(&collected.services), vec!["a"]);
        assert_eq!(collected.services[0].service_type, ServiceType::Train);
    }

    #[test]
    fn bus_only() {
        let lists = format!("<busServices>{}</busServices>", service("bus1", "11:00"));
        let tree = station_board("GetDepBoardWithDetailsResponse", &lists);
        let collected = collect(&tree, BoardKind::Departures).unwrap();
        assert_eq!(ids(&collected.services), vec!["bus1"]);
        assert_eq!(collected.services[0].service_type, ServiceType::Bus);
    }

    #[test]
    fn mixed_services_sorted_across_midnight() {
        let lists = format!(
            "<trainServices>{}{}</trainServices><busServices>{}{}</busServices>",
            service("t1", "23:40"),
            service("t2", "00:10"),
            service("b1", "23:50"),
            service("b2", "00:05"),
        );
        let tree = station_board("GetDepBoardWithDetailsResponse", &lists);
        let collected = collect(&tree, BoardKind::Departures).unwrap();
        assert_eq!(ids(&collected.services), vec!["t1", "b1", "b2", "t2"]);
    }

    #[test]
    fn mixed_with_lone_bus() {
        let lists = format!(
            "<trainServices>{}{}</trainServices><busServices>{}</busServices>",
            service("t1", "10:00"),
            service("t2", "10:30"),
            service("b1", "10:10"),
        );
        let tree = station_board("GetDepBoardWithDetailsResponse", &lists);
        let collected = collect(&tree, BoardKind::Departures).unwrap();
        assert_eq!(ids(&collected.services), vec!["t1", "b1", "t2"]);
    }

    #[test]
    fn no_services_is_empty_not_missing() {
        let tree = station_board("GetDepBoardWithDetailsResponse", "");
        let collected = collect(&tree, BoardKind::Departures).unwrap();
        assert!(collected.services.is_empty());
        assert_eq!(collected.station_name.as_deref(), Some("London Paddington"));
    }

    #[test]
    fn wrong_response_kind_is_missing() {
        let tree = station_board("GetDepBoardWithDetailsResponse", "");
        assert!(collect(&tree, BoardKind::Arrivals).is_none());
        assert!(collect(&tree, BoardKind::NextDepartures).is_none());
    }

    #[test]
    fn arrivals_sorted_by_scheduled_arrival() {
        let lists = "<trainServices><service><sta>12:20</sta><serviceID>t</serviceID></service></trainServices>\
                     <busServices><service><sta>12:05</sta><serviceID>b</serviceID></service></busServices>";
        let tree = station_board("GetArrBoardWithDetailsResponse", lists);
        let collected = collect(&tree, BoardKind::Arrivals).unwrap();
        assert_eq!(ids(&collected.services), vec!["b", "t"]);
    }

    #[test]
    fn unparseable_times_sort_last() {
        let mut services = vec![
            RawService::from_node(
                &parse_envelope("<s><std>Delayed</std><serviceID>x</serviceID></s>")
                    .unwrap()["s"],
                ServiceType::Train,
            ),
            RawService::from_node(
                &parse_envelope("<s><std>09:00</std><serviceID>y</serviceID></s>").unwrap()["s"],
                ServiceType::Bus,
            ),
        ];
        order_by_schedule(&mut services, BoardKind::Departures);
        assert_eq!(ids(&services), vec!["y", "x"]);
    }

    fn next_departures(destinations: &str) -> Value {
        envelope(
            "GetNextDeparturesWithDetailsResponse",
            &format!(
                "<DeparturesBoard><locationName>London Paddington</locationName><crs>PAD</crs>\
                 <departures>{destinations}</departures></DeparturesBoard>"
            ),
        )
    }

    #[test]
    fn next_departures_single_destination() {
        let tree = next_departures(&format!(
            r#"<destination crs="BTH">{}</destination>"#,
            service("2220850PADTON__", "16:30")
        ));
        let board = collect_next_departures(&tree).unwrap();
        assert_eq!(board.station_name.as_deref(), Some("London Paddington"));
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].crs.as_deref(), Some("BTH"));
        assert!(board.entries[0].service.is_some());
    }

    #[test]
    fn next_departures_many_destinations_with_sentinel() {
        let tree = next_departures(&format!(
            r#"<destination crs="BTH">{}</destination>
               <destination crs="TAU"><service xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/></destination>
               <destination crs="BRI">{}</destination>"#,
            service("a", "16:30"),
            service("b", "16:45"),
        ));
        let board = collect_next_departures(&tree).unwrap();
        assert_eq!(board.entries.len(), 3);
        assert!(board.entries[1].service.is_none());

        let collected = collect(&tree, BoardKind::NextDepartures).unwrap();
        assert_eq!(ids(&collected.services), vec!["a", "b"]);
    }

    #[test]
    fn next_departures_without_departures() {
        let tree = next_departures("");
        let board = collect_next_departures(&tree).unwrap();
        assert!(board.entries.is_empty());
    }
}
