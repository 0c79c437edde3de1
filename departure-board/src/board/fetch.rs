//! Paging through next departures.
//!
//! `GetNextDeparturesWithDetails` only ever returns the single next service
//! to each destination. To show several upcoming services the board asks
//! repeatedly, moving the time offset just past the last service found.

use std::collections::HashSet;
use std::future::Future;

use chrono::Local;
use tracing::{debug, warn};

use crate::darwin::envelope::{fault_message, is_fault};
use crate::darwin::{DarwinError, RawService, parse_envelope};
use crate::domain::{Crs, MINUTES_PER_DAY, board_sort_key, minutes_since_midnight};

use super::BoardQuery;
use super::collect::collect_next_departures;

/// Darwin accepts offsets of at most two hours.
pub const MAX_TIME_OFFSET: i16 = 120;

/// Source of raw board responses.
///
/// This abstraction allows the paging loop to be tested without a network.
pub trait BoardSource {
    /// Fetch the SOAP response body for `query`, `time_offset` minutes from
    /// now, limited to `num_rows` services.
    fn fetch_board(
        &self,
        query: &BoardQuery,
        time_offset: i16,
        num_rows: u8,
    ) -> impl Future<Output = Result<String, DarwinError>> + Send;
}

/// Wall-clock time of day, in minutes since midnight.
pub trait Clock {
    fn minutes_since_midnight(&self) -> u32;
}

/// The local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn minutes_since_midnight(&self) -> u32 {
        minutes_since_midnight(Local::now().time())
    }
}

/// Offset for the request after a service scheduled at `scheduled` minutes
/// past midnight, given the current time `now`.
///
/// Lands one minute after the service, wrapping past midnight, and never
/// beyond what Darwin accepts.
pub fn next_offset(scheduled: u32, now: u32) -> i16 {
    let mut offset = i64::from(scheduled) - i64::from(now) + 1;
    if offset < 0 {
        offset += i64::from(MINUTES_PER_DAY);
    }
    // Bounded by the clamp, so the cast cannot truncate.
    offset.min(i64::from(MAX_TIME_OFFSET)) as i16
}

/// Collect up to `target_count` distinct upcoming services from `station`
/// towards any of `destinations`.
///
/// Stops early when Darwin has no further service, answers with a fault,
/// or returns a service already seen. Transport and XML errors propagate.
pub async fn fetch_next_services<S, C>(
    source: &S,
    clock: &C,
    station: Crs,
    destinations: &[Crs],
    initial_offset: i16,
    target_count: usize,
) -> Result<Vec<RawService>, DarwinError>
where
    S: BoardSource,
    C: Clock,
{
    let query = BoardQuery::NextDepartures {
        station,
        destinations: destinations.to_vec(),
    };

    let mut services = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = initial_offset;

    while services.len() < target_count {
        debug!(%station, offset, found = services.len(), "requesting next departure");
        let body = source.fetch_board(&query, offset, 1).await?;
        let tree = parse_envelope(&body)?;

        if is_fault(&tree) {
            warn!(
                fault = fault_message(&tree).unwrap_or("unknown"),
                "next departures request resulted in a SOAP fault"
            );
            break;
        }
        let Some(board) = collect_next_departures(&tree) else {
            warn!("response does not contain a next departures board");
            break;
        };

        let Some(service) = earliest(board.into_services()) else {
            debug!("no further services");
            break;
        };

        if let Some(id) = &service.service_id {
            if !seen.insert(id.clone()) {
                debug!(service_id = %id, "service already seen");
                break;
            }
        }

        let scheduled = service.std.as_deref().and_then(board_sort_key);
        services.push(service);

        let Some(scheduled) = scheduled else {
            debug!("service has no usable departure time, cannot page further");
            break;
        };
        offset = next_offset(scheduled % MINUTES_PER_DAY, clock.minutes_since_midnight());
    }

    Ok(services)
}

/// The first service to leave, across every destination.
fn earliest(services: Vec<RawService>) -> Option<RawService> {
    services
        .into_iter()
        .min_by_key(|s| s.std.as_deref().and_then(board_sort_key).unwrap_or(u32::MAX))
}
