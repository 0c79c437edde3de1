//! Darwin OpenLDBWS SOAP client.
//!
//! Builds the SOAP request for a board query, posts it and returns the raw
//! response body. Parsing is left to the caller so that faults can be told
//! apart from transport failures.

use std::time::Duration;

use quick_xml::escape::escape;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, trace};

use crate::board::{BoardQuery, BoardSource};
use crate::domain::Crs;

use super::envelope::{is_fault, parse_envelope};
use super::error::DarwinError;

/// Default OpenLDBWS endpoint.
const DEFAULT_BASE_URL: &str = "https://lite.realtime.nationalrail.co.uk/OpenLDBWS/ldb11.asmx";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default look-ahead window in minutes. Darwin allows at most 120.
const DEFAULT_TIME_WINDOW: u16 = 120;

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const LDB_NS: &str = "http://thalesgroup.com/RTTI/2017-10-01/ldb/";
const TOKEN_NS: &str = "http://thalesgroup.com/RTTI/2013-11-28/Token/types";

/// Configuration for the Darwin client.
#[derive(Debug, Clone)]
pub struct DarwinConfig {
    /// OpenLDBWS access token
    pub access_token: String,
    /// Endpoint URL (defaults to the public OpenLDBWS service)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Minutes ahead of the offset to include services for
    pub time_window: u16,
}

impl DarwinConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            time_window: DEFAULT_TIME_WINDOW,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the look-ahead window, capped at 120 minutes.
    pub fn with_time_window(mut self, minutes: u16) -> Self {
        self.time_window = minutes.min(DEFAULT_TIME_WINDOW);
        self
    }
}

/// Darwin OpenLDBWS client.
#[derive(Debug, Clone)]
pub struct DarwinClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    time_window: u16,
}

impl DarwinClient {
    /// Create a new Darwin client with the given configuration.
    pub fn new(config: DarwinConfig) -> Result<Self, DarwinError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=utf-8"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            access_token: config.access_token,
            time_window: config.time_window,
        })
    }

    /// Fetch the raw SOAP response for a board query.
    ///
    /// SOAP faults come back as `Ok` bodies: Darwin reports them with HTTP
    /// 500, and the board engine classifies them itself.
    pub async fn fetch_board(
        &self,
        query: &BoardQuery,
        time_offset: i16,
        num_rows: u8,
    ) -> Result<String, DarwinError> {
        let request = build_request(
            &self.access_token,
            query,
            time_offset,
            num_rows,
            self.time_window,
        );
        debug!(
            kind = ?query.kind(),
            station = %query.station(),
            time_offset,
            num_rows,
            "requesting board"
        );

        let response = self.http.post(&self.base_url).body(request).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DarwinError::Unauthorized);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DarwinError::RateLimited);
        }

        let body = response.text().await?;
        trace!(%status, bytes = body.len(), "board response");

        if status.is_success() || carries_fault(&body) {
            return Ok(body);
        }

        Err(DarwinError::ApiError {
            status: status.as_u16(),
            message: body,
        })
    }
}

impl BoardSource for DarwinClient {
    async fn fetch_board(
        &self,
        query: &BoardQuery,
        time_offset: i16,
        num_rows: u8,
    ) -> Result<String, DarwinError> {
        DarwinClient::fetch_board(self, query, time_offset, num_rows).await
    }
}

fn carries_fault(body: &str) -> bool {
    parse_envelope(body).is_ok_and(|tree| is_fault(&tree))
}

/// Build the SOAP envelope for a board query.
pub fn build_request(
    access_token: &str,
    query: &BoardQuery,
    time_offset: i16,
    num_rows: u8,
    time_window: u16,
) -> String {
    let (operation, crs, filter) = match query {
        BoardQuery::Departures { station, filter } => (
            "GetDepBoardWithDetailsRequest",
            station,
            filter.map(|f| station_filter(f, "to")),
        ),
        BoardQuery::Arrivals { station, from } => (
            "GetArrBoardWithDetailsRequest",
            station,
            from.map(|f| station_filter(f, "from")),
        ),
        BoardQuery::NextDepartures {
            station,
            destinations,
        } => (
            "GetNextDeparturesWithDetailsRequest",
            station,
            Some(filter_list(destinations)),
        ),
    };

    format!(
        r#"<x:Envelope xmlns:x="{SOAP_NS}" xmlns:ldb="{LDB_NS}" xmlns:typ4="{TOKEN_NS}">
<x:Header>
<typ4:AccessToken><typ4:TokenValue>{token}</typ4:TokenValue></typ4:AccessToken>
</x:Header>
<x:Body>
<ldb:{operation}>
<ldb:numRows>{num_rows}</ldb:numRows>
<ldb:crs>{crs}</ldb:crs>
<ldb:timeOffset>{time_offset}</ldb:timeOffset>
{filter}<ldb:timeWindow>{time_window}</ldb:timeWindow>
</ldb:{operation}>
</x:Body>
</x:Envelope>"#,
        token = escape(access_token),
        filter = filter.unwrap_or_default(),
    )
}

fn station_filter(crs: Crs, filter_type: &str) -> String {
    format!("<ldb:filterCrs>{crs}</ldb:filterCrs>\n<ldb:filterType>{filter_type}</ldb:filterType>\n")
}

fn filter_list(destinations: &[Crs]) -> String {
    let stations: String = destinations
        .iter()
        .map(|crs| format!("<ldb:crs>{crs}</ldb:crs>"))
        .collect();
    format!("<ldb:filterList>{stations}</ldb:filterList>\n")
}
