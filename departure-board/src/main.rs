use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use departure_board::board::{
    AssembledBoard, BoardKind, BoardQuery, DepartureRecord, SystemClock, assemble_services,
    assemble_xml, fetch_next_services, records_for_platform,
};
use departure_board::config::Config;
use departure_board::darwin::{DarwinClient, DarwinConfig, DarwinError};

/// Install a stderr subscriber. `RUST_LOG` wins; otherwise logging is off
/// unless the board's own `debug` flag is set.
fn init_logging(debug: bool) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env()
        .unwrap_or_else(|err| {
            eprintln!(
                "invalid {}, falling back to level '{default_level}' - {err}",
                EnvFilter::DEFAULT_ENV
            );
            EnvFilter::new(default_level.to_string())
        });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.debug);

    let client = match DarwinClient::new(DarwinConfig::new(&config.api_key)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create Darwin client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match load_board(&client, &config).await {
        Ok(board) => {
            print_board(&config, board);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "board request failed");
            eprintln!("Failed to load departures: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn load_board(client: &DarwinClient, config: &Config) -> Result<AssembledBoard, DarwinError> {
    let query = config.board_query();
    let options = config.display_options();
    let offset = config.journey.time_offset;
    let rows = config.departure_count;
    debug!(?query, offset, rows, "loading board");

    match &query {
        // One request only ever yields the next service per destination,
        // so page forward for any more.
        BoardQuery::NextDepartures {
            station,
            destinations,
        } if rows > 1 => {
            let services = fetch_next_services(
                client,
                &SystemClock,
                *station,
                destinations,
                offset,
                usize::from(rows),
            )
            .await?;
            let departures = assemble_services(&options, BoardKind::NextDepartures, &services);
            Ok(AssembledBoard {
                departures: (!departures.is_empty()).then_some(departures),
                station_name: None,
            })
        }
        _ => {
            let body = client.fetch_board(&query, offset, rows).await?;
            assemble_xml(&options, &body, query.kind())
        }
    }
}

fn print_board(config: &Config, board: AssembledBoard) {
    // Paged boards carry no station name, so fall back to the code.
    let station = board
        .station_name
        .unwrap_or_else(|| config.board_query().station().to_string());
    let mut departures: Vec<DepartureRecord> = board.departures.unwrap_or_default();
    if let Some(platform) = &config.journey.platform {
        departures = records_for_platform(departures, platform);
    }

    println!("{station}");
    if departures.is_empty() {
        println!("  No departures");
        return;
    }
    for (i, departure) in departures.iter().enumerate() {
        println!("{}. {departure}", i + 1);
        println!("   {}", departure.calling_at_list);
    }
}
