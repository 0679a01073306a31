//! TDX air API: authenticated client, flight queries and CLI output

pub mod client;
pub mod flights;
pub mod table;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::models::{
    AirlineCode, AirportCode, Direction, FlightNumber, FlightRecord, Locale, KNOWN_AIRPORTS,
};

pub use flights::{Board, FlightService};
use table::TextTable;

/// Build the query service, refusing to start without client credentials.
pub async fn connect(config: &Config) -> Result<FlightService> {
    if !config.auth.is_configured() {
        bail!(
            "No TDX client credentials configured. Run `flightboard init` or set \
             FLIGHTBOARD_CLIENT_ID and FLIGHTBOARD_CLIENT_SECRET."
        );
    }

    let service = FlightService::new(config).context("Failed to create API client")?;
    if config.display.prime_token {
        service.client().prime().await;
    }
    Ok(service)
}

/// Render one board as a text table with a title line.
pub fn render_board(
    board: Board,
    airport: &AirportCode,
    records: &[FlightRecord],
    locale: Locale,
) -> String {
    let rows = match board {
        Board::Arrivals | Board::Departures => {
            let direction = match board {
                Board::Arrivals => Direction::Arrival,
                _ => Direction::Departure,
            };
            let mut rows = TextTable::new(&table::BOARD_HEADERS);
            for record in records {
                rows.push(table::board_row(record, direction, locale));
            }
            rows
        }
        Board::Schedule => {
            let mut rows = TextTable::new(&table::SCHEDULE_HEADERS);
            for record in records {
                rows.push(table::schedule_row(record));
            }
            rows
        }
    };

    let mut out = format!("\n{} at {} ({} flights)\n", board.title(), airport, records.len());
    if rows.is_empty() {
        out.push_str("  (no flights found)\n");
    } else {
        out.push_str(&rows.render());
    }
    out
}

fn print_json(records: &[FlightRecord]) -> Result<()> {
    let text = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    println!("{}", text);
    Ok(())
}

/// `arrivals`, `departures` and `schedule` commands.
pub async fn print_board(config: &Config, board: Board, airport: &str, json: bool) -> Result<()> {
    let airport = AirportCode::new(airport)?;
    let service = connect(config).await?;

    let records = service
        .board(board, &airport)
        .await
        .with_context(|| format!("Failed to load {} for {}", board.title().to_lowercase(), airport))?;

    if json {
        return print_json(&records);
    }
    print!("{}", render_board(board, &airport, &records, service.locale()));
    Ok(())
}

/// `airline` command.
pub async fn print_airline(config: &Config, airport: &str, airline: &str, json: bool) -> Result<()> {
    let airport = AirportCode::new(airport)?;
    let airline = AirlineCode::new(airline)?;
    let service = connect(config).await?;

    let records = service
        .airline_flights(&airport, &airline)
        .await
        .with_context(|| format!("Failed to search {} flights at {}", airline, airport))?;

    if json {
        return print_json(&records);
    }

    println!("\n{} flights at {} ({})", airline, airport, records.len());
    if records.is_empty() {
        println!("  (no matching flights)");
        return Ok(());
    }

    let mut rows = TextTable::new(&table::AIRLINE_HEADERS);
    for record in &records {
        rows.push(table::airline_row(record, airport.as_str(), service.locale()));
    }
    print!("{}", rows.render());
    Ok(())
}

/// `seats` command.
pub async fn print_seats(config: &Config, flight: &str, json: bool) -> Result<()> {
    let flight = FlightNumber::new(flight)?;
    let service = connect(config).await?;

    let records = service
        .seat_availability(&flight)
        .await
        .with_context(|| format!("Failed to load seat availability for {}", flight))?;

    if json {
        return print_json(&records);
    }

    println!("\nSeat availability for {} ({} rows)", flight, records.len());
    if records.is_empty() {
        println!("  (no seat data)");
        return Ok(());
    }
    print!("{}", table::record_table(&records).render());
    Ok(())
}

/// `token` command: exchange credentials and report the token lifetime.
pub async fn print_token(config: &Config) -> Result<()> {
    let service = connect(config).await?;
    let client = service.client();

    client
        .ensure_valid()
        .await
        .context("Credential exchange failed")?;

    println!("Token endpoint: {}", config.auth.token_url);
    println!("Client ID:      {}", config.auth.client_id);
    match (client.tokens().remaining(), client.tokens().expires_at_utc()) {
        (Some(remaining), Some(at)) if !remaining.is_zero() => {
            println!(
                "Status:         valid for {}m (until {} UTC, 5 min before server expiry)",
                remaining.as_secs() / 60,
                at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        _ => println!("Status:         issued but already inside the refresh margin"),
    }
    Ok(())
}

/// `airports` command.
pub fn print_airports(locale: Locale) {
    println!("\nKnown airports:");
    println!("{:-<40}", "");
    for airport in KNOWN_AIRPORTS {
        let name = match locale {
            Locale::ZhTw => airport.name_zh,
            Locale::En => airport.name_en,
        };
        println!("  {}  {}", airport.code, name);
    }
}
