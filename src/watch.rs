//! Polling mode: re-render one board on a fixed interval until Ctrl+C.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tokio::time::{self, MissedTickBehavior};

use crate::api::{self, Board};
use crate::config::Config;
use crate::models::AirportCode;

/// Run `fetch` immediately and then every `period`, handing each outcome to
/// `report`, until `shutdown` resolves. Returns the number of completed polls.
///
/// A failed fetch never ends the loop.
pub async fn poll<T, E, F, Fut, R, S>(period: Duration, mut fetch: F, mut report: R, shutdown: S) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    R: FnMut(std::result::Result<T, E>),
    S: Future,
{
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut polls = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }
        tokio::select! {
            outcome = fetch() => report(outcome),
            _ = &mut shutdown => break,
        }
        polls += 1;
    }
    polls
}

/// `watch` command.
pub async fn run(config: &Config, airport: &str, board: Board) -> Result<()> {
    let airport = AirportCode::new(airport)?;
    let service = api::connect(config).await?;
    let locale = service.locale();
    let period = config.display.refresh_interval();

    println!(
        "Watching {} at {} every {}s (Ctrl+C to stop)",
        board.title().to_lowercase(),
        airport,
        period.as_secs()
    );

    let polls = poll(
        period,
        || service.board(board, &airport),
        |outcome| {
            let stamp = Local::now().format("%H:%M:%S");
            match outcome {
                Ok(records) => {
                    println!("\n[{}] updated", stamp);
                    print!("{}", api::render_board(board, &airport, &records, locale));
                }
                Err(e) => {
                    tracing::error!("Refresh of {} at {} failed: {}", board.title(), airport, e);
                    println!("\n[{}] failed to load, keeping previous board", stamp);
                }
            }
        },
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Could not listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        },
    )
    .await;

    println!("Shutting down after {} refreshes...", polls);
    Ok(())
}
