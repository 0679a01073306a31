//! Async backend: runs board queries off the UI loop.
//!
//! The dashboard sends `BackendCommand` values over an mpsc channel; a
//! background task runs each one as its own task against a shared
//! `FlightService` and sends `BackendResponse` values back.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{self, Board, FlightService};
use crate::config::Config;
use crate::error::Result;
use crate::models::{AirlineCode, AirportCode, FlightRecord};

/// Commands sent from the dashboard to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadBoard {
        seq: u64,
        airport: AirportCode,
        board: Board,
    },
    LoadAirline {
        seq: u64,
        airport: AirportCode,
        airline: AirlineCode,
    },
}

/// Responses from the backend.
pub enum BackendResponse {
    /// Result of the command with the same `seq`.
    Records {
        seq: u64,
        result: Result<Vec<FlightRecord>>,
    },
    /// The query service could not be created (missing credentials).
    ClientError(String),
}

/// Handle for talking to the backend task.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Spawn the backend task.
    pub fn start(config: Config) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(config, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    /// Queue a command (non-blocking).
    pub fn send(&self, cmd: BackendCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed -- command dropped");
        }
    }

    /// Next response; `None` once the backend has stopped.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

async fn backend_loop(
    config: Config,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    let service = match api::connect(&config).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            let _ = resp_tx.send(BackendResponse::ClientError(format!("{:#}", e)));
            return;
        }
    };

    while let Some(cmd) = cmd_rx.recv().await {
        let service = Arc::clone(&service);
        let resp_tx = resp_tx.clone();

        // Overlapping commands may both exchange a token; last one wins.
        tokio::spawn(async move {
            let response = execute(&service, cmd).await;
            let _ = resp_tx.send(response);
        });
    }
}

async fn execute(service: &FlightService, cmd: BackendCommand) -> BackendResponse {
    match cmd {
        BackendCommand::LoadBoard {
            seq,
            airport,
            board,
        } => {
            tracing::debug!("Loading {} for {}", board.title(), airport);
            BackendResponse::Records {
                seq,
                result: service.board(board, &airport).await,
            }
        }
        BackendCommand::LoadAirline {
            seq,
            airport,
            airline,
        } => {
            tracing::debug!("Searching {} flights at {}", airline, airport);
            BackendResponse::Records {
                seq,
                result: service.airline_flights(&airport, &airline).await,
            }
        }
    }
}
