//! Flight queries against the TDX air endpoints
//!
//! Builds the OData query for each board, runs it through the authenticated
//! client and normalizes whatever envelope comes back into a record list.

use serde_json::Value;
use url::Url;

use super::client::FlightClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    decode_day_mask, normalize_records, AirlineCode, AirportCode, Direction, FlightNumber,
    FlightRecord, Locale, SeatRecord,
};

/// Field added to every schedule record.
pub const WEEKDAYS_FIELD: &str = "weekdaysText";

/// Which board a polling view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Board {
    Arrivals,
    Departures,
    Schedule,
}

impl Board {
    pub fn title(self) -> &'static str {
        match self {
            Board::Arrivals => "Arrivals",
            Board::Departures => "Departures",
            Board::Schedule => "Schedule",
        }
    }
}

/// Domain queries on top of [`FlightClient`].
pub struct FlightService {
    client: FlightClient,
    locale: Locale,
    max_records: Option<u32>,
}

impl FlightService {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(FlightClient::new(config)?, config))
    }

    pub fn with_client(client: FlightClient, config: &Config) -> Self {
        Self {
            client,
            locale: config.display.locale,
            max_records: config.api.max_records,
        }
    }

    pub fn client(&self) -> &FlightClient {
        &self.client
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Flights landing at `airport`, latest scheduled arrival first.
    pub async fn arrivals(&self, airport: &AirportCode) -> Result<Vec<FlightRecord>> {
        self.fids(Direction::Arrival, airport).await
    }

    /// Flights leaving `airport`, latest scheduled departure first.
    pub async fn departures(&self, airport: &AirportCode) -> Result<Vec<FlightRecord>> {
        self.fids(Direction::Departure, airport).await
    }

    /// Departures then arrivals at `airport` operated by `airline`.
    ///
    /// The feed has no combined endpoint, so both boards are fetched and
    /// filtered here. A flight present on both boards appears twice.
    pub async fn airline_flights(
        &self,
        airport: &AirportCode,
        airline: &AirlineCode,
    ) -> Result<Vec<FlightRecord>> {
        let departures = self.departures(airport).await?;
        let arrivals = self.arrivals(airport).await?;

        let operated_by =
            |record: &FlightRecord| record.airline_id().as_deref() == Some(airline.as_str());
        let flights: Vec<FlightRecord> = departures
            .into_iter()
            .filter(operated_by)
            .chain(arrivals.into_iter().filter(operated_by))
            .collect();

        tracing::debug!("{} flights for {} at {}", flights.len(), airline, airport);
        Ok(flights)
    }

    /// International periodic schedule for `airport`, with decoded weekdays.
    pub async fn schedule(&self, airport: &AirportCode) -> Result<Vec<FlightRecord>> {
        let url = self.query_url(
            &format!("Schedule/International/Airport/{}", airport),
            &[],
        )?;
        let mut records = normalize_records(self.client.fetch_json(url).await?);

        for record in &mut records {
            let mask = match record.fields().get("ServiceDays") {
                Some(Value::String(mask)) => Some(mask.as_str()),
                _ => None,
            };
            let text = decode_day_mask(mask, self.locale);
            record.insert(WEEKDAYS_FIELD, Value::String(text));
        }
        Ok(records)
    }

    /// Seat inventory for one flight.
    pub async fn seat_availability(&self, flight: &FlightNumber) -> Result<Vec<SeatRecord>> {
        let url = self.query_url(&format!("SeatAvailability/Flight/{}", flight), &[])?;
        Ok(normalize_records(self.client.fetch_json(url).await?))
    }

    /// Records for a polling board.
    pub async fn board(&self, board: Board, airport: &AirportCode) -> Result<Vec<FlightRecord>> {
        match board {
            Board::Arrivals => self.arrivals(airport).await,
            Board::Departures => self.departures(airport).await,
            Board::Schedule => self.schedule(airport).await,
        }
    }

    async fn fids(&self, direction: Direction, airport: &AirportCode) -> Result<Vec<FlightRecord>> {
        let (field, order) = match direction {
            Direction::Arrival => ("ArrivalAirportID", "ScheduleArrivalTime desc"),
            Direction::Departure => ("DepartureAirportID", "ScheduleDepartureTime desc"),
        };
        let filter = format!("{} eq {}", field, odata_literal(airport.as_str()));
        let url = self.query_url("FIDS/Flight", &[("$filter", &filter), ("$orderby", order)])?;

        let records = normalize_records(self.client.fetch_json(url).await?);
        tracing::debug!("{} {} records for {}", records.len(), direction.as_str(), airport);
        Ok(records)
    }

    /// `path` under the base URL with `$format=JSON`, `params`, and `$top` if configured.
    fn query_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.client.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("$format", "JSON");
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(top) = self.max_records {
                query.append_pair("$top", &top.to_string());
            }
        }
        Ok(url)
    }
}

/// Quote a string for an OData `$filter` expression.
fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
