//! Price-fetch proxy to the upstream rate API
//!
//! A thin pass-through: validate the stay parameters, template the upstream
//! URL for the requested hotel, fetch, and trim the upstream payload down to
//! the quote fields the comparison UI needs. Upstream credentials (per-hotel
//! tokens) never reach the browser.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::RatesConfig;

/// Permitted guest counts for a quote request
const MIN_ADULTS: u8 = 1;
const MAX_ADULTS: u8 = 8;

/// Rate proxy failures
#[derive(Debug, Error)]
pub enum RateError {
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("unknown hotel: {0}")]
    UnknownHotel(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Validated stay parameters for one quote request
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery {
    pub hotel: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u8,
}

impl RateQuery {
    /// Parse and validate raw query parameters
    pub fn parse(
        hotel: &str,
        checkin: &str,
        checkout: &str,
        adults: Option<u8>,
    ) -> Result<Self, RateError> {
        if hotel.is_empty() {
            return Err(RateError::Invalid("missing hotel".to_string()));
        }

        let checkin = parse_date("checkin", checkin)?;
        let checkout = parse_date("checkout", checkout)?;
        if checkout <= checkin {
            return Err(RateError::Invalid(
                "checkout must be after checkin".to_string(),
            ));
        }

        let adults = adults.unwrap_or(2);
        if !(MIN_ADULTS..=MAX_ADULTS).contains(&adults) {
            return Err(RateError::Invalid(format!(
                "adults must be between {} and {}",
                MIN_ADULTS, MAX_ADULTS
            )));
        }

        Ok(Self {
            hotel: hotel.to_string(),
            checkin,
            checkout,
            adults,
        })
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, RateError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RateError::Invalid(format!("{} must be a YYYY-MM-DD date", name)))
}

/// One comparable room offer from the upstream API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub provider: String,
    pub room: String,
    pub rate: f64,
    pub currency: String,
    pub link: String,
}

/// Upstream rate API client
pub struct RateClient {
    http: reqwest::Client,
    config: RatesConfig,
}

impl RateClient {
    pub fn new(config: &RatesConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Fetch quotes for a validated query.
    ///
    /// With `debug` set, the raw upstream payload is logged before trimming.
    pub async fn fetch(&self, query: &RateQuery, debug: bool) -> Result<Vec<RateQuote>, RateError> {
        let token = self
            .config
            .hotels
            .get(&query.hotel)
            .ok_or_else(|| RateError::UnknownHotel(query.hotel.clone()))?;

        let url = self.upstream_url(token, query);
        let payload: Value = self.http.get(&url).send().await?.error_for_status()?.json().await?;

        if debug {
            tracing::debug!("Raw upstream payload for {}: {}", query.hotel, payload);
        }

        Ok(parse_quotes(&payload))
    }

    /// Fill the configured URL template, percent-encoding every value
    fn upstream_url(&self, token: &str, query: &RateQuery) -> String {
        let encode = |v: &str| utf8_percent_encode(v, NON_ALPHANUMERIC).to_string();
        self.config
            .endpoint
            .replace("{token}", &encode(token))
            .replace("{checkin}", &encode(&query.checkin.to_string()))
            .replace("{checkout}", &encode(&query.checkout.to_string()))
            .replace("{adults}", &query.adults.to_string())
    }
}

/// Trim the upstream payload to a quote list.
///
/// The upstream response nests offers under `prices`; individual offers are
/// as lax as the rest of the ecosystem, so every field read tolerates
/// absence. Offers without a numeric rate are dropped.
fn parse_quotes(payload: &Value) -> Vec<RateQuote> {
    let Some(prices) = payload.get("prices").and_then(Value::as_array) else {
        return Vec::new();
    };

    prices
        .iter()
        .filter_map(|offer| {
            let rate = offer
                .get("rate")
                .or_else(|| offer.get("nightly"))
                .and_then(Value::as_f64)?;
            Some(RateQuote {
                provider: lax_str(offer, &["provider", "source"]),
                room: lax_str(offer, &["room", "room_type"]),
                rate,
                currency: lax_str(offer, &["currency"]),
                link: lax_str(offer, &["link", "url"]),
            })
        })
        .collect()
}

fn lax_str(value: &Value, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .unwrap_or("")
        .to_string()
}
