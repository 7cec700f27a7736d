use crate::core::price::{PriceQuote, PriceSource};
use crate::providers::util::{FETCH_ATTEMPTS, FETCH_RETRY_DELAY, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Days of history requested per snapshot. Wide enough that a weekend or
/// public holiday still contains the latest trading day.
const FETCH_WINDOW_DAYS: i64 = 5;

/// Fund price provider backed by the TEFAS fund-history endpoint.
///
/// TEFAS publishes one price per fund per trading day. The provider fetches a
/// short trailing window and keeps only the rows dated at the newest date in
/// the payload, so callers always see the most recent available snapshot.
pub struct TefasProvider {
    base_url: String,
    client: reqwest::Client,
}

impl TefasProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fonfolio/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(TefasProvider {
            base_url: base_url.to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    data: Vec<HistoryRow>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "TARIH")]
    date: String,
    #[serde(rename = "FONKODU")]
    code: String,
    #[serde(rename = "FONUNVAN")]
    title: String,
    #[serde(rename = "FIYAT")]
    price: f64,
}

impl HistoryRow {
    // TARIH is an epoch-milliseconds string.
    fn date_millis(&self) -> Option<i64> {
        self.date.trim().parse::<i64>().ok()
    }
}

#[async_trait]
impl PriceSource for TefasProvider {
    async fn fetch_prices(&self, codes: &[String]) -> Result<HashMap<String, PriceQuote>> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/api/DB/BindHistoryInfo", self.base_url);
        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(FETCH_WINDOW_DAYS);
        let form = [
            ("fontip", "YAT".to_string()),
            ("bastarih", start.format("%d.%m.%Y").to_string()),
            ("bittarih", end.format("%d.%m.%Y").to_string()),
        ];
        debug!("Requesting fund history from {}", url);

        let response = with_retry(
            || async { self.client.post(&url).form(&form).send().await },
            FETCH_ATTEMPTS,
            FETCH_RETRY_DELAY,
        )
        .await
        .context("Failed to send TEFAS fund history request")?;

        let response_text = response
            .text()
            .await
            .context("Failed to read TEFAS response body")?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response from TEFAS"));
        }

        let history: HistoryResponse = serde_json::from_str(&response_text).with_context(|| {
            format!("Failed to parse TEFAS response. Response: '{response_text}'")
        })?;

        // Latest date present in the payload; rows from earlier trading days
        // are superseded.
        let latest = history
            .data
            .iter()
            .filter_map(HistoryRow::date_millis)
            .max();
        let latest = match latest {
            Some(millis) => millis,
            None => {
                debug!("TEFAS response contained no dated rows");
                return Ok(HashMap::new());
            }
        };

        let mut quotes = HashMap::new();
        for row in &history.data {
            if row.date_millis() != Some(latest) {
                continue;
            }
            let code = row.code.to_uppercase();
            if codes.contains(&code) {
                quotes.insert(
                    code,
                    PriceQuote {
                        price: row.price,
                        title: row.title.clone(),
                    },
                );
            }
        }

        debug!(
            "Resolved {} of {} requested codes at date {}",
            quotes.len(),
            codes.len(),
            latest
        );
        Ok(quotes)
    }
}
