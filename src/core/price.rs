//! Price snapshot abstractions.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Latest known quote for one fund.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub title: String,
}

/// A source of current fund prices. Implementations may return a partial
/// mapping; codes they do not know are simply absent.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self, codes: &[String]) -> Result<HashMap<String, PriceQuote>>;
}

/// Snapshot handed to the valuation pipeline. `degraded` records that the
/// source failed wholesale and the quotes map is empty because of it.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    pub quotes: HashMap<String, PriceQuote>,
    pub degraded: bool,
}

/// Queries the source once for the given codes. A source failure is absorbed
/// here: the valuation still runs, with every affected position valued at the
/// zero fallback.
pub async fn resolve_prices(source: &dyn PriceSource, codes: &[String]) -> PriceSnapshot {
    if codes.is_empty() {
        return PriceSnapshot::default();
    }
    match source.fetch_prices(codes).await {
        Ok(quotes) => PriceSnapshot {
            quotes,
            degraded: false,
        },
        Err(e) => {
            warn!(error = %e, "Price fetch failed, valuing positions at zero");
            PriceSnapshot {
                quotes: HashMap::new(),
                degraded: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingSource;

    #[async_trait]
    impl PriceSource for FailingSource {
        async fn fetch_prices(&self, _codes: &[String]) -> Result<HashMap<String, PriceQuote>> {
            Err(anyhow!("connection refused"))
        }
    }

    struct FixedSource(HashMap<String, PriceQuote>);

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch_prices(&self, _codes: &[String]) -> Result<HashMap<String, PriceQuote>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn source_failure_degrades_to_empty_snapshot() {
        let snapshot = resolve_prices(&FailingSource, &["AFT".to_string()]).await;
        assert!(snapshot.degraded);
        assert!(snapshot.quotes.is_empty());
    }

    #[tokio::test]
    async fn successful_fetch_is_not_degraded() {
        let mut quotes = HashMap::new();
        quotes.insert(
            "AFT".to_string(),
            PriceQuote {
                price: 3.0,
                title: "Fund X".to_string(),
            },
        );
        let snapshot = resolve_prices(&FixedSource(quotes), &["AFT".to_string()]).await;
        assert!(!snapshot.degraded);
        assert_eq!(snapshot.quotes.len(), 1);
    }

    #[tokio::test]
    async fn empty_code_set_skips_the_source() {
        // FailingSource would error if called; an empty ledger must not call it.
        let snapshot = resolve_prices(&FailingSource, &[]).await;
        assert!(!snapshot.degraded);
        assert!(snapshot.quotes.is_empty());
    }
}
