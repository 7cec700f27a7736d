//! Weighted-average-cost valuation over a buy ledger.
//!
//! The whole pipeline is pure: `valuate` turns raw ledger records plus a price
//! snapshot into a [`PortfolioReport`] with no I/O and no shared state, so two
//! calls with the same inputs produce identical reports.

use std::collections::HashMap;

use crate::core::ledger::RawRecord;
use crate::core::price::PriceQuote;

/// A validated buy transaction. Codes are uppercased and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub code: String,
    pub quantity: f64,
    pub price: f64,
}

/// Why a raw record was dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCode,
    BadQuantity,
    BadPrice,
}

/// Outcome of normalizing one raw record. Skips are data-quality events, not
/// errors; callers that only need the survivors use [`valid_transactions`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Valid(Transaction),
    Skipped(SkipReason),
}

/// Per-fund aggregate produced by [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FundAggregate {
    pub code: String,
    pub total_qty: f64,
    pub total_cost: f64,
}

/// One valued position in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct FundPosition {
    pub code: String,
    pub title: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub total_cost: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub positions: Vec<FundPosition>,
    pub total_value: f64,
    pub total_invested: f64,
    pub net_profit: f64,
    pub net_profit_pct: f64,
}

impl PortfolioReport {
    /// Parallel label/value series for charting, in position order.
    pub fn chart_series(&self) -> (Vec<String>, Vec<f64>) {
        let labels = self.positions.iter().map(|p| p.code.clone()).collect();
        let values = self.positions.iter().map(|p| p.current_value).collect();
        (labels, values)
    }
}

/// Validates raw ledger records. A record with an empty code or a quantity or
/// price that does not parse as a number is skipped, never failed.
pub fn normalize(records: &[RawRecord]) -> Vec<RecordOutcome> {
    records
        .iter()
        .map(|record| {
            let code = match record.code.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => code.to_uppercase(),
                _ => return RecordOutcome::Skipped(SkipReason::MissingCode),
            };
            let quantity = match parse_number(record.quantity.as_deref()) {
                Some(q) => q,
                None => return RecordOutcome::Skipped(SkipReason::BadQuantity),
            };
            let price = match parse_number(record.price.as_deref()) {
                Some(p) => p,
                None => return RecordOutcome::Skipped(SkipReason::BadPrice),
            };
            RecordOutcome::Valid(Transaction {
                code,
                quantity,
                price,
            })
        })
        .collect()
}

/// Collects the transactions that survived normalization.
pub fn valid_transactions(outcomes: Vec<RecordOutcome>) -> Vec<Transaction> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            RecordOutcome::Valid(t) => Some(t),
            RecordOutcome::Skipped(_) => None,
        })
        .collect()
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Groups transactions by fund code, accumulating quantity and cost.
///
/// Accumulation is signed and order-independent. Aggregates are returned in
/// first-seen-code order so reports are reproducible for a given ledger. A
/// code whose accumulated quantity is exactly zero is dropped (fully
/// divested, no position to value).
pub fn aggregate(transactions: &[Transaction]) -> Vec<FundAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (f64, f64)> = HashMap::new();

    for t in transactions {
        let entry = totals.entry(t.code.clone()).or_insert_with(|| {
            order.push(t.code.clone());
            (0.0, 0.0)
        });
        entry.0 += t.quantity;
        entry.1 += t.quantity * t.price;
    }

    order
        .into_iter()
        .filter_map(|code| {
            let (total_qty, total_cost) = totals[&code];
            if total_qty == 0.0 {
                return None;
            }
            Some(FundAggregate {
                code,
                total_qty,
                total_cost,
            })
        })
        .collect()
}

/// Builds the report from aggregates and a price snapshot.
///
/// A code without a quote gets the zero fallback: price 0.0, title equal to
/// the code. Percentages are 0 whenever the cost base is not positive.
pub fn finalize(aggregates: &[FundAggregate], quotes: &HashMap<String, PriceQuote>) -> PortfolioReport {
    let mut positions = Vec::with_capacity(aggregates.len());
    let mut total_value = 0.0;
    let mut total_invested = 0.0;

    for agg in aggregates {
        let avg_cost = agg.total_cost / agg.total_qty;
        let (current_price, title) = match quotes.get(&agg.code) {
            Some(quote) => (quote.price, quote.title.clone()),
            None => (0.0, agg.code.clone()),
        };

        let current_value = agg.total_qty * current_price;
        let profit_loss = current_value - agg.total_cost;
        let profit_loss_pct = if agg.total_cost > 0.0 {
            profit_loss / agg.total_cost * 100.0
        } else {
            0.0
        };

        total_value += current_value;
        total_invested += agg.total_cost;

        positions.push(FundPosition {
            code: agg.code.clone(),
            title,
            quantity: agg.total_qty,
            avg_cost,
            current_price,
            total_cost: agg.total_cost,
            current_value,
            profit_loss,
            profit_loss_pct,
        });
    }

    let net_profit = total_value - total_invested;
    let net_profit_pct = if total_invested > 0.0 {
        net_profit / total_invested * 100.0
    } else {
        0.0
    };

    PortfolioReport {
        positions,
        total_value,
        total_invested,
        net_profit,
        net_profit_pct,
    }
}

/// Full pipeline: normalize, aggregate, value against the snapshot.
pub fn valuate(records: &[RawRecord], quotes: &HashMap<String, PriceQuote>) -> PortfolioReport {
    let transactions = valid_transactions(normalize(records));
    finalize(&aggregate(&transactions), quotes)
}

/// Distinct uppercased fund codes present in the records, first-seen order.
/// This is the exact set the price source should be queried for. Only
/// records that survive normalization contribute a code: a row with a valid
/// code but an unparsable quantity or price can never become a position, so
/// its code is deliberately not queried.
pub fn distinct_codes(records: &[RawRecord]) -> Vec<String> {
    let mut codes = Vec::new();
    for outcome in normalize(records) {
        if let RecordOutcome::Valid(t) = outcome {
            if !codes.contains(&t.code) {
                codes.push(t.code);
            }
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, quantity: &str, price: &str) -> RawRecord {
        RawRecord {
            code: Some(code.to_string()),
            date: Some("2024-01-02".to_string()),
            quantity: Some(quantity.to_string()),
            price: Some(price.to_string()),
        }
    }

    fn quote(price: f64, title: &str) -> PriceQuote {
        PriceQuote {
            price,
            title: title.to_string(),
        }
    }

    #[test]
    fn normalize_uppercases_and_parses() {
        let outcomes = normalize(&[record("aft", "1000", "2.50")]);
        assert_eq!(
            outcomes,
            vec![RecordOutcome::Valid(Transaction {
                code: "AFT".to_string(),
                quantity: 1000.0,
                price: 2.5,
            })]
        );
    }

    #[test]
    fn normalize_skips_bad_records() {
        let records = vec![
            record("", "10", "1"),
            record("AFT", "abc", "1"),
            record("AFT", "10", ""),
            RawRecord {
                code: None,
                date: None,
                quantity: None,
                price: None,
            },
        ];
        let outcomes = normalize(&records);
        assert_eq!(
            outcomes,
            vec![
                RecordOutcome::Skipped(SkipReason::MissingCode),
                RecordOutcome::Skipped(SkipReason::BadQuantity),
                RecordOutcome::Skipped(SkipReason::BadPrice),
                RecordOutcome::Skipped(SkipReason::MissingCode),
            ]
        );
        assert!(valid_transactions(outcomes).is_empty());
    }

    #[test]
    fn aggregate_is_order_independent() {
        let forward = vec![
            Transaction {
                code: "AFT".into(),
                quantity: 1000.0,
                price: 2.0,
            },
            Transaction {
                code: "AFT".into(),
                quantity: 500.0,
                price: 4.0,
            },
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(&forward);
        let b = aggregate(&reversed);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].total_qty, b[0].total_qty);
        assert_eq!(a[0].total_cost, b[0].total_cost);
        assert_eq!(a[0].total_qty, 1500.0);
        assert_eq!(a[0].total_cost, 4000.0);
        assert!((a[0].total_cost / a[0].total_qty - 2.6667).abs() < 1e-4);
    }

    #[test]
    fn aggregate_drops_fully_divested_position() {
        let transactions = vec![
            Transaction {
                code: "AFT".into(),
                quantity: 100.0,
                price: 2.0,
            },
            Transaction {
                code: "AFT".into(),
                quantity: -100.0,
                price: 3.0,
            },
            Transaction {
                code: "TTE".into(),
                quantity: 50.0,
                price: 1.0,
            },
        ];
        let aggregates = aggregate(&transactions);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].code, "TTE");
    }

    #[test]
    fn aggregate_preserves_first_seen_order() {
        let transactions = vec![
            Transaction {
                code: "ZZZ".into(),
                quantity: 1.0,
                price: 1.0,
            },
            Transaction {
                code: "AAA".into(),
                quantity: 1.0,
                price: 1.0,
            },
            Transaction {
                code: "ZZZ".into(),
                quantity: 1.0,
                price: 1.0,
            },
        ];
        let codes: Vec<_> = aggregate(&transactions)
            .into_iter()
            .map(|a| a.code)
            .collect();
        assert_eq!(codes, vec!["ZZZ", "AAA"]);
    }

    #[test]
    fn finalize_values_single_position() {
        let records = vec![record("AFT", "1000", "2.50")];
        let mut quotes = HashMap::new();
        quotes.insert("AFT".to_string(), quote(3.0, "Fund X"));

        let report = valuate(&records, &quotes);
        assert_eq!(report.positions.len(), 1);
        let p = &report.positions[0];
        assert_eq!(p.code, "AFT");
        assert_eq!(p.title, "Fund X");
        assert_eq!(p.quantity, 1000.0);
        assert_eq!(p.avg_cost, 2.5);
        assert_eq!(p.total_cost, 2500.0);
        assert_eq!(p.current_value, 3000.0);
        assert_eq!(p.profit_loss, 500.0);
        assert_eq!(p.profit_loss_pct, 20.0);
        assert_eq!(report.total_value, 3000.0);
        assert_eq!(report.total_invested, 2500.0);
        assert_eq!(report.net_profit, 500.0);
        assert_eq!(report.net_profit_pct, 20.0);
    }

    #[test]
    fn finalize_missing_quote_degrades_to_zero() {
        let records = vec![record("AFT", "1000", "2.50")];
        let report = valuate(&records, &HashMap::new());
        let p = &report.positions[0];
        assert_eq!(p.current_price, 0.0);
        assert_eq!(p.title, "AFT");
        assert_eq!(p.current_value, 0.0);
        assert_eq!(p.profit_loss, -2500.0);
        assert_eq!(p.profit_loss_pct, -100.0);
    }

    #[test]
    fn percentages_guard_zero_cost_base() {
        // Zero-price buys leave a position with a zero cost base.
        let records = vec![record("AFT", "1000", "0")];
        let mut quotes = HashMap::new();
        quotes.insert("AFT".to_string(), quote(1.0, "Fund X"));

        let report = valuate(&records, &quotes);
        let p = &report.positions[0];
        assert_eq!(p.total_cost, 0.0);
        assert_eq!(p.profit_loss_pct, 0.0);
        assert_eq!(report.net_profit_pct, 0.0);
        assert!(p.profit_loss_pct.is_finite());
    }

    #[test]
    fn empty_ledger_yields_empty_report() {
        let report = valuate(&[], &HashMap::new());
        assert!(report.positions.is_empty());
        assert_eq!(report.total_value, 0.0);
        assert_eq!(report.total_invested, 0.0);
        assert_eq!(report.net_profit, 0.0);
        assert_eq!(report.net_profit_pct, 0.0);
    }

    #[test]
    fn valuate_is_idempotent() {
        let records = vec![
            record("AFT", "1000", "2.00"),
            record("aft", "500", "4.00"),
            record("TTE", "200", "10.0"),
        ];
        let mut quotes = HashMap::new();
        quotes.insert("AFT".to_string(), quote(3.0, "Fund X"));
        quotes.insert("TTE".to_string(), quote(9.5, "Fund Y"));

        let first = valuate(&records, &quotes);
        let second = valuate(&records, &quotes);
        assert_eq!(first, second);
    }

    #[test]
    fn chart_series_matches_position_order() {
        let records = vec![record("AFT", "10", "1.0"), record("TTE", "20", "2.0")];
        let mut quotes = HashMap::new();
        quotes.insert("AFT".to_string(), quote(2.0, "Fund X"));
        quotes.insert("TTE".to_string(), quote(3.0, "Fund Y"));

        let report = valuate(&records, &quotes);
        let (labels, values) = report.chart_series();
        assert_eq!(labels, vec!["AFT", "TTE"]);
        assert_eq!(values, vec![20.0, 60.0]);
    }

    #[test]
    fn distinct_codes_dedupes_and_uppercases() {
        let records = vec![
            record("aft", "1", "1"),
            record("AFT", "1", "1"),
            record("tte", "1", "1"),
            record("", "1", "1"),
        ];
        assert_eq!(distinct_codes(&records), vec!["AFT", "TTE"]);
    }

    #[test]
    fn distinct_codes_ignores_rows_that_cannot_become_positions() {
        let records = vec![
            record("AFT", "abc", "1"),
            record("AFT", "1", ""),
            record("TTE", "1", "1"),
        ];
        assert_eq!(distinct_codes(&records), vec!["TTE"]);
    }
}
