use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One token transfer event as returned by the explorer's `tokentx` action.
/// Numeric fields stay string-encoded until the normalizer parses them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub token_decimal: String,
    pub gas_used: String,
    pub gas_price: String,
    pub time_stamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// `value / 10^tokenDecimal`
    pub amount: Decimal,
    pub is_income: bool,
    /// `gasUsed * gasPrice / 10^18`, in the chain's native currency.
    pub fee_native: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub out_tx: NormalizedTransfer,
    pub in_tx: NormalizedTransfer,
    pub fee: Decimal,
    pub amount_diff: Decimal,
    pub time_diff_minutes: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub pairs: Vec<MatchedPair>,
    pub total_fee_native: Decimal,
    pub total_amount_diff: Decimal,
}

impl MatchReport {
    /// Totals are always derived from the pair list, so they reconcile exactly.
    pub fn from_pairs(pairs: Vec<MatchedPair>) -> Self {
        let total_fee_native = pairs.iter().map(|p| p.fee).sum();
        let total_amount_diff = pairs.iter().map(|p| p.amount_diff).sum();
        Self {
            pairs,
            total_fee_native,
            total_amount_diff,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MatchThresholds {
    pub max_amount_diff: Decimal,
    pub max_minutes: Decimal,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            max_amount_diff: Decimal::from(100),
            max_minutes: Decimal::from(30),
        }
    }
}

/// Tunables for one analysis run. Defaults: 50 / 100 / 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnalysisParams {
    pub min_amount: Decimal,
    #[serde(flatten)]
    pub thresholds: MatchThresholds,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            min_amount: Decimal::from(50),
            thresholds: MatchThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransferView {
    pub hash: String,
    pub datetime: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gas_fee_bnb: Decimal,
}

impl From<&NormalizedTransfer> for TransferView {
    fn from(t: &NormalizedTransfer) -> Self {
        Self {
            hash: t.hash.clone(),
            datetime: t
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            amount: t.amount,
            gas_fee_bnb: t.fee_native,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairView {
    pub out_tx: TransferView,
    pub in_tx: TransferView,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_diff: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub time_diff_minutes: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
}

impl From<&MatchedPair> for PairView {
    fn from(p: &MatchedPair) -> Self {
        Self {
            out_tx: TransferView::from(&p.out_tx),
            in_tx: TransferView::from(&p.in_tx),
            amount_diff: p.amount_diff,
            time_diff_minutes: p.time_diff_minutes,
            fee: p.fee,
        }
    }
}

/// JSON body returned for a completed analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisResponse {
    pub address: String,
    pub start_date: String,
    pub end_date: String,
    pub total_matched_pairs: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fee_bnb: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_diff_usdt: Decimal,
    pub matched_pairs: Vec<PairView>,
}

impl AnalysisResponse {
    pub fn from_report(address: &str, start_date: &str, end_date: &str, report: &MatchReport) -> Self {
        Self {
            address: address.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            total_matched_pairs: report.pairs.len(),
            total_fee_bnb: report.total_fee_native,
            total_diff_usdt: report.total_amount_diff,
            matched_pairs: report.pairs.iter().map(PairView::from).collect(),
        }
    }
}
