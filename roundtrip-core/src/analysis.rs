// Drives one analysis: date range -> blocks -> transfers -> normalize -> match.

use crate::error::AnalysisError;
use crate::matcher::find_matched_pairs;
use crate::models::AnalysisResponse;
use crate::normalizer::normalize;
use crate::request::{AnalysisRequest, DATE_FORMAT};
use crate::source::{Closest, TransferSource};
use tracing::info;

pub const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found in the specified time range";
pub const NO_QUALIFYING_MESSAGE: &str = "No transactions meet the minimum amount criteria";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The explorer returned no transfers for the range.
    NoTransactions,
    /// Every transfer was below the minimum amount or malformed.
    NoQualifying,
    Report(AnalysisResponse),
}

impl AnalysisOutcome {
    /// Human-readable reason for an empty outcome.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AnalysisOutcome::NoTransactions => Some(NO_TRANSACTIONS_MESSAGE),
            AnalysisOutcome::NoQualifying => Some(NO_QUALIFYING_MESSAGE),
            AnalysisOutcome::Report(_) => None,
        }
    }
}

pub async fn analyze(
    source: &dyn TransferSource,
    request: &AnalysisRequest,
) -> Result<AnalysisOutcome, AnalysisError> {
    let (start_ts, end_ts) = request.time_range();

    let start_block = source
        .resolve_block_at_time(start_ts, Closest::Before)
        .await
        .map_err(AnalysisError::BlockLookup)?;
    let end_block = source
        .resolve_block_at_time(end_ts, Closest::Before)
        .await
        .map_err(AnalysisError::BlockLookup)?;

    let raw = source
        .list_token_transfers(&request.address, start_block, end_block)
        .await
        .map_err(AnalysisError::TransferListing)?;

    info!(
        "analyzing {} over blocks {}..={}: {} transfers",
        request.address,
        start_block,
        end_block,
        raw.len()
    );

    if raw.is_empty() {
        return Ok(AnalysisOutcome::NoTransactions);
    }

    let transfers = normalize(&raw, &request.address, request.params.min_amount);
    if transfers.is_empty() {
        return Ok(AnalysisOutcome::NoQualifying);
    }

    let report = find_matched_pairs(&transfers, &request.params.thresholds);

    info!(
        "{}: {} qualifying transfers, {} matched pairs, fee {} native, diff {}",
        request.address,
        transfers.len(),
        report.pairs.len(),
        report.total_fee_native,
        report.total_amount_diff
    );

    Ok(AnalysisOutcome::Report(AnalysisResponse::from_report(
        &request.address,
        &request.start_date.format(DATE_FORMAT).to_string(),
        &request.end_date.format(DATE_FORMAT).to_string(),
        &report,
    )))
}
