use crate::error::AnalysisError;
use crate::models::{AnalysisParams, MatchThresholds};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const SECONDS_PER_DAY: i64 = 86_400;

/// Untyped request parameters, as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    pub address: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_diff: Option<String>,
    pub max_minutes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub address: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub params: AnalysisParams,
}

impl AnalysisRequest {
    pub fn parse(query: RawQuery, defaults: &AnalysisParams) -> Result<Self, AnalysisError> {
        let (Some(address), Some(start), Some(end)) = (
            non_blank(query.address),
            non_blank(query.start_date),
            non_blank(query.end_date),
        ) else {
            return Err(AnalysisError::MissingParameters);
        };

        let start_date = parse_date(&start)?;
        let end_date = parse_date(&end)?;

        let params = AnalysisParams {
            min_amount: parse_decimal("min_amount", query.min_amount, defaults.min_amount)?,
            thresholds: MatchThresholds {
                max_amount_diff: parse_decimal(
                    "max_diff",
                    query.max_diff,
                    defaults.thresholds.max_amount_diff,
                )?,
                max_minutes: parse_decimal(
                    "max_minutes",
                    query.max_minutes,
                    defaults.thresholds.max_minutes,
                )?,
            },
        };

        Self::new(address, start_date, end_date, params)
    }

    pub fn new(
        address: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        params: AnalysisParams,
    ) -> Result<Self, AnalysisError> {
        if end_date < start_date {
            return Err(AnalysisError::InvalidDateRange);
        }

        Ok(Self {
            address,
            start_date,
            end_date,
            params,
        })
    }

    /// Unix seconds for `start_date 00:00:00` and `end_date 23:59:59`, both UTC,
    /// so the whole end day is included.
    pub fn time_range(&self) -> (i64, i64) {
        let day_start = |d: NaiveDate| Utc.from_utc_datetime(&d.and_time(NaiveTime::default())).timestamp();
        (day_start(self.start_date), day_start(self.end_date) + SECONDS_PER_DAY - 1)
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| AnalysisError::InvalidDate)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_decimal(name: &'static str, value: Option<String>, default: Decimal) -> Result<Decimal, AnalysisError> {
    let Some(raw) = non_blank(value) else {
        return Ok(default);
    };

    let invalid = || AnalysisError::InvalidNumber {
        name,
        value: raw.clone(),
    };

    // Accept plain and scientific notation ("50", "1e2").
    let parsed = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| invalid())?;

    if parsed.is_sign_negative() {
        return Err(invalid());
    }
    Ok(parsed)
}
