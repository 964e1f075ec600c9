use crate::error::NormalizeError;
use crate::models::{NormalizedTransfer, RawTransfer};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Decimal places of the native currency (wei -> BNB / ETH).
pub const NATIVE_DECIMALS: u32 = 18;

/// Significant digits and maximum scale of a `Decimal`.
const MAX_DECIMAL_DIGITS: u32 = 28;

/// Normalize a time-ordered batch of raw transfers for `address`.
///
/// Order is preserved. Transfers below `min_amount` are dropped; a transfer
/// exactly at the threshold is kept. A record with a malformed numeric field
/// is logged and skipped so that one corrupt row does not void the batch.
pub fn normalize(raw: &[RawTransfer], address: &str, min_amount: Decimal) -> Vec<NormalizedTransfer> {
    let mut transfers = Vec::with_capacity(raw.len());
    let mut below_min = 0usize;
    let mut skipped = 0usize;

    for tx in raw {
        match normalize_transfer(tx, address, min_amount) {
            Ok(Some(t)) => transfers.push(t),
            Ok(None) => below_min += 1,
            Err(err) => {
                warn!("skipping malformed transfer: {err}");
                skipped += 1;
            }
        }
    }

    debug!(
        "normalized {} transfers: {} kept, {} below minimum, {} malformed",
        raw.len(),
        transfers.len(),
        below_min,
        skipped
    );

    transfers
}

/// Parse one raw transfer. `Ok(None)` means it parsed fine but is below `min_amount`.
pub fn normalize_transfer(
    raw: &RawTransfer,
    address: &str,
    min_amount: Decimal,
) -> Result<Option<NormalizedTransfer>, NormalizeError> {
    let value = parse_digits(raw, "value", &raw.value)?;
    let decimals = parse_uint(raw, "tokenDecimal", &raw.token_decimal)?;
    let decimals = u32::try_from(decimals).map_err(|_| NormalizeError::AmountOutOfRange {
        hash: raw.hash.clone(),
        field: "tokenDecimal",
    })?;
    let amount = scaled_decimal(raw, "value", value, decimals)?;

    if amount < min_amount {
        return Ok(None);
    }

    let gas_used = parse_uint(raw, "gasUsed", &raw.gas_used)?;
    let gas_price = parse_uint(raw, "gasPrice", &raw.gas_price)?;
    let fee_wei = gas_used
        .checked_mul(gas_price)
        .ok_or_else(|| NormalizeError::AmountOutOfRange {
            hash: raw.hash.clone(),
            field: "gasUsed * gasPrice",
        })?;
    let fee_native = scaled_decimal(raw, "gasUsed * gasPrice", &fee_wei.to_string(), NATIVE_DECIMALS)?;

    let timestamp = parse_timestamp(raw)?;

    Ok(Some(NormalizedTransfer {
        hash: raw.hash.clone(),
        from: raw.from.clone(),
        to: raw.to.clone(),
        amount,
        is_income: raw.to.eq_ignore_ascii_case(address),
        fee_native,
        timestamp,
    }))
}

fn parse_uint(raw: &RawTransfer, field: &'static str, value: &str) -> Result<u128, NormalizeError> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|_| NormalizeError::InvalidInteger {
            hash: raw.hash.clone(),
            field,
            value: value.to_string(),
        })
}

/// An unsigned integer of any length, without leading zeros ("0" for zero).
fn parse_digits<'a>(raw: &RawTransfer, field: &'static str, value: &'a str) -> Result<&'a str, NormalizeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::InvalidInteger {
            hash: raw.hash.clone(),
            field,
            value: value.to_string(),
        });
    }

    let significant = trimmed.trim_start_matches('0');
    Ok(if significant.is_empty() { "0" } else { significant })
}

/// `digits / 10^scale` as a decimal.
///
/// Fractional digits past what a `Decimal` holds (28 significant digits, scale
/// at most 28) are rounded half-up. Integer digits are never dropped, so only
/// amounts above `Decimal::MAX` are out of range.
fn scaled_decimal(
    raw: &RawTransfer,
    field: &'static str,
    digits: &str,
    scale: u32,
) -> Result<Decimal, NormalizeError> {
    let out_of_range = || NormalizeError::AmountOutOfRange {
        hash: raw.hash.clone(),
        field,
    };

    let len = u32::try_from(digits.len()).map_err(|_| out_of_range())?;
    let dropped = len
        .saturating_sub(MAX_DECIMAL_DIGITS)
        .max(scale.saturating_sub(MAX_DECIMAL_DIGITS))
        .min(scale);

    let (kept, round_digit) = if dropped == 0 {
        (digits, b'0')
    } else if dropped < len {
        let split = (len - dropped) as usize;
        (&digits[..split], digits.as_bytes()[split])
    } else if dropped == len {
        ("", digits.as_bytes()[0])
    } else {
        ("", b'0')
    };

    let mut mantissa = if kept.is_empty() {
        0
    } else {
        kept.parse::<i128>().map_err(|_| out_of_range())?
    };
    if round_digit >= b'5' {
        mantissa = mantissa.checked_add(1).ok_or_else(out_of_range)?;
    }

    Decimal::try_from_i128_with_scale(mantissa, scale - dropped)
        .map(|d| d.normalize())
        .map_err(|_| out_of_range())
}

fn parse_timestamp(raw: &RawTransfer) -> Result<DateTime<Utc>, NormalizeError> {
    let secs = raw
        .time_stamp
        .trim()
        .parse::<i64>()
        .map_err(|_| NormalizeError::InvalidInteger {
            hash: raw.hash.clone(),
            field: "timeStamp",
            value: raw.time_stamp.clone(),
        })?;

    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| NormalizeError::InvalidTimestamp {
            hash: raw.hash.clone(),
            value: secs,
        })
}
