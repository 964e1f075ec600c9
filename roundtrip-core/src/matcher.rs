// Greedy out -> in pair matching over a time-ordered transfer sequence.

use crate::models::{MatchReport, MatchThresholds, MatchedPair, NormalizedTransfer};
use rust_decimal::Decimal;

const SECONDS_PER_MINUTE: i64 = 60;

/// Scan `transfers` left to right and pair each outgoing transfer with the
/// incoming transfer directly after it when both thresholds hold.
///
/// A matched pair consumes both elements and the cursor moves by two. On a
/// miss only the first element is dropped, so the second one can still open
/// the next candidate pair. This is a single greedy pass: an outgoing
/// transfer that fails against its neighbour is never reconsidered against a
/// later one, even if that would have produced a match.
pub fn find_matched_pairs(transfers: &[NormalizedTransfer], thresholds: &MatchThresholds) -> MatchReport {
    let mut pairs = Vec::new();
    let mut i = 0;

    while i + 1 < transfers.len() {
        match try_pair(&transfers[i], &transfers[i + 1], thresholds) {
            Some(pair) => {
                pairs.push(pair);
                i += 2;
            }
            None => i += 1,
        }
    }

    MatchReport::from_pairs(pairs)
}

fn try_pair(
    out_tx: &NormalizedTransfer,
    in_tx: &NormalizedTransfer,
    thresholds: &MatchThresholds,
) -> Option<MatchedPair> {
    if out_tx.is_income || !in_tx.is_income {
        return None;
    }

    let amount_diff = (out_tx.amount - in_tx.amount).abs();
    if amount_diff > thresholds.max_amount_diff {
        return None;
    }

    // Only an upper bound: input order is trusted to be chronological.
    // Compared in minutes so that a huge `max_minutes` cannot overflow.
    let elapsed_secs = Decimal::from((in_tx.timestamp - out_tx.timestamp).num_seconds());
    let time_diff_minutes = elapsed_secs / Decimal::from(SECONDS_PER_MINUTE);
    if time_diff_minutes > thresholds.max_minutes {
        return None;
    }

    Some(MatchedPair {
        fee: out_tx.fee_native + in_tx.fee_native,
        amount_diff,
        time_diff_minutes,
        out_tx: out_tx.clone(),
        in_tx: in_tx.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;
    use std::str::FromStr;

    fn tx(hash: &str, income: bool, amount: &str, minute: i64) -> NormalizedTransfer {
        NormalizedTransfer {
            hash: hash.to_string(),
            from: "0xfrom".to_string(),
            to: "0xto".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            is_income: income,
            fee_native: Decimal::from_str("0.000105").unwrap(),
            timestamp: Utc.timestamp_opt(1_704_067_200 + minute * 60, 0).unwrap(),
        }
    }

    fn thresholds(max_amount_diff: i64, max_minutes: i64) -> MatchThresholds {
        MatchThresholds {
            max_amount_diff: Decimal::from(max_amount_diff),
            max_minutes: Decimal::from(max_minutes),
        }
    }

    #[test]
    fn test_single_round_trip() {
        let seq = vec![tx("out", false, "100", 0), tx("in", true, "100", 10)];
        let report = find_matched_pairs(&seq, &thresholds(100, 30));

        assert_eq!(report.pairs.len(), 1);
        let pair = &report.pairs[0];
        assert_eq!(pair.out_tx.hash, "out");
        assert_eq!(pair.in_tx.hash, "in");
        assert_eq!(pair.amount_diff, Decimal::ZERO);
        assert_eq!(pair.time_diff_minutes, Decimal::from(10));
        assert_eq!(pair.fee, Decimal::from_str("0.00021").unwrap());
        assert_eq!(report.total_fee_native, pair.fee);
    }

    #[test]
    fn test_amount_diff_over_threshold() {
        let seq = vec![tx("out", false, "100", 0), tx("in", true, "300", 10)];
        let report = find_matched_pairs(&seq, &thresholds(100, 30));

        assert!(report.is_empty());
        assert_eq!(report.total_fee_native, Decimal::ZERO);
        assert_eq!(report.total_amount_diff, Decimal::ZERO);
    }

    #[test]
    fn test_unmatched_out_advances_by_one() {
        let seq = vec![
            tx("out0", false, "100", 0),
            tx("out1", false, "50", 1),
            tx("in2", true, "100", 2),
        ];
        let report = find_matched_pairs(&seq, &thresholds(100, 30));

        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].out_tx.hash, "out1");
        assert_eq!(report.pairs[0].in_tx.hash, "in2");
        assert_eq!(report.total_amount_diff, Decimal::from(50));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let seq = vec![tx("out", false, "100", 0), tx("in", true, "200", 30)];
        let report = find_matched_pairs(&seq, &thresholds(100, 30));
        assert_eq!(report.pairs.len(), 1);

        let late = vec![tx("out", false, "100", 0), tx("in", true, "200", 31)];
        assert!(find_matched_pairs(&late, &thresholds(100, 30)).is_empty());
    }

    #[test]
    fn test_fractional_minute_window() {
        let seq = vec![tx("out", false, "100", 0), tx("in", true, "100", 1)];
        let half = MatchThresholds {
            max_amount_diff: Decimal::from(100),
            max_minutes: Decimal::from_str("0.5").unwrap(),
        };
        assert!(find_matched_pairs(&seq, &half).is_empty());
    }

    #[test]
    fn test_huge_limits_do_not_overflow() {
        let seq = vec![tx("out", false, "100", 0), tx("in", true, "100", 1)];
        let unbounded = MatchThresholds {
            max_amount_diff: Decimal::MAX,
            max_minutes: Decimal::from_scientific("1e28").unwrap(),
        };
        let report = find_matched_pairs(&seq, &unbounded);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].time_diff_minutes, Decimal::ONE);
    }

    #[test]
    fn test_in_before_out_never_pairs() {
        let seq = vec![tx("in", true, "100", 0), tx("out", false, "100", 1)];
        assert!(find_matched_pairs(&seq, &thresholds(100, 30)).is_empty());
    }

    #[test]
    fn test_greedy_consumption_does_not_backtrack() {
        // out0 fails against out1, then out1+in2 pair, in3 has no partner left.
        let seq = vec![
            tx("out0", false, "100", 0),
            tx("out1", false, "100", 1),
            tx("in2", true, "100", 2),
            tx("in3", true, "100", 3),
            tx("out4", false, "500", 4),
            tx("in5", true, "520", 6),
        ];
        let report = find_matched_pairs(&seq, &thresholds(100, 30));

        let used: Vec<&str> = report
            .pairs
            .iter()
            .flat_map(|p| [p.out_tx.hash.as_str(), p.in_tx.hash.as_str()])
            .collect();
        assert_eq!(used, vec!["out1", "in2", "out4", "in5"]);

        let unique: HashSet<&str> = used.iter().copied().collect();
        assert_eq!(unique.len(), used.len());
    }

    #[test]
    fn test_pair_invariants_and_totals() {
        let seq = vec![
            tx("a", false, "120.5", 0),
            tx("b", true, "100.25", 5),
            tx("c", true, "80", 6),
            tx("d", false, "1000", 7),
            tx("e", true, "950", 40),
            tx("f", false, "300", 41),
            tx("g", true, "299.99", 42),
            tx("h", false, "70", 43),
        ];
        let limits = thresholds(100, 30);
        let report = find_matched_pairs(&seq, &limits);

        assert_eq!(report.pairs.len(), 2);
        for pair in &report.pairs {
            assert!(!pair.out_tx.is_income);
            assert!(pair.in_tx.is_income);
            assert!(pair.amount_diff <= limits.max_amount_diff);
            assert!(pair.time_diff_minutes >= Decimal::ZERO);
            assert!(pair.time_diff_minutes <= limits.max_minutes);
        }

        let fee_sum: Decimal = report.pairs.iter().map(|p| p.fee).sum();
        let diff_sum: Decimal = report.pairs.iter().map(|p| p.amount_diff).sum();
        assert_eq!(report.total_fee_native, fee_sum);
        assert_eq!(report.total_amount_diff, diff_sum);
        assert_eq!(report.total_amount_diff, Decimal::from_str("20.26").unwrap());
    }

    #[test]
    fn test_matching_is_repeatable() {
        let seq = vec![
            tx("a", false, "100", 0),
            tx("b", true, "90", 3),
            tx("c", false, "60", 4),
            tx("d", true, "61", 9),
        ];
        let limits = thresholds(100, 30);
        assert_eq!(find_matched_pairs(&seq, &limits), find_matched_pairs(&seq, &limits));
    }

    #[test]
    fn test_empty_and_single_element() {
        let limits = thresholds(100, 30);
        assert_eq!(find_matched_pairs(&[], &limits), MatchReport::default());
        assert!(find_matched_pairs(&[tx("a", false, "100", 0)], &limits).is_empty());
    }
}
