//! Display formatting for estimates (en-US conventions).

use crate::types::Timestamp;

/// Format a monetary amount as whole dollars with thousands separators,
/// e.g. `$1,234,568`.
///
/// Magnitudes beyond `u64::MAX` dollars (including infinities) are clamped
/// to `u64::MAX`; `NaN` formats as `$0`.
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let whole = if rounded.is_nan() {
        0
    } else {
        rounded.abs().min(u64::MAX as f64) as u64
    };
    format!("{sign}${}", group_thousands(whole))
}

/// Like [`format_money`] but renders a missing amount as `n/a`.
pub fn format_optional_money(amount: Option<f64>) -> String {
    amount.map(format_money).unwrap_or_else(|| "n/a".to_string())
}

/// `low – high`, both formatted as money.
pub fn format_range(low: f64, high: f64) -> String {
    format!("{} – {}", format_money(low), format_money(high))
}

/// en-US locale style timestamp in UTC, e.g. `5/1/2024, 2:05:09 PM`.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Distance in kilometres with two decimals.
pub fn format_distance_km(km: f64) -> String {
    format!("{km:.2}")
}

/// Shortest decimal form: `2`, `2.5`.
pub fn format_baths(baths: f64) -> String {
    baths.to_string()
}

/// Position of the point estimate within the range as a percentage in
/// `[0, 100]`. Degenerate or empty ranges put the marker in the middle.
pub fn range_position_pct(low: f64, high: f64, point: f64) -> f64 {
    if low == 0.0 || high == 0.0 || point == 0.0 || high <= low {
        return 50.0;
    }
    ((point - low) / (high - low) * 100.0).clamp(0.0, 100.0)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.0), "$999");
        assert_eq!(format_money(1_000.0), "$1,000");
        assert_eq!(format_money(1_234_567.6), "$1,234,568");
        assert_eq!(format_money(-2_500.0), "-$2,500");
    }

    #[test]
    fn money_out_of_range_is_clamped() {
        assert_eq!(format_money(1e30), "$18,446,744,073,709,551,615");
        assert_eq!(format_money(f64::NEG_INFINITY), "-$18,446,744,073,709,551,615");
        assert_eq!(format_money(f64::NAN), "$0");
    }

    #[test]
    fn optional_money() {
        assert_eq!(format_optional_money(Some(1500.0)), "$1,500");
        assert_eq!(format_optional_money(None), "n/a");
    }

    #[test]
    fn range_uses_en_dash() {
        assert_eq!(format_range(400_000.0, 450_000.0), "$400,000 – $450,000");
    }

    #[test]
    fn timestamp_is_locale_formatted() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 14, 5, 9).unwrap();
        assert_eq!(format_timestamp(ts), "5/1/2024, 2:05:09 PM");

        let midnight = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(midnight), "12/31/2024, 12:00:00 AM");
    }

    #[test]
    fn distance_has_two_decimals() {
        assert_eq!(format_distance_km(1.0), "1.00");
        assert_eq!(format_distance_km(0.456), "0.46");
    }

    #[test]
    fn baths_shortest_form() {
        assert_eq!(format_baths(2.0), "2");
        assert_eq!(format_baths(2.5), "2.5");
    }

    #[test]
    fn range_position() {
        assert_eq!(range_position_pct(100.0, 200.0, 150.0), 50.0);
        assert_eq!(range_position_pct(100.0, 200.0, 125.0), 25.0);
        assert_eq!(range_position_pct(100.0, 200.0, 250.0), 100.0);
        assert_eq!(range_position_pct(100.0, 100.0, 100.0), 50.0);
        assert_eq!(range_position_pct(0.0, 200.0, 100.0), 50.0);
    }
}
