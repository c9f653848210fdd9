//! Safe-to-spend math for the info bar.

use chrono::{Datelike, NaiveDate};

use crate::MoneyCents;

/// Days remaining in the month of `date`, counting `date` itself.
pub fn days_left_in_month(date: NaiveDate) -> i64 {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    match first_of_next {
        Some(first) => (first - date).num_days(),
        None => 0,
    }
}

/// Daily allowance until the end of the month.
///
/// Locked funds are excluded; a non-positive available balance yields zero
/// rather than a negative allowance.
pub fn safe_to_spend(total: MoneyCents, locked: MoneyCents, date: NaiveDate) -> MoneyCents {
    let days_left = days_left_in_month(date);
    if days_left <= 0 {
        return MoneyCents::ZERO;
    }
    let available = total - locked;
    if available.is_positive() {
        MoneyCents::new(available.cents() / days_left)
    } else {
        MoneyCents::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_remaining_days_inclusive() {
        assert_eq!(days_left_in_month(date(2026, 8, 1)), 31);
        assert_eq!(days_left_in_month(date(2026, 8, 31)), 1);
        assert_eq!(days_left_in_month(date(2026, 12, 31)), 1);
        // Leap February.
        assert_eq!(days_left_in_month(date(2028, 2, 1)), 29);
    }

    #[test]
    fn divides_available_balance_over_days_left() {
        // $310.00 over the whole of August: $10.00 per day.
        let allowance = safe_to_spend(
            MoneyCents::new(31_000),
            MoneyCents::ZERO,
            date(2026, 8, 1),
        );
        assert_eq!(allowance, MoneyCents::new(1_000));
    }

    #[test]
    fn locked_funds_are_excluded() {
        let allowance = safe_to_spend(
            MoneyCents::new(31_000),
            MoneyCents::new(15_500),
            date(2026, 8, 1),
        );
        assert_eq!(allowance, MoneyCents::new(500));
    }

    #[test]
    fn overdrawn_balance_yields_zero() {
        let allowance = safe_to_spend(
            MoneyCents::new(1_000),
            MoneyCents::new(2_000),
            date(2026, 8, 1),
        );
        assert_eq!(allowance, MoneyCents::ZERO);
    }
}
