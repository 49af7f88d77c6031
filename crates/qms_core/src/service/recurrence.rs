//! Recurrence expansion over calendar dates.
//!
//! Each generated date advances from the previously generated one, so an
//! end-of-month clamp carries forward (`01-31 -> 02-28 -> 03-28`).

use crate::model::event::Recurrence;
use chrono::{Months, NaiveDate};

/// Returns the due dates generated after `anchor`, excluding the anchor.
///
/// One-time recurrence yields no dates. Returns `None` when a generated
/// date falls outside the supported calendar range.
pub fn generated_due_dates(
    anchor: NaiveDate,
    recurrence: Recurrence,
    horizon: usize,
) -> Option<Vec<NaiveDate>> {
    let Some(step) = recurrence.month_step() else {
        return Some(Vec::new());
    };

    let mut dates = Vec::with_capacity(horizon);
    let mut previous = anchor;
    for _ in 0..horizon {
        previous = previous.checked_add_months(Months::new(step))?;
        dates.push(previous);
    }
    Some(dates)
}

#[cfg(test)]
mod tests {
    use super::generated_due_dates;
    use crate::model::event::Recurrence;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_advances_one_month_per_instance() {
        let dates = generated_due_dates(date(2026, 1, 5), Recurrence::Monthly, 3).unwrap();
        assert_eq!(
            dates,
            vec![date(2026, 2, 5), date(2026, 3, 5), date(2026, 4, 5)]
        );
    }

    #[test]
    fn quarterly_and_yearly_use_their_cadence() {
        let quarterly = generated_due_dates(date(2026, 1, 5), Recurrence::Quarterly, 3).unwrap();
        assert_eq!(
            quarterly,
            vec![date(2026, 4, 5), date(2026, 7, 5), date(2026, 10, 5)]
        );

        let yearly = generated_due_dates(date(2026, 1, 5), Recurrence::Yearly, 3).unwrap();
        assert_eq!(
            yearly,
            vec![date(2027, 1, 5), date(2028, 1, 5), date(2029, 1, 5)]
        );
    }

    #[test]
    fn one_time_generates_nothing() {
        let dates = generated_due_dates(date(2026, 1, 5), Recurrence::OneTime, 3).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn month_end_clamp_carries_into_later_instances() {
        let dates = generated_due_dates(date(2026, 1, 31), Recurrence::Monthly, 3).unwrap();
        assert_eq!(
            dates,
            vec![date(2026, 2, 28), date(2026, 3, 28), date(2026, 4, 28)]
        );

        let leap = generated_due_dates(date(2028, 2, 29), Recurrence::Yearly, 1).unwrap();
        assert_eq!(leap, vec![date(2029, 2, 28)]);
    }

    #[test]
    fn overflow_past_calendar_range_returns_none() {
        assert!(generated_due_dates(NaiveDate::MAX, Recurrence::Monthly, 3).is_none());
    }

    #[test]
    fn horizon_controls_instance_count() {
        let dates = generated_due_dates(date(2026, 1, 5), Recurrence::Monthly, 5).unwrap();
        assert_eq!(dates.len(), 5);
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
