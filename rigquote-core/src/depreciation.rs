use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schemas::computing::LaunchDate;

/// No part is ever valued below this share of its new value.
pub const FLOOR: f64 = 0.2;

/// Factor used when the launch date is unknown. Missing metadata is not evidence of age.
pub const UNKNOWN_FACTOR: f64 = 0.5;

/// Linear value loss per year of age, floored at [`FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Depreciation {
    pub rate: f64,
}

impl Depreciation {
    pub fn per_year(rate: f64) -> Self {
        Self { rate }
    }

    /// The share of value retained by a part launched at `launch`, as of `today`.
    /// Always within `[FLOOR, 1.0]`.
    pub fn factor(&self, launch: Option<LaunchDate>, today: NaiveDate) -> f64 {
        let launched = match launch.and_then(|date| date.as_date()) {
            Some(launched) => launched,
            None => return UNKNOWN_FACTOR,
        };

        let age_years = today.signed_duration_since(launched).num_days() as f64 / 365.0;
        let rate = if self.rate.is_finite() {
            self.rate.max(0.0)
        } else {
            0.0
        };

        /* parts from the future are as good as new */
        (1.0 - age_years.max(0.0) * rate).clamp(FLOOR, 1.0)
    }
}

impl Default for Depreciation {
    fn default() -> Self {
        Self::per_year(0.1)
    }
}

/// Shorthand for [`Depreciation::factor`].
pub fn depreciation_factor(launch: Option<LaunchDate>, rate: f64, today: NaiveDate) -> f64 {
    Depreciation::per_year(rate).factor(launch, today)
}

#[cfg(test)]
mod tests {
    use super::{depreciation_factor, Depreciation, FLOOR, UNKNOWN_FACTOR};
    use crate::{common::tests::roughly_equal, schemas::computing::LaunchDate};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unknown_is_neutral() {
        assert_eq!(depreciation_factor(None, 0.2, day(2024, 1, 1)), 0.5);
        assert_eq!(Depreciation::per_year(0.08).factor(None, day(1990, 1, 1)), UNKNOWN_FACTOR);
    }

    #[test]
    fn test_linear_decay() {
        let today = day(2023, 1, 1);
        /* 2020-01-01 to 2023-01-01 is 1096 days */
        let expected = 1.0 - (1096.0 / 365.0) * 0.1;
        let factor = depreciation_factor(Some(LaunchDate::Day(day(2020, 1, 1))), 0.1, today);
        assert!(roughly_equal(factor, expected));

        /* a bare year is January 1 */
        assert_eq!(
            depreciation_factor(Some(LaunchDate::Year(2020)), 0.1, today),
            factor
        );
    }

    #[test]
    fn test_bounds() {
        let today = day(2024, 6, 1);
        let ancient = Some(LaunchDate::Year(1995));
        let future = Some(LaunchDate::Day(day(2030, 1, 1)));

        assert_eq!(depreciation_factor(ancient, 0.2, today), FLOOR);
        assert_eq!(depreciation_factor(future, 0.2, today), 1.0);
        assert_eq!(depreciation_factor(ancient, -3.0, today), 1.0);
        assert_eq!(depreciation_factor(ancient, f64::NAN, today), 1.0);
        assert_eq!(depreciation_factor(ancient, f64::INFINITY, today), 1.0);

        for year in 1980..2040 {
            for rate in [0.0, 0.08, 0.2, 1.5] {
                let f = depreciation_factor(Some(LaunchDate::Year(year)), rate, today);
                assert!((FLOOR..=1.0).contains(&f), "{} {} {}", year, rate, f);
            }
        }
    }

    #[test]
    fn test_monotonic_in_age() {
        let today = day(2024, 6, 1);
        let mut previous = f64::INFINITY;
        for year in (1990..=2024).rev() {
            let f = depreciation_factor(Some(LaunchDate::Year(year)), 0.08, today);
            assert!(f <= previous);
            previous = f;
        }
    }
}
