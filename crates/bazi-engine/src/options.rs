//! Configuration for chart computation.
//!
//! All knobs have defaults matching the most common convention (China
//! Standard Time, day change at midnight, year change at the lunar new year),
//! so `BaziOptions::default()` is what most callers want.

use chrono::{NaiveDate, TimeZone};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;

use crate::error::{BaziError, Result};

/// Meridian of UTC+8, the zone civil input is assumed to be in by default.
pub const DEFAULT_REFERENCE_MERIDIAN: f64 = 120.0;

/// Number of decade pillars produced when a gender is supplied.
pub const DEFAULT_DECADE_COUNT: usize = 8;

/// Which calendar day the late Zi hour (23:00–24:00 true solar time) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ZiHourPolicy {
    /// The day pillar changes at midnight.
    #[default]
    SameDay,
    /// The day pillar changes at 23:00, at the start of the Zi hour.
    NextDay,
}

/// Where the year pillar changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum YearBoundary {
    /// At the lunar new year (first day of the first lunar month).
    #[default]
    LunarNewYear,
    /// At the Start of Spring solar term (solar longitude 315°).
    StartOfSpring,
}

/// Options for [`BaziEngine`](crate::bazi::BaziEngine).
#[derive(Debug, Clone, Serialize)]
pub struct BaziOptions {
    /// Longitude in degrees of the meridian that defines the civil time zone
    /// of the input (15° per hour of UTC offset).
    pub reference_meridian: f64,
    /// Day assignment of the late Zi hour.
    pub zi_hour: ZiHourPolicy,
    /// Year pillar boundary.
    pub year_boundary: YearBoundary,
    /// How many decade pillars to list.
    pub decade_count: usize,
}

impl Default for BaziOptions {
    fn default() -> Self {
        Self {
            reference_meridian: DEFAULT_REFERENCE_MERIDIAN,
            zi_hour: ZiHourPolicy::default(),
            year_boundary: YearBoundary::default(),
            decade_count: DEFAULT_DECADE_COUNT,
        }
    }
}

impl BaziOptions {
    /// Options whose reference meridian matches the standard (non-DST) offset
    /// of an IANA timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use bazi_engine::options::BaziOptions;
    ///
    /// let tokyo = BaziOptions::for_timezone(chrono_tz::Asia::Tokyo);
    /// assert_eq!(tokyo.reference_meridian, 135.0);
    /// ```
    pub fn for_timezone(tz: Tz) -> Self {
        Self {
            reference_meridian: standard_meridian(tz),
            ..Self::default()
        }
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::InvalidInput`] for a meridian outside ±180° or a
    /// decade count outside 1–12.
    pub fn validate(&self) -> Result<()> {
        if !self.reference_meridian.is_finite() || self.reference_meridian.abs() > 180.0 {
            return Err(BaziError::InvalidInput(format!(
                "reference meridian {} outside -180..=180",
                self.reference_meridian
            )));
        }
        if !(1..=12).contains(&self.decade_count) {
            return Err(BaziError::InvalidInput(format!(
                "decade count {} outside 1-12",
                self.decade_count
            )));
        }
        Ok(())
    }
}

/// Meridian of a timezone's standard offset, sampled in January 2000 to stay
/// clear of local mean time entries.
fn standard_meridian(tz: Tz) -> f64 {
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    let offset = tz.offset_from_utc_date(&sample);
    offset.base_utc_offset().num_seconds() as f64 / 240.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_china_standard_time() {
        let options = BaziOptions::default();
        assert_eq!(options.reference_meridian, 120.0);
        assert_eq!(options.zi_hour, ZiHourPolicy::SameDay);
        assert_eq!(options.year_boundary, YearBoundary::LunarNewYear);
        assert_eq!(options.decade_count, 8);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_for_timezone_shanghai() {
        let options = BaziOptions::for_timezone(chrono_tz::Asia::Shanghai);
        assert_eq!(options.reference_meridian, 120.0);
    }

    #[test]
    fn test_for_timezone_ignores_dst() {
        // New York standard time is UTC-5 whatever the season.
        let options = BaziOptions::for_timezone(chrono_tz::America::New_York);
        assert_eq!(options.reference_meridian, -75.0);
    }

    #[test]
    fn test_for_timezone_half_hour_zone() {
        let options = BaziOptions::for_timezone(chrono_tz::Asia::Kolkata);
        assert_eq!(options.reference_meridian, 82.5);
    }

    #[test]
    fn test_validate_rejects_bad_meridian() {
        let options = BaziOptions {
            reference_meridian: 200.0,
            ..BaziOptions::default()
        };
        let err = options.validate().unwrap_err().to_string();
        assert!(err.contains("reference meridian"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_zero_decades() {
        let options = BaziOptions {
            decade_count: 0,
            ..BaziOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
