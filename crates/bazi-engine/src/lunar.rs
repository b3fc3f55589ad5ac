//! Gregorian → Chinese lunar date conversion over the packed table in
//! [`crate::lunar_table`].
//!
//! The conversion counts days from the epoch 1900-01-31 (lunar 1900, first
//! month, day 1), consumes whole lunar years, then months, with each leap
//! month placed directly after the regular month it repeats.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::{BaziError, Result};
use crate::lunar_table::{
    leap_month, leap_month_days, month_days, year_days, FIRST_YEAR, LAST_YEAR,
};

/// Days from 0001-01-01 (day 1) to 1900-01-31.
const EPOCH_DAYS_FROM_CE: i32 = 693_626;

const MONTH_NAMES: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];

const DAY_TENS: [&str; 4] = ["初", "十", "廿", "三"];

const DIGITS: [&str; 10] = ["十", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// A date in the Chinese lunisolar calendar, carrying the time of day of the
/// instant it was converted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LunarDate {
    /// Lunar year (the Gregorian year in which its first month begins).
    pub year: i32,
    /// Month number, 1-based. A leap month repeats its predecessor's number.
    pub month: u32,
    /// Day of the month, 1-based.
    pub day: u32,
    /// Whether `month` is the intercalary repeat.
    pub is_leap_month: bool,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// The (true solar) instant this date was derived from.
    pub solar: NaiveDateTime,
    /// Chinese rendering, e.g. `1996年 九月 廿八`.
    pub text: String,
}

impl LunarDate {
    /// Traditional month name, e.g. `正月`, `闰六月`, `腊月`.
    pub fn month_name(&self) -> String {
        let leap = if self.is_leap_month { "闰" } else { "" };
        format!("{leap}{}月", MONTH_NAMES[(self.month - 1) as usize % 12])
    }

    /// Traditional day name, e.g. `初一`, `二十`, `廿八`.
    pub fn day_name(&self) -> String {
        day_name(self.day)
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn day_name(day: u32) -> String {
    match day {
        10 => "初十".to_string(),
        20 => "二十".to_string(),
        30 => "三十".to_string(),
        _ => format!(
            "{}{}",
            DAY_TENS[(day / 10) as usize % 4],
            DIGITS[(day % 10) as usize]
        ),
    }
}

/// Convert a Gregorian instant to its lunar date.
///
/// The time of day is carried through unchanged; only the calendar date is
/// converted. Callers that want the true-solar date must apply
/// [`crate::solar_time::true_solar_time`] first.
///
/// # Errors
///
/// Returns [`BaziError::InvalidInput`] for dates before 1900-01-31 or after
/// 2101-01-28, the span covered by the table.
///
/// # Examples
///
/// ```
/// use bazi_engine::lunar::to_lunar_date;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap().and_hms_opt(8, 30, 0).unwrap();
/// let lunar = to_lunar_date(dt).unwrap();
/// assert_eq!((lunar.year, lunar.month, lunar.day), (2024, 1, 1));
/// assert_eq!(lunar.text, "2024年 正月 初一");
/// ```
pub fn to_lunar_date(datetime: NaiveDateTime) -> Result<LunarDate> {
    let mut offset = i64::from(datetime.date().num_days_from_ce() - EPOCH_DAYS_FROM_CE);
    if offset < 0 {
        return Err(out_of_range(datetime));
    }

    let mut year = FIRST_YEAR;
    loop {
        if year > LAST_YEAR {
            return Err(out_of_range(datetime));
        }
        let days = i64::from(year_days(year)?);
        if offset < days {
            break;
        }
        offset -= days;
        year += 1;
    }

    let leap = leap_month(year)?;
    for month in 1..=12 {
        let days = i64::from(month_days(year, month)?);
        if offset < days {
            return Ok(build(datetime, year, month, offset, false));
        }
        offset -= days;

        if leap == Some(month) {
            let days = i64::from(leap_month_days(year)?);
            if offset < days {
                return Ok(build(datetime, year, month, offset, true));
            }
            offset -= days;
        }
    }

    Err(BaziError::TableLookupGap(format!(
        "{offset} days left over after walking lunar year {year}"
    )))
}

fn build(
    datetime: NaiveDateTime,
    year: i32,
    month: u32,
    offset: i64,
    is_leap_month: bool,
) -> LunarDate {
    let day = offset as u32 + 1;
    let mut date = LunarDate {
        year,
        month,
        day,
        is_leap_month,
        hour: datetime.hour(),
        minute: datetime.minute(),
        second: datetime.second(),
        solar: datetime,
        text: String::new(),
    };
    date.text = format!("{year}年 {} {}", date.month_name(), date.day_name());
    date
}

fn out_of_range(datetime: NaiveDateTime) -> BaziError {
    BaziError::InvalidInput(format!(
        "date {} outside lunar table range 1900-01-31..=2101-01-28",
        datetime.date()
    ))
}
