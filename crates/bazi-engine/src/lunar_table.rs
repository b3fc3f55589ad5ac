//! Packed lunar calendar data for lunar years 1900 through 2100.
//!
//! Each year is one 17-bit word:
//!
//! - bits 0–3: the month that is followed by a leap month (0 = no leap month)
//! - bits 4–15: regular months 12 down to 1, a set bit meaning 30 days
//!   (otherwise 29); month `m` is tested with `0x10000 >> m`
//! - bit 16: the leap month has 30 days (otherwise 29)
//!
//! Lunar year 1900 month 1 day 1 falls on Gregorian 1900-01-31, which is the
//! epoch used by [`crate::lunar`].

use crate::error::{BaziError, Result};

/// First tabulated lunar year.
pub const FIRST_YEAR: i32 = 1900;

/// Last tabulated lunar year.
pub const LAST_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520,                                                                                    // 2100
];

/// Raw packed word for a lunar year.
fn info(year: i32) -> Result<u32> {
    if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
        return Err(BaziError::InvalidInput(format!(
            "lunar year {year} outside supported range {FIRST_YEAR}-{LAST_YEAR}"
        )));
    }
    Ok(LUNAR_INFO[(year - FIRST_YEAR) as usize])
}

/// The regular month followed by a leap month, or `None` in a common year.
pub fn leap_month(year: i32) -> Result<Option<u32>> {
    let leap = info(year)? & 0xf;
    Ok((leap != 0).then_some(leap))
}

/// Length of the leap month in days (0 when the year has none).
pub fn leap_month_days(year: i32) -> Result<u32> {
    let word = info(year)?;
    if word & 0xf == 0 {
        return Ok(0);
    }
    Ok(if word & 0x10000 != 0 { 30 } else { 29 })
}

/// Length of regular month `month` (1..=12) in days.
pub fn month_days(year: i32, month: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        return Err(BaziError::InvalidInput(format!(
            "lunar month {month} outside 1-12"
        )));
    }
    let word = info(year)?;
    Ok(if word & (0x10000 >> month) != 0 { 30 } else { 29 })
}

/// Total days in a lunar year, leap month included.
pub fn year_days(year: i32) -> Result<u32> {
    let mut total = leap_month_days(year)?;
    for month in 1..=12 {
        total += month_days(year, month)?;
    }
    Ok(total)
}
