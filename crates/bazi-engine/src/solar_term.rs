//! The 24 solar terms (节气).
//!
//! A term begins when the sun's ecliptic longitude crosses a multiple of 15°.
//! Index 0 is 立春 (Start of Spring, 315°), so the terms run in the order
//! the pillars use them: each even index is a 节 that opens a solar month,
//! each odd index a 中气 in the middle of one.
//!
//! All civil instants here are wall-clock time on a reference meridian
//! (120° E for China Standard Time). They are shifted to UT for the search
//! and shifted back afterwards.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::astronomy::{
    find_longitude_crossing, from_julian_day, normalize_degrees, solar_longitude, to_julian_day,
};
use crate::error::{BaziError, Result};
use crate::lunar::{to_lunar_date, LunarDate};

/// Term names in order, starting at 立春.
pub const TERM_NAMES: [&str; 24] = [
    "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至", "小暑", "大暑",
    "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒",
];

/// Longitude of 立春, the first term.
pub const START_OF_SPRING_LONGITUDE: f64 = 315.0;

/// Half-width of the bracket used to find the term in effect at an instant.
const CURRENT_TERM_WINDOW_DAYS: f64 = 20.0;

/// The following term is always under 17 days after the current one.
const NEXT_TERM_WINDOW_DAYS: f64 = 40.0;

/// Solar months last 29.4–31.5 days.
const JIE_WINDOW_DAYS: f64 = 35.0;

// ── Term arithmetic ─────────────────────────────────────────────────────────

/// Index (0 = 立春) of the term in effect at a solar longitude.
pub fn term_index(longitude: f64) -> usize {
    ((normalize_degrees(longitude) + 45.0) / 15.0).floor() as usize % 24
}

/// Target longitude of term `index`.
pub fn term_longitude(index: usize) -> f64 {
    normalize_degrees(START_OF_SPRING_LONGITUDE + 15.0 * (index % 24) as f64)
}

/// Whether term `index` opens a solar month (节 rather than 中气).
pub fn is_jie(index: usize) -> bool {
    index % 2 == 0
}

/// Solar-month offset (0 = the 寅 month) of a term, looked up by name.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] for a name that is not one of the 24
/// terms.
pub fn month_offset(name: &str) -> Result<usize> {
    TERM_NAMES
        .iter()
        .position(|term| *term == name)
        .map(|index| index / 2)
        .ok_or_else(|| {
            BaziError::TableLookupGap(format!("no month offset for solar term '{name}'"))
        })
}

// ── Located terms ───────────────────────────────────────────────────────────

/// A solar term pinned to the instant it begins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTerm {
    pub name: &'static str,
    /// Position in [`TERM_NAMES`].
    pub index: usize,
    /// Ecliptic longitude at which the term begins, degrees.
    pub longitude: f64,
    /// Julian Day (UT) of the crossing.
    pub julian_day: f64,
    /// Civil instant of the crossing on the reference meridian.
    pub instant: NaiveDateTime,
    /// Lunar date of `instant`, when it falls inside the lunar table.
    pub lunar: Option<LunarDate>,
}

/// The term in effect at an instant and the one that follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTermPair {
    pub current: SolarTerm,
    pub next: SolarTerm,
}

/// The month-opening terms on either side of an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JieBounds {
    /// The latest 节 at or before the instant.
    pub previous: SolarTerm,
    /// The first 节 after the instant.
    pub next: SolarTerm,
}

fn universal_julian_day(civil: &NaiveDateTime, reference_meridian: f64) -> f64 {
    to_julian_day(civil) - reference_meridian / 360.0
}

fn locate(index: usize, low: f64, high: f64, reference_meridian: f64) -> Result<SolarTerm> {
    let index = index % 24;
    let longitude = term_longitude(index);
    let julian_day = find_longitude_crossing(longitude, low, high)?;
    let instant = from_julian_day(julian_day + reference_meridian / 360.0)?;
    Ok(SolarTerm {
        name: TERM_NAMES[index],
        index,
        longitude,
        julian_day,
        instant,
        lunar: to_lunar_date(instant).ok(),
    })
}

/// Find the solar term in effect at `civil` and the one after it.
///
/// # Arguments
///
/// * `civil` — Wall-clock instant on `reference_meridian`
/// * `reference_meridian` — Meridian of the civil zone, degrees east
///
/// # Errors
///
/// Returns [`BaziError::SolarTermSearch`] if a crossing cannot be bracketed,
/// or [`BaziError::InvalidInput`] if an instant cannot be represented.
///
/// # Examples
///
/// ```
/// use bazi_engine::solar_term::solar_terms_around;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let terms = solar_terms_around(dt, 120.0).unwrap();
/// assert_eq!(terms.current.name, "雨水");
/// assert_eq!(terms.next.name, "惊蛰");
/// ```
pub fn solar_terms_around(civil: NaiveDateTime, reference_meridian: f64) -> Result<SolarTermPair> {
    let jd = universal_julian_day(&civil, reference_meridian);
    let index = term_index(solar_longitude(jd));

    let current = locate(
        index,
        jd - CURRENT_TERM_WINDOW_DAYS,
        jd + CURRENT_TERM_WINDOW_DAYS,
        reference_meridian,
    )?;
    let next = locate(
        index + 1,
        current.julian_day,
        current.julian_day + NEXT_TERM_WINDOW_DAYS,
        reference_meridian,
    )?;

    debug!(
        %civil,
        current = current.name,
        current_at = %current.instant,
        next = next.name,
        "located solar terms"
    );
    Ok(SolarTermPair { current, next })
}

/// Find the month-opening terms (节) bracketing `civil`.
///
/// # Errors
///
/// Same as [`solar_terms_around`].
pub fn jie_bounds(civil: NaiveDateTime, reference_meridian: f64) -> Result<JieBounds> {
    let jd = universal_julian_day(&civil, reference_meridian);
    let index = term_index(solar_longitude(jd));
    let jie = if is_jie(index) { index } else { index - 1 };

    let previous = locate(jie, jd - JIE_WINDOW_DAYS, jd, reference_meridian)?;
    let next = locate(jie + 2, jd, jd + JIE_WINDOW_DAYS, reference_meridian)?;
    Ok(JieBounds { previous, next })
}

/// All 24 terms from 立春 of `year` through 大寒 early in `year + 1`.
///
/// # Errors
///
/// Same as [`solar_terms_around`].
pub fn solar_terms_for_year(year: i32, reference_meridian: f64) -> Result<Vec<SolarTerm>> {
    // 立春 always falls on February 3–5.
    let early_february = chrono::NaiveDate::from_ymd_opt(year, 2, 4)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            BaziError::InvalidInput(format!("year {year} outside representable dates"))
        })?;
    let jd = universal_julian_day(&early_february, reference_meridian);

    let mut terms = Vec::with_capacity(24);
    let mut previous = locate(
        0,
        jd - CURRENT_TERM_WINDOW_DAYS,
        jd + CURRENT_TERM_WINDOW_DAYS,
        reference_meridian,
    )?;
    for index in 1..24 {
        let next = locate(
            index,
            previous.julian_day,
            previous.julian_day + NEXT_TERM_WINDOW_DAYS,
            reference_meridian,
        )?;
        terms.push(previous);
        previous = next;
    }
    terms.push(previous);
    Ok(terms)
}
