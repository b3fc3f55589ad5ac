//! Pillar arithmetic: the four pillars and the points derived from them.
//!
//! Every function here is pure index arithmetic over [`Tables`]; the
//! astronomy and calendar inputs (lunar year, current solar term, jie
//! bounds, true-solar instant) are computed by the caller.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cycle::{self, StemBranch};
use crate::elements::Polarity;
use crate::error::{BaziError, Result};
use crate::solar_term::{month_offset, JieBounds};
use crate::tables::Tables;

/// Days from 0001-01-01 (day 1) to 1900-01-01.
const DAY_EPOCH_DAYS_FROM_CE: i32 = 693_596;

/// Cycle index of 1900-01-01 (甲戌).
const DAY_EPOCH_INDEX: i64 = 10;

/// Governing-qi segments per month branch, in days counted from the jie.
const SI_LING: [(&str, &[(&str, i64)]); 12] = [
    ("子", &[("壬水", 10), ("癸水", 20)]),
    ("丑", &[("癸水", 9), ("辛金", 3), ("己土", 18)]),
    ("寅", &[("戊土", 7), ("丙火", 7), ("甲木", 16)]),
    ("卯", &[("甲木", 10), ("乙木", 20)]),
    ("辰", &[("乙木", 9), ("癸水", 3), ("戊土", 18)]),
    ("巳", &[("戊土", 5), ("庚金", 9), ("丙火", 16)]),
    ("午", &[("丙火", 10), ("己土", 9), ("丁火", 11)]),
    ("未", &[("丁火", 9), ("乙木", 3), ("己土", 18)]),
    ("申", &[("戊己土", 10), ("壬癸水", 3), ("庚金", 17)]),
    ("酉", &[("庚金", 10), ("辛金", 20)]),
    ("戌", &[("辛金", 9), ("丁火", 3), ("戊土", 18)]),
    ("亥", &[("戊土", 7), ("甲木", 5), ("壬水", 18)]),
];

/// Gender, which sets the direction of the decade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

// ── The four pillars ────────────────────────────────────────────────────────

/// Year pillar of a lunar year (1984 = 甲子).
pub fn year_pillar(tables: &Tables, lunar_year: i32) -> Result<&StemBranch> {
    tables.pillar((i64::from(lunar_year) - 4).rem_euclid(60) as usize)
}

/// Year pillar with the year changing at 立春 rather than the lunar new year.
///
/// `term_index` is the solar term in effect at `instant`; January and
/// February instants still in 冬至, 小寒 or 大寒 belong to the previous year.
pub fn year_pillar_from_start_of_spring(
    tables: &Tables,
    instant: NaiveDateTime,
    term_index: usize,
) -> Result<&StemBranch> {
    let mut year = instant.year();
    if instant.month() <= 2 && term_index >= 21 {
        year -= 1;
    }
    year_pillar(tables, year)
}

/// Month pillar from the year stem and the name of the current solar term.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] if `term_name` is not a solar term.
pub fn month_pillar<'t>(
    tables: &'t Tables,
    year_stem: usize,
    term_name: &str,
) -> Result<&'t StemBranch> {
    let offset = month_offset(term_name)?;
    let first = tables.stem(year_stem)?.first_month_stem;
    tables.pillar_of((first + offset) % 10, (offset + 2) % 12)
}

/// Cycle index of the day containing `date`.
pub fn day_index(date: NaiveDate) -> usize {
    let days = i64::from(date.num_days_from_ce() - DAY_EPOCH_DAYS_FROM_CE);
    (days + DAY_EPOCH_INDEX).rem_euclid(60) as usize
}

pub fn day_pillar(tables: &Tables, date: NaiveDate) -> Result<&StemBranch> {
    tables.pillar(day_index(date))
}

/// Branch index of the double hour containing `hour` (23:00–00:59 is 子).
pub fn hour_branch(hour: u32) -> usize {
    (((hour + 1) % 24) / 2) as usize
}

/// Hour pillar from the day stem and the true-solar hour.
pub fn hour_pillar(tables: &Tables, day_stem: usize, hour: u32) -> Result<&StemBranch> {
    let branch = hour_branch(hour);
    let first = tables.stem(day_stem)?.first_hour_stem;
    tables.pillar_of((first + branch) % 10, branch)
}

// ── Secondary points ────────────────────────────────────────────────────────

/// Tai Yuan (胎元): the month pillar advanced one stem and three branches.
pub fn tai_yuan<'t>(tables: &'t Tables, month: &StemBranch) -> Result<&'t StemBranch> {
    tables.pillar_of((month.stem + 1) % 10, (month.branch + 3) % 12)
}

/// The pillar formed by the combination partners of a pillar's stem and
/// branch. Tai Xi (胎息) for the day pillar, Bian Xing (变星) for the hour.
pub fn combined_pillar<'t>(tables: &'t Tables, pillar: &StemBranch) -> Result<&'t StemBranch> {
    let stem = tables
        .stem(pillar.stem)?
        .combination_partner()
        .ok_or_else(|| {
            BaziError::TableLookupGap(format!("no stem combination for {}", pillar.name))
        })?;
    let branch = tables
        .branch(pillar.branch)?
        .combination_partner()
        .ok_or_else(|| {
            BaziError::TableLookupGap(format!("no branch combination for {}", pillar.name))
        })?;
    tables.pillar_of(stem, branch)
}

/// Ming Gong (命宫) from the year stem, month branch and hour branch.
///
/// With the solar month numbered from 寅 = 1 and the hour from 子 = 1, the
/// palace number is `14 − (month + hour)`, or `26 − (month + hour)` when the
/// sum reaches 14; its stem follows the five-tiger rule of the year. The
/// month is the solar month counted from 寅, not the lunar month of the
/// `(lunar month + hour + 2) mod 12` convention.
pub fn ming_gong<'t>(
    tables: &'t Tables,
    year_stem: usize,
    month_branch: usize,
    hour_branch: usize,
) -> Result<&'t StemBranch> {
    let month_number = (month_branch + 10) % 12 + 1;
    let hour_number = hour_branch + 1;
    let sum = month_number + hour_number;
    let palace = if sum >= 14 { 26 - sum } else { 14 - sum };

    let first = tables.stem(year_stem)?.first_month_stem;
    tables.pillar_of((first + palace - 1) % 10, (palace + 1) % 12)
}

/// Governing qi (司令) on a given day of a solar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiLing {
    /// Ruling stem(s) and element, e.g. `甲木`.
    pub name: &'static str,
    /// Whole days since the month's opening term.
    pub days_since_jie: i64,
}

/// Governing qi for `days_since_jie` days into the month whose branch is
/// `month_branch`.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] if the branch has no segment table.
pub fn si_ling(tables: &Tables, month_branch: usize, days_since_jie: i64) -> Result<SiLing> {
    let branch = tables.branch(month_branch)?.name;
    let segments = SI_LING
        .iter()
        .find(|(name, _)| *name == branch)
        .map(|(_, segments)| *segments)
        .ok_or_else(|| BaziError::TableLookupGap(format!("no governing-qi table for {branch}")))?;

    let mut elapsed = 0;
    let mut ruling = segments
        .last()
        .map(|(name, _)| *name)
        .ok_or_else(|| {
            BaziError::TableLookupGap(format!("empty governing-qi table for {branch}"))
        })?;
    for &(name, days) in segments {
        elapsed += days;
        if elapsed >= days_since_jie {
            ruling = name;
            break;
        }
    }

    Ok(SiLing {
        name: ruling,
        days_since_jie,
    })
}

// ── Decade cycle ────────────────────────────────────────────────────────────

/// One ten-year luck pillar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decade {
    pub pillar: StemBranch,
    /// Age in whole years at which the decade begins.
    pub start_age: u32,
    /// Gregorian year in which the decade begins.
    pub start_year: i32,
}

/// The decade cycle (大运).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaYun {
    /// Whether the pillars run forward through the cycle.
    pub forward: bool,
    /// Days between birth and the governing jie.
    pub days_to_jie: f64,
    /// Age at which the first decade begins: years plus months.
    pub start_years: u32,
    pub start_months: u32,
    /// Date on which the first decade begins.
    pub start_date: NaiveDate,
    pub decades: Vec<Decade>,
}

/// Compute the decade cycle.
///
/// Runs forward for a Yang-year male or a Yin-year female, backward
/// otherwise. The starting age counts the days from birth to the next jie
/// (forward) or back to the previous one (backward): three days make a year
/// and one day four months. Each decade steps the month pillar one place
/// through the cycle.
///
/// # Arguments
///
/// * `birth` — Civil birth instant on the same meridian as `bounds`
/// * `bounds` — Jie bracketing `birth`
/// * `count` — Number of decades to list
pub fn da_yun(
    tables: &Tables,
    year_stem: usize,
    month: &StemBranch,
    gender: Gender,
    birth: NaiveDateTime,
    bounds: &JieBounds,
    count: usize,
) -> Result<DaYun> {
    let yang_year = tables.stem(year_stem)?.polarity == Polarity::Yang;
    let forward = yang_year == (gender == Gender::Male);

    let span = if forward {
        bounds.next.instant - birth
    } else {
        birth - bounds.previous.instant
    };
    let days_to_jie = (span.num_seconds() as f64 / 86_400.0).max(0.0);

    let start_years = (days_to_jie / 3.0).floor() as u32;
    let start_months = ((days_to_jie % 3.0) * 4.0).floor() as u32;
    let start_date = birth
        .date()
        .checked_add_months(Months::new(start_years * 12 + start_months))
        .ok_or_else(|| {
            BaziError::InvalidInput(format!("decade start after {birth} is not representable"))
        })?;

    let direction = if forward { 1 } else { -1 };
    let decades = (0..count)
        .map(|i| {
            let index = cycle::step(month.index, direction * (i as i64 + 1));
            Ok(Decade {
                pillar: tables.pillar(index)?.clone(),
                start_age: start_years + 10 * i as u32,
                start_year: start_date.year() + 10 * i as i32,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DaYun {
        forward,
        days_to_jie,
        start_years,
        start_months,
        start_date,
        decades,
    })
}

/// Whole calendar days from the opening jie to `civil`, never negative.
///
/// `civil` must be on the same clock as `bounds`: the civil time of the
/// reference meridian, not true solar time.
pub fn days_since_jie(civil: NaiveDateTime, bounds: &JieBounds) -> i64 {
    let days = (civil.date() - bounds.previous.instant.date()).num_days();
    days.max(0)
}
