//! The sexagenary cycle (六十甲子) and Na Yin (纳音).
//!
//! Entry `i` pairs stem `i mod 10` with branch `i mod 12`. Only pairs of
//! equal parity exist, and the index of a pair is recovered by
//! `(6·stem − 5·branch) mod 60`.

use serde::Serialize;

use crate::branch::BRANCH_NAMES;
use crate::elements::ELEMENT_NAMES;
use crate::error::{BaziError, Result};
use crate::stem::STEM_NAMES;

pub const CYCLE_LEN: usize = 60;

/// Na Yin of each consecutive pair of the cycle.
const NA_YIN: [(&str, &str, &str); 30] = [
    ("甲子", "乙丑", "海中金"),
    ("丙寅", "丁卯", "炉中火"),
    ("戊辰", "己巳", "大林木"),
    ("庚午", "辛未", "路旁土"),
    ("壬申", "癸酉", "剑锋金"),
    ("甲戌", "乙亥", "山头火"),
    ("丙子", "丁丑", "涧下水"),
    ("戊寅", "己卯", "城头土"),
    ("庚辰", "辛巳", "白蜡金"),
    ("壬午", "癸未", "杨柳木"),
    ("甲申", "乙酉", "泉中水"),
    ("丙戌", "丁亥", "屋上土"),
    ("戊子", "己丑", "霹雳火"),
    ("庚寅", "辛卯", "松柏木"),
    ("壬辰", "癸巳", "长流水"),
    ("甲午", "乙未", "沙中金"),
    ("丙申", "丁酉", "山下火"),
    ("戊戌", "己亥", "平地木"),
    ("庚子", "辛丑", "壁上土"),
    ("壬寅", "癸卯", "金箔金"),
    ("甲辰", "乙巳", "覆灯火"),
    ("丙午", "丁未", "天河水"),
    ("戊申", "己酉", "大驿土"),
    ("庚戌", "辛亥", "钗钏金"),
    ("壬子", "癸丑", "桑柘木"),
    ("甲寅", "乙卯", "大溪水"),
    ("丙辰", "丁巳", "沙中土"),
    ("戊午", "己未", "天上火"),
    ("庚申", "辛酉", "石榴木"),
    ("壬戌", "癸亥", "大海水"),
];

/// The "sound" element attached to a stem-branch pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NaYin {
    pub name: &'static str,
    /// Index into the element table.
    pub element: usize,
}

/// One of the sixty stem-branch pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StemBranch {
    pub index: usize,
    /// Two-character name, e.g. `甲子`.
    pub name: String,
    /// Index into the stem table.
    pub stem: usize,
    /// Index into the branch table.
    pub branch: usize,
    pub na_yin: NaYin,
}

impl StemBranch {
    /// Build cycle entry `index` (0 = 甲子).
    pub fn build(index: usize) -> Result<Self> {
        if index >= CYCLE_LEN {
            return Err(BaziError::TableLookupGap(format!(
                "no cycle entry at index {index}"
            )));
        }
        let stem = index % 10;
        let branch = index % 12;
        let name = format!("{}{}", STEM_NAMES[stem], BRANCH_NAMES[branch]);
        let na_yin = na_yin(&name)?;
        Ok(Self {
            index,
            name,
            stem,
            branch,
            na_yin,
        })
    }
}

/// Look up the Na Yin of a two-character stem-branch name.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] if the name is not in the cycle.
pub fn na_yin(name: &str) -> Result<NaYin> {
    let &(_, _, sound) = NA_YIN
        .iter()
        .find(|(first, second, _)| *first == name || *second == name)
        .ok_or_else(|| BaziError::TableLookupGap(format!("no Na Yin for '{name}'")))?;

    // The element is the last character of the name.
    let element = ELEMENT_NAMES
        .iter()
        .position(|element| sound.ends_with(element))
        .ok_or_else(|| BaziError::TableLookupGap(format!("Na Yin '{sound}' has no element")))?;

    Ok(NaYin {
        name: sound,
        element,
    })
}

/// Cycle index of a stem-branch pair.
///
/// # Errors
///
/// Returns [`BaziError::InvalidInput`] for an out-of-range index or a pair of
/// mixed parity (such as 甲丑), which never occurs in the cycle.
///
/// # Examples
///
/// ```
/// use bazi_engine::cycle::cycle_index;
///
/// assert_eq!(cycle_index(0, 10).unwrap(), 10); // 甲戌
/// assert!(cycle_index(0, 1).is_err());
/// ```
pub fn cycle_index(stem: usize, branch: usize) -> Result<usize> {
    if stem >= 10 || branch >= 12 || stem % 2 != branch % 2 {
        return Err(BaziError::InvalidInput(format!(
            "stem {stem} and branch {branch} do not form a cycle pair"
        )));
    }
    let index = (6 * stem as i64 - 5 * branch as i64).rem_euclid(CYCLE_LEN as i64);
    Ok(index as usize)
}

/// Step `steps` entries through the cycle from `index` (negative steps go back).
pub fn step(index: usize, steps: i64) -> usize {
    (index as i64 + steps).rem_euclid(CYCLE_LEN as i64) as usize
}

/// Build all sixty entries in cycle order.
pub fn build_cycle() -> Result<Vec<StemBranch>> {
    (0..CYCLE_LEN).map(StemBranch::build).collect()
}
