//! The twelve Earthly Branches (地支), their hidden stems and relations.

use serde::Serialize;

use crate::elements::{Direction, Polarity, Season};
use crate::error::{BaziError, Result};
use crate::relation::{relate, Relation, RelationKind, RelationRow, Target};
use crate::stem::STEM_NAMES;

pub const BRANCH_NAMES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

pub const ANIMALS: [&str; 12] = [
    "鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪",
];

/// Hidden stems (藏干) of each branch: primary, middle and residual qi.
const HIDDEN_STEMS: [&[&str]; 12] = [
    &["癸"],
    &["己", "辛", "癸"],
    &["甲", "丙", "戊"],
    &["乙"],
    &["戊", "癸", "乙"],
    &["丙", "庚", "戊"],
    &["丁", "己"],
    &["己", "乙", "丁"],
    &["庚", "壬", "戊"],
    &["辛"],
    &["戊", "丁", "辛"],
    &["壬", "甲"],
];

const QI_NAMES: [&str; 3] = ["本气", "中气", "余气"];

/// What a branch six-combination (六合) transforms into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchCombination {
    pub element: &'static str,
    /// Some pairs are also read as a second element.
    pub second_element: Option<&'static str>,
    pub description: &'static str,
}

const fn combination(
    element: &'static str,
    second_element: Option<&'static str>,
    description: &'static str,
) -> BranchCombination {
    BranchCombination {
        element,
        second_element,
        description,
    }
}

#[rustfmt::skip]
pub static BRANCH_COMBINATION: RelationKind<BranchCombination> = RelationKind {
    name: "六合",
    members: &BRANCH_NAMES,
    rows: &[
        RelationRow { members: &["子", "丑"], payload: combination("土", Some("水"), "泥合") },
        RelationRow { members: &["寅", "亥"], payload: combination("木", None, "义合") },
        RelationRow { members: &["卯", "戌"], payload: combination("火", None, "淫合") },
        RelationRow { members: &["辰", "酉"], payload: combination("金", None, "融合") },
        RelationRow { members: &["巳", "申"], payload: combination("水", None, "刑合") },
        RelationRow { members: &["午", "未"], payload: combination("土", Some("火"), "和合") },
    ],
    default_target: Some(|i| 13 - i),
};

#[rustfmt::skip]
pub static BRANCH_CLASH: RelationKind<()> = RelationKind {
    name: "六冲",
    members: &BRANCH_NAMES,
    rows: &[
        RelationRow { members: &["子", "午"], payload: () },
        RelationRow { members: &["丑", "未"], payload: () },
        RelationRow { members: &["寅", "申"], payload: () },
        RelationRow { members: &["卯", "酉"], payload: () },
        RelationRow { members: &["辰", "戌"], payload: () },
        RelationRow { members: &["巳", "亥"], payload: () },
    ],
    default_target: Some(|i| i + 6),
};

/// Three-branch harmony (三合); the payload is the resulting element.
#[rustfmt::skip]
pub static BRANCH_TRINE: RelationKind<&'static str> = RelationKind {
    name: "三合",
    members: &BRANCH_NAMES,
    rows: &[
        RelationRow { members: &["申", "子", "辰"], payload: "水" },
        RelationRow { members: &["寅", "午", "戌"], payload: "火" },
        RelationRow { members: &["巳", "酉", "丑"], payload: "金" },
        RelationRow { members: &["亥", "卯", "未"], payload: "木" },
    ],
    default_target: None,
};

/// Seasonal assembly (三会); the payload is the season's element.
#[rustfmt::skip]
pub static BRANCH_TRIAD: RelationKind<&'static str> = RelationKind {
    name: "三会",
    members: &BRANCH_NAMES,
    rows: &[
        RelationRow { members: &["寅", "卯", "辰"], payload: "木" },
        RelationRow { members: &["巳", "午", "未"], payload: "火" },
        RelationRow { members: &["申", "酉", "戌"], payload: "金" },
        RelationRow { members: &["亥", "子", "丑"], payload: "水" },
    ],
    default_target: None,
};

/// A stem stored inside a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenStem {
    /// Index into the stem table.
    pub stem: usize,
    pub name: &'static str,
    /// `本气`, `中气` or `余气`.
    pub qi: &'static str,
}

/// An Earthly Branch with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub index: usize,
    pub name: &'static str,
    pub animal: &'static str,
    pub polarity: Polarity,
    /// Index into the element table.
    pub element: usize,
    pub season: Season,
    pub direction: Direction,
    pub hidden_stems: Vec<HiddenStem>,
    pub combination: Option<Relation<BranchCombination>>,
    pub clash: Option<Relation<()>>,
    pub trine: Option<Relation<&'static str>>,
    pub triad: Option<Relation<&'static str>>,
}

impl Branch {
    /// Build the branch at `index` (0 = 子).
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::TableLookupGap`] for an index outside 0–11.
    pub fn build(index: usize) -> Result<Self> {
        let name = *BRANCH_NAMES
            .get(index)
            .ok_or_else(|| BaziError::TableLookupGap(format!("no branch at index {index}")))?;

        // Count from 寅, the first month; the last branch of each season is Earth.
        let from_spring = (index + 10) % 12;
        let season = Season::ALL[from_spring / 3];
        let element = if from_spring % 3 == 2 {
            2
        } else {
            match season {
                Season::Spring => 0,
                Season::Summer => 1,
                Season::Autumn => 3,
                Season::Winter => 4,
            }
        };

        Ok(Self {
            index,
            name,
            animal: ANIMALS[index],
            polarity: Polarity::of_index(index),
            element,
            season,
            direction: season.direction(),
            hidden_stems: hidden_stems(index)?,
            combination: relate(&BRANCH_COMBINATION, index, Target::Default)?,
            clash: relate(&BRANCH_CLASH, index, Target::Default)?,
            trine: relate(&BRANCH_TRINE, index, Target::Default)?,
            triad: relate(&BRANCH_TRIAD, index, Target::Default)?,
        })
    }

    /// Index of the branch this one six-combines with.
    pub fn combination_partner(&self) -> Option<usize> {
        self.combination
            .as_ref()
            .and_then(|relation| relation.partners.first())
            .map(|member| member.index)
    }
}

fn hidden_stems(index: usize) -> Result<Vec<HiddenStem>> {
    HIDDEN_STEMS[index]
        .iter()
        .zip(QI_NAMES)
        .map(|(&name, qi)| {
            let stem = STEM_NAMES.iter().position(|s| *s == name).ok_or_else(|| {
                BaziError::TableLookupGap(format!("hidden stem '{name}' is not a stem"))
            })?;
            Ok(HiddenStem { stem, name, qi })
        })
        .collect()
}

/// Build all twelve branches in cycle order.
pub fn build_branches() -> Result<Vec<Branch>> {
    (0..BRANCH_NAMES.len()).map(Branch::build).collect()
}
