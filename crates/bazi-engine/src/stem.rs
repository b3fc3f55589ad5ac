//! The ten Heavenly Stems (天干).

use serde::Serialize;

use crate::elements::{Direction, Element, Polarity};
use crate::error::{BaziError, Result};
use crate::relation::{relate, Relation, RelationKind, RelationRow, Target};

pub const STEM_NAMES: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

/// What a stem five-combination (五合) transforms into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StemCombination {
    /// Element produced by the combination.
    pub element: &'static str,
    pub description: &'static str,
}

const fn combination(element: &'static str, description: &'static str) -> StemCombination {
    StemCombination {
        element,
        description,
    }
}

#[rustfmt::skip]
pub static STEM_COMBINATION: RelationKind<StemCombination> = RelationKind {
    name: "五合",
    members: &STEM_NAMES,
    rows: &[
        RelationRow { members: &["甲", "己"], payload: combination("土", "中正之合") },
        RelationRow { members: &["乙", "庚"], payload: combination("金", "仁义之合") },
        RelationRow { members: &["丙", "辛"], payload: combination("水", "威制之合") },
        RelationRow { members: &["丁", "壬"], payload: combination("木", "淫慝之合") },
        RelationRow { members: &["戊", "癸"], payload: combination("火", "无情之合") },
    ],
    default_target: Some(|i| i + 5),
};

/// Stem clashes (相冲). 戊 and 己 sit in the centre and clash with nothing.
#[rustfmt::skip]
pub static STEM_CLASH: RelationKind<()> = RelationKind {
    name: "相冲",
    members: &STEM_NAMES,
    rows: &[
        RelationRow { members: &["甲", "庚"], payload: () },
        RelationRow { members: &["乙", "辛"], payload: () },
        RelationRow { members: &["丙", "壬"], payload: () },
        RelationRow { members: &["丁", "癸"], payload: () },
    ],
    // Six steps ahead in the first half, four (six back) in the second.
    default_target: Some(|i| if i < 6 { i + 6 } else { i + 4 }),
};

/// Ten Gods (十神) by relation, each as [same polarity, opposite polarity].
const TEN_GOD_NAMES: [[&str; 2]; 5] = [
    ["比肩", "劫财"],
    ["偏印", "正印"],
    ["食神", "伤官"],
    ["七杀", "正官"],
    ["偏财", "正财"],
];

/// A Heavenly Stem with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stem {
    pub index: usize,
    pub name: &'static str,
    pub polarity: Polarity,
    /// Index into the element table.
    pub element: usize,
    pub direction: Direction,
    /// Stem of the first (寅) month in a year with this year stem (五虎遁).
    pub first_month_stem: usize,
    /// Stem of the first (子) hour on a day with this day stem (五鼠遁).
    pub first_hour_stem: usize,
    pub combination: Option<Relation<StemCombination>>,
    pub clash: Option<Relation<()>>,
}

impl Stem {
    /// Build the stem at `index` (0 = 甲).
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::TableLookupGap`] for an index outside 0–9.
    pub fn build(index: usize) -> Result<Self> {
        let name = *STEM_NAMES
            .get(index)
            .ok_or_else(|| BaziError::TableLookupGap(format!("no stem at index {index}")))?;
        let element = index / 2;
        Ok(Self {
            index,
            name,
            polarity: Polarity::of_index(index),
            element,
            direction: Direction::ALL[element],
            first_month_stem: ((index + 1) % 5) * 2,
            first_hour_stem: (index % 5) * 2,
            combination: relate(&STEM_COMBINATION, index, Target::Default)?,
            clash: relate(&STEM_CLASH, index, Target::Default)?,
        })
    }

    /// Index of the stem this one combines with, if any.
    pub fn combination_partner(&self) -> Option<usize> {
        partner(&self.combination)
    }
}

fn partner<P>(relation: &Option<Relation<P>>) -> Option<usize> {
    relation
        .as_ref()
        .and_then(|relation| relation.partners.first())
        .map(|member| member.index)
}

/// Build all ten stems in cycle order.
pub fn build_stems() -> Result<Vec<Stem>> {
    (0..STEM_NAMES.len()).map(Stem::build).collect()
}

/// Ten God of `other` as seen from the day stem `me`.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] if either stem's element is missing
/// from `elements`.
pub fn ten_god(me: &Stem, other: &Stem, elements: &[Element]) -> Result<&'static str> {
    let lookup = |index: usize| {
        elements
            .get(index)
            .ok_or_else(|| BaziError::TableLookupGap(format!("no element at index {index}")))
    };
    let mine = lookup(me.element)?;
    let theirs = lookup(other.element)?;

    let row = if mine.index == theirs.index {
        0
    } else if theirs.generates == mine.index {
        1
    } else if mine.generates == theirs.index {
        2
    } else if theirs.overcomes == mine.index {
        3
    } else {
        4
    };
    let column = usize::from(me.polarity != other.polarity);
    Ok(TEN_GOD_NAMES[row][column])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::build_elements;

    fn stem(index: usize) -> Stem {
        Stem::build(index).unwrap()
    }

    #[test]
    fn test_polarity_and_element() {
        let bing = stem(2);
        assert_eq!(bing.name, "丙");
        assert_eq!(bing.polarity, Polarity::Yang);
        assert_eq!(bing.element, 1);
        assert_eq!(bing.direction, Direction::South);
        assert_eq!(stem(9).polarity, Polarity::Yin);
        assert_eq!(stem(9).element, 4);
    }

    #[test]
    fn test_five_tigers() {
        // 甲/己 years open with 丙寅; 戊/癸 years with 甲寅.
        assert_eq!(stem(0).first_month_stem, 2);
        assert_eq!(stem(5).first_month_stem, 2);
        assert_eq!(stem(4).first_month_stem, 0);
        assert_eq!(stem(9).first_month_stem, 0);
    }

    #[test]
    fn test_five_rats() {
        // 甲/己 days open with 甲子; 乙/庚 days with 丙子.
        assert_eq!(stem(0).first_hour_stem, 0);
        assert_eq!(stem(5).first_hour_stem, 0);
        assert_eq!(stem(1).first_hour_stem, 2);
        assert_eq!(stem(9).first_hour_stem, 8);
    }

    #[test]
    fn test_combination() {
        let jia = stem(0);
        let he = jia.combination.as_ref().unwrap();
        assert_eq!(he.partners[0].name, "己");
        assert_eq!(he.payload.element, "土");
        assert_eq!(stem(8).combination_partner(), Some(3));
    }

    #[test]
    fn test_clash_skips_centre() {
        assert_eq!(stem(0).clash.as_ref().unwrap().partners[0].name, "庚");
        assert_eq!(stem(7).clash.as_ref().unwrap().partners[0].name, "乙");
        assert!(stem(4).clash.is_none());
        assert!(stem(5).clash.is_none());
    }

    #[test]
    fn test_build_out_of_range() {
        assert!(Stem::build(10).is_err());
    }

    #[test]
    fn test_ten_gods_from_jia() {
        let elements = build_elements().unwrap();
        let jia = stem(0);
        let god = |i| ten_god(&jia, &stem(i), &elements).unwrap();
        assert_eq!(god(0), "比肩");
        assert_eq!(god(1), "劫财");
        assert_eq!(god(2), "食神");
        assert_eq!(god(3), "伤官");
        assert_eq!(god(4), "偏财");
        assert_eq!(god(5), "正财");
        assert_eq!(god(6), "七杀");
        assert_eq!(god(7), "正官");
        assert_eq!(god(8), "偏印");
        assert_eq!(god(9), "正印");
    }

    #[test]
    fn test_ten_gods_from_yin_stem() {
        let elements = build_elements().unwrap();
        let ji = stem(5);
        // 己 Earth: 丙 Fire generates it with opposite polarity.
        assert_eq!(ten_god(&ji, &stem(2), &elements).unwrap(), "正印");
        assert_eq!(ten_god(&ji, &stem(1), &elements).unwrap(), "七杀");
    }
}
