//! Polarity (阴阳), the five elements (五行), directions and seasons.
//!
//! Element edges are relation kinds over the element cycle
//! 木 → 火 → 土 → 金 → 水, so they are plain index arithmetic:
//! generation steps forward by one, overcoming by two.

use serde::Serialize;

use crate::error::{BaziError, Result};
use crate::relation::{default_partner, RelationKind};

// ── Polarity ────────────────────────────────────────────────────────────────

/// Yin or Yang. Even positions in the stem and branch cycles are Yang.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    Yin,
    Yang,
}

impl Polarity {
    /// Polarity of a stem or branch index.
    pub fn of_index(index: usize) -> Self {
        if index % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Polarity::Yin => "阴",
            Polarity::Yang => "阳",
        }
    }

    /// `+1` for Yang, `-1` for Yin.
    pub fn value(self) -> i8 {
        match self {
            Polarity::Yin => -1,
            Polarity::Yang => 1,
        }
    }
}

// ── Direction & season ──────────────────────────────────────────────────────

/// Compass direction, ordered like the elements (木 east … 水 north).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    East,
    South,
    Center,
    West,
    North,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::East,
        Direction::South,
        Direction::Center,
        Direction::West,
        Direction::North,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::East => "东",
            Direction::South => "南",
            Direction::Center => "中",
            Direction::West => "西",
            Direction::North => "北",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "春",
            Season::Summer => "夏",
            Season::Autumn => "秋",
            Season::Winter => "冬",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Season::Spring => Direction::East,
            Season::Summer => Direction::South,
            Season::Autumn => Direction::West,
            Season::Winter => Direction::North,
        }
    }
}

// ── Elements ────────────────────────────────────────────────────────────────

pub const ELEMENT_NAMES: [&str; 5] = ["木", "火", "土", "金", "水"];

const ELEMENT_ENGLISH: [&str; 5] = ["Wood", "Fire", "Earth", "Metal", "Water"];

/// River Chart (河图) numbers of each element.
const ELEMENT_NUMBERS: [[u8; 2]; 5] = [[3, 8], [2, 7], [5, 10], [4, 9], [1, 6]];

pub static GENERATES: RelationKind<()> = RelationKind {
    name: "生",
    members: &ELEMENT_NAMES,
    rows: &[],
    default_target: Some(|i| i + 1),
};

pub static GENERATED_BY: RelationKind<()> = RelationKind {
    name: "被生",
    members: &ELEMENT_NAMES,
    rows: &[],
    default_target: Some(|i| i + 4),
};

pub static OVERCOMES: RelationKind<()> = RelationKind {
    name: "克",
    members: &ELEMENT_NAMES,
    rows: &[],
    default_target: Some(|i| i + 2),
};

pub static OVERCOME_BY: RelationKind<()> = RelationKind {
    name: "被克",
    members: &ELEMENT_NAMES,
    rows: &[],
    default_target: Some(|i| i + 3),
};

/// One of the five elements with its cycle edges resolved to indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub index: usize,
    pub name: &'static str,
    pub english: &'static str,
    pub numbers: [u8; 2],
    pub direction: Direction,
    /// The element this one generates.
    pub generates: usize,
    pub generated_by: usize,
    /// The element this one overcomes: `i + 2` in cycle order (木 克 土), not `i + 3`.
    pub overcomes: usize,
    pub overcome_by: usize,
}

impl Element {
    fn build(index: usize) -> Result<Self> {
        let edge = |kind: &RelationKind<()>| element_edge(kind, index);
        Ok(Self {
            index,
            name: ELEMENT_NAMES[index],
            english: ELEMENT_ENGLISH[index],
            numbers: ELEMENT_NUMBERS[index],
            direction: Direction::ALL[index],
            generates: edge(&GENERATES)?,
            generated_by: edge(&GENERATED_BY)?,
            overcomes: edge(&OVERCOMES)?,
            overcome_by: edge(&OVERCOME_BY)?,
        })
    }
}

/// Partner of `index` under a cyclic element kind.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] when the kind yields no partner.
fn element_edge(kind: &RelationKind<()>, index: usize) -> Result<usize> {
    default_partner(kind, index)?.ok_or_else(|| {
        BaziError::TableLookupGap(format!("no {} partner for element {index}", kind.name))
    })
}

/// Build the five elements in cycle order.
pub fn build_elements() -> Result<Vec<Element>> {
    (0..ELEMENT_NAMES.len()).map(Element::build).collect()
}
