//! The immutable base tables every computation reads from.

use crate::branch::{build_branches, Branch};
use crate::cycle::{build_cycle, cycle_index, StemBranch};
use crate::elements::{build_elements, Element};
use crate::error::{BaziError, Result};
use crate::stem::{build_stems, Stem};

/// Elements, stems, branches and the sixty-pair cycle, built once from the
/// constant seed arrays and shared by reference.
#[derive(Debug, Clone)]
pub struct Tables {
    pub elements: Vec<Element>,
    pub stems: Vec<Stem>,
    pub branches: Vec<Branch>,
    pub cycle: Vec<StemBranch>,
}

impl Tables {
    /// Build all tables.
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::TableLookupGap`] if the seed arrays disagree with
    /// each other (a relation or hidden stem naming an unknown member).
    pub fn build() -> Result<Self> {
        Ok(Self {
            elements: build_elements()?,
            stems: build_stems()?,
            branches: build_branches()?,
            cycle: build_cycle()?,
        })
    }

    pub fn stem(&self, index: usize) -> Result<&Stem> {
        lookup(&self.stems, index, "stem")
    }

    pub fn branch(&self, index: usize) -> Result<&Branch> {
        lookup(&self.branches, index, "branch")
    }

    /// Cycle entry by index (0 = 甲子).
    pub fn pillar(&self, index: usize) -> Result<&StemBranch> {
        lookup(&self.cycle, index, "cycle entry")
    }

    /// Cycle entry for a stem/branch pair.
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::InvalidInput`] for a pair of mixed parity.
    pub fn pillar_of(&self, stem: usize, branch: usize) -> Result<&StemBranch> {
        self.pillar(cycle_index(stem, branch)?)
    }
}

fn lookup<'a, T>(items: &'a [T], index: usize, what: &str) -> Result<&'a T> {
    items
        .get(index)
        .ok_or_else(|| BaziError::TableLookupGap(format!("no {what} at index {index}")))
}
