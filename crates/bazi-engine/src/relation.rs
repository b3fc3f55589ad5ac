//! Table-driven relations between named members of a fixed cycle.
//!
//! Every stem/branch/element interaction (combinations, clashes, trines,
//! generation and overcoming) is the same lookup over a different
//! [`RelationKind`]: an ordered member list, an optional table of rows, and
//! an optional formula giving the default partner of a member. The kinds are
//! `static` data; [`relate`] is the only logic.

use serde::Serialize;

use crate::error::{BaziError, Result};

/// A row of a relation table: the participating members and what the
/// relation yields.
#[derive(Debug)]
pub struct RelationRow<P: 'static> {
    pub members: &'static [&'static str],
    pub payload: P,
}

/// Description of one kind of relation.
#[derive(Debug)]
pub struct RelationKind<P: 'static> {
    /// Display name, e.g. `五合`.
    pub name: &'static str,
    /// Member names in cycle order; a member's index is its position here.
    pub members: &'static [&'static str],
    /// Rows of related members. Empty for reflexive kinds, where any two
    /// distinct members relate.
    pub rows: &'static [RelationRow<P>],
    /// Default partner of the member at an index. `None` for group kinds
    /// (trines, triads) where the row itself names the partners.
    pub default_target: Option<fn(usize) -> usize>,
}

/// Who the caller is being related to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The kind's default partner, or any row holding the caller.
    Default,
    Name(&'a str),
    Index(usize),
}

/// A member of a relation, by name and cycle index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: &'static str,
    pub index: usize,
}

/// A matched relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation<P> {
    /// Kind that matched, e.g. `六合`.
    pub kind: &'static str,
    /// The caller.
    pub name: &'static str,
    pub index: usize,
    /// The other members of the matched row (or the target, for reflexive kinds).
    pub partners: Vec<Member>,
    pub payload: P,
}

impl<P> RelationKind<P> {
    /// Cycle index of a member name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| *member == name)
    }

    fn member(&self, index: usize) -> Result<Member> {
        self.members
            .get(index)
            .map(|&name| Member { name, index })
            .ok_or_else(|| {
                BaziError::TableLookupGap(format!(
                    "{} has no member at index {index}",
                    self.name
                ))
            })
    }

    fn resolve(&self, caller: usize, target: Target<'_>) -> Result<Option<Member>> {
        match target {
            Target::Default => match self.default_target {
                Some(formula) => self.member(formula(caller) % self.members.len()).map(Some),
                None => Ok(None),
            },
            Target::Index(index) => self.member(index).map(Some),
            Target::Name(name) => {
                let index = self.index_of(name).ok_or_else(|| {
                    BaziError::TableLookupGap(format!("'{name}' is not a member of {}", self.name))
                })?;
                Ok(Some(Member {
                    name: self.members[index],
                    index,
                }))
            }
        }
    }
}

/// Relate the member at `caller` to `target` under `kind`.
///
/// Returns `Ok(None)` when the two do not relate, and never relates a member
/// to itself. With [`Target::Default`] on a kind that has no default formula,
/// the first row containing the caller matches and all other members of that
/// row become partners.
///
/// # Errors
///
/// Returns [`BaziError::TableLookupGap`] if `caller` or `target` is not a
/// member of the kind.
///
/// # Examples
///
/// ```
/// use bazi_engine::relation::{relate, Target};
/// use bazi_engine::stem::STEM_COMBINATION;
///
/// // 甲 (0) combines with 己 by default.
/// let he = relate(&STEM_COMBINATION, 0, Target::Default).unwrap().unwrap();
/// assert_eq!(he.partners[0].name, "己");
/// ```
pub fn relate<P: Clone + Default>(
    kind: &RelationKind<P>,
    caller: usize,
    target: Target<'_>,
) -> Result<Option<Relation<P>>> {
    let me = kind.member(caller)?;
    let target = kind.resolve(caller, target)?;
    if target.is_some_and(|t| t.index == me.index) {
        return Ok(None);
    }

    if kind.rows.is_empty() {
        return Ok(target.map(|partner| Relation {
            kind: kind.name,
            name: me.name,
            index: me.index,
            partners: vec![partner],
            payload: P::default(),
        }));
    }

    let matched = kind.rows.iter().find(|row| {
        row.members.contains(&me.name)
            && target.is_none_or(|partner| row.members.contains(&partner.name))
    });

    let Some(row) = matched else {
        return Ok(None);
    };

    let partners = match target {
        Some(partner) => vec![partner],
        None => row
            .members
            .iter()
            .filter(|name| **name != me.name)
            .map(|&name| {
                kind.index_of(name)
                    .map(|index| Member { name, index })
                    .ok_or_else(|| {
                        BaziError::TableLookupGap(format!(
                            "row member '{name}' is not a member of {}",
                            kind.name
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Some(Relation {
        kind: kind.name,
        name: me.name,
        index: me.index,
        partners,
        payload: row.payload.clone(),
    }))
}

/// First partner index of a default relation, or `None` when there is none.
pub fn default_partner<P: Clone + Default>(
    kind: &RelationKind<P>,
    caller: usize,
) -> Result<Option<usize>> {
    let relation = relate(kind, caller, Target::Default)?;
    Ok(relation.and_then(|r| r.partners.first().map(|m| m.index)))
}
