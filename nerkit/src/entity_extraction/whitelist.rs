//! Output slot names used to number repeated entity occurrences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NerError;

/// An output slot: a base entity name with an optional numeric index.
///
/// `hero` parses to `(hero, None)` and `hero_2` to `(hero, Some(2))`. Only a
/// trailing `_<digits>` is treated as an index, so `my_hero` stays a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotName {
    /// Registered entity name the slot refers to
    pub base: String,
    /// Occurrence index, if the slot is numbered
    pub index: Option<u32>,
}

impl SlotName {
    /// Parse a slot name.
    pub fn parse(name: &str) -> Self {
        if let Some((base, suffix)) = name.rsplit_once('_')
            && !base.is_empty()
            && !suffix.is_empty()
            && suffix.chars().all(|c| c.is_ascii_digit())
            && let Ok(index) = suffix.parse::<u32>()
        {
            return Self {
                base: base.to_string(),
                index: Some(index),
            };
        }
        Self {
            base: name.to_string(),
            index: None,
        }
    }

    /// Check whether this slot refers to the given base name.
    pub fn refers_to(&self, base: &str) -> bool {
        self.base == base
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}_{}", self.base, index),
            None => f.write_str(&self.base),
        }
    }
}

impl FromStr for SlotName {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NerError::InvalidEntityName(s.to_string()));
        }
        Ok(Self::parse(s))
    }
}

/// Ordered list of slot names requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    slots: Vec<SlotName>,
}

impl Whitelist {
    /// Parse every name once, keeping the caller's order.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            slots: names.iter().map(|n| SlotName::parse(n.as_ref())).collect(),
        }
    }

    /// The parsed slots, in order.
    pub fn slots(&self) -> &[SlotName] {
        &self.slots
    }

    /// Distinct base names, in order of first appearance.
    pub fn bases(&self) -> Vec<&str> {
        let mut bases: Vec<&str> = Vec::new();
        for slot in &self.slots {
            if !bases.contains(&slot.base.as_str()) {
                bases.push(&slot.base);
            }
        }
        bases
    }

    /// Check whether any slot refers to `base`.
    pub fn contains_base(&self, base: &str) -> bool {
        self.slots.iter().any(|s| s.refers_to(base))
    }

    /// Slots that refer to `base`, in whitelist order.
    pub fn slots_for<'a>(&'a self, base: &'a str) -> impl Iterator<Item = &'a SlotName> + 'a {
        self.slots.iter().filter(move |s| s.refers_to(base))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the whitelist is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|n| SlotName::parse(n.as_ref()))
                .collect(),
        }
    }
}
