//! Facets of the game state and the text blocks rendered from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One retrievable facet of the game state.
///
/// Declaration order is the tie-break order used when two blocks score the
/// same against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// The character sheet.
    Character,
    /// The campaign description.
    Campaign,
    /// The task list.
    Todos,
    /// The optional rules text.
    Rules,
}

impl Facet {
    /// Returns all facets in tie-break order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Character, Self::Campaign, Self::Todos, Self::Rules]
    }

    /// Returns the facet label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Campaign => "campaign",
            Self::Todos => "todos",
            Self::Rules => "rules",
        }
    }

    /// Returns the heading the rendered block starts with.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::Character => "Character Stats:",
            Self::Campaign => "Campaign Info:",
            Self::Todos => "Current Todo List:",
            Self::Rules => "Game Rules:",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human-readable rendering of one facet, tagged with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    /// Which facet this block renders.
    pub facet: Facet,
    /// The rendered text, starting with the facet heading.
    pub text: String,
}

impl ContextBlock {
    /// Creates a block for a facet from its body text.
    #[must_use]
    pub fn new(facet: Facet, body: &str) -> Self {
        let separator = if matches!(facet, Facet::Todos | Facet::Rules) {
            "\n"
        } else {
            " "
        };
        Self {
            facet,
            text: format!("{}{separator}{body}", facet.heading()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_labels_are_distinct() {
        let labels: std::collections::BTreeSet<&str> =
            Facet::all().iter().map(Facet::as_str).collect();
        assert_eq!(labels.len(), Facet::all().len());
        assert_eq!(Facet::Todos.to_string(), Facet::Todos.as_str());
    }

    #[test]
    fn test_facet_order_is_tie_break_order() {
        let mut facets = vec![Facet::Rules, Facet::Todos, Facet::Character, Facet::Campaign];
        facets.sort();
        assert_eq!(facets, Facet::all());
    }

    #[test]
    fn test_block_headings() {
        let block = ContextBlock::new(Facet::Todos, "1. Train");
        assert_eq!(block.text, "Current Todo List:\n1. Train");

        let block = ContextBlock::new(Facet::Character, "{}");
        assert_eq!(block.text, "Character Stats: {}");
    }
}
