/// Skill filter: the list of skills a learner can currently pick from.
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::CatalogIndex;

/// Sentinel for "no subcategory restriction".
pub const ALL_SUBCATEGORIES: &str = "All";

/// Subcategory restriction on the skill list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SubcategoryFilter {
    #[default]
    All,
    Named(String),
}

impl SubcategoryFilter {
    /// `"All"` maps to the sentinel; anything else names a subcategory.
    pub fn parse(value: &str) -> Self {
        if value == ALL_SUBCATEGORIES {
            SubcategoryFilter::All
        } else {
            SubcategoryFilter::Named(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubcategoryFilter::All => ALL_SUBCATEGORIES,
            SubcategoryFilter::Named(name) => name,
        }
    }
}

impl fmt::Display for SubcategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skills selectable under the given subcategory and text query, ascending.
///
/// The query match is a case-insensitive substring test; the returned tokens keep the
/// case they have in the source data. A subcategory no course belongs to yields an
/// empty list.
pub fn available_skills(
    index: &CatalogIndex,
    subcategory: &SubcategoryFilter,
    query: &str,
) -> Vec<String> {
    let candidates: Vec<String> = match subcategory {
        SubcategoryFilter::All => index.vocabulary().to_vec(),
        SubcategoryFilter::Named(name) => index
            .courses()
            .iter()
            .filter(|c| &c.subcategory == name)
            .flat_map(|c| c.skills.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };

    if query.is_empty() {
        return candidates;
    }

    let needle = query.to_lowercase();
    candidates
        .into_iter()
        .filter(|skill| skill.to_lowercase().contains(&needle))
        .collect()
}
