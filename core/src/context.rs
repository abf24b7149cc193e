//! Context Selector
//!
//! Decides how much of the catalog to hand the model for a given query.
//!
//! Rules, in strict priority order:
//! 1. Titles named in the query: only those entries.
//! 2. An exploratory keyword or a genre in the query: the whole catalog.
//! 3. Anything else: nothing, so the model falls back to its refusal policy.

use crate::catalog::{Catalog, CatalogEntry};

/// Phrases that ask for broad, comparative answers over the catalog
pub const GENERAL_KEYWORDS: &[&str] = &[
    "recommend",
    "rating",
    "director",
    "genre",
    "show me",
    "about",
];

/// Which rule matched, and the entries it picked
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// One or more titles were named in the query
    Titles(Vec<&'static CatalogEntry>),
    /// A keyword or genre matched; the full catalog applies
    FullCatalog(&'static [CatalogEntry]),
    /// Nothing relevant
    Nothing,
}

impl Selection {
    /// Entries carried by this selection
    #[must_use]
    pub fn entries(&self) -> Vec<&'static CatalogEntry> {
        match self {
            Self::Titles(entries) => entries.clone(),
            Self::FullCatalog(entries) => entries.iter().collect(),
            Self::Nothing => Vec::new(),
        }
    }

    /// Serialize the selected entries for the prompt.
    ///
    /// Returns an empty string for [`Selection::Nothing`].
    #[must_use]
    pub fn serialize(&self) -> String {
        if matches!(self, Self::Nothing) {
            return String::new();
        }
        // Serializing plain data structs cannot fail
        serde_json::to_string_pretty(&self.entries()).unwrap_or_default()
    }

    /// Short label for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Titles(_) => "titles",
            Self::FullCatalog(_) => "full_catalog",
            Self::Nothing => "nothing",
        }
    }
}

/// Pick the catalog entries relevant to `query`
#[must_use]
pub fn select(query: &str, catalog: &Catalog) -> Selection {
    let query = query.to_lowercase();

    let titled: Vec<&'static CatalogEntry> = catalog
        .entries()
        .iter()
        .filter(|entry| query.contains(&entry.title.to_lowercase()))
        .collect();

    if !titled.is_empty() {
        return Selection::Titles(titled);
    }

    let keyword_hit = GENERAL_KEYWORDS.iter().any(|kw| query.contains(kw));
    let genre_hit = catalog
        .entries()
        .iter()
        .any(|entry| query.contains(&entry.genre.to_lowercase()));

    if keyword_hit || genre_hit {
        Selection::FullCatalog(catalog.entries())
    } else {
        Selection::Nothing
    }
}

/// Serialized grounding context for `query`, or `""` when nothing applies
#[must_use]
pub fn select_context(query: &str, catalog: &Catalog) -> String {
    select(query, catalog).serialize()
}
