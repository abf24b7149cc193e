//! Catalog Store
//!
//! The fixed, read-only set of titles the assistant is allowed to talk about.
//! Entries are defined at compile time and never mutated.

use serde::Serialize;

/// A single title in the catalog
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogEntry {
    /// Display title
    pub title: &'static str,
    /// Release year
    pub year: u16,
    /// Genre label
    pub genre: &'static str,
    /// Director or showrunner
    pub director: &'static str,
    /// Average rating out of 10
    pub rating: f32,
    /// One-paragraph synopsis
    pub summary: &'static str,
}

const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Queen's Gambit",
        year: 2020,
        genre: "Drama",
        director: "Scott Frank",
        rating: 8.5,
        summary: "An orphaned chess prodigy rises through the competitive chess world \
                  of the 1950s and 60s while struggling with addiction.",
    },
    CatalogEntry {
        title: "Inception",
        year: 2010,
        genre: "Sci-Fi",
        director: "Christopher Nolan",
        rating: 8.8,
        summary: "A thief who steals secrets through dream-sharing technology is \
                  offered a chance to erase his past by planting an idea instead.",
    },
    CatalogEntry {
        title: "Breaking Bad",
        year: 2008,
        genre: "Crime Drama",
        director: "Vince Gilligan",
        rating: 9.5,
        summary: "A high school chemistry teacher diagnosed with cancer turns to \
                  manufacturing methamphetamine to secure his family's future.",
    },
    CatalogEntry {
        title: "The Office",
        year: 2005,
        genre: "Comedy",
        director: "Greg Daniels",
        rating: 9.0,
        summary: "A mockumentary following the everyday lives of office employees \
                  at the Scranton branch of a paper company.",
    },
];

/// Read-only view over the catalog entries
#[derive(Clone, Copy, Debug)]
pub struct Catalog {
    entries: &'static [CatalogEntry],
}

impl Catalog {
    /// The built-in catalog
    #[must_use]
    pub fn builtin() -> Self {
        Self { entries: ENTRIES }
    }

    /// All entries, in definition order
    #[must_use]
    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
