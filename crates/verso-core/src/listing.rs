//! Listing windows and paged results.
//!
//! A [`ListingContext`] describes which slice of a listing the caller wants
//! and how it should be ordered. A [`PagingResult`] carries one page back
//! together with the total count and whether more items exist.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::properties;
use crate::types::Document;

/// Default number of items per listing page.
pub const DEFAULT_MAX_ITEMS: u32 = 50;

/// Document attribute a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortProperty {
    #[default]
    Name,
    Title,
    Description,
    CreatedAt,
    ModifiedAt,
}

impl SortProperty {
    /// Repository property id used when the server does the ordering.
    #[must_use]
    pub const fn query_name(self) -> &'static str {
        match self {
            Self::Name => properties::NAME,
            Self::Title => properties::TITLE,
            Self::Description => properties::DESCRIPTION,
            Self::CreatedAt => properties::CREATION_DATE,
            Self::ModifiedAt => properties::LAST_MODIFICATION_DATE,
        }
    }

    /// Inverse of [`SortProperty::query_name`].
    #[must_use]
    pub fn from_query_name(name: &str) -> Option<Self> {
        [
            Self::Name,
            Self::Title,
            Self::Description,
            Self::CreatedAt,
            Self::ModifiedAt,
        ]
        .into_iter()
        .find(|p| p.query_name() == name)
    }

    /// Ascending comparison of two documents on this attribute.
    ///
    /// Missing values order before present ones.
    #[must_use]
    pub fn compare(self, a: &Document, b: &Document) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Title => a.title.cmp(&b.title),
            Self::Description => a.description.cmp(&b.description),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::ModifiedAt => a.modified_at.cmp(&b.modified_at),
        }
    }
}

impl fmt::Display for SortProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::Description => "description",
            Self::CreatedAt => "created",
            Self::ModifiedAt => "modified",
        };
        f.write_str(s)
    }
}

/// Error type for parsing a SortProperty from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPropertyParseError(pub String);

impl fmt::Display for SortPropertyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sort property '{}': expected name, title, description, created or modified",
            self.0
        )
    }
}

impl std::error::Error for SortPropertyParseError {}

impl FromStr for SortProperty {
    type Err = SortPropertyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "created" | "created_at" => Ok(Self::CreatedAt),
            "modified" | "modified_at" => Ok(Self::ModifiedAt),
            _ => Err(SortPropertyParseError(s.to_string())),
        }
    }
}

/// Window and ordering requested for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingContext {
    pub sort_property: SortProperty,
    pub sort_ascending: bool,
    /// Maximum number of items in the returned page.
    pub max_items: u32,
    /// Number of leading items to skip.
    pub skip_count: u32,
}

impl Default for ListingContext {
    fn default() -> Self {
        Self {
            sort_property: SortProperty::Name,
            sort_ascending: true,
            max_items: DEFAULT_MAX_ITEMS,
            skip_count: 0,
        }
    }
}

impl ListingContext {
    #[must_use]
    pub fn with_skip_count(mut self, skip_count: u32) -> Self {
        self.skip_count = skip_count;
        self
    }

    #[must_use]
    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, property: SortProperty, ascending: bool) -> Self {
        self.sort_property = property;
        self.sort_ascending = ascending;
        self
    }

    /// Server-side ordering clause, e.g. `"cmis:name ASC"`.
    #[must_use]
    pub fn order_by(&self) -> String {
        order_by(self.sort_property, self.sort_ascending)
    }

    /// Orders two documents per this context's property and direction.
    #[must_use]
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = self.sort_property.compare(a, b);
        if self.sort_ascending { ord } else { ord.reverse() }
    }
}

/// Renders an ordering clause for the given property and direction.
#[must_use]
pub fn order_by(property: SortProperty, ascending: bool) -> String {
    format!(
        "{} {}",
        property.query_name(),
        if ascending { "ASC" } else { "DESC" }
    )
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingResult<T> {
    pub items: Vec<T>,
    /// True iff items exist beyond this page.
    pub has_more_items: bool,
    /// Size of the whole listing, not of this page.
    pub total_items: u64,
}

impl<T> PagingResult<T> {
    #[must_use]
    pub fn new(items: Vec<T>, has_more_items: bool, total_items: u64) -> Self {
        Self {
            items,
            has_more_items,
            total_items,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops the paging metadata and returns the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
