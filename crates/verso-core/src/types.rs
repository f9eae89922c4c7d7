//! Core data types for the verso repository client.
//!
//! This module defines the handles the version subsystem hands out:
//!
//! - Typed identifiers for repository objects and version series
//! - `Document` and `Folder` node variants
//! - `Node`, the tagged union the conversion layer produces
//!
//! Handles are immutable snapshots of repository state. A new handle is
//! produced for every version or working copy; nothing here is updated in
//! place after it has been obtained from the repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw property map attached to every node, keyed by property id.
pub type Properties = BTreeMap<String, serde_json::Value>;

// ============================================================================
// ID Types
// ============================================================================

/// Identifier of a single repository object.
///
/// Every version of a document, and every private working copy, has its own
/// `ObjectId`. The repository chooses the format; the client treats it as
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an ObjectId from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty (never valid remotely).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Grouping key shared by all versions of one logical document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSeriesId(String);

impl VersionSeriesId {
    /// Creates a VersionSeriesId from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for VersionSeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionSeriesId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VersionSeriesId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// Node Variants
// ============================================================================

/// A point-in-time handle on one version of a document (or on a private
/// working copy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of this exact version or working copy.
    pub id: ObjectId,

    /// Document name.
    pub name: String,

    /// Optional human-readable title.
    pub title: Option<String>,

    /// Optional description.
    pub description: Option<String>,

    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,

    /// Series this version belongs to. Version operations require it.
    pub version_series_id: Option<VersionSeriesId>,

    /// Repository-assigned label such as "1.0" or "2.3".
    pub version_label: Option<String>,

    pub is_latest_version: bool,
    pub is_major_version: bool,

    /// True for the mutable copy created by a checkout.
    pub is_private_working_copy: bool,

    /// Working copy currently checked out from this document's series, as
    /// reported by the repository when the handle was fetched.
    pub checked_out_id: Option<ObjectId>,

    /// Content size in bytes, if the document has content.
    pub content_length: Option<u64>,

    /// Content MIME type, if the document has content.
    pub content_mime_type: Option<String>,

    /// Every property the repository returned, including the ones above.
    pub properties: Properties,
}

impl Document {
    /// Creates a builder for a document with the given identifier.
    #[must_use]
    pub fn builder(id: impl Into<ObjectId>) -> DocumentBuilder {
        DocumentBuilder::new(id.into())
    }

    /// Looks up a raw property by id.
    #[must_use]
    pub fn property(&self, id: &str) -> Option<&serde_json::Value> {
        self.properties.get(id)
    }
}

/// Builder for constructing Document instances.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    fn new(id: ObjectId) -> Self {
        Self {
            document: Document {
                id,
                name: String::new(),
                title: None,
                description: None,
                created_by: None,
                created_at: None,
                modified_by: None,
                modified_at: None,
                version_series_id: None,
                version_label: None,
                is_latest_version: false,
                is_major_version: false,
                is_private_working_copy: false,
                checked_out_id: None,
                content_length: None,
                content_mime_type: None,
                properties: Properties::new(),
            },
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.document.name = name.into();
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.document.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.document.description = Some(description.into());
        self
    }

    /// Sets creator and creation time.
    #[must_use]
    pub fn created(mut self, by: Option<String>, at: Option<DateTime<Utc>>) -> Self {
        self.document.created_by = by;
        self.document.created_at = at;
        self
    }

    /// Sets last modifier and modification time.
    #[must_use]
    pub fn modified(mut self, by: Option<String>, at: Option<DateTime<Utc>>) -> Self {
        self.document.modified_by = by;
        self.document.modified_at = at;
        self
    }

    #[must_use]
    pub fn version_series(mut self, series: impl Into<VersionSeriesId>) -> Self {
        self.document.version_series_id = Some(series.into());
        self
    }

    #[must_use]
    pub fn version_label(mut self, label: impl Into<String>) -> Self {
        self.document.version_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn latest_version(mut self, latest: bool) -> Self {
        self.document.is_latest_version = latest;
        self
    }

    #[must_use]
    pub fn major_version(mut self, major: bool) -> Self {
        self.document.is_major_version = major;
        self
    }

    #[must_use]
    pub fn private_working_copy(mut self, pwc: bool) -> Self {
        self.document.is_private_working_copy = pwc;
        self
    }

    #[must_use]
    pub fn checked_out_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.document.checked_out_id = Some(id.into());
        self
    }

    /// Sets content length and MIME type.
    #[must_use]
    pub fn content(mut self, length: u64, mime_type: impl Into<String>) -> Self {
        self.document.content_length = Some(length);
        self.document.content_mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: Properties) -> Self {
        self.document.properties = properties;
        self
    }

    #[must_use]
    pub fn build(self) -> Document {
        self.document
    }
}

/// A folder node. The version subsystem never returns folders, but the
/// conversion layer can produce them and callers must be able to tell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: ObjectId,
    pub name: String,
    pub parent_id: Option<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub properties: Properties,
}

/// Any repository node, as produced by the conversion layer.
///
/// Callers that need a document must narrow explicitly with
/// [`Node::as_document`] or [`Node::into_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Document(Document),
    Folder(Folder),
}

impl Node {
    /// Identifier of the underlying object.
    #[must_use]
    pub fn id(&self) -> &ObjectId {
        match self {
            Self::Document(d) => &d.id,
            Self::Folder(f) => &f.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Document(d) => &d.name,
            Self::Folder(f) => &f.name,
        }
    }

    #[must_use]
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(d) => Some(d),
            Self::Folder(_) => None,
        }
    }

    /// Narrows to a document, discarding any other variant.
    #[must_use]
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Document(d) => Some(d),
            Self::Folder(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str) -> Folder {
        Folder {
            id: ObjectId::new(id),
            name: "Sites".to_string(),
            parent_id: None,
            created_at: None,
            modified_at: None,
            properties: Properties::new(),
        }
    }

    #[test]
    fn object_id_display_and_empty() {
        let id = ObjectId::new("doc-1;1.0");
        assert_eq!(id.to_string(), "doc-1;1.0");
        assert!(!id.is_empty());
        assert!(ObjectId::new("  ").is_empty());
    }

    #[test]
    fn version_series_id_serializes_as_plain_string() {
        let id = VersionSeriesId::from("series-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"series-9\"");
    }

    #[test]
    fn builder_sets_version_fields() {
        let doc = Document::builder("doc-1;1.1")
            .name("report.txt")
            .version_series("doc-1")
            .version_label("1.1")
            .latest_version(true)
            .content(12, "text/plain")
            .build();

        assert_eq!(doc.name, "report.txt");
        assert_eq!(doc.version_series_id, Some(VersionSeriesId::new("doc-1")));
        assert_eq!(doc.version_label.as_deref(), Some("1.1"));
        assert!(doc.is_latest_version);
        assert!(!doc.is_major_version);
        assert_eq!(doc.content_length, Some(12));
        assert!(doc.checked_out_id.is_none());
    }

    #[test]
    fn node_narrowing() {
        let doc = Node::Document(Document::builder("a").name("a.txt").build());
        assert!(doc.is_document());
        assert_eq!(doc.name(), "a.txt");
        assert!(doc.as_document().is_some());
        assert_eq!(doc.into_document().map(|d| d.id), Some(ObjectId::new("a")));

        let dir = Node::Folder(folder("f"));
        assert!(!dir.is_document());
        assert_eq!(dir.id(), &ObjectId::new("f"));
        assert!(dir.into_document().is_none());
    }

    #[test]
    fn node_serialization_is_tagged() {
        let node = Node::Folder(folder("f"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "folder");
    }
}
