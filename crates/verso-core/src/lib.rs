//! verso-core: Core types for the verso repository client.
//!
//! This crate provides:
//! - Typed identifiers for repository objects and version series
//! - The `Node` model (documents and folders) with explicit narrowing
//! - Listing windows and paged results
//! - Content payloads used for checkin uploads
//!
//! Nothing here talks to a repository; see `verso-client` for that.

pub mod content;
pub mod listing;
pub mod properties;
pub mod types;

pub use content::{ContentFile, ContentStream, DEFAULT_MIME_TYPE};
pub use listing::{ListingContext, PagingResult, SortProperty, SortPropertyParseError};
pub use types::{
    Document, DocumentBuilder, Folder, Node, ObjectId, Properties, VersionSeriesId,
};
