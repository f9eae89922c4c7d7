//! Repository handle contract and the explicit session bundle.
//!
//! [`RepositoryHandle`] is the remote capability: every method is one
//! round trip and returns protocol-level [`ObjectData`]. The
//! [`RepositorySession`] pairs a handle with the conversion, resolution and
//! error-translation collaborators. Components receive a session at
//! construction; there is no process-wide session.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use verso_core::{ContentStream, Document, Node, ObjectId, Properties, VersionSeriesId, properties};

use crate::config::ClientConfig;
use crate::convert::{DocumentResolver, NodeConverter, StandardNodeConverter};
use crate::error::{
    DefaultErrorTranslator, ErrorTranslator, TransportError, VersionError, VersionResult,
};

// ============================================================================
// Protocol Data
// ============================================================================

/// Object data exactly as the repository returned it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectData {
    pub properties: Properties,
}

impl ObjectData {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }

    pub fn string(&self, id: &str) -> Option<&str> {
        self.properties.get(id).and_then(|v| v.as_str())
    }

    pub fn bool(&self, id: &str) -> Option<bool> {
        self.properties.get(id).and_then(|v| v.as_bool())
    }

    pub fn u64(&self, id: &str) -> Option<u64> {
        self.properties.get(id).and_then(|v| v.as_u64())
    }

    /// Reads an RFC 3339 timestamp property.
    pub fn datetime(&self, id: &str) -> Option<DateTime<Utc>> {
        self.string(id)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.string(properties::OBJECT_ID)
            .filter(|s| !s.is_empty())
            .map(ObjectId::from)
    }

    pub fn base_type_id(&self) -> Option<&str> {
        self.string(properties::BASE_TYPE_ID)
    }

    pub fn version_series_id(&self) -> Option<VersionSeriesId> {
        self.string(properties::VERSION_SERIES_ID)
            .filter(|s| !s.is_empty())
            .map(VersionSeriesId::from)
    }

    /// Working copy currently checked out from this object's series.
    pub fn version_series_checked_out_id(&self) -> Option<ObjectId> {
        self.string(properties::VERSION_SERIES_CHECKED_OUT_ID)
            .filter(|s| !s.is_empty())
            .map(ObjectId::from)
    }
}

/// Per-request options for server-side listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    /// Ordering clause such as `"cmis:name ASC"`.
    pub order_by: Option<String>,
    /// Page size hint.
    pub max_items_per_page: Option<u32>,
}

/// One page of a server-side cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPage {
    pub objects: Vec<ObjectData>,
    /// Server reports items beyond this page.
    pub has_more_items: bool,
    /// Server-reported size of the whole listing.
    pub total_items: u64,
}

/// Payload of a remote checkin.
#[derive(Debug)]
pub struct CheckinRequest {
    pub major: bool,
    pub properties: Properties,
    /// Replacement content; `None` keeps the working copy's content.
    pub content: Option<ContentStream>,
    pub comment: Option<String>,
}

// ============================================================================
// Handle Contract
// ============================================================================

/// Remote operations of a content repository.
///
/// Implementations perform exactly one remote call per method and never
/// retry; resilience belongs to the transport underneath.
#[async_trait]
pub trait RepositoryHandle: Send + Sync {
    /// Fetches an object by id.
    async fn get_object(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<ObjectData, TransportError>;

    /// Fetches the latest (optionally latest major) version of a series.
    async fn get_object_of_latest_version(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        series_id: &VersionSeriesId,
        major: bool,
    ) -> Result<ObjectData, TransportError>;

    /// Fetches every version of a series in one unpaginated call.
    async fn get_all_versions(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        series_id: &VersionSeriesId,
    ) -> Result<Vec<ObjectData>, TransportError>;

    /// Checks a document out and returns the new working copy id.
    async fn check_out(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<ObjectId, TransportError>;

    /// Discards a working copy.
    async fn cancel_check_out(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
    ) -> Result<(), TransportError>;

    /// Commits a working copy and returns the new version id.
    async fn check_in(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
        request: CheckinRequest,
    ) -> Result<ObjectId, TransportError>;

    /// Reads one page of the checked-out documents cursor, starting
    /// `skip_count` items in.
    async fn get_checked_out_documents(
        &self,
        repository_id: &str,
        context: &OperationContext,
        skip_count: u64,
    ) -> Result<ObjectPage, TransportError>;
}

// ============================================================================
// Session
// ============================================================================

/// Default page size for server-side listings without a window.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Explicit bundle of a repository handle and its collaborators.
///
/// Cheap to clone; everything inside is shared and immutable.
#[derive(Clone)]
pub struct RepositorySession {
    repository_id: String,
    handle: Arc<dyn RepositoryHandle>,
    converter: Arc<dyn NodeConverter>,
    resolver: Option<Arc<dyn DocumentResolver>>,
    translator: Arc<dyn ErrorTranslator>,
    default_page_size: u32,
}

impl RepositorySession {
    /// Creates a session with the standard converter and translator.
    ///
    /// Without a resolver, ids are resolved through the handle and the
    /// converter.
    pub fn new(repository_id: impl Into<String>, handle: Arc<dyn RepositoryHandle>) -> Self {
        Self {
            repository_id: repository_id.into(),
            handle,
            converter: Arc::new(StandardNodeConverter),
            resolver: None,
            translator: Arc::new(DefaultErrorTranslator),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates a session from client configuration.
    pub fn from_config(config: &ClientConfig, handle: Arc<dyn RepositoryHandle>) -> Self {
        Self::new(config.repository_id.clone(), handle).with_page_size(config.default_page_size)
    }

    pub fn with_converter(mut self, converter: Arc<dyn NodeConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn DocumentResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn ErrorTranslator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn handle(&self) -> &dyn RepositoryHandle {
        self.handle.as_ref()
    }

    pub fn converter(&self) -> &dyn NodeConverter {
        self.converter.as_ref()
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Funnels a collaborator failure through the translator.
    pub fn translate(&self, operation: &'static str, cause: TransportError) -> VersionError {
        let err = self.translator.translate(operation, cause);
        tracing::warn!(operation, code = err.code(), "repository call failed: {}", err.source);
        VersionError::Repository(err)
    }

    /// Converts raw object data, translating conversion failures.
    pub fn convert(&self, data: &ObjectData) -> VersionResult<Node> {
        self.converter
            .convert_node(data)
            .map_err(|e| self.translate("convertNode", e))
    }

    /// Resolves an object id to a node.
    pub async fn resolve(&self, id: &ObjectId) -> VersionResult<Node> {
        if id.is_empty() {
            return Err(VersionError::missing("object id"));
        }
        match &self.resolver {
            Some(resolver) => resolver
                .get_node_by_identifier(id)
                .await
                .map_err(|e| self.translate("getNodeByIdentifier", e)),
            None => {
                let data = self
                    .handle
                    .get_object(&self.repository_id, id)
                    .await
                    .map_err(|e| self.translate("getObject", e))?;
                self.convert(&data)
            }
        }
    }

    /// Resolves an object id that must name a document.
    pub async fn resolve_document(&self, id: &ObjectId) -> VersionResult<Document> {
        self.resolve(id).await?.into_document().ok_or_else(|| {
            self.translate(
                "getNodeByIdentifier",
                TransportError::Malformed(format!("object {id} is not a document")),
            )
        })
    }
}

impl fmt::Debug for RepositorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositorySession")
            .field("repository_id", &self.repository_id)
            .field("custom_resolver", &self.resolver.is_some())
            .field("default_page_size", &self.default_page_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(pairs: &[(&str, serde_json::Value)]) -> ObjectData {
        ObjectData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn object_data_accessors() {
        let d = data(&[
            (properties::OBJECT_ID, json!("doc;1.0")),
            (properties::VERSION_SERIES_ID, json!("doc")),
            (properties::VERSION_SERIES_CHECKED_OUT_ID, json!("")),
            (properties::IS_LATEST_VERSION, json!(true)),
            (properties::CONTENT_STREAM_LENGTH, json!(42)),
            (properties::CREATION_DATE, json!("2024-03-01T10:00:00Z")),
        ]);
        assert_eq!(d.object_id(), Some(ObjectId::new("doc;1.0")));
        assert_eq!(d.version_series_id(), Some(VersionSeriesId::new("doc")));
        assert_eq!(d.version_series_checked_out_id(), None);
        assert_eq!(d.bool(properties::IS_LATEST_VERSION), Some(true));
        assert_eq!(d.u64(properties::CONTENT_STREAM_LENGTH), Some(42));
        assert!(d.datetime(properties::CREATION_DATE).is_some());
        assert!(d.datetime(properties::NAME).is_none());
    }
}
