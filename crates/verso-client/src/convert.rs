//! Node conversion and resolution collaborators.
//!
//! The repository hands back generic [`ObjectData`]; a [`NodeConverter`]
//! narrows it into a [`Node`] variant. A [`DocumentResolver`] turns a bare
//! object id (a fresh working copy or committed version) into a node.

use async_trait::async_trait;
use verso_core::{Document, Folder, Node, ObjectId, properties};

use crate::error::TransportError;
use crate::session::ObjectData;

/// Converts protocol-level object data into nodes.
pub trait NodeConverter: Send + Sync {
    fn convert_node(&self, data: &ObjectData) -> Result<Node, TransportError>;
}

/// Resolves an object id into a node.
#[async_trait]
pub trait DocumentResolver: Send + Sync {
    async fn get_node_by_identifier(&self, id: &ObjectId) -> Result<Node, TransportError>;
}

/// Reads the standard repository property ids.
///
/// Objects whose base type is neither document nor folder are rejected as
/// malformed, as are objects without an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNodeConverter;

impl NodeConverter for StandardNodeConverter {
    fn convert_node(&self, data: &ObjectData) -> Result<Node, TransportError> {
        let id = data.object_id().ok_or_else(|| {
            TransportError::Malformed(format!("object without {}", properties::OBJECT_ID))
        })?;
        let name = data.string(properties::NAME).unwrap_or_default().to_string();

        match data.base_type_id() {
            Some(properties::base_type::DOCUMENT) => Ok(Node::Document(document(id, name, data))),
            Some(properties::base_type::FOLDER) => Ok(Node::Folder(Folder {
                id,
                name,
                parent_id: data
                    .string(properties::PARENT_ID)
                    .filter(|s| !s.is_empty())
                    .map(ObjectId::from),
                created_at: data.datetime(properties::CREATION_DATE),
                modified_at: data.datetime(properties::LAST_MODIFICATION_DATE),
                properties: data.properties.clone(),
            })),
            other => Err(TransportError::Malformed(format!(
                "object {id} has unsupported base type {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

fn document(id: ObjectId, name: String, data: &ObjectData) -> Document {
    let mut builder = Document::builder(id)
        .name(name)
        .created(
            data.string(properties::CREATED_BY).map(str::to_string),
            data.datetime(properties::CREATION_DATE),
        )
        .modified(
            data.string(properties::LAST_MODIFIED_BY).map(str::to_string),
            data.datetime(properties::LAST_MODIFICATION_DATE),
        )
        .latest_version(data.bool(properties::IS_LATEST_VERSION).unwrap_or(false))
        .major_version(data.bool(properties::IS_MAJOR_VERSION).unwrap_or(false))
        .private_working_copy(
            data.bool(properties::IS_PRIVATE_WORKING_COPY)
                .unwrap_or(false),
        )
        .properties(data.properties.clone());

    if let Some(title) = data.string(properties::TITLE) {
        builder = builder.title(title);
    }
    if let Some(description) = data.string(properties::DESCRIPTION) {
        builder = builder.description(description);
    }
    if let Some(series) = data.version_series_id() {
        builder = builder.version_series(series);
    }
    if let Some(label) = data.string(properties::VERSION_LABEL) {
        builder = builder.version_label(label);
    }
    if let Some(pwc) = data.version_series_checked_out_id() {
        builder = builder.checked_out_id(pwc);
    }
    if let Some(length) = data.u64(properties::CONTENT_STREAM_LENGTH) {
        let mime = data
            .string(properties::CONTENT_STREAM_MIME_TYPE)
            .unwrap_or(verso_core::DEFAULT_MIME_TYPE);
        builder = builder.content(length, mime);
    }
    builder.build()
}
