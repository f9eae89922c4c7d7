//! In-memory repository backend.
//!
//! [`InMemoryRepository`] implements [`RepositoryHandle`] over a
//! [`RepositorySnapshot`] guarded by an `RwLock`. It behaves like a small
//! versioning repository: one private working copy per series, `major.minor`
//! version labels, and a server-side cursor for checked-out documents.
//! Snapshots can be saved to and loaded from JSON files.
//!
//! The lock is never held across an `.await`; upload streams are drained
//! before the state is touched.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use uuid::Uuid;
use verso_core::{ContentStream, Document, ObjectId, Properties, SortProperty, VersionSeriesId, properties};

use crate::convert::{NodeConverter, StandardNodeConverter};
use crate::error::TransportError;
use crate::session::{
    CheckinRequest, DEFAULT_PAGE_SIZE, ObjectData, ObjectPage, OperationContext, RepositoryHandle,
};

/// Version label of the first version in a series.
pub const INITIAL_LABEL: &str = "1.0";

/// Version label carried by private working copies.
pub const PWC_LABEL: &str = "pwc";

/// Principal recorded as creator and modifier.
const PRINCIPAL: &str = "verso";

// ============================================================================
// Snapshot Model
// ============================================================================

/// Serializable state of an in-memory repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub repository_id: String,
    #[serde(default)]
    pub series: BTreeMap<VersionSeriesId, SeriesRecord>,
}

/// All versions of one logical document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// Committed versions, oldest first.
    pub versions: Vec<VersionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_copy: Option<VersionRecord>,
}

/// One committed version or working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: ObjectId,
    pub label: String,
    pub major: bool,
    /// Caller-visible properties (name, title, dates, comment, ...).
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<StoredContent>,
}

/// Content bytes of a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContent {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// Computes the label following `current`.
///
/// Major checkins bump the major number and reset the minor one.
pub fn next_label(current: &str, major: bool) -> Option<String> {
    let (maj, min) = current.split_once('.')?;
    let maj: u32 = maj.parse().ok()?;
    let min: u32 = min.parse().ok()?;
    Some(if major {
        format!("{}.0", maj + 1)
    } else {
        format!("{}.{}", maj, min + 1)
    })
}

// ============================================================================
// Repository
// ============================================================================

/// Repository held entirely in memory.
#[derive(Debug)]
pub struct InMemoryRepository {
    state: RwLock<RepositorySnapshot>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new(repository_id: impl Into<String>) -> Self {
        Self::from_snapshot(RepositorySnapshot {
            repository_id: repository_id.into(),
            series: BTreeMap::new(),
        })
    }

    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Loads a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let snapshot: RepositorySnapshot = serde_json::from_slice(&raw)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            series = snapshot.series.len(),
            "loaded repository snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Loads a snapshot file, or starts empty if it does not exist yet.
    pub async fn load_or_create(
        path: impl AsRef<Path>,
        repository_id: &str,
    ) -> Result<Self, TransportError> {
        match tokio::fs::try_exists(path.as_ref()).await? {
            true => Self::load(path).await,
            false => Ok(Self::new(repository_id)),
        }
    }

    /// Writes the current state to a snapshot file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), TransportError> {
        let json = serde_json::to_vec_pretty(&self.snapshot()?)?;
        tokio::fs::write(path.as_ref(), json).await?;
        tracing::debug!(path = %path.as_ref().display(), "saved repository snapshot");
        Ok(())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<RepositorySnapshot, TransportError> {
        Ok(self.state.read().map_err(|_| poisoned())?.clone())
    }

    pub fn repository_id(&self) -> Result<String, TransportError> {
        Ok(self.state.read().map_err(|_| poisoned())?.repository_id.clone())
    }

    /// Creates a new document series with a single `1.0` version.
    pub async fn create_document(
        &self,
        name: &str,
        mut props: Properties,
        content: Option<ContentStream>,
    ) -> Result<ObjectId, TransportError> {
        if name.trim().is_empty() {
            return Err(TransportError::Constraint("document name must not be empty".into()));
        }
        let content = match content {
            Some(stream) => Some(drain(stream).await?),
            None => None,
        };

        let series = VersionSeriesId::new(Uuid::new_v4().simple().to_string());
        let id = version_id(&series, INITIAL_LABEL);
        let now = json!(Utc::now().to_rfc3339());

        props.insert(properties::NAME.into(), json!(name));
        props.insert(properties::CREATED_BY.into(), json!(PRINCIPAL));
        props.insert(properties::CREATION_DATE.into(), now.clone());
        props.insert(properties::LAST_MODIFIED_BY.into(), json!(PRINCIPAL));
        props.insert(properties::LAST_MODIFICATION_DATE.into(), now);

        let record = VersionRecord {
            id: id.clone(),
            label: INITIAL_LABEL.to_string(),
            major: true,
            properties: props,
            content,
        };

        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.series.insert(
            series.clone(),
            SeriesRecord {
                versions: vec![record],
                working_copy: None,
            },
        );
        tracing::info!(series = %series, id = %id, name, "created document");
        Ok(id)
    }

    /// Bytes of an object's content stream, if it has one.
    pub fn content(&self, object_id: &ObjectId) -> Result<Option<StoredContent>, TransportError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let (_, series) = locate(&state, object_id)?;
        Ok(record_in(series, object_id).and_then(|r| r.content.clone()))
    }

    fn check_repository(state: &RepositorySnapshot, repository_id: &str) -> Result<(), TransportError> {
        if state.repository_id != repository_id {
            return Err(TransportError::ObjectNotFound(format!(
                "repository {repository_id}"
            )));
        }
        Ok(())
    }
}

fn poisoned() -> TransportError {
    TransportError::Connection("repository state lock poisoned".into())
}

fn version_id(series: &VersionSeriesId, label: &str) -> ObjectId {
    ObjectId::new(format!("{series};{label}"))
}

async fn drain(mut stream: ContentStream) -> Result<StoredContent, TransportError> {
    let mut bytes = Vec::with_capacity(usize::try_from(stream.length).unwrap_or(0));
    stream.reader.read_to_end(&mut bytes).await?;
    Ok(StoredContent {
        file_name: stream.file_name,
        mime_type: stream.mime_type,
        bytes,
    })
}

/// Finds the series holding `object_id`, as a committed version or as the
/// working copy.
fn locate<'a>(
    state: &'a RepositorySnapshot,
    object_id: &ObjectId,
) -> Result<(&'a VersionSeriesId, &'a SeriesRecord), TransportError> {
    state
        .series
        .iter()
        .find(|(_, s)| record_in(s, object_id).is_some())
        .ok_or_else(|| TransportError::ObjectNotFound(object_id.to_string()))
}

fn record_in<'a>(series: &'a SeriesRecord, object_id: &ObjectId) -> Option<&'a VersionRecord> {
    series
        .versions
        .iter()
        .chain(series.working_copy.iter())
        .find(|r| &r.id == object_id)
}

/// Renders a record the way the repository reports it.
fn object_data(series_id: &VersionSeriesId, series: &SeriesRecord, record: &VersionRecord) -> ObjectData {
    let is_pwc = series.working_copy.as_ref().is_some_and(|w| w.id == record.id);
    let is_latest = series.versions.last().is_some_and(|l| l.id == record.id);

    let mut props = record.properties.clone();
    props.insert(properties::OBJECT_ID.into(), json!(record.id));
    props.insert(properties::BASE_TYPE_ID.into(), json!(properties::base_type::DOCUMENT));
    props.insert(properties::VERSION_SERIES_ID.into(), json!(series_id));
    props.insert(properties::VERSION_LABEL.into(), json!(record.label));
    props.insert(properties::IS_MAJOR_VERSION.into(), json!(record.major));
    props.insert(properties::IS_LATEST_VERSION.into(), json!(is_latest));
    props.insert(properties::IS_PRIVATE_WORKING_COPY.into(), json!(is_pwc));
    props.insert(
        properties::IS_VERSION_SERIES_CHECKED_OUT.into(),
        json!(series.working_copy.is_some()),
    );
    props.insert(
        properties::VERSION_SERIES_CHECKED_OUT_ID.into(),
        series
            .working_copy
            .as_ref()
            .map_or(Value::Null, |w| json!(w.id)),
    );
    if let Some(content) = &record.content {
        props.insert(properties::CONTENT_STREAM_LENGTH.into(), json!(content.bytes.len()));
        props.insert(properties::CONTENT_STREAM_MIME_TYPE.into(), json!(content.mime_type));
        props.insert(properties::CONTENT_STREAM_FILE_NAME.into(), json!(content.file_name));
    }
    ObjectData::new(props)
}

fn parse_order_by(order_by: &str) -> Result<(SortProperty, bool), TransportError> {
    let invalid = || TransportError::Constraint(format!("unsupported orderBy '{order_by}'"));
    let mut parts = order_by.split_whitespace();
    let property = parts
        .next()
        .and_then(SortProperty::from_query_name)
        .ok_or_else(invalid)?;
    let ascending = match parts.next().map(str::to_ascii_uppercase).as_deref() {
        None | Some("ASC") => true,
        Some("DESC") => false,
        Some(_) => return Err(invalid()),
    };
    Ok((property, ascending))
}

#[async_trait]
impl RepositoryHandle for InMemoryRepository {
    async fn get_object(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<ObjectData, TransportError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let (series_id, series) = locate(&state, object_id)?;
        let record = record_in(series, object_id)
            .ok_or_else(|| TransportError::ObjectNotFound(object_id.to_string()))?;
        Ok(object_data(series_id, series, record))
    }

    async fn get_object_of_latest_version(
        &self,
        repository_id: &str,
        _object_id: &ObjectId,
        series_id: &VersionSeriesId,
        major: bool,
    ) -> Result<ObjectData, TransportError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let series = state
            .series
            .get(series_id)
            .ok_or_else(|| TransportError::ObjectNotFound(format!("version series {series_id}")))?;
        let latest = if major {
            series.versions.iter().rev().find(|v| v.major)
        } else {
            series.versions.last()
        };
        let record = latest.ok_or_else(|| {
            TransportError::ObjectNotFound(format!("no matching version in series {series_id}"))
        })?;
        Ok(object_data(series_id, series, record))
    }

    async fn get_all_versions(
        &self,
        repository_id: &str,
        _object_id: &ObjectId,
        series_id: &VersionSeriesId,
    ) -> Result<Vec<ObjectData>, TransportError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let series = state
            .series
            .get(series_id)
            .ok_or_else(|| TransportError::ObjectNotFound(format!("version series {series_id}")))?;
        // Newest first.
        Ok(series
            .versions
            .iter()
            .rev()
            .map(|r| object_data(series_id, series, r))
            .collect())
    }

    async fn check_out(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<ObjectId, TransportError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let series_id = locate(&state, object_id)?.0.clone();
        let series = state
            .series
            .get_mut(&series_id)
            .ok_or_else(|| TransportError::ObjectNotFound(object_id.to_string()))?;

        if series.working_copy.as_ref().is_some_and(|w| &w.id == object_id) {
            return Err(TransportError::Constraint(format!(
                "{object_id} is a private working copy"
            )));
        }
        if series.working_copy.is_some() {
            return Err(TransportError::AlreadyCheckedOut(series_id.to_string()));
        }
        let latest = series.versions.last().ok_or_else(|| {
            TransportError::Malformed(format!("version series {series_id} has no versions"))
        })?;

        let pwc_id = version_id(&series_id, PWC_LABEL);
        let mut props = latest.properties.clone();
        props.insert(properties::LAST_MODIFIED_BY.into(), json!(PRINCIPAL));
        props.insert(
            properties::LAST_MODIFICATION_DATE.into(),
            json!(Utc::now().to_rfc3339()),
        );
        props.remove(properties::CHECKIN_COMMENT);

        series.working_copy = Some(VersionRecord {
            id: pwc_id.clone(),
            label: PWC_LABEL.to_string(),
            major: false,
            properties: props,
            content: latest.content.clone(),
        });
        Ok(pwc_id)
    }

    async fn cancel_check_out(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
    ) -> Result<(), TransportError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let series = state
            .series
            .values_mut()
            .find(|s| s.working_copy.as_ref().is_some_and(|w| &w.id == pwc_id))
            .ok_or_else(|| TransportError::ObjectNotFound(pwc_id.to_string()))?;
        series.working_copy = None;
        Ok(())
    }

    async fn check_in(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
        request: CheckinRequest,
    ) -> Result<ObjectId, TransportError> {
        let content = match request.content {
            Some(stream) => Some(drain(stream).await?),
            None => None,
        };

        let mut state = self.state.write().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;
        let (series_id, series) = state
            .series
            .iter_mut()
            .find(|(_, s)| s.working_copy.as_ref().is_some_and(|w| &w.id == pwc_id))
            .ok_or_else(|| TransportError::ObjectNotFound(pwc_id.to_string()))?;

        let current = series.versions.last().map_or(INITIAL_LABEL, |v| v.label.as_str());
        let label = next_label(current, request.major).ok_or_else(|| {
            TransportError::Malformed(format!("unparseable version label '{current}'"))
        })?;
        let Some(pwc) = series.working_copy.take() else {
            return Err(TransportError::ObjectNotFound(pwc_id.to_string()));
        };

        let mut props = pwc.properties;
        props.extend(request.properties);
        props.insert(
            properties::LAST_MODIFICATION_DATE.into(),
            json!(Utc::now().to_rfc3339()),
        );
        match request.comment {
            Some(comment) => props.insert(properties::CHECKIN_COMMENT.into(), json!(comment)),
            None => props.remove(properties::CHECKIN_COMMENT),
        };

        let id = version_id(series_id, &label);
        series.versions.push(VersionRecord {
            id: id.clone(),
            label,
            major: request.major,
            properties: props,
            content: content.or(pwc.content),
        });
        Ok(id)
    }

    async fn get_checked_out_documents(
        &self,
        repository_id: &str,
        context: &OperationContext,
        skip_count: u64,
    ) -> Result<ObjectPage, TransportError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Self::check_repository(&state, repository_id)?;

        let mut rows: Vec<(Document, ObjectData)> = Vec::new();
        for (series_id, series) in &state.series {
            if let Some(pwc) = &series.working_copy {
                let data = object_data(series_id, series, pwc);
                if let Some(doc) = StandardNodeConverter.convert_node(&data)?.into_document() {
                    rows.push((doc, data));
                }
            }
        }

        if let Some(order_by) = &context.order_by {
            let (property, ascending) = parse_order_by(order_by)?;
            rows.sort_by(|(a, _), (b, _)| {
                let ord: Ordering = property.compare(a, b);
                if ascending { ord } else { ord.reverse() }
            });
        }

        let total = rows.len();
        let page_size = context.max_items_per_page.unwrap_or(DEFAULT_PAGE_SIZE) as usize;
        let skip = usize::try_from(skip_count).unwrap_or(usize::MAX).min(total);
        let objects: Vec<ObjectData> = rows
            .into_iter()
            .skip(skip)
            .take(page_size)
            .map(|(_, data)| data)
            .collect();

        Ok(ObjectPage {
            has_more_items: skip + objects.len() < total,
            objects,
            total_items: total as u64,
        })
    }
}
