//! Scripted repository handle for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use verso_core::{ObjectId, Properties, VersionSeriesId, properties};

use crate::error::TransportError;
use crate::session::{
    CheckinRequest, ObjectData, ObjectPage, OperationContext, RepositoryHandle, RepositorySession,
};

pub(crate) const REPO: &str = "test-repo";

pub(crate) fn doc_data(id: &str, name: &str, series: &str) -> ObjectData {
    let mut props = Properties::new();
    props.insert(properties::OBJECT_ID.into(), json!(id));
    props.insert(properties::BASE_TYPE_ID.into(), json!("cmis:document"));
    props.insert(properties::NAME.into(), json!(name));
    props.insert(properties::VERSION_SERIES_ID.into(), json!(series));
    ObjectData::new(props)
}

pub(crate) fn folder_data(id: &str) -> ObjectData {
    let mut props = Properties::new();
    props.insert(properties::OBJECT_ID.into(), json!(id));
    props.insert(properties::BASE_TYPE_ID.into(), json!("cmis:folder"));
    props.insert(properties::NAME.into(), json!(id));
    ObjectData::new(props)
}

/// Series `s` with versions named `v1..=vN` in repository order.
pub(crate) fn versions(n: usize) -> Vec<ObjectData> {
    (1..=n)
        .map(|i| doc_data(&format!("s;{i}"), &format!("v{i}"), "s"))
        .collect()
}

/// Handle returning canned data and recording every call by name.
#[derive(Default)]
pub(crate) struct ScriptedRepository {
    pub versions: Vec<ObjectData>,
    pub objects: HashMap<ObjectId, ObjectData>,
    pub checked_out: ObjectPage,
    pub fail: Option<fn() -> TransportError>,
    calls: Mutex<Vec<&'static str>>,
    listing_requests: Mutex<Vec<(OperationContext, u64)>>,
}

impl ScriptedRepository {
    pub fn with_versions(versions: Vec<ObjectData>) -> Self {
        Self {
            versions,
            ..Self::default()
        }
    }

    pub fn with_object(mut self, data: ObjectData) -> Self {
        if let Some(id) = data.object_id() {
            self.objects.insert(id, data);
        }
        self
    }

    pub fn failing(fail: fn() -> TransportError) -> Self {
        Self {
            fail: Some(fail),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn listing_requests(&self) -> Vec<(OperationContext, u64)> {
        self.listing_requests.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(call);
        match self.fail {
            Some(fail) => Err(fail()),
            None => Ok(()),
        }
    }

    fn lookup(&self, id: &ObjectId) -> Result<ObjectData, TransportError> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::ObjectNotFound(id.to_string()))
    }
}

#[async_trait]
impl RepositoryHandle for ScriptedRepository {
    async fn get_object(
        &self,
        _repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<ObjectData, TransportError> {
        self.record("getObject")?;
        self.lookup(object_id)
    }

    async fn get_object_of_latest_version(
        &self,
        _repository_id: &str,
        _object_id: &ObjectId,
        _series_id: &VersionSeriesId,
        _major: bool,
    ) -> Result<ObjectData, TransportError> {
        self.record("getObjectOfLatestVersion")?;
        self.versions
            .last()
            .cloned()
            .ok_or_else(|| TransportError::ObjectNotFound("latest".into()))
    }

    async fn get_all_versions(
        &self,
        _repository_id: &str,
        _object_id: &ObjectId,
        _series_id: &VersionSeriesId,
    ) -> Result<Vec<ObjectData>, TransportError> {
        self.record("getAllVersions")?;
        Ok(self.versions.clone())
    }

    async fn check_out(
        &self,
        _repository_id: &str,
        _object_id: &ObjectId,
    ) -> Result<ObjectId, TransportError> {
        self.record("checkOut")?;
        Ok(ObjectId::new("s;pwc"))
    }

    async fn cancel_check_out(
        &self,
        _repository_id: &str,
        _pwc_id: &ObjectId,
    ) -> Result<(), TransportError> {
        self.record("cancelCheckOut")
    }

    async fn check_in(
        &self,
        _repository_id: &str,
        _pwc_id: &ObjectId,
        _request: CheckinRequest,
    ) -> Result<ObjectId, TransportError> {
        self.record("checkIn")?;
        Ok(ObjectId::new("s;2.0"))
    }

    async fn get_checked_out_documents(
        &self,
        _repository_id: &str,
        context: &OperationContext,
        skip_count: u64,
    ) -> Result<ObjectPage, TransportError> {
        self.record("getCheckedOutDocs")?;
        self.listing_requests
            .lock()
            .unwrap()
            .push((context.clone(), skip_count));
        Ok(self.checked_out.clone())
    }
}

pub(crate) fn session(repo: &Arc<ScriptedRepository>) -> RepositorySession {
    RepositorySession::new(REPO, repo.clone())
}
