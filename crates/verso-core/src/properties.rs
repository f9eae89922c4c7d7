//! Well-known repository property identifiers.
//!
//! Raw object data carries its metadata as a flat property map keyed by
//! these ids. Only the ids the version subsystem reads or writes are
//! listed here.

pub const OBJECT_ID: &str = "cmis:objectId";
pub const BASE_TYPE_ID: &str = "cmis:baseTypeId";
pub const NAME: &str = "cmis:name";
pub const CREATED_BY: &str = "cmis:createdBy";
pub const CREATION_DATE: &str = "cmis:creationDate";
pub const LAST_MODIFIED_BY: &str = "cmis:lastModifiedBy";
pub const LAST_MODIFICATION_DATE: &str = "cmis:lastModificationDate";
pub const PARENT_ID: &str = "cmis:parentId";

pub const VERSION_SERIES_ID: &str = "cmis:versionSeriesId";
pub const VERSION_LABEL: &str = "cmis:versionLabel";
pub const IS_LATEST_VERSION: &str = "cmis:isLatestVersion";
pub const IS_MAJOR_VERSION: &str = "cmis:isMajorVersion";
pub const IS_PRIVATE_WORKING_COPY: &str = "cmis:isPrivateWorkingCopy";
pub const IS_VERSION_SERIES_CHECKED_OUT: &str = "cmis:isVersionSeriesCheckedOut";
pub const VERSION_SERIES_CHECKED_OUT_ID: &str = "cmis:versionSeriesCheckedOutId";
pub const CHECKIN_COMMENT: &str = "cmis:checkinComment";

pub const CONTENT_STREAM_LENGTH: &str = "cmis:contentStreamLength";
pub const CONTENT_STREAM_MIME_TYPE: &str = "cmis:contentStreamMimeType";
pub const CONTENT_STREAM_FILE_NAME: &str = "cmis:contentStreamFileName";

pub const TITLE: &str = "cm:title";
pub const DESCRIPTION: &str = "cm:description";

/// Base type id values.
pub mod base_type {
    pub const DOCUMENT: &str = "cmis:document";
    pub const FOLDER: &str = "cmis:folder";
}
