//! Content payloads for checkin uploads.
//!
//! A [`ContentFile`] names where upload bytes come from. Opening it yields a
//! [`ContentStream`]: file name, byte length, MIME type and an async reader
//! the repository handle consumes.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::AsyncRead;

/// MIME type used when the caller does not supply one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
enum ContentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// Upload payload for a checkin.
#[derive(Debug, Clone)]
pub struct ContentFile {
    file_name: String,
    mime_type: String,
    source: ContentSource,
}

impl ContentFile {
    /// Content held in memory.
    pub fn from_bytes(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            source: ContentSource::Bytes(bytes.into()),
        }
    }

    /// Content read from a local file when the stream is opened.
    ///
    /// The file name is taken from the last path component.
    pub fn from_path(path: impl Into<PathBuf>, mime_type: Option<&str>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            mime_type: mime_type.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
            source: ContentSource::Path(path),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Local path backing this payload, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ContentSource::Path(p) => Some(p),
            ContentSource::Bytes(_) => None,
        }
    }

    /// Byte length of the payload.
    pub async fn length(&self) -> io::Result<u64> {
        match &self.source {
            ContentSource::Bytes(b) => Ok(b.len() as u64),
            ContentSource::Path(p) => Ok(tokio::fs::metadata(p).await?.len()),
        }
    }

    /// Opens the payload for reading.
    pub async fn open_stream(&self) -> io::Result<ContentStream> {
        let length = self.length().await?;
        let reader: Pin<Box<dyn AsyncRead + Send>> = match &self.source {
            ContentSource::Bytes(b) => Box::pin(io::Cursor::new(b.clone())),
            ContentSource::Path(p) => Box::pin(tokio::fs::File::open(p).await?),
        };
        Ok(ContentStream {
            file_name: self.file_name.clone(),
            length,
            mime_type: self.mime_type.clone(),
            reader,
        })
    }
}

/// An opened upload stream.
pub struct ContentStream {
    pub file_name: String,
    pub length: u64,
    pub mime_type: String,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl ContentStream {
    /// Wraps bytes already in memory.
    pub fn from_bytes(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            length: bytes.len() as u64,
            mime_type: mime_type.into(),
            reader: Box::pin(io::Cursor::new(bytes)),
        }
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("file_name", &self.file_name)
            .field("length", &self.length)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}
