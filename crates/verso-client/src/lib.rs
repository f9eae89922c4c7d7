//! verso-client: Version management for content-repository clients
//!
//! This crate provides:
//! - Version history listing with client-side windowing ([`VersionHistoryPager`])
//! - The checkout / checkin / cancel lifecycle ([`CheckoutLifecycle`])
//! - A facade over both ([`VersionService`])
//! - An in-memory repository backend with JSON snapshots ([`InMemoryRepository`])
//!
//! # Architecture
//!
//! Every remote interaction goes through a [`RepositorySession`], an explicit
//! bundle of collaborators:
//! - [`RepositoryHandle`] performs the remote calls
//! - [`NodeConverter`] turns raw object data into typed nodes
//! - [`ErrorTranslator`] maps transport failures to [`RepositoryError`]s
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verso_client::{ClientConfig, InMemoryRepository, RepositorySession, VersionService};
//!
//! let config = ClientConfig::from_env()?;
//! let repo = Arc::new(InMemoryRepository::new(&config.repository_id));
//! let service = VersionService::new(RepositorySession::from_config(&config, repo));
//!
//! let doc = service.document(&id).await?;
//! let pwc = service.checkout(&doc).await?;
//! let version = service.checkin(&doc, true, None, Properties::new(), Some("done")).await?;
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod pager;
pub mod service;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, ConfigError, DEFAULT_REPOSITORY_ID};
pub use convert::{DocumentResolver, NodeConverter, StandardNodeConverter};
pub use error::{
    DefaultErrorTranslator, ErrorKind, ErrorTranslator, RepositoryError, TransportError,
    VersionError, VersionResult,
};
pub use lifecycle::{CheckoutLifecycle, SeriesState};
pub use memory::{InMemoryRepository, RepositorySnapshot, SeriesRecord, StoredContent, VersionRecord};
pub use pager::{VersionHistoryPager, Window, compute_window};
pub use service::VersionService;
pub use session::{
    CheckinRequest, DEFAULT_PAGE_SIZE, ObjectData, ObjectPage, OperationContext, RepositoryHandle,
    RepositorySession,
};

// Re-export verso-core for downstream crates
pub use verso_core;
