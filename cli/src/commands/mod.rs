//! Command implementations for the verso CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod cancel;
pub mod checked_out;
pub mod checkin;
pub mod checkout;
pub mod create;
pub mod latest;
pub mod versions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use verso_client::{ClientConfig, InMemoryRepository, RepositorySession, VersionService};
use verso_core::{
    ContentFile, DEFAULT_MIME_TYPE, Document, ListingContext, ObjectId, PagingResult, SortProperty,
};

/// Repository opened from the snapshot file plus the service over it.
pub struct Context {
    pub repository: Arc<InMemoryRepository>,
    pub service: VersionService,
    store: PathBuf,
}

impl Context {
    /// Load the snapshot at `store`, or start an empty repository.
    pub async fn open(store: &Path) -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let repository = Arc::new(
            InMemoryRepository::load_or_create(store, &config.repository_id)
                .await
                .with_context(|| format!("failed to open store {}", store.display()))?,
        );
        tracing::debug!(
            store = %store.display(),
            repository = %config.repository_id,
            "opened store"
        );
        let session = RepositorySession::from_config(&config, repository.clone());

        Ok(Self {
            repository,
            service: VersionService::new(session),
            store: store.to_path_buf(),
        })
    }

    /// Write the repository back to the snapshot file.
    pub async fn save(&self) -> Result<()> {
        self.repository
            .save(&self.store)
            .await
            .with_context(|| format!("failed to save store {}", self.store.display()))
    }

    /// Look up a document by object id.
    pub async fn document(&self, id: &str) -> Result<Document> {
        Ok(self.service.document(&ObjectId::new(id)).await?)
    }
}

/// Window flags shared by the listing commands.
#[derive(Args, Debug, Default)]
pub struct WindowArgs {
    /// Number of items to skip
    #[arg(long)]
    pub skip: Option<u32>,

    /// Maximum number of items to return
    #[arg(long)]
    pub max: Option<u32>,

    /// Sort property: name, title, description, created, modified
    #[arg(long)]
    pub sort: Option<SortProperty>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl WindowArgs {
    /// The requested window, or `None` when no flag was given.
    pub fn listing(&self) -> Option<ListingContext> {
        if self.skip.is_none() && self.max.is_none() && self.sort.is_none() && !self.desc {
            return None;
        }
        let defaults = ListingContext::default();
        Some(
            defaults
                .with_skip_count(self.skip.unwrap_or(defaults.skip_count))
                .with_max_items(self.max.unwrap_or(defaults.max_items))
                .with_sort(self.sort.unwrap_or(defaults.sort_property), !self.desc),
        )
    }
}

/// Build a content file from `TEXT` or `@PATH`.
pub fn content_arg(raw: &str, name: &str, mime: Option<&str>) -> ContentFile {
    match raw.strip_prefix('@') {
        Some(path) => ContentFile::from_path(path, mime),
        None => ContentFile::from_bytes(
            name,
            mime.unwrap_or("text/plain"),
            raw.as_bytes().to_vec(),
        ),
    }
}

/// Parse a `key=value` property flag.
pub fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

impl HumanReadable for Document {
    fn print_human(&self) {
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Name:".cyan(), self.name);
        if let Some(title) = &self.title {
            println!("  {} {}", "Title:".cyan(), title);
        }
        if let Some(label) = &self.version_label {
            let mut flags = Vec::new();
            if self.is_major_version {
                flags.push("major");
            }
            if self.is_latest_version {
                flags.push("latest");
            }
            if self.is_private_working_copy {
                flags.push("working copy");
            }
            println!("  {} {} {}", "Version:".cyan(), label, flags.join(", ").dimmed());
        }
        if let Some(pwc) = &self.checked_out_id {
            println!("  {} {}", "Checked out:".cyan(), pwc.to_string().yellow());
        }
        if let Some(len) = self.content_length {
            let mime = self.content_mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
            println!("  {} {} bytes ({})", "Content:".cyan(), len, mime);
        }
        if let Some(modified) = &self.modified_at {
            println!("  {} {}", "Modified:".cyan(), format_timestamp(modified));
        }
    }
}

impl HumanReadable for PagingResult<Document> {
    fn print_human(&self) {
        if self.items.is_empty() {
            println!("  {}", "(No documents)".dimmed());
            return;
        }

        for doc in &self.items {
            let label = doc.version_label.as_deref().unwrap_or("-");
            let marker = if doc.is_latest_version {
                "*".yellow()
            } else {
                " ".normal()
            };
            println!("{} {:<8} {:<40} {}", marker, label, doc.id, doc.name);
        }

        println!();
        let more = if self.has_more_items { " (more available)" } else { "" };
        println!(
            "{}",
            format!("{} of {} item(s){}", self.len(), self.total_items, more).dimmed()
        );
    }
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_flags_split_on_first_equals() {
        assert_eq!(
            parse_property("cm:title=a=b").unwrap(),
            ("cm:title".to_string(), "a=b".to_string())
        );
        assert!(parse_property("novalue").is_err());
        assert!(parse_property("=x").is_err());
    }

    #[test]
    fn no_window_flags_means_no_window() {
        assert_eq!(WindowArgs::default().listing(), None);

        let args = WindowArgs {
            max: Some(3),
            desc: true,
            ..WindowArgs::default()
        };
        let listing = args.listing().unwrap();
        assert_eq!(listing.max_items, 3);
        assert_eq!(listing.skip_count, 0);
        assert!(!listing.sort_ascending);
        assert_eq!(listing.sort_property, SortProperty::Name);
    }

    #[test]
    fn content_arg_reads_text_or_path() {
        let text = content_arg("hello", "a.txt", None);
        assert_eq!(text.mime_type(), "text/plain");
        assert!(text.path().is_none());

        let file = content_arg("@/tmp/report.pdf", "ignored", Some("application/pdf"));
        assert_eq!(file.file_name(), "report.pdf");
        assert_eq!(file.mime_type(), "application/pdf");
    }
}
