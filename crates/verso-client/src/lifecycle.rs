//! Checkout / checkin / cancel lifecycle of a version series.
//!
//! A series is either [`SeriesState::Published`] (no private working copy)
//! or [`SeriesState::CheckedOut`]. `checkout` moves it to `CheckedOut`;
//! exactly one of `checkin` or `cancel_checkout` moves it back. The
//! repository enforces the single working copy per series; this client
//! does no locking of its own and never retries.

use verso_core::{ContentFile, Document, ListingContext, ObjectId, PagingResult, Properties};

use crate::error::{VersionError, VersionResult};
use crate::session::{CheckinRequest, OperationContext, RepositorySession};

/// Checkout state of a version series as last reported by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesState {
    Published,
    CheckedOut { pwc_id: ObjectId },
}

impl SeriesState {
    pub fn pwc_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Published => None,
            Self::CheckedOut { pwc_id } => Some(pwc_id),
        }
    }
}

/// Drives checkout, checkin and cancel against the repository.
#[derive(Debug, Clone)]
pub struct CheckoutLifecycle {
    session: RepositorySession,
}

impl CheckoutLifecycle {
    pub fn new(session: RepositorySession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &RepositorySession {
        &self.session
    }

    /// Reads the current checkout state of `document`'s series.
    pub async fn series_state(&self, document: &Document) -> VersionResult<SeriesState> {
        require_id(document)?;

        let data = self
            .session
            .handle()
            .get_object(self.session.repository_id(), &document.id)
            .await
            .map_err(|e| self.session.translate("getObject", e))?;

        Ok(match data.version_series_checked_out_id() {
            Some(pwc_id) => SeriesState::CheckedOut { pwc_id },
            None => SeriesState::Published,
        })
    }

    /// Checks `document` out and returns the private working copy.
    pub async fn checkout(&self, document: &Document) -> VersionResult<Document> {
        require_id(document)?;

        let pwc_id = self
            .session
            .handle()
            .check_out(self.session.repository_id(), &document.id)
            .await
            .map_err(|e| self.session.translate("checkOut", e))?;

        let pwc = self.session.resolve_document(&pwc_id).await?;
        tracing::info!(document = %document.id, pwc = %pwc.id, "checked out");
        Ok(pwc)
    }

    /// Discards the series' working copy, if there is one.
    ///
    /// Cancelling an already published series is a no-op.
    pub async fn cancel_checkout(&self, document: &Document) -> VersionResult<()> {
        match self.series_state(document).await? {
            SeriesState::Published => {
                tracing::debug!(document = %document.id, "cancel: series not checked out");
                Ok(())
            }
            SeriesState::CheckedOut { pwc_id } => {
                self.session
                    .handle()
                    .cancel_check_out(self.session.repository_id(), &pwc_id)
                    .await
                    .map_err(|e| self.session.translate("cancelCheckOut", e))?;
                tracing::info!(document = %document.id, pwc = %pwc_id, "checkout cancelled");
                Ok(())
            }
        }
    }

    /// Commits the series' working copy as a new version.
    ///
    /// Returns `None` without any remote mutation when the series is not
    /// checked out. A failure after the content stream is opened leaves the
    /// working copy in whatever state the repository left it.
    pub async fn checkin(
        &self,
        document: &Document,
        major_version: bool,
        content: Option<&ContentFile>,
        properties: Properties,
        comment: Option<&str>,
    ) -> VersionResult<Option<Document>> {
        let pwc_id = match self.series_state(document).await? {
            SeriesState::Published => {
                tracing::debug!(document = %document.id, "checkin: series not checked out");
                return Ok(None);
            }
            SeriesState::CheckedOut { pwc_id } => pwc_id,
        };

        let content = match content {
            Some(file) => Some(
                file.open_stream()
                    .await
                    .map_err(|e| self.session.translate("createContentStream", e.into()))?,
            ),
            None => None,
        };

        let request = CheckinRequest {
            major: major_version,
            properties,
            content,
            comment: comment.map(str::to_string),
        };

        let version_id = self
            .session
            .handle()
            .check_in(self.session.repository_id(), &pwc_id, request)
            .await
            .map_err(|e| self.session.translate("checkIn", e))?;

        let version = self.session.resolve_document(&version_id).await?;
        tracing::info!(
            document = %document.id,
            version = %version.id,
            major = major_version,
            "checked in"
        );
        Ok(Some(version))
    }

    /// Lists checked-out documents, paged by the server.
    ///
    /// The ordering and page size go to the server and the skip count moves
    /// the server cursor. With a window, `has_more_items` additionally
    /// requires the page to be full.
    pub async fn get_checked_out_documents(
        &self,
        listing: Option<&ListingContext>,
    ) -> VersionResult<PagingResult<Document>> {
        let (context, skip_count) = match listing {
            Some(l) => (
                OperationContext {
                    order_by: Some(l.order_by()),
                    max_items_per_page: Some(l.max_items),
                },
                u64::from(l.skip_count),
            ),
            None => (
                OperationContext {
                    order_by: Some(ListingContext::default().order_by()),
                    max_items_per_page: Some(self.session.default_page_size()),
                },
                0,
            ),
        };

        let page = self
            .session
            .handle()
            .get_checked_out_documents(self.session.repository_id(), &context, skip_count)
            .await
            .map_err(|e| self.session.translate("getCheckedOutDocs", e))?;

        let mut items = Vec::with_capacity(page.objects.len());
        for data in &page.objects {
            match self.session.convert(data)?.into_document() {
                Some(doc) => items.push(doc),
                None => tracing::warn!(
                    object = ?data.object_id(),
                    "skipping non-document in checked-out listing"
                ),
            }
        }

        let has_more_items = match listing {
            Some(l) => page.has_more_items && items.len() == l.max_items as usize,
            None => page.has_more_items,
        };

        tracing::debug!(
            returned = items.len(),
            total = page.total_items,
            has_more_items,
            "listed checked-out documents"
        );

        Ok(PagingResult::new(items, has_more_items, page.total_items))
    }
}

fn require_id(document: &Document) -> VersionResult<()> {
    if document.id.is_empty() {
        return Err(VersionError::missing("document id"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use verso_core::properties;

    use verso_core::SortProperty;

    use crate::error::{ErrorKind, TransportError};
    use crate::session::ObjectPage;
    use crate::testing::{ScriptedRepository, doc_data, folder_data, session};

    fn published() -> Document {
        Document::builder("s;1.0").name("a.txt").version_series("s").build()
    }

    fn lifecycle(repo: &Arc<ScriptedRepository>) -> CheckoutLifecycle {
        CheckoutLifecycle::new(session(repo))
    }

    fn checked_out_object() -> crate::session::ObjectData {
        let mut data = doc_data("s;1.0", "a.txt", "s");
        data.properties
            .insert(properties::VERSION_SERIES_CHECKED_OUT_ID.into(), json!("s;pwc"));
        data
    }

    #[tokio::test]
    async fn checkin_without_checkout_returns_none_and_mutates_nothing() {
        let repo = Arc::new(
            ScriptedRepository::default().with_object(doc_data("s;1.0", "a.txt", "s")),
        );

        let result = lifecycle(&repo)
            .checkin(&published(), true, None, Properties::new(), Some("noop"))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(repo.calls(), vec!["getObject"]);
    }

    #[tokio::test]
    async fn cancel_without_checkout_is_a_noop() {
        let repo = Arc::new(
            ScriptedRepository::default().with_object(doc_data("s;1.0", "a.txt", "s")),
        );

        lifecycle(&repo).cancel_checkout(&published()).await.unwrap();

        assert_eq!(repo.calls(), vec!["getObject"]);
    }

    #[tokio::test]
    async fn cancel_targets_the_working_copy() {
        let repo = Arc::new(ScriptedRepository::default().with_object(checked_out_object()));

        let lc = lifecycle(&repo);
        assert_eq!(
            lc.series_state(&published()).await.unwrap(),
            SeriesState::CheckedOut {
                pwc_id: ObjectId::new("s;pwc")
            }
        );
        lc.cancel_checkout(&published()).await.unwrap();

        assert_eq!(repo.calls(), vec!["getObject", "getObject", "cancelCheckOut"]);
    }

    #[tokio::test]
    async fn checkout_resolves_working_copy() {
        let mut pwc = doc_data("s;pwc", "a.txt", "s");
        pwc.properties
            .insert(properties::IS_PRIVATE_WORKING_COPY.into(), json!(true));
        let repo = Arc::new(ScriptedRepository::default().with_object(pwc));

        let doc = lifecycle(&repo).checkout(&published()).await.unwrap();

        assert_eq!(doc.id, ObjectId::new("s;pwc"));
        assert!(doc.is_private_working_copy);
        assert_ne!(doc.id, published().id);
        assert_eq!(repo.calls(), vec!["checkOut", "getObject"]);
    }

    #[tokio::test]
    async fn checkout_of_non_document_is_invalid_response() {
        let repo = Arc::new(ScriptedRepository::default().with_object(folder_data("s;pwc")));

        let err = lifecycle(&repo).checkout(&published()).await.unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::InvalidResponse));
    }

    #[tokio::test]
    async fn checkout_conflict_is_repository_error() {
        let repo = Arc::new(ScriptedRepository::failing(|| {
            TransportError::AlreadyCheckedOut("s".into())
        }));

        let err = lifecycle(&repo).checkout(&published()).await.unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert_eq!(repo.calls(), vec!["checkOut"]);
    }

    #[tokio::test]
    async fn empty_id_is_rejected_before_any_call() {
        let repo = Arc::new(ScriptedRepository::default());
        let blank = Document::builder(" ").version_series("s").build();
        let lc = lifecycle(&repo);

        assert!(matches!(
            lc.checkout(&blank).await,
            Err(VersionError::InvalidArgument(_))
        ));
        assert!(matches!(
            lc.cancel_checkout(&blank).await,
            Err(VersionError::InvalidArgument(_))
        ));
        assert!(matches!(
            lc.checkin(&blank, false, None, Properties::new(), None).await,
            Err(VersionError::InvalidArgument(_))
        ));
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn unreadable_content_fails_before_checkin_call() {
        let repo = Arc::new(ScriptedRepository::default().with_object(checked_out_object()));
        let dir = tempfile::tempdir().unwrap();
        let missing = ContentFile::from_path(dir.path().join("gone.txt"), None);

        let err = lifecycle(&repo)
            .checkin(&published(), false, Some(&missing), Properties::new(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Content));
        assert_eq!(repo.calls(), vec!["getObject"]);
    }

    #[tokio::test]
    async fn checkin_resolves_new_version() {
        let repo = Arc::new(
            ScriptedRepository::default()
                .with_object(checked_out_object())
                .with_object(doc_data("s;2.0", "a.txt", "s")),
        );
        let content = ContentFile::from_bytes("a.txt", "text/plain", b"v2".to_vec());

        let version = lifecycle(&repo)
            .checkin(&published(), true, Some(&content), Properties::new(), Some("release"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(version.id, ObjectId::new("s;2.0"));
        assert_eq!(repo.calls(), vec!["getObject", "checkIn", "getObject"]);
    }

    #[tokio::test]
    async fn checked_out_listing_without_window_mirrors_server() {
        let mut scripted = ScriptedRepository::default();
        scripted.checked_out = ObjectPage {
            objects: vec![doc_data("a;pwc", "a", "a"), doc_data("b;pwc", "b", "b")],
            has_more_items: true,
            total_items: 7,
        };
        let repo = Arc::new(scripted);

        let page = lifecycle(&repo).get_checked_out_documents(None).await.unwrap();

        assert_eq!(page.len(), 2);
        assert!(page.has_more_items);
        assert_eq!(page.total_items, 7);

        let requests = repo.listing_requests();
        assert_eq!(requests.len(), 1);
        let (context, skip) = &requests[0];
        assert_eq!(context.order_by.as_deref(), Some("cmis:name ASC"));
        assert_eq!(context.max_items_per_page, Some(100));
        assert_eq!(*skip, 0);
    }

    #[tokio::test]
    async fn checked_out_listing_requires_full_page_for_more() {
        let mut scripted = ScriptedRepository::default();
        scripted.checked_out = ObjectPage {
            objects: vec![
                doc_data("a;pwc", "a", "a"),
                folder_data("stray"),
                doc_data("b;pwc", "b", "b"),
            ],
            has_more_items: true,
            total_items: 9,
        };
        let repo = Arc::new(scripted);
        let lc = lifecycle(&repo);

        let ctx = ListingContext::default()
            .with_skip_count(4)
            .with_max_items(3)
            .with_sort(SortProperty::ModifiedAt, false);
        let page = lc.get_checked_out_documents(Some(&ctx)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(!page.has_more_items);
        assert_eq!(page.total_items, 9);

        let ctx = ctx.with_max_items(2);
        let page = lc.get_checked_out_documents(Some(&ctx)).await.unwrap();
        assert!(page.has_more_items);

        let (context, skip) = &repo.listing_requests()[0];
        assert_eq!(
            context.order_by.as_deref(),
            Some("cmis:lastModificationDate DESC")
        );
        assert_eq!(context.max_items_per_page, Some(3));
        assert_eq!(*skip, 4);
    }
}
