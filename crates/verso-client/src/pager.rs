//! Version history retrieval with client-side windowing.
//!
//! The repository returns a series' whole history in one call. The window
//! is applied to that list in repository order; only the selected page is
//! then re-sorted for presentation. Which versions land on a page is
//! therefore independent of the requested sort order.

use std::ops::Range;

use verso_core::{Document, ListingContext, PagingResult, VersionSeriesId};

use crate::error::{TransportError, VersionError, VersionResult};
use crate::session::{ObjectData, RepositorySession};

/// Slice of a fully fetched listing selected by a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub range: Range<usize>,
    pub has_more_items: bool,
}

/// Computes the slice of a `size`-long list selected by `listing`.
///
/// Skip counts past the end clamp to an empty slice; nothing here can
/// produce an out-of-range slice.
pub fn compute_window(size: usize, listing: &ListingContext) -> Window {
    let from = (listing.skip_count as usize).min(size);
    let max = listing.max_items as usize;

    if max.saturating_add(from) >= size {
        Window {
            range: from..size,
            has_more_items: false,
        }
    } else {
        Window {
            range: from..from + max,
            has_more_items: true,
        }
    }
}

/// Reads version histories of documents.
#[derive(Debug, Clone)]
pub struct VersionHistoryPager {
    session: RepositorySession,
}

impl VersionHistoryPager {
    pub fn new(session: RepositorySession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &RepositorySession {
        &self.session
    }

    /// Lists the versions of `document`'s series.
    ///
    /// Without a window the whole history is returned in repository order.
    /// With one, the window is applied first and the page is then sorted.
    /// `total_items` is always the size of the whole history.
    pub async fn get_versions(
        &self,
        document: &Document,
        listing: Option<&ListingContext>,
    ) -> VersionResult<PagingResult<Document>> {
        let series = series_of(document)?;

        let versions = self
            .session
            .handle()
            .get_all_versions(self.session.repository_id(), &document.id, series)
            .await
            .map_err(|e| self.session.translate("getAllVersions", e))?;
        let size = versions.len();

        let (selected, has_more_items) = match listing {
            Some(listing) => {
                let window = compute_window(size, listing);
                let selected: Vec<ObjectData> =
                    versions.into_iter().skip(window.range.start).take(window.range.len()).collect();
                (selected, window.has_more_items)
            }
            None => (versions, false),
        };

        let mut items = self.to_documents(&selected)?;
        if let Some(listing) = listing {
            items.sort_by(|a, b| listing.compare(a, b));
        }

        tracing::debug!(
            series = %series,
            total = size,
            returned = items.len(),
            has_more_items,
            "listed versions"
        );

        Ok(PagingResult::new(items, has_more_items, size as u64))
    }

    /// Fetches the latest version of `document`'s series.
    ///
    /// With `major_only`, the latest major version is returned instead.
    pub async fn get_latest_version(
        &self,
        document: &Document,
        major_only: bool,
    ) -> VersionResult<Document> {
        let series = series_of(document)?;

        let data = self
            .session
            .handle()
            .get_object_of_latest_version(
                self.session.repository_id(),
                &document.id,
                series,
                major_only,
            )
            .await
            .map_err(|e| self.session.translate("getObjectOfLatestVersion", e))?;

        self.session.convert(&data)?.into_document().ok_or_else(|| {
            self.session.translate(
                "getObjectOfLatestVersion",
                TransportError::Malformed(format!("latest version of {series} is not a document")),
            )
        })
    }

    fn to_documents(&self, objects: &[ObjectData]) -> VersionResult<Vec<Document>> {
        let mut documents = Vec::with_capacity(objects.len());
        for data in objects {
            match self.session.convert(data)?.into_document() {
                Some(doc) => documents.push(doc),
                None => {
                    tracing::warn!(
                        object = ?data.object_id(),
                        "skipping non-document in version history"
                    );
                }
            }
        }
        Ok(documents)
    }
}

fn series_of(document: &Document) -> VersionResult<&VersionSeriesId> {
    if document.id.is_empty() {
        return Err(VersionError::missing("document id"));
    }
    document
        .version_series_id
        .as_ref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            VersionError::InvalidArgument(format!(
                "document {} has no version series id",
                document.id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use verso_core::SortProperty;

    use crate::error::ErrorKind;
    use crate::testing::{ScriptedRepository, doc_data, folder_data, session, versions};

    fn doc() -> Document {
        Document::builder("s;1").name("v1").version_series("s").build()
    }

    fn pager(repo: &Arc<ScriptedRepository>) -> VersionHistoryPager {
        VersionHistoryPager::new(session(repo))
    }

    fn names(page: &PagingResult<Document>) -> Vec<&str> {
        page.items.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn window_arithmetic_holds_for_all_small_inputs() {
        for n in 0..8usize {
            for skip in 0..10u32 {
                for max in 0..10u32 {
                    let ctx = ListingContext::default()
                        .with_skip_count(skip)
                        .with_max_items(max);
                    let w = compute_window(n, &ctx);
                    let clamped = (skip as usize).min(n);

                    assert!(w.range.end <= n);
                    assert_eq!(w.range.start, clamped);
                    assert_eq!(w.range.len(), (max as usize).min(n - clamped));
                    assert_eq!(
                        w.has_more_items,
                        (skip as usize + max as usize) < n,
                        "n={n} skip={skip} max={max}"
                    );
                }
            }
        }
    }

    #[test]
    fn skip_past_end_is_empty() {
        let ctx = ListingContext::default().with_skip_count(12).with_max_items(3);
        let w = compute_window(5, &ctx);
        assert!(w.range.is_empty());
        assert!(!w.has_more_items);
    }

    #[tokio::test]
    async fn scenario_a_windows_then_sorts_descending() {
        let repo = Arc::new(ScriptedRepository::with_versions(versions(5)));
        let ctx = ListingContext::default()
            .with_skip_count(1)
            .with_max_items(2)
            .with_sort(SortProperty::Name, false);

        let page = pager(&repo).get_versions(&doc(), Some(&ctx)).await.unwrap();

        assert_eq!(names(&page), vec!["v3", "v2"]);
        assert!(page.has_more_items);
        assert_eq!(page.total_items, 5);
    }

    #[tokio::test]
    async fn scenario_b_window_reaching_end() {
        let repo = Arc::new(ScriptedRepository::with_versions(versions(5)));
        let ctx = ListingContext::default().with_skip_count(4).with_max_items(10);

        let page = pager(&repo).get_versions(&doc(), Some(&ctx)).await.unwrap();

        assert_eq!(names(&page), vec!["v5"]);
        assert!(!page.has_more_items);
        assert_eq!(page.total_items, 5);
    }

    #[tokio::test]
    async fn sorting_never_changes_which_versions_are_selected() {
        // Repository order is v4, v2, v5, v1, v3. Sorting before windowing
        // would select v1,v2; the page must hold the first two in
        // repository order instead.
        let shuffled = [4, 2, 5, 1, 3]
            .iter()
            .map(|i| doc_data(&format!("s;{i}"), &format!("v{i}"), "s"))
            .collect();
        let repo = Arc::new(ScriptedRepository::with_versions(shuffled));
        let ctx = ListingContext::default().with_max_items(2);

        let page = pager(&repo).get_versions(&doc(), Some(&ctx)).await.unwrap();

        assert_eq!(names(&page), vec!["v2", "v4"]);
        assert!(page.has_more_items);
    }

    #[tokio::test]
    async fn no_window_returns_full_history_in_repository_order() {
        let mut history = versions(3);
        history.reverse();
        let repo = Arc::new(ScriptedRepository::with_versions(history));

        let page = pager(&repo).get_versions(&doc(), None).await.unwrap();

        assert_eq!(names(&page), vec!["v3", "v2", "v1"]);
        assert!(!page.has_more_items);
        assert_eq!(page.total_items, 3);
        assert_eq!(repo.calls(), vec!["getAllVersions"]);
    }

    #[tokio::test]
    async fn empty_history_is_not_an_error() {
        let repo = Arc::new(ScriptedRepository::with_versions(Vec::new()));
        let ctx = ListingContext::default().with_skip_count(3);

        let page = pager(&repo).get_versions(&doc(), Some(&ctx)).await.unwrap();

        assert!(page.is_empty());
        assert!(!page.has_more_items);
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn non_documents_are_skipped_but_counted() {
        let mut history = versions(2);
        history.insert(1, folder_data("stray"));
        let repo = Arc::new(ScriptedRepository::with_versions(history));

        let page = pager(&repo).get_versions(&doc(), None).await.unwrap();

        assert_eq!(names(&page), vec!["v1", "v2"]);
        assert_eq!(page.total_items, 3);
    }

    #[tokio::test]
    async fn missing_series_is_invalid_argument_without_remote_call() {
        let repo = Arc::new(ScriptedRepository::with_versions(versions(2)));
        let orphan = Document::builder("s;1").name("v1").build();

        let err = pager(&repo).get_versions(&orphan, None).await.unwrap_err();
        assert!(matches!(err, VersionError::InvalidArgument(_)));

        let empty_id = Document::builder("").version_series("s").build();
        let err = pager(&repo)
            .get_latest_version(&empty_id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, VersionError::InvalidArgument(_)));

        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_is_translated() {
        let repo = Arc::new(ScriptedRepository::failing(|| {
            TransportError::Connection("reset by peer".into())
        }));

        let err = pager(&repo).get_versions(&doc(), None).await.unwrap_err();

        match err {
            VersionError::Repository(e) => {
                assert_eq!(e.operation, "getAllVersions");
                assert_eq!(e.kind, ErrorKind::Unavailable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.calls().len(), 1);
    }

    #[tokio::test]
    async fn latest_version_is_narrowed_to_document() {
        let repo = Arc::new(ScriptedRepository::with_versions(versions(4)));
        let latest = pager(&repo).get_latest_version(&doc(), false).await.unwrap();
        assert_eq!(latest.name, "v4");

        let repo = Arc::new(ScriptedRepository::with_versions(vec![folder_data("f")]));
        let err = pager(&repo).get_latest_version(&doc(), true).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidResponse));
    }
}
