//! Version service facade.
//!
//! Bundles the history pager and the checkout lifecycle over one shared
//! session and adds the list-returning convenience forms.

use verso_core::{ContentFile, Document, ListingContext, ObjectId, PagingResult, Properties};

use crate::error::VersionResult;
use crate::lifecycle::{CheckoutLifecycle, SeriesState};
use crate::pager::VersionHistoryPager;
use crate::session::RepositorySession;

#[derive(Debug, Clone)]
pub struct VersionService {
    pager: VersionHistoryPager,
    lifecycle: CheckoutLifecycle,
}

impl VersionService {
    pub fn new(session: RepositorySession) -> Self {
        Self {
            pager: VersionHistoryPager::new(session.clone()),
            lifecycle: CheckoutLifecycle::new(session),
        }
    }

    pub fn session(&self) -> &RepositorySession {
        self.pager.session()
    }

    /// Resolves an object id to a document.
    pub async fn document(&self, id: &ObjectId) -> VersionResult<Document> {
        self.session().resolve_document(id).await
    }

    pub async fn latest_version(&self, document: &Document) -> VersionResult<Document> {
        self.pager.get_latest_version(document, false).await
    }

    pub async fn latest_major_version(&self, document: &Document) -> VersionResult<Document> {
        self.pager.get_latest_version(document, true).await
    }

    /// Whole version history in repository order.
    pub async fn versions(&self, document: &Document) -> VersionResult<Vec<Document>> {
        Ok(self.pager.get_versions(document, None).await?.into_items())
    }

    pub async fn versions_page(
        &self,
        document: &Document,
        listing: &ListingContext,
    ) -> VersionResult<PagingResult<Document>> {
        self.pager.get_versions(document, Some(listing)).await
    }

    pub async fn series_state(&self, document: &Document) -> VersionResult<SeriesState> {
        self.lifecycle.series_state(document).await
    }

    pub async fn checkout(&self, document: &Document) -> VersionResult<Document> {
        self.lifecycle.checkout(document).await
    }

    pub async fn cancel_checkout(&self, document: &Document) -> VersionResult<()> {
        self.lifecycle.cancel_checkout(document).await
    }

    pub async fn checkin(
        &self,
        document: &Document,
        major_version: bool,
        content: Option<&ContentFile>,
        properties: Properties,
        comment: Option<&str>,
    ) -> VersionResult<Option<Document>> {
        self.lifecycle
            .checkin(document, major_version, content, properties, comment)
            .await
    }

    /// First page of checked-out documents at the default page size.
    pub async fn checked_out_documents(&self) -> VersionResult<Vec<Document>> {
        Ok(self
            .lifecycle
            .get_checked_out_documents(None)
            .await?
            .into_items())
    }

    pub async fn checked_out_documents_page(
        &self,
        listing: &ListingContext,
    ) -> VersionResult<PagingResult<Document>> {
        self.lifecycle.get_checked_out_documents(Some(listing)).await
    }
}
