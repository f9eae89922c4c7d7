//! VERSIONS command - List a document's version history.

use anyhow::Result;
use clap::Args;
use verso_core::PagingResult;

use super::{Context, WindowArgs, output};

/// Arguments for the versions command.
#[derive(Args)]
pub struct VersionsArgs {
    /// Object id of any version in the series
    pub id: String,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Execute the versions command.
pub async fn execute(ctx: &Context, human: bool, args: VersionsArgs) -> Result<()> {
    let document = ctx.document(&args.id).await?;
    let page = match args.window.listing() {
        Some(listing) => ctx.service.versions_page(&document, &listing).await?,
        None => {
            let items = ctx.service.versions(&document).await?;
            let total = items.len() as u64;
            PagingResult::new(items, false, total)
        }
    };
    output(&page, human)
}
