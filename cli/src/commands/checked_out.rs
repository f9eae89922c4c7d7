//! CHECKED-OUT command - List checked-out documents.

use anyhow::Result;
use clap::Args;
use verso_client::CheckoutLifecycle;

use super::{Context, WindowArgs, output};

/// Arguments for the checked-out command.
#[derive(Args)]
pub struct CheckedOutArgs {
    #[command(flatten)]
    pub window: WindowArgs,
}

/// Execute the checked-out command.
pub async fn execute(ctx: &Context, human: bool, args: CheckedOutArgs) -> Result<()> {
    let page = match args.window.listing() {
        Some(listing) => ctx.service.checked_out_documents_page(&listing).await?,
        None => {
            CheckoutLifecycle::new(ctx.service.session().clone())
                .get_checked_out_documents(None)
                .await?
        }
    };
    output(&page, human)
}
