//! CANCEL command - Discard a document's working copy.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use verso_core::ObjectId;

use super::{Context, HumanReadable, output};

/// Arguments for the cancel command.
#[derive(Args)]
pub struct CancelArgs {
    /// Object id of any version in the checked-out series
    pub id: String,
}

/// Result of a cancel.
#[derive(Debug, Serialize)]
pub struct CancelOutcome {
    pub document: ObjectId,
    /// Working copy that was discarded, if any.
    pub cancelled: Option<ObjectId>,
}

impl HumanReadable for CancelOutcome {
    fn print_human(&self) {
        match &self.cancelled {
            Some(pwc) => println!(
                "{} {}",
                "Checkout cancelled; discarded".green().bold(),
                pwc
            ),
            None => println!("{}", "Not checked out; nothing to cancel.".yellow()),
        }
    }
}

/// Execute the cancel command.
pub async fn execute(ctx: &Context, human: bool, args: CancelArgs) -> Result<()> {
    let document = ctx.document(&args.id).await?;
    let cancelled = ctx.service.series_state(&document).await?.pwc_id().cloned();

    ctx.service.cancel_checkout(&document).await?;
    if cancelled.is_some() {
        ctx.save().await?;
    }

    output(
        &CancelOutcome {
            document: document.id,
            cancelled,
        },
        human,
    )
}
