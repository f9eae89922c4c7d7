//! LATEST command - Show the latest version of a document.

use anyhow::Result;
use clap::Args;

use super::{Context, output};

/// Arguments for the latest command.
#[derive(Args)]
pub struct LatestArgs {
    /// Object id of any version in the series
    pub id: String,

    /// Return the latest major version instead
    #[arg(long)]
    pub major: bool,
}

/// Execute the latest command.
pub async fn execute(ctx: &Context, human: bool, args: LatestArgs) -> Result<()> {
    let document = ctx.document(&args.id).await?;
    let latest = if args.major {
        ctx.service.latest_major_version(&document).await?
    } else {
        ctx.service.latest_version(&document).await?
    };
    output(&latest, human)
}
