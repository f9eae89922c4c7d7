//! CHECKOUT command - Check a document out.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{Context, output};

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Object id of the document to check out
    pub id: String,
}

/// Execute the checkout command.
pub async fn execute(ctx: &Context, human: bool, args: CheckoutArgs) -> Result<()> {
    let document = ctx.document(&args.id).await?;
    let working_copy = ctx.service.checkout(&document).await?;
    ctx.save().await?;

    if human {
        println!("{}", "Checked out.".green().bold());
        println!();
    }
    output(&working_copy, human)
}
