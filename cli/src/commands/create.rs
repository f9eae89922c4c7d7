//! CREATE command - Create a new document.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use verso_core::Properties;

use super::{Context, content_arg, output};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Name for the new document
    pub name: String,

    /// Initial content: literal text, or @PATH to read a file
    #[arg(long)]
    pub content: Option<String>,

    /// MIME type of the content
    #[arg(long)]
    pub mime: Option<String>,
}

/// Execute the create command.
pub async fn execute(ctx: &Context, human: bool, args: CreateArgs) -> Result<()> {
    let content = match &args.content {
        Some(raw) => {
            let file = content_arg(raw, &args.name, args.mime.as_deref());
            Some(
                file.open_stream()
                    .await
                    .with_context(|| format!("failed to read content for {}", args.name))?,
            )
        }
        None => None,
    };

    let id = ctx
        .repository
        .create_document(&args.name, Properties::new(), content)
        .await?;
    ctx.save().await?;

    let document = ctx.document(id.as_str()).await?;
    if human {
        println!("{}", "Document created successfully!".green().bold());
        println!();
    }
    output(&document, human)
}
