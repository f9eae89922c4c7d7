//! CHECKIN command - Check a working copy in as a new version.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use verso_core::{Document, Properties};

use super::{Context, HumanReadable, content_arg, output, parse_property};

/// Arguments for the checkin command.
#[derive(Args)]
pub struct CheckinArgs {
    /// Object id of any version in the checked-out series
    pub id: String,

    /// Create a major version
    #[arg(long)]
    pub major: bool,

    /// New content: literal text, or @PATH to read a file
    #[arg(long)]
    pub content: Option<String>,

    /// MIME type of the new content
    #[arg(long)]
    pub mime: Option<String>,

    /// Checkin comment
    #[arg(short = 'm', long)]
    pub comment: Option<String>,

    /// Property to set on the new version (repeatable)
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

/// Result of a checkin.
#[derive(Debug, Serialize)]
pub struct CheckinOutcome {
    pub checked_in: bool,
    pub version: Option<Document>,
}

impl HumanReadable for CheckinOutcome {
    fn print_human(&self) {
        match &self.version {
            Some(version) => {
                println!("{}", "Checked in.".green().bold());
                println!();
                version.print_human();
            }
            None => println!("{}", "Not checked out; nothing to check in.".yellow()),
        }
    }
}

/// Execute the checkin command.
pub async fn execute(ctx: &Context, human: bool, args: CheckinArgs) -> Result<()> {
    let document = ctx.document(&args.id).await?;
    let content = args
        .content
        .as_deref()
        .map(|raw| content_arg(raw, &document.name, args.mime.as_deref()));
    let properties: Properties = args
        .properties
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    let version = ctx
        .service
        .checkin(
            &document,
            args.major,
            content.as_ref(),
            properties,
            args.comment.as_deref(),
        )
        .await?;
    if version.is_some() {
        ctx.save().await?;
    }

    output(
        &CheckinOutcome {
            checked_in: version.is_some(),
            version,
        },
        human,
    )
}
