//! Fetch Command
//!
//! Runs the extraction pipeline only and prints the snapshot.
//!
//! Usage:
//!   skillforge fetch <url> [-f text|json]

use std::path::Path;
use tokio::runtime::Runtime;

use crate::cli::{CommandContext, Output, cancel_on_ctrl_c};
use crate::types::{RepositorySnapshot, Result, SkillError, SnapshotResponse};

/// Output format for the fetched snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFormat {
    Text,
    Json,
}

impl FetchFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SkillError::Config(format!(
                "Invalid format '{}'. Valid values: text, json",
                other
            ))),
        }
    }
}

pub fn run(config_file: Option<&Path>, url: &str, format: &str) -> Result<()> {
    let format = FetchFormat::parse(format)?;
    let ctx = CommandContext::load(config_file)?;

    let rt = Runtime::new()?;
    rt.block_on(fetch_and_print(&ctx, url, format))
}

async fn fetch_and_print(ctx: &CommandContext, url: &str, format: FetchFormat) -> Result<()> {
    let fetcher = ctx.fetcher()?;
    let cancel = cancel_on_ctrl_c();
    let snapshot = fetcher.extract(url, &cancel).await?;

    match format {
        FetchFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&SnapshotResponse::from(&snapshot))?
        ),
        FetchFormat::Text => print_summary(&snapshot),
    }
    Ok(())
}

fn print_summary(snapshot: &RepositorySnapshot) {
    let out = Output::new();
    let meta = &snapshot.metadata;

    out.header(&format!("{} ({})", meta.display_name, snapshot.reference));
    out.field(
        "Description:",
        meta.description.as_deref().unwrap_or("(none)"),
    );
    out.field(
        "Language:",
        meta.primary_language.as_deref().unwrap_or("(unknown)"),
    );
    out.field("Stars:", &meta.star_count.to_string());
    out.field("Branch:", &meta.default_branch);
    out.field(
        "README:",
        &format!("{} chars", snapshot.readme.chars().count()),
    );

    out.section(&format!("Files ({})", snapshot.files.len()));
    for file in &snapshot.files {
        println!("{:>8}  {}", file.content.chars().count(), file.path);
    }
}
