//! Generate Command
//!
//! Fetches a repository, generates its SKILL.md and then reads refinement
//! instructions from stdin until an empty line, `:q` or EOF.
//!
//! Usage:
//!   skillforge generate <url> [--provider P] [--model M] [-o DIR] [--bundle] [--no-chat]
//!
//! Chat commands:
//!   <text>   regenerate the document with this instruction
//!   :w       rewrite the output file
//!   :q       quit

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::cli::{CommandContext, Output, cancel_on_ctrl_c};
use crate::skill::{GenerationSession, write_skill_bundle, write_skill_file};
use crate::types::{Result, SkillError};

/// Generate run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Repository URL
    pub url: String,
    /// Explicit config file instead of the merged chain
    pub config_file: Option<PathBuf>,
    /// LLM provider override
    pub provider: Option<String>,
    /// Model override
    pub model: Option<String>,
    /// Output directory (defaults to the current directory)
    pub output: Option<PathBuf>,
    /// Write `use-<slug>/SKILL.md` instead of `SKILL.md`
    pub bundle: bool,
    /// Enter the refinement loop after generation
    pub chat: bool,
}

/// Chat loop input
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Write,
    Instruction(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" | ":q" | ":quit" => ChatInput::Quit,
            ":w" | ":write" => ChatInput::Write,
            text => ChatInput::Instruction(text),
        }
    }
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let ctx = CommandContext::load(options.config_file.as_deref())?
        .with_llm_overrides(options.provider.clone(), options.model.clone())?;

    let rt = Runtime::new()?;
    rt.block_on(run_session(ctx, options))
}

async fn run_session(ctx: CommandContext, options: GenerateOptions) -> Result<()> {
    let out = Output::new();
    let cancel = cancel_on_ctrl_c();

    let mut session = GenerationSession::new(ctx.fetcher()?, ctx.provider()?, &ctx.config);
    out.info(&format!(
        "Generating skill for {} with {} ({})",
        options.url.trim(),
        ctx.config.llm.model,
        ctx.config.llm.provider
    ));

    let started = session.start(&options.url, &cancel).await.map(|_| ());
    if let Err(e) = started {
        out.error(&format!("Generation failed ({})", session.state()));
        return Err(e);
    }

    let path = save(&session, &options)?;
    if let Some(turn) = session.turns().last() {
        out.assistant(&turn.text);
    }
    out.success(&format!("Wrote {}", path.display()));

    if options.chat {
        chat(&mut session, &options, &cancel, &out).await?;
    }
    Ok(())
}

async fn chat(
    session: &mut GenerationSession,
    options: &GenerateOptions,
    cancel: &CancellationToken,
    out: &Output,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        out.prompt("refine>");
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Write => {
                let path = save(session, options)?;
                out.success(&format!("Wrote {}", path.display()));
            }
            ChatInput::Instruction(instruction) => {
                let refined = tokio::select! {
                    _ = cancel.cancelled() => break,
                    refined = session.refine(instruction) => refined.map(|_| ()),
                };
                let reply = session
                    .turns()
                    .last()
                    .map(|t| t.text.clone())
                    .unwrap_or_default();

                match refined {
                    Ok(()) => {
                        out.assistant(&reply);
                        let path = save(session, options)?;
                        out.success(&format!("Wrote {}", path.display()));
                    }
                    Err(e) if !e.is_fatal() => {
                        out.assistant(&reply);
                        out.warning(&e.to_string());
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(())
}

/// Write the current document to the configured destination
fn save(session: &GenerationSession, options: &GenerateOptions) -> Result<PathBuf> {
    let (Some(document), Some(snapshot)) = (session.document(), session.snapshot()) else {
        return Err(SkillError::Session(
            "no generated document to write".to_string(),
        ));
    };

    let dir = options.output.as_deref().unwrap_or(Path::new("."));
    if options.bundle {
        write_skill_bundle(dir, &snapshot.metadata.display_name, document)
    } else {
        write_skill_file(dir, document)
    }
}
