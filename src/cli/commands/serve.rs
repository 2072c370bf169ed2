//! Serve Command
//!
//! Exposes the extraction pipeline over HTTP.
//!
//! Usage:
//!   skillforge serve [--addr 127.0.0.1:3000]

use std::net::SocketAddr;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::cli::{CommandContext, Output, cancel_on_ctrl_c};
use crate::server::{self, EXTRACT_ROUTE, ServerState};
use crate::types::{Result, SkillError};

pub fn run(config_file: Option<&Path>, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| SkillError::Config(format!("Invalid listen address '{}': {}", addr, e)))?;
    let ctx = CommandContext::load(config_file)?;

    let rt = Runtime::new()?;
    rt.block_on(serve(ctx, addr))
}

async fn serve(ctx: CommandContext, addr: SocketAddr) -> Result<()> {
    let state = ServerState::new(ctx.fetcher()?, cancel_on_ctrl_c());

    let out = Output::new();
    out.info(&format!("Listening on http://{}{}", addr, EXTRACT_ROUTE));
    out.info("Press Ctrl-C to stop");

    server::serve(addr, state).await?;
    out.success("Server stopped");
    Ok(())
}
