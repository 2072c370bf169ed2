//! Document export
//!
//! Writes a finished document either as a bare `SKILL.md` or inside a
//! `use-<slug>/` folder ready to be dropped into a skills directory.

use std::path::{Path, PathBuf};
use tracing::info;

use super::prompt::skill_name;
use crate::constants;
use crate::types::Result;

/// Write `document` to `<dir>/SKILL.md`, creating `dir` if needed
pub fn write_skill_file(dir: &Path, document: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(constants::export::SKILL_FILE);
    std::fs::write(&path, document)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Write `document` to `<dir>/use-<slug>/SKILL.md`
pub fn write_skill_bundle(dir: &Path, display_name: &str, document: &str) -> Result<PathBuf> {
    write_skill_file(&bundle_dir(dir, display_name), document)
}

/// Folder a bundle for `display_name` is written to
pub fn bundle_dir(dir: &Path, display_name: &str) -> PathBuf {
    dir.join(skill_name(display_name))
}
