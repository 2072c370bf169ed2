//! Skill Document Generation
//!
//! Turns a repository snapshot into a SKILL.md document and refines it turn
//! by turn.
//!
//! ## Modules
//!
//! - `prompt`: snapshot and refinement prompt templates
//! - `fence`: code-fence wrapper removal
//! - `refiner`: initial generation and the pure refinement transform
//! - `session`: lifecycle state machine and conversation log
//! - `export`: `SKILL.md` / `use-<slug>/SKILL.md` writers

pub mod export;
pub mod fence;
pub mod prompt;
pub mod refiner;
pub mod session;

pub use export::{bundle_dir, write_skill_bundle, write_skill_file};
pub use fence::strip_fences;
pub use prompt::{PromptAssembler, skill_name, slug, truncate_chars};
pub use refiner::{GenerationSettings, Refiner, SkillWriter};
pub use session::{ConversationTurn, GenerationSession, LifecycleState, Role};
