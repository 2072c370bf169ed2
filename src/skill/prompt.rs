//! Prompt Assembler
//!
//! Pure `RepositorySnapshot → prompt` rendering for the initial generation
//! call, plus the refinement template that embeds the current document.
//! README and file bodies are cut to a fixed number of characters so prompt
//! size stays bounded whatever the repository holds.

use crate::config::PromptConfig;
use crate::constants;
use crate::types::{FetchedFile, RepositorySnapshot};

const OUTPUT_RULE: &str = "IMPORTANT: Output ONLY the raw Markdown content. Do not include any conversational text before or after the Markdown block. Do not wrap it in ```markdown unless it's part of the file itself.";

/// Normalized slug of a display name
///
/// Lower-cases, then collapses every maximal run of characters outside
/// `[a-z0-9]` into a single `-`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_gap = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push('-');
            in_gap = true;
        }
    }
    out
}

/// Skill identifier used in frontmatter and bundle folder names
pub fn skill_name(display_name: &str) -> String {
    format!("{}{}", constants::export::BUNDLE_PREFIX, slug(display_name))
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Renders snapshots and refinement requests into prompt text
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    limits: PromptConfig,
}

impl PromptAssembler {
    pub fn new(limits: PromptConfig) -> Self {
        Self { limits }
    }

    /// Initial-generation prompt with the fixed SKILL.md section skeleton
    pub fn initial(&self, snapshot: &RepositorySnapshot) -> String {
        let metadata = &snapshot.metadata;
        let name = &metadata.display_name;
        let skill = skill_name(name);

        format!(
            r##"You are an expert software architect and technical writer. Your task is to analyze the provided GitHub repository data and generate a comprehensive, ready-to-use SKILL.md file for Claude Code.

Repository Name: {name}
Description: {description}
Language: {language}

README Content:
{readme}

Key Files Content:
{files}

Based on this information, generate a SKILL.md file following EXACTLY this structure:

---
name: {skill}
description: A brief description of what this skill does and when to invoke it (e.g., /{skill}).
---

# {name} Skill

## Overview
[Provide a high-level overview of the library/framework]

## Installation
[How to install it]

## Basic Usage
[Provide basic code examples]

## Advanced Features / API
[Highlight key advanced features or API methods]

## Common Patterns and Best Practices
[List best practices based on the repo's docs or common usage]

## Examples Extracted from Repo
[Include 1-2 concrete examples found in the provided files]

## Tips for Claude
[Instructions on how Claude should respond or behave when this skill is invoked. E.g., "When asked about X, always use pattern Y."]

{rule}
"##,
            name = name,
            description = metadata.description.as_deref().unwrap_or("Not specified"),
            language = metadata.primary_language.as_deref().unwrap_or("Not specified"),
            readme = truncate_chars(&snapshot.readme, self.limits.readme_max_chars),
            files = self.render_files(&snapshot.files),
            skill = skill,
            rule = OUTPUT_RULE,
        )
    }

    /// Refinement prompt: the whole current document plus the instruction
    pub fn refinement(&self, repository: &str, document: &str, instruction: &str) -> String {
        format!(
            r##"You are an expert software architect and technical writer.
Here is the current SKILL.md file for the repository {repository}:

```markdown
{document}
```

The user has requested the following modification:
"{instruction}"

Please provide the updated SKILL.md file incorporating these changes.
{rule}
"##,
            repository = repository,
            document = document,
            instruction = instruction,
            rule = OUTPUT_RULE,
        )
    }

    fn render_files(&self, files: &[FetchedFile]) -> String {
        files
            .iter()
            .map(|f| {
                format!(
                    "--- {} ---\n{}",
                    f.path,
                    truncate_chars(&f.content, self.limits.file_max_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RepositoryMetadata, RepositoryReference};
    use proptest::prelude::*;

    fn snapshot(readme: &str, files: Vec<FetchedFile>) -> RepositorySnapshot {
        RepositorySnapshot {
            reference: RepositoryReference::new("acme", "widget").unwrap(),
            metadata: RepositoryMetadata {
                display_name: "Widget.js".to_string(),
                description: Some("Tiny widgets".to_string()),
                star_count: 42,
                primary_language: Some("TypeScript".to_string()),
                default_branch: "main".to_string(),
            },
            readme: readme.to_string(),
            files,
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Widget.js"), "widget-js");
        assert_eq!(slug("my__cool   repo"), "my-cool-repo");
        assert_eq!(slug("-Lead"), "-lead");
        assert_eq!(slug("React"), "react");
        assert_eq!(skill_name("Widget.js"), "use-widget-js");
    }

    #[test]
    fn test_truncate_chars_is_char_based() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_empty_snapshot_prompt_is_well_formed() {
        let prompt = PromptAssembler::default().initial(&snapshot("", Vec::new()));

        assert!(prompt.contains("Repository Name: Widget.js"));
        assert!(prompt.contains("Description: Tiny widgets"));
        assert!(prompt.contains("Language: TypeScript"));
        assert!(prompt.contains("README Content:\n\n\nKey Files Content:\n\n\nBased on"));
        assert!(prompt.contains("name: use-widget-js"));
        assert!(prompt.contains("# Widget.js Skill"));
        assert!(prompt.contains(OUTPUT_RULE));
    }

    #[test]
    fn test_sections_in_order() {
        let prompt = PromptAssembler::default().initial(&snapshot("", Vec::new()));
        let sections = [
            "## Overview",
            "## Installation",
            "## Basic Usage",
            "## Advanced Features / API",
            "## Common Patterns and Best Practices",
            "## Examples Extracted from Repo",
            "## Tips for Claude",
        ];
        let positions: Vec<usize> = sections.iter().map(|s| prompt.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_metadata_fields() {
        let mut snap = snapshot("", Vec::new());
        snap.metadata.description = None;
        snap.metadata.primary_language = None;
        let prompt = PromptAssembler::default().initial(&snap);
        assert!(prompt.contains("Description: Not specified"));
        assert!(prompt.contains("Language: Not specified"));
    }

    #[test]
    fn test_files_are_truncated_and_joined() {
        let assembler = PromptAssembler::new(PromptConfig {
            readme_max_chars: 4,
            file_max_chars: 3,
        });
        let prompt = assembler.initial(&snapshot(
            "README body",
            vec![
                FetchedFile {
                    path: "package.json".to_string(),
                    content: "{\"name\":1}".to_string(),
                },
                FetchedFile {
                    path: "src/index.ts".to_string(),
                    content: "export".to_string(),
                },
            ],
        ));

        assert!(prompt.contains("README Content:\nREAD\n"));
        assert!(prompt.contains("--- package.json ---\n{\"n\n\n--- src/index.ts ---\nexp"));
    }

    #[test]
    fn test_refinement_embeds_document_and_instruction() {
        let prompt =
            PromptAssembler::default().refinement("Widget.js", "# Doc v1", "shorten the overview");
        assert!(prompt.contains("for the repository Widget.js"));
        assert!(prompt.contains("```markdown\n# Doc v1\n```"));
        assert!(prompt.contains("\"shorten the overview\""));
        assert!(prompt.contains(OUTPUT_RULE));
    }

    proptest! {
        #[test]
        fn prop_slug_has_no_double_hyphen(name in ".{0,40}") {
            let s = slug(&name);
            prop_assert!(!s.contains("--"));
            prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn prop_truncate_respects_limit(text in ".{0,60}", max in 0usize..40) {
            let cut = truncate_chars(&text, max);
            prop_assert_eq!(cut.chars().count(), text.chars().count().min(max));
            prop_assert!(text.starts_with(cut));
        }
    }
}
