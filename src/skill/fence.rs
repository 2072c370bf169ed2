//! Code-fence wrapper removal for generated documents.

/// Remove a ```` ``` ```` / ```` ```markdown ```` wrapper enclosing the whole
/// response.
///
/// A wrapper is recognized only when the first line of the trimmed text is
/// the opening fence and its matching close is the last line. Fences between
/// them must pair up: a tagged fence (```` ```bash ````) opens an inner block
/// and a bare fence closes it. Inside a ```` ```markdown ```` wrapper a bare
/// fence with no block open starts one; inside a bare wrapper it would close
/// the wrapper early, so the text is left alone.
///
/// Removing a wrapper can expose another one, so the result is the fixed
/// point: `strip_fences(strip_fences(x)) == strip_fences(x)`.
pub fn strip_fences(text: &str) -> &str {
    let mut current = text.trim();
    while let Some(inner) = unwrap_once(current) {
        current = inner.trim();
    }
    current
}

fn unwrap_once(text: &str) -> Option<&str> {
    let first_break = text.find('\n')?;
    let last_break = text.rfind('\n')?;

    let opening = Opening::parse(text[..first_break].trim_end())?;
    if text[last_break + 1..].trim() != "```" {
        return None;
    }
    if first_break == last_break {
        return Some("");
    }

    let inner = &text[first_break + 1..last_break];
    encloses(opening, inner).then_some(inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opening {
    Bare,
    Markdown,
}

impl Opening {
    fn parse(line: &str) -> Option<Self> {
        match line.strip_prefix("```")? {
            "" => Some(Opening::Bare),
            tag if tag.eq_ignore_ascii_case("markdown") => Some(Opening::Markdown),
            _ => None,
        }
    }
}

/// Whether every fence inside `inner` is paired, so the wrapper's closing
/// fence really is the final line
fn encloses(opening: Opening, inner: &str) -> bool {
    let mut depth = 0usize;
    for line in inner.lines() {
        let Some(tag) = line.trim().strip_prefix("```") else {
            continue;
        };
        if !tag.trim().is_empty() {
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
        } else if opening == Opening::Markdown {
            depth = 1;
        } else {
            return false;
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_markdown_wrapper() {
        assert_eq!(strip_fences("```markdown\n# Doc\n\nBody\n```"), "# Doc\n\nBody");
        assert_eq!(strip_fences("```Markdown\r\n# Doc\r\n```\r\n"), "# Doc");
    }

    #[test]
    fn test_bare_wrapper() {
        assert_eq!(strip_fences("```\n# Doc\n```\n"), "# Doc");
    }

    #[test]
    fn test_unwrapped_document_untouched() {
        let doc = "# Doc\n\n```bash\nnpm i widget\n```";
        assert_eq!(strip_fences(doc), doc);
    }

    #[test]
    fn test_other_language_tag_kept() {
        let doc = "```md\n# Doc\n```";
        assert_eq!(strip_fences(doc), doc);
    }

    #[test]
    fn test_inner_code_blocks_survive() {
        let wrapped = "```markdown\n# Doc\n```bash\nnpm i\n```\n```";
        assert_eq!(strip_fences(wrapped), "# Doc\n```bash\nnpm i\n```");

        let bare = "```\n# Doc\n```ts\nrun()\n```\n```";
        assert_eq!(strip_fences(bare), "# Doc\n```ts\nrun()\n```");
    }

    #[test]
    fn test_separate_blocks_are_not_a_wrapper() {
        let doc = "```\nnpm install widget\n```\n\n## Usage\n\n```\nwidget run\n```";
        assert_eq!(strip_fences(doc), doc);
    }

    #[test]
    fn test_unbalanced_inner_fence_is_not_a_wrapper() {
        let doc = "```markdown\n# Doc\n```bash\nnpm i\n```";
        assert_eq!(strip_fences(doc), doc);
    }

    #[test]
    fn test_markdown_wrapper_around_bare_block() {
        // The outer wrapper pairs with the last line; what it exposes is
        // itself a whole-response wrapper and goes too.
        let wrapped = "```markdown\n```\nnpm install widget\n```\n```";
        assert_eq!(unwrap_once(wrapped), Some("```\nnpm install widget\n```"));
        assert_eq!(strip_fences(wrapped), "npm install widget");
    }

    #[test]
    fn test_document_ending_in_code_block_keeps_it() {
        let doc = "```markdown\n# Doc\n\n```\nwidget run\n```\n```";
        assert_eq!(strip_fences(doc), "# Doc\n\n```\nwidget run\n```");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(strip_fences(""), "");
        assert_eq!(strip_fences("```"), "```");
        assert_eq!(strip_fences("```\n```"), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(body in "(```|```markdown|```bash|# [a-z ]{0,8}|[a-z]{0,8}|\\s{0,2})(\n(```|```bash|[a-z #]{0,10})){0,6}") {
            let once = strip_fences(&body);
            prop_assert_eq!(strip_fences(once), once);
        }

        #[test]
        fn prop_wrapping_is_undone(doc in "[a-z#][a-z #\n]{0,30}[a-z]") {
            let wrapped = format!("```markdown\n{}\n```", doc);
            prop_assert_eq!(strip_fences(&wrapped), doc.trim());
        }
    }
}
