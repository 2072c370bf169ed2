//! Repository reference resolution
//!
//! Turns free-form input such as `https://github.com/acme/widget.git` into a
//! canonical [`RepositoryReference`]. Pure: no network access.

use regex::Regex;

use crate::constants;
use crate::types::{RepositoryReference, Result, SkillError};

/// Extracts `owner/name` pairs for a single source host
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    pattern: Regex,
}

impl ReferenceResolver {
    /// Resolver matching `<host>/<owner>/<name>` anywhere in the input
    pub fn for_host(host: &str) -> Result<Self> {
        let pattern = format!(r"{}/([^/\s?#]+)/([^/\s?#]+)", regex::escape(host));
        let pattern = Regex::new(&pattern)
            .map_err(|e| SkillError::Config(format!("Invalid source host '{}': {}", host, e)))?;
        Ok(Self { pattern })
    }

    pub fn resolve(&self, input: &str) -> Result<RepositoryReference> {
        let input = input.trim();
        let caps = self
            .pattern
            .captures(input)
            .ok_or_else(|| SkillError::invalid_reference(input))?;

        // The name capture stops at the first `/`, so trailing slashes never reach it
        let owner = &caps[1];
        let name = &caps[2];
        let name = name.strip_suffix(".git").unwrap_or(name);

        RepositoryReference::new(owner, name).ok_or_else(|| SkillError::invalid_reference(input))
    }
}

/// Resolve against the default host
pub fn resolve(input: &str) -> Result<RepositoryReference> {
    ReferenceResolver::for_host(constants::source::HOST)?.resolve(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(input: &str) -> (String, String) {
        let reference = resolve(input).unwrap();
        (reference.owner().to_string(), reference.name().to_string())
    }

    #[test]
    fn test_plain_url() {
        assert_eq!(
            pair("https://github.com/acme/widget"),
            ("acme".into(), "widget".into())
        );
    }

    #[test]
    fn test_strips_git_suffix_and_trailing_slash() {
        assert_eq!(
            pair("https://github.com/acme/widget.git"),
            ("acme".into(), "widget".into())
        );
        assert_eq!(
            pair("https://github.com/acme/widget/"),
            ("acme".into(), "widget".into())
        );
        assert_eq!(
            pair("https://github.com/ggml-org/llama.cpp/"),
            ("ggml-org".into(), "llama.cpp".into())
        );
    }

    #[test]
    fn test_ignores_further_segments() {
        assert_eq!(
            pair("https://github.com/acme/widget/tree/main/src"),
            ("acme".into(), "widget".into())
        );
        assert_eq!(
            pair("github.com/acme/widget?tab=readme"),
            ("acme".into(), "widget".into())
        );
    }

    #[test]
    fn test_rejects_missing_pattern() {
        for input in [
            "",
            "widget",
            "https://gitlab.com/acme/widget",
            "https://github.com/acme",
            "https://github.com/acme/",
            "https://github.com/acme/.git",
        ] {
            assert!(
                matches!(resolve(input), Err(SkillError::InvalidReference { .. })),
                "expected InvalidReference for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_custom_host() {
        let resolver = ReferenceResolver::for_host("git.example.com").unwrap();
        let reference = resolver.resolve("https://git.example.com/team/tool").unwrap();
        assert_eq!(reference.to_string(), "team/tool");
        assert!(resolver.resolve("https://github.com/team/tool").is_err());
    }

    proptest! {
        #[test]
        fn prop_resolves_owner_and_name(
            owner in "[A-Za-z0-9][A-Za-z0-9-]{0,15}",
            name in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,15}",
            git in any::<bool>(),
            slash in any::<bool>(),
            rest in proptest::option::of("[a-z]{1,8}"),
        ) {
            prop_assume!(!name.ends_with(".git") && !name.ends_with('.'));
            let mut url = format!("https://github.com/{}/{}", owner, name);
            if git {
                url.push_str(".git");
            }
            if slash {
                url.push('/');
            }
            if let Some(rest) = rest {
                if !slash {
                    url.push('/');
                }
                url.push_str(&rest);
            }

            let reference = resolve(&url).unwrap();
            prop_assert_eq!(reference.owner(), owner.as_str());
            prop_assert_eq!(reference.name(), name.as_str());
        }
    }
}
