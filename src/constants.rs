//! Global Constants
//!
//! Built-in defaults for configuration and tuning. Every value here can be
//! overridden through the config layer; nothing in the pipeline reads these
//! directly except `Default` impls.

/// Source host defaults
pub mod source {
    /// REST API base for repository metadata, README and tree
    pub const API_BASE: &str = "https://api.github.com";

    /// Base URL serving raw file content
    pub const RAW_BASE: &str = "https://raw.githubusercontent.com";

    /// Host segment the reference resolver looks for
    pub const HOST: &str = "github.com";

    /// User-Agent sent with every source-host request
    pub const USER_AGENT: &str = "skillforge";

    /// Accept header for the REST API
    pub const API_ACCEPT: &str = "application/vnd.github.v3+json";

    /// Per-call timeout for source-host requests (seconds)
    pub const TIMEOUT_SECS: u64 = 30;

    /// Width of the content-fetch worker pool
    pub const FETCH_CONCURRENCY: usize = 15;
}

/// Candidate filter and ranker defaults
pub mod ranking {
    /// Files larger than this are never selected (bytes)
    pub const MAX_FILE_SIZE: u64 = 80_000;

    /// Number of ranked files fetched per snapshot
    pub const MAX_FILES: usize = 15;

    /// Path segments that exclude an entry outright
    pub const IGNORED_DIRS: &[&str] = &[
        "node_modules",
        ".git",
        "dist",
        "build",
        "out",
        "coverage",
        "public",
        "assets",
        "images",
    ];

    /// Extensions eligible for selection
    pub const ALLOWED_EXTENSIONS: &[&str] = &[
        ".md", ".json", ".ts", ".js", ".py", ".go", ".rs", ".tsx", ".jsx", ".yaml", ".yml",
    ];

    /// Score weights
    pub mod score {
        pub const PACKAGE_MANIFEST: u32 = 100;
        pub const README: u32 = 50;
        pub const DOCS: u32 = 40;
        pub const EXAMPLE: u32 = 30;
        pub const ENTRY_POINT: u32 = 20;
        pub const TYPESCRIPT: u32 = 10;
    }
}

/// Prompt assembly limits
pub mod prompt {
    /// README characters embedded in the generation prompt
    pub const README_MAX_CHARS: usize = 15_000;

    /// Characters embedded per selected file
    pub const FILE_MAX_CHARS: usize = 5_000;
}

/// LLM defaults
pub mod llm {
    pub const PROVIDER: &str = "gemini";

    pub const MODEL: &str = "gemini-flash-lite-latest";

    pub const TEMPERATURE: f32 = 0.2;

    /// Request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 300;

    pub const MAX_TOKENS: usize = 8192;
}

/// Document export
pub mod export {
    /// File name of the generated document
    pub const SKILL_FILE: &str = "SKILL.md";

    /// Prefix of the bundle folder (`use-<slug>`)
    pub const BUNDLE_PREFIX: &str = "use-";
}
