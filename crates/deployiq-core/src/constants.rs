//! Fixed tables and limits shared across crates.
//!
//! Tunable heuristics (scoring weights, thresholds) live in `config` instead;
//! the values here describe the outside world and do not change per install.

/// Dependencies that participate in the build fingerprint. Everything else in
/// the dependency map is ignored so unrelated packages bucket together.
pub const KEY_DEPENDENCIES: &[&str] = &[
    "next",
    "react",
    "react-dom",
    "vue",
    "nuxt",
    "svelte",
    "@sveltejs/kit",
    "@angular/core",
    "typescript",
    "webpack",
    "vite",
    "express",
    "prisma",
    "@prisma/client",
    "mongoose",
    "tailwindcss",
];

/// Published versions known to be compromised or broken.
pub const KNOWN_BAD_VERSIONS: &[(&str, &str)] = &[
    ("event-stream", "3.3.6"),
    ("flatmap-stream", "0.1.1"),
    ("ua-parser-js", "0.7.29"),
    ("ua-parser-js", "0.8.0"),
    ("ua-parser-js", "1.0.0"),
    ("coa", "2.0.3"),
    ("rc", "1.2.9"),
    ("node-ipc", "10.1.1"),
    ("node-ipc", "10.1.2"),
    ("colors", "1.4.1"),
    ("faker", "6.6.6"),
];

/// `(package, required peer)` pairs.
pub const PEER_REQUIREMENTS: &[(&str, &str)] = &[
    ("react-dom", "react"),
    ("next", "react"),
    ("next", "react-dom"),
    ("@prisma/client", "prisma"),
    ("@testing-library/react", "react"),
    ("@sveltejs/kit", "svelte"),
    ("nuxt", "vue"),
];

/// Directories never descended into by the source scan.
pub const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    "out",
    "target",
    "coverage",
    ".next",
    ".nuxt",
    ".git",
];

/// Source file extensions considered by the code-quality scan.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte"];

/// Extensions that mark a project as statically typed.
pub const TYPED_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// Lockfiles, any of which counts as pinned dependencies.
pub const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
];

/// Env files whose keys are counted for the fingerprint.
pub const ENV_FILES: &[&str] = &[".env", ".env.local", ".env.production", ".env.example"];

pub const MANIFEST_FILE: &str = "package.json";
pub const TYPE_CONFIG_FILE: &str = "tsconfig.json";
pub const DEPLOY_CONFIG_FILE: &str = "vercel.json";
pub const RUNTIME_VERSION_FILE: &str = ".nvmrc";
pub const PUBLIC_ASSET_DIR: &str = "public";

/// Upper bound on raw causes kept on one known solution.
pub const MAX_RECORDED_CAUSES: usize = 20;

/// Confidence ceiling for any known solution or resolution.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Confidence assigned to an auto-discovered known solution.
pub const DISCOVERED_SOLUTION_CONFIDENCE: f64 = 0.1;

/// Success-rate floor returned by prediction.
pub const MIN_PREDICTED_RATE: f64 = 0.1;

/// Success rate assumed for a configuration with no history.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// Penalty per distinct risk factor.
pub const RISK_PENALTY: f64 = 0.1;
