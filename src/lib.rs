//! # dirsift
//!
//! Decide, for every entry of a directory tree, whether it belongs in a
//! content digest, and record why.
//!
//! dirsift owns pattern matching, specificity ranking, the per-path
//! decision state machine and the walk. It does **not** render digests,
//! parse command lines or load configuration files: callers hand over
//! resolved inputs and consume classified entries.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::create_dir(dir.path().join("src")).unwrap();
//! fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
//! fs::write(dir.path().join("build.log"), "noise").unwrap();
//!
//! let results = dirsift::digest(dir.path())
//!     .include("*.rs")
//!     .run()
//!     .unwrap();
//!
//! let included: Vec<&str> = results.included().map(|i| i.event.path.as_str()).collect();
//! assert_eq!(included, ["src/main.rs"]);
//! assert_eq!(results.get("src/main.rs").unwrap().content.as_deref(), Some("fn main() {}"));
//! ```
//!
//! # Lazy walks
//!
//! [`DigestBuilder::walk`] classifies entries one at a time as the caller
//! pulls them:
//!
//! ```rust
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("notes.md"), "hi").unwrap();
//!
//! let mut walk = dirsift::digest(dir.path()).walk().unwrap();
//! let first = walk.next().unwrap().unwrap();
//! assert_eq!(first.event.path, "notes.md");
//! assert!(first.event.is_included());
//! assert_eq!(walk.stats().included_files, 1);
//! ```
//!
//! # Classification without a walk
//!
//! A [`RuleSet`] classifies [`Entry`] values from any source:
//!
//! ```rust
//! use dirsift::{Entry, OperationalMode, PathState, RuleSet};
//!
//! let rules = RuleSet::new(OperationalMode::IncludeAllDefault, Vec::<String>::new(), Vec::<String>::new());
//! let event = rules.classify(&Entry::file(".git/config", 120)).event;
//! assert_eq!(event.decided_by, PathState::DefaultExcluded);
//! ```

#![forbid(unsafe_code)]

pub mod glob;
pub mod specificity;

mod builder;
mod defaults;
mod engine;
mod entry;
mod error;
mod mode;
mod pattern;
mod results;
mod ruleset;
mod state;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{DigestBuilder, DigestConfig};
pub use defaults::DEFAULT_IGNORE_PATTERNS;
pub use engine::Walk;
pub use entry::Entry;
pub use error::DigestError;
pub use mode::{OperationalMode, EXCLUDE_FLAGS, INCLUDE_FLAGS};
pub use pattern::{Pattern, PatternProperties, PatternRole};
pub use results::{DigestItem, Results, TraversalStats};
pub use ruleset::{Classification, Limits, RuleSet, DEFAULT_MAX_SIZE_KB};
pub use state::{FinalStatus, ItemType, LogEvent, PathState};
pub use traits::{ContentReader, Utf8Reader};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`DigestBuilder`] for the tree under `root`.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("app.log"), "x").unwrap();
/// std::fs::write(dir.path().join("lib.rs"), "x").unwrap();
///
/// let results = dirsift::digest(dir.path()).exclude("*.log").run().unwrap();
///
/// assert_eq!(results.stats.included_files, 1);
/// assert_eq!(results.stats.excluded_items, 1);
/// ```
pub fn digest(root: impl Into<std::path::PathBuf>) -> DigestBuilder {
    DigestBuilder::new(root.into())
}
