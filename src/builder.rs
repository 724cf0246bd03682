use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{check_root, run, EngineOptions, Walk};
use crate::entry::slash_path;
use crate::error::DigestError;
use crate::mode::OperationalMode;
use crate::results::Results;
use crate::ruleset::{Limits, RuleSet, DEFAULT_MAX_SIZE_KB};
use crate::traits::{ContentReader, Utf8Reader};

// ---------------------------------------------------------------------------
// DigestConfig
// ---------------------------------------------------------------------------

/// Resolved settings as a configuration layer hands them over.
///
/// Every field is optional in serialized form and falls back to the same
/// default the builder uses.
///
/// ```rust
/// let config: dirsift::DigestConfig = Default::default();
/// assert_eq!(config.max_size_kb, 300);
/// assert!(config.include.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub include:            Vec<String>,
    pub exclude:            Vec<String>,
    pub no_default_ignore:  bool,
    pub max_depth:          Option<usize>,
    pub max_size_kb:        u64,
    pub follow_symlinks:    bool,
    pub ignore_read_errors: bool,
    pub dir_sizes:          bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            include:            Vec::new(),
            exclude:            Vec::new(),
            no_default_ignore:  false,
            max_depth:          None,
            max_size_kb:        DEFAULT_MAX_SIZE_KB,
            follow_symlinks:    false,
            ignore_read_errors: false,
            dir_sizes:          false,
        }
    }
}

// ---------------------------------------------------------------------------
// DigestBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a digest.
///
/// Created via [`dirsift::digest()`](crate::digest). Configure with chained
/// builder methods, then call [`walk()`](DigestBuilder::walk) for a lazy
/// sequential iterator or [`run()`](DigestBuilder::run) for a parallel
/// walk collected into [`Results`].
///
/// # Example
///
/// ```rust,no_run
/// let results = dirsift::digest("./my-project")
///     .include("*.rs")
///     .exclude("tests/")
///     .max_size_kb(100)
///     .run()?;
///
/// for item in results.included() {
///     println!("{}", item.event.path);
/// }
/// # Ok::<(), dirsift::DigestError>(())
/// ```
pub struct DigestBuilder {
    root:            PathBuf,
    includes:        Vec<String>,
    excludes:        Vec<String>,
    argv:            Vec<String>,
    default_ignores: bool,
    limits:          Limits,
    threads:         usize,
    output_file:     Option<PathBuf>,
    dir_sizes:       bool,
    reader:          Arc<dyn ContentReader>,
}

impl DigestBuilder {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            includes:        Vec::new(),
            excludes:        Vec::new(),
            argv:            Vec::new(),
            default_ignores: true,
            limits:          Limits::default(),
            threads:         num_cpus(),
            output_file:     None,
            dir_sizes:       false,
            reader:          Arc::new(Utf8Reader),
        }
    }

    // ── Patterns ──────────────────────────────────────────────────────────

    /// Add an include pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    /// Add several include patterns, in order.
    pub fn includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Add several exclude patterns, in order.
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// The raw argument stream the patterns came from.
    ///
    /// Only used to tell which of `--include` and `--exclude` was typed
    /// first when both kinds are present. Without it, or when neither flag
    /// appears, the run is [`OperationalMode::ExcludeFirst`].
    pub fn argv<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv = argv.into_iter().map(Into::into).collect();
        self
    }

    /// Disable the built-in ignore rules, hidden paths included.
    pub fn no_default_ignore(mut self, yes: bool) -> Self {
        self.default_ignores = !yes;
        self
    }

    // ── Limits ────────────────────────────────────────────────────────────

    /// Directories at depth `d` or deeper are excluded and never entered.
    /// Top-level entries are at depth 0. Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.limits.max_depth = Some(d);
        self
    }

    /// Exclude files larger than `kb` kilobytes. Defaults to 300.
    pub fn max_size_kb(mut self, kb: u64) -> Self {
        self.limits.max_size_kb = kb;
        self
    }

    /// Follow symbolic links instead of excluding them.
    pub fn follow_symlinks(mut self, yes: bool) -> Self {
        self.limits.follow_symlinks = yes;
        self
    }

    /// Keep files whose content cannot be read. They stay included with no
    /// content and the error recorded on the item.
    pub fn ignore_read_errors(mut self, yes: bool) -> Self {
        self.limits.ignore_read_errors = yes;
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of threads for [`run()`](DigestBuilder::run).
    ///
    /// Defaults to the number of logical CPU cores.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Where the rendered digest will be written. If that is inside the
    /// root, the file is excluded from the digest itself.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Report the recursive size of each folder in its event.
    pub fn dir_sizes(mut self, yes: bool) -> Self {
        self.dir_sizes = yes;
        self
    }

    /// Read included files with `reader` instead of strict UTF-8.
    pub fn reader(mut self, reader: impl ContentReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    /// Apply settings from a configuration layer.
    ///
    /// Patterns are appended to those already given. Since they have no
    /// position in the argument stream, a run mixing configured includes
    /// and excludes is [`OperationalMode::ExcludeFirst`].
    pub fn config(mut self, config: DigestConfig) -> Self {
        self.includes.extend(config.include);
        self.excludes.extend(config.exclude);
        self.default_ignores = !config.no_default_ignore;
        self.limits = Limits {
            max_depth:          config.max_depth,
            max_size_kb:        config.max_size_kb,
            follow_symlinks:    config.follow_symlinks,
            ignore_read_errors: config.ignore_read_errors,
        };
        self.dir_sizes = config.dir_sizes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Compile the rule set this builder describes.
    pub fn rules(&self) -> RuleSet {
        let mode = OperationalMode::select(&self.argv, &self.includes, &self.excludes);
        let mut rules = RuleSet::new(mode, self.includes.iter().cloned(), self.excludes.iter().cloned())
            .default_ignores(self.default_ignores)
            .with_limits(self.limits);

        if let Some(pattern) = self
            .output_file
            .as_deref()
            .and_then(|output| root_relative(&self.root, output))
        {
            debug!(pattern = %pattern, "excluding output file");
            rules = rules.also_exclude(pattern);
        }
        rules
    }

    /// Start a lazy, sequential walk.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the root does not exist or is not a directory.
    /// Errors below the root are yielded by the iterator instead.
    pub fn walk(self) -> Result<Walk, DigestError> {
        check_root(&self.root)?;
        let opts = self.engine_options();
        Ok(Walk::new(self.root, opts))
    }

    /// Classify the whole tree in parallel and collect the outcome.
    ///
    /// Blocks until the walk completes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the root does not exist or is not a directory.
    /// Errors below the root are collected into [`Results::errors`].
    pub fn run(self) -> Result<Results, DigestError> {
        check_root(&self.root)?;
        let opts = self.engine_options();
        Ok(run(&self.root, opts))
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            rules:     Arc::new(self.rules()),
            reader:    Arc::clone(&self.reader),
            threads:   self.threads,
            dir_sizes: self.dir_sizes,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Root-anchored pattern for `output` if it lies inside `root`.
///
/// The output file may not exist yet, so only its parent is resolved.
fn root_relative(root: &Path, output: &Path) -> Option<String> {
    let root = root.canonicalize().ok()?;
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.canonicalize().ok()?,
        _ => std::env::current_dir().ok()?.canonicalize().ok()?,
    };
    let relative = parent.join(name).strip_prefix(&root).ok()?.to_path_buf();
    Some(format!("/{}", slash_path(&relative)))
}

/// Get the logical CPU count, with a safe fallback.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
