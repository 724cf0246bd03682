use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::defaults::DEFAULT_IGNORE_PATTERNS;
use crate::entry::Entry;
use crate::glob::PathGlob;
use crate::mode::OperationalMode;
use crate::pattern::{Pattern, PatternRole};
use crate::results::DigestItem;
use crate::specificity::{compare, matching_depth, resolve};
use crate::state::{kilobytes, FinalStatus, ItemType, LogEvent, PathState};
use crate::traits::ContentReader;

/// Default file size cap, in KB.
pub const DEFAULT_MAX_SIZE_KB: u64 = 300;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Non-pattern checks applied on top of the pattern outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Directories at this depth or deeper are excluded and not descended
    /// into. Top-level entries are at depth 0.
    pub max_depth: Option<usize>,

    /// Files larger than this many KB are excluded.
    pub max_size_kb: u64,

    /// When `false`, every symlink is excluded.
    pub follow_symlinks: bool,

    /// Keep files whose content cannot be read, without content.
    pub ignore_read_errors: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            follow_symlinks: false,
            ignore_read_errors: false,
        }
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Outcome of classifying one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub event: LogEvent,

    /// Whether a walker should descend into the entry. Only ever `true`
    /// for folders.
    pub traverse: bool,
}

/// Every input that decides how entries are classified, compiled once per
/// run.
///
/// A `RuleSet` is immutable after construction and can be shared freely
/// between threads.
///
/// # Example
///
/// ```rust
/// use dirsift::{Entry, OperationalMode, PathState, RuleSet};
///
/// let rules = RuleSet::new(OperationalMode::OnlyExclude, Vec::<String>::new(), ["*.log"]);
///
/// let event = rules.classify(&Entry::file("app.log", 1229)).event;
/// assert_eq!(event.state, PathState::FinalExcluded);
/// assert_eq!(event.decided_by, PathState::UserExcludedDirectly);
/// assert_eq!(event.exclude_pattern.as_deref(), Some("*.log"));
/// ```
#[derive(Debug, Clone)]
pub struct RuleSet {
    mode: OperationalMode,
    includes: Vec<Pattern>,
    user_excludes: Vec<Pattern>,
    defaults: Vec<Pattern>,
    use_defaults: bool,
    limits: Limits,
}

impl RuleSet {
    /// Compile `includes` and `user_excludes`, with the built-in default
    /// ignore rules enabled and default [`Limits`].
    pub fn new<I, E>(mode: OperationalMode, includes: I, user_excludes: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let includes = Pattern::list(includes, PatternRole::Include);
        let user_excludes = Pattern::list(user_excludes, PatternRole::UserExclude);
        let defaults = Pattern::list(DEFAULT_IGNORE_PATTERNS.iter().copied(), PatternRole::DefaultExclude);
        debug!(
            mode = mode.name(),
            includes = includes.len(),
            excludes = user_excludes.len(),
            "rule set compiled"
        );
        Self {
            mode,
            includes,
            user_excludes,
            defaults,
            use_defaults: true,
            limits: Limits::default(),
        }
    }

    /// Enable or disable the built-in default ignore rules, including the
    /// implicit rule for hidden paths.
    pub fn default_ignores(mut self, enabled: bool) -> Self {
        self.use_defaults = enabled;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Add a user exclude after the configured ones.
    ///
    /// Used for paths the run must never pick up, such as its own output
    /// file. The mode is not re-evaluated.
    pub fn also_exclude(mut self, pattern: impl Into<String>) -> Self {
        let index = self.user_excludes.len();
        self.user_excludes.push(Pattern::new(pattern, index, PatternRole::UserExclude));
        self
    }

    pub fn mode(&self) -> OperationalMode {
        self.mode
    }

    pub fn includes(&self) -> &[Pattern] {
        &self.includes
    }

    pub fn user_excludes(&self) -> &[Pattern] {
        &self.user_excludes
    }

    /// Default ignore rules in effect; empty when disabled.
    pub fn default_excludes(&self) -> &[Pattern] {
        if self.use_defaults {
            &self.defaults
        } else {
            &[]
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ── Classification ───────────────────────────────────────────────────

    /// Classify `entry`. Pure: the same entry always yields the same
    /// classification.
    pub fn classify(&self, entry: &Entry) -> Classification {
        let path = entry.typed_path();
        let hidden = self.hidden_rule(entry);
        let defaults = || self.default_excludes().iter().chain(hidden.as_ref());

        let msi = resolve(&path, &self.includes);
        let mse = resolve(&path, self.user_excludes.iter().chain(defaults()));
        let default_rule = resolve(&path, defaults());

        let (decided_by, mut reason) = self.decide(&path, msi, mse);
        let mut state = match decided_by {
            PathState::ErrorConflictingPatterns => decided_by,
            s if s.is_inclusion() => PathState::FinalIncluded,
            _ => PathState::FinalExcluded,
        };

        let max_depth = self.limits.max_depth.filter(|max| entry.is_dir() && entry.depth >= *max);
        if let Some(max) = max_depth {
            state = PathState::FinalExcluded;
            reason = format!("Exceeds max depth ({} >= {max})", entry.depth);
        } else if entry.is_symlink && !self.limits.follow_symlinks {
            state = PathState::FinalExcluded;
            reason = "Is a symlink (symlink following disabled)".to_string();
        } else if state == PathState::FinalExcluded && entry.is_dir() && self.reaches_below(entry, mse) {
            state = PathState::TraverseButExcludeSelf;
            reason = format!("{reason}; contents may still match include patterns");
        } else if state == PathState::FinalIncluded
            && !entry.is_dir()
            && entry.size > self.limits.max_size_kb.saturating_mul(1024)
        {
            state = PathState::FinalExcluded;
            reason = format!(
                "Exceeds max size ({:.1}KB > {}KB)",
                entry.size as f64 / 1024.0,
                self.limits.max_size_kb
            );
        }

        let traverse = entry.is_dir()
            && matches!(state, PathState::FinalIncluded | PathState::TraverseButExcludeSelf);

        trace!(path = %entry.path, %state, %decided_by, traverse, "classified");

        Classification {
            event: LogEvent {
                path: entry.path.clone(),
                item_type: entry.kind,
                status: FinalStatus::of(state),
                state,
                decided_by,
                reason,
                include_pattern: msi.map(|p| p.as_str().to_string()),
                exclude_pattern: mse.map(|p| p.as_str().to_string()),
                default_rule: default_rule.map(|p| p.as_str().to_string()),
                size_kb: kilobytes(entry.size),
            },
            traverse,
        }
    }

    /// Attach content to a classified file.
    ///
    /// Anything but an included file passes through untouched. `source` is
    /// where the file actually lives on disk.
    pub fn settle(&self, event: LogEvent, source: &Path, reader: &dyn ContentReader) -> DigestItem {
        if entry_is_readable(&event) {
            return self.read_into(event, source, reader);
        }
        DigestItem::bare(event)
    }

    fn read_into(&self, mut event: LogEvent, source: &Path, reader: &dyn ContentReader) -> DigestItem {
        match reader.read(source) {
            Ok(content) => DigestItem { event, content: Some(content), read_error: None },
            Err(err) => {
                let message = err.to_string();
                warn!(path = %event.path, error = %message, "could not read file content");
                if !self.limits.ignore_read_errors {
                    event.state = PathState::FinalExcluded;
                    event.status = FinalStatus::Excluded;
                    event.reason = message.clone();
                }
                DigestItem { event, content: None, read_error: Some(message) }
            }
        }
    }

    // ── Pattern phase ────────────────────────────────────────────────────

    fn decide(&self, path: &str, msi: Option<&Pattern>, mse: Option<&Pattern>) -> (PathState, String) {
        match (msi, mse) {
            (None, None) if self.mode.excludes_unmatched() => (
                PathState::ImplicitlyExcludedFinalStep,
                "Does not match any include pattern".to_string(),
            ),
            (None, None) => (PathState::FinalIncluded, "Included by default".to_string()),
            (None, Some(exc)) => excluded(exc, None),
            (Some(inc), None) => included(inc),
            (Some(inc), Some(exc)) => match compare(path, exc.properties(), inc.properties()) {
                Ordering::Equal if conflicting(inc, exc) => (
                    PathState::ErrorConflictingPatterns,
                    format!("Pattern '{}' is both included and excluded", inc.as_str()),
                ),
                Ordering::Greater => excluded(exc, Some(inc)),
                // A user exclude that matched but lost to a default keeps
                // the default from being reported as overridden.
                _ if exc.role() == PatternRole::DefaultExclude
                    && !self.user_excludes.iter().any(|p| p.matches(path)) =>
                {
                    (
                        PathState::OverriddenDefaultExcludeByUserInclude,
                        format!(
                            "Include pattern '{}' overrides default ignore '{}'",
                            inc.as_str(),
                            exc.as_str()
                        ),
                    )
                }
                _ => included(inc),
            },
        }
    }

    /// The implicit default rule for the first hidden segment of `entry`.
    fn hidden_rule(&self, entry: &Entry) -> Option<Pattern> {
        if !self.use_defaults {
            return None;
        }
        let (position, segment) = entry
            .path
            .split('/')
            .enumerate()
            .find(|(_, s)| s.starts_with('.'))?;
        let names_file = position == entry.depth && !entry.is_dir();
        Some(Pattern::hidden(segment, names_file, self.defaults.len()))
    }

    /// Can some include pattern still win for a path below `dir`?
    fn reaches_below(&self, dir: &Entry, mse: Option<&Pattern>) -> bool {
        let parts: Vec<&str> = dir.path.split('/').collect();
        // Paths below `dir` score at least this for the exclusion, so an
        // include with a shallower directory portion loses everywhere.
        let floor = mse.map_or(0, |exc| matching_depth(&parts, exc.properties()));
        self.includes.iter().any(|inc| {
            let props = inc.properties();
            let reach = props.dir_portion.as_ref().map_or(0, |(_, depth)| *depth);
            reach >= floor && (props.is_name_pattern() || continues_below(&props.segments, &parts))
        })
    }
}

fn entry_is_readable(event: &LogEvent) -> bool {
    event.item_type == ItemType::File && event.state == PathState::FinalIncluded
}

fn included(inc: &Pattern) -> (PathState, String) {
    (
        PathState::MatchedByUserInclude,
        format!("Matches include pattern '{}'", inc.as_str()),
    )
}

fn excluded(exc: &Pattern, lost: Option<&Pattern>) -> (PathState, String) {
    match (exc.role(), lost) {
        (PatternRole::DefaultExclude, _) => (
            PathState::DefaultExcluded,
            format!("Matches default ignore pattern '{}'", exc.as_str()),
        ),
        (_, Some(inc)) => (
            PathState::UserExcludedBySpecificity,
            format!(
                "Exclude pattern '{}' is more specific than include pattern '{}'",
                exc.as_str(),
                inc.as_str()
            ),
        ),
        (_, None) => (
            PathState::UserExcludedDirectly,
            format!("Matches exclude pattern '{}'", exc.as_str()),
        ),
    }
}

/// The same user pattern given as both include and exclude.
fn conflicting(inc: &Pattern, exc: &Pattern) -> bool {
    exc.role().is_user() && inc.index() == exc.index() && inc.as_str() == exc.as_str()
}

/// Whether an anchored pattern fits the directory `parts` and still has
/// segments left for something inside it.
fn continues_below(segments: &[Option<PathGlob>], parts: &[&str]) -> bool {
    for (i, part) in parts.iter().enumerate() {
        match segments.get(i) {
            None => return false,
            Some(None) => return true,
            Some(Some(segment)) if segment.is_match(part) => {}
            Some(Some(_)) => return false,
        }
    }
    segments.len() > parts.len()
}
