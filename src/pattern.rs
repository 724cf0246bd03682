use serde::Serialize;

use crate::glob::{self, CompiledGlob, PathGlob};

/// Where a pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternRole {
    /// User-supplied include pattern.
    Include,

    /// User-supplied exclude pattern.
    UserExclude,

    /// Built-in default ignore rule.
    DefaultExclude,
}

impl PatternRole {
    /// Whether the pattern was supplied by the user rather than built in.
    pub fn is_user(self) -> bool {
        !matches!(self, Self::DefaultExclude)
    }
}

/// Structural properties of a pattern, used to rank competing patterns.
///
/// Exactly one of the four type flags is set, except for the degenerate
/// bare `/` pattern which has none.
#[derive(Debug, Clone)]
pub struct PatternProperties {
    /// Pattern with platform separators replaced by `/`.
    pub normalized: String,

    /// Number of segments, not counting empty segments or `**`.
    pub depth: usize,

    pub is_explicit_file: bool,
    pub is_glob_file: bool,
    pub is_explicit_dir: bool,
    pub is_glob_dir: bool,

    /// Filename suffix chain, last suffix first: `*.tar.gz` → `["gz", "tar"]`.
    /// Empty for directory patterns and suffix-less names.
    pub suffix_parts: Vec<String>,

    /// Directory portion of the pattern and its concrete segment count.
    /// `None` when the portion is empty or made only of `**`.
    pub(crate) dir_portion: Option<(PathGlob, usize)>,

    /// Every segment of the anchored pattern body; `None` stands for `**`.
    pub(crate) segments: Vec<Option<PathGlob>>,
}

impl PatternProperties {
    /// Parse `pattern` into its properties.
    pub fn parse(pattern: &str) -> Self {
        let normalized = glob::normalize(pattern);
        let is_dir = normalized.ends_with('/');
        let trimmed = normalized.strip_suffix('/').unwrap_or(&normalized);

        let depth = trimmed
            .split('/')
            .filter(|s| !s.is_empty() && *s != "**")
            .count();

        let concrete = !trimmed.is_empty();
        let globbed = glob::has_glob_chars(trimmed);

        // For a directory pattern the whole base is the directory portion;
        // for a file pattern it is everything before the final `/`.
        let body = trimmed.trim_start_matches('/');
        let mut dir_source = if is_dir {
            body
        } else {
            body.rsplit_once('/').map_or("", |(dir, _)| dir)
        };
        // A trailing `**` may span zero segments: `src/**` reaches `src`.
        while let Some(head) = dir_source.strip_suffix("/**") {
            dir_source = head;
        }
        let dir_depth = dir_source
            .split('/')
            .filter(|s| !s.is_empty() && *s != "**")
            .count();
        let dir_portion = (dir_depth > 0).then(|| (PathGlob::new(dir_source), dir_depth));

        let segments = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| (s != "**").then(|| PathGlob::new(s)))
            .collect();

        let suffix_parts = if is_dir {
            Vec::new()
        } else {
            let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
            suffixes(name).into_iter().rev().map(str::to_string).collect()
        };

        Self {
            is_explicit_file: concrete && !is_dir && !globbed,
            is_glob_file: concrete && !is_dir && globbed,
            is_explicit_dir: concrete && is_dir && !globbed,
            is_glob_dir: concrete && is_dir && globbed,
            normalized,
            depth,
            suffix_parts,
            dir_portion,
            segments,
        }
    }

    pub fn is_dir_pattern(&self) -> bool {
        self.is_explicit_dir || self.is_glob_dir
    }

    pub fn is_file_pattern(&self) -> bool {
        self.is_explicit_file || self.is_glob_file
    }

    /// A file pattern with no `/` at all, matched against the last path
    /// component at any depth.
    pub fn is_name_pattern(&self) -> bool {
        self.is_file_pattern() && !self.normalized.contains('/')
    }
}

/// Suffix chain of a file name, in file order, without dots.
///
/// Leading dots never start a suffix and a name ending in `.` has none,
/// so `.bashrc` and `notes.` both yield nothing.
pub(crate) fn suffixes(name: &str) -> Vec<&str> {
    if name.ends_with('.') {
        return Vec::new();
    }
    name.trim_start_matches('.').split('.').skip(1).collect()
}

/// A parsed, compiled pattern with its provenance.
///
/// Built once per run and never mutated.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    index: usize,
    role: PatternRole,
    props: PatternProperties,
    glob: CompiledGlob,
    valid: bool,
}

impl Pattern {
    /// Parse and compile `raw`. `index` is its position among the patterns
    /// of the same role.
    ///
    /// A malformed glob yields a pattern that matches nothing.
    pub fn new(raw: impl Into<String>, index: usize, role: PatternRole) -> Self {
        let raw = raw.into();
        let props = PatternProperties::parse(&raw);
        let (glob, valid) = match CompiledGlob::compile(&props.normalized) {
            Ok(glob) => (glob, true),
            Err(err) => {
                tracing::warn!(pattern = %raw, error = %err, "pattern does not compile; it will match nothing");
                (CompiledGlob::Never, false)
            }
        };
        Self { raw, index, role, props, glob, valid }
    }

    /// Build one pattern per string, indexed by position.
    pub fn list<I, S>(patterns: I, role: PatternRole) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        patterns
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Self::new(raw, index, role))
            .collect()
    }

    /// The implicit default rule for a hidden path segment.
    ///
    /// `**/<segment>/` when the hidden segment is a directory above the
    /// entry, `**/<segment>` when it is the entry itself.
    pub(crate) fn hidden(segment: &str, is_last: bool, index: usize) -> Self {
        let raw = if is_last {
            format!("**/{segment}")
        } else {
            format!("**/{segment}/")
        };
        let props = PatternProperties::parse(&raw);
        Self {
            raw,
            index,
            role: PatternRole::DefaultExclude,
            props,
            glob: CompiledGlob::Always,
            valid: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn role(&self) -> PatternRole {
        self.role
    }

    pub fn properties(&self) -> &PatternProperties {
        &self.props
    }

    /// Whether the glob compiled.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Does this pattern match the root-relative `path`?
    pub fn matches(&self, path: &str) -> bool {
        self.glob.is_match(path)
    }
}
