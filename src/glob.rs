//! Glob matching for digest patterns.
//!
//! Grammar, applied to root-relative `/`-separated paths:
//!
//! - `*`, `?` and `[...]` match within one path segment; `**` matches zero
//!   or more whole segments.
//! - A trailing `/` makes a directory pattern. It matches the directory
//!   itself and everything nested under it, at any depth.
//! - A bare `/` matches entries whose parent is the traversal root.
//! - A file pattern without any `/` is a name pattern and matches the last
//!   path component at any depth (`*.py` matches `tests/unit.py`).
//! - Every other pattern is matched against the whole path. A leading `/`
//!   anchors explicitly and is otherwise ignored.
//!
//! Matching is case-sensitive. A pattern that fails to compile never
//! matches anything.

use std::path::MAIN_SEPARATOR;

use globset::{GlobBuilder, GlobMatcher};

/// Characters that make a pattern (or a segment) a glob.
pub(crate) const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Replace the platform separator with `/`.
pub fn normalize(pattern: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        pattern.to_string()
    } else {
        pattern.replace(MAIN_SEPARATOR, "/")
    }
}

/// Whether `s` contains any glob metacharacter.
pub(crate) fn has_glob_chars(s: &str) -> bool {
    s.contains(&GLOB_CHARS[..])
}

/// Does `path` match `pattern`?
///
/// Convenience form that compiles the pattern on every call. Rule sets
/// compile once through [`Pattern`](crate::Pattern) instead.
pub fn matches(path: &str, pattern: &str) -> bool {
    match CompiledGlob::compile(&normalize(pattern)) {
        Ok(glob) => glob.is_match(&normalize(path)),
        Err(_) => false,
    }
}

/// Compiled form of one normalized pattern string.
#[derive(Debug, Clone)]
pub(crate) enum CompiledGlob {
    /// Bare `/`.
    RootChildren,

    /// Any of the globs matching means the pattern matches.
    Globs(Vec<GlobMatcher>),

    /// Matches every path. Used for rules synthesized from a path that
    /// is already known to match.
    Always,

    /// Failed to compile, or empty.
    Never,
}

impl CompiledGlob {
    pub(crate) fn compile(normalized: &str) -> Result<Self, globset::Error> {
        if normalized.is_empty() {
            return Ok(Self::Never);
        }
        if normalized == "/" {
            return Ok(Self::RootChildren);
        }

        let anchored = normalized.starts_with('/');
        let body = normalized.strip_prefix('/').unwrap_or(normalized);

        let sources = match body.strip_suffix('/') {
            Some(base) => {
                // `foo/**/` already reaches everything below `foo/`, so one
                // extra level is enough for the contents.
                let contents = if base == "**" || base.ends_with("/**") {
                    format!("{base}/*")
                } else {
                    format!("{base}/**")
                };
                vec![base.to_string(), contents]
            }
            None if !anchored && !body.contains('/') && body != "**" => {
                vec![format!("**/{body}")]
            }
            None => vec![body.to_string()],
        };

        let mut matchers = Vec::with_capacity(sources.len());
        for source in sources {
            let glob = GlobBuilder::new(&source)
                .literal_separator(true)
                .backslash_escape(true)
                .build()?;
            matchers.push(glob.compile_matcher());
        }
        Ok(Self::Globs(matchers))
    }

    /// `path` is root-relative and `/`-separated; a trailing `/` is ignored.
    pub(crate) fn is_match(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return false;
        }
        match self {
            Self::RootChildren => !path.contains('/'),
            Self::Globs(matchers) => matchers.iter().any(|m| m.is_match(path)),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Glob over a single segment or a `/`-joined run of segments.
///
/// Wildcard-free input is kept as a literal and compared directly.
#[derive(Debug, Clone)]
pub(crate) enum PathGlob {
    Literal(String),
    Glob(GlobMatcher),
    Invalid,
}

impl PathGlob {
    pub(crate) fn new(source: &str) -> Self {
        if !has_glob_chars(source) {
            return Self::Literal(source.to_string());
        }
        match GlobBuilder::new(source)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
        {
            Ok(glob) => Self::Glob(glob.compile_matcher()),
            Err(_) => Self::Invalid,
        }
    }

    pub(crate) fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == candidate,
            Self::Glob(glob) => glob.is_match(candidate),
            Self::Invalid => false,
        }
    }
}
