use serde::Serialize;

/// Argument tokens that introduce include patterns.
pub const INCLUDE_FLAGS: [&str; 2] = ["-i", "--include"];

/// Argument tokens that introduce exclude patterns.
pub const EXCLUDE_FLAGS: [&str; 2] = ["-x", "--exclude"];

/// Precedence regime for a whole run.
///
/// Chosen once from which pattern kinds are present and, when both are,
/// which kind of flag the user typed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalMode {
    /// No user include or exclude patterns.
    IncludeAllDefault,

    /// Only include patterns.
    OnlyInclude,

    /// Only exclude patterns.
    OnlyExclude,

    /// Both, and the first include flag precedes the first exclude flag.
    IncludeFirst,

    /// Both, and the first exclude flag comes first, or the order cannot be
    /// told from the arguments (patterns from persisted configuration).
    ExcludeFirst,
}

impl OperationalMode {
    /// Select the mode for a run.
    ///
    /// `argv` is the raw argument stream; `includes` and `user_excludes`
    /// are the fully resolved pattern lists, wherever they came from.
    pub fn select<A, I, E>(argv: &[A], includes: &[I], user_excludes: &[E]) -> Self
    where
        A: AsRef<str>,
        I: AsRef<str>,
        E: AsRef<str>,
    {
        let mode = match (!includes.is_empty(), !user_excludes.is_empty()) {
            (false, false) => Self::IncludeAllDefault,
            (true, false) => Self::OnlyInclude,
            (false, true) => Self::OnlyExclude,
            (true, true) => {
                let first_include = first_flag(argv, &INCLUDE_FLAGS);
                let first_exclude = first_flag(argv, &EXCLUDE_FLAGS);
                // An absent flag sorts after every present one.
                match (first_include, first_exclude) {
                    (Some(i), Some(x)) if i < x => Self::IncludeFirst,
                    (Some(_), None) => Self::IncludeFirst,
                    _ => Self::ExcludeFirst,
                }
            }
        };
        tracing::info!(mode = mode.name(), "operational mode selected");
        mode
    }

    /// Whether paths matching no pattern at all are excluded.
    pub fn excludes_unmatched(self) -> bool {
        match self {
            Self::OnlyInclude | Self::IncludeFirst => true,
            Self::IncludeAllDefault | Self::OnlyExclude | Self::ExcludeFirst => false,
        }
    }

    /// Whether the run has user include patterns.
    pub fn has_includes(self) -> bool {
        match self {
            Self::OnlyInclude | Self::IncludeFirst | Self::ExcludeFirst => true,
            Self::IncludeAllDefault | Self::OnlyExclude => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::IncludeAllDefault => "INCLUDE_ALL_DEFAULT",
            Self::OnlyInclude => "ONLY_INCLUDE",
            Self::OnlyExclude => "ONLY_EXCLUDE",
            Self::IncludeFirst => "INCLUDE_FIRST",
            Self::ExcludeFirst => "EXCLUDE_FIRST",
        }
    }
}

/// Index of the first token naming one of `flags`, in the separate
/// (`--include foo`, `-i foo`) or attached (`--include=foo`, `-ifoo`) form.
fn first_flag<A: AsRef<str>>(argv: &[A], flags: &[&str]) -> Option<usize> {
    argv.iter().position(|token| {
        let token = token.as_ref();
        flags.iter().any(|flag| match token.strip_prefix(flag) {
            Some("") => true,
            Some(rest) if flag.starts_with("--") => rest.starts_with('='),
            Some(_) => true,
            None => false,
        })
    })
}
