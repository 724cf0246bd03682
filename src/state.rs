use serde::Serialize;

/// Classification state of one entry.
///
/// Every entry starts at `PendingEvaluation`, passes through one
/// pattern-phase state, and ends in one of the terminal states:
/// `FinalIncluded`, `FinalExcluded`, `TraverseButExcludeSelf` or
/// `ErrorConflictingPatterns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathState {
    PendingEvaluation,
    MatchedByUserInclude,
    UserExcludedBySpecificity,
    UserExcludedDirectly,
    DefaultExcluded,
    OverriddenDefaultExcludeByUserInclude,
    ImplicitlyExcludedFinalStep,
    FinalIncluded,
    FinalExcluded,
    /// A directory that is not itself included but whose children are
    /// still visited and classified.
    TraverseButExcludeSelf,
    /// An include and an exclude pattern tie exactly on the same path.
    ErrorConflictingPatterns,
}

impl PathState {
    pub fn is_terminal(self) -> bool {
        match self {
            Self::FinalIncluded
            | Self::FinalExcluded
            | Self::TraverseButExcludeSelf
            | Self::ErrorConflictingPatterns => true,
            Self::PendingEvaluation
            | Self::MatchedByUserInclude
            | Self::UserExcludedBySpecificity
            | Self::UserExcludedDirectly
            | Self::DefaultExcluded
            | Self::OverriddenDefaultExcludeByUserInclude
            | Self::ImplicitlyExcludedFinalStep => false,
        }
    }

    /// Whether a pattern-phase state leads to inclusion.
    pub fn is_inclusion(self) -> bool {
        match self {
            Self::MatchedByUserInclude
            | Self::OverriddenDefaultExcludeByUserInclude
            | Self::FinalIncluded => true,
            Self::PendingEvaluation
            | Self::UserExcludedBySpecificity
            | Self::UserExcludedDirectly
            | Self::DefaultExcluded
            | Self::ImplicitlyExcludedFinalStep
            | Self::FinalExcluded
            | Self::TraverseButExcludeSelf
            | Self::ErrorConflictingPatterns => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PendingEvaluation => "PENDING_EVALUATION",
            Self::MatchedByUserInclude => "MATCHED_BY_USER_INCLUDE",
            Self::UserExcludedBySpecificity => "USER_EXCLUDED_BY_SPECIFICITY",
            Self::UserExcludedDirectly => "USER_EXCLUDED_DIRECTLY",
            Self::DefaultExcluded => "DEFAULT_EXCLUDED",
            Self::OverriddenDefaultExcludeByUserInclude => "OVERRIDDEN_DEFAULT_EXCLUDE_BY_USER_INCLUDE",
            Self::ImplicitlyExcludedFinalStep => "IMPLICITLY_EXCLUDED_FINAL_STEP",
            Self::FinalIncluded => "FINAL_INCLUDED",
            Self::FinalExcluded => "FINAL_EXCLUDED",
            Self::TraverseButExcludeSelf => "TRAVERSE_BUT_EXCLUDE_SELF",
            Self::ErrorConflictingPatterns => "ERROR_CONFLICTING_PATTERNS",
        }
    }
}

impl std::fmt::Display for PathState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome as the output collaborators see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalStatus {
    Included,
    Excluded,
    Error,
}

impl FinalStatus {
    pub(crate) fn of(state: PathState) -> Self {
        match state {
            PathState::FinalIncluded => Self::Included,
            PathState::ErrorConflictingPatterns => Self::Error,
            PathState::PendingEvaluation
            | PathState::MatchedByUserInclude
            | PathState::UserExcludedBySpecificity
            | PathState::UserExcludedDirectly
            | PathState::DefaultExcluded
            | PathState::OverriddenDefaultExcludeByUserInclude
            | PathState::ImplicitlyExcludedFinalStep
            | PathState::FinalExcluded
            | PathState::TraverseButExcludeSelf => Self::Excluded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    File,
    Folder,
}

/// Record of how one entry was classified.
///
/// Created once per entry and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    /// Root-relative, `/`-separated.
    pub path: String,
    pub item_type: ItemType,
    pub status: FinalStatus,
    /// Terminal state.
    pub state: PathState,
    /// Pattern-phase state that led to `state`.
    pub decided_by: PathState,
    pub reason: String,
    /// Most specific matching include pattern.
    pub include_pattern: Option<String>,
    /// Most specific matching exclude pattern, user or default.
    pub exclude_pattern: Option<String>,
    /// Most specific matching default ignore rule.
    pub default_rule: Option<String>,
    pub size_kb: f64,
}

impl LogEvent {
    pub fn is_included(&self) -> bool {
        self.status == FinalStatus::Included
    }
}

/// Bytes to kilobytes, rounded to three decimals.
pub(crate) fn kilobytes(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 1000.0).round() / 1000.0
}
