//! Ranking of patterns that match the same path.
//!
//! [`compare`] orders two patterns by how specifically they describe a
//! path; [`resolve`] reduces a pattern list to the single most specific
//! match.

use std::cmp::Ordering;

use crate::glob::PathGlob;
use crate::pattern::{suffixes, Pattern, PatternProperties};

/// Which of `a` and `b` is more specific for `path`.
///
/// `Greater` means `a` wins, `Less` means `b` wins, `Equal` is a tie left to
/// the caller. A `path` ending in `/` is treated as a directory.
///
/// Rules, first decisive one wins:
///
/// 1. Deeper directory portion. A pattern's directory portion counts its
///    concrete segments (`**` counts nothing) when it matches the path's
///    directory or one of its ancestors, and zero otherwise.
/// 2. Explicit beats glob, among patterns of the path's own type.
/// 3. For files, more suffixes aligned with the file name (`*.tar.gz`
///    beats `*.gz` for `archive.tar.gz`).
/// 4. A pattern of the path's own type beats one of the other type.
pub fn compare(path: &str, a: &PatternProperties, b: &PatternProperties) -> Ordering {
    let is_dir = path.ends_with('/');
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let chain = if is_dir { &parts[..] } else { &parts[..parts.len().saturating_sub(1)] };

    let by_depth = matching_depth(chain, a).cmp(&matching_depth(chain, b));
    if by_depth.is_ne() {
        return by_depth;
    }

    let by_explicitness = if is_dir {
        explicit_over_glob((a.is_explicit_dir, a.is_glob_dir), (b.is_explicit_dir, b.is_glob_dir))
    } else {
        explicit_over_glob((a.is_explicit_file, a.is_glob_file), (b.is_explicit_file, b.is_glob_file))
    };
    if by_explicitness.is_ne() {
        return by_explicitness;
    }

    if !is_dir
        && a.is_file_pattern()
        && b.is_file_pattern()
        && !a.suffix_parts.is_empty()
        && !b.suffix_parts.is_empty()
    {
        let name = parts.last().copied().unwrap_or_default();
        let path_suffixes: Vec<&str> = suffixes(name).into_iter().rev().collect();
        let by_suffix =
            aligned(&a.suffix_parts, &path_suffixes).cmp(&aligned(&b.suffix_parts, &path_suffixes));
        if by_suffix.is_ne() {
            return by_suffix;
        }
    }

    let (a_same, a_other, b_same, b_other) = if is_dir {
        (a.is_dir_pattern(), a.is_file_pattern(), b.is_dir_pattern(), b.is_file_pattern())
    } else {
        (a.is_file_pattern(), a.is_dir_pattern(), b.is_file_pattern(), b.is_dir_pattern())
    };
    if a_same && b_other {
        Ordering::Greater
    } else if b_same && a_other {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// The most specific pattern in `patterns` that matches `path`.
///
/// Ties on [`compare`] go to a user pattern over a default one, then to the
/// pattern specified later (higher original index). `None` iff nothing
/// matches.
pub fn resolve<'a, I>(path: &str, patterns: I) -> Option<&'a Pattern>
where
    I: IntoIterator<Item = &'a Pattern>,
{
    let mut candidates = patterns.into_iter().filter(|p| p.matches(path));
    let mut best = candidates.next()?;
    for challenger in candidates {
        match compare(path, challenger.properties(), best.properties()) {
            Ordering::Greater => best = challenger,
            Ordering::Equal if outranks(challenger, best) => best = challenger,
            _ => {}
        }
    }
    Some(best)
}

/// Final tie-break between equally specific patterns.
pub(crate) fn outranks(a: &Pattern, b: &Pattern) -> bool {
    (a.role().is_user(), a.index()) > (b.role().is_user(), b.index())
}

/// Concrete depth of the directory portion of `props` if it matches one of
/// the directories in `chain`, listed from the root down.
pub(crate) fn matching_depth(chain: &[&str], props: &PatternProperties) -> usize {
    let Some((portion, depth)) = &props.dir_portion else {
        return 0;
    };
    let hit = match portion {
        // A literal can only ever match the prefix of its own length.
        PathGlob::Literal(lit) => chain.len() >= *depth && chain[..*depth].join("/") == *lit,
        PathGlob::Glob(_) | PathGlob::Invalid => {
            (1..=chain.len()).any(|k| portion.is_match(&chain[..k].join("/")))
        }
    };
    if hit {
        *depth
    } else {
        0
    }
}

fn explicit_over_glob(a: (bool, bool), b: (bool, bool)) -> Ordering {
    let (a_explicit, a_glob) = a;
    let (b_explicit, b_glob) = b;
    if a_explicit && b_glob {
        Ordering::Greater
    } else if b_explicit && a_glob {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

fn aligned(pattern: &[String], path: &[&str]) -> usize {
    pattern
        .iter()
        .zip(path)
        .take_while(|(p, s)| p.as_str() == **s)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternRole;

    fn props(p: &str) -> PatternProperties {
        PatternProperties::parse(p)
    }

    fn assert_wins(path: &str, winner: &str, loser: &str) {
        let (w, l) = (props(winner), props(loser));
        assert_eq!(compare(path, &w, &l), Ordering::Greater, "{winner} should beat {loser} for {path}");
        assert_eq!(compare(path, &l, &w), Ordering::Less, "antisymmetry for {path}");
    }

    #[test]
    fn deeper_directory_match_wins() {
        assert_wins("docs/api/v1/endpoint.md", "docs/api/", "docs/*.md");
        assert_wins("src/app/components/button.js", "src/app/", "**/components/*");
        assert_wins("data/raw/logs/2023/errors.txt", "data/raw/logs/", "data/**/*.txt");
        assert_wins("a/b/c.txt", "a/b/", "a/");
        assert_wins("a/b/c.txt", "a/", "*.txt");
        assert_wins("a/b/c/d/e.txt", "a/b/**/e.txt", "**/d/e.txt");
        assert_wins("tests/unit.py", "tests/unit.py", "tests/");
    }

    #[test]
    fn recursive_wildcards_add_no_depth() {
        assert_wins("packages/web/node_modules/lib.js", "**/node_modules/", "*.js");
        assert_wins("src/.cache/", "**/.cache/", "*");
        assert_wins("a/b/c.txt", "a/*/", "**/b/*.txt");
    }

    #[test]
    fn trailing_recursive_wildcard_spans_zero_directories() {
        let include = props("build/**/*.c");
        assert_eq!(matching_depth(&["build"], &include), 1);
        assert_eq!(matching_depth(&["build", "sub"], &include), 1);
        assert_eq!(matching_depth(&["other"], &include), 0);

        for path in ["build/x.c", "build/sub/x.c"] {
            assert_wins(path, "build/**/*.c", "**/build/");
        }
        for path in ["src/main.rs", "src/a/main.rs"] {
            assert_wins(path, "src/**/*.rs", "src/");
        }
    }

    #[test]
    fn explicit_beats_glob() {
        assert_wins("debug.log", "debug.log", "*.log");
        assert_wins("src/config/settings.ini", "src/config/settings.ini", "src/config/*");
        assert_wins("a/b/c/d/e.txt", "a/b/c/d/e.txt", "a/b/**/e.txt");
        assert_wins("build/", "build/", "**/build/");
        assert_wins("build/", "build/", "*");
    }

    #[test]
    fn longer_suffix_chain_wins() {
        assert_wins("archive.tar.gz", "*.tar.gz", "*.gz");
        assert_wins("my.file.log.txt", "*.log.txt", "*.txt");
        assert_wins("my.file.log.txt", "*.file.log.txt", "*.log.txt");
        assert_wins("my.file.log.txt", "*.txt", "*.log");
    }

    #[test]
    fn pattern_of_the_path_type_wins() {
        assert_wins("docs/README.md", "docs/README.md", "docs/");
        assert_wins("src/explicit.h", "src/explicit.h", "src/");
        assert_wins("foo/", "foo/", "foo");
    }

    #[test]
    fn identical_patterns_tie() {
        assert_eq!(compare("file.txt", &props("*.txt"), &props("*.txt")), Ordering::Equal);
        assert_eq!(compare("x/", &props("/"), &props("/")), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let patterns = ["*.txt", "a/", "a/b/", "a/*.txt", "**/b/", "a/b/c.txt", "*.b.txt", "/", "**"];
        let paths = ["a/b/c.txt", "a/b/", "c.b.txt", "a/"];
        for path in paths {
            for x in patterns {
                for y in patterns {
                    let xy = compare(path, &props(x), &props(y));
                    let yx = compare(path, &props(y), &props(x));
                    assert_eq!(xy, yx.reverse(), "{x} vs {y} on {path}");
                }
            }
        }
    }

    fn resolve_in<'a>(path: &str, list: &'a [Pattern]) -> Option<(&'a str, usize)> {
        resolve(path, list).map(|p| (p.as_str(), p.index()))
    }

    #[test]
    fn resolves_most_specific_match() {
        let list = Pattern::list(["*.txt", "**/d/e.txt", "a/b/**/e.txt", "a/b/c/d/e.txt"], PatternRole::Include);
        assert_eq!(resolve_in("a/b/c/d/e.txt", &list), Some(("a/b/c/d/e.txt", 3)));

        let list = Pattern::list(["docs/**", "docs/dev/*"], PatternRole::Include);
        assert_eq!(resolve_in("docs/dev/guide.md", &list), Some(("docs/dev/*", 1)));

        let list = Pattern::list(["src/*.h", "**/common.h"], PatternRole::Include);
        assert_eq!(resolve_in("src/common.h", &list), Some(("src/*.h", 0)));
    }

    #[test]
    fn none_without_a_match() {
        let list = Pattern::list(["*.txt", "docs/"], PatternRole::Include);
        assert_eq!(resolve_in("other/file.py", &list), None);
        assert_eq!(resolve_in("anything", &[]), None);
    }

    #[test]
    fn later_pattern_wins_a_tie() {
        let list = Pattern::list(["*.txt", "*.txt"], PatternRole::Include);
        assert_eq!(resolve_in("file.txt", &list), Some(("*.txt", 1)));

        let list = Pattern::list(["data/logs/*", "data/logs/*.log"], PatternRole::Include);
        assert_eq!(resolve_in("data/logs/app.log", &list), Some(("data/logs/*.log", 1)));
    }

    #[test]
    fn user_pattern_wins_a_tie_with_a_default() {
        let user = Pattern::new("*.log", 0, PatternRole::UserExclude);
        let default = Pattern::new("*.log", 7, PatternRole::DefaultExclude);
        let winner = resolve("app.log", [&default, &user]).map(Pattern::role);
        assert_eq!(winner, Some(PatternRole::UserExclude));
        let winner = resolve("app.log", [&user, &default]).map(Pattern::role);
        assert_eq!(winner, Some(PatternRole::UserExclude));
    }

    #[test]
    fn resolution_is_deterministic() {
        let list = Pattern::list(["*.rs", "src/", "src/**/*.rs", "src/lib.rs"], PatternRole::Include);
        let first = resolve_in("src/lib.rs", &list);
        for _ in 0..10 {
            assert_eq!(resolve_in("src/lib.rs", &list), first);
        }
    }
}
