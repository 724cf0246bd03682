use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ignore::{WalkBuilder, WalkState};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::entry::Entry;
use crate::error::DigestError;
use crate::results::{DigestItem, Results, TraversalStats};
use crate::ruleset::RuleSet;
use crate::state::ItemType;
use crate::traits::ContentReader;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to the drivers.
#[derive(Clone)]
pub(crate) struct EngineOptions {
    pub rules:     Arc<RuleSet>,
    pub reader:    Arc<dyn ContentReader>,
    pub threads:   usize,
    pub dir_sizes: bool,
}

// ---------------------------------------------------------------------------
// Walk: lazy sequential driver
// ---------------------------------------------------------------------------

/// Lazily classified entries of one directory tree, in walk order.
///
/// Entries are produced depth-first with siblings sorted by name. Nothing
/// is read ahead: dropping the iterator halfway leaves no work behind.
/// Errors met below the root are yielded as `Err` and the walk goes on.
///
/// Created by [`DigestBuilder::walk`](crate::DigestBuilder::walk).
pub struct Walk {
    root:  PathBuf,
    opts:  EngineOptions,
    inner: walkdir::IntoIter,
    stats: TraversalStats,
    start: Instant,
}

impl Walk {
    pub(crate) fn new(root: PathBuf, opts: EngineOptions) -> Self {
        let inner = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(opts.rules.limits().follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        debug!(root = %root.display(), mode = opts.rules.mode().name(), "starting digest walk");
        Self {
            root,
            opts,
            inner,
            stats: TraversalStats::default(),
            start: Instant::now(),
        }
    }

    /// Counters over everything yielded so far.
    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    /// The rule set entries are classified with.
    pub fn rules(&self) -> &RuleSet {
        &self.opts.rules
    }
}

impl Iterator for Walk {
    type Item = Result<DigestItem, DigestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let dent = match self.inner.next()? {
            Ok(dent) => dent,
            Err(err) => {
                let err = map_walkdir_error(err);
                warn!(error = %err, "skipping unreadable entry");
                return Some(Err(err));
            }
        };

        let is_dir = dent.file_type().is_dir();
        let entry = describe(&self.root, dent.path(), is_dir, dent.path_is_symlink(), &self.opts);
        let classification = self.opts.rules.classify(&entry);

        // Only a directory may be skipped; on anything else walkdir would
        // drop the rest of the parent.
        if is_dir && !classification.traverse {
            self.inner.skip_current_dir();
        }

        let item = self
            .opts
            .rules
            .settle(classification.event, dent.path(), self.opts.reader.as_ref());
        self.stats.record(&item.event);
        self.stats.duration = self.start.elapsed();
        Some(Ok(item))
    }
}

// ---------------------------------------------------------------------------
// run(): parallel driver
// ---------------------------------------------------------------------------

/// Classify the whole tree under `root` on a pool of walker threads.
///
/// Sibling subtrees are visited concurrently. Items are sorted by path
/// before returning so the output does not depend on thread scheduling.
pub(crate) fn run(root: &Path, opts: EngineOptions) -> Results {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(opts.rules.limits().follow_symlinks)
        .same_file_system(false)
        .threads(opts.threads);

    let walker = builder.build_parallel();

    // Shared state across threads
    let items  = Arc::new(Mutex::new(Vec::<DigestItem>::new()));
    let errors = Arc::new(Mutex::new(Vec::<DigestError>::new()));

    debug!(root = %root.display(), threads = opts.threads, "starting parallel digest");
    let start = Instant::now();

    walker.run(|| {
        let opts   = opts.clone();
        let items  = Arc::clone(&items);
        let errors = Arc::clone(&errors);
        let root   = root.to_path_buf();

        Box::new(move |res: Result<ignore::DirEntry, ignore::Error>| -> WalkState {
            let dent = match res {
                Ok(e) => e,
                Err(e) => {
                    let err = map_ignore_error(e);
                    warn!(error = %err, "skipping unreadable entry");
                    if let Ok(mut errs) = errors.lock() {
                        errs.push(err);
                    }
                    return WalkState::Continue;
                }
            };

            // Skip the root itself
            if dent.depth() == 0 {
                return WalkState::Continue;
            }

            let ft = match dent.file_type() {
                Some(ft) => ft,
                None     => return WalkState::Continue,
            };

            let entry = describe(&root, dent.path(), ft.is_dir(), dent.path_is_symlink(), &opts);
            let classification = opts.rules.classify(&entry);
            let traverse = classification.traverse;

            let item = opts.rules.settle(classification.event, dent.path(), opts.reader.as_ref());
            if let Ok(mut collected) = items.lock() {
                collected.push(item);
            }

            if ft.is_dir() && !traverse {
                WalkState::Skip
            } else {
                WalkState::Continue
            }
        })
    });

    let duration = start.elapsed();

    let mut items = Arc::try_unwrap(items).unwrap_or_default().into_inner().unwrap_or_default();
    let errors    = Arc::try_unwrap(errors).unwrap_or_default().into_inner().unwrap_or_default();

    items.sort_by(|a, b| a.event.path.cmp(&b.event.path));
    let stats = TraversalStats::compute(&items, duration);

    debug!(
        included = stats.included_files,
        excluded = stats.excluded_items,
        errors = errors.len(),
        "parallel digest finished"
    );

    Results { items, stats, errors }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check that `root` exists and is a directory.
pub(crate) fn check_root(root: &Path) -> Result<(), DigestError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DigestError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DigestError::NotFound(root.to_path_buf())),
        Err(e) => Err(DigestError::from_io(root.to_path_buf(), e)),
    }
}

/// Build the classifier's view of a walked path.
///
/// `is_dir` is the walker's file type, which for an unfollowed symlink is
/// the link itself; the item type then comes from the link target.
fn describe(root: &Path, path: &Path, is_dir: bool, is_symlink: bool, opts: &EngineOptions) -> Entry {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let followed = !is_symlink || opts.rules.limits().follow_symlinks;

    let kind = if is_dir || (is_symlink && path.is_dir()) {
        ItemType::Folder
    } else {
        ItemType::File
    };

    let size = match kind {
        _ if !followed => 0,
        ItemType::File => match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not stat file; size taken as 0");
                0
            }
        },
        ItemType::Folder if opts.dir_sizes => dir_size(path, opts.rules.limits().follow_symlinks),
        ItemType::Folder => 0,
    };

    Entry::from_relative(relative, kind, size).symlink(is_symlink)
}

/// Total size of the regular files below `path`.
fn dir_size(path: &Path, follow_links: bool) -> u64 {
    WalkDir::new(path)
        .follow_links(follow_links)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

// ---------------------------------------------------------------------------
// Map walker errors to DigestError
// ---------------------------------------------------------------------------

fn map_walkdir_error(e: walkdir::Error) -> DigestError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    if e.loop_ancestor().is_some() {
        return DigestError::SymlinkLoop(path);
    }
    let message = e.to_string();
    match e.into_io_error() {
        Some(io_err) => DigestError::from_io(path, io_err),
        None         => DigestError::Walk(message),
    }
}

fn map_ignore_error(e: ignore::Error) -> DigestError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => DigestError::from_io(path, io_err),
            ignore::Error::Loop { child, .. } => DigestError::SymlinkLoop(child),
            other => DigestError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => DigestError::SymlinkLoop(child),
        ignore::Error::Io(io_err)         => DigestError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => DigestError::Walk(other.to_string()),
    }
}
