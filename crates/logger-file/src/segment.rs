//! Segment naming and renumbering of size-rotated backups
//!
//! The active segment lives at `{base_path}/{name}`. A size rotation moves it
//! to `{name}.0`; renumbering then shifts every backup one index up so the
//! highest index is always the oldest.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::config::{RotationPolicy, SinkTarget};
use crate::pattern;

/// Computes the active segment name for a point in time
#[derive(Debug, Clone)]
pub struct SegmentNamer {
    target: SinkTarget,
    time_rolling: bool,
}

impl SegmentNamer {
    /// Namer for `target`; patterns are only resolved when `time_rolling`
    #[must_use]
    pub const fn new(target: SinkTarget, time_rolling: bool) -> Self {
        Self {
            target,
            time_rolling,
        }
    }

    /// Segment name at `now`
    #[must_use]
    pub fn name_at(&self, now: &DateTime<Local>) -> String {
        if self.time_rolling {
            pattern::resolve(self.target.base_file_name(), now)
        } else {
            self.target.base_file_name().to_string()
        }
    }

    /// Full path of the segment called `name`
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.target.base_path().join(name)
    }

    /// The sink target
    #[must_use]
    pub const fn target(&self) -> &SinkTarget {
        &self.target
    }
}

/// Whether appending `incoming` bytes to a segment of `current` bytes must
/// first rotate it. Empty segments are never rotated.
#[must_use]
pub const fn needs_size_rotation(policy: &RotationPolicy, current: u64, incoming: u64) -> bool {
    policy.size_rolling && current > 0 && current.saturating_add(incoming) > policy.max_size_bytes
}

/// `{active}.{index}`
#[must_use]
pub fn backup_path(active: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(active.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// One filesystem operation of a renumbering pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenumberStep {
    /// Evict the oldest retained backup
    Remove(PathBuf),
    /// Move a backup one index up
    Rename {
        /// Current backup
        from: PathBuf,
        /// Next index
        to: PathBuf,
    },
}

/// Steps that shift the backups of `active` up by one index.
///
/// With `max_segments > 0` the backup at `max_segments` is evicted first so
/// that exactly `max_segments` backups remain. With `0` nothing is evicted and
/// every backup up to `highest` moves.
#[must_use]
pub fn renumber_plan(active: &Path, max_segments: usize, highest: Option<usize>) -> Vec<RenumberStep> {
    let mut steps = Vec::new();

    let top = if max_segments > 0 {
        steps.push(RenumberStep::Remove(backup_path(active, max_segments)));
        max_segments
    } else {
        highest.map_or(1, |n| n + 1)
    };

    for i in (1..=top).rev() {
        steps.push(RenumberStep::Rename {
            from: backup_path(active, i - 1),
            to: backup_path(active, i),
        });
    }

    steps
}

/// Highest existing backup index of `active`
pub fn highest_backup(active: &Path) -> io::Result<Option<usize>> {
    let Some(file_name) = active.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let dir = match active.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!("{file_name}.");

    let mut highest = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if let Some(index) = name
            .strip_prefix(&prefix)
            .and_then(|suffix| suffix.parse::<usize>().ok())
        {
            highest = highest.max(Some(index));
        }
    }

    Ok(highest)
}

/// Shift the backups of `active`. Failures are logged and skipped.
pub fn renumber(active: &Path, max_segments: usize) {
    let highest = if max_segments == 0 {
        match highest_backup(active) {
            Ok(highest) => highest,
            Err(e) => {
                warn!("Failed to list backups of {}: {}", active.display(), e);
                return;
            }
        }
    } else {
        None
    };

    for step in renumber_plan(active, max_segments, highest) {
        let result = match &step {
            RenumberStep::Remove(path) => fs::remove_file(path),
            RenumberStep::Rename { from, to } => fs::rename(from, to),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Renumbering step {:?} failed: {}", step, e),
        }
    }

    debug!("Renumbered backups of {}", active.display());
}
