//! The rotating file sink

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use fanlog_logger::Sink;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::{FileLogFormat, FileSinkConfig};
use crate::error::{Error, Result};
use crate::segment::{self, SegmentNamer};

/// The segment currently receiving writes
#[derive(Debug)]
struct ActiveSegment {
    file: File,
    name: String,
    path: PathBuf,
    size: u64,
}

/// A sink appending records to a file that rotates by time, by size, or both.
///
/// Time check, size check, rotation and the write itself happen under one
/// lock, so no record is split across segments and records never interleave.
/// Size-rotated backups are renumbered on a background thread.
///
/// A size rotation first joins the previous renumbering pass, still under
/// the segment lock. When rotations come back to back, the write that
/// triggers the second one waits for the renames of the first, and every
/// other writer waits behind it.
pub struct RotatingFileSink {
    config: FileSinkConfig,
    namer: SegmentNamer,
    active: Mutex<Option<ActiveSegment>>,
    renumbering: Mutex<Option<JoinHandle<()>>>,
}

impl RotatingFileSink {
    /// Validate `config` and open the first segment
    pub fn new(config: FileSinkConfig) -> Result<Self> {
        config.policy.validate()?;

        let namer = SegmentNamer::new(config.target.clone(), config.policy.time_rolling);
        let sink = Self {
            config,
            namer,
            active: Mutex::new(None),
            renumbering: Mutex::new(None),
        };
        sink.initialize()?;

        Ok(sink)
    }

    /// Create the target directory and open the segment for the current time.
    ///
    /// Does nothing for a disabled sink.
    pub fn initialize(&self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let base = self.config.target.base_path();
        fs::create_dir_all(base).map_err(|source| Error::CreateDirectory {
            path: base.to_path_buf(),
            source,
        })?;

        let segment = self.open_segment(self.current_name())?;
        debug!("Opened log segment {}", segment.path.display());
        *self.active.lock() = Some(segment);

        Ok(())
    }

    /// Whether records are written at all
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    /// Path of the segment currently receiving writes
    #[must_use]
    pub fn active_path(&self) -> Option<PathBuf> {
        self.active.lock().as_ref().map(|s| s.path.clone())
    }

    /// Append one record, rotating first when the policy says so.
    ///
    /// JSON records are newline-terminated on disk; text records are
    /// rendered before the lock is taken. Size accounting uses the bytes
    /// actually written.
    pub fn write_record(&self, record: &[u8]) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let buffer;
        let bytes = match self.config.format {
            FileLogFormat::Json if record.ends_with(b"\n") => record,
            FileLogFormat::Json => {
                buffer = [record, b"\n"].concat();
                buffer.as_slice()
            }
            FileLogFormat::Text => {
                buffer = self
                    .config
                    .text_formatter
                    .render(record)
                    .map_err(Error::Render)?;
                buffer.as_slice()
            }
        };

        let retired = {
            let mut active = self.active.lock();
            let segment = match active.take() {
                Some(segment) => segment,
                None => self.open_segment(self.current_name())?,
            };
            let (segment, retired) = self.write_locked(segment, bytes)?;
            *active = Some(segment);
            retired
        };

        // Closed outside the lock
        drop(retired);

        Ok(())
    }

    /// Sync the active segment to disk
    pub fn sync(&self) -> Result<()> {
        if let Some(segment) = self.active.lock().as_ref() {
            segment.file.sync_data()?;
        }
        Ok(())
    }

    /// Wait for the last background renumbering to finish.
    ///
    /// The pass is joined with the renumbering slot locked, so a rotation
    /// racing with this call waits for the same pass before it moves the
    /// active file.
    pub fn wait_for_renumbering(&self) {
        join_pending(&mut self.renumbering.lock());
    }

    fn current_name(&self) -> String {
        self.namer.name_at(&self.config.clock.now())
    }

    fn open_segment(&self, name: String) -> Result<ActiveSegment> {
        let path = self.namer.path_of(&name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;
        let size = file.metadata()?.len();

        Ok(ActiveSegment {
            file,
            name,
            path,
            size,
        })
    }

    /// Runs with the segment lock held. On error the segment is dropped and
    /// the next write reopens one.
    fn write_locked(
        &self,
        mut segment: ActiveSegment,
        bytes: &[u8],
    ) -> Result<(ActiveSegment, Option<File>)> {
        let mut retired = None;

        if self.config.policy.time_rolling {
            let name = self.current_name();
            if name != segment.name {
                let next = self.open_segment(name)?;
                debug!(
                    "Time rotation: {} -> {}",
                    segment.path.display(),
                    next.path.display()
                );
                retired = Some(std::mem::replace(&mut segment, next).file);
            }
        }

        if segment::needs_size_rotation(&self.config.policy, segment.size, bytes.len() as u64) {
            segment = self.rotate_by_size(segment)?;
        }

        segment.file.write_all(bytes)?;
        segment.size += bytes.len() as u64;

        Ok((segment, retired))
    }

    fn rotate_by_size(&self, segment: ActiveSegment) -> Result<ActiveSegment> {
        // A pending pass may still be moving `.0` out of the way. The slot
        // stays locked until the next pass is stored in it.
        let mut pending = self.renumbering.lock();
        join_pending(&mut pending);

        let ActiveSegment {
            file,
            name,
            path,
            size,
        } = segment;
        file.sync_all()?;
        drop(file);

        let backup = segment::backup_path(&path, 0);
        fs::rename(&path, &backup).map_err(|source| Error::Rotation {
            from: path.clone(),
            to: backup.clone(),
            source,
        })?;
        debug!(
            "Size rotation: {} ({} bytes) -> {}",
            path.display(),
            size,
            backup.display()
        );

        let next = self.open_segment(name)?;
        *pending = self.spawn_renumbering(path);

        Ok(next)
    }

    fn spawn_renumbering(&self, active: PathBuf) -> Option<JoinHandle<()>> {
        let max_segments = self.config.policy.max_segments;
        let job = active.clone();

        match thread::Builder::new()
            .name("fanlog-renumber".to_string())
            .spawn(move || segment::renumber(&job, max_segments))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to spawn renumbering thread, renumbering inline: {}", e);
                segment::renumber(&active, max_segments);
                None
            }
        }
    }
}

fn join_pending(pending: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = pending.take()
        && handle.join().is_err()
    {
        warn!("Renumbering thread panicked");
    }
}

impl Sink for RotatingFileSink {
    fn write(&self, record: &[u8]) -> fanlog_logger::Result<usize> {
        self.write_record(record)?;
        Ok(record.len())
    }

    fn flush(&self) -> fanlog_logger::Result<()> {
        self.sync()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("config", &self.config)
            .field("active", &self.active_path())
            .finish_non_exhaustive()
    }
}
