//! Motion recording and playback
//!
//! A [`Recorder`] samples every manipulable joint of a tree at a fixed
//! interval, stamping each sample with the time since recording started.
//! A [`Playback`] replays the samples on the same relative timing through a
//! [`PositionFeed`], so a joint the user is currently dragging is left
//! alone. Recordings persist as JSON:
//!
//! ```json
//! { "start_time": 1718000000.5,
//!   "records": [ { "timestamp": 0.0, "positions": { "shoulder": 0.25 } } ] }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::{FeedOutcome, PositionFeed};
use crate::kinematics::KinematicTree;
use crate::manipulation::Manipulator;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("sample at {timestamp}s is earlier than the previous one at {previous}s")]
    OutOfOrder { previous: f64, timestamp: f64 },

    #[error("invalid timestamp {0}")]
    InvalidTimestamp(f64),

    #[error("recording I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("recording is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Joint values captured at one instant, keyed by joint name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSample {
    /// Seconds since the recording started.
    pub timestamp: f64,
    pub positions: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Wall-clock start, seconds since the Unix epoch.
    pub start_time: f64,
    pub records: Vec<RecordSample>,
}

impl Recording {
    pub fn new(start_time: f64) -> Self {
        Self {
            start_time,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Timestamp of the last sample.
    pub fn duration(&self) -> Duration {
        self.records
            .last()
            .map(|sample| Duration::from_secs_f64(sample.timestamp))
            .unwrap_or_default()
    }

    /// Appends the current value of every manipulable joint of `tree`.
    pub fn capture(&mut self, tree: &KinematicTree, elapsed: Duration) -> Result<(), RecordingError> {
        let timestamp = elapsed.as_secs_f64();
        if let Some(previous) = self.records.last().map(|sample| sample.timestamp) {
            if timestamp < previous {
                return Err(RecordingError::OutOfOrder { previous, timestamp });
            }
        }

        let positions = tree
            .joints()
            .iter()
            .filter(|joint| joint.is_manipulable())
            .map(|joint| (joint.name().to_string(), joint.value()))
            .collect();
        self.records.push(RecordSample { timestamp, positions });
        Ok(())
    }

    /// Checks that timestamps are finite, non-negative and non-decreasing.
    pub fn validate(&self) -> Result<(), RecordingError> {
        let mut previous = 0.0;
        for sample in &self.records {
            if !sample.timestamp.is_finite() || sample.timestamp < 0.0 {
                return Err(RecordingError::InvalidTimestamp(sample.timestamp));
            }
            if sample.timestamp < previous {
                return Err(RecordingError::OutOfOrder {
                    previous,
                    timestamp: sample.timestamp,
                });
            }
            previous = sample.timestamp;
        }
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), RecordingError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordingError> {
        let recording: Recording = serde_json::from_reader(reader)?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordingError> {
        let file = File::create(path.as_ref())?;
        self.to_writer(BufWriter::new(file))?;
        log::info!("saved {} samples to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let file = File::open(path.as_ref())?;
        let recording = Self::from_reader(BufReader::new(file))?;
        log::info!("loaded {} samples from {}", recording.len(), path.as_ref().display());
        Ok(recording)
    }
}

/// Samples a tree from the host's frame loop, at most once per interval.
#[derive(Debug)]
pub struct Recorder {
    started: Instant,
    interval: Duration,
    last_sample: Option<Duration>,
    recording: Recording,
}

impl Recorder {
    /// About ten samples a second.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn start(interval: Duration) -> Self {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self {
            started: Instant::now(),
            interval,
            last_sample: None,
            recording: Recording::new(start_time),
        }
    }

    /// Samples if an interval has passed since the last sample. Returns
    /// whether a sample was taken.
    pub fn sample(&mut self, tree: &KinematicTree) -> Result<bool, RecordingError> {
        let elapsed = self.started.elapsed();
        self.sample_at(tree, elapsed)
    }

    /// Like [`sample`](Self::sample) with an explicit time since start.
    pub fn sample_at(&mut self, tree: &KinematicTree, elapsed: Duration) -> Result<bool, RecordingError> {
        if let Some(last) = self.last_sample {
            if elapsed < last + self.interval {
                return Ok(false);
            }
        }
        self.recording.capture(tree, elapsed)?;
        self.last_sample = Some(elapsed);
        Ok(true)
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn finish(self) -> Recording {
        log::debug!("recorded {} samples", self.recording.len());
        self.recording
    }
}

/// Replays a recording on its original timing. The host calls
/// [`advance`](Self::advance) each frame with the time since playback
/// started; every sample that has come due is fed to the tree in order.
#[derive(Debug)]
pub struct Playback<'a> {
    recording: &'a Recording,
    feed: PositionFeed,
    next: usize,
}

impl<'a> Playback<'a> {
    pub fn new(recording: &'a Recording, feed: PositionFeed) -> Self {
        Self {
            recording,
            feed,
            next: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.recording.records.len()
    }

    /// Number of samples already played.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// Plays every sample due by `elapsed`. Returns how many joint values
    /// were actually applied.
    pub fn advance(&mut self, elapsed: Duration, tree: &mut KinematicTree, manipulator: &Manipulator) -> usize {
        let now = elapsed.as_secs_f64();
        let mut applied = 0;

        while let Some(sample) = self.recording.records.get(self.next) {
            if sample.timestamp > now {
                break;
            }
            for (name, &value) in &sample.positions {
                match self.feed.apply(tree, manipulator, name, value) {
                    FeedOutcome::Applied(_) => applied += 1,
                    FeedOutcome::Suppressed => {
                        log::trace!("playback skipped grabbed joint `{}`", name)
                    }
                    _ => {}
                }
            }
            self.next += 1;
        }

        if self.is_finished() && applied > 0 {
            log::debug!("playback reached the last sample");
        }
        applied
    }
}
