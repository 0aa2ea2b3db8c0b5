//! In-memory experiment recordings.
//!
//! A [`Recording`] is one subject × condition unit. Its data is always held
//! as `[C, T, E]`; a continuous `[C, T]` recording is a single epoch.
//! [`ExperimentData`] groups recordings by subject in a stable order so that
//! feature extraction is reproducible.
use log::{debug, warn};
use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::condition::{Condition, EventKind};
use crate::epoch;
use crate::error::{Error, Result};

/// An event marker. `latency` is in samples relative to the whole recording,
/// not to the epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub latency: f64,
    pub kind: EventKind,
    pub epoch: usize,
}

#[derive(Debug, Clone)]
pub struct Recording {
    pub subject: u32,
    pub condition: Condition,
    pub channel_labels: Vec<String>,
    /// Sampling rate in Hz.
    pub sample_rate: f32,
    /// Duration of one epoch in seconds.
    pub epoch_dur: f32,
    pub events: Vec<Event>,
    data: Array3<f32>,
}

impl Recording {
    /// Build a recording from an already epoched `[C, T, E]` tensor.
    pub fn new(
        subject: u32,
        condition: Condition,
        sample_rate: f32,
        data: Array3<f32>,
    ) -> Result<Self> {
        if !(sample_rate > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        let n_t = data.shape()[1];
        Ok(Self {
            subject,
            condition,
            channel_labels: Vec::new(),
            sample_rate,
            epoch_dur: n_t as f32 / sample_rate,
            events: Vec::new(),
            data,
        })
    }

    /// Build a single-epoch recording from a continuous `[C, T]` tensor.
    pub fn continuous(
        subject: u32,
        condition: Condition,
        sample_rate: f32,
        data: Array2<f32>,
    ) -> Result<Self> {
        Self::new(subject, condition, sample_rate, data.insert_axis(Axis(2)))
    }

    pub fn with_channel_labels(mut self, labels: Vec<String>) -> Self {
        self.channel_labels = labels;
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn n_channels(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn epoch_samples(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn n_epochs(&self) -> usize {
        self.data.shape()[2]
    }

    /// `[C, T, E]` view of the full tensor.
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// `[C, T]` view of epoch `e`.
    pub fn epoch(&self, e: usize) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., .., e])
    }

    /// Samples in an epoch of `epoch_dur` seconds at this recording's rate.
    ///
    /// Products within 1e-3 of an integer snap to it, so a duration derived
    /// from a sample count maps back to the same count.
    pub fn samples_for(&self, epoch_dur: f32) -> usize {
        let exact = f64::from(epoch_dur) * f64::from(self.sample_rate);
        let nearest = exact.round();
        if (exact - nearest).abs() < 1e-3 {
            nearest as usize
        } else {
            exact.floor() as usize
        }
    }

    /// Re-cut the recording into epochs of `epoch_dur` seconds.
    ///
    /// See [`Recording::split_samples`].
    pub fn split_epochs(&mut self, epoch_dur: f32) -> Result<()> {
        if !(epoch_dur > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "epoch duration must be positive, got {epoch_dur}"
            )));
        }
        let epoch_samples = self.samples_for(epoch_dur);
        if epoch_samples == 0 && self.epoch_samples() > 0 {
            return Err(Error::InvalidArgument(format!(
                "epoch of {epoch_dur} s is shorter than one sample at {} Hz",
                self.sample_rate
            )));
        }
        self.split_samples(epoch_samples)
    }

    /// Re-cut the recording into epochs of `epoch_samples` samples.
    ///
    /// No-op unless `epoch_samples` is shorter than the current epoch.
    /// Samples left over after the last full window are dropped. Event epoch
    /// indices are left as recorded.
    pub fn split_samples(&mut self, epoch_samples: usize) -> Result<()> {
        if epoch_samples >= self.epoch_samples() {
            return Ok(());
        }
        if epoch_samples == 0 {
            return Err(Error::InvalidArgument("epoch must hold at least one sample".into()));
        }
        self.data = epoch::resegment(&self.data, epoch_samples);
        self.epoch_dur = epoch_samples as f32 / self.sample_rate;
        debug!(
            "subject {} condition {}: {} epochs of {} samples",
            self.subject,
            self.condition,
            self.n_epochs(),
            epoch_samples
        );
        Ok(())
    }
}

/// All recordings of one subject, ordered by condition.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: u32,
    pub recordings: Vec<Recording>,
}

/// A whole experiment: every subject's recordings.
#[derive(Debug, Clone, Default)]
pub struct ExperimentData {
    pub subjects: Vec<Subject>,
}

impl ExperimentData {
    /// Group `recordings` by subject.
    ///
    /// Subjects keep the order in which they first appear; each subject's
    /// recordings are ordered by condition. Every recording is then cut into
    /// epochs of the shortest epoch present: counted in samples when all
    /// recordings share a sample rate, in seconds otherwise. Empty recordings
    /// do not take part in choosing the shortest epoch.
    pub fn from_recordings(recordings: Vec<Recording>) -> Result<Self> {
        let shared_rate = recordings.windows(2).all(|w| w[0].sample_rate == w[1].sample_rate);
        let non_empty = || recordings.iter().filter(|r| r.epoch_samples() > 0);
        let n_empty = recordings.len() - non_empty().count();
        if n_empty > 0 {
            warn!("{n_empty} recording(s) hold no samples");
        }
        let min_samples = non_empty().map(Recording::epoch_samples).min();
        let min_epoch_dur = non_empty().map(|r| r.epoch_dur).fold(f32::INFINITY, f32::min);

        let mut subjects: Vec<Subject> = Vec::new();
        for rec in recordings {
            match subjects.iter_mut().find(|s| s.id == rec.subject) {
                Some(subject) => subject.recordings.push(rec),
                None => subjects.push(Subject { id: rec.subject, recordings: vec![rec] }),
            }
        }
        for subject in &mut subjects {
            subject.recordings.sort_by_key(|r| r.condition);
        }

        let mut experiment = Self { subjects };
        match min_samples {
            Some(n) if shared_rate => {
                experiment.recordings_mut().try_for_each(|r| r.split_samples(n))?;
            }
            Some(_) => experiment.split_epochs(min_epoch_dur)?,
            None => {}
        }
        Ok(experiment)
    }

    /// Apply [`Recording::split_epochs`] to every recording.
    pub fn split_epochs(&mut self, epoch_dur: f32) -> Result<()> {
        self.recordings_mut().try_for_each(|r| r.split_epochs(epoch_dur))
    }

    pub fn n_subjects(&self) -> usize {
        self.subjects.len()
    }

    /// Every recording, subject then condition order.
    pub fn recordings(&self) -> impl Iterator<Item = &Recording> {
        self.subjects.iter().flat_map(|s| s.recordings.iter())
    }

    fn recordings_mut(&mut self) -> impl Iterator<Item = &mut Recording> {
        self.subjects.iter_mut().flat_map(|s| s.recordings.iter_mut())
    }
}
