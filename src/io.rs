//! Safetensors I/O.
//!
//! Reader: an experiment file holds one F32 tensor per recording, `rec_0`,
//! `rec_1`, …, shaped `[C, T]` or `[C, T, E]`, and a `__metadata__` entry
//! `recordings` whose value is a JSON array describing each tensor:
//!
//! ```text
//! [{"subject": 1, "condition": "open", "sample_rate": 128.0, "epoch_dur": 1.0,
//!   "channels": ["AF3", …], "events": [{"latency": 12.0, "code": "3", "epoch": 0}]}, …]
//! ```
//!
//! Writer: evaluation summaries as `overall` [S] F64, `per_class` [S, 4] F64
//! and `subjects` [S] I32.
use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array2, Array3, Axis};
use serde::Deserialize;

use crate::condition::{Condition, EventKind};
use crate::driver::SubjectSummary;
use crate::error::{Error, Result};
use crate::recording::{Event, ExperimentData, Recording};

// ── Low-level safetensors parser (raw bytes → ndarray, no tensor types) ─────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        return Err(Error::Format("safetensors file too small".into()));
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len) as usize;
    let end = 8usize.checked_add(n).filter(|&e| e <= bytes.len()).ok_or_else(|| {
        Error::Format(format!("header length {n} exceeds file size {}", bytes.len()))
    })?;
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..end])?;
    Ok((header, end))
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    if entry["dtype"].as_str() != Some("F32") {
        return Err(Error::Format(format!("expected F32 tensor, got {}", entry["dtype"])));
    }
    let offsets = entry["data_offsets"]
        .as_array()
        .filter(|o| o.len() == 2)
        .ok_or_else(|| Error::Format("missing data_offsets".into()))?;
    let offset = |i: usize| {
        offsets[i]
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .and_then(|v| data_start.checked_add(v))
            .ok_or_else(|| Error::Format(format!("invalid data offset {}", offsets[i])))
    };
    let (s, e) = (offset(0)?, offset(1)?);
    if s > e || e > bytes.len() {
        return Err(Error::Format(format!("data offsets {s}..{e} out of range")));
    }
    Ok(bytes[s..e]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .ok_or_else(|| Error::Format("missing shape".into()))?
        .iter()
        .map(|v| v.as_u64().map(|d| d as usize).ok_or_else(|| Error::Format("bad shape".into())))
        .collect()
}

// ── Recording metadata ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RecordingMeta {
    subject: u32,
    condition: Condition,
    sample_rate: f32,
    /// Epoch length in seconds; a `[C, T]` tensor is cut into epochs of it.
    #[serde(default)]
    epoch_dur: Option<f32>,
    #[serde(default)]
    channels: Vec<String>,
    #[serde(default)]
    events: Vec<EventMeta>,
}

#[derive(Debug, Deserialize)]
struct EventMeta {
    latency: f64,
    code: String,
    #[serde(default)]
    epoch: usize,
}

fn read_recording(
    bytes: &[u8],
    data_start: usize,
    entry: &serde_json::Value,
    meta: RecordingMeta,
) -> Result<Recording> {
    let shape = shape_of(entry)?;
    let values = read_f32_tensor(bytes, data_start, entry)?;
    let data = match shape[..] {
        [c, t] => Array2::from_shape_vec((c, t), values)?.insert_axis(Axis(2)),
        [c, t, e] => Array3::from_shape_vec((c, t, e), values)?,
        _ => {
            return Err(Error::InvalidShape(format!(
                "recording tensor must be [C, T] or [C, T, E], got {shape:?}"
            )))
        }
    };
    let events = meta
        .events
        .into_iter()
        .map(|ev| {
            Ok(Event { latency: ev.latency, kind: EventKind::from_code(&ev.code)?, epoch: ev.epoch })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut recording = Recording::new(meta.subject, meta.condition, meta.sample_rate, data)?
        .with_channel_labels(meta.channels)
        .with_events(events);
    if let Some(dur) = meta.epoch_dur {
        recording.split_epochs(dur)?;
    }
    Ok(recording)
}

/// Load every recording of an experiment file and group them by subject.
///
/// Recordings are re-segmented to the shortest epoch present, as in
/// [`ExperimentData::from_recordings`].
pub fn load_experiment(path: &Path) -> Result<ExperimentData> {
    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(&bytes)?;

    let metas_json = header
        .get("__metadata__")
        .and_then(|m| m.get("recordings"))
        .and_then(|r| r.as_str())
        .ok_or_else(|| Error::Format("missing __metadata__.recordings".into()))?;
    let metas: Vec<RecordingMeta> = serde_json::from_str(metas_json)?;

    let mut recordings = Vec::with_capacity(metas.len());
    for (i, meta) in metas.into_iter().enumerate() {
        let key = format!("rec_{i}");
        let entry = header
            .get(&key)
            .ok_or_else(|| Error::Format(format!("missing tensor '{key}'")))?;
        recordings.push(read_recording(&bytes, data_start, entry, meta)?);
    }
    log::info!("loaded {} recordings from {}", recordings.len(), path.display());
    ExperimentData::from_recordings(recordings)
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer that handles F32, F64, and I32 tensors.
///
/// Usage:
/// ```rust,no_run
/// use eegcv::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("rec_0", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.set_metadata("recordings", r#"[{"subject":1,"condition":"1","sample_rate":3.0}]"#);
/// w.write(Path::new("/tmp/experiment.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    /// String entry in `__metadata__`.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        if !self.metadata.is_empty() {
            header_map.insert("__metadata__".into(), serde_json::Value::Object(self.metadata.clone()));
        }
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

/// Write a per-subject summary to `path`.
pub fn write_summary(summary: &SubjectSummary, path: &Path) -> Result<()> {
    let n = summary.subjects.len();
    let mut w = StWriter::new();
    w.add_f64("overall", &summary.overall.to_vec(), &[n]);
    let per_class: Vec<f64> = summary.per_class.iter().copied().collect();
    w.add_f64("per_class", &per_class, &[n, Condition::COUNT]);
    let ids: Vec<i32> = summary.subjects.iter().map(|&s| s as i32).collect();
    w.add_i32("subjects", &ids, &[n]);
    w.write(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_single_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.safetensors");

        let mut w = StWriter::new();
        w.add_f32("rec_0", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        w.set_metadata(
            "recordings",
            r#"[{"subject": 4, "condition": "open", "sample_rate": 3.0,
                 "channels": ["AF3", "F7"], "events": [{"latency": 1.0, "code": "100"}]}]"#,
        );
        w.write(&path).unwrap();

        let exp = load_experiment(&path).unwrap();
        let rec = &exp.subjects[0].recordings[0];
        assert_eq!(rec.subject, 4);
        assert_eq!(rec.condition, Condition::Baseline);
        assert_eq!(rec.data().shape(), &[2, 3, 1]);
        assert_eq!(rec.data()[[1, 2, 0]], 6.0);
        assert_eq!(rec.channel_labels, vec!["AF3", "F7"]);
        assert_eq!(rec.events[0].kind, EventKind::LeftClick);
    }

    #[test]
    fn unknown_condition_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.safetensors");
        let mut w = StWriter::new();
        w.add_f32("rec_0", &[0.0; 4], &[1, 4]);
        w.set_metadata("recordings", r#"[{"subject": 1, "condition": "closed", "sample_rate": 4.0}]"#);
        w.write(&path).unwrap();
        assert!(load_experiment(&path).is_err());
    }

    #[test]
    fn metadata_epoch_dur_cuts_continuous_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.safetensors");
        let values: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let mut w = StWriter::new();
        w.add_f32("rec_0", &values, &[1, 10]);
        w.set_metadata(
            "recordings",
            r#"[{"subject": 2, "condition": "2", "sample_rate": 4.0, "epoch_dur": 1.0}]"#,
        );
        w.write(&path).unwrap();

        let exp = load_experiment(&path).unwrap();
        let rec = &exp.subjects[0].recordings[0];
        assert_eq!(rec.data().shape(), &[1, 4, 2]);
        assert_eq!(rec.data()[[0, 0, 1]], 4.0);
    }

    #[test]
    fn huge_data_offset_is_format_error() {
        let entry = serde_json::json!({
            "dtype": "F32",
            "shape": [1],
            "data_offsets": [u64::MAX, u64::MAX],
        });
        assert!(matches!(read_f32_tensor(&[0u8; 16], 8, &entry), Err(Error::Format(_))));
    }

    #[test]
    fn truncated_file_is_format_error() {
        assert!(matches!(parse_header(&[1, 2, 3]), Err(Error::Format(_))));
        let mut bytes = 100u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        assert!(matches!(parse_header(&bytes), Err(Error::Format(_))));
    }
}
