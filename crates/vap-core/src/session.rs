//! Session documents produced by the model backend
//!
//! One JSON document per recording holds the voice activity regions, the
//! per-frame turn-taking probabilities for both speakers and the ranked top-k
//! projection-window candidates for every time step.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::series::Series;

/// Errors that can occur while loading a session document
#[derive(Debug, Error)]
pub enum SessionError {
    /// IO error reading the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid session JSON
    #[error("Invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `topk` and `topk_p` have a different number of time steps
    #[error("topk has {labels} time steps but topk_p has {probabilities}")]
    MismatchedTopk { labels: usize, probabilities: usize },

    /// A single time step has different label and probability counts
    #[error("Time step {index}: {labels} labels but {probabilities} probabilities")]
    MismatchedSnapshot {
        index: usize,
        labels: usize,
        probabilities: usize,
    },
}

/// Ranked candidates for one time step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedSnapshot {
    /// Candidate class indices, best first
    pub labels: Vec<u32>,
    /// Probability of each candidate
    pub probabilities: Vec<f32>,
}

impl RankedSnapshot {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First `n` candidates
    pub fn truncated(&self, n: usize) -> RankedSnapshot {
        RankedSnapshot {
            labels: self.labels.iter().take(n).copied().collect(),
            probabilities: self.probabilities.iter().take(n).copied().collect(),
        }
    }

    /// (label, probability) pairs, best first
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.labels.iter().copied().zip(self.probabilities.iter().copied())
    }
}

/// Voice activity interval in seconds
pub type Region = [f64; 2];

/// Names of the probability tracks a session can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Probability that speaker A holds the turn now
    NowA,
    /// Probability that speaker B holds the turn now
    NowB,
    /// Probability that speaker A holds the turn in the projection window
    FutureA,
    /// Probability that speaker B holds the turn in the projection window
    FutureB,
    /// Backchannel probability, speaker A
    BackchannelA,
    /// Backchannel probability, speaker B
    BackchannelB,
    /// Entropy of the projection distribution
    Entropy,
}

impl TrackKind {
    pub const ALL: [TrackKind; 7] = [
        TrackKind::NowA,
        TrackKind::NowB,
        TrackKind::FutureA,
        TrackKind::FutureB,
        TrackKind::BackchannelA,
        TrackKind::BackchannelB,
        TrackKind::Entropy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackKind::NowA => "P-now A",
            TrackKind::NowB => "P-now B",
            TrackKind::FutureA => "P-future A",
            TrackKind::FutureB => "P-future B",
            TrackKind::BackchannelA => "BC A",
            TrackKind::BackchannelB => "BC B",
            TrackKind::Entropy => "H",
        }
    }
}

/// Precomputed model output for one recording
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// Voice activity regions per audio channel
    #[serde(default, alias = "vad_list")]
    pub waveform_regions: Vec<Vec<Region>>,
    #[serde(default, alias = "p_now_a")]
    pub probability_series_now_a: Vec<f32>,
    #[serde(default, alias = "p_now_b")]
    pub probability_series_now_b: Vec<f32>,
    #[serde(default, alias = "p_future_a")]
    pub probability_series_future_a: Vec<f32>,
    #[serde(default, alias = "p_future_b")]
    pub probability_series_future_b: Vec<f32>,
    #[serde(default, alias = "p_bc_a", skip_serializing_if = "Option::is_none")]
    pub probability_series_bc_a: Option<Vec<f32>>,
    #[serde(default, alias = "p_bc_b", skip_serializing_if = "Option::is_none")]
    pub probability_series_bc_b: Option<Vec<f32>>,
    #[serde(default, alias = "H", skip_serializing_if = "Option::is_none")]
    pub entropy: Option<Vec<f32>>,
    /// Top-k candidate labels per time step
    #[serde(default)]
    pub topk: Vec<Vec<u32>>,
    /// Top-k candidate probabilities per time step
    #[serde(default)]
    pub topk_p: Vec<Vec<f32>>,
}

impl SessionData {
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SessionError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a session document from disk
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        log::info!("SessionData::load: Loading {:?}", path);
        let file = std::fs::File::open(path)?;
        let data = Self::from_reader(std::io::BufReader::new(file))?;
        log::info!(
            "SessionData::load: {} frames, {} top-k steps, {} region channels",
            data.probability_series_now_a.len(),
            data.topk.len(),
            data.waveform_regions.len()
        );
        Ok(data)
    }

    /// Raw samples for a track, if the session provides it
    pub fn samples(&self, kind: TrackKind) -> Option<&[f32]> {
        let samples = match kind {
            TrackKind::NowA => &self.probability_series_now_a,
            TrackKind::NowB => &self.probability_series_now_b,
            TrackKind::FutureA => &self.probability_series_future_a,
            TrackKind::FutureB => &self.probability_series_future_b,
            TrackKind::BackchannelA => self.probability_series_bc_a.as_ref()?,
            TrackKind::BackchannelB => self.probability_series_bc_b.as_ref()?,
            TrackKind::Entropy => self.entropy.as_ref()?,
        };
        (!samples.is_empty()).then_some(samples.as_slice())
    }

    /// Every provided track as a series spanning `duration_secs`
    pub fn tracks(&self, duration_secs: f64) -> Vec<(TrackKind, Series)> {
        TrackKind::ALL
            .iter()
            .filter_map(|&kind| {
                self.samples(kind)
                    .map(|samples| (kind, Series::fitted(samples.to_vec(), duration_secs)))
            })
            .collect()
    }

    /// Zip `topk`/`topk_p` into one snapshot per time step
    pub fn snapshots(&self) -> Result<Vec<RankedSnapshot>, SessionError> {
        if self.topk.len() != self.topk_p.len() {
            return Err(SessionError::MismatchedTopk {
                labels: self.topk.len(),
                probabilities: self.topk_p.len(),
            });
        }

        self.topk
            .iter()
            .zip(&self.topk_p)
            .enumerate()
            .map(|(index, (labels, probabilities))| {
                if labels.len() != probabilities.len() {
                    return Err(SessionError::MismatchedSnapshot {
                        index,
                        labels: labels.len(),
                        probabilities: probabilities.len(),
                    });
                }
                Ok(RankedSnapshot {
                    labels: labels.clone(),
                    probabilities: probabilities.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_JSON: &str = r#"{
        "waveform_regions": [[[0.0, 1.5], [2.0, 3.0]], [[1.0, 2.5]]],
        "probability_series_now_a": [0.1, 0.6, 0.9, 0.2],
        "probability_series_now_b": [0.9, 0.4, 0.1, 0.8],
        "probability_series_future_a": [0.2, 0.5, 0.7, 0.3],
        "probability_series_future_b": [0.8, 0.5, 0.3, 0.7],
        "topk": [[3, 7], [7, 3]],
        "topk_p": [[0.6, 0.3], [0.5, 0.4]]
    }"#;

    #[test]
    fn test_parse_session_document() {
        let data = SessionData::from_json_str(SESSION_JSON).unwrap();
        assert_eq!(data.waveform_regions.len(), 2);
        assert_eq!(data.waveform_regions[0][1], [2.0, 3.0]);
        assert_eq!(data.probability_series_now_a, vec![0.1, 0.6, 0.9, 0.2]);
        assert!(data.entropy.is_none());
    }

    #[test]
    fn test_parse_short_field_names() {
        let json = r#"{"vad_list": [[[0.0, 1.0]]], "p_now_a": [0.5], "p_bc_a": [0.1], "H": [2.0]}"#;
        let data = SessionData::from_json_str(json).unwrap();
        assert_eq!(data.waveform_regions, vec![vec![[0.0, 1.0]]]);
        assert_eq!(data.samples(TrackKind::NowA), Some(&[0.5][..]));
        assert_eq!(data.samples(TrackKind::BackchannelA), Some(&[0.1][..]));
        assert_eq!(data.samples(TrackKind::Entropy), Some(&[2.0][..]));
        assert_eq!(data.samples(TrackKind::NowB), None, "empty series is not a track");
    }

    #[test]
    fn test_tracks_fit_duration() {
        let data = SessionData::from_json_str(SESSION_JSON).unwrap();
        let tracks = data.tracks(4.0);
        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks[0].0, TrackKind::NowA);
        assert!((tracks[0].1.duration_secs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshots_zip_topk() {
        let data = SessionData::from_json_str(SESSION_JSON).unwrap();
        let snapshots = data.snapshots().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].labels, vec![7, 3]);
        assert_eq!(snapshots[1].truncated(1).probabilities, vec![0.5]);
    }

    #[test]
    fn test_snapshots_reject_mismatch() {
        let mut data = SessionData::from_json_str(SESSION_JSON).unwrap();
        data.topk_p.pop();
        assert!(matches!(
            data.snapshots(),
            Err(SessionError::MismatchedTopk { labels: 2, probabilities: 1 })
        ));

        let mut data = SessionData::from_json_str(SESSION_JSON).unwrap();
        data.topk_p[1].pop();
        assert!(matches!(
            data.snapshots(),
            Err(SessionError::MismatchedSnapshot { index: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_1.json");
        std::fs::write(&path, SESSION_JSON).unwrap();
        let data = SessionData::load(&path).unwrap();
        assert_eq!(data.topk.len(), 2);

        assert!(matches!(
            SessionData::load(&dir.path().join("missing.json")),
            Err(SessionError::Io(_))
        ));
    }
}
