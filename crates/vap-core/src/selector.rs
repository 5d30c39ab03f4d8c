//! Current ranked-candidate lookup
//!
//! Snapshots are evenly spaced over the recording, so the one shown for a
//! playback position is found by index arithmetic alone. There is no
//! interpolation: the nearest snapshot is shown as-is.

use crate::session::RankedSnapshot;

/// Index of the snapshot for `time_secs` in a list of `len` snapshots
///
/// `round(time / duration * len)` clamped to the last index. Zero time,
/// non-positive duration and non-finite input all select index 0.
pub fn select_index(time_secs: f64, duration_secs: f64, len: usize) -> usize {
    if len == 0 || !(time_secs > 0.0) || !(duration_secs > 0.0) {
        return 0;
    }
    // Float to int casts saturate, so an infinite ratio lands on the last index
    let index = (time_secs / duration_secs * len as f64).round() as usize;
    index.min(len - 1)
}

/// Snapshot for `time_secs`, `None` only when the list is empty
pub fn select(time_secs: f64, duration_secs: f64, snapshots: &[RankedSnapshot]) -> Option<&RankedSnapshot> {
    snapshots.get(select_index(time_secs, duration_secs, snapshots.len()))
}

/// Tracks the selected snapshot as playback moves
#[derive(Debug, Clone, Default)]
pub struct SnapshotSelector {
    snapshots: Vec<RankedSnapshot>,
    /// Index of the selected snapshot
    current: usize,
    /// Number of candidates exposed for display
    visible: usize,
}

impl SnapshotSelector {
    pub fn new(snapshots: Vec<RankedSnapshot>, visible: usize) -> Self {
        Self {
            snapshots,
            current: 0,
            visible,
        }
    }

    /// Replace the snapshot list, selecting the first entry
    pub fn set_snapshots(&mut self, snapshots: Vec<RankedSnapshot>) {
        self.snapshots = snapshots;
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Reselect for a playback position. Returns true if the index changed.
    pub fn update(&mut self, time_secs: f64, duration_secs: f64) -> bool {
        let index = select_index(time_secs, duration_secs, self.snapshots.len());
        if index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Selected snapshot, cut to the visible candidate count
    ///
    /// `None` when there are no snapshots or the panel is hidden.
    pub fn current(&self) -> Option<RankedSnapshot> {
        if self.visible == 0 {
            return None;
        }
        self.snapshots
            .get(self.current)
            .map(|snapshot| snapshot.truncated(self.visible))
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible;
    }
}
