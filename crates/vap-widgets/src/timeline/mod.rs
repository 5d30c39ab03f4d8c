//! Timeline display components
//!
//! ## Architecture (iced 0.14 patterns)
//!
//! - **State struct** (`TimelineState`): pure data captured from the
//!   coordinator after each update
//! - **View functions** (`timeline_track`, `timeline_overview`,
//!   `timeline_view`): take state + callbacks, return `Element<Message>`
//! - **Canvas Programs**: custom drawing and event-to-callback translation
//!
//! The application owns the [`RenderCoordinator`]. Scroll callbacks become
//! `PlaybackEvent::Scroll` on the bus; overview gestures go through
//! [`apply_gesture`].

mod canvas;
mod state;
mod view;

pub use canvas::{
    raster_slices, scroll_target, to_overview_x, visible_layout, wheel_delta, OverviewCanvas, OverviewGesture,
    OverviewInteraction, RasterSlice, TrackCanvas, TrackInteraction, SCROLL_LINE_PX,
};
pub use state::{TimelineState, OVERVIEW_TRACK};
pub use view::{timeline_overview, timeline_track, timeline_view};

use vap_core::overview::ReleaseOutcome;
use vap_core::RenderCoordinator;

/// Forward an overview gesture to the coordinator
///
/// Returns the release outcome for `Release`, `None` otherwise.
pub fn apply_gesture(coordinator: &RenderCoordinator, gesture: OverviewGesture) -> Option<ReleaseOutcome> {
    match gesture {
        OverviewGesture::Press(x) => {
            coordinator.overview_press(x);
            None
        }
        OverviewGesture::Drag(x) => {
            coordinator.overview_drag(x);
            None
        }
        OverviewGesture::Release(x) => Some(coordinator.overview_release(x)),
        OverviewGesture::Cancel => {
            coordinator.overview_cancel();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use vap_core::config::VisualizerConfig;
    use vap_core::events::{EventBus, ManualClock, PlaybackEvent};
    use vap_core::{PlaybackEngine, SessionData, TrackKind};
    use vap_core::render::SeriesRenderer;

    struct StillEngine {
        bus: EventBus,
        duration: f64,
        seeks: Cell<usize>,
    }

    impl PlaybackEngine for StillEngine {
        fn current_time(&self) -> f64 {
            0.0
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn seek_to_fraction(&self, fraction: f64) {
            self.seeks.set(self.seeks.get() + 1);
            self.bus.emit(PlaybackEvent::Seek { fraction });
        }

        fn play(&self) {}

        fn pause(&self) {}

        fn is_playing(&self) -> bool {
            false
        }
    }

    /// 20 s at 100 px/s in a 400 px view, 400 px overview
    fn coordinator() -> (RenderCoordinator, Rc<StillEngine>) {
        let bus = EventBus::new();
        let engine = Rc::new(StillEngine {
            bus: bus.clone(),
            duration: 20.0,
            seeks: Cell::new(0),
        });
        let mut config = VisualizerConfig::default();
        config.display.pixels_per_second = 100.0;
        let coordinator =
            RenderCoordinator::new(&config, 400, 400.0, engine.clone(), &bus, Rc::new(ManualClock::new())).unwrap();

        let data = SessionData {
            probability_series_now_a: vec![0.2; 20],
            probability_series_now_b: vec![0.8; 20],
            topk: vec![vec![1, 2]; 20],
            topk_p: vec![vec![0.7, 0.3]; 20],
            ..SessionData::default()
        };
        coordinator.load_session(&data).unwrap();
        bus.emit(PlaybackEvent::Ready { duration_secs: 20.0 });
        (coordinator, engine)
    }

    #[test]
    fn test_capture_reflects_coordinator() {
        let (coordinator, _engine) = coordinator();
        let state = TimelineState::capture(&coordinator);

        assert_eq!(state.viewport.total_width_px, 2000);
        assert!(state.scrollable);
        assert_eq!(state.duration_secs, 20.0);
        assert_eq!(state.overview_width, 400.0);
        assert_eq!(state.indicator.width_px, 80.0);
        assert_eq!(state.overview_track().map(|t| t.kind), Some(TrackKind::NowA));
        assert!(state.snapshot.is_some());
    }

    #[test]
    fn test_loading_feeds_placeholder_to_canvases() {
        let (coordinator, _engine) = coordinator();
        coordinator.bus().emit(PlaybackEvent::LoadingProgress { percent: 10 });
        let state = TimelineState::capture(&coordinator);
        assert!(state.loading);

        let background = state.theme.background;
        for track in &state.tracks {
            let placeholder = track.renderer.placeholder_value();
            assert!(
                track.series.samples().iter().all(|&v| v == placeholder),
                "{} thumbnail shows live samples",
                track.kind.name()
            );
            let slices = raster_slices(&track.raster, &state.viewport);
            assert!(!slices.is_empty(), "blank raster covers the view");
            for slice in slices {
                let source = if slice.played { &track.raster.progress } else { &track.raster.pixels };
                assert!(
                    source
                        .rects(slice.src_start, slice.src_end)
                        .iter()
                        .all(|&(_, color)| color == background),
                    "{} draws bars while loading",
                    track.kind.name()
                );
            }
        }
    }

    #[test]
    fn test_track_canvas_reads_coordinator_raster() {
        let (coordinator, _engine) = coordinator();
        let state = TimelineState::capture(&coordinator);
        let track = state.track(TrackKind::NowA).unwrap();

        let slices = raster_slices(&track.raster, &state.viewport);
        let drawn: usize = slices
            .iter()
            .map(|s| s.src_end - s.src_start)
            .sum::<u32>() as usize;
        assert_eq!(drawn, 400, "whole view comes from the cache");

        let party_b = state.theme.bars.party_b;
        let unplayed = slices.iter().find(|s| !s.played).unwrap();
        assert!(track
            .raster
            .pixels
            .rects(unplayed.src_start, unplayed.src_end)
            .iter()
            .any(|&(_, color)| color == party_b));
    }

    #[test]
    fn test_drag_gesture_moves_main_view() {
        let (coordinator, engine) = coordinator();
        // Indicator spans 0..80; grab it in the middle and move 100 px right
        apply_gesture(&coordinator, OverviewGesture::Press(40.0));
        apply_gesture(&coordinator, OverviewGesture::Drag(140.0));
        let outcome = apply_gesture(&coordinator, OverviewGesture::Release(140.0));

        assert_eq!(outcome, Some(ReleaseOutcome::DragEnded));
        assert_eq!(coordinator.viewport().visible_start_px, 500);
        assert_eq!(engine.seeks.get(), 0);
    }

    #[test]
    fn test_click_gesture_seeks() {
        let (coordinator, engine) = coordinator();
        apply_gesture(&coordinator, OverviewGesture::Press(200.0));
        let outcome = apply_gesture(&coordinator, OverviewGesture::Release(200.0));

        assert!(matches!(outcome, Some(ReleaseOutcome::Seek(_))));
        assert_eq!(engine.seeks.get(), 1);
    }

    #[test]
    fn test_cancel_ends_drag() {
        let (coordinator, _engine) = coordinator();
        apply_gesture(&coordinator, OverviewGesture::Press(40.0));
        assert!(coordinator.is_dragging());
        apply_gesture(&coordinator, OverviewGesture::Cancel);
        assert!(!coordinator.is_dragging());
    }
}
