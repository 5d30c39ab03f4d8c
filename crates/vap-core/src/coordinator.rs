//! Render coordination
//!
//! `RenderCoordinator` subscribes to the playback event bus and keeps the
//! viewport, overview indicator, snapshot selector and per-track rasters in
//! step with playback and user interaction.
//!
//! | Event | Effect |
//! |-------|--------|
//! | ready / zoom / redraw | geometry update, full repaint of every track |
//! | loading-progress < 100 | tracks blanked once until ready |
//! | time-update / seek | cursor and selector only; rasters refilled only when the view leaves the cached window |
//! | scroll | viewport position, exactly one indicator update |
//! | resize | coalesced; applied on `tick` once quiet, only if the width changed |
//!
//! Teardown order matters: bus subscriptions are dropped before the state
//! they point at, and handlers hold only weak references to it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{DisplayConfig, Theme, VisualizerConfig};
use crate::error::{VizError, VizResult};
use crate::events::{Channel, Clock, Debouncer, EventBus, PassId, PlaybackEvent, SubscriptionHandle};
use crate::overview::{OverviewController, OverviewIndicator, ReleaseOutcome};
use crate::render::{BarLayout, PixelBuffer, RegionOverlay, SeriesRenderer, TrackRenderer};
use crate::render::Surface;
use crate::selector::SnapshotSelector;
use crate::series::Series;
use crate::session::{RankedSnapshot, Region, SessionData, SessionError, TrackKind};
use crate::time_axis::TimeAxis;
use crate::viewport::{Viewport, ViewportChange, ViewportController, ViewportMode};

/// Playback engine as seen by the coordinator
///
/// Implementations typically post notifications to the same [`EventBus`]
/// the coordinator listens on.
pub trait PlaybackEngine {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn seek_to_fraction(&self, fraction: f64);
    fn play(&self);
    fn pause(&self);
    fn is_playing(&self) -> bool;
}

// =============================================================================
// Track state
// =============================================================================

/// One attached track and its cached rasters
#[derive(Debug, Clone)]
struct TrackState {
    kind: TrackKind,
    series: Series,
    renderer: TrackRenderer,
    played: TrackRenderer,
    /// Unplayed colors
    raster: Arc<PixelBuffer>,
    /// Same window in the played colors
    progress: Arc<PixelBuffer>,
    /// Cached window in content pixels (start inclusive, end exclusive)
    cache_start: u32,
    cache_end: u32,
    /// Raster matches current geometry and data
    valid: bool,
    /// Bumped on every raster fill
    revision: u64,
}

impl TrackState {
    fn new(kind: TrackKind, series: Series, theme: &Theme) -> Self {
        Self {
            kind,
            series,
            renderer: TrackRenderer::for_track(kind, theme),
            played: TrackRenderer::for_track(kind, theme).played(theme),
            raster: Arc::new(PixelBuffer::new(0, 0)),
            progress: Arc::new(PixelBuffer::new(0, 0)),
            cache_start: 0,
            cache_end: 0,
            valid: false,
            revision: 0,
        }
    }

    fn covers(&self, start: u32, end: u32) -> bool {
        self.valid && start >= self.cache_start && end <= self.cache_end
    }

    fn snapshot_raster(&self) -> TrackRaster {
        TrackRaster {
            pixels: self.raster.clone(),
            progress: self.progress.clone(),
            start: self.cache_start,
            end: self.cache_end,
        }
    }
}

/// Cached pixels of one track, shared with views without copying
#[derive(Debug, Clone)]
pub struct TrackRaster {
    pub pixels: Arc<PixelBuffer>,
    /// Played colors, same geometry as `pixels`
    pub progress: Arc<PixelBuffer>,
    /// Content pixel of raster column 0
    pub start: u32,
    pub end: u32,
}

impl TrackRaster {
    /// Raster column showing content pixel `start`, if `start..end` is cached
    pub fn column_of(&self, start: u32, end: u32) -> Option<u32> {
        (start < end && start >= self.start && end <= self.end && end - self.start <= self.pixels.width())
            .then(|| start - self.start)
    }
}

/// What a view needs to draw one track
#[derive(Debug, Clone)]
pub struct TrackFrame {
    pub kind: TrackKind,
    /// Samples for whole-timeline thumbnails; the placeholder while loading
    pub series: Series,
    pub renderer: TrackRenderer,
    pub raster: TrackRaster,
    /// Raster fill counter, changes whenever cached pixels change
    pub revision: u64,
}

// =============================================================================
// Timeline state
// =============================================================================

/// Everything the coordinator mutates, behind one `RefCell`
struct TimelineState {
    display: DisplayConfig,
    theme: Theme,
    viewport: ViewportController,
    overview: OverviewController,
    selector: SnapshotSelector,
    tracks: Vec<TrackState>,
    regions: Vec<Vec<Region>>,
    overlay: RegionOverlay,
    resize: Debouncer<u32>,
    ready: bool,
    /// Audio still loading; tracks show the placeholder
    loading: bool,
    /// Placeholder already drawn for the current load
    blanked: bool,
    /// Tracks whose last repaint failed
    failures: Vec<(TrackKind, VizError)>,
}

impl TimelineState {
    // =========================================================================
    // Event handlers
    // =========================================================================

    fn handle(&mut self, event: &PlaybackEvent, pass: PassId, clock: &dyn Clock) {
        match *event {
            PlaybackEvent::Ready { duration_secs } => self.on_ready(duration_secs),
            PlaybackEvent::LoadingProgress { percent } => self.on_loading(percent),
            PlaybackEvent::Zoom { pixels_per_second } => self.on_zoom(pixels_per_second),
            PlaybackEvent::Redraw => self.repaint_all(),
            PlaybackEvent::Scroll { start_px } => self.on_scroll(start_px, pass),
            PlaybackEvent::TimeUpdate { time_secs } => self.on_time_update(time_secs, pass),
            PlaybackEvent::Seek { fraction } => {
                let time = fraction.clamp(0.0, 1.0) * self.viewport.duration_secs();
                self.on_time_update(time, pass);
            }
            PlaybackEvent::Resize { width_px } => self.resize.signal(clock.now(), width_px),
            PlaybackEvent::Play | PlaybackEvent::Pause => {}
        }
    }

    fn on_ready(&mut self, duration_secs: f64) {
        log::info!("RenderCoordinator: ready, duration {:.2}s", duration_secs);
        self.ready = true;
        self.loading = false;
        self.blanked = false;
        self.viewport.set_duration(duration_secs);
        let duration = self.viewport.duration_secs();
        if duration > 0.0 {
            for track in &mut self.tracks {
                track.series = track.series.refit(duration);
            }
        }
        self.overview.relayout(self.viewport.viewport());
        self.repaint_all();
    }

    fn on_loading(&mut self, percent: u8) {
        if percent >= 100 {
            if self.loading {
                self.loading = false;
                self.blanked = false;
                self.repaint_all();
            }
            return;
        }
        self.loading = true;
        if !self.blanked {
            self.blank_all();
            self.blanked = true;
        }
    }

    fn on_zoom(&mut self, pixels_per_second: f64) {
        match self.viewport.set_zoom(pixels_per_second) {
            Ok(_) => {
                log::debug!("RenderCoordinator: zoom {} px/s", pixels_per_second);
                self.overview.relayout(self.viewport.viewport());
                self.repaint_all();
            }
            Err(e) => log::warn!("RenderCoordinator: zoom rejected: {}", e),
        }
    }

    fn on_scroll(&mut self, start_px: u32, pass: PassId) {
        self.viewport.on_user_scroll(start_px, pass);
        self.overview.sync_from_main(self.viewport.viewport());
        self.refill_if_needed();
    }

    fn on_time_update(&mut self, time_secs: f64, pass: PassId) {
        let change = self.viewport.on_time_update(time_secs, pass);
        self.selector.update(time_secs, self.viewport.duration_secs());
        self.follow_scroll(change);
    }

    fn follow_scroll(&mut self, change: ViewportChange) {
        if change.scrolled {
            self.overview.sync_from_main(self.viewport.viewport());
            self.refill_if_needed();
        }
    }

    /// Apply a settled resize. Returns true if the width changed.
    fn apply_resize(&mut self, width_px: u32) -> bool {
        let change = self.viewport.resize(width_px);
        if !change.geometry {
            log::trace!("RenderCoordinator: resize to {} px is a no-op", width_px);
            return false;
        }
        log::debug!("RenderCoordinator: resized to {} px", width_px);
        self.overview.relayout(self.viewport.viewport());
        if self.loading {
            self.blank_all();
        } else {
            self.repaint_all();
        }
        true
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Cached window around the visible range, `None` when nothing is drawable
    fn cache_window(&self) -> Option<(u32, u32)> {
        let view = self.viewport.viewport();
        let total = view.total_width_px;
        let width = self
            .display
            .max_canvas_width
            .max(view.visible_width_px)
            .min(total);
        if width == 0 {
            return None;
        }
        let margin = (width - view.visible_width_px.min(width)) / 2;
        let start = view
            .visible_start_px
            .saturating_sub(margin)
            .min(total - width);
        Some((start, start + width))
    }

    fn repaint_all(&mut self) {
        for track in &mut self.tracks {
            track.valid = false;
        }
        if !self.ready || self.loading {
            log::trace!("RenderCoordinator: repaint deferred until ready");
            return;
        }
        self.refill_if_needed();
    }

    /// Refill tracks whose raster no longer covers the visible range
    fn refill_if_needed(&mut self) {
        if !self.ready || self.loading {
            return;
        }
        let view = *self.viewport.viewport();
        let Some(window) = self.cache_window() else {
            return;
        };

        let Self {
            tracks,
            regions,
            overlay,
            display,
            viewport,
            failures,
            ..
        } = self;
        failures.clear();
        for track in tracks.iter_mut() {
            if track.covers(view.visible_start_px, view.visible_end_px()) {
                continue;
            }
            let result = fill_track(
                track,
                view.total_width_px,
                window,
                display.track_height,
                |layout, raster| overlay.render(regions, viewport.duration_secs(), layout, raster),
            );
            if let Err(e) = result {
                log::warn!("RenderCoordinator: repaint of {} failed: {}", track.kind.name(), e);
                failures.push((track.kind, e));
            }
        }
    }

    /// Draw the placeholder into every track, covering the visible range
    fn blank_all(&mut self) {
        let width = self.viewport.view_width_px();
        let start = self.viewport.viewport().visible_start_px;
        let height = self.display.track_height;
        self.failures.clear();
        for track in &mut self.tracks {
            track.valid = false;
            let placeholder = Series::flat(track.renderer.placeholder_value());
            let result = BarLayout::full(width).and_then(|layout| {
                let raster = Arc::make_mut(&mut track.raster);
                raster.resize(width, height);
                track.renderer.render(&placeholder, &layout, raster)?;
                let progress = Arc::make_mut(&mut track.progress);
                progress.resize(width, height);
                track.played.render(&placeholder, &layout, progress)
            });
            track.cache_start = start;
            track.cache_end = start + width;
            track.revision += 1;
            if let Err(e) = result {
                log::warn!("RenderCoordinator: blanking {} failed: {}", track.kind.name(), e);
                self.failures.push((track.kind, e));
            }
        }
        log::debug!("RenderCoordinator: blanked {} track(s) while loading", self.tracks.len());
    }
}

fn fill_track<F>(
    track: &mut TrackState,
    total_width: u32,
    (start, end): (u32, u32),
    height: u32,
    overlay: F,
) -> VizResult<()>
where
    F: Fn(&BarLayout, &mut PixelBuffer),
{
    let layout = BarLayout::new(total_width, start, end)?;
    for (renderer, raster) in [
        (&track.renderer, &mut track.raster),
        (&track.played, &mut track.progress),
    ] {
        let raster = Arc::make_mut(raster);
        raster.resize(layout.window_width(), height);
        renderer.render(&track.series, &layout, raster)?;
        overlay(&layout, raster);
    }
    track.cache_start = start;
    track.cache_end = end;
    track.valid = true;
    track.revision += 1;
    log::trace!(
        "RenderCoordinator: {} raster {}..{} (rev {})",
        track.kind.name(),
        start,
        end,
        track.revision
    );
    Ok(())
}

// =============================================================================
// Coordinator
// =============================================================================

/// Keeps every view of the timeline consistent with playback
pub struct RenderCoordinator {
    // Dropped first: no notification can reach the state after this goes
    subscriptions: Vec<SubscriptionHandle>,
    state: Rc<RefCell<TimelineState>>,
    engine: Rc<dyn PlaybackEngine>,
    bus: EventBus,
    clock: Rc<dyn Clock>,
}

impl RenderCoordinator {
    /// Build the timeline state and subscribe to `bus`
    pub fn new(
        config: &VisualizerConfig,
        view_width_px: u32,
        overview_width_px: f64,
        engine: Rc<dyn PlaybackEngine>,
        bus: &EventBus,
        clock: Rc<dyn Clock>,
    ) -> VizResult<Self> {
        let display = config.display.clone();
        let axis = TimeAxis::new(display.pixels_per_second, display.device_pixel_ratio)?;
        let viewport = ViewportController::new(axis, view_width_px, display.auto_center);
        let mut overview = OverviewController::new(overview_width_px)?;
        overview.relayout(viewport.viewport());

        let state = Rc::new(RefCell::new(TimelineState {
            resize: Debouncer::new(Duration::from_millis(display.resize_debounce_ms)),
            display,
            theme: config.theme.clone(),
            viewport,
            overview,
            selector: SnapshotSelector::new(Vec::new(), config.topk.visible),
            tracks: Vec::new(),
            regions: Vec::new(),
            overlay: RegionOverlay::new(config.theme.clone()),
            ready: false,
            loading: false,
            blanked: false,
            failures: Vec::new(),
        }));

        let subscriptions = [
            Channel::Ready,
            Channel::Seek,
            Channel::Scroll,
            Channel::Zoom,
            Channel::Redraw,
            Channel::Resize,
            Channel::TimeUpdate,
            Channel::LoadingProgress,
        ]
        .into_iter()
        .map(|channel| {
            let weak: Weak<RefCell<TimelineState>> = Rc::downgrade(&state);
            let clock = clock.clone();
            bus.subscribe(channel, move |event, pass| {
                let Some(state) = weak.upgrade() else {
                    log::debug!("RenderCoordinator: {:?} after teardown ignored", event.channel());
                    return;
                };
                match state.try_borrow_mut() {
                    Ok(mut state) => state.handle(event, pass, clock.as_ref()),
                    Err(_) => log::warn!("RenderCoordinator: state busy, dropping {:?}", event),
                };
            })
        })
        .collect();

        log::info!(
            "RenderCoordinator: attached ({} px view, {} px overview)",
            view_width_px,
            overview_width_px
        );

        Ok(Self {
            subscriptions,
            state,
            engine,
            bus: bus.clone(),
            clock,
        })
    }

    // =========================================================================
    // Session data
    // =========================================================================

    /// Replace all tracks, regions and snapshots with a new session
    pub fn load_session(&self, data: &SessionData) -> Result<(), SessionError> {
        let snapshots = data.snapshots()?;
        let mut state = self.state.borrow_mut();
        let duration = state.viewport.duration_secs();
        let frame_rate = state.display.frame_rate;

        let tracks: Vec<TrackState> = TrackKind::ALL
            .iter()
            .filter_map(|&kind| data.samples(kind).map(|samples| (kind, samples.to_vec())))
            .map(|(kind, samples)| {
                let series = if duration > 0.0 {
                    Series::fitted(samples, duration)
                } else {
                    Series::new(samples, frame_rate)
                };
                TrackState::new(kind, series, &state.theme)
            })
            .collect();

        log::info!(
            "RenderCoordinator: session loaded, {} track(s), {} snapshot(s)",
            tracks.len(),
            snapshots.len()
        );
        state.tracks = tracks;
        state.regions = data.waveform_regions.clone();
        state.selector.set_snapshots(snapshots);
        let time = state.viewport.current_time_secs();
        state.selector.update(time, duration);
        if state.loading {
            state.blanked = false;
            state.on_loading(0);
        } else {
            state.repaint_all();
        }
        Ok(())
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Apply a settled resize, if any. Call on every UI tick.
    ///
    /// Returns true when geometry changed.
    pub fn tick(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        match state.resize.poll(now) {
            Some(width) => state.apply_resize(width),
            None => false,
        }
    }

    pub fn resize_pending(&self) -> bool {
        self.state.borrow().resize.is_pending()
    }

    /// The overview strip changed width
    pub fn set_overview_width(&self, overview_width_px: f64) -> VizResult<()> {
        let mut state = self.state.borrow_mut();
        let TimelineState {
            overview, viewport, ..
        } = &mut *state;
        overview.resize(overview_width_px, viewport.viewport())
    }

    // =========================================================================
    // Overview gestures
    // =========================================================================

    /// Pointer pressed on the overview. Returns true if a drag started.
    pub fn overview_press(&self, x: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let dragging = state.overview.press(x);
        if dragging {
            state.viewport.begin_drag();
        }
        dragging
    }

    /// Pointer moved over the overview
    ///
    /// During a drag the main view follows the indicator directly. No scroll
    /// notification is emitted, so the indicator never hears its own echo.
    pub fn overview_drag(&self, x: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(start_px) = state.overview.drag_to(x) else {
            return false;
        };
        let change = state.viewport.apply_drag(start_px);
        if change.scrolled {
            state.refill_if_needed();
        }
        change.scrolled
    }

    /// Pointer released over the overview
    pub fn overview_release(&self, x: f64) -> ReleaseOutcome {
        let outcome = {
            let mut state = self.state.borrow_mut();
            let outcome = state.overview.release(x);
            state.viewport.end_drag();
            outcome
        };
        if let ReleaseOutcome::Seek(fraction) = outcome {
            self.seek_and_center(fraction);
        }
        outcome
    }

    /// Pointer left the overview during a gesture
    pub fn overview_cancel(&self) {
        let mut state = self.state.borrow_mut();
        if state.overview.cancel_drag() {
            log::debug!("RenderCoordinator: overview drag cancelled");
        }
        state.viewport.end_drag();
        let TimelineState {
            overview, viewport, ..
        } = &mut *state;
        overview.sync_from_main(viewport.viewport());
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Seek to a fraction of the recording and center the view on it
    pub fn seek_and_center(&self, fraction: f64) {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        {
            let mut state = self.state.borrow_mut();
            let (time, change) = state.viewport.seek_and_center(fraction);
            let duration = state.viewport.duration_secs();
            state.selector.update(time, duration);
            state.follow_scroll(change);
        }
        // The engine may notify synchronously; state must not be borrowed here
        self.engine.seek_to_fraction(fraction);
    }

    pub fn toggle_play(&self) {
        if self.engine.is_playing() {
            self.engine.pause();
        } else {
            self.engine.play();
        }
    }

    /// Number of ranked candidates exposed (0 hides them)
    pub fn set_topk_visible(&self, visible: usize) {
        self.state.borrow_mut().selector.set_visible(visible);
    }

    pub fn set_auto_center(&self, auto_center: bool) {
        self.state.borrow_mut().viewport.set_auto_center(auto_center);
    }

    // =========================================================================
    // Read access for views
    // =========================================================================

    pub fn viewport(&self) -> Viewport {
        *self.state.borrow().viewport.viewport()
    }

    pub fn viewport_mode(&self) -> ViewportMode {
        self.state.borrow().viewport.mode()
    }

    pub fn is_scrollable(&self) -> bool {
        self.state.borrow().viewport.is_scrollable()
    }

    pub fn indicator(&self) -> OverviewIndicator {
        *self.state.borrow().overview.indicator()
    }

    pub fn overview_ratio(&self) -> f64 {
        self.state.borrow().overview.ratio()
    }

    pub fn overview_width(&self) -> f64 {
        self.state.borrow().overview.overview_width()
    }

    /// Indicator moves caused by the main view so far
    pub fn indicator_sync_count(&self) -> u64 {
        self.state.borrow().overview.sync_count()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.borrow().overview.is_dragging()
    }

    pub fn current_snapshot(&self) -> Option<RankedSnapshot> {
        self.state.borrow().selector.current()
    }

    pub fn current_snapshot_index(&self) -> usize {
        self.state.borrow().selector.current_index()
    }

    pub fn topk_visible(&self) -> usize {
        self.state.borrow().selector.visible()
    }

    pub fn duration_secs(&self) -> f64 {
        self.state.borrow().viewport.duration_secs()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn track_kinds(&self) -> Vec<TrackKind> {
        self.state.borrow().tracks.iter().map(|t| t.kind).collect()
    }

    pub fn regions(&self) -> Vec<Vec<Region>> {
        self.state.borrow().regions.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme.clone()
    }

    pub fn display(&self) -> DisplayConfig {
        self.state.borrow().display.clone()
    }

    /// Drawing inputs for every track
    pub fn track_frames(&self) -> Vec<TrackFrame> {
        let state = self.state.borrow();
        state
            .tracks
            .iter()
            .map(|track| TrackFrame {
                kind: track.kind,
                series: if state.loading {
                    Series::flat(track.renderer.placeholder_value())
                } else {
                    track.series.clone()
                },
                renderer: track.renderer.clone(),
                raster: track.snapshot_raster(),
                revision: track.revision,
            })
            .collect()
    }

    /// Cached raster of one track with its window in content pixels
    pub fn track_raster(&self, kind: TrackKind) -> Option<(PixelBuffer, u32, u32)> {
        let state = self.state.borrow();
        state
            .tracks
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| (t.raster.as_ref().clone(), t.cache_start, t.cache_end))
    }

    pub fn track_revision(&self, kind: TrackKind) -> Option<u64> {
        self.state
            .borrow()
            .tracks
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.revision)
    }

    /// Tracks whose most recent repaint failed
    pub fn repaint_failures(&self) -> Vec<(TrackKind, VizError)> {
        self.state.borrow().failures.clone()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Unsubscribe from the bus, then release the rendering state
    pub fn teardown(mut self) {
        let count = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        log::info!("RenderCoordinator: detached {} subscription(s)", count);
    }
}
