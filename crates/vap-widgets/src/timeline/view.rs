//! Timeline view functions
//!
//! Plain functions that take a [`TimelineState`] and callback closures and
//! return Elements.
//!
//! ## Usage
//!
//! ```ignore
//! fn view(&self) -> Element<Message> {
//!     timeline_view(
//!         &self.timeline,
//!         Message::Scroll,
//!         Message::Overview,
//!     )
//! }
//! ```

use super::canvas::{OverviewCanvas, OverviewGesture, TrackCanvas};
use super::state::TimelineState;
use iced::widget::{Canvas, Column, Space};
use iced::{Element, Length};
use vap_core::TrackKind;

/// Gap between stacked tracks
const TRACK_SPACING: f32 = 2.0;

/// Create one track of the main view with wheel scrolling
///
/// Renders an empty strip of the track height when the session has no such
/// track yet.
///
/// # Example
///
/// ```ignore
/// let now_a = timeline_track(&self.timeline, TrackKind::NowA, Message::Scroll);
/// ```
pub fn timeline_track<'a, Message>(
    state: &'a TimelineState,
    kind: TrackKind,
    on_scroll: impl Fn(u32) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let height = Length::Fixed(state.display.track_height as f32);
    let Some(track) = state.track(kind) else {
        return Space::new().width(Length::Fill).height(height).into();
    };
    Canvas::new(TrackCanvas {
        track,
        viewport: state.viewport,
        scrollable: state.scrollable,
        theme: &state.theme,
        on_scroll,
    })
    .width(Length::Fill)
    .height(height)
    .into()
}

/// Create the overview strip with indicator drag and click-to-seek
///
/// Gestures arrive in overview controller pixels; pass them to
/// [`apply_gesture`](super::apply_gesture).
pub fn timeline_overview<'a, Message>(
    state: &'a TimelineState,
    on_gesture: impl Fn(OverviewGesture) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    Canvas::new(OverviewCanvas {
        track: state.overview_track(),
        indicator: state.indicator,
        overview_width: state.overview_width,
        progress: state.progress(),
        theme: &state.theme,
        on_gesture,
    })
    .width(Length::Fill)
    .height(Length::Fixed(state.display.overview_height as f32))
    .into()
}

/// Every loaded track stacked above the overview
pub fn timeline_view<'a, Message>(
    state: &'a TimelineState,
    on_scroll: impl Fn(u32) -> Message + Clone + 'a,
    on_gesture: impl Fn(OverviewGesture) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let tracks = state
        .tracks
        .iter()
        .map(|track| timeline_track(state, track.kind, on_scroll.clone()));

    Column::with_children(tracks)
        .push(timeline_overview(state, on_gesture))
        .spacing(TRACK_SPACING)
        .width(Length::Fill)
        .into()
}
