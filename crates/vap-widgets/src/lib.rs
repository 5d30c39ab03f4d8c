//! VAP Widgets - iced UI components for the turn-taking timeline
//!
//! Canvas programs, view functions and subscription helpers that put a
//! [`vap_core::RenderCoordinator`] on screen.
//!
//! ## Architecture (iced 0.14 patterns)
//!
//! - **State** ([`TimelineState`]): captured from the coordinator after each
//!   update, borrowed by views
//! - **View functions**: take state + callback closures, return `Element`
//! - **Canvas Programs**: core renderers drawn into an iced `Frame` through
//!   [`FrameSurface`]
//! - **Subscriptions**: engine notifications from a channel, plus a periodic
//!   tick for debounced work

pub mod color;
pub mod subscription;
pub mod surface;
pub mod timeline;

pub use color::to_iced;
pub use subscription::{engine_events, engine_events_owned, scheduler_ticks};
pub use surface::FrameSurface;
pub use timeline::{
    apply_gesture, timeline_overview, timeline_track, timeline_view, OverviewGesture, TimelineState,
};
