//! Tessel Core Runtime
//!
//! This crate provides the foundational primitives shared by Tessel components:
//!
//! - **State Handles**: Cheap-to-clone shared values with versioning and a rebuild flag
//! - **Event Surface**: The global scroll/resize surface components subscribe to,
//!   with capture/bubble phases and RAII subscriptions
//!
//! # Example
//!
//! ```rust
//! use tessel_core::events::{EventSurface, EventType, Phase, SurfaceEvent, EventTarget};
//! use tessel_core::state::State;
//!
//! let surface = EventSurface::new();
//! let scrolls = State::new(0u32);
//!
//! let counter = scrolls.clone();
//! let subscription = surface.subscribe(EventType::Scroll, Phase::Capture, move |_| {
//!     counter.update(|n| n + 1);
//! });
//!
//! surface.dispatch(&SurfaceEvent::scroll(EventTarget::Element(7)));
//! assert_eq!(scrolls.get(), 1);
//!
//! drop(subscription);
//! assert_eq!(surface.listener_count(), 0);
//! ```

pub mod events;
pub mod state;

pub use events::{
    EventSurface, EventTarget, EventType, ListenerCallback, ListenerId, Phase, Subscription,
    SurfaceEvent,
};
pub use state::{DirtyFlag, State};
