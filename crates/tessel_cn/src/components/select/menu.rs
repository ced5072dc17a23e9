//! Menu lifecycle for the select dropdown
//!
//! The dropdown menu is rendered in a detached overlay layer, so it does not
//! follow its trigger when a surrounding container scrolls. The
//! [`MenuPositionController`] listens to the global [`EventSurface`] and asks
//! the host to recompute the menu position while the menu is open.
//!
//! Listener registration is scoped: the controller owns the subscriptions
//! and releases them when dropped, whatever the exit path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tessel_core::events::{EventSurface, EventType, Phase, Subscription, SurfaceEvent};
use tessel_core::State;

/// Host hook for a floating menu layer
pub trait FloatingMenu: Send + Sync {
    /// Recompute the menu position from the anchor's current bounds
    fn update_position(&self);
}

impl<F> FloatingMenu for F
where
    F: Fn() + Send + Sync,
{
    fn update_position(&self) {
        self()
    }
}

/// Open/closed state of a select's menu
///
/// Owned by the select instance. Transitions happen only through
/// [`open`](MenuState::open) and [`close`](MenuState::close), which the
/// dropdown's menu-open/menu-close signals call.
#[derive(Clone, Debug)]
pub struct MenuState {
    open: State<bool>,
}

impl MenuState {
    /// Create menu state with an initial open flag
    pub fn new(initially_open: bool) -> Self {
        Self {
            open: State::new(initially_open),
        }
    }

    /// Whether the menu is currently open
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Transition to open. Requests a rebuild if the state changed.
    pub fn open(&self) {
        self.transition(true);
    }

    /// Transition to closed. Requests a rebuild if the state changed.
    pub fn close(&self) {
        self.transition(false);
    }

    /// Consume a pending rebuild request raised by a transition
    pub fn take_dirty(&self) -> bool {
        self.open.take_dirty()
    }

    /// Number of transitions so far
    pub fn version(&self) -> u64 {
        self.open.version()
    }

    fn transition(&self, is_open: bool) {
        if self.open.set_rebuild_if_changed(is_open) {
            tracing::trace!("select menu: {}", if is_open { "open" } else { "closed" });
        }
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Keeps a floating menu anchored while its surroundings scroll
///
/// Holds a capture-phase scroll subscription (so scrolls of any nested
/// container are observed) and a viewport resize subscription.
pub struct MenuPositionController {
    state: MenuState,
    repositions: Arc<AtomicUsize>,
    subscriptions: Vec<Subscription>,
}

impl MenuPositionController {
    /// Register the listeners on `surface`
    pub fn acquire(surface: &EventSurface, state: MenuState, menu: Arc<dyn FloatingMenu>) -> Self {
        let repositions = Arc::new(AtomicUsize::new(0));

        let on_event = {
            let state = state.clone();
            let repositions = Arc::clone(&repositions);
            move |event: &SurfaceEvent| {
                if !state.is_open() {
                    return;
                }
                tracing::trace!("select menu: reposition after {:?}", event.event_type);
                repositions.fetch_add(1, Ordering::SeqCst);
                menu.update_position();
            }
        };
        let on_event = Arc::new(on_event);

        let scroll = {
            let on_event = Arc::clone(&on_event);
            surface.subscribe(EventType::Scroll, Phase::Capture, move |e| on_event(e))
        };
        let resize = surface.subscribe(EventType::Resize, Phase::Bubble, move |e| on_event(e));

        tracing::debug!("select menu: position listeners acquired");
        Self {
            state,
            repositions,
            subscriptions: vec![scroll, resize],
        }
    }

    /// The menu state this controller reads
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// How many repositions have been requested
    pub fn reposition_count(&self) -> usize {
        self.repositions.load(Ordering::SeqCst)
    }

    /// Whether every listener is still registered
    pub fn is_active(&self) -> bool {
        self.subscriptions.iter().all(Subscription::is_active)
    }
}

impl std::fmt::Debug for MenuPositionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuPositionController")
            .field("state", &self.state)
            .field("repositions", &self.reposition_count())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl Drop for MenuPositionController {
    fn drop(&mut self) {
        tracing::debug!("select menu: position listeners released");
    }
}
