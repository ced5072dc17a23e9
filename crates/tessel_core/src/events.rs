//! Global event surface
//!
//! The event surface is where window-level events land before they reach
//! individual components. Components that render detached layers (dropdown
//! menus, popovers) subscribe here to learn when their anchor may have moved.
//!
//! # Phases
//!
//! Listeners register for either [`Phase::Capture`] or [`Phase::Bubble`].
//! Scroll and resize events do not bubble, so a bubble-phase listener only
//! sees events targeted at the viewport itself. A capture-phase listener sees
//! every event of its type, including scrolls of nested scroll containers.
//!
//! # Subscriptions
//!
//! [`EventSurface::subscribe`] returns a [`Subscription`] guard. Dropping the
//! guard unregisters the listener, so release happens on every exit path,
//! including unwinding.
//!
//! ```ignore
//! let surface = EventSurface::global();
//! let _sub = surface.subscribe(EventType::Scroll, Phase::Capture, |event| {
//!     tracing::trace!("scrolled: {:?}", event.target);
//! });
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock, RwLock, Weak};

new_key_type! {
    /// Unique identifier for a registered listener
    pub struct ListenerId;
}

/// Event types delivered by the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A scroll container (or the viewport) scrolled
    Scroll,
    /// The viewport changed size
    Resize,
}

impl EventType {
    /// Whether events of this type propagate to bubble-phase listeners
    /// when targeted at a nested element
    pub fn bubbles(&self) -> bool {
        match self {
            EventType::Scroll | EventType::Resize => false,
        }
    }
}

/// Dispatch phase a listener registers for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Receive the event on the way down, before any target handles it
    Capture,
    /// Receive the event on the way up (only for bubbling events or viewport targets)
    #[default]
    Bubble,
}

/// Where an event originated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    /// The window viewport
    Viewport,
    /// A nested element, identified by its raw node id
    Element(u64),
}

/// An event dispatched through the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceEvent {
    pub event_type: EventType,
    pub target: EventTarget,
}

impl SurfaceEvent {
    /// A scroll event from the given target
    pub fn scroll(target: EventTarget) -> Self {
        Self {
            event_type: EventType::Scroll,
            target,
        }
    }

    /// A viewport resize event
    pub fn resize() -> Self {
        Self {
            event_type: EventType::Resize,
            target: EventTarget::Viewport,
        }
    }
}

/// Callback invoked for each delivered event
pub type ListenerCallback = Arc<dyn Fn(&SurfaceEvent) + Send + Sync>;

struct Listener {
    event_type: EventType,
    phase: Phase,
    callback: ListenerCallback,
}

impl Listener {
    fn accepts(&self, event: &SurfaceEvent) -> bool {
        if self.event_type != event.event_type {
            return false;
        }
        match self.phase {
            Phase::Capture => true,
            Phase::Bubble => {
                event.target == EventTarget::Viewport || event.event_type.bubbles()
            }
        }
    }
}

type ListenerMap = RwLock<SlotMap<ListenerId, Listener>>;

/// Global event surface instance
static GLOBAL_SURFACE: OnceLock<EventSurface> = OnceLock::new();

/// Registry of window-level listeners
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct EventSurface {
    listeners: Arc<ListenerMap>,
}

impl std::fmt::Debug for EventSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSurface")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Default for EventSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(SlotMap::with_key())),
        }
    }

    /// The process-wide surface the platform layer dispatches into
    pub fn global() -> &'static EventSurface {
        GLOBAL_SURFACE.get_or_init(EventSurface::new)
    }

    /// Register a listener and return its id
    ///
    /// The caller owns the registration and must call [`remove_listener`].
    /// Prefer [`subscribe`], which releases automatically.
    ///
    /// [`remove_listener`]: EventSurface::remove_listener
    /// [`subscribe`]: EventSurface::subscribe
    pub fn add_listener<F>(&self, event_type: EventType, phase: Phase, callback: F) -> ListenerId
    where
        F: Fn(&SurfaceEvent) + Send + Sync + 'static,
    {
        let id = self.listeners.write().unwrap().insert(Listener {
            event_type,
            phase,
            callback: Arc::new(callback),
        });
        tracing::trace!("EventSurface: added {:?} listener {:?} ({:?})", event_type, id, phase);
        id
    }

    /// Unregister a listener. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        remove_from(&self.listeners, id)
    }

    /// Register a listener whose lifetime is tied to the returned guard
    pub fn subscribe<F>(&self, event_type: EventType, phase: Phase, callback: F) -> Subscription
    where
        F: Fn(&SurfaceEvent) + Send + Sync + 'static,
    {
        let id = self.add_listener(event_type, phase, callback);
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver an event to every accepting listener
    ///
    /// Callbacks run after the registry lock is released, so a callback may
    /// add or remove listeners. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &SurfaceEvent) -> usize {
        let targets: SmallVec<[ListenerCallback; 4]> = {
            let listeners = self.listeners.read().unwrap();
            let capture = listeners
                .values()
                .filter(|l| l.phase == Phase::Capture && l.accepts(event));
            let bubble = listeners
                .values()
                .filter(|l| l.phase == Phase::Bubble && l.accepts(event));
            capture.chain(bubble).map(|l| Arc::clone(&l.callback)).collect()
        };

        for callback in &targets {
            callback(event);
        }
        targets.len()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    /// Whether a listener id is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.read().unwrap().contains_key(id)
    }
}

fn remove_from(listeners: &ListenerMap, id: ListenerId) -> bool {
    let removed = listeners.write().unwrap().remove(id).is_some();
    if removed {
        tracing::trace!("EventSurface: removed listener {:?}", id);
    }
    removed
}

/// Guard for a registered listener
///
/// Dropping the guard unregisters the listener. If the surface itself has
/// already been dropped, the guard does nothing.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    id: ListenerId,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    /// The id of the guarded listener
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered on a live surface
    pub fn is_active(&self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|l| l.read().unwrap().contains_key(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            // A poisoned lock still holds valid data; release must not be skipped.
            let mut map = match listeners.write() {
                Ok(map) => map,
                Err(poisoned) => poisoned.into_inner(),
            };
            if map.remove(self.id).is_some() {
                tracing::trace!("EventSurface: subscription {:?} released", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&SurfaceEvent) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move |_: &SurfaceEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_capture_listener_sees_nested_scroll() {
        let surface = EventSurface::new();
        let (count, cb) = counter();
        let _sub = surface.subscribe(EventType::Scroll, Phase::Capture, cb);

        surface.dispatch(&SurfaceEvent::scroll(EventTarget::Element(3)));
        surface.dispatch(&SurfaceEvent::scroll(EventTarget::Viewport));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_bubble_listener_only_sees_viewport_scroll() {
        let surface = EventSurface::new();
        let (count, cb) = counter();
        let _sub = surface.subscribe(EventType::Scroll, Phase::Bubble, cb);

        surface.dispatch(&SurfaceEvent::scroll(EventTarget::Element(3)));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        surface.dispatch(&SurfaceEvent::scroll(EventTarget::Viewport));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_type_filtering() {
        let surface = EventSurface::new();
        let (count, cb) = counter();
        let _sub = surface.subscribe(EventType::Resize, Phase::Capture, cb);

        assert_eq!(surface.dispatch(&SurfaceEvent::scroll(EventTarget::Viewport)), 0);
        assert_eq!(surface.dispatch(&SurfaceEvent::resize()), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_drop_releases() {
        let surface = EventSurface::new();
        let (_, cb) = counter();
        let sub = surface.subscribe(EventType::Scroll, Phase::Capture, cb);
        let id = sub.id();

        assert!(sub.is_active());
        assert!(surface.contains(id));

        drop(sub);
        assert!(!surface.contains(id));
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_surface() {
        let surface = EventSurface::new();
        let (_, cb) = counter();
        let sub = surface.subscribe(EventType::Scroll, Phase::Capture, cb);

        drop(surface);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_manual_listener_removal() {
        let surface = EventSurface::new();
        let (_, cb) = counter();
        let id = surface.add_listener(EventType::Scroll, Phase::Bubble, cb);

        assert!(surface.remove_listener(id));
        assert!(!surface.remove_listener(id));
    }

    #[test]
    fn test_callback_may_unsubscribe_during_dispatch() {
        let surface = EventSurface::new();
        let slot: Arc<std::sync::Mutex<Option<Subscription>>> = Arc::default();

        let slot_for_cb = Arc::clone(&slot);
        let sub = surface.subscribe(EventType::Scroll, Phase::Capture, move |_| {
            slot_for_cb.lock().unwrap().take();
        });
        *slot.lock().unwrap() = Some(sub);

        assert_eq!(surface.dispatch(&SurfaceEvent::scroll(EventTarget::Viewport)), 1);
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_global_surface_is_shared() {
        let a = EventSurface::global();
        let b = EventSurface::global();
        assert!(Arc::ptr_eq(&a.listeners, &b.listeners));
    }
}
