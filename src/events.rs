//! Event emitters.
//!
//! Every shadow node carries an event emitter that delivers events for its view. Emitters are
//! enabled when their view is created and disabled when it is deleted; a disabled emitter drops
//! everything it is asked to dispatch. Since an emitter may be reachable from more than one tree,
//! enabling, disabling and dispatching are all serialized by one process-wide lock
//! (see [`dispatch_mutex`]).

use crate::layout::LayoutMetrics;
use crate::node::Tag;
use core::fmt;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{const_reentrant_mutex, ReentrantMutex};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

static DISPATCH_MUTEX: ReentrantMutex<()> = const_reentrant_mutex(());

/// The global lock for emitter state transitions and event dispatch.
///
/// When committing, this is always acquired while the tree’s own lock is held, never the other way
/// around.
pub fn dispatch_mutex() -> &'static ReentrantMutex<()> {
    &DISPATCH_MUTEX
}

/// Types of events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// The view’s layout changed.
    Layout(LayoutMetrics),
}

/// An event addressed to a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub target: Tag,
    pub kind: EventKind,
}

/// An event emitter.
pub trait EventEmitter: fmt::Debug + Send + Sync {
    /// Enables the emitter. Calls nest: an emitter enabled twice needs two `disable` calls.
    fn enable(&self);

    /// Disables the emitter.
    fn disable(&self);

    fn is_enabled(&self) -> bool;

    /// Returns the layout event capability, if this emitter has it.
    fn as_layout_emitter(&self) -> Option<&dyn LayoutEventEmitter> {
        None
    }
}

pub type SharedEventEmitter = Arc<dyn EventEmitter>;

/// Capability of emitting layout events.
pub trait LayoutEventEmitter {
    fn on_layout(&self, metrics: &LayoutMetrics);
}

/// Sends events to a receiver.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: Sender<Event>,
}

impl EventDispatcher {
    /// Creates a new dispatcher and the receiving end of its queue.
    pub fn new() -> (EventDispatcher, Receiver<Event>) {
        let (sender, receiver) = channel::unbounded();
        (EventDispatcher { sender }, receiver)
    }

    fn dispatch(&self, event: Event) {
        if self.sender.send(event).is_err() {
            log::trace!("dropping {:?}: event receiver has been disconnected", event);
        }
    }
}

/// The event emitter for regular views.
///
/// Dispatches events for one target to an (optional) dispatcher; an emitter without a dispatcher
/// never delivers anything.
#[derive(Debug)]
pub struct ViewEventEmitter {
    target: Option<Tag>,
    dispatcher: Option<EventDispatcher>,
    enable_count: AtomicIsize,
}

impl ViewEventEmitter {
    /// Creates an emitter with no target.
    pub fn new(dispatcher: Option<EventDispatcher>) -> ViewEventEmitter {
        ViewEventEmitter {
            target: None,
            dispatcher,
            enable_count: AtomicIsize::new(0),
        }
    }

    /// Creates an emitter for events targeting `target`.
    pub fn with_target(target: Tag, dispatcher: EventDispatcher) -> ViewEventEmitter {
        ViewEventEmitter {
            target: Some(target),
            dispatcher: Some(dispatcher),
            enable_count: AtomicIsize::new(0),
        }
    }

    fn dispatch(&self, kind: EventKind) {
        let _lock = dispatch_mutex().lock();

        let (target, dispatcher) = match (self.target, &self.dispatcher) {
            (Some(target), Some(dispatcher)) => (target, dispatcher),
            _ => return,
        };

        if !self.is_enabled() {
            log::trace!("dropping {:?} for disabled emitter of {:?}", kind, target);
            return;
        }

        dispatcher.dispatch(Event { target, kind });
    }
}

impl EventEmitter for ViewEventEmitter {
    fn enable(&self) {
        let _lock = dispatch_mutex().lock();
        self.enable_count.fetch_add(1, Ordering::AcqRel);
    }

    fn disable(&self) {
        let _lock = dispatch_mutex().lock();
        let previous = self.enable_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "disabling an event emitter that is not enabled");
    }

    fn is_enabled(&self) -> bool {
        self.enable_count.load(Ordering::Acquire) > 0
    }

    fn as_layout_emitter(&self) -> Option<&dyn LayoutEventEmitter> {
        Some(self)
    }
}

impl LayoutEventEmitter for ViewEventEmitter {
    fn on_layout(&self, metrics: &LayoutMetrics) {
        self.dispatch(EventKind::Layout(*metrics));
    }
}
