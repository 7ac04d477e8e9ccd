use std::sync::mpsc::Sender;

use crate::kinematics::{JointId, KinematicTree, TreeId};

/// Non-owning reference to a joint of a specific tree. Goes stale when the
/// tree is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle {
    pub tree: TreeId,
    pub joint: JointId,
}

impl JointHandle {
    pub fn new(tree: &KinematicTree, joint: JointId) -> Self {
        Self {
            tree: tree.id(),
            joint,
        }
    }

    /// Whether this handle still names a manipulable joint of `tree`.
    pub fn is_valid_in(&self, tree: &KinematicTree) -> bool {
        self.tree == tree.id()
            && tree
                .joint(self.joint)
                .is_some_and(|joint| joint.is_manipulable())
    }
}

/// Notifications produced by the engine. Value changes carry only the joint;
/// consumers read the current value back from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationEvent {
    Hover(JointHandle),
    Unhover(JointHandle),
    ManipulateStart(JointHandle),
    ManipulateEnd(JointHandle),
    ValueChange(JointHandle),
}

impl ManipulationEvent {
    pub fn handle(&self) -> JointHandle {
        match *self {
            ManipulationEvent::Hover(h)
            | ManipulationEvent::Unhover(h)
            | ManipulationEvent::ManipulateStart(h)
            | ManipulationEvent::ManipulateEnd(h)
            | ManipulationEvent::ValueChange(h) => h,
        }
    }
}

/// Receiver of [`ManipulationEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: ManipulationEvent);
}

impl EventSink for Vec<ManipulationEvent> {
    fn emit(&mut self, event: ManipulationEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<ManipulationEvent> {
    fn emit(&mut self, event: ManipulationEvent) {
        if self.send(event).is_err() {
            log::trace!("event receiver dropped, discarding {:?}", event);
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ManipulationEvent) {}
}

type Observer = Box<dyn FnMut(&ManipulationEvent)>;

/// Fans events out to registered observers in registration order, e.g. a
/// highlight renderer, slider UI and a network position sync.
#[derive(Default)]
pub struct EventDispatcher {
    observers: Vec<Observer>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&ManipulationEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

impl EventSink for EventDispatcher {
    fn emit(&mut self, event: ManipulationEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("observer_count", &self.observers.len())
            .finish()
    }
}
