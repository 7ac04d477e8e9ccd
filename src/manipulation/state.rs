use super::config::ManipulationConfig;
use super::events::{EventSink, JointHandle, ManipulationEvent};
use super::session::{DragOutcome, ManipulationSession};
use crate::kinematics::KinematicTree;
use crate::picking::{HitTester, Ray};

/// Pointer input fed to the engine by the host.
#[derive(Debug, Clone, Copy)]
pub enum PointerInput {
    Move(Ray),
    Down,
    Up,
}

/// Idle, hovering one joint, or dragging it. The grabbed joint is always the
/// hovered one, so at most one of each exists by construction.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(JointHandle),
    Grabbed(ManipulationSession),
}

impl InteractionState {
    pub fn hovered(&self) -> Option<JointHandle> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Hovering(handle) => Some(*handle),
            InteractionState::Grabbed(session) => Some(session.handle()),
        }
    }

    pub fn grabbed(&self) -> Option<JointHandle> {
        match self {
            InteractionState::Grabbed(session) => Some(session.handle()),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&ManipulationSession> {
        match self {
            InteractionState::Grabbed(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_manipulating(&self) -> bool {
        self.session().is_some_and(ManipulationSession::is_manipulating)
    }

    /// Drops any reference that no longer resolves in `tree`. No events are
    /// emitted for the lost joint.
    pub fn revalidate(self, tree: &KinematicTree) -> Self {
        match self.hovered() {
            Some(handle) if !handle.is_valid_in(tree) => {
                log::warn!(
                    "dropping interaction state for stale joint {:?} (tree replaced)",
                    handle.joint
                );
                InteractionState::Idle
            }
            _ => self,
        }
    }

    pub fn pointer_move(
        self,
        tree: &mut KinematicTree,
        ray: &Ray,
        config: &ManipulationConfig,
        sink: &mut dyn EventSink,
    ) -> Self {
        match self.revalidate(tree) {
            InteractionState::Grabbed(mut session) => {
                match session.update(tree, ray, config) {
                    DragOutcome::Applied(value) => {
                        log::trace!("{:?} -> {}", session.handle().joint, value);
                        sink.emit(ManipulationEvent::ValueChange(session.handle()));
                        InteractionState::Grabbed(session)
                    }
                    DragOutcome::Stale => {
                        log::warn!("grabbed joint {:?} vanished, ending session", session.handle().joint);
                        InteractionState::Idle
                    }
                    DragOutcome::Skipped | DragOutcome::Anchored | DragOutcome::Unchanged(_) => {
                        InteractionState::Grabbed(session)
                    }
                }
            }
            state => Self::from_hover(update_hover(state.hovered(), tree, ray, sink)),
        }
    }

    pub fn pointer_down(self, tree: &KinematicTree, sink: &mut dyn EventSink) -> Self {
        match self.revalidate(tree) {
            InteractionState::Hovering(handle) => match ManipulationSession::begin(tree, handle) {
                Some(session) => {
                    log::debug!("grabbed {:?}", handle.joint);
                    sink.emit(ManipulationEvent::ManipulateStart(handle));
                    InteractionState::Grabbed(session)
                }
                None => InteractionState::Idle,
            },
            state => state,
        }
    }

    /// Ends a drag. `last_ray`, when known, re-evaluates what is under the
    /// pointer so the state lands on Hovering or Idle.
    pub fn pointer_up(
        self,
        tree: &KinematicTree,
        last_ray: Option<&Ray>,
        sink: &mut dyn EventSink,
    ) -> Self {
        match self.revalidate(tree) {
            InteractionState::Grabbed(session) => {
                let handle = session.handle();
                if session.is_manipulating() {
                    sink.emit(ManipulationEvent::ManipulateEnd(handle));
                }
                log::debug!("released {:?}", handle.joint);
                match last_ray {
                    Some(ray) => Self::from_hover(update_hover(Some(handle), tree, ray, sink)),
                    None => InteractionState::Hovering(handle),
                }
            }
            state => state,
        }
    }

    fn from_hover(hovered: Option<JointHandle>) -> Self {
        match hovered {
            Some(handle) => InteractionState::Hovering(handle),
            None => InteractionState::Idle,
        }
    }
}

/// Hit-tests `ray` and emits unhover/hover when the joint under the pointer
/// changes. Returns the new hovered joint.
fn update_hover(
    current: Option<JointHandle>,
    tree: &KinematicTree,
    ray: &Ray,
    sink: &mut dyn EventSink,
) -> Option<JointHandle> {
    let picked = HitTester::pick(tree, ray).map(|pick| JointHandle::new(tree, pick.joint));
    if picked != current {
        if let Some(old) = current {
            log::debug!("unhover {:?}", old.joint);
            sink.emit(ManipulationEvent::Unhover(old));
        }
        if let Some(new) = picked {
            log::debug!("hover {:?}", new.joint);
            sink.emit(ManipulationEvent::Hover(new));
        }
    }
    picked
}

/// Owns the interaction state between frames and feeds it pointer input.
#[derive(Debug, Clone, Default)]
pub struct Manipulator {
    config: ManipulationConfig,
    state: InteractionState,
    last_ray: Option<Ray>,
}

impl Manipulator {
    pub fn new(config: ManipulationConfig) -> Self {
        Self {
            config,
            state: InteractionState::Idle,
            last_ray: None,
        }
    }

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ManipulationConfig) {
        self.config = config;
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn hovered(&self) -> Option<JointHandle> {
        self.state.hovered()
    }

    pub fn grabbed(&self) -> Option<JointHandle> {
        self.state.grabbed()
    }

    pub fn is_manipulating(&self) -> bool {
        self.state.is_manipulating()
    }

    pub fn pointer_move(&mut self, tree: &mut KinematicTree, ray: Ray, sink: &mut impl EventSink) {
        self.last_ray = Some(ray);
        self.state = std::mem::take(&mut self.state).pointer_move(tree, &ray, &self.config, sink);
    }

    pub fn pointer_down(&mut self, tree: &KinematicTree, sink: &mut impl EventSink) {
        self.state = std::mem::take(&mut self.state).pointer_down(tree, sink);
    }

    pub fn pointer_up(&mut self, tree: &KinematicTree, sink: &mut impl EventSink) {
        self.state = std::mem::take(&mut self.state).pointer_up(tree, self.last_ray.as_ref(), sink);
    }

    pub fn handle_input(&mut self, tree: &mut KinematicTree, input: PointerInput, sink: &mut impl EventSink) {
        match input {
            PointerInput::Move(ray) => self.pointer_move(tree, ray, sink),
            PointerInput::Down => self.pointer_down(tree, sink),
            PointerInput::Up => self.pointer_up(tree, sink),
        }
    }

    /// Forgets everything, e.g. when the host tears the tree down. No events
    /// are emitted.
    pub fn reset(&mut self) {
        if let Some(handle) = self.state.hovered() {
            log::debug!("interaction reset while holding {:?}", handle.joint);
        }
        self.state = InteractionState::Idle;
        self.last_ray = None;
    }
}
