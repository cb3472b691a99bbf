use std::fmt;

use super::collision::Collider;
use super::geometry::{Rect, Transform};
use super::rendering::Visual;
use super::scene::SceneCommands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder carried by entities that have not been added to a scene yet.
    pub const UNASSIGNED: EntityId = EntityId(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-tick custom logic attached to an entity.
///
/// Closures with the matching signature implement this trait, so test doubles
/// and one-off scripts do not need a named type.
pub trait Behavior {
    fn update(&mut self, entity: &mut Entity, commands: &mut SceneCommands, dt_seconds: f32);
}

impl<F> Behavior for F
where
    F: FnMut(&mut Entity, &mut SceneCommands, f32),
{
    fn update(&mut self, entity: &mut Entity, commands: &mut SceneCommands, dt_seconds: f32) {
        self(entity, commands, dt_seconds)
    }
}

/// Receives `(self, other, commands)` for one collision transition.
pub type CollisionHandler = Box<dyn FnMut(&mut Entity, &Entity, &mut SceneCommands)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    Enter,
    Stay,
    Exit,
}

#[derive(Default)]
pub struct CollisionHandlers {
    pub on_enter: Option<CollisionHandler>,
    pub on_stay: Option<CollisionHandler>,
    pub on_exit: Option<CollisionHandler>,
    cleared: [bool; 3],
}

impl CollisionHandlers {
    fn slot_mut(&mut self, phase: CollisionPhase) -> &mut Option<CollisionHandler> {
        match phase {
            CollisionPhase::Enter => &mut self.on_enter,
            CollisionPhase::Stay => &mut self.on_stay,
            CollisionPhase::Exit => &mut self.on_exit,
        }
    }

    fn cleared_mut(&mut self, phase: CollisionPhase) -> &mut bool {
        &mut self.cleared[phase as usize]
    }

    pub fn has(&self, phase: CollisionPhase) -> bool {
        match phase {
            CollisionPhase::Enter => self.on_enter.is_some(),
            CollisionPhase::Stay => self.on_stay.is_some(),
            CollisionPhase::Exit => self.on_exit.is_some(),
        }
    }

    pub(crate) fn take(&mut self, phase: CollisionPhase) -> Option<CollisionHandler> {
        *self.cleared_mut(phase) = false;
        self.slot_mut(phase).take()
    }

    /// Removes the handler for `phase`.
    ///
    /// A running handler must detach itself through this call. Assigning `None`
    /// to its own field is undone when the scene puts the handler back.
    pub fn clear(&mut self, phase: CollisionPhase) {
        *self.slot_mut(phase) = None;
        *self.cleared_mut(phase) = true;
    }

    /// Puts a handler back unless it was cleared or replaced while it ran.
    pub(crate) fn restore(&mut self, phase: CollisionPhase, handler: CollisionHandler) {
        let cleared = std::mem::take(self.cleared_mut(phase));
        let slot = self.slot_mut(phase);
        if slot.is_none() && !cleared {
            *slot = Some(handler);
        }
    }
}

impl fmt::Debug for CollisionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionHandlers")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_stay", &self.on_stay.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// A game object. Every component besides the transform is optional.
pub struct Entity {
    pub(crate) id: EntityId,
    pub active: bool,
    pub transform: Transform,
    pub visual: Option<Visual>,
    pub collider: Option<Collider>,
    pub behavior: Option<Box<dyn Behavior>>,
    behavior_cleared: bool,
    pub handlers: CollisionHandlers,
    /// Draw priority used by `RenderOrder::ZOrder`; higher draws later.
    pub z_order: i32,
}

impl Entity {
    pub fn new(transform: Transform) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            active: true,
            transform,
            visual: None,
            collider: None,
            behavior: None,
            behavior_cleared: false,
            handlers: CollisionHandlers::default(),
            z_order: 0,
        }
    }

    /// The scene keeps the authoritative id and re-stamps this copy on every
    /// `get_mut`, `entities_mut` and tick.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Detaches the behavior, including from inside its own `update`.
    ///
    /// While a behavior runs, `self.behavior` is `None`; a running behavior that
    /// assigns `None` directly is reinstalled afterwards.
    pub fn clear_behavior(&mut self) {
        self.behavior = None;
        self.behavior_cleared = true;
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn on_enter(
        mut self,
        handler: impl FnMut(&mut Entity, &Entity, &mut SceneCommands) + 'static,
    ) -> Self {
        self.handlers.on_enter = Some(Box::new(handler));
        self
    }

    pub fn on_stay(
        mut self,
        handler: impl FnMut(&mut Entity, &Entity, &mut SceneCommands) + 'static,
    ) -> Self {
        self.handlers.on_stay = Some(Box::new(handler));
        self
    }

    pub fn on_exit(
        mut self,
        handler: impl FnMut(&mut Entity, &Entity, &mut SceneCommands) + 'static,
    ) -> Self {
        self.handlers.on_exit = Some(Box::new(handler));
        self
    }

    /// World-space collider bounds, or a zero-size rectangle at the entity position.
    pub fn bounds(&self) -> Rect {
        match &self.collider {
            Some(collider) => collider.world_bounds(&self.transform),
            None => Rect::new(self.transform.position.x, self.transform.position.y, 0.0, 0.0),
        }
    }

    pub(crate) fn run_behavior(&mut self, commands: &mut SceneCommands, dt_seconds: f32) -> bool {
        let Some(mut behavior) = self.behavior.take() else {
            return false;
        };
        self.behavior_cleared = false;
        behavior.update(self, commands, dt_seconds);
        let cleared = std::mem::take(&mut self.behavior_cleared);
        if self.behavior.is_none() && !cleared {
            self.behavior = Some(behavior);
        }
        true
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("transform", &self.transform)
            .field("visual", &self.visual)
            .field("collider", &self.collider)
            .field("has_behavior", &self.behavior.is_some())
            .field("handlers", &self.handlers)
            .field("z_order", &self.z_order)
            .finish()
    }
}
