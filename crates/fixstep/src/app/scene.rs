use std::ops::AddAssign;

use serde::Deserialize;
use tracing::{debug, trace};

use super::collision::{detect_overlaps, CollisionPair, CollisionTracker};
use super::entity::{CollisionPhase, Entity, EntityId};
use super::geometry::{Color, Vec2};
use super::rendering::{Camera2D, DrawTarget, RenderError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOrder {
    /// Collection order, which is insertion order.
    #[default]
    Insertion,
    /// Ascending `Entity::z_order`; ties keep collection order.
    ZOrder,
}

#[derive(Debug)]
pub struct EntityIdAllocator {
    next: u64,
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Structural requests made while a tick is running.
///
/// Removals and spawns are recorded here and applied by the scene once the
/// update and collision phases of the tick have both finished.
#[derive(Debug, Default)]
pub struct SceneCommands {
    allocator: EntityIdAllocator,
    pending_spawns: Vec<Entity>,
    pending_removals: Vec<EntityId>,
}

impl SceneCommands {
    /// Queues `id` for removal. Unknown or already queued ids are harmless.
    pub fn remove(&mut self, id: EntityId) {
        self.pending_removals.push(id);
    }

    /// Assigns an id now; the entity joins the scene after the current tick.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.allocator.allocate();
        entity.id = id;
        self.pending_spawns.push(entity);
        id
    }

    pub fn is_removal_pending(&self, id: EntityId) -> bool {
        self.pending_removals.contains(&id)
    }

    pub fn pending_spawn_count(&self) -> usize {
        self.pending_spawns.len()
    }

    fn is_spawn_pending(&self, id: EntityId) -> bool {
        self.pending_spawns.iter().any(|entity| entity.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingApplied {
    pub removed: usize,
    pub spawned: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Active entities whose behavior ran.
    pub updated: usize,
    pub entered: usize,
    pub stayed: usize,
    pub exited: usize,
    pub removed: usize,
    pub spawned: usize,
}

impl AddAssign for TickSummary {
    fn add_assign(&mut self, rhs: TickSummary) {
        self.updated += rhs.updated;
        self.entered += rhs.entered;
        self.stayed += rhs.stayed;
        self.exited += rhs.exited;
        self.removed += rhs.removed;
        self.spawned += rhs.spawned;
    }
}

/// A live entity and the id the scene assigned to it.
///
/// The slot id is authoritative. `Entity::id` is a copy that the scene
/// re-stamps whenever it hands out mutable access or runs a tick.
#[derive(Debug)]
struct Slot {
    id: EntityId,
    entity: Entity,
}

impl Slot {
    fn new(entity: Entity) -> Self {
        Self {
            id: entity.id,
            entity,
        }
    }

    fn stamped(&mut self) -> &mut Entity {
        self.entity.id = self.id;
        &mut self.entity
    }
}

/// Owns a level's entities and runs the per-tick pipeline:
/// behaviors, then collision detection and events, then pending removals and spawns.
///
/// Slots stay sorted by id because ids are handed out in increasing order,
/// every insertion appends, and the slot vector is never exposed.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    commands: SceneCommands,
    collisions: CollisionTracker,
    camera: Camera2D,
    background: Color,
    render_order: RenderOrder,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_order(mut self, render_order: RenderOrder) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        let id = self.commands.allocator.allocate();
        entity.id = id;
        self.slots.push(Slot::new(entity));
        id
    }

    /// Queues a removal. Returns `false` for ids that are neither live nor pending spawn.
    pub fn remove(&mut self, id: EntityId) -> bool {
        if self.index_of(id).is_none() && !self.commands.is_spawn_pending(id) {
            return false;
        }
        self.commands.remove(id);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|index| &self.slots[index].entity)
    }

    /// Replacing the whole entity through this reference keeps it under `id`.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(|index| self.slots[index].stamped())
    }

    /// Live entities in collection order, inactive ones included.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = &Entity> + '_ {
        self.slots.iter().map(|slot| &slot.entity)
    }

    pub fn entities_mut(&mut self) -> impl ExactSizeIterator<Item = &mut Entity> + '_ {
        self.slots.iter_mut().map(Slot::stamped)
    }

    pub fn entity_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_removal_pending(&self, id: EntityId) -> bool {
        self.commands.is_removal_pending(id)
    }

    /// Active entities whose `Entity::bounds` contain `point`, edges included.
    pub fn entities_containing(&self, point: Vec2) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter(|slot| slot.entity.active && slot.entity.bounds().contains(point))
            .map(|slot| slot.id)
            .collect()
    }

    pub fn update(&mut self, dt_seconds: f32) -> TickSummary {
        let mut summary = TickSummary::default();

        // Removals queued between ticks take effect before behaviors run.
        let flushed = self.apply_pending();
        summary.removed += flushed.removed;
        summary.spawned += flushed.spawned;

        let Scene {
            slots,
            commands,
            collisions,
            ..
        } = self;

        for slot in slots.iter_mut() {
            let entity = slot.stamped();
            if entity.active && entity.run_behavior(commands, dt_seconds) {
                summary.updated += 1;
            }
            // A behavior may have replaced its entity wholesale.
            slot.stamped();
        }

        let overlaps = detect_overlaps(slots.iter().map(|slot| &slot.entity));
        let transitions = collisions.advance(&overlaps);
        for pair in &transitions.entered {
            if dispatch_pair(slots, commands, *pair, CollisionPhase::Enter) {
                trace!(pair = ?pair.ids(), "collision_enter");
                summary.entered += 1;
            }
        }
        for pair in &transitions.stayed {
            if dispatch_pair(slots, commands, *pair, CollisionPhase::Stay) {
                summary.stayed += 1;
            }
        }
        for pair in &transitions.exited {
            if dispatch_pair(slots, commands, *pair, CollisionPhase::Exit) {
                trace!(pair = ?pair.ids(), "collision_exit");
                summary.exited += 1;
            } else {
                trace!(pair = ?pair.ids(), "collision_exit_skipped_missing_entity");
            }
        }

        let applied = self.apply_pending();
        summary.removed += applied.removed;
        summary.spawned += applied.spawned;
        summary
    }

    /// The only place the live collection changes membership after insertion.
    pub fn apply_pending(&mut self) -> PendingApplied {
        let mut applied = PendingApplied::default();
        let commands = &mut self.commands;

        if !commands.pending_removals.is_empty() {
            commands.pending_removals.sort_unstable();
            commands.pending_removals.dedup();
            let pending = &commands.pending_removals;
            let before = self.slots.len();
            self.slots
                .retain(|slot| pending.binary_search(&slot.id).is_err());
            commands
                .pending_spawns
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            applied.removed = before - self.slots.len();
            commands.pending_removals.clear();
        }

        if !commands.pending_spawns.is_empty() {
            applied.spawned = commands.pending_spawns.len();
            self.slots
                .extend(commands.pending_spawns.drain(..).map(Slot::new));
        }

        if applied != PendingApplied::default() {
            debug!(
                removed = applied.removed,
                spawned = applied.spawned,
                entity_count = self.slots.len(),
                "scene_pending_applied"
            );
        }
        applied
    }

    /// Clears the frame, then draws every active entity that has a visual.
    /// Stops at the first draw failure.
    pub fn render<D>(&self, target: &mut D) -> Result<usize, RenderError>
    where
        D: DrawTarget + ?Sized,
    {
        target.clear(self.background).map_err(RenderError::Clear)?;

        let mut drawn = 0;
        for slot in self.draw_list() {
            let Some(visual) = &slot.entity.visual else {
                continue;
            };
            target
                .draw(visual, &slot.entity.transform, &self.camera)
                .map_err(|source| RenderError::Draw {
                    entity_id: slot.id,
                    source,
                })?;
            drawn += 1;
        }
        Ok(drawn)
    }

    fn draw_list(&self) -> Vec<&Slot> {
        let mut list: Vec<&Slot> = self
            .slots
            .iter()
            .filter(|slot| slot.entity.active && slot.entity.visual.is_some())
            .collect();
        if self.render_order == RenderOrder::ZOrder {
            list.sort_by_key(|slot| slot.entity.z_order);
        }
        list
    }

    /// Drops every entity and the collision history. Ids are still never reused.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.commands.pending_spawns.clear();
        self.commands.pending_removals.clear();
        self.collisions.clear();
    }

    pub fn collision_tracker(&self) -> &CollisionTracker {
        &self.collisions
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn render_order(&self) -> RenderOrder {
        self.render_order
    }

    pub fn set_render_order(&mut self, render_order: RenderOrder) {
        self.render_order = render_order;
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        index_of(&self.slots, id)
    }
}

fn index_of(slots: &[Slot], id: EntityId) -> Option<usize> {
    slots.binary_search_by_key(&id, |slot| slot.id).ok()
}

/// Fires `phase` on both members of `pair`. Returns `false` when either entity is gone.
fn dispatch_pair(
    slots: &mut [Slot],
    commands: &mut SceneCommands,
    pair: CollisionPair,
    phase: CollisionPhase,
) -> bool {
    let (a, b) = pair.ids();
    let (Some(a_index), Some(b_index)) = (index_of(slots, a), index_of(slots, b)) else {
        return false;
    };
    invoke_handler(slots, commands, a_index, b_index, phase);
    invoke_handler(slots, commands, b_index, a_index, phase);
    true
}

fn invoke_handler(
    slots: &mut [Slot],
    commands: &mut SceneCommands,
    this_index: usize,
    other_index: usize,
    phase: CollisionPhase,
) {
    let Some(mut handler) = slots[this_index].entity.handlers.take(phase) else {
        return;
    };
    let (this, other) = split_pair(slots, this_index, other_index);
    handler(this.stamped(), &other.entity, commands);
    let this = this.stamped();
    this.handlers.restore(phase, handler);
}

fn split_pair(slots: &mut [Slot], this_index: usize, other_index: usize) -> (&mut Slot, &Slot) {
    debug_assert_ne!(this_index, other_index);
    if this_index < other_index {
        let (head, tail) = slots.split_at_mut(other_index);
        (&mut head[this_index], &tail[0])
    } else {
        let (head, tail) = slots.split_at_mut(this_index);
        (&mut tail[0], &head[other_index])
    }
}
