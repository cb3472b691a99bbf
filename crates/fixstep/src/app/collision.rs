use std::collections::HashSet;

use super::entity::{Entity, EntityId};
use super::geometry::{Rect, Transform, Vec2};

/// Mask value that accepts every layer.
pub const ALL_LAYERS: u32 = u32::MAX;

/// Axis-aligned collision shape in entity-local space.
///
/// `layer` is a bit index and `mask` a bitset of layers this collider accepts.
/// Two colliders interact only when each one's mask contains the other's layer bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub bounds: Rect,
    pub offset: Vec2,
    /// Informational only; detection ignores it.
    pub is_trigger: bool,
    pub layer: u32,
    pub mask: u32,
}

impl Collider {
    /// Bounds centred on the entity, layer 0, accepting all layers.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Rect::new(-width * 0.5, -height * 0.5, width, height),
            offset: Vec2::ZERO,
            is_trigger: false,
            layer: 0,
            mask: ALL_LAYERS,
        }
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Zero when `layer` has no representable bit.
    pub fn layer_bit(&self) -> u32 {
        1u32.checked_shl(self.layer).unwrap_or(0)
    }

    pub fn accepts(&self, other: &Collider) -> bool {
        self.mask & other.layer_bit() != 0
    }

    pub fn is_compatible_with(&self, other: &Collider) -> bool {
        self.accepts(other) && other.accepts(self)
    }

    /// Scales bounds and offset per axis, then translates. Rotation is not applied.
    pub fn world_bounds(&self, transform: &Transform) -> Rect {
        let scale = transform.scale;
        Rect {
            x: transform.position.x + self.offset.x * scale.x + self.bounds.x * scale.x,
            y: transform.position.y + self.offset.y * scale.y + self.bounds.y * scale.y,
            width: self.bounds.width * scale.x,
            height: self.bounds.height * scale.y,
        }
    }

    pub fn intersects(
        &self,
        other: &Collider,
        this_transform: &Transform,
        other_transform: &Transform,
    ) -> bool {
        if !self.is_compatible_with(other) {
            return false;
        }
        self.world_bounds(this_transform)
            .intersects(&other.world_bounds(other_transform))
    }
}

/// Unordered pair of entity ids; `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    low: EntityId,
    high: EntityId,
}

impl CollisionPair {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn ids(&self) -> (EntityId, EntityId) {
        (self.low, self.high)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.low == id || self.high == id
    }
}

/// Brute-force broad phase over every active entity that owns a collider.
/// Each unordered pair is tested once; results follow collection order.
pub fn detect_overlaps<'a, I>(entities: I) -> Vec<CollisionPair>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let collidable: Vec<(&Entity, &Collider)> = entities
        .into_iter()
        .filter(|entity| entity.active)
        .filter_map(|entity| entity.collider.as_ref().map(|collider| (entity, collider)))
        .collect();

    let mut overlaps = Vec::new();
    for (index, (first, first_collider)) in collidable.iter().enumerate() {
        for (second, second_collider) in &collidable[index + 1..] {
            if first_collider.intersects(second_collider, &first.transform, &second.transform) {
                overlaps.push(CollisionPair::new(first.id, second.id));
            }
        }
    }
    overlaps
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionTransitions {
    pub entered: Vec<CollisionPair>,
    pub stayed: Vec<CollisionPair>,
    /// Ascending pair order.
    pub exited: Vec<CollisionPair>,
}

impl CollisionTransitions {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.stayed.is_empty() && self.exited.is_empty()
    }
}

/// Keeps exactly one tick of overlap history.
#[derive(Debug, Default)]
pub struct CollisionTracker {
    previous: HashSet<CollisionPair>,
}

impl CollisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `current` against the previous tick and replaces the history with `current`.
    pub fn advance(&mut self, current: &[CollisionPair]) -> CollisionTransitions {
        let current_set: HashSet<CollisionPair> = current.iter().copied().collect();
        let mut transitions = CollisionTransitions::default();
        let mut seen = HashSet::with_capacity(current.len());

        for pair in current {
            if !seen.insert(*pair) {
                continue;
            }
            if self.previous.contains(pair) {
                transitions.stayed.push(*pair);
            } else {
                transitions.entered.push(*pair);
            }
        }

        transitions.exited = self
            .previous
            .iter()
            .filter(|pair| !current_set.contains(pair))
            .copied()
            .collect();
        transitions.exited.sort_unstable();

        self.previous = current_set;
        transitions
    }

    pub fn is_tracking(&self, pair: CollisionPair) -> bool {
        self.previous.contains(&pair)
    }

    pub fn tracked_count(&self) -> usize {
        self.previous.len()
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_at(id: u64, x: f32, y: f32, collider: Option<Collider>) -> Entity {
        let mut entity = Entity::new(Transform::at(Vec2::new(x, y)));
        entity.id = EntityId(id);
        entity.collider = collider;
        entity
    }

    #[test]
    fn new_collider_is_centred_and_accepts_all_layers() {
        let collider = Collider::new(32.0, 16.0);
        assert_eq!(collider.bounds, Rect::new(-16.0, -8.0, 32.0, 16.0));
        assert_eq!(collider.layer, 0);
        assert_eq!(collider.mask, ALL_LAYERS);
        assert!(!collider.is_trigger);
    }

    #[test]
    fn world_bounds_scales_bounds_and_offset_per_axis() {
        let collider = Collider::new(10.0, 20.0).with_offset(Vec2::new(2.0, -1.0));
        let transform = Transform::at(Vec2::new(100.0, 50.0)).with_scale(Vec2::new(2.0, 3.0));

        let bounds = collider.world_bounds(&transform);

        assert_eq!(bounds, Rect::new(100.0 + 4.0 - 10.0, 50.0 - 3.0 - 30.0, 20.0, 60.0));
    }

    #[test]
    fn world_bounds_ignores_rotation() {
        let collider = Collider::new(10.0, 40.0);
        let upright = Transform::at(Vec2::new(5.0, 5.0));
        let mut rotated = upright;
        rotated.rotate(90.0);
        assert_eq!(collider.world_bounds(&upright), collider.world_bounds(&rotated));
    }

    #[test]
    fn intersects_is_symmetric() {
        let a = Collider::new(10.0, 10.0).with_layer(1).with_mask(0b110);
        let b = Collider::new(6.0, 6.0).with_layer(2).with_mask(0b010);
        let ta = Transform::at(Vec2::new(0.0, 0.0));
        let tb = Transform::at(Vec2::new(7.0, 2.0));

        assert!(a.intersects(&b, &ta, &tb));
        assert_eq!(a.intersects(&b, &ta, &tb), b.intersects(&a, &tb, &ta));
    }

    #[test]
    fn layer_filter_requires_mutual_opt_in() {
        let player = Collider::new(10.0, 10.0).with_layer(0).with_mask(1 << 1);
        let enemy_one_sided = Collider::new(10.0, 10.0).with_layer(1).with_mask(1 << 2);
        let enemy_mutual = Collider::new(10.0, 10.0).with_layer(1).with_mask(1 << 0);
        let at_origin = Transform::default();

        assert!(!player.intersects(&enemy_one_sided, &at_origin, &at_origin));
        assert!(!enemy_one_sided.intersects(&player, &at_origin, &at_origin));
        assert!(player.intersects(&enemy_mutual, &at_origin, &at_origin));
    }

    #[test]
    fn open_masks_intersect_when_overlapping() {
        let a = Collider::new(10.0, 10.0).with_layer(3);
        let b = Collider::new(10.0, 10.0).with_layer(17);
        assert!(a.intersects(
            &b,
            &Transform::default(),
            &Transform::at(Vec2::new(9.0, 0.0))
        ));
    }

    #[test]
    fn unrepresentable_layer_never_collides() {
        let a = Collider::new(10.0, 10.0).with_layer(40);
        let b = Collider::new(10.0, 10.0);
        assert_eq!(a.layer_bit(), 0);
        assert!(!a.intersects(&b, &Transform::default(), &Transform::default()));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Collider {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            ..Collider::new(0.0, 0.0)
        };
        let b = a;
        let left = Transform::default();
        let right = Transform::at(Vec2::new(100.0, 0.0));
        assert!(!a.intersects(&b, &left, &right));
    }

    #[test]
    fn pair_is_order_independent() {
        let forward = CollisionPair::new(EntityId(3), EntityId(9));
        let backward = CollisionPair::new(EntityId(9), EntityId(3));
        assert_eq!(forward, backward);
        assert_eq!(forward.ids(), (EntityId(3), EntityId(9)));
        assert!(forward.contains(EntityId(9)));
        assert!(!forward.contains(EntityId(4)));
    }

    #[test]
    fn detect_overlaps_skips_inactive_and_colliderless_entities() {
        let mut inactive = entity_at(3, 0.0, 0.0, Some(Collider::new(10.0, 10.0)));
        inactive.active = false;
        let entities = vec![
            entity_at(1, 0.0, 0.0, Some(Collider::new(10.0, 10.0))),
            entity_at(2, 1.0, 1.0, Some(Collider::new(10.0, 10.0))),
            inactive,
            entity_at(4, 0.0, 0.0, None),
            entity_at(5, 500.0, 0.0, Some(Collider::new(10.0, 10.0))),
        ];

        let overlaps = detect_overlaps(&entities);

        assert_eq!(overlaps, vec![CollisionPair::new(EntityId(1), EntityId(2))]);
    }

    #[test]
    fn detect_overlaps_reports_each_pair_once() {
        let entities: Vec<Entity> = (1..=4)
            .map(|id| entity_at(id, id as f32, 0.0, Some(Collider::new(10.0, 10.0))))
            .collect();

        let overlaps = detect_overlaps(&entities);

        assert_eq!(overlaps.len(), 6);
        let unique: HashSet<CollisionPair> = overlaps.iter().copied().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn zero_size_collider_is_a_point() {
        let point = Collider::new(0.0, 0.0);
        let at = Transform::at(Vec2::new(5.0, 5.0));

        assert_eq!(point.world_bounds(&at), Rect::new(5.0, 5.0, 0.0, 0.0));
        assert!(point.intersects(&Collider::new(10.0, 10.0), &at, &at));
        assert!(!point.intersects(&point, &at, &at));
    }

    #[test]
    fn negative_width_collider_flips_its_origin() {
        let flipped = Collider::new(-10.0, 5.0);
        let origin = Transform::default();

        assert_eq!(flipped.world_bounds(&origin), Rect::new(5.0, -2.5, -10.0, 5.0));
        assert!(flipped.intersects(&Collider::new(100.0, 100.0), &origin, &origin));
        assert!(!flipped.world_bounds(&origin).contains(Vec2::ZERO));
    }

    #[test]
    fn zero_scale_collapses_bounds_onto_position() {
        let collider = Collider::new(10.0, 10.0);
        let collapsed = Transform::at(Vec2::new(3.0, 4.0)).with_scale(Vec2::ZERO);
        let unscaled = Transform::at(Vec2::new(3.0, 4.0));

        assert_eq!(collider.world_bounds(&collapsed), Rect::new(3.0, 4.0, 0.0, 0.0));
        assert!(collider.intersects(&collider, &collapsed, &unscaled));
        assert!(!collider.intersects(&collider, &collapsed, &collapsed));
    }

    #[test]
    fn tracker_classifies_enter_stay_exit() {
        let pair = CollisionPair::new(EntityId(1), EntityId(2));
        let mut tracker = CollisionTracker::new();

        let first = tracker.advance(&[pair]);
        assert_eq!(first.entered, vec![pair]);
        assert!(first.stayed.is_empty() && first.exited.is_empty());

        let second = tracker.advance(&[pair]);
        assert_eq!(second.stayed, vec![pair]);
        assert!(second.entered.is_empty() && second.exited.is_empty());

        let third = tracker.advance(&[]);
        assert_eq!(third.exited, vec![pair]);
        assert!(third.entered.is_empty() && third.stayed.is_empty());

        let fourth = tracker.advance(&[]);
        assert!(fourth.is_empty());
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn tracker_keeps_only_one_tick_of_history() {
        let pair = CollisionPair::new(EntityId(1), EntityId(2));
        let mut tracker = CollisionTracker::new();
        tracker.advance(&[pair]);
        tracker.advance(&[]);

        let again = tracker.advance(&[pair]);

        assert_eq!(again.entered, vec![pair]);
        assert!(again.stayed.is_empty());
    }

    #[test]
    fn tracker_exits_are_sorted() {
        let pairs = [
            CollisionPair::new(EntityId(5), EntityId(6)),
            CollisionPair::new(EntityId(1), EntityId(9)),
            CollisionPair::new(EntityId(2), EntityId(3)),
        ];
        let mut tracker = CollisionTracker::new();
        tracker.advance(&pairs);

        let ended = tracker.advance(&[]);

        assert_eq!(ended.exited, vec![pairs[1], pairs[2], pairs[0]]);
    }
}
