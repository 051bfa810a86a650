//! The unit world: capability slots, spatial queries, buff carrier.
//!
//! The engine treats the world as an injected collaborator: a store of
//! units with a fixed set of optional capability slots (transform,
//! health, resource pool, tag set, team, buffs, caster state) resolved
//! once at construction, plus bounded spatial overlap queries and a ray
//! test. This crate ships a brute-force implementation; a host with a
//! broad-phase can swap the query bodies without touching the engine.

mod resolved;

pub use resolved::{resolve, HealthSnapshot, ResolvedTarget, ResourceSnapshot};

use std::sync::Arc;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::buffs::{BuffConfig, BuffId, BuffInstance};
use crate::core::{EntityId, ResourceKind, Team};
use crate::skill::SkillConfig;

/// Health capability.
#[derive(Clone, Copy, Debug)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    /// Full health pool.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Alive means strictly positive current health.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Spendable resource capability. One pool per unit.
#[derive(Clone, Copy, Debug)]
pub struct ResourcePool {
    pub kind: ResourceKind,
    pub current: f32,
    pub max: f32,
}

impl ResourcePool {
    /// Full resource pool.
    #[must_use]
    pub fn full(kind: ResourceKind, max: f32) -> Self {
        Self {
            kind,
            current: max,
            max,
        }
    }
}

/// An in-flight cast on a unit.
#[derive(Clone, Debug)]
pub struct ActiveCast {
    /// The skill being cast.
    pub skill: Arc<SkillConfig>,
    /// Absolute completion deadline on the engine clock.
    pub ends_at: f64,
}

/// Per-unit casting state. At most one active cast at a time.
#[derive(Clone, Debug, Default)]
pub struct CasterState {
    /// The cast in progress, if any.
    pub active: Option<ActiveCast>,
    /// Absolute ready times per skill.
    pub cooldowns: FxHashMap<crate::skill::SkillId, f64>,
    /// Caster is locked out of new casts until this time (cast + recovery).
    pub busy_until: f64,
}

/// A world entity with its capability slots.
///
/// Capabilities are fixed optional fields, filled at construction and
/// never re-discovered per call. Non-root parts (colliders, attachment
/// points) carry a parent link so target resolution can walk up to the
/// owning unit.
#[derive(Clone, Debug)]
pub struct Unit {
    /// Owning entity for non-root parts.
    pub parent: Option<EntityId>,
    /// Whether this entity is a unit root (a targetable combatant).
    pub is_root: bool,
    /// World position.
    pub position: Vec3,
    /// Normalized facing direction.
    pub facing: Vec3,
    /// Body radius for ray tests.
    pub radius: f32,
    /// Team membership.
    pub team: Option<Team>,
    /// Health capability.
    pub health: Option<Health>,
    /// Resource capability.
    pub resource: Option<ResourcePool>,
    /// Tag set.
    pub tags: FxHashSet<String>,
    /// Active buffs in application order.
    pub buffs: Vec<BuffInstance>,
    /// Casting state.
    pub caster: CasterState,
}

impl Unit {
    /// Create a unit root at a position.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            parent: None,
            is_root: true,
            position,
            facing: Vec3::NEG_Z,
            radius: 0.5,
            team: None,
            health: None,
            resource: None,
            tags: FxHashSet::default(),
            buffs: Vec::new(),
            caster: CasterState::default(),
        }
    }

    /// Create a non-root part owned by `parent`.
    #[must_use]
    pub fn part_of(parent: EntityId, position: Vec3) -> Self {
        let mut unit = Self::new(position);
        unit.parent = Some(parent);
        unit.is_root = false;
        unit
    }

    /// Set the facing direction (builder pattern). Normalized if possible.
    #[must_use]
    pub fn with_facing(mut self, facing: Vec3) -> Self {
        self.facing = facing.normalize_or_zero();
        self
    }

    /// Set the team (builder pattern).
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Give the unit a full health pool (builder pattern).
    #[must_use]
    pub fn with_health(mut self, max: f32) -> Self {
        self.health = Some(Health::full(max));
        self
    }

    /// Give the unit a full resource pool (builder pattern).
    #[must_use]
    pub fn with_resource(mut self, kind: ResourceKind, max: f32) -> Self {
        self.resource = Some(ResourcePool::full(kind, max));
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set the body radius (builder pattern).
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Alive unless a health capability says otherwise.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health.map(|h| h.is_alive()).unwrap_or(true)
    }
}

/// Entity store with brute-force spatial queries.
#[derive(Debug, Default)]
pub struct World {
    units: FxHashMap<EntityId, Unit>,
    next_id: u32,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, returning its id.
    pub fn spawn(&mut self, unit: Unit) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.units.insert(id, unit);
        id
    }

    /// Remove a unit.
    pub fn despawn(&mut self, id: EntityId) {
        self.units.remove(&id);
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Mutable unit lookup.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Iterate all (id, unit) pairs.
    pub fn units(&self) -> impl Iterator<Item = (EntityId, &Unit)> {
        self.units.iter().map(|(id, u)| (*id, u))
    }

    /// Alive check; missing entities are not alive.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.unit(id).map(Unit::is_alive).unwrap_or(false)
    }

    // === Health ===

    /// Reduce health, clamped at zero. No-op without a health capability.
    pub fn apply_damage(&mut self, id: EntityId, amount: f32) {
        if let Some(health) = self.units.get_mut(&id).and_then(|u| u.health.as_mut()) {
            health.current = (health.current - amount).max(0.0);
        }
    }

    /// Restore health, clamped at max. No-op without a health capability.
    pub fn apply_heal(&mut self, id: EntityId, amount: f32) {
        if let Some(health) = self.units.get_mut(&id).and_then(|u| u.health.as_mut()) {
            health.current = (health.current + amount).min(health.max);
        }
    }

    // === Resource ===

    /// Spend from the unit's pool. Fails (false, no change) when the pool
    /// is missing, the kind mismatches or the balance is insufficient.
    pub fn spend_resource(&mut self, id: EntityId, kind: ResourceKind, amount: f32) -> bool {
        let Some(pool) = self.units.get_mut(&id).and_then(|u| u.resource.as_mut()) else {
            return false;
        };
        if pool.kind != kind || pool.current < amount {
            return false;
        }
        pool.current -= amount;
        true
    }

    /// Restore into the unit's pool, clamped at max. Kind must match.
    pub fn restore_resource(&mut self, id: EntityId, kind: ResourceKind, amount: f32) {
        if let Some(pool) = self.units.get_mut(&id).and_then(|u| u.resource.as_mut()) {
            if pool.kind == kind {
                pool.current = (pool.current + amount).min(pool.max);
            }
        }
    }

    // === Buffs ===

    /// Attach a buff or add stacks to an existing instance of the same
    /// definition (refreshing its duration).
    pub fn apply_buff(&mut self, id: EntityId, config: &Arc<BuffConfig>, stacks: u32) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if let Some(existing) = unit.buffs.iter_mut().find(|b| b.config.id == config.id) {
            existing.add_stacks(stacks.max(1));
        } else {
            unit.buffs.push(BuffInstance::new(config.clone(), stacks.max(1)));
        }
    }

    /// Remove every instance of a buff definition.
    pub fn remove_buff(&mut self, id: EntityId, buff: BuffId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.buffs.retain(|b| b.config.id != buff);
        }
    }

    /// Current stack count of a buff on a unit (0 when absent).
    #[must_use]
    pub fn buff_stacks(&self, id: EntityId, buff: BuffId) -> u32 {
        self.unit(id)
            .and_then(|u| u.buffs.iter().find(|b| b.config.id == buff))
            .map(|b| b.stacks)
            .unwrap_or(0)
    }

    /// Advance buff lifetimes and drop expired instances.
    pub fn tick_buffs(&mut self, dt: f32) {
        for unit in self.units.values_mut() {
            unit.buffs.retain_mut(|b| !b.tick(dt));
        }
    }

    // === Spatial queries ===

    /// Collect unit roots within `radius` of `center` (inclusive bound).
    pub fn query_sphere(&self, center: Vec3, radius: f32, out: &mut Vec<EntityId>) {
        let r2 = radius * radius;
        for (id, unit) in &self.units {
            if unit.is_root && unit.position.distance_squared(center) <= r2 {
                out.push(*id);
            }
        }
        // Stable candidate order regardless of hash iteration.
        out.sort_unstable();
    }

    /// Collect unit roots inside an oriented box. `forward` is the box's
    /// long axis; `half_extents` are (lateral, vertical, forward).
    pub fn query_obb(
        &self,
        center: Vec3,
        forward: Vec3,
        half_extents: Vec3,
        out: &mut Vec<EntityId>,
    ) {
        let forward = forward.normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        // Degenerate when facing straight up/down; fall back to X.
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = right.cross(forward);

        for (id, unit) in &self.units {
            if !unit.is_root {
                continue;
            }
            let local = unit.position - center;
            if local.dot(right).abs() <= half_extents.x
                && local.dot(up).abs() <= half_extents.y
                && local.dot(forward).abs() <= half_extents.z
            {
                out.push(*id);
            }
        }
        out.sort_unstable();
    }

    /// First unit body struck by the segment `from -> to`, skipping
    /// `ignore`. Returns the nearest hit along the ray.
    #[must_use]
    pub fn raycast(&self, from: Vec3, to: Vec3, ignore: EntityId) -> Option<EntityId> {
        let dir = to - from;
        let len2 = dir.length_squared();
        if len2 <= f32::EPSILON {
            return None;
        }

        let mut best: Option<(f32, EntityId)> = None;
        for (id, unit) in &self.units {
            if *id == ignore || !unit.is_root {
                continue;
            }
            // Closest point on the segment to the body center.
            let t = ((unit.position - from).dot(dir) / len2).clamp(0.0, 1.0);
            let closest = from + dir * t;
            if closest.distance_squared(unit.position) <= unit.radius * unit.radius {
                match best {
                    Some((bt, bid)) if (bt, bid) <= (t, *id) => {}
                    _ => best = Some((t, *id)),
                }
            }
        }
        best.map(|(_, id)| id)
    }
}
