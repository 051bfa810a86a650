//! Pooled projectile subsystem.
//!
//! Projectiles fly in a straight line from their spawn point; a hit is a
//! segment raycast over the distance covered each frame, ignoring the
//! caster. Each hit (or range expiry) deactivates the instance and
//! recycles its slot. The engine turns reported hits into
//! on-projectile-hit notifications.

use glam::Vec3;

use crate::cast::CastContext;
use crate::core::EntityId;
use crate::world::World;

/// Handle to a pooled projectile slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Get the raw slot index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A projectile striking a unit.
#[derive(Clone, Debug)]
pub struct ProjectileHit {
    /// The cast that launched the projectile.
    pub ctx: CastContext,
    /// The unit struck.
    pub target: EntityId,
}

#[derive(Debug)]
struct Instance {
    position: Vec3,
    direction: Vec3,
    speed: f32,
    remaining_range: f32,
    /// Homing target; straight flight along `direction` when absent.
    target: Option<EntityId>,
    ctx: CastContext,
}

#[derive(Debug, Default)]
struct Slot {
    instance: Option<Instance>,
}

/// Pool of in-flight projectiles.
#[derive(Debug, Default)]
pub struct ProjectilePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ProjectilePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a projectile from `position` along `direction`.
    ///
    /// When `target` is set the projectile re-aims at it every frame as
    /// long as it exists.
    pub fn spawn(
        &mut self,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        max_range: f32,
        target: Option<EntityId>,
        ctx: CastContext,
    ) -> ProjectileId {
        let instance = Instance {
            position,
            direction: direction.normalize_or_zero(),
            speed,
            remaining_range: max_range,
            target,
            ctx,
        };
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize].instance = Some(instance);
            ProjectileId(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                instance: Some(instance),
            });
            ProjectileId(idx)
        }
    }

    /// Advance every projectile by `dt`, collecting hits into `out`.
    ///
    /// A hit or range expiry releases the slot; `out` is not cleared.
    pub fn advance(&mut self, world: &World, dt: f32, out: &mut Vec<ProjectileHit>) {
        for idx in 0..self.slots.len() {
            let Some(instance) = self.slots[idx].instance.as_mut() else {
                continue;
            };

            if let Some(target) = instance.target {
                match world.unit(target) {
                    Some(unit) => {
                        let to = unit.position - instance.position;
                        if to != Vec3::ZERO {
                            instance.direction = to.normalize_or_zero();
                        }
                    }
                    // Target despawned mid-flight; keep going straight.
                    None => instance.target = None,
                }
            }

            let travel = (instance.speed * dt).min(instance.remaining_range);
            let from = instance.position;
            let to = from + instance.direction * travel;
            instance.position = to;
            instance.remaining_range -= travel;

            if let Some(hit) = world.raycast(from, to, instance.ctx.caster) {
                out.push(ProjectileHit {
                    ctx: instance.ctx.clone(),
                    target: hit,
                });
                self.release(ProjectileId(idx as u32));
            } else if instance.remaining_range <= 0.0 {
                self.release(ProjectileId(idx as u32));
            }
        }
    }

    /// Deactivate an instance and recycle its slot.
    pub fn release(&mut self, id: ProjectileId) {
        let slot = &mut self.slots[id.0 as usize];
        if slot.instance.take().is_some() {
            self.free.push(id.0);
        } else {
            log::warn!("double release of projectile {}", id.0);
        }
    }

    /// Drop every projectile launched by `caster`.
    pub fn release_by_caster(&mut self, caster: EntityId) {
        for idx in 0..self.slots.len() {
            let launched = self.slots[idx]
                .instance
                .as_ref()
                .map(|i| i.ctx.caster == caster)
                .unwrap_or(false);
            if launched {
                self.release(ProjectileId(idx as u32));
            }
        }
    }

    /// Number of projectiles currently in flight.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
