//! Target resolution.
//!
//! Wraps a raw entity reference into a typed bundle of capability
//! snapshots. Resolution walks the parent chain for a unit root and
//! falls back to the entity itself; capabilities are captured once and
//! never refreshed - resolved targets are short-lived, single-call
//! values.

use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::core::{EntityId, ResourceKind, Team};

use super::World;

/// Health captured at resolution time.
#[derive(Clone, Copy, Debug)]
pub struct HealthSnapshot {
    pub current: f32,
    pub max: f32,
}

impl HealthSnapshot {
    /// Health as a percentage of max (0 when max is degenerate).
    #[must_use]
    pub fn percent(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max * 100.0
        } else {
            0.0
        }
    }
}

/// Resource pool captured at resolution time.
#[derive(Clone, Copy, Debug)]
pub struct ResourceSnapshot {
    pub kind: ResourceKind,
    pub current: f32,
    pub max: f32,
}

/// A resolved unit: entity id plus capability snapshots.
#[derive(Clone, Debug)]
pub struct ResolvedTarget {
    /// The resolved unit root (or the original entity on fallback).
    pub entity: EntityId,
    /// World position at resolution time.
    pub position: Vec3,
    /// Facing at resolution time.
    pub facing: Vec3,
    /// Team membership, if any.
    pub team: Option<Team>,
    /// Health snapshot, if the unit has health.
    pub health: Option<HealthSnapshot>,
    /// Resource snapshot, if the unit has a pool.
    pub resource: Option<ResourceSnapshot>,
    /// Tag set snapshot.
    pub tags: FxHashSet<String>,
    /// Alive at resolution time (units without health count as alive).
    pub alive: bool,
}

/// Resolve an entity into a capability bundle.
///
/// Walks the ancestor chain looking for a unit root; if no root is found
/// the entity itself is resolved directly. Returns `None` only when the
/// entity doesn't exist (the chain walk is bounded to tolerate authoring
/// mistakes like parent cycles).
#[must_use]
pub fn resolve(world: &World, entity: EntityId) -> Option<ResolvedTarget> {
    let root = find_root(world, entity).unwrap_or(entity);
    let unit = world.unit(root)?;

    Some(ResolvedTarget {
        entity: root,
        position: unit.position,
        facing: unit.facing,
        team: unit.team,
        health: unit.health.map(|h| HealthSnapshot {
            current: h.current,
            max: h.max,
        }),
        resource: unit.resource.map(|r| ResourceSnapshot {
            kind: r.kind,
            current: r.current,
            max: r.max,
        }),
        tags: unit.tags.clone(),
        alive: unit.is_alive(),
    })
}

fn find_root(world: &World, entity: EntityId) -> Option<EntityId> {
    let mut current = entity;
    for _ in 0..16 {
        let unit = world.unit(current)?;
        if unit.is_root {
            return Some(current);
        }
        current = unit.parent?;
    }
    None
}
