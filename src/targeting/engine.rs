//! Geometric target selection.
//!
//! One entry point resolves candidates per mode, applies the uniform
//! validity filter, ranks by sort policy and caps the count. Ties are
//! broken deterministically (metric, then entity id). The same shape
//! formulas back `is_within_shape`, so late hit confirmation is
//! numerically identical to selection.

use glam::Vec3;

use crate::cast::CastContext;
use crate::core::{EntityId, GameRng, TargetList};
use crate::world::World;

use super::{SortPolicy, TargetingConfig, TargetingMode, TeamFilter};

/// Vertical offset for line-of-sight ray endpoints (eye height).
const LOS_EYE_OFFSET: f32 = 1.5;

/// Resolve a targeting config into a list of entities.
///
/// `explicit` is the target the cast was requested on; Single and Chain
/// honor it when it passes the validity filter. `out` is cleared first.
pub fn resolve_targets(
    world: &World,
    rng: &mut GameRng,
    ctx: &CastContext,
    cfg: &TargetingConfig,
    explicit: Option<EntityId>,
    out: &mut TargetList,
) {
    out.clear();
    let origin = shape_origin(world, ctx, cfg);
    let max = cfg.effective_max();

    match cfg.mode {
        TargetingMode::Self_ => {
            if passes_filter(world, ctx, cfg, ctx.caster) {
                out.push(ctx.caster);
            }
        }

        TargetingMode::Single => {
            if let Some(target) = explicit.filter(|t| passes_filter(world, ctx, cfg, *t)) {
                out.push(target);
                return;
            }
            let mut candidates = collect_sphere(world, ctx, cfg, origin, cfg.range);
            rank(world, rng, cfg.sort, origin, &mut candidates, 1);
            out.extend(candidates.into_iter().take(1));
        }

        TargetingMode::Sphere | TargetingMode::Random => {
            let mut candidates =
                collect_sphere(world, ctx, cfg, origin, cfg.effective_radius());
            let sort = if cfg.mode == TargetingMode::Random {
                SortPolicy::Random
            } else {
                cfg.sort
            };
            rank(world, rng, sort, origin, &mut candidates, max);
            out.extend(candidates.into_iter().take(max));
        }

        TargetingMode::Cone => {
            let facing = shape_facing(world, ctx);
            let cos_half = (cfg.angle.to_radians() * 0.5).cos();
            let mut candidates =
                collect_sphere(world, ctx, cfg, origin, cfg.effective_radius());
            candidates.retain(|id| in_cone(world, origin, facing, cos_half, *id));
            rank(world, rng, cfg.sort, origin, &mut candidates, max);
            out.extend(candidates.into_iter().take(max));
        }

        TargetingMode::Line | TargetingMode::Box => {
            let facing = shape_facing(world, ctx);
            let (center, half) = obb_params(cfg, origin, facing, cfg.mode);
            let mut raw = Vec::new();
            world.query_obb(center, facing, half, &mut raw);
            let mut candidates: Vec<EntityId> = raw
                .into_iter()
                .filter(|id| passes_filter(world, ctx, cfg, *id))
                .collect();
            rank(world, rng, cfg.sort, origin, &mut candidates, max);
            out.extend(candidates.into_iter().take(max));
        }

        TargetingMode::Chain => {
            resolve_chain(world, rng, ctx, cfg, explicit, origin, max, out);
        }
    }
}

/// Re-validate a previously acquired target against the current shape.
///
/// Uses the same per-mode formulas as selection, so a target selected at
/// time T is confirmed at time T' exactly when it still satisfies the
/// selection-time geometry.
#[must_use]
pub fn is_within_shape(
    world: &World,
    ctx: &CastContext,
    cfg: &TargetingConfig,
    target: EntityId,
) -> bool {
    let Some(pos) = world.unit(target).map(|u| u.position) else {
        return false;
    };
    let origin = shape_origin(world, ctx, cfg);

    match cfg.mode {
        TargetingMode::Self_ => target == ctx.caster,
        TargetingMode::Single => in_sphere(origin, cfg.range, pos),
        TargetingMode::Sphere | TargetingMode::Random | TargetingMode::Chain => {
            in_sphere(origin, cfg.effective_radius(), pos)
        }
        TargetingMode::Cone => {
            let facing = shape_facing(world, ctx);
            let cos_half = (cfg.angle.to_radians() * 0.5).cos();
            in_sphere(origin, cfg.effective_radius(), pos)
                && in_cone(world, origin, facing, cos_half, target)
        }
        TargetingMode::Line | TargetingMode::Box => {
            let facing = shape_facing(world, ctx);
            let (center, half) = obb_params(cfg, origin, facing, cfg.mode);
            let mut raw = Vec::new();
            world.query_obb(center, facing, half, &mut raw);
            raw.contains(&target)
        }
    }
}

/// One ray test between elevated caster and target points.
///
/// Fails only when the ray strikes a body belonging to a different
/// entity than the target.
#[must_use]
pub fn has_line_of_sight(world: &World, ctx: &CastContext, target: EntityId) -> bool {
    let Some(caster_pos) = world.unit(ctx.caster).map(|u| u.position) else {
        return false;
    };
    let Some(target_pos) = world.unit(target).map(|u| u.position) else {
        return false;
    };
    let from = caster_pos + Vec3::Y * LOS_EYE_OFFSET;
    let to = target_pos + Vec3::Y * LOS_EYE_OFFSET;
    match world.raycast(from, to, ctx.caster) {
        None => true,
        Some(hit) => hit == target,
    }
}

// === Shape primitives ===

fn shape_origin(world: &World, ctx: &CastContext, cfg: &TargetingConfig) -> Vec3 {
    let caster_pos = world
        .unit(ctx.caster)
        .map(|u| u.position)
        .unwrap_or(Vec3::ZERO);
    match cfg.origin {
        super::OriginMode::Caster => caster_pos,
        super::OriginMode::AimPoint => ctx.aim_point.unwrap_or(caster_pos),
    }
}

fn shape_facing(world: &World, ctx: &CastContext) -> Vec3 {
    ctx.aim_dir.unwrap_or_else(|| {
        world
            .unit(ctx.caster)
            .map(|u| u.facing)
            .unwrap_or(Vec3::NEG_Z)
    })
}

fn in_sphere(origin: Vec3, radius: f32, pos: Vec3) -> bool {
    pos.distance_squared(origin) <= radius * radius
}

fn in_cone(world: &World, origin: Vec3, facing: Vec3, cos_half: f32, id: EntityId) -> bool {
    let Some(pos) = world.unit(id).map(|u| u.position) else {
        return false;
    };
    let to = pos - origin;
    let dir = to.normalize_or_zero();
    // A candidate standing on the origin has no direction; count it in.
    dir == Vec3::ZERO || dir.dot(facing) >= cos_half
}

fn obb_params(
    cfg: &TargetingConfig,
    origin: Vec3,
    facing: Vec3,
    mode: TargetingMode,
) -> (Vec3, Vec3) {
    let half_width = cfg.radius.max(0.0);
    match mode {
        // Forward-anchored: covers [0, range] ahead of the origin.
        TargetingMode::Line => (
            origin + facing * (cfg.range * 0.5),
            Vec3::new(half_width, half_width.max(1.0), cfg.range * 0.5),
        ),
        // Origin-centered, half-length taken from range.
        _ => (
            origin,
            Vec3::new(half_width, half_width.max(1.0), cfg.range),
        ),
    }
}

// === Candidate collection and ranking ===

fn collect_sphere(
    world: &World,
    ctx: &CastContext,
    cfg: &TargetingConfig,
    origin: Vec3,
    radius: f32,
) -> Vec<EntityId> {
    let mut raw = Vec::new();
    world.query_sphere(origin, radius, &mut raw);
    raw.retain(|id| passes_filter(world, ctx, cfg, *id));
    raw
}

/// The uniform validity filter: alive, team relation, tags, self rule.
fn passes_filter(world: &World, ctx: &CastContext, cfg: &TargetingConfig, id: EntityId) -> bool {
    let Some(unit) = world.unit(id) else {
        return false;
    };
    if !unit.is_root || !unit.is_alive() {
        return false;
    }
    if id == ctx.caster && !cfg.include_self {
        return false;
    }
    if !team_matches(world, ctx, cfg.team, unit.team) {
        return false;
    }
    if !cfg.required_tags.iter().all(|t| unit.tags.contains(t)) {
        return false;
    }
    if cfg.blocked_tags.iter().any(|t| unit.tags.contains(t)) {
        return false;
    }
    true
}

fn team_matches(
    world: &World,
    ctx: &CastContext,
    filter: TeamFilter,
    candidate: Option<crate::core::Team>,
) -> bool {
    if filter == TeamFilter::Any {
        return true;
    }
    let caster_team = world.unit(ctx.caster).and_then(|u| u.team);
    let (Some(caster_team), Some(candidate)) = (caster_team, candidate) else {
        // Membership comparison needs both sides.
        return false;
    };
    match filter {
        TeamFilter::Any => true,
        TeamFilter::Self_ | TeamFilter::Ally => caster_team.is_ally(candidate),
        TeamFilter::Enemy => caster_team.is_enemy(candidate),
    }
}

/// Order candidates by policy; lower metric wins, ties break on id.
fn rank(
    world: &World,
    rng: &mut GameRng,
    sort: SortPolicy,
    origin: Vec3,
    candidates: &mut Vec<EntityId>,
    max: usize,
) {
    match sort {
        SortPolicy::None => {}
        SortPolicy::Random => {
            let n = rng.partial_shuffle(candidates, max);
            candidates.truncate(n);
        }
        _ => {
            candidates.sort_by(|a, b| {
                let ma = metric(world, sort, origin, *a);
                let mb = metric(world, sort, origin, *b);
                ma.partial_cmp(&mb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(b))
            });
        }
    }
}

fn metric(world: &World, sort: SortPolicy, origin: Vec3, id: EntityId) -> f32 {
    let Some(unit) = world.unit(id) else {
        return f32::MAX;
    };
    match sort {
        SortPolicy::Closest => unit.position.distance_squared(origin),
        SortPolicy::Farthest => -unit.position.distance_squared(origin),
        SortPolicy::LowestHealth => unit.health.map(|h| h.current).unwrap_or(f32::MAX),
        SortPolicy::HighestHealth => -unit.health.map(|h| h.current).unwrap_or(0.0),
        SortPolicy::None | SortPolicy::Random => 0.0,
    }
}

// === Chain ===

#[allow(clippy::too_many_arguments)]
fn resolve_chain(
    world: &World,
    rng: &mut GameRng,
    ctx: &CastContext,
    cfg: &TargetingConfig,
    explicit: Option<EntityId>,
    origin: Vec3,
    max: usize,
    out: &mut TargetList,
) {
    let mut pool = collect_sphere(world, ctx, cfg, origin, cfg.range);

    // Initial pick: explicit target when valid, otherwise best candidate.
    let first = match explicit.filter(|t| passes_filter(world, ctx, cfg, *t)) {
        Some(t) => {
            pool.retain(|id| *id != t);
            t
        }
        None => {
            rank(world, rng, cfg.sort, origin, &mut pool, 1);
            if pool.is_empty() {
                return;
            }
            pool.remove(0)
        }
    };
    out.push(first);

    // Each hop measures from the previous pick, not the original origin.
    let hop = cfg.effective_radius();
    let mut current = first;
    while out.len() < max {
        let Some(prev_pos) = world.unit(current).map(|u| u.position) else {
            break;
        };
        let mut reachable: Vec<EntityId> = pool
            .iter()
            .copied()
            .filter(|id| {
                world
                    .unit(*id)
                    .map(|u| in_sphere(prev_pos, hop, u.position))
                    .unwrap_or(false)
            })
            .collect();
        if reachable.is_empty() {
            break;
        }
        rank(world, rng, cfg.sort, prev_pos, &mut reachable, 1);
        let next = reachable[0];
        pool.retain(|id| *id != next);
        out.push(next);
        current = next;
    }
}
