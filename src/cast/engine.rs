//! The cast controller: state machine, gating and the step scheduler.
//!
//! `try_cast` validates, resolves targets once, commits resources and
//! schedules every step of the skill as pending work sharing one pooled
//! target list. `tick` drives the frame: buff lifetimes, projectile
//! flight, due pending steps and cast completion. Validation and state
//! mutation are atomic: nothing is deducted or started unless targeting
//! succeeded.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::buffs;
use crate::condition;
use crate::core::{EntityId, FrameClock, GameRng, ListHandle, TargetList, TargetListPool};
use crate::effects::{ProjectileHit, ProjectilePool};
use crate::skill::{SkillConfig, SkillId, StepTrigger};
use crate::targeting::resolve_targets;
use crate::world::{resolve, ActiveCast, World};

use super::context::{CastContext, CastInput};
use super::events::EngineEvent;

/// Why a cast request was turned down. No state changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastRejection {
    /// The caster entity did not resolve to a unit.
    NoCaster,
    /// The caster is dead.
    CasterDead,
    /// The caster already has an active cast.
    AlreadyCasting,
    /// The caster is still in post-cast recovery.
    Recovering,
    /// The skill's cooldown has not elapsed.
    OnCooldown,
    /// The caster lacks the resource cost (or the pool kind mismatches).
    InsufficientResource,
    /// Targeting resolved zero targets.
    NoTargets,
}

impl std::fmt::Display for CastRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            CastRejection::NoCaster => "caster did not resolve",
            CastRejection::CasterDead => "caster is dead",
            CastRejection::AlreadyCasting => "already casting",
            CastRejection::Recovering => "in post-cast recovery",
            CastRejection::OnCooldown => "on cooldown",
            CastRejection::InsufficientResource => "insufficient resource",
            CastRejection::NoTargets => "no targets resolved",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CastRejection {}

/// A scheduled unit of work: one step of one cast, due at a timestamp.
#[derive(Clone, Debug)]
pub(crate) struct PendingStep {
    /// Absolute due time on the engine clock.
    pub(crate) execute_at: f64,
    /// Insertion sequence; FIFO tie-break for equal timestamps.
    pub(crate) seq: u64,
    /// Index into the skill's step list.
    pub(crate) step_index: usize,
    /// The trigger that scheduled this step.
    pub(crate) trigger: StepTrigger,
    /// Shared target list handle; one reference is held per step.
    pub(crate) list: ListHandle,
    /// The originating cast.
    pub(crate) ctx: CastContext,
}

impl PartialEq for PendingStep {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for PendingStep {}

impl PartialOrd for PendingStep {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingStep {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.execute_at
            .partial_cmp(&other.execute_at)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

/// The skill execution engine.
///
/// Owns the clock, the RNG, the pools and the pending-step queue.
/// Per-caster state (active cast, cooldowns, recovery) lives on the
/// world's units; multiple casters share nothing but the pools.
#[derive(Debug)]
pub struct CastEngine {
    pub(crate) clock: FrameClock,
    pub(crate) rng: GameRng,
    pub(crate) lists: TargetListPool,
    pub(crate) projectiles: ProjectilePool,
    pending: BinaryHeap<Reverse<PendingStep>>,
    next_seq: u64,
    events: Vec<EngineEvent>,
}

impl CastEngine {
    /// Create an engine with a deterministic RNG seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            clock: FrameClock::new(),
            rng: GameRng::new(seed),
            lists: TargetListPool::new(),
            projectiles: ProjectilePool::new(),
            pending: BinaryHeap::new(),
            next_seq: 0,
            events: Vec::new(),
        }
    }

    /// Current engine time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Check every cast precondition without side effects (beyond RNG
    /// draws from conditional cost modifiers).
    pub fn can_cast(
        &mut self,
        world: &World,
        caster: EntityId,
        skill: &SkillConfig,
    ) -> Result<(), CastRejection> {
        let root = resolve(world, caster)
            .ok_or(CastRejection::NoCaster)?
            .entity;
        let unit = world.unit(root).ok_or(CastRejection::NoCaster)?;

        if !unit.is_alive() {
            return Err(CastRejection::CasterDead);
        }
        if unit.caster.active.is_some() {
            return Err(CastRejection::AlreadyCasting);
        }
        let now = self.clock.now();
        if unit.caster.busy_until > now {
            return Err(CastRejection::Recovering);
        }
        if let Some(&ready) = unit.caster.cooldowns.get(&skill.id) {
            if ready > now {
                return Err(CastRejection::OnCooldown);
            }
        }
        if let Some(cost) = skill.resource {
            let amount =
                buffs::skill_param(world, &mut self.rng, root, "cost", cost.cost, &skill.tags)
                    .max(0.0);
            match unit.resource {
                Some(pool) if pool.kind == cost.kind && pool.current >= amount => {}
                _ => return Err(CastRejection::InsufficientResource),
            }
        }
        Ok(())
    }

    /// Request a cast.
    ///
    /// On success the resource is deducted, the cooldown started, every
    /// step scheduled against one shared target list, and a
    /// `CastStarted` event raised (followed immediately by
    /// `CastCompleted` for instant casts). On rejection nothing changed.
    pub fn try_cast(
        &mut self,
        world: &mut World,
        caster: EntityId,
        skill: &Arc<SkillConfig>,
        input: CastInput,
    ) -> Result<(), CastRejection> {
        self.can_cast(world, caster, skill)?;
        let root = resolve(world, caster)
            .ok_or(CastRejection::NoCaster)?
            .entity;

        let ctx = CastContext {
            caster: root,
            source: caster,
            skill: skill.clone(),
            aim_point: input.aim_point,
            aim_dir: input.aim_dir,
        };

        // Targeting runs once per cast; every step shares the result.
        let mut targets = TargetList::new();
        resolve_targets(
            world,
            &mut self.rng,
            &ctx,
            &skill.targeting,
            input.target,
            &mut targets,
        );
        if targets.is_empty() {
            log::debug!("{} rejected for {}: no targets", skill.id, root);
            return Err(CastRejection::NoTargets);
        }

        // Commit point: from here on the cast is accepted.
        let now = self.clock.now();
        let cast_time = buffs::skill_param(
            world,
            &mut self.rng,
            root,
            "cast_time",
            skill.cast_time,
            &skill.tags,
        )
        .max(0.0);
        let cooldown = buffs::skill_param(
            world,
            &mut self.rng,
            root,
            "cooldown",
            skill.cooldown,
            &skill.tags,
        )
        .max(0.0);

        if let Some(cost) = skill.resource {
            let amount =
                buffs::skill_param(world, &mut self.rng, root, "cost", cost.cost, &skill.tags)
                    .max(0.0);
            if !world.spend_resource(root, cost.kind, amount) {
                return Err(CastRejection::InsufficientResource);
            }
        }

        let handle = self.lists.acquire();
        *self.lists.get_mut(handle) = targets;

        for (index, step) in skill.steps.iter().enumerate() {
            let base = match step.trigger {
                StepTrigger::CastStart => now,
                StepTrigger::CastComplete => now + f64::from(cast_time),
                // Hit-triggered steps are scheduled by notifications.
                StepTrigger::OnHit | StepTrigger::OnProjectileHit => continue,
            };
            self.lists.retain(handle);
            self.push_step(
                base + f64::from(step.delay),
                index,
                step.trigger,
                handle,
                ctx.clone(),
            );
        }
        // Drop the creator reference; the count now equals the number of
        // steps still pointing at the list.
        self.lists.release(handle);

        if let Some(unit) = world.unit_mut(root) {
            unit.caster.cooldowns.insert(skill.id, now + f64::from(cooldown));
            unit.caster.busy_until = now + f64::from(cast_time + skill.recovery);
            if cast_time > 0.0 {
                unit.caster.active = Some(ActiveCast {
                    skill: skill.clone(),
                    ends_at: now + f64::from(cast_time),
                });
            }
        }

        log::debug!("{} accepted for {} (cast_time {cast_time})", skill.id, root);
        self.events.push(EngineEvent::CastStarted {
            caster: root,
            skill: skill.id,
        });
        if cast_time <= 0.0 {
            self.events.push(EngineEvent::CastCompleted {
                caster: root,
                skill: skill.id,
            });
        }
        Ok(())
    }

    /// Advance the engine one frame.
    ///
    /// Order: clock, buff lifetimes, projectile flight (raising hit
    /// steps), due pending steps, cast completion.
    pub fn tick(&mut self, world: &mut World, dt: f32) {
        self.clock.advance(dt);
        let delta = self.clock.delta();
        world.tick_buffs(delta);

        let mut hits: Vec<ProjectileHit> = Vec::new();
        self.projectiles.advance(world, delta, &mut hits);
        for hit in hits {
            self.notify_projectile_hit(&hit.ctx, hit.target);
        }

        // Steps scheduled during execution with an already-due timestamp
        // (zero-delay hit steps) run within the same frame.
        loop {
            let due = self
                .pending
                .peek()
                .map(|Reverse(step)| step.execute_at <= self.clock.now())
                .unwrap_or(false);
            if !due {
                break;
            }
            let Some(Reverse(step)) = self.pending.pop() else {
                break;
            };
            self.run_step(world, &step);
            self.lists.release(step.list);
        }

        self.finish_completed_casts(world);
    }

    /// Raise on-hit steps for a landed (non-projectile) hit.
    pub fn notify_hit(&mut self, ctx: &CastContext, target: EntityId) {
        self.schedule_trigger_steps(StepTrigger::OnHit, ctx, target);
    }

    /// Raise on-projectile-hit steps for a projectile strike.
    pub fn notify_projectile_hit(&mut self, ctx: &CastContext, target: EntityId) {
        self.schedule_trigger_steps(StepTrigger::OnProjectileHit, ctx, target);
    }

    /// Cancel a caster's active cast and flush its pending steps,
    /// releasing their list handles and dropping its projectiles. The
    /// cooldown and spent resources are not refunded; the recovery lock
    /// is lifted.
    pub fn interrupt(&mut self, world: &mut World, caster: EntityId) {
        let root = resolve(world, caster).map(|r| r.entity).unwrap_or(caster);
        if let Some(unit) = world.unit_mut(root) {
            unit.caster.active = None;
            unit.caster.busy_until = self.clock.now();
        }

        let drained = std::mem::take(&mut self.pending);
        for Reverse(step) in drained {
            if step.ctx.caster == root {
                self.lists.release(step.list);
            } else {
                self.pending.push(Reverse(step));
            }
        }
        self.projectiles.release_by_caster(root);
    }

    /// Whether a caster has an active (non-instant) cast in progress.
    #[must_use]
    pub fn is_casting(&self, world: &World, caster: EntityId) -> bool {
        world
            .unit(caster)
            .map(|u| u.caster.active.is_some())
            .unwrap_or(false)
    }

    /// The skill currently being cast, if any.
    #[must_use]
    pub fn current_skill(&self, world: &World, caster: EntityId) -> Option<SkillId> {
        world
            .unit(caster)?
            .caster
            .active
            .as_ref()
            .map(|a| a.skill.id)
    }

    /// Take every event raised since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of steps still waiting to execute.
    #[must_use]
    pub fn pending_steps(&self) -> usize {
        self.pending.len()
    }

    /// Number of target lists currently checked out.
    #[must_use]
    pub fn live_lists(&self) -> usize {
        self.lists.live_count()
    }

    /// Number of projectiles currently in flight.
    #[must_use]
    pub fn live_projectiles(&self) -> usize {
        self.projectiles.live_count()
    }

    fn push_step(
        &mut self,
        execute_at: f64,
        step_index: usize,
        trigger: StepTrigger,
        list: ListHandle,
        ctx: CastContext,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(PendingStep {
            execute_at,
            seq,
            step_index,
            trigger,
            list,
            ctx,
        }));
    }

    /// Schedule a fresh single-target step per matching trigger,
    /// following the same reference-counting path as a cast.
    fn schedule_trigger_steps(
        &mut self,
        trigger: StepTrigger,
        ctx: &CastContext,
        target: EntityId,
    ) {
        let indices: SmallVec<[usize; 4]> = ctx.skill.steps_for(trigger).collect();
        if indices.is_empty() {
            return;
        }

        let handle = self.lists.acquire();
        self.lists.get_mut(handle).push(target);
        let now = self.clock.now();
        for index in indices {
            let delay = ctx.skill.steps[index].delay;
            self.lists.retain(handle);
            self.push_step(now + f64::from(delay), index, trigger, handle, ctx.clone());
        }
        self.lists.release(handle);
    }

    fn run_step(&mut self, world: &mut World, step: &PendingStep) {
        let Some(config) = step.ctx.skill.steps.get(step.step_index) else {
            return;
        };
        // Copy out so effects may re-enter the pool while we iterate.
        let targets: TargetList = self.lists.get(step.list).iter().copied().collect();

        for target in targets {
            let resolved = resolve(world, target);
            if !condition::evaluate(
                config.condition.as_ref(),
                world,
                step.ctx.caster,
                resolved.as_ref(),
                &mut self.rng,
            ) {
                continue;
            }
            for effect in &config.effects {
                self.execute_effect(world, effect, &step.ctx, target, step.trigger);
            }
        }
    }

    fn finish_completed_casts(&mut self, world: &mut World) {
        let now = self.clock.now();
        let mut completed: SmallVec<[(EntityId, SkillId); 4]> = SmallVec::new();
        for (id, unit) in world.units() {
            if let Some(active) = &unit.caster.active {
                if active.ends_at <= now {
                    completed.push((id, active.skill.id));
                }
            }
        }
        for (id, skill) in completed {
            if let Some(unit) = world.unit_mut(id) {
                unit.caster.active = None;
            }
            self.events.push(EngineEvent::CastCompleted { caster: id, skill });
        }
    }
}
