//! Effect dispatch.
//!
//! `execute_effect` applies one configured effect to one target: gate on
//! the effect's own condition, re-resolve targets when the effect
//! carries override targeting, resolve numeric parameters through the
//! modifier fold, then dispatch by kind. Missing collaborators (no
//! health on a heal target, resource kind mismatch) skip silently.

use glam::Vec3;

use crate::buffs;
use crate::cast::{CastContext, CastEngine, CastInput};
use crate::condition;
use crate::core::{EntityId, TargetList};
use crate::skill::StepTrigger;
use crate::targeting::resolve_targets;
use crate::world::{resolve, Unit, World};

use super::effect::{EffectConfig, EffectKind, MoveKind};

impl CastEngine {
    /// Apply one effect to one target (or to a re-targeted set when the
    /// effect configures its own targeting).
    pub fn execute_effect(
        &mut self,
        world: &mut World,
        effect: &EffectConfig,
        ctx: &CastContext,
        target: EntityId,
        trigger: StepTrigger,
    ) {
        let resolved = resolve(world, target);
        if !condition::evaluate(
            effect.condition.as_ref(),
            world,
            ctx.caster,
            resolved.as_ref(),
            &mut self.rng,
        ) {
            return;
        }

        if let Some(cfg) = &effect.targeting {
            let mut redirected = TargetList::new();
            resolve_targets(world, &mut self.rng, ctx, cfg, Some(target), &mut redirected);
            for redirect in redirected {
                self.apply_effect(world, effect, ctx, redirect, trigger);
            }
        } else {
            self.apply_effect(world, effect, ctx, target, trigger);
        }
    }

    fn apply_effect(
        &mut self,
        world: &mut World,
        effect: &EffectConfig,
        ctx: &CastContext,
        target: EntityId,
        trigger: StepTrigger,
    ) {
        match &effect.kind {
            EffectKind::Damage { amount } => {
                let amount = self.resolve_param(world, effect, ctx, *amount);
                world.apply_damage(target, amount);
                // Landing damage raises on-hit steps, but never from a
                // step that was itself hit-triggered.
                if matches!(trigger, StepTrigger::CastStart | StepTrigger::CastComplete) {
                    self.notify_hit(ctx, target);
                }
            }

            EffectKind::Heal { amount } => {
                let amount = self.resolve_param(world, effect, ctx, *amount);
                world.apply_heal(target, amount);
            }

            EffectKind::ApplyBuff { buff, stacks } => {
                world.apply_buff(target, buff, *stacks);
            }

            EffectKind::RemoveBuff { buff } => {
                world.remove_buff(target, *buff);
            }

            EffectKind::Projectile { speed, max_range } => {
                let speed = self.resolve_param(world, effect, ctx, *speed);
                let Some(caster) = world.unit(ctx.caster) else {
                    return;
                };
                let origin = caster.position;
                let (direction, homing) = if target != ctx.caster {
                    match world.unit(target) {
                        Some(unit) => {
                            ((unit.position - origin).normalize_or_zero(), Some(target))
                        }
                        None => return,
                    }
                } else {
                    (ctx.aim_dir.unwrap_or(caster.facing), None)
                };
                self.projectiles
                    .spawn(origin, direction, speed, *max_range, homing, ctx.clone());
            }

            EffectKind::Move { kind, distance } => {
                let distance = self.resolve_param(world, effect, ctx, *distance);
                let Some(caster) = world.unit(ctx.caster) else {
                    return;
                };
                let caster_pos = caster.position;
                let caster_facing = caster.facing;
                let Some(unit) = world.unit_mut(target) else {
                    return;
                };
                let direction = match kind {
                    MoveKind::Knockback => (unit.position - caster_pos).normalize_or_zero(),
                    MoveKind::Pull => (caster_pos - unit.position).normalize_or_zero(),
                    MoveKind::Dash => caster_facing,
                };
                // Instantaneous offset, not physics-integrated motion.
                if direction != Vec3::ZERO {
                    unit.position += direction * distance;
                }
            }

            EffectKind::Resource { kind, amount } => {
                let amount = self.resolve_param(world, effect, ctx, *amount);
                if amount >= 0.0 {
                    world.restore_resource(target, *kind, amount);
                } else if !world.spend_resource(target, *kind, -amount) {
                    log::debug!("resource drain skipped on {target}");
                }
            }

            EffectKind::Summon { health, tags } => {
                let position = world
                    .unit(target)
                    .or_else(|| world.unit(ctx.caster))
                    .map(|u| u.position)
                    .unwrap_or(Vec3::ZERO);
                let team = world.unit(ctx.caster).and_then(|u| u.team);
                let mut unit = Unit::new(position).with_health(*health);
                unit.team = team;
                for tag in tags {
                    unit.tags.insert(tag.clone());
                }
                world.spawn(unit);
            }

            EffectKind::TriggerSkill { skill } => {
                // Rejections here are routine (cooldown, already casting).
                if let Err(err) = self.try_cast(world, ctx.caster, skill, CastInput::at(target)) {
                    log::debug!("triggered {} rejected: {err}", skill.id);
                }
            }
        }
    }

    fn resolve_param(
        &mut self,
        world: &World,
        effect: &EffectConfig,
        ctx: &CastContext,
        base: f32,
    ) -> f32 {
        buffs::effect_param(
            world,
            &mut self.rng,
            ctx.caster,
            effect.kind.param_key(),
            base,
            &ctx.skill.tags,
            &effect.tags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffs::{BuffConfig, BuffId, ModifierConfig, ModifierOp};
    use crate::condition::{Condition, ConditionEntry, ConditionSubject};
    use crate::core::{ResourceKind, Team};
    use crate::skill::{SkillConfig, SkillId};
    use crate::targeting::{TargetingConfig, TeamFilter};

    fn engine() -> CastEngine {
        CastEngine::new(7)
    }

    fn setup() -> (World, CastEngine, EntityId, CastContext) {
        let mut world = World::new();
        let caster = world.spawn(
            Unit::new(Vec3::ZERO)
                .with_team(Team::new(0))
                .with_health(100.0)
                .with_facing(Vec3::NEG_Z),
        );
        let skill = SkillConfig::new(SkillId::new(1), "Strike", TargetingConfig::single(10.0))
            .with_tag("physical")
            .build();
        let ctx = CastContext {
            caster,
            source: caster,
            skill,
            aim_point: None,
            aim_dir: None,
        };
        (world, engine(), caster, ctx)
    }

    fn enemy(world: &mut World, pos: Vec3) -> EntityId {
        world.spawn(Unit::new(pos).with_team(Team::new(1)).with_health(100.0))
    }

    fn health(world: &World, id: EntityId) -> f32 {
        world.unit(id).unwrap().health.unwrap().current
    }

    #[test]
    fn test_damage_passes_through_modifier_fold() {
        let (mut world, mut engine, caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -3.0));

        let buff = BuffConfig::new(BuffId::new(1), "Empower")
            .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Add, 5.0))
            .build();
        world.apply_buff(caster, &buff, 1);

        let effect = EffectConfig::new(EffectKind::Damage { amount: 10.0 });
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(health(&world, target), 85.0);
    }

    #[test]
    fn test_effect_condition_gates() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -3.0));

        let effect = EffectConfig::new(EffectKind::Damage { amount: 10.0 }).with_condition(
            Condition::all([ConditionEntry::HasTag {
                subject: ConditionSubject::Target,
                tag: "marked".into(),
            }]),
        );
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(health(&world, target), 100.0);

        world.unit_mut(target).unwrap().tags.insert("marked".into());
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(health(&world, target), 90.0);
    }

    #[test]
    fn test_override_targeting_redirects() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let primary = enemy(&mut world, Vec3::new(0.0, 0.0, -3.0));
        let nearby = enemy(&mut world, Vec3::new(1.0, 0.0, -3.0));

        // Splash: re-target everything around the caster.
        let effect = EffectConfig::new(EffectKind::Damage { amount: 10.0 })
            .with_targeting(TargetingConfig::sphere(10.0, 8));
        engine.execute_effect(&mut world, &effect, &ctx, primary, StepTrigger::CastComplete);

        assert_eq!(health(&world, primary), 90.0);
        assert_eq!(health(&world, nearby), 90.0);
    }

    #[test]
    fn test_heal_clamped_at_max() {
        let (mut world, mut engine, caster, ctx) = setup();
        world.apply_damage(caster, 30.0);

        let effect = EffectConfig::new(EffectKind::Heal { amount: 500.0 });
        engine.execute_effect(&mut world, &effect, &ctx, caster, StepTrigger::CastComplete);
        assert_eq!(health(&world, caster), 100.0);
    }

    #[test]
    fn test_heal_on_healthless_target_skips() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let dummy = world.spawn(Unit::new(Vec3::new(0.0, 0.0, -2.0)));

        let effect = EffectConfig::new(EffectKind::Heal { amount: 10.0 });
        engine.execute_effect(&mut world, &effect, &ctx, dummy, StepTrigger::CastComplete);
        assert!(world.unit(dummy).unwrap().health.is_none());
    }

    #[test]
    fn test_apply_and_remove_buff() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -3.0));
        let buff = BuffConfig::new(BuffId::new(2), "Weaken").with_max_stacks(5).build();

        let apply = EffectConfig::new(EffectKind::ApplyBuff {
            buff: buff.clone(),
            stacks: 2,
        });
        engine.execute_effect(&mut world, &apply, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.buff_stacks(target, BuffId::new(2)), 2);

        let remove = EffectConfig::new(EffectKind::RemoveBuff { buff: BuffId::new(2) });
        engine.execute_effect(&mut world, &remove, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.buff_stacks(target, BuffId::new(2)), 0);
    }

    #[test]
    fn test_knockback_and_pull() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -4.0));

        let knockback = EffectConfig::new(EffectKind::Move {
            kind: MoveKind::Knockback,
            distance: 2.0,
        });
        engine.execute_effect(&mut world, &knockback, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.unit(target).unwrap().position, Vec3::new(0.0, 0.0, -6.0));

        let pull = EffectConfig::new(EffectKind::Move {
            kind: MoveKind::Pull,
            distance: 3.0,
        });
        engine.execute_effect(&mut world, &pull, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.unit(target).unwrap().position, Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn test_dash_moves_along_facing() {
        let (mut world, mut engine, caster, ctx) = setup();

        let dash = EffectConfig::new(EffectKind::Move {
            kind: MoveKind::Dash,
            distance: 5.0,
        });
        engine.execute_effect(&mut world, &dash, &ctx, caster, StepTrigger::CastComplete);
        assert_eq!(world.unit(caster).unwrap().position, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_resource_sign_selects_restore_or_spend() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = world.spawn(
            Unit::new(Vec3::new(0.0, 0.0, -2.0)).with_resource(ResourceKind::Mana, 100.0),
        );
        world.spend_resource(target, ResourceKind::Mana, 50.0);

        let restore = EffectConfig::new(EffectKind::Resource {
            kind: ResourceKind::Mana,
            amount: 20.0,
        });
        engine.execute_effect(&mut world, &restore, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.unit(target).unwrap().resource.unwrap().current, 70.0);

        let drain = EffectConfig::new(EffectKind::Resource {
            kind: ResourceKind::Mana,
            amount: -30.0,
        });
        engine.execute_effect(&mut world, &drain, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.unit(target).unwrap().resource.unwrap().current, 40.0);

        // Kind mismatch is a silent skip.
        let wrong = EffectConfig::new(EffectKind::Resource {
            kind: ResourceKind::Energy,
            amount: 10.0,
        });
        engine.execute_effect(&mut world, &wrong, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(world.unit(target).unwrap().resource.unwrap().current, 40.0);
    }

    #[test]
    fn test_summon_inherits_team_at_target_position() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -6.0));

        let effect = EffectConfig::new(EffectKind::Summon {
            health: 40.0,
            tags: vec!["summoned".into()],
        });
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);

        let summoned = world
            .units()
            .find(|(_, u)| u.tags.contains("summoned"))
            .map(|(id, _)| id)
            .unwrap();
        let unit = world.unit(summoned).unwrap();
        assert_eq!(unit.position, Vec3::new(0.0, 0.0, -6.0));
        assert_eq!(unit.team, Some(Team::new(0)));
        assert_eq!(unit.health.unwrap().max, 40.0);
        assert!(unit.is_root);
    }

    #[test]
    fn test_projectile_spawns_toward_target() {
        let (mut world, mut engine, _caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -8.0));

        let effect = EffectConfig::new(EffectKind::Projectile {
            speed: 20.0,
            max_range: 30.0,
        });
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);
        assert_eq!(engine.live_projectiles(), 1);
    }

    #[test]
    fn test_trigger_skill_casts_on_same_caster() {
        let (mut world, mut engine, caster, ctx) = setup();
        let target = enemy(&mut world, Vec3::new(0.0, 0.0, -3.0));

        let followup = SkillConfig::new(
            SkillId::new(9),
            "Followup",
            TargetingConfig::single(10.0).with_team(TeamFilter::Enemy),
        )
        .with_step(crate::skill::StepConfig::new(
            StepTrigger::CastStart,
            [EffectConfig::new(EffectKind::Damage { amount: 5.0 })],
        ))
        .build();

        let effect = EffectConfig::new(EffectKind::TriggerSkill { skill: followup });
        engine.execute_effect(&mut world, &effect, &ctx, target, StepTrigger::CastComplete);

        // The recursive cast scheduled its own step.
        assert_eq!(engine.pending_steps(), 1);
        engine.tick(&mut world, 0.0);
        assert_eq!(health(&world, target), 95.0);
        let _ = caster;
    }
}
