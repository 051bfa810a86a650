//! Modifier resolver tests.
//!
//! The fold is non-commutative and ordered: adds sum, multiplies sum,
//! overrides discard everything. These tests pin the exact arithmetic
//! the rest of the engine leans on.

use glam::Vec3;
use proptest::prelude::*;
use skillcast::buffs::{effect_param, skill_param};
use skillcast::world::Unit;
use skillcast::{
    BuffConfig, BuffId, EntityId, GameRng, ModifierConfig, ModifierOp, World,
};

fn arena() -> (World, EntityId) {
    let mut world = World::new();
    let caster = world.spawn(Unit::new(Vec3::ZERO).with_health(100.0));
    (world, caster)
}

/// base=10, Add(+5), Multiply(+0.5), one stack each: exactly 22.5.
#[test]
fn test_reference_fold() {
    let (mut world, caster) = arena();
    let buff = BuffConfig::new(BuffId::new(1), "Empower")
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Add, 5.0))
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Multiply, 0.5))
        .build();
    world.apply_buff(caster, &buff, 1);

    let mut rng = GameRng::new(0);
    let v = effect_param(&world, &mut rng, caster, "damage", 10.0, &[], &[]);
    assert_eq!(v, 22.5);
}

/// Contributions from separate buffs accumulate into the same fold.
#[test]
fn test_cross_buff_accumulation() {
    let (mut world, caster) = arena();
    let a = BuffConfig::new(BuffId::new(1), "A")
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Add, 3.0))
        .build();
    let b = BuffConfig::new(BuffId::new(2), "B")
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Add, 7.0))
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Multiply, 1.0))
        .build();
    world.apply_buff(caster, &a, 1);
    world.apply_buff(caster, &b, 1);

    let mut rng = GameRng::new(0);
    let v = effect_param(&world, &mut rng, caster, "damage", 10.0, &[], &[]);
    assert_eq!(v, 40.0); // (10 + 3 + 7) * (1 + 1)
}

/// Buff expiry removes its contribution on the next resolution.
#[test]
fn test_expired_buff_stops_contributing() {
    let (mut world, caster) = arena();
    let buff = BuffConfig::new(BuffId::new(1), "Brief")
        .with_duration(1.0)
        .with_modifier(ModifierConfig::effect_param("damage", ModifierOp::Add, 5.0))
        .build();
    world.apply_buff(caster, &buff, 1);

    let mut rng = GameRng::new(0);
    assert_eq!(effect_param(&world, &mut rng, caster, "damage", 10.0, &[], &[]), 15.0);

    world.tick_buffs(1.5);
    assert_eq!(effect_param(&world, &mut rng, caster, "damage", 10.0, &[], &[]), 10.0);
}

/// Skill parameters resolve through the same fold as effect parameters.
#[test]
fn test_skill_param_entry_point() {
    let (mut world, caster) = arena();
    let buff = BuffConfig::new(BuffId::new(1), "Focus")
        .with_modifier(ModifierConfig::skill_param("cost", ModifierOp::Multiply, -0.2))
        .build();
    world.apply_buff(caster, &buff, 1);

    let mut rng = GameRng::new(0);
    let v = skill_param(&world, &mut rng, caster, "cost", 50.0, &[]);
    assert_eq!(v, 40.0); // 50 * (1 - 0.2)
}

proptest! {
    /// The fold equals `(base + adds) * (1 + mults)` for arbitrary
    /// contributions and stack counts.
    #[test]
    fn prop_fold_formula(
        base in -100.0f32..100.0,
        add in -10.0f32..10.0,
        mult in -0.9f32..2.0,
        stacks in 1u32..5,
    ) {
        let (mut world, caster) = arena();
        let buff = BuffConfig::new(BuffId::new(1), "Var")
            .with_max_stacks(8)
            .with_modifier(ModifierConfig::effect_param("x", ModifierOp::Add, add))
            .with_modifier(ModifierConfig::effect_param("x", ModifierOp::Multiply, mult))
            .build();
        world.apply_buff(caster, &buff, stacks);

        let mut rng = GameRng::new(0);
        let got = effect_param(&world, &mut rng, caster, "x", base, &[], &[]);
        let s = stacks as f32;
        let want = (base + add * s) * (1.0 + mult * s);
        prop_assert!((got - want).abs() <= 1e-3 * want.abs().max(1.0));
    }

    /// Any matching Override forces the result to its raw value,
    /// regardless of concurrently matching Add/Multiply entries.
    #[test]
    fn prop_override_wins(
        base in -100.0f32..100.0,
        add in -50.0f32..50.0,
        mult in -2.0f32..2.0,
        fixed in -25.0f32..25.0,
    ) {
        let (mut world, caster) = arena();
        let buff = BuffConfig::new(BuffId::new(1), "Pin")
            .with_modifier(ModifierConfig::effect_param("x", ModifierOp::Add, add))
            .with_modifier(ModifierConfig::effect_param("x", ModifierOp::Override, fixed))
            .with_modifier(ModifierConfig::effect_param("x", ModifierOp::Multiply, mult))
            .build();
        world.apply_buff(caster, &buff, 1);

        let mut rng = GameRng::new(0);
        let got = effect_param(&world, &mut rng, caster, "x", base, &[], &[]);
        prop_assert_eq!(got, fixed);
    }
}
