//! Determinism testing utilities.
//!
//! Provides a harness for verifying that combat resolution and AI decisions
//! produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and forecasts rely on the battle core being 100% deterministic.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: percent modifiers use
//!   [`tactics_core::math::Fixed`] instead.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Grid queries always return sorted positions.
//!
//! - **Shared RNG state**: each [`CombatEngine`] owns its generator, so
//!   engines never observe each other's rolls.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tactics_core::combat::{CombatEngine, CombatResult, Engagement};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps run per attempt.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of independent attempts
/// * `steps` - Number of steps per attempt
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Hashes the final state
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// An engine plus the log of results it produced.
#[derive(Debug, Clone)]
pub struct CombatLog {
    /// Engine under test.
    pub engine: CombatEngine,
    /// Results in order.
    pub results: Vec<CombatResult>,
}

impl CombatLog {
    /// Hash of every result plus the final RNG state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.engine.rng_seed().hash(&mut hasher);
        self.results.hash(&mut hasher);
        hasher.finish()
    }
}

/// Resolve `engagement` `exchanges` times on fresh engines seeded with
/// `seed`, `runs` times over, and compare.
#[must_use]
pub fn verify_combat_determinism(engagement: &Engagement, seed: u32, runs: usize, exchanges: u64) -> DeterminismResult {
    verify_determinism(
        runs,
        exchanges,
        || CombatLog {
            engine: CombatEngine::with_seed(seed),
            results: Vec::new(),
        },
        |log| {
            let result = log.engine.resolve_combat(engagement);
            log.results.push(result);
        },
        CombatLog::state_hash,
    )
}

/// Compare two engines exchange by exchange and report the first index at
/// which their results differ.
#[must_use]
pub fn find_first_divergence(first: &mut CombatEngine, second: &mut CombatEngine, engagements: &[Engagement]) -> Option<usize> {
    engagements.iter().position(|engagement| {
        first.resolve_combat(engagement) != second.resolve_combat(engagement)
    })
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for the battle core.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the calculators and the engine.
pub mod strategies {
    use proptest::prelude::*;
    use tactics_core::combat::Engagement;
    use tactics_core::terrain::{TerrainKind, TerrainView};
    use tactics_core::units::{ClassTag, CombatantSnapshot, MovementType, Stats};
    use tactics_core::weapons::{Element, WeaponCategory, WeaponView};

    /// Generate a stat value (0-40).
    pub fn arb_stat() -> impl Strategy<Value = i32> {
        0i32..=40
    }

    /// Generate a full stat block.
    pub fn arb_stats() -> impl Strategy<Value = Stats> {
        (
            (arb_stat(), arb_stat(), arb_stat(), arb_stat()),
            (arb_stat(), arb_stat(), arb_stat(), 1i32..=8),
        )
            .prop_map(
                |((strength, magic, skill, speed), (luck, defense, resistance, movement))| Stats {
                    strength,
                    magic,
                    skill,
                    speed,
                    luck,
                    defense,
                    resistance,
                    movement,
                },
            )
    }

    /// Generate any class.
    pub fn arb_class() -> impl Strategy<Value = ClassTag> {
        prop_oneof![
            Just(ClassTag::Lord),
            Just(ClassTag::Mercenary),
            Just(ClassTag::Fighter),
            Just(ClassTag::Berserker),
            Just(ClassTag::Knight),
            Just(ClassTag::Sniper),
            Just(ClassTag::Thief),
            Just(ClassTag::Assassin),
            Just(ClassTag::Mage),
            Just(ClassTag::Cleric),
        ]
    }

    /// Generate a movement type.
    pub fn arb_movement_type() -> impl Strategy<Value = MovementType> {
        prop_oneof![
            Just(MovementType::Infantry),
            Just(MovementType::Armored),
            Just(MovementType::Cavalry),
            Just(MovementType::Flying),
        ]
    }

    /// Generate a weapon category.
    pub fn arb_category() -> impl Strategy<Value = WeaponCategory> {
        prop_oneof![
            Just(WeaponCategory::Sword),
            Just(WeaponCategory::Lance),
            Just(WeaponCategory::Axe),
            Just(WeaponCategory::Bow),
            Just(WeaponCategory::Tome),
            Just(WeaponCategory::Staff),
        ]
    }

    /// Generate an element.
    pub fn arb_element() -> impl Strategy<Value = Element> {
        prop_oneof![
            Just(Element::Fire),
            Just(Element::Wind),
            Just(Element::Thunder),
            Just(Element::Light),
            Just(Element::Dark),
        ]
    }

    /// Generate a weapon, possibly forged and possibly effective.
    pub fn arb_weapon() -> impl Strategy<Value = WeaponView> {
        (
            arb_category(),
            proptest::option::of(arb_element()),
            (0i32..=20, 40i32..=100, 0i32..=40),
            (0i32..=5, 0i32..=20, 0i32..=10),
            proptest::option::of(arb_movement_type()),
        )
            .prop_map(|(category, element, (might, hit, crit), (fm, fh, fc), effective)| {
                let mut weapon = WeaponView::new("generated", category, might, hit, crit).with_forge(fm, fh, fc);
                if category.is_magical() {
                    if let Some(element) = element {
                        weapon = weapon.with_element(element);
                    }
                }
                if let Some(movement_type) = effective {
                    weapon = weapon.effective_against(movement_type);
                }
                weapon
            })
    }

    /// Generate terrain at height 0-2.
    pub fn arb_terrain() -> impl Strategy<Value = TerrainView> {
        (
            prop_oneof![
                Just(TerrainKind::Plain),
                Just(TerrainKind::Forest),
                Just(TerrainKind::Fortress),
                Just(TerrainKind::Hill),
                Just(TerrainKind::Village),
            ],
            0i32..=2,
        )
            .prop_map(|(kind, height)| kind.view().with_height(height))
    }

    /// Generate a combatant with the given id.
    pub fn arb_combatant(id: &'static str) -> impl Strategy<Value = CombatantSnapshot> {
        (arb_class(), 10i32..=60, arb_stats(), 1i32..=20, arb_movement_type(), 0u8..=100)
            .prop_map(move |(class, max_hp, stats, level, movement_type, hp_percent)| {
                let hp = (max_hp * i32::from(hp_percent) / 100).max(1);
                CombatantSnapshot::new(id, class, max_hp, stats)
                    .with_level(level)
                    .with_hp(hp)
                    .with_movement_type(movement_type)
            })
    }

    /// Generate a full engagement at distance 1-2.
    pub fn arb_engagement() -> impl Strategy<Value = Engagement> {
        (
            arb_combatant("attacker"),
            arb_combatant("defender"),
            arb_weapon(),
            proptest::option::of(arb_weapon()),
            (arb_terrain(), arb_terrain()),
            1u32..=2,
            (0i32..=3, 0i32..=3),
        )
            .prop_map(
                |(attacker, defender, weapon, defender_weapon, (atk_terrain, def_terrain), distance, (atk_allies, def_allies))| {
                    let mut engagement = Engagement::new(attacker, defender, weapon, distance)
                        .on_terrain(atk_terrain, def_terrain)
                        .with_support(atk_allies, def_allies);
                    engagement.defender_weapon = defender_weapon;
                    engagement
                },
            )
    }

    /// Generate an RNG seed.
    pub fn arb_seed() -> impl Strategy<Value = u32> {
        any::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{axeman, iron_axe, iron_sword, swordsman};
    use proptest::prelude::*;

    fn duel() -> Engagement {
        Engagement::new(swordsman("a"), axeman("d"), iron_sword(), 1).with_defender_weapon(iron_axe())
    }

    #[test]
    fn test_combat_is_deterministic() {
        verify_combat_determinism(&duel(), 42, 4, 25).assert_deterministic();
    }

    #[test]
    fn test_harness_detects_divergence() {
        let result = verify_determinism(
            2,
            1,
            || std::cell::Cell::new(0u64),
            |_| {},
            |_| {
                static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
                COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            },
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_find_first_divergence() {
        let engagements = vec![duel(); 10];
        let mut a = CombatEngine::with_seed(7);
        let mut b = CombatEngine::with_seed(7);
        assert_eq!(find_first_divergence(&mut a, &mut b, &engagements), None);

        let mut c = CombatEngine::with_seed(7);
        let mut d = CombatEngine::with_seed(8);
        assert!(find_first_divergence(&mut c, &mut d, &engagements).is_some());
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&duel()), compute_hash(&duel()));
    }

    proptest! {
        #[test]
        fn prop_any_engagement_is_reproducible(engagement in strategies::arb_engagement(), seed in strategies::arb_seed()) {
            let result = verify_combat_determinism(&engagement, seed, 2, 3);
            prop_assert!(result.is_deterministic);
        }
    }
}
