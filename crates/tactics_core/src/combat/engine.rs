//! Combat engine: forecast, resolution and skill execution.
//!
//! # Determinism
//!
//! The engine owns its [`CombatRng`]. Only [`CombatEngine::resolve_combat`]
//! draws from it: one roll per strike for hit and one more for critical when
//! the strike lands. Forecasts and skills never touch the generator, so two
//! engines created with the same seed and fed the same engagements produce
//! identical results.
//!
//! # Example
//!
//! ```
//! use tactics_core::combat::{CombatEngine, Engagement};
//! use tactics_core::units::{ClassTag, CombatantSnapshot, Stats};
//! use tactics_core::weapons::{WeaponCategory, WeaponView};
//!
//! let stats = Stats { strength: 15, skill: 10, speed: 8, ..Stats::default() };
//! let attacker = CombatantSnapshot::new("hero", ClassTag::Lord, 30, stats);
//! let defender = CombatantSnapshot::new("brigand", ClassTag::Fighter, 25, Stats::default());
//! let sword = WeaponView::new("iron_sword", WeaponCategory::Sword, 5, 90, 0);
//!
//! let engagement = Engagement::new(attacker, defender, sword, 1);
//! let mut engine = CombatEngine::with_seed(7);
//! let forecast = engine.battle_forecast(&engagement);
//! let result = engine.resolve_combat(&engagement);
//! assert!(forecast.attacker_doubles());
//! assert!(result.rounds.len() <= 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::combat::damage::{apply_critical, calculate_damage_with_height};
use crate::combat::exp::calculate_exp_gain;
use crate::combat::hit::{calculate_crit_rate, calculate_hit_rate};
use crate::combat::result::{BattleForecast, CombatResult, CombatRound, ForecastSide, SkillEffect, SkillOutcome, SkillView};
use crate::combat::rng::CombatRng;
use crate::combat::triangle::matchup_bonus;
use crate::config::CombatRules;
use crate::terrain::TerrainView;
use crate::units::{CombatantSnapshot, Stat, UnitId};
use crate::weapons::WeaponView;

// ============================================================================
// Engagement
// ============================================================================

/// Everything needed to forecast or resolve one exchange.
///
/// Forecast and resolution take the same value so a preview always matches
/// the numbers used when the exchange is fought.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Engagement {
    /// Initiating unit.
    pub attacker: CombatantSnapshot,
    /// Unit being attacked.
    pub defender: CombatantSnapshot,
    /// Weapon the attacker strikes with.
    pub attacker_weapon: WeaponView,
    /// Weapon the defender holds, if any.
    pub defender_weapon: Option<WeaponView>,
    /// Tile under the attacker.
    pub attacker_terrain: TerrainView,
    /// Tile under the defender.
    pub defender_terrain: TerrainView,
    /// Tile distance between the two.
    pub distance: u32,
    /// Allies adjacent to the attacker.
    pub attacker_allies: i32,
    /// Allies adjacent to the defender.
    pub defender_allies: i32,
}

impl Engagement {
    /// Engagement on open ground with no support and an unarmed defender.
    #[must_use]
    pub fn new(
        attacker: CombatantSnapshot,
        defender: CombatantSnapshot,
        attacker_weapon: WeaponView,
        distance: u32,
    ) -> Self {
        Self {
            attacker,
            defender,
            attacker_weapon,
            defender_weapon: None,
            attacker_terrain: TerrainView::plain(),
            defender_terrain: TerrainView::plain(),
            distance,
            attacker_allies: 0,
            defender_allies: 0,
        }
    }

    /// Builder method to arm the defender.
    #[must_use]
    pub fn with_defender_weapon(mut self, weapon: WeaponView) -> Self {
        self.defender_weapon = Some(weapon);
        self
    }

    /// Builder method to set both tiles.
    #[must_use]
    pub fn on_terrain(mut self, attacker_terrain: TerrainView, defender_terrain: TerrainView) -> Self {
        self.attacker_terrain = attacker_terrain;
        self.defender_terrain = defender_terrain;
        self
    }

    /// Builder method to set adjacent ally counts.
    #[must_use]
    pub fn with_support(mut self, attacker_allies: i32, defender_allies: i32) -> Self {
        self.attacker_allies = attacker_allies;
        self.defender_allies = defender_allies;
        self
    }

    /// The defender's weapon if it reaches the attacker.
    #[must_use]
    pub fn counter_weapon(&self) -> Option<&WeaponView> {
        self.defender_weapon
            .as_ref()
            .filter(|weapon| weapon.reaches(self.distance))
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves combat between two units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEngine {
    rules: CombatRules,
    rng: CombatRng,
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatEngine {
    /// Engine with the default rules and seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(CombatRules::default())
    }

    /// Engine with the default rules and the given seed.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            rules: CombatRules::default(),
            rng: CombatRng::with_seed(seed),
        }
    }

    /// Engine with custom rules, seeded from `rules.default_seed`.
    #[must_use]
    pub fn with_rules(rules: CombatRules) -> Self {
        Self {
            rng: CombatRng::with_seed(rules.default_seed),
            rules,
        }
    }

    /// Reseed the generator.
    pub fn set_rng_seed(&mut self, seed: u32) {
        tracing::debug!(seed, "Reseeding combat RNG");
        self.rng = CombatRng::with_seed(seed);
    }

    /// Current generator state.
    #[must_use]
    pub const fn rng_seed(&self) -> u32 {
        self.rng.seed()
    }

    /// Rules in use.
    #[must_use]
    pub const fn rules(&self) -> &CombatRules {
        &self.rules
    }

    /// Whether a unit with `speed` strikes twice against one with `opponent_speed`.
    #[must_use]
    pub const fn can_double(&self, speed: i32, opponent_speed: i32) -> bool {
        speed - opponent_speed > self.rules.double_threshold
    }

    /// Preview the exchange without consuming any rolls.
    #[must_use]
    pub fn battle_forecast(&self, engagement: &Engagement) -> BattleForecast {
        let attacker = &engagement.attacker;
        let defender = &engagement.defender;

        let attack = self.side_forecast(
            attacker,
            defender,
            &engagement.attacker_weapon,
            engagement.defender_weapon.as_ref(),
            &engagement.attacker_terrain,
            &engagement.defender_terrain,
            engagement.distance,
            engagement.attacker_allies,
            engagement.defender_allies,
        );

        let counter = engagement.counter_weapon().map(|weapon| {
            self.side_forecast(
                defender,
                attacker,
                weapon,
                Some(&engagement.attacker_weapon),
                &engagement.defender_terrain,
                &engagement.attacker_terrain,
                engagement.distance,
                engagement.defender_allies,
                engagement.attacker_allies,
            )
        });

        BattleForecast {
            attacker: attack,
            defender: counter,
        }
    }

    fn side_forecast(
        &self,
        actor: &CombatantSnapshot,
        target: &CombatantSnapshot,
        weapon: &WeaponView,
        target_weapon: Option<&WeaponView>,
        actor_terrain: &TerrainView,
        target_terrain: &TerrainView,
        distance: u32,
        actor_allies: i32,
        target_allies: i32,
    ) -> ForecastSide {
        let rules = &self.rules;
        let triangle = matchup_bonus(weapon, target_weapon, rules);
        ForecastSide {
            damage: calculate_damage_with_height(
                actor,
                target,
                weapon,
                target_weapon,
                actor_terrain,
                target_terrain,
                distance,
                rules,
            ),
            hit: calculate_hit_rate(
                actor,
                target,
                weapon,
                target_terrain,
                actor_allies,
                triangle.hit_bonus,
                Some(actor_terrain),
                target_allies,
                rules,
            ),
            crit: calculate_crit_rate(actor, target, weapon),
            doubles: self.can_double(actor.stats.speed, target.stats.speed),
        }
    }

    /// Fight the exchange, consuming rolls.
    ///
    /// Round order: attacker, defender counter, attacker follow-up,
    /// defender follow-up. Each round requires both units alive. The
    /// counter rounds also require a defender weapon that reaches, and the
    /// follow-ups require the speed lead.
    pub fn resolve_combat(&mut self, engagement: &Engagement) -> CombatResult {
        let forecast = self.battle_forecast(engagement);
        let attacker = &engagement.attacker;
        let defender = &engagement.defender;

        let mut exchange = Exchange {
            attacker_id: &attacker.id,
            defender_id: &defender.id,
            attacker_hp: attacker.current_hp.max(0),
            defender_hp: defender.current_hp.max(0),
            damage_to_defender: 0,
            rounds: Vec::with_capacity(4),
        };

        if exchange.both_standing() {
            self.strike(&mut exchange, Side::Attacker, forecast.attacker);
        }
        if let Some(counter) = forecast.defender {
            if exchange.both_standing() {
                self.strike(&mut exchange, Side::Defender, counter);
            }
        }
        if forecast.attacker.doubles && exchange.both_standing() {
            self.strike(&mut exchange, Side::Attacker, forecast.attacker);
        }
        if let Some(counter) = forecast.defender {
            if counter.doubles && exchange.both_standing() {
                self.strike(&mut exchange, Side::Defender, counter);
            }
        }

        let killed = exchange.defender_hp <= 0;
        let attacker_exp = calculate_exp_gain(attacker, defender, exchange.damage_to_defender, killed, &self.rules);

        let result = CombatResult {
            attacker_id: attacker.id.clone(),
            defender_id: defender.id.clone(),
            rounds: exchange.rounds,
            attacker_exp,
            defender_exp: 0,
            attacker_level_up: None,
            defender_level_up: None,
            attacker_hp: exchange.attacker_hp,
            defender_hp: exchange.defender_hp,
        };

        #[cfg(feature = "debug-validation")]
        validate_result(&result, engagement);

        tracing::debug!(
            attacker = %result.attacker_id,
            defender = %result.defender_id,
            rounds = result.rounds.len(),
            attacker_hp = result.attacker_hp,
            defender_hp = result.defender_hp,
            exp = result.attacker_exp,
            seed = self.rng.seed(),
            "Resolved combat"
        );

        result
    }

    fn strike(&mut self, exchange: &mut Exchange<'_>, side: Side, numbers: ForecastSide) {
        let hit_roll = self.rng.next_roll();
        let hit = hit_roll < numbers.hit;
        let (critical, crit_roll) = if hit {
            let roll = self.rng.next_roll();
            (roll < numbers.crit, Some(roll))
        } else {
            (false, None)
        };

        let damage = match (hit, critical) {
            (false, _) => 0,
            (true, false) => numbers.damage,
            (true, true) => apply_critical(numbers.damage, &self.rules),
        };

        let (actor_id, target_id) = match side {
            Side::Attacker => {
                exchange.defender_hp = (exchange.defender_hp - damage).max(0);
                exchange.damage_to_defender += damage;
                (exchange.attacker_id, exchange.defender_id)
            }
            Side::Defender => {
                exchange.attacker_hp = (exchange.attacker_hp - damage).max(0);
                (exchange.defender_id, exchange.attacker_id)
            }
        };

        tracing::trace!(
            actor = %actor_id,
            hit_roll,
            hit_rate = numbers.hit,
            crit_roll,
            crit_rate = numbers.crit,
            damage,
            "Strike"
        );

        exchange.rounds.push(CombatRound {
            actor_id: actor_id.clone(),
            target_id: target_id.clone(),
            damage,
            hit,
            critical,
            attacker_hp: exchange.attacker_hp,
            defender_hp: exchange.defender_hp,
        });
    }

    /// Apply a skill from `caster` to each target in order.
    ///
    /// Skills always land and never crit, draw no rolls and award no exp.
    /// Healing is recorded as negative damage equal to the HP restored.
    #[must_use]
    pub fn execute_skill(
        &self,
        caster: &CombatantSnapshot,
        targets: &[CombatantSnapshot],
        skill: &SkillView,
    ) -> SkillOutcome {
        let rounds = targets
            .iter()
            .map(|target| {
                let (damage, hp_after) = match skill.effect {
                    SkillEffect::Damage { base, scaling } => {
                        let resist = if scaling == Stat::Magic {
                            target.stats.resistance
                        } else {
                            target.stats.defense
                        };
                        let amount = (base + caster.stats.get(scaling) - resist).max(0);
                        (amount, (target.current_hp - amount).max(0))
                    }
                    SkillEffect::Heal { base } => {
                        let amount = (base + caster.stats.magic).max(0);
                        let restored = amount.min(target.max_hp - target.current_hp).max(0);
                        (-restored, target.current_hp + restored)
                    }
                };
                CombatRound {
                    actor_id: caster.id.clone(),
                    target_id: target.id.clone(),
                    damage,
                    hit: true,
                    critical: false,
                    attacker_hp: caster.current_hp,
                    defender_hp: hp_after,
                }
            })
            .collect();

        tracing::debug!(caster = %caster.id, skill = %skill.id, targets = targets.len(), "Executed skill");

        SkillOutcome {
            caster_id: caster.id.clone(),
            skill_id: skill.id.clone(),
            rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Attacker,
    Defender,
}

/// Running state of one exchange.
struct Exchange<'a> {
    attacker_id: &'a UnitId,
    defender_id: &'a UnitId,
    attacker_hp: i32,
    defender_hp: i32,
    damage_to_defender: i32,
    rounds: Vec<CombatRound>,
}

impl Exchange<'_> {
    const fn both_standing(&self) -> bool {
        self.attacker_hp > 0 && self.defender_hp > 0
    }
}

#[cfg(feature = "debug-validation")]
fn validate_result(result: &CombatResult, engagement: &Engagement) {
    assert!(result.rounds.len() <= 4, "more than four rounds");
    for round in &result.rounds {
        assert!(round.hit || round.damage == 0, "missed round dealt damage");
        assert!(round.attacker_hp >= 0 && round.defender_hp >= 0, "negative HP");
        assert!(round.attacker_hp <= engagement.attacker.current_hp.max(0));
        assert!(round.defender_hp <= engagement.defender.current_hp.max(0));
    }
    assert!(result.attacker_exp >= 0 && result.defender_exp == 0);
}
