//! Turn-based skirmish driver.
//!
//! A [`Skirmish`] owns the map, every unit and one [`CombatEngine`]. Each
//! turn runs the player, allied and enemy phases in order; within a phase
//! units act in unit-id order. Every living unit asks the [`AiSystem`] for
//! an action, which is then applied: the move first, then the attack or
//! skill. The battle ends when one side is wiped out or the turn limit is
//! reached.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::ai::support::is_healing_skill;
use tactics_core::ai::{AiSystem, CombatAction};
use tactics_core::combat::{BattleForecast, CombatEngine, Engagement, SkillView};
use tactics_core::error::GameError;
use tactics_core::grid::{GridPos, GridQuery, TileGrid};
use tactics_core::replay::BattleReplay;
use tactics_core::terrain::TerrainView;
use tactics_core::units::{CombatantSnapshot, Stat, Team, UnitId};

use crate::scenario::{Scenario, ScenarioError};

/// Phase order within a turn.
pub const PHASE_ORDER: [Team; 3] = [Team::Player, Team::Ally, Team::Enemy];

/// Base power of healing skills.
pub const HEAL_SKILL_BASE: i32 = 10;

/// Base power of other skills, scaled by magic.
pub const DAMAGE_SKILL_BASE: i32 = 5;

/// Error type for skirmish runs.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Scenario could not be loaded or built.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Battle core error (replay files, verification).
    #[error(transparent)]
    Core(#[from] GameError),
    /// No unit with this id.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
    /// The unit has no weapon equipped.
    #[error("Unit '{0}' has no weapon equipped")]
    Unarmed(String),
}

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitReport {
    /// Unit id.
    pub id: UnitId,
    /// Side.
    pub team: Team,
    /// Remaining HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Whether the unit survived.
    pub alive: bool,
    /// Experience earned during the battle.
    pub exp: i32,
}

/// Outcome of a skirmish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkirmishReport {
    /// Scenario name.
    pub scenario: String,
    /// Engine seed.
    pub seed: u32,
    /// Winning side (`None` = draw at the turn limit).
    pub winner: Option<Team>,
    /// Turns played.
    pub turns: u32,
    /// Combat exchanges resolved.
    pub exchanges: u32,
    /// Skills cast.
    pub skills_cast: u32,
    /// Per-unit outcome, in unit-id order.
    pub units: Vec<UnitReport>,
    /// Hash of the final battle state.
    pub state_hash: u64,
}

impl SkirmishReport {
    /// Label used for the winner in summaries.
    #[must_use]
    pub fn winner_label(&self) -> &'static str {
        match self.winner {
            Some(Team::Player) => "player",
            Some(Team::Ally) => "ally",
            Some(Team::Enemy) => "enemy",
            None => "draw",
        }
    }
}

/// A running battle.
#[derive(Debug, Clone)]
pub struct Skirmish {
    scenario: String,
    seed: u32,
    max_turns: u32,
    grid: TileGrid,
    /// Sorted by id.
    units: Vec<CombatantSnapshot>,
    engine: CombatEngine,
    ai: AiSystem,
    turn: u32,
    exp: BTreeMap<UnitId, i32>,
    exchanges: u32,
    skills_cast: u32,
    replay: Option<BattleReplay>,
}

impl Skirmish {
    /// Set up a battle from a scenario with the given RNG seed.
    pub fn new(scenario: &Scenario, seed: u32) -> Result<Self, RunnerError> {
        let grid = scenario.build_grid()?;
        let mut units = scenario.build_units(&grid, &scenario.content_tables())?;
        units.sort_by(|a, b| a.id.cmp(&b.id));

        let mut engine = CombatEngine::with_rules(scenario.rules);
        engine.set_rng_seed(seed);

        tracing::debug!(scenario = %scenario.name, seed, units = units.len(), "Skirmish created");

        Ok(Self {
            scenario: scenario.name.clone(),
            seed,
            max_turns: scenario.max_turns,
            grid,
            units,
            engine,
            ai: AiSystem::new(),
            turn: 0,
            exp: BTreeMap::new(),
            exchanges: 0,
            skills_cast: 0,
            replay: None,
        })
    }

    /// Record every exchange into a [`BattleReplay`].
    #[must_use]
    pub fn with_replay(mut self) -> Self {
        self.replay = Some(BattleReplay::for_engine(self.scenario.clone(), &self.engine));
        self
    }

    /// Units in id order.
    #[must_use]
    pub fn units(&self) -> &[CombatantSnapshot] {
        &self.units
    }

    /// Map.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Turns played so far.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Recorded replay, if recording.
    #[must_use]
    pub fn replay(&self) -> Option<&BattleReplay> {
        self.replay.as_ref()
    }

    /// Side that has wiped out the other, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        let living = |player_side: bool| {
            self.units
                .iter()
                .any(|unit| unit.alive && unit.team.is_friendly_with(Team::Player) == player_side)
        };
        match (living(true), living(false)) {
            (true, false) => Some(Team::Player),
            (false, true) => Some(Team::Enemy),
            _ => None,
        }
    }

    /// Whether the battle has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner().is_some() || self.turn >= self.max_turns || self.units.iter().all(|unit| !unit.alive)
    }

    /// Play turns until the battle ends.
    pub fn run(&mut self) -> SkirmishReport {
        while !self.is_over() {
            self.play_turn();
        }
        let report = self.report();
        tracing::info!(
            scenario = %report.scenario,
            seed = report.seed,
            winner = report.winner_label(),
            turns = report.turns,
            exchanges = report.exchanges,
            "Skirmish finished"
        );
        report
    }

    /// Play one full turn.
    pub fn play_turn(&mut self) {
        self.turn += 1;
        tracing::debug!(turn = self.turn, "Turn start");
        for team in PHASE_ORDER {
            self.run_phase(team);
            if self.winner().is_some() {
                break;
            }
        }
    }

    /// Let every living unit of `team` act, in id order.
    pub fn run_phase(&mut self, team: Team) {
        let acting: Vec<UnitId> = self
            .units
            .iter()
            .filter(|unit| unit.team == team && unit.alive)
            .map(|unit| unit.id.clone())
            .collect();

        for id in acting {
            let Some(index) = self.index_of(&id) else { continue };
            if !self.units[index].alive {
                continue;
            }
            let action = self.decide(index);
            self.apply_action(&action);
            if self.winner().is_some() {
                return;
            }
        }
    }

    fn decide(&self, index: usize) -> CombatAction {
        let unit = &self.units[index];
        let (allies, enemies): (Vec<CombatantSnapshot>, Vec<CombatantSnapshot>) = self
            .units
            .iter()
            .cloned()
            .partition(|other| other.team.is_friendly_with(unit.team));
        self.ai.calculate_action(unit, &allies, &enemies, &self.grid)
    }

    /// Apply an AI action to the battle state.
    pub fn apply_action(&mut self, action: &CombatAction) {
        let Some(actor) = self.index_of(action.unit_id()) else {
            tracing::warn!(unit = action.unit_id(), "Action for unknown unit ignored");
            return;
        };
        if let Some(destination) = action.destination() {
            self.move_unit(actor, destination);
        }

        match action {
            CombatAction::Wait { .. } => {}
            CombatAction::Attack { target_unit_id, .. } => {
                if let Some(target) = self.index_of(target_unit_id) {
                    self.fight(actor, target);
                }
            }
            CombatAction::Skill {
                target_unit_id,
                skill_id,
                ..
            } => {
                if let Some(target) = self.index_of(target_unit_id) {
                    self.cast(actor, target, skill_id);
                }
            }
        }
    }

    /// Preview an attack between two units where they stand.
    pub fn forecast(&self, attacker_id: &str, defender_id: &str) -> Result<BattleForecast, RunnerError> {
        let attacker = self
            .index_of(attacker_id)
            .ok_or_else(|| RunnerError::UnknownUnit(attacker_id.to_string()))?;
        let defender = self
            .index_of(defender_id)
            .ok_or_else(|| RunnerError::UnknownUnit(defender_id.to_string()))?;
        let engagement = self
            .engagement(attacker, defender)
            .ok_or_else(|| RunnerError::Unarmed(attacker_id.to_string()))?;
        Ok(self.engine.battle_forecast(&engagement))
    }

    /// Snapshot of the outcome so far.
    #[must_use]
    pub fn report(&self) -> SkirmishReport {
        SkirmishReport {
            scenario: self.scenario.clone(),
            seed: self.seed,
            winner: self.winner(),
            turns: self.turn,
            exchanges: self.exchanges,
            skills_cast: self.skills_cast,
            units: self
                .units
                .iter()
                .map(|unit| UnitReport {
                    id: unit.id.clone(),
                    team: unit.team,
                    hp: unit.current_hp,
                    max_hp: unit.max_hp,
                    alive: unit.alive,
                    exp: self.exp.get(&unit.id).copied().unwrap_or(0),
                })
                .collect(),
            state_hash: self.state_hash(),
        }
    }

    /// Hash of units, earned exp, turn and RNG state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);
        self.engine.rng_seed().hash(&mut hasher);
        self.units.hash(&mut hasher);
        self.exp.hash(&mut hasher);
        hasher.finish()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.units.binary_search_by(|unit| unit.id.as_str().cmp(id)).ok()
    }

    fn move_unit(&mut self, index: usize, destination: GridPos) {
        if self.units[index].position == Some(destination) {
            return;
        }
        let blocked = self
            .units
            .iter()
            .any(|unit| unit.alive && unit.position == Some(destination));
        if blocked || self.grid.tile(destination).is_none() {
            tracing::warn!(unit = %self.units[index].id, ?destination, "Move target unavailable, staying put");
            return;
        }
        self.units[index].position = Some(destination);
    }

    fn terrain_at(&self, pos: Option<GridPos>) -> TerrainView {
        pos.and_then(|p| self.grid.tile(p).copied())
            .unwrap_or_else(TerrainView::plain)
    }

    fn adjacent_allies(&self, index: usize) -> i32 {
        let unit = &self.units[index];
        let Some(pos) = unit.position else { return 0 };
        let count = self
            .units
            .iter()
            .filter(|other| other.id != unit.id && other.alive && other.team.is_friendly_with(unit.team))
            .filter_map(|other| other.position)
            .filter(|other_pos| self.grid.distance(pos, *other_pos) == 1)
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    fn engagement(&self, attacker: usize, defender: usize) -> Option<Engagement> {
        let att = &self.units[attacker];
        let def = &self.units[defender];
        let weapon = att.weapon.clone()?;
        let distance = match (att.position, def.position) {
            (Some(a), Some(d)) => self.grid.distance(a, d),
            _ => 1,
        };

        let mut engagement = Engagement::new(att.clone(), def.clone(), weapon, distance)
            .on_terrain(self.terrain_at(att.position), self.terrain_at(def.position))
            .with_support(self.adjacent_allies(attacker), self.adjacent_allies(defender));
        engagement.defender_weapon = def.weapon.clone();
        Some(engagement)
    }

    fn fight(&mut self, attacker: usize, defender: usize) {
        if !self.units[defender].alive {
            return;
        }
        let Some(engagement) = self.engagement(attacker, defender) else {
            tracing::debug!(unit = %self.units[attacker].id, "Unarmed unit cannot attack");
            return;
        };

        let result = match self.replay.as_mut() {
            Some(replay) => replay.resolve_and_record(&mut self.engine, engagement),
            None => self.engine.resolve_combat(&engagement),
        };
        self.exchanges += 1;

        self.set_hp(attacker, result.attacker_hp);
        self.set_hp(defender, result.defender_hp);
        *self.exp.entry(result.attacker_id.clone()).or_default() += result.attacker_exp;
        *self.exp.entry(result.defender_id.clone()).or_default() += result.defender_exp;

        tracing::debug!(
            attacker = %result.attacker_id,
            defender = %result.defender_id,
            attacker_hp = result.attacker_hp,
            defender_hp = result.defender_hp,
            "Exchange applied"
        );
    }

    fn cast(&mut self, caster: usize, target: usize, skill_id: &str) {
        if !self.units[target].alive {
            return;
        }
        let skill = skill_view(skill_id);
        let outcome = self
            .engine
            .execute_skill(&self.units[caster], std::slice::from_ref(&self.units[target]), &skill);
        self.skills_cast += 1;

        if let Some(hp) = outcome.target_hp(&self.units[target].id) {
            self.set_hp(target, hp);
        }
    }

    fn set_hp(&mut self, index: usize, hp: i32) {
        let unit = &mut self.units[index];
        unit.current_hp = hp.clamp(0, unit.max_hp);
        if unit.current_hp == 0 && unit.alive {
            unit.alive = false;
            tracing::debug!(unit = %unit.id, "Unit defeated");
        }
    }
}

/// Skill definition for a known skill id.
#[must_use]
pub fn skill_view(skill_id: &str) -> SkillView {
    if is_healing_skill(skill_id) {
        SkillView::heal(skill_id, HEAL_SKILL_BASE)
    } else {
        SkillView::damage(skill_id, DAMAGE_SKILL_BASE, Stat::Magic)
    }
}

/// Run a scenario once to completion.
pub fn run_skirmish(scenario: &Scenario, seed: u32) -> Result<SkirmishReport, RunnerError> {
    Ok(Skirmish::new(scenario, seed)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::UnitPlacement;
    use tactics_core::combat::SkillEffect;
    use tactics_core::units::{AiBehavior, ClassTag, Stats};

    fn duel_scenario() -> Scenario {
        let stats = Stats {
            strength: 12,
            skill: 10,
            speed: 8,
            luck: 3,
            defense: 4,
            movement: 4,
            ..Stats::default()
        };
        Scenario {
            name: "Duel".to_string(),
            description: String::new(),
            map: vec!["......".to_string(), "......".to_string()],
            max_turns: 20,
            rules: tactics_core::config::CombatRules::default(),
            weapons: Vec::new(),
            units: vec![
                UnitPlacement::new("a_hero", Team::Player, ClassTag::Mercenary, 24, 0, 0)
                    .with_stats(stats)
                    .with_weapon("iron_sword"),
                UnitPlacement::new("b_brute", Team::Enemy, ClassTag::Fighter, 24, 5, 0)
                    .with_stats(stats)
                    .with_weapon("iron_axe")
                    .with_behavior(AiBehavior::Aggressive),
            ],
        }
    }

    #[test]
    fn test_skill_view_for_heal_patterns() {
        assert!(matches!(skill_view("Heal").effect, SkillEffect::Heal { base: HEAL_SKILL_BASE }));
        assert!(matches!(skill_view("mend_plus").effect, SkillEffect::Heal { .. }));
        assert!(matches!(skill_view("bolt").effect, SkillEffect::Damage { .. }));
    }

    #[test]
    fn test_duel_reaches_a_result() {
        let report = run_skirmish(&duel_scenario(), 42).unwrap();

        assert!(report.turns >= 1);
        assert!(report.turns <= 20);
        assert!(report.exchanges >= 1);
        assert_eq!(report.units.len(), 2);
        if let Some(winner) = report.winner {
            let loser = report.units.iter().find(|unit| unit.team != winner).unwrap();
            assert!(!loser.alive);
            assert_eq!(loser.hp, 0);
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let scenario = Scenario::skirmish();
        let first = run_skirmish(&scenario, 7).unwrap();
        let second = run_skirmish(&scenario, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_player_moves_first() {
        let mut skirmish = Skirmish::new(&duel_scenario(), 1).unwrap();
        skirmish.run_phase(Team::Player);

        let hero = &skirmish.units()[0];
        let brute = &skirmish.units()[1];
        assert_ne!(hero.position, Some(GridPos::new(0, 0)));
        assert_eq!(brute.position, Some(GridPos::new(5, 0)));
    }

    #[test]
    fn test_replay_records_every_exchange() {
        let mut skirmish = Skirmish::new(&Scenario::skirmish(), 11).unwrap().with_replay();
        let report = skirmish.run();
        let replay = skirmish.replay().unwrap();

        assert_eq!(replay.len(), report.exchanges as usize);
        assert_eq!(replay.verify().unwrap().len(), replay.len());
    }

    #[test]
    fn test_forecast_between_units() {
        let skirmish = Skirmish::new(&duel_scenario(), 1).unwrap();
        let forecast = skirmish.forecast("a_hero", "b_brute").unwrap();
        // Five tiles apart, so the axe cannot answer.
        assert!(!forecast.defender_can_counter());
        assert!(forecast.attacker.damage > 0);

        assert!(matches!(
            skirmish.forecast("a_hero", "nobody"),
            Err(RunnerError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_heal_action_restores_hp() {
        let mut scenario = duel_scenario();
        scenario.units.push(
            UnitPlacement::new("c_cleric", Team::Player, ClassTag::Cleric, 18, 0, 1)
                .with_stats(Stats {
                    magic: 5,
                    movement: 4,
                    ..Stats::default()
                })
                .with_skill("heal"),
        );
        scenario.units[0].hp = Some(6);
        let mut skirmish = Skirmish::new(&scenario, 3).unwrap();

        skirmish.apply_action(&CombatAction::Skill {
            unit_id: "c_cleric".into(),
            target_unit_id: "a_hero".into(),
            target_position: GridPos::new(0, 1),
            skill_id: "heal".into(),
        });

        assert_eq!(skirmish.units()[0].current_hp, 6 + HEAL_SKILL_BASE + 5);
    }
}
