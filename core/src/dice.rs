//! Dice runs — owned dice, draws, shows, round settlement, and the
//! dice achievements that grow the collection.
//!
//! A run is `final_round` rounds. Each round the player draws every die
//! not yet set aside, shows a subset (scored by `buffs::score_action`),
//! and repeats until they end the round. Shown dice are set aside; once
//! every die is set aside the next draw rolls the full collection again.

use crate::{
    buffs::{self, ActiveBuff, BaseScorer, BuffEffect, BuffId, CounterSource, ResolvedBuff,
            ScoreBreakdown, ScoreContext},
    config::GameConfig,
    error::{GameError, GameResult},
    rng::SubsystemRng,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type ProfileId = u32;

/// Faces used when a die references a profile that no longer exists.
pub const STANDARD_FACES: [u8; 6] = [1, 2, 3, 4, 5, 6];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceProfile {
    pub id:    ProfileId,
    pub name:  String,
    pub faces: [u8; 6],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiceAchievementCondition {
    /// `face` appears in `times` consecutive shows within one round.
    ConsecutiveFace { face: u8, times: usize },
    MaxScore { score: u64 },
    MaxRoundScore { score: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceAchievementDef {
    pub id:             u32,
    pub name:           String,
    pub condition:      DiceAchievementCondition,
    pub reward_profile: ProfileId,
}

fn profile_faces(config: &GameConfig, id: ProfileId) -> [u8; 6] {
    config
        .dice_profiles
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.faces)
        .unwrap_or(STANDARD_FACES)
}

/// A die in the current hand. `slot` indexes the owned collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandDie {
    pub slot: usize,
    pub face: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceRun {
    pub buffs:            Vec<ActiveBuff>,
    pub round:            u32,
    /// Shows made this round.
    pub turn:             u32,
    pub round_score:      u64,
    pub total_score:      u64,
    pub hand:             Vec<HandDie>,
    pub set_aside:        BTreeSet<usize>,
    /// Slots whose face a transform has fixed for the rest of the run.
    pub locked_faces:     BTreeMap<usize, u8>,
    pub counters:         BTreeMap<BuffId, u64>,
    /// Shows made this round, oldest first.
    pub history:          Vec<Vec<u8>>,
    pub previous_show:    Option<Vec<u8>>,
    pub draws_this_round: u32,
    pub round_scores:     Vec<u64>,
    pub finished:         bool,
}

fn any_effect(resolved: &[ResolvedBuff<'_>], pred: impl Fn(&BuffEffect) -> bool) -> bool {
    resolved.iter().any(|b| pred(&b.def.effect))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub faces: Vec<u8>,
    pub bonus: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOutcome {
    pub faces:     Vec<u8>,
    pub breakdown: ScoreBreakdown,
    pub unlocked:  Vec<(u32, ProfileId)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round:       u32,
    pub round_score: u64,
    pub total_score: u64,
    pub finished:    bool,
    pub unlocked:    Vec<(u32, ProfileId)>,
}

/// Persistent dice-game state: the collection, records, and the active run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceState {
    pub dice:             Vec<ProfileId>,
    pub max_score:        u64,
    pub max_round_score:  u64,
    pub rounds_completed: u32,
    #[serde(default)]
    pub unlocked:         BTreeSet<u32>,
    #[serde(default)]
    pub run:              Option<DiceRun>,
}

impl DiceState {
    pub fn new(starting_dice: &[ProfileId]) -> Self {
        Self {
            dice:             starting_dice.to_vec(),
            max_score:        0,
            max_round_score:  0,
            rounds_completed: 0,
            unlocked:         BTreeSet::new(),
            run:              None,
        }
    }

    fn active_run(&mut self) -> GameResult<&mut DiceRun> {
        let run = self.run.as_mut().ok_or(GameError::NoActiveRun)?;
        if run.finished {
            return Err(GameError::RunFinished { round: run.round });
        }
        Ok(run)
    }

    /// Begin a run with the given buffs. Replaces any unfinished run.
    pub fn start_run(&mut self, config: &GameConfig, buff_ids: &[BuffId]) -> GameResult<()> {
        if self.dice.is_empty() {
            return Err(GameError::InvalidSelection { reason: "no dice owned".into() });
        }
        for id in buff_ids {
            buffs::find_buff(&config.buff_library, *id)?;
        }
        self.run = Some(DiceRun {
            buffs: buff_ids
                .iter()
                .map(|id| ActiveBuff { buff_id: *id, acquired_round: 0, acquired_turn: 0 })
                .collect(),
            round: 1,
            ..DiceRun::default()
        });
        log::debug!("dice run started with buffs {buff_ids:?}");
        Ok(())
    }

    /// Add a buff to the running game. It counts from the current round.
    pub fn acquire_buff(&mut self, config: &GameConfig, id: BuffId) -> GameResult<()> {
        buffs::find_buff(&config.buff_library, id)?;
        let run = self.active_run()?;
        run.buffs.push(ActiveBuff { buff_id: id, acquired_round: run.round, acquired_turn: run.turn });
        run.counters.remove(&id);
        Ok(())
    }

    /// Roll every die not yet set aside this round.
    pub fn draw(&mut self, config: &GameConfig, rng: &mut SubsystemRng) -> GameResult<DrawOutcome> {
        let dice = self.dice.clone();
        let run = self.active_run()?;
        let resolved = buffs::resolve(&config.buff_library, &run.buffs)?;

        let mut slots: Vec<usize> = (0..dice.len()).filter(|s| !run.set_aside.contains(s)).collect();
        if slots.is_empty() {
            run.set_aside.clear();
            slots = (0..dice.len()).collect();
        }

        let even_only = run.draws_this_round == 0
            && any_effect(&resolved, |e| matches!(e, BuffEffect::EvenFirstDraw));

        let mut hand = Vec::with_capacity(slots.len());
        for slot in slots {
            let face = match run.locked_faces.get(&slot) {
                Some(face) => *face,
                None => {
                    let faces = profile_faces(config, dice[slot]);
                    let evens: Vec<u8> = faces.iter().copied().filter(|f| f % 2 == 0).collect();
                    let pool: &[u8] = if even_only && !evens.is_empty() { &evens } else { &faces };
                    pool[rng.next_u64_below(pool.len() as u64) as usize]
                }
            };
            hand.push(HandDie { slot, face });
        }
        let faces: Vec<u8> = hand.iter().map(|d| d.face).collect();

        let mut bonus = 0;
        for b in &resolved {
            match b.def.effect {
                BuffEffect::Counter { face, source: CounterSource::Drawn, .. } => {
                    let n = faces.iter().filter(|f| **f == face).count() as u64;
                    *run.counters.entry(b.def.id).or_default() += n;
                }
                BuffEffect::DrawBonus { per_die } => bonus += per_die * faces.len() as u64,
                _ => {}
            }
        }

        run.round_score += bonus;
        run.draws_this_round += 1;
        run.hand = hand;
        log::debug!("round={} draw={} faces={faces:?} bonus={bonus}", run.round, run.draws_this_round);
        Ok(DrawOutcome { faces, bonus })
    }

    /// Show the dice at `indices` of the current hand. Nothing changes
    /// when the selection is rejected.
    pub fn show(
        &mut self,
        config:  &GameConfig,
        scorer:  &dyn BaseScorer,
        indices: &[usize],
    ) -> GameResult<ShowOutcome> {
        let run = self.active_run()?;
        if run.hand.is_empty() {
            return Err(GameError::InvalidSelection { reason: "draw before showing".into() });
        }
        let unique: BTreeSet<usize> = indices.iter().copied().collect();
        if unique.len() != indices.len() {
            return Err(GameError::InvalidSelection { reason: "duplicate die in selection".into() });
        }
        if let Some(bad) = indices.iter().find(|i| **i >= run.hand.len()) {
            return Err(GameError::InvalidSelection {
                reason: format!("no die at position {bad} in a hand of {}", run.hand.len()),
            });
        }

        let resolved = buffs::resolve(&config.buff_library, &run.buffs)?;

        let mut locks = Vec::new();
        let mut shown = Vec::with_capacity(indices.len());
        for i in indices {
            let die = run.hand[*i];
            let face = match run.locked_faces.get(&die.slot) {
                Some(locked) => *locked,
                None => match buffs::transformed_face(&resolved, die.face) {
                    Some(to) => {
                        locks.push((die.slot, to));
                        to
                    }
                    None => die.face,
                },
            };
            shown.push(face);
        }
        let remaining: Vec<u8> = run
            .hand
            .iter()
            .enumerate()
            .filter(|(i, _)| !unique.contains(i))
            .map(|(_, d)| d.face)
            .collect();

        let mut counters = run.counters.clone();
        for b in &resolved {
            if let BuffEffect::Counter { face, source: CounterSource::Shown, .. } = b.def.effect {
                let n = shown.iter().filter(|f| **f == face).count() as u64;
                *counters.entry(b.def.id).or_default() += n;
            }
        }

        let ctx = ScoreContext {
            round:         run.round,
            turn:          run.turn + 1,
            history:       &run.history,
            previous_show: run.previous_show.as_deref(),
            counters:      &counters,
        };
        let breakdown = buffs::score_action(&resolved, &shown, &remaining, &ctx, scorer)?;

        run.turn += 1;
        run.counters = counters;
        run.locked_faces.extend(locks);
        run.round_score += breakdown.total;
        let slots: Vec<usize> = indices.iter().map(|i| run.hand[*i].slot).collect();
        run.set_aside.extend(slots);
        run.history.push(shown.clone());
        run.previous_show = Some(shown.clone());
        run.hand.clear();
        log::debug!(
            "round={} turn={} shown={shown:?} points={}",
            run.round, run.turn, breakdown.total
        );

        let unlocked = self.check_achievements(config);
        Ok(ShowOutcome { faces: shown, breakdown, unlocked })
    }

    /// Close the current round: settle round buffs, fold the round into
    /// the total, and either advance or finish the run.
    pub fn end_round(&mut self, config: &GameConfig) -> GameResult<RoundOutcome> {
        let final_round = config.rules.final_round.max(1);
        let run = self.active_run()?;
        let resolved = buffs::resolve(&config.buff_library, &run.buffs)?;

        let round = run.round;
        let is_final = round >= final_round;
        let settled = buffs::settle_round(&resolved, run.round_score, is_final);

        run.total_score += settled.round_score;
        if is_final {
            run.total_score = (run.total_score + settled.final_bonus) * settled.final_multiplier;
        }
        run.round_scores.push(settled.round_score);

        let total_score = run.total_score;
        if is_final {
            run.finished = true;
            run.hand.clear();
        } else {
            run.round += 1;
            run.turn = 0;
            run.round_score = 0;
            run.history.clear();
            run.set_aside.clear();
            run.hand.clear();
            run.draws_this_round = 0;
        }

        self.rounds_completed += 1;
        self.max_round_score = self.max_round_score.max(settled.round_score);
        if is_final {
            self.max_score = self.max_score.max(total_score);
        }
        log::info!("dice round {round} settled at {} (total {total_score})", settled.round_score);

        let unlocked = self.check_achievements(config);
        Ok(RoundOutcome { round, round_score: settled.round_score, total_score, finished: is_final, unlocked })
    }

    /// Unlock every satisfied achievement once, adding its reward die.
    fn check_achievements(&mut self, config: &GameConfig) -> Vec<(u32, ProfileId)> {
        let history = self.run.as_ref().map(|r| r.history.as_slice()).unwrap_or(&[]);
        let mut newly = Vec::new();
        for def in &config.dice_achievements {
            if self.unlocked.contains(&def.id) {
                continue;
            }
            let met = match &def.condition {
                DiceAchievementCondition::ConsecutiveFace { face, times } => {
                    *times > 0
                        && history.len() >= *times
                        && history[history.len() - times..].iter().all(|s| s.contains(face))
                }
                DiceAchievementCondition::MaxScore { score } => self.max_score >= *score,
                DiceAchievementCondition::MaxRoundScore { score } => self.max_round_score >= *score,
            };
            if met {
                newly.push((def.id, def.reward_profile));
            }
        }
        for (id, profile) in &newly {
            self.unlocked.insert(*id);
            self.dice.push(*profile);
            log::info!("dice achievement {id} unlocked, profile {profile} added");
        }
        newly
    }
}
