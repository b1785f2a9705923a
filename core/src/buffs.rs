//! Buff definitions and the staged scoring evaluator.
//!
//! A buff is an immutable rule drawn from a closed library. Its `effect`
//! variant is the evaluation rule and decides the stage it scores in.
//!
//! SCORING ORDER (fixed, never reordered):
//!   base  — BaseScorer over the effective shown faces
//!   (a) single-die   (b) combination   (c) counter   (d) leftover
//!   (e) turn/round   (f) selection     (g) chain/conditional
//!   (h) final        — settled at the end of the final round only
//!
//! Within a stage additive terms sum and multipliers multiply; after each
//! stage the running score becomes (score + add) x multiplier.
//! Transforms are not a stage: they rewrite a selected die's face before
//! anything reads it.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type BuffId = u32;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComboMode {
    /// Shown faces equal the required multiset.
    #[default]
    Exact,
    /// Shown faces contain the required multiset.
    Superset,
    /// Every shown face is drawn from the required multiset.
    Subset,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn matches(&self, face: u8) -> bool {
        match self {
            Parity::Odd  => face % 2 == 1,
            Parity::Even => face % 2 == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CounterSource {
    /// Count matching faces as they are drawn into the hand.
    Drawn,
    /// Count matching faces as they are shown.
    Shown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BuffEffect {
    SingleDice { face: u8, bonus: u64 },
    Transform { from: u8, to: u8 },
    Combo { faces: Vec<u8>, bonus: u64, #[serde(default)] mode: ComboMode },
    SelectionLimit { max_dice: usize, multiplier: u64 },
    SelectionBonus { min_dice: usize, bonus: u64 },
    Counter { face: u8, per_unit: u64, source: CounterSource },
    LeftoverPerDie { per_die: u64 },
    LeftoverEmpty { bonus: u64 },
    LeftoverHasFace { face: u8, bonus: u64 },
    LeftoverParity { parity: Parity, per_die: u64 },
    TurnMultiplier { turn: u32, multiplier: u64 },
    RepeatedFace { times: u32, multiplier: u64 },
    RepeatedSingle { times: u32, multiplier: u64 },
    LateTurn { min_turn: u32, bonus: u64 },
    NextRoundFirst { multiplier: u64 },
    LowRoundDouble { max_round_score: u64, multiplier: u64 },
    RoundMatch { per_die: u64 },
    ShownParity { parity: Parity, per_die: u64 },
    Chain { trigger_face: u8, per_even: u64 },
    FinalBonus { threshold: u64, bonus: u64 },
    FinalMultiplier { threshold: u64, multiplier: u64 },
    DrawBonus { per_die: u64 },
    EvenFirstDraw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuffDef {
    pub id:     BuffId,
    pub name:   String,
    pub effect: BuffEffect,
}

impl BuffDef {
    /// The per-action stage this buff contributes to, if any.
    pub fn stage(&self) -> Option<Stage> {
        use BuffEffect::*;
        match &self.effect {
            SingleDice { .. } => Some(Stage::SingleDie),
            Combo { .. } => Some(Stage::Combination),
            Counter { .. } => Some(Stage::Counter),
            LeftoverPerDie { .. } | LeftoverEmpty { .. } | LeftoverHasFace { .. }
            | LeftoverParity { .. } => Some(Stage::Leftover),
            TurnMultiplier { .. } | RepeatedFace { .. } | RepeatedSingle { .. }
            | LateTurn { .. } | NextRoundFirst { .. } => Some(Stage::TurnRound),
            SelectionLimit { .. } | SelectionBonus { .. } => Some(Stage::Selection),
            RoundMatch { .. } | ShownParity { .. } | Chain { .. } => Some(Stage::Chain),
            FinalBonus { .. } | FinalMultiplier { .. } => Some(Stage::Final),
            Transform { .. } | LowRoundDouble { .. } | DrawBonus { .. } | EvenFirstDraw => None,
        }
    }
}

pub fn find_buff(library: &[BuffDef], id: BuffId) -> GameResult<&BuffDef> {
    library
        .iter()
        .find(|b| b.id == id)
        .ok_or(GameError::UnknownBuff { id })
}

/// A buff in a run, remembering when it was picked up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveBuff {
    pub buff_id:        BuffId,
    /// 0 means "picked at run start".
    pub acquired_round: u32,
    #[serde(default)]
    pub acquired_turn:  u32,
}

/// An active buff joined with its definition.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBuff<'a> {
    pub def:            &'a BuffDef,
    pub acquired_round: u32,
}

pub fn resolve<'a>(library: &'a [BuffDef], active: &[ActiveBuff]) -> GameResult<Vec<ResolvedBuff<'a>>> {
    active
        .iter()
        .map(|a| {
            Ok(ResolvedBuff { def: find_buff(library, a.buff_id)?, acquired_round: a.acquired_round })
        })
        .collect()
}

/// The face a selected die takes under the first matching transform.
pub fn transformed_face(buffs: &[ResolvedBuff<'_>], face: u8) -> Option<u8> {
    buffs.iter().find_map(|b| match b.def.effect {
        BuffEffect::Transform { from, to } if from == face => Some(to),
        _ => None,
    })
}

// ── Base scoring ──────────────────────────────────────────────────────

/// The fixed game rules that score a shown set before buffs apply.
pub trait BaseScorer {
    fn base_score(&self, shown: &[u8]) -> u64;
}

/// Default rules: single 1 = 100, single 5 = 50, three of a kind =
/// face x 100 (1s = 1000) doubling per extra die, straight 1-6 = 1500.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScorer;

impl BaseScorer for StandardScorer {
    fn base_score(&self, shown: &[u8]) -> u64 {
        let mut counts = [0u32; 7];
        for face in shown {
            if (1..=6).contains(face) {
                counts[*face as usize] += 1;
            }
        }
        if shown.len() == 6 && counts[1..].iter().all(|c| *c == 1) {
            return 1500;
        }
        let mut score = 0;
        for face in 1..=6u8 {
            let n = counts[face as usize];
            if n >= 3 {
                let triple = if face == 1 { 1000 } else { face as u64 * 100 };
                score += triple << (n - 3);
            } else {
                score += match face {
                    1 => 100 * n as u64,
                    5 => 50 * n as u64,
                    _ => 0,
                };
            }
        }
        score
    }
}

// ── Staged evaluation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SingleDie,
    Combination,
    Counter,
    Leftover,
    TurnRound,
    Selection,
    Chain,
    Final,
}

impl Stage {
    /// Stages applied to every show, in order. `Final` is settled separately.
    pub const ACTION_ORDER: [Stage; 7] = [
        Stage::SingleDie,
        Stage::Combination,
        Stage::Counter,
        Stage::Leftover,
        Stage::TurnRound,
        Stage::Selection,
        Stage::Chain,
    ];
}

/// Everything round- and run-scoped a show is scored against.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub round:         u32,
    /// 1-based index of this show within the round.
    pub turn:          u32,
    /// Earlier shows this round, oldest first.
    pub history:       &'a [Vec<u8>],
    /// The run's previous show, possibly from an earlier round.
    pub previous_show: Option<&'a [u8]>,
    /// Counter totals keyed by buff id, already including this show.
    pub counters:      &'a BTreeMap<BuffId, u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageResult {
    pub stage:      Stage,
    pub add:        u64,
    pub multiplier: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base:   u64,
    pub stages: Vec<StageResult>,
    pub total:  u64,
}

/// Score one show: base rules, then every stage in fixed order.
/// `shown` must already carry transformed faces.
pub fn score_action(
    buffs:     &[ResolvedBuff<'_>],
    shown:     &[u8],
    remaining: &[u8],
    ctx:       &ScoreContext<'_>,
    scorer:    &dyn BaseScorer,
) -> GameResult<ScoreBreakdown> {
    if shown.is_empty() {
        return Err(GameError::InvalidSelection { reason: "no dice selected".into() });
    }
    for b in buffs {
        if let BuffEffect::SelectionLimit { max_dice, .. } = b.def.effect {
            if shown.len() > max_dice {
                return Err(GameError::SelectionLimit { selected: shown.len(), limit: max_dice });
            }
        }
    }

    let base = scorer.base_score(shown);
    let mut running = base;
    let mut stages = Vec::new();

    for stage in Stage::ACTION_ORDER {
        let mut add = 0u64;
        let mut multiplier = 1u64;
        let mut touched = false;
        for b in buffs.iter().filter(|b| b.def.stage() == Some(stage)) {
            let (a, m) = evaluate(b, shown, remaining, ctx);
            if a != 0 || m != 1 {
                touched = true;
            }
            add += a;
            multiplier *= m;
        }
        if touched {
            running = (running + add) * multiplier;
            stages.push(StageResult { stage, add, multiplier });
        }
    }

    Ok(ScoreBreakdown { base, stages, total: running })
}

/// (additive term, multiplier) one buff contributes to a show.
fn evaluate(b: &ResolvedBuff<'_>, shown: &[u8], remaining: &[u8], ctx: &ScoreContext<'_>) -> (u64, u64) {
    use BuffEffect::*;
    let count = |faces: &[u8], pred: &dyn Fn(u8) -> bool| faces.iter().filter(|f| pred(**f)).count() as u64;

    match &b.def.effect {
        SingleDice { face, bonus } => (count(shown, &|f| f == *face) * bonus, 1),
        Combo { faces, bonus, mode } => {
            if combo_matches(shown, faces, *mode) { (*bonus, 1) } else { (0, 1) }
        }
        Counter { per_unit, .. } => {
            (ctx.counters.get(&b.def.id).copied().unwrap_or(0) * per_unit, 1)
        }
        LeftoverPerDie { per_die } => (remaining.len() as u64 * per_die, 1),
        LeftoverEmpty { bonus } => (if remaining.is_empty() { *bonus } else { 0 }, 1),
        LeftoverHasFace { face, bonus } => (if remaining.contains(face) { *bonus } else { 0 }, 1),
        LeftoverParity { parity, per_die } => (count(remaining, &|f| parity.matches(f)) * per_die, 1),
        TurnMultiplier { turn, multiplier } => (0, if ctx.turn == *turn { *multiplier } else { 1 }),
        RepeatedFace { times, multiplier } => {
            let hit = shown.iter().any(|face| {
                let streak = 1 + ctx.history.iter().rev().take_while(|s| s.contains(face)).count() as u32;
                *times > 0 && streak % times == 0
            });
            (0, if hit { *multiplier } else { 1 })
        }
        RepeatedSingle { times, multiplier } => {
            if shown.len() != 1 || *times == 0 {
                return (0, 1);
            }
            let streak = 1 + ctx.history.iter().rev().take_while(|s| s.len() == 1).count() as u32;
            (0, if streak % times == 0 { *multiplier } else { 1 })
        }
        LateTurn { min_turn, bonus } => (if ctx.turn >= *min_turn { *bonus } else { 0 }, 1),
        NextRoundFirst { multiplier } => {
            let first_of_next = ctx.turn == 1 && ctx.round == b.acquired_round + 1;
            (0, if first_of_next { *multiplier } else { 1 })
        }
        SelectionLimit { multiplier, .. } => (0, *multiplier),
        SelectionBonus { min_dice, bonus } => (if shown.len() >= *min_dice { *bonus } else { 0 }, 1),
        RoundMatch { per_die } => (count(shown, &|f| f as u32 == ctx.round) * per_die, 1),
        ShownParity { parity, per_die } => (count(shown, &|f| parity.matches(f)) * per_die, 1),
        Chain { trigger_face, per_even } => {
            let armed = ctx.previous_show == Some(&[*trigger_face][..]);
            (if armed { count(shown, &|f| f % 2 == 0) * per_even } else { 0 }, 1)
        }
        FinalBonus { .. } | FinalMultiplier { .. } | Transform { .. } | LowRoundDouble { .. }
        | DrawBonus { .. } | EvenFirstDraw => (0, 1),
    }
}

fn face_counts(faces: &[u8]) -> [u32; 7] {
    let mut counts = [0u32; 7];
    for f in faces {
        if (1..=6).contains(f) {
            counts[*f as usize] += 1;
        }
    }
    counts
}

pub fn combo_matches(shown: &[u8], required: &[u8], mode: ComboMode) -> bool {
    let have = face_counts(shown);
    let need = face_counts(required);
    match mode {
        ComboMode::Exact => shown.len() == required.len() && have == need,
        ComboMode::Superset => (1..=6).all(|f| have[f] >= need[f]),
        ComboMode::Subset => !shown.is_empty() && (1..=6).all(|f| have[f] <= need[f]),
    }
}

// ── Round settlement ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSettlement {
    /// Round score after round-scoped retroactive multipliers.
    pub round_score:      u64,
    /// Flat bonus added to the run total (final round only).
    pub final_bonus:      u64,
    /// Multiplier applied to the run total last (final round only).
    pub final_multiplier: u64,
}

/// Settle the end of a round. Low-score doubling rewrites the round score;
/// on the final round, threshold-gated final buffs apply against it.
pub fn settle_round(buffs: &[ResolvedBuff<'_>], round_score: u64, is_final_round: bool) -> RoundSettlement {
    let mut settled = round_score;
    for b in buffs {
        if let BuffEffect::LowRoundDouble { max_round_score, multiplier } = b.def.effect {
            if round_score <= max_round_score {
                settled *= multiplier;
            }
        }
    }

    let mut final_bonus = 0;
    let mut final_multiplier = 1;
    if is_final_round {
        for b in buffs {
            match b.def.effect {
                BuffEffect::FinalBonus { threshold, bonus } if settled >= threshold => {
                    final_bonus += bonus;
                }
                BuffEffect::FinalMultiplier { threshold, multiplier } if settled >= threshold => {
                    final_multiplier *= multiplier;
                }
                _ => {}
            }
        }
    }

    RoundSettlement { round_score: settled, final_bonus, final_multiplier }
}
