//! Dice runs: draws, shows, staged buff scoring, round settlement,
//! and the dice achievements that grow the collection.
//!
//! Most tests load the collection with single-face dice so every draw
//! is known in advance.

use outpost_core::{
    buffs::{
        resolve, score_action, ActiveBuff, BaseScorer, BuffId, ScoreBreakdown, ScoreContext, Stage,
        StageResult, StandardScorer,
    },
    config::GameConfig,
    dice::{DiceProfile, DiceState},
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    error::GameError,
    event::GameEvent,
    rng::SubsystemRng,
    storage::MemoryStorage,
};
use std::collections::BTreeMap;

const FLAT: u32 = 90;

/// Builtin tables plus a profile whose six faces all show `face`.
/// Dice achievements are cleared so the collection stays fixed.
fn flat_config(face: u8) -> GameConfig {
    let mut config = GameConfig::builtin();
    config.dice_profiles.push(DiceProfile { id: FLAT, name: "Flat".into(), faces: [face; 6] });
    config.dice_achievements.clear();
    config
}

fn flat_dice() -> DiceState {
    DiceState::new(&[FLAT; 6])
}

fn rng() -> SubsystemRng {
    SubsystemRng::new(1, 5, 0)
}

/// Builtin tables plus profiles 101..=106, each showing its last digit
/// on every face, so a hand can mix known faces.
fn mixed_config() -> GameConfig {
    let mut config = GameConfig::builtin();
    for face in 1..=6u8 {
        config.dice_profiles.push(DiceProfile {
            id:    100 + face as u32,
            name:  format!("All {face}"),
            faces: [face; 6],
        });
    }
    config.dice_achievements.clear();
    config
}

fn hand_of(faces: &[u8]) -> DiceState {
    let profiles: Vec<u32> = faces.iter().map(|f| 100 + *f as u32).collect();
    DiceState::new(&profiles)
}

/// Score one show against builtin buffs picked at run start, in round 1.
fn score_with(
    ids:       &[BuffId],
    shown:     &[u8],
    remaining: &[u8],
    turn:      u32,
    history:   &[Vec<u8>],
) -> ScoreBreakdown {
    let config = GameConfig::builtin();
    let active: Vec<ActiveBuff> = ids
        .iter()
        .map(|id| ActiveBuff { buff_id: *id, acquired_round: 0, acquired_turn: 0 })
        .collect();
    let resolved = resolve(&config.buff_library, &active).unwrap();
    let counters = BTreeMap::new();
    let ctx = ScoreContext {
        round: 1,
        turn,
        history,
        previous_show: history.last().map(|s| s.as_slice()),
        counters: &counters,
    };
    score_action(&resolved, shown, remaining, &ctx, &StandardScorer).unwrap()
}

#[test]
fn leftover_dice_pay_per_die() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[10]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();

    let shown = dice.show(&config, &StandardScorer, &[0, 1, 2, 3]).unwrap();

    assert_eq!(shown.breakdown.base, 2000, "four 1s double the 1000 triple");
    assert_eq!(shown.breakdown.stages.len(), 1);
    assert_eq!(shown.breakdown.stages[0].stage, Stage::Leftover);
    assert_eq!(shown.breakdown.stages[0].add, 100, "two unshown dice at 50 each");
    assert_eq!(shown.breakdown.total, 2100);
}

#[test]
fn transform_rewrites_the_face_and_locks_the_die() {
    let config = flat_config(2);
    let mut dice = flat_dice();
    dice.start_run(&config, &[3]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();

    let shown = dice.show(&config, &StandardScorer, &[0]).unwrap();
    assert_eq!(shown.faces, vec![6]);
    assert_eq!(shown.breakdown.total, 0, "a single 6 scores nothing");

    dice.end_round(&config).unwrap();
    let drawn = dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(drawn.faces, vec![6, 2, 2, 2, 2, 2], "the transformed die keeps its face for the run");
}

#[test]
fn selection_limit_rejects_without_side_effects() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[7]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();
    let before = dice.clone();

    let err = dice.show(&config, &StandardScorer, &[0, 1]).unwrap_err();
    assert!(matches!(err, GameError::SelectionLimit { selected: 2, limit: 1 }));
    assert_eq!(dice, before, "a rejected show must not change the run");

    let shown = dice.show(&config, &StandardScorer, &[0]).unwrap();
    assert_eq!(shown.breakdown.total, 200, "a lone 1 doubled");
}

#[test]
fn invalid_selections_are_rejected() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    assert!(matches!(dice.draw(&config, &mut rng()), Err(GameError::NoActiveRun)));

    dice.start_run(&config, &[]).unwrap();
    assert!(matches!(
        dice.show(&config, &StandardScorer, &[0]),
        Err(GameError::InvalidSelection { .. })
    ), "nothing drawn yet");

    dice.draw(&config, &mut rng()).unwrap();
    for bad in [&[][..], &[0, 0][..], &[6][..]] {
        assert!(
            matches!(dice.show(&config, &StandardScorer, bad), Err(GameError::InvalidSelection { .. })),
            "selection {bad:?} should be rejected"
        );
    }
    assert!(matches!(dice.start_run(&config, &[999]), Err(GameError::UnknownBuff { id: 999 })));
}

#[test]
fn shown_counter_accumulates_across_shows() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[29]).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    let first = dice.show(&config, &StandardScorer, &[0]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();
    let second = dice.show(&config, &StandardScorer, &[0]).unwrap();

    assert_eq!(first.breakdown.total, 115);
    assert_eq!(second.breakdown.total, 130);
}

#[test]
fn draw_bonus_adds_to_the_round() {
    let config = flat_config(3);
    let mut dice = flat_dice();
    dice.start_run(&config, &[24]).unwrap();

    let drawn = dice.draw(&config, &mut rng()).unwrap();

    assert_eq!(drawn.bonus, 600);
    assert_eq!(dice.run.as_ref().unwrap().round_score, 600);
}

#[test]
fn run_finishes_after_the_final_round_with_final_buffs() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[26, 27]).unwrap();

    let mut last = None;
    for round in 1..=5 {
        dice.draw(&config, &mut rng()).unwrap();
        let shown = dice.show(&config, &StandardScorer, &[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(shown.breakdown.total, 8000, "six 1s");
        let outcome = dice.end_round(&config).unwrap();
        assert_eq!(outcome.round, round);
        assert_eq!(outcome.finished, round == 5);
        last = Some(outcome);
    }

    let last = last.unwrap();
    assert_eq!(last.total_score, (5 * 8000 + 1000) * 2, "(total + bonus) x multiplier");
    assert_eq!(dice.max_score, last.total_score);
    assert_eq!(dice.max_round_score, 8000);
    assert_eq!(dice.rounds_completed, 5);
    assert!(matches!(dice.draw(&config, &mut rng()), Err(GameError::RunFinished { round: 5 })));
}

#[test]
fn low_round_double_uses_the_raw_round_score() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[21]).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    dice.show(&config, &StandardScorer, &[0]).unwrap();
    let low = dice.end_round(&config).unwrap();
    assert_eq!(low.round_score, 200, "100 is under the 300 line and doubles");

    dice.draw(&config, &mut rng()).unwrap();
    dice.show(&config, &StandardScorer, &[0, 1, 2]).unwrap();
    let high = dice.end_round(&config).unwrap();
    assert_eq!(high.round_score, 1000);
}

#[test]
fn repeated_faces_unlock_a_new_die() {
    let mut config = GameConfig::builtin();
    config.dice_profiles[0].faces = [1; 6];
    let mut dice = DiceState::new(&config.rules.starting_dice);
    dice.start_run(&config, &[]).unwrap();

    let mut unlocked = Vec::new();
    for _ in 0..3 {
        dice.draw(&config, &mut rng()).unwrap();
        unlocked.extend(dice.show(&config, &StandardScorer, &[0]).unwrap().unlocked);
    }

    assert_eq!(unlocked, vec![(1, 2)], "ones in three straight shows award profile 2");
    assert_eq!(dice.dice.len(), 7);
    assert!(dice.unlocked.contains(&1));
}

#[test]
fn engine_dice_surface_emits_events() {
    let mut engine =
        GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, 3);
    assert!(matches!(engine.show_dice(&[0]), Err(GameError::NoActiveRun)));

    let started = engine.start_dice_run(&[1, 2]).unwrap();
    assert_eq!(started, GameEvent::DiceRunStarted { buffs: vec![1, 2] });
    engine.acquire_buff(11).unwrap();
    assert_eq!(engine.state().dice.run.as_ref().unwrap().buffs[2].acquired_round, 1);

    let (drawn, event) = engine.draw_dice().unwrap();
    assert_eq!(drawn.faces.len(), 6);
    assert_eq!(event, GameEvent::DiceDrawn { faces: drawn.faces.clone(), bonus: 0 });

    let (shown, events) = engine.show_dice(&[0]).unwrap();
    assert!(matches!(events[0], GameEvent::DiceShown { points, .. } if points == shown.breakdown.total));

    let (round, events) = engine.end_dice_round().unwrap();
    assert_eq!(round.round, 1);
    assert!(matches!(events[0], GameEvent::RoundEnded { round: 1, .. }));
}

#[test]
fn chain_pays_evens_after_a_lone_trigger() {
    let config = flat_config(6);
    let resolved =
        resolve(&config.buff_library, &[ActiveBuff { buff_id: 25, acquired_round: 0, acquired_turn: 0 }])
            .unwrap();
    let counters = BTreeMap::new();
    let history = vec![vec![6]];
    let ctx = ScoreContext {
        round:         1,
        turn:          2,
        history:       &history,
        previous_show: Some(&[6][..]),
        counters:      &counters,
    };

    let scored = score_action(&resolved, &[2, 4], &[], &ctx, &StandardScorer).unwrap();

    assert_eq!(scored.total, 600);
    assert_eq!(scored.stages[0].stage, Stage::Chain);
}

/// Seven points per shown die, whatever the faces.
struct Sevens;

impl BaseScorer for Sevens {
    fn base_score(&self, shown: &[u8]) -> u64 {
        7 * shown.len() as u64
    }
}

#[test]
fn engine_scores_with_the_installed_scorer() {
    let mut engine =
        GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, 8);
    engine.set_scorer(Box::new(Sevens));
    engine.start_dice_run(&[]).unwrap();
    engine.draw_dice().unwrap();

    let (shown, _) = engine.show_dice(&[0, 1]).unwrap();

    assert_eq!(shown.breakdown.base, 14);
    assert_eq!(shown.breakdown.total, 14, "no buffs, no stages");
}

#[test]
fn stages_compose_add_then_multiply_in_order() {
    let config = flat_config(5);
    let mut dice = flat_dice();
    dice.start_run(&config, &[7, 10, 1]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();

    let shown = dice.show(&config, &StandardScorer, &[0]).unwrap();

    assert_eq!(shown.breakdown.base, 50);
    assert_eq!(shown.breakdown.stages, vec![
        StageResult { stage: Stage::SingleDie, add: 50, multiplier: 1 },
        StageResult { stage: Stage::Leftover, add: 250, multiplier: 1 },
        StageResult { stage: Stage::Selection, add: 0, multiplier: 2 },
    ], "stage order ignores the order buffs were picked in");
    assert_eq!(shown.breakdown.total, (50 + 50 + 250) * 2);
}

#[test]
fn single_die_bonuses_pay_per_matching_face() {
    let scored = score_with(&[1, 2], &[5, 2, 2], &[], 1, &[]);

    assert_eq!(scored.base, 50);
    assert_eq!(scored.stages, vec![StageResult { stage: Stage::SingleDie, add: 150, multiplier: 1 }]);
    assert_eq!(scored.total, 200);

    let untouched = score_with(&[1], &[1], &[], 1, &[]);
    assert!(untouched.stages.is_empty(), "no 5 shown, so the stage is skipped");
    assert_eq!(untouched.total, 100);
}

#[test]
fn exact_combos_need_the_whole_show_to_match() {
    assert_eq!(score_with(&[6], &[1, 5], &[], 1, &[]).total, 150 + 300);
    assert_eq!(score_with(&[6], &[1, 5, 5], &[], 1, &[]).total, 200, "an extra die breaks an exact combo");
    assert_eq!(score_with(&[5], &[6, 2, 4], &[], 1, &[]).total, 800, "face order does not matter");

    let config = mixed_config();
    let mut dice = hand_of(&[1, 5, 2]);
    dice.start_run(&config, &[6]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();
    let shown = dice.show(&config, &StandardScorer, &[0, 1]).unwrap();
    assert_eq!(shown.breakdown.stages[0].stage, Stage::Combination);
    assert_eq!(shown.breakdown.total, 450);
}

#[test]
fn transforms_apply_before_any_stage_scores() {
    let config = flat_config(2);
    let mut dice = flat_dice();
    dice.start_run(&config, &[2, 3]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();
    let shown = dice.show(&config, &StandardScorer, &[0]).unwrap();
    assert_eq!(shown.faces, vec![6]);
    assert_eq!(shown.breakdown.total, 0, "the 2 became a 6 before the twos bonus looked");

    let config = mixed_config();
    let mut dice = hand_of(&[2, 4, 3]);
    dice.start_run(&config, &[4, 5]).unwrap();
    dice.draw(&config, &mut rng()).unwrap();
    let shown = dice.show(&config, &StandardScorer, &[0, 1, 2]).unwrap();
    assert_eq!(shown.faces, vec![2, 4, 6]);
    assert_eq!(shown.breakdown.total, 800, "the transformed 3 completes the even trio");
}

#[test]
fn selection_bonus_needs_enough_dice() {
    let big = score_with(&[8], &[1, 1, 1], &[], 1, &[]);
    assert_eq!(big.stages, vec![StageResult { stage: Stage::Selection, add: 500, multiplier: 1 }]);
    assert_eq!(big.total, 1500);

    assert_eq!(score_with(&[8], &[1, 1], &[], 1, &[]).total, 200);
}

#[test]
fn drawn_counter_grows_with_every_draw() {
    let config = flat_config(6);
    let mut dice = flat_dice();
    dice.start_run(&config, &[9]).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    let first = dice.show(&config, &StandardScorer, &[0]).unwrap();
    assert_eq!(first.breakdown.total, 6 * 15, "six 6s drawn");

    dice.draw(&config, &mut rng()).unwrap();
    let second = dice.show(&config, &StandardScorer, &[0]).unwrap();
    assert_eq!(second.breakdown.total, 11 * 15, "five more from the dice left in play");
    assert_eq!(dice.run.as_ref().unwrap().counters[&9], 11);
}

#[test]
fn leftover_rules_read_the_unshown_dice() {
    assert_eq!(score_with(&[11], &[1], &[], 1, &[]).total, 600, "nothing left over");
    assert_eq!(score_with(&[11], &[1], &[2], 1, &[]).total, 100);

    assert_eq!(score_with(&[12, 13], &[1], &[6, 2], 1, &[]).total, 400);
    assert_eq!(score_with(&[12, 13], &[1], &[6, 1], 1, &[]).total, 700);

    assert_eq!(score_with(&[14], &[1], &[1, 3, 4], 1, &[]).total, 300, "two odd dice left");
    assert_eq!(score_with(&[15], &[1], &[1, 3, 4], 1, &[]).total, 200, "one even die left");
}

#[test]
fn turn_multiplier_fires_on_the_third_show() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[16]).unwrap();

    let mut totals = Vec::new();
    for _ in 0..3 {
        dice.draw(&config, &mut rng()).unwrap();
        totals.push(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total);
    }

    assert_eq!(totals, vec![100, 100, 300]);
}

#[test]
fn late_turn_bonus_starts_at_the_third_show() {
    assert_eq!(score_with(&[18], &[1], &[], 2, &[]).total, 100);
    assert_eq!(score_with(&[18], &[1], &[], 3, &[]).total, 600);
    assert_eq!(score_with(&[18], &[1], &[], 4, &[]).total, 600);
}

#[test]
fn repeated_face_doubles_every_third_show_in_a_row() {
    let history = vec![vec![1], vec![1, 5]];
    let scored = score_with(&[17], &[1], &[], 3, &history);
    assert_eq!(scored.stages, vec![StageResult { stage: Stage::TurnRound, add: 0, multiplier: 2 }]);
    assert_eq!(scored.total, 200);

    let broken = vec![vec![1], vec![5]];
    assert_eq!(score_with(&[17], &[1], &[], 3, &broken).total, 100, "the streak restarts at the 5");
}

#[test]
fn repeated_single_counts_lone_die_shows() {
    let singles = vec![vec![2], vec![3]];
    assert_eq!(score_with(&[30], &[1], &[], 3, &singles).total, 200);
    assert_eq!(score_with(&[30], &[1, 1], &[], 3, &singles).total, 200, "two dice shown, no multiplier");

    let mixed = vec![vec![2, 2], vec![3]];
    assert_eq!(score_with(&[30], &[1], &[], 3, &mixed).total, 100);
}

#[test]
fn next_round_first_doubles_the_opening_show_after_acquiring() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[]).unwrap();
    dice.acquire_buff(&config, 19).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total, 100);
    dice.end_round(&config).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total, 200);
    dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total, 100);

    let mut picked = flat_dice();
    picked.start_run(&config, &[19]).unwrap();
    picked.draw(&config, &mut rng()).unwrap();
    assert_eq!(
        picked.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total,
        200,
        "a buff picked at the start counts round 1 as its next round"
    );
}

#[test]
fn round_match_pays_dice_showing_the_round_number() {
    let config = flat_config(1);
    let mut dice = flat_dice();
    dice.start_run(&config, &[20]).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total, 600);
    dice.end_round(&config).unwrap();

    dice.draw(&config, &mut rng()).unwrap();
    assert_eq!(dice.show(&config, &StandardScorer, &[0]).unwrap().breakdown.total, 100);
}

#[test]
fn shown_parity_pays_per_matching_die() {
    assert_eq!(score_with(&[22], &[1, 1], &[], 1, &[]).total, 600);
    assert_eq!(score_with(&[23], &[2, 4], &[], 1, &[]).total, 400);

    let both = score_with(&[22, 23], &[1, 2], &[], 1, &[]);
    assert_eq!(both.stages, vec![StageResult { stage: Stage::Chain, add: 400, multiplier: 1 }]);
    assert_eq!(both.total, 500);
}

#[test]
fn even_first_draw_only_shapes_the_opening_draw() {
    let config = flat_config(1);
    let mut dice = DiceState::new(&[1; 6]);
    dice.start_run(&config, &[28]).unwrap();
    let mut rng = rng();

    for _ in 0..3 {
        let opening = dice.draw(&config, &mut rng).unwrap();
        assert!(opening.faces.iter().all(|f| f % 2 == 0), "opening draw {:?}", opening.faces);

        let later: Vec<u8> = (0..20)
            .flat_map(|_| dice.draw(&config, &mut rng).unwrap().faces)
            .collect();
        assert!(later.iter().any(|f| f % 2 == 1), "later draws roll every face");

        dice.end_round(&config).unwrap();
    }
}
