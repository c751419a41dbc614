/// Property-based tests for the session state machine using proptest
///
/// These tests drive random sequences of actions through `GameState` and the
/// orchestrator, checking the invariants that must hold for any session.
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;
use trivia_engine::{
    AnswerChoice, Difficulty, GameResult, GameState, HelpKind, HelpOutcome, Question,
    QuestionDraft, QuestionId, QuizAction,
    game::{Assist, Help},
    pool::select_batch,
    session::{Clock, Effect, Orchestrator, SessionConfig},
};

fn question(i: usize, correct: u8) -> Question {
    Question::new(
        QuestionId::new(&format!("q{i}")),
        QuestionDraft {
            question: format!("Question {i}?"),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer: correct,
            category: "Props".to_string(),
            difficulty: Difficulty::Medium,
            hint: None,
        },
    )
    .unwrap()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
}

// Strategy for a set of questions with random correct options
fn questions_strategy(max: usize) -> impl Strategy<Value = Vec<Question>> {
    prop::collection::vec(0u8..4, 1..=max).prop_map(|answers| {
        answers
            .into_iter()
            .enumerate()
            .map(|(i, correct)| question(i, correct))
            .collect()
    })
}

// Strategy for what the player does with each question
fn choice_strategy() -> impl Strategy<Value = AnswerChoice> {
    prop_oneof![
        4 => (0u8..4).prop_map(AnswerChoice::Answered),
        1 => Just(AnswerChoice::TimedOut),
        1 => Just(AnswerChoice::Skipped),
    ]
}

#[derive(Clone, Debug)]
enum Step {
    Answer(AnswerChoice),
    Help(HelpKind),
    Next,
    Finish,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => choice_strategy().prop_map(Step::Answer),
        1 => prop_oneof![
            Just(HelpKind::FiftyFifty),
            Just(HelpKind::Skip),
            Just(HelpKind::Hint)
        ]
        .prop_map(Step::Help),
        3 => Just(Step::Next),
        1 => Just(Step::Finish),
    ]
}

proptest! {
    #[test]
    fn test_score_counts_only_correct_answers(
        questions in questions_strategy(15),
        choices in prop::collection::vec(choice_strategy(), 15),
    ) {
        let mut state = GameState::new();
        state.apply(QuizAction::start(questions), epoch()).unwrap();

        let mut correct = 0u32;
        for choice in choices {
            if !state.is_active() {
                break;
            }
            state.apply(QuizAction::AnswerQuestion { choice, time_spent: 1, help_used: None }, epoch()).unwrap();
            if state.answers().last().is_some_and(|a| a.is_correct) {
                correct += 1;
            }
            state.apply(QuizAction::NextQuestion, epoch()).unwrap();
        }

        prop_assert_eq!(state.score(), 100 * correct);
        let logged = state.answers().iter().filter(|a| a.is_correct).count() as u32;
        prop_assert_eq!(logged, correct);
    }

    #[test]
    fn test_random_actions_keep_invariants(
        questions in questions_strategy(12),
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let mut state = GameState::new();
        state.apply(QuizAction::start(questions), epoch()).unwrap();
        let mut previous_lives = state.lives();

        for step in steps {
            let before = state.clone();
            let action = match step {
                Step::Answer(choice) => QuizAction::AnswerQuestion { choice, time_spent: 2, help_used: None },
                Step::Help(kind) => QuizAction::UseHelp(kind),
                Step::Next => QuizAction::NextQuestion,
                Step::Finish => QuizAction::FinishGame,
            };
            let is_advance = matches!(action, QuizAction::NextQuestion | QuizAction::FinishGame);

            match state.apply(action, epoch()) {
                Ok(_) => {
                    if is_advance {
                        prop_assert_eq!(state.answers().len(), state.current_question_index());
                    }
                }
                // rejected actions leave no trace
                Err(_) => {
                    prop_assert_eq!(&state, &before);
                }
            }

            prop_assert!(state.lives() <= previous_lives);
            previous_lives = state.lives();
            prop_assert!(state.answers().len() <= state.questions().len());
            prop_assert!(!(state.is_active() && state.is_finished()));
        }
    }

    #[test]
    fn test_small_pool_uses_every_question_once(
        count in 1usize..=10,
        seed in any::<u64>(),
    ) {
        let pool: Vec<Question> = (0..count).map(|i| question(i, 0)).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let batch = select_batch(&pool, 10, &mut rng);

        let mut orch = Orchestrator::with_rng(SessionConfig::default(), Clock::fixed(epoch()), rng)
            .unwrap();
        orch.start(batch, Instant::now()).unwrap();

        let ids: BTreeSet<&str> = orch.state().questions().iter().map(|q| q.id().as_str()).collect();
        prop_assert_eq!(ids.len(), count);
        prop_assert_eq!(orch.state().questions().len(), count);
    }

    #[test]
    fn test_fifty_fifty_removes_two_wrong_options(
        correct in 0u8..4,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = Help::from(HelpKind::FiftyFifty).apply(&question(0, correct), &mut rng);

        let HelpOutcome::Eliminated(removed) = outcome else {
            return Err(TestCaseError::fail("50/50 must eliminate options"));
        };
        prop_assert_ne!(removed[0], removed[1]);
        prop_assert!(removed.iter().all(|&option| option != correct && option < 4));
    }

    #[test]
    fn test_orchestrated_session_result_matches_log(
        questions in questions_strategy(10),
        picks in prop::collection::vec((0u8..4, 0u64..30), 10),
    ) {
        let mut orch = Orchestrator::with_rng(
            SessionConfig::default(),
            Clock::fixed(epoch()),
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        let mut now = Instant::now();
        orch.start(questions, now).unwrap();

        for (option, wait) in picks {
            if !orch.state().is_active() {
                break;
            }
            now += Duration::from_secs(wait);
            let effects = orch.select(option, now).unwrap();
            prop_assert!(orch.is_revealing());
            let token = effects.iter().find_map(|effect| match effect {
                Effect::ScheduleAdvance { token, .. } => Some(*token),
                _ => None,
            });
            prop_assert!(token.is_some());

            now += SessionConfig::default().reveal_window;
            if let Some(token) = token {
                orch.reveal_elapsed(token, now);
            }
            prop_assert!(!orch.is_revealing());
        }
        if orch.state().is_active() {
            orch.finish().unwrap();
        }

        let state = orch.state();
        let result = orch.result().unwrap();
        prop_assert_eq!(result.score, state.score());
        prop_assert_eq!(
            result,
            GameResult::from_log(state.questions().len(), state.answers(), Some(state.start_time()), state.end_time())
        );
    }
}
