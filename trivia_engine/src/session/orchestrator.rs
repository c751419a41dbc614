//! Synchronous session driver.
//!
//! The [`Orchestrator`] owns the [`GameState`] together with the countdown,
//! the reveal window, and the per-question help state. Every entry point
//! takes the monotonic instant of the call and returns the [`Effect`]s the
//! caller has to carry out, so the whole flow can be tested without a
//! runtime.

use rand::{SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::time::Instant;

use super::{
    clock::Clock,
    config::{ConfigError, SessionConfig},
    messages::SessionSnapshot,
    timer::{Countdown, RevealToken, RevealWindow, TickOutcome},
};
use crate::game::{
    AnswerChoice, Assist, GameError, GameResult, GameState, Help, HelpKind, HelpOutcome, Question,
    QuestionShuffler, QuizAction, QuizEvent, constants::OPTION_COUNT,
};

/// Side effects requested by the orchestrator
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// A new question became visible; realign the one second ticker
    RestartCountdown,
    /// Deliver `token` back through [`Orchestrator::reveal_elapsed`] after `after`
    ScheduleAdvance { token: RevealToken, after: Duration },
    /// A previously scheduled advance must not fire
    CancelAdvance(RevealToken),
    /// Forward to subscribers
    Notify(QuizEvent),
}

/// Drives one quiz session
#[derive(Debug)]
pub struct Orchestrator {
    config: SessionConfig,
    clock: Clock,
    rng: StdRng,
    shuffler: QuestionShuffler,
    state: GameState,
    countdown: Countdown,
    reveal: RevealWindow,
    /// Options removed by 50/50 on the visible question
    eliminated: Vec<u8>,
    /// Latest help used on the visible question
    current_help: Option<HelpKind>,
}

impl Orchestrator {
    /// Create an orchestrator seeded from the OS
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(config: SessionConfig, clock: Clock) -> Result<Self, ConfigError> {
        Self::with_rng(config, clock, StdRng::from_os_rng())
    }

    /// Create an orchestrator with an explicit random source
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn with_rng(config: SessionConfig, clock: Clock, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let countdown = Countdown::new(config.time_per_question_secs, Instant::now());
        Ok(Self {
            config,
            clock,
            rng,
            shuffler: QuestionShuffler::new(),
            state: GameState::default(),
            countdown,
            reveal: RevealWindow::new(),
            eliminated: Vec::new(),
            current_help: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn eliminated(&self) -> &[u8] {
        &self.eliminated
    }

    /// True while the answer is revealed and input is locked
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_open()
    }

    /// Start a session with the given questions in shuffled order
    ///
    /// Any session in progress is replaced and its pending advance cancelled.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoQuestions` if `questions` is empty.
    pub fn start(&mut self, questions: Vec<Question>, at: Instant) -> Result<Vec<Effect>, GameError> {
        if questions.is_empty() {
            return Err(GameError::NoQuestions);
        }

        let mut effects = self.cancel_reveal();
        let ordered = self.shuffler.shuffle(questions, &mut self.rng);
        let events = self.state.apply(
            QuizAction::StartGame {
                questions: ordered,
                time_per_question: self.config.time_per_question_secs,
                lives: self.config.starting_lives,
            },
            self.clock.now(),
        )?;

        self.begin_question(at);
        log::info!(
            "Session started with {} questions, {}s per question",
            self.state.questions().len(),
            self.state.time_per_question()
        );

        effects.extend(events.into_iter().map(Effect::Notify));
        effects.push(Effect::RestartCountdown);
        Ok(effects)
    }

    /// Select an option on the visible question
    ///
    /// # Errors
    ///
    /// Rejects the selection when no session is active, while the answer is
    /// revealed, or when the option is out of range or eliminated.
    pub fn select(&mut self, option: u8, at: Instant) -> Result<Vec<Effect>, GameError> {
        self.ensure_input_open()?;
        if usize::from(option) >= OPTION_COUNT {
            return Err(GameError::InvalidOption(option));
        }
        if self.eliminated.contains(&option) {
            return Err(GameError::OptionEliminated(option));
        }

        let time_spent = self.countdown.elapsed_secs(at);
        self.resolve(
            AnswerChoice::Answered(option),
            time_spent,
            self.config.reveal_window,
            at,
        )
    }

    /// Use a help on the visible question
    ///
    /// # Errors
    ///
    /// Rejects the help when no session is active, while the answer is
    /// revealed, or when the help was already used.
    pub fn use_help(
        &mut self,
        kind: HelpKind,
        at: Instant,
    ) -> Result<(HelpOutcome, Vec<Effect>), GameError> {
        self.ensure_input_open()?;
        let index = self.state.current_question_index();
        let events = self.state.apply(QuizAction::UseHelp(kind), self.clock.now())?;
        self.current_help = Some(kind);

        let outcome = match self.state.current_question() {
            Some(question) => Help::from(kind).apply(question, &mut self.rng),
            None => return Err(GameError::NotActive),
        };
        log::debug!("Help {kind} used on question {}", index + 1);

        let mut effects: Vec<Effect> = events.into_iter().map(Effect::Notify).collect();
        match &outcome {
            HelpOutcome::Eliminated(options) => {
                self.eliminated = options.to_vec();
                effects.push(Effect::Notify(QuizEvent::Eliminated(*options)));
            }
            HelpOutcome::Skip => {
                effects.push(Effect::Notify(QuizEvent::Skipped { index }));
                let time_spent = self.countdown.elapsed_secs(at);
                effects.extend(self.resolve(
                    AnswerChoice::Skipped,
                    time_spent,
                    self.config.skip_reveal_window,
                    at,
                )?);
            }
            HelpOutcome::Hint(text) => {
                effects.push(Effect::Notify(QuizEvent::Hint(text.clone())));
            }
        }

        Ok((outcome, effects))
    }

    /// Advance the countdown; answers with the timeout sentinel on expiry
    pub fn tick(&mut self, at: Instant) -> Vec<Effect> {
        if self.countdown.tick(at) != TickOutcome::Expired || !self.state.is_active() {
            return Vec::new();
        }

        let index = self.state.current_question_index();
        log::debug!("Time expired on question {}", index + 1);

        let mut effects = vec![Effect::Notify(QuizEvent::TimeExpired { index })];
        match self.resolve(
            AnswerChoice::TimedOut,
            self.countdown.budget(),
            self.config.reveal_window,
            at,
        ) {
            Ok(resolved) => effects.extend(resolved),
            Err(e) => log::warn!("Timeout on question {} ignored: {}", index + 1, e),
        }
        effects
    }

    /// Handle an elapsed reveal window
    ///
    /// Stale tokens (cancelled, superseded, or not yet due) are ignored.
    pub fn reveal_elapsed(&mut self, token: RevealToken, at: Instant) -> Vec<Effect> {
        let Some(pending) = self.reveal.take_due(token, at) else {
            log::debug!("Ignoring stale reveal {token:?}");
            return Vec::new();
        };
        if !self.state.is_active() || pending.question_index != self.state.current_question_index()
        {
            return Vec::new();
        }

        let action = if self.state.is_last_question() || self.state.lives() == 0 {
            QuizAction::FinishGame
        } else {
            QuizAction::NextQuestion
        };

        let events = match self.state.apply(action, self.clock.now()) {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Advance after reveal failed: {e}");
                return Vec::new();
            }
        };

        let mut effects: Vec<Effect> = events.into_iter().map(Effect::Notify).collect();
        if self.state.is_active() {
            self.begin_question(at);
            effects.push(Effect::RestartCountdown);
        } else {
            self.end_question();
            log::info!("Session finished with score {}", self.state.score());
        }
        effects
    }

    /// Force the session to finish
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotActive` when no session was started.
    pub fn finish(&mut self) -> Result<Vec<Effect>, GameError> {
        let events = self.state.apply(QuizAction::FinishGame, self.clock.now())?;
        let mut effects = self.cancel_reveal();
        self.end_question();

        effects.extend(events.into_iter().map(Effect::Notify));
        Ok(effects)
    }

    /// Return to the idle state from any phase
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = self.cancel_reveal();
        let events = self
            .state
            .apply(QuizAction::ResetGame, self.clock.now())
            .unwrap_or_default();
        self.end_question();
        log::debug!("Session reset");

        effects.extend(events.into_iter().map(Effect::Notify));
        effects
    }

    /// Summary of the finished session
    ///
    /// # Errors
    ///
    /// Returns `GameError::SessionNotFinished` before the session finished.
    pub fn result(&self) -> Result<GameResult, GameError> {
        GameResult::from_state(&self.state)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase(),
            state: self.state.clone(),
            remaining_secs: self.countdown.remaining(),
            eliminated: self.eliminated.clone(),
            revealing: self.reveal.is_open(),
        }
    }

    fn ensure_input_open(&self) -> Result<(), GameError> {
        if !self.state.is_active() {
            return Err(GameError::NotActive);
        }
        if self.reveal.is_open() {
            return Err(GameError::InputLocked);
        }
        Ok(())
    }

    /// Record the answer, stop the countdown, and open the reveal window
    fn resolve(
        &mut self,
        choice: AnswerChoice,
        time_spent: u32,
        window: Duration,
        at: Instant,
    ) -> Result<Vec<Effect>, GameError> {
        let events = self.state.apply(
            QuizAction::AnswerQuestion {
                choice,
                time_spent,
                help_used: self.current_help,
            },
            self.clock.now(),
        )?;
        self.countdown.stop();

        let index = self.state.current_question_index();
        let token = self.reveal.open(index, at, window);
        log::debug!("Question {} resolved as {choice} after {time_spent}s", index + 1);

        let mut effects: Vec<Effect> = events.into_iter().map(Effect::Notify).collect();
        effects.push(Effect::ScheduleAdvance {
            token,
            after: window,
        });
        Ok(effects)
    }

    fn begin_question(&mut self, at: Instant) {
        self.countdown.restart(self.state.time_per_question(), at);
        self.eliminated.clear();
        self.current_help = None;
    }

    fn end_question(&mut self) {
        self.countdown.stop();
        self.eliminated.clear();
        self.current_help = None;
    }

    fn cancel_reveal(&mut self) -> Vec<Effect> {
        self.reveal
            .cancel()
            .map(Effect::CancelAdvance)
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, Phase, QuestionDraft, QuestionId};
    use chrono::{DateTime, Utc};

    fn question(id: &str, correct: u8) -> Question {
        Question::new(
            QuestionId::new(id),
            QuestionDraft {
                question: format!("Question {id}"),
                options: ["a", "b", "c", "d"].map(String::from),
                correct_answer: correct,
                category: "Misc".to_string(),
                difficulty: Difficulty::Easy,
                hint: Some(format!("hint for {id}")),
            },
        )
        .unwrap()
    }

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| question(&format!("q{i}"), (i % 4) as u8))
            .collect()
    }

    fn orchestrator(config: SessionConfig) -> Orchestrator {
        let epoch = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        Orchestrator::with_rng(config, Clock::fixed(epoch), StdRng::seed_from_u64(7)).unwrap()
    }

    fn scheduled(effects: &[Effect]) -> (RevealToken, Duration) {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::ScheduleAdvance { token, after } => Some((*token, *after)),
                _ => None,
            })
            .expect("advance scheduled")
    }

    fn correct(orch: &Orchestrator) -> u8 {
        orch.state().current_question().unwrap().correct_answer()
    }

    fn wrong(orch: &Orchestrator) -> u8 {
        (correct(orch) + 1) % 4
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_start_rejects_empty_list() {
        let mut orch = orchestrator(SessionConfig::default());
        assert_eq!(
            orch.start(Vec::new(), Instant::now()),
            Err(GameError::NoQuestions)
        );
        assert_eq!(orch.state().phase(), Phase::Idle);
    }

    #[test]
    fn test_start_keeps_question_set() {
        let mut orch = orchestrator(SessionConfig::default());
        let effects = orch.start(questions(5), Instant::now()).unwrap();

        assert!(effects.contains(&Effect::Notify(QuizEvent::Started { questions: 5 })));
        assert_eq!(effects.last(), Some(&Effect::RestartCountdown));

        let mut ids: Vec<&str> = orch.state().questions().iter().map(|q| q.id().as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["q0", "q1", "q2", "q3", "q4"]);
    }

    #[test]
    fn test_answer_locks_input_until_reveal_elapses() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(3), t0).unwrap();

        let option = correct(&orch);
        let effects = orch.select(option, t0 + Duration::from_millis(4_400)).unwrap();
        let (token, after) = scheduled(&effects);
        assert_eq!(after, secs(2));
        assert_eq!(orch.state().answers()[0].time_spent, 4);
        assert_eq!(orch.state().score(), 100);

        assert_eq!(orch.select(option, t0 + secs(5)), Err(GameError::InputLocked));
        assert_eq!(
            orch.use_help(HelpKind::Hint, t0 + secs(5)).map(|(o, _)| o),
            Err(GameError::InputLocked)
        );

        // not due yet
        assert!(orch.reveal_elapsed(token, t0 + secs(5)).is_empty());
        assert_eq!(orch.state().current_question_index(), 0);

        let effects = orch.reveal_elapsed(token, t0 + secs(7));
        assert_eq!(
            effects,
            vec![
                Effect::Notify(QuizEvent::Advanced { index: 1 }),
                Effect::RestartCountdown
            ]
        );
        assert!(!orch.is_revealing());
    }

    #[test]
    fn test_timeout_records_full_budget() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(2), t0).unwrap();

        assert!(orch.tick(t0 + secs(29)).is_empty());
        let effects = orch.tick(t0 + secs(30));
        assert_eq!(
            effects.first(),
            Some(&Effect::Notify(QuizEvent::TimeExpired { index: 0 }))
        );
        let (_, after) = scheduled(&effects);
        assert_eq!(after, secs(2));

        let answer = &orch.state().answers()[0];
        assert_eq!(answer.choice, AnswerChoice::TimedOut);
        assert_eq!(answer.time_spent, 30);
        assert!(!answer.is_correct);
        assert_eq!(orch.state().lives(), 2);

        // the countdown expires only once
        assert!(orch.tick(t0 + secs(31)).is_empty());
        assert_eq!(orch.state().answers().len(), 1);
    }

    #[test]
    fn test_skip_uses_short_reveal() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(2), t0).unwrap();

        let (outcome, effects) = orch.use_help(HelpKind::Skip, t0 + secs(3)).unwrap();
        assert_eq!(outcome, HelpOutcome::Skip);
        assert!(effects.contains(&Effect::Notify(QuizEvent::Skipped { index: 0 })));
        let (token, after) = scheduled(&effects);
        assert_eq!(after, secs(1));

        let answer = &orch.state().answers()[0];
        assert_eq!(answer.choice, AnswerChoice::Skipped);
        assert_eq!(answer.help_used, Some(HelpKind::Skip));
        assert_eq!(answer.time_spent, 3);
        assert_eq!(orch.state().lives(), 2);

        let effects = orch.reveal_elapsed(token, t0 + secs(4));
        assert!(effects.contains(&Effect::RestartCountdown));
        assert_eq!(orch.state().current_question_index(), 1);
    }

    #[test]
    fn test_fifty_fifty_blocks_eliminated_options() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(2), t0).unwrap();
        let answer = correct(&orch);

        let (outcome, _) = orch.use_help(HelpKind::FiftyFifty, t0).unwrap();
        let HelpOutcome::Eliminated(removed) = outcome else {
            panic!("expected eliminated options, got {outcome:?}");
        };
        assert!(!removed.contains(&answer));
        assert_eq!(orch.eliminated(), removed.as_slice());

        assert_eq!(
            orch.select(removed[0], t0 + secs(1)),
            Err(GameError::OptionEliminated(removed[0]))
        );
        assert_eq!(
            orch.use_help(HelpKind::FiftyFifty, t0 + secs(1)).map(|(o, _)| o),
            Err(GameError::HelpUnavailable(HelpKind::FiftyFifty))
        );

        let effects = orch.select(answer, t0 + secs(2)).unwrap();
        let (token, _) = scheduled(&effects);
        assert_eq!(
            orch.state().answers()[0].help_used,
            Some(HelpKind::FiftyFifty)
        );

        orch.reveal_elapsed(token, t0 + secs(4));
        assert!(orch.eliminated().is_empty());
    }

    #[test]
    fn test_hint_returns_text_and_keeps_input_open() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(1), t0).unwrap();

        let (outcome, effects) = orch.use_help(HelpKind::Hint, t0).unwrap();
        assert_eq!(outcome, HelpOutcome::Hint("hint for q0".to_string()));
        assert!(effects.contains(&Effect::Notify(QuizEvent::Hint("hint for q0".to_string()))));
        assert!(!orch.is_revealing());
        assert!(orch.select(correct(&orch), t0 + secs(1)).is_ok());
    }

    #[test]
    fn test_invalid_option_rejected() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(1), t0).unwrap();
        assert_eq!(orch.select(4, t0), Err(GameError::InvalidOption(4)));
        assert!(orch.state().answers().is_empty());
    }

    #[test]
    fn test_last_question_finishes_after_reveal() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(1), t0).unwrap();

        let effects = orch.select(correct(&orch), t0 + secs(1)).unwrap();
        let (token, _) = scheduled(&effects);
        let effects = orch.reveal_elapsed(token, t0 + secs(3));

        assert_eq!(
            effects,
            vec![Effect::Notify(QuizEvent::Finished { score: 100 })]
        );
        assert!(orch.state().is_finished());
        let result = orch.result().unwrap();
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.accuracy, 100.0);
    }

    #[test]
    fn test_running_out_of_lives_finishes_early() {
        let config = SessionConfig {
            starting_lives: 1,
            ..SessionConfig::default()
        };
        let mut orch = orchestrator(config);
        let t0 = Instant::now();
        orch.start(questions(4), t0).unwrap();

        let effects = orch.select(wrong(&orch), t0).unwrap();
        let (token, _) = scheduled(&effects);
        orch.reveal_elapsed(token, t0 + secs(2));

        assert!(orch.state().is_finished());
        assert_eq!(orch.state().answers().len(), 1);
        assert_eq!(orch.state().current_question_index(), 1);
        assert_eq!(orch.result().unwrap().total_questions, 4);
    }

    #[test]
    fn test_reset_cancels_pending_advance() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(3), t0).unwrap();
        let effects = orch.select(wrong(&orch), t0).unwrap();
        let (token, _) = scheduled(&effects);

        let effects = orch.reset();
        assert_eq!(
            effects,
            vec![
                Effect::CancelAdvance(token),
                Effect::Notify(QuizEvent::Reset)
            ]
        );

        assert!(orch.reveal_elapsed(token, t0 + secs(10)).is_empty());
        assert_eq!(orch.state(), &GameState::default());
    }

    #[test]
    fn test_restart_ignores_previous_reveal() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(3), t0).unwrap();
        let effects = orch.select(wrong(&orch), t0).unwrap();
        let (stale, _) = scheduled(&effects);

        let effects = orch.start(questions(3), t0 + secs(1)).unwrap();
        assert_eq!(effects.first(), Some(&Effect::CancelAdvance(stale)));

        assert!(orch.reveal_elapsed(stale, t0 + secs(5)).is_empty());
        assert_eq!(orch.state().current_question_index(), 0);
        assert!(orch.state().answers().is_empty());
    }

    #[test]
    fn test_finish_during_reveal() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(3), t0).unwrap();
        let effects = orch.select(correct(&orch), t0).unwrap();
        let (token, _) = scheduled(&effects);

        let effects = orch.finish().unwrap();
        assert_eq!(effects.first(), Some(&Effect::CancelAdvance(token)));
        assert!(effects.contains(&Effect::Notify(QuizEvent::Finished { score: 100 })));
        assert_eq!(orch.state().current_question_index(), 1);

        // idempotent
        assert_eq!(orch.finish(), Ok(Vec::new()));
        assert!(orch.tick(t0 + secs(60)).is_empty());
    }

    #[test]
    fn test_result_requires_finished_session() {
        let mut orch = orchestrator(SessionConfig::default());
        assert_eq!(orch.result(), Err(GameError::SessionNotFinished));
        assert_eq!(orch.finish(), Err(GameError::NotActive));

        orch.start(questions(2), Instant::now()).unwrap();
        assert_eq!(orch.result(), Err(GameError::SessionNotFinished));
    }

    #[test]
    fn test_snapshot_reflects_reveal() {
        let mut orch = orchestrator(SessionConfig::default());
        let t0 = Instant::now();
        orch.start(questions(2), t0).unwrap();
        orch.tick(t0 + secs(5));

        let snapshot = orch.snapshot();
        assert_eq!(snapshot.phase, Phase::Active);
        assert_eq!(snapshot.remaining_secs, 25);
        assert!(!snapshot.revealing);

        orch.select(correct(&orch), t0 + secs(6)).unwrap();
        assert!(orch.snapshot().revealing);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            starting_lives: 0,
            ..SessionConfig::default()
        };
        let err = Orchestrator::new(config, Clock::System).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field, .. } if field == "starting_lives"));
    }

    #[test]
    fn test_session_uses_configured_budget() {
        let orch_config = SessionConfig {
            time_per_question_secs: 10,
            starting_lives: 1,
            ..SessionConfig::default()
        };
        let mut orch = orchestrator(orch_config.clone());
        assert_eq!(orch.config(), &orch_config);

        orch.start(questions(2), Instant::now()).unwrap();
        assert_eq!(orch.state().time_per_question(), 10);
        assert_eq!(orch.state().lives(), 1);
        assert_eq!(orch.snapshot().remaining_secs, 10);
    }

    #[test]
    fn test_repeated_batch_with_shared_id_starts_again() {
        let mut orch = orchestrator(SessionConfig::default());
        let batch = || vec![question("same", 0), question("same", 1)];

        orch.start(batch(), Instant::now()).unwrap();
        orch.start(batch(), Instant::now()).unwrap();

        assert_eq!(orch.state().questions().len(), 2);
        assert_eq!(orch.state().phase(), Phase::Active);
    }
}
