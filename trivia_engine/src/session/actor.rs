//! Session actor implementation with async message handling.

use super::{
    clock::Clock,
    config::{ConfigError, SessionConfig},
    messages::{SessionMessage, SessionSnapshot, SnapshotReply},
    orchestrator::{Effect, Orchestrator},
    timer::RevealToken,
};
use crate::game::{GameError, GameResult, HelpKind, HelpOutcome, Question, QuizEvent};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Duration, Instant, Interval, MissedTickBehavior, interval_at},
};

/// Countdown resolution
const TICK: Duration = Duration::from_secs(1);

/// Capacity of each subscriber channel
const SUBSCRIBER_CAPACITY: usize = 64;

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> Result<(), GameError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, GameError> {
        let (response, receiver) = oneshot::channel();
        self.send(build(response)).await?;
        receiver.await.map_err(|_| GameError::SessionClosed)
    }

    /// Start a session with the given questions (they are shuffled)
    pub async fn start(&self, questions: Vec<Question>) -> Result<SessionSnapshot, GameError> {
        self.request(|response| SessionMessage::Start {
            questions,
            response,
        })
        .await?
    }

    /// Select an option on the visible question
    pub async fn answer(&self, option: u8) -> Result<SessionSnapshot, GameError> {
        self.request(|response| SessionMessage::Answer { option, response })
            .await?
    }

    /// Use a help on the visible question
    pub async fn use_help(&self, kind: HelpKind) -> Result<HelpOutcome, GameError> {
        self.request(|response| SessionMessage::UseHelp { kind, response })
            .await?
    }

    pub async fn finish(&self) -> Result<SessionSnapshot, GameError> {
        self.request(|response| SessionMessage::Finish { response })
            .await?
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, GameError> {
        self.request(|response| SessionMessage::Reset { response })
            .await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, GameError> {
        self.request(|response| SessionMessage::GetSnapshot { response })
            .await
    }

    pub async fn result(&self) -> Result<GameResult, GameError> {
        self.request(|response| SessionMessage::GetResult { response })
            .await?
    }

    /// Receive every [`QuizEvent`] the session emits from now on
    pub async fn subscribe(&self) -> Result<mpsc::Receiver<QuizEvent>, GameError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.send(SessionMessage::Subscribe { sender }).await?;
        Ok(receiver)
    }

    /// Stop the actor
    pub async fn close(&self) -> Result<(), GameError> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Session actor owning a single quiz session
pub struct SessionActor {
    /// Session driver (FSM, countdown, reveal window)
    orchestrator: Orchestrator,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Used by scheduled advances to post back into the inbox.
    /// Weak, so a pending advance never keeps a dropped session alive.
    weak_sender: mpsc::WeakSender<SessionMessage>,

    /// Scheduled reveal-to-advance task
    pending_advance: Option<(RevealToken, JoinHandle<()>)>,

    /// Subscribers for session events
    subscribers: Vec<mpsc::Sender<QuizEvent>>,

    /// Is session closed
    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(config: SessionConfig) -> Result<(Self, SessionHandle), ConfigError> {
        Ok(Self::with_orchestrator(Orchestrator::new(
            config,
            Clock::System,
        )?))
    }

    /// Create an actor around an existing orchestrator
    pub fn with_orchestrator(orchestrator: Orchestrator) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(100);

        let actor = Self {
            orchestrator,
            inbox,
            weak_sender: sender.downgrade(),
            pending_advance: None,
            subscribers: Vec::new(),
            is_closed: false,
        };

        (actor, SessionHandle::new(sender))
    }

    /// Run the session actor event loop
    ///
    /// Exits when closed or when every handle has been dropped.
    pub async fn run(mut self) {
        log::info!("Session actor starting");

        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Handle incoming messages
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    let effects = self.handle_message(message);
                    self.apply_effects(effects, &mut ticker);

                    if self.is_closed {
                        break;
                    }
                }

                // Drive the countdown
                _ = ticker.tick() => {
                    let effects = self.orchestrator.tick(Instant::now());
                    self.apply_effects(effects, &mut ticker);
                }
            }
        }

        if let Some((_, task)) = self.pending_advance.take() {
            task.abort();
        }
        log::info!("Session actor closed");
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) -> Vec<Effect> {
        let at = Instant::now();

        match message {
            SessionMessage::Start {
                questions,
                response,
            } => {
                let result = self.orchestrator.start(questions, at);
                self.reply(response, result)
            }

            SessionMessage::Answer { option, response } => {
                let result = self.orchestrator.select(option, at);
                self.reply(response, result)
            }

            SessionMessage::UseHelp { kind, response } => {
                match self.orchestrator.use_help(kind, at) {
                    Ok((outcome, effects)) => {
                        let _ = response.send(Ok(outcome));
                        effects
                    }
                    Err(e) => {
                        log::debug!("Help {kind} rejected: {e}");
                        let _ = response.send(Err(e));
                        Vec::new()
                    }
                }
            }

            SessionMessage::Finish { response } => {
                let result = self.orchestrator.finish();
                self.reply(response, result)
            }

            SessionMessage::Reset { response } => {
                let effects = self.orchestrator.reset();
                self.reply(response, Ok(effects))
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.orchestrator.snapshot());
                Vec::new()
            }

            SessionMessage::GetResult { response } => {
                let _ = response.send(self.orchestrator.result());
                Vec::new()
            }

            SessionMessage::Subscribe { sender } => {
                self.subscribers.push(sender);
                log::debug!("Subscriber added ({} total)", self.subscribers.len());
                Vec::new()
            }

            SessionMessage::RevealElapsed { token } => {
                if matches!(self.pending_advance, Some((pending, _)) if pending == token) {
                    self.pending_advance = None;
                }
                self.orchestrator.reveal_elapsed(token, at)
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
                Vec::new()
            }
        }
    }

    /// Answer a request with the committed state, passing effects through
    fn reply(
        &self,
        response: SnapshotReply,
        result: Result<Vec<Effect>, GameError>,
    ) -> Vec<Effect> {
        match result {
            Ok(effects) => {
                let _ = response.send(Ok(self.orchestrator.snapshot()));
                effects
            }
            Err(e) => {
                log::debug!("Request rejected: {e}");
                let _ = response.send(Err(e));
                Vec::new()
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, ticker: &mut Interval) {
        for effect in effects {
            match effect {
                Effect::RestartCountdown => ticker.reset(),
                Effect::ScheduleAdvance { token, after } => self.schedule_advance(token, after),
                Effect::CancelAdvance(token) => self.cancel_advance(token),
                Effect::Notify(event) => self.notify(event),
            }
        }
    }

    fn schedule_advance(&mut self, token: RevealToken, after: Duration) {
        let weak_sender = self.weak_sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(sender) = weak_sender.upgrade() {
                let _ = sender.send(SessionMessage::RevealElapsed { token }).await;
            }
        });

        if let Some((_, previous)) = self.pending_advance.replace((token, task)) {
            previous.abort();
        }
    }

    fn cancel_advance(&mut self, token: RevealToken) {
        if matches!(self.pending_advance, Some((pending, _)) if pending == token)
            && let Some((_, task)) = self.pending_advance.take()
        {
            task.abort();
            log::debug!("Cancelled pending advance {token:?}");
        }
    }

    /// Broadcast an event to all subscribers
    fn notify(&mut self, event: QuizEvent) {
        self.subscribers.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Subscriber channel full, dropping event");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}
