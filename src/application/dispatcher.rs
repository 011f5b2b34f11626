//! Inbound event dispatcher.
//!
//! Routes every inbound message to the matching flow. Each event runs on its
//! own task; events for the same conversation are serialized through
//! [`ConversationLocks`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use super::ask::{AskCommand, AskHandler};
use super::commands::{
    context_status, help_text, message_too_long, metrics_status, parse_input, question_too_long,
    BotCommand, ParsedInput, Toggle, CONTEXT_DISABLED, CONTEXT_ENABLED, GREETING,
    METRICS_DISABLED, METRICS_ENABLED, MODELS_NOT_CONFIGURED,
};
use super::context_manager::ContextManager;
use super::errors::InteractionError;
use super::find_track::FindTrackHandler;
use super::json_answer::JsonAnswerHandler;
use super::metrics_settings::MetricsSettings;
use super::orchestrators::{
    ExpertsOrchestrator, ModelSlot, MultiModelOrchestrator, TemperatureSweepOrchestrator,
};
use super::reply::Reply;
use crate::domain::context::ContextState;
use crate::domain::find_track::FindTrackState;
use crate::domain::foundation::{ConversationId, ValidationError};
use crate::domain::metrics::MetricsCollector;
use crate::ports::{AiClient, ChatTransport, ConversationStore, InboundEvent};

/// Shared dependencies of every bot flow.
///
/// Cloned into each spawned task; handlers are built on demand.
#[derive(Clone)]
pub struct BotServices {
    pub primary: Arc<dyn AiClient>,
    pub secondary: Option<Arc<dyn AiClient>>,
    /// Hosted models for `/differentModels`, absent when not configured.
    pub models: Option<Vec<ModelSlot>>,
    pub transport: Arc<dyn ChatTransport>,
    pub context_store: Arc<dyn ConversationStore<ContextState>>,
    pub metrics_display_store: Arc<dyn ConversationStore<bool>>,
    pub find_track_store: Arc<dyn ConversationStore<FindTrackState>>,
    pub metrics: Arc<MetricsCollector>,
}

impl BotServices {
    pub fn context_manager(&self) -> ContextManager {
        ContextManager::new(self.context_store.clone())
    }

    pub fn metrics_settings(&self) -> MetricsSettings {
        MetricsSettings::new(self.metrics_display_store.clone())
    }

    pub fn ask_handler(&self) -> AskHandler {
        AskHandler::new(
            self.primary.clone(),
            self.context_manager(),
            self.metrics.clone(),
            self.metrics_settings(),
        )
    }

    pub fn json_handler(&self) -> JsonAnswerHandler {
        JsonAnswerHandler::new(self.primary.clone())
    }

    pub fn find_track_handler(&self) -> FindTrackHandler {
        FindTrackHandler::new(self.primary.clone(), self.find_track_store.clone())
    }

    pub fn experts(&self) -> ExpertsOrchestrator {
        ExpertsOrchestrator::new(
            self.primary.clone(),
            self.secondary.clone(),
            self.transport.clone(),
        )
    }

    pub fn temperature_sweep(&self) -> TemperatureSweepOrchestrator {
        TemperatureSweepOrchestrator::new(self.primary.clone(), self.transport.clone())
    }

    pub fn multi_model(&self) -> Option<MultiModelOrchestrator> {
        self.models
            .clone()
            .map(|models| MultiModelOrchestrator::new(models, self.transport.clone()))
    }
}

type LockMap = HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>;

/// One async mutex per conversation.
///
/// An entry lives only while some task holds or waits on it.
#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the lock for `id`.
    pub async fn acquire(&self, id: ConversationId) -> ConversationGuard {
        let lock = Arc::clone(self.map().entry(id).or_default());
        let guard = lock.lock_owned().await;
        ConversationGuard {
            guard: Some(guard),
            id,
            locks: self.clone(),
        }
    }

    /// Number of conversations currently locked or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, id: ConversationId) {
        let mut locks = self.map();
        // Waiters clone the Arc under the map lock, so a count of one means
        // nobody else can still reach this mutex.
        if locks.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&id);
        }
    }
}

/// Held while one event for a conversation is being handled.
pub struct ConversationGuard {
    guard: Option<OwnedMutexGuard<()>>,
    id: ConversationId,
    locks: ConversationLocks,
}

impl Drop for ConversationGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(self.id);
    }
}

/// Routes inbound events to bot flows.
#[derive(Clone)]
pub struct Dispatcher {
    services: BotServices,
    locks: ConversationLocks,
    max_message_length: usize,
}

impl Dispatcher {
    pub fn new(services: BotServices, max_message_length: usize) -> Self {
        Self {
            services,
            locks: ConversationLocks::new(),
            max_message_length,
        }
    }

    pub fn services(&self) -> &BotServices {
        &self.services
    }

    /// Handles `event` on its own task.
    pub fn spawn(&self, event: InboundEvent) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.handle(event).await })
    }

    /// Handles one event while holding its conversation's lock.
    pub async fn handle(&self, event: InboundEvent) {
        let id = event.conversation_id;
        let span = info_span!("inbound_event", event_id = %Uuid::new_v4(), conversation_id = %id);

        async {
            let _guard = self.locks.acquire(id).await;
            self.route(id, &event.text).await;
        }
        .instrument(span)
        .await
    }

    async fn route(&self, id: ConversationId, text: &str) {
        match parse_input(text) {
            ParsedInput::Command { command, args } => {
                debug!(command = command.name(), "Handling command");
                self.handle_command(id, command, args).await;
            }
            ParsedInput::Unknown(name) => debug!(command = name, "Ignoring unknown command"),
            ParsedInput::Text(text) => self.handle_text(id, text).await,
        }
    }

    async fn handle_command(&self, id: ConversationId, command: BotCommand, args: &str) {
        match command {
            BotCommand::Start => self.send(id, Reply::plain(GREETING)).await,
            BotCommand::Help => {
                self.send(id, Reply::plain(help_text(self.max_message_length)))
                    .await
            }
            BotCommand::Json => {
                if let Some(question) = self.question(id, command, args).await {
                    self.answer_json(id, question).await;
                }
            }
            BotCommand::FindTrack => self.start_find_track(id).await,
            BotCommand::Experts => {
                if let Some(question) = self.question(id, command, args).await {
                    self.services.experts().process(id, question).await;
                }
            }
            BotCommand::Temperature => {
                if let Some(question) = self.question(id, command, args).await {
                    self.services.temperature_sweep().process(id, question).await;
                }
            }
            BotCommand::DifferentModels => {
                if let Some(question) = self.question(id, command, args).await {
                    match self.services.multi_model() {
                        Some(orchestrator) => orchestrator.process(id, question).await,
                        None => self.send(id, Reply::plain(MODELS_NOT_CONFIGURED)).await,
                    }
                }
            }
            BotCommand::Context => {
                let result = self.toggle_context(id, Toggle::parse(args)).await;
                self.send_or_report(id, result).await;
            }
            BotCommand::Metrics => {
                let result = self.toggle_metrics(id, Toggle::parse(args)).await;
                self.send_or_report(id, result).await;
            }
        }
    }

    /// Validates a command argument, answering the user when it is unusable.
    async fn question<'a>(
        &self,
        id: ConversationId,
        command: BotCommand,
        args: &'a str,
    ) -> Option<&'a str> {
        match ValidationError::check_question(args, self.max_message_length) {
            Ok(()) => Some(args),
            Err(ValidationError::MessageTooLong { .. }) => {
                self.send(id, Reply::plain(question_too_long(self.max_message_length)))
                    .await;
                None
            }
            Err(_) => {
                if let Some(hint) = command.usage_hint() {
                    self.send(id, Reply::plain(hint)).await;
                }
                None
            }
        }
    }

    async fn answer_json(&self, id: ConversationId, question: &str) {
        self.typing(id).await;
        match self.services.json_handler().handle(id, question).await {
            Ok(reply) => self.send(id, reply).await,
            Err(err) => {
                warn!(error = %err, "Structured answer failed");
                self.send(
                    id,
                    Reply::plain(format!("Error communicating with AI service: {}", err)),
                )
                .await;
            }
        }
    }

    async fn start_find_track(&self, id: ConversationId) {
        self.typing(id).await;
        let result = self.services.find_track_handler().start(id).await;
        self.send_or_report(id, result).await;
    }

    async fn toggle_context(&self, id: ConversationId, toggle: Toggle) -> Result<Reply, InteractionError> {
        let context = self.services.context_manager();
        match toggle {
            Toggle::On => {
                context.enable(id).await?;
                Ok(Reply::plain(CONTEXT_ENABLED))
            }
            Toggle::Off => {
                context.disable(id).await?;
                Ok(Reply::plain(CONTEXT_DISABLED))
            }
            Toggle::Status => Ok(Reply::markdown(context_status(context.is_enabled(id).await?))),
        }
    }

    async fn toggle_metrics(&self, id: ConversationId, toggle: Toggle) -> Result<Reply, InteractionError> {
        let settings = self.services.metrics_settings();
        match toggle {
            Toggle::On => {
                settings.enable(id).await?;
                Ok(Reply::plain(METRICS_ENABLED))
            }
            Toggle::Off => {
                settings.disable(id).await?;
                Ok(Reply::plain(METRICS_DISABLED))
            }
            Toggle::Status => Ok(Reply::markdown(metrics_status(settings.is_enabled(id).await?))),
        }
    }

    /// Free text: a find-track turn when that flow is active, otherwise a
    /// plain question. The length ceiling applies to both.
    async fn handle_text(&self, id: ConversationId, text: &str) {
        match ValidationError::check_question(text, self.max_message_length) {
            Ok(()) => {}
            Err(ValidationError::MessageTooLong { length, .. }) => {
                debug!(length, "Rejecting oversized message");
                self.send(id, Reply::plain(message_too_long(self.max_message_length)))
                    .await;
                return;
            }
            Err(_) => {
                debug!("Ignoring blank message");
                return;
            }
        }

        let find_track = self.services.find_track_handler();
        match find_track.is_in_progress(id).await {
            Ok(true) => {
                self.typing(id).await;
                match find_track.handle_turn(id, text).await {
                    Ok(Some(reply)) => self.send(id, reply).await,
                    Ok(None) => debug!("Find-track flow ended concurrently"),
                    Err(err) => self.report_request_failure(id, &err).await,
                }
                return;
            }
            Ok(false) => {}
            Err(err) => {
                self.report_request_failure(id, &err).await;
                return;
            }
        }

        self.typing(id).await;
        match self
            .services
            .ask_handler()
            .handle(AskCommand::new(id, text))
            .await
        {
            Ok(reply) => self.send(id, reply).await,
            Err(err) => self.report_request_failure(id, &err).await,
        }
    }

    async fn report_request_failure(&self, id: ConversationId, err: &InteractionError) {
        error!(error = %err, "Request failed");
        self.send(
            id,
            Reply::plain(format!(
                "Sorry, an error occurred while processing your request: {}",
                err
            )),
        )
        .await;
    }

    async fn send_or_report(&self, id: ConversationId, result: Result<Reply, InteractionError>) {
        match result {
            Ok(reply) => self.send(id, reply).await,
            Err(err) => {
                error!(error = %err, "Command failed");
                self.send(id, Reply::plain(format!("❌ Sorry, an error occurred: {}", err)))
                    .await;
            }
        }
    }

    async fn send(&self, id: ConversationId, reply: Reply) {
        if let Err(err) = self
            .services
            .transport
            .send_text(id, &reply.text, reply.format)
            .await
        {
            warn!(error = %err, "Failed to deliver reply");
        }
    }

    async fn typing(&self, id: ConversationId) {
        if let Err(err) = self.services.transport.send_typing(id).await {
            warn!(error = %err, "Failed to send typing indicator");
        }
    }
}
