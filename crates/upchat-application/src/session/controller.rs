//! ConversationController - owns the active conversation.
//!
//! The controller holds the transcript, the session id and the in-flight
//! relay call, and keeps the session repository in step with them. All
//! state sits behind one async mutex that is never held across the relay
//! await, so the user can start a new conversation, load history or edit a
//! question while a reply is pending. Every such action cancels the pending
//! call, and a reply that arrives for a cancelled call is dropped.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use upchat_core::config::ChatSettings;
use upchat_core::error::{Result, UpChatError};
use upchat_core::relay::{ChatRelay, RelayError};
use upchat_core::session::{
    Message, MessageId, Session, SessionId, SessionIdGenerator, Transcript, render_transcript,
};
use upchat_core::store::KeyValueStore;
use upchat_core::user::{DefaultUserService, UserService};

use super::repository::SessionRepository;
use super::snapshot::ActiveSnapshot;

/// Where the active conversation stands relative to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Welcome message only; nothing stored.
    Fresh,
    /// Started here; stored once it holds a user message.
    Active,
    /// Loaded from history; continuing it updates the same entry.
    Recovered,
}

/// Result of [`ConversationController::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The relay answered; the reply was appended.
    Replied { message: Message, intent: String },
    /// The relay failed; the fallback notice was appended.
    Failed { message: Message },
    /// The call was superseded; nothing was appended.
    Cancelled,
    /// Blank input; nothing happened.
    Ignored,
}

/// Read-only view of the active conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub session_id: SessionId,
    pub phase: ConversationPhase,
    pub messages: Vec<Message>,
    pub input_draft: String,
    pub awaiting_reply: bool,
}

/// A question already in the transcript whose relay call has not run yet.
///
/// Produced by [`ConversationController::begin_send`].
#[derive(Debug)]
pub struct PendingSend {
    text: String,
    session_id: SessionId,
    token: CancellationToken,
}

impl PendingSend {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

struct ControllerState {
    session_id: SessionId,
    phase: ConversationPhase,
    transcript: Transcript,
    input_draft: String,
    repository: SessionRepository,
    in_flight: Option<CancellationToken>,
}

impl ControllerState {
    /// Cancels the pending relay call, if any.
    fn supersede(&mut self) {
        if let Some(token) = self.in_flight.take() {
            tracing::debug!(
                "[ConversationController] Cancelling pending reply for session {}",
                self.session_id
            );
            token.cancel();
        }
    }

    /// Records a transcript change: phase, history entry and snapshot.
    fn commit(&mut self, store: &dyn KeyValueStore) {
        let has_user = self.transcript.has_user_message();
        match (self.phase, has_user) {
            (ConversationPhase::Fresh, true) => self.phase = ConversationPhase::Active,
            (ConversationPhase::Active | ConversationPhase::Recovered, false) => {
                self.phase = ConversationPhase::Fresh
            }
            _ => {}
        }

        let outcome = self.repository.upsert(Session::from_messages(
            self.session_id,
            self.transcript.to_vec(),
            Local::now(),
        ));
        tracing::trace!(
            "[ConversationController] Session {} upsert: {:?}",
            self.session_id,
            outcome
        );

        self.save_snapshot(store);
    }

    fn save_snapshot(&self, store: &dyn KeyValueStore) {
        ActiveSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            messages: self.transcript.to_vec(),
        }
        .save(store);
    }

    fn reset(&mut self, session_id: SessionId, welcome_text: &str) {
        self.supersede();
        self.session_id = session_id;
        self.phase = ConversationPhase::Fresh;
        self.transcript = Transcript::welcome(welcome_text);
        self.input_draft.clear();
    }
}

/// Owns the active conversation and its link to the session history.
///
/// Cloning is cheap; clones share the same conversation.
#[derive(Clone)]
pub struct ConversationController {
    state: Arc<Mutex<ControllerState>>,
    relay: Arc<dyn ChatRelay>,
    store: Arc<dyn KeyValueStore>,
    user_service: Arc<dyn UserService>,
    ids: Arc<SessionIdGenerator>,
    settings: ChatSettings,
}

impl ConversationController {
    /// Opens the history in `store` and resumes the last active conversation.
    ///
    /// A stored active transcript that holds user messages is resumed under
    /// its id and merged into the history if the history lacks it or holds
    /// an older copy. Otherwise a fresh conversation with a new id starts.
    pub fn new(
        relay: Arc<dyn ChatRelay>,
        store: Arc<dyn KeyValueStore>,
        settings: ChatSettings,
    ) -> Self {
        let mut repository = SessionRepository::load(store.clone());
        let snapshot = ActiveSnapshot::load(store.as_ref());

        let seed = repository
            .latest_id()
            .into_iter()
            .chain(snapshot.as_ref().map(|s| s.session_id))
            .max()
            .unwrap_or(0);
        let ids = SessionIdGenerator::seeded(seed);

        let state = match snapshot {
            Some(snapshot) if snapshot.messages.iter().any(Message::is_user) => {
                let phase = match snapshot.phase {
                    ConversationPhase::Fresh => ConversationPhase::Active,
                    other => other,
                };
                let stale = repository
                    .find(snapshot.session_id)
                    .is_none_or(|stored| stored.messages != snapshot.messages);
                if stale {
                    tracing::info!(
                        "[ConversationController] Merging active transcript {} into history",
                        snapshot.session_id
                    );
                    repository.upsert(Session::from_messages(
                        snapshot.session_id,
                        snapshot.messages.clone(),
                        Local::now(),
                    ));
                }
                tracing::info!(
                    "[ConversationController] Resumed session {} ({:?})",
                    snapshot.session_id,
                    phase
                );
                ControllerState {
                    session_id: snapshot.session_id,
                    phase,
                    transcript: Transcript::from_messages(snapshot.messages),
                    input_draft: String::new(),
                    repository,
                    in_flight: None,
                }
            }
            Some(snapshot) => ControllerState {
                session_id: snapshot.session_id,
                phase: ConversationPhase::Fresh,
                transcript: Transcript::welcome(&settings.welcome_text),
                input_draft: String::new(),
                repository,
                in_flight: None,
            },
            None => ControllerState {
                session_id: ids.next_id(),
                phase: ConversationPhase::Fresh,
                transcript: Transcript::welcome(&settings.welcome_text),
                input_draft: String::new(),
                repository,
                in_flight: None,
            },
        };
        state.save_snapshot(store.as_ref());

        Self {
            state: Arc::new(Mutex::new(state)),
            relay,
            store,
            user_service: Arc::new(DefaultUserService),
            ids: Arc::new(ids),
            settings,
        }
    }

    /// Uses `user_service` to label the user's messages in exports.
    pub fn with_user_service(mut self, user_service: Arc<dyn UserService>) -> Self {
        self.user_service = user_service;
        self
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub async fn session_id(&self) -> SessionId {
        self.state.lock().await.session_id
    }

    pub async fn phase(&self) -> ConversationPhase {
        self.state.lock().await.phase
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state.lock().await;
        ConversationSnapshot {
            session_id: state.session_id,
            phase: state.phase,
            messages: state.transcript.to_vec(),
            input_draft: state.input_draft.clone(),
            awaiting_reply: state.in_flight.is_some(),
        }
    }

    /// Stored sessions, newest first.
    pub async fn history(&self) -> Vec<Session> {
        self.state.lock().await.repository.list().cloned().collect()
    }

    pub async fn find_session(&self, id: SessionId) -> Option<Session> {
        self.state.lock().await.repository.find(id).cloned()
    }

    pub async fn input_draft(&self) -> String {
        self.state.lock().await.input_draft.clone()
    }

    /// Returns and clears the input draft.
    pub async fn take_input_draft(&self) -> String {
        std::mem::take(&mut self.state.lock().await.input_draft)
    }

    pub async fn set_input_draft(&self, text: impl Into<String>) {
        self.state.lock().await.input_draft = text.into();
    }

    /// Sends a user message and waits for the reply.
    ///
    /// Equivalent to [`begin_send`](Self::begin_send) followed by
    /// [`finish_send`](Self::finish_send).
    pub async fn send(&self, text: &str) -> SendOutcome {
        match self.begin_send(text).await {
            Some(pending) => self.finish_send(pending).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Appends and stores the user message, superseding any pending call.
    ///
    /// Returns `None` for blank input. Once this returns, the question is in
    /// the transcript, so later actions see it even if the relay call runs
    /// on another task.
    pub async fn begin_send(&self, text: &str) -> Option<PendingSend> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut state = self.state.lock().await;
        state.supersede();
        state.input_draft.clear();
        state.transcript.push_user(text);
        state.commit(self.store.as_ref());

        let token = CancellationToken::new();
        state.in_flight = Some(token.clone());
        Some(PendingSend {
            text: text.to_string(),
            session_id: state.session_id,
            token,
        })
    }

    /// Calls the relay for `pending` and appends the outcome.
    ///
    /// On success the reply is appended; on failure the fallback notice is.
    /// If another action superseded this call in the meantime, nothing is
    /// appended and `Cancelled` is returned.
    pub async fn finish_send(&self, pending: PendingSend) -> SendOutcome {
        let PendingSend {
            text,
            session_id,
            token,
        } = pending;

        tracing::debug!(
            "[ConversationController] Relaying message for session {}",
            session_id
        );
        let result = self.relay.send(&text, session_id, &token).await;

        let mut state = self.state.lock().await;
        // Checked under the lock: a superseding action cancels while holding it.
        if token.is_cancelled() {
            tracing::debug!(
                "[ConversationController] Dropping superseded reply for session {}",
                session_id
            );
            return SendOutcome::Cancelled;
        }
        state.in_flight = None;

        match result {
            Ok(reply) => {
                tracing::debug!(
                    "[ConversationController] Reply for session {} (intent: {})",
                    session_id,
                    reply.intent
                );
                let message = state.transcript.push_bot(reply.text);
                state.commit(self.store.as_ref());
                SendOutcome::Replied {
                    message,
                    intent: reply.intent,
                }
            }
            Err(RelayError::Cancelled) => SendOutcome::Cancelled,
            Err(e) => {
                tracing::warn!(
                    "[ConversationController] Relay failed for session {}: {}",
                    session_id,
                    e
                );
                let message = state.transcript.push_bot(&self.settings.fallback_text);
                state.commit(self.store.as_ref());
                SendOutcome::Failed { message }
            }
        }
    }

    /// Starts a fresh conversation under a new id.
    ///
    /// The previous conversation, if it holds a user message, is already in
    /// the history.
    pub async fn start_new(&self) -> SessionId {
        let mut state = self.state.lock().await;
        let id = self.ids.next_id();
        state.reset(id, &self.settings.welcome_text);
        state.save_snapshot(self.store.as_ref());
        tracing::info!("[ConversationController] Started session {}", id);
        id
    }

    /// Makes the stored session `id` the active conversation.
    ///
    /// The stored entry is not modified until the conversation changes.
    pub async fn load_history(&self, id: SessionId) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state
            .repository
            .find(id)
            .cloned()
            .ok_or_else(|| UpChatError::not_found("Session", id.to_string()))?;

        state.supersede();
        state.session_id = session.id;
        state.phase = ConversationPhase::Recovered;
        state.transcript = Transcript::from_messages(session.messages);
        state.input_draft.clear();
        state.save_snapshot(self.store.as_ref());

        tracing::info!("[ConversationController] Loaded session {}", id);
        Ok(())
    }

    /// Removes session `id` from the history.
    ///
    /// Deleting the active conversation starts a fresh one.
    pub async fn delete_history(&self, id: SessionId) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.repository.delete(id);
        if id == state.session_id {
            let next = self.ids.next_id();
            state.reset(next, &self.settings.welcome_text);
            state.save_snapshot(self.store.as_ref());
        }
        tracing::info!(
            "[ConversationController] Delete session {}: removed={}",
            id,
            removed
        );
        removed
    }

    /// Removes every stored session.
    ///
    /// An active conversation that was stored is replaced by a fresh one.
    pub async fn clear_history(&self) {
        let mut state = self.state.lock().await;
        state.repository.clear();
        if state.phase != ConversationPhase::Fresh {
            let next = self.ids.next_id();
            state.reset(next, &self.settings.welcome_text);
            state.save_snapshot(self.store.as_ref());
        }
        tracing::info!("[ConversationController] Cleared chat history");
    }

    /// Retracts user message `message_id` and its reply for re-asking.
    ///
    /// The retracted text (or `replacement`, if given) becomes the input
    /// draft and is returned. The session keeps its id.
    pub async fn edit_message(
        &self,
        message_id: MessageId,
        replacement: Option<String>,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        match state.transcript.find(message_id) {
            None => {
                return Err(UpChatError::not_found("Message", message_id.to_string()));
            }
            Some(message) if !message.is_user() => {
                return Err(UpChatError::invalid_input(format!(
                    "message {} is not a user message",
                    message_id
                )));
            }
            Some(_) => {}
        }

        state.supersede();
        let retraction = state
            .transcript
            .retract(message_id)
            .ok_or_else(|| UpChatError::internal("retraction failed for a user message"))?;
        state.input_draft = replacement.unwrap_or(retraction.question.text);
        state.commit(self.store.as_ref());

        tracing::info!(
            "[ConversationController] Retracted message {} in session {}",
            message_id,
            state.session_id
        );
        Ok(state.input_draft.clone())
    }

    /// Renders the active conversation as plain text.
    pub async fn export_transcript(&self) -> String {
        let messages = self.state.lock().await.transcript.to_vec();
        render_transcript(
            None,
            &messages,
            &self.user_service.get_user_name(),
            &self.settings.bot_name,
        )
    }

    /// Renders stored session `id` as plain text, titled.
    pub async fn export_session(&self, id: SessionId) -> Result<String> {
        let session = self
            .find_session(id)
            .await
            .ok_or_else(|| UpChatError::not_found("Session", id.to_string()))?;
        Ok(render_transcript(
            Some(&session.title),
            &session.messages,
            &self.user_service.get_user_name(),
            &self.settings.bot_name,
        ))
    }

    /// Cancels any pending reply and flushes the store.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.supersede();
        if !state.repository.is_synced() {
            state.repository.persist();
        }
        state.save_snapshot(self.store.as_ref());
        self.store.flush()
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
