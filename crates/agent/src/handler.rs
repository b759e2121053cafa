//! The chat request handler.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use taskbot_config::AppConfig;
use taskbot_core::error::MemoryError;
use taskbot_core::message::Role;
use taskbot_core::provider::Provider;
use taskbot_memory::ConversationStore;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fallback::fallback_reply;
use crate::prompt::PromptAssembler;

/// User identifier used when the caller supplies none.
pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Error)]
pub enum ChatError {
    /// The message was empty or whitespace only.
    #[error("Mensagem vazia")]
    EmptyMessage,

    #[error("{0}")]
    Internal(String),
}

impl From<MemoryError> for ChatError {
    fn from(e: MemoryError) -> Self {
        ChatError::Internal(e.to_string())
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Ai,
    Fallback,
}

/// The outcome of one chat request.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub source: ReplySource,
}

/// Orchestrates store → prompt → provider → fallback for each message.
pub struct ChatHandler {
    provider: Arc<dyn Provider>,
    store: Arc<ConversationStore>,
    assembler: PromptAssembler,
    record_fallback_replies: bool,
}

impl ChatHandler {
    pub fn new(provider: Arc<dyn Provider>, store: Arc<ConversationStore>) -> Self {
        Self {
            provider,
            store,
            assembler: PromptAssembler::new(),
            record_fallback_replies: false,
        }
    }

    /// Build a handler with prompt and history settings taken from config.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        store: Arc<ConversationStore>,
    ) -> Self {
        let mut assembler =
            PromptAssembler::new().with_history_window(config.conversation.history_window);
        if let Some(prompt) = &config.prompt.system_prompt_override {
            assembler = assembler.with_system_prompt(prompt.clone());
        }

        Self::new(provider, store)
            .with_assembler(assembler)
            .with_fallback_recording(config.conversation.record_fallback_replies)
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Also store canned fallback replies as bot turns.
    pub fn with_fallback_recording(mut self, enabled: bool) -> Self {
        self.record_fallback_replies = enabled;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Handle one message from `user_id` (or [`DEFAULT_USER_ID`]).
    ///
    /// Generation failures are never returned: they produce a fallback reply.
    pub async fn handle(
        &self,
        user_id: Option<&str>,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user_id = user_id.unwrap_or(DEFAULT_USER_ID);
        let request_id = uuid::Uuid::new_v4();
        info!(%request_id, user_id, message_len = message.len(), "Chat message received");

        let mut session = self.store.session(user_id).await?;
        session.append(Role::User, message);

        let history = session.recent(self.assembler.history_window());
        let prompt = self.assembler.build(history, message);
        debug!(%request_id, prompt_len = prompt.len(), "Prompt assembled");

        let (reply, source) = match self.provider.generate(&prompt).await {
            Ok(text) => {
                session.append(Role::Bot, text.clone());
                (text, ReplySource::Ai)
            }
            Err(e) => {
                warn!(%request_id, provider = %self.provider.name(), error = %e, "Generation failed, using fallback reply");
                let text = fallback_reply(message);
                if self.record_fallback_replies {
                    session.append(Role::Bot, text.clone());
                }
                (text, ReplySource::Fallback)
            }
        };

        debug!(%request_id, ?source, stored_turns = session.len(), "Reply ready");

        Ok(ChatReply {
            reply,
            timestamp: Utc::now(),
            user_id: user_id.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use taskbot_core::error::ProviderError;

    /// Returns numbered replies and records every prompt it receives.
    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            Ok(format!("resposta {}", prompts.len()))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::ApiError {
                status_code: 500,
                message: "quota exceeded".into(),
            })
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    /// Enforces a short deadline the same way the production wrapper does.
    struct Deadline<P>(P);

    #[async_trait]
    impl<P: Provider> Provider for Deadline<P> {
        fn name(&self) -> &str {
            self.0.name()
        }

        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            tokio::time::timeout(Duration::from_millis(20), self.0.generate(prompt))
                .await
                .map_err(|_| ProviderError::Timeout("deadline".into()))?
        }
    }

    fn handler_with(provider: Arc<dyn Provider>) -> ChatHandler {
        ChatHandler::new(provider, Arc::new(ConversationStore::default()))
    }

    #[tokio::test]
    async fn empty_message_rejected_without_mutation() {
        let handler = handler_with(Arc::new(RecordingProvider::new()));

        for msg in ["", "   ", "\n\t"] {
            let err = handler.handle(Some("ana"), msg).await.unwrap_err();
            assert!(matches!(err, ChatError::EmptyMessage));
        }
        assert!(handler.store().is_empty());
    }

    #[tokio::test]
    async fn failing_provider_uses_fallback() {
        let handler = handler_with(Arc::new(FailingProvider));

        let reply = handler.handle(None, "Como criar tarefa?").await.unwrap();
        assert_eq!(reply.reply, fallback::CREATE_TASK);
        assert_eq!(reply.user_id, DEFAULT_USER_ID);
        assert_eq!(reply.source, ReplySource::Fallback);

        // Only the user turn is recorded on the fallback path.
        let history = handler.store().history(DEFAULT_USER_ID).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role(), Role::User);
    }

    #[tokio::test]
    async fn fallback_recording_is_configurable() {
        let handler = handler_with(Arc::new(FailingProvider)).with_fallback_recording(true);

        handler.handle(Some("ana"), "oi").await.unwrap();
        let history = handler.store().history("ana").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role(), Role::Bot);
        assert_eq!(history[1].text(), fallback::GREETING);
    }

    #[tokio::test]
    async fn hung_provider_falls_back() {
        let handler = handler_with(Arc::new(Deadline(HangingProvider)));
        let reply = handler.handle(Some("ana"), "estou atrasado").await.unwrap();
        assert_eq!(reply.reply, fallback::PRIORITIZE);
        assert_eq!(reply.source, ReplySource::Fallback);
    }

    #[tokio::test]
    async fn success_records_both_turns() {
        let handler = handler_with(Arc::new(RecordingProvider::new()));

        let reply = handler.handle(Some("ana"), "  oi  ").await.unwrap();
        assert_eq!(reply.reply, "resposta 1");
        assert_eq!(reply.source, ReplySource::Ai);
        assert_eq!(reply.user_id, "ana");

        let history = handler.store().history("ana").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text(), "oi");
        assert_eq!(history[1].role(), Role::Bot);
        assert_eq!(history[1].text(), "resposta 1");
    }

    #[tokio::test]
    async fn second_prompt_contains_first_exchange() {
        let provider = Arc::new(RecordingProvider::new());
        let handler = handler_with(provider.clone());

        handler.handle(Some("ana"), "primeira pergunta").await.unwrap();
        handler.handle(Some("ana"), "segunda pergunta").await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(
            prompts[0].contains("Histórico da conversa:\nUsuário: primeira pergunta\n\n")
        );
        assert!(prompts[1].contains(
            "Histórico da conversa:\n\
             Usuário: primeira pergunta\n\
             Bot: resposta 1\n\
             Usuário: segunda pergunta\n\n\
             Mensagem atual do usuário: segunda pergunta"
        ));
    }

    #[tokio::test]
    async fn history_capped_at_ten_turns() {
        let handler = handler_with(Arc::new(RecordingProvider::new()));

        for i in 0..7 {
            handler
                .handle(Some("ana"), &format!("pergunta {i}"))
                .await
                .unwrap();
        }

        let history = handler.store().history("ana").await;
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].text(), "pergunta 2");
        assert_eq!(history[9].text(), "resposta 7");
    }

    #[tokio::test]
    async fn prompt_carries_only_recent_window() {
        let provider = Arc::new(RecordingProvider::new());
        let handler = handler_with(provider.clone());

        for i in 0..5 {
            handler
                .handle(Some("ana"), &format!("pergunta {i}"))
                .await
                .unwrap();
        }

        let last = provider.prompts().pop().unwrap();
        assert!(!last.contains("pergunta 1"));
        assert!(last.contains("Bot: resposta 2\nUsuário: pergunta 2\n"));
        assert!(
            last.contains("Usuário: pergunta 4\n\nMensagem atual do usuário: pergunta 4")
        );
    }

    #[tokio::test]
    async fn users_do_not_share_history() {
        let provider = Arc::new(RecordingProvider::new());
        let handler = handler_with(provider.clone());

        handler.handle(Some("ana"), "segredo da ana").await.unwrap();
        handler.handle(Some("bia"), "oi").await.unwrap();

        assert!(!provider.prompts()[1].contains("segredo da ana"));
    }

    #[tokio::test]
    async fn from_config_applies_overrides() {
        let mut config = AppConfig::default();
        config.prompt.system_prompt_override = Some("PROMPT PERSONALIZADO".into());
        config.conversation.history_window = 1;

        let provider = Arc::new(RecordingProvider::new());
        let handler = ChatHandler::from_config(
            &config,
            provider.clone(),
            Arc::new(ConversationStore::default()),
        );

        handler.handle(Some("ana"), "um").await.unwrap();
        handler.handle(Some("ana"), "dois").await.unwrap();

        let prompt = &provider.prompts()[1];
        assert!(prompt.starts_with("PROMPT PERSONALIZADO\n\n"));
        assert!(prompt.contains("Histórico da conversa:\nUsuário: dois\n\n"));
    }

    #[tokio::test]
    async fn store_exhaustion_is_internal_error() {
        let store = Arc::new(ConversationStore::new(10, 1));
        let handler = ChatHandler::new(Arc::new(RecordingProvider::new()), store.clone());

        let _held = store.session("ana").await.unwrap();
        let err = handler.handle(Some("bia"), "oi").await.unwrap_err();
        assert!(matches!(err, ChatError::Internal(_)));
    }
}
