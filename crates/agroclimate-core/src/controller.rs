//! Conversation controller.
//!
//! Owns the conversation store and the session-transient busy/error state,
//! and drives the query gateway on each submission. This is the only
//! component that writes to the conversation.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::conversation::Conversation;
use crate::gateway::QueryGateway;
use crate::message::Message;

/// Point-in-time view of the session handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub busy: bool,
    pub last_error: Option<String>,
}

struct ChatState {
    conversation: Conversation,
    busy: bool,
    last_error: Option<String>,
}

/// Drives the submission pipeline: append user turn, call the gateway,
/// append the resulting assistant turn (answer or apology).
///
/// Cloning is cheap; clones share the same session state, so the UI can
/// move a handle into a spawned task per submission.
#[derive(Clone)]
pub struct ChatController {
    state: Arc<Mutex<ChatState>>,
    gateway: Arc<dyn QueryGateway>,
}

impl ChatController {
    /// Creates a controller with a freshly seeded conversation.
    pub fn new(gateway: Arc<dyn QueryGateway>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState {
                conversation: Conversation::new(),
                busy: false,
                last_error: None,
            })),
            gateway,
        }
    }

    /// Submits one user question and runs it to completion.
    ///
    /// Empty or whitespace-only text is silently ignored. While a query is
    /// in flight, further submissions are refused (single-flight). Exactly
    /// one assistant message is appended per accepted submission, and the
    /// busy flag is cleared on both the success and failure branch.
    pub async fn submit(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        {
            let mut state = self.state.lock().await;
            if state.busy {
                tracing::warn!("submission refused: a query is already in flight");
                return;
            }
            state.conversation.push(Message::user(text));
            state.busy = true;
            state.last_error = None;
        }

        tracing::info!(chars = text.len(), "submitting query");
        let outcome = self.gateway.run_query(text).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(reply) => {
                tracing::info!(sources = reply.sources.len(), "query succeeded");
                state
                    .conversation
                    .push(Message::assistant(reply.text, reply.sources));
            }
            Err(err) => {
                tracing::error!(error = %err, "query failed");
                state.last_error = Some(format!(
                    "Failed to get response from the assistant. {err}"
                ));
                state.conversation.push(Message::assistant_error(format!(
                    "Sorry, I encountered an error. Please try again. \n\nDetails: {err}"
                )));
            }
        }
        state.busy = false;
    }

    /// Snapshot of the current session state for rendering.
    pub async fn snapshot(&self) -> ChatSnapshot {
        let state = self.state.lock().await;
        ChatSnapshot {
            messages: state.conversation.messages().to_vec(),
            busy: state.busy,
            last_error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalystError, Result};
    use crate::gateway::QueryReply;
    use crate::message::Role;
    use crate::source::Source;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct FixedGateway {
        reply: Result<QueryReply>,
    }

    #[async_trait]
    impl QueryGateway for FixedGateway {
        async fn run_query(&self, _prompt: &str) -> Result<QueryReply> {
            self.reply.clone()
        }
    }

    /// Gateway that parks until released, for observing the in-flight span.
    struct BlockingGateway {
        release: Notify,
    }

    #[async_trait]
    impl QueryGateway for BlockingGateway {
        async fn run_query(&self, _prompt: &str) -> Result<QueryReply> {
            self.release.notified().await;
            Ok(QueryReply {
                text: "done".to_string(),
                sources: Vec::new(),
            })
        }
    }

    fn success_controller(text: &str, sources: Vec<Source>) -> ChatController {
        ChatController::new(Arc::new(FixedGateway {
            reply: Ok(QueryReply {
                text: text.to_string(),
                sources,
            }),
        }))
    }

    #[tokio::test]
    async fn session_starts_with_only_the_welcome_message() {
        let controller = success_controller("hi", Vec::new());
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].id, crate::conversation::WELCOME_MESSAGE_ID);
        assert!(!snapshot.busy);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn successful_submission_appends_user_then_assistant() {
        let sources = vec![Source::new("http://a", "A")];
        let controller = success_controller("42 quintals", sources.clone());
        controller.submit("wheat yield in Punjab?").await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(snapshot.messages[1].role, Role::User);
        assert_eq!(snapshot.messages[1].text, "wheat yield in Punjab?");
        assert_eq!(snapshot.messages[2].role, Role::Assistant);
        assert_eq!(snapshot.messages[2].text, "42 quintals");
        assert_eq!(snapshot.messages[2].sources, sources);
        assert!(!snapshot.busy);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn whitespace_submission_is_ignored() {
        let controller = success_controller("unused", Vec::new());
        controller.submit("   \n\t ").await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn failure_appends_apology_with_error_detail() {
        let controller = ChatController::new(Arc::new(FixedGateway {
            reply: Err(AnalystError::gateway("timeout")),
        }));
        controller.submit("rainfall in Kerala?").await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 3);
        let reply = &snapshot.messages[2];
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.text.contains("Sorry, I encountered an error"));
        assert!(reply.text.contains("timeout"));
        assert!(reply.sources.is_empty());
        assert!(snapshot.last_error.as_deref().unwrap().contains("timeout"));
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn busy_spans_exactly_the_in_flight_window() {
        let gateway = Arc::new(BlockingGateway {
            release: Notify::new(),
        });
        let controller = ChatController::new(gateway.clone());
        assert!(!controller.snapshot().await.busy);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("q").await }
        });

        // Wait until the user turn lands, then the flag must be up.
        loop {
            let snapshot = controller.snapshot().await;
            if snapshot.messages.len() == 2 {
                assert!(snapshot.busy);
                break;
            }
            tokio::task::yield_now().await;
        }

        gateway.release.notify_one();
        pending.await.unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 3);
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn second_submission_is_refused_while_busy() {
        let gateway = Arc::new(BlockingGateway {
            release: Notify::new(),
        });
        let controller = ChatController::new(gateway.clone());

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("first").await }
        });
        while controller.snapshot().await.messages.len() < 2 {
            tokio::task::yield_now().await;
        }

        controller.submit("second").await;
        assert_eq!(controller.snapshot().await.messages.len(), 2);

        gateway.release.notify_one();
        pending.await.unwrap();
        assert_eq!(controller.snapshot().await.messages.len(), 3);
    }
}
