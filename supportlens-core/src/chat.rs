//! Support-agent reply generation.
//!
//! Wraps the completion backend with the BillPro support persona and
//! measures the wall-clock latency of the call, which is what gets
//! recorded on the trace when the caller submits the turn.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::completions::{CompletionBackend, CompletionError};

/// Token budget for a support reply.
const CHAT_MAX_TOKENS: u32 = 512;

/// System prompt for the customer-facing support agent.
const CHATBOT_SYSTEM_PROMPT: &str = r#"You are a helpful customer support agent for BillPro, a SaaS billing platform used by thousands of businesses.

Your responsibilities:
- Answer questions about invoices, charges, payment methods, and subscription plans
- Help with account access issues (login, password reset, MFA)
- Handle refund and cancellation requests professionally
- Provide clear, accurate guidance on product features and how-tos

Guidelines:
- Be concise and professional (2-4 sentences unless more detail is needed)
- Show empathy for frustrated customers
- If you cannot directly resolve an issue (e.g., process a refund), explain the steps or escalation path
- Never make up specific account details — acknowledge you'd need to verify identity for account-specific actions"#;

/// A generated support reply plus how long the generation took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub response_time_ms: i64,
}

/// Generate one support-agent reply for a customer message.
///
/// Latency covers the full round trip to the backend. Errors propagate
/// untouched; there is no canned apology reply.
pub async fn generate_reply(
    backend: &dyn CompletionBackend,
    message: &str,
) -> Result<ChatReply, CompletionError> {
    let start = Instant::now();
    let response = backend
        .complete(Some(CHATBOT_SYSTEM_PROMPT), message, CHAT_MAX_TOKENS)
        .await?;
    let response_time_ms = start.elapsed().as_millis() as i64;

    tracing::debug!(response_time_ms, "Generated support reply");

    Ok(ChatReply {
        response,
        response_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubBackend {
        reply: Option<String>,
        seen: Mutex<Option<(Option<String>, String, u32)>>,
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(
            &self,
            system: Option<&str>,
            user: &str,
            max_tokens: u32,
        ) -> Result<String, CompletionError> {
            *self.seen.lock().unwrap() =
                Some((system.map(str::to_string), user.to_string(), max_tokens));
            match &self.reply {
                Some(r) => Ok(r.clone()),
                None => Err(CompletionError::Api {
                    code: 529,
                    message: "Overloaded".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn returns_the_reply_with_a_nonnegative_latency() {
        let backend = StubBackend {
            reply: Some("You can update your card under Settings > Billing.".to_string()),
            seen: Mutex::new(None),
        };

        let reply = generate_reply(&backend, "How do I change my card?").await.unwrap();

        assert_eq!(reply.response, "You can update your card under Settings > Billing.");
        assert!(reply.response_time_ms >= 0);
    }

    #[tokio::test]
    async fn sends_the_support_persona_and_chat_budget() {
        let backend = StubBackend {
            reply: Some("ok".to_string()),
            seen: Mutex::new(None),
        };

        generate_reply(&backend, "hello").await.unwrap();

        let seen = backend.seen.lock().unwrap().take().unwrap();
        let (system, user, max_tokens) = seen;
        assert_eq!(system.as_deref(), Some(CHATBOT_SYSTEM_PROMPT));
        assert_eq!(user, "hello");
        assert_eq!(max_tokens, CHAT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let backend = StubBackend {
            reply: None,
            seen: Mutex::new(None),
        };

        let result = generate_reply(&backend, "hello").await;
        match result {
            Err(CompletionError::Api { code, .. }) => assert_eq!(code, 529),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
