//! Agent runner - the tool-calling conversation loop

use std::sync::Arc;

use pinbank_ledger::Ledger;

use crate::provider::ChatProvider;
use crate::session::SessionStore;
use crate::tools::{tool_specs, ToolExecutor};
use crate::types::{AgentError, CompletionRequest, Message, Result};

/// Standing instructions for the banking assistant.
///
/// Confirmation before transfers and deletions is model policy carried in
/// these instructions; the ledger itself never asks.
pub const BANKING_INSTRUCTIONS: &str = "\
You are a highly capable and trustworthy banking assistant. Your primary role is to help users \
manage their bank accounts by interacting with a secure banking API on their behalf.

You must operate under the following principles:
1. Clarity and Confirmation: Always be clear about the action you are about to perform. For \
sensitive operations like transferring funds or deleting users, explicitly ask for confirmation \
before proceeding.
2. Information Gathering: You must gather all necessary information from the user before using a \
tool. For example, to transfer funds, you need the sender's name, the recipient's name, and the \
amount. Do not attempt to use a tool with incomplete information.
3. Tool-Based Actions: Your ONLY method of interacting with the bank is through the provided \
functions (tools). Do not make up balances or transaction statuses.
4. Security First: Never ask for more information than a tool requires. Handle user data like \
names and PINs with care.";

/// Drives one conversation turn at a time: prompt the model with the
/// session history, execute any tool calls against the ledger, and persist
/// the new turns.
pub struct AgentRunner {
    provider: Arc<dyn ChatProvider>,
    tools: ToolExecutor,
    store: Arc<dyn SessionStore>,
    max_tool_rounds: usize,
}

impl AgentRunner {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        ledger: Ledger,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            tools: ToolExecutor::new(ledger),
            store,
            max_tool_rounds: 8,
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Process one user input within a session and return the assistant's
    /// final reply
    pub async fn run(&self, session_id: &str, input: &str) -> Result<String> {
        let mut history = self.store.history(session_id).await?;
        let user_turn = Message::user(input);
        history.push(user_turn.clone());
        let mut new_turns = vec![user_turn];

        for _ in 0..self.max_tool_rounds {
            let request = CompletionRequest::new(history.clone())
                .with_system(BANKING_INSTRUCTIONS)
                .with_tools(tool_specs());

            let response = self.provider.complete(request).await?;

            if response.tool_calls.is_empty() {
                let reply = response.content;
                new_turns.push(Message::assistant(reply.clone()));
                self.store.append(session_id, &new_turns).await?;
                return Ok(reply);
            }

            let assistant_turn = Message::assistant_with_tool_calls(
                response.content,
                response.tool_calls.clone(),
            );
            history.push(assistant_turn.clone());
            new_turns.push(assistant_turn);

            for call in &response.tool_calls {
                tracing::info!(session = %session_id, tool = %call.name, "executing tool call");
                let result = self.tools.execute(call).await;
                let tool_turn = Message::tool(call.id.clone(), result);
                history.push(tool_turn.clone());
                new_turns.push(tool_turn);
            }
        }

        // Persist what happened before giving up, so the session stays
        // consistent with the ledger mutations the tools already made.
        self.store.append(session_id, &new_turns).await?;
        Err(AgentError::ToolLimitReached {
            rounds: self.max_tool_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::types::{CompletionResponse, MessageRole};
    use rust_decimal_macros::dec;

    async fn seeded_ledger() -> Ledger {
        let ledger = Ledger::new();
        ledger.upsert("alice", "1111", dec!(100)).await.unwrap();
        ledger.upsert("bob", "2222", dec!(50)).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_plain_reply_is_persisted() {
        let provider = Arc::new(ScriptedProvider::new(vec![CompletionResponse::text(
            "Hello! How can I help you with your account today?",
        )]));
        let store = Arc::new(MemorySessionStore::new());
        let runner = AgentRunner::new(provider, seeded_ledger().await, store.clone());

        let reply = runner.run("s1", "hi").await.unwrap();
        assert_eq!(reply, "Hello! How can I help you with your account today?");

        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_tool_call_round_mutates_ledger_and_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            CompletionResponse::tool_call(
                "call_1",
                "transfer_funds",
                serde_json::json!({"sender_name": "alice", "recipient_name": "bob", "amount": 30}),
            ),
            CompletionResponse::text("Done - I've sent $30 to bob. Alice now has $70."),
        ]));
        let store = Arc::new(MemorySessionStore::new());
        let ledger = seeded_ledger().await;
        let runner = AgentRunner::new(provider, ledger.clone(), store.clone());

        let reply = runner.run("s1", "please send bob $30 from alice").await.unwrap();
        assert!(reply.contains("$30"));

        assert_eq!(ledger.balance("alice").await, Some(dec!(70)));
        assert_eq!(ledger.balance("bob").await, Some(dec!(80)));

        // user, assistant tool call, tool result, final assistant reply
        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].tool_calls[0].name, "transfer_funds");
        assert_eq!(history[2].role, MessageRole::Tool);
        assert_eq!(
            history[2].content,
            "Success! Transferred $30 to bob. alice's new balance is $70."
        );
    }

    #[tokio::test]
    async fn test_history_feeds_next_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            CompletionResponse::text("Who should receive the money?"),
            CompletionResponse::text("Understood."),
        ]));
        let store = Arc::new(MemorySessionStore::new());
        let runner = AgentRunner::new(provider, seeded_ledger().await, store.clone());

        runner.run("s1", "I want to transfer money").await.unwrap();
        runner.run("s1", "to bob").await.unwrap();

        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2].content, "to bob");
    }

    #[tokio::test]
    async fn test_tool_limit_is_enforced() {
        // A model that never stops calling tools
        let responses = (0..3)
            .map(|i| {
                CompletionResponse::tool_call(
                    format!("call_{i}"),
                    "authenticate_user",
                    serde_json::json!({"name": "alice", "pin": "1111"}),
                )
            })
            .collect();
        let provider = Arc::new(ScriptedProvider::new(responses));
        let store = Arc::new(MemorySessionStore::new());
        let runner = AgentRunner::new(provider, seeded_ledger().await, store.clone())
            .with_max_tool_rounds(3);

        let err = runner.run("s1", "check alice").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolLimitReached { rounds: 3 }));

        // The partial exchange is still persisted
        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 1 + 3 * 2);
    }
}
