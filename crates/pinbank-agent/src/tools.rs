//! Banking tools exposed to the model
//!
//! Four callable tools mirror the ledger's four operations. Tool failures
//! are reported back to the model as plain text rather than errors, so the
//! conversation can continue.

use pinbank_ledger::{Ledger, LedgerError};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::{ToolCall, ToolSpec};

/// Specifications for the four banking tools
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "authenticate_user".to_string(),
            description: "Authenticates a user with their name and PIN to securely check their \
                          account balance. Returns a welcome message with the balance on success, \
                          or an error message on failure."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the account holder"
                    },
                    "pin": {
                        "type": "string",
                        "description": "The account PIN"
                    }
                },
                "required": ["name", "pin"]
            }),
        },
        ToolSpec {
            name: "transfer_funds".to_string(),
            description: "Transfers a specific amount of money from a sender's account to a \
                          recipient's account. The sender must exist, the recipient must exist, \
                          and the sender must have sufficient funds."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "sender_name": {
                        "type": "string",
                        "description": "Name of the sending account"
                    },
                    "recipient_name": {
                        "type": "string",
                        "description": "Name of the receiving account"
                    },
                    "amount": {
                        "type": "number",
                        "description": "Amount to transfer, must be positive"
                    }
                },
                "required": ["sender_name", "recipient_name", "amount"]
            }),
        },
        ToolSpec {
            name: "create_or_update_user".to_string(),
            description: "Creates a new user account or updates an existing user's balance. If \
                          the user exists, this tool updates their balance. A PIN is required \
                          for creation but not for the update itself. If the user does not \
                          exist, a new account is created with the provided details."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the account holder"
                    },
                    "pin": {
                        "type": "string",
                        "description": "PIN to store when creating the account"
                    },
                    "balance": {
                        "type": "number",
                        "description": "Balance to set, must not be negative"
                    }
                },
                "required": ["name", "pin", "balance"]
            }),
        },
        ToolSpec {
            name: "delete_user".to_string(),
            description: "Permanently deletes a user's account from the bank. This is an \
                          irreversible action that requires the user's name and correct PIN \
                          for authorization."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the account holder"
                    },
                    "pin": {
                        "type": "string",
                        "description": "The account PIN"
                    }
                },
                "required": ["name", "pin"]
            }),
        },
    ]
}

/// Executes tool calls against the shared ledger
#[derive(Clone)]
pub struct ToolExecutor {
    ledger: Ledger,
}

impl ToolExecutor {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Run one tool call, rendering the outcome as text for the model
    pub async fn execute(&self, call: &ToolCall) -> String {
        let result = match call.name.as_str() {
            "authenticate_user" => self.authenticate_user(&call.arguments).await,
            "transfer_funds" => self.transfer_funds(&call.arguments).await,
            "create_or_update_user" => self.create_or_update_user(&call.arguments).await,
            "delete_user" => self.delete_user(&call.arguments).await,
            other => Err(format!("Error: Unknown tool '{other}'.")),
        };

        match result {
            Ok(text) => text,
            Err(text) => text,
        }
    }

    async fn authenticate_user(&self, args: &Value) -> Result<String, String> {
        let name = str_arg(args, "name")?;
        let pin = str_arg(args, "pin")?;

        tracing::info!(name = %name, "tool: authenticating user");

        match self.ledger.authenticate(&name, &pin).await {
            Ok(balance) => Ok(format!(
                "Authentication successful. Welcome, {name}! Your current balance is ${balance}."
            )),
            Err(_) => Err("Authentication failed. The provided name or PIN is incorrect.".to_string()),
        }
    }

    async fn transfer_funds(&self, args: &Value) -> Result<String, String> {
        let sender = str_arg(args, "sender_name")?;
        let recipient = str_arg(args, "recipient_name")?;
        let amount = decimal_arg(args, "amount")?;

        tracing::info!(sender = %sender, recipient = %recipient, amount = %amount, "tool: transferring funds");

        match self.ledger.transfer(&sender, &recipient, amount, None).await {
            Ok(new_balance) => Ok(format!(
                "Success! Transferred ${amount} to {recipient}. {sender}'s new balance is ${new_balance}."
            )),
            Err(LedgerError::AccountNotFound { name }) if name == sender => {
                Err(format!("Error: Sender '{sender}' not found."))
            }
            Err(LedgerError::AccountNotFound { .. }) => {
                Err(format!("Error: Recipient '{recipient}' not found."))
            }
            Err(LedgerError::InsufficientFunds { available, .. }) => Err(format!(
                "Error: Insufficient funds. {sender} has only ${available}."
            )),
            Err(other) => Err(format!("Error: {other}.")),
        }
    }

    async fn create_or_update_user(&self, args: &Value) -> Result<String, String> {
        let name = str_arg(args, "name")?;
        let pin = str_arg(args, "pin")?;
        let balance = decimal_arg(args, "balance")?;

        tracing::info!(name = %name, "tool: creating or updating user");

        match self.ledger.upsert(&name, &pin, balance).await {
            Ok((true, balance)) => Ok(format!(
                "Successfully created new user '{name}' with a balance of ${balance}."
            )),
            Ok((false, balance)) => Ok(format!(
                "Successfully updated balance for user '{name}'. New balance is ${balance}."
            )),
            Err(other) => Err(format!("Error: {other}.")),
        }
    }

    async fn delete_user(&self, args: &Value) -> Result<String, String> {
        let name = str_arg(args, "name")?;
        let pin = str_arg(args, "pin")?;

        tracing::info!(name = %name, "tool: deleting user");

        match self.ledger.delete(&name, &pin).await {
            Ok(()) => Ok(format!("Success! User '{name}' has been permanently deleted.")),
            Err(LedgerError::AccountNotFound { .. }) => {
                Err(format!("Error: User '{name}' not found."))
            }
            Err(LedgerError::AuthorizationFailed) => {
                Err("Error: Invalid PIN. Deletion unauthorized.".to_string())
            }
            Err(other) => Err(format!("Error: {other}.")),
        }
    }
}

fn str_arg(args: &Value, key: &str) -> Result<String, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| format!("Error: Missing '{key}' parameter."))
}

fn decimal_arg(args: &Value, key: &str) -> Result<Decimal, String> {
    let value = args
        .get(key)
        .ok_or_else(|| format!("Error: Missing '{key}' parameter."))?;
    serde_json::from_value(value.clone())
        .map_err(|_| format!("Error: Parameter '{key}' is not a valid amount."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    async fn seeded_executor() -> ToolExecutor {
        let ledger = Ledger::new();
        ledger.upsert("alice", "1111", dec!(100)).await.unwrap();
        ledger.upsert("bob", "2222", dec!(50)).await.unwrap();
        ToolExecutor::new(ledger)
    }

    #[tokio::test]
    async fn test_authenticate_tool() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call(
                "authenticate_user",
                serde_json::json!({"name": "alice", "pin": "1111"}),
            ))
            .await;
        assert_eq!(
            reply,
            "Authentication successful. Welcome, alice! Your current balance is $100."
        );

        let reply = executor
            .execute(&call(
                "authenticate_user",
                serde_json::json!({"name": "alice", "pin": "9999"}),
            ))
            .await;
        assert_eq!(
            reply,
            "Authentication failed. The provided name or PIN is incorrect."
        );
    }

    #[tokio::test]
    async fn test_transfer_tool_success_and_errors() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call(
                "transfer_funds",
                serde_json::json!({"sender_name": "alice", "recipient_name": "bob", "amount": 30}),
            ))
            .await;
        assert_eq!(
            reply,
            "Success! Transferred $30 to bob. alice's new balance is $70."
        );

        let reply = executor
            .execute(&call(
                "transfer_funds",
                serde_json::json!({"sender_name": "charlie", "recipient_name": "bob", "amount": 10}),
            ))
            .await;
        assert_eq!(reply, "Error: Sender 'charlie' not found.");

        let reply = executor
            .execute(&call(
                "transfer_funds",
                serde_json::json!({"sender_name": "alice", "recipient_name": "charlie", "amount": 10}),
            ))
            .await;
        assert_eq!(reply, "Error: Recipient 'charlie' not found.");

        let reply = executor
            .execute(&call(
                "transfer_funds",
                serde_json::json!({"sender_name": "alice", "recipient_name": "bob", "amount": 1000}),
            ))
            .await;
        assert_eq!(reply, "Error: Insufficient funds. alice has only $70.");
    }

    #[tokio::test]
    async fn test_transfer_tool_self_transfer_reports_true_balance() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call(
                "transfer_funds",
                serde_json::json!({"sender_name": "alice", "recipient_name": "alice", "amount": 30}),
            ))
            .await;
        assert_eq!(
            reply,
            "Success! Transferred $30 to alice. alice's new balance is $100."
        );
    }

    #[tokio::test]
    async fn test_create_or_update_tool_ignores_pin_on_update() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call(
                "create_or_update_user",
                serde_json::json!({"name": "dave", "pin": "4444", "balance": 0}),
            ))
            .await;
        assert_eq!(
            reply,
            "Successfully created new user 'dave' with a balance of $0."
        );

        // Update goes through regardless of the supplied pin
        let reply = executor
            .execute(&call(
                "create_or_update_user",
                serde_json::json!({"name": "dave", "pin": "whatever", "balance": 500}),
            ))
            .await;
        assert_eq!(
            reply,
            "Successfully updated balance for user 'dave'. New balance is $500."
        );
    }

    #[tokio::test]
    async fn test_delete_tool_requires_pin() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call(
                "delete_user",
                serde_json::json!({"name": "alice", "pin": "0000"}),
            ))
            .await;
        assert_eq!(reply, "Error: Invalid PIN. Deletion unauthorized.");

        let reply = executor
            .execute(&call(
                "delete_user",
                serde_json::json!({"name": "alice", "pin": "1111"}),
            ))
            .await;
        assert_eq!(reply, "Success! User 'alice' has been permanently deleted.");

        let reply = executor
            .execute(&call(
                "delete_user",
                serde_json::json!({"name": "alice", "pin": "1111"}),
            ))
            .await;
        assert_eq!(reply, "Error: User 'alice' not found.");
    }

    #[tokio::test]
    async fn test_unknown_tool_and_missing_args() {
        let executor = seeded_executor().await;

        let reply = executor
            .execute(&call("mint_money", serde_json::json!({})))
            .await;
        assert_eq!(reply, "Error: Unknown tool 'mint_money'.");

        let reply = executor
            .execute(&call("authenticate_user", serde_json::json!({"name": "alice"})))
            .await;
        assert_eq!(reply, "Error: Missing 'pin' parameter.");
    }
}
