//! PinBank Ledger - the authoritative in-memory account store
//!
//! The ledger is:
//! - Keyed by account name (case-sensitive, unique)
//! - PIN-protected (plain-text equality compare, kept for behavioral
//!   fidelity with the system this replaces)
//! - Volatile (empty at process start, discarded at process end)
//!
//! # Invariants
//!
//! 1. No negative balances, ever
//! 2. A transfer conserves the sender+recipient total (debit == credit)
//! 3. Every mutating operation runs its whole read-validate-write sequence
//!    under one exclusive critical section
//! 4. A failed operation leaves the ledger untouched

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {name}")]
    AccountNotFound { name: String },

    /// Name/PIN combination invalid. Deliberately carries no detail about
    /// which of the two was wrong.
    #[error("Invalid name or PIN")]
    AuthenticationFailed,

    /// PIN mismatch on an operation that requires authorization.
    #[error("Invalid PIN")]
    AuthorizationFailed,

    #[error("Insufficient funds: have {available}, need {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A named account with a shared-secret PIN and a non-negative balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub pin: String,
    pub balance: Decimal,
}

/// Ledger policy knobs
///
/// The system this replaces moved funds without checking the sender's PIN.
/// That behavior is the default; `require_auth_for_transfer` turns transfer
/// into an authorized operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub require_auth_for_transfer: bool,
}

/// The PinBank Ledger
///
/// Owns the set of accounts and the four operations that mutate it.
/// Thread-safe and designed for concurrent access: `authenticate` takes a
/// shared read lock, everything else holds the write lock for the full
/// operation so no interleaving can observe a half-applied transfer.
#[derive(Clone)]
pub struct Ledger {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a new empty ledger with default policy
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a new empty ledger with explicit policy
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Check a name/PIN pair and return the account's balance
    ///
    /// Never mutates state. Unknown name and wrong PIN both produce the
    /// same generic `AuthenticationFailed`.
    pub async fn authenticate(&self, name: &str, pin: &str) -> Result<Decimal> {
        let accounts = self.accounts.read().await;
        match accounts.get(name) {
            Some(account) if account.pin == pin => Ok(account.balance),
            _ => Err(LedgerError::AuthenticationFailed),
        }
    }

    /// Move `amount` from `sender` to `recipient`, returning the sender's
    /// new balance
    ///
    /// Validates in order: amount positive, sender exists (and PIN matches
    /// when the ledger requires transfer authorization), recipient exists,
    /// sender covers the amount. Debit and credit are applied together
    /// inside one critical section.
    pub async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
        sender_pin: Option<&str>,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                message: format!("transfer amount must be positive, got {amount}"),
            });
        }

        let mut accounts = self.accounts.write().await;

        let sender_account = accounts
            .get(sender)
            .ok_or_else(|| LedgerError::AccountNotFound {
                name: sender.to_string(),
            })?;

        if self.config.require_auth_for_transfer {
            match sender_pin {
                Some(pin) if pin == sender_account.pin => {}
                _ => return Err(LedgerError::AuthorizationFailed),
            }
        }

        let available = sender_account.balance;

        if !accounts.contains_key(recipient) {
            return Err(LedgerError::AccountNotFound {
                name: recipient.to_string(),
            });
        }

        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        // Both sides validated; apply the debit and credit together.
        // Sequential lookups also keep a self-transfer a net no-op.
        {
            let account = accounts
                .get_mut(sender)
                .ok_or_else(|| LedgerError::AccountNotFound {
                    name: sender.to_string(),
                })?;
            account.balance -= amount;
        }
        {
            let account = accounts
                .get_mut(recipient)
                .ok_or_else(|| LedgerError::AccountNotFound {
                    name: recipient.to_string(),
                })?;
            account.balance += amount;
        }

        // Read back after the credit so a self-transfer reports the
        // unchanged balance.
        let new_balance = accounts
            .get(sender)
            .ok_or_else(|| LedgerError::AccountNotFound {
                name: sender.to_string(),
            })?
            .balance;

        Ok(new_balance)
    }

    /// Create the account if absent, otherwise overwrite its balance
    ///
    /// The PIN is only stored on creation; an update keeps the existing PIN
    /// and does not verify the supplied one. Returns whether an account was
    /// created along with the resulting balance.
    pub async fn upsert(&self, name: &str, pin: &str, balance: Decimal) -> Result<(bool, Decimal)> {
        self.upsert_inner(name, pin, balance, false).await
    }

    /// Like [`upsert`](Self::upsert), but an update requires the supplied
    /// PIN to match the stored one
    pub async fn upsert_authorized(
        &self,
        name: &str,
        pin: &str,
        balance: Decimal,
    ) -> Result<(bool, Decimal)> {
        self.upsert_inner(name, pin, balance, true).await
    }

    async fn upsert_inner(
        &self,
        name: &str,
        pin: &str,
        balance: Decimal,
        verify_pin: bool,
    ) -> Result<(bool, Decimal)> {
        if balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                message: format!("balance must not be negative, got {balance}"),
            });
        }

        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(name) {
            Some(account) => {
                if verify_pin && account.pin != pin {
                    return Err(LedgerError::AuthorizationFailed);
                }
                account.balance = balance;
                Ok((false, balance))
            }
            None => {
                accounts.insert(
                    name.to_string(),
                    Account {
                        name: name.to_string(),
                        pin: pin.to_string(),
                        balance,
                    },
                );
                Ok((true, balance))
            }
        }
    }

    /// Permanently remove an account after PIN verification
    pub async fn delete(&self, name: &str, pin: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get(name)
            .ok_or_else(|| LedgerError::AccountNotFound {
                name: name.to_string(),
            })?;

        if account.pin != pin {
            return Err(LedgerError::AuthorizationFailed);
        }

        accounts.remove(name);
        Ok(())
    }

    /// Get an account's balance without authentication, if it exists
    pub async fn balance(&self, name: &str) -> Option<Decimal> {
        let accounts = self.accounts.read().await;
        accounts.get(name).map(|a| a.balance)
    }

    /// Whether an account with this name exists
    pub async fn exists(&self, name: &str) -> bool {
        self.accounts.read().await.contains_key(name)
    }

    /// All account names
    pub async fn account_names(&self) -> Vec<String> {
        self.accounts.read().await.keys().cloned().collect()
    }

    /// Number of accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seeded_ledger() -> Ledger {
        let ledger = Ledger::new();
        ledger.upsert("alice", "1111", dec!(100)).await.unwrap();
        ledger.upsert("bob", "2222", dec!(50)).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_authenticate_success_and_failure() {
        let ledger = seeded_ledger().await;

        assert_eq!(ledger.authenticate("alice", "1111").await.unwrap(), dec!(100));

        // Wrong pin and unknown name must be indistinguishable
        assert_eq!(
            ledger.authenticate("alice", "9999").await,
            Err(LedgerError::AuthenticationFailed)
        );
        assert_eq!(
            ledger.authenticate("mallory", "1111").await,
            Err(LedgerError::AuthenticationFailed)
        );
    }

    #[tokio::test]
    async fn test_authenticate_does_not_mutate() {
        let ledger = seeded_ledger().await;
        ledger.authenticate("alice", "1111").await.unwrap();
        ledger.authenticate("alice", "bad").await.unwrap_err();
        assert_eq!(ledger.balance("alice").await, Some(dec!(100)));
        assert_eq!(ledger.len().await, 2);
    }

    #[tokio::test]
    async fn test_transfer_moves_and_conserves_funds() {
        let ledger = seeded_ledger().await;

        let sender_balance = ledger.transfer("alice", "bob", dec!(30), None).await.unwrap();

        assert_eq!(sender_balance, dec!(70));
        assert_eq!(ledger.balance("alice").await, Some(dec!(70)));
        assert_eq!(ledger.balance("bob").await, Some(dec!(80)));
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_leaves_state_untouched() {
        let ledger = seeded_ledger().await;
        ledger.transfer("alice", "bob", dec!(30), None).await.unwrap();

        let err = ledger
            .transfer("alice", "bob", dec!(1000), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                available: dec!(70),
                requested: dec!(1000),
            }
        );

        assert_eq!(ledger.balance("alice").await, Some(dec!(70)));
        assert_eq!(ledger.balance("bob").await, Some(dec!(80)));
    }

    #[tokio::test]
    async fn test_transfer_unknown_sender_and_recipient() {
        let ledger = seeded_ledger().await;

        assert_eq!(
            ledger.transfer("charlie", "bob", dec!(10), None).await,
            Err(LedgerError::AccountNotFound {
                name: "charlie".to_string()
            })
        );
        assert_eq!(
            ledger.transfer("alice", "charlie", dec!(10), None).await,
            Err(LedgerError::AccountNotFound {
                name: "charlie".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_transfer_rejects_non_positive_amounts() {
        let ledger = seeded_ledger().await;

        for amount in [dec!(0), dec!(-5)] {
            assert!(matches!(
                ledger.transfer("alice", "bob", amount, None).await,
                Err(LedgerError::InvalidAmount { .. })
            ));
        }
        assert_eq!(ledger.balance("alice").await, Some(dec!(100)));
    }

    #[tokio::test]
    async fn test_self_transfer_is_a_net_no_op() {
        let ledger = seeded_ledger().await;

        let reported = ledger.transfer("alice", "alice", dec!(30), None).await.unwrap();

        // The debit and credit cancel out, and the returned balance
        // must reflect that.
        assert_eq!(reported, dec!(100));
        assert_eq!(ledger.balance("alice").await, Some(dec!(100)));
        assert_eq!(ledger.balance("bob").await, Some(dec!(50)));
    }

    #[tokio::test]
    async fn test_authenticate_empty_name_fails_generically() {
        let ledger = seeded_ledger().await;

        assert_eq!(
            ledger.authenticate("", "1111").await,
            Err(LedgerError::AuthenticationFailed)
        );
    }

    #[tokio::test]
    async fn test_transfer_exact_balance_allowed() {
        let ledger = seeded_ledger().await;
        ledger.transfer("alice", "bob", dec!(100), None).await.unwrap();
        assert_eq!(ledger.balance("alice").await, Some(dec!(0)));
        assert_eq!(ledger.balance("bob").await, Some(dec!(150)));
    }

    #[tokio::test]
    async fn test_transfer_auth_policy() {
        let ledger = Ledger::with_config(LedgerConfig {
            require_auth_for_transfer: true,
        });
        ledger.upsert("alice", "1111", dec!(100)).await.unwrap();
        ledger.upsert("bob", "2222", dec!(50)).await.unwrap();

        assert_eq!(
            ledger.transfer("alice", "bob", dec!(10), None).await,
            Err(LedgerError::AuthorizationFailed)
        );
        assert_eq!(
            ledger.transfer("alice", "bob", dec!(10), Some("0000")).await,
            Err(LedgerError::AuthorizationFailed)
        );
        assert_eq!(
            ledger
                .transfer("alice", "bob", dec!(10), Some("1111"))
                .await
                .unwrap(),
            dec!(90)
        );
    }

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites_balance() {
        let ledger = Ledger::new();

        let (created, balance) = ledger.upsert("dave", "2222", dec!(0)).await.unwrap();
        assert!(created);
        assert_eq!(balance, dec!(0));

        // Update ignores the supplied pin and keeps the stored one
        let (created, balance) = ledger.upsert("dave", "ignored", dec!(500)).await.unwrap();
        assert!(!created);
        assert_eq!(balance, dec!(500));
        assert_eq!(ledger.authenticate("dave", "2222").await.unwrap(), dec!(500));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_balance() {
        let ledger = Ledger::new();
        ledger.upsert("dave", "2222", dec!(42)).await.unwrap();
        let (_, first) = ledger.upsert("dave", "2222", dec!(42)).await.unwrap();
        let (_, second) = ledger.upsert("dave", "2222", dec!(42)).await.unwrap();
        assert_eq!(first, dec!(42));
        assert_eq!(second, dec!(42));
    }

    #[tokio::test]
    async fn test_upsert_rejects_negative_balance() {
        let ledger = Ledger::new();
        assert!(matches!(
            ledger.upsert("dave", "2222", dec!(-1)).await,
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(!ledger.exists("dave").await);
    }

    #[tokio::test]
    async fn test_upsert_authorized_checks_pin_on_update_only() {
        let ledger = Ledger::new();

        // Creation needs no existing pin to match
        let (created, _) = ledger
            .upsert_authorized("erin", "3333", dec!(10))
            .await
            .unwrap();
        assert!(created);

        assert_eq!(
            ledger.upsert_authorized("erin", "wrong", dec!(99)).await,
            Err(LedgerError::AuthorizationFailed)
        );
        assert_eq!(ledger.balance("erin").await, Some(dec!(10)));

        let (created, balance) = ledger
            .upsert_authorized("erin", "3333", dec!(99))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(balance, dec!(99));
    }

    #[tokio::test]
    async fn test_delete_requires_correct_pin_and_is_not_idempotent() {
        let ledger = seeded_ledger().await;

        assert_eq!(
            ledger.delete("alice", "9999").await,
            Err(LedgerError::AuthorizationFailed)
        );
        assert!(ledger.exists("alice").await);

        ledger.delete("alice", "1111").await.unwrap();
        assert!(!ledger.exists("alice").await);
        assert_eq!(
            ledger.authenticate("alice", "1111").await,
            Err(LedgerError::AuthenticationFailed)
        );

        // Second delete sees an absent account
        assert_eq!(
            ledger.delete("alice", "1111").await,
            Err(LedgerError::AccountNotFound {
                name: "alice".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_transfers_both_apply() {
        let ledger = Ledger::new();
        for (name, balance) in [("a", 100), ("b", 100), ("c", 100), ("d", 100)] {
            ledger
                .upsert(name, "0000", Decimal::from(balance))
                .await
                .unwrap();
        }

        let l1 = ledger.clone();
        let l2 = ledger.clone();
        let t1 = tokio::spawn(async move { l1.transfer("a", "b", dec!(40), None).await });
        let t2 = tokio::spawn(async move { l2.transfer("c", "d", dec!(25), None).await });
        t1.await.unwrap().unwrap();
        t2.await.unwrap().unwrap();

        assert_eq!(ledger.balance("a").await, Some(dec!(60)));
        assert_eq!(ledger.balance("b").await, Some(dec!(140)));
        assert_eq!(ledger.balance("c").await, Some(dec!(75)));
        assert_eq!(ledger.balance("d").await, Some(dec!(125)));
    }

    #[tokio::test]
    async fn test_concurrent_conflicting_transfers_never_overdraw() {
        let ledger = Ledger::new();
        ledger.upsert("hot", "0000", dec!(100)).await.unwrap();
        ledger.upsert("sink", "0000", dec!(0)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let l = ledger.clone();
            handles.push(tokio::spawn(async move {
                l.transfer("hot", "sink", dec!(30), None).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        // 100 only covers three transfers of 30
        assert_eq!(succeeded, 3);
        let hot = ledger.balance("hot").await.unwrap();
        let sink = ledger.balance("sink").await.unwrap();
        assert_eq!(hot, dec!(10));
        assert_eq!(sink, dec!(90));
        assert!(hot >= Decimal::ZERO);
        assert_eq!(hot + sink, dec!(100));
    }
}
