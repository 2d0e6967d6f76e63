//! Customer context lookup

use async_trait::async_trait;
use riskdesk_core::{CustomerContext, CustomerId, Error, Money, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of per-request account facts.
///
/// Looked up once per request; results are never cached by the orchestrator.
#[async_trait]
pub trait CustomerContextProvider: Send + Sync {
    /// Fetch the context for `customer_id`, with the balance computed
    /// including or excluding pending transactions
    async fn lookup(&self, customer_id: CustomerId, include_pending: bool) -> Result<CustomerContext>;

    fn name(&self) -> &str {
        "customer-context"
    }
}

/// Account balances in integer cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub cleared_cents: i64,

    #[serde(default)]
    pub pending_cents: i64,
}

impl Account {
    pub fn new(cleared_cents: i64, pending_cents: i64) -> Self {
        Self {
            cleared_cents,
            pending_cents,
        }
    }

    pub fn context(&self, customer_id: CustomerId, include_pending: bool) -> CustomerContext {
        let cleared = Money::from_cents(self.cleared_cents);
        let balance = if include_pending {
            cleared + Money::from_cents(self.pending_cents)
        } else {
            cleared
        };

        CustomerContext {
            customer_id,
            balance,
            includes_pending: include_pending,
            has_pending: self.pending_cents != 0,
        }
    }
}

/// Fixed set of accounts held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    accounts: HashMap<CustomerId, Account>,
    fallback: Option<Account>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that answers every id with $100.00 cleared and $23.45 pending
    pub fn demo() -> Self {
        Self::new().with_fallback(Account::new(10_000, 2_345))
    }

    pub fn with_account(mut self, customer_id: CustomerId, account: Account) -> Self {
        self.accounts.insert(customer_id, account);
        self
    }

    /// Account served for ids with no explicit entry
    pub fn with_fallback(mut self, account: Account) -> Self {
        self.fallback = Some(account);
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CustomerContextProvider for InMemoryDirectory {
    async fn lookup(&self, customer_id: CustomerId, include_pending: bool) -> Result<CustomerContext> {
        self.accounts
            .get(&customer_id)
            .or(self.fallback.as_ref())
            .map(|account| account.context(customer_id, include_pending))
            .ok_or_else(|| Error::context(format!("unknown customer {}", customer_id)))
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_directory_balances() {
        let directory = InMemoryDirectory::demo();

        let with_pending = directory.lookup(CustomerId(123), true).await.unwrap();
        assert_eq!(with_pending.balance, Money::from_cents(12_345));
        assert!(with_pending.includes_pending);
        assert!(with_pending.has_pending);

        let cleared = directory.lookup(CustomerId(999), false).await.unwrap();
        assert_eq!(cleared.balance.to_string(), "$100.00");
        assert_eq!(cleared.customer_id, CustomerId(999));
    }

    #[tokio::test]
    async fn test_unknown_customer_without_fallback() {
        let directory = InMemoryDirectory::new().with_account(CustomerId(1), Account::new(500, 0));

        let ctx = directory.lookup(CustomerId(1), true).await.unwrap();
        assert!(!ctx.has_pending);

        let err = directory.lookup(CustomerId(2), true).await.unwrap_err();
        assert!(matches!(err, Error::ContextLookupFailed(_)));
    }
}
