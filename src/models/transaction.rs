//! Transactions: the asynchronous jobs OnApp runs after mutating calls.
//!
//! Besides the usual `Get` and `List` implementations this module has the
//! lookup helpers used to follow a job after a create, edit, delete or
//! power action:
//!
//! * [`Transaction::last`] finds the most recent matching transaction.
//! * [`Transaction::get_by_filter`] scans pages for a matching transaction.
//! * [`Transaction::list_by_group`] collects a transaction and everything
//!   queued behind it through `dependent_transaction_id`.
//! * [`Transaction::wait`] polls until a transaction finishes.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::client::OnAppClient;
use crate::envelope::item_path;
use crate::error::{OnAppError, Result};
use crate::pagination::{ListOptions, Page};
use crate::traits::{Get, List, Resource, DEFAULT_PAGE_SIZE, MAX_PAGES};

const PATH: &str = "transactions";

/// State of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Cancelled,
    /// Any state this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the transaction will not change state again.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued, running or finished job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,

    /// e.g. "provision_virtual_server", "destroy_disk".
    pub action: String,

    #[serde(default)]
    pub status: TransactionStatus,

    /// Object the transaction runs for.
    #[serde(default)]
    pub parent_id: Option<u64>,

    /// e.g. "VirtualMachine", "Disk".
    #[serde(default)]
    pub parent_type: Option<String>,

    /// Secondary object the transaction touches.
    #[serde(default)]
    pub associated_id: Option<u64>,

    #[serde(default)]
    pub associated_type: Option<String>,

    /// The transaction this one waits for.
    #[serde(default)]
    pub dependent_transaction_id: Option<u64>,

    #[serde(default)]
    pub chain_id: Option<u64>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub pid: Option<u64>,

    /// Whether user intervention is required to continue.
    #[serde(default)]
    pub allowed_cancel: bool,

    #[serde(default)]
    pub log_output: Option<String>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which transaction listing to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionScope {
    /// Every transaction in the cloud.
    #[default]
    All,
    /// Transactions of one virtual machine.
    VirtualMachine(u64),
}

impl TransactionScope {
    fn path(&self) -> String {
        match self {
            Self::All => format!("{PATH}.json"),
            Self::VirtualMachine(id) => format!("virtual_machines/{id}/{PATH}.json"),
        }
    }
}

/// Criteria a transaction must meet. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub action: Option<String>,
    pub parent_id: Option<u64>,
    pub parent_type: Option<String>,
    pub associated_id: Option<u64>,
    pub associated_type: Option<String>,
    pub status: Option<TransactionStatus>,
    pub dependent_transaction_id: Option<u64>,
    /// Only transactions with an id strictly greater than this.
    pub newer_than: Option<u64>,
}

impl TransactionFilter {
    /// Filter on the action name only.
    pub fn for_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Default::default()
        }
    }

    /// Restrict to transactions run for the given object.
    #[must_use]
    pub fn parent(mut self, parent_type: impl Into<String>, parent_id: u64) -> Self {
        self.parent_type = Some(parent_type.into());
        self.parent_id = Some(parent_id);
        self
    }

    /// Restrict to transactions in the given state.
    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to transactions queued after the one with id `id`.
    #[must_use]
    pub fn newer_than(mut self, id: u64) -> Self {
        self.newer_than = Some(id);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        fn field<T: PartialEq + ?Sized>(want: Option<&T>, have: Option<&T>) -> bool {
            want.map_or(true, |w| have == Some(w))
        }

        field(self.action.as_deref(), Some(tx.action.as_str()))
            && field(self.parent_id.as_ref(), tx.parent_id.as_ref())
            && field(self.parent_type.as_deref(), tx.parent_type.as_deref())
            && field(self.associated_id.as_ref(), tx.associated_id.as_ref())
            && field(self.associated_type.as_deref(), tx.associated_type.as_deref())
            && field(self.status.as_ref(), Some(&tx.status))
            && field(
                self.dependent_transaction_id.as_ref(),
                tx.dependent_transaction_id.as_ref(),
            )
            && self.newer_than.map_or(true, |after| tx.id > after)
    }
}

impl fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = &self.action {
            parts.push(format!("action={v}"));
        }
        if let Some(v) = self.parent_id {
            parts.push(format!("parent_id={v}"));
        }
        if let Some(v) = &self.parent_type {
            parts.push(format!("parent_type={v}"));
        }
        if let Some(v) = self.associated_id {
            parts.push(format!("associated_id={v}"));
        }
        if let Some(v) = &self.associated_type {
            parts.push(format!("associated_type={v}"));
        }
        if let Some(v) = self.status {
            parts.push(format!("status={v}"));
        }
        if let Some(v) = self.dependent_transaction_id {
            parts.push(format!("dependent_transaction_id={v}"));
        }
        if let Some(v) = self.newer_than {
            parts.push(format!("newer_than={v}"));
        }
        if parts.is_empty() {
            f.write_str("any")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// How often and how long [`Transaction::wait`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl Transaction {
    /// The matching transaction with the greatest id on the most recent page.
    ///
    /// OnApp lists newest first, so the first page is all that is read.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing on that page matches.
    #[tracing::instrument(skip(client))]
    pub async fn last(
        client: &OnAppClient,
        scope: &TransactionScope,
        filter: &TransactionFilter,
    ) -> Result<Transaction> {
        let page = Self::list_page(client, scope, 1, DEFAULT_PAGE_SIZE).await?;
        page.into_iter()
            .filter(|tx| filter.matches(tx))
            .max_by_key(|tx| tx.id)
            .ok_or_else(|| not_found(filter))
    }

    /// First matching transaction, scanning pages from `options.page`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the pages run out without a match.
    #[tracing::instrument(skip(client))]
    pub async fn get_by_filter(
        client: &OnAppClient,
        scope: &TransactionScope,
        filter: &TransactionFilter,
        options: ListOptions,
    ) -> Result<Transaction> {
        let per_page = options.per_page.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut page = options.page_or_first();
        let mut previous_first: Option<u64> = None;

        for _ in 0..MAX_PAGES {
            let result = Self::list_page(client, scope, page, per_page).await?;
            let first = result.items.first().map(|tx| tx.id);
            if first.is_some() && first == previous_first {
                tracing::debug!(page, "Endpoint ignores pagination, stopping");
                break;
            }
            previous_first = first;

            let has_more = result.has_more;
            if let Some(tx) = result.into_iter().find(|tx| filter.matches(tx)) {
                return Ok(tx);
            }
            if !has_more {
                break;
            }
            page += 1;
        }

        Err(not_found(filter))
    }

    /// The transaction `root_id` plus everything depending on it.
    ///
    /// # Errors
    ///
    /// `NotFound` when `root_id` is not in the listing.
    #[tracing::instrument(skip(client))]
    pub async fn list_by_group(
        client: &OnAppClient,
        scope: &TransactionScope,
        root_id: u64,
    ) -> Result<Vec<Transaction>> {
        let all = Self::list_all(client, scope).await?;
        group_chain(all, root_id).ok_or_else(|| OnAppError::NotFound {
            entity_type: "Transaction",
            id: root_id.to_string(),
        })
    }

    /// Poll a transaction until it finishes.
    ///
    /// The last sleep is cut short so one final poll lands on the deadline.
    /// A timeout too large to represent means no deadline.
    ///
    /// # Errors
    ///
    /// `TransactionFailed` when it ends failed or cancelled, `Timeout` when
    /// it is still unfinished after `poll.timeout`.
    #[tracing::instrument(skip(client))]
    pub async fn wait(client: &OnAppClient, id: u64, poll: PollOptions) -> Result<Transaction> {
        let deadline = Instant::now().checked_add(poll.timeout);

        loop {
            let tx = Self::get(client, id).await?;
            match tx.status {
                TransactionStatus::Complete => return Ok(tx),
                TransactionStatus::Failed | TransactionStatus::Cancelled => {
                    return Err(OnAppError::TransactionFailed {
                        id: tx.id,
                        action: tx.action,
                        status: tx.status.to_string(),
                    });
                }
                status => {
                    tracing::debug!(id, %status, "Transaction not finished");
                }
            }

            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        tracing::warn!(id, timeout = ?poll.timeout, "Gave up waiting for transaction");
                        return Err(OnAppError::Timeout(poll.timeout));
                    }
                    poll.interval.min(remaining)
                }
                None => poll.interval,
            };
            tokio::time::sleep(pause).await;
        }
    }
}

fn not_found(filter: &TransactionFilter) -> OnAppError {
    OnAppError::NotFound {
        entity_type: "Transaction",
        id: filter.to_string(),
    }
}

/// Order `root_id` and its transitive dependents breadth-first.
///
/// Dependents of the same transaction come in id order. Ids already placed
/// are skipped, so a cycle in `dependent_transaction_id` terminates.
pub fn group_chain(all: Vec<Transaction>, root_id: u64) -> Option<Vec<Transaction>> {
    let mut pending: Vec<Transaction> = Vec::with_capacity(all.len());
    let mut root = None;
    for tx in all {
        if tx.id == root_id && root.is_none() {
            root = Some(tx);
        } else {
            pending.push(tx);
        }
    }

    let mut chain = vec![root?];
    let mut seen: HashSet<u64> = HashSet::from([root_id]);
    let mut cursor = 0;

    while cursor < chain.len() {
        let parent = chain[cursor].id;
        let (mut children, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|tx| tx.dependent_transaction_id == Some(parent) && !seen.contains(&tx.id));
        pending = rest;
        children.sort_by_key(|tx| tx.id);
        for child in children {
            if seen.insert(child.id) {
                chain.push(child);
            }
        }
        cursor += 1;
    }

    Some(chain)
}

impl Resource for Transaction {
    const KEY: &'static str = "transaction";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Transaction {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Transaction {
    type Query = TransactionScope;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        scope: &TransactionScope,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&scope.path(), Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: u64, action: &str, depends_on: Option<u64>) -> Transaction {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "action": action,
            "status": "pending",
            "parent_id": 101,
            "parent_type": "VirtualMachine",
            "dependent_transaction_id": depends_on
        }))
        .unwrap()
    }

    #[test]
    fn test_transaction_deserialize() {
        let json = serde_json::json!({
            "transaction": {
                "id": 9001,
                "action": "provision_virtual_server",
                "status": "running",
                "parent_id": 101,
                "parent_type": "VirtualMachine",
                "associated_id": 7,
                "associated_type": "Disk",
                "dependent_transaction_id": null,
                "chain_id": 44,
                "identifier": "k29dmf0s",
                "priority": 10,
                "pid": 2712,
                "allowed_cancel": false,
                "log_output": "Running: Provision",
                "started_at": "2024-04-02T10:15:00.000Z",
                "created_at": "2024-04-02T10:14:58.000Z"
            }
        });
        let tx: Transaction = crate::envelope::unwrap_one(Transaction::KEY, json).unwrap();
        assert_eq!(tx.id, 9001);
        assert_eq!(tx.status, TransactionStatus::Running);
        assert!(!tx.status.is_finished());
        assert_eq!(tx.associated_type.as_deref(), Some("Disk"));
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": 1, "action": "x", "status": "delayed"
        }))
        .unwrap();
        assert_eq!(tx.status, TransactionStatus::Unknown);
    }

    #[test]
    fn test_scope_paths() {
        assert_eq!(TransactionScope::All.path(), "transactions.json");
        assert_eq!(
            TransactionScope::VirtualMachine(5).path(),
            "virtual_machines/5/transactions.json"
        );
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TransactionFilter::default();
        assert!(filter.matches(&tx(1, "startup_virtual_server", None)));
        assert_eq!(filter.to_string(), "any");
    }

    #[test]
    fn test_filter_is_conjunction() {
        let filter = TransactionFilter::for_action("startup_virtual_server")
            .parent("VirtualMachine", 101);
        assert!(filter.matches(&tx(1, "startup_virtual_server", None)));
        assert!(!filter.matches(&tx(2, "stop_virtual_server", None)));

        let other_parent = TransactionFilter::for_action("startup_virtual_server")
            .parent("VirtualMachine", 102);
        assert!(!other_parent.matches(&tx(1, "startup_virtual_server", None)));

        let running = TransactionFilter::default().status(TransactionStatus::Running);
        assert!(!running.matches(&tx(1, "startup_virtual_server", None)));
    }

    #[test]
    fn test_filter_on_unset_field_does_not_match() {
        let filter = TransactionFilter {
            associated_id: Some(7),
            ..Default::default()
        };
        assert!(!filter.matches(&tx(1, "a", None)));
    }

    #[test]
    fn test_filter_newer_than_excludes_earlier_ids() {
        let filter = TransactionFilter::for_action("reboot_virtual_server").newer_than(40);
        assert!(!filter.matches(&tx(40, "reboot_virtual_server", None)));
        assert!(!filter.matches(&tx(12, "reboot_virtual_server", None)));
        assert!(filter.matches(&tx(41, "reboot_virtual_server", None)));
        assert_eq!(filter.to_string(), "action=reboot_virtual_server, newer_than=40");
    }

    #[test]
    fn test_filter_display() {
        let filter = TransactionFilter::for_action("destroy_disk").status(TransactionStatus::Failed);
        assert_eq!(filter.to_string(), "action=destroy_disk, status=failed");
    }

    #[test]
    fn test_group_chain_dependency_order() {
        let all = vec![
            tx(10, "provision", None),
            tx(14, "startup", Some(12)),
            tx(12, "build_disk", Some(10)),
            tx(11, "configure", Some(10)),
            tx(20, "unrelated", None),
            tx(13, "resize", Some(11)),
        ];
        let chain = group_chain(all, 10).unwrap();
        let ids: Vec<u64> = chain.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_group_chain_missing_root() {
        assert!(group_chain(vec![tx(1, "a", None)], 2).is_none());
    }

    #[test]
    fn test_group_chain_single() {
        let chain = group_chain(vec![tx(1, "a", None), tx(2, "b", None)], 2).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, 2);
    }

    #[test]
    fn test_group_chain_cycle_terminates() {
        let all = vec![tx(1, "a", Some(2)), tx(2, "b", Some(1))];
        let chain = group_chain(all, 1).unwrap();
        let ids: Vec<u64> = chain.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
