//! Transaction history explorer

use fraudlens_client::{ClientError, ClientResult, HistoryClientRef, TransactionRecord};
use fraudlens_config::Config;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{AssessmentError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::inflight::{RequestTicket, RequestTracker};
use crate::models::{HistorySummary, LoadStatus, SortDirection, SortKey};
use crate::query::{filter_records, page_window, sort_records, total_pages};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Banner shown when a load fails
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load transaction history. Please try again.";

/// How a load ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed { error: AssessmentError },
    /// A newer load was started; this response was dropped
    Superseded,
}

/// Search, sort and page state over the fetched record set
pub struct TransactionHistoryViewModel {
    client: HistoryClientRef,
    records: Vec<TransactionRecord>,
    search_term: String,
    sort_key: SortKey,
    sort_direction: SortDirection,
    page: usize,
    page_size: usize,
    status: LoadStatus,
    last_error: Option<AssessmentError>,
    has_loaded: bool,
    load_timeout: Duration,
    requests: RequestTracker,
}

impl TransactionHistoryViewModel {
    pub fn new(client: HistoryClientRef) -> Self {
        Self {
            client,
            records: Vec::new(),
            search_term: String::new(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: LoadStatus::Idle,
            last_error: None,
            has_loaded: false,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            requests: RequestTracker::new(),
        }
    }

    pub fn from_config(client: HistoryClientRef, config: &Config) -> Self {
        Self::new(client)
            .with_page_size(config.pagination.page_size)
            .with_load_timeout(config.timeouts.history())
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    // ==================== Loading ====================

    /// Mark the set as loading and issue a ticket for the fetch
    pub fn begin_load(&mut self) -> RequestTicket {
        let ticket = self.requests.issue();
        self.status = LoadStatus::Loading;
        log::debug!("Loading transaction history (request {})", ticket.generation());
        ticket
    }

    /// Apply the result of the fetch tagged with `ticket`
    ///
    /// Stale results are dropped. A failure keeps the records already held.
    pub fn finish_load(
        &mut self,
        ticket: RequestTicket,
        result: ClientResult<Vec<TransactionRecord>>,
    ) -> LoadOutcome {
        if !self.requests.settle(&ticket) {
            log::debug!("Dropping stale history response (request {})", ticket.generation());
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                let malformed = records.iter().filter(|r| !r.is_well_formed()).count();
                if malformed > 0 {
                    DefaultErrorLogger.log_warning(
                        &format!("History contains {} malformed records", malformed),
                        &ErrorContext::new("load_history").with_request(ticket.generation()),
                    );
                }
                self.records = records;
                self.status = LoadStatus::Success;
                self.last_error = None;
                self.has_loaded = true;
                self.clamp_page();
                log::info!("Loaded {} transactions", count);
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                let error = AssessmentError::classify(&e);
                DefaultErrorLogger.log_failure(
                    &error,
                    &ErrorContext::new("load_history").with_request(ticket.generation()),
                );
                self.status = LoadStatus::Error(LOAD_FAILED_MESSAGE.to_string());
                self.last_error = Some(error.clone());
                LoadOutcome::Failed { error }
            }
        }
    }

    /// Fetch the record set. Retrying is simply calling this again.
    pub async fn load(&mut self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = fetch_bounded(self.client.clone(), self.load_timeout).await;
        self.finish_load(ticket, result)
    }

    /// Load through a shared handle without holding the lock across the fetch
    ///
    /// The fetch and `finish_load` run as their own task: a later load can
    /// abort it, and a caller that stops waiting does not leave the set
    /// loading.
    pub async fn load_shared(this: &Arc<RwLock<Self>>) -> LoadOutcome {
        let (ticket, client, bound) = {
            let mut vm = this.write().await;
            let ticket = vm.begin_load();
            (ticket, vm.client.clone(), vm.load_timeout)
        };

        let task = tokio::spawn({
            let shared = Arc::clone(this);
            async move {
                let result = fetch_bounded(client, bound).await;
                shared.write().await.finish_load(ticket, result)
            }
        });
        this.write().await.requests.attach(&ticket, task.abort_handle());

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                log::debug!("History request {} was aborted", ticket.generation());
                LoadOutcome::Superseded
            }
            Err(e) => {
                let result = Err(ClientError::Request { message: e.to_string() });
                this.write().await.finish_load(ticket, result)
            }
        }
    }

    /// Clear the failure notice
    pub fn dismiss_error(&mut self) {
        if let LoadStatus::Error(_) = self.status {
            self.status = if self.has_loaded {
                LoadStatus::Success
            } else {
                LoadStatus::Idle
            };
        }
        self.last_error = None;
    }

    // ==================== View controls ====================

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    /// Same key toggles the direction; a new key sorts ascending
    pub fn set_sort(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Move to page `n`, clamped into range. No-op when there are no pages.
    pub fn set_page(&mut self, n: usize) {
        let pages = self.total_pages();
        if pages == 0 {
            return;
        }
        self.page = n.clamp(1, pages);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    fn clamp_page(&mut self) {
        let pages = self.total_pages();
        self.page = if pages == 0 { 1 } else { self.page.clamp(1, pages) };
    }

    // ==================== Derived views ====================

    pub fn filtered(&self) -> Vec<&TransactionRecord> {
        filter_records(&self.records, &self.search_term)
    }

    pub fn sorted(&self) -> Vec<&TransactionRecord> {
        let mut view = self.filtered();
        sort_records(&mut view, self.sort_key, self.sort_direction);
        view
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), self.page_size)
    }

    pub fn current_page_items(&self) -> Vec<&TransactionRecord> {
        let sorted = self.sorted();
        page_window(&sorted, self.page, self.page_size).to_vec()
    }

    /// Counts over the filtered set
    pub fn summary(&self) -> HistorySummary {
        let filtered = self.filtered();
        let fraud_count = filtered.iter().filter(|r| r.is_fraud).count();
        HistorySummary {
            total_count: filtered.len(),
            fraud_count,
            legit_count: filtered.len() - fraud_count,
        }
    }

    // ==================== Accessors ====================

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn last_error(&self) -> Option<&AssessmentError> {
        self.last_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

async fn fetch_bounded(client: HistoryClientRef, bound: Duration) -> ClientResult<Vec<TransactionRecord>> {
    match tokio::time::timeout(bound, client.fetch_history()).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fraudlens_client::HistoryClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn record(amount: f64, sender: &str, is_fraud: bool) -> TransactionRecord {
        TransactionRecord {
            amount,
            sender: sender.to_string(),
            receiver: "shop@upi".to_string(),
            timestamp: format!("2024-06-{:02}T10:00:00Z", (amount as u32 % 28) + 1),
            is_fraud,
            description: None,
            category: None,
        }
    }

    fn records(n: usize) -> Vec<TransactionRecord> {
        (0..n)
            .map(|i| record(100.0 + i as f64, &format!("user{}@bank", i), i % 3 == 0))
            .collect()
    }

    /// Serves queued responses in order
    struct ScriptedHistory {
        responses: Mutex<Vec<ClientResult<Vec<TransactionRecord>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedHistory {
        fn new(mut responses: Vec<ClientResult<Vec<TransactionRecord>>>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HistoryClient for ScriptedHistory {
        async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Never answers
    struct HangingHistory;

    #[async_trait]
    impl HistoryClient for HangingHistory {
        async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>> {
            std::future::pending().await
        }
    }

    /// First call blocks until released, later calls answer at once
    struct GatedHistory {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HistoryClient for GatedHistory {
        async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.gate.notified().await;
                Ok(records(1))
            } else {
                Ok(records(3))
            }
        }
    }

    #[tokio::test]
    async fn test_load_success() {
        let client = ScriptedHistory::new(vec![Ok(records(25))]);
        let mut vm = TransactionHistoryViewModel::new(client.clone());
        assert_eq!(vm.status(), &LoadStatus::Idle);

        let outcome = vm.load().await;
        assert_eq!(outcome, LoadOutcome::Loaded { count: 25 });
        assert_eq!(vm.status(), &LoadStatus::Success);
        assert_eq!(vm.total_pages(), 3);
        assert_eq!(vm.current_page_items().len(), 10);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_records_and_retry_recovers() {
        let client = ScriptedHistory::new(vec![
            Ok(records(5)),
            Err(ClientError::Server { status: 500, message: None }),
            Ok(records(7)),
        ]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;

        let outcome = vm.load().await;
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        assert_eq!(vm.status(), &LoadStatus::Error(LOAD_FAILED_MESSAGE.to_string()));
        assert_eq!(vm.records().len(), 5);
        assert!(vm.last_error().unwrap().is_retryable());

        vm.load().await;
        assert_eq!(vm.status(), &LoadStatus::Success);
        assert_eq!(vm.records().len(), 7);
        assert!(vm.last_error().is_none());
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let client = ScriptedHistory::new(vec![Err(ClientError::Unreachable {
            message: "refused".to_string(),
        })]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        vm.dismiss_error();
        assert_eq!(vm.status(), &LoadStatus::Idle);
        assert!(vm.last_error().is_none());

        let client = ScriptedHistory::new(vec![
            Ok(records(2)),
            Err(ClientError::Timeout),
        ]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        vm.load().await;
        vm.dismiss_error();
        assert_eq!(vm.status(), &LoadStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out() {
        let mut vm = TransactionHistoryViewModel::new(Arc::new(HangingHistory))
            .with_load_timeout(Duration::from_secs(15));
        let outcome = vm.load().await;
        assert_eq!(
            outcome,
            LoadOutcome::Failed { error: AssessmentError::NetworkTimeout }
        );
        assert!(vm.records().is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let client = ScriptedHistory::new(vec![]);
        let mut vm = TransactionHistoryViewModel::new(client);
        let old = vm.begin_load();
        let new = vm.begin_load();

        assert_eq!(vm.finish_load(old, Ok(records(4))), LoadOutcome::Superseded);
        assert!(vm.records().is_empty());
        assert!(vm.is_loading());

        assert_eq!(vm.finish_load(new, Ok(records(2))), LoadOutcome::Loaded { count: 2 });
        assert_eq!(vm.records().len(), 2);
    }

    #[tokio::test]
    async fn test_shared_load_supersedes_in_flight() {
        let client = Arc::new(GatedHistory {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let vm = Arc::new(RwLock::new(TransactionHistoryViewModel::new(client.clone())));

        let first = tokio::spawn({
            let vm = vm.clone();
            async move { TransactionHistoryViewModel::load_shared(&vm).await }
        });
        while client.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = TransactionHistoryViewModel::load_shared(&vm).await;
        assert_eq!(second, LoadOutcome::Loaded { count: 3 });
        client.gate.notify_one();

        assert_eq!(first.await.unwrap(), LoadOutcome::Superseded);
        assert_eq!(vm.read().await.records().len(), 3);
    }

    #[tokio::test]
    async fn test_load_lands_after_caller_is_dropped() {
        let client = Arc::new(GatedHistory {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let vm = Arc::new(RwLock::new(TransactionHistoryViewModel::new(client.clone())));

        let caller = tokio::spawn({
            let vm = vm.clone();
            async move { TransactionHistoryViewModel::load_shared(&vm).await }
        });
        while client.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());
        assert!(vm.read().await.is_loading());

        client.gate.notify_one();
        while vm.read().await.is_loading() {
            tokio::task::yield_now().await;
        }

        let vm = vm.read().await;
        assert_eq!(vm.status(), &LoadStatus::Success);
        assert_eq!(vm.records().len(), 1);
    }

    #[tokio::test]
    async fn test_search_resets_page_and_filters() {
        let client = ScriptedHistory::new(vec![Ok(records(25))]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        vm.set_page(3);
        assert_eq!(vm.page(), 3);

        vm.set_search_term("USER1");
        assert_eq!(vm.page(), 1);
        // user1, user10..user19
        assert_eq!(vm.filtered().len(), 11);
        vm.set_search_term("");
        assert_eq!(vm.filtered().len(), 25);
    }

    #[tokio::test]
    async fn test_set_page_clamps() {
        let client = ScriptedHistory::new(vec![Ok(records(25))]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.set_page(4);
        assert_eq!(vm.page(), 1, "no pages before load");

        vm.load().await;
        vm.set_page(99);
        assert_eq!(vm.page(), 3);
        vm.set_page(0);
        assert_eq!(vm.page(), 1);
        vm.previous_page();
        assert_eq!(vm.page(), 1);
        vm.next_page();
        assert_eq!(vm.page(), 2);
        assert_eq!(vm.current_page_items().len(), 10);
        vm.set_page(3);
        assert_eq!(vm.current_page_items().len(), 5);
    }

    #[tokio::test]
    async fn test_sort_toggles_and_switches() {
        let client = ScriptedHistory::new(vec![Ok(records(12))]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        assert_eq!(vm.sort_key(), SortKey::Timestamp);
        assert_eq!(vm.sort_direction(), SortDirection::Descending);

        vm.set_sort(SortKey::Amount);
        assert_eq!(vm.sort_direction(), SortDirection::Ascending);
        assert_eq!(vm.sorted()[0].amount, 100.0);

        vm.set_sort(SortKey::Amount);
        assert_eq!(vm.sort_direction(), SortDirection::Descending);
        assert_eq!(vm.sorted()[0].amount, 111.0);
    }

    #[tokio::test]
    async fn test_summary_over_filtered() {
        let client = ScriptedHistory::new(vec![Ok(records(9))]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        let summary = vm.summary();
        assert_eq!(summary.total_count, 9);
        assert_eq!(summary.fraud_count, 3);
        assert_eq!(summary.legit_count, 6);

        vm.set_search_term("user3");
        let summary = vm.summary();
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.fraud_count, 1);
    }

    #[tokio::test]
    async fn test_page_clamped_after_smaller_reload() {
        let client = ScriptedHistory::new(vec![Ok(records(25)), Ok(records(4))]);
        let mut vm = TransactionHistoryViewModel::new(client);
        vm.load().await;
        vm.set_page(3);
        vm.load().await;
        assert_eq!(vm.page(), 1);
    }
}
