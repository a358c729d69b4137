//! Board session: one open board and everything that belongs to it.
//!
//! The session owns the snapshot store, the user-scoped caches, the freeze
//! gate and the mutation journal. Hosts build one per open board, call
//! [`BoardSession::open`], forward gestures through
//! [`BoardSession::dispatch`] and call [`BoardSession::teardown`] when the
//! board is closed.

use crate::annotation::{compute_border_annotation, QuotationDraft};
use crate::capability::Capabilities;
use crate::clock::{Clock, SystemClock};
use crate::config::BoardSyncConfig;
use crate::coordinator::{fetch_page, UpdateOrder};
use crate::error::{Result, SyncError};
use crate::operation::{Execute, LogEntry};
use crate::ordering::{self, prepare_columns};
use crate::remote::{
    self, method, GetDocArgs, GetDocReply, ListQuery, RemoteGateway, UnreadConversation,
};
use crate::store::SnapshotStore;
use crate::types::{
    parse_timestamp, BoardRecord, BoardState, Card, CardContext, CardId, CardMeta, ColumnTitle,
    FilterContext, PendingMove, RawDocument, StatePatch,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// How large the user wants cards drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl CardSize {
    /// Parse the stored preference; unknown or missing values mean large
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("small") => Self::Small,
            Some("medium") => Self::Medium,
            _ => Self::Large,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// What the host hands over when a board is opened
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitOptions {
    pub doctype: String,
    pub board: BoardRecord,
    #[serde(default)]
    pub card_meta: CardMeta,
    #[serde(default)]
    pub cards: Vec<RawDocument>,
    #[serde(default)]
    pub filter_context: FilterContext,
}

#[derive(Debug, Default)]
struct SessionCaches {
    card_size: CardSize,
    /// Phone numbers with unread conversations
    unread_senders: HashSet<String>,
    quotation_drafts: Vec<QuotationDraft>,
}

/// An open board
pub struct BoardSession {
    store: Arc<SnapshotStore>,
    gateway: Arc<dyn RemoteGateway>,
    capabilities: Arc<dyn Capabilities>,
    clock: Arc<dyn Clock>,
    config: BoardSyncConfig,
    user: Option<String>,
    caches: RwLock<SessionCaches>,
    /// Done columns with a page fetch in flight
    loading: Mutex<HashSet<ColumnTitle>>,
    /// The move holding the freeze, if any
    pending: Mutex<Option<PendingMove>>,
    /// Newest first
    journal: Mutex<VecDeque<LogEntry>>,
}

impl BoardSession {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        capabilities: Arc<dyn Capabilities>,
        config: BoardSyncConfig,
    ) -> Self {
        Self {
            store: Arc::new(SnapshotStore::default()),
            gateway,
            capabilities,
            clock: Arc::new(SystemClock),
            config,
            user: None,
            caches: RwLock::new(SessionCaches::default()),
            loading: Mutex::new(HashSet::new()),
            pending: Mutex::new(None),
            journal: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The user whose preferences are loaded by [`refresh_caches`](Self::refresh_caches)
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Current board state
    pub fn state(&self) -> Arc<BoardState> {
        self.store.read()
    }

    pub fn config(&self) -> &BoardSyncConfig {
        &self.config
    }

    pub(crate) fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn capabilities(&self) -> &dyn Capabilities {
        self.capabilities.as_ref()
    }

    /// Refresh caches, load the board and reconcile the rendered order once.
    pub async fn open(&self, opts: InitOptions) -> Result<()> {
        self.refresh_caches().await;
        self.init(opts)?;
        if let Err(error) = self.dispatch(&UpdateOrder::rendered()).await {
            warn!(%error, "initial order reconciliation failed");
        }
        Ok(())
    }

    /// Load a board into the store.
    ///
    /// Documents that cannot become cards are skipped with a warning.
    pub fn init(&self, opts: InitOptions) -> Result<()> {
        if opts.board.field_name.trim().is_empty() {
            return Err(SyncError::missing_field("field_name"));
        }
        self.store.replace(StatePatch::new().empty_state(true));

        let ctx = card_context(&opts.doctype, &opts.board, &opts.card_meta);
        let cards = self.prepare_cards(&opts.cards, &ctx);
        let columns = prepare_columns(&opts.board.columns, &self.config.default_indicator);
        debug!(
            doctype = %opts.doctype,
            board = %opts.board.name,
            cards = cards.len(),
            columns = columns.len(),
            "board initialized"
        );

        self.store.replace(StatePatch {
            doctype: Some(opts.doctype),
            card_meta: Some(Arc::new(opts.card_meta)),
            filter_context: Some(Arc::new(opts.filter_context)),
            done_statuses: Some(Arc::new(self.config.done_columns())),
            ..StatePatch::new()
                .board(opts.board)
                .cards(cards)
                .columns(columns)
                .empty_state(false)
        });
        Ok(())
    }

    /// Execute an operation and journal its outcome.
    pub async fn dispatch<O>(&self, op: &O) -> Result<Value>
    where
        O: Execute<BoardSession, SyncError> + ?Sized,
    {
        let op_string = op.op_string();
        let (result, log_entry) = op.execute(self).await.split();

        if let Some(entry) = log_entry {
            if entry.rolled_back {
                warn!(op = %op_string, duration_ms = entry.duration_ms, "mutation rolled back");
            } else {
                info!(op = %op_string, duration_ms = entry.duration_ms, "mutation committed");
            }
            self.record(entry);
        }
        if let Err(error) = &result {
            debug!(op = %op_string, %error, "operation did not complete");
        }
        result
    }

    fn record(&self, entry: LogEntry) {
        let mut journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        journal.push_front(entry);
        journal.truncate(self.config.journal_capacity);
    }

    /// Journaled mutations, newest first
    pub fn activity(&self) -> Vec<LogEntry> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub(crate) fn require_initialized(&self) -> Result<Arc<BoardState>> {
        let state = self.state();
        if state.empty_state {
            return Err(SyncError::NotInitialized);
        }
        Ok(state)
    }

    /// Suspend drag interactions until the returned guard drops.
    ///
    /// Fails with [`SyncError::Frozen`] while another move holds the freeze.
    pub(crate) fn freeze(&self, pending: PendingMove) -> Result<FreezeGuard<'_>> {
        {
            let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(current) = slot.as_ref() {
                debug!(card = %current.card(), "move rejected while frozen");
                return Err(SyncError::Frozen);
            }
            debug!(card = %pending.card(), to = %pending.destination(), "freezing board");
            *slot = Some(pending);
        }
        self.store.replace(StatePatch::new().frozen(true));
        Ok(FreezeGuard { session: self })
    }

    fn unfreeze(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.store.replace(StatePatch::new().frozen(false));
    }

    pub fn is_frozen(&self) -> bool {
        self.state().frozen
    }

    /// The move waiting for confirmation
    pub fn pending_move(&self) -> Option<PendingMove> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mark a done column as loading. `None` if a fetch is already in flight.
    pub(crate) fn begin_loading(&self, column: &ColumnTitle) -> Option<LoadingGuard<'_>> {
        let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        if !loading.insert(column.clone()) {
            return None;
        }
        Some(LoadingGuard {
            session: self,
            column: column.clone(),
        })
    }

    pub fn is_loading(&self, column: &ColumnTitle) -> bool {
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(column)
    }

    /// Build a card against the current board
    pub fn prepare_card(&self, raw: &RawDocument) -> Result<Card> {
        let state = self.state();
        let ctx = card_context(&state.doctype, &state.board, &state.card_meta);
        self.prepare_card_with(raw, &ctx)
    }

    fn prepare_card_with(&self, raw: &RawDocument, ctx: &CardContext<'_>) -> Result<Card> {
        let mut card = Card::from_document(raw, ctx)?;
        self.decorate(&mut card);
        Ok(card)
    }

    fn prepare_cards(&self, raws: &[RawDocument], ctx: &CardContext<'_>) -> Vec<Card> {
        raws.iter()
            .filter_map(|raw| match self.prepare_card_with(raw, ctx) {
                Ok(card) => Some(card),
                Err(error) => {
                    warn!(%error, "skipping malformed card document");
                    None
                }
            })
            .collect()
    }

    /// Recompute the cache-derived fields of a card
    fn decorate(&self, card: &mut Card) {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        card.has_unread_conversation = card
            .document
            .customer_phone
            .as_ref()
            .is_some_and(|phone| caches.unread_senders.contains(phone));
        card.annotation = compute_border_annotation(
            card,
            self.clock.now(),
            &self.config.staleness,
            &caches.quotation_drafts,
        );
    }

    /// Merge fetched documents into the loaded cards; fresh versions win.
    pub fn update_cards(&self, raws: &[RawDocument]) -> usize {
        let state = self.state();
        let ctx = card_context(&state.doctype, &state.board, &state.card_meta);
        let incoming = self.prepare_cards(raws, &ctx);
        let count = incoming.len();
        if count == 0 {
            return 0;
        }
        let merged = ordering::merge_cards(incoming, &self.state().cards);
        self.store.replace(StatePatch::new().cards(merged));
        count
    }

    /// Replace a loaded card by identity. Returns false for an unknown card.
    pub fn update_card(&self, card: Card) -> bool {
        match ordering::replace_card(&self.state().cards, card) {
            Some(cards) => {
                self.store.replace(StatePatch::new().cards(cards));
                true
            }
            None => false,
        }
    }

    pub fn find_card(&self, id: &CardId) -> Option<Card> {
        self.state().find_card(id).cloned()
    }

    /// Loaded cards per column, for column headers
    pub fn counts_by_column(&self) -> BTreeMap<ColumnTitle, usize> {
        ordering::count_by_column(&self.state().cards)
    }

    /// Indicator options offered for columns
    pub fn indicators(&self) -> &[String] {
        &self.config.indicators
    }

    pub fn card_size(&self) -> CardSize {
        self.caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .card_size
    }

    pub fn quotation_drafts(&self) -> Vec<QuotationDraft> {
        self.caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .quotation_drafts
            .clone()
    }

    /// Reload the card-size preference, unread conversations and quotation
    /// drafts, then re-derive badges of loaded cards. A failed source keeps
    /// its previous contents.
    pub async fn refresh_caches(&self) {
        let card_size = self.fetch_card_size().await;
        let unread = self.fetch_unread_senders().await;
        let drafts = self.fetch_quotation_drafts().await;

        {
            let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
            match card_size {
                Ok(Some(size)) => caches.card_size = size,
                Ok(None) => {}
                Err(error) => warn!(%error, "could not load card size preference"),
            }
            match unread {
                Ok(senders) => caches.unread_senders = senders,
                Err(error) => warn!(%error, "could not load unread conversations"),
            }
            match drafts {
                Ok(drafts) => caches.quotation_drafts = drafts,
                Err(error) => warn!(%error, "could not load quotation drafts"),
            }
        }

        let state = self.state();
        if state.empty_state || state.cards.is_empty() {
            return;
        }
        let cards = state
            .cards
            .iter()
            .map(|card| {
                let mut card = card.clone();
                self.decorate(&mut card);
                card
            })
            .collect();
        self.store.replace(StatePatch::new().cards(cards));
    }

    async fn fetch_card_size(&self) -> Result<Option<CardSize>> {
        let Some(user) = self.user.as_ref() else {
            return Ok(None);
        };
        let reply: GetDocReply = remote::submit(
            self.gateway(),
            method::GET_DOC,
            &GetDocArgs {
                doctype: "User".to_string(),
                name: user.clone(),
            },
        )
        .await?;
        let size = reply
            .docs
            .first()
            .and_then(|doc| doc.get("size_kanban"))
            .and_then(Value::as_str);
        Ok(Some(CardSize::parse(size)))
    }

    async fn fetch_unread_senders(&self) -> Result<HashSet<String>> {
        let conversations: Vec<UnreadConversation> = remote::submit(
            self.gateway(),
            method::GET_LIST,
            &ListQuery {
                doctype: "Conversation".to_string(),
                filters: json!({"seen": 0}),
                fields: vec!["name".to_string(), "from".to_string()],
            },
        )
        .await?;
        Ok(conversations.into_iter().filter_map(|c| c.from).collect())
    }

    async fn fetch_quotation_drafts(&self) -> Result<Vec<QuotationDraft>> {
        let rows: Vec<RawDocument> = remote::submit(
            self.gateway(),
            method::GET_LIST,
            &ListQuery {
                doctype: "Quotation".to_string(),
                filters: json!({"docstatus": 0}),
                fields: vec![
                    "name".to_string(),
                    "parent".to_string(),
                    "modified".to_string(),
                ],
            },
        )
        .await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(QuotationDraft {
                    name: row.get("name")?.as_str()?.to_string(),
                    parent: row.get("parent")?.as_str()?.to_string(),
                    modified: parse_timestamp(row.get("modified")?.as_str()?)?,
                })
            })
            .collect())
    }

    /// React to an opaque "card changed" push: reload the first page of every
    /// active done column and merge it.
    pub async fn handle_change_notification(&self) -> Result<usize> {
        let state = self.require_initialized()?;
        let done: Vec<ColumnTitle> = ordering::active_columns(&state.columns)
            .filter(|c| state.is_done_column(&c.title))
            .map(|c| c.title.clone())
            .collect();

        let mut docs = Vec::new();
        for column in &done {
            docs.extend(fetch_page(self, &state, column, 0).await?);
        }
        let merged = self.update_cards(&docs);
        debug!(columns = done.len(), cards = merged, "change notification merged");
        Ok(merged)
    }

    /// Close the board: drop subscriptions, state, caches and in-flight flags.
    pub fn teardown(&self) {
        self.store.clear_subscriptions();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.caches.write().unwrap_or_else(PoisonError::into_inner) = SessionCaches::default();
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let empty = BoardState::default();
        self.store.replace(StatePatch {
            doctype: Some(empty.doctype),
            board: Some(empty.board),
            card_meta: Some(empty.card_meta),
            cards: Some(empty.cards),
            columns: Some(empty.columns),
            done_statuses: Some(empty.done_statuses),
            filter_context: Some(empty.filter_context),
            empty_state: Some(true),
            frozen: Some(false),
        });
        debug!("board session torn down");
    }
}

/// Holds the board frozen; dropping it unfreezes.
pub(crate) struct FreezeGuard<'a> {
    session: &'a BoardSession,
}

impl FreezeGuard<'_> {
    /// Point the held freeze at another pending move without releasing it
    pub(crate) fn retarget(&self, pending: PendingMove) {
        debug!(card = %pending.card(), to = %pending.destination(), "pending move retargeted");
        *self
            .session
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(pending);
    }
}

impl Drop for FreezeGuard<'_> {
    fn drop(&mut self) {
        self.session.unfreeze();
    }
}

/// Holds a done column's loading flag; dropping it clears the flag.
pub(crate) struct LoadingGuard<'a> {
    session: &'a BoardSession,
    column: ColumnTitle,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session
            .loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.column);
    }
}

fn card_context<'a>(doctype: &'a str, board: &'a BoardRecord, meta: &'a CardMeta) -> CardContext<'a> {
    CardContext {
        doctype,
        title_field: meta.title_field.as_ref().map(|f| f.fieldname.as_str()),
        column_field: &board.field_name,
        image_field: meta.image_field.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::test_support::{sample_board, ScriptedGateway, StaticCapabilities};
    use crate::types::{ColumnStatus, RawColumn};
    use chrono::NaiveDateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(gateway: Arc<ScriptedGateway>) -> BoardSession {
        BoardSession::new(
            gateway,
            Arc::new(StaticCapabilities::allow_all()),
            BoardSyncConfig::default(),
        )
    }

    fn doc(value: Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_init_builds_ready_state() {
        let gateway = Arc::new(ScriptedGateway::new());
        let session = session(gateway);
        session.init(sample_board()).unwrap();

        let state = session.state();
        assert!(!state.empty_state);
        assert_eq!(state.doctype, "Project");
        assert_eq!(state.columns.len(), 5);
        assert!(state.find_card(&"X".into()).is_some());
        assert!(state.is_done_column(&"Completed".into()));
    }

    #[test]
    fn test_init_skips_malformed_cards() {
        let session = session(Arc::new(ScriptedGateway::new()));
        let mut opts = sample_board();
        opts.cards.push(doc(json!({"name": "NO-STATUS"})));
        session.init(opts).unwrap();
        assert!(session.find_card(&"NO-STATUS".into()).is_none());
    }

    #[test]
    fn test_dispatch_requires_init() {
        let session = session(Arc::new(ScriptedGateway::new()));
        assert!(matches!(
            session.require_initialized(),
            Err(SyncError::NotInitialized)
        ));
    }

    #[test]
    fn test_freeze_is_exclusive() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();

        let guard = session
            .freeze(PendingMove::Placement {
                card: "X".into(),
                column: "In repair".into(),
            })
            .unwrap();
        assert!(session.is_frozen());
        assert!(matches!(
            session.freeze(PendingMove::Placement {
                card: "Y".into(),
                column: "In queue".into(),
            }),
            Err(SyncError::Frozen)
        ));

        drop(guard);
        assert!(!session.is_frozen());
        assert!(session.pending_move().is_none());
    }

    #[test]
    fn test_retarget_keeps_board_frozen() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();

        let guard = session
            .freeze(PendingMove::Placement {
                card: CardId::placeholder(),
                column: "In queue".into(),
            })
            .unwrap();
        guard.retarget(PendingMove::Placement {
            card: "PRJ-0100".into(),
            column: "In repair".into(),
        });

        assert!(session.is_frozen());
        let pending = session.pending_move().unwrap();
        assert_eq!(pending.card().as_str(), "PRJ-0100");
        assert_eq!(pending.destination().as_str(), "In repair");

        drop(guard);
        assert!(session.pending_move().is_none());
    }

    #[test]
    fn test_loading_flag_blocks_duplicates() {
        let session = session(Arc::new(ScriptedGateway::new()));
        let column = ColumnTitle::from("Completed");
        let guard = session.begin_loading(&column);
        assert!(guard.is_some());
        assert!(session.begin_loading(&column).is_none());
        drop(guard);
        assert!(!session.is_loading(&column));
    }

    #[test]
    fn test_update_cards_merges_fresh_versions() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();
        let before = session.state().cards.len();

        let added = session.update_cards(&[
            doc(json!({"name": "X", "status": "Quoted", "project_name": "Renamed"})),
            doc(json!({"name": "NEW", "status": "Completed"})),
        ]);
        assert_eq!(added, 2);

        let state = session.state();
        assert_eq!(state.cards.len(), before + 1);
        let x = state.find_card(&"X".into()).unwrap();
        assert_eq!(x.title, "Renamed");
        assert_eq!(x.column, "Quoted");
    }

    #[test]
    fn test_update_card_unknown_is_noop() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();
        let mut card = session.find_card(&"X".into()).unwrap();
        card.title = "Edited".into();
        assert!(session.update_card(card.clone()));
        assert_eq!(session.find_card(&"X".into()).unwrap().title, "Edited");

        card.name = "GHOST".into();
        assert!(!session.update_card(card));
    }

    #[test]
    fn test_counts_by_column() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();
        let counts = session.counts_by_column();
        assert_eq!(counts[&ColumnTitle::from("In queue")], 2);
    }

    #[tokio::test]
    async fn test_refresh_caches_flags_unread_and_stale_quotes() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(method::GET_DOC, json!({"docs": [{"size_kanban": "small"}]}));
        gateway.reply_once(
            method::GET_LIST,
            json!([{"name": "CONV-1", "from": "+4712345678"}]),
        );
        gateway.reply_once(
            method::GET_LIST,
            json!([{"name": "QTN-1", "parent": "Q1", "modified": "2024-08-12 10:00:00"}]),
        );
        let now = NaiveDateTime::parse_from_str("2024-08-14 12:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let session = session(gateway)
            .with_user("anna@example.com")
            .with_clock(Arc::new(FixedClock::new(now)));
        session.init(sample_board()).unwrap();

        session.refresh_caches().await;

        assert_eq!(session.card_size(), CardSize::Small);
        assert_eq!(session.quotation_drafts().len(), 1);
        let y = session.find_card(&"Y".into()).unwrap();
        assert!(y.has_unread_conversation);
        let q1 = session.find_card(&"Q1".into()).unwrap();
        assert_eq!(
            q1.annotation.message.as_deref(),
            Some(crate::annotation::QUOTE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_refresh_caches_keeps_previous_on_failure() {
        let gateway = Arc::new(ScriptedGateway::new());
        let session = session(Arc::clone(&gateway)).with_user("anna@example.com");
        gateway.reply(method::GET_DOC, json!({"docs": [{"size_kanban": "medium"}]}));
        session.refresh_caches().await;
        assert_eq!(session.card_size(), CardSize::Medium);

        gateway.fail(
            method::GET_DOC,
            crate::error::RemoteError::transport(method::GET_DOC, "offline"),
        );
        session.refresh_caches().await;
        assert_eq!(session.card_size(), CardSize::Medium);
    }

    #[test]
    fn test_teardown_resets_everything() {
        let session = session(Arc::new(ScriptedGateway::new()));
        session.init(sample_board()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session.store().subscribe(
            |s| s.columns.clone(),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        session.teardown();

        let state = session.state();
        assert!(state.empty_state);
        assert!(state.cards.is_empty());
        assert_eq!(session.store().subscription_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(session.activity().is_empty());
    }

    #[test]
    fn test_archived_columns_listed() {
        let session = session(Arc::new(ScriptedGateway::new()));
        let mut opts = sample_board();
        opts.board.columns.push(RawColumn {
            status: Some("Archived".into()),
            ..RawColumn::new("Old stage")
        });
        session.init(opts).unwrap();
        let state = session.state();
        let archived: Vec<_> = ordering::archived_columns(&state.columns).collect();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].status, ColumnStatus::Archived);
    }

    #[test]
    fn test_card_size_parse() {
        assert_eq!(CardSize::parse(Some("small")), CardSize::Small);
        assert_eq!(CardSize::parse(Some(" medium ")), CardSize::Medium);
        assert_eq!(CardSize::parse(Some("huge")), CardSize::Large);
        assert_eq!(CardSize::parse(None), CardSize::Large);
        assert_eq!(CardSize::Medium.as_str(), "medium");
    }

    #[test]
    fn test_indicator_palette_from_config() {
        let session = session(Arc::new(ScriptedGateway::new()));
        assert_eq!(session.indicators(), ["green", "blue", "orange", "gray"]);
    }
}
