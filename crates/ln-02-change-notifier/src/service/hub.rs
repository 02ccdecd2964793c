//! Session hub
//!
//! The single observer a ledger core registers. Fans every signal out to
//! the live sessions; sessions are owned by their connections and held
//! here only weakly.
//!
//! Each signal takes the session's mutex, the same one a connection holds
//! while running a query. A long query (a large `get_full_accounts`, say)
//! therefore stalls block application for that session until it returns.
//! Delivery itself never blocks: callbacks run on the pool's workers.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use ledger_telemetry::ACTIVE_SESSIONS;
use parking_lot::{Mutex, RwLock};
use shared_types::{AccountId, LedgerObject, ObjectId, SignedBlock, SignedTransaction};
use tracing::info;

use super::session::NotifierSession;
use crate::delivery::DeliveryPool;
use crate::domain::NotifierConfig;
use crate::error::NotifyError;
use crate::ports::{KeyReferenceIndex, LedgerObserver, LedgerReader};

/// Shared handle to one session. The mutex serializes the connection's
/// requests against ledger signals.
pub type SharedSession<L> = Arc<Mutex<NotifierSession<L>>>;

pub struct SessionHub<L> {
    ledger: Arc<L>,
    config: NotifierConfig,
    pool: DeliveryPool,
    sessions: RwLock<Vec<Weak<Mutex<NotifierSession<L>>>>>,
}

impl<L> SessionHub<L>
where
    L: LedgerReader + KeyReferenceIndex,
{
    /// Validate `config` and start the delivery pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(ledger: Arc<L>, config: NotifierConfig) -> Result<Self, NotifyError> {
        config.validate()?;
        let pool = DeliveryPool::start(&config.delivery)?;
        info!(
            subscribe_to_all = config.enable_subscribe_to_all,
            max_tracked_accounts = config.max_tracked_accounts,
            "Session hub started"
        );
        Ok(Self {
            ledger,
            config,
            pool,
            sessions: RwLock::new(Vec::new()),
        })
    }

    /// Open a session for a new connection.
    pub fn open_session(&self) -> SharedSession<L> {
        let handle = self.pool.open_handle();
        let session = Arc::new(Mutex::new(NotifierSession::new(
            Arc::clone(&self.ledger),
            &self.config,
            handle,
        )));

        let mut sessions = self.sessions.write();
        sessions.retain(|weak| weak.strong_count() > 0);
        sessions.push(Arc::downgrade(&session));
        ACTIVE_SESSIONS.set(sessions.len() as i64);

        session
    }

    /// Sessions whose connection still holds them.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Close every session and stop the delivery pool.
    pub async fn shutdown(&self) {
        for session in self.live_sessions() {
            session.lock().close();
        }
        self.pool.shutdown().await;
    }

    fn live_sessions(&self) -> Vec<SharedSession<L>> {
        let mut sessions = self.sessions.write();
        sessions.retain(|weak| weak.strong_count() > 0);
        ACTIVE_SESSIONS.set(sessions.len() as i64);
        sessions.iter().filter_map(Weak::upgrade).collect()
    }

    fn for_each_session(&self, f: impl Fn(&NotifierSession<L>)) {
        for session in self.live_sessions() {
            f(&session.lock());
        }
    }
}

impl<L> LedgerObserver for SessionHub<L>
where
    L: LedgerReader + KeyReferenceIndex,
{
    fn on_created(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>) {
        self.for_each_session(|session| session.on_created(ids, impacted));
    }

    fn on_changed(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>) {
        self.for_each_session(|session| session.on_changed(ids, impacted));
    }

    fn on_removed(
        &self,
        ids: &[ObjectId],
        removed: &[LedgerObject],
        impacted: &BTreeSet<AccountId>,
    ) {
        self.for_each_session(|session| session.on_removed(ids, removed, impacted));
    }

    fn on_block_applied(&self, block: &SignedBlock) {
        self.for_each_session(|session| session.on_block_applied(block));
    }

    fn on_pending_transaction(&self, transaction: &SignedTransaction) {
        self.for_each_session(|session| session.on_pending_transaction(transaction));
    }
}
