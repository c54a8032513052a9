//! Remote state synchronization.
//!
//! One [`SyncChannel`] per synchronized entity class (stats, quests,
//! feedback), each a small Idle → Fetching → Merged/Error machine on its
//! own poll cadence. Fetches run on short-lived worker threads and are
//! applied between frames as whole-value cache replacements; the
//! simulation never blocks on the store.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use serde_json::json;

use crate::config::SyncConfig;
use crate::sync::entities::{
    FeedbackInbox, FeedbackNote, PlayerStats, QuestEntry, QuestLog, QuestStatus, RemoteView,
};
use crate::sync::levels;
use crate::sync::notify::StatNotice;
use crate::sync::store::{Document, RemoteStore, StoreError};

/// Identity of one play session. Fetches stamp the session they started
/// under; results arriving under a different session are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Merged,
    Error,
}

#[derive(Debug, Clone)]
enum FetchOp {
    Get {
        collection: &'static str,
        id: String,
    },
    Query {
        collection: &'static str,
        field: &'static str,
        value: String,
    },
}

fn run_fetch(store: &dyn RemoteStore, op: &FetchOp) -> Result<Vec<Document>, StoreError> {
    match op {
        FetchOp::Get { collection, id } => store.get_document(collection, id).map(|doc| vec![doc]),
        FetchOp::Query {
            collection,
            field,
            value,
        } => store.query_by_field(collection, field, value),
    }
}

/// Start a fetch without blocking the caller. Results come back over a
/// channel polled each frame.
fn dispatch_fetch(
    store: Arc<dyn RemoteStore>,
    op: FetchOp,
) -> Receiver<Result<Vec<Document>, StoreError>> {
    let (tx, rx) = mpsc::channel();
    #[cfg(not(target_arch = "wasm32"))]
    std::thread::spawn(move || {
        let _ = tx.send(run_fetch(&*store, &op));
    });
    #[cfg(target_arch = "wasm32")]
    {
        // No worker threads on wasm; the offline store answers instantly
        let _ = tx.send(run_fetch(&*store, &op));
    }
    rx
}

/// Fire-and-forget write; failures are logged, never surfaced.
fn dispatch_write(store: Arc<dyn RemoteStore>, collection: &'static str, id: String, patch: serde_json::Value) {
    let write = move || {
        if let Err(e) = store.update_document(collection, &id, patch) {
            log::warn!("Write to {}/{} failed: {}", collection, id, e);
        }
    };
    #[cfg(not(target_arch = "wasm32"))]
    std::thread::spawn(write);
    #[cfg(target_arch = "wasm32")]
    write();
}

/// Fire-and-forget document creation.
fn dispatch_set(store: Arc<dyn RemoteStore>, collection: &'static str, id: String, data: serde_json::Value) {
    let write = move || {
        if let Err(e) = store.set_document(collection, &id, data) {
            log::warn!("Create of {}/{} failed: {}", collection, id, e);
        }
    };
    #[cfg(not(target_arch = "wasm32"))]
    std::thread::spawn(write);
    #[cfg(target_arch = "wasm32")]
    write();
}

struct PendingFetch {
    rx: Receiver<Result<Vec<Document>, StoreError>>,
    session: SessionId,
}

/// Poll/merge state machine for one synchronized entity class.
struct SyncChannel<T: RemoteView> {
    name: &'static str,
    op: FetchOp,
    interval: f32,
    /// Seconds since the last fetch started (or failed)
    timer: f32,
    /// Extra delay added after errors; doubles up to `max_backoff`
    backoff: f32,
    max_backoff: f32,
    state: SyncState,
    cache: Option<T>,
    /// Version (`updated_at`) of the applied cache
    version: Option<u64>,
    /// Stamp of the newest local optimistic write not yet confirmed
    optimistic_at: Option<u64>,
    pending: Option<PendingFetch>,
    failures: u32,
}

impl<T: RemoteView> SyncChannel<T> {
    fn new(name: &'static str, op: FetchOp, interval: f32, max_backoff: f32) -> Self {
        Self {
            name,
            op,
            interval,
            timer: 0.0,
            backoff: 0.0,
            max_backoff,
            state: SyncState::Idle,
            cache: None,
            version: None,
            optimistic_at: None,
            pending: None,
            failures: 0,
        }
    }

    /// Make the next `advance` start a fetch regardless of the timer.
    fn request_immediate(&mut self) {
        self.timer = self.interval + self.backoff;
    }

    fn advance(&mut self, dt: f32, store: &Arc<dyn RemoteStore>, session: SessionId) {
        if self.state == SyncState::Fetching {
            return;
        }
        self.timer += dt;
        if self.timer >= self.interval + self.backoff {
            self.begin_fetch(store, session);
        }
    }

    fn begin_fetch(&mut self, store: &Arc<dyn RemoteStore>, session: SessionId) {
        log::trace!("{}: fetch started", self.name);
        let rx = dispatch_fetch(Arc::clone(store), self.op.clone());
        self.pending = Some(PendingFetch { rx, session });
        self.state = SyncState::Fetching;
        self.timer = 0.0;
    }

    fn pump(&mut self, session: SessionId) {
        let Some(pending) = &self.pending else {
            return;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.fail(StoreError::Network("fetch worker dropped".to_string()));
                return;
            }
        };

        let fetch_session = pending.session;
        self.pending = None;

        if fetch_session != session {
            // Session ended while the fetch was in flight
            log::debug!("{}: discarding fetch from a superseded session", self.name);
            self.state = SyncState::Idle;
            return;
        }

        match result.and_then(|docs| T::from_documents(&docs)) {
            Ok((view, version)) => self.merge(view, version),
            Err(e) => self.fail(e),
        }
    }

    /// Last-fetch-wins merge: the whole cache is replaced at once, except
    /// when the fetch is a duplicate or predates an unconfirmed local
    /// write.
    fn merge(&mut self, view: T, version: u64) {
        self.state = SyncState::Merged;
        self.backoff = 0.0;
        self.failures = 0;

        if self.cache.is_some() && self.version == Some(version) {
            log::trace!("{}: fetch matches applied version {}, no-op", self.name, version);
            return;
        }
        if let Some(optimistic_at) = self.optimistic_at {
            if version < optimistic_at {
                log::debug!(
                    "{}: discarding stale fetch (v{} predates local write at {})",
                    self.name,
                    version,
                    optimistic_at
                );
                return;
            }
        }

        self.cache = Some(view);
        self.version = Some(version);
        self.optimistic_at = None;
        log::debug!("{}: merged v{}", self.name, version);
    }

    fn fail(&mut self, err: StoreError) {
        self.state = SyncState::Error;
        self.failures += 1;
        self.backoff = if self.backoff == 0.0 {
            self.interval.min(self.max_backoff)
        } else {
            (self.backoff * 2.0).min(self.max_backoff)
        };
        log::warn!(
            "{} sync failed ({} in a row, retry in {:.0}s): {}",
            self.name,
            self.failures,
            self.interval + self.backoff,
            err
        );
    }

    fn reset(&mut self) {
        // Pending fetches are kept so their results can be discarded on
        // arrival under the new session
        self.cache = None;
        self.version = None;
        self.optimistic_at = None;
        self.state = SyncState::Idle;
        self.timer = 0.0;
        self.backoff = 0.0;
        self.failures = 0;
    }

    fn stamp_optimistic(&mut self, at: u64) {
        self.optimistic_at = Some(self.optimistic_at.map_or(at, |prev| prev.max(at)));
    }
}

/// Owns the remote caches and the merge rules. Everything else reads the
/// caches through the accessors and never writes them.
pub struct Synchronizer {
    store: Arc<dyn RemoteStore>,
    session: SessionId,
    player_id: String,
    stats: SyncChannel<PlayerStats>,
    quests: SyncChannel<QuestLog>,
    feedback: SyncChannel<FeedbackInbox>,
    seen_notices: HashSet<u64>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn RemoteStore>, player_id: &str, config: &SyncConfig) -> Self {
        let mut stats = SyncChannel::new(
            "stats",
            FetchOp::Get {
                collection: "players",
                id: player_id.to_string(),
            },
            config.stats_interval_secs,
            config.max_backoff_secs,
        );
        let mut quests = SyncChannel::new(
            "quests",
            FetchOp::Query {
                collection: "quests",
                field: "assignedTo",
                value: player_id.to_string(),
            },
            config.quests_interval_secs,
            config.max_backoff_secs,
        );
        let mut feedback = SyncChannel::new(
            "feedback",
            FetchOp::Query {
                collection: "feedback",
                field: "assignedTo",
                value: player_id.to_string(),
            },
            config.feedback_interval_secs,
            config.max_backoff_secs,
        );

        // First fetch should not wait out a full poll interval
        stats.request_immediate();
        quests.request_immediate();
        feedback.request_immediate();

        Self {
            store,
            session: SessionId(1),
            player_id: player_id.to_string(),
            stats,
            quests,
            feedback,
            seen_notices: HashSet::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Accumulate poll timers; may start fetches. Called once per frame.
    pub fn advance(&mut self, dt: f32) {
        self.stats.advance(dt, &self.store, self.session);
        self.quests.advance(dt, &self.store, self.session);
        self.feedback.advance(dt, &self.store, self.session);
    }

    /// Apply any fetch results that arrived since the last frame.
    pub fn pump(&mut self) {
        self.stats.pump(self.session);
        self.quests.pump(self.session);
        self.feedback.pump(self.session);
    }

    pub fn stats(&self) -> Option<&PlayerStats> {
        self.stats.cache.as_ref()
    }

    pub fn quests(&self) -> &[QuestEntry] {
        self.quests
            .cache
            .as_ref()
            .map(|log| log.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn feedback_notes(&self) -> &[FeedbackNote] {
        self.feedback
            .cache
            .as_ref()
            .map(|inbox| inbox.notes.as_slice())
            .unwrap_or(&[])
    }

    /// Channel states for the debug overlay.
    pub fn channel_states(&self) -> [(&'static str, SyncState); 3] {
        [
            (self.stats.name, self.stats.state),
            (self.quests.name, self.quests.state),
            (self.feedback.name, self.feedback.state),
        ]
    }

    /// True once a channel has failed several times in a row; drives the
    /// "could not sync" notification.
    pub fn is_degraded(&self) -> bool {
        self.stats.failures >= 3 || self.quests.failures >= 3 || self.feedback.failures >= 3
    }

    /// Optimistically apply an XP reward and push it to the store.
    /// Returns true if the reward leveled the player up.
    pub fn grant_experience(&mut self, reward: i32, now_ms: u64) -> bool {
        let Some(stats) = self.stats.cache.as_mut() else {
            log::debug!("XP reward before first stats sync, dropped");
            return false;
        };

        let (level, experience) = levels::apply_reward(stats.level, stats.experience, reward);
        let leveled = level > stats.level;
        stats.level = level;
        stats.experience = experience;
        self.stats.stamp_optimistic(now_ms);

        dispatch_write(
            Arc::clone(&self.store),
            "players",
            self.player_id.clone(),
            json!({"level": level, "experience": experience}),
        );
        leveled
    }

    /// Optimistically mark a quest done and push the status change.
    pub fn complete_quest(&mut self, quest_id: &str, now_ms: u64) -> bool {
        let Some(log) = self.quests.cache.as_mut() else {
            return false;
        };
        let Some(quest) = log
            .entries
            .iter_mut()
            .find(|q| q.id == quest_id && q.status == QuestStatus::Active)
        else {
            return false;
        };

        quest.status = QuestStatus::PlayerDone;
        self.quests.stamp_optimistic(now_ms);

        dispatch_write(
            Arc::clone(&self.store),
            "quests",
            quest_id.to_string(),
            json!({"status": QuestStatus::PlayerDone.as_str()}),
        );
        true
    }

    /// Send player feedback to the store. Admin replies come back later
    /// through the feedback channel on its own cadence.
    pub fn submit_feedback(&mut self, message: &str, now_ms: u64) {
        let id = format!("fb-{}-{}", self.player_id, now_ms);
        dispatch_set(
            Arc::clone(&self.store),
            "feedback",
            id,
            json!({
                "from": self.player_id,
                "message": message,
                "submittedAt": now_ms
            }),
        );
    }

    /// Handle an out-of-band stat notice. Applies at most once per notice
    /// id, only for this identity, and only if it is newer than the
    /// applied cache.
    pub fn apply_notice(&mut self, notice: StatNotice) {
        if notice.target != self.player_id {
            log::debug!(
                "Ignoring notice {} addressed to '{}'",
                notice.id,
                notice.target
            );
            return;
        }
        if !self.seen_notices.insert(notice.id) {
            return;
        }
        if self.stats.cache.is_some() && Some(notice.timestamp) <= self.stats.version {
            log::trace!("Notice {} already covered by fetch, no-op", notice.id);
            return;
        }

        if let Some(stats) = self.stats.cache.as_mut() {
            if let Some(level) = notice.patch.level {
                stats.level = level;
            }
            if let Some(experience) = notice.patch.experience {
                stats.experience = experience;
            }
            if let Some(points) = notice.patch.points {
                stats.points = points;
            }
            self.stats.stamp_optimistic(notice.timestamp);
        }

        // Re-validate against the authority right away
        self.stats.request_immediate();
    }

    /// End the current session: caches are dropped and in-flight fetch
    /// results will be discarded when they arrive.
    pub fn end_session(&mut self) {
        log::info!("Session {} ended", self.session.0);
        self.session = SessionId(self.session.0 + 1);
        self.stats.reset();
        self.quests.reset();
        self.feedback.reset();
        self.seen_notices.clear();
    }
}
