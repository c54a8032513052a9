pub mod entities;
#[cfg(not(target_arch = "wasm32"))]
pub mod http_store;
pub mod levels;
pub mod notify;
pub mod store;
pub mod synchronizer;

pub use entities::{FeedbackNote, PlayerStats, QuestEntry, QuestStatus};
pub use notify::{NoticeBus, NoticeSender, StatNotice, StatPatch};
pub use store::{MemoryStore, RemoteStore};
pub use synchronizer::{SessionId, SyncState, Synchronizer};
