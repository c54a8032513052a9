//! Typed views over remote documents.
//!
//! Every payload crossing the store boundary is validated here and turned
//! into one of these types; a field that is missing or of the wrong shape
//! fails the whole document with [`StoreError::Malformed`].

use serde_json::Value;

use crate::sync::store::{Document, StoreError};

/// A view type the synchronizer can build from a fetch result.
///
/// Returns the parsed view plus its version: the newest `updated_at`
/// among the source documents.
pub trait RemoteView: Sized {
    fn from_documents(docs: &[Document]) -> Result<(Self, u64), StoreError>;
}

fn str_field(doc: &Document, field: &'static str) -> Result<String, StoreError> {
    doc.data
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(StoreError::Malformed {
            id: doc.id.clone(),
            field,
        })
}

fn int_field(doc: &Document, field: &'static str) -> Result<i32, StoreError> {
    doc.data
        .get(field)
        .and_then(Value::as_i64)
        .map(|v| v as i32)
        .ok_or(StoreError::Malformed {
            id: doc.id.clone(),
            field,
        })
}

/// Local cache of the authoritative player stats document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub name: String,
    pub skin: String,
    pub level: i32,
    pub experience: i32,
    pub points: i32,
    /// `updated_at` of the last merged authoritative document
    pub last_synced_at: u64,
}

impl PlayerStats {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            name: str_field(doc, "name")?,
            skin: str_field(doc, "skin")?,
            level: int_field(doc, "level")?,
            experience: int_field(doc, "experience")?,
            points: int_field(doc, "points")?,
            last_synced_at: doc.updated_at,
        })
    }
}

impl RemoteView for PlayerStats {
    fn from_documents(docs: &[Document]) -> Result<(Self, u64), StoreError> {
        let doc = docs.first().ok_or(StoreError::Malformed {
            id: String::new(),
            field: "document",
        })?;
        let stats = PlayerStats::from_document(doc)?;
        Ok((stats, doc.updated_at))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestStatus {
    /// Assigned and in progress
    Active,
    /// Player finished their part; awaiting admin confirmation
    PlayerDone,
    /// Confirmed complete
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::PlayerDone => "player_done",
            QuestStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(QuestStatus::Active),
            "player_done" => Some(QuestStatus::PlayerDone),
            "completed" => Some(QuestStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestEntry {
    pub id: String,
    pub status: QuestStatus,
    pub end_time: Option<u64>,
    pub assigned_to: String,
}

impl QuestEntry {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let status_str = str_field(doc, "status")?;
        let status = QuestStatus::from_str(&status_str).ok_or(StoreError::Malformed {
            id: doc.id.clone(),
            field: "status",
        })?;
        Ok(Self {
            id: doc.id.clone(),
            status,
            end_time: doc.data.get("endTime").and_then(Value::as_u64),
            assigned_to: str_field(doc, "assignedTo")?,
        })
    }
}

/// The player's quest list, replaced wholesale on every successful sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestLog {
    pub entries: Vec<QuestEntry>,
}

impl QuestLog {
    pub fn first_active(&self) -> Option<&QuestEntry> {
        self.entries
            .iter()
            .find(|q| q.status == QuestStatus::Active)
    }
}

impl RemoteView for QuestLog {
    fn from_documents(docs: &[Document]) -> Result<(Self, u64), StoreError> {
        let mut entries = docs
            .iter()
            .map(QuestEntry::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        // Deadline order, open-ended quests last, id as the tiebreak
        entries.sort_by(|a, b| {
            let a_key = (a.end_time.unwrap_or(u64::MAX), a.id.as_str());
            let b_key = (b.end_time.unwrap_or(u64::MAX), b.id.as_str());
            a_key.cmp(&b_key)
        });
        let version = docs.iter().map(|d| d.updated_at).max().unwrap_or(0);
        Ok((Self { entries }, version))
    }
}

/// Admin replies to player feedback, surfaced as HUD notices.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackNote {
    pub id: String,
    pub message: String,
    pub updated_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackInbox {
    pub notes: Vec<FeedbackNote>,
}

impl RemoteView for FeedbackInbox {
    fn from_documents(docs: &[Document]) -> Result<(Self, u64), StoreError> {
        let mut notes = docs
            .iter()
            .map(|doc| {
                Ok(FeedbackNote {
                    id: doc.id.clone(),
                    message: str_field(doc, "message")?,
                    updated_at: doc.updated_at,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let version = docs.iter().map(|d| d.updated_at).max().unwrap_or(0);
        Ok((Self { notes }, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, updated_at: u64, data: Value) -> Document {
        Document {
            id: id.to_string(),
            updated_at,
            data,
        }
    }

    #[test]
    fn stats_parse_all_fields() {
        let d = doc(
            "p1",
            42,
            json!({"name": "Ada", "skin": "tan", "level": 3, "experience": 120, "points": 5}),
        );
        let (stats, version) = PlayerStats::from_documents(&[d]).unwrap();
        assert_eq!(stats.name, "Ada");
        assert_eq!(stats.level, 3);
        assert_eq!(stats.last_synced_at, 42);
        assert_eq!(version, 42);
    }

    #[test]
    fn missing_field_is_malformed() {
        let d = doc("p1", 1, json!({"name": "Ada", "skin": "tan", "level": 3}));
        let err = PlayerStats::from_documents(&[d]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Malformed {
                field: "experience",
                ..
            }
        ));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let d = doc(
            "p1",
            1,
            json!({"name": "Ada", "skin": "tan", "level": "three", "experience": 0, "points": 0}),
        );
        let err = PlayerStats::from_documents(&[d]).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { field: "level", .. }));
    }

    #[test]
    fn quest_log_orders_by_deadline_then_id() {
        let docs = vec![
            doc("qb", 5, json!({"status": "active", "assignedTo": "ada", "endTime": 900})),
            doc("qa", 7, json!({"status": "active", "assignedTo": "ada", "endTime": 900})),
            doc("qc", 6, json!({"status": "completed", "assignedTo": "ada"})),
            doc("qd", 3, json!({"status": "player_done", "assignedTo": "ada", "endTime": 100})),
        ];
        let (log, version) = QuestLog::from_documents(&docs).unwrap();
        let ids: Vec<&str> = log.entries.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["qd", "qa", "qb", "qc"]);
        assert_eq!(version, 7);
        assert_eq!(log.first_active().unwrap().id, "qa");
    }

    #[test]
    fn unknown_quest_status_is_malformed() {
        let d = doc("q1", 1, json!({"status": "paused", "assignedTo": "ada"}));
        let err = QuestLog::from_documents(&[d]).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { field: "status", .. }));
    }

    #[test]
    fn empty_quest_list_parses_to_empty_log() {
        let (log, version) = QuestLog::from_documents(&[]).unwrap();
        assert!(log.entries.is_empty());
        assert_eq!(version, 0);
    }
}
