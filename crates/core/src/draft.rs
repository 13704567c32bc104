use serde::{Deserialize, Serialize};

/// The tracked field values of a draft at one point in time.
///
/// The sync engine keeps the snapshot of the last successful save and compares
/// the live values against it on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    /// Body text.
    pub body: String,
    /// Project tag, `None` when the form has no project field.
    pub project: Option<String>,
}

impl FieldSnapshot {
    /// Create a snapshot from field values.
    pub fn new(body: impl Into<String>, project: Option<String>) -> Self {
        Self {
            body: body.into(),
            project,
        }
    }

    /// Whether saving this snapshot makes the server delete the draft.
    pub fn is_deletion(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Form body posted to the draft endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDraftRequest {
    /// Server-assigned draft id; empty until the first successful save.
    pub draft_id: String,
    /// Current body text.
    pub body: String,
    /// Project tag, only sent when the form tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl SaveDraftRequest {
    /// Build a request for `snapshot` under `draft_id`.
    pub fn new(draft_id: impl Into<String>, snapshot: &FieldSnapshot) -> Self {
        Self {
            draft_id: draft_id.into(),
            body: snapshot.body.clone(),
            project: snapshot.project.clone(),
        }
    }

    /// The field values carried by this request.
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new(self.body.clone(), self.project.clone())
    }

    /// Whether this request deletes the draft on the server.
    pub fn is_deletion(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Successful reply from the draft endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftReply {
    /// Id to use for every subsequent save.
    pub draft_id: String,
}
