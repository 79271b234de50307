//! Bank-task wire protocol: tokens, status polling, challenges

use serde::{Deserialize, Serialize};

/// Opaque handle identifying one bank-communication task.
///
/// Server-assigned on task creation and the sole correlation key for every
/// subsequent start/poll/respond/cancel call. Tokens are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskToken(String);

impl TaskToken {
    /// Token value as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TaskToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of every task-creating endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TaskTokenResponse {
    /// The freshly created task's token
    pub task_token: TaskToken,
}

/// A mid-task authentication prompt the caller must answer to proceed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge title
    pub title: Option<String>,
    /// Label of the input the bank expects
    pub label: Option<String>,
    /// Challenge format (e.g. "Text", "HTML", "HHD")
    pub format: Option<String>,
    /// Challenge payload in the given format
    pub data: Option<String>,
}

/// Server-reported state of one task, as returned by each poll.
///
/// Only server responses mutate this; the client merely attaches the token
/// for correlation after decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    /// Token of the polled task, attached client-side
    #[serde(skip)]
    pub token: Option<TaskToken>,
    /// Whether the task reached a terminal state
    #[serde(default)]
    pub is_ended: bool,
    /// Whether the task ended in an error (meaningful once `is_ended`)
    #[serde(default)]
    pub is_erroneous: bool,
    /// Progress or error message for display
    pub message: Option<String>,
    /// Pending challenge, if the task waits for a caller response
    pub challenge: Option<Challenge>,
    /// Opaque response payload, interpreted per task type
    pub response: Option<serde_json::Value>,
    /// IDs of accounts created or touched by the task
    pub accounts: Option<Vec<String>>,
}

impl TaskStatus {
    /// Whether the server is waiting for a challenge response
    pub fn challenge_pending(&self) -> bool {
        !self.is_ended && self.challenge.is_some()
    }
}

/// Kind of response submitted to advance a task past a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskReplyKind {
    /// A PIN entered by the user
    Pin,
    /// Whether to store the PIN server-side (boolean)
    SavePin,
    /// A TAN or other challenge/response answer
    Challenge,
    /// Confirmation to continue (boolean)
    Continue,
}

impl std::fmt::Display for TaskReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskReplyKind::Pin => write!(f, "PIN"),
            TaskReplyKind::SavePin => write!(f, "SAVE_PIN"),
            TaskReplyKind::Challenge => write!(f, "CHALLENGE"),
            TaskReplyKind::Continue => write!(f, "CONTINUE"),
        }
    }
}

/// The answer a caller supplies to advance a task past a challenge.
///
/// Boolean-valued kinds (`SavePin`, `Continue`) use the literal string
/// values `"0"`/`"1"` on the wire; the constructors enforce that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReply {
    /// Kind of the reply
    pub kind: TaskReplyKind,
    /// Reply value as transmitted
    pub value: String,
}

impl TaskReply {
    /// PIN reply
    pub fn pin(pin: impl Into<String>) -> Self {
        Self {
            kind: TaskReplyKind::Pin,
            value: pin.into(),
        }
    }

    /// Whether the server should store the PIN
    pub fn save_pin(save: bool) -> Self {
        Self {
            kind: TaskReplyKind::SavePin,
            value: bool_literal(save),
        }
    }

    /// Challenge/TAN answer
    pub fn challenge(answer: impl Into<String>) -> Self {
        Self {
            kind: TaskReplyKind::Challenge,
            value: answer.into(),
        }
    }

    /// Whether the task should continue
    pub fn proceed(cont: bool) -> Self {
        Self {
            kind: TaskReplyKind::Continue,
            value: bool_literal(cont),
        }
    }
}

fn bool_literal(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Body of a poll call, optionally carrying one challenge response.
///
/// The reply value lands in the field matching its kind; all unused fields
/// are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgressRequest {
    /// Token of the task being polled
    pub id: TaskToken,
    /// PIN response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// Save-PIN response ("0"/"1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_pin: Option<String>,
    /// Challenge/TAN response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Continue response ("0"/"1")
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub proceed: Option<String>,
}

impl TaskProgressRequest {
    /// Plain poll without a response
    pub fn new(token: TaskToken) -> Self {
        Self {
            id: token,
            pin: None,
            save_pin: None,
            response: None,
            proceed: None,
        }
    }

    /// Poll carrying the given challenge response
    pub fn with_reply(token: TaskToken, reply: &TaskReply) -> Self {
        let mut request = Self::new(token);
        match reply.kind {
            TaskReplyKind::Pin => request.pin = Some(reply.value.clone()),
            TaskReplyKind::SavePin => request.save_pin = Some(reply.value.clone()),
            TaskReplyKind::Challenge => request.response = Some(reply.value.clone()),
            TaskReplyKind::Continue => request.proceed = Some(reply.value.clone()),
        }
        request
    }
}

/// Token identifying a created business process
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessToken {
    /// The process token
    pub process_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_poll_serializes_to_id_only() {
        let request = TaskProgressRequest::new(TaskToken::from("T1"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"id": "T1"}));
    }

    #[test]
    fn continue_reply_uses_renamed_field_and_literal() {
        let reply = TaskReply::proceed(true);
        let request = TaskProgressRequest::with_reply(TaskToken::from("T1"), &reply);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["continue"], "1");
        assert!(json.get("pin").is_none());
        assert!(json.get("save_pin").is_none());
        assert!(json.get("response").is_none());
    }

    #[test]
    fn save_pin_reply_uses_boolean_literals() {
        assert_eq!(TaskReply::save_pin(false).value, "0");
        assert_eq!(TaskReply::save_pin(true).value, "1");
        let request =
            TaskProgressRequest::with_reply(TaskToken::from("T1"), &TaskReply::save_pin(false));
        assert_eq!(serde_json::to_value(&request).unwrap()["save_pin"], "0");
    }

    #[test]
    fn status_decodes_with_defaults() {
        let status: TaskStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.is_ended);
        assert!(!status.is_erroneous);
        assert!(status.challenge.is_none());
        assert!(!status.challenge_pending());
    }

    #[test]
    fn status_with_challenge_is_not_terminal() {
        let json = r#"{
            "is_ended": false,
            "challenge": {"title": "Enter PIN", "format": "Text"}
        }"#;
        let status: TaskStatus = serde_json::from_str(json).unwrap();
        assert!(status.challenge_pending());
        assert!(!status.is_ended);
    }
}
