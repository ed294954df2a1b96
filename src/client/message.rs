use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CODE_INTERPRETER: &str = "code_interpreter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn name(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Statuses after which polling can never reach `completed`.
    ///
    /// `requires_action` is included because no tool outputs are ever submitted.
    pub fn is_dead_end(&self) -> bool {
        matches!(
            self,
            RunStatus::RequiresAction
                | RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantData {
    pub name: String,
    pub instructions: String,
    pub model: String,
}

/// Takes the text of the first content block of the newest message.
pub fn extract_reply(data: &Value) -> Result<String> {
    data["data"][0]["content"][0]["text"]["value"]
        .as_str()
        .map(|v| v.to_string())
        .ok_or_else(|| anyhow!("Invalid response data: {data}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_run() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_abc",
            "object": "thread.run",
            "status": "in_progress",
            "last_error": null,
        }))
        .unwrap();
        assert_eq!(run.id, "run_abc");
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.last_error.is_none());

        let run: Run = serde_json::from_value(json!({
            "id": "run_abc",
            "status": "failed",
            "last_error": { "code": "rate_limit_exceeded", "message": "Slow down" },
        }))
        .unwrap();
        assert!(run.status.is_dead_end());
        assert_eq!(run.last_error.unwrap().message, "Slow down");

        let run: Run =
            serde_json::from_value(json!({ "id": "run_abc", "status": "paused" })).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_dead_end());
    }

    #[test]
    fn test_extract_reply() {
        let data = json!({
            "object": "list",
            "data": [{
                "id": "msg_1",
                "role": "assistant",
                "content": [
                    { "type": "text", "text": { "value": "Hi there", "annotations": [] } },
                    { "type": "text", "text": { "value": "ignored", "annotations": [] } }
                ]
            }]
        });
        assert_eq!(extract_reply(&data).unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_reply_rejects_other_shapes() {
        assert!(extract_reply(&json!({ "data": [] })).is_err());
        let image_only = json!({
            "data": [{ "content": [{ "type": "image_file", "image_file": { "file_id": "f" } }] }]
        });
        assert!(extract_reply(&image_only).is_err());
    }
}
