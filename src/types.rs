use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};

/// Separator used by the composite model selector string.
pub const MODEL_SELECTOR_SEPARATOR: &str = "::";

/// A session owned by the remote server. Referenced by id only; the SDK keeps
/// no local copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Creation time in epoch milliseconds, when the server reports one.
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<f64>,
}

/// Request body for `POST /session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A message envelope: metadata plus the ordered list of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<MessageInfo>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

/// Message metadata as reported by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "sessionID",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        rename = "providerID",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_id: Option<String>,
    #[serde(default, rename = "modelID", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Token accounting, passed through untyped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// A discriminated fragment of a message. Exactly one semantic payload per
/// part, keyed by `type`; unrecognized part kinds deserialize as `Unknown`
/// rather than failing the whole message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text {
        text: String,
    },
    /// A tool execution with its state, as emitted by shell and skill runs.
    Tool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<ToolState>,
    },
    ToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
    },
    ToolResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
    },
    #[serde(other)]
    Unknown,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }
}

/// Execution state of a `tool` part.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ToolStateMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolStateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Structured provider/model pair, carried on the wire as
/// `{"providerID": ..., "modelID": ...}` and in flat parameter values as the
/// composite string `providerID::modelID`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSelector {
    #[serde(rename = "providerID")]
    pub provider_id: String,
    #[serde(rename = "modelID")]
    pub model_id: String,
}

impl ModelSelector {
    pub fn new(provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
        }
    }

    /// Encode as the composite `providerID::modelID` string.
    ///
    /// The separator is not escaped against ids that might themselves contain
    /// `::`; [`decode`](Self::decode) splits at the first occurrence.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.provider_id, MODEL_SELECTOR_SEPARATOR, self.model_id
        )
    }

    /// Decode a composite `providerID::modelID` string.
    pub fn decode(value: &str) -> Result<Self> {
        match value.split_once(MODEL_SELECTOR_SEPARATOR) {
            Some((provider_id, model_id)) if !provider_id.is_empty() && !model_id.is_empty() => {
                Ok(Self::new(provider_id, model_id))
            }
            _ => Err(Error::Config(format!(
                "invalid model selector {value:?}: expected providerID::modelID"
            ))),
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Request body for `POST /session/:id/message` and
/// `POST /session/:id/prompt_async`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SendMessageRequest {
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(
        default,
        rename = "messageID",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, rename = "noReply", skip_serializing_if = "Option::is_none")]
    pub no_reply: Option<bool>,
    /// Per-tool enablement map, e.g. `{"my-skill": true}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<BTreeMap<String, bool>>,
}

impl SendMessageRequest {
    /// A request carrying a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![MessagePart::text(text)],
            ..Self::default()
        }
    }
}

/// Request body for `POST /session/:id/command`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRequest {
    pub command: String,
    pub arguments: Value,
    #[serde(
        default,
        rename = "messageID",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelector>,
}

impl CommandRequest {
    /// Interpret a raw argument string: a JSON object is passed through,
    /// anything else is wrapped as `{"input": raw}`. Never a parse error.
    pub fn arguments_from_str(raw: &str) -> Value {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            if value.is_object() {
                return value;
            }
        }
        serde_json::json!({ "input": raw })
    }
}

/// Request body for `POST /session/:id/shell`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellRequest {
    pub command: String,
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelector>,
}

/// An upstream model source and its selectable models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub models: BTreeMap<String, ProviderModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response envelope for `GET /config/providers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProvidersResponse {
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_selector_round_trips() {
        let selector = ModelSelector::new("anthropic", "claude-sonnet-4");
        let encoded = selector.encode();
        assert_eq!(encoded, "anthropic::claude-sonnet-4");
        assert_eq!(ModelSelector::decode(&encoded).unwrap(), selector);
    }

    #[test]
    fn model_selector_splits_at_first_separator() {
        let decoded = ModelSelector::decode("openai::gpt::weird").unwrap();
        assert_eq!(decoded.provider_id, "openai");
        assert_eq!(decoded.model_id, "gpt::weird");
    }

    #[test]
    fn model_selector_rejects_missing_separator() {
        assert!(ModelSelector::decode("claude-sonnet-4").is_err());
        assert!(ModelSelector::decode("::model").is_err());
        assert!(ModelSelector::decode("provider::").is_err());
    }

    #[test]
    fn model_selector_serializes_wire_field_names() {
        let value = serde_json::to_value(ModelSelector::new("p", "m")).unwrap();
        assert_eq!(value, serde_json::json!({"providerID": "p", "modelID": "m"}));
    }

    #[test]
    fn message_part_tags_discriminate() {
        let parts: Vec<MessagePart> = serde_json::from_value(serde_json::json!([
            {"type": "text", "text": "hi"},
            {"type": "tool", "tool": "bash", "state": {"status": "completed", "output": "ok"}},
            {"type": "step-start", "snapshot": "abc"}
        ]))
        .unwrap();
        assert_eq!(parts[0], MessagePart::text("hi"));
        assert!(matches!(&parts[1], MessagePart::Tool { tool: Some(t), .. } if t == "bash"));
        assert_eq!(parts[2], MessagePart::Unknown);
    }

    #[test]
    fn command_arguments_pass_through_json_objects() {
        let args = CommandRequest::arguments_from_str(r#"{"branch": "main"}"#);
        assert_eq!(args, serde_json::json!({"branch": "main"}));
    }

    #[test]
    fn command_arguments_wrap_non_json_input() {
        let args = CommandRequest::arguments_from_str("not json");
        assert_eq!(args, serde_json::json!({"input": "not json"}));
    }

    #[test]
    fn command_arguments_wrap_scalar_json() {
        // A bare JSON scalar is still not an object; wrap it like raw text.
        let args = CommandRequest::arguments_from_str("42");
        assert_eq!(args, serde_json::json!({"input": "42"}));
    }

    #[test]
    fn send_message_request_serializes_minimal_shape() {
        let value = serde_json::to_value(SendMessageRequest::text("hello")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"parts": [{"type": "text", "text": "hello"}]})
        );
    }
}
