//! Chat-model adapter: drive the assistant through a chat-completion shaped
//! interface.
//!
//! The remote service has no native tool-call protocol, so bound tools are
//! described to the model as a JSON-call-format text convention and replies
//! are scanned for embedded `{"tool": name, "args": {...}}` objects. That
//! extraction is best-effort by nature and isolated behind the
//! [`ToolCallParser`] strategy so it can be swapped out if the server ever
//! grows structured tool-calling.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde_json::Value;

use crate::{
    actions::flatten_text,
    client::Client,
    errors::{Error, Result},
    sessions::SessionScope,
    types::{ModelSelector, SendMessageRequest},
};

/// Default client-side timeout for one completion call.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

const TRANSCRIPT_SESSION_TITLE: &str = "Chat completion";

/// Role tag on a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    fn marker(&self) -> &'static str {
        match self {
            ChatRole::System => "System",
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// One role-tagged message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Schema of a tool the model may call via the text convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// A tool call parsed out of the reply text.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    pub args: Value,
}

/// Strategy for extracting tool calls from free-form reply text.
pub trait ToolCallParser: Send + Sync {
    fn parse(&self, text: &str) -> Vec<ToolCall>;
}

/// Default parser: regex over the raw text for
/// `{"tool": "<name>", "args": {...}}` objects. Requires the `tool` key
/// before `args` and does not handle nested braces inside `args`.
pub struct JsonToolCallParser {
    pattern: Regex,
}

const TOOL_CALL_PATTERN: &str =
    r#"\{\s*"tool"\s*:\s*"([^"]+)"\s*,\s*"args"\s*:\s*(\{[^{}]*\})\s*\}"#;

impl Default for JsonToolCallParser {
    fn default() -> Self {
        Self {
            pattern: Regex::new(TOOL_CALL_PATTERN).expect("tool call pattern is valid"),
        }
    }
}

impl ToolCallParser for JsonToolCallParser {
    fn parse(&self, text: &str) -> Vec<ToolCall> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let tool = caps.get(1)?.as_str().to_string();
                let args = serde_json::from_str(caps.get(2)?.as_str()).ok()?;
                Some(ToolCall { tool, args })
            })
            .collect()
    }
}

/// Result of one completion: the reply text plus any parsed tool calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// Chat-completion shaped adapter over the send-message path.
#[derive(Clone)]
pub struct ChatModel {
    client: Client,
    session_id: Option<String>,
    model: Option<ModelSelector>,
    agent: Option<String>,
    tools: Vec<ToolSpec>,
    timeout: Duration,
    parser: Arc<dyn ToolCallParser>,
}

impl ChatModel {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            session_id: None,
            model: None,
            agent: None,
            tools: Vec::new(),
            timeout: DEFAULT_COMPLETION_TIMEOUT,
            parser: Arc::new(JsonToolCallParser::default()),
        }
    }

    /// Bind completions to an existing session instead of ephemeral ones.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_model(mut self, model: ModelSelector) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Bind tool schemas; their JSON-call convention is prepended as a system
    /// instruction on every completion.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Override the client-side abort timer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ToolCallParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Render the transcript into one text block, send it as a single
    /// message, and parse the reply for tool calls.
    ///
    /// A client-side timer aborts the call with [`Error::Timeout`] after the
    /// configured duration; every other failure propagates unchanged.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion> {
        let mut req = SendMessageRequest::text(render_transcript(messages));
        req.model = self.model.clone();
        req.agent = self.agent.clone();
        if !self.tools.is_empty() {
            req.system = Some(tool_instruction(&self.tools));
        }

        let scope = match &self.session_id {
            Some(id) => SessionScope::Existing(id.clone()),
            None => SessionScope::Temporary {
                title: Some(TRANSCRIPT_SESSION_TITLE.to_string()),
            },
        };

        let sessions = self.client.sessions();
        let runner = sessions.clone();
        let call = sessions.with_session(scope, move |id| async move {
            runner.send_message(&id, &req).await
        });
        let message = match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome?,
            Err(_) => return Err(Error::Timeout(self.timeout)),
        };

        let content = flatten_text(&message.parts, true);
        let tool_calls = self.parser.parse(&content);
        Ok(ChatCompletion {
            content,
            tool_calls,
        })
    }
}

/// Concatenate role-tagged messages into one block, each prefixed with its
/// role marker.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role.marker(), message.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Synthesized system instruction describing bound tools and the JSON call
/// convention the reply should use.
pub fn tool_instruction(tools: &[ToolSpec]) -> String {
    let mut out = String::from(
        "You can call tools. To call one, reply with a single JSON object of \
         the form {\"tool\": \"<name>\", \"args\": {...}} and nothing else.\n\
         Available tools:\n",
    );
    for tool in tools {
        let schema =
            serde_json::to_string(&tool.parameters).unwrap_or_else(|_| "{}".to_string());
        out.push_str(&format!(
            "- {}: {} (args schema: {})\n",
            tool.name, tool.description, schema
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_prefixes_role_markers_in_order() {
        let rendered = render_transcript(&[
            ChatMessage::system("Be terse."),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]);
        assert_eq!(rendered, "System: Be terse.\n\nUser: hi\n\nAssistant: hello");
    }

    #[test]
    fn parser_extracts_embedded_tool_call() {
        let parser = JsonToolCallParser::default();
        let calls =
            parser.parse(r#"Sure, running it: {"tool": "search", "args": {"query": "rust"}}"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "search");
        assert_eq!(calls[0].args, json!({"query": "rust"}));
    }

    #[test]
    fn parser_extracts_multiple_calls() {
        let parser = JsonToolCallParser::default();
        let calls = parser.parse(
            r#"{"tool": "a", "args": {}} and then {"tool": "b", "args": {"n": 1}}"#,
        );
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].tool, "b");
    }

    #[test]
    fn parser_ignores_plain_text_and_wrong_key_order() {
        let parser = JsonToolCallParser::default();
        assert!(parser.parse("no calls here").is_empty());
        // Key order is part of the convention; args-first is not recognized.
        assert!(parser
            .parse(r#"{"args": {}, "tool": "search"}"#)
            .is_empty());
    }

    #[test]
    fn tool_instruction_lists_every_tool() {
        let instruction = tool_instruction(&[
            ToolSpec {
                name: "search".into(),
                description: "Web search".into(),
                parameters: json!({"type": "object"}),
            },
            ToolSpec {
                name: "calc".into(),
                description: "Arithmetic".into(),
                parameters: json!({}),
            },
        ]);
        assert!(instruction.contains("- search: Web search"));
        assert!(instruction.contains("- calc: Arithmetic"));
        assert!(instruction.contains(r#"{"tool": "<name>", "args": {...}}"#));
    }
}
