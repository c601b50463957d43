//! Rust client SDK for an OpenCode-compatible AI coding agent server.
//!
//! Drives the server's session/message/config API over JSON/HTTP with Basic
//! Auth: typed sub-clients for sessions and catalogs, an ephemeral-session
//! lifecycle helper, an action-dispatch layer that flattens replies into flat
//! records, dropdown option providers, and tool / chat-model adapter shims.
// Allow large error types - Result payloads carry reqwest errors.
#![allow(clippy::result_large_err)]

/// Default server base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4096";

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Default request timeout (60 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

mod actions;
mod chat;
mod client;
mod config;
mod errors;
mod http;
mod options;
mod sessions;
mod skills;
mod tool;
mod types;

pub use actions::{
    flatten_text, tool_output, Action, ActionParams, ActionRunner, Record, SessionMode,
    DEFAULT_RESPONSE_KEY,
};
pub use chat::{
    render_transcript, tool_instruction, ChatCompletion, ChatMessage, ChatModel, ChatRole,
    JsonToolCallParser, ToolCall, ToolCallParser, ToolSpec, DEFAULT_COMPLETION_TIMEOUT,
};
pub use client::{Client, Config};
pub use config::ConfigClient;
pub use errors::{Error, RequestError, Result};
pub use options::{or_sentinel, skill_options, ChoiceOption, OptionsClient};
pub use sessions::{SessionScope, SessionsClient, TEMPORARY_SESSION_TITLE};
pub use skills::{Skill, SkillScanner, SKILL_MANIFEST};
pub use tool::AssistantTool;
pub use types::{
    Agent, Command, CommandRequest, Message, MessageInfo, MessagePart, ModelSelector, Provider,
    ProviderModel, ProvidersResponse, SendMessageRequest, Session, SessionCreateRequest,
    ShellRequest, ToolState, ToolStateMetadata, MODEL_SELECTOR_SEPARATOR,
};
