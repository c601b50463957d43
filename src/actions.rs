//! Action dispatch: maps the host's (resource, operation) pairs onto typed
//! client calls and flattens responses into per-item records.

use serde_json::{Map, Value};

use crate::{
    client::Client,
    errors::{Error, Result},
    sessions::SessionScope,
    types::{
        CommandRequest, Message, MessagePart, ModelSelector, SendMessageRequest, ShellRequest,
    },
};

/// A flat per-item output record.
pub type Record = Map<String, Value>;

/// Default key under which the flattened response text is emitted.
pub const DEFAULT_RESPONSE_KEY: &str = "response";

/// A resolved (resource, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SessionCreate,
    SessionDelete,
    SessionGet,
    SessionList,
    SessionAbort,
    MessageSend,
    MessageSendAsync,
    MessageCommand,
    MessageShell,
    MessageSkill,
    MessageList,
    MessageGet,
    ConfigGetProviders,
}

impl Action {
    /// Resolve the host's string pair; unknown pairs are rejected with
    /// [`Error::UnsupportedOperation`].
    pub fn resolve(resource: &str, operation: &str) -> Result<Self> {
        let action = match (resource, operation) {
            ("session", "create") => Action::SessionCreate,
            ("session", "delete") => Action::SessionDelete,
            ("session", "get") => Action::SessionGet,
            ("session", "list") => Action::SessionList,
            ("session", "abort") => Action::SessionAbort,
            ("message", "send") => Action::MessageSend,
            ("message", "sendAsync") => Action::MessageSendAsync,
            ("message", "command") => Action::MessageCommand,
            ("message", "shell") => Action::MessageShell,
            ("message", "skill") => Action::MessageSkill,
            ("message", "list") => Action::MessageList,
            ("message", "get") => Action::MessageGet,
            ("config", "getProviders") => Action::ConfigGetProviders,
            _ => {
                return Err(Error::UnsupportedOperation {
                    resource: resource.to_string(),
                    operation: operation.to_string(),
                })
            }
        };
        Ok(action)
    }
}

/// How message-sending actions pick their session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Use `session_id` from the parameters.
    #[default]
    Existing,
    /// Create an ephemeral session for the call and delete it afterwards.
    Temporary,
}

/// Typed parameters for one work item.
#[derive(Debug, Clone)]
pub struct ActionParams {
    pub session_mode: SessionMode,
    pub session_id: Option<String>,
    /// Title for ephemeral sessions (temporary mode only).
    pub temp_session_title: Option<String>,
    pub message: Option<String>,
    /// Composite `providerID::modelID` selector.
    pub model: Option<String>,
    pub agent: Option<String>,
    pub system_prompt: Option<String>,
    pub no_reply: bool,
    pub command: Option<String>,
    /// Raw command argument string; JSON objects pass through, anything else
    /// is wrapped as `{"input": raw}`.
    pub command_arguments: Option<String>,
    pub shell_command: Option<String>,
    pub skill: Option<String>,
    /// Title for `session.create`.
    pub title: Option<String>,
    /// Page size for `message.list`.
    pub limit: Option<u32>,
    pub message_id: Option<String>,
    /// Emit only `{response_key: text}` instead of the full record.
    pub simple_response: bool,
    pub response_key: String,
    pub trim_response: bool,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            session_mode: SessionMode::default(),
            session_id: None,
            temp_session_title: None,
            message: None,
            model: None,
            agent: None,
            system_prompt: None,
            no_reply: false,
            command: None,
            command_arguments: None,
            shell_command: None,
            skill: None,
            title: None,
            limit: None,
            message_id: None,
            simple_response: true,
            response_key: DEFAULT_RESPONSE_KEY.to_string(),
            trim_response: true,
        }
    }
}

impl ActionParams {
    fn scope(&self) -> SessionScope {
        match self.session_mode {
            SessionMode::Existing => {
                SessionScope::Existing(self.session_id.clone().unwrap_or_default())
            }
            SessionMode::Temporary => SessionScope::Temporary {
                title: self.temp_session_title.clone(),
            },
        }
    }

    fn model_selector(&self) -> Result<Option<ModelSelector>> {
        match self.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Ok(Some(ModelSelector::decode(raw)?)),
            None => Ok(None),
        }
    }
}

/// Join all `text`-typed parts with newlines, in their original order.
pub fn flatten_text(parts: &[MessagePart], trim: bool) -> String {
    let joined = parts
        .iter()
        .filter_map(|part| match part {
            MessagePart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    if trim {
        joined.trim().to_string()
    } else {
        joined
    }
}

/// Collect tool-execution output from `tool`-typed parts: `state.output`
/// first, `state.metadata.output` when that is absent or empty. `None` when
/// no part yields anything.
pub fn tool_output(parts: &[MessagePart]) -> Option<String> {
    let outputs: Vec<&str> = parts
        .iter()
        .filter_map(|part| match part {
            MessagePart::Tool {
                state: Some(state), ..
            } => state
                .output
                .as_deref()
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    state
                        .metadata
                        .as_ref()
                        .and_then(|m| m.output.as_deref())
                        .filter(|s| !s.is_empty())
                }),
            _ => None,
        })
        .collect();
    if outputs.is_empty() {
        None
    } else {
        Some(outputs.join("\n"))
    }
}

/// Executes resolved actions against a [`Client`] and shapes the results into
/// per-item records.
#[derive(Clone)]
pub struct ActionRunner {
    client: Client,
}

impl ActionRunner {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Resolve and run one (resource, operation) over a list of items.
    ///
    /// Resolution failure bubbles immediately. Per-item failures become
    /// `{"error": message}` records when `continue_on_fail` is set, otherwise
    /// the first failure bubbles and processing stops.
    pub async fn run_items(
        &self,
        resource: &str,
        operation: &str,
        items: &[ActionParams],
        continue_on_fail: bool,
    ) -> Result<Vec<Record>> {
        let action = Action::resolve(resource, operation)?;
        let mut records = Vec::new();
        for params in items {
            match self.execute(action, params).await {
                Ok(item_records) => records.extend(item_records),
                Err(err) if continue_on_fail => {
                    tracing::warn!(
                        resource,
                        operation,
                        error = %err,
                        "item failed; continuing"
                    );
                    let mut record = Record::new();
                    record.insert("error".into(), Value::String(err.to_string()));
                    records.push(record);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    }

    /// Execute one action for one item. List-shaped actions emit one record
    /// per entity; everything else emits exactly one.
    pub async fn execute(&self, action: Action, params: &ActionParams) -> Result<Vec<Record>> {
        let sessions = self.client.sessions();
        match action {
            Action::SessionCreate => {
                let session = sessions.create(params.title.clone()).await?;
                Ok(vec![entity_record(&session)?])
            }
            Action::SessionList => {
                let list = sessions.list().await?;
                list.iter().map(entity_record).collect()
            }
            Action::SessionGet => {
                let id = require(&params.session_id, "sessionId")?;
                let session = sessions.get(id).await?;
                Ok(vec![entity_record(&session)?])
            }
            Action::SessionDelete => {
                let id = require(&params.session_id, "sessionId")?;
                sessions.delete(id).await?;
                let mut record = Record::new();
                record.insert("success".into(), Value::Bool(true));
                record.insert("id".into(), Value::String(id.to_string()));
                Ok(vec![record])
            }
            Action::SessionAbort => {
                let id = require(&params.session_id, "sessionId")?;
                let value = sessions.abort(id).await?;
                let record = match value {
                    Value::Object(map) => map,
                    _ => {
                        let mut record = Record::new();
                        record.insert("success".into(), Value::Bool(true));
                        record
                    }
                };
                Ok(vec![record])
            }
            Action::MessageSend => {
                let req = self.build_send_request(params, None)?;
                let runner = sessions.clone();
                let message = sessions
                    .with_session(params.scope(), move |id| async move {
                        runner.send_message(&id, &req).await
                    })
                    .await?;
                let text = flatten_text(&message.parts, params.trim_response);
                Ok(vec![self.message_record(params, &message, text)])
            }
            Action::MessageSendAsync => {
                let req = self.build_send_request(params, None)?;
                let runner = sessions.clone();
                let session_id = sessions
                    .with_session(params.scope(), move |id| async move {
                        runner.send_async(&id, &req).await?;
                        Ok(id)
                    })
                    .await?;
                let mut record = Record::new();
                record.insert("success".into(), Value::Bool(true));
                record.insert("sessionId".into(), Value::String(session_id));
                Ok(vec![record])
            }
            Action::MessageCommand => {
                let command = require(&params.command, "command")?.to_string();
                let arguments = CommandRequest::arguments_from_str(
                    params.command_arguments.as_deref().unwrap_or(""),
                );
                let req = CommandRequest {
                    command,
                    arguments,
                    message_id: params.message_id.clone(),
                    agent: params.agent.clone(),
                    model: params.model_selector()?,
                };
                let runner = sessions.clone();
                let message = sessions
                    .with_session(params.scope(), move |id| async move {
                        runner.command(&id, &req).await
                    })
                    .await?;
                let text = flatten_text(&message.parts, params.trim_response);
                Ok(vec![self.message_record(params, &message, text)])
            }
            Action::MessageShell => {
                let command = require(&params.shell_command, "shellCommand")?.to_string();
                let agent = require(&params.agent, "agent")?.to_string();
                let req = ShellRequest {
                    command,
                    agent,
                    model: params.model_selector()?,
                };
                let runner = sessions.clone();
                let message = sessions
                    .with_session(params.scope(), move |id| async move {
                        runner.shell(&id, &req).await
                    })
                    .await?;
                let text = tool_output(&message.parts)
                    .unwrap_or_else(|| flatten_text(&message.parts, params.trim_response));
                Ok(vec![self.message_record(params, &message, text)])
            }
            Action::MessageSkill => {
                let skill = require(&params.skill, "skill")?.to_string();
                let req = self.build_send_request(params, Some(skill))?;
                let runner = sessions.clone();
                let message = sessions
                    .with_session(params.scope(), move |id| async move {
                        runner.send_message(&id, &req).await
                    })
                    .await?;
                let text = tool_output(&message.parts)
                    .unwrap_or_else(|| flatten_text(&message.parts, params.trim_response));
                Ok(vec![self.message_record(params, &message, text)])
            }
            Action::MessageList => {
                let id = require(&params.session_id, "sessionId")?;
                let messages = sessions.list_messages(id, params.limit).await?;
                Ok(messages
                    .iter()
                    .map(|message| message_summary_record(message, params.trim_response))
                    .collect())
            }
            Action::MessageGet => {
                let id = require(&params.session_id, "sessionId")?;
                let message_id = require(&params.message_id, "messageId")?;
                let message = sessions.get_message(id, message_id).await?;
                Ok(vec![message_summary_record(
                    &message,
                    params.trim_response,
                )])
            }
            Action::ConfigGetProviders => {
                let providers = self.client.config().providers().await?;
                providers.iter().map(entity_record).collect()
            }
        }
    }

    fn build_send_request(
        &self,
        params: &ActionParams,
        skill: Option<String>,
    ) -> Result<SendMessageRequest> {
        let message = require(&params.message, "message")?;
        let mut req = SendMessageRequest::text(message);
        req.model = params.model_selector()?;
        req.agent = params.agent.clone();
        req.message_id = params.message_id.clone();
        req.system = params.system_prompt.clone();
        req.no_reply = params.no_reply.then_some(true);
        if let Some(skill) = skill {
            req.tools = Some([(skill, true)].into_iter().collect());
        }
        Ok(req)
    }

    fn message_record(&self, params: &ActionParams, message: &Message, text: String) -> Record {
        let mut record = Record::new();
        record.insert(params.response_key.clone(), Value::String(text));
        if params.simple_response {
            return record;
        }
        if let Some(info) = &message.info {
            insert_opt_str(&mut record, "messageId", &info.id);
            insert_opt_str(&mut record, "sessionId", &info.session_id);
            insert_opt_str(&mut record, "providerId", &info.provider_id);
            insert_opt_str(&mut record, "modelId", &info.model_id);
            if let Some(tokens) = &info.tokens {
                record.insert("tokens".into(), tokens.clone());
            }
            if let Some(cost) = info.cost {
                if let Some(cost) = serde_json::Number::from_f64(cost) {
                    record.insert("cost".into(), Value::Number(cost));
                }
            }
        }
        insert_opt_str(&mut record, "message", &params.message);
        insert_opt_str(&mut record, "model", &params.model);
        insert_opt_str(&mut record, "agent", &params.agent);
        record
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingParameter(name.to_string()))
}

fn insert_opt_str(record: &mut Record, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        record.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn entity_record<T: serde::Serialize>(entity: &T) -> Result<Record> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut record = Record::new();
            record.insert("value".into(), other);
            Ok(record)
        }
    }
}

fn message_summary_record(message: &Message, trim: bool) -> Record {
    let mut record = Record::new();
    record.insert(
        "text".into(),
        Value::String(flatten_text(&message.parts, trim)),
    );
    if let Some(info) = &message.info {
        insert_opt_str(&mut record, "messageId", &info.id);
        insert_opt_str(&mut record, "sessionId", &info.session_id);
        insert_opt_str(&mut record, "role", &info.role);
    }
    record
}
