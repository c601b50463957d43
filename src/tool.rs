//! Callable-tool adapter: the assistant as a single named tool that takes a
//! free-text argument and returns the flattened reply.

use crate::{
    actions::flatten_text,
    client::Client,
    errors::Result,
    sessions::SessionScope,
    types::{ModelSelector, SendMessageRequest},
};

const DEFAULT_TOOL_NAME: &str = "coding_assistant";
const DEFAULT_TOOL_DESCRIPTION: &str =
    "Send a task to the remote coding assistant and return its reply as plain text.";

/// Wraps the send-message path behind a callable interface with
/// simple-response semantics. Unless bound to an existing session, every call
/// runs in its own ephemeral session.
#[derive(Clone)]
pub struct AssistantTool {
    client: Client,
    name: String,
    description: String,
    session_id: Option<String>,
    model: Option<ModelSelector>,
    agent: Option<String>,
}

impl AssistantTool {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            name: DEFAULT_TOOL_NAME.to_string(),
            description: DEFAULT_TOOL_DESCRIPTION.to_string(),
            session_id: None,
            model: None,
            agent: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Bind all calls to an existing session instead of ephemeral ones.
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Send `input` as one message and return the flattened, trimmed reply.
    pub async fn call(&self, input: &str) -> Result<String> {
        let scope = match &self.session_id {
            Some(id) => SessionScope::Existing(id.clone()),
            None => SessionScope::Temporary {
                title: Some(format!("Tool: {}", self.name)),
            },
        };
        let mut req = SendMessageRequest::text(input);
        req.model = self.model.clone();
        req.agent = self.agent.clone();

        let sessions = self.client.sessions();
        let runner = sessions.clone();
        let message = sessions
            .with_session(scope, move |id| async move {
                runner.send_message(&id, &req).await
            })
            .await?;
        Ok(flatten_text(&message.parts, true))
    }
}
