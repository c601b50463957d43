//! Sessions API client: CRUD, message operations, and the ephemeral-session
//! lifecycle helper.
//!
//! Sessions live on the remote server; this client only references them by id.
//! Message-sending operations can run against an existing session or inside a
//! temporary one that is created for the call and deleted afterwards,
//! best-effort.
//!
//! # Example
//!
//! ```rust,ignore
//! use opencode_client::{Client, Config, SendMessageRequest, SessionScope};
//!
//! let client = Client::new(Config::default())?;
//! let sessions = client.sessions();
//!
//! let runner = sessions.clone();
//! let reply = sessions
//!     .with_session(SessionScope::Temporary { title: None }, move |id| async move {
//!         runner.send_message(&id, &SendMessageRequest::text("hello")).await
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    errors::{Error, Result},
    types::{
        CommandRequest, Message, SendMessageRequest, Session, SessionCreateRequest, ShellRequest,
    },
};

/// Title given to ephemeral sessions when the caller does not name one.
pub const TEMPORARY_SESSION_TITLE: &str = "Temporary session";

/// How a message-sending call is scoped to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    /// Run against an existing session id; nothing is created or deleted.
    Existing(String),
    /// Create a session for the call, delete it afterwards (best-effort).
    Temporary { title: Option<String> },
}

/// Client for session operations.
#[derive(Clone)]
pub struct SessionsClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl SessionsClient {
    /// List sessions. `GET /session`.
    pub async fn list(&self) -> Result<Vec<Session>> {
        let path = "/session";
        let builder = self.inner.request(Method::GET, path)?;
        self.inner.execute_json(builder, &Method::GET, path).await
    }

    /// Fetch one session. `GET /session/:id`.
    pub async fn get(&self, id: &str) -> Result<Session> {
        let path = format!("/session/{}", urlencoding::encode(id));
        let builder = self.inner.request(Method::GET, &path)?;
        self.inner.execute_json(builder, &Method::GET, &path).await
    }

    /// Create a session. `POST /session`.
    pub async fn create(&self, title: Option<String>) -> Result<Session> {
        let path = "/session";
        let req = SessionCreateRequest { title };
        let builder = self.inner.request(Method::POST, path)?.json(&req);
        self.inner.execute_json(builder, &Method::POST, path).await
    }

    /// Delete a session. `DELETE /session/:id`. The response body is ignored.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/session/{}", urlencoding::encode(id));
        let builder = self.inner.request(Method::DELETE, &path)?;
        self.inner
            .execute_empty(builder, &Method::DELETE, &path)
            .await
    }

    /// Abort whatever the session is currently doing.
    /// `POST /session/:id/abort`. Returns the response body when it parses as
    /// JSON, `Value::Null` otherwise.
    pub async fn abort(&self, id: &str) -> Result<serde_json::Value> {
        let path = format!("/session/{}/abort", urlencoding::encode(id));
        let builder = self.inner.request(Method::POST, &path)?;
        self.inner.execute_value(builder, &Method::POST, &path).await
    }

    /// Send a message and wait for the assistant's reply.
    /// `POST /session/:id/message`.
    pub async fn send_message(&self, id: &str, req: &SendMessageRequest) -> Result<Message> {
        let path = format!("/session/{}/message", urlencoding::encode(id));
        let builder = self.inner.request(Method::POST, &path)?.json(req);
        self.inner.execute_json(builder, &Method::POST, &path).await
    }

    /// Fire-and-forget send. `POST /session/:id/prompt_async`. The response
    /// body is ignored.
    pub async fn send_async(&self, id: &str, req: &SendMessageRequest) -> Result<()> {
        let path = format!("/session/{}/prompt_async", urlencoding::encode(id));
        let builder = self.inner.request(Method::POST, &path)?.json(req);
        self.inner
            .execute_empty(builder, &Method::POST, &path)
            .await
    }

    /// Run a named command in the session. `POST /session/:id/command`.
    pub async fn command(&self, id: &str, req: &CommandRequest) -> Result<Message> {
        let path = format!("/session/{}/command", urlencoding::encode(id));
        let builder = self.inner.request(Method::POST, &path)?.json(req);
        self.inner.execute_json(builder, &Method::POST, &path).await
    }

    /// Run a shell command in the session. `POST /session/:id/shell`.
    pub async fn shell(&self, id: &str, req: &ShellRequest) -> Result<Message> {
        let path = format!("/session/{}/shell", urlencoding::encode(id));
        let builder = self.inner.request(Method::POST, &path)?.json(req);
        self.inner.execute_json(builder, &Method::POST, &path).await
    }

    /// List messages in a session, newest last.
    /// `GET /session/:id/message?limit=N`.
    pub async fn list_messages(&self, id: &str, limit: Option<u32>) -> Result<Vec<Message>> {
        let mut path = format!("/session/{}/message", urlencoding::encode(id));
        if let Some(limit) = limit {
            path = format!("{path}?limit={limit}");
        }
        let builder = self.inner.request(Method::GET, &path)?;
        self.inner.execute_json(builder, &Method::GET, &path).await
    }

    /// Fetch one message. `GET /session/:id/message/:msgId`.
    pub async fn get_message(&self, id: &str, message_id: &str) -> Result<Message> {
        let path = format!(
            "/session/{}/message/{}",
            urlencoding::encode(id),
            urlencoding::encode(message_id)
        );
        let builder = self.inner.request(Method::GET, &path)?;
        self.inner.execute_json(builder, &Method::GET, &path).await
    }

    /// Run `action` against a session chosen by `scope`.
    ///
    /// In [`SessionScope::Existing`] mode the id must be non-empty
    /// ([`Error::MissingParameter`] otherwise) and nothing is created or
    /// deleted. In [`SessionScope::Temporary`] mode a session is created
    /// first and exactly one delete attempt is made after the action,
    /// whatever its outcome. Deletion failure is logged and swallowed; the
    /// action's own result is always what the caller sees.
    pub async fn with_session<F, Fut, T>(&self, scope: SessionScope, action: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match scope {
            SessionScope::Existing(id) => {
                if id.trim().is_empty() {
                    return Err(Error::MissingParameter("sessionId".into()));
                }
                action(id).await
            }
            SessionScope::Temporary { title } => {
                let title = title.unwrap_or_else(|| TEMPORARY_SESSION_TITLE.to_string());
                let session = self.create(Some(title)).await?;
                let outcome = action(session.id.clone()).await;
                if let Err(err) = self.delete(&session.id).await {
                    tracing::warn!(
                        session_id = %session.id,
                        error = %err,
                        "failed to delete temporary session"
                    );
                }
                outcome
            }
        }
    }
}
