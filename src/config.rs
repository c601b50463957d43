//! Read-side catalog client: providers, agents, commands.
//!
//! Every call queries the server fresh; nothing is cached, so two loads may
//! disagree if the remote configuration changes between them.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    errors::Result,
    types::{Agent, Command, Provider, ProvidersResponse},
};

#[derive(Clone)]
pub struct ConfigClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl ConfigClient {
    /// List configured providers and their models. `GET /config/providers`.
    pub async fn providers(&self) -> Result<Vec<Provider>> {
        let path = "/config/providers";
        let builder = self.inner.request(Method::GET, path)?;
        let resp: ProvidersResponse = self.inner.execute_json(builder, &Method::GET, path).await?;
        Ok(resp.providers)
    }

    /// List available agents. `GET /agent`.
    pub async fn agents(&self) -> Result<Vec<Agent>> {
        let path = "/agent";
        let builder = self.inner.request(Method::GET, path)?;
        self.inner.execute_json(builder, &Method::GET, path).await
    }

    /// List available commands. `GET /command`.
    pub async fn commands(&self) -> Result<Vec<Command>> {
        let path = "/command";
        let builder = self.inner.request(Method::GET, path)?;
        self.inner.execute_json(builder, &Method::GET, path).await
    }
}
