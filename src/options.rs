//! Choice-list providers for UI dropdowns.
//!
//! Query methods stay honest and fallible; the "never empty" requirement of
//! dropdown UIs lives at the presentation boundary via [`or_sentinel`], which
//! substitutes exactly one sentinel entry on failure or empty success.

use crate::{
    client::Client,
    errors::Result,
    skills::SkillScanner,
    types::ModelSelector,
};

/// One selectable entry: what the user sees and what the parameter gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Read-only option queries against the server. No caching; every call
/// re-queries.
#[derive(Clone)]
pub struct OptionsClient {
    client: Client,
}

impl OptionsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sessions as options: label is the title (id when untitled), value the id.
    pub async fn sessions(&self) -> Result<Vec<ChoiceOption>> {
        let sessions = self.client.sessions().list().await?;
        Ok(sessions
            .into_iter()
            .map(|session| {
                let label = if session.title.trim().is_empty() {
                    session.id.clone()
                } else {
                    session.title
                };
                ChoiceOption::new(label, session.id)
            })
            .collect())
    }

    /// Every model of every provider, with the composite
    /// `providerID::modelID` selector as the value.
    pub async fn models(&self) -> Result<Vec<ChoiceOption>> {
        let providers = self.client.config().providers().await?;
        let mut options = Vec::new();
        for provider in providers {
            for (model_id, model) in &provider.models {
                let model_name = model.name.as_deref().unwrap_or(model_id);
                let selector = ModelSelector::new(&provider.id, model_id);
                options.push(ChoiceOption::new(
                    format!("{} / {}", provider.name, model_name),
                    selector.encode(),
                ));
            }
        }
        Ok(options)
    }

    pub async fn agents(&self) -> Result<Vec<ChoiceOption>> {
        let agents = self.client.config().agents().await?;
        Ok(agents
            .into_iter()
            .map(|agent| ChoiceOption::new(agent.name.clone(), agent.name))
            .collect())
    }

    pub async fn commands(&self) -> Result<Vec<ChoiceOption>> {
        let commands = self.client.config().commands().await?;
        Ok(commands
            .into_iter()
            .map(|command| {
                let label = match command.description.as_deref() {
                    Some(description) if !description.trim().is_empty() => {
                        format!("{}: {}", command.name, description)
                    }
                    _ => command.name.clone(),
                };
                ChoiceOption::new(label, command.name)
            })
            .collect())
    }
}

/// Skills discovered by `scanner`, name as both label and value.
pub fn skill_options(scanner: &SkillScanner) -> Vec<ChoiceOption> {
    scanner
        .scan()
        .into_iter()
        .map(|skill| {
            let label = match skill.description.as_deref() {
                Some(description) if !description.trim().is_empty() => {
                    format!("{}: {}", skill.name, description)
                }
                _ => skill.name.clone(),
            };
            ChoiceOption::new(label, skill.name)
        })
        .collect()
}

/// Presentation-boundary guard: a failed or empty query becomes exactly one
/// sentinel entry, so dropdown callers never see an empty set or an error.
pub fn or_sentinel(result: Result<Vec<ChoiceOption>>, sentinel: ChoiceOption) -> Vec<ChoiceOption> {
    match result {
        Ok(options) if !options.is_empty() => options,
        Ok(_) => vec![sentinel],
        Err(err) => {
            tracing::warn!(error = %err, "option query failed; substituting sentinel");
            vec![sentinel]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, RequestError};

    #[test]
    fn or_sentinel_passes_through_non_empty_lists() {
        let options = vec![ChoiceOption::new("A", "a")];
        let result = or_sentinel(Ok(options.clone()), ChoiceOption::new("none", ""));
        assert_eq!(result, options);
    }

    #[test]
    fn or_sentinel_substitutes_on_error() {
        let sentinel = ChoiceOption::new("Error loading options", "error");
        let result = or_sentinel(
            Err(Error::Request(RequestError::new("boom"))),
            sentinel.clone(),
        );
        assert_eq!(result, vec![sentinel]);
    }

    #[test]
    fn or_sentinel_substitutes_on_empty_success() {
        let sentinel = ChoiceOption::new("No sessions", "default");
        let result = or_sentinel(Ok(Vec::new()), sentinel.clone());
        assert_eq!(result, vec![sentinel]);
    }
}
