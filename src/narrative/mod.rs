//! Narrative service adapter
//!
//! Wraps the external generative-language service. Both requests always
//! produce a usable result: a missing API key or any call/parse failure is
//! logged and replaced by a fixed fallback, so callers never handle errors.

pub mod credentials;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use eyre::{Context, Result};
use lazy_regex::regex_captures;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agent::{Agent, StatDelta};
use crate::config::NarrativeConfig;
use crate::realm::RealmId;
pub use gemini::GeminiClient;

pub const MISSING_KEY_NARRATIVE: &str = "Simulation failed: API Key missing.";
pub const ANOMALY_NARRATIVE: &str = "The simulation encountered a temporal anomaly (Error calling AI).";

/// Shape the service is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
}

/// A generative text backend
#[async_trait]
pub trait NarrativeClient: Send + Sync {
    /// Generate raw text for a prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Narrative and trait changes produced by an experiment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentOutcome {
    pub narrative: String,
    pub stat_changes: StatDelta,
}

impl ExperimentOutcome {
    fn fallback(narrative: &str) -> Self {
        Self {
            narrative: narrative.to_string(),
            stat_changes: StatDelta::new(),
        }
    }
}

/// Parse an experiment payload, tolerating a markdown code fence around it
pub fn parse_outcome(text: &str) -> Result<ExperimentOutcome> {
    let body = match regex_captures!(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$", text) {
        Some((_, inner)) => inner,
        None => text.trim(),
    };
    if body.is_empty() {
        eyre::bail!("No response from narrative service");
    }
    serde_json::from_str(body).context("Failed to parse experiment outcome")
}

/// Total-success front for a [`NarrativeClient`]
#[derive(Clone)]
pub struct NarrativeAdapter {
    client: Option<Arc<dyn NarrativeClient>>,
}

impl NarrativeAdapter {
    pub fn new(client: Arc<dyn NarrativeClient>) -> Self {
        Self { client: Some(client) }
    }

    /// Adapter without credentials; every request degrades to its fallback
    pub fn offline() -> Self {
        Self { client: None }
    }

    /// Build a Gemini-backed adapter if an API key can be found
    pub fn from_config(config: &NarrativeConfig) -> Self {
        match credentials::load_api_key(&config.api_key_env, &crate::config::Config::jingjie_dir()) {
            Some(key) => {
                log::info!("Narrative service: {} via {}", config.model, config.endpoint);
                Self::new(Arc::new(GeminiClient::new(key, &config.model, &config.endpoint)))
            }
            None => {
                log::error!("{} is not set; narratives will use fallbacks", config.api_key_env);
                Self::offline()
            }
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.client.is_some()
    }

    /// Ask how `agent` reacts to `scenario` in `realm`
    pub async fn request_experiment_outcome(&self, agent: &Agent, scenario: &str, realm: RealmId) -> ExperimentOutcome {
        let Some(client) = &self.client else {
            log::error!("Experiment on {} skipped: API key missing", agent.id);
            return ExperimentOutcome::fallback(MISSING_KEY_NARRATIVE);
        };

        let request = GenerationRequest {
            prompt: prompt::experiment_prompt(agent, scenario, realm),
            format: ResponseFormat::Json,
        };

        let result = client.generate(&request).await.and_then(|text| parse_outcome(&text));
        match result {
            Ok(outcome) => {
                log::debug!("Experiment on {} resolved: {:?}", agent.id, outcome.stat_changes);
                outcome
            }
            Err(e) => {
                log::warn!("Experiment on {} failed: {:#}", agent.id, e);
                ExperimentOutcome::fallback(ANOMALY_NARRATIVE)
            }
        }
    }

    /// One-sentence narration of `agent` moving between realms
    pub async fn request_traversal_narrative(&self, agent: &Agent, from: RealmId, to: RealmId) -> String {
        let Some(client) = &self.client else {
            log::error!("Traversal narrative for {} skipped: API key missing", agent.id);
            return format!("{} moved from {} to {}.", agent.name, from, to);
        };

        let request = GenerationRequest {
            prompt: prompt::traversal_prompt(agent, from, to),
            format: ResponseFormat::Text,
        };

        match client.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => format!("{} has traversed.", agent.name),
            Err(e) => {
                log::warn!("Traversal narrative for {} failed: {:#}", agent.id, e);
                format!("{} has traversed safely.", agent.name)
            }
        }
    }
}

/// Scripted client for tests
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned responses in order; errors once the script runs out
    #[derive(Default)]
    pub struct ScriptedClient {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, text: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(text.to_string()));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.responses.lock().unwrap().push_back(Err(message.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NarrativeClient for ScriptedClient {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(eyre::eyre!(message)),
                None => Err(eyre::eyre!("script exhausted")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use crate::agent::{Trait, roster};

    fn einstein() -> Agent {
        roster::initial_agents().into_iter().find(|a| a.id == "einstein").unwrap()
    }

    #[test]
    fn test_parse_outcome_plain() {
        let outcome = parse_outcome(r#"{"narrative": "He smiles.", "statChanges": {"ethics": 5}}"#).unwrap();
        assert_eq!(outcome.narrative, "He smiles.");
        assert_eq!(outcome.stat_changes.get(Trait::Ethics), Some(5));
    }

    #[test]
    fn test_parse_outcome_fenced() {
        let text = "```json\n{\"narrative\": \"Dice.\", \"statChanges\": {\"science\": -2}}\n```";
        let outcome = parse_outcome(text).unwrap();
        assert_eq!(outcome.stat_changes.get(Trait::Science), Some(-2));
    }

    #[test]
    fn test_parse_outcome_rejects_wrong_shape() {
        assert!(parse_outcome(r#"{"story": "x"}"#).is_err());
        assert!(parse_outcome(r#"{"narrative": "x"}"#).is_err());
        assert!(parse_outcome("not json").is_err());
        assert!(parse_outcome("   ").is_err());
    }

    #[tokio::test]
    async fn test_offline_experiment_fallback() {
        let adapter = NarrativeAdapter::offline();
        let outcome = adapter
            .request_experiment_outcome(&einstein(), "Play dice.", RealmId::Solvay)
            .await;
        assert_eq!(outcome.narrative, MISSING_KEY_NARRATIVE);
        assert!(outcome.stat_changes.is_noop());
    }

    #[tokio::test]
    async fn test_experiment_success() {
        let client = Arc::new(ScriptedClient::new().respond(
            r#"{"narrative": "God does not play dice.", "statChanges": {"philosophy": 3, "science": -1}}"#,
        ));
        let adapter = NarrativeAdapter::new(client.clone());
        let outcome = adapter
            .request_experiment_outcome(&einstein(), "Play dice.", RealmId::Solvay)
            .await;
        assert_eq!(outcome.narrative, "God does not play dice.");
        assert_eq!(outcome.stat_changes.impact_summary(), "Philosophy +3, Science -1");

        let prompts = client.prompts();
        assert!(prompts[0].contains("Albert Einstein (Modern Era)"));
        assert!(prompts[0].contains("Play dice."));
        assert!(prompts[0].contains("Science(98)"));
    }

    #[tokio::test]
    async fn test_experiment_call_failure() {
        let adapter = NarrativeAdapter::new(Arc::new(ScriptedClient::new().fail("503")));
        let outcome = adapter
            .request_experiment_outcome(&einstein(), "Play dice.", RealmId::Solvay)
            .await;
        assert_eq!(outcome.narrative, ANOMALY_NARRATIVE);
        assert!(outcome.stat_changes.is_noop());
    }

    #[tokio::test]
    async fn test_experiment_unparseable_payload() {
        let adapter = NarrativeAdapter::new(Arc::new(ScriptedClient::new().respond("I refuse.")));
        let outcome = adapter
            .request_experiment_outcome(&einstein(), "Play dice.", RealmId::Solvay)
            .await;
        assert_eq!(outcome.narrative, ANOMALY_NARRATIVE);
    }

    #[tokio::test]
    async fn test_traversal_narratives() {
        let agent = einstein();

        let offline = NarrativeAdapter::offline();
        assert_eq!(
            offline
                .request_traversal_narrative(&agent, RealmId::Solvay, RealmId::Lanting)
                .await,
            "Albert Einstein moved from solvay to lanting."
        );

        let client = Arc::new(ScriptedClient::new().respond("  Equations dissolve into ink.\n").respond("").fail("boom"));
        let adapter = NarrativeAdapter::new(client);
        assert_eq!(
            adapter
                .request_traversal_narrative(&agent, RealmId::Solvay, RealmId::Lanting)
                .await,
            "Equations dissolve into ink."
        );
        assert_eq!(
            adapter
                .request_traversal_narrative(&agent, RealmId::Solvay, RealmId::Lanting)
                .await,
            "Albert Einstein has traversed."
        );
        assert_eq!(
            adapter
                .request_traversal_narrative(&agent, RealmId::Solvay, RealmId::Lanting)
                .await,
            "Albert Einstein has traversed safely."
        );
    }
}
