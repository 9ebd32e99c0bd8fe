//! Roadmap generation service
//!
//! Sends a prompt to the inference server and decodes the answer into a
//! roadmap tree.

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{self, ChildrenPolicy, PromptBuilder, RoadmapNode};
use crate::infrastructure::traits::HttpTransport;

/// Service for generating and parsing roadmaps.
pub struct RoadmapService {
    settings: Arc<Settings>,
    transport: Arc<dyn HttpTransport>,
    prompts: PromptBuilder,
}

impl RoadmapService {
    /// Create a new roadmap service.
    pub fn new(settings: Arc<Settings>, transport: Arc<dyn HttpTransport>) -> Self {
        let prompts =
            PromptBuilder::new(settings.model_name.clone()).with_json_format(settings.json_format);
        Self {
            settings,
            transport,
            prompts,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Send `user_prompt` to the model and return its raw textual answer.
    ///
    /// Fails with `Transport` when the server cannot be reached, `Remote` on a
    /// 4xx/5xx status and `Schema` when the envelope has no `response` field.
    #[instrument(skip(self, user_prompt), fields(model = %self.settings.model_name))]
    pub fn generate_json(&self, user_prompt: &str) -> ApplicationResult<String> {
        let request = self.prompts.build(user_prompt);
        let body = request.to_json().map_err(domain::SchemaError::from)?;
        debug!("sending request to inference server");
        trace!(%body, "request body");

        let raw = self.invoke(body)?;
        trace!(%raw, "raw response");

        let answer = domain::extract_answer(&raw)?;
        debug!(chars = answer.len(), "model answer extracted");
        Ok(answer)
    }

    /// Parse a roadmap document using the configured children policy.
    pub fn parse_tree(&self, json: &str) -> ApplicationResult<RoadmapNode> {
        let policy = ChildrenPolicy::from_strict(self.settings.strict_children);
        Ok(domain::parse_tree_with(json, policy)?)
    }

    /// `generate_json` followed by `parse_tree`.
    pub fn generate_roadmap(&self, user_prompt: &str) -> ApplicationResult<RoadmapNode> {
        let answer = self.generate_json(user_prompt)?;
        self.parse_tree(&answer)
    }

    /// POST to the generate endpoint; 4xx/5xx become `Remote` errors.
    fn invoke(&self, body: String) -> ApplicationResult<String> {
        let endpoint = self.settings.generate_endpoint();
        let response = self.transport.post_json(&endpoint, body)?;

        if response.is_error() {
            warn!(
                status = response.status,
                body = %response.body,
                "inference server returned an error status"
            );
            return Err(ApplicationError::Remote {
                status: response.status,
                body: response.body,
            });
        }

        debug!(status = response.status, "response received");
        Ok(response.body)
    }
}
