//! Blocking Portainer HTTP client.
//!
//! Every request carries the static `X-API-Key` header and is bounded by the
//! configured timeout. No retries: the next scheduled pass is the retry.

use serde::de::DeserializeOwned;
use url::Url;

use pulltainer_core::{ImageStatusReport, Settings, Stack, StackDefinition, StackId};

use crate::error::ApiError;
use crate::wire::{ImagesStatusResponse, StackFileResponse, UpdateStackRequest};
use crate::StackApi;

pub const API_KEY_HEADER: &str = "X-API-Key";

const LIST_STACKS: &str = "list stacks";
const IMAGE_STATUS: &str = "image status";
const STACK_FILE: &str = "stack file";
const UPDATE_STACK: &str = "update stack";

/// [`StackApi`] over HTTP, backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct PortainerClient {
    agent: ureq::Agent,
    base_url: Url,
    api_key: String,
}

impl PortainerClient {
    pub fn new(settings: &Settings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.request_timeout)
            .user_agent(concat!("pulltainer/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// `base_url` + `/api/<segments...>`, keeping any path prefix of the base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &Url,
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, operation, "GET");
        let response = self
            .agent
            .request_url("GET", url)
            .set(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(|err| classify(operation, err))?;
        let body = response
            .into_string()
            .map_err(|err| ApiError::transport(operation, format!("read body: {err}")))?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { operation, source })
    }
}

impl StackApi for PortainerClient {
    fn list_stacks(&self) -> Result<Vec<Stack>, ApiError> {
        let url = self.endpoint(&["stacks"])?;
        self.get_json(LIST_STACKS, &url)
    }

    fn image_status(&self, id: StackId) -> Result<ImageStatusReport, ApiError> {
        let url = self.endpoint(&["stacks", &id.to_string(), "images_status"])?;
        let data: ImagesStatusResponse = self.get_json(IMAGE_STATUS, &url)?;
        Ok(ImageStatusReport {
            status: data.status.into(),
            message: data.message.filter(|m| !m.is_empty()),
        })
    }

    fn stack_file(&self, id: StackId) -> Result<StackDefinition, ApiError> {
        let url = self.endpoint(&["stacks", &id.to_string(), "file"])?;
        let data: StackFileResponse = self.get_json(STACK_FILE, &url)?;
        Ok(StackDefinition(data.stack_file_content))
    }

    fn update_stack(&self, stack: &Stack, definition: &StackDefinition) -> Result<(), ApiError> {
        let mut url = self.endpoint(&["stacks", &stack.id.to_string()])?;
        // Portainer picks the target environment from the query, not the body.
        url.query_pairs_mut()
            .append_pair("endpointId", &stack.endpoint_id.to_string());

        let body = UpdateStackRequest {
            id: stack.id,
            stack_file_content: definition.as_str(),
            env: &stack.env,
            prune: true,
            webhook: &stack.webhook,
            pull_image: true,
        };

        tracing::debug!(%url, stack = %stack.name, "PUT");
        let response = self
            .agent
            .request_url("PUT", &url)
            .set(API_KEY_HEADER, &self.api_key)
            .send_json(&body)
            .map_err(|err| classify(UPDATE_STACK, err))?;

        let status = response.status();
        if status != 200 {
            let body = response.into_string().unwrap_or_default();
            return Err(ApiError::rejected(UPDATE_STACK, status, body));
        }
        Ok(())
    }
}

fn classify(operation: &'static str, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ApiError::rejected(operation, status, body.trim())
        }
        ureq::Error::Transport(transport) => ApiError::transport(operation, transport.to_string()),
    }
}
