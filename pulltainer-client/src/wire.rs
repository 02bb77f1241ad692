//! Request and response bodies that only exist on the wire.

use serde::{Deserialize, Serialize};

use pulltainer_core::{EnvPair, StackId};

#[derive(Debug, Deserialize)]
pub(crate) struct ImagesStatusResponse {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StackFileResponse {
    #[serde(rename = "StackFileContent")]
    pub stack_file_content: String,
}

/// Body of `PUT /api/stacks/{id}`. Prune and pull are always on.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateStackRequest<'a> {
    pub id: StackId,
    #[serde(rename = "StackFileContent")]
    pub stack_file_content: &'a str,
    #[serde(rename = "Env")]
    pub env: &'a [EnvPair],
    #[serde(rename = "Prune")]
    pub prune: bool,
    #[serde(rename = "Webhook")]
    pub webhook: &'a str,
    #[serde(rename = "PullImage")]
    pub pull_image: bool,
}
