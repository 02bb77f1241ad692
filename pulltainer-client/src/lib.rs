//! # pulltainer-client
//!
//! The four Portainer stack operations the reconciler depends on, behind the
//! [`StackApi`] trait, and [`PortainerClient`], the blocking HTTP
//! implementation of it.

pub mod error;
pub mod portainer;
mod wire;

use pulltainer_core::{ImageStatusReport, Stack, StackDefinition, StackId};

pub use error::ApiError;
pub use portainer::PortainerClient;

/// Remote stack management operations.
///
/// Implementations hold no per-call state and are called sequentially.
pub trait StackApi: Send + Sync {
    /// `GET /api/stacks`, in the order the API returns them.
    fn list_stacks(&self) -> Result<Vec<Stack>, ApiError>;

    /// `GET /api/stacks/{id}/images_status`.
    fn image_status(&self, id: StackId) -> Result<ImageStatusReport, ApiError>;

    /// `GET /api/stacks/{id}/file`.
    fn stack_file(&self, id: StackId) -> Result<StackDefinition, ApiError>;

    /// `PUT /api/stacks/{id}?endpointId=..` with pruning and forced pulls.
    fn update_stack(&self, stack: &Stack, definition: &StackDefinition) -> Result<(), ApiError>;
}

impl<T: StackApi + ?Sized> StackApi for &T {
    fn list_stacks(&self) -> Result<Vec<Stack>, ApiError> {
        (**self).list_stacks()
    }

    fn image_status(&self, id: StackId) -> Result<ImageStatusReport, ApiError> {
        (**self).image_status(id)
    }

    fn stack_file(&self, id: StackId) -> Result<StackDefinition, ApiError> {
        (**self).stack_file(id)
    }

    fn update_stack(&self, stack: &Stack, definition: &StackDefinition) -> Result<(), ApiError> {
        (**self).update_stack(stack, definition)
    }
}
