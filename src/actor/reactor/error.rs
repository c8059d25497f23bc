use thiserror::Error;

use crate::layout_engine::LayoutError;
use crate::sys::host::HostError;
use crate::sys::window::WorkspaceId;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Layout pass failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("Host command failed: {0}")]
    Host(#[from] HostError),
    #[error("No row for workspace {0}")]
    UnknownWorkspace(WorkspaceId),
}
