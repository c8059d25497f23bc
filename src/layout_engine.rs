//! Row layout: the geometry pass, focus/order navigation, resize cycling,
//! and the per-workspace owner tying them to a registry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod engine;
pub mod navigator;
pub mod resize;
pub mod row;

pub use engine::{Admission, WorkspaceRow};
pub use resize::ResizeCycle;
pub use row::{PassOutcome, PassRequest, RowLayout, RowSettings, SkipReason};

use crate::sys::host::HostError;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("host command failed during layout: {0}")]
    Host(#[from] HostError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Direction along the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}
