//! The narrow capability interface the core uses to talk to the window
//! system.
//!
//! Everything the layout core knows about windows comes from these queries,
//! and everything it does to them goes through these commands. Notifications
//! flow the other way as [`crate::actor::reactor::Event`] messages, which an
//! implementation delivers for the `(window, signal)` pairs that were
//! connected through it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use super::geometry::{Point, Rect};
use super::window::{WindowId, WindowInfo, WorkspaceId};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width: i32,
    pub height: i32,
    /// UI scale factor (1 on regular displays, 2 on HiDPI).
    pub scale_factor: i32,
    /// Height reserved at the top of the display by the shell panel.
    pub panel_height: i32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        DisplayMetrics {
            width: 1920,
            height: 1080,
            scale_factor: 1,
            panel_height: 32,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum WindowSignal {
    PositionChanged,
    SizeChanged,
    Focus,
    Shown,
    Unmanaging,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DisplaySignal {
    WindowCreated,
}

/// Token returned by the host for a live connection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHandle(pub u64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("window {0} is not known to the host")]
    UnknownWindow(WindowId),
    #[error("window {0} has no visual surface")]
    NoSurface(WindowId),
    #[error("host rejected request: {0}")]
    Rejected(String),
}

pub trait Host {
    fn display_metrics(&self) -> DisplayMetrics;

    /// Whether the overview/expose mode is currently shown.
    fn overview_visible(&self) -> bool;

    fn workspaces(&self) -> Vec<WorkspaceId>;

    fn active_workspace(&self) -> Option<WorkspaceId>;

    fn workspace_windows(&self, workspace: WorkspaceId) -> Vec<WindowId>;

    /// Most-recently-used activation order of the windows on `workspace`.
    fn tab_list(&self, workspace: WorkspaceId) -> Vec<WindowId>;

    /// The window currently holding input focus.
    fn focus_window(&self) -> Option<WindowId>;

    fn window_info(&self, wid: WindowId) -> Option<WindowInfo>;

    fn frame_rect(&self, wid: WindowId) -> Option<Rect>;

    fn buffer_rect(&self, wid: WindowId) -> Option<Rect>;

    /// Position of the window's live visual surface, `None` while the window
    /// has not materialized (or is already being torn down).
    fn surface_position(&self, wid: WindowId) -> Option<Point>;

    fn transient_children(&self, wid: WindowId) -> Vec<WindowId>;

    fn pointer(&self) -> Point;

    /// Timestamp token used for focus transfer.
    fn current_time(&self) -> u32;

    fn has_surface(&self, wid: WindowId) -> bool { self.surface_position(wid).is_some() }

    fn has_focus(&self, wid: WindowId) -> bool { self.focus_window() == Some(wid) }

    /// Authoritative frame-level move.
    fn move_frame(&mut self, wid: WindowId, position: Point) -> Result<(), HostError>;

    fn move_resize_frame(&mut self, wid: WindowId, frame: Rect) -> Result<(), HostError>;

    fn set_surface_position(&mut self, wid: WindowId, position: Point) -> Result<(), HostError>;

    /// Animate the visual surface towards `position`. Fire-and-forget; a newer
    /// request for the same window retargets the animation.
    fn ease_surface(
        &mut self,
        wid: WindowId,
        position: Point,
        duration: Duration,
    ) -> Result<(), HostError>;

    /// Raise the window and transfer input focus to it.
    fn activate(&mut self, wid: WindowId, timestamp: u32) -> Result<(), HostError>;

    /// Pin to all workspaces and keep above (or undo both).
    fn set_floating(&mut self, wid: WindowId, floating: bool) -> Result<(), HostError>;

    fn connect_window(&mut self, wid: WindowId, signal: WindowSignal) -> SignalHandle;

    fn disconnect_window(&mut self, wid: WindowId, handle: SignalHandle);

    fn connect_display(&mut self, signal: DisplaySignal) -> SignalHandle;

    fn disconnect_display(&mut self, handle: SignalHandle);

    /// Subscribe to window-added/window-removed for `workspace`.
    fn connect_workspace(&mut self, workspace: WorkspaceId) -> SignalHandle;

    fn disconnect_workspace(&mut self, workspace: WorkspaceId, handle: SignalHandle);
}
