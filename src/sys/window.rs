use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Stable host-assigned window identity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl WindowId {
    pub const fn new(id: u64) -> Self { WindowId(id) }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "w{}", self.0) }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkspaceId(pub u32);

impl WorkspaceId {
    pub const fn new(id: u32) -> Self { WorkspaceId(id) }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ws{}", self.0) }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Normal,
    Desktop,
    Dock,
    Dialog,
    ModalDialog,
    Toolbar,
    Menu,
    Utility,
    Splashscreen,
    Other,
}

/// The windowing protocol a client speaks. Only matters while a freshly
/// created window is waiting for its visual surface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    #[default]
    Wayland,
    X11,
    Unknown,
}

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[serde(transparent)]
    pub struct WindowFlags: u32 {
        const MINIMIZED = 1 << 0;
        const FULLSCREEN = 1 << 1;
        const MAXIMIZED_VERTICALLY = 1 << 2;
        const MAXIMIZED_HORIZONTALLY = 1 << 3;
        /// Pinned to every workspace ("sticky").
        const ON_ALL_WORKSPACES = 1 << 4;
        const ABOVE = 1 << 5;
    }
}

/// A snapshot of the non-geometric window attributes the core consumes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub window_type: WindowType,
    pub client_type: ClientType,
    pub flags: WindowFlags,
    pub transient_for: Option<WindowId>,
}

impl WindowInfo {
    pub fn is_minimized(&self) -> bool { self.flags.contains(WindowFlags::MINIMIZED) }

    pub fn is_fullscreen(&self) -> bool { self.flags.contains(WindowFlags::FULLSCREEN) }

    pub fn is_maximized_vertically(&self) -> bool {
        self.flags.contains(WindowFlags::MAXIMIZED_VERTICALLY)
    }

    pub fn is_on_all_workspaces(&self) -> bool {
        self.flags.contains(WindowFlags::ON_ALL_WORKSPACES)
    }
}
