//! Focus and order queries over a row.

use super::Direction;
use crate::sys::host::Host;
use crate::sys::window::{WindowId, WorkspaceId};

/// Index of the most recently focused row window.
///
/// Walks the host's activation order for the workspace, skipping windows
/// without a surface (they are most likely closing).
pub fn last_focused_index(row: &[WindowId], host: &dyn Host, workspace: WorkspaceId) -> Option<usize> {
    host.tab_list(workspace)
        .into_iter()
        .filter(|&wid| host.has_surface(wid))
        .find_map(|wid| row.iter().position(|&w| w == wid))
}

/// The nearest non-minimized index in `direction`. Never wraps.
pub fn step(row: &[WindowId], host: &dyn Host, from: usize, direction: Direction) -> Option<usize> {
    let visible = |i: &usize| {
        host.window_info(row[*i]).is_some_and(|info| !info.is_minimized())
    };
    match direction {
        Direction::Right => (from + 1..row.len()).find(visible),
        Direction::Left => (0..from.min(row.len())).rev().find(visible),
    }
}
