//! One workspace's row: registry, layout and the operations on top.

use tracing::{debug, info, trace};

use super::navigator::{last_focused_index, step};
use super::row::{RowLayout, RowSettings, move_window};
use super::{Direction, LayoutError, PassOutcome, PassRequest};
use crate::model::{Classification, WindowRegistry, classify};
use crate::sys::geometry::Point;
use crate::sys::host::{Host, HostError};
use crate::sys::window::{WindowId, WorkspaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    AlreadyManaged,
    Ignored,
    Managed { index: usize },
    /// The host no longer knows the window.
    Vanished,
}

#[derive(Debug)]
pub struct WorkspaceRow {
    registry: WindowRegistry,
    layout: RowLayout,
    preposition: bool,
}

impl WorkspaceRow {
    pub fn new(workspace: WorkspaceId, settings: RowSettings, preposition: bool) -> Self {
        Self {
            registry: WindowRegistry::new(workspace),
            layout: RowLayout::new(settings),
            preposition,
        }
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.registry.workspace()
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn managed(&self) -> &[WindowId] {
        self.registry.managed()
    }

    pub fn settings(&self) -> &RowSettings {
        self.layout.settings()
    }

    pub fn is_active(&self, host: &dyn Host) -> bool {
        host.active_workspace() == Some(self.workspace())
    }

    pub fn load(&mut self, host: &mut dyn Host) {
        self.registry.initial_load(host);
    }

    pub fn teardown(&mut self, host: &mut dyn Host) {
        self.registry.teardown(host);
    }

    pub fn rearrange(
        &self,
        host: &mut dyn Host,
        request: PassRequest,
    ) -> Result<PassOutcome, LayoutError> {
        self.layout.rearrange(self.registry.managed(), host, request)
    }

    pub fn last_focused(&self, host: &dyn Host) -> Option<WindowId> {
        last_focused_index(self.managed(), host, self.workspace()).map(|i| self.managed()[i])
    }

    /// Admits a materialized window into the row, or starts watching its
    /// focus when it does not belong in the row.
    ///
    /// A managed window is inserted right after the last focused window. The
    /// caller is expected to present it with a visible pass once the host
    /// has finished showing it.
    pub fn admit(&mut self, host: &mut dyn Host, wid: WindowId) -> Result<Admission, LayoutError> {
        if let Some(index) = self.registry.index_of(wid) {
            info!(?wid, index, "Window already managed, ignoring");
            return Ok(Admission::AlreadyManaged);
        }
        let Some(window) = host.window_info(wid) else {
            debug!(?wid, "Window vanished before admission");
            return Ok(Admission::Vanished);
        };

        if classify(&window) == Classification::Ignored {
            debug!(?wid, title = %window.title, "Ignoring window, watching focus only");
            self.registry.subscribe_ignored(host, wid);
            if let Some(base) = self.last_focused(host) {
                self.rearrange(host, PassRequest::new(base, false, false))?;
            }
            return Ok(Admission::Ignored);
        }

        let reference = last_focused_index(self.managed(), host, self.workspace());
        let Some(index) = self.registry.insert_after(reference, wid) else {
            return Ok(Admission::AlreadyManaged);
        };
        debug!(?wid, index, "Inserted window");
        self.registry.subscribe_managed(host, wid);

        if self.preposition
            && let Some(reference) = reference.map(|i| self.managed()[i])
        {
            self.preposition_after(host, wid, reference)?;
        }
        Ok(Admission::Managed { index })
    }

    fn preposition_after(
        &self,
        host: &mut dyn Host,
        wid: WindowId,
        reference: WindowId,
    ) -> Result<(), HostError> {
        let (Some(reference), Some(frame)) = (host.frame_rect(reference), host.frame_rect(wid))
        else {
            return Ok(());
        };
        let metrics = host.display_metrics();
        let spacing = self.settings().spacing(&metrics);
        let target = Point::new(reference.max_x() + spacing, frame.origin.y);
        trace!(?wid, ?target, "Prepositioning");
        move_window(host, wid, target, false, self.settings().move_duration, &metrics)
    }

    /// Forgets the window. No pass runs; the host's follow-up focus change
    /// takes care of the layout.
    pub fn remove(&mut self, host: &mut dyn Host, wid: WindowId) -> Option<usize> {
        let index = self.registry.remove(host, wid);
        debug!(?wid, ?index, "Removed window");
        index
    }

    /// Takes a window out of the row, keeping its focus watched.
    pub fn demote(&mut self, host: &mut dyn Host, wid: WindowId) -> Option<usize> {
        self.registry.demote(host, wid)
    }

    pub fn on_position_changed(
        &self,
        host: &mut dyn Host,
        wid: WindowId,
    ) -> Result<PassOutcome, LayoutError> {
        self.rearrange(host, PassRequest::new(wid, false, false))
    }

    pub fn on_size_changed(
        &self,
        host: &mut dyn Host,
        wid: WindowId,
    ) -> Result<PassOutcome, LayoutError> {
        let show = host.has_focus(wid);
        self.rearrange(host, PassRequest::new(wid, show, false))
    }

    pub fn on_focus(&self, host: &mut dyn Host, wid: WindowId) -> Result<PassOutcome, LayoutError> {
        self.rearrange(host, PassRequest::new(wid, true, true))
    }

    /// Focus landed on a window outside the row, typically a dialog.
    ///
    /// When the dialog belongs to a row window, that owner is shown.
    /// Otherwise the row is refreshed in place around the last focused
    /// window.
    pub fn on_ignored_focus(
        &self,
        host: &mut dyn Host,
        wid: WindowId,
    ) -> Result<Option<PassOutcome>, LayoutError> {
        if !self.is_active(host) || self.registry.is_empty() {
            return Ok(None);
        }
        let root = transient_root(host, wid);
        if self.registry.contains(root) {
            return self.rearrange(host, PassRequest::new(root, true, true)).map(Some);
        }
        let Some(base) = self.last_focused(host) else { return Ok(None) };
        self.rearrange(host, PassRequest::new(base, false, true)).map(Some)
    }

    pub fn on_overview_hidden(
        &self,
        host: &mut dyn Host,
    ) -> Result<Option<PassOutcome>, LayoutError> {
        if !self.is_active(host) {
            return Ok(None);
        }
        let Some(focus) = host.focus_window() else { return Ok(None) };
        self.rearrange(host, PassRequest::new(focus, true, true)).map(Some)
    }

    /// The last focused window, provided it also holds the real focus.
    fn focused_in_row(&self, host: &dyn Host) -> Option<(usize, WindowId)> {
        let index = last_focused_index(self.managed(), host, self.workspace())?;
        let wid = self.managed()[index];
        if host.focus_window() != Some(wid) {
            debug!(?wid, focus = ?host.focus_window(), "Focus is outside the row");
            return None;
        }
        Some((index, wid))
    }

    /// Moves focus one window along the row. When the real focus has drifted
    /// outside the row, focus is first brought back to the tracked window.
    pub fn focus_step(
        &self,
        host: &mut dyn Host,
        direction: Direction,
    ) -> Result<Option<WindowId>, HostError> {
        let Some(index) = last_focused_index(self.managed(), host, self.workspace()) else {
            return Ok(None);
        };
        let tracked = self.managed()[index];
        let target = if host.focus_window() != Some(tracked) {
            Some(tracked)
        } else {
            step(self.managed(), host, index, direction).map(|i| self.managed()[i])
        };
        let Some(target) = target else { return Ok(None) };
        activate(host, target)?;
        Ok(Some(target))
    }

    pub fn focus_edge(
        &self,
        host: &mut dyn Host,
        direction: Direction,
    ) -> Result<Option<WindowId>, HostError> {
        let target = match direction {
            Direction::Left => self.managed().first(),
            Direction::Right => self.managed().last(),
        };
        let Some(&target) = target else { return Ok(None) };
        activate(host, target)?;
        Ok(Some(target))
    }

    /// Exchanges the focused window with its neighbor and lays the row out
    /// around it, with the window taking the neighbor's old place.
    pub fn swap(
        &mut self,
        host: &mut dyn Host,
        direction: Direction,
    ) -> Result<Option<PassOutcome>, LayoutError> {
        let Some((index, wid)) = self.focused_in_row(host) else { return Ok(None) };
        let Some(other) = step(self.managed(), host, index, direction) else {
            return Ok(None);
        };
        let neighbor = self.managed()[other];
        let (Some(moved), Some(target)) = (host.frame_rect(wid), host.frame_rect(neighbor)) else {
            return Ok(None);
        };
        self.registry.swap(index, other);
        let x = match direction {
            Direction::Right => target.max_x() - moved.size.width,
            Direction::Left => target.min_x(),
        };
        debug!(?wid, ?neighbor, x, "Swapped");
        self.rearrange(host, PassRequest::new(wid, true, true).at(Point::new(x, moved.origin.y)))
            .map(Some)
    }

    /// Pins the focused window against a display edge and lays the row out
    /// around it. Order is unchanged.
    pub fn move_to_edge(
        &self,
        host: &mut dyn Host,
        direction: Direction,
    ) -> Result<Option<PassOutcome>, LayoutError> {
        let Some((_, wid)) = self.focused_in_row(host) else { return Ok(None) };
        let Some(frame) = host.frame_rect(wid) else { return Ok(None) };
        let metrics = host.display_metrics();
        let x = match direction {
            Direction::Right => metrics.width,
            Direction::Left => self.settings().spacing(&metrics) / 2,
        };
        self.rearrange(host, PassRequest::new(wid, true, true).at(Point::new(x, frame.origin.y)))
            .map(Some)
    }
}

fn activate(host: &mut dyn Host, wid: WindowId) -> Result<(), HostError> {
    let timestamp = host.current_time();
    host.activate(wid, timestamp)
}

/// Follows transient parents up to the top-level owner.
pub fn transient_root(host: &dyn Host, wid: WindowId) -> WindowId {
    let mut current = wid;
    // Bounded in case the host reports a cycle.
    for _ in 0..32 {
        match host.window_info(current).and_then(|info| info.transient_for) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}
