//! Holds new windows back until they can be positioned.
//!
//! A window-added notification may arrive before the window has a visual
//! surface. Wayland clients report `shown` on the window itself. X11 clients
//! do not, so the display-wide window-created signal is watched instead and
//! filtered by identity.

use tracing::{debug, trace, warn};

use crate::common::collections::HashMap;
use crate::sys::host::{DisplaySignal, Host, SignalHandle, WindowSignal};
use crate::sys::window::{ClientType, WindowId, WorkspaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The window has a surface; admit it now.
    Ready,
    /// Admission will follow a later notification.
    Waiting,
    /// The window can never be admitted.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Shown(SignalHandle),
    DisplayCreated(SignalHandle),
}

#[derive(Debug, Default)]
pub struct MaterializationGate {
    pending: HashMap<WindowId, (WorkspaceId, Wait)>,
}

impl MaterializationGate {
    pub fn wait(&mut self, host: &mut dyn Host, workspace: WorkspaceId, wid: WindowId) -> GateDecision {
        if host.has_surface(wid) {
            return GateDecision::Ready;
        }
        if self.pending.contains_key(&wid) {
            trace!(?wid, "Already waiting for window");
            return GateDecision::Waiting;
        }
        let Some(info) = host.window_info(wid) else {
            debug!(?wid, "Window vanished before materializing");
            return GateDecision::Rejected;
        };
        let wait = match info.client_type {
            ClientType::Wayland => Wait::Shown(host.connect_window(wid, WindowSignal::Shown)),
            ClientType::X11 => {
                Wait::DisplayCreated(host.connect_display(DisplaySignal::WindowCreated))
            }
            ClientType::Unknown => {
                warn!(?wid, title = %info.title, "Unknown client type, window will not be managed");
                return GateDecision::Rejected;
            }
        };
        debug!(?wid, ?wait, "Waiting for window to materialize");
        self.pending.insert(wid, (workspace, wait));
        GateDecision::Waiting
    }

    /// The window reported `shown`. Returns the workspace it was added to if
    /// this completes a wait.
    pub fn on_shown(&mut self, host: &mut dyn Host, wid: WindowId) -> Option<WorkspaceId> {
        let &(workspace, Wait::Shown(handle)) = self.pending.get(&wid)? else {
            return None;
        };
        self.pending.remove(&wid);
        host.disconnect_window(wid, handle);
        Some(workspace)
    }

    /// The display created `wid`. Every X11 wait holds its own connection, so
    /// only the one for `wid` completes.
    pub fn on_display_window_created(
        &mut self,
        host: &mut dyn Host,
        wid: WindowId,
    ) -> Option<WorkspaceId> {
        let &(workspace, Wait::DisplayCreated(handle)) = self.pending.get(&wid)? else {
            return None;
        };
        self.pending.remove(&wid);
        host.disconnect_display(handle);
        Some(workspace)
    }

    /// Gives up on `wid` if it is waiting to join `workspace`, e.g. because
    /// it was removed before materializing. A wait for another workspace is
    /// left alone.
    pub fn cancel(&mut self, host: &mut dyn Host, workspace: WorkspaceId, wid: WindowId) -> bool {
        if !self.pending.get(&wid).is_some_and(|(ws, _)| *ws == workspace) {
            return false;
        }
        let Some((_, wait)) = self.pending.remove(&wid) else { return false };
        release(host, wid, wait);
        true
    }

    /// Forgets every waiting window of `workspace`.
    pub fn cancel_workspace(&mut self, host: &mut dyn Host, workspace: WorkspaceId) {
        let waiting: Vec<WindowId> =
            self.pending.iter().filter(|(_, (ws, _))| *ws == workspace).map(|(w, _)| *w).collect();
        for wid in waiting {
            self.cancel(host, workspace, wid);
        }
    }

    pub fn clear(&mut self, host: &mut dyn Host) {
        for (wid, (_, wait)) in self.pending.drain() {
            release(host, wid, wait);
        }
    }

    pub fn is_waiting(&self, wid: WindowId) -> bool {
        self.pending.contains_key(&wid)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn release(host: &mut dyn Host, wid: WindowId, wait: Wait) {
    match wait {
        Wait::Shown(handle) => host.disconnect_window(wid, handle),
        Wait::DisplayCreated(handle) => host.disconnect_display(handle),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::sys::geometry::Rect;
    use crate::sys::headless::{HeadlessHost, WindowSpec};

    fn open(host: &HeadlessHost, client: ClientType) -> WindowId {
        host.open_window(WindowSpec::new("new", Rect::new(0, 0, 300, 300)).client(client))
    }

    #[test]
    fn surfaced_windows_pass_straight_through() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let wid = host.spawn_window("a", 0, 300);
        let mut gate = MaterializationGate::default();
        assert_eq!(gate.wait(&mut host, ws, wid), GateDecision::Ready);
        assert!(gate.is_empty());
    }

    #[test]
    fn wayland_waits_for_shown() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let wid = open(&host, ClientType::Wayland);
        let mut gate = MaterializationGate::default();

        assert_eq!(gate.wait(&mut host, ws, wid), GateDecision::Waiting);
        assert_eq!(gate.wait(&mut host, ws, wid), GateDecision::Waiting);
        assert_eq!(host.connection_count(wid), 1);
        // Not the signal this window waits on.
        assert_eq!(gate.on_display_window_created(&mut host, wid), None);

        host.show_window(wid);
        assert_eq!(host.take_events(), vec![crate::actor::reactor::Event::WindowShown(wid)]);
        assert_eq!(gate.on_shown(&mut host, wid), Some(ws));
        assert_eq!(gate.on_shown(&mut host, wid), None);
        assert_eq!(host.connection_count(wid), 0);
    }

    #[test]
    fn x11_waits_for_its_own_display_event() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let first = open(&host, ClientType::X11);
        let second = open(&host, ClientType::X11);
        let mut gate = MaterializationGate::default();

        gate.wait(&mut host, ws, first);
        gate.wait(&mut host, ws, second);
        assert_eq!(host.display_connection_count(), 2);

        host.show_window(second);
        assert_eq!(gate.on_display_window_created(&mut host, second), Some(ws));
        assert!(gate.is_waiting(first));
        assert!(!gate.is_waiting(second));
        assert_eq!(host.display_connection_count(), 1);
    }

    #[test]
    fn unknown_clients_are_rejected() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let wid = open(&host, ClientType::Unknown);
        let mut gate = MaterializationGate::default();
        assert_eq!(gate.wait(&mut host, ws, wid), GateDecision::Rejected);
        assert!(gate.is_empty());
        assert_eq!(host.connection_count(wid), 0);
    }

    #[test]
    fn cancel_releases_connections() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let a = open(&host, ClientType::Wayland);
        let b = open(&host, ClientType::X11);
        let mut gate = MaterializationGate::default();
        gate.wait(&mut host, ws, a);
        gate.wait(&mut host, ws, b);

        // Only the workspace the window is joining can cancel its wait.
        let other = host.add_workspace();
        assert!(!gate.cancel(&mut host, other, a));
        assert!(gate.is_waiting(a));

        assert!(gate.cancel(&mut host, ws, a));
        assert!(!gate.cancel(&mut host, ws, a));
        assert_eq!(host.connection_count(a), 0);

        gate.cancel_workspace(&mut host, ws);
        assert!(gate.is_empty());
        assert_eq!(host.display_connection_count(), 0);
    }
}
