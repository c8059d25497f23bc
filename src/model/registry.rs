//! Per-workspace membership and order of the tiled row.
//!
//! The registry owns the left-to-right list of managed windows and the
//! subscription ledger for every window it watches, managed or ignored.
//! Ignored windows are never inserted into the list; they only keep a focus
//! subscription so focus on a dialog can be redirected to the row.

use tracing::{debug, trace};

use super::subscriptions::SubscriptionLedger;
use crate::sys::host::{Host, SignalHandle, WindowSignal};
use crate::sys::window::{WindowId, WindowInfo, WindowType, WorkspaceId};

const MANAGED_SIGNALS: [WindowSignal; 3] = [
    WindowSignal::PositionChanged,
    WindowSignal::SizeChanged,
    WindowSignal::Focus,
];

const GEOMETRY_SIGNALS: [WindowSignal; 2] =
    [WindowSignal::PositionChanged, WindowSignal::SizeChanged];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Managed,
    Ignored,
}

/// Decides whether a window takes part in the row.
pub fn classify(info: &WindowInfo) -> Classification {
    if info.window_type != WindowType::Normal {
        trace!(wid = ?info.id, window_type = ?info.window_type, "Not a normal window");
        return Classification::Ignored;
    }
    if info.is_on_all_workspaces() {
        trace!(wid = ?info.id, "Window is on all workspaces");
        return Classification::Ignored;
    }
    if let Some(parent) = info.transient_for {
        trace!(wid = ?info.id, ?parent, "Window is transient");
        return Classification::Ignored;
    }
    Classification::Managed
}

#[derive(Debug)]
pub struct WindowRegistry {
    workspace: WorkspaceId,
    managed: Vec<WindowId>,
    subscriptions: SubscriptionLedger,
    workspace_handle: Option<SignalHandle>,
}

impl WindowRegistry {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            managed: Vec::new(),
            subscriptions: SubscriptionLedger::new(),
            workspace_handle: None,
        }
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    /// Adopts the windows already present on the workspace.
    ///
    /// The row is sorted by the position of each window's visual surface.
    /// Frame positions may have been clamped by the host and would lose the
    /// order a previous session left behind.
    pub fn initial_load(&mut self, host: &mut dyn Host) {
        for wid in host.workspace_windows(self.workspace) {
            let Some(info) = host.window_info(wid) else {
                debug!(?wid, "Window vanished during enumeration");
                continue;
            };
            match classify(&info) {
                Classification::Ignored => {
                    debug!(?wid, title = %info.title, "Ignoring window, watching focus only");
                    self.subscribe_ignored(host, wid);
                }
                Classification::Managed => {
                    if !self.managed.contains(&wid) {
                        self.managed.push(wid);
                    }
                }
            }
        }

        let sort_key = |wid: &WindowId| {
            host.surface_position(*wid)
                .map(|p| p.x)
                .or_else(|| host.frame_rect(*wid).map(|r| r.origin.x))
                .unwrap_or(i32::MAX)
        };
        self.managed.sort_by_cached_key(sort_key);

        for wid in self.managed.clone() {
            self.subscribe_managed(host, wid);
        }
        if self.workspace_handle.is_none() {
            self.workspace_handle = Some(host.connect_workspace(self.workspace));
        }
        debug!(workspace = ?self.workspace, row = ?self.managed, "Loaded workspace");
    }

    /// Disconnects everything this registry connected and forgets the row.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        let watched: Vec<WindowId> = self.subscriptions.windows().collect();
        for wid in watched {
            self.subscriptions.unsubscribe_all(host, wid);
        }
        self.managed.clear();
        if let Some(handle) = self.workspace_handle.take() {
            host.disconnect_workspace(self.workspace, handle);
        }
    }

    pub fn managed(&self) -> &[WindowId] {
        &self.managed
    }

    pub fn index_of(&self, wid: WindowId) -> Option<usize> {
        self.managed.iter().position(|&w| w == wid)
    }

    pub fn contains(&self, wid: WindowId) -> bool {
        self.managed.contains(&wid)
    }

    pub fn len(&self) -> usize {
        self.managed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managed.is_empty()
    }

    /// Inserts `wid` right after `after`, or at the front when `after` is
    /// `None`. Returns the new index, or `None` if the window was already in
    /// the row.
    pub fn insert_after(&mut self, after: Option<usize>, wid: WindowId) -> Option<usize> {
        if self.contains(wid) {
            return None;
        }
        let index = after.map_or(0, |i| (i + 1).min(self.managed.len()));
        self.managed.insert(index, wid);
        Some(index)
    }

    /// Forgets the window entirely: drops it from the row and releases every
    /// subscription held for it.
    pub fn remove(&mut self, host: &mut dyn Host, wid: WindowId) -> Option<usize> {
        self.subscriptions.unsubscribe_all(host, wid);
        let index = self.index_of(wid)?;
        self.managed.remove(index);
        Some(index)
    }

    /// Takes the window out of the row but keeps watching its focus, the way
    /// ignored windows are watched.
    pub fn demote(&mut self, host: &mut dyn Host, wid: WindowId) -> Option<usize> {
        let index = self.index_of(wid)?;
        self.managed.remove(index);
        for signal in GEOMETRY_SIGNALS {
            self.subscriptions.unsubscribe(host, wid, signal);
        }
        self.subscriptions.subscribe_once(host, wid, WindowSignal::Focus);
        Some(index)
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.managed.swap(a, b);
    }

    pub fn subscribe_managed(&mut self, host: &mut dyn Host, wid: WindowId) {
        for signal in MANAGED_SIGNALS {
            self.subscriptions.subscribe_once(host, wid, signal);
        }
    }

    pub fn subscribe_ignored(&mut self, host: &mut dyn Host, wid: WindowId) {
        self.subscriptions.subscribe_once(host, wid, WindowSignal::Focus);
    }

    pub fn is_subscribed(&self, wid: WindowId, signal: WindowSignal) -> bool {
        self.subscriptions.is_subscribed(wid, signal)
    }

    /// Whether the registry holds any subscription for `wid`.
    pub fn watches(&self, wid: WindowId) -> bool {
        self.subscriptions.windows().any(|w| w == wid)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::sys::geometry::Rect;
    use crate::sys::headless::{HeadlessHost, WindowSpec};
    use crate::sys::window::WindowFlags;

    fn info(window_type: WindowType) -> WindowInfo {
        WindowInfo {
            id: WindowId::new(1),
            title: "t".into(),
            window_type,
            client_type: Default::default(),
            flags: WindowFlags::empty(),
            transient_for: None,
        }
    }

    #[test]
    fn classification() {
        assert_eq!(classify(&info(WindowType::Normal)), Classification::Managed);
        assert_eq!(classify(&info(WindowType::Dialog)), Classification::Ignored);
        assert_eq!(classify(&info(WindowType::Utility)), Classification::Ignored);

        let mut sticky = info(WindowType::Normal);
        sticky.flags |= WindowFlags::ON_ALL_WORKSPACES;
        assert_eq!(classify(&sticky), Classification::Ignored);

        let mut transient = info(WindowType::Normal);
        transient.transient_for = Some(WindowId::new(7));
        assert_eq!(classify(&transient), Classification::Ignored);

        // Minimized windows are still part of the row.
        let mut minimized = info(WindowType::Normal);
        minimized.flags |= WindowFlags::MINIMIZED;
        assert_eq!(classify(&minimized), Classification::Managed);
    }

    #[test]
    fn initial_load_sorts_by_surface_position() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let c = host.spawn_window("c", 900, 300);
        let a = host.spawn_window("a", 10, 300);
        let b = host.spawn_window("b", 400, 300);
        let dialog = host.add_window(
            WindowSpec::new("dialog", Rect::new(50, 50, 200, 100)).transient_for(a),
        );

        let mut registry = WindowRegistry::new(ws);
        registry.initial_load(&mut host);

        assert_eq!(registry.managed(), &[a, b, c]);
        assert!(registry.is_subscribed(dialog, WindowSignal::Focus));
        assert!(!registry.is_subscribed(dialog, WindowSignal::SizeChanged));
        for wid in [a, b, c] {
            for signal in MANAGED_SIGNALS {
                assert!(registry.is_subscribed(wid, signal));
            }
        }
        assert_eq!(registry.subscription_count(), 10);
        assert_eq!(host.workspace_connection_count(ws), 1);
    }

    #[test]
    fn initial_load_prefers_surface_over_clamped_frame() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let a = host.spawn_window("a", 0, 300);
        let b = host.spawn_window("b", 0, 300);
        // Both frames were clamped to 0 by the host, but the surfaces keep the
        // real order.
        host.set_surface(b, 100);
        host.set_surface(a, 500);

        let mut registry = WindowRegistry::new(ws);
        registry.initial_load(&mut host);
        assert_eq!(registry.managed(), &[b, a]);
    }

    #[test]
    fn teardown_releases_everything() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let a = host.spawn_window("a", 0, 300);
        let dialog = host.add_window(
            WindowSpec::new("dialog", Rect::new(50, 50, 200, 100)).transient_for(a),
        );
        let mut registry = WindowRegistry::new(ws);
        registry.initial_load(&mut host);

        registry.teardown(&mut host);

        assert!(registry.is_empty());
        assert_eq!(registry.subscription_count(), 0);
        assert_eq!(host.connection_count(a), 0);
        assert_eq!(host.connection_count(dialog), 0);
        assert_eq!(host.workspace_connection_count(ws), 0);
    }

    #[test]
    fn insert_after_and_remove_keep_row_unique() {
        let mut host = HeadlessHost::new();
        let mut registry = WindowRegistry::new(host.active());
        let [a, b, c] = [1, 2, 3].map(WindowId::new);

        assert_eq!(registry.insert_after(None, a), Some(0));
        assert_eq!(registry.insert_after(Some(0), b), Some(1));
        assert_eq!(registry.insert_after(Some(0), c), Some(1));
        assert_eq!(registry.insert_after(Some(1), a), None);
        assert_eq!(registry.managed(), &[a, c, b]);

        assert_eq!(registry.remove(&mut host, c), Some(1));
        assert_eq!(registry.remove(&mut host, c), None);
        assert_eq!(registry.managed(), &[a, b]);
    }

    #[test]
    fn demote_keeps_focus_subscription() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let a = host.spawn_window("a", 0, 300);
        let b = host.spawn_window("b", 400, 300);
        let mut registry = WindowRegistry::new(ws);
        registry.initial_load(&mut host);

        assert_eq!(registry.demote(&mut host, a), Some(0));

        assert_eq!(registry.managed(), &[b]);
        assert!(registry.watches(a));
        assert!(registry.is_subscribed(a, WindowSignal::Focus));
        assert!(!registry.is_subscribed(a, WindowSignal::PositionChanged));
        assert_eq!(host.connection_count(a), 1);
    }
}
