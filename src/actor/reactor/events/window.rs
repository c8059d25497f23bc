use tracing::{debug, trace};

use crate::actor::overlay;
use crate::actor::reactor::{GateDecision, IdleTask, Reactor, ReactorError};
use crate::layout_engine::Admission;
use crate::sys::host::WindowSignal;
use crate::sys::window::{WindowId, WindowType, WorkspaceId};

const HIGHLIGHT_SIGNALS: [WindowSignal; 2] = [WindowSignal::Unmanaging, WindowSignal::SizeChanged];

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_window_added(
        reactor: &mut Reactor,
        workspace: WorkspaceId,
        wid: WindowId,
    ) -> Result<(), ReactorError> {
        if !reactor.rows.contains_key(&workspace) {
            debug!(?wid, ?workspace, "Window added to an unmanaged workspace");
            return Ok(());
        }
        match reactor.gate.wait(reactor.host.as_mut(), workspace, wid) {
            GateDecision::Ready => Self::admit_window(reactor, workspace, wid),
            GateDecision::Waiting | GateDecision::Rejected => Ok(()),
        }
    }

    /// Admits a materialized window. Managed windows are presented once the
    /// current batch of events has been handled.
    pub(in crate::actor::reactor) fn admit_window(
        reactor: &mut Reactor,
        workspace: WorkspaceId,
        wid: WindowId,
    ) -> Result<(), ReactorError> {
        let row = reactor.rows.get_mut(&workspace).ok_or(ReactorError::UnknownWorkspace(workspace))?;
        match row.admit(reactor.host.as_mut(), wid)? {
            Admission::Managed { .. } => {
                reactor.idle.push_back(IdleTask::Present { workspace, wid });
            }
            Admission::Ignored => reactor.notify_edges(workspace),
            Admission::AlreadyManaged | Admission::Vanished => {}
        }
        Ok(())
    }

    pub fn handle_window_removed(
        reactor: &mut Reactor,
        workspace: WorkspaceId,
        wid: WindowId,
    ) -> Result<(), ReactorError> {
        if reactor.gate.cancel(reactor.host.as_mut(), workspace, wid) {
            debug!(?wid, "Window removed before it materialized");
        }
        if let Some(row) = reactor.rows.get_mut(&workspace)
            && row.remove(reactor.host.as_mut(), wid).is_some()
        {
            reactor.notify_edges(workspace);
        }
        if reactor.host.window_info(wid).is_some() {
            // Still alive, e.g. moved to another workspace whose row may
            // already hold it.
            return Ok(());
        }
        // A closed window pinned to all workspaces is watched by every row.
        for ws in reactor.rows_holding(wid) {
            let Some(row) = reactor.rows.get_mut(&ws) else { continue };
            if row.remove(reactor.host.as_mut(), wid).is_some() {
                reactor.notify_edges(ws);
            }
        }
        Self::release_highlight(reactor, wid);
        Ok(())
    }

    pub fn handle_position_changed(
        reactor: &mut Reactor,
        wid: WindowId,
    ) -> Result<(), ReactorError> {
        let watching = reactor.rows_watching(wid, WindowSignal::PositionChanged);
        if watching.is_empty() {
            trace!(?wid, "No live position subscription");
        }
        for ws in watching {
            let Some(row) = reactor.rows.get(&ws) else { continue };
            let outcome = row.on_position_changed(reactor.host.as_mut(), wid)?;
            reactor.after_pass(ws, &outcome);
        }
        Ok(())
    }

    pub fn handle_size_changed(reactor: &mut Reactor, wid: WindowId) -> Result<(), ReactorError> {
        if reactor.highlight.window == Some(wid) {
            Self::show_highlight(reactor, wid);
        }
        for ws in reactor.rows_watching(wid, WindowSignal::SizeChanged) {
            let Some(row) = reactor.rows.get(&ws) else { continue };
            let outcome = row.on_size_changed(reactor.host.as_mut(), wid)?;
            reactor.after_pass(ws, &outcome);
        }
        Ok(())
    }

    pub fn handle_window_focused(reactor: &mut Reactor, wid: WindowId) -> Result<(), ReactorError> {
        let watching = reactor.rows_watching(wid, WindowSignal::Focus);
        if watching.is_empty() {
            trace!(?wid, "No live focus subscription");
        }
        for ws in watching {
            let Some(row) = reactor.rows.get(&ws) else { continue };
            if !row.registry().contains(wid) {
                if let Some(outcome) = row.on_ignored_focus(reactor.host.as_mut(), wid)? {
                    reactor.after_pass(ws, &outcome);
                }
                continue;
            }
            if !reactor.host.has_surface(wid) {
                debug!(?wid, "Focused window has no surface yet");
                continue;
            }
            let outcome = row.on_focus(reactor.host.as_mut(), wid)?;
            reactor.after_pass(ws, &outcome);
            if outcome.is_applied() {
                reactor.move_cursor_onto(wid);
            }
        }
        Ok(())
    }

    pub fn handle_window_shown(reactor: &mut Reactor, wid: WindowId) -> Result<(), ReactorError> {
        match reactor.gate.on_shown(reactor.host.as_mut(), wid) {
            Some(workspace) => Self::admit_window(reactor, workspace, wid),
            None => {
                trace!(?wid, "Window shown without a pending wait");
                Ok(())
            }
        }
    }

    pub fn handle_display_window_created(
        reactor: &mut Reactor,
        wid: WindowId,
    ) -> Result<(), ReactorError> {
        match reactor.gate.on_display_window_created(reactor.host.as_mut(), wid) {
            Some(workspace) => Self::admit_window(reactor, workspace, wid),
            None => Ok(()),
        }
    }

    pub fn handle_unmanaging(reactor: &mut Reactor, wid: WindowId) -> Result<(), ReactorError> {
        if reactor.highlight.window == Some(wid) {
            debug!(?wid, "Highlighted window is going away");
            Self::release_highlight(reactor, wid);
            reactor.send_overlay(overlay::Event::ClearHighlight);
        }
        Ok(())
    }

    /// Moves the highlight along with the host's global focus. Focus moving
    /// to nothing, or to a window that is never highlighted, leaves the
    /// highlight where it is.
    pub fn handle_focus_window_changed(
        reactor: &mut Reactor,
        wid: Option<WindowId>,
    ) -> Result<(), ReactorError> {
        if !reactor.enabled || !reactor.config.settings.highlight.enabled {
            return Ok(());
        }
        let Some(wid) = wid else { return Ok(()) };
        if reactor.highlight.window == Some(wid) {
            return Ok(());
        }
        let highlightable = reactor.host.window_info(wid).is_some_and(|info| {
            matches!(
                info.window_type,
                WindowType::Normal | WindowType::Dialog | WindowType::ModalDialog
            )
        });
        if !highlightable {
            trace!(?wid, "Focused window is not highlighted");
            return Ok(());
        }
        if let Some(previous) = reactor.highlight.window {
            Self::release_highlight(reactor, previous);
        }
        reactor.highlight.window = Some(wid);
        for signal in HIGHLIGHT_SIGNALS {
            reactor.highlight.subscriptions.subscribe_once(reactor.host.as_mut(), wid, signal);
        }
        Self::show_highlight(reactor, wid);
        Ok(())
    }

    fn show_highlight(reactor: &Reactor, wid: WindowId) {
        let host = reactor.host.as_ref();
        let (Some(frame), Some(buffer)) = (host.frame_rect(wid), host.buffer_rect(wid)) else {
            return;
        };
        let rect = overlay::highlight_rect(
            frame,
            buffer,
            host.display_metrics().scale_factor,
            reactor.config.settings.layout.window_spacing,
        );
        reactor.send_overlay(overlay::Event::Highlight { window: wid, rect });
    }

    fn release_highlight(reactor: &mut Reactor, wid: WindowId) {
        reactor.highlight.subscriptions.unsubscribe_all(reactor.host.as_mut(), wid);
        if reactor.highlight.window == Some(wid) {
            reactor.highlight.window = None;
        }
    }
}
