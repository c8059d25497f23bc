use tracing::{debug, info, warn};

use crate::actor::overlay;
use crate::actor::reactor::events::window::WindowEventHandler;
use crate::actor::reactor::{IdleTask, Reactor, ReactorError};
use crate::layout_engine::{RowSettings, WorkspaceRow};
use crate::sys::window::WorkspaceId;

pub struct WorkspaceEventHandler;

impl WorkspaceEventHandler {
    pub fn handle_enable(reactor: &mut Reactor) -> Result<(), ReactorError> {
        if reactor.enabled {
            debug!("Already enabled");
            return Ok(());
        }
        reactor.enabled = true;
        for workspace in reactor.host.workspaces() {
            Self::add_row(reactor, workspace);
        }
        info!(workspaces = reactor.rows.len(), "Enabled");
        if let Some(workspace) = reactor.active_workspace() {
            reactor.idle.push_back(IdleTask::Rearrange { workspace });
        }
        let focus = reactor.host.focus_window();
        WindowEventHandler::handle_focus_window_changed(reactor, focus)
    }

    pub fn handle_disable(reactor: &mut Reactor) -> Result<(), ReactorError> {
        if !reactor.enabled {
            debug!("Already disabled");
            return Ok(());
        }
        reactor.enabled = false;
        let host = reactor.host.as_mut();
        for row in reactor.rows.values_mut() {
            row.teardown(host);
        }
        reactor.rows.clear();
        reactor.gate.clear(host);
        reactor.idle.clear();
        reactor.resize.horizontal.reset();
        reactor.resize.vertical.reset();
        if let Some(wid) = reactor.highlight.window.take() {
            reactor.highlight.subscriptions.unsubscribe_all(host, wid);
            reactor.send_overlay(overlay::Event::ClearHighlight);
        }
        info!("Disabled");
        Ok(())
    }

    pub fn handle_workspace_added(
        reactor: &mut Reactor,
        workspace: WorkspaceId,
    ) -> Result<(), ReactorError> {
        if !reactor.enabled {
            return Ok(());
        }
        if reactor.rows.contains_key(&workspace) {
            warn!(?workspace, "Workspace already has a row");
            return Ok(());
        }
        Self::add_row(reactor, workspace);
        Ok(())
    }

    /// Drops the rows of every workspace the host no longer lists.
    pub fn handle_workspace_removed(
        reactor: &mut Reactor,
        workspace: WorkspaceId,
    ) -> Result<(), ReactorError> {
        if !reactor.enabled {
            return Ok(());
        }
        let live = reactor.host.workspaces();
        let gone: Vec<WorkspaceId> =
            reactor.rows.keys().copied().filter(|ws| !live.contains(ws)).collect();
        if gone.is_empty() {
            debug!(?workspace, "Removed workspace had no row");
        }
        for ws in gone {
            let host = reactor.host.as_mut();
            if let Some(mut row) = reactor.rows.remove(&ws) {
                row.teardown(host);
            }
            reactor.gate.cancel_workspace(host, ws);
            debug!(workspace = ?ws, "Dropped row");
        }
        Ok(())
    }

    pub fn handle_overview_hidden(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let Some(workspace) = reactor.active_workspace() else { return Ok(()) };
        let Some(row) = reactor.rows.get(&workspace) else { return Ok(()) };
        if let Some(outcome) = row.on_overview_hidden(reactor.host.as_mut())? {
            reactor.after_pass(workspace, &outcome);
        }
        Ok(())
    }

    fn add_row(reactor: &mut Reactor, workspace: WorkspaceId) {
        let settings = &reactor.config.settings;
        let mut row = WorkspaceRow::new(
            workspace,
            RowSettings::from_config(settings),
            settings.layout.preposition_new_windows,
        );
        row.load(reactor.host.as_mut());
        reactor.rows.insert(workspace, row);
    }
}
