use tracing::{debug, info};

use crate::actor::reactor::events::window::WindowEventHandler;
use crate::actor::reactor::{Command, Reactor, ReactorError};
use crate::layout_engine::resize::{current_extent, extent, resized, usable_extent};
use crate::layout_engine::row::move_window;
use crate::layout_engine::{Direction, Orientation, RowSettings};
use crate::sys::geometry::Point;
use crate::sys::window::WorkspaceId;

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_command(reactor: &mut Reactor, command: Command) -> Result<(), ReactorError> {
        if !reactor.enabled {
            debug!(%command, "Ignoring command while disabled");
            return Ok(());
        }
        info!(%command, "Command");
        match command {
            Command::FocusNext => Self::focus_step(reactor, Direction::Right),
            Command::FocusPrevious => Self::focus_step(reactor, Direction::Left),
            Command::FocusFirst => Self::focus_edge(reactor, Direction::Left),
            Command::FocusLast => Self::focus_edge(reactor, Direction::Right),
            Command::SwapNext => Self::swap(reactor, Direction::Right),
            Command::SwapPrevious => Self::swap(reactor, Direction::Left),
            Command::MoveWindowRight => Self::move_to_edge(reactor, Direction::Right),
            Command::MoveWindowLeft => Self::move_to_edge(reactor, Direction::Left),
            Command::ToggleFloat => Self::toggle_float(reactor),
            Command::CycleResizeHorizontal => Self::cycle_resize(reactor, Orientation::Horizontal),
            Command::CycleResizeVertical => Self::cycle_resize(reactor, Orientation::Vertical),
        }
    }

    fn active(reactor: &Reactor) -> Option<WorkspaceId> {
        let workspace = reactor.active_workspace();
        if workspace.is_none() {
            debug!("No row for the active workspace");
        }
        workspace
    }

    // The resulting focus notification drives the layout pass.
    fn focus_step(reactor: &mut Reactor, direction: Direction) -> Result<(), ReactorError> {
        let Some(workspace) = Self::active(reactor) else { return Ok(()) };
        let Some(row) = reactor.rows.get(&workspace) else { return Ok(()) };
        let target = row.focus_step(reactor.host.as_mut(), direction)?;
        debug!(?direction, ?target, "Focus step");
        Ok(())
    }

    fn focus_edge(reactor: &mut Reactor, direction: Direction) -> Result<(), ReactorError> {
        let Some(workspace) = Self::active(reactor) else { return Ok(()) };
        let Some(row) = reactor.rows.get(&workspace) else { return Ok(()) };
        let target = row.focus_edge(reactor.host.as_mut(), direction)?;
        debug!(?direction, ?target, "Focus edge");
        Ok(())
    }

    fn swap(reactor: &mut Reactor, direction: Direction) -> Result<(), ReactorError> {
        let Some(workspace) = Self::active(reactor) else { return Ok(()) };
        let Some(row) = reactor.rows.get_mut(&workspace) else { return Ok(()) };
        if let Some(outcome) = row.swap(reactor.host.as_mut(), direction)? {
            reactor.after_pass(workspace, &outcome);
        }
        Ok(())
    }

    fn move_to_edge(reactor: &mut Reactor, direction: Direction) -> Result<(), ReactorError> {
        let Some(workspace) = Self::active(reactor) else { return Ok(()) };
        let Some(row) = reactor.rows.get(&workspace) else { return Ok(()) };
        if let Some(outcome) = row.move_to_edge(reactor.host.as_mut(), direction)? {
            reactor.after_pass(workspace, &outcome);
        }
        Ok(())
    }

    /// Pins the focus window above the row, or puts a pinned one back.
    fn toggle_float(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let Some(wid) = reactor.host.focus_window() else { return Ok(()) };
        let Some(info) = reactor.host.window_info(wid) else { return Ok(()) };

        if info.is_on_all_workspaces() {
            debug!(?wid, "Unfloating");
            reactor.host.set_floating(wid, false)?;
            let Some(workspace) = Self::active(reactor) else { return Ok(()) };
            return WindowEventHandler::admit_window(reactor, workspace, wid);
        }

        debug!(?wid, "Floating");
        reactor.host.set_floating(wid, true)?;
        let workspaces: Vec<WorkspaceId> = reactor.rows.keys().copied().collect();
        for workspace in workspaces {
            let Some(row) = reactor.rows.get_mut(&workspace) else { continue };
            if row.demote(reactor.host.as_mut(), wid).is_some() {
                reactor.notify_edges(workspace);
            }
        }

        let Some(frame) = reactor.host.frame_rect(wid) else { return Ok(()) };
        let settings = &reactor.config.settings;
        let target = Point::new(frame.origin.x, frame.origin.y + settings.float.drop_offset);
        let metrics = reactor.host.display_metrics();
        move_window(
            reactor.host.as_mut(),
            wid,
            target,
            settings.animate,
            settings.animation.move_duration,
            &metrics,
        )?;
        Ok(())
    }

    /// Resizes the focus window to the next configured ratio. The host's
    /// size notification lays the row out.
    fn cycle_resize(reactor: &mut Reactor, orientation: Orientation) -> Result<(), ReactorError> {
        let Some(wid) = reactor.host.focus_window() else { return Ok(()) };
        let Some(frame) = reactor.host.frame_rect(wid) else { return Ok(()) };
        let settings = &reactor.config.settings;
        let metrics = reactor.host.display_metrics();
        let spacing = RowSettings::from_config(settings).spacing(&metrics);
        let (cycle, ratios) = match orientation {
            Orientation::Horizontal => {
                (&mut reactor.resize.horizontal, &settings.resize.horizontal_ratios)
            }
            Orientation::Vertical => (&mut reactor.resize.vertical, &settings.resize.vertical_ratios),
        };
        let usable = usable_extent(orientation, &metrics, spacing);
        let current = current_extent(orientation, frame);
        let Some(index) = cycle.advance(wid, current, usable, ratios) else { return Ok(()) };
        let target = resized(frame, orientation, extent(usable, ratios[index]));
        debug!(?wid, ?orientation, index, ?target, "Cycling size");
        reactor.host.move_resize_frame(wid, target)?;
        Ok(())
    }
}
