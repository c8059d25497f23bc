//! The reactor's job is to keep every workspace row consistent with what the
//! host reports, and to carry out the user's commands.
//!
//! Host notifications arrive as [`Event`]s and are handled one at a time.
//! Work that has to wait until the host finished its own reaction to the
//! current batch (e.g. presenting a freshly shown window after the show
//! animation) is queued as an idle task and run once the event queue is
//! drained.

mod error;
mod events {
    pub mod command;
    pub mod window;
    pub mod workspace;
}
mod materialize;
mod replay;
pub mod simulate;

#[cfg(test)]
mod testing;

pub use error::ReactorError;
pub use materialize::{GateDecision, MaterializationGate};
pub use replay::{Record, read_record};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::{Span, debug, instrument, trace, warn};

use self::events::command::CommandEventHandler;
use self::events::window::WindowEventHandler;
use self::events::workspace::WorkspaceEventHandler;
use crate::actor::{self, mouse, overlay};
use crate::common::collections::{BTreeMap, VecDeque};
use crate::common::config::Config;
use crate::layout_engine::{PassOutcome, PassRequest, ResizeCycle, WorkspaceRow};
use crate::model::SubscriptionLedger;
use crate::sys::host::{Host, WindowSignal};
use crate::sys::window::{WindowId, WorkspaceId};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enable,
    Disable,
    WorkspaceAdded(WorkspaceId),
    WorkspaceRemoved(WorkspaceId),
    WindowAdded(WorkspaceId, WindowId),
    WindowRemoved(WorkspaceId, WindowId),
    WindowPositionChanged(WindowId),
    WindowSizeChanged(WindowId),
    WindowFocused(WindowId),
    WindowShown(WindowId),
    WindowUnmanaging(WindowId),
    /// The display reported a newly created window.
    DisplayWindowCreated(WindowId),
    /// The host's global focus window changed.
    FocusWindowChanged(Option<WindowId>),
    OverviewShown,
    OverviewHidden,
    Command(Command),
}

/// User-facing operations, usually bound to keys.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    FocusNext,
    FocusPrevious,
    FocusFirst,
    FocusLast,
    SwapNext,
    SwapPrevious,
    MoveWindowRight,
    MoveWindowLeft,
    ToggleFloat,
    CycleResizeHorizontal,
    CycleResizeVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdleTask {
    /// Show a newly admitted window and bring the pointer to it.
    Present { workspace: WorkspaceId, wid: WindowId },
    /// Lay the row out around its last focused window.
    Rearrange { workspace: WorkspaceId },
}

/// The window the focus highlight follows, and its connections.
#[derive(Debug, Default)]
struct Highlight {
    window: Option<WindowId>,
    subscriptions: SubscriptionLedger,
}

#[derive(Debug, Default)]
struct ResizeCycles {
    horizontal: ResizeCycle,
    vertical: ResizeCycle,
}

pub struct Reactor {
    config: Config,
    host: Box<dyn Host>,
    enabled: bool,
    rows: BTreeMap<WorkspaceId, WorkspaceRow>,
    gate: MaterializationGate,
    idle: VecDeque<IdleTask>,
    resize: ResizeCycles,
    highlight: Highlight,
    record: Record,
    mouse_tx: Option<mouse::Sender>,
    overlay_tx: Option<overlay::Sender>,
}

impl Reactor {
    pub fn new(
        config: Config,
        host: Box<dyn Host>,
        mut record: Record,
        mouse_tx: Option<mouse::Sender>,
        overlay_tx: Option<overlay::Sender>,
    ) -> Reactor {
        record.start(&config);
        Reactor {
            config,
            host,
            enabled: false,
            rows: BTreeMap::new(),
            gate: MaterializationGate::default(),
            idle: VecDeque::new(),
            resize: ResizeCycles::default(),
            highlight: Highlight::default(),
            record,
            mouse_tx,
            overlay_tx,
        }
    }

    /// Handles events until every sender is gone.
    ///
    /// Each wakeup drains everything already queued before the idle tasks run.
    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            self.handle_spanned(span, event);
            while let Ok((span, event)) = events.try_recv() {
                self.handle_spanned(span, event);
            }
            self.run_idle_tasks();
        }
    }

    fn handle_spanned(&mut self, span: Span, event: Event) {
        let _guard = span.enter();
        self.handle_event(event);
    }

    pub fn handle_events(&mut self, events: Vec<Event>) {
        for event in events {
            self.handle_event(event);
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        self.record.on_event(&event);
        if let Err(e) = self.dispatch(event) {
            warn!("Event handling failed: {e}");
        }
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::WindowPositionChanged(..) | Event::WindowSizeChanged(..) => {
                trace!(?event, "Event")
            }
            _ => debug!(?event, "Event"),
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), ReactorError> {
        match event {
            Event::Enable => WorkspaceEventHandler::handle_enable(self),
            Event::Disable => WorkspaceEventHandler::handle_disable(self),
            Event::WorkspaceAdded(ws) => WorkspaceEventHandler::handle_workspace_added(self, ws),
            Event::WorkspaceRemoved(ws) => {
                WorkspaceEventHandler::handle_workspace_removed(self, ws)
            }
            Event::OverviewShown => {
                debug!("Overview shown, layout suspended");
                Ok(())
            }
            Event::OverviewHidden => WorkspaceEventHandler::handle_overview_hidden(self),
            Event::WindowAdded(ws, wid) => WindowEventHandler::handle_window_added(self, ws, wid),
            Event::WindowRemoved(ws, wid) => {
                WindowEventHandler::handle_window_removed(self, ws, wid)
            }
            Event::WindowPositionChanged(wid) => {
                WindowEventHandler::handle_position_changed(self, wid)
            }
            Event::WindowSizeChanged(wid) => WindowEventHandler::handle_size_changed(self, wid),
            Event::WindowFocused(wid) => WindowEventHandler::handle_window_focused(self, wid),
            Event::WindowShown(wid) => WindowEventHandler::handle_window_shown(self, wid),
            Event::DisplayWindowCreated(wid) => {
                WindowEventHandler::handle_display_window_created(self, wid)
            }
            Event::WindowUnmanaging(wid) => WindowEventHandler::handle_unmanaging(self, wid),
            Event::FocusWindowChanged(wid) => {
                WindowEventHandler::handle_focus_window_changed(self, wid)
            }
            Event::Command(command) => CommandEventHandler::handle_command(self, command),
        }
    }

    pub fn has_idle_tasks(&self) -> bool {
        !self.idle.is_empty()
    }

    /// Runs the tasks queued so far. Tasks queued while running wait for the
    /// next round.
    pub fn run_idle_tasks(&mut self) {
        let tasks: Vec<IdleTask> = self.idle.drain(..).collect();
        for task in tasks {
            trace!(?task, "Running idle task");
            if let Err(e) = self.run_idle_task(task) {
                warn!(?task, "Idle task failed: {e}");
            }
        }
    }

    fn run_idle_task(&mut self, task: IdleTask) -> Result<(), ReactorError> {
        match task {
            IdleTask::Present { workspace, wid } => {
                let Some(row) = self.rows.get(&workspace) else { return Ok(()) };
                let outcome =
                    row.rearrange(self.host.as_mut(), PassRequest::new(wid, true, true))?;
                self.after_pass(workspace, &outcome);
                if outcome.is_applied() {
                    self.move_cursor_onto(wid);
                }
            }
            IdleTask::Rearrange { workspace } => {
                let Some(row) = self.rows.get(&workspace) else { return Ok(()) };
                let Some(base) = row.last_focused(self.host.as_ref()) else { return Ok(()) };
                let outcome =
                    row.rearrange(self.host.as_mut(), PassRequest::new(base, true, true))?;
                self.after_pass(workspace, &outcome);
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn workspaces(&self) -> impl Iterator<Item = WorkspaceId> + '_ {
        self.rows.keys().copied()
    }

    pub fn row(&self, workspace: WorkspaceId) -> Option<&[WindowId]> {
        self.rows.get(&workspace).map(|row| row.managed())
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn pending_materializations(&self) -> usize {
        self.gate.len()
    }

    fn active_workspace(&self) -> Option<WorkspaceId> {
        self.host.active_workspace().filter(|ws| self.rows.contains_key(ws))
    }

    /// Workspaces whose registry holds `(wid, signal)`.
    fn rows_watching(&self, wid: WindowId, signal: WindowSignal) -> Vec<WorkspaceId> {
        self.rows
            .iter()
            .filter(|(_, row)| row.registry().is_subscribed(wid, signal))
            .map(|(ws, _)| *ws)
            .collect()
    }

    /// Workspaces whose registry holds any subscription for `wid`.
    fn rows_holding(&self, wid: WindowId) -> Vec<WorkspaceId> {
        self.rows
            .iter()
            .filter(|(_, row)| row.registry().watches(wid))
            .map(|(ws, _)| *ws)
            .collect()
    }

    fn after_pass(&self, workspace: WorkspaceId, outcome: &PassOutcome) {
        if outcome.is_applied() {
            self.notify_edges(workspace);
        }
    }

    fn notify_edges(&self, workspace: WorkspaceId) {
        let Some(row) = self.rows.get(&workspace) else { return };
        let (left, right) = overlay::row_edges(self.host.as_ref(), row.managed());
        self.send_overlay(overlay::Event::Edges { workspace, left, right });
    }

    fn send_overlay(&self, event: overlay::Event) {
        if let Some(tx) = &self.overlay_tx {
            tx.send(event);
        }
    }

    /// Sends the pointer onto `wid` unless it is already inside.
    fn move_cursor_onto(&self, wid: WindowId) {
        if !self.config.settings.cursor.follows_focus || self.host.overview_visible() {
            return;
        }
        let Some(tx) = &self.mouse_tx else { return };
        let Some(frame) = self.host.frame_rect(wid) else { return };
        let pointer = self.host.pointer();
        if frame.contains(pointer) {
            return;
        }
        let target = mouse::move_point(pointer, frame);
        tx.send(mouse::Request::MoveTo {
            target,
            duration: self.config.settings.animation.move_duration,
        });
    }
}
