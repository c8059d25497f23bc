//! An in-memory window system.
//!
//! [`HeadlessHost`] implements [`Host`] over plain data and doubles as the
//! driver for it: tests and the simulator open, show, focus and close windows
//! through it the way a user would. Notifications are only produced for
//! connected `(window, signal)` pairs, like a real compositor, and are either
//! queued (see [`HeadlessHost::take_events`]) or forwarded to a reactor.
//!
//! Handles are cheap clones sharing the same state.

pub mod scene;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use slotmap::{DefaultKey, Key, KeyData, SlotMap};
use tracing::{debug, trace, warn};

use super::geometry::{Point, Rect, Size};
use super::host::{
    DisplayMetrics, DisplaySignal, Host, HostError, SignalHandle, WindowSignal,
};
use super::window::{ClientType, WindowFlags, WindowId, WindowInfo, WindowType, WorkspaceId};
use crate::actor::mouse::PointerDevice;
use crate::actor::reactor::{self, Event};
use crate::common::collections::{BTreeMap, VecDeque};

/// Client-side decoration extents around the frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const fn uniform(n: i32) -> Self {
        Insets { left: n, top: n, right: n, bottom: n }
    }

    fn around(&self, frame: Rect) -> Rect {
        Rect::new(
            frame.origin.x - self.left,
            frame.origin.y - self.top,
            frame.size.width + self.left + self.right,
            frame.size.height + self.top + self.bottom,
        )
    }
}

#[derive(Debug, Clone)]
pub struct WindowSpec {
    pub title: String,
    pub workspace: Option<WorkspaceId>,
    pub frame: Rect,
    pub window_type: WindowType,
    pub client_type: ClientType,
    pub flags: WindowFlags,
    pub transient_for: Option<WindowId>,
    pub decoration: Insets,
    pub surfaced: bool,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>, frame: Rect) -> Self {
        Self {
            title: title.into(),
            workspace: None,
            frame,
            window_type: WindowType::Normal,
            client_type: ClientType::Wayland,
            flags: WindowFlags::empty(),
            transient_for: None,
            decoration: Insets::default(),
            surfaced: true,
        }
    }

    pub fn on(mut self, workspace: WorkspaceId) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn of_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn client(mut self, client_type: ClientType) -> Self {
        self.client_type = client_type;
        self
    }

    pub fn flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn transient_for(mut self, parent: WindowId) -> Self {
        self.transient_for = Some(parent);
        self
    }

    pub fn decorated(mut self, insets: Insets) -> Self {
        self.decoration = insets;
        self
    }

    pub fn unsurfaced(mut self) -> Self {
        self.surfaced = false;
        self
    }
}

/// One visual-surface move issued by the layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub wid: WindowId,
    pub surface: Point,
    pub animated: bool,
}

/// Public view of a window, used for simulator output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub title: String,
    pub frame: Rect,
    pub flags: WindowFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connection {
    Window(WindowId, WindowSignal),
    Display(DisplaySignal),
    Workspace(WorkspaceId),
}

#[derive(Debug)]
struct HeadlessWindow {
    info: WindowInfo,
    workspace: WorkspaceId,
    frame: Rect,
    decoration: Insets,
    surface: Option<Point>,
    reject_moves: bool,
}

impl HeadlessWindow {
    fn buffer(&self) -> Rect {
        self.decoration.around(self.frame)
    }

    fn sync_surface(&mut self) {
        if self.surface.is_some() {
            self.surface = Some(self.buffer().origin);
        }
    }
}

#[derive(Debug)]
struct HeadlessState {
    display: DisplayMetrics,
    overview: bool,
    workspaces: Vec<WorkspaceId>,
    active: WorkspaceId,
    next_workspace: u32,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    next_window: u64,
    /// Windows that have been focused, most recent first.
    mru: Vec<WindowId>,
    focus: Option<WindowId>,
    connections: SlotMap<DefaultKey, Connection>,
    moves: Vec<MoveRecord>,
    events: VecDeque<Event>,
    sender: Option<reactor::Sender>,
    time: u32,
}

impl HeadlessState {
    fn emit(&mut self, event: Event) {
        trace!(?event, "Emitting");
        match &self.sender {
            Some(tx) => tx.send(event),
            None => self.events.push_back(event),
        }
    }

    fn is_connected(&self, wanted: Connection) -> bool {
        self.connections.values().any(|c| *c == wanted)
    }

    fn emit_window(&mut self, wid: WindowId, signal: WindowSignal) {
        if self.is_connected(Connection::Window(wid, signal)) {
            self.emit(window_event(wid, signal));
        }
    }

    fn window(&self, wid: WindowId) -> Result<&HeadlessWindow, HostError> {
        self.windows.get(&wid).ok_or(HostError::UnknownWindow(wid))
    }

    fn window_mut(&mut self, wid: WindowId) -> Result<&mut HeadlessWindow, HostError> {
        self.windows.get_mut(&wid).ok_or(HostError::UnknownWindow(wid))
    }

    fn movable(&mut self, wid: WindowId) -> Result<&mut HeadlessWindow, HostError> {
        let window = self.window_mut(wid)?;
        if window.reject_moves {
            return Err(HostError::Rejected(format!("moves of {wid} are rejected")));
        }
        Ok(window)
    }

    fn set_focus(&mut self, wid: WindowId) {
        self.time += 1;
        self.focus = Some(wid);
        self.mru.retain(|&w| w != wid);
        self.mru.insert(0, wid);
        self.emit_window(wid, WindowSignal::Focus);
        self.emit(Event::FocusWindowChanged(Some(wid)));
    }
}

fn window_event(wid: WindowId, signal: WindowSignal) -> Event {
    match signal {
        WindowSignal::PositionChanged => Event::WindowPositionChanged(wid),
        WindowSignal::SizeChanged => Event::WindowSizeChanged(wid),
        WindowSignal::Focus => Event::WindowFocused(wid),
        WindowSignal::Shown => Event::WindowShown(wid),
        WindowSignal::Unmanaging => Event::WindowUnmanaging(wid),
    }
}

type MoveHook = Box<dyn FnMut(&mut HeadlessHost, WindowId)>;

#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
    pointer: Arc<Mutex<Point>>,
    move_hook: Rc<RefCell<Option<MoveHook>>>,
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost").field("state", &self.state).finish_non_exhaustive()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::with_display(DisplayMetrics::default())
    }

    pub fn with_display(display: DisplayMetrics) -> Self {
        let first = WorkspaceId::new(0);
        let state = HeadlessState {
            display,
            overview: false,
            workspaces: vec![first],
            active: first,
            next_workspace: 1,
            windows: BTreeMap::new(),
            next_window: 1,
            mru: Vec::new(),
            focus: None,
            connections: SlotMap::new(),
            moves: Vec::new(),
            events: VecDeque::new(),
            sender: None,
            time: 0,
        };
        HeadlessHost {
            state: Rc::new(RefCell::new(state)),
            pointer: Arc::new(Mutex::new(Point::ZERO)),
            move_hook: Rc::new(RefCell::new(None)),
        }
    }

    /// Sends notifications to `tx` from now on, starting with anything
    /// already queued.
    pub fn forward_events(&self, tx: reactor::Sender) {
        let mut state = self.state.borrow_mut();
        for event in state.events.drain(..) {
            tx.send(event);
        }
        state.sender = Some(tx);
    }

    pub fn take_events(&self) -> Vec<Event> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.state.borrow().events.is_empty()
    }

    /// Runs `hook` synchronously inside every frame move, after the move took
    /// effect. Moves issued from inside the hook do not trigger it again.
    pub fn set_move_hook(&self, hook: impl FnMut(&mut HeadlessHost, WindowId) + 'static) {
        *self.move_hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn pointer_device(&self) -> HeadlessPointer {
        HeadlessPointer {
            position: self.pointer.clone(),
            ripples: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // Setup.

    /// Adds an existing window without notifying anyone.
    pub fn add_window(&self, spec: WindowSpec) -> WindowId {
        let mut state = self.state.borrow_mut();
        let wid = WindowId::new(state.next_window);
        state.next_window += 1;
        let workspace = spec.workspace.unwrap_or(state.active);
        let window = HeadlessWindow {
            info: WindowInfo {
                id: wid,
                title: spec.title,
                window_type: spec.window_type,
                client_type: spec.client_type,
                flags: spec.flags,
                transient_for: spec.transient_for,
            },
            workspace,
            frame: spec.frame,
            decoration: spec.decoration,
            surface: spec.surfaced.then(|| spec.decoration.around(spec.frame).origin),
            reject_moves: false,
        };
        state.windows.insert(wid, window);
        wid
    }

    /// Shorthand for a plain materialized window on the active workspace.
    pub fn spawn_window(&self, title: &str, x: i32, width: i32) -> WindowId {
        self.add_window(WindowSpec::new(title, Rect::new(x, 100, width, 600)))
    }

    pub fn add_workspace(&self) -> WorkspaceId {
        let mut state = self.state.borrow_mut();
        let ws = WorkspaceId::new(state.next_workspace);
        state.next_workspace += 1;
        state.workspaces.push(ws);
        state.emit(Event::WorkspaceAdded(ws));
        ws
    }

    /// Removes `ws`, moving its windows to the first remaining workspace.
    pub fn remove_workspace(&self, ws: WorkspaceId) {
        let mut state = self.state.borrow_mut();
        if state.workspaces.len() <= 1 || !state.workspaces.contains(&ws) {
            warn!(?ws, "Refusing to remove workspace");
            return;
        }
        state.workspaces.retain(|&w| w != ws);
        let fallback = state.workspaces[0];
        for window in state.windows.values_mut().filter(|w| w.workspace == ws) {
            window.workspace = fallback;
        }
        if state.active == ws {
            state.active = fallback;
        }
        state.connections.retain(|_, c| *c != Connection::Workspace(ws));
        state.emit(Event::WorkspaceRemoved(ws));
    }

    pub fn activate_workspace(&self, ws: WorkspaceId) {
        let mut state = self.state.borrow_mut();
        if state.workspaces.contains(&ws) {
            state.active = ws;
        }
    }

    pub fn active(&self) -> WorkspaceId {
        self.state.borrow().active
    }

    // User actions.

    /// Creates a window that has not materialized yet and announces it.
    pub fn open_window(&self, spec: WindowSpec) -> WindowId {
        let wid = self.add_window(spec.unsurfaced());
        let mut state = self.state.borrow_mut();
        let ws = state.windows[&wid].workspace;
        if state.is_connected(Connection::Workspace(ws)) {
            state.emit(Event::WindowAdded(ws, wid));
        }
        wid
    }

    /// Gives the window its visual surface.
    pub fn show_window(&self, wid: WindowId) {
        let mut state = self.state.borrow_mut();
        let Some(window) = state.windows.get_mut(&wid) else { return };
        if window.surface.is_some() {
            return;
        }
        window.surface = Some(window.buffer().origin);
        state.emit_window(wid, WindowSignal::Shown);
        if state.is_connected(Connection::Display(DisplaySignal::WindowCreated)) {
            state.emit(Event::DisplayWindowCreated(wid));
        }
    }

    pub fn close_window(&self, wid: WindowId) {
        let mut state = self.state.borrow_mut();
        if !state.windows.contains_key(&wid) {
            return;
        }
        state.emit_window(wid, WindowSignal::Unmanaging);
        let Some(window) = state.windows.remove(&wid) else { return };
        state.connections.retain(|_, c| !matches!(c, Connection::Window(w, _) if *w == wid));
        state.mru.retain(|&w| w != wid);
        if state.is_connected(Connection::Workspace(window.workspace)) {
            state.emit(Event::WindowRemoved(window.workspace, wid));
        }
        if state.focus == Some(wid) {
            let next = state.mru.iter().copied().find(|w| {
                state.windows.get(w).is_some_and(|w| w.workspace == window.workspace)
            });
            match next {
                Some(next) => state.set_focus(next),
                None => {
                    state.focus = None;
                    state.emit(Event::FocusWindowChanged(None));
                }
            }
        }
    }

    /// Focuses the window the way a click would.
    pub fn focus(&self, wid: WindowId) {
        let mut state = self.state.borrow_mut();
        let Some(window) = state.windows.get_mut(&wid) else { return };
        window.info.flags.remove(WindowFlags::MINIMIZED);
        state.set_focus(wid);
    }

    /// User-driven resize, keeping the origin.
    pub fn resize(&self, wid: WindowId, size: Size) {
        let mut state = self.state.borrow_mut();
        let Some(window) = state.windows.get_mut(&wid) else { return };
        if window.frame.size == size {
            return;
        }
        window.frame.size = size;
        window.sync_surface();
        state.emit_window(wid, WindowSignal::SizeChanged);
    }

    /// User-driven move, e.g. a drag.
    pub fn user_move(&self, wid: WindowId, to: Point) {
        let mut state = self.state.borrow_mut();
        let Some(window) = state.windows.get_mut(&wid) else { return };
        if window.frame.origin == to {
            return;
        }
        window.frame.origin = to;
        window.sync_surface();
        state.emit_window(wid, WindowSignal::PositionChanged);
    }

    pub fn set_flag(&self, wid: WindowId, flag: WindowFlags, on: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&wid) {
            window.info.flags.set(flag, on);
        }
    }

    pub fn set_overview(&self, visible: bool) {
        let mut state = self.state.borrow_mut();
        if state.overview == visible {
            return;
        }
        state.overview = visible;
        state.emit(if visible { Event::OverviewShown } else { Event::OverviewHidden });
    }

    pub fn set_pointer(&self, to: Point) {
        *self.pointer.lock() = to;
    }

    /// Moves only the visual surface horizontally, leaving the frame alone.
    pub fn set_surface(&self, wid: WindowId, x: i32) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&wid)
            && let Some(surface) = &mut window.surface
        {
            surface.x = x;
        }
    }

    pub fn reject_moves(&self, wid: WindowId, reject: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&wid) {
            window.reject_moves = reject;
        }
    }

    // Inspection.

    /// Frame of `wid`, or [`Rect::ZERO`] for unknown windows.
    pub fn frame(&self, wid: WindowId) -> Rect {
        self.state.borrow().windows.get(&wid).map_or(Rect::ZERO, |w| w.frame)
    }

    pub fn find(&self, title: &str) -> Option<WindowId> {
        let state = self.state.borrow();
        state.windows.iter().find(|(_, w)| w.info.title == title).map(|(wid, _)| *wid)
    }

    pub fn snapshot(&self, wid: WindowId) -> Option<WindowSnapshot> {
        let state = self.state.borrow();
        let window = state.windows.get(&wid)?;
        Some(WindowSnapshot {
            id: wid,
            title: window.info.title.clone(),
            frame: window.frame,
            flags: window.info.flags,
        })
    }

    pub fn moves(&self) -> Vec<MoveRecord> {
        self.state.borrow().moves.clone()
    }

    pub fn clear_moves(&self) {
        self.state.borrow_mut().moves.clear();
    }

    pub fn connection_count(&self, wid: WindowId) -> usize {
        let state = self.state.borrow();
        state.connections.values().filter(|c| matches!(c, Connection::Window(w, _) if *w == wid)).count()
    }

    pub fn display_connection_count(&self) -> usize {
        let state = self.state.borrow();
        state.connections.values().filter(|c| matches!(c, Connection::Display(_))).count()
    }

    pub fn workspace_connection_count(&self, ws: WorkspaceId) -> usize {
        let state = self.state.borrow();
        state.connections.values().filter(|c| **c == Connection::Workspace(ws)).count()
    }

    fn connect(&self, connection: Connection) -> SignalHandle {
        let key = self.state.borrow_mut().connections.insert(connection);
        SignalHandle(key.data().as_ffi())
    }

    fn disconnect(&self, handle: SignalHandle) -> Option<Connection> {
        let key: DefaultKey = KeyData::from_ffi(handle.0).into();
        self.state.borrow_mut().connections.remove(key)
    }

    fn run_move_hook(&mut self, wid: WindowId) {
        let hook = self.move_hook.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(self, wid);
            let mut slot = self.move_hook.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

impl Host for HeadlessHost {
    fn display_metrics(&self) -> DisplayMetrics {
        self.state.borrow().display
    }

    fn overview_visible(&self) -> bool {
        self.state.borrow().overview
    }

    fn workspaces(&self) -> Vec<WorkspaceId> {
        self.state.borrow().workspaces.clone()
    }

    fn active_workspace(&self) -> Option<WorkspaceId> {
        Some(self.state.borrow().active)
    }

    fn workspace_windows(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        let state = self.state.borrow();
        state
            .windows
            .iter()
            .filter(|(_, w)| w.workspace == workspace || w.info.is_on_all_workspaces())
            .map(|(wid, _)| *wid)
            .collect()
    }

    fn tab_list(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        let state = self.state.borrow();
        state
            .mru
            .iter()
            .copied()
            .filter(|w| state.windows.get(w).is_some_and(|w| w.workspace == workspace))
            .collect()
    }

    fn focus_window(&self) -> Option<WindowId> {
        self.state.borrow().focus
    }

    fn window_info(&self, wid: WindowId) -> Option<WindowInfo> {
        self.state.borrow().windows.get(&wid).map(|w| w.info.clone())
    }

    fn frame_rect(&self, wid: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&wid).map(|w| w.frame)
    }

    fn buffer_rect(&self, wid: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&wid).map(|w| w.buffer())
    }

    fn surface_position(&self, wid: WindowId) -> Option<Point> {
        self.state.borrow().windows.get(&wid).and_then(|w| w.surface)
    }

    fn transient_children(&self, wid: WindowId) -> Vec<WindowId> {
        let state = self.state.borrow();
        state
            .windows
            .iter()
            .filter(|(_, w)| w.info.transient_for == Some(wid))
            .map(|(child, _)| *child)
            .collect()
    }

    fn pointer(&self) -> Point {
        *self.pointer.lock()
    }

    fn current_time(&self) -> u32 {
        self.state.borrow().time
    }

    fn move_frame(&mut self, wid: WindowId, position: Point) -> Result<(), HostError> {
        {
            let mut state = self.state.borrow_mut();
            let window = state.movable(wid)?;
            let changed = window.frame.origin != position;
            window.frame.origin = position;
            window.sync_surface();
            if changed {
                state.emit_window(wid, WindowSignal::PositionChanged);
            }
        }
        self.run_move_hook(wid);
        Ok(())
    }

    fn move_resize_frame(&mut self, wid: WindowId, frame: Rect) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let window = state.movable(wid)?;
        let moved = window.frame.origin != frame.origin;
        let resized = window.frame.size != frame.size;
        window.frame = frame;
        window.sync_surface();
        if resized {
            state.emit_window(wid, WindowSignal::SizeChanged);
        }
        if moved {
            state.emit_window(wid, WindowSignal::PositionChanged);
        }
        Ok(())
    }

    fn set_surface_position(&mut self, wid: WindowId, position: Point) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let window = state.movable(wid)?;
        let surface = window.surface.as_mut().ok_or(HostError::NoSurface(wid))?;
        *surface = position;
        state.moves.push(MoveRecord { wid, surface: position, animated: false });
        Ok(())
    }

    fn ease_surface(
        &mut self,
        wid: WindowId,
        position: Point,
        duration: Duration,
    ) -> Result<(), HostError> {
        trace!(?wid, ?position, ?duration, "Easing surface");
        // Animations complete immediately.
        let mut state = self.state.borrow_mut();
        let window = state.movable(wid)?;
        let surface = window.surface.as_mut().ok_or(HostError::NoSurface(wid))?;
        *surface = position;
        state.moves.push(MoveRecord { wid, surface: position, animated: true });
        Ok(())
    }

    fn activate(&mut self, wid: WindowId, timestamp: u32) -> Result<(), HostError> {
        debug!(?wid, timestamp, "Activating");
        self.state.borrow().window(wid)?;
        self.focus(wid);
        Ok(())
    }

    fn set_floating(&mut self, wid: WindowId, floating: bool) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let active = state.active;
        let window = state.window_mut(wid)?;
        window.info.flags.set(WindowFlags::ON_ALL_WORKSPACES | WindowFlags::ABOVE, floating);
        // Unpinning leaves the window on the workspace it is seen on.
        if !floating {
            window.workspace = active;
        }
        Ok(())
    }

    fn connect_window(&mut self, wid: WindowId, signal: WindowSignal) -> SignalHandle {
        self.connect(Connection::Window(wid, signal))
    }

    fn disconnect_window(&mut self, wid: WindowId, handle: SignalHandle) {
        if self.disconnect(handle).is_none() {
            trace!(?wid, ?handle, "Connection already gone");
        }
    }

    fn connect_display(&mut self, signal: DisplaySignal) -> SignalHandle {
        self.connect(Connection::Display(signal))
    }

    fn disconnect_display(&mut self, handle: SignalHandle) {
        self.disconnect(handle);
    }

    fn connect_workspace(&mut self, workspace: WorkspaceId) -> SignalHandle {
        self.connect(Connection::Workspace(workspace))
    }

    fn disconnect_workspace(&mut self, workspace: WorkspaceId, handle: SignalHandle) {
        if self.disconnect(handle).is_none() {
            trace!(?workspace, ?handle, "Connection already gone");
        }
    }
}

/// Pointer shared with a [`HeadlessHost`], usable from the mouse actor's
/// thread.
#[derive(Debug, Clone)]
pub struct HeadlessPointer {
    position: Arc<Mutex<Point>>,
    ripples: Arc<Mutex<Vec<Point>>>,
}

impl HeadlessPointer {
    /// Points where a finished motion was signalled.
    pub fn ripples(&self) -> Vec<Point> {
        self.ripples.lock().clone()
    }
}

impl PointerDevice for HeadlessPointer {
    fn position(&self) -> Point {
        *self.position.lock()
    }

    fn warp(&mut self, to: Point) {
        *self.position.lock() = to;
    }

    fn motion_finished(&mut self, at: Point) {
        self.ripples.lock().push(at);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn only_connected_signals_are_emitted() {
        let mut host = HeadlessHost::new();
        let a = host.spawn_window("a", 0, 300);

        host.user_move(a, Point::new(10, 100));
        assert!(host.take_events().is_empty());

        host.connect_window(a, WindowSignal::PositionChanged);
        host.user_move(a, Point::new(20, 100));
        // Unchanged positions stay silent.
        host.move_frame(a, Point::new(20, 100)).unwrap();
        assert_eq!(host.take_events(), vec![Event::WindowPositionChanged(a)]);
    }

    #[test]
    fn materialization_signals() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        host.connect_workspace(ws);
        host.connect_display(DisplaySignal::WindowCreated);

        let wid = host.open_window(WindowSpec::new("a", Rect::new(0, 0, 100, 100)));
        assert!(!host.has_surface(wid));
        host.connect_window(wid, WindowSignal::Shown);
        host.show_window(wid);

        assert!(host.has_surface(wid));
        assert_eq!(
            host.take_events(),
            vec![
                Event::WindowAdded(ws, wid),
                Event::WindowShown(wid),
                Event::DisplayWindowCreated(wid),
            ]
        );
    }

    #[test]
    fn closing_focused_window_focuses_previous() {
        let mut host = HeadlessHost::new();
        let ws = host.active();
        let a = host.spawn_window("a", 0, 300);
        let b = host.spawn_window("b", 400, 300);
        host.focus(a);
        host.focus(b);
        host.connect_workspace(ws);
        host.take_events();

        host.close_window(b);

        assert_eq!(host.focus_window(), Some(a));
        assert_eq!(host.tab_list(ws), vec![a]);
        assert_eq!(
            host.take_events(),
            vec![Event::WindowRemoved(ws, b), Event::FocusWindowChanged(Some(a))]
        );
    }

    #[test]
    fn disconnect_releases_handle() {
        let mut host = HeadlessHost::new();
        let a = host.spawn_window("a", 0, 300);
        let handle = host.connect_window(a, WindowSignal::Focus);
        assert_eq!(host.connection_count(a), 1);
        host.disconnect_window(a, handle);
        host.disconnect_window(a, handle);
        assert_eq!(host.connection_count(a), 0);
    }

    #[test]
    fn floating_sets_flags() {
        let mut host = HeadlessHost::new();
        let a = host.spawn_window("a", 0, 300);
        host.set_floating(a, true).unwrap();
        let info = host.window_info(a).unwrap();
        assert!(info.is_on_all_workspaces());
        assert!(info.flags.contains(WindowFlags::ABOVE));
        host.set_floating(a, false).unwrap();
        assert_eq!(host.window_info(a).unwrap().flags, WindowFlags::empty());
    }
}
