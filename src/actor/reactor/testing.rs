use super::simulate::pump;
use super::{Command, Event, Reactor, Record};
use crate::actor::{self, mouse, overlay};
use crate::common::config::Config;
use crate::sys::geometry::Rect;
use crate::sys::headless::{HeadlessHost, WindowSpec};
use crate::sys::window::{ClientType, WindowId, WorkspaceId};

/// A reactor wired to a headless host, with the outbound actors replaced by
/// channels the test reads from.
pub struct Harness {
    pub host: HeadlessHost,
    pub reactor: Reactor,
    mouse_rx: mouse::Receiver,
    overlay_rx: overlay::Receiver,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::on_host(HeadlessHost::new(), config)
    }

    pub fn on_host(host: HeadlessHost, config: Config) -> Self {
        let (mouse_tx, mouse_rx) = actor::channel();
        let (overlay_tx, overlay_rx) = actor::channel();
        let reactor = Reactor::new(
            config,
            Box::new(host.clone()),
            Record::none(),
            Some(mouse_tx),
            Some(overlay_tx),
        );
        Harness { host, reactor, mouse_rx, overlay_rx }
    }

    /// Spawns windows of the given widths packed from x=0, focuses the first
    /// one and enables the reactor. Outbound messages sent so far are
    /// discarded.
    pub fn enabled(widths: &[i32]) -> (Self, Vec<WindowId>) {
        let mut harness = Self::new();
        let wids = harness.spawn_row(widths);
        harness.enable(&wids);
        (harness, wids)
    }

    pub fn spawn_row(&self, widths: &[i32]) -> Vec<WindowId> {
        let mut x = 0;
        widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let wid = self.host.spawn_window(&format!("w{i}"), x, width);
                x += width + 16;
                wid
            })
            .collect()
    }

    pub fn enable(&mut self, wids: &[WindowId]) {
        if let Some(&first) = wids.first() {
            self.host.focus(first);
        }
        self.handle(Event::Enable);
        self.host.clear_moves();
        self.mouse_requests();
        self.overlay_events();
    }

    pub fn ws(&self) -> WorkspaceId {
        self.host.active()
    }

    pub fn pump(&mut self) -> usize {
        pump(&mut self.reactor, &self.host)
    }

    pub fn handle(&mut self, event: Event) {
        self.reactor.handle_event(event);
        self.pump();
    }

    pub fn command(&mut self, command: Command) {
        self.handle(Event::Command(command));
    }

    pub fn focus(&mut self, wid: WindowId) {
        self.host.focus(wid);
        self.pump();
    }

    /// Opens a window that materializes later, and delivers the
    /// notification.
    pub fn open(&mut self, title: &str, width: i32, client: ClientType) -> WindowId {
        let wid = self
            .host
            .open_window(WindowSpec::new(title, Rect::new(0, 100, width, 600)).client(client));
        self.pump();
        wid
    }

    pub fn show(&mut self, wid: WindowId) {
        self.host.show_window(wid);
        self.pump();
    }

    pub fn row(&self) -> Vec<WindowId> {
        self.reactor.row(self.ws()).unwrap_or_default().to_vec()
    }

    /// Frame x of every row window, in row order.
    pub fn xs(&self) -> Vec<i32> {
        self.row().iter().map(|&wid| self.host.frame(wid).origin.x).collect()
    }

    pub fn mouse_requests(&mut self) -> Vec<mouse::Request> {
        let mut requests = Vec::new();
        while let Ok((_, request)) = self.mouse_rx.try_recv() {
            requests.push(request);
        }
        requests
    }

    pub fn overlay_events(&mut self) -> Vec<overlay::Event> {
        let mut events = Vec::new();
        while let Ok((_, event)) = self.overlay_rx.try_recv() {
            events.push(event);
        }
        events
    }
}
