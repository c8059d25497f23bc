//! Runs a reactor against the headless host.

use serde::Serialize;
use tracing::{debug, warn};

use super::{Event, Reactor, Record};
use crate::actor::{mouse, overlay};
use crate::common::config::Config;
use crate::sys::headless::scene::{Outcome, Scene};
use crate::sys::headless::{HeadlessHost, WindowSnapshot};
use crate::sys::host::Host;
use crate::sys::window::WorkspaceId;

const MAX_ROUNDS: usize = 1000;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RowReport {
    pub workspace: WorkspaceId,
    pub active: bool,
    pub windows: Vec<WindowSnapshot>,
}

/// Delivers the host's queued notifications and runs idle tasks until
/// neither produces more work. Returns the number of rounds it took.
pub fn pump(reactor: &mut Reactor, host: &HeadlessHost) -> usize {
    for round in 0..MAX_ROUNDS {
        let events = host.take_events();
        if events.is_empty() && !reactor.has_idle_tasks() {
            return round;
        }
        reactor.handle_events(events);
        reactor.run_idle_tasks();
    }
    warn!("Reactor did not settle after {MAX_ROUNDS} rounds");
    MAX_ROUNDS
}

pub fn simulate(
    config: Config,
    scene: &Scene,
    record: Record,
    mouse_tx: Option<mouse::Sender>,
    overlay_tx: Option<overlay::Sender>,
) -> anyhow::Result<Vec<RowReport>> {
    let host = scene.build()?;
    simulate_on(&host, config, scene, record, mouse_tx, overlay_tx)
}

/// Like [`simulate`], on a host the caller already built from `scene`.
pub fn simulate_on(
    host: &HeadlessHost,
    config: Config,
    scene: &Scene,
    record: Record,
    mouse_tx: Option<mouse::Sender>,
    overlay_tx: Option<overlay::Sender>,
) -> anyhow::Result<Vec<RowReport>> {
    let mut reactor = Reactor::new(config, Box::new(host.clone()), record, mouse_tx, overlay_tx);
    reactor.handle_event(Event::Enable);
    pump(&mut reactor, host);
    for step in &scene.steps {
        debug!(?step, "Scene step");
        if let Outcome::Command(command) = scene.apply(host, step)? {
            reactor.handle_event(Event::Command(command));
        }
        pump(&mut reactor, host);
    }
    Ok(report(&reactor, host))
}

pub fn report(reactor: &Reactor, host: &HeadlessHost) -> Vec<RowReport> {
    let active = host.active_workspace();
    reactor
        .workspaces()
        .map(|workspace| RowReport {
            workspace,
            active: active == Some(workspace),
            windows: reactor
                .row(workspace)
                .unwrap_or_default()
                .iter()
                .filter_map(|&wid| host.snapshot(wid))
                .collect(),
        })
        .collect()
}
