//! Outbound decorations: the focus highlight and the screen-edge indicators
//! that tell the user windows continue off-screen.

use tracing::{debug, error, info};

use crate::actor;
use crate::common::collections::HashMap;
use crate::sys::geometry::Rect;
use crate::sys::host::Host;
use crate::sys::window::{WindowId, WorkspaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Outline `window`; `rect` is relative to its visual surface.
    Highlight { window: WindowId, rect: Rect },
    ClearHighlight,
    Edges { workspace: WorkspaceId, left: bool, right: bool },
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub trait OverlaySurface: Send {
    fn highlight(&mut self, window: WindowId, rect: Rect);

    fn clear_highlight(&mut self);

    fn edges(&mut self, workspace: WorkspaceId, left: bool, right: bool);
}

/// Highlight geometry around a window's frame, in surface-local coordinates
/// and unscaled units.
pub fn highlight_rect(frame: Rect, buffer: Rect, scale: i32, base_spacing: i32) -> Rect {
    let scale = scale.max(1);
    let border = base_spacing / 2;
    Rect::new(
        (frame.origin.x - buffer.origin.x) / scale - border,
        (frame.origin.y - buffer.origin.y) / scale - border,
        frame.size.width / scale + border * 2,
        frame.size.height / scale + border * 2,
    )
}

/// Whether any laid-out row window extends past the left or right display
/// edge.
pub fn row_edges(host: &dyn Host, row: &[WindowId]) -> (bool, bool) {
    let width = host.display_metrics().width;
    let frames = row.iter().filter_map(|&wid| {
        let info = host.window_info(wid)?;
        if info.is_minimized() || !host.has_surface(wid) {
            return None;
        }
        host.frame_rect(wid)
    });
    let (mut left, mut right) = (false, false);
    for frame in frames {
        left |= frame.min_x() < 0;
        right |= frame.max_x() > width;
    }
    (left, right)
}

/// Surface that only logs; used when no compositor overlay is attached.
#[derive(Debug, Default)]
pub struct LogSurface;

impl OverlaySurface for LogSurface {
    fn highlight(&mut self, window: WindowId, rect: Rect) {
        info!(?window, ?rect, "highlight");
    }

    fn clear_highlight(&mut self) {
        info!("highlight cleared");
    }

    fn edges(&mut self, workspace: WorkspaceId, left: bool, right: bool) {
        info!(?workspace, left, right, "edges");
    }
}

pub struct Overlay {
    surface: Box<dyn OverlaySurface>,
    edges: HashMap<WorkspaceId, (bool, bool)>,
}

impl Overlay {
    pub fn new(surface: Box<dyn OverlaySurface>) -> Self {
        Self { surface, edges: HashMap::default() }
    }

    pub fn spawn(overlay: Overlay) -> Sender {
        let (tx, rx) = actor::channel();
        let spawned = std::thread::Builder::new().name("overlay".to_string()).spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().build();
            match runtime {
                Ok(runtime) => runtime.block_on(overlay.run(rx)),
                Err(e) => error!("Could not start overlay runtime: {e}"),
            }
        });
        if let Err(e) = spawned {
            error!("Could not spawn overlay thread: {e}");
        }
        tx
    }

    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Highlight { window, rect } => self.surface.highlight(window, rect),
            Event::ClearHighlight => self.surface.clear_highlight(),
            Event::Edges { workspace, left, right } => {
                if self.edges.insert(workspace, (left, right)) == Some((left, right)) {
                    return;
                }
                debug!(?workspace, left, right, "Edge indicators changed");
                self.surface.edges(workspace, left, right);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::sys::headless::HeadlessHost;
    use crate::sys::window::WindowFlags;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl OverlaySurface for Recorder {
        fn highlight(&mut self, window: WindowId, rect: Rect) {
            self.0.lock().push(Event::Highlight { window, rect });
        }

        fn clear_highlight(&mut self) {
            self.0.lock().push(Event::ClearHighlight);
        }

        fn edges(&mut self, workspace: WorkspaceId, left: bool, right: bool) {
            self.0.lock().push(Event::Edges { workspace, left, right });
        }
    }

    #[test]
    fn highlight_rect_surrounds_frame() {
        let frame = Rect::new(112, 108, 400, 300);
        let buffer = Rect::new(100, 100, 424, 320);
        assert_eq!(highlight_rect(frame, buffer, 1, 16), Rect::new(4, 0, 416, 316));
        assert_eq!(highlight_rect(frame, buffer, 2, 16), Rect::new(-2, -4, 216, 166));
    }

    #[test]
    fn edges_ignore_minimized_windows() {
        let host = HeadlessHost::new();
        let a = host.spawn_window("a", -100, 300);
        let b = host.spawn_window("b", 300, 300);
        let c = host.spawn_window("c", 1800, 300);
        assert_eq!(row_edges(&host, &[a, b, c]), (true, true));
        host.set_flag(a, WindowFlags::MINIMIZED, true);
        assert_eq!(row_edges(&host, &[a, b, c]), (false, true));
        assert_eq!(row_edges(&host, &[b]), (false, false));
    }

    #[test]
    fn duplicate_edge_states_are_suppressed() {
        let recorder = Recorder::default();
        let mut overlay = Overlay::new(Box::new(recorder.clone()));
        let ws = WorkspaceId::new(0);
        let other = WorkspaceId::new(1);

        overlay.handle_event(Event::Edges { workspace: ws, left: true, right: false });
        overlay.handle_event(Event::Edges { workspace: ws, left: true, right: false });
        overlay.handle_event(Event::Edges { workspace: other, left: true, right: false });
        overlay.handle_event(Event::Edges { workspace: ws, left: false, right: false });
        overlay.handle_event(Event::ClearHighlight);

        assert_eq!(
            *recorder.0.lock(),
            vec![
                Event::Edges { workspace: ws, left: true, right: false },
                Event::Edges { workspace: other, left: true, right: false },
                Event::Edges { workspace: ws, left: false, right: false },
                Event::ClearHighlight,
            ]
        );
    }
}
