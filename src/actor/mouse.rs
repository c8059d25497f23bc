//! Moves the pointer onto windows that gain focus.
//!
//! The reactor only sends [`Request`]s. Motion is broken into one point per
//! frame and played back on a timer; a newer request appends its path to
//! whatever is still pending.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, trace};

use crate::actor;
use crate::common::collections::VecDeque;
use crate::common::config::CursorSettings;
use crate::sys::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    MoveTo { target: Point, duration: Duration },
}

pub type Sender = actor::Sender<Request>;
pub type Receiver = actor::Receiver<Request>;

/// The pointer as seen by the mouse actor.
pub trait PointerDevice: Send {
    fn position(&self) -> Point;

    fn warp(&mut self, to: Point);

    /// Called with the final point once an animated motion completes.
    fn motion_finished(&mut self, _at: Point) {}
}

const SPLIT: i32 = 3;

/// Picks the point inside `rect` the pointer should travel to: the nearest of
/// the four inner points of a 3x3 grid over the rect.
pub fn move_point(cursor: Point, rect: Rect) -> Point {
    let mut candidates = Vec::with_capacity(4);
    for i in 1..SPLIT {
        for j in 1..SPLIT {
            candidates.push(Point::new(
                rect.origin.x + rect.size.width * i / SPLIT,
                rect.origin.y + rect.size.height * j / SPLIT,
            ));
        }
    }
    candidates
        .into_iter()
        .min_by(|a, b| cursor.distance_to(*a).total_cmp(&cursor.distance_to(*b)))
        .unwrap_or(rect.origin)
}

pub fn frame_interval(fps: f64) -> Duration {
    Duration::from_millis((1000.0 / fps).floor().max(1.0) as u64)
}

/// The per-frame points of a motion from `from` to `to`, ending at `to`.
pub fn motion_path(from: Point, to: Point, duration: Duration, fps: f64, animate: bool) -> Vec<Point> {
    let interval = frame_interval(fps).as_millis();
    let frames = (duration.as_millis() / interval) as i32;
    if !animate || frames == 0 {
        return vec![to];
    }
    let lerp = |a: i32, b: i32, i: i32| {
        (f64::from(a) + f64::from(i) * f64::from(b - a) / f64::from(frames)).floor() as i32
    };
    let mut path: Vec<Point> =
        (1..frames).map(|i| Point::new(lerp(from.x, to.x, i), lerp(from.y, to.y, i))).collect();
    path.push(to);
    path
}

pub struct Mouse {
    device: Box<dyn PointerDevice>,
    fps: f64,
    animate: bool,
    pending: VecDeque<Point>,
}

impl Mouse {
    pub fn new(settings: &CursorSettings, animate: bool, device: Box<dyn PointerDevice>) -> Self {
        Self {
            device,
            fps: settings.fps,
            animate,
            pending: VecDeque::new(),
        }
    }

    pub fn spawn(mouse: Mouse) -> Sender {
        let (tx, rx) = actor::channel();
        let spawned = std::thread::Builder::new().name("mouse".to_string()).spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build();
            match runtime {
                Ok(runtime) => runtime.block_on(mouse.run(rx)),
                Err(e) => error!("Could not start mouse runtime: {e}"),
            }
        });
        if let Err(e) = spawned {
            error!("Could not spawn mouse thread: {e}");
        }
        tx
    }

    /// Runs until every sender is gone and pending motion has played out.
    pub async fn run(mut self, mut requests: Receiver) {
        let mut ticks = tokio::time::interval(frame_interval(self.fps));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut open = true;
        loop {
            tokio::select! {
                request = requests.recv(), if open => match request {
                    Some((span, request)) => {
                        let _guard = span.enter();
                        self.handle_request(request);
                    }
                    None => open = false,
                },
                _ = ticks.tick(), if !self.pending.is_empty() => self.step(),
            }
            if !open && self.pending.is_empty() {
                break;
            }
        }
    }

    fn handle_request(&mut self, request: Request) {
        match request {
            Request::MoveTo { target, duration } => {
                let from = self.device.position();
                let path = motion_path(from, target, duration, self.fps, self.animate);
                debug!(?from, ?target, frames = path.len(), "Moving pointer");
                if path.len() == 1 {
                    self.device.warp(target);
                    return;
                }
                self.pending.extend(path);
            }
        }
    }

    fn step(&mut self) {
        let Some(point) = self.pending.pop_front() else { return };
        trace!(?point, "Pointer frame");
        self.device.warp(point);
        if self.pending.is_empty() {
            self.device.motion_finished(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::headless::HeadlessHost;
    use crate::sys::host::Host;

    #[test_log::test]
    fn move_point_picks_nearest_inner_point() {
        let rect = Rect::new(100, 100, 300, 300);
        assert_eq!(move_point(Point::new(0, 0), rect), Point::new(200, 200));
        assert_eq!(move_point(Point::new(1000, 0), rect), Point::new(300, 200));
        assert_eq!(move_point(Point::new(1000, 1000), rect), Point::new(300, 300));
        assert_eq!(move_point(Point::new(0, 1000), rect), Point::new(200, 300));
        // Odd sizes round down.
        assert_eq!(move_point(Point::ZERO, Rect::new(0, 0, 100, 50)), Point::new(33, 16));
    }

    #[test_log::test]
    fn motion_path_interpolates_per_frame() {
        let path = motion_path(
            Point::ZERO,
            Point::new(300, 150),
            Duration::from_millis(250),
            30.0,
            true,
        );
        assert_eq!(
            path,
            vec![
                Point::new(42, 21),
                Point::new(85, 42),
                Point::new(128, 64),
                Point::new(171, 85),
                Point::new(214, 107),
                Point::new(257, 128),
                Point::new(300, 150),
            ]
        );
    }

    #[test_log::test]
    fn motion_path_jumps_without_animation() {
        let to = Point::new(10, 10);
        assert_eq!(motion_path(Point::ZERO, to, Duration::from_millis(250), 30.0, false), vec![to]);
        assert_eq!(motion_path(Point::ZERO, to, Duration::from_millis(20), 30.0, true), vec![to]);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn actor_plays_back_motion() {
        let host = HeadlessHost::new();
        let pointer = host.pointer_device();
        let mouse = Mouse::new(&CursorSettings::default(), true, Box::new(pointer.clone()));
        let (tx, rx) = actor::channel();

        tx.send(Request::MoveTo {
            target: Point::new(300, 150),
            duration: Duration::from_millis(250),
        });
        drop(tx);
        mouse.run(rx).await;

        assert_eq!(host.pointer(), Point::new(300, 150));
        assert_eq!(pointer.ripples(), vec![Point::new(300, 150)]);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn actor_warps_when_not_animating() {
        let host = HeadlessHost::new();
        let pointer = host.pointer_device();
        let mouse = Mouse::new(&CursorSettings::default(), false, Box::new(pointer.clone()));
        let (tx, rx) = actor::channel();

        tx.send(Request::MoveTo {
            target: Point::new(40, 50),
            duration: Duration::from_millis(250),
        });
        drop(tx);
        mouse.run(rx).await;

        assert_eq!(host.pointer(), Point::new(40, 50));
        assert!(pointer.ripples().is_empty());
    }
}
