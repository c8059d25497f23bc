//! The layout pass.
//!
//! A pass places one anchor window and then walks outwards, packing every
//! other row window against it with a fixed gap. Passes never reorder the
//! row. A pass that starts while another is running on the same layout is
//! dropped; this covers passes re-entered through the geometry notifications
//! a pass causes itself.

use std::cell::Cell;
use std::time::Duration;

use tracing::{debug, trace};

use super::LayoutError;
use crate::common::config::Settings;
use crate::sys::geometry::{Point, surface_target};
use crate::sys::host::{DisplayMetrics, Host, HostError};
use crate::sys::window::WindowId;

#[derive(Debug, Clone, PartialEq)]
pub struct RowSettings {
    /// Gap between windows before scaling.
    pub window_spacing: i32,
    pub out_of_focus_offset: f64,
    pub move_duration: Duration,
    pub animate: bool,
}

impl RowSettings {
    pub fn from_config(settings: &Settings) -> Self {
        Self {
            window_spacing: settings.layout.window_spacing,
            out_of_focus_offset: settings.layout.out_of_focus_offset,
            move_duration: settings.animation.move_duration,
            animate: settings.animate,
        }
    }

    pub fn spacing(&self, metrics: &DisplayMetrics) -> i32 {
        self.window_spacing * metrics.scale_factor
    }
}

impl Default for RowSettings {
    fn default() -> Self {
        Self::from_config(&Settings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassRequest {
    pub anchor: WindowId,
    /// Clamp the anchor onto the display.
    pub show: bool,
    pub animate: bool,
    /// Explicit anchor position. Only `x` is honored.
    pub position: Option<Point>,
}

impl PassRequest {
    pub fn new(anchor: WindowId, show: bool, animate: bool) -> Self {
        Self { anchor, show, animate, position: None }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Reentrant,
    NotManaged,
    Overview,
    AnchorUnsurfaced,
    AnchorVanished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Applied { moved: Vec<WindowId> },
    Skipped(SkipReason),
}

impl PassOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PassOutcome::Applied { .. })
    }
}

#[derive(Debug, Default)]
pub struct RowLayout {
    settings: RowSettings,
    running: Cell<bool>,
}

/// Holds the running flag for the duration of a pass.
struct PassGuard<'a>(&'a Cell<bool>);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl RowLayout {
    pub fn new(settings: RowSettings) -> Self {
        Self { settings, running: Cell::new(false) }
    }

    pub fn settings(&self) -> &RowSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn rearrange(
        &self,
        row: &[WindowId],
        host: &mut dyn Host,
        request: PassRequest,
    ) -> Result<PassOutcome, LayoutError> {
        let Some(_guard) = PassGuard::acquire(&self.running) else {
            trace!(anchor = ?request.anchor, "Pass already running, ignoring");
            return Ok(PassOutcome::Skipped(SkipReason::Reentrant));
        };
        let Some(anchor_index) = row.iter().position(|&w| w == request.anchor) else {
            debug!(anchor = ?request.anchor, "Anchor is not managed, doing nothing");
            return Ok(PassOutcome::Skipped(SkipReason::NotManaged));
        };
        if host.overview_visible() {
            trace!("Overview is visible, deferring pass");
            return Ok(PassOutcome::Skipped(SkipReason::Overview));
        }
        let Some(frame) = host.frame_rect(request.anchor) else {
            debug!(anchor = ?request.anchor, "Anchor vanished");
            return Ok(PassOutcome::Skipped(SkipReason::AnchorVanished));
        };
        if !host.has_surface(request.anchor) {
            debug!(anchor = ?request.anchor, "Anchor has no surface");
            return Ok(PassOutcome::Skipped(SkipReason::AnchorUnsurfaced));
        }

        let metrics = host.display_metrics();
        let spacing = self.settings.spacing(&metrics);
        let animate = request.animate && self.settings.animate;

        let candidate = request.position.map_or(frame.origin.x, |p| p.x);
        let x = if request.show {
            clamp_x(candidate, frame.size.width, metrics.width, spacing)
        } else {
            candidate
        };
        let y = self.y_offset(host, request.anchor, &metrics, spacing);
        self.place(host, request.anchor, Point::new(x, y), animate, &metrics)?;
        let mut moved = vec![request.anchor];

        let anchor_frame =
            host.frame_rect(request.anchor).unwrap_or_else(|| frame.with_origin(Point::new(x, y)));

        let mut cursor = anchor_frame.min_x();
        for &wid in row[..anchor_index].iter().rev() {
            let Some(width) = self.layoutable_width(host, wid) else { continue };
            cursor -= width + spacing;
            let y = self.y_offset(host, wid, &metrics, spacing);
            self.place(host, wid, Point::new(cursor, y), animate, &metrics)?;
            moved.push(wid);
        }

        let mut cursor = anchor_frame.max_x() + spacing;
        for &wid in &row[anchor_index + 1..] {
            let Some(width) = self.layoutable_width(host, wid) else { continue };
            let y = self.y_offset(host, wid, &metrics, spacing);
            self.place(host, wid, Point::new(cursor, y), animate, &metrics)?;
            moved.push(wid);
            // The host may have constrained the window while moving it.
            let width = host.frame_rect(wid).map_or(width, |r| r.size.width);
            cursor += width + spacing;
        }

        trace!(anchor = ?request.anchor, ?moved, "Pass applied");
        Ok(PassOutcome::Applied { moved })
    }

    /// Vertical placement for `wid`. Unfocused windows sit slightly lower.
    pub fn y_offset(
        &self,
        host: &dyn Host,
        wid: WindowId,
        metrics: &DisplayMetrics,
        spacing: i32,
    ) -> i32 {
        let info = host.window_info(wid);
        let fullscreen = info.as_ref().is_some_and(|i| i.is_fullscreen());
        let maximized = info.as_ref().is_some_and(|i| i.is_maximized_vertically());

        let panel_height = if fullscreen { 0 } else { metrics.panel_height };
        let spacing_component = if fullscreen || maximized { 0 } else { spacing / 2 };
        let has_focus = host.has_focus(wid)
            || host.transient_children(wid).into_iter().any(|child| host.has_focus(child));
        let fraction = if has_focus { 0.0 } else { self.settings.out_of_focus_offset };

        let y = (f64::from(metrics.height) * fraction).floor() as i32
            + panel_height
            + spacing_component;
        y.max(panel_height)
    }

    fn layoutable_width(&self, host: &dyn Host, wid: WindowId) -> Option<i32> {
        if !host.has_surface(wid) {
            debug!(?wid, "Window has no surface, leaving it in place");
            return None;
        }
        if host.window_info(wid).is_some_and(|info| info.is_minimized()) {
            return None;
        }
        host.frame_rect(wid).map(|r| r.size.width)
    }

    fn place(
        &self,
        host: &mut dyn Host,
        wid: WindowId,
        target: Point,
        animate: bool,
        metrics: &DisplayMetrics,
    ) -> Result<(), HostError> {
        move_window(host, wid, target, animate, self.settings.move_duration, metrics)
    }
}

/// Horizontal clamp applied to a shown anchor.
pub fn clamp_x(candidate: i32, width: i32, display_width: i32, spacing: i32) -> i32 {
    if candidate < 0 {
        spacing / 2
    } else if candidate + width > display_width {
        display_width - width - spacing / 2
    } else {
        candidate
    }
}

/// Moves the window's frame to `target`, easing its visual surface along
/// when `animate` is set. The window is never placed above the panel.
pub fn move_window(
    host: &mut dyn Host,
    wid: WindowId,
    target: Point,
    animate: bool,
    duration: Duration,
    metrics: &DisplayMetrics,
) -> Result<(), HostError> {
    let fullscreen = host.window_info(wid).is_some_and(|i| i.is_fullscreen());
    let panel_height = if fullscreen { 0 } else { metrics.panel_height };
    let target = Point::new(target.x, target.y.max(panel_height));

    let frame = host.frame_rect(wid).ok_or(HostError::UnknownWindow(wid))?;
    let buffer = host.buffer_rect(wid).ok_or(HostError::NoSurface(wid))?;
    let surface = surface_target(target, frame, buffer);
    if animate {
        host.ease_surface(wid, surface, duration)?;
    } else {
        host.set_surface_position(wid, surface)?;
    }
    host.move_frame(wid, target)
}
