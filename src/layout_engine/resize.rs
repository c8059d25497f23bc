use super::Orientation;
use crate::sys::geometry::{Rect, Size};
use crate::sys::host::DisplayMetrics;
use crate::sys::window::WindowId;

/// Remembers the last window resized along one axis and the ratio it got.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResizeCycle {
    last: Option<(WindowId, usize)>,
}

impl ResizeCycle {
    /// Chooses the next ratio index for `wid`.
    ///
    /// Repeated presses on the same window cycle through `ratios`. A fresh
    /// window starts at the last ratio that would grow it, or at the first
    /// one when none would.
    pub fn advance(&mut self, wid: WindowId, current: i32, usable: i32, ratios: &[f64]) -> Option<usize> {
        if ratios.is_empty() {
            return None;
        }
        let index = match self.last {
            Some((last, index)) if last == wid => (index + 1) % ratios.len(),
            _ => ratios
                .iter()
                .rposition(|&ratio| extent(usable, ratio) > current)
                .unwrap_or(0),
        };
        self.last = Some((wid, index));
        Some(index)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub fn extent(usable: i32, ratio: f64) -> i32 {
    (f64::from(usable) * ratio).floor() as i32
}

/// Room available along `orientation`, before applying a ratio.
pub fn usable_extent(orientation: Orientation, metrics: &DisplayMetrics, spacing: i32) -> i32 {
    match orientation {
        Orientation::Horizontal => metrics.width - spacing * 2,
        Orientation::Vertical => metrics.height - spacing - metrics.panel_height,
    }
}

pub fn current_extent(orientation: Orientation, frame: Rect) -> i32 {
    match orientation {
        Orientation::Horizontal => frame.size.width,
        Orientation::Vertical => frame.size.height,
    }
}

/// `frame` with its extent along `orientation` replaced, origin kept.
pub fn resized(frame: Rect, orientation: Orientation, extent: i32) -> Rect {
    let size = match orientation {
        Orientation::Horizontal => Size::new(extent, frame.size.height),
        Orientation::Vertical => Size::new(frame.size.width, extent),
    };
    frame.with_size(size)
}
