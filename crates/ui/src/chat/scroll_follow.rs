use gpui::{Bounds, Pixels, point, px};
use gpui_component::VirtualListScrollHandle;

/// Distance from the tail within which the list counts as "at the bottom".
const NEAR_BOTTOM_THRESHOLD: Pixels = px(24.);
const SCROLL_JITTER: f32 = 1.0;

/// Keeps the message list pinned to the newest row unless the user scrolls away.
pub struct ScrollFollow {
    handle: VirtualListScrollHandle,
    jump_requested: bool,
    following: bool,
    last_offset_y: Pixels,
    last_max_y: Pixels,
}

impl ScrollFollow {
    pub fn new() -> Self {
        Self {
            handle: VirtualListScrollHandle::new(),
            jump_requested: false,
            following: true,
            last_offset_y: Pixels::ZERO,
            last_max_y: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.handle
    }

    pub fn bounds(&self) -> Bounds<Pixels> {
        self.handle.bounds()
    }

    /// Forces a jump to the tail on the next frame, e.g. after switching sessions.
    pub fn jump_to_bottom(&mut self) {
        self.last_offset_y = Pixels::ZERO;
        self.last_max_y = Pixels::ZERO;
        self.following = true;
        self.jump_requested = true;
    }

    /// Follows new rows only when the list was already at the tail.
    pub fn follow_new_rows(&mut self) {
        if self.following || at_tail(self.last_offset_y, self.last_max_y) {
            self.jump_requested = true;
        }
    }

    /// Reconciles follow mode with the current offsets, then scrolls if needed.
    pub fn sync(&mut self) {
        let offset_y = self.handle.offset().y;
        let max_y = self.handle.max_offset().height;
        let content_grew = (f32::from(max_y) - f32::from(self.last_max_y)).abs() > SCROLL_JITTER;
        let moved = f32::from(offset_y) - f32::from(self.last_offset_y);

        if self.jump_requested || (content_grew && at_tail(self.last_offset_y, self.last_max_y)) {
            self.following = true;
        } else if !content_grew && moved > SCROLL_JITTER {
            // Offsets grow toward zero when scrolling up.
            self.following = false;
        } else if !content_grew && moved < -SCROLL_JITTER && at_tail(offset_y, max_y) {
            self.following = true;
        }

        self.last_offset_y = offset_y;
        self.last_max_y = max_y;

        if self.following || self.jump_requested {
            let target_y = if max_y > Pixels::ZERO {
                -max_y
            } else {
                Pixels::ZERO
            };
            self.handle
                .set_offset(point(self.handle.offset().x, target_y));
        }
        self.jump_requested = false;
    }
}

impl Default for ScrollFollow {
    fn default() -> Self {
        Self::new()
    }
}

fn at_tail(offset_y: Pixels, max_y: Pixels) -> bool {
    if max_y <= Pixels::ZERO {
        return true;
    }
    (offset_y + max_y).abs() <= NEAR_BOTTOM_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn short_content_is_always_at_tail() {
        assert!(at_tail(Pixels::ZERO, Pixels::ZERO));
        assert!(at_tail(px(-10.), px(-5.)));
    }

    #[::core::prelude::v1::test]
    fn tail_detection_uses_threshold() {
        assert!(at_tail(px(-400.), px(410.)));
        assert!(!at_tail(px(-100.), px(410.)));
    }
}
