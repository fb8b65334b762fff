use crate::header_policy::ScrollEnvelope;

/// Row count at which content is assumed tall enough to collapse the header
/// without bottom padding.
pub const TALL_CONTENT_ROWS: usize = 10;

/// The scrollable content under the header. `offset` follows scroll-view
/// conventions: it is `-inset_top` when the content rests at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSurface {
    pub offset: f64,
    pub inset_top: f64,
    pub inset_bottom: f64,
    pub content_height: f64,
    pub viewport_height: f64,
}

impl ScrollSurface {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            offset: 0.0,
            inset_top: 0.0,
            inset_bottom: 0.0,
            content_height: 0.0,
            viewport_height,
        }
    }

    pub fn min_offset(&self) -> f64 {
        -self.inset_top
    }

    pub fn max_offset(&self) -> f64 {
        (self.content_height + self.inset_bottom - self.viewport_height).max(self.min_offset())
    }

    /// Moves by `delta` within bounds and returns the new offset.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        self.offset = (self.offset + delta).clamp(self.min_offset(), self.max_offset());
        self.offset
    }

    /// Programmatic placement. Not clamped: header transitions may park the
    /// surface anywhere and the next drag brings it back into range.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn at_top(&self) -> bool {
        self.offset <= self.min_offset()
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height.max(0.0);
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
    }

    /// Padding needed below short content so the header can still collapse
    /// completely.
    pub fn required_bottom_inset(&self, envelope: ScrollEnvelope) -> f64 {
        let content = self.content_height + self.inset_top;
        let required = self.viewport_height + envelope.travel();
        (required - content).max(0.0)
    }

    /// Drag start: never leave more bottom padding than needed.
    pub fn trim_bottom_inset(&mut self, envelope: ScrollEnvelope) {
        let required = self.required_bottom_inset(envelope);
        if self.inset_bottom > required {
            self.inset_bottom = required;
        }
    }

    /// After a content change. Returns the offset shift applied to keep the
    /// visible rows stable, if any.
    pub fn fit_bottom_inset(
        &mut self,
        envelope: ScrollEnvelope,
        row_count: usize,
        scrolled: bool,
    ) -> Option<f64> {
        if row_count >= TALL_CONTENT_ROWS {
            self.inset_bottom = 0.0;
            return None;
        }
        let required = self.required_bottom_inset(envelope);
        let shift = required - self.inset_bottom;
        self.inset_bottom = required;
        if scrolled && shift != 0.0 {
            self.offset += shift;
            return Some(shift);
        }
        None
    }
}

/// Fling deceleration. While it runs, each tick yields an offset delta that
/// counts as user-driven motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    velocity: f64,
    friction: f64,
}

impl Momentum {
    const STOP_BELOW: f64 = 0.5;

    pub fn new(friction: f64) -> Self {
        Self {
            velocity: 0.0,
            friction: friction.clamp(0.05, 0.95),
        }
    }

    pub fn fling(&mut self, velocity: f64) {
        self.velocity += velocity;
    }

    pub fn stop(&mut self) {
        self.velocity = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.velocity != 0.0
    }

    pub fn tick(&mut self) -> Option<f64> {
        if self.velocity == 0.0 {
            return None;
        }
        let step = self.velocity;
        self.velocity *= 1.0 - self.friction;
        if self.velocity.abs() < Self::STOP_BELOW {
            self.velocity = 0.0;
        }
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::Momentum;

    #[test]
    fn momentum_decays_to_rest() {
        let mut m = Momentum::new(0.4);
        m.fling(100.0);
        let mut total = 0.0;
        let mut ticks = 0;
        while let Some(step) = m.tick() {
            total += step;
            ticks += 1;
            assert!(ticks < 100, "momentum never settled");
        }
        assert!(!m.is_active());
        assert!(total > 100.0);
        assert!(total < 260.0);
    }
}
