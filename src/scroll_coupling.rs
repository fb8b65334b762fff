//! Couples the page's scroll offset to the lifting header.
//!
//! The header behaves as if it were glued to the top of the scrollable content
//! until it reaches `min_height`, where it pins. Offsets are compared through a
//! "clean" offset (raw offset plus the header's current height) so movement
//! reads the same regardless of the surface's resting inset.

use std::time::{Duration, Instant};

use crate::header_policy::ScrollEnvelope;

pub const HEADER_ANIMATION: Duration = Duration::from_millis(350);

const EPSILON: f64 = 1e-6;

/// Layout facts read from the host before the controller can produce
/// coordinates. Until they are known every operation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutFacts {
    pub surface_origin_y: f64,
    pub content_origin_y: f64,
}

impl LayoutFacts {
    pub fn at(origin_y: f64) -> Self {
        Self {
            surface_origin_y: origin_y,
            content_origin_y: origin_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub last_clean_offset: f64,
    pub reverse_anchor: Option<f64>,
    pub header_origin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollOutcome {
    /// Programmatic offset change, or layout not known yet.
    Ignored,
    /// Scrolling further into an extreme the header already reached.
    Latched { collapsed: bool, expanded: bool },
    /// The header moved. `was_*` describe the header before this frame.
    Moved {
        origin: f64,
        was_collapsed: bool,
        was_expanded: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderTransition {
    pub from_origin: f64,
    pub to_origin: f64,
    pub from_surface_offset: f64,
    pub surface_offset: f64,
    pub expanded: bool,
    pub duration: Option<Duration>,
}

impl HeaderTransition {
    pub fn offset_delta(&self) -> f64 {
        self.surface_offset - self.from_surface_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapReset {
    pub header_origin: f64,
    pub header_height: f64,
    pub surface_offset: f64,
    pub inset_top: f64,
}

#[derive(Debug, Clone)]
pub struct ScrollCouplingController {
    envelope: ScrollEnvelope,
    layout: Option<LayoutFacts>,
    state: ScrollState,
    pub snap_resets: u64,
}

impl ScrollCouplingController {
    pub fn new(envelope: ScrollEnvelope) -> Self {
        Self {
            envelope,
            layout: None,
            state: ScrollState {
                last_clean_offset: 0.0,
                reverse_anchor: None,
                header_origin: 0.0,
            },
            snap_resets: 0,
        }
    }

    pub fn envelope(&self) -> ScrollEnvelope {
        self.envelope
    }

    pub fn layout(&self) -> Option<LayoutFacts> {
        self.layout
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Records where the surface sits. The first time facts arrive the header
    /// is placed at the fully expanded position.
    pub fn set_layout(&mut self, facts: LayoutFacts) {
        match self.layout {
            None => self.state.header_origin = facts.surface_origin_y,
            Some(prev) => {
                // Keep the same relative position if the host moved the surface.
                self.state.header_origin += facts.surface_origin_y - prev.surface_origin_y;
            }
        }
        self.layout = Some(facts);
    }

    pub fn header_origin(&self) -> f64 {
        self.state.header_origin
    }

    pub fn header_height(&self) -> f64 {
        match self.layout {
            Some(facts) => self.height_at(self.state.header_origin, facts),
            None => self.envelope.max_height,
        }
    }

    pub fn scroll_inset_top(&self) -> f64 {
        self.envelope.max_height
    }

    pub fn indicator_inset_top(&self) -> f64 {
        self.header_height()
    }

    pub fn is_collapsed(&self) -> bool {
        approx_eq(self.header_height(), self.envelope.min_height)
    }

    pub fn is_expanded(&self) -> bool {
        approx_eq(self.header_height(), self.envelope.max_height)
    }

    pub fn on_offset_changed(&mut self, raw_offset: f64, is_user_driven: bool) -> ScrollOutcome {
        let Some(facts) = self.layout else {
            return ScrollOutcome::Ignored;
        };
        if !is_user_driven {
            return ScrollOutcome::Ignored;
        }

        let min = self.envelope.min_height;
        let max = self.envelope.max_height;
        let header_height = self.height_at(self.state.header_origin, facts);
        let clean = raw_offset + header_height;
        let is_collapsed = approx_eq(header_height, min);
        let is_expanded = approx_eq(header_height, max);
        let last = self.state.last_clean_offset;

        let already_collapsed = last < clean && is_collapsed;
        let already_expanded = last > clean && is_expanded;
        if already_collapsed || already_expanded {
            if already_collapsed {
                self.state.reverse_anchor = None;
            } else {
                self.state.reverse_anchor = match self.state.reverse_anchor {
                    Some(anchor) if clean < anchor => Some(clean),
                    _ => None,
                };
            }
            self.state.last_clean_offset = clean;
            return ScrollOutcome::Latched {
                collapsed: is_collapsed,
                expanded: is_expanded,
            };
        }

        // The instant an expanded header starts collapsing away from the top.
        if is_expanded && clean > last && self.state.reverse_anchor.is_none() && clean > min {
            self.state.reverse_anchor = Some(clean);
        }
        self.state.last_clean_offset = clean;

        let surface_y = facts.surface_origin_y;
        let max_limit = (surface_y - max) + min;
        let min_limit = surface_y.min(
            (surface_y - (max + raw_offset).max(0.0)) + self.state.reverse_anchor.unwrap_or(0.0),
        );
        let origin = max_limit.max(min_limit);
        self.state.header_origin = origin;

        ScrollOutcome::Moved {
            origin,
            was_collapsed: is_collapsed,
            was_expanded: is_expanded,
        }
    }

    /// User toggle: animate the header to fully expanded or collapsed while
    /// shifting the surface so the visible content stays put.
    pub fn command_expand(
        &mut self,
        should_expand: bool,
        surface_offset: f64,
    ) -> Option<HeaderTransition> {
        self.expand_to(should_expand, surface_offset, Some(HEADER_ANIMATION))
    }

    /// Same as [`command_expand`](Self::command_expand) without animation, for
    /// one-time initialization.
    pub fn snap_to(&mut self, should_expand: bool, surface_offset: f64) -> Option<HeaderTransition> {
        self.expand_to(should_expand, surface_offset, None)
    }

    fn expand_to(
        &mut self,
        should_expand: bool,
        surface_offset: f64,
        duration: Option<Duration>,
    ) -> Option<HeaderTransition> {
        let facts = self.layout?;
        let envelope = self.envelope;
        let target = if should_expand {
            0.0
        } else {
            envelope.min_height - envelope.max_height
        } + facts.surface_origin_y;

        let from_origin = self.state.header_origin;
        let next_offset = surface_offset + (from_origin - target);
        self.state.header_origin = target;
        self.state.reverse_anchor = None;
        self.state.last_clean_offset = next_offset + self.height_at(target, facts);

        Some(HeaderTransition {
            from_origin,
            to_origin: target,
            from_surface_offset: surface_offset,
            surface_offset: next_offset,
            expanded: should_expand,
            duration,
        })
    }

    /// Replaces the envelope and resets the header to fully expanded inside
    /// it. This is the only way the envelope changes.
    pub fn apply_envelope(&mut self, envelope: ScrollEnvelope) -> Option<SnapReset> {
        self.envelope = envelope;
        let facts = self.layout?;
        self.state = ScrollState {
            last_clean_offset: 0.0,
            reverse_anchor: None,
            header_origin: facts.surface_origin_y,
        };
        self.snap_resets += 1;
        Some(SnapReset {
            header_origin: facts.surface_origin_y,
            header_height: envelope.max_height,
            surface_offset: -envelope.max_height,
            inset_top: envelope.max_height,
        })
    }

    fn height_at(&self, origin: f64, facts: LayoutFacts) -> f64 {
        (origin + self.envelope.max_height) - facts.content_origin_y
    }
}

/// Interpolates header origin and surface offset across a transition.
#[derive(Debug, Clone, Copy)]
pub struct HeaderAnimation {
    transition: HeaderTransition,
    started: Instant,
}

impl HeaderAnimation {
    pub fn start(transition: HeaderTransition, now: Instant) -> Option<Self> {
        transition.duration?;
        Some(Self {
            transition,
            started: now,
        })
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Returns `(header_origin, surface_offset)` for the frame at `now`.
    pub fn sample(&self, now: Instant) -> (f64, f64) {
        let t = ease_out(self.progress(now));
        let tr = &self.transition;
        (
            lerp(tr.from_origin, tr.to_origin, t),
            lerp(tr.from_surface_offset, tr.surface_offset, t),
        )
    }

    fn progress(&self, now: Instant) -> f64 {
        let Some(duration) = self.transition.duration else {
            return 1.0;
        };
        if duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}
