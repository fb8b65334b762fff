use std::collections::VecDeque;
use std::env;
use std::time::Instant;

use crate::header_policy::{HeaderMetrics, HeaderPolicy, ScrollEnvelope, header_state_label};
use crate::markets::{EventDetail, LiveEventData, MarketView, PageRow, total_lines};
use crate::scoreboard_fetch::{ScoreboardInfo, ScoreboardRequests, ScoreboardTicket};
use crate::scroll_coupling::{
    HeaderAnimation, LayoutFacts, ScrollCouplingController, ScrollOutcome,
};
use crate::scroll_surface::{Momentum, ScrollSurface};

pub const HIDE_SCOREBOARD: &str = "Hide Scoreboard";
pub const SHOW_SCOREBOARD: &str = "Show Scoreboard";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    /// Layout units per terminal line.
    pub units_per_row: f64,
    pub wheel_lines: f64,
    pub fling_lines: f64,
    pub momentum_friction: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            units_per_row: 20.0,
            wheel_lines: 3.0,
            fling_lines: 6.0,
            momentum_friction: 0.25,
        }
    }
}

impl PageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            units_per_row: env_f64("EVD_UNITS_PER_ROW", defaults.units_per_row).clamp(4.0, 100.0),
            wheel_lines: env_f64("EVD_WHEEL_LINES", defaults.wheel_lines).clamp(1.0, 20.0),
            fling_lines: env_f64("EVD_FLING_LINES", defaults.fling_lines).clamp(1.0, 40.0),
            momentum_friction: env_f64("EVD_MOMENTUM_FRICTION", defaults.momentum_friction)
                .clamp(0.05, 0.95),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    EventLoaded(EventDetail),
    LiveUpdate {
        event_id: String,
        live: LiveEventData,
    },
    ScoreboardResolved {
        ticket: ScoreboardTicket,
        info: Option<ScoreboardInfo>,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    LoadEvent { event_id: String },
    FetchScoreboard { ticket: ScoreboardTicket },
}

pub struct AppState {
    pub event_id: String,
    pub event: Option<EventDetail>,
    pub loading: bool,
    pub config: PageConfig,
    pub policy: HeaderPolicy,
    pub header: ScrollCouplingController,
    pub surface: ScrollSurface,
    pub momentum: Momentum,
    pub animation: Option<HeaderAnimation>,
    pub markets: MarketView,
    pub rows: Vec<PageRow>,
    pub focused_row: usize,
    pub scoreboard_requests: ScoreboardRequests,
    pub scoreboard_url: Option<String>,
    pub scoreboard_button_title: String,
    pub outbox: Vec<ProviderCommand>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    dragging: bool,
}

impl AppState {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self::with_config(event_id, HeaderMetrics::default(), PageConfig::default())
    }

    pub fn with_config(
        event_id: impl Into<String>,
        metrics: HeaderMetrics,
        config: PageConfig,
    ) -> Self {
        let policy = HeaderPolicy::new(metrics);
        let header = ScrollCouplingController::new(policy.envelope());
        Self {
            event_id: event_id.into(),
            event: None,
            loading: false,
            config,
            policy,
            header,
            surface: ScrollSurface::new(0.0),
            momentum: Momentum::new(config.momentum_friction),
            animation: None,
            markets: MarketView::new(),
            rows: Vec::new(),
            focused_row: 0,
            scoreboard_requests: ScoreboardRequests::new(),
            scoreboard_url: None,
            scoreboard_button_title: HIDE_SCOREBOARD.to_string(),
            outbox: Vec::new(),
            logs: VecDeque::new(),
            help_overlay: false,
            dragging: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Queues a load. Any scoreboard lookup still in flight is superseded.
    pub fn request_load(&mut self) {
        self.loading = true;
        self.scoreboard_requests.invalidate();
        self.outbox.push(ProviderCommand::LoadEvent {
            event_id: self.event_id.clone(),
        });
    }

    pub fn drain_outbox(&mut self) -> Vec<ProviderCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Called with the page area in units whenever the host lays out. The
    /// first call places the header and snaps to the current envelope. Returns
    /// false when nothing changed and no relayout ran.
    pub fn set_viewport(&mut self, origin_y: f64, height: f64) -> bool {
        let facts = LayoutFacts::at(origin_y);
        let first = match self.header.layout() {
            None => true,
            Some(prev) if prev == facts && self.surface.viewport_height == height => {
                return false;
            }
            Some(_) => false,
        };
        self.header.set_layout(facts);
        self.surface.set_viewport_height(height);
        if first {
            self.snap_to_envelope(self.policy.envelope());
        } else {
            self.fit_content();
        }
        true
    }

    pub fn envelope(&self) -> ScrollEnvelope {
        self.header.envelope()
    }

    /// User drag by whole lines. Positive scrolls content up, collapsing the
    /// header.
    pub fn scroll_lines(&mut self, lines: f64) {
        self.momentum.stop();
        self.begin_drag();
        self.drag_by(lines * self.config.units_per_row);
        self.dragging = false;
    }

    pub fn fling(&mut self, lines: f64) {
        self.begin_drag();
        self.momentum.fling(lines * self.config.units_per_row);
    }

    /// Advances deceleration by one frame. Returns true while still moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(anim) = self.animation
            && anim.is_done(now)
        {
            self.animation = None;
        }
        let Some(step) = self.momentum.tick() else {
            self.dragging = false;
            return false;
        };
        let before = self.surface.offset;
        self.drag_by(step);
        if self.surface.offset == before {
            self.momentum.stop();
        }
        if !self.momentum.is_active() {
            self.dragging = false;
        }
        true
    }

    fn begin_drag(&mut self) {
        if !self.dragging {
            let envelope = self.header.envelope();
            self.surface.trim_bottom_inset(envelope);
            self.dragging = true;
        }
    }

    fn drag_by(&mut self, delta: f64) {
        if self.header.layout().is_none() {
            return;
        }
        self.animation = None;
        let offset = self.surface.scroll_by(delta);
        let outcome = self.header.on_offset_changed(offset, true);
        self.react_to_scroll(outcome);
    }

    fn react_to_scroll(&mut self, outcome: ScrollOutcome) {
        match outcome {
            ScrollOutcome::Latched {
                collapsed: true, ..
            } if self.scoreboard_button_title == HIDE_SCOREBOARD => {
                self.set_scoreboard_title(false);
            }
            ScrollOutcome::Moved {
                was_collapsed: false,
                was_expanded: false,
                ..
            } if self.scoreboard_button_title == SHOW_SCOREBOARD => {
                self.set_scoreboard_title(true);
            }
            _ => {}
        }
    }

    fn set_scoreboard_title(&mut self, will_expand: bool) {
        self.scoreboard_button_title = if will_expand {
            HIDE_SCOREBOARD.to_string()
        } else {
            SHOW_SCOREBOARD.to_string()
        };
    }

    /// Scoreboard button: collapse an open header, expand a collapsed one.
    pub fn toggle_header(&mut self, now: Instant) {
        let should_expand = self.header.is_collapsed();
        self.momentum.stop();
        let Some(transition) = self.header.command_expand(should_expand, self.surface.offset)
        else {
            self.push_log("[INFO] Header toggle ignored before layout");
            return;
        };
        self.surface.set_offset(transition.surface_offset);
        self.animation = HeaderAnimation::start(transition, now);
        self.set_scoreboard_title(should_expand);
    }

    /// Pins the scoreboard hidden (or shows it again). Changes the envelope.
    pub fn toggle_scoreboard_pinned(&mut self) {
        match self.policy.toggle_scoreboard() {
            Some(envelope) => {
                let label = header_state_label(self.policy.state());
                self.push_log(format!("[INFO] Header -> {label}"));
                self.snap_to_envelope(envelope);
            }
            None => self.push_log("[INFO] No scoreboard for this event"),
        }
    }

    fn snap_to_envelope(&mut self, envelope: ScrollEnvelope) {
        let Some(snap) = self.header.apply_envelope(envelope) else {
            return;
        };
        self.animation = None;
        self.momentum.stop();
        self.dragging = false;
        self.surface.inset_top = snap.inset_top;
        self.surface.set_offset(snap.surface_offset);
        self.set_scoreboard_title(true);
        self.fit_content();
    }

    pub fn select_tab(&mut self, idx: usize) {
        let count = self.event.as_ref().map(|ev| ev.tabs.len()).unwrap_or(0);
        self.markets.select_tab(idx, count);
        self.focused_row = 0;
        self.fit_content();
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.markets.selected_tab() + 1);
    }

    pub fn prev_tab(&mut self) {
        let idx = self.markets.selected_tab().saturating_sub(1);
        self.select_tab(idx);
    }

    pub fn focus_next(&mut self) {
        if let Some(next) = self.actionable_after(self.focused_row, true) {
            self.focused_row = next;
        }
    }

    pub fn focus_prev(&mut self) {
        if let Some(prev) = self.actionable_after(self.focused_row, false) {
            self.focused_row = prev;
        }
    }

    fn actionable_after(&self, from: usize, forward: bool) -> Option<usize> {
        let mut candidates = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_actionable())
            .map(|(idx, _)| idx);
        if forward {
            candidates.find(|idx| *idx > from)
        } else {
            candidates.rev().find(|idx| *idx < from)
        }
    }

    /// Folds a section or toggles its "show more" row, keeping the scroll
    /// position and the focus on the activated control.
    pub fn activate_focused(&mut self) {
        let Some(row) = self.rows.get(self.focused_row) else {
            return;
        };
        let section = row.section();
        let is_header = match row {
            PageRow::SectionHeader { .. } => true,
            PageRow::ShowAll { .. } => false,
            _ => return,
        };
        if is_header {
            self.markets.toggle_collapsed(section);
        } else {
            self.markets.toggle_show_all(section);
        }
        let saved = self.surface.offset;
        self.fit_content();
        self.surface.set_offset(saved.min(self.surface.max_offset()));
        if let Some(idx) = self.rows.iter().position(|r| {
            r.section() == section
                && match r {
                    PageRow::SectionHeader { .. } => is_header,
                    PageRow::ShowAll { .. } => !is_header,
                    _ => false,
                }
        }) {
            self.focused_row = idx;
        }
    }

    /// Rebuilds rows and resizes the surface for them.
    pub fn fit_content(&mut self) {
        self.rows = match &self.event {
            Some(event) => self.markets.rows(event),
            None => Vec::new(),
        };
        let lines = total_lines(&self.rows);
        self.surface
            .set_content_height(f64::from(lines) * self.config.units_per_row);
        let scrolled = self.header.state().last_clean_offset > 0.0;
        let envelope = self.header.envelope();
        // Any shift here is programmatic, so the header is not told about it.
        self.surface
            .fit_bottom_inset(envelope, self.rows.len(), scrolled);
        if !self.rows.get(self.focused_row).is_some_and(PageRow::is_actionable) {
            self.focused_row = self
                .rows
                .iter()
                .position(PageRow::is_actionable)
                .unwrap_or(0);
        }
    }

    /// Header and surface values to draw this frame, with any running
    /// animation applied.
    pub fn frame_geometry(&self, now: Instant) -> (f64, f64) {
        match self.animation {
            Some(anim) => anim.sample(now),
            None => (self.header.header_origin(), self.surface.offset),
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::EventLoaded(event) => {
            if event.id != state.event_id {
                state.push_log(format!("[INFO] Ignored event {} (showing {})", event.id, state.event_id));
                return;
            }
            let started = event.started;
            let tab_count = event.tabs.len();
            state.loading = false;
            state.event = Some(event);
            state
                .markets
                .select_tab(state.markets.selected_tab(), tab_count);
            state.push_log(format!("[INFO] Event loaded ({tab_count} tabs)"));

            if let Some(envelope) = state.policy.on_event_loaded(started) {
                state.snap_to_envelope(envelope);
            } else {
                state.fit_content();
            }

            if started && !state.policy.has_scoreboard() {
                let ticket = state.scoreboard_requests.issue(&state.event_id);
                state.outbox.push(ProviderCommand::FetchScoreboard { ticket });
            }
        }
        Delta::LiveUpdate { event_id, live } => {
            if event_id != state.event_id {
                return;
            }
            if let Some(event) = state.event.as_mut() {
                event.live = Some(live);
            }
        }
        Delta::ScoreboardResolved { ticket, info } => {
            if ticket.event_id != state.event_id || !state.scoreboard_requests.accept(&ticket) {
                state.push_log(format!("[INFO] Dropped stale scoreboard #{}", ticket.seq));
                return;
            }
            let height = info.as_ref().map(|i| i.height).unwrap_or(0.0);
            state.scoreboard_url = info.map(|i| i.launch_url);
            match state.policy.on_scoreboard_resolved(height) {
                Some(envelope) => {
                    let label = header_state_label(state.policy.state());
                    state.push_log(format!("[INFO] Scoreboard {height:.0}u, header -> {label}"));
                    state.snap_to_envelope(envelope);
                }
                None => state.push_log("[INFO] Scoreboard unchanged"),
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
        .unwrap_or(default)
}
