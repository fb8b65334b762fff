use std::env;

/// Bounds for the lifting header: fully collapsed at `min_height`, fully
/// expanded at `max_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEnvelope {
    pub min_height: f64,
    pub max_height: f64,
}

impl ScrollEnvelope {
    pub fn new(min_height: f64, max_height: f64) -> Self {
        debug_assert!(
            min_height <= max_height,
            "envelope min {min_height} exceeds max {max_height}"
        );
        Self {
            min_height,
            max_height,
        }
    }

    pub fn travel(&self) -> f64 {
        self.max_height - self.min_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderState {
    PreGame,
    LiveNoScoreboard,
    ScoreboardCollapsed,
    ScoreboardExpanded(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderMetrics {
    pub filter_bar_height: f64,
    pub scoreboard_button_height: f64,
    pub pre_game_info_height: f64,
}

impl Default for HeaderMetrics {
    fn default() -> Self {
        Self {
            filter_bar_height: 60.0,
            scoreboard_button_height: 42.0,
            // Info strip plus its spacing.
            pre_game_info_height: 76.0,
        }
    }
}

impl HeaderMetrics {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            filter_bar_height: env_units("EVD_FILTER_BAR_HEIGHT", defaults.filter_bar_height),
            scoreboard_button_height: env_units(
                "EVD_SCOREBOARD_BUTTON_HEIGHT",
                defaults.scoreboard_button_height,
            ),
            pre_game_info_height: env_units(
                "EVD_PRE_GAME_INFO_HEIGHT",
                defaults.pre_game_info_height,
            ),
        }
    }

    pub fn envelope_for(&self, state: HeaderState) -> ScrollEnvelope {
        let filter = self.filter_bar_height;
        let button = self.scoreboard_button_height;
        match state {
            HeaderState::PreGame => ScrollEnvelope::new(filter, self.pre_game_info_height + filter),
            HeaderState::LiveNoScoreboard => ScrollEnvelope::new(filter, filter),
            HeaderState::ScoreboardCollapsed => {
                ScrollEnvelope::new(button + filter, button + filter)
            }
            HeaderState::ScoreboardExpanded(height) => {
                ScrollEnvelope::new(button + filter, height.max(0.0) + button + filter)
            }
        }
    }
}

/// Decides which envelope the header operates in. Every method that changes
/// the state returns the new envelope once; the owner is expected to snap the
/// scroll controller to it.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    metrics: HeaderMetrics,
    state: HeaderState,
    scoreboard_height: Option<f64>,
}

impl HeaderPolicy {
    pub fn new(metrics: HeaderMetrics) -> Self {
        Self {
            metrics,
            state: HeaderState::PreGame,
            scoreboard_height: None,
        }
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }

    pub fn metrics(&self) -> &HeaderMetrics {
        &self.metrics
    }

    pub fn envelope(&self) -> ScrollEnvelope {
        self.metrics.envelope_for(self.state)
    }

    pub fn is_live(&self) -> bool {
        !matches!(self.state, HeaderState::PreGame)
    }

    pub fn has_scoreboard(&self) -> bool {
        matches!(
            self.state,
            HeaderState::ScoreboardCollapsed | HeaderState::ScoreboardExpanded(_)
        )
    }

    pub fn on_event_loaded(&mut self, started: bool) -> Option<ScrollEnvelope> {
        if !started {
            self.scoreboard_height = None;
            return self.transition(HeaderState::PreGame);
        }
        match self.state {
            // A reload of a live event keeps whatever scoreboard state it has.
            HeaderState::ScoreboardCollapsed | HeaderState::ScoreboardExpanded(_) => None,
            _ => self.transition(HeaderState::LiveNoScoreboard),
        }
    }

    pub fn on_scoreboard_resolved(&mut self, height: f64) -> Option<ScrollEnvelope> {
        if matches!(self.state, HeaderState::PreGame) {
            return None;
        }
        if height > 0.0 {
            self.scoreboard_height = Some(height);
            self.transition(HeaderState::ScoreboardExpanded(height))
        } else {
            self.scoreboard_height = None;
            self.transition(HeaderState::LiveNoScoreboard)
        }
    }

    pub fn toggle_scoreboard(&mut self) -> Option<ScrollEnvelope> {
        match self.state {
            HeaderState::ScoreboardExpanded(height) => {
                self.scoreboard_height = Some(height);
                self.transition(HeaderState::ScoreboardCollapsed)
            }
            HeaderState::ScoreboardCollapsed => {
                let height = self.scoreboard_height?;
                self.transition(HeaderState::ScoreboardExpanded(height))
            }
            HeaderState::PreGame | HeaderState::LiveNoScoreboard => None,
        }
    }

    fn transition(&mut self, next: HeaderState) -> Option<ScrollEnvelope> {
        if self.state == next {
            return None;
        }
        self.state = next;
        Some(self.envelope())
    }
}

pub const DEFAULT_SCOREBOARD_HEIGHT: f64 = 282.0;

/// Rendered scoreboard height per sport. The lookup service reports the same
/// height for every sport, so the per-sport table wins when the sport is known.
pub fn scoreboard_height_for_sport(sport: &str) -> Option<f64> {
    let height = match sport.trim().to_ascii_lowercase().as_str() {
        "football" => 317.0,
        "ice-hockey" => 222.0,
        "tabletennis" => 139.0,
        "cricket" => 269.0,
        "tennis" => 298.0,
        "basketball" => 300.0,
        _ => return None,
    };
    Some(height)
}

pub fn header_state_label(state: HeaderState) -> &'static str {
    match state {
        HeaderState::PreGame => "PRE-GAME",
        HeaderState::LiveNoScoreboard => "LIVE",
        HeaderState::ScoreboardCollapsed => "LIVE SB-UP",
        HeaderState::ScoreboardExpanded(_) => "LIVE SB-DOWN",
    }
}

fn env_units(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
        .unwrap_or(default)
        .clamp(0.0, 2000.0)
}
