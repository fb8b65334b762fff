use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Title,
    Live,
    Muted,
    Accent,
    Focus,
    OddsPlus,
    OddsMinus,
    Scoreboard,
    FilterActive,
    Parlay,
}

/// Colors keyed by role. Built once in `main` and passed down by reference.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<Tone, Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        let colors = HashMap::from([
            (Tone::Title, Color::White),
            (Tone::Live, Color::Red),
            (Tone::Muted, Color::DarkGray),
            (Tone::Accent, Color::Yellow),
            (Tone::Focus, Color::DarkGray),
            (Tone::OddsPlus, Color::Green),
            (Tone::OddsMinus, Color::Gray),
            (Tone::Scoreboard, Color::Cyan),
            (Tone::FilterActive, Color::Yellow),
            (Tone::Parlay, Color::Magenta),
        ]);
        Self { colors }
    }

    pub fn color(&self, tone: Tone) -> Color {
        self.colors.get(&tone).copied().unwrap_or(Color::Reset)
    }

    pub fn fg(&self, tone: Tone) -> Style {
        Style::default().fg(self.color(tone))
    }

    pub fn bold(&self, tone: Tone) -> Style {
        self.fg(tone).add_modifier(Modifier::BOLD)
    }

    pub fn focus(&self) -> Style {
        Style::default().bg(self.color(Tone::Focus))
    }

    pub fn odds(&self, odds: i32) -> Style {
        if odds > 0 {
            self.fg(Tone::OddsPlus)
        } else {
            self.fg(Tone::OddsMinus)
        }
    }
}
