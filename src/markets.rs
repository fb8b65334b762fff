use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Sections with more rows than this show a "Show more" row until expanded.
pub const SHOW_ALL_LIMIT: usize = 4;

pub const POPULAR_TAB: &str = "Popular";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    pub id: String,
    pub name: String,
    pub sport: String,
    pub started: bool,
    pub start_time: String,
    pub home: Team,
    pub away: Team,
    #[serde(default)]
    pub live: Option<LiveEventData>,
    #[serde(default)]
    pub tabs: Vec<MarketTab>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveEventData {
    pub home_score: u16,
    pub away_score: u16,
    pub clock_minutes: u16,
    pub clock_seconds: u16,
    pub period: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketTab {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<MarketSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[default]
    Plain,
    SixPack,
    Slider,
    Tabs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSection {
    pub title: String,
    #[serde(default)]
    pub group: GroupType,
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub same_game_parlay: bool,
    #[serde(default)]
    pub tab_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    pub odds: i32,
    #[serde(default)]
    pub line: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SixPackCell {
    pub line: Option<f64>,
    pub odds: i32,
}

/// Two team rows by up to three market columns (spread, total, moneyline).
#[derive(Debug, Clone, PartialEq)]
pub struct SixPackGrid {
    pub columns: Vec<String>,
    pub teams: [String; 2],
    pub cells: [Vec<Option<SixPackCell>>; 2],
}

impl SixPackGrid {
    pub fn from_markets(markets: &[Market], home: &str, away: &str) -> Self {
        let used = &markets[..markets.len().min(3)];
        let columns = used.iter().map(|m| trim_six_pack_title(&m.name)).collect();
        let cells = [0usize, 1].map(|side| {
            used.iter()
                .map(|m| {
                    m.selections.get(side).map(|sel| SixPackCell {
                        line: sel.line,
                        odds: sel.odds,
                    })
                })
                .collect()
        });
        Self {
            columns,
            teams: [home.to_string(), away.to_string()],
            cells,
        }
    }
}

fn trim_six_pack_title(raw: &str) -> String {
    let trimmed = raw.trim();
    for prefix in ["Alternative ", "Alt ", "Game "] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    trimmed.to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageRow {
    SectionHeader {
        section: usize,
        title: String,
        expanded: bool,
        same_game_parlay: bool,
    },
    SixPack {
        section: usize,
        title: String,
        grid: SixPackGrid,
    },
    TabsSwitcher {
        section: usize,
        labels: Vec<String>,
    },
    Slider {
        section: usize,
        title: String,
        selections: Vec<Selection>,
    },
    Compact {
        section: usize,
        selections: Vec<Selection>,
    },
    Selection {
        section: usize,
        title: String,
        selections: Vec<Selection>,
    },
    ShowAll {
        section: usize,
        showing_all: bool,
    },
}

impl PageRow {
    pub fn section(&self) -> usize {
        match self {
            PageRow::SectionHeader { section, .. }
            | PageRow::SixPack { section, .. }
            | PageRow::TabsSwitcher { section, .. }
            | PageRow::Slider { section, .. }
            | PageRow::Compact { section, .. }
            | PageRow::Selection { section, .. }
            | PageRow::ShowAll { section, .. } => *section,
        }
    }

    /// Terminal lines the row occupies.
    pub fn lines(&self) -> u16 {
        match self {
            PageRow::SixPack { .. } => 4,
            PageRow::Slider { .. } => 2,
            _ => 1,
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, PageRow::SectionHeader { .. } | PageRow::ShowAll { .. })
    }
}

/// Which tab is showing and how each of its sections is folded.
#[derive(Debug, Clone, Default)]
pub struct MarketView {
    selected_tab: usize,
    collapsed: HashSet<usize>,
    showing_all: HashSet<usize>,
}

impl MarketView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    pub fn is_collapsed(&self, section: usize) -> bool {
        self.collapsed.contains(&section)
    }

    pub fn is_showing_all(&self, section: usize) -> bool {
        self.showing_all.contains(&section)
    }

    /// Clamps to the last tab and clears per-section folding.
    pub fn select_tab(&mut self, idx: usize, tab_count: usize) {
        self.selected_tab = if idx < tab_count {
            idx
        } else {
            tab_count.saturating_sub(1)
        };
        self.collapsed.clear();
        self.showing_all.clear();
    }

    pub fn toggle_collapsed(&mut self, section: usize) {
        self.showing_all.remove(&section);
        if !self.collapsed.remove(&section) {
            self.collapsed.insert(section);
        }
    }

    pub fn toggle_show_all(&mut self, section: usize) {
        if !self.showing_all.remove(&section) {
            self.showing_all.insert(section);
        }
    }

    pub fn rows(&self, event: &EventDetail) -> Vec<PageRow> {
        let Some(tab) = event.tabs.get(self.selected_tab) else {
            return Vec::new();
        };
        let home = team_label(&event.home);
        let away = team_label(&event.away);

        if tab.title == POPULAR_TAB {
            let markets = tab
                .sections
                .iter()
                .find(|s| s.group == GroupType::SixPack)
                .or_else(|| tab.sections.first())
                .map(|s| s.markets.as_slice())
                .unwrap_or_default();
            return vec![PageRow::SixPack {
                section: 0,
                title: "Popular Bets".to_string(),
                grid: SixPackGrid::from_markets(markets, &home, &away),
            }];
        }

        let mut rows = Vec::new();
        for (idx, section) in tab.sections.iter().enumerate() {
            let expanded = !self.is_collapsed(idx);
            rows.push(PageRow::SectionHeader {
                section: idx,
                title: section.title.clone(),
                expanded,
                same_game_parlay: section.same_game_parlay,
            });
            if expanded {
                rows.extend(self.section_rows(idx, section, &home, &away));
            }
        }
        rows
    }

    fn section_rows(
        &self,
        idx: usize,
        section: &MarketSection,
        home: &str,
        away: &str,
    ) -> Vec<PageRow> {
        match section.group {
            GroupType::SixPack => {
                return vec![PageRow::SixPack {
                    section: idx,
                    title: String::new(),
                    grid: SixPackGrid::from_markets(&section.markets, home, away),
                }];
            }
            GroupType::Slider => {
                let Some(market) = section.markets.first() else {
                    return Vec::new();
                };
                return vec![PageRow::Slider {
                    section: idx,
                    title: market.name.clone(),
                    selections: market.selections.clone(),
                }];
            }
            GroupType::Plain | GroupType::Tabs => {}
        }

        let mut rows = Vec::new();
        if section.group == GroupType::Tabs {
            let labels = if section.tab_labels.is_empty() {
                vec![home.to_string(), away.to_string()]
            } else {
                section.tab_labels.clone()
            };
            rows.push(PageRow::TabsSwitcher {
                section: idx,
                labels,
            });
        }

        let body = body_rows(idx, section);
        if body.is_empty() {
            return rows;
        }
        if section.markets.len() == 1 && body.len() < SHOW_ALL_LIMIT {
            rows.push(PageRow::Compact {
                section: idx,
                selections: section.markets[0].selections.clone(),
            });
            return rows;
        }

        if body.len() <= SHOW_ALL_LIMIT {
            rows.extend(body);
            return rows;
        }

        let showing_all = self.is_showing_all(idx);
        if showing_all {
            rows.extend(body);
        } else {
            rows.extend(body.into_iter().take(SHOW_ALL_LIMIT));
        }
        rows.push(PageRow::ShowAll {
            section: idx,
            showing_all,
        });
        rows
    }
}

// A single market lists one row per selection; several markets list one row
// per market.
fn body_rows(idx: usize, section: &MarketSection) -> Vec<PageRow> {
    match section.markets.as_slice() {
        [] => Vec::new(),
        [market] => market
            .selections
            .iter()
            .map(|sel| PageRow::Selection {
                section: idx,
                title: sel.name.clone(),
                selections: vec![sel.clone()],
            })
            .collect(),
        markets => markets
            .iter()
            .filter(|m| !m.selections.is_empty())
            .map(|m| PageRow::Selection {
                section: idx,
                title: m.name.clone(),
                selections: m.selections.clone(),
            })
            .collect(),
    }
}

pub fn team_label(team: &Team) -> String {
    team.abbreviation
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| crate::format::abbreviate_team(&team.name))
}

pub fn total_lines(rows: &[PageRow]) -> u16 {
    rows.iter().map(PageRow::lines).sum()
}
