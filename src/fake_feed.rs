use std::env;
use std::fs;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::header_policy::{DEFAULT_SCOREBOARD_HEIGHT, scoreboard_height_for_sport};
use crate::markets::{
    EventDetail, GroupType, LiveEventData, Market, MarketSection, MarketTab, Selection, Team,
};
use crate::scoreboard_fetch::{
    ScoreboardConfig, ScoreboardInfo, ScoreboardSource, ScoreboardTicket, fetch_scoreboard_info,
};
use crate::state::{Delta, ProviderCommand};

pub fn spawn_demo_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let scoreboard = ScoreboardConfig::from_env();
        let live_interval = Duration::from_secs(
            env::var("LIVE_TICK_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(5)
                .max(1),
        );
        let mut last_live_tick = Instant::now();
        let mut current: Option<EventDetail> = None;

        loop {
            thread::sleep(Duration::from_millis(200));

            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::LoadEvent { event_id } => match load_event(&event_id) {
                        Ok(event) => {
                            current = Some(event.clone());
                            let _ = tx.send(Delta::EventLoaded(event));
                        }
                        Err(err) => {
                            let _ = tx.send(Delta::Log(format!("[WARN] Event load error: {err}")));
                        }
                    },
                    ProviderCommand::FetchScoreboard { ticket } => {
                        let sport = current
                            .as_ref()
                            .map(|ev| ev.sport.clone())
                            .unwrap_or_default();
                        spawn_scoreboard_lookup(&tx, &scoreboard, ticket, sport, &mut rng);
                    }
                }
            }

            if last_live_tick.elapsed() >= live_interval {
                last_live_tick = Instant::now();
                if let Some(event) = current.as_mut()
                    && let Some(live) = event.live.as_mut()
                {
                    advance_clock(live, &mut rng);
                    let _ = tx.send(Delta::LiveUpdate {
                        event_id: event.id.clone(),
                        live: *live,
                    });
                }
            }
        }
    });
}

// Each lookup runs on its own thread, so answers can overtake each other.
fn spawn_scoreboard_lookup(
    tx: &Sender<Delta>,
    config: &ScoreboardConfig,
    ticket: ScoreboardTicket,
    sport: String,
    rng: &mut impl Rng,
) {
    let tx = tx.clone();
    let config = config.clone();
    let jitter = if config.demo_latency.is_zero() {
        Duration::ZERO
    } else {
        let max_ms = config.demo_latency.as_millis() as u64;
        Duration::from_millis(rng.gen_range(max_ms / 2..=max_ms))
    };

    thread::spawn(move || {
        let result = match config.source {
            ScoreboardSource::Http => fetch_scoreboard_info(&config, &ticket.event_id),
            ScoreboardSource::Demo => {
                thread::sleep(jitter);
                Ok(demo_scoreboard(&ticket.event_id, &sport))
            }
        };
        let info = match result {
            Ok(info) => info,
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Scoreboard lookup error: {err}")));
                None
            }
        };
        let _ = tx.send(Delta::ScoreboardResolved { ticket, info });
    });
}

fn demo_scoreboard(event_id: &str, sport: &str) -> Option<ScoreboardInfo> {
    if sport.trim().is_empty() {
        return None;
    }
    let height = scoreboard_height_for_sport(sport).unwrap_or(DEFAULT_SCOREBOARD_HEIGHT);
    Some(ScoreboardInfo {
        height,
        launch_url: format!("https://scoreboards.example/launch/{event_id}"),
    })
}

fn advance_clock(live: &mut LiveEventData, rng: &mut impl Rng) {
    if live.clock_seconds >= 5 {
        live.clock_seconds -= 5;
    } else if live.clock_minutes > 0 {
        live.clock_minutes -= 1;
        live.clock_seconds += 55;
    } else {
        live.period = live.period.saturating_add(1).min(4);
        live.clock_minutes = 15;
        live.clock_seconds = 0;
    }
    if rng.gen_bool(0.08) {
        if rng.gen_bool(0.5) {
            live.home_score += if rng.gen_bool(0.7) { 7 } else { 3 };
        } else {
            live.away_score += if rng.gen_bool(0.7) { 7 } else { 3 };
        }
    }
}

/// Reads `EVD_EVENT_FILE` when set, otherwise builds the demo event.
pub fn load_event(event_id: &str) -> Result<EventDetail> {
    if let Ok(path) = env::var("EVD_EVENT_FILE")
        && !path.trim().is_empty()
    {
        let raw = fs::read_to_string(path.trim())
            .with_context(|| format!("read event file {}", path.trim()))?;
        return parse_event_json(&raw);
    }
    let started = env::var("EVD_DEMO_STARTED")
        .map(|val| !matches!(val.trim(), "0" | "false" | "no"))
        .unwrap_or(true);
    let sport = env::var("EVD_DEMO_SPORT").unwrap_or_else(|_| "football".to_string());
    Ok(seed_event(event_id, &sport, started))
}

pub fn parse_event_json(raw: &str) -> Result<EventDetail> {
    serde_json::from_str(raw.trim()).context("invalid event json")
}

pub fn seed_event(event_id: &str, sport: &str, started: bool) -> EventDetail {
    let kickoff = if started {
        Utc::now().naive_utc() - ChronoDuration::minutes(40)
    } else {
        Utc::now().naive_utc() + ChronoDuration::hours(3)
    };
    let live = started.then_some(LiveEventData {
        home_score: 14,
        away_score: 10,
        clock_minutes: 8,
        clock_seconds: 40,
        period: 2,
    });

    let six_pack = vec![
        two_way("Spread", ("KC", -3.5, -110), ("BUF", 3.5, -110)),
        two_way("Total Points", ("Over", 47.5, -105), ("Under", 47.5, -115)),
        Market {
            name: "Money Line".to_string(),
            selections: vec![sel("KC", -160, None), sel("BUF", 135, None)],
        },
    ];

    let popular = MarketTab {
        title: "Popular".to_string(),
        sections: vec![MarketSection {
            title: "Game Lines".to_string(),
            group: GroupType::SixPack,
            markets: six_pack.clone(),
            same_game_parlay: true,
            tab_labels: Vec::new(),
        }],
    };

    let game_lines = MarketTab {
        title: "Game Lines".to_string(),
        sections: vec![
            MarketSection {
                title: "Game Lines".to_string(),
                group: GroupType::SixPack,
                markets: six_pack,
                same_game_parlay: true,
                tab_labels: Vec::new(),
            },
            MarketSection {
                title: "Alternative Spread".to_string(),
                group: GroupType::Slider,
                markets: vec![two_way("Alt Spread", ("KC", -7.5, 145), ("BUF", 7.5, -175))],
                same_game_parlay: false,
                tab_labels: Vec::new(),
            },
            MarketSection {
                title: "Winning Margin".to_string(),
                group: GroupType::Plain,
                markets: vec![Market {
                    name: "Winning Margin".to_string(),
                    selections: vec![
                        sel("KC 1-6", 350, None),
                        sel("KC 7-12", 450, None),
                        sel("KC 13+", 500, None),
                        sel("BUF 1-6", 400, None),
                        sel("BUF 7-12", 700, None),
                        sel("BUF 13+", 900, None),
                    ],
                }],
                same_game_parlay: false,
                tab_labels: Vec::new(),
            },
            MarketSection {
                title: "Both Teams To Score 20+".to_string(),
                group: GroupType::Plain,
                markets: vec![Market {
                    name: "Both Teams To Score 20+".to_string(),
                    selections: vec![sel("Yes", 110, None), sel("No", -140, None)],
                }],
                same_game_parlay: true,
                tab_labels: Vec::new(),
            },
        ],
    };

    let passers = ["P. Mahomes", "J. Allen"];
    let receivers = [
        "T. Kelce", "R. Rice", "X. Worthy", "S. Diggs", "K. Coleman", "D. Kincaid",
    ];
    let props = MarketTab {
        title: "Player Props".to_string(),
        sections: vec![
            MarketSection {
                title: "Passing Yards".to_string(),
                group: GroupType::Tabs,
                markets: passers
                    .iter()
                    .map(|p| two_way(p, ("Over", 264.5, -115), ("Under", 264.5, -105)))
                    .collect(),
                same_game_parlay: true,
                tab_labels: vec!["Over".to_string(), "Under".to_string()],
            },
            MarketSection {
                title: "Receiving Yards".to_string(),
                group: GroupType::Tabs,
                markets: receivers
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let line = 38.5 + 6.0 * i as f64;
                        two_way(p, ("Over", line, -110), ("Under", line, -110))
                    })
                    .collect(),
                same_game_parlay: true,
                tab_labels: vec!["Over".to_string(), "Under".to_string()],
            },
            MarketSection {
                title: "Anytime Touchdown Scorer".to_string(),
                group: GroupType::Plain,
                markets: receivers
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Market {
                        name: p.to_string(),
                        selections: vec![sel("Yes", 120 + 40 * i as i32, None)],
                    })
                    .collect(),
                same_game_parlay: true,
                tab_labels: Vec::new(),
            },
        ],
    };

    let quarters = MarketTab {
        title: "Quarters".to_string(),
        sections: (1..=4)
            .map(|q| MarketSection {
                title: format!("Quarter {q} Money Line"),
                group: GroupType::Plain,
                markets: vec![Market {
                    name: format!("Q{q} Money Line"),
                    selections: vec![sel("KC", -125, None), sel("BUF", 105, None)],
                }],
                same_game_parlay: false,
                tab_labels: Vec::new(),
            })
            .collect(),
    };

    EventDetail {
        id: event_id.to_string(),
        name: "Kansas City Chiefs at Buffalo Bills".to_string(),
        sport: sport.to_string(),
        started,
        start_time: kickoff.format("%Y-%m-%dT%H:%M").to_string(),
        home: Team {
            name: "Kansas City Chiefs".to_string(),
            abbreviation: Some("KC".to_string()),
        },
        away: Team {
            name: "Buffalo Bills".to_string(),
            abbreviation: Some("BUF".to_string()),
        },
        live,
        tabs: vec![popular, game_lines, props, quarters],
    }
}

fn two_way(name: &str, a: (&str, f64, i32), b: (&str, f64, i32)) -> Market {
    Market {
        name: name.to_string(),
        selections: vec![sel(a.0, a.2, Some(a.1)), sel(b.0, b.2, Some(b.1))],
    }
}

fn sel(name: &str, odds: i32, line: Option<f64>) -> Selection {
    Selection {
        name: name.to_string(),
        odds,
        line,
    }
}
