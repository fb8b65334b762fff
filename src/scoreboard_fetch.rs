use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::header_policy::{DEFAULT_SCOREBOARD_HEIGHT, scoreboard_height_for_sport};
use crate::http_client::http_client;

const DEFAULT_URL_TEMPLATE: &str =
    "https://scoreboardslauncher.williamhill.com/scoreboards/events/{event_id}?secured=true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreboardSource {
    Http,
    Demo,
}

#[derive(Debug, Clone)]
pub struct ScoreboardConfig {
    pub source: ScoreboardSource,
    pub url_template: String,
    pub demo_latency: Duration,
}

impl ScoreboardConfig {
    pub fn from_env() -> Self {
        let source = match env::var("SCOREBOARD_SOURCE")
            .unwrap_or_else(|_| "demo".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "http" => ScoreboardSource::Http,
            _ => ScoreboardSource::Demo,
        };
        let url_template = env::var("SCOREBOARD_URL_TEMPLATE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| s.contains("{event_id}"))
            .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string());
        let demo_latency_ms = env::var("SCOREBOARD_DEMO_LATENCY_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(1200)
            .min(30_000);
        Self {
            source,
            url_template,
            demo_latency: Duration::from_millis(demo_latency_ms),
        }
    }

    pub fn url_for(&self, event_id: &str) -> String {
        self.url_template.replace("{event_id}", event_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardInfo {
    pub height: f64,
    pub launch_url: String,
}

#[derive(Debug, Deserialize)]
struct LiveScoreboardPayload {
    #[serde(rename = "eventId", default)]
    event_id: String,
    launch_link: String,
    #[serde(default)]
    height: i64,
    #[serde(default)]
    sport: Option<String>,
}

pub fn fetch_scoreboard_info(config: &ScoreboardConfig, event_id: &str) -> Result<Option<ScoreboardInfo>> {
    let client = http_client()?;
    let url = config.url_for(event_id);
    let resp = client.get(&url).send().context("scoreboard request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading scoreboard body")?;
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    parse_scoreboard_json(&body, event_id)
}

/// Parses a lookup answer for `event_id`. An answer naming another event is an
/// error; one with no event id is taken as is.
pub fn parse_scoreboard_json(raw: &str, event_id: &str) -> Result<Option<ScoreboardInfo>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let payload: LiveScoreboardPayload =
        serde_json::from_str(trimmed).context("invalid scoreboard json")?;
    let answered_for = payload.event_id.trim();
    if !answered_for.is_empty() && answered_for != event_id {
        return Err(anyhow!(
            "scoreboard answer for {answered_for}, expected {event_id}"
        ));
    }
    if payload.launch_link.trim().is_empty() {
        return Ok(None);
    }

    let height = payload
        .sport
        .as_deref()
        .and_then(scoreboard_height_for_sport)
        .unwrap_or_else(|| {
            if payload.height > 0 {
                payload.height as f64
            } else {
                DEFAULT_SCOREBOARD_HEIGHT
            }
        });

    Ok(Some(ScoreboardInfo {
        height,
        launch_url: payload.launch_link.trim().to_string(),
    }))
}

/// Identifies one scoreboard lookup. Later tickets supersede earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardTicket {
    pub seq: u64,
    pub event_id: String,
}

/// Last-request-wins bookkeeping for scoreboard lookups. There is no way to
/// cancel a lookup in flight, so late answers are filtered on arrival instead.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardRequests {
    next_seq: u64,
    pending: Option<ScoreboardTicket>,
}

impl ScoreboardRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, event_id: &str) -> ScoreboardTicket {
        self.next_seq += 1;
        let ticket = ScoreboardTicket {
            seq: self.next_seq,
            event_id: event_id.to_string(),
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    pub fn pending(&self) -> Option<&ScoreboardTicket> {
        self.pending.as_ref()
    }

    /// True only for the newest outstanding ticket. Accepting consumes it, so a
    /// duplicate delivery is rejected too.
    pub fn accept(&mut self, ticket: &ScoreboardTicket) -> bool {
        match &self.pending {
            Some(current) if current == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn invalidate(&mut self) {
        self.pending = None;
    }
}
