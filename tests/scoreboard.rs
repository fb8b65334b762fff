use evd_terminal::fake_feed::seed_event;
use evd_terminal::header_policy::{DEFAULT_SCOREBOARD_HEIGHT, HeaderState};
use evd_terminal::scoreboard_fetch::{
    ScoreboardInfo, ScoreboardRequests, ScoreboardTicket, parse_scoreboard_json,
};
use evd_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};

static SCOREBOARD_JSON: &str = include_str!("fixtures/scoreboard.json");
const FIXTURE_EVENT: &str = "a1b2c3d4-0001";

fn scoreboard(height: f64) -> Option<ScoreboardInfo> {
    Some(ScoreboardInfo {
        height,
        launch_url: "https://sb.test/launch".to_string(),
    })
}

fn tickets(state: &mut AppState) -> Vec<ScoreboardTicket> {
    state
        .drain_outbox()
        .into_iter()
        .filter_map(|cmd| match cmd {
            ProviderCommand::FetchScoreboard { ticket } => Some(ticket),
            _ => None,
        })
        .collect()
}

fn loaded_live_state() -> AppState {
    let mut state = AppState::new("ev-1");
    state.set_viewport(0.0, 400.0);
    apply_delta(&mut state, Delta::EventLoaded(seed_event("ev-1", "football", true)));
    state
}

#[test]
fn parses_fixture_with_sport_height() {
    let info = parse_scoreboard_json(SCOREBOARD_JSON, FIXTURE_EVENT)
        .expect("valid fixture json")
        .expect("scoreboard present");
    assert_eq!(info.height, 317.0);
    assert!(info.launch_url.starts_with("https://scoreboards.test/launch/"));
}

#[test]
fn unknown_sport_uses_reported_height_then_default() {
    let reported = r#"{"eventId":"e","launch_link":"https://x/l","height":250,"sport":"darts"}"#;
    let info = parse_scoreboard_json(reported, "e").unwrap().unwrap();
    assert_eq!(info.height, 250.0);

    let missing = r#"{"eventId":"e","launch_link":"https://x/l","height":0}"#;
    let info = parse_scoreboard_json(missing, "e").unwrap().unwrap();
    assert_eq!(info.height, DEFAULT_SCOREBOARD_HEIGHT);
}

#[test]
fn empty_answers_mean_no_scoreboard() {
    assert_eq!(parse_scoreboard_json("", "e").unwrap(), None);
    assert_eq!(parse_scoreboard_json(" null ", "e").unwrap(), None);
    let no_link = r#"{"eventId":"e","launch_link":"  ","height":300,"sport":"tennis"}"#;
    assert_eq!(parse_scoreboard_json(no_link, "e").unwrap(), None);
    assert!(parse_scoreboard_json("{not json", "e").is_err());
}

#[test]
fn answer_for_another_event_is_an_error() {
    let err = parse_scoreboard_json(SCOREBOARD_JSON, "other-event")
        .expect_err("event id mismatch");
    assert!(err.to_string().contains("expected other-event"));

    let anonymous = r#"{"launch_link":"https://x/l","sport":"football"}"#;
    let info = parse_scoreboard_json(anonymous, "any").unwrap().unwrap();
    assert_eq!(info.height, 317.0);
}

#[test]
fn only_the_newest_ticket_is_accepted() {
    let mut requests = ScoreboardRequests::new();
    let first = requests.issue("ev-1");
    let second = requests.issue("ev-1");

    assert!(second.seq > first.seq);
    assert!(!requests.accept(&first));
    assert_eq!(requests.pending(), Some(&second));
    assert!(requests.accept(&second));
    assert!(!requests.accept(&second));
    assert_eq!(requests.pending(), None);
}

#[test]
fn invalidated_ticket_is_rejected() {
    let mut requests = ScoreboardRequests::new();
    let ticket = requests.issue("ev-1");
    requests.invalidate();
    assert!(!requests.accept(&ticket));
}

#[test]
fn stale_answer_never_overwrites_newer_request() {
    let mut state = loaded_live_state();
    let first = tickets(&mut state);
    apply_delta(&mut state, Delta::EventLoaded(seed_event("ev-1", "football", true)));
    let second = tickets(&mut state);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    // The older lookup finishes last but carries a different height.
    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket: second[0].clone(),
            info: scoreboard(317.0),
        },
    );
    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket: first[0].clone(),
            info: scoreboard(139.0),
        },
    );

    assert_eq!(state.policy.state(), HeaderState::ScoreboardExpanded(317.0));
    assert_eq!(state.envelope().max_height, 317.0 + 102.0);
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.contains(&format!("Dropped stale scoreboard #{}", first[0].seq)))
    );
}

#[test]
fn out_of_order_answers_keep_the_newest() {
    let mut state = loaded_live_state();
    let first = tickets(&mut state);
    apply_delta(&mut state, Delta::EventLoaded(seed_event("ev-1", "football", true)));
    let second = tickets(&mut state);

    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket: first[0].clone(),
            info: scoreboard(139.0),
        },
    );
    assert_eq!(state.policy.state(), HeaderState::LiveNoScoreboard);

    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket: second[0].clone(),
            info: scoreboard(298.0),
        },
    );
    assert_eq!(state.policy.state(), HeaderState::ScoreboardExpanded(298.0));
}

#[test]
fn duplicate_delivery_snaps_once() {
    let mut state = loaded_live_state();
    let ticket = tickets(&mut state).remove(0);

    for _ in 0..2 {
        apply_delta(
            &mut state,
            Delta::ScoreboardResolved {
                ticket: ticket.clone(),
                info: scoreboard(282.0),
            },
        );
    }
    // Viewport, live event, scoreboard.
    assert_eq!(state.header.snap_resets, 3);
}

#[test]
fn answer_for_another_event_is_dropped() {
    let mut state = loaded_live_state();
    let mut ticket = tickets(&mut state).remove(0);
    ticket.event_id = "ev-2".to_string();

    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket,
            info: scoreboard(282.0),
        },
    );
    assert_eq!(state.policy.state(), HeaderState::LiveNoScoreboard);
}

#[test]
fn no_scoreboard_keeps_live_header() {
    let mut state = loaded_live_state();
    let ticket = tickets(&mut state).remove(0);

    apply_delta(&mut state, Delta::ScoreboardResolved { ticket, info: None });

    assert_eq!(state.policy.state(), HeaderState::LiveNoScoreboard);
    assert_eq!(state.scoreboard_url, None);
    assert_eq!(state.header.snap_resets, 2);
}
