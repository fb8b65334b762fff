use evd_terminal::fake_feed::seed_event;
use evd_terminal::header_policy::{
    HeaderMetrics, HeaderPolicy, HeaderState, ScrollEnvelope, scoreboard_height_for_sport,
};
use evd_terminal::scoreboard_fetch::ScoreboardInfo;
use evd_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};

fn live_policy() -> HeaderPolicy {
    let mut policy = HeaderPolicy::new(HeaderMetrics::default());
    policy.on_event_loaded(true);
    policy
}

#[test]
fn envelopes_follow_header_state() {
    let metrics = HeaderMetrics::default();
    assert_eq!(
        metrics.envelope_for(HeaderState::PreGame),
        ScrollEnvelope::new(60.0, 136.0)
    );
    assert_eq!(
        metrics.envelope_for(HeaderState::LiveNoScoreboard),
        ScrollEnvelope::new(60.0, 60.0)
    );
    assert_eq!(
        metrics.envelope_for(HeaderState::ScoreboardCollapsed),
        ScrollEnvelope::new(102.0, 102.0)
    );
    assert_eq!(
        metrics.envelope_for(HeaderState::ScoreboardExpanded(282.0)),
        ScrollEnvelope::new(102.0, 384.0)
    );
}

#[test]
fn min_never_exceeds_max() {
    let metrics = HeaderMetrics::default();
    for state in [
        HeaderState::PreGame,
        HeaderState::LiveNoScoreboard,
        HeaderState::ScoreboardCollapsed,
        HeaderState::ScoreboardExpanded(0.0),
        HeaderState::ScoreboardExpanded(139.0),
        HeaderState::ScoreboardExpanded(317.0),
    ] {
        let env = metrics.envelope_for(state);
        assert!(env.min_height <= env.max_height, "{state:?}");
    }
}

#[test]
fn policy_transitions_keep_min_below_max() {
    let odd_metrics = [
        HeaderMetrics {
            filter_bar_height: 0.0,
            scoreboard_button_height: 42.0,
            pre_game_info_height: 76.0,
        },
        HeaderMetrics {
            filter_bar_height: 60.0,
            scoreboard_button_height: 0.0,
            pre_game_info_height: 900.0,
        },
        HeaderMetrics {
            filter_bar_height: 0.0,
            scoreboard_button_height: 0.0,
            pre_game_info_height: 0.0,
        },
    ];
    for metrics in odd_metrics {
        for height in [0.0, 1.0, 282.0, 1500.0] {
            let mut policy = HeaderPolicy::new(metrics);
            let mut envelopes = vec![policy.envelope()];
            envelopes.extend(policy.on_event_loaded(false));
            envelopes.extend(policy.on_event_loaded(true));
            envelopes.extend(policy.on_scoreboard_resolved(height));
            envelopes.extend(policy.toggle_scoreboard());
            envelopes.extend(policy.toggle_scoreboard());
            envelopes.push(policy.envelope());

            for env in envelopes {
                assert!(
                    env.min_height <= env.max_height,
                    "{metrics:?} height {height}: {env:?}"
                );
            }
        }
    }
}

#[test]
fn scoreboard_expands_the_envelope_once() {
    let mut policy = live_policy();
    assert_eq!(policy.state(), HeaderState::LiveNoScoreboard);

    let env = policy.on_scoreboard_resolved(282.0);
    assert_eq!(env, Some(ScrollEnvelope::new(102.0, 384.0)));
    assert_eq!(policy.on_scoreboard_resolved(282.0), None);
}

#[test]
fn zero_height_scoreboard_means_no_scoreboard() {
    let mut policy = live_policy();
    assert_eq!(policy.on_scoreboard_resolved(0.0), None);
    assert_eq!(policy.state(), HeaderState::LiveNoScoreboard);
    assert!(!policy.has_scoreboard());
}

#[test]
fn pre_game_ignores_scoreboard_answers() {
    let mut policy = HeaderPolicy::new(HeaderMetrics::default());
    assert_eq!(policy.on_event_loaded(false), None);
    assert_eq!(policy.on_scoreboard_resolved(317.0), None);
    assert_eq!(policy.state(), HeaderState::PreGame);
    assert!(!policy.is_live());
}

#[test]
fn toggle_remembers_scoreboard_height() {
    let mut policy = live_policy();
    policy.on_scoreboard_resolved(222.0);

    assert_eq!(
        policy.toggle_scoreboard(),
        Some(ScrollEnvelope::new(102.0, 102.0))
    );
    assert_eq!(policy.state(), HeaderState::ScoreboardCollapsed);
    assert_eq!(
        policy.toggle_scoreboard(),
        Some(ScrollEnvelope::new(102.0, 324.0))
    );
    assert_eq!(policy.state(), HeaderState::ScoreboardExpanded(222.0));
}

#[test]
fn reload_keeps_scoreboard_state() {
    let mut policy = live_policy();
    policy.on_scoreboard_resolved(300.0);
    assert_eq!(policy.on_event_loaded(true), None);
    assert!(policy.has_scoreboard());

    // A live event that ends up not started goes back to pre-game.
    assert_eq!(
        policy.on_event_loaded(false),
        Some(ScrollEnvelope::new(60.0, 136.0))
    );
}

#[test]
fn sport_heights() {
    assert_eq!(scoreboard_height_for_sport("football"), Some(317.0));
    assert_eq!(scoreboard_height_for_sport("Ice-Hockey"), Some(222.0));
    assert_eq!(scoreboard_height_for_sport("tabletennis"), Some(139.0));
    assert_eq!(scoreboard_height_for_sport("darts"), None);
}

#[test]
fn resolved_scoreboard_snaps_the_page_exactly_once() {
    let mut state = AppState::new("ev-1");
    state.set_viewport(0.0, 400.0);
    apply_delta(&mut state, Delta::EventLoaded(seed_event("ev-1", "football", true)));
    assert_eq!(state.envelope(), ScrollEnvelope::new(60.0, 60.0));

    let ticket = match state.drain_outbox().as_slice() {
        [ProviderCommand::FetchScoreboard { ticket }] => ticket.clone(),
        other => panic!("expected one scoreboard fetch, got {other:?}"),
    };
    let resets_before = state.header.snap_resets;

    apply_delta(
        &mut state,
        Delta::ScoreboardResolved {
            ticket,
            info: Some(ScoreboardInfo {
                height: 282.0,
                launch_url: "https://sb.test/launch/ev-1".to_string(),
            }),
        },
    );

    assert_eq!(state.envelope(), ScrollEnvelope::new(102.0, 384.0));
    assert_eq!(state.header.snap_resets, resets_before + 1);
    assert_eq!(state.surface.offset, -384.0);
    assert_eq!(state.surface.inset_top, 384.0);
    assert!(state.header.is_expanded());
}
