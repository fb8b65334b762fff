use evd_terminal::fake_feed::{parse_event_json, seed_event};
use evd_terminal::markets::{
    Market, MarketView, PageRow, SHOW_ALL_LIMIT, Selection, SixPackGrid, total_lines,
};

static EVENT_JSON: &str = include_str!("fixtures/event.json");

const POPULAR: usize = 0;
const GAME_LINES: usize = 1;
const PLAYER_PROPS: usize = 2;
const QUARTERS: usize = 3;

fn view_on(tab: usize) -> MarketView {
    let mut view = MarketView::new();
    view.select_tab(tab, 4);
    view
}

fn count(rows: &[PageRow], pred: impl Fn(&PageRow) -> bool) -> usize {
    rows.iter().filter(|r| pred(*r)).count()
}

#[test]
fn popular_tab_is_a_single_six_pack() {
    let event = seed_event("ev-1", "football", true);
    let rows = view_on(POPULAR).rows(&event);

    assert_eq!(rows.len(), 1);
    match &rows[0] {
        PageRow::SixPack { title, grid, .. } => {
            assert_eq!(title, "Popular Bets");
            assert_eq!(grid.columns, vec!["Spread", "Total Points", "Money Line"]);
            assert_eq!(grid.teams, ["KC".to_string(), "BUF".to_string()]);
        }
        other => panic!("expected six pack, got {other:?}"),
    }
    assert_eq!(total_lines(&rows), 4);
}

#[test]
fn long_sections_stop_at_the_show_all_limit() {
    let event = seed_event("ev-1", "football", true);
    let mut view = view_on(GAME_LINES);
    let rows = view.rows(&event);

    // Six pack, slider, winning margin (6 of 4 shown), both teams to score.
    assert_eq!(rows.len(), 12);
    let margin: Vec<_> = rows.iter().filter(|r| r.section() == 2).collect();
    assert_eq!(margin.len(), 1 + SHOW_ALL_LIMIT + 1);
    assert!(matches!(
        margin.last(),
        Some(PageRow::ShowAll {
            showing_all: false,
            ..
        })
    ));
    assert!(matches!(
        rows.last(),
        Some(PageRow::Compact { selections, .. }) if selections.len() == 2
    ));

    view.toggle_show_all(2);
    let rows = view.rows(&event);
    assert_eq!(rows.len(), 14);
    assert!(rows.contains(&PageRow::ShowAll {
        section: 2,
        showing_all: true
    }));

    view.toggle_show_all(2);
    assert_eq!(view.rows(&event).len(), 12);
}

#[test]
fn folding_a_section_hides_its_body() {
    let event = seed_event("ev-1", "football", true);
    let mut view = view_on(GAME_LINES);

    view.toggle_collapsed(2);
    let rows = view.rows(&event);
    assert_eq!(rows.len(), 7);
    assert!(rows.contains(&PageRow::SectionHeader {
        section: 2,
        title: "Winning Margin".to_string(),
        expanded: false,
        same_game_parlay: false,
    }));

    view.toggle_collapsed(2);
    assert_eq!(view.rows(&event).len(), 12);
}

#[test]
fn tabbed_sections_lead_with_a_switcher() {
    let event = seed_event("ev-1", "football", true);
    let rows = view_on(PLAYER_PROPS).rows(&event);

    assert_eq!(rows.len(), 17);
    assert_eq!(count(&rows, |r| matches!(r, PageRow::TabsSwitcher { .. })), 2);
    assert_eq!(count(&rows, |r| matches!(r, PageRow::ShowAll { .. })), 2);
    assert!(matches!(
        &rows[1],
        PageRow::TabsSwitcher { labels, .. } if labels == &["Over", "Under"]
    ));
}

#[test]
fn short_single_markets_render_compact() {
    let event = seed_event("ev-1", "football", true);
    let rows = view_on(QUARTERS).rows(&event);

    assert_eq!(rows.len(), 8);
    assert_eq!(count(&rows, |r| matches!(r, PageRow::Compact { .. })), 4);
    assert_eq!(count(&rows, PageRow::is_actionable), 4);
}

#[test]
fn selecting_a_tab_clamps_and_clears_folding() {
    let event = seed_event("ev-1", "football", true);
    let mut view = view_on(GAME_LINES);
    view.toggle_collapsed(0);
    view.toggle_show_all(2);

    view.select_tab(99, event.tabs.len());
    assert_eq!(view.selected_tab(), QUARTERS);
    assert!(!view.is_collapsed(0));
    assert!(!view.is_showing_all(2));

    view.select_tab(3, 0);
    assert_eq!(view.selected_tab(), 0);
}

#[test]
fn six_pack_columns_drop_market_prefixes() {
    let markets = vec![
        Market {
            name: "Alternative Spread".to_string(),
            selections: vec![Selection {
                name: "A".to_string(),
                odds: -110,
                line: Some(-2.5),
            }],
        },
        Market {
            name: "Game Total".to_string(),
            selections: Vec::new(),
        },
    ];
    let grid = SixPackGrid::from_markets(&markets, "AAA", "BBB");

    assert_eq!(grid.columns, vec!["Spread", "Total"]);
    assert!(grid.cells[0][0].is_some());
    assert!(grid.cells[1][0].is_none());
    assert!(grid.cells[0][1].is_none());
}

#[test]
fn event_fixture_builds_rows() {
    let event = parse_event_json(EVENT_JSON).expect("valid fixture json");
    assert_eq!(event.sport, "ice-hockey");
    assert_eq!(event.tabs.len(), 2);

    let mut view = MarketView::new();
    view.select_tab(1, event.tabs.len());
    let rows = view.rows(&event);

    // Three selections of one market: compact.
    assert_eq!(rows.len(), 2);
    assert!(matches!(&rows[1], PageRow::Compact { selections, .. } if selections.len() == 3));

    view.select_tab(0, event.tabs.len());
    match &view.rows(&event)[0] {
        PageRow::SixPack { grid, .. } => {
            assert_eq!(grid.teams, ["BOS".to_string(), "NYR".to_string()]);
            assert_eq!(grid.columns, vec!["Puck Line", "Total", "Money Line"]);
        }
        other => panic!("expected six pack, got {other:?}"),
    }
}
