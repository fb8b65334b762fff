use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use evd_terminal::fake_feed::seed_event;
use evd_terminal::header_policy::ScrollEnvelope;
use evd_terminal::markets::MarketView;
use evd_terminal::scoreboard_fetch::parse_scoreboard_json;
use evd_terminal::scroll_coupling::{LayoutFacts, ScrollCouplingController};
use evd_terminal::state::{AppState, Delta, apply_delta};

fn bench_offset_stream(c: &mut Criterion) {
    let envelope = ScrollEnvelope::new(102.0, 384.0);
    let offsets: Vec<f64> = (0..600)
        .map(|i| {
            // Down, then back up past the top.
            let step = if i < 300 { i } else { 600 - i };
            -384.0 + step as f64 * 2.5
        })
        .collect();

    c.bench_function("offset_stream", |b| {
        b.iter(|| {
            let mut ctl = ScrollCouplingController::new(envelope);
            ctl.set_layout(LayoutFacts::at(0.0));
            ctl.apply_envelope(envelope);
            for raw in &offsets {
                black_box(ctl.on_offset_changed(*raw, true));
            }
            black_box(ctl.header_origin());
        })
    });
}

fn bench_page_drag(c: &mut Criterion) {
    let mut state = AppState::new("bench");
    state.set_viewport(0.0, 800.0);
    apply_delta(&mut state, Delta::EventLoaded(seed_event("bench", "football", true)));
    state.select_tab(2);

    c.bench_function("page_drag", |b| {
        b.iter(|| {
            for _ in 0..20 {
                state.scroll_lines(1.0);
            }
            for _ in 0..20 {
                state.scroll_lines(-1.0);
            }
            black_box(state.header.header_origin());
        })
    });
}

fn bench_market_rows(c: &mut Criterion) {
    let event = seed_event("bench", "football", true);
    let mut view = MarketView::new();
    view.select_tab(2, event.tabs.len());

    c.bench_function("market_rows", |b| {
        b.iter(|| {
            let rows = view.rows(black_box(&event));
            black_box(rows.len());
        })
    });
}

fn bench_scoreboard_parse(c: &mut Criterion) {
    c.bench_function("scoreboard_parse", |b| {
        b.iter(|| {
            let info = parse_scoreboard_json(black_box(SCOREBOARD_JSON), "a1b2c3d4-0001")
                .expect("valid json");
            black_box(info);
        })
    });
}

criterion_group!(
    perf,
    bench_offset_stream,
    bench_page_drag,
    bench_market_rows,
    bench_scoreboard_parse
);
criterion_main!(perf);

static SCOREBOARD_JSON: &str = include_str!("../tests/fixtures/scoreboard.json");
