use std::env;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use evd_terminal::fake_feed;
use evd_terminal::format::{
    format_line, format_odds, format_six_pack_cell, game_clock, kickoff_label,
};
use evd_terminal::header_policy::{HeaderMetrics, HeaderState, header_state_label};
use evd_terminal::markets::{PageRow, Selection, SixPackGrid, team_label};
use evd_terminal::state::{
    AppState, Delta, HIDE_SCOREBOARD, PageConfig, ProviderCommand, apply_delta,
};
use evd_terminal::theme::{Palette, Tone};

const DEFAULT_EVENT_ID: &str = "demo-event-0001";

struct App {
    state: AppState,
    palette: Palette,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let event_id = env::var("EVD_EVENT_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_ID.to_string());
        let mut state =
            AppState::with_config(event_id, HeaderMetrics::from_env(), PageConfig::from_env());
        state.request_load();
        Self {
            state,
            palette: Palette::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_lines(1.0),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_lines(-1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                let lines = self.state.config.fling_lines;
                self.state.fling(lines);
            }
            KeyCode::PageUp => {
                let lines = self.state.config.fling_lines;
                self.state.fling(-lines);
            }
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => self.state.next_tab(),
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => self.state.prev_tab(),
            KeyCode::Char('n') => self.state.focus_next(),
            KeyCode::Char('p') => self.state.focus_prev(),
            KeyCode::Enter => self.state.activate_focused(),
            KeyCode::Char('s') => self.state.toggle_header(now),
            KeyCode::Char('S') => self.state.toggle_scoreboard_pinned(),
            KeyCode::Char('r') => {
                self.state.push_log("[INFO] Reloading event");
                self.state.request_load();
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let lines = self.state.config.wheel_lines;
        match mouse.kind {
            MouseEventKind::ScrollDown => self.state.scroll_lines(lines),
            MouseEventKind::ScrollUp => self.state.scroll_lines(-lines),
            _ => {}
        }
    }

    fn flush_commands(&mut self) {
        let commands = self.state.drain_outbox();
        if commands.is_empty() {
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return;
        };
        for cmd in commands {
            if tx.send(cmd).is_err() {
                self.state.push_log("[WARN] Provider request failed");
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    fake_feed::spawn_demo_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(33);
    let mut last_tick = Instant::now();
    let mut last_page: Option<Rect> = None;

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let page = screen_chunks(terminal.size()?)[1];
        if last_page != Some(page) {
            let units = app.state.config.units_per_row;
            app.state.set_viewport(0.0, f64::from(page.height) * units);
            last_page = Some(page);
        }

        app.flush_commands();

        let now = Instant::now();
        terminal.draw(|f| ui(f, app, now))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.state.tick(Instant::now());
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn screen_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(5),
        ])
        .split(area)
}

fn ui(frame: &mut Frame, app: &App, now: Instant) {
    let chunks = screen_chunks(frame.size());
    let state = &app.state;
    let palette = &app.palette;

    let title = Paragraph::new(title_text(state)).style(palette.bold(Tone::Title));
    frame.render_widget(title, chunks[0]);

    render_page(frame, chunks[1], state, palette, now);

    let footer = Paragraph::new(footer_text(state))
        .block(Block::default().borders(Borders::TOP))
        .style(palette.fg(Tone::Muted));
    frame.render_widget(footer, chunks[2]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn title_text(state: &AppState) -> String {
    let name = state
        .event
        .as_ref()
        .map(|ev| ev.name.clone())
        .unwrap_or_else(|| {
            if state.loading {
                "Loading event...".to_string()
            } else {
                "No event".to_string()
            }
        });
    format!(" EVENT DETAILS | {name} | {}", header_state_label(state.policy.state()))
}

fn footer_text(state: &AppState) -> String {
    let header = state.header.state();
    let envelope = state.envelope();
    let edge = if state.surface.at_top() {
        " top"
    } else if state.surface.at_bottom() {
        " end"
    } else {
        ""
    };
    let debug = format!(
        "origin {:.0} height {:.0} [{:.0}..{:.0}] anchor {} offset {:.0}{edge}",
        header.header_origin,
        state.header.header_height(),
        envelope.min_height,
        envelope.max_height,
        header
            .reverse_anchor
            .map(|a| format!("{a:.0}"))
            .unwrap_or_else(|| "-".to_string()),
        state.surface.offset,
    );
    let logs = state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{debug}\n{logs}\nj/k Scroll | Space/PgDn Fling | h/l Tabs | n/p/Enter Sections | s Scoreboard | ? Help | q Quit"
    )
}

fn render_page(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette, now: Instant) {
    if area.height == 0 {
        return;
    }
    let units = state.config.units_per_row;
    let envelope = state.envelope();
    let (origin, offset) = state.frame_geometry(now);

    let header_lines = header_lines(state, palette);
    let full_rows = header_lines.len();
    let visible_units = (origin + envelope.max_height).max(0.0);
    let visible_rows = ((visible_units / units).round() as usize)
        .min(full_rows)
        .min(area.height as usize);

    let content = content_lines(state, palette);
    for r in visible_rows..area.height as usize {
        let y_units = r as f64 * units + offset;
        let idx = (y_units / units).floor();
        if idx < 0.0 {
            continue;
        }
        let Some(line) = content.get(idx as usize) else {
            continue;
        };
        let row_area = Rect {
            x: area.x,
            y: area.y + r as u16,
            width: area.width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(line.clone()), row_area);
    }

    if visible_rows == 0 {
        return;
    }
    let header_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: visible_rows as u16,
    };
    frame.render_widget(Clear, header_area);
    let shown: Vec<Line> = header_lines[full_rows - visible_rows..].to_vec();
    frame.render_widget(Paragraph::new(shown), header_area);
}

// Laid out top to bottom: info panel, scoreboard button, filter bar. As the
// header lifts, lines disappear from the top.
fn header_lines(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    let units = state.config.units_per_row;
    let metrics = state.policy.metrics();
    let envelope = state.envelope();
    let full_rows = (envelope.max_height / units).round().max(0.0) as usize;
    let filter_rows = ((metrics.filter_bar_height / units).round() as usize).min(full_rows);
    let button_rows = if state.policy.has_scoreboard() {
        ((metrics.scoreboard_button_height / units).round() as usize)
            .min(full_rows - filter_rows)
    } else {
        0
    };
    let panel_rows = full_rows - filter_rows - button_rows;

    let mut lines = Vec::with_capacity(full_rows);
    lines.extend(panel_lines(state, palette, panel_rows));
    lines.extend(button_lines(state, palette, button_rows));
    lines.extend(filter_lines(state, palette, filter_rows));
    lines
}

fn panel_lines(state: &AppState, palette: &Palette, rows: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(ev) = &state.event {
        let home = team_label(&ev.home);
        let away = team_label(&ev.away);
        match state.policy.state() {
            HeaderState::PreGame => {
                lines.push(Line::styled(
                    format!("  {home} vs {away}"),
                    palette.bold(Tone::Title),
                ));
                lines.push(Line::styled(
                    format!("  Starts {}", kickoff_label(&ev.start_time)),
                    palette.fg(Tone::Accent),
                ));
            }
            HeaderState::ScoreboardExpanded(height) => {
                let (hs, as_, clock) = match &ev.live {
                    Some(live) => (live.home_score, live.away_score, game_clock(&ev.sport, live)),
                    None => (0, 0, "--:--".to_string()),
                };
                lines.push(Line::styled(
                    format!("  ● LIVE  {clock}"),
                    palette.bold(Tone::Live),
                ));
                lines.push(Line::styled(
                    format!("  {home:<6}{hs:>4}"),
                    palette.bold(Tone::Scoreboard),
                ));
                lines.push(Line::styled(
                    format!("  {away:<6}{as_:>4}"),
                    palette.bold(Tone::Scoreboard),
                ));
                if let Some(url) = &state.scoreboard_url {
                    lines.push(Line::styled(
                        format!("  scoreboard {height:.0}u  {url}"),
                        palette.fg(Tone::Muted),
                    ));
                }
            }
            _ => {}
        }
    }
    fit_lines(lines, rows)
}

fn button_lines(state: &AppState, palette: &Palette, rows: usize) -> Vec<Line<'static>> {
    if rows == 0 {
        return Vec::new();
    }
    let arrow = if state.scoreboard_button_title == HIDE_SCOREBOARD {
        "▲"
    } else {
        "▼"
    };
    let mut live_line = String::from("  ");
    if let Some(ev) = &state.event
        && let Some(live) = &ev.live
    {
        live_line = format!(
            "  {} {} - {} {}  {}",
            team_label(&ev.home),
            live.home_score,
            live.away_score,
            team_label(&ev.away),
            game_clock(&ev.sport, live)
        );
    }
    let lines = vec![
        Line::from(vec![
            Span::styled(live_line, palette.fg(Tone::Live)),
            Span::raw("   "),
            Span::styled(
                format!("[{} {arrow}]", state.scoreboard_button_title),
                palette.bold(Tone::Accent),
            ),
        ]),
    ];
    fit_lines(lines, rows)
}

fn filter_lines(state: &AppState, palette: &Palette, rows: usize) -> Vec<Line<'static>> {
    if rows == 0 {
        return Vec::new();
    }
    let mut spans = vec![Span::raw(" ")];
    if let Some(ev) = &state.event {
        for (idx, tab) in ev.tabs.iter().enumerate() {
            let style = if idx == state.markets.selected_tab() {
                palette.bold(Tone::FilterActive).add_modifier(Modifier::REVERSED)
            } else {
                palette.fg(Tone::Title)
            };
            spans.push(Span::styled(format!(" {} ", tab.title), style));
            spans.push(Span::raw(" "));
        }
    }
    let rule = Line::styled("─".repeat(200), palette.fg(Tone::Muted));
    let mut lines = Vec::with_capacity(rows);
    if rows >= 3 {
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(spans));
    while lines.len() < rows {
        lines.push(rule.clone());
    }
    lines.truncate(rows);
    lines
}

/// Pads with blanks above, or drops trailing lines that do not fit.
fn fit_lines(mut lines: Vec<Line<'static>>, rows: usize) -> Vec<Line<'static>> {
    if lines.len() > rows {
        lines.truncate(rows);
        return lines;
    }
    let mut out = vec![Line::raw(""); rows - lines.len()];
    out.append(&mut lines);
    out
}

fn content_lines(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for (idx, row) in state.rows.iter().enumerate() {
        let focused = idx == state.focused_row && row.is_actionable();
        let mut lines = row_lines(row, palette);
        if focused {
            lines = lines
                .into_iter()
                .map(|l| l.patch_style(palette.focus()))
                .collect();
        }
        out.extend(lines);
    }
    if out.is_empty() {
        out.push(Line::styled("  No markets", palette.fg(Tone::Muted)));
    }
    out
}

fn row_lines(row: &PageRow, palette: &Palette) -> Vec<Line<'static>> {
    match row {
        PageRow::SectionHeader {
            title,
            expanded,
            same_game_parlay,
            ..
        } => {
            let arrow = if *expanded { "▾" } else { "▸" };
            let mut spans = vec![Span::styled(format!(" {arrow} {title}"), palette.bold(Tone::Title))];
            if *same_game_parlay {
                spans.push(Span::styled("  SGP", palette.bold(Tone::Parlay)));
            }
            vec![Line::from(spans)]
        }
        PageRow::SixPack { title, grid, .. } => six_pack_lines(title, grid, palette),
        PageRow::TabsSwitcher { labels, .. } => {
            let spans = labels
                .iter()
                .map(|l| Span::styled(format!(" [{l}] "), palette.fg(Tone::Accent)))
                .collect::<Vec<_>>();
            vec![Line::from(spans)]
        }
        PageRow::Slider {
            title, selections, ..
        } => {
            let left = selections.first().map(selection_text).unwrap_or_default();
            let right = selections.get(1).map(selection_text).unwrap_or_default();
            vec![
                Line::styled(format!("    {title}"), palette.fg(Tone::Muted)),
                Line::raw(format!("    {left}  ◀────●────▶  {right}")),
            ]
        }
        PageRow::Compact { selections, .. } => {
            let mut spans = vec![Span::raw("    ")];
            for sel in selections {
                spans.push(Span::raw(format!("{} ", sel.name)));
                spans.push(Span::styled(format_odds(sel.odds), palette.odds(sel.odds)));
                spans.push(Span::raw("   "));
            }
            vec![Line::from(spans)]
        }
        PageRow::Selection {
            title, selections, ..
        } => {
            let mut spans = vec![Span::raw(format!("    {title:<22}"))];
            for sel in selections {
                let text = match sel.line {
                    Some(line) if selections.len() > 1 => {
                        format!("{} {} ", sel.name, format_line(line))
                    }
                    _ => String::new(),
                };
                spans.push(Span::raw(text));
                spans.push(Span::styled(
                    format!("{:>5}", format_odds(sel.odds)),
                    palette.odds(sel.odds),
                ));
                spans.push(Span::raw("   "));
            }
            vec![Line::from(spans)]
        }
        PageRow::ShowAll { showing_all, .. } => {
            let label = if *showing_all { "Show less" } else { "Show more" };
            vec![Line::styled(format!("    {label}"), palette.fg(Tone::Accent))]
        }
    }
}

fn selection_text(sel: &Selection) -> String {
    match sel.line {
        Some(line) => format!("{} {} {}", sel.name, format_line(line), format_odds(sel.odds)),
        None => format!("{} {}", sel.name, format_odds(sel.odds)),
    }
}

fn six_pack_lines(title: &str, grid: &SixPackGrid, palette: &Palette) -> Vec<Line<'static>> {
    let mut header = format!("  {:<18}", title);
    for col in &grid.columns {
        header.push_str(&format!("{col:^16}"));
    }
    let mut lines = vec![Line::styled(header, palette.fg(Tone::Muted))];
    for side in 0..2 {
        let mut spans = vec![Span::raw(format!("    {:<16}", grid.teams[side]))];
        for (col, cell) in grid.columns.iter().zip(grid.cells[side].iter()) {
            let text = match cell {
                Some(cell) => format_six_pack_cell(col, side, cell.line, cell.odds),
                None => "-".to_string(),
            };
            let style = cell
                .as_ref()
                .map(|c| palette.odds(c.odds))
                .unwrap_or_else(|| palette.fg(Tone::Muted));
            spans.push(Span::styled(format!("{text:^16}"), style));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::raw(""));
    lines
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Event Details - Help",
        "",
        "Scrolling:",
        "  j/k or ↑/↓     Scroll one line",
        "  Mouse wheel    Scroll",
        "  Space / PgDn   Fling down",
        "  PgUp           Fling up",
        "",
        "Markets:",
        "  h/l or Tab     Switch filter tab",
        "  n / p          Next / previous section control",
        "  Enter          Fold section or show more",
        "",
        "Header:",
        "  s              Show / hide scoreboard",
        "  S              Pin scoreboard hidden",
        "  r              Reload event",
        "  ?              Toggle help",
        "  q              Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
