use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset as ChartDataset, GraphType, List,
        ListItem, ListState, Paragraph, Row, Table, Wrap,
    },
};
use crate::tui::app::{App, Focus};
use crate::tui::theme::Theme;
use frame_lens_core::ScatterFigure;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    render_topbar(frame, app, chunks[0], theme);
    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(mid[0]);
    render_filters(frame, app, left[0], theme);
    render_columns(frame, app, left[1], theme);
    render_main(frame, app, mid[1], theme);
    render_bottombar(frame, app, chunks[2], theme);
    if app.show_help { render_help(frame, area); }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let view = app.session.filtered();
    let state = app.session.page_state();
    let line = Line::from(vec![
        Span::styled(" frame-lens ", Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "{} | {} of {} rows | page {}/{} | {} per page",
            app.input_path,
            view.num_rows(),
            app.session.dataset().num_rows(),
            state.page_index() + 1,
            app.session.page_count(),
            state.page_size(),
        )),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn panel<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default().borders(Borders::ALL).title(title)
        .border_style(if focused { Style::default().fg(theme.highlight) } else { Style::default() })
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = panel("Filters (a add, d del)", app.focus == Focus::Filters, theme);
    let diagnostics = app.session.diagnostics();
    let items: Vec<ListItem> = app.session.predicates().list().map(|(key, p)| {
        let field = p.field.as_deref().unwrap_or("<field>");
        let op = p.operator.map_or("?", |o| o.symbol());
        let lit = p.literal.as_deref().unwrap_or("<value>");
        let (marker, color) = if diagnostics.iter().any(|d| d.key == key) {
            ("!", theme.error)
        } else if p.is_inert() {
            ("~", theme.muted)
        } else {
            ("*", theme.success)
        };
        ListItem::new(Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(color)),
            Span::raw(format!("{} {op} {}", truncate(field, 14), truncate(lit, 12))),
        ]))
    }).collect();
    if items.is_empty() {
        frame.render_widget(Paragraph::new("No filters. Press a to add one.").block(block).wrap(Wrap { trim: true }), area);
        return;
    }
    let mut state = ListState::default();
    state.select(Some(app.filter_selected.min(items.len() - 1)));
    let list = List::new(items).block(block).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_columns(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = panel("Columns (space toggles)", app.focus == Focus::Columns, theme);
    let selection = app.session.selection();
    let items: Vec<ListItem> = app.session.dataset().columns().iter().map(|c| {
        let mark = if selection.contains(&c.name) { "[x]" } else { "[ ]" };
        ListItem::new(Line::from(vec![
            Span::raw(format!("{mark} {:<18}", truncate(&c.name, 18))),
            Span::styled(c.kind.to_string(), Style::default().fg(theme.kind_color(c.kind))),
        ]))
    }).collect();
    let mut state = ListState::default();
    if !items.is_empty() { state.select(Some(app.column_selected.min(items.len() - 1))); }
    let list = List::new(items).block(block).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    match (app.show_table, app.show_figure) {
        (true, true) => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            render_table(frame, app, parts[0], theme);
            render_figure(frame, app, parts[1], theme);
        }
        (true, false) => render_table(frame, app, area, theme),
        (false, true) => render_figure(frame, app, area, theme),
        (false, false) => frame.render_widget(
            Paragraph::new("Table and figure hidden. t: table  v: figure").block(Block::default().borders(Borders::ALL)),
            area,
        ),
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let page = app.page();
    let title = format!("Rows (t) page {}/{}", page.page_index + 1, page.page_count);
    let block = panel(&title, app.focus == Focus::Table, theme);
    if page.columns.is_empty() {
        frame.render_widget(Paragraph::new("No columns selected.").block(block), area);
        return;
    }
    if page.records.is_empty() {
        frame.render_widget(Paragraph::new("No rows match the current filters.").block(block), area);
        return;
    }
    let header = Row::new(page.columns.iter().map(|h| Cell::from(h.as_str()).style(Style::default().add_modifier(Modifier::BOLD))));
    let rows: Vec<Row> = page.records.iter().map(|r| {
        Row::new(r.values().map(|v| Cell::from(truncate(&v.to_string(), 18)).style(Style::default().fg(theme.cell_color(v)))))
    }).collect();
    let widths: Vec<Constraint> = page.columns.iter().map(|_| Constraint::Min(12)).collect();
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn render_figure(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let Some(fig) = &app.figure else {
        frame.render_widget(Paragraph::new("Figure unavailable.").block(Block::default().borders(Borders::ALL).title("Scatter (v)")), area);
        return;
    };
    let Some((xb, yb)) = fig.bounds() else {
        frame.render_widget(Paragraph::new("Nothing to plot.").block(Block::default().borders(Borders::ALL).title("Scatter (v)")), area);
        return;
    };
    let points: Vec<Vec<(f64, f64)>> = fig.series.iter()
        .map(|s| s.points.iter().map(|p| (p.x, p.y)).collect())
        .collect();
    let datasets: Vec<ChartDataset> = fig.series.iter().zip(&points).enumerate().map(|(i, (s, pts))| {
        ChartDataset::default()
            .name(s.name.clone().unwrap_or_else(|| "rows".into()))
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(theme.series_color(i)))
            .data(pts)
    }).collect();
    let (xb, yb) = (pad(xb), pad(yb));
    let x_title = if fig.spec.log_x { format!("log10({})", fig.spec.x) } else { fig.spec.x.clone() };
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title_for(fig)))
        .x_axis(Axis::default().title(x_title).bounds(xb).labels(axis_labels(xb)))
        .y_axis(Axis::default().title(fig.spec.y.clone()).bounds(yb).labels(axis_labels(yb)));
    frame.render_widget(chart, area);
}

fn title_for(fig: &ScatterFigure) -> String {
    if fig.skipped_rows > 0 {
        format!("Scatter (v) {} points, {} rows not plotted", fig.point_count(), fig.skipped_rows)
    } else {
        format!("Scatter (v) {} points", fig.point_count())
    }
}

/// Widens degenerate bounds so single points still render.
fn pad(b: [f64; 2]) -> [f64; 2] {
    if (b[1] - b[0]).abs() < f64::EPSILON { [b[0] - 1.0, b[1] + 1.0] } else { b }
}

fn axis_labels(b: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (b[0] + b[1]) / 2.0;
    [b[0], mid, b[1]].iter().map(|v| Span::raw(fmt_num(*v))).collect()
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let text = if let Some(mode) = app.input {
        format!(" {}: {}_  (Enter apply, Esc cancel)", mode.prompt(), app.input_buffer)
    } else {
        format!(" {} | q:quit ?:help Tab:focus n/p/g/G:page t v", app.status_msg)
    };
    frame.render_widget(Paragraph::new(text).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Keybindings", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  q        Quit"),
        Line::from("  ?        Toggle help"),
        Line::from("  Tab      Cycle focus"),
        Line::from("  t / v    Toggle table / scatter figure"),
        Line::from("  n / p    Next / previous page"),
        Line::from("  g / G    First / last page"),
        Line::from("  :        Go to page"),
        Line::from("  + / -    Grow / shrink page size"),
        Line::from("  s        Set page size"),
        Line::from(""),
        Line::from(Span::styled("Filters", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  a / d    Add / delete filter"),
        Line::from("  j / k    Select filter"),
        Line::from("  f / F    Next / previous field"),
        Line::from("  /        Type field name"),
        Line::from("  o        Next operator"),
        Line::from("  e Enter  Edit value"),
        Line::from(""),
        Line::from(Span::styled("Columns", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  j / k    Move"),
        Line::from("  space    Show / hide column"),
    ];
    let popup = centered_rect(50, 70, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help (?)")), popup);
}

fn centered_rect(px: u16, py: u16, r: Rect) -> Rect {
    let v = Layout::default().direction(Direction::Vertical).constraints([Constraint::Percentage((100-py)/2), Constraint::Percentage(py), Constraint::Percentage((100-py)/2)]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([Constraint::Percentage((100-px)/2), Constraint::Percentage(px), Constraint::Percentage((100-px)/2)]).split(v[1])[1]
}

fn fmt_num(v: f64) -> String {
    if v.abs() >= 1e6 { format!("{:.1}M", v / 1e6) } else if v.abs() >= 1e3 { format!("{:.1}k", v / 1e3) } else { format!("{v:.1}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_owned() } else { format!("{}\u{2026}", s.chars().take(max.saturating_sub(1)).collect::<String>()) }
}
