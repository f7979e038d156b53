use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::*,
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Tabs, Wrap,
    },
};

use crate::App;
use crate::filters::Filters;
use crate::models::{FocusArea, Launch, View};
use crate::theme::Theme;

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

pub fn render(f: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_tabs(f, app, theme, chunks[0]);
    match app.view {
        View::Dashboard => render_dashboard(f, app, theme, chunks[1]),
        View::Launches => render_launches(f, app, theme, chunks[1]),
        View::Starlink => render_starlink(f, app, theme, chunks[1]),
    }
    render_footer(f, app, theme, chunks[2]);
}

fn render_tabs(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let titles: Vec<&str> = View::ALL.iter().map(|view| view.title()).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("spacedash"))
        .style(Style::default().fg(theme.text))
        .highlight_style(theme.tab_active)
        .select(app.view.as_index())
        .divider(symbols::DOT)
        .padding(" ", " ");
    f.render_widget(tabs, area);
}

fn render_dashboard(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let panel = app.dashboard.lock().unwrap();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let company_block = Block::default()
        .title("Company")
        .borders(Borders::ALL)
        .style(Style::default().fg(theme.focus_border));
    let mut lines = Vec::new();
    if let Some(err) = &panel.error {
        lines.push(Line::styled(format!("Request failed: {err}"), theme.error));
    } else if let Some(company) = &panel.company {
        lines.push(stat_line(theme, "Name", company.name.clone()));
        lines.push(stat_line(
            theme,
            "Founded",
            format!("{} by {}", company.founded, company.founder),
        ));
        lines.push(stat_line(theme, "Employees", company.employees.to_string()));
        lines.push(stat_line(
            theme,
            "Fleet",
            format!(
                "{} vehicles, {} launch sites, {} test sites",
                company.vehicles, company.launch_sites, company.test_sites
            ),
        ));
        lines.push(stat_line(theme, "Valuation", format_valuation(company.valuation)));
        lines.push(Line::default());
        lines.push(Line::raw(company.summary.clone()));
    } else {
        lines.push(Line::styled("Loading company profile...", theme.stat_label));
    }
    let company = Paragraph::new(lines)
        .block(company_block)
        .wrap(Wrap { trim: true });
    f.render_widget(company, columns[0]);

    let cards = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);
    launch_card(f, theme, cards[0], "Latest Launch", panel.latest.as_ref());
    launch_card(f, theme, cards[1], "Next Launch", panel.next.as_ref());
}

fn launch_card(f: &mut Frame, theme: &Theme, area: Rect, title: &str, launch: Option<&Launch>) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(theme.blurred_border));
    let lines = match launch {
        Some(launch) => {
            let mut lines = vec![
                Line::styled(
                    format!("{} (flight #{})", launch.name, launch.flight_number),
                    theme.stat_value,
                ),
                stat_line(theme, "Date", format_date(&launch.date_utc)),
                Line::from(vec![
                    Span::styled("Status: ", theme.stat_label),
                    Span::styled(launch.status_label(), launch_status_style(theme, launch)),
                ]),
            ];
            if let Some(details) = &launch.details {
                lines.push(Line::default());
                lines.push(Line::raw(details.clone()));
            }
            lines
        }
        None => vec![Line::styled("No data yet.", theme.stat_label)],
    };
    let card = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn render_launches(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let panel = app.launches.lock().unwrap();
    let filters = app.filters.filters();

    let show_detail = app.show_details && app.selected_launch.is_some();
    let columns = if show_detail {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(30),     // rocket sidebar
                Constraint::Percentage(60), // launch list
                Constraint::Percentage(40), // detail view
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(1)])
            .split(area)
    };

    // Rocket sidebar, "All rockets" on top
    let mut rocket_list = Vec::new();
    let all_style = if filters.rocket_id.is_empty() {
        Style::default().fg(theme.text_highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    rocket_list.push(ListItem::new(vec![
        Line::from(vec![Span::styled("All rockets", all_style)]),
        Line::from(vec![Span::styled(
            format!("{} in catalog", panel.rockets.len()),
            theme.stat_label,
        )]),
    ]));
    rocket_list.push(ListItem::new(Line::from(vec![Span::styled(
        "────────────",
        Style::default().fg(theme.blurred_border),
    )])));
    if panel.rockets.is_empty() {
        rocket_list.push(ListItem::new(Line::styled(
            "No rockets loaded yet",
            theme.stat_label,
        )));
    } else {
        for rocket in &panel.rockets {
            let name_style = if rocket.id == filters.rocket_id {
                Style::default().fg(theme.text_highlight).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            let status = if rocket.active {
                Span::styled("active", theme.rocket_active)
            } else {
                Span::styled("retired", theme.rocket_retired)
            };
            rocket_list.push(ListItem::new(vec![
                Line::from(vec![Span::styled(rocket.name.clone(), name_style)]),
                Line::from(vec![
                    status,
                    Span::styled(
                        format!(" | {:.0}% success", rocket.success_rate_pct),
                        theme.stat_label,
                    ),
                ]),
            ]));
        }
    }
    let sidebar = List::new(rocket_list).highlight_symbol("→");
    let mut sidebar_state = ListState::default();
    sidebar_state.select(Some(match app.selected_rocket {
        None => 0,
        Some(i) => i + 2,
    }));
    let sidebar_block = Block::default().title("Rockets").borders(Borders::ALL).style(
        if app.focus == FocusArea::Sidebar {
            Style::default().fg(theme.focus_border).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.focus_border)
        },
    );
    f.render_stateful_widget(sidebar.block(sidebar_block), columns[0], &mut sidebar_state);

    // Launch list with scrollbar
    let launch_area = columns[1];
    let launch_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)].as_ref())
        .split(launch_area);

    let rocket_label = if filters.rocket_id.is_empty() {
        "All rockets".to_string()
    } else {
        panel
            .rockets
            .iter()
            .find(|rocket| rocket.id == filters.rocket_id)
            .map(|rocket| rocket.name.clone())
            .unwrap_or_else(|| "Selected rocket".to_string())
    };
    let header = match &panel.launches {
        Some(page) => format!(
            "Launches: {} | {} | page {}/{} | {} total",
            rocket_label,
            year_range_label(filters),
            page.page,
            page.total_pages.max(1),
            page.total_docs
        ),
        None => format!("Launches: {} | {}", rocket_label, year_range_label(filters)),
    };
    let list_block = Block::default().title(header).borders(Borders::ALL).style(
        if app.focus == FocusArea::LaunchList {
            Style::default().fg(theme.focus_border).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.focus_border)
        },
    );

    if let Some(err) = &panel.error {
        let error = Paragraph::new(format!("Request failed: {err}"))
            .block(list_block)
            .style(theme.error)
            .wrap(Wrap { trim: true });
        f.render_widget(error, launch_area);
    } else if let Some(page) = &panel.launches {
        if page.docs.is_empty() {
            let placeholder =
                Paragraph::new("No launches match the current filters. Press 'x' to reset.")
                    .block(list_block)
                    .alignment(Alignment::Center)
                    .style(theme.stat_label);
            f.render_widget(placeholder, launch_area);
        } else {
            let items: Vec<ListItem> = page
                .docs
                .iter()
                .enumerate()
                .map(|(i, launch)| {
                    let selected = Some(i) == app.selected_launch;
                    let indicator = if selected { "→ " } else { "  " };
                    let symbol = if launch.upcoming {
                        "…"
                    } else {
                        match launch.success {
                            Some(true) => "✔",
                            Some(false) => "✘",
                            None => "?",
                        }
                    };
                    let line = Line::from(vec![
                        Span::raw(indicator),
                        Span::styled(symbol, launch_status_style(theme, launch)),
                        Span::raw(format!(" #{:<4}", launch.flight_number)),
                        Span::styled(format_date(&launch.date_utc), theme.stat_label),
                        Span::raw(" "),
                        Span::raw(launch.name.clone()),
                    ]);
                    let style = if selected {
                        Style::default()
                            .fg(theme.text_highlight)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(line).style(style)
                })
                .collect();
            let mut state = ListState::default();
            state.select(app.selected_launch);
            let list = List::new(items).block(list_block);
            f.render_stateful_widget(list, launch_layout[0], &mut state);

            let mut scrollbar_state = ScrollbarState::default()
                .position(app.selected_launch.unwrap_or(0))
                .content_length(page.docs.len());
            f.render_stateful_widget(
                Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
                launch_layout[1],
                &mut scrollbar_state,
            );
        }
    } else {
        let placeholder = Paragraph::new("Loading launches...")
            .block(list_block)
            .alignment(Alignment::Center)
            .style(theme.stat_label);
        f.render_widget(placeholder, launch_area);
    }

    // Detail view on the right when toggled
    if show_detail && columns.len() > 2 {
        if let Some(launch) = app
            .selected_launch
            .and_then(|i| panel.launches.as_ref().and_then(|page| page.docs.get(i)))
        {
            let detail_area = columns[2];
            f.render_widget(Clear, detail_area);
            let details = launch.summary();
            let block = Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .style(if app.focus == FocusArea::Detail {
                    Style::default().fg(theme.focus_border).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.blurred_border)
                });
            let para = Paragraph::new(details.clone())
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll, 0));
            f.render_widget(para, detail_area);

            let lines = details.lines().count();
            let mut scrollbar_state = ScrollbarState::default()
                .position(app.detail_scroll as usize)
                .content_length(lines);
            let scrollbar_area = detail_area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            });
            f.render_stateful_widget(
                Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
                scrollbar_area,
                &mut scrollbar_state,
            );
        }
    }
}

fn render_starlink(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let panel = app.starlink.lock().unwrap();
    let filters = app.filters.filters();

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)].as_ref())
        .split(area);

    let header = match &panel.sats {
        Some(page) => format!(
            "Starlink satellites | page {}/{} | {} total | {} per page",
            page.page,
            page.total_pages.max(1),
            page.total_docs,
            filters.limit
        ),
        None => "Starlink satellites".to_string(),
    };
    let block = Block::default()
        .title(header)
        .borders(Borders::ALL)
        .style(Style::default().fg(theme.focus_border));

    if let Some(err) = &panel.error {
        let error = Paragraph::new(format!("Request failed: {err}"))
            .block(block)
            .style(theme.error)
            .wrap(Wrap { trim: true });
        f.render_widget(error, area);
        return;
    }
    let Some(page) = &panel.sats else {
        let placeholder = Paragraph::new("Loading Starlink fleet...")
            .block(block)
            .alignment(Alignment::Center)
            .style(theme.stat_label);
        f.render_widget(placeholder, area);
        return;
    };

    let items: Vec<ListItem> = page
        .docs
        .iter()
        .enumerate()
        .map(|(i, sat)| {
            let selected = Some(i) == app.selected_sat;
            let indicator = if selected { "→ " } else { "  " };
            let name = sat
                .space_track
                .object_name
                .clone()
                .unwrap_or_else(|| sat.id.clone());
            let mut spans = vec![
                Span::raw(indicator),
                Span::styled(format!("{name:<16}"), theme.stat_value),
                Span::styled(
                    format!(" {:<5}", sat.version.as_deref().unwrap_or("-")),
                    theme.stat_label,
                ),
                Span::styled(
                    format!(
                        " launched {}",
                        sat.space_track.launch_date.as_deref().unwrap_or("unknown")
                    ),
                    Style::default().fg(theme.text_secondary),
                ),
            ];
            if let Some(height) = sat.height_km {
                spans.push(Span::styled(format!(" | {height:.0} km"), theme.stat_label));
            }
            if sat.space_track.decayed == Some(1) {
                spans.push(Span::styled(" decayed", theme.launch_failure));
            }
            let style = if selected {
                Style::default()
                    .fg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.selected_sat);
    let list = List::new(items).block(block);
    f.render_stateful_widget(list, layout[0], &mut state);

    let mut scrollbar_state = ScrollbarState::default()
        .position(app.selected_sat.unwrap_or(0))
        .content_length(page.docs.len());
    f.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        layout[1],
        &mut scrollbar_state,
    );
}

fn render_footer(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let help = match app.view {
        View::Dashboard => "1/2/3 Views | Tab Cycle | r Refresh | q Quit",
        View::Launches => {
            "h/l Focus | ↑/↓ Navigate | Enter Rocket filter | ←/→ Page | +/- Limit | s/S e/E Years | x Reset | Space Details | c Copy | q Quit"
        }
        View::Starlink => "↑/↓ Navigate | ←/→ Page | +/- Limit | x Reset | r Refresh | q Quit",
    };
    let mut spans = Vec::new();
    if app.loading.is_active() {
        spans.push(Span::styled(
            format!("{} fetching  ", SPINNER[app.tick % SPINNER.len()]),
            theme.loading,
        ));
    } else if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("{status}  "),
            Style::default().fg(theme.text_highlight),
        ));
    }
    spans.push(Span::raw(help));
    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .style(theme.footer);
    f.render_widget(footer, area);
}

fn stat_line(theme: &Theme, label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), theme.stat_label),
        Span::styled(value, theme.stat_value),
    ])
}

fn launch_status_style(theme: &Theme, launch: &Launch) -> Style {
    if launch.upcoming {
        theme.launch_upcoming
    } else {
        match launch.success {
            Some(true) => theme.launch_success,
            Some(false) => theme.launch_failure,
            None => theme.stat_label,
        }
    }
}

fn format_date(date_utc: &str) -> String {
    DateTime::parse_from_rfc3339(date_utc)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| date_utc.to_string())
}

fn year_range_label(filters: &Filters) -> String {
    match (filters.start_year, filters.end_year) {
        (None, None) => "all years".to_string(),
        (Some(start), None) => format!("{start} and later"),
        (None, Some(end)) => format!("up to {end}"),
        (Some(start), Some(end)) => format!("{start}-{end}"),
    }
}

fn format_valuation(valuation: u64) -> String {
    if valuation >= 1_000_000_000 {
        format!("${:.1}B", valuation as f64 / 1e9)
    } else if valuation >= 1_000_000 {
        format!("${:.1}M", valuation as f64 / 1e6)
    } else {
        format!("${valuation}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_label_covers_open_and_closed_ranges() {
        let mut filters = Filters::default();
        assert_eq!(year_range_label(&filters), "all years");

        filters.start_year = Some(2018);
        assert_eq!(year_range_label(&filters), "2018 and later");

        filters.end_year = Some(2020);
        assert_eq!(year_range_label(&filters), "2018-2020");
    }

    #[test]
    fn dates_fall_back_to_the_raw_string() {
        assert_eq!(format_date("2020-03-07T04:50:31.000Z"), "2020-03-07");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn valuation_scales_to_billions() {
        assert_eq!(format_valuation(74_000_000_000), "$74.0B");
        assert_eq!(format_valuation(500_000), "$500000");
    }
}
