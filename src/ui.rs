//! TUI rendering for the Groundhold TUI
//!
//! This module handles all UI rendering logic using the `ratatui` crate:
//! the stats header cards, the airports sidebar, the delay predictor panel
//! and the popup dialogs for browsing the full datasets.

use crate::app::{App, DialogState, PanelState, STATS_ERROR};
use crate::events::DialogData;
use ratatui::{prelude::*, widgets::*};

use crate::models::{day_name, delay_tone, DelayTone, DAYS_OF_WEEK};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Renders one frame of the TUI based on current application state.
///
/// Layout is a one-line title bar with today's date, a stats header (four
/// cards), a main area split into the airports sidebar and the predictor
/// panel, and a one-line key help bar. An open dialog is drawn last, over
/// everything else.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    render_title_bar(f, chunks[0]);
    render_stats_header(f, app, chunks[1]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);
    render_airports_panel(f, app, main[0]);
    render_predictor_panel(f, app, main[1]);

    let help = Paragraph::new(
        " ←/→ day   ↑/↓ airport   a airports   m routes   b performers   l airlines   r refresh   q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);

    if let Some(dialog) = &app.dialog {
        render_dialog(f, app, dialog);
    }
}

fn render_title_bar(f: &mut Frame, area: Rect) {
    let today = chrono::Local::now().format("%B %-d, %Y");
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "✈ Flight Delay Insights",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", today),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

/// The four "today" cards: best airport, busiest airport, most delayed route
/// and today's winner. Cards fill in one by one as their fetches land.
fn render_stats_header(f: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let spinner = SPINNER[app.tick_count % SPINNER.len()];
    let placeholder = |loading: bool| {
        if loading {
            vec![Line::from(spinner)]
        } else {
            vec![Line::from(Span::styled(
                "n/a",
                Style::default().fg(Color::DarkGray),
            ))]
        }
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let caption = Style::default().fg(Color::DarkGray);

    let best = match &app.stats.best_airport {
        Some(best) => vec![
            Line::from(Span::styled(best.airport_name.clone(), bold)),
            delay_line(&best.delay_chance),
        ],
        None => placeholder(app.stats_loading),
    };
    render_card(f, cards[0], " Best Airport ", best);

    let busiest = match &app.stats.busiest_airport {
        Some(busiest) => vec![
            Line::from(Span::styled(busiest.airport_name.clone(), bold)),
            delay_line(&busiest.delay_chance),
            Line::from(Span::styled("via most delayed route", caption)),
        ],
        None => placeholder(app.stats_loading),
    };
    render_card(f, cards[1], " Busiest Airport ", busiest);

    let route = match &app.stats.most_delayed_route {
        Some(route) => {
            let origin = route
                .origin_name
                .clone()
                .unwrap_or_else(|| route.origin_id.to_string());
            let dest = route
                .dest_name
                .clone()
                .unwrap_or_else(|| route.dest_id.to_string());
            vec![
                Line::from(Span::styled(origin, bold)),
                Line::from(Span::styled(format!("→ {}", dest), bold)),
                delay_line(&route.delay_chance),
            ]
        }
        None => placeholder(app.stats_loading),
    };
    render_card(f, cards[2], " Most Delayed Route ", route);

    let winner = match &app.stats.todays_winner {
        Some(winner) => {
            let mut lines = vec![Line::from(Span::styled(winner.airport_name.clone(), bold))];
            match winner.prediction.delay_chance.as_deref() {
                Some(chance) => {
                    lines.push(delay_line(chance));
                    lines.push(Line::from(Span::styled(
                        format!("confidence {:.1}%", winner.prediction.confidence_percent),
                        caption,
                    )));
                }
                None => lines.push(Line::from(Span::styled("no data", caption))),
            }
            lines
        }
        None => placeholder(app.stats_loading),
    };
    render_card(f, cards[3], " Today's Winner ", winner);
}

fn render_card(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let card = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(card, area);
}

/// Airports sidebar: the selectable list, or the load spinner / combined
/// error message while the list is not available. During a refresh the
/// previous list stays visible until the new one lands.
fn render_airports_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Airports ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if app.airports_error {
        let msg = Paragraph::new(STATS_ERROR)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(msg, area);
        return;
    }
    if app.airports.is_empty() {
        let text = if app.airports_loading {
            let spinner = SPINNER[app.tick_count % SPINNER.len()];
            format!("{} Loading airports...", spinner)
        } else {
            "No airports.".to_string()
        };
        let msg = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    // Window the list so the selection stays on screen
    let visible = area.height.saturating_sub(2) as usize;
    let offset = app
        .selected_airport
        .map_or(0, |i| i.saturating_sub(visible.saturating_sub(1)));

    let items: Vec<ListItem> = app
        .airports
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, airport)| {
            let style = if Some(i) == app.selected_airport {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {}", airport.name)).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

/// Predictor panel: the day strip, the chosen airport and the prediction in
/// whatever state it is in.
fn render_predictor_panel(f: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut day_spans: Vec<Span> = vec![Span::styled("Day:      ", bold)];
    for (i, name) in DAYS_OF_WEEK.iter().enumerate() {
        let style = if (i + 1) as u8 == app.selected_day {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            dim
        };
        day_spans.push(Span::styled(&name[..3], style));
        day_spans.push(Span::raw(" "));
    }

    let selected_name = app
        .selected_airport
        .and_then(|i| app.airports.get(i))
        .map(|airport| airport.name.as_str());
    let airport_span = match selected_name {
        Some(name) => Span::styled(name, Style::default().fg(Color::Yellow)),
        None => Span::styled("select with ↑/↓", dim),
    };

    let mut lines = vec![
        Line::from(day_spans),
        Line::from(vec![Span::styled("Airport:  ", bold), airport_span]),
        Line::from(""),
    ];

    match &app.prediction {
        PanelState::Idle => lines.push(Line::from(Span::styled(
            "Pick a day and an airport to see the delay forecast.",
            dim,
        ))),
        PanelState::Loading => lines.push(Line::from(vec![
            Span::raw(SPINNER[app.tick_count % SPINNER.len()]),
            Span::styled(" Fetching prediction...", dim),
        ])),
        PanelState::Error(message) => {
            lines.push(Line::from(Span::styled(
                *message,
                Style::default().fg(Color::Red),
            )));
        }
        PanelState::Loaded(prediction) => {
            lines.push(Line::from(Span::styled(
                "Prediction Result",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            match prediction.delay_chance.as_deref() {
                Some(chance) => {
                    // The response's own fields take precedence; the current
                    // selection fills in when the server omitted them.
                    let airport = prediction.airport_name.as_deref().or(selected_name);
                    let day = day_name(prediction.day_of_week)
                        .or_else(|| day_name(app.selected_day));
                    lines.push(Line::from(vec![
                        Span::styled("Airport:      ", bold),
                        Span::raw(airport.unwrap_or("-")),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Day of week:  ", bold),
                        Span::raw(day.unwrap_or("-")),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Delay chance: ", bold),
                        Span::styled(
                            chance.to_string(),
                            Style::default()
                                .fg(tone_color(chance))
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Confidence:   ", bold),
                        Span::raw(format!("{:.1}%", prediction.confidence_percent)),
                    ]));
                }
                None => lines.push(Line::from(Span::styled(
                    "No data available for this selection.",
                    dim,
                ))),
            }
        }
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" Delay Predictor ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::new(2, 2, 1, 1)),
    );
    f.render_widget(panel, area);
}

fn render_dialog(f: &mut Frame, app: &App, dialog: &DialogState) {
    let area = centered_rect(70, 70, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", dialog.kind.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    match &dialog.state {
        PanelState::Idle | PanelState::Loading => {
            let spinner = SPINNER[app.tick_count % SPINNER.len()];
            let msg = Paragraph::new(format!("{} Loading...", spinner))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
        }
        PanelState::Error(message) => {
            let msg = Paragraph::new(*message)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
        }
        PanelState::Loaded(data) if data.is_empty() => {
            let msg = Paragraph::new("No rows.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
        }
        PanelState::Loaded(data) => {
            let table = dialog_table(data, dialog.scroll).block(block);
            f.render_widget(table, area);
        }
    }
}

/// Builds the dialog's table, skipping rows above the scroll position so the
/// highlighted row is always the first one visible.
fn dialog_table(data: &DialogData, scroll: usize) -> Table<'static> {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let selected_style = Style::default()
        .fg(Color::Cyan)
        .bg(Color::Rgb(30, 30, 60))
        .add_modifier(Modifier::BOLD);
    let highlight = |row: Row<'static>, i: usize| {
        if i == scroll {
            row.style(selected_style)
        } else {
            row
        }
    };

    let (header, rows, widths): (Row, Vec<Row>, Vec<Constraint>) = match data {
        DialogData::Airports(airports) => (
            Row::new(vec!["ID", "Airport"]).style(header_style),
            airports
                .iter()
                .enumerate()
                .skip(scroll)
                .map(|(i, a)| highlight(Row::new(vec![a.id.to_string(), a.name.clone()]), i))
                .collect(),
            vec![Constraint::Length(8), Constraint::Min(24)],
        ),
        DialogData::Routes(routes) => (
            Row::new(vec!["Origin", "Destination", "Delay"]).style(header_style),
            routes
                .iter()
                .enumerate()
                .skip(scroll)
                .map(|(i, r)| {
                    let origin = airport_label(r.origin_name.as_deref(), r.origin_id);
                    let dest = airport_label(r.dest_name.as_deref(), r.dest_id);
                    highlight(
                        Row::new(vec![
                            Cell::from(origin),
                            Cell::from(dest),
                            delay_cell(&r.delay_chance),
                        ]),
                        i,
                    )
                })
                .collect(),
            vec![
                Constraint::Percentage(40),
                Constraint::Percentage(40),
                Constraint::Percentage(20),
            ],
        ),
        DialogData::Performers(performers) => (
            Row::new(vec!["Airport", "Delay"]).style(header_style),
            performers
                .iter()
                .enumerate()
                .skip(scroll)
                .map(|(i, p)| {
                    highlight(
                        Row::new(vec![
                            Cell::from(p.airport_name.clone()),
                            delay_cell(&p.delay_chance),
                        ]),
                        i,
                    )
                })
                .collect(),
            vec![Constraint::Min(24), Constraint::Length(10)],
        ),
        DialogData::Airlines(airlines) => (
            Row::new(vec!["Airline", "Delay"]).style(header_style),
            airlines
                .iter()
                .enumerate()
                .skip(scroll)
                .map(|(i, a)| {
                    highlight(
                        Row::new(vec![
                            Cell::from(a.airline.clone()),
                            delay_cell(&a.delay_chance),
                        ]),
                        i,
                    )
                })
                .collect(),
            vec![Constraint::Min(24), Constraint::Length(10)],
        ),
    };

    Table::new(rows, widths).header(header)
}

// Route endpoints render as "Name (id)", or the bare id for unmapped airports.
fn airport_label(name: Option<&str>, id: i64) -> String {
    match name {
        Some(name) => format!("{} ({})", name, id),
        None => id.to_string(),
    }
}

fn delay_line(delay_chance: &str) -> Line<'static> {
    Line::from(Span::styled(
        delay_chance.to_string(),
        Style::default().fg(tone_color(delay_chance)),
    ))
}

fn delay_cell(delay_chance: &str) -> Cell<'static> {
    Cell::from(Span::styled(
        delay_chance.to_string(),
        Style::default().fg(tone_color(delay_chance)),
    ))
}

/// Green below the ten percent mark, the dashboard's red everywhere else.
fn tone_color(delay_chance: &str) -> Color {
    match delay_tone(delay_chance) {
        DelayTone::Good => Color::Green,
        DelayTone::Bad => Color::Rgb(211, 47, 47),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
