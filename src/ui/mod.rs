use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, InputMode};
use crate::controller::{HistoryView, StatusLevel, MSG_HISTORY_FAILED, MSG_NO_MATCH};
use crate::domain::format::short_address;
use crate::domain::history::{HistoryFilter, HistoryPage, PageItem};
use crate::domain::network;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_wallet_panel(f, areas.wallet, app);
    draw_contract_panel(f, areas.contract, app);
    draw_history_panel(f, areas.history, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.network_picker.is_some() {
        draw_network_picker(f, areas.size, app);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Storekeep",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.wallet_endpoint.clone()),
    ]);
    let left = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    f.render_widget(left, chunks[0]);

    let network = Line::from(vec![
        Span::styled("Net ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.display.network.clone(),
            Style::default().fg(Color::LightYellow),
        ),
    ]);
    let right = Paragraph::new(network)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(right, chunks[1]);
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, app: &App) {
    let display = &app.display;
    let (state, color) = if display.connected {
        ("Connected", Color::LightGreen)
    } else {
        ("Not connected", Color::DarkGray)
    };

    let mut lines = vec![Line::from(vec![
        label("Status  "),
        Span::styled(state, Style::default().fg(color)),
    ])];
    if let Some(address) = display.address.as_deref() {
        lines.push(Line::from(vec![
            label("Account "),
            Span::raw(short_address(address)),
        ]));
        lines.push(Line::from(vec![
            label("Balance "),
            Span::raw(or_dash(&display.balance)),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "c connect",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(vec![
        label("Network "),
        Span::raw(display.network.clone()),
    ]));

    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Wallet").borders(Borders::ALL));
    f.render_widget(panel, area);
}

fn draw_contract_panel(f: &mut Frame, area: Rect, app: &App) {
    let display = &app.display;
    let mut lines = vec![
        Line::from(vec![label("Contract "), Span::raw(app.contract.clone())]),
        Line::from(vec![
            label("Stored   "),
            Span::styled(
                or_dash(&display.stored_value),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    let editing = app.input_mode == InputMode::Editing;
    let input_style = if display.store_pending {
        Style::default().fg(Color::DarkGray)
    } else if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if editing { "_" } else { "" };
    lines.push(Line::from(vec![
        label("Value    "),
        Span::styled(format!("{}{cursor}", app.value_input), input_style),
    ]));

    let action = if display.store_pending {
        Span::styled("storing...", Style::default().fg(Color::DarkGray))
    } else if editing {
        Span::styled("Enter=store Esc=cancel", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("i edit  r retrieve", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(action));

    if let Some(hash) = display.pending_tx.as_deref() {
        lines.push(Line::from(vec![
            label("Pending  "),
            Span::styled(short_hash(hash), Style::default().fg(Color::LightYellow)),
        ]));
        lines.push(Line::from(Span::styled(
            ":cancel stops waiting",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Contract").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_history_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("History").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    if app.display.show_filters {
        f.render_widget(Paragraph::new(filter_tabs(app.display.filter)), chunks[0]);
    }

    let message = match &app.display.history {
        HistoryView::Page(page) => {
            draw_history_rows(f, chunks[1], app, page);
            f.render_widget(
                Paragraph::new(page_strip_line(page)).alignment(Alignment::Center),
                chunks[2],
            );
            return;
        }
        HistoryView::Hidden => "Connect a wallet to see history".to_string(),
        HistoryView::Loading => "Loading...".to_string(),
        HistoryView::Empty(reason) => reason.clone(),
        HistoryView::ApiError(message) => message.clone(),
        HistoryView::Failed { detail } => format!("{MSG_HISTORY_FAILED}: {detail}"),
        HistoryView::NoMatch => MSG_NO_MATCH.to_string(),
    };
    let color = match app.display.history {
        HistoryView::ApiError(_) | HistoryView::Failed { .. } => Color::LightRed,
        _ => Color::DarkGray,
    };
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, chunks[1]);
}

fn draw_history_rows(f: &mut Frame, area: Rect, app: &App, page: &HistoryPage) {
    let items: Vec<ListItem> = page
        .rows
        .iter()
        .map(|row| {
            let (mark, color) = if row.success {
                ("ok  ", Color::LightGreen)
            } else {
                ("fail", Color::LightRed)
            };
            let mut spans = vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(" "),
                Span::styled(
                    format!("{:<18}", row.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}  ", row.from_short),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(row.time_ago.clone(), Style::default().fg(Color::DarkGray)),
            ];
            if row.own {
                spans.push(Span::styled("  you", Style::default().fg(Color::LightCyan)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !page.rows.is_empty() {
        state.select(Some(app.selected_row.min(page.rows.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn filter_tabs(active: HistoryFilter) -> Line<'static> {
    let mut spans = Vec::new();
    for filter in HistoryFilter::ALL {
        let style = if filter == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", filter.title()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn page_strip_line(page: &HistoryPage) -> Line<'static> {
    if page.strip.is_empty() {
        return Line::from("");
    }
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(
        "< ",
        if page.has_prev() { Style::default() } else { dim },
    )];
    for item in &page.strip {
        match item {
            PageItem::Number(n) if *n == page.page => spans.push(Span::styled(
                format!("[{n}] "),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Number(n) => spans.push(Span::raw(format!("{n} "))),
            PageItem::Ellipsis => spans.push(Span::styled("... ", dim)),
        }
    }
    spans.push(Span::styled(
        ">",
        if page.has_next() { Style::default() } else { dim },
    ));
    Line::from(spans)
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        label("Wallet "),
        Span::raw(if app.display.connected { "on  " } else { "off  " }),
        label("Filter "),
        Span::raw(format!("{}  ", app.display.filter.title())),
    ];
    if let HistoryView::Page(page) = &app.display.history {
        spans.push(label("Page "));
        spans.push(Span::raw(format!("{}/{}", page.page, page.total_pages)));
    }
    if app.display.store_pending {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "tx pending",
            Style::default().fg(Color::LightYellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("connect", "Connect wallet"),
        ("disconnect", "Forget the connected account"),
        ("network", "Switch network: network <key>"),
        ("store", "Store a number: store <n>"),
        ("retrieve", "Read the stored number"),
        ("cancel", "Stop waiting for the pending receipt"),
        ("history", "Reload transaction history"),
        ("filter", "Filter: all | mine | success | failed"),
        ("page", "Go to page: page <n>"),
        ("next", "Next page"),
        ("prev", "Previous page"),
        ("help", "Show help"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("connect | store <n> | filter <f> | page <n>");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Editing => Line::from(vec![
            Span::styled("> value ", Style::default().fg(Color::LightCyan)),
            Span::raw(app.value_input.clone()),
            Span::styled(
                "  (uint256, Enter=store Esc=cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightYellow,
                    StatusLevel::Success => Color::LightGreen,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                Line::from(Span::styled(
                    "c connect  i edit  r retrieve  h reload  Tab filter  [ ] page  n network  y copy  ? help  q quit",
                    Style::default().fg(Color::DarkGray),
                ))
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_network_picker(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(40, 30, area);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = network::available_networks()
        .iter()
        .map(|network| {
            let current = app.display.network_key == Some(network.key);
            let mut spans = vec![Span::raw(network.chain_name)];
            if current {
                spans.push(Span::styled(
                    "  (current)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title("Switch network (Enter=ok Esc=cancel)")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(app.network_picker);
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(64, 64, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Wallet"),
        Line::from("  c          Connect"),
        Line::from("  x          Disconnect"),
        Line::from("  n          Switch network"),
        Line::from(""),
        Line::from("Contract"),
        Line::from("  i          Edit value, Enter to store"),
        Line::from("  r          Retrieve stored value"),
        Line::from(""),
        Line::from("History"),
        Line::from("  h          Reload"),
        Line::from("  Tab        Cycle filter"),
        Line::from("  j / k      Move selection"),
        Line::from("  [ / ]      Prev/Next page"),
        Line::from("  y          Copy explorer link"),
        Line::from(""),
        Line::from("  :          Command line"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "--".to_string()
    } else {
        value.to_string()
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() <= 18 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}…{}", &hash[..10], &hash[hash.len() - 6..])
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
