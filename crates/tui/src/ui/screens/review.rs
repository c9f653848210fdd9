use chrono::Utc;
use engine::{ReviewQueue, SWIPE_THRESHOLD_RATIO, safe_to_spend, split_bill};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, CELL_ASPECT, Overlay, RuleField},
    ui::{components, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, queue: Option<&ReviewQueue>) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(1), // Queue counter
            Constraint::Min(0),    // Card stack
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    render_counter(frame, layout[1], queue, &theme);

    match queue {
        Some(queue) if !queue.is_empty() => render_stack(frame, layout[2], state, queue, &theme),
        _ => render_inbox_zero(frame, layout[2], &theme),
    }

    render_bottom_bar(frame, layout[3], &theme);

    match &state.review.overlay {
        Overlay::None => {}
        Overlay::CategoryPicker { options, selected } => {
            render_category_picker(frame, area, state, options, *selected, &theme);
        }
        Overlay::RuleBuilder(builder) => render_rule_builder(frame, area, builder, &theme),
        Overlay::Split { friends } => render_split(frame, area, queue, *friends, &theme),
    }

    components::toast::render(frame, area, state.review.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state.login.username.as_str();
    let allowance = state.review.balances.map(|snapshot| {
        safe_to_spend(snapshot.total, snapshot.locked, Utc::now().date_naive())
    });

    let mut parts = vec![
        Span::styled("User", Style::default().fg(theme.dim)),
        Span::raw(format!(": {user}  ")),
    ];
    match allowance {
        Some(per_day) => {
            parts.push(Span::styled("Safe to spend", Style::default().fg(theme.dim)));
            parts.push(Span::raw(": "));
            parts.push(Span::styled(
                format!("{per_day}/day"),
                Style::default().fg(theme.accent),
            ));
        }
        None => {
            parts.push(Span::styled("Safe to spend", Style::default().fg(theme.dim)));
            parts.push(Span::raw(": -"));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn render_counter(frame: &mut Frame<'_>, area: Rect, queue: Option<&ReviewQueue>, theme: &Theme) {
    let waiting = queue.map(ReviewQueue::len).unwrap_or(0);
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("{waiting} items waiting"),
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        area,
    );
}

fn render_stack(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    queue: &ReviewQueue,
    theme: &Theme,
) {
    let card_area = centered_box(
        (area.width * 3 / 5).clamp(30, 60),
        (area.height * 3 / 5).clamp(9, 14),
        area,
    );

    if let Some(next) = queue.peek_next() {
        let under = Rect {
            y: card_area.y.saturating_add(1),
            ..card_area
        };
        components::card::render_next_card(frame, under, next, theme);
    }

    if let Some(head) = queue.peek_head() {
        let (dx, dy) = state.review.gesture.displacement();
        let dragged = components::card::dragged_rect(card_area, area, dx, dy);
        // The classifier sees rows scaled to cell aspect; the indicators
        // must light up on the same displacement.
        let threshold = area.width as f32 * SWIPE_THRESHOLD_RATIO;
        components::card::render_top_card(
            frame,
            dragged,
            head,
            theme,
            (dx, dy * CELL_ASPECT),
            threshold,
        );
    }
}

fn render_inbox_zero(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Inbox Zero!",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "Your budget is perfectly balanced.",
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        rows[2],
    );
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let parts = vec![
        Span::styled("←/→/↑", Style::default().fg(theme.accent)),
        Span::raw(" decide  "),
        Span::styled("drag", Style::default().fg(theme.accent)),
        Span::raw(" swipe  "),
        Span::styled("r", Style::default().fg(theme.accent)),
        Span::raw(" refresh  "),
        Span::styled("e", Style::default().fg(theme.accent)),
        Span::raw(" export  "),
        Span::styled("s", Style::default().fg(theme.accent)),
        Span::raw(" split  "),
        Span::styled("q", Style::default().fg(theme.accent)),
        Span::raw(" quit"),
    ];
    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn render_category_picker(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    options: &[engine::CategoryOption],
    selected: usize,
    theme: &Theme,
) {
    let height = (options.len() as u16 + 4).min(area.height);
    let overlay = centered_box(36.min(area.width), height, area);
    frame.render_widget(Clear, overlay);

    let merchant = state
        .review
        .picking_for
        .as_deref()
        .unwrap_or("transaction");
    let block = Block::default()
        .title(" Fix Category ")
        .title_bottom(format!(" {merchant} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.error));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines: Vec<Line<'_>> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if i == selected {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            let marker = if i == selected { "> " } else { "  " };
            Line::from(Span::styled(format!("{marker}{}", option.name), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_rule_builder(
    frame: &mut Frame<'_>,
    area: Rect,
    builder: &crate::app::RuleBuilderState,
    theme: &Theme,
) {
    let height = (builder.options.len() as u16 + 7).min(area.height);
    let overlay = centered_box(44.min(area.width), height, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .title(" Create a Rule ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.warn));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let pattern_focused = builder.focus == RuleField::Pattern;
    let cursor = if pattern_focused { "│" } else { "" };
    let pattern_style = if pattern_focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Match pattern (* as wildcard)",
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            format!("{}{cursor}", builder.pattern),
            pattern_style,
        )),
        Line::default(),
        Line::from(Span::styled(
            "Assign category",
            Style::default().fg(theme.dim),
        )),
    ];

    for (i, option) in builder.options.iter().enumerate() {
        let is_selected = i == builder.selected;
        let style = if is_selected && !pattern_focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        let marker = if is_selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", option.name),
            style,
        )));
    }

    lines.push(Line::from(Span::styled(
        "Tab field  Enter save  Esc skip",
        Style::default().fg(theme.dim),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_split(
    frame: &mut Frame<'_>,
    area: Rect,
    queue: Option<&ReviewQueue>,
    friends: usize,
    theme: &Theme,
) {
    let Some(head) = queue.and_then(ReviewQueue::peek_head) else {
        return;
    };

    let overlay = centered_box(36.min(area.width), 8, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .title(" Split Bill ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let shares = split_bill(head.amount, friends);
    let each = shares.first().copied().unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(
            format!("{} {}", head.merchant_label, head.amount),
            Style::default().fg(theme.text),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Friends: ", Style::default().fg(theme.dim)),
            Span::styled(
                format!("{friends}"),
                Style::default().fg(theme.accent),
            ),
            Span::raw("  (↑/↓ to change)"),
        ]),
        Line::from(vec![
            Span::styled("Each pays: ", Style::default().fg(theme.dim)),
            Span::styled(
                format!("{each}"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Esc close",
            Style::default().fg(theme.dim),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
