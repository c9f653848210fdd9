use engine::PendingTransaction;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::ui::theme::Theme;

/// Shifts the card rect by the current drag displacement, clamped to the
/// surrounding area.
pub fn dragged_rect(card: Rect, bounds: Rect, dx: f32, dy: f32) -> Rect {
    let min_x = bounds.x as i32;
    let max_x = min_x.max((bounds.x + bounds.width.saturating_sub(card.width)) as i32);
    let min_y = bounds.y as i32;
    let max_y = min_y.max((bounds.y + bounds.height.saturating_sub(card.height)) as i32);

    let x = (card.x as i32 + dx.round() as i32).clamp(min_x, max_x);
    let y = (card.y as i32 + dy.round() as i32).clamp(min_y, max_y);
    Rect {
        x: x as u16,
        y: y as u16,
        ..card
    }
}

/// The card rendered beneath the interactive one.
pub fn render_next_card(frame: &mut Frame<'_>, area: Rect, tx: &PendingTransaction, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            tx.merchant_label.clone(),
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            tx.amount.to_string(),
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// The interactive top card, with threshold indicators lighting up as the
/// drag approaches a decision.
pub fn render_top_card(
    frame: &mut Frame<'_>,
    area: Rect,
    tx: &PendingTransaction,
    theme: &Theme,
    displacement: (f32, f32),
    threshold: f32,
) {
    let (dx, dy) = displacement;

    let border_style = if dx > threshold {
        Style::default().fg(theme.accent)
    } else if dx < -threshold {
        Style::default().fg(theme.error)
    } else if dy < -threshold {
        Style::default().fg(theme.warn)
    } else {
        Style::default().fg(theme.text)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // indicators
            Constraint::Length(1), // merchant
            Constraint::Length(1), // amount
            Constraint::Length(1), // category guess
            Constraint::Min(0),
            Constraint::Length(1), // hint
        ])
        .margin(1)
        .split(inner);

    frame.render_widget(
        Paragraph::new(indicator_line(theme, dx, dy, threshold)).alignment(Alignment::Center),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            tx.merchant_label.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            tx.amount.to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[2],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("AI Guess: {}", tx.category_label()),
            Style::default().fg(theme.accent),
        ))
        .alignment(Alignment::Center),
        rows[3],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "← edit   ↑ rule   → approve",
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        rows[5],
    );
}

fn indicator_line(theme: &Theme, dx: f32, dy: f32, threshold: f32) -> Line<'static> {
    let mut spans = Vec::new();
    if dx < -threshold {
        spans.push(Span::styled("✎ edit", Style::default().fg(theme.error)));
    }
    if dy < -threshold && dx.abs() <= threshold {
        spans.push(Span::styled("⚡ rule", Style::default().fg(theme.warn)));
    }
    if dx > threshold {
        spans.push(Span::styled("✓ approve", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}
