use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use gapfill::{
    cloze::GapResult,
    quiz::{Quiz, StatusKind},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const HELP: [&str; 2] = [
    "enter check/next · tab next gap · ^n/^p sentence · ^r new gaps · esc quit",
    "^d difficulty · ^l level · ^t topic · ^s listen",
];

pub fn draw(quiz: &Quiz, f: &mut Frame) {
    f.render_widget(QuizView(quiz), f.area());
}

/// Renders one sentence view: progress, prompt card, gaps and feedback
pub struct QuizView<'a>(pub &'a Quiz);

/// The sentence with gaps shown as numbered slots holding what was typed so far
fn sentence_spans(quiz: &Quiz) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let gap_style = Style::default().patch(bold_style).fg(Color::Blue);
    let focused_style = Style::default()
        .patch(gap_style)
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED);

    let session = &quiz.session;
    let mask = session.mask();
    let focused = if quiz.is_checked() {
        None
    } else {
        quiz.focused_gap()
    };

    let mut spans = Vec::new();
    for (i, word) in session.words().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if mask.is_some_and(|m| m.contains(i)) {
            let typed = session.answer(i);
            let is_focused = focused == Some(i);
            let label = match (typed.is_empty(), is_focused) {
                (true, false) => format!("[{}]", i + 1),
                (true, true) => format!("[{}: _]", i + 1),
                (false, false) => format!("[{}: {}]", i + 1, typed),
                (false, true) => format!("[{}: {}_]", i + 1, typed),
            };
            let style = if is_focused { focused_style } else { gap_style };
            spans.push(Span::styled(label, style));
        } else {
            spans.push(Span::raw(word.to_string()));
        }
    }
    spans
}

fn result_line(result: &GapResult) -> Line<'static> {
    let green_bold_style = Style::default().add_modifier(Modifier::BOLD).fg(Color::Green);
    let red_bold_style = Style::default().add_modifier(Modifier::BOLD).fg(Color::Red);

    let gap = format!("Gap {}: ", result.position + 1);
    if result.correct {
        Line::from(vec![
            Span::styled("✓ ", green_bold_style),
            Span::raw(gap),
            Span::styled(result.expected.clone(), green_bold_style),
        ])
    } else {
        let given = if result.given.trim().is_empty() {
            "(blank)".to_string()
        } else {
            result.given.trim().to_string()
        };
        Line::from(vec![
            Span::styled("✗ ", red_bold_style),
            Span::raw(gap),
            Span::styled(given, red_bold_style.add_modifier(Modifier::CROSSED_OUT)),
            Span::raw(" → "),
            Span::styled(result.expected.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ])
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let quiz = self.0;
        let session = &quiz.session;
        let sentence = session.current();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_italic_style = Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let text_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let masked_width: usize = sentence_spans(quiz).iter().map(|s| s.content.width()).sum();
        let sentence_lines = ((masked_width as f64 / text_width as f64).ceil() as u16).max(1);
        let translation_lines =
            ((sentence.translation.width() as f64 / text_width.saturating_sub(2).max(1) as f64).ceil() as u16)
                .max(1);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(translation_lines + 3),
                    Constraint::Length(1),
                    Constraint::Length(sentence_lines),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(2),
                ]
                .as_ref(),
            )
            .split(area);

        let (position, total) = session.progress();
        let mut label = format!(
            "Sentence {position} / {total} · {} difficulty",
            session.difficulty()
        );
        if session.rounds_completed() > 0 {
            label.push_str(&format!(" · round {}", session.rounds_completed() + 1));
        }
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(position as f64 / total as f64)
            .label(label)
            .render(chunks[0], buf);

        let badge = match (&sentence.level, &sentence.focus) {
            (Some(level), Some(focus)) => format!("{level} | {focus}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => String::new(),
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(badge, magenta_style.add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(sentence.translation.clone(), bold_style)),
        ])
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        card.render(chunks[2], buf);

        Paragraph::new(Line::from(sentence_spans(quiz)))
            .wrap(Wrap { trim: false })
            .render(chunks[4], buf);

        if let Some(attempt) = quiz.attempt() {
            let mut lines = vec![Line::from(Span::styled("Result Analysis", bold_style)), Line::default()];
            lines.extend(attempt.results.iter().map(result_line));
            lines.push(Line::default());
            let summary = if attempt.all_correct {
                Span::styled(
                    "Perfect! Excellent listening skills.",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(
                    format!(
                        "Keep going! {} of {} gaps correct ({}%). Review the mistakes above.",
                        attempt.correct_count(),
                        attempt.results.len(),
                        attempt.accuracy()
                    ),
                    Style::default().fg(Color::Yellow),
                )
            };
            lines.push(Line::from(summary));
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(chunks[6], buf);
        }

        if let Some(status) = quiz.status() {
            let style = match status.kind {
                StatusKind::Info => Style::default().fg(Color::Green),
                StatusKind::Warning => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            };
            Paragraph::new(Span::styled(status.text.clone(), style))
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }

        let help: Vec<Line> = HELP
            .iter()
            .map(|l| Line::from(Span::styled(*l, dim_italic_style)))
            .collect();
        Paragraph::new(help)
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
    }
}
