//! Screen rendering.
//!
//! `Snapshot::collect` gathers everything a frame needs up front so the
//! draw closure stays synchronous; `render` dispatches on the view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use heartline_app::{AppController, Toast};
use heartline_core::agent::AgentState;
use heartline_core::suggestion::{FlowStep, MAX_SUGGESTION_CHARS};
use heartline_core::trial::{TrialPhase, TrialState};
use heartline_core::view::View;

use crate::app::InputState;

/// Everything a single frame reads, captured in one pass.
pub struct Snapshot {
    pub view: View,
    pub company_name: String,
    pub tagline: String,
    pub start_prompt: String,
    pub email: Option<String>,
    pub trial: Option<TrialState>,
    pub agent: AgentState,
    pub flow_step: FlowStep,
    pub toasts: Vec<Toast>,
}

impl Snapshot {
    pub async fn collect(controller: &AppController, view: View) -> Self {
        let config = controller.config();
        let identity = controller.identity().await;
        Self {
            view,
            company_name: config.company_name.clone(),
            tagline: config.tagline.clone(),
            start_prompt: config.start_prompt.clone(),
            email: identity.email,
            trial: controller.trial_state().await,
            agent: controller.agent_state(),
            flow_step: controller.flow_step().await,
            toasts: controller.active_toasts().await,
        }
    }
}

#[derive(Clone, Copy)]
struct HeartTheme {
    border: Color,
    title: Color,
    text: Color,
    muted: Color,
    accent: Color,
    warn: Color,
    error: Color,
}

fn heart_theme() -> HeartTheme {
    HeartTheme {
        border: Color::Rgb(82, 82, 91),
        title: Color::Rgb(253, 164, 175),
        text: Color::Rgb(228, 228, 231),
        muted: Color::Rgb(161, 161, 170),
        accent: Color::Rgb(244, 63, 94),
        warn: Color::Rgb(245, 158, 11),
        error: Color::Rgb(239, 68, 68),
    }
}

pub fn render(frame: &mut Frame, snapshot: &Snapshot, input: &InputState) {
    let theme = heart_theme();
    let area = frame.area();

    let (main, toast_area) = if snapshot.toasts.is_empty() {
        (area, None)
    } else {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(toast_height(&snapshot.toasts)),
            ])
            .split(area);
        (rows[0], Some(rows[1]))
    };

    match snapshot.view {
        View::Auth => render_auth(frame, snapshot, input, theme, main),
        View::Welcome => render_welcome(frame, snapshot, input, theme, main),
        View::Session => render_session(frame, snapshot, theme, main),
        View::TrialEnded => match snapshot.flow_step {
            FlowStep::Offer => render_offer(frame, snapshot, theme, main),
            FlowStep::Suggest => render_suggest(frame, snapshot, input, theme, main),
            FlowStep::Thanks => render_thanks(frame, snapshot, theme, main),
        },
    }

    if let Some(toast_area) = toast_area {
        render_toasts(frame, theme, &snapshot.toasts, toast_area);
    }
}

fn render_auth(
    frame: &mut Frame,
    snapshot: &Snapshot,
    input: &InputState,
    theme: HeartTheme,
    area: Rect,
) {
    let inner = render_card(frame, &snapshot.company_name, theme, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Please enter your email",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        input_line(theme, &input.email, "name@company.com"),
    ];
    push_error(&mut lines, theme, input);
    lines.push(Line::from(""));
    lines.push(hint(theme, "Press Enter to continue, Esc to quit."));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_welcome(
    frame: &mut Frame,
    snapshot: &Snapshot,
    input: &InputState,
    theme: HeartTheme,
    area: Rect,
) {
    let inner = render_card(frame, &snapshot.company_name, theme, area);

    let signed_in = match &snapshot.email {
        Some(email) => format!("Signed in as {}", email),
        None => "Signed in".to_string(),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Ready to talk",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            snapshot.tagline.clone(),
            Style::default().fg(theme.text),
        )),
        Line::from(Span::styled(
            "Urdu & Hindi · 1-min free trial",
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("▶ {}", snapshot.start_prompt),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(signed_in, Style::default().fg(theme.muted))),
    ];
    push_error(&mut lines, theme, input);
    lines.push(Line::from(""));
    lines.push(hint(theme, "Press Enter to start, q to quit."));

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_session(frame: &mut Frame, snapshot: &Snapshot, theme: HeartTheme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    // Countdown banner; the trial clock publishes on its own cadence, so
    // before the first tick there is nothing to show yet.
    let banner = snapshot
        .trial
        .map(|trial| trial.banner())
        .unwrap_or_else(|| "Connecting...".to_string());
    let banner_style = match snapshot.trial.map(|trial| trial.phase) {
        Some(TrialPhase::Trial) => Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(theme.muted),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(banner, banner_style)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border)),
            ),
        rows[0],
    );

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("agent: {}", snapshot.agent),
            Style::default().fg(theme.muted),
        )),
    ];
    if snapshot.agent == AgentState::Connected {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Agent is listening, ask it a question",
            Style::default().fg(theme.text),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        rows[1],
    );

    frame.render_widget(
        Paragraph::new(hint(theme, "Press Esc to leave, q to quit."))
            .alignment(Alignment::Center),
        rows[2],
    );
}

fn render_offer(frame: &mut Frame, snapshot: &Snapshot, theme: HeartTheme, area: Rect) {
    let inner = render_card(frame, &snapshot.company_name, theme, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Your free minute is up",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Want more free minutes?",
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        hint(theme, "Press y for yes, n for no thanks."),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_suggest(
    frame: &mut Frame,
    snapshot: &Snapshot,
    input: &InputState,
    theme: HeartTheme,
    area: Rect,
) {
    let inner = render_card(frame, &snapshot.company_name, theme, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Suggest one feature",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "What would you like to see? We'll use your idea to improve.",
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
        input_line(
            theme,
            &input.suggestion,
            "e.g. More languages, different voice...",
        ),
        Line::from(Span::styled(
            format!(
                "{}/{}",
                input.suggestion.chars().count(),
                MAX_SUGGESTION_CHARS
            ),
            Style::default().fg(theme.muted),
        )),
    ];
    push_error(&mut lines, theme, input);
    lines.push(Line::from(""));
    lines.push(hint(theme, "Press Enter to submit, Esc to go back."));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_thanks(frame: &mut Frame, snapshot: &Snapshot, theme: HeartTheme, area: Rect) {
    let inner = render_card(frame, &snapshot.company_name, theme, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Thanks for your idea",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "We'll get back to you in 60 min. More free minutes will be given to you.",
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        hint(theme, "Press Enter to continue."),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_toasts(frame: &mut Frame, theme: HeartTheme, toasts: &[Toast], area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for (index, toast) in toasts.iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            toast.title.clone(),
            Style::default().fg(theme.warn).add_modifier(Modifier::BOLD),
        )));
        for body_line in &toast.body {
            lines.push(Line::from(Span::styled(
                body_line.clone(),
                Style::default().fg(theme.text),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.warn)),
        ),
        area,
    );
}

/// Renders the bordered card every non-session view sits in and returns
/// its inner area.
fn render_card(frame: &mut Frame, title: &str, theme: HeartTheme, area: Rect) -> Rect {
    let card = centered_rect(62, 60, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card);
    frame.render_widget(block, card);
    inner
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}

fn input_line(theme: HeartTheme, value: &str, placeholder: &str) -> Line<'static> {
    let mut spans = vec![
        Span::styled("> ".to_string(), Style::default().fg(theme.accent)),
        Span::styled(value.to_string(), Style::default().fg(theme.text)),
        Span::styled("█".to_string(), Style::default().fg(theme.accent)),
    ];
    if value.is_empty() {
        spans.push(Span::styled(
            format!(" {}", placeholder),
            Style::default().fg(theme.muted),
        ));
    }
    Line::from(spans)
}

fn push_error(lines: &mut Vec<Line<'static>>, theme: HeartTheme, input: &InputState) {
    if let Some(error) = &input.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }
}

fn hint(theme: HeartTheme, text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme.muted),
    ))
}

/// Rows the toast block needs: one title line per toast plus its body,
/// a separator between toasts, and the border.
fn toast_height(toasts: &[Toast]) -> u16 {
    let content = toasts
        .iter()
        .map(|toast| 1 + toast.body.len())
        .sum::<usize>()
        + toasts.len().saturating_sub(1);
    (content as u16).saturating_add(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn toast(body_lines: usize) -> Toast {
        Toast {
            title: "Session ended".to_string(),
            body: (0..body_lines).map(|i| format!("line {}", i)).collect(),
            raised_at: Utc::now(),
        }
    }

    #[test]
    fn test_centered_rect_splits_by_percentage() {
        let area = Rect::new(0, 0, 100, 40);
        let card = centered_rect(60, 50, area);
        assert_eq!(card, Rect::new(20, 10, 60, 20));
    }

    #[test]
    fn test_toast_height_counts_titles_bodies_and_borders() {
        // 1 title + 2 body, separator, 1 title + 1 body, 2 border rows
        let toasts = vec![toast(2), toast(1)];
        assert_eq!(toast_height(&toasts), 8);

        let single = vec![toast(0)];
        assert_eq!(toast_height(&single), 3);
    }

    #[test]
    fn test_input_line_shows_placeholder_only_when_empty() {
        let theme = heart_theme();

        let empty = input_line(theme, "", "name@company.com");
        assert!(
            empty
                .spans
                .iter()
                .any(|span| span.content.contains("name@company.com"))
        );

        let typed = input_line(theme, "a@b.co", "name@company.com");
        assert!(
            !typed
                .spans
                .iter()
                .any(|span| span.content.contains("name@company.com"))
        );
        assert!(typed.spans.iter().any(|span| span.content == "a@b.co"));
    }
}
