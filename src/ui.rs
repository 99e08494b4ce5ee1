use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use lacuna::{
    masking::MatchResult,
    trainer::{LineInput, Tone},
};

use crate::{App, LoadPrompt, PromptField};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const PROMPT_WIDTH: u16 = 70;
const PROMPT_HEIGHT: u16 = 8;

const HELP: &str =
    "Enter check/next · Alt+←/→ back/next · Alt+↑/↓ hide more/less · Ctrl+T translate · Ctrl+O open file · Esc quit";

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Neutral => Style::default(),
        Tone::Muted => Style::default().fg(Color::Gray),
        Tone::Good => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Tone::Bad => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Spans for an editable line, with the cursor cell reversed
fn input_line(input: &LineInput, focused: bool) -> Line<'static> {
    let text: Vec<char> = input.text().chars().collect();
    let cursor = input.cursor();

    let before: String = text[..cursor].iter().collect();
    let at = text.get(cursor).map_or(' ', |&c| c).to_string();
    let after: String = text
        .get(cursor + 1..)
        .map_or_else(String::new, |rest| rest.iter().collect());

    let cursor_style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(before),
        Span::styled(at, cursor_style),
        Span::raw(after),
    ])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let trainer = &self.trainer;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // settings bar
                Constraint::Length(1),
                Constraint::Length(2), // annotation / translation
                Constraint::Length(3), // masked phrase
                Constraint::Length(1), // slider label
                Constraint::Length(1), // slider
                Constraint::Length(1),
                Constraint::Length(1), // answer label
                Constraint::Length(3), // answer
                Constraint::Length(1), // buttons
                Constraint::Length(2), // status
                Constraint::Min(0),
                Constraint::Length(1), // help
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled(format!("Min. repeats: {}", self.config.min_repeats), bold_style),
            Span::raw("   "),
            Span::styled(trainer.source().label(), dim_style),
        ]))
        .render(chunks[0], buf);

        let showing_annotation = trainer
            .current_phrase()
            .is_some_and(|p| p.annotation().to_string() == trainer.info());
        let info_style = if trainer.is_translating() {
            italic_style.fg(Color::Gray)
        } else if showing_annotation {
            italic_style.fg(Color::DarkGray)
        } else {
            bold_style
        };
        Paragraph::new(Span::styled(trainer.info().to_string(), info_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let masked = &trainer.mask().display;
        let fits = masked.width() <= chunks[3].width as usize;
        Paragraph::new(Span::styled(masked.clone(), bold_style.fg(Color::Blue)))
            .alignment(if fits {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        let max_hide = trainer.max_hide();
        Paragraph::new(format!(
            "Hidden characters: {} / {}",
            trainer.hide_count(),
            max_hide
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let ratio = if max_hide == 0 {
            0.0
        } else {
            trainer.hide_count() as f64 / max_hide as f64
        };
        LineGauge::default()
            .filled_style(Style::default().fg(Color::Cyan))
            .unfilled_style(dim_style)
            .ratio(ratio)
            .label("")
            .render(chunks[5], buf);

        Paragraph::new(Span::styled("Fix the gaps here:", bold_style)).render(chunks[7], buf);

        let border_style = match trainer.last_result() {
            Some(MatchResult::NoMatch) => Style::default().fg(Color::Red),
            Some(_) => Style::default().fg(Color::Green),
            None => dim_style,
        };
        Paragraph::new(input_line(trainer.answer(), self.state == crate::AppState::Practice))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .render(chunks[8], buf);

        let back_style = if trainer.can_go_back() {
            Style::default().fg(Color::LightRed)
        } else {
            dim_style
        };
        Paragraph::new(Line::from(vec![
            Span::styled("← Back (Alt+←)", back_style),
            Span::raw("    "),
            Span::styled("Check (Enter)", bold_style),
            Span::raw("    "),
            Span::styled("Next (Alt+→)", Style::default().fg(Color::LightGreen)),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[9], buf);

        let status = trainer.status();
        Paragraph::new(Span::styled(status.text.clone(), tone_style(status.tone)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[10], buf);

        Paragraph::new(Span::styled(HELP, italic_style.fg(Color::Gray)))
            .alignment(Alignment::Center)
            .render(chunks[12], buf);
    }
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// The "open file" dialog, drawn over the practice screen
pub fn render_load_prompt(prompt: &LoadPrompt, f: &mut Frame) {
    let area = centered(PROMPT_WIDTH, PROMPT_HEIGHT, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Open a text file ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let label_style = |field: PromptField| {
        if prompt.focus == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    };

    let mut path_line = input_line(&prompt.path, prompt.focus == PromptField::Path);
    path_line.spans.insert(
        0,
        Span::styled(
            format!("{}: ", PromptField::Path),
            label_style(PromptField::Path),
        ),
    );
    f.render_widget(Paragraph::new(path_line), rows[0]);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", PromptField::MinRepeats),
                label_style(PromptField::MinRepeats),
            ),
            Span::raw(format!("< {} >", prompt.min_repeats)),
        ])),
        rows[2],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            "Enter load · Tab switch field · +/- repeats · Esc cancel",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        rows[3],
    );
}
