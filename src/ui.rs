use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, LoadStatus, Mode};
use crate::session::SessionPhase;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const TILE_GAP: usize = 1;

const NO_WORDS_MESSAGE: &str = "No words can be formed from the provided characters.";

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// Lay the tiles out left to right, starting a new row when `max_width`
/// would be exceeded. Each tile is the glyph padded by one space per side.
pub fn tile_rows(tiles: &[char], max_width: usize) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = vec![];
    let mut row: Vec<usize> = vec![];
    let mut used = 0;

    for (idx, c) in tiles.iter().enumerate() {
        let width = c.width().unwrap_or(1) + 2;
        let needed = if row.is_empty() { width } else { width + TILE_GAP };
        if !row.is_empty() && used + needed > max_width {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        used += if row.is_empty() { width } else { width + TILE_GAP };
        row.push(idx);
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(3),
                    Constraint::Min(4),
                    Constraint::Length(1),
                ]
                .as_ref(),
            )
            .split(area);

        Paragraph::new(Span::styled("Hiragana Practice", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        // filter box
        let mut filter_lines = vec![];
        let cursor = if self.mode == Mode::EnteringFilter { "▏" } else { "" };
        filter_lines.push(Line::from(vec![
            Span::styled("Characters: ", dim_style),
            Span::styled(format!("{}{cursor}", self.filter_input), bold_style),
        ]));
        if let Some(ref notice) = self.notice {
            filter_lines.push(Line::from(Span::styled(notice.clone(), red_bold_style)));
        }
        Paragraph::new(filter_lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let mut body: Vec<Line> = vec![];
        match &self.load_status {
            LoadStatus::Loading { .. } => {
                body.push(Line::from(Span::styled("Loading words...", italic_style)));
            }
            LoadStatus::Failed(err) => {
                body.push(Line::from(Span::styled(
                    format!("Failed to fetch words: {err}"),
                    red_bold_style,
                )));
                body.push(Line::from(Span::styled("press r to retry", dim_style)));
            }
            LoadStatus::Idle => {}
        }

        if self.session.phase() == SessionPhase::Cleared {
            body.push(Line::from(Span::styled(NO_WORDS_MESSAGE, red_bold_style)));
        }

        if let Some(word) = self.session.current_word() {
            body.push(Line::from(vec![
                Span::raw("Type the hiragana for: "),
                Span::styled(word.romanized.clone(), bold_style),
            ]));
            body.push(Line::from(vec![
                Span::raw("Your input: "),
                Span::styled(self.session.typed_prefix().to_string(), green_bold_style),
            ]));
            if let Some(err) = self.session.last_error() {
                body.push(Line::from(Span::styled(err.to_string(), red_bold_style)));
            } else if self.is_celebrating() {
                body.push(Line::from(Span::styled("Correct!", green_bold_style)));
            } else {
                body.push(Line::from(""));
            }
            body.push(Line::from(""));

            let max_width = chunks[2].width as usize;
            for row in tile_rows(&self.tiles, max_width) {
                let mut spans = vec![];
                for (n, idx) in row.iter().enumerate() {
                    if n > 0 {
                        spans.push(Span::raw(" ".repeat(TILE_GAP)));
                    }
                    let style = if *idx == self.selected_tile {
                        Style::default().patch(bold_style).add_modifier(Modifier::REVERSED)
                    } else {
                        bold_style
                    };
                    spans.push(Span::styled(format!(" {} ", self.tiles[*idx]), style));
                }
                body.push(Line::from(spans));
            }
        }

        Paragraph::new(body)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let help = match self.mode {
            Mode::EnteringFilter => "(enter) start practice / (esc) quit",
            Mode::Practicing => {
                "(←/→) pick tile / (space) tap / (backspace) clear / (/) new characters / (esc) quit"
            }
        };
        Paragraph::new(Span::styled(help, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}
