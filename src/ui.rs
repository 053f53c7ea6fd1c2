use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use wpm::session::{CharState, Status};
use wpm::stats::Stats;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.game.snapshot();

        match self.game.results() {
            Some(results) => render_results(&results, view.mistake_count, area, buf),
            None => render_typing(self, area, buf),
        }

        match view.status {
            Status::Paused => render_overlay("Game Paused", area, buf),
            Status::ResumeCountdown(n) => render_overlay(&format!("Resuming in {n}"), area, buf),
            _ => {}
        }

        if self.confirming_reset {
            render_overlay(
                "Reset the game? Your current progress will be lost. (y/n)",
                area,
                buf,
            );
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(3),    // typing box
            Constraint::Length(3), // stats panel
            Constraint::Length(2), // controls hints
        ])
        .split(area);

    let session = app.game.session();
    let typing_box = if session.is_loaded() {
        Paragraph::new(Line::from(prompt_spans(
            &session.target_text(),
            &app.game.char_states(),
        )))
        .wrap(Wrap { trim: false })
    } else {
        Paragraph::new(Span::styled("Loading words...", italic_style))
            .alignment(Alignment::Center)
    };
    typing_box.render(chunks[0], buf);

    let view = app.game.snapshot();
    let stats = Paragraph::new(vec![
        Line::from(Span::styled(format!("WPM: {}", view.live_wpm), bold_style)),
        Line::from(Span::styled(
            format!("Accuracy: {}%", view.live_accuracy),
            bold_style,
        )),
        Line::from(Span::styled(
            format!("Total Time: {:.2}s", view.elapsed_time),
            bold_style,
        )),
    ]);
    stats.render(chunks[1], buf);

    let hints = Paragraph::new(vec![
        Line::from(Span::styled("Press Escape to Pause,", dim_style)),
        Line::from(Span::styled("Ctrl + Enter to Restart", dim_style)),
    ]);
    hints.render(chunks[2], buf);
}

/// One styled span per target character
fn prompt_spans(target: &str, states: &[CharState]) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let cursor_style = bold_style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
    let pending_style = bold_style.add_modifier(Modifier::DIM);

    target
        .chars()
        .zip(states)
        .map(|(c, state)| {
            let style = match state {
                CharState::Correct => green_bold_style,
                CharState::Incorrect => red_bold_style,
                CharState::Cursor => cursor_style,
                CharState::Pending => pending_style,
            };
            let symbol = match (state, c) {
                (CharState::Incorrect, ' ') => "·".to_owned(),
                _ => c.to_string(),
            };
            Span::styled(symbol, style)
        })
        .collect()
}

fn render_results(results: &Stats, mistakes: usize, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let lines = vec![
        Line::from(format!("Words Per Minute: {}", results.wpm)),
        Line::from(format!("Accuracy: {}%", results.accuracy)),
        Line::from(format!("Adjusted WPM: {}", results.adjusted_wpm())),
        Line::from(format!("Total Time: {:.2}s", results.time)),
        Line::from(format!("Total Mistakes: {mistakes}")),
        Line::from(""),
        Line::from(Span::styled("(n)ew game / (q)uit", italic_style)),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Results", bold_style)),
    );
    card.render(centered_rect(44, 9, area), buf);
}

fn render_overlay(text: &str, area: Rect, buf: &mut Buffer) {
    let width = (text.chars().count() as u16 + 4).min(area.width);
    let rect = centered_rect(width, 3, area);

    Clear.render(rect, buf);
    Paragraph::new(Span::styled(
        text.to_owned(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(rect, buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use wpm::clock::SystemClock;
    use wpm::game::Game;
    use wpm::runtime::ThreadedFetcher;
    use wpm::session::Session;
    use wpm::word_source::StaticWordProvider;

    fn create_test_app(prompt: &str) -> App {
        let (tx, _rx) = mpsc::channel();
        let fetcher = ThreadedFetcher::new(Arc::new(StaticWordProvider::from_prompt(prompt)), tx);
        let mut game = Game::new(Session::new(SystemClock::new()), fetcher, 5);
        game.on_words_loaded(0, prompt.split(' ').map(String::from).collect());
        App::new(game)
    }

    fn render(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_typing_screen_shows_prompt_and_stats() {
        let app = create_test_app("hello world");
        let rendered = render(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("WPM: 0"));
        assert!(rendered.contains("Accuracy: 100%"));
        assert!(rendered.contains("Total Time: 0.00s"));
        assert!(rendered.contains("Press Escape to Pause,"));
    }

    #[test]
    fn test_loading_placeholder_before_words() {
        let (tx, _rx) = mpsc::channel();
        let fetcher = ThreadedFetcher::new(Arc::new(StaticWordProvider::new(vec![])), tx);
        let app = App::new(Game::new(Session::new(SystemClock::new()), fetcher, 5));

        assert!(render(&app, Rect::new(0, 0, 80, 24)).contains("Loading words..."));
    }

    #[test]
    fn test_pause_overlay() {
        let mut app = create_test_app("hello world");
        app.game.type_char('h');
        app.game.toggle_pause();
        assert!(render(&app, Rect::new(0, 0, 80, 24)).contains("Game Paused"));

        app.game.toggle_pause();
        assert!(render(&app, Rect::new(0, 0, 80, 24)).contains("Resuming in 3"));
    }

    #[test]
    fn test_confirm_overlay() {
        let mut app = create_test_app("hello world");
        app.confirming_reset = true;
        assert!(render(&app, Rect::new(0, 0, 80, 24)).contains("Reset the game?"));
    }

    #[test]
    fn test_results_card() {
        let mut app = create_test_app("hi");
        app.game.type_char('h');
        app.game.type_char('x');

        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("Results"));
        assert!(rendered.contains("Accuracy: 50%"));
        assert!(rendered.contains("Total Mistakes: 1"));
        assert!(rendered.contains("Adjusted WPM:"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = create_test_app("a rather long prompt that has to wrap around");
        let area = Rect::new(0, 0, 12, 4);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }

    #[test]
    fn test_incorrect_space_is_visible() {
        let spans = prompt_spans(
            "a b",
            &[CharState::Correct, CharState::Incorrect, CharState::Cursor],
        );

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "·");
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert_eq!(spans[2].style.fg, Some(Color::Blue));
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 10, 4);
        let rect = centered_rect(40, 9, area);
        assert_eq!(rect, area);
    }
}
