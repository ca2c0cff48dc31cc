use chrono::{DateTime, Local};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, LoginField, Screen},
    bank::Difficulty,
    input::AnswerDraft,
    presentation::PresentedQuestion,
    question::QuestionKind,
    result::ResultSummary,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Login => render_login(self, area, buf),
            Screen::Quiz => render_quiz(self, area, buf),
            Screen::Results => render_results(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

fn frame(area: Rect, body_height: u16) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(body_height),
            Constraint::Length(1),
        ])
        .split(area)
}

fn render_login(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.login;
    let chunks = frame(area, 6);

    Paragraph::new(Span::styled("kviz", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let field = |label: &str, value: String, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let value_style = if focused {
            bold().add_modifier(Modifier::UNDERLINED)
        } else {
            bold()
        };
        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{label:<11}"), dim()),
            Span::styled(value, value_style),
        ])
    };

    let levels = Difficulty::ALL
        .iter()
        .map(|d| {
            if *d == form.difficulty {
                format!("[{d}]")
            } else {
                d.to_string()
            }
        })
        .join("  ");

    let mut lines = vec![
        field("name", form.name.clone(), form.focus == LoginField::Name),
        field("group", form.group.clone(), form.focus == LoginField::Group),
        field("difficulty", levels, form.focus == LoginField::Difficulty),
        Line::default(),
    ];
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            bold().fg(Color::Red),
        )));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Sign in"))
        .render(chunks[2], buf);

    legend("(tab) next field / (←→) difficulty / (enter) start / (esc)ape")
        .render(chunks[3], buf);
}

fn render_quiz(app: &App, area: Rect, buf: &mut Buffer) {
    let (Some(presented), Some(draft)) = (app.presented(), app.draft()) else {
        return;
    };
    let question = presented.question();
    let (position, total) = app.session().progress();
    let chunks = frame(area, 4);

    let header = format!(
        "Question {position} / {total}   {}   {} pt{}",
        question.kind(),
        question.points(),
        if question.points() == 1 { "" } else { "s" }
    );
    Paragraph::new(Span::styled(header, dim()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mut lines = vec![
        Line::from(Span::styled(question.prompt().to_string(), bold())),
        Line::default(),
    ];
    lines.extend(answer_lines(presented, draft));

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    let hint = match question.kind() {
        QuestionKind::SingleChoice => {
            "(↑↓) move / (space) choose / (enter|tab) next / (esc)ape"
        }
        QuestionKind::MultipleChoice => {
            "(↑↓) move / (space) toggle / (enter|tab) next / (esc)ape"
        }
        QuestionKind::FreeText => "type your answer / (enter|tab) next / (esc)ape",
        QuestionKind::Matching => {
            "(↑↓) row / (←→) place label / (backspace) clear / (enter|tab) next"
        }
    };
    legend(hint).render(chunks[3], buf);
}

fn answer_lines<'a>(presented: &'a PresentedQuestion, draft: &AnswerDraft) -> Vec<Line<'a>> {
    let cursor_style = |row: usize| {
        if row == draft.cursor() {
            bold().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    match presented.question().kind() {
        QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {
            let single = presented.question().kind() == QuestionKind::SingleChoice;
            presented
                .displayed_options()
                .enumerate()
                .map(|(slot, (_, text))| {
                    let mark = match (single, draft.is_chosen(slot)) {
                        (true, true) => "(•)",
                        (true, false) => "( )",
                        (false, true) => "[x]",
                        (false, false) => "[ ]",
                    };
                    Line::from(Span::styled(format!("{mark} {text}"), cursor_style(slot)))
                })
                .collect()
        }
        QuestionKind::FreeText => vec![Line::from(vec![
            Span::styled("> ", dim()),
            Span::styled(draft.text().to_string(), bold().fg(Color::Green)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])],
        QuestionKind::Matching => {
            let lefts = presented.left_labels();
            let width = lefts.iter().map(|l| l.width()).max().unwrap_or(0);
            let mut lines: Vec<Line> = lefts
                .iter()
                .enumerate()
                .map(|(row, left)| {
                    let placed = draft
                        .placement(row)
                        .map(|slot| presented.right_labels()[slot].clone())
                        .unwrap_or_else(|| "___".to_string());
                    let pad = " ".repeat(width - left.width());
                    Line::from(Span::styled(
                        format!("{left}{pad}  →  {placed}"),
                        cursor_style(row),
                    ))
                })
                .collect();
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("labels: {}", presented.right_labels().iter().join(" · ")),
                dim(),
            )));
            lines
        }
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = frame(area, 6);

    Paragraph::new(Span::styled("Results", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mut lines = Vec::new();
    if let Ok(result) = app.session().result() {
        lines.push(Line::from(format!("{} ({})", result.name, result.group)));
        lines.push(Line::from(format!("level: {}", result.difficulty)));
        lines.push(Line::from(Span::styled(
            format!(
                "{} / {} points   {}%",
                result.score,
                result.max_score,
                result.percent()
            ),
            bold().fg(Color::Green),
        )));
    }
    if let Some(previous) = app.previous_result() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            previous_line(previous, Local::now()),
            dim(),
        )));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    legend("(r)estart / (q)uit").render(chunks[3], buf);
}

fn previous_line(previous: &ResultSummary, now: DateTime<Local>) -> String {
    format!(
        "previous: {} / {} on {} by {}, {}",
        previous.score,
        previous.max_score,
        previous.difficulty,
        previous.name,
        humanize_age(previous.timestamp, now)
    )
}

pub fn humanize_age(then: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = (now - then).to_std().unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::config::{Config, FileConfigStore};
    use crate::question::{MatchPair, Question};
    use crate::result::MemoryResultStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use tempfile::{tempdir, TempDir};

    fn render(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn app_with(question: Question) -> (TempDir, App) {
        let dir = tempdir().unwrap();
        let bank =
            QuestionBank::from_pools(HashMap::from([(Difficulty::Easy, vec![question])])).unwrap();
        let config = Config {
            name: "Ada".into(),
            group: "KN-21".into(),
            ..Config::default()
        };
        let app = App::new(
            bank,
            config,
            Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
            Box::new(MemoryResultStore::default()),
            StdRng::seed_from_u64(3),
        );
        (dir, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn login_screen_shows_prefilled_fields() {
        let (_dir, app) = app_with(Question::free_text("t", "p", 1, ["x"]).unwrap());
        let rendered = render(&app);
        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("KN-21"));
        assert!(rendered.contains("[easy]"));
    }

    #[test]
    fn choice_question_lists_every_option() {
        let options = vec!["createElement".to_string(), "makeNode".to_string()];
        let question = Question::single_choice("s", "Which one?", 1, options, 0).unwrap();
        let (_dir, mut app) = app_with(question);
        press(&mut app, KeyCode::Enter);

        let rendered = render(&app);
        assert!(rendered.contains("Which one?"));
        assert!(rendered.contains("createElement"));
        assert!(rendered.contains("makeNode"));
        assert!(rendered.contains("Question 1 / 1"));
    }

    #[test]
    fn every_question_hint_mentions_tab() {
        let options = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let questions = [
            Question::single_choice("s", "p", 1, options.clone(), 0).unwrap(),
            Question::multiple_choice("m", "p", 1, options, [0, 2]).unwrap(),
            Question::free_text("t", "p", 1, ["x"]).unwrap(),
            Question::matching(
                "d",
                "p",
                1,
                vec![MatchPair::new("a", "1"), MatchPair::new("b", "2")],
            )
            .unwrap(),
        ];
        for question in questions {
            let (_dir, mut app) = app_with(question);
            press(&mut app, KeyCode::Enter);
            assert!(render(&app).contains("(enter|tab) next"));
        }
    }

    #[test]
    fn matching_question_shows_rows_and_labels() {
        let q = Question::matching(
            "m",
            "Match them",
            2,
            vec![MatchPair::new("href", "anchor"), MatchPair::new("src", "image")],
        )
        .unwrap();
        let (_dir, mut app) = app_with(q);
        press(&mut app, KeyCode::Enter);

        let rendered = render(&app);
        assert!(rendered.contains("href"));
        assert!(rendered.contains("___"));
        assert!(rendered.contains("anchor"));
        assert!(rendered.contains("image"));
    }

    #[test]
    fn results_screen_shows_score() {
        let (_dir, mut app) = app_with(Question::free_text("t", "Say x", 3, ["x"]).unwrap());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Results);
        let rendered = render(&app);
        assert!(rendered.contains("3 / 3 points"));
        assert!(rendered.contains("100%"));
    }

    #[test]
    fn small_area_does_not_panic() {
        let (_dir, app) = app_with(Question::free_text("t", "p", 1, ["x"]).unwrap());
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }

    #[test]
    fn age_is_in_the_past() {
        let now = Local::now();
        let text = humanize_age(now - chrono::Duration::hours(3), now);
        assert!(text.contains("ago"), "{text}");
    }
}
