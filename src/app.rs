use crate::bank::{Difficulty, QuestionBank};
use crate::config::{Config, ConfigStore};
use crate::input::AnswerDraft;
use crate::presentation::PresentedQuestion;
use crate::result::{ResultStore, ResultSummary};
use crate::session::{QuizSession, SessionState, User};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Quiz,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Group,
    Difficulty,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::Name => LoginField::Group,
            LoginField::Group => LoginField::Difficulty,
            LoginField::Difficulty => LoginField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            LoginField::Name => LoginField::Difficulty,
            LoginField::Group => LoginField::Name,
            LoginField::Difficulty => LoginField::Group,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub name: String,
    pub group: String,
    pub difficulty: Difficulty,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            name: cfg.name.clone(),
            group: cfg.group.clone(),
            difficulty: cfg.difficulty,
            focus: LoginField::Name,
            error: None,
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            LoginField::Name => Some(&mut self.name),
            LoginField::Group => Some(&mut self.group),
            LoginField::Difficulty => None,
        }
    }

    fn user(&self) -> Result<User, String> {
        let name = self.name.trim();
        let group = self.group.trim();
        if name.is_empty() || group.is_empty() {
            return Err("Please fill in both name and group".to_string());
        }
        Ok(User::new(name, group))
    }
}

/// Drives one quiz session at a time from key events: login, questions, results.
pub struct App {
    pub screen: Screen,
    pub login: LoginForm,
    pub should_quit: bool,
    bank: QuestionBank,
    session: QuizSession,
    current: Option<(PresentedQuestion, AnswerDraft)>,
    previous: Option<ResultSummary>,
    config: Config,
    config_store: Box<dyn ConfigStore>,
    store: Box<dyn ResultStore>,
    rng: StdRng,
}

impl App {
    pub fn new(
        bank: QuestionBank,
        config: Config,
        config_store: Box<dyn ConfigStore>,
        store: Box<dyn ResultStore>,
        rng: StdRng,
    ) -> Self {
        let previous = store.load();
        Self {
            screen: Screen::Login,
            login: LoginForm::from_config(&config),
            should_quit: false,
            bank,
            session: QuizSession::new(),
            current: None,
            previous,
            config,
            config_store,
            store,
            rng,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn presented(&self) -> Option<&PresentedQuestion> {
        self.current.as_ref().map(|(p, _)| p)
    }

    pub fn draft(&self) -> Option<&AnswerDraft> {
        self.current.as_ref().map(|(_, d)| d)
    }

    /// Result stored before the current one was saved.
    pub fn previous_result(&self) -> Option<&ResultSummary> {
        self.previous.as_ref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Quiz => self.on_quiz_key(key),
            Screen::Results => self.on_results_key(key),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        let form = &mut self.login;
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Left if form.focus == LoginField::Difficulty => {
                form.difficulty = form.difficulty.prev()
            }
            KeyCode::Right if form.focus == LoginField::Difficulty => {
                form.difficulty = form.difficulty.next()
            }
            KeyCode::Backspace => {
                if let Some(field) = form.field_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = form.field_mut() {
                    field.push(c);
                }
            }
            KeyCode::Enter => self.start_quiz(),
            _ => {}
        }
    }

    fn on_quiz_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Tab) {
            self.submit();
            return;
        }
        let Some((_, draft)) = self.current.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Up => draft.up(),
            KeyCode::Down => draft.down(),
            KeyCode::Left => draft.cycle(false),
            KeyCode::Right => draft.cycle(true),
            KeyCode::Char(' ') => draft.select(),
            KeyCode::Char(c) => draft.push(c),
            KeyCode::Backspace => draft.backspace(),
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('n') => {
                self.session = QuizSession::new();
                self.current = None;
                self.login.error = None;
                self.screen = Screen::Login;
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    pub fn start_quiz(&mut self) {
        let user = match self.login.user() {
            Ok(user) => user,
            Err(msg) => {
                self.login.error = Some(msg);
                return;
            }
        };
        let difficulty = self.login.difficulty;

        if let Err(e) = self.session.start(
            &self.bank,
            user.clone(),
            &difficulty.to_string(),
            &mut self.rng,
        ) {
            error!(error = %e, "could not start quiz");
            self.login.error = Some(e.to_string());
            return;
        }
        self.login.error = None;

        self.config.name = user.name;
        self.config.group = user.group;
        self.config.difficulty = difficulty;
        if let Err(e) = self.config_store.save(&self.config) {
            warn!(error = %e, "could not save config");
        }

        self.after_progress();
    }

    fn submit(&mut self) {
        let Some((presented, draft)) = self.current.as_ref() else {
            return;
        };
        let answer = draft.to_answer(presented);
        if let Err(e) = self.session.submit_answer(&answer) {
            error!(error = %e, "answer rejected");
            return;
        }
        self.after_progress();
    }

    /// Presents the next question, or stores the result once the session is over.
    fn after_progress(&mut self) {
        match self.session.state() {
            SessionState::InProgress => {
                if let Ok(question) = self.session.current_question() {
                    let presented = PresentedQuestion::new(question.clone(), &mut self.rng);
                    let draft = AnswerDraft::new(&presented);
                    self.current = Some((presented, draft));
                }
                self.screen = Screen::Quiz;
            }
            SessionState::Finished => {
                self.current = None;
                self.previous = self.store.load();
                if let Ok(summary) = self.session.result() {
                    if let Err(e) = self.store.save(summary) {
                        warn!(error = %e, "could not save result");
                    }
                }
                self.screen = Screen::Results;
            }
            SessionState::NotStarted => self.screen = Screen::Login,
        }
    }
}
