use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use engine::{
    BalanceSnapshot, BalanceSource, CategoryOption, Dispatcher, GestureState, Outcome,
    Resolution, Rule, RuleDraft, SWIPE_THRESHOLD_RATIO, SwipeDecision, TransactionSource,
    first_match,
};

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    export, ui,
    ui::keymap::{AppAction, map_key},
};

/// Terminal cells are roughly twice as tall as they are wide; row
/// displacement is scaled by this factor before classification so vertical
/// swipes feel the same as horizontal ones.
pub const CELL_ASPECT: f32 = 2.0;

const TOAST_TTL: Duration = Duration::from_millis(2_500);

/// Shown in the picker and rule builder when the backend has no categories.
const FALLBACK_CATEGORIES: [(&str, &str); 6] = [
    ("housing", "Housing"),
    ("transport", "Transport"),
    ("food-drink", "Food & Drink"),
    ("shopping", "Shopping"),
    ("entertainment", "Entertainment"),
    ("other", "Other"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Pattern,
    Category,
}

#[derive(Debug)]
pub struct RuleBuilderState {
    pub pattern: String,
    pub options: Vec<CategoryOption>,
    pub selected: usize,
    pub focus: RuleField,
}

#[derive(Debug)]
pub enum Overlay {
    None,
    CategoryPicker {
        options: Vec<CategoryOption>,
        selected: usize,
    },
    RuleBuilder(RuleBuilderState),
    Split {
        friends: usize,
    },
}

#[derive(Debug)]
pub struct ReviewState {
    pub gesture: GestureState,
    pub overlay: Overlay,
    /// Merchant label of the card the open picker is scoped to.
    pub picking_for: Option<String>,
    pub categories: Vec<CategoryOption>,
    /// Rules saved this session, applied to pre-fill suggestions on refresh.
    pub rules: Vec<Rule>,
    pub balances: Option<BalanceSnapshot>,
    pub toast: Option<ToastState>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            gesture: GestureState::new(),
            overlay: Overlay::None,
            picking_for: None,
            categories: Vec::new(),
            rules: Vec::new(),
            balances: None,
            toast: None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub review: ReviewState,
}

pub struct App {
    config: AppConfig,
    client: Option<Arc<Client>>,
    dispatcher: Option<Dispatcher<Client, Client>>,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = AppState {
            screen: Screen::Login,
            login: LoginState {
                username: config.username.clone(),
                password: String::new(),
                focus: LoginField::Username,
                message: None,
            },
            review: ReviewState::default(),
        };

        Ok(Self {
            config,
            client: None,
            dispatcher: None,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;

        // Fire-and-forget writes are never cancelled by the UI; flush them
        // before the process exits.
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.settle().await;
        }
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            if let Some(toast) = &self.state.review.toast
                && toast.expires_at <= Instant::now()
            {
                self.state.review.toast = None;
            }

            terminal
                .draw(|frame| {
                    ui::render(
                        frame,
                        &self.state,
                        self.dispatcher.as_ref().map(|d| d.queue()),
                    );
                })
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state.screen {
            Screen::Login => self.handle_login_key(key).await,
            Screen::Review => self.handle_review_key(key).await,
        }
    }

    async fn handle_login_key(&mut self, key: KeyEvent) -> Result<()> {
        match map_key(key) {
            AppAction::Quit | AppAction::Cancel => {
                self.should_quit = true;
            }
            AppAction::NextField => {
                self.advance_focus();
            }
            AppAction::Submit => {
                self.attempt_login().await?;
            }
            AppAction::Backspace => {
                self.active_field_mut().pop();
            }
            AppAction::Input(ch) => {
                self.active_field_mut().push(ch);
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_review_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state.review.overlay {
            Overlay::None => self.handle_stack_key(key).await,
            Overlay::CategoryPicker { .. } => {
                self.handle_picker_key(key);
                Ok(())
            }
            Overlay::RuleBuilder(_) => {
                self.handle_rule_key(key);
                Ok(())
            }
            Overlay::Split { .. } => {
                self.handle_split_key(key);
                Ok(())
            }
        }
    }

    async fn handle_stack_key(&mut self, key: KeyEvent) -> Result<()> {
        match map_key(key) {
            AppAction::Quit | AppAction::Input('q') => {
                self.should_quit = true;
            }
            AppAction::Right => self.decide(SwipeDecision::Approve),
            AppAction::Left => self.decide(SwipeDecision::Edit),
            AppAction::Up => self.decide(SwipeDecision::CreateRule),
            AppAction::Input('r' | 'R') => self.refresh().await?,
            AppAction::Input('e' | 'E') => self.export_queue(),
            AppAction::Input('s' | 'S') => self.open_split(),
            _ => {}
        }
        Ok(())
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        let mut submit: Option<Option<String>> = None;

        if let Overlay::CategoryPicker { options, selected } = &mut self.state.review.overlay {
            match action {
                AppAction::Up => *selected = selected.saturating_sub(1),
                AppAction::Down => {
                    if *selected + 1 < options.len() {
                        *selected += 1;
                    }
                }
                AppAction::Submit => {
                    submit = Some(options.get(*selected).map(|option| option.name.clone()));
                }
                AppAction::Cancel => submit = Some(None),
                _ => {}
            }
        }

        if let Some(choice) = submit {
            self.state.review.overlay = Overlay::None;
            self.state.review.picking_for = None;
            if let Some(dispatcher) = self.dispatcher.as_mut() {
                let outcome = dispatcher.submit_category(choice);
                self.apply_outcome(outcome);
            }
        }
    }

    fn handle_rule_key(&mut self, key: KeyEvent) {
        let action = map_key(key);

        enum Command {
            None,
            Save { draft: RuleDraft, category: String },
            Skip,
        }
        let mut command = Command::None;

        if let Overlay::RuleBuilder(builder) = &mut self.state.review.overlay {
            match action {
                AppAction::NextField => {
                    builder.focus = match builder.focus {
                        RuleField::Pattern => RuleField::Category,
                        RuleField::Category => RuleField::Pattern,
                    };
                }
                AppAction::Backspace if builder.focus == RuleField::Pattern => {
                    builder.pattern.pop();
                }
                AppAction::Input(ch) if builder.focus == RuleField::Pattern => {
                    builder.pattern.push(ch);
                }
                AppAction::Up if builder.focus == RuleField::Category => {
                    builder.selected = builder.selected.saturating_sub(1);
                }
                AppAction::Down if builder.focus == RuleField::Category => {
                    if builder.selected + 1 < builder.options.len() {
                        builder.selected += 1;
                    }
                }
                AppAction::Submit => {
                    // Both a pattern and a category are required to save.
                    let pattern = builder.pattern.trim().to_string();
                    if let Some(option) = builder.options.get(builder.selected)
                        && !pattern.is_empty()
                    {
                        command = Command::Save {
                            draft: RuleDraft::new(pattern, option.id.clone()),
                            category: option.name.clone(),
                        };
                    }
                }
                AppAction::Cancel => command = Command::Skip,
                _ => {}
            }
        }

        match command {
            Command::None => {}
            Command::Save { draft, category } => {
                let pattern = draft.pattern.clone();
                self.state.review.overlay = Overlay::None;
                if let Some(dispatcher) = self.dispatcher.as_mut() {
                    let outcome = dispatcher.submit_rule(Some(draft));
                    if matches!(outcome, Outcome::Resolved(_, Resolution::RuleSaved)) {
                        self.state.review.rules.push(Rule::new(pattern, category));
                    }
                    self.apply_outcome(outcome);
                }
            }
            Command::Skip => {
                self.state.review.overlay = Overlay::None;
                if let Some(dispatcher) = self.dispatcher.as_mut() {
                    let outcome = dispatcher.submit_rule(None);
                    self.apply_outcome(outcome);
                }
            }
        }
    }

    fn handle_split_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        let mut close = false;
        if let Overlay::Split { friends } = &mut self.state.review.overlay {
            match action {
                AppAction::Up => *friends = (*friends + 1).min(8),
                AppAction::Down => *friends = friends.saturating_sub(1).max(1),
                AppAction::Cancel | AppAction::Submit => close = true,
                _ => {}
            }
        }
        if close {
            self.state.review.overlay = Overlay::None;
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.state.screen != Screen::Review
            || !matches!(self.state.review.overlay, Overlay::None)
        {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.state
                    .review
                    .gesture
                    .begin(mouse.column as f32, mouse.row as f32);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.state
                    .review
                    .gesture
                    .update(mouse.column as f32, mouse.row as f32);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((dx, dy)) = self.state.review.gesture.release() {
                    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
                    let threshold = width as f32 * SWIPE_THRESHOLD_RATIO;
                    if let Some(dispatcher) = self.dispatcher.as_mut() {
                        let outcome = dispatcher.release(dx, dy * CELL_ASPECT, threshold);
                        self.apply_outcome(outcome);
                    }
                }
            }
            _ => {}
        }
    }

    fn decide(&mut self, decision: SwipeDecision) {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            let outcome = dispatcher.decide(decision);
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Resolved(card, resolution) => {
                self.state.review.gesture.reset();
                let (message, level) = match resolution {
                    Resolution::Approved => {
                        (format!("Approved {}", card.merchant_label), ToastLevel::Success)
                    }
                    Resolution::Categorized(category) => (
                        format!("{} → {category}", card.merchant_label),
                        ToastLevel::Success,
                    ),
                    Resolution::RuleSaved => (
                        format!("Rule saved for {}", card.merchant_label),
                        ToastLevel::Success,
                    ),
                    Resolution::Skipped => {
                        (format!("Skipped {}", card.merchant_label), ToastLevel::Info)
                    }
                };
                self.toast(message, level);
            }
            Outcome::CategoryPicker(card) => {
                self.state.review.gesture.reset();
                self.state.review.picking_for = Some(card.merchant_label);
                self.state.review.overlay = Overlay::CategoryPicker {
                    options: self.picker_options(),
                    selected: 0,
                };
            }
            Outcome::RuleBuilder(card) => {
                self.state.review.gesture.reset();
                self.state.review.overlay = Overlay::RuleBuilder(RuleBuilderState {
                    pattern: card.merchant_label,
                    options: self.picker_options(),
                    selected: 0,
                    focus: RuleField::Pattern,
                });
            }
            Outcome::Cancelled => self.state.review.gesture.reset(),
            Outcome::Ignored => {}
        }
    }

    fn picker_options(&self) -> Vec<CategoryOption> {
        if self.state.review.categories.is_empty() {
            FALLBACK_CATEGORIES
                .iter()
                .map(|(id, name)| CategoryOption::new(*id, *name))
                .collect()
        } else {
            self.state.review.categories.clone()
        }
    }

    fn open_split(&mut self) {
        let has_head = self
            .dispatcher
            .as_ref()
            .is_some_and(|dispatcher| !dispatcher.queue().is_empty());
        if has_head {
            self.state.review.overlay = Overlay::Split { friends: 2 };
        }
    }

    fn export_queue(&mut self) {
        let path = PathBuf::from(&self.config.export_path);
        let result = match self.dispatcher.as_ref() {
            Some(dispatcher) => export::write_queue_csv(&path, dispatcher.queue().iter()),
            None => return,
        };
        match result {
            Ok(rows) => self.toast(
                format!("Exported {rows} rows to {}", path.display()),
                ToastLevel::Success,
            ),
            Err(err) => self.toast(format!("Export failed: {err}"), ToastLevel::Error),
        }
    }

    fn toast(&mut self, message: String, level: ToastLevel) {
        self.state.review.toast = Some(ToastState {
            message,
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn advance_focus(&mut self) {
        self.state.login.focus = match self.state.login.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.state.login.focus {
            LoginField::Username => &mut self.state.login.username,
            LoginField::Password => &mut self.state.login.password,
        }
    }

    async fn attempt_login(&mut self) -> Result<()> {
        let username = self.state.login.username.trim().to_string();
        let password = self.state.login.password.trim().to_string();

        if username.is_empty() || password.is_empty() {
            self.state.login.message = Some("Fill in both fields.".to_string());
            return Ok(());
        }

        let client = Arc::new(Client::new(
            &self.config.base_url,
            &username,
            &password,
            self.config.demo_fallback,
        )?);

        match client.categories().await {
            Ok(categories) => self.state.review.categories = categories,
            Err(ClientError::Unauthorized | ClientError::Forbidden) => {
                self.state.login.message = Some("Invalid credentials.".to_string());
                return Ok(());
            }
            Err(err) => {
                // The picker falls back to the built-in list.
                tracing::warn!("failed to load categories: {err}");
                self.state.review.categories = Vec::new();
            }
        }

        self.dispatcher = Some(Dispatcher::new(Arc::clone(&client), Arc::clone(&client)));
        self.client = Some(client);
        self.state.screen = Screen::Review;
        self.state.login.message = None;
        self.refresh().await?;
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let Some(client) = self.client.clone() else {
            return Ok(());
        };

        match client.fetch_unverified().await {
            Ok(mut items) => {
                for tx in &mut items {
                    if tx.suggested_category.is_none()
                        && let Some(rule) =
                            first_match(&self.state.review.rules, &tx.merchant_label)
                    {
                        tx.suggested_category = Some(rule.category.clone());
                    }
                }
                if let Some(dispatcher) = self.dispatcher.as_mut() {
                    dispatcher.load(items);
                }
                self.state.review.gesture.reset();
                self.state.review.overlay = Overlay::None;
                self.state.review.picking_for = None;
            }
            Err(err) => {
                tracing::warn!("refresh failed: {err}");
                self.toast(format!("Refresh failed: {err}"), ToastLevel::Error);
            }
        }

        match client.fetch_balances().await {
            Ok(snapshot) => self.state.review.balances = Some(snapshot),
            Err(err) => tracing::debug!("failed to fetch balances: {err}"),
        }

        Ok(())
    }
}
