//! Main TUI application state and logic

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::{mpsc, watch};

use crate::controller::{BrowserController, BrowserState, SessionState};
use crate::core::context::AppContext;
use crate::core::model::{BranchSummary, RepositorySummary};
use crate::core::outcome::Outcome;
use crate::error::{GhviewError, Result};
use crate::tui::event::{is_quit_key, is_reload_key, typed_char, AppEvent, EventHandler};
use crate::tui::ui;

/// Message type for async operation results
#[derive(Debug)]
pub enum AsyncMessage {
    /// Branch page finished loading for `repo`
    BranchesLoaded {
        repo: String,
        outcome: Outcome<Vec<BranchSummary>>,
    },
}

/// Available screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Searchable repository list
    Repositories,
    /// Branches of the repository opened from the list
    Branches,
}

/// List selection state
#[derive(Debug, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Total items in the list
    pub total: usize,
}

impl ListState {
    pub fn new(total: usize) -> Self {
        Self { selected: 0, total }
    }

    /// Update the item count, keeping the selection in range
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.selected = self.selected.min(total.saturating_sub(1));
    }

    pub fn next(&mut self) {
        if self.total > 0 {
            self.selected = (self.selected + 1).min(self.total - 1);
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn is_last(&self) -> bool {
        self.total > 0 && self.selected + 1 == self.total
    }
}

/// Main application state
pub struct App {
    /// Whether the app is running
    pub running: bool,
    /// Current screen
    pub screen: Screen,
    /// Session state at startup
    pub session: SessionState,
    /// Latest browser snapshot
    pub browser_state: BrowserState,
    /// Search box contents
    pub search_input: String,
    /// Repository list selection
    pub selection: ListState,
    /// Repository whose branches are shown
    pub branch_repo: Option<String>,
    /// Branch pane contents; `Pending` while a request is in flight
    pub branches: Outcome<Vec<BranchSummary>>,
    /// Branch list selection
    pub branch_selection: ListState,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Spinner animation frame
    pub tick_counter: u64,

    context: AppContext,
    browser: Option<BrowserController>,
    browser_rx: Option<watch::Receiver<BrowserState>>,
    async_tx: mpsc::UnboundedSender<AsyncMessage>,
    async_rx: mpsc::UnboundedReceiver<AsyncMessage>,
}

impl App {
    /// Create the app; starts the browser when a session is stored
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(context: AppContext) -> Self {
        let session = context.session().state();
        let browser = session.is_authenticated().then(|| context.browser());
        let browser_rx = browser.as_ref().map(BrowserController::subscribe);
        let (async_tx, async_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            screen: Screen::Repositories,
            session,
            browser_state: BrowserState::default(),
            search_input: String::new(),
            selection: ListState::default(),
            branch_repo: None,
            branches: Outcome::Ok(Vec::new()),
            branch_selection: ListState::default(),
            show_help: false,
            tick_counter: 0,
            context,
            browser,
            browser_rx,
            async_tx,
            async_rx,
        }
    }

    /// Setup terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| GhviewError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| GhviewError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| GhviewError::Terminal(e.to_string()))?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| GhviewError::Terminal(e.to_string()))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| GhviewError::Terminal(e.to_string()))?;
        terminal
            .show_cursor()
            .map_err(|e| GhviewError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let mut events = EventHandler::new(Duration::from_millis(100));

        let result = self.event_loop(&mut terminal, &mut events).await;

        Self::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        events: &mut EventHandler,
    ) -> Result<()> {
        while self.running {
            self.sync_browser();
            while let Ok(msg) = self.async_rx.try_recv() {
                self.handle_async_message(msg);
            }

            terminal
                .draw(|frame| ui::render(frame, self))
                .map_err(|e| GhviewError::Terminal(e.to_string()))?;

            match events.next().await {
                Some(AppEvent::Key(key)) => self.handle_key_event(key),
                Some(AppEvent::Tick) => self.tick_counter = self.tick_counter.wrapping_add(1),
                None => break,
            }
        }
        Ok(())
    }

    /// Pull the latest browser snapshot, if it changed
    pub fn sync_browser(&mut self) {
        let Some(rx) = self.browser_rx.as_mut() else {
            return;
        };

        if rx.has_changed().unwrap_or(false) {
            self.browser_state = rx.borrow_and_update().clone();
            self.selection.set_total(self.browser_state.items.len());
        }
    }

    /// Handle async message from background tasks
    fn handle_async_message(&mut self, msg: AsyncMessage) {
        match msg {
            AsyncMessage::BranchesLoaded { repo, outcome } => {
                // The user may have opened another repository meanwhile.
                if self.branch_repo.as_deref() != Some(repo.as_str()) {
                    return;
                }
                let total = outcome.value().map_or(0, Vec::len);
                self.branch_selection = ListState::new(total);
                self.branches = outcome;
            }
        }
    }

    /// Repository under the cursor
    pub fn selected_repository(&self) -> Option<&RepositorySummary> {
        self.browser_state.items.get(self.selection.selected)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if is_quit_key(&key) {
            self.running = false;
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        if key.code == KeyCode::F(1) {
            self.show_help = true;
            return;
        }

        match self.screen {
            Screen::Repositories => self.handle_repositories_key(key),
            Screen::Branches => self.handle_branches_key(key),
        }
    }

    fn handle_repositories_key(&mut self, key: KeyEvent) {
        let Some(browser) = self.browser.clone() else {
            if key.code == KeyCode::Esc {
                self.running = false;
            }
            return;
        };

        if is_reload_key(&key) {
            if self.browser_state.error().is_some() {
                browser.retry();
            } else {
                self.search_input.clear();
                browser.refresh();
            }
            return;
        }

        if let Some(c) = typed_char(&key) {
            self.search_input.push(c);
            browser.search(self.search_input.clone());
            return;
        }

        match key.code {
            KeyCode::Backspace => {
                if self.search_input.pop().is_some() {
                    browser.search(self.search_input.clone());
                }
            }
            KeyCode::Esc if !self.search_input.is_empty() => {
                self.search_input.clear();
                browser.search(String::new());
            }
            KeyCode::Esc => self.running = false,
            KeyCode::Up => self.selection.previous(),
            KeyCode::Down => {
                self.selection.next();
                if self.selection.is_last() && self.browser_state.has_more {
                    browser.load_more();
                }
            }
            KeyCode::Enter => self.open_branches(),
            _ => {}
        }
    }

    fn handle_branches_key(&mut self, key: KeyEvent) {
        if is_reload_key(&key) {
            self.load_branches();
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = Screen::Repositories;
            }
            KeyCode::Up => self.branch_selection.previous(),
            KeyCode::Down => self.branch_selection.next(),
            _ => {}
        }
    }

    fn open_branches(&mut self) {
        let Some(repo) = self.selected_repository() else {
            return;
        };
        self.branch_repo = Some(repo.full_name());
        self.screen = Screen::Branches;
        self.load_branches();
    }

    /// Fetch the first branch page of `branch_repo` in the background
    fn load_branches(&mut self) {
        let Some(repo) = self.branch_repo.clone() else {
            return;
        };
        let Some((owner, name)) = repo.split_once('/') else {
            return;
        };

        self.branches = Outcome::Pending;
        self.branch_selection = ListState::default();

        let list_branches = self.context.list_branches.clone();
        let (owner, name) = (owner.to_string(), name.to_string());
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            let outcome = list_branches.run(&owner, &name, 1).await;
            let _ = tx.send(AsyncMessage::BranchesLoaded { repo, outcome });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::controller::BrowserStatus;
    use crate::core::credentials::CredentialVault;
    use crate::core::keys::EphemeralKeyProvider;
    use crate::core::slot::MemorySlot;
    use crate::test_support::{repo_dtos, ScriptedGateway};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(gateway: Arc<ScriptedGateway>, signed_in: bool) -> App {
        let vault = CredentialVault::new(MemorySlot::new(), EphemeralKeyProvider::new());
        if signed_in {
            vault.save("tok-1").unwrap();
        }
        App::new(AppContext::with_gateway(
            gateway,
            vault,
            Duration::from_millis(300),
        ))
    }

    async fn settle(app: &mut App, done: impl Fn(&BrowserState) -> bool) {
        for _ in 0..100 {
            app.sync_browser();
            if done(&app.browser_state) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("browser never settled: {:?}", app.browser_state.status);
    }

    #[test]
    fn test_list_state_clamps() {
        let mut state = ListState::new(3);
        state.next();
        state.next();
        state.next();
        assert_eq!(state.selected, 2);
        assert!(state.is_last());

        state.set_total(1);
        assert_eq!(state.selected, 0);
        state.previous();
        assert_eq!(state.selected, 0);
    }

    #[tokio::test]
    async fn test_signed_out_app_has_no_browser() {
        let mut app = app(Arc::new(ScriptedGateway::new()), false);
        assert_eq!(app.session, SessionState::Unauthenticated);

        app.handle_key_event(press(KeyCode::Char('x')));
        assert!(app.search_input.is_empty());

        app.handle_key_event(press(KeyCode::Esc));
        assert!(!app.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_drives_search() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway
            .list(1, 0, repo_dtos("r", 2))
            .search("ab", 1, 0, repo_dtos("ab", 1));

        let mut app = app(gateway.clone(), true);
        settle(&mut app, |s| s.status == BrowserStatus::Loaded).await;
        assert_eq!(app.selection.total, 2);

        app.handle_key_event(press(KeyCode::Char('a')));
        app.handle_key_event(press(KeyCode::Char('b')));
        assert_eq!(app.search_input, "ab");

        settle(&mut app, |s| {
            s.active_query == crate::controller::QueryContext::Search("ab".into()) && !s.is_loading()
        })
        .await;
        assert_eq!(app.browser_state.items.len(), 1);
        assert_eq!(gateway.search_calls(), vec!["search:ab:1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_clears_search_and_lists_default() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway
            .list(1, 0, repo_dtos("r", 2))
            .search("ab", 1, 0, repo_dtos("ab", 1));

        let mut app = app(gateway.clone(), true);
        settle(&mut app, |s| s.status == BrowserStatus::Loaded).await;
        app.handle_key_event(press(KeyCode::Char('a')));
        app.handle_key_event(press(KeyCode::Char('b')));
        settle(&mut app, |s| {
            s.active_query == crate::controller::QueryContext::Search("ab".into()) && !s.is_loading()
        })
        .await;

        app.handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(app.search_input.is_empty());

        settle(&mut app, |s| {
            s.active_query == crate::controller::QueryContext::Default && !s.is_loading()
        })
        .await;
        assert_eq!(app.browser_state.items.len(), 2);
        assert_eq!(gateway.calls(), vec!["list:1", "search:ab:1", "list:1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_opens_branch_pane() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.list(1, 0, repo_dtos("r", 1));

        let mut app = app(gateway, true);
        settle(&mut app, |s| s.status == BrowserStatus::Loaded).await;

        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Branches);
        assert_eq!(app.branch_repo.as_deref(), Some("octo/r-0"));
        assert!(app.branches.is_pending());

        let msg = tokio::time::timeout(Duration::from_secs(5), app.async_rx.recv())
            .await
            .unwrap()
            .unwrap();
        app.handle_async_message(msg);
        assert!(app.branches.is_ok());

        app.handle_key_event(press(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Repositories);
    }
}
