use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::{dataset::Dataset, report::AnalysisMode, Dashboard, Overview};

use super::screens;

pub struct DashboardUI {
    pub dashboard: Dashboard,
    pub path_input: String,
    pub dataset: Option<Dataset>,
    pub mode: AnalysisMode,
    pub overview: Option<Overview>,
    pub current_focus: FocusedWidget,
    pub current_tab: DashboardTab,
    pub selected_town: usize,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedWidget {
    PathInput,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Products,
    Shops,
    Distribution,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Products,
        DashboardTab::Shops,
        DashboardTab::Distribution,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Products => "Analyse par Produit",
            DashboardTab::Shops => "Analyse par Magasin",
            DashboardTab::Distribution => "Répartition par Taille",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DashboardTab::Products => 0,
            DashboardTab::Shops => 1,
            DashboardTab::Distribution => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Success(String),
    Error(String),
}

impl DashboardUI {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            path_input: String::new(),
            dataset: None,
            mode: AnalysisMode::default(),
            overview: None,
            current_focus: FocusedWidget::PathInput,
            current_tab: DashboardTab::Products,
            selected_town: 0,
            status: None,
            should_quit: false,
        }
    }

    pub async fn run_ui(&mut self) -> Result<(), io::Error> {
        let _guard = TerminalGuard;
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let mut result = self.start(&mut terminal).await;
        if result.is_ok() {
            result = self.ui_loop(&mut terminal).await;
        }

        terminal.show_cursor()?;

        result
    }

    /// Shows the loading screen, then fetches the first overview.
    pub async fn start<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|f| screens::draw(f, self))?;
        self.refresh().await;
        Ok(())
    }

    async fn ui_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        loop {
            terminal.draw(|f| screens::draw(f, self))?;

            if self.should_quit {
                return Ok(());
            }

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code).await;
                }
            }
        }
    }
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}
