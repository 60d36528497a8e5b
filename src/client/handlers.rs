use crossterm::event::KeyCode;

use super::{components::FocusedWidget, DashboardUI};

impl DashboardUI {
    pub async fn handle_key(&mut self, key: KeyCode) {
        match self.current_focus {
            FocusedWidget::PathInput => self.handle_path_input(key),
            FocusedWidget::Dashboard => self.handle_dashboard_input(key).await,
        }
    }

    fn handle_path_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => self.path_input.push(c),
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Enter => self.load_dataset(),
            KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => {
                self.current_focus = FocusedWidget::Dashboard;
            }
            _ => {}
        }
    }

    async fn handle_dashboard_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('i') => {
                self.current_focus = FocusedWidget::PathInput;
            }
            KeyCode::Char('m') => self.toggle_mode().await,
            KeyCode::Char('u') => self.upload_dataset().await,
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Right => self.current_tab = self.current_tab.next(),
            KeyCode::Left => self.current_tab = self.current_tab.previous(),
            KeyCode::Up => self.move_town_selection_up(),
            KeyCode::Down => self.move_town_selection_down(),
            _ => {}
        }
    }

    pub fn move_town_selection_up(&mut self) {
        if self.selected_town > 0 {
            self.selected_town -= 1;
        }
    }

    pub fn move_town_selection_down(&mut self) {
        let town_count = self
            .overview
            .as_ref()
            .and_then(|overview| overview.by_shop_by_product.as_ref().ok())
            .map(|report| report.towns().len())
            .unwrap_or(0);
        if self.selected_town + 1 < town_count {
            self.selected_town += 1;
        }
    }
}
