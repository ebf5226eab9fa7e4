/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::dashboard::form::FormField;
use crate::dashboard::state::{Action, SortColumn};
use crate::dashboard::{ui, Dashboard};
use crate::database::id::TaskId;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::widgets::TableState;
use ratatui::Terminal;
use std::io;

/// Work which needs the task store and therefore leaves the synchronous key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reload,
    Submit,
    Delete(TaskId),
    ToggleCompletion(TaskId),
}

/// The dashboard together with the purely visual state of the terminal ui.
pub struct App {
    pub dashboard: Dashboard,
    pub table: TableState,
    /// the search input while it is being typed
    pub searching: Option<String>,
    pub focus: FormField,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let mut app = Self {
            dashboard,
            table: TableState::default(),
            searching: None,
            focus: FormField::Title,
        };
        app.clamp_selection();

        app
    }

    /// The task under the cursor on the current page.
    pub fn selected(&self) -> Option<TaskId> {
        let page = self.dashboard.state().table_page();

        self.table
            .selected()
            .and_then(|index| page.rows.get(index))
            .map(|task| task.id().clone())
    }

    /// Keeps the cursor on a row of the current page.
    pub fn clamp_selection(&mut self) {
        let rows = self.dashboard.state().table_page().rows.len();

        match rows {
            0 => self.table.select(None),
            rows => {
                let index = self.table.selected().unwrap_or(0).min(rows - 1);
                self.table.select(Some(index));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let command = if self.dashboard.state().form().is_some() {
            self.handle_form_key(key)
        } else if self.searching.is_some() {
            self.handle_search_key(key);
            None
        } else {
            self.handle_table_key(key)
        };
        self.clamp_selection();

        command
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => self.dashboard.dispatch(Action::CloseForm),
            KeyCode::Enter => return Some(Command::Submit),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Left if self.focus == FormField::Priority => self
                .dashboard
                .dispatch(Action::CyclePriority { forward: false }),
            KeyCode::Right if self.focus == FormField::Priority => self
                .dashboard
                .dispatch(Action::CyclePriority { forward: true }),
            KeyCode::Char(character) if self.focus != FormField::Priority => {
                let mut value = self.form_value();
                value.push(character);
                self.dashboard.dispatch(Action::SetField(self.focus, value));
            }
            KeyCode::Backspace if self.focus != FormField::Priority => {
                let mut value = self.form_value();
                value.pop();
                self.dashboard.dispatch(Action::SetField(self.focus, value));
            }
            _ => {}
        }

        None
    }

    fn form_value(&self) -> String {
        self.dashboard
            .state()
            .form()
            .as_ref()
            .map(|form| form.value(self.focus))
            .unwrap_or_default()
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(input) = self.searching.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Enter => {
                let search = std::mem::take(input);
                self.searching = None;
                self.dashboard.dispatch(Action::SetSearch(search));
            }
            KeyCode::Esc => self.searching = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(character) => input.push(character),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Command> {
        let state = self.dashboard.state();
        let page = *state.page();

        match key.code {
            KeyCode::Char('q') => return Some(Command::Quit),
            KeyCode::Char('r') => return Some(Command::Reload),
            KeyCode::Char('d') => return self.selected().map(Command::Delete),
            KeyCode::Char('c') => return self.selected().map(Command::ToggleCompletion),
            KeyCode::Char('a') => {
                self.focus = FormField::Title;
                self.dashboard.dispatch(Action::OpenCreate);
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected() {
                    self.focus = FormField::Title;
                    self.dashboard.dispatch(Action::OpenEdit(id));
                }
            }
            KeyCode::Char('f') => {
                let filter = state.filter().next();
                self.dashboard.dispatch(Action::SetFilter(filter));
            }
            KeyCode::Char('/') => self.searching = Some(state.search().clone()),
            KeyCode::Char('1') => self.dashboard.dispatch(Action::SortBy(SortColumn::Title)),
            KeyCode::Char('2') => self.dashboard.dispatch(Action::SortBy(SortColumn::DueDate)),
            KeyCode::Char('3') => self.dashboard.dispatch(Action::SortBy(SortColumn::Priority)),
            KeyCode::Char('n') | KeyCode::PageDown => {
                self.dashboard.dispatch(Action::SetPage(page + 1))
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                self.dashboard.dispatch(Action::SetPage(page.saturating_sub(1)))
            }
            KeyCode::Char('t') => self.dashboard.dispatch(Action::ToggleTheme),
            KeyCode::Down => self.table.select_next(),
            KeyCode::Up => self.table.select_previous(),
            _ => {}
        }

        None
    }

    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::Quit => {}
            Command::Reload => self.dashboard.load().await,
            Command::Submit => self.dashboard.submit().await,
            Command::Delete(id) => self.dashboard.delete(&id).await,
            Command::ToggleCompletion(id) => self.dashboard.toggle_completion(&id).await,
        }
        self.clamp_selection();
    }
}

/// Draws the dashboard and reacts to key presses until the user quits.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    app.dashboard.load().await;
    app.clamp_selection();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Event::Key(key) = next_event(event::read).await? {
            match app.handle_key(key) {
                Some(Command::Quit) => return Ok(()),
                Some(command) => app.execute(command).await,
                None => {}
            }
        }
    }
}

/// Runs a blocking event read off the async workers.
async fn next_event<F>(read: F) -> io::Result<Event>
where
    F: FnOnce() -> io::Result<Event> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(io::Error::other)?
}
