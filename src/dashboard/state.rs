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

use crate::dashboard::form::{FormError, FormField, TaskForm};
use crate::database::definitions::task::Task;
use crate::database::id::TaskId;
use std::cmp::Ordering;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Rows shown per table page.
pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }

    pub fn next(&self) -> Self {
        let filters = StatusFilter::iter().collect::<Vec<_>>();
        let position = filters.iter().position(|filter| filter == self).unwrap_or(0);

        filters[(position + 1) % filters.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SortColumn {
    Title,
    #[strum(serialize = "Due Date")]
    DueDate,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SortDirection {
    #[strum(serialize = "ascending")]
    Ascending,
    #[strum(serialize = "descending")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Sort {
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.column {
            SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortColumn::DueDate => a.due_date.cmp(&b.due_date),
            // the priority column is ordered by its label, not by its urgency
            SortColumn::Priority => a.priority.to_string().cmp(&b.priority.to_string()),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the cached tasks with a freshly listed set.
    Loaded(Vec<Task>),
    Created(Task),
    Updated(Task),
    Deleted(TaskId),
    SetFilter(StatusFilter),
    SetSearch(String),
    /// Sort by the column, cycling ascending, descending and unsorted when repeated.
    SortBy(SortColumn),
    SetPage(usize),
    OpenCreate,
    /// Open the form pre-filled with the cached task. Unknown ids are ignored.
    OpenEdit(TaskId),
    SetField(FormField, String),
    CyclePriority { forward: bool },
    FormRejected(Vec<FormError>),
    CloseForm,
    ToggleTheme,
}

/// The complete state of the dashboard. Every change goes through [`DashboardState::reduce`],
/// which consumes the state and returns its successor.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
#[get = "pub"]
pub struct DashboardState {
    tasks: Vec<Task>,
    filter: StatusFilter,
    search: String,
    sort: Option<Sort>,
    page: usize,
    form: Option<TaskForm>,
    theme: Theme,
}

/// A slice of the visible tasks as shown by the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a> {
    pub rows: Vec<&'a Task>,
    /// zero based index of the shown page
    pub page: usize,
    /// total count of pages, at least one
    pub pages: usize,
    /// count of tasks passing filter and search
    pub total: usize,
}

impl DashboardState {
    pub fn reduce(self, action: Action) -> Self {
        let mut state = self;

        match action {
            Action::Loaded(tasks) => state.tasks = tasks,
            Action::Created(task) => state.tasks.push(task),
            Action::Updated(task) => {
                if let Some(cached) = state.tasks.iter_mut().find(|cached| cached.id == task.id) {
                    *cached = task;
                }
            }
            Action::Deleted(id) => state.tasks.retain(|task| task.id != id),
            Action::SetFilter(filter) => {
                state.filter = filter;
                state.page = 0;
            }
            Action::SetSearch(search) => {
                state.search = search;
                state.page = 0;
            }
            Action::SortBy(column) => {
                state.sort = match state.sort {
                    Some(sort) if sort.column == column => match sort.direction {
                        SortDirection::Ascending => Some(Sort {
                            column,
                            direction: SortDirection::Descending,
                        }),
                        SortDirection::Descending => None,
                    },
                    _ => Some(Sort {
                        column,
                        direction: SortDirection::Ascending,
                    }),
                }
            }
            Action::SetPage(page) => state.page = page,
            Action::OpenCreate => state.form = Some(TaskForm::default()),
            Action::OpenEdit(id) => {
                if let Some(task) = state.tasks.iter().find(|task| task.id == id) {
                    state.form = Some(TaskForm::from(task));
                }
            }
            Action::SetField(field, value) => {
                if let Some(form) = state.form.as_mut() {
                    form.set(field, value);
                }
            }
            Action::CyclePriority { forward } => {
                if let Some(form) = state.form.as_mut() {
                    form.cycle_priority(forward);
                }
            }
            Action::FormRejected(errors) => {
                if let Some(form) = state.form.as_mut() {
                    form.errors = errors;
                }
            }
            Action::CloseForm => state.form = None,
            Action::ToggleTheme => {
                state.theme = match state.theme {
                    Theme::Light => Theme::Dark,
                    Theme::Dark => Theme::Light,
                }
            }
        }

        // keep the page in range after the visible set shrank
        let pages = state.pages();
        if state.page >= pages {
            state.page = pages - 1;
        }

        state
    }

    /// The tasks passing the status filter and the title search, in cache order refined by the
    /// active column sort.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let search = self.search.to_lowercase();
        let mut tasks = self
            .tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .filter(|task| task.title.to_lowercase().contains(search.as_str()))
            .collect::<Vec<_>>();

        if let Some(sort) = self.sort {
            // stable, equal rows keep their cache order
            tasks.sort_by(|a, b| sort.compare(a, b));
        }

        tasks
    }

    pub fn table_page(&self) -> TablePage<'_> {
        let visible = self.visible_tasks();
        let total = visible.len();
        let pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = self.page.min(pages - 1);

        TablePage {
            rows: visible
                .into_iter()
                .skip(page * PAGE_SIZE)
                .take(PAGE_SIZE)
                .collect(),
            page,
            pages,
            total,
        }
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    fn pages(&self) -> usize {
        self.visible_tasks().len().div_ceil(PAGE_SIZE).max(1)
    }
}
