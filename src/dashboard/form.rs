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

use crate::database::definitions::task::{EditTask, Priority, Task, WriteTaskRequest};
use crate::database::id::TaskId;
use chrono::NaiveDate;
use strum::{Display, EnumIter, IntoEnumIterator};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FormField {
    Title,
    Description,
    #[strum(serialize = "Due Date")]
    DueDate,
    Priority,
}

impl FormField {
    pub fn next(&self) -> Self {
        self.step(1)
    }

    pub fn previous(&self) -> Self {
        self.step(FormField::iter().count() - 1)
    }

    fn step(&self, offset: usize) -> Self {
        let fields = FormField::iter().collect::<Vec<_>>();
        let position = fields.iter().position(|field| field == self).unwrap_or(0);

        fields[(position + offset) % fields.len()]
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Description is required")]
    MissingDescription,
    #[error("Due date is required")]
    MissingDueDate,
    #[error("Due date must be a date in YYYY-MM-DD form")]
    InvalidDueDate,
    #[error("Priority is required")]
    MissingPriority,
}

impl FormError {
    pub fn field(&self) -> FormField {
        match self {
            FormError::MissingTitle => FormField::Title,
            FormError::MissingDescription => FormField::Description,
            FormError::MissingDueDate | FormError::InvalidDueDate => FormField::DueDate,
            FormError::MissingPriority => FormField::Priority,
        }
    }
}

/// The values of the create/edit form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    /// the task being edited, `None` when creating
    pub editing: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Option<Priority>,
    pub errors: Vec<FormError>,
}

/// A form which passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            editing: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
            priority: Some(task.priority),
            errors: Vec::new(),
        }
    }
}

impl TaskForm {
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Description => self.description.clone(),
            FormField::DueDate => self.due_date.clone(),
            FormField::Priority => self
                .priority
                .map(|priority| priority.to_string())
                .unwrap_or_default(),
        }
    }

    /// Sets a text field. The priority is only chosen through [`TaskForm::cycle_priority`].
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Title => self.title = value,
            FormField::Description => self.description = value,
            FormField::DueDate => self.due_date = value,
            FormField::Priority => {}
        }
        self.errors.retain(|error| error.field() != field);
    }

    pub fn cycle_priority(&mut self, forward: bool) {
        let priorities = Priority::iter().collect::<Vec<_>>();
        let next = match self.priority {
            None if forward => 0,
            None => priorities.len() - 1,
            Some(priority) => {
                let position = priorities
                    .iter()
                    .position(|candidate| *candidate == priority)
                    .unwrap_or(0);
                if forward {
                    (position + 1) % priorities.len()
                } else {
                    (position + priorities.len() - 1) % priorities.len()
                }
            }
        };

        self.priority = Some(priorities[next]);
        self.errors.retain(|error| error.field() != FormField::Priority);
    }

    /// Checks the required fields and parses the due date. Title and description are kept as
    /// typed.
    pub fn validate(&self) -> Result<TaskDraft, Vec<FormError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FormError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            errors.push(FormError::MissingDescription);
        }
        let due_date = match self.due_date.trim() {
            "" => {
                errors.push(FormError::MissingDueDate);
                None
            }
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FormError::InvalidDueDate);
                    None
                }
            },
        };
        if self.priority.is_none() {
            errors.push(FormError::MissingPriority);
        }

        match (due_date, self.priority) {
            (Some(due_date), Some(priority)) if errors.is_empty() => Ok(TaskDraft {
                title: self.title.clone(),
                description: self.description.clone(),
                due_date,
                priority,
            }),
            _ => Err(errors),
        }
    }
}

impl TaskDraft {
    pub fn into_request(self) -> WriteTaskRequest {
        WriteTaskRequest {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            completed: Some(false),
        }
    }

    /// Builds the update keeping the current completion state of the edited task.
    pub fn into_edit(self, completed: bool) -> EditTask {
        EditTask {
            title: Some(self.title),
            description: Some(self.description),
            due_date: Some(self.due_date),
            priority: Some(self.priority),
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TaskForm {
        TaskForm {
            title: "  Quarterly report ".to_owned(),
            description: "numbers".to_owned(),
            due_date: "2024-09-30".to_owned(),
            priority: Some(Priority::Medium),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate() {
        let draft = filled().validate().unwrap();

        assert_eq!("  Quarterly report ", draft.title);
        assert_eq!("numbers", draft.description);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(), draft.due_date);
        assert_eq!(Priority::Medium, draft.priority);
    }

    #[test]
    fn test_missing_fields() {
        let errors = TaskForm::default().validate().unwrap_err();

        assert_eq!(
            vec![
                FormError::MissingTitle,
                FormError::MissingDescription,
                FormError::MissingDueDate,
                FormError::MissingPriority,
            ],
            errors
        );
        assert_eq!("Title is required", errors[0].to_string());
    }

    #[test]
    fn test_invalid_due_date() {
        for raw in ["30.09.2024", "2024-02-30", "tomorrow"] {
            let form = TaskForm {
                due_date: raw.to_owned(),
                ..filled()
            };

            assert_eq!(Err(vec![FormError::InvalidDueDate]), form.validate(), "{raw}");
        }
    }

    #[test]
    fn test_edit_round_trip() {
        let task = Task {
            id: TaskId::new("abc"),
            title: "title".to_owned(),
            description: "description".to_owned(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            priority: Priority::High,
            completed: true,
        };

        let form = TaskForm::from(&task);
        assert_eq!("2024-01-02", form.due_date);

        let edit = form.validate().unwrap().into_edit(*task.completed());
        assert_eq!(EditTask::from(&task), edit);
    }

    #[test]
    fn test_setting_a_field_clears_its_error() {
        let mut form = TaskForm::default();
        form.errors = form.validate().unwrap_err();

        form.set(FormField::Title, "title".to_owned());
        assert!(!form.errors.contains(&FormError::MissingTitle));
        assert_eq!(3, form.errors.len());

        form.cycle_priority(true);
        assert_eq!(Some(Priority::High), form.priority);
        assert!(!form.errors.contains(&FormError::MissingPriority));
    }

    #[test]
    fn test_cycle_priority() {
        let mut form = TaskForm::default();
        form.cycle_priority(false);
        assert_eq!(Some(Priority::Low), form.priority);
        form.cycle_priority(true);
        assert_eq!(Some(Priority::High), form.priority);
        form.cycle_priority(true);
        assert_eq!(Some(Priority::Medium), form.priority);
    }

    #[test]
    fn test_field_focus_wraps() {
        assert_eq!(FormField::Description, FormField::Title.next());
        assert_eq!(FormField::Title, FormField::Priority.next());
        assert_eq!(FormField::Priority, FormField::Title.previous());
    }
}
