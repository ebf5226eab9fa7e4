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

use crate::database::id::TASK_TABLE;
use crate::prelude::*;
use chrono::NaiveDate;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use strum::{Display, EnumIter};
use surrealdb::sql::Thing;

#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    JsonSchema,
    Display,
    EnumIter,
)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) title: String,
    pub(crate) description: String,
    /// the due date as `YYYY-MM-DD`
    pub(crate) due_date: NaiveDate,
    pub(crate) priority: Priority,
    pub(crate) completed: bool,
}

/// A task as it is stored in the `task` table.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct TaskRecord {
    id: Thing,
    title: String,
    description: String,
    due_date: NaiveDate,
    priority: Priority,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ApplicationError;

    fn try_from(record: TaskRecord) -> Result<Self> {
        Ok(Self {
            id: TaskId::try_from(record.id)?,
            title: record.title,
            description: record.description,
            due_date: record.due_date,
            priority: record.priority,
            completed: record.completed,
        })
    }
}

impl Task {
    /// Fetches every task in the order they were created.
    #[instrument(skip_all)]
    pub async fn list(connection: &DatabaseConnection) -> Result<Vec<Task>> {
        let records = sql_span!(
            connection.query("SELECT * FROM task ORDER BY created_at ASC"),
            "list tasks"
        )
        .await?
        .take::<Vec<TaskRecord>>(0)?;

        records.into_iter().map(Task::try_from).collect()
    }

    #[instrument(skip(connection))]
    pub async fn fetch(id: &TaskId, connection: &DatabaseConnection) -> Result<Option<Task>> {
        let record: Option<TaskRecord> =
            sql_span!(connection.select(id.to_thing()), "select task").await?;

        record.map(Task::try_from).transpose()
    }

    /// Removes the task if it exists. Deleting an unknown id is not an error.
    #[instrument(skip(connection))]
    pub async fn delete(id: &TaskId, connection: &DatabaseConnection) -> Result<()> {
        let removed: Option<TaskRecord> =
            sql_span!(connection.delete(id.to_thing()), "delete task").await?;

        if removed.is_none() {
            debug!("Task {id} did not exist");
        }

        Ok(())
    }
}

/// Payload for creating a task.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteTaskRequest {
    pub title: String,
    pub description: String,
    /// the due date as `YYYY-MM-DD`
    pub due_date: NaiveDate,
    pub priority: Priority,
    /// defaults to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl WriteTaskRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)
    }
}

/// Payload for updating a task. Only the fields listed here can be changed, everything else in
/// the request body is ignored.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<&Task> for EditTask {
    fn from(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            due_date: Some(task.due_date),
            priority: Some(task.priority),
            completed: Some(task.completed),
        }
    }
}

impl EditTask {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }

        Ok(())
    }

    pub fn to_writer<'a>(self, connection: &'a DatabaseConnection) -> WriteTask<'a> {
        WriteTask::from(connection)
            .set_title(self.title)
            .set_description(self.description)
            .set_due_date(self.due_date)
            .set_priority(self.priority)
            .set_completed(self.completed)
            .to_owned()
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApplicationError::BadRequest(format!(
            "{field} must not be blank"
        )));
    }

    Ok(())
}

/// Creates a new task or, with a target set, merges the present fields into an existing one.
#[derive(Clone, Serialize, Getters, Setters)]
#[set = "pub"]
pub struct WriteTask<'a> {
    #[get = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[get = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[get = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[get = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[get = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    target: Option<&'a TaskId>,
}

impl<'a> From<&'a DatabaseConnection> for WriteTask<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            title: None,
            description: None,
            due_date: None,
            priority: None,
            completed: None,
            connection,
            target: None,
        }
    }
}

impl<'a> WriteTask<'a> {
    pub fn with_request(&mut self, request: WriteTaskRequest) -> &mut Self {
        self.title = Some(request.title);
        self.description = Some(request.description);
        self.due_date = Some(request.due_date);
        self.priority = Some(request.priority);
        self.completed = Some(request.completed.unwrap_or(false));

        self
    }
}

impl<'a> IntoFuture for WriteTask<'a> {
    type Output = Result<Task>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let connection = self.connection;

            let record: TaskRecord = if let Some(target) = self.target {
                // UPDATE on a record id creates missing records, matching by condition only
                // touches existing ones
                let updated = sql_span!(
                    connection
                        .query("UPDATE task MERGE $data WHERE id = $id RETURN AFTER")
                        .bind(("id", target.to_thing()))
                        .bind(("data", self)),
                    "merge task"
                )
                .await?
                .take::<Vec<TaskRecord>>(0)?;

                updated
                    .into_iter()
                    .next()
                    .ok_or(ApplicationError::NotFound("Task not found".to_owned()))?
            } else {
                let created: Vec<TaskRecord> = sql_span!(
                    connection.create(TASK_TABLE).content(self),
                    "create task"
                )
                .await?;
                created
                    .into_iter()
                    .next()
                    .ok_or(ApplicationError::InternalServerError)?
            };

            Task::try_from(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect;
    use crate::tests::test_config;

    fn request(title: &str, priority: Priority) -> WriteTaskRequest {
        WriteTaskRequest {
            title: title.to_owned(),
            description: "description".to_owned(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            priority,
            completed: None,
        }
    }

    #[tokio::test]
    async fn test_write() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;

        let task = WriteTask::from(&connection)
            .with_request(request("Quarterly report", Priority::Low))
            .to_owned()
            .await?;

        assert_eq!("Quarterly report", task.title());
        assert_eq!("description", task.description());
        assert_eq!(&NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(), task.due_date());
        assert_eq!(&Priority::Low, task.priority());
        assert!(!task.completed());

        let fetched = Task::fetch(task.id(), &connection).await?;
        assert_eq!(Some(task), fetched);

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_keeps_untouched_fields() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;
        let task = WriteTask::from(&connection)
            .with_request(request("title", Priority::Low))
            .to_owned()
            .await?;

        let updated = EditTask {
            priority: Some(Priority::High),
            ..Default::default()
        }
        .to_writer(&connection)
        .set_target(Some(task.id()))
        .to_owned()
        .await?;

        assert_eq!(&Priority::High, updated.priority());
        assert_eq!(task.title(), updated.title());
        assert_eq!(task.description(), updated.description());
        assert_eq!(task.due_date(), updated.due_date());
        assert_eq!(task.completed(), updated.completed());

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_unknown_task() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;
        let id = TaskId::new("missing");

        let result = EditTask {
            completed: Some(true),
            ..Default::default()
        }
        .to_writer(&connection)
        .set_target(Some(&id))
        .to_owned()
        .await;

        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
        // the failed update must not have created the record
        assert!(Task::fetch(&id, &connection).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_deleted_task() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;
        let task = WriteTask::from(&connection)
            .with_request(request("title", Priority::Low))
            .to_owned()
            .await?;
        Task::delete(task.id(), &connection).await?;

        let result = EditTask::from(&task)
            .to_writer(&connection)
            .set_target(Some(task.id()))
            .to_owned()
            .await;

        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
        assert!(Task::fetch(task.id(), &connection).await?.is_none());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_merge_and_delete() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;

        for _ in 0..50 {
            let task = WriteTask::from(&connection)
                .with_request(request("title", Priority::Low))
                .to_owned()
                .await?;

            let edit = EditTask {
                completed: Some(true),
                ..EditTask::from(&task)
            };
            let (updated, deleted) = tokio::join!(
                edit.to_writer(&connection)
                    .set_target(Some(task.id()))
                    .to_owned()
                    .into_future(),
                Task::delete(task.id(), &connection)
            );
            deleted?;
            if let Err(error) = updated {
                debug!("Concurrent merge failed: {}", error);
            }

            // whichever ran first, the deleted task stays deleted
            assert!(Task::fetch(task.id(), &connection).await?.is_none());
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_list_in_creation_order() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;

        for title in ["first", "second", "third"] {
            WriteTask::from(&connection)
                .with_request(request(title, Priority::Medium))
                .to_owned()
                .await?;
        }

        let titles = Task::list(&connection)
            .await?
            .into_iter()
            .map(|task| task.title)
            .collect::<Vec<_>>();
        assert_eq!(vec!["first", "second", "third"], titles);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;
        let task = WriteTask::from(&connection)
            .with_request(request("title", Priority::Medium))
            .to_owned()
            .await?;

        Task::delete(task.id(), &connection).await?;
        assert!(Task::fetch(task.id(), &connection).await?.is_none());
        Task::delete(task.id(), &connection).await?;

        Ok(())
    }

    #[test]
    fn test_validation() {
        assert!(request("title", Priority::Low).validate().is_ok());
        assert!(matches!(
            request("   ", Priority::Low).validate(),
            Err(ApplicationError::BadRequest(_))
        ));

        assert!(EditTask::default().validate().is_ok());
        assert!(EditTask {
            description: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_json_shape() {
        let task = Task {
            id: TaskId::new("abc"),
            title: "title".to_owned(),
            description: "description".to_owned(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            priority: Priority::High,
            completed: false,
        };

        assert_eq!(
            json!({
                "id": "abc",
                "title": "title",
                "description": "description",
                "dueDate": "2024-01-09",
                "priority": "High",
                "completed": false
            }),
            serde_json::to_value(&task).unwrap()
        );

        // the full record is accepted as an update, the id is dropped
        let edit: EditTask = serde_json::from_value(serde_json::to_value(&task).unwrap()).unwrap();
        assert_eq!(EditTask::from(&task), edit);
    }
}
