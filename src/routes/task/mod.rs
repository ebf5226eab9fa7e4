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

use crate::database::definitions::task::{EditTask, Task, WriteTask, WriteTaskRequest};
use crate::prelude::*;
use aide::axum::routing::{get_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/",
            get_with(list_tasks, list_tasks_docs).post_with(create_task, create_task_docs),
        )
        .api_route(
            "/:id",
            put_with(update_task, update_task_docs).delete_with(delete_task, delete_task_docs),
        )
        .with_state(state)
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct DeleteResponse {
    pub message: String,
}

async fn list_tasks(State(state): State<ApplicationState>) -> Result<Json<Vec<Task>>> {
    let tasks = Task::list(state.connection()).await?;

    Ok(Json(tasks))
}

fn list_tasks_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain every task in the order they were created")
        .summary("List all tasks")
        .response::<200, Json<Vec<Task>>>()
}

async fn create_task(
    State(state): State<ApplicationState>,
    Json(data): Json<WriteTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    data.validate()?;

    let task = WriteTask::from(state.connection())
        .with_request(data)
        .to_owned()
        .await?;
    info!("Created task {}", task.id());

    Ok((StatusCode::CREATED, Json(task)))
}

fn create_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new task. `completed` defaults to false")
        .summary("Create a task")
        .response::<201, Json<Task>>()
        .response_with::<400, Json<ApplicationErrorResponse>, _>(|transform| {
            transform.description("Missing or blank fields")
        })
}

async fn update_task(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<EditTask>,
) -> Result<Json<Task>> {
    let id = TaskId::parse(id.as_str())?;
    data.validate()?;

    let task = data
        .to_writer(state.connection())
        .set_target(Some(&id))
        .to_owned()
        .await?;

    Ok(Json(task))
}

fn update_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Merge the given fields into the task. Omitted fields stay untouched, unknown fields are ignored")
        .summary("Update a task")
        .response::<200, Json<Task>>()
        .response_with::<404, Json<ApplicationErrorResponse>, _>(|transform| {
            transform.description("There is no task with the given id")
        })
}

async fn delete_task(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id = TaskId::parse(id.as_str())?;
    Task::delete(&id, state.connection()).await?;

    Ok(Json(DeleteResponse {
        message: "Task deleted".to_owned(),
    }))
}

fn delete_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete the task. Succeeds as well when the task does not exist")
        .summary("Delete a task")
        .response::<200, Json<DeleteResponse>>()
}

#[cfg(test)]
mod tests {
    use super::DeleteResponse;
    use crate::database::definitions::task::{Priority, Task};
    use crate::prelude::*;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create() -> Result<()> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/tasks")
            .json(&json!({
                "title": "Quarterly report",
                "description": "numbers for q3",
                "dueDate": "2024-09-30",
                "priority": "High"
            }))
            .send()
            .await;

        assert_eq!(StatusCode::CREATED, response.status());
        let task = response.json::<Task>().await;
        assert_eq!("Quarterly report", task.title());
        assert_eq!(&NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(), task.due_date());
        assert_eq!(&Priority::High, task.priority());
        assert!(!task.completed());

        let fetched = Task::fetch(task.id(), suite.connection()).await?;
        assert_eq!(Some(task), fetched);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_completed() -> Result<()> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/tasks")
            .json(&json!({
                "title": "title",
                "description": "description",
                "dueDate": "2024-09-30",
                "priority": "Low",
                "completed": true
            }))
            .send()
            .await;

        assert_eq!(StatusCode::CREATED, response.status());
        assert!(response.json::<Task>().await.completed());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payloads() -> Result<()> {
        let suite = TestSuite::init().await?;

        let payloads = [
            // missing priority
            json!({ "title": "title", "description": "description", "dueDate": "2024-09-30" }),
            // not a plain date
            json!({ "title": "title", "description": "description", "dueDate": "2024-09-30T10:00:00Z", "priority": "Low" }),
            // unknown priority
            json!({ "title": "title", "description": "description", "dueDate": "2024-09-30", "priority": "Urgent" }),
            // blank title
            json!({ "title": "  ", "description": "description", "dueDate": "2024-09-30", "priority": "Low" }),
        ];

        for payload in payloads {
            let response = suite.client().post("/tasks").json(&payload).send().await;
            assert_eq!(StatusCode::BAD_REQUEST, response.status(), "{payload}");
        }

        assert!(Task::list(suite.connection()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_list() -> Result<()> {
        let suite = TestSuite::init().await?;
        let first = suite.create_task("first", Priority::Low).await?;
        let second = suite.create_task("second", Priority::High).await?;

        let response = suite.client().get("/tasks").send().await;
        assert_eq!(StatusCode::OK, response.status());

        let tasks = response.json::<Vec<Task>>().await;
        assert_eq!(vec![first, second], tasks);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_priority() -> Result<()> {
        let suite = TestSuite::init().await?;
        let task = suite.create_task("title", Priority::Low).await?;

        let response = suite
            .client()
            .put(format!("/tasks/{}", task.id()).as_str())
            .json(&json!({ "priority": "High" }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated = response.json::<Task>().await;
        assert_eq!(&Priority::High, updated.priority());

        let tasks = suite.client().get("/tasks").send().await.json::<Vec<Task>>().await;
        assert_eq!(1, tasks.len());
        let listed = &tasks[0];
        assert_eq!(&Priority::High, listed.priority());
        assert_eq!(task.id(), listed.id());
        assert_eq!(task.title(), listed.title());
        assert_eq!(task.description(), listed.description());
        assert_eq!(task.due_date(), listed.due_date());
        assert_eq!(task.completed(), listed.completed());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_ignores_fields_outside_allow_list() -> Result<()> {
        let suite = TestSuite::init().await?;
        let task = suite.create_task("title", Priority::Low).await?;

        let response = suite
            .client()
            .put(format!("/tasks/{}", task.id()).as_str())
            .json(&json!({ "id": "other", "owner": "someone", "completed": true }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        let updated = response.json::<Task>().await;
        assert_eq!(task.id(), updated.id());
        assert!(updated.completed());

        let raw: Option<serde_json::Value> =
            suite.connection().select(task.id().to_thing()).await?;
        assert!(raw.unwrap().get("owner").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_task() -> Result<()> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .put("/tasks/missing")
            .json(&json!({ "priority": "High" }))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
        let error = response.json::<ApplicationErrorResponse>().await;
        assert_eq!("Task not found", error.error);

        assert!(Task::list(suite.connection()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() -> Result<()> {
        let suite = TestSuite::init().await?;
        let task = suite.create_task("title", Priority::Low).await?;

        let response = suite
            .client()
            .put(format!("/tasks/{}", task.id()).as_str())
            .json(&json!({ "title": "" }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let fetched = Task::fetch(task.id(), suite.connection()).await?;
        assert_eq!(Some(task), fetched);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> Result<()> {
        let suite = TestSuite::init().await?;
        let task = suite.create_task("first", Priority::Low).await?;
        suite.create_task("second", Priority::Low).await?;

        let response = suite
            .client()
            .delete(format!("/tasks/{}", task.id()).as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            DeleteResponse {
                message: "Task deleted".to_owned()
            },
            response.json::<DeleteResponse>().await
        );

        let tasks = suite.client().get("/tasks").send().await.json::<Vec<Task>>().await;
        assert_eq!(1, tasks.len());
        assert!(tasks.iter().all(|listed| listed.id() != task.id()));

        // deleting again still confirms
        let response = suite
            .client()
            .delete(format!("/tasks/{}", task.id()).as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("Task deleted", response.json::<DeleteResponse>().await.message);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_foreign_table() -> Result<()> {
        let suite = TestSuite::init().await?;

        let response = suite.client().delete("/tasks/migration:abc").send().await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }
}
