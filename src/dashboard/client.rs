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

use crate::database::definitions::task::{EditTask, Task, WriteTaskRequest};
use crate::database::id::TaskId;
use crate::error::ApplicationErrorResponse;
use crate::routes::task::DeleteResponse;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("task store answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Http client of the task store. Every call is attempted exactly once.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    tasks_url: String,
}

impl TaskClient {
    /// `base_url` is the address of the task store, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            tasks_url: format!("{}/tasks", base_url.trim_end_matches('/')),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ClientResult<Vec<Task>> {
        let response = self.http.get(self.tasks_url.as_str()).send().await?;

        parse(response).await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: &WriteTaskRequest) -> ClientResult<Task> {
        let response = self
            .http
            .post(self.tasks_url.as_str())
            .json(request)
            .send()
            .await?;

        parse(response).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &TaskId, edit: &EditTask) -> ClientResult<Task> {
        let response = self
            .http
            .put(self.task_url(id))
            .json(edit)
            .send()
            .await?;

        parse(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &TaskId) -> ClientResult<String> {
        let response = self.http.delete(self.task_url(id)).send().await?;

        Ok(parse::<DeleteResponse>(response).await?.message)
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/{}", self.tasks_url, id)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    // fall back to the status text when the body is not an error object
    let message = match response.json::<ApplicationErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
    };

    Err(ClientError::Status { status, message })
}
