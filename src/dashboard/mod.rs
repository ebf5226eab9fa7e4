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

//! Client side of the task store: an explicit state container, the http client keeping it in
//! sync with the store and a terminal ui rendering it.

use crate::dashboard::client::TaskClient;
use crate::dashboard::state::{Action, DashboardState};
use crate::database::definitions::task::EditTask;
use crate::database::id::TaskId;

pub mod app;
pub mod client;
pub mod form;
pub mod state;
pub mod ui;

#[derive(Deserialize, Debug, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_owned()
}

fn default_log_file() -> String {
    "dashboard.log".to_owned()
}

impl DashboardConfig {
    /// Reads the `DASHBOARD_` prefixed environment, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::prefixed("DASHBOARD_").from_env::<DashboardConfig>()
    }
}

/// Couples the dashboard state with the task store. Failed calls are logged and leave the state
/// untouched.
#[derive(Debug, Getters)]
pub struct Dashboard {
    #[get = "pub"]
    state: DashboardState,
    client: TaskClient,
}

impl Dashboard {
    pub fn new(client: TaskClient) -> Self {
        Self {
            state: DashboardState::default(),
            client,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = std::mem::take(&mut self.state).reduce(action);
    }

    /// Replaces the cached tasks with the store's list.
    pub async fn load(&mut self) {
        match self.client.list().await {
            Ok(tasks) => self.dispatch(Action::Loaded(tasks)),
            Err(error) => error!("Error fetching tasks: {}", error),
        }
    }

    /// Sends the open form to the store, creating or updating depending on the form. Invalid
    /// forms are not sent, their errors are kept in the form.
    pub async fn submit(&mut self) {
        let Some(form) = self.state.form().clone() else {
            return;
        };

        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                warn!("Rejected task form: {:?}", errors);
                self.dispatch(Action::FormRejected(errors));
                return;
            }
        };

        let result = match form.editing.as_ref() {
            Some(id) => {
                let completed = self
                    .state
                    .task(id)
                    .map(|task| *task.completed())
                    .unwrap_or(false);

                self.client
                    .update(id, &draft.into_edit(completed))
                    .await
                    .map(Action::Updated)
            }
            None => self
                .client
                .create(&draft.into_request())
                .await
                .map(Action::Created),
        };

        match result {
            Ok(action) => {
                self.dispatch(action);
                self.dispatch(Action::CloseForm);
            }
            Err(error) => error!("Submitting the task failed: {}", error),
        }
    }

    pub async fn delete(&mut self, id: &TaskId) {
        match self.client.delete(id).await {
            Ok(_) => self.dispatch(Action::Deleted(id.clone())),
            Err(error) => error!("Error deleting task: {}", error),
        }
    }

    /// Flips the completion of the cached task and stores the whole record.
    pub async fn toggle_completion(&mut self, id: &TaskId) {
        let Some(task) = self.state.task(id) else {
            warn!("Task {id} is not loaded");
            return;
        };

        let mut edit = EditTask::from(task);
        edit.completed = Some(!task.completed());

        match self.client.update(id, &edit).await {
            Ok(task) => self.dispatch(Action::Updated(task)),
            Err(error) => error!("Error updating completion status: {}", error),
        }
    }
}
