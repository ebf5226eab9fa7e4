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

use crate::database;
use crate::prelude::*;

pub mod state;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_surrealdb_endpoint")]
    pub surrealdb_endpoint: String,
    pub surrealdb_username: Option<String>,
    pub surrealdb_password: Option<String>,
    #[serde(default = "default_surrealdb_namespace")]
    pub surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_database")]
    pub surrealdb_database: String,
}

fn default_port() -> u16 {
    5000
}

fn default_surrealdb_endpoint() -> String {
    "mem://".to_owned()
}

fn default_surrealdb_namespace() -> String {
    "production".to_owned()
}

fn default_surrealdb_database() -> String {
    "taskboard".to_owned()
}

impl Config {
    /// Reads the configuration from the environment, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(envy::from_env::<Config>()?)
    }
}

/// Runs the task store until a shutdown signal is received.
pub async fn run(config: Config) -> Result<()> {
    let (sender, receiver) = kanal::unbounded_async::<()>();

    let state = ApplicationState::from(database::connect(&config).await?);
    info!(
        "Using surrealdb namespace {:?} and database {:?}",
        state.namespace(),
        state.database()
    );

    let router = crate::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    // bind before spawning, an occupied port fails the startup
    let builder = axum::Server::try_bind(&addr).map_err(|error| {
        error!("Unable to bind {addr}: {}", error);
        ApplicationError::BindError(addr.to_string())
    })?;

    let mut server = tokio::spawn(async move {
        info!("Listening on http://{addr}");

        builder
            .serve(router.into_make_service())
            .with_graceful_shutdown(async move {
                receiver.recv().await.ok();
            })
            .await
            .map_err(|error| {
                error!("Server terminated: {}", error);
                ApplicationError::InternalServerError
            })
    });

    tokio::select! {
        // the server stopped on its own
        result = &mut server => {
            return result.map_err(|_| ApplicationError::InternalServerError)?;
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(error) = signal {
                error!("Unable to listen for shutdown signal: {}", error);
            }
        }
    }

    info!("Received shutdown signal... Shutting down...");
    // a closed channel means the server is already gone
    sender.send(()).await.ok();

    server
        .await
        .map_err(|_| ApplicationError::InternalServerError)?
}
