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

#[macro_use]
extern crate serde;
#[macro_use]
extern crate thiserror;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate tracing;
#[macro_use]
extern crate serde_json;

use crate::server::state::ApplicationState;
use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod dashboard;
pub mod database;
pub mod error;
pub mod routes;
pub mod server;

pub use error::Result;

/// Builds the http surface of the task store: the task collection under `/tasks` and the api
/// documentation under `/docs`.
pub fn router(state: ApplicationState) -> Router {
    let mut api = OpenApi::default();

    ApiRouter::new()
        .nest("/tasks", routes::task::router(state.clone()))
        .nest("/docs", routes::openapi::router(state))
        .finish_api_with(&mut api, routes::openapi::transform_api)
        .layer(Extension(Arc::new(api)))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http())
}

pub mod prelude {
    pub use crate::database::id::TaskId;
    pub use crate::database::DatabaseConnection;
    pub use crate::error::*;
    pub use crate::routes::extractor::Json;
    pub use crate::server::state::ApplicationState;
    pub use crate::sql_span;
    pub use schemars::JsonSchema;
}
