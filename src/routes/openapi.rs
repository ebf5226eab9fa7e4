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

use crate::prelude::*;
use aide::axum::routing::get_with;
use aide::axum::{ApiRouter, IntoApiResponse};
use aide::openapi::OpenApi;
use aide::redoc::Redoc;
use aide::transform::TransformOpenApi;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use std::ops::Deref;
use std::sync::Arc;

pub fn router(state: ApplicationState) -> ApiRouter {
    aide::gen::infer_responses(true);

    let router = ApiRouter::new()
        .api_route(
            "/",
            get_with(
                Redoc::new("/docs/private/api.json")
                    .with_title("taskboard")
                    .axum_handler(),
                |op| op.description("This documentation page."),
            ),
        )
        .route("/private/api.json", get(serve_docs))
        .with_state(state);

    aide::gen::infer_responses(false);

    router
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api.deref()).into_response()
}

pub fn transform_api(api: TransformOpenApi) -> TransformOpenApi {
    api.title("taskboard")
        .summary("Task store")
        .description("Create, list, update and delete tasks")
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_serve_docs() -> Result<()> {
        let suite = TestSuite::init().await?;

        let response = suite.client().get("/docs/private/api.json").send().await;
        assert_eq!(StatusCode::OK, response.status());

        let api = response.json::<serde_json::Value>().await;
        assert_eq!("taskboard", api["info"]["title"]);
        assert!(api["paths"].get("/tasks/{id}").is_some());

        let response = suite.client().get("/docs").send().await;
        assert_eq!(StatusCode::OK, response.status());

        Ok(())
    }
}
