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
use aide::OperationIo;
use axum::extract::FromRequest;
use axum::response::IntoResponse;
use axum_jsonschema::JsonSchemaRejection;
use serde::Serialize;

/// Json body checked against the json schema of `T` before deserializing. A rejected body is
/// answered with `400` and the usual `{"error": ..}` object.
#[derive(FromRequest, OperationIo)]
#[from_request(via(axum_jsonschema::Json), rejection(ApplicationError))]
#[aide(
    input_with = "axum_jsonschema::Json<T>",
    output_with = "axum_jsonschema::Json<T>",
    json_schema
)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonSchemaRejection> for ApplicationError {
    fn from(rejection: JsonSchemaRejection) -> Self {
        let message = match rejection {
            JsonSchemaRejection::Json(error) => format!("malformed body: {error}"),
            JsonSchemaRejection::Serde(error) => format!("invalid body: {error}"),
            JsonSchemaRejection::Schema(errors) => {
                format!("body does not match the schema: {}", json!(errors))
            }
        };
        debug!("Rejected request body: {}", message);

        Self::BadRequest(message)
    }
}
