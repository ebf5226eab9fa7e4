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

use crate::error::ApplicationError;
use schemars::JsonSchema;
use std::fmt::{Display, Formatter};
use surrealdb::sql::Thing;

pub const TASK_TABLE: &str = "task";

/// Identifier of a task record. Only the record part of the surrealdb id is exposed, the table
/// is always [`TASK_TABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskId(String);

impl TryFrom<Thing> for TaskId {
    type Error = ApplicationError;

    fn try_from(thing: Thing) -> Result<Self, Self::Error> {
        if !thing.tb.eq(TASK_TABLE) {
            error!("Received record {thing} where a task was expected");
            return Err(ApplicationError::InternalServerError);
        }

        Ok(Self(thing.id.to_raw()))
    }
}

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses an id taken from a request path. Accepts both the bare record part and the fully
    /// qualified `task:<id>` form.
    pub fn parse(raw: &str) -> Result<Self, ApplicationError> {
        let id = match raw.split_once(':') {
            Some((table, id)) => {
                // for security reasons we can't allow every table
                if !table.eq(TASK_TABLE) {
                    return Err(ApplicationError::BadRequest("invalid id".to_owned()));
                }
                id
            }
            None => raw,
        };

        if id.is_empty() || id.contains(':') {
            return Err(ApplicationError::BadRequest("invalid id".to_owned()));
        }

        Ok(Self(id.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn to_thing(&self) -> Thing {
        Thing::from((TASK_TABLE, self.0.as_str()))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}
