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

use crate::database::ConnectionInfo;
use crate::prelude::DatabaseConnection;

/// Shared by every handler of the task store.
#[derive(Debug, Clone, Getters)]
#[get = "pub"]
pub struct ApplicationState {
    connection: DatabaseConnection,
    namespace: String,
    database: String,
}

impl From<ConnectionInfo> for ApplicationState {
    fn from(info: ConnectionInfo) -> Self {
        Self {
            connection: info.connection,
            namespace: info.namespace,
            database: info.database,
        }
    }
}
