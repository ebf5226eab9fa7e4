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
use crate::server::Config;

use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use version_compare::{Cmp, Version};

pub mod definitions;
pub mod id;

pub type DatabaseConnection = Surreal<Any>;

/// Schema migrations as `(version, query)`, applied in order when the recorded schema version is
/// older than the migration's version.
const MIGRATIONS: &[(&str, &str)] = &[];

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection: DatabaseConnection,
    pub database: String,
    pub namespace: String,
}

#[instrument(skip_all, fields(endpoint = %config.surrealdb_endpoint))]
pub async fn connect(config: &Config) -> Result<ConnectionInfo> {
    // establish the connection
    let client = any::connect(config.surrealdb_endpoint.as_str()).await?;
    info!("Established connection to surrealdb");

    // authenticate, embedded engines run without credentials
    if let (Some(username), Some(password)) = (
        config.surrealdb_username.as_deref(),
        config.surrealdb_password.as_deref(),
    ) {
        client.signin(Root { username, password }).await?;
        info!("Authenticated with surrealdb");
    }

    let namespace = config.surrealdb_namespace.clone();
    let database = config.surrealdb_database.clone();
    client
        .use_ns(namespace.as_str())
        .use_db(database.as_str())
        .await?;

    migrate(&client, env!("CARGO_PKG_VERSION"), MIGRATIONS).await?;
    // execute the up queries
    client
        .query(include_str!("./up.surrealql"))
        .await?
        .check()?;
    info!("Initiated tables");

    Ok(ConnectionInfo {
        database,
        namespace,
        connection: client,
    })
}

pub async fn migrate(
    client: &DatabaseConnection,
    current_version: &str,
    migrations: &[(&str, &str)],
) -> Result<()> {
    // initiate the migration table and fetch possibly already existing records
    let mut responses = client
        .query(
            "DEFINE TABLE migration SCHEMALESS;
            DEFINE FIELD version     ON TABLE migration TYPE string;
            DEFINE FIELD created_at  ON TABLE migration TYPE datetime DEFAULT time::now();",
        )
        .query("SELECT version, created_at FROM migration ORDER BY created_at DESC LIMIT 1")
        .await?
        .check()?;
    // the last record holds the schema version the database was migrated to
    let last = responses.take::<Option<String>>((3, "version"))?;

    match last {
        Some(last) if last.as_str().eq(current_version) => return Ok(()),
        Some(last) => {
            let last = Version::from(last.as_str()).ok_or(ApplicationError::InternalServerError)?;

            for (version, migration) in migrations {
                let target = Version::from(version).ok_or(ApplicationError::InternalServerError)?;
                if !target.compare_to(&last, Cmp::Gt) {
                    continue;
                }

                info!("Executing surrealdb migration to {version}");
                // execute the migration query and mark it as done
                client
                    .query(*migration)
                    .query("CREATE migration SET version = $version")
                    .bind(("version", *version))
                    .await?
                    .check()?;
            }
        }
        None => {}
    }

    // insert the current version as the last version
    client
        .query("CREATE migration SET version = $version")
        .bind(("version", current_version))
        .await?
        .check()?;

    Ok(())
}

/// Wraps a surrealdb request into a tracing span. Evaluates to a future which still has to be
/// awaited.
#[macro_export]
macro_rules! sql_span {
    ($request: expr) => {{
        use ::tracing::Instrument;
        ::std::future::IntoFuture::into_future($request)
            .instrument(::tracing::info_span!("Surrealdb Request"))
    }};
    ($request: expr, $title: expr) => {{
        use ::tracing::Instrument;
        ::std::future::IntoFuture::into_future($request)
            .instrument(::tracing::info_span!(concat!("Surrealdb Request: ", $title)))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_config;

    #[derive(Deserialize, Debug)]
    struct Migration {
        version: String,
    }

    async fn versions(connection: &DatabaseConnection) -> Result<Vec<String>> {
        let migrations: Vec<Migration> = connection
            .query("SELECT version, created_at FROM migration ORDER BY created_at ASC")
            .await?
            .take(0)?;

        Ok(migrations.into_iter().map(|migration| migration.version).collect())
    }

    #[tokio::test]
    async fn test_connect_records_version() -> Result<()> {
        let info = connect(&test_config()).await?;

        assert_eq!(
            vec![env!("CARGO_PKG_VERSION").to_owned()],
            versions(&info.connection).await?
        );

        // connecting again must not record the same version twice
        migrate(&info.connection, env!("CARGO_PKG_VERSION"), MIGRATIONS).await?;
        assert_eq!(1, versions(&info.connection).await?.len());

        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_applies_newer_migrations() -> Result<()> {
        let connection = connect(&test_config()).await?.connection;
        let current = env!("CARGO_PKG_VERSION");

        migrate(
            &connection,
            "99.0.0",
            &[
                (current, "DEFINE TABLE skipped SCHEMALESS;"),
                ("98.0.0", "CREATE marker SET name = 'applied';"),
            ],
        )
        .await?;

        #[derive(Deserialize, Debug)]
        struct Marker {
            name: String,
        }

        let markers: Vec<Marker> = connection.query("SELECT name FROM marker").await?.take(0)?;
        assert_eq!(1, markers.len());
        assert_eq!("applied", markers[0].name);

        let recorded = versions(&connection).await?;
        assert!(recorded.contains(&"99.0.0".to_owned()));
        assert!(recorded.contains(&"98.0.0".to_owned()));

        Ok(())
    }
}
