//! Database test utilities and shared infrastructure

use sqlx::{Connection, PgConnection, PgPool, query};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use testresult::TestResult;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::database::{self, Db};

const SUPERUSER: &str = "storefront_test";
const SUPERUSER_PASSWORD: &str = "storefront_test_password";

/// Non-superuser role the stores connect as. Superusers bypass row-level security.
const APP_ROLE: &str = "storefront_app_test";
const APP_ROLE_PASSWORD: &str = "storefront_app_test_password";

/// PostgreSQL container shared by every test in the run.
struct Server {
    _container: ContainerAsync<PostgresImage>,
    host: String,
    port: u16,
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

impl Server {
    async fn start() -> TestResult<Self> {
        let container = PostgresImage::default()
            .with_user(SUPERUSER)
            .with_password(SUPERUSER_PASSWORD)
            .with_db_name("storefront_test")
            .start()
            .await?;

        let host = match std::env::var("TESTCONTAINERS_HOST_OVERRIDE") {
            Ok(host) => host,
            Err(_) => container.get_host().await?.to_string(),
        };
        let port = container.get_host_port_ipv4(5432).await?;

        let server = Self {
            _container: container,
            host,
            port,
        };

        // Roles are server-wide, so the app role is created once with the server
        let mut conn = PgConnection::connect(&server.superuser_url("postgres")).await?;

        query(&format!(
            "CREATE ROLE {APP_ROLE} WITH LOGIN PASSWORD '{APP_ROLE_PASSWORD}' \
             NOSUPERUSER NOCREATEDB NOCREATEROLE"
        ))
        .execute(&mut conn)
        .await?;

        conn.close().await?;

        Ok(server)
    }

    fn superuser_url(&self, database: &str) -> String {
        self.url(SUPERUSER, SUPERUSER_PASSWORD, database)
    }

    fn app_url(&self, database: &str) -> String {
        self.url(APP_ROLE, APP_ROLE_PASSWORD, database)
    }

    fn url(&self, user: &str, password: &str, database: &str) -> String {
        format!(
            "postgresql://{user}:{password}@{}:{}/{database}",
            self.host, self.port
        )
    }
}

/// An isolated, migrated database inside the shared container.
///
/// `admin` connects as the superuser and is used to seed and inspect rows across
/// tenants. `app` connects as the restricted role, so everything run through it is
/// subject to the tenant policies. Databases are never dropped; they go away with
/// the container at the end of the run.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pub(crate) admin: PgPool,
    pub(crate) app: Db,
}

impl TestDb {
    pub(crate) async fn new() -> TestResult<Self> {
        let server = SERVER.get_or_try_init(Server::start).await?;
        let name = format!("storefront_test_{}", Uuid::now_v7().simple());

        let mut conn = PgConnection::connect(&server.superuser_url("postgres")).await?;

        query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await?;
        query(&format!("GRANT CONNECT ON DATABASE \"{name}\" TO {APP_ROLE}"))
            .execute(&mut conn)
            .await?;

        conn.close().await?;

        let admin = PgPool::connect(&server.superuser_url(&name)).await?;

        database::migrate(&admin).await?;

        for grant in [
            format!("GRANT USAGE ON SCHEMA public TO {APP_ROLE}"),
            format!(
                "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {APP_ROLE}"
            ),
        ] {
            query(&grant).execute(&admin).await?;
        }

        let app = PgPool::connect(&server.app_url(&name)).await?;

        Ok(Self {
            admin,
            app: Db::new(app),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn app_role_is_subject_to_row_level_security() -> TestResult {
        let db = TestDb::new().await?;

        let bypasses: bool = sqlx::query_scalar(
            "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user",
        )
        .fetch_one(db.app.pool())
        .await?;

        assert!(!bypasses);

        Ok(())
    }
}
