//! Database and role lifecycle through a superuser connection
//!
//! Every statement runs against the maintenance database, never the target,
//! so `DROP DATABASE` is possible while the target has connections.

use crate::error::DbResult;
use crate::traits::Executor;
use crate::url::{current_os_user, DatabaseUrl};
use std::sync::Arc;
use su_core::sql_utils::{quote_ident, quote_literal};

/// Administers the database and owner role named by a connection URL
pub struct DbAdmin {
    exec: Arc<dyn Executor>,
    target: DatabaseUrl,
    admin_url: String,
}

impl DbAdmin {
    /// Administer the database in `database_url`.
    ///
    /// Without an explicit `admin_url`, connects to the `postgres` database
    /// as the OS user, the default superuser on local installs.
    pub fn new(
        exec: Arc<dyn Executor>,
        database_url: &str,
        admin_url: Option<&str>,
    ) -> DbResult<Self> {
        let target = DatabaseUrl::parse(database_url)?;
        let admin_url = match admin_url {
            Some(url) => url.to_string(),
            None => target.admin_url(&current_os_user()),
        };
        Ok(Self {
            exec,
            target,
            admin_url,
        })
    }

    pub fn database(&self) -> &str {
        &self.target.database
    }

    pub fn user(&self) -> &str {
        &self.target.user
    }

    async fn exists(&self, sql: String) -> DbResult<bool> {
        let output = self.exec.run_sql(&self.admin_url, &sql).await?;
        Ok(output.trim() == "1")
    }

    pub async fn database_exists(&self) -> DbResult<bool> {
        self.exists(format!(
            "SELECT 1 FROM pg_database WHERE datname = {}",
            quote_literal(&self.target.database)
        ))
        .await
    }

    pub async fn user_exists(&self) -> DbResult<bool> {
        self.exists(format!(
            "SELECT 1 FROM pg_roles WHERE rolname = {}",
            quote_literal(&self.target.user)
        ))
        .await
    }

    /// Create the database unless it already exists. Returns whether it was
    /// created.
    pub async fn create_database(&self) -> DbResult<bool> {
        if self.database_exists().await? {
            log::debug!("Database '{}' already exists", self.target.database);
            return Ok(false);
        }
        let sql = format!("CREATE DATABASE {}", quote_ident(&self.target.database));
        self.exec.run_sql(&self.admin_url, &sql).await?;
        Ok(true)
    }

    /// Drop the database, terminating open connections.
    pub async fn drop_database(&self) -> DbResult<()> {
        let sql = format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_ident(&self.target.database)
        );
        self.exec.run_sql(&self.admin_url, &sql).await.map(|_| ())
    }

    /// Create the login role unless it already exists. Returns whether it
    /// was created.
    pub async fn create_user(&self) -> DbResult<bool> {
        if self.user_exists().await? {
            log::debug!("Role '{}' already exists", self.target.user);
            return Ok(false);
        }
        let mut sql = format!("CREATE USER {}", quote_ident(&self.target.user));
        if let Some(password) = &self.target.password {
            sql.push_str(&format!(" WITH PASSWORD {}", quote_literal(password)));
        }
        self.exec.run_sql(&self.admin_url, &sql).await?;
        Ok(true)
    }

    /// Grant all privileges on the database to the role and make it owner.
    pub async fn grant_permissions(&self) -> DbResult<()> {
        let database = quote_ident(&self.target.database);
        let user = quote_ident(&self.target.user);
        let statements = [
            format!("GRANT ALL PRIVILEGES ON DATABASE {} TO {}", database, user),
            format!("ALTER DATABASE {} OWNER TO {}", database, user),
        ];
        for sql in &statements {
            self.exec.run_sql(&self.admin_url, sql).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
