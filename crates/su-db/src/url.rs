//! PostgreSQL connection URLs

use crate::error::{DbError, DbResult};
use url::Url;

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_SSL_MODE: &str = "disable";

/// Parsed `postgres://` connection details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl_mode: String,
}

impl DatabaseUrl {
    pub fn parse(raw: &str) -> DbResult<Self> {
        let url = Url::parse(raw).map_err(|e| DbError::InvalidUrl(e.to_string()))?;

        if url.scheme() != "postgres" && url.scheme() != "postgresql" {
            return Err(DbError::InvalidUrl(format!(
                "expected postgres or postgresql scheme, got '{}'",
                url.scheme()
            )));
        }

        let database = url.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(DbError::InvalidUrl("missing database name".to_string()));
        }

        let ssl_mode = url
            .query_pairs()
            .find(|(k, _)| k == "sslmode")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| DEFAULT_SSL_MODE.to_string());

        Ok(Self {
            user: decode(url.username()),
            password: url.password().map(decode),
            host: url.host_str().unwrap_or("localhost").to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
            database: decode(&database),
            ssl_mode,
        })
    }

    /// URL for the `postgres` maintenance database as `admin_user`
    pub fn admin_url(&self, admin_user: &str) -> String {
        self.build(admin_user, "postgres")
    }

    fn build(&self, user: &str, database: &str) -> String {
        let mut url = Url::parse("postgres://localhost/").expect("static url parses");
        let _ = url.set_host(Some(&self.host));
        let _ = url.set_port(Some(self.port));
        let _ = url.set_username(user);
        url.set_path(database);
        url.query_pairs_mut().append_pair("sslmode", &self.ssl_mode);
        url.to_string()
    }
}

/// Add `sslmode=disable` when the URL does not specify one.
///
/// Some clients refuse to negotiate without an explicit mode where psql
/// falls back silently.
pub fn ensure_ssl_mode(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    if url.query_pairs().any(|(k, _)| k == "sslmode") {
        return raw.to_string();
    }
    url.query_pairs_mut().append_pair("sslmode", DEFAULT_SSL_MODE);
    url.to_string()
}

/// Replace the password in any connection URL found in `arg`.
pub fn redact(arg: &str) -> String {
    if !(arg.starts_with("postgres://") || arg.starts_with("postgresql://")) {
        return arg.to_string();
    }
    match Url::parse(arg) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => arg.to_string(),
    }
}

/// Name of the OS user, the usual superuser on local installs.
pub fn current_os_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "postgres".to_string())
}

fn decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
#[path = "url_test.rs"]
mod tests;
