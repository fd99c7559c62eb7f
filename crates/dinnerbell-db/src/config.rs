//! Where the dinnerbell database lives.

use std::env;

/// Connection settings for the dinnerbell PostgreSQL database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
}

/// A `scheme://authority/database?query` URL taken apart.
struct UrlParts<'a> {
    scheme: &'a str,
    authority: &'a str,
    database: &'a str,
    query: Option<&'a str>,
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/dinnerbell";

    pub const ENV_VAR: &str = "DINNERBELL_DATABASE_URL";

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// First of: the `--database-url` flag, `DINNERBELL_DATABASE_URL`, the
    /// config file's `[database].url`, [`Self::DEFAULT_URL`].
    ///
    /// A blank environment variable counts as unset.
    pub fn resolve(flag: Option<&str>, file_url: Option<&str>) -> Self {
        let from_env = env::var(Self::ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty());
        let url = flag
            .map(str::to_owned)
            .or(from_env)
            .or_else(|| file_url.map(str::to_owned))
            .unwrap_or_else(|| Self::DEFAULT_URL.to_owned());
        Self::new(url)
    }

    fn parts(&self) -> Option<UrlParts<'_>> {
        let (scheme, rest) = self.database_url.split_once("://")?;
        let (authority, path) = rest.split_once('/')?;
        let (database, query) = match path.split_once('?') {
            Some((database, query)) => (database, Some(query)),
            None => (path, None),
        };
        Some(UrlParts {
            scheme,
            authority,
            database,
            query,
        })
    }

    /// The database named in the URL path, if there is one.
    pub fn database_name(&self) -> Option<&str> {
        self.parts()
            .map(|parts| parts.database)
            .filter(|name| !name.is_empty())
    }

    /// Same server and options, but the `postgres` maintenance database,
    /// where `CREATE DATABASE` is issued from.
    pub fn maintenance_url(&self) -> String {
        match self.parts() {
            Some(UrlParts {
                scheme,
                authority,
                query: Some(query),
                ..
            }) => format!("{scheme}://{authority}/postgres?{query}"),
            Some(UrlParts {
                scheme, authority, ..
            }) => format!("{scheme}://{authority}/postgres"),
            None => self.database_url.clone(),
        }
    }
}
