// ABOUTME: Environment-sourced configuration for the reconciliation job
// ABOUTME: Validated once at startup, reporting every missing variable at once

use anyhow::{bail, Result};

/// Warehouse endpoints listen on the fixed Redshift-style port.
pub const WAREHOUSE_PORT: u16 = 5439;

const DEFAULT_CRM_LOGIN_URL: &str = "https://login.salesforce.com";

/// CRM credentials: username/password/security-token login.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub username: String,
    pub password: String,
    pub security_token: String,
    /// Login endpoint origin. Overridable via SF_LOGIN_URL for sandboxes
    /// and test servers.
    pub login_url: String,
}

/// Warehouse connection parameters. TLS is always required.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

/// Full job configuration, passed explicitly into the pipeline entry point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination bucket for the mismatch file.
    pub bucket: String,
    /// Object key within the bucket, overwritten wholesale each run.
    pub output_key: String,
    pub crm: CrmConfig,
    pub warehouse: WarehouseConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails immediately with a single error listing every missing
    /// variable, rather than failing on first use.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut missing: Vec<&'static str> = Vec::new();
        let mut require = |key: &'static str| -> String {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let bucket = require("CSV_BUCKET");
        let output_key = require("OUTPUT_KEY");
        let username = require("SF_USERNAME");
        let password = require("SF_PASSWORD");
        let security_token = require("SF_TOKEN");
        let host = require("DB_HOST");
        let database = require("DB_NAME");
        let user = require("DB_USER");
        let db_password = require("DB_PASSWORD");

        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let login_url = lookup("SF_LOGIN_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CRM_LOGIN_URL.to_string());

        Ok(Self {
            bucket,
            output_key,
            crm: CrmConfig {
                username,
                password,
                security_token,
                login_url,
            },
            warehouse: WarehouseConfig {
                host,
                port: WAREHOUSE_PORT,
                database,
                user,
                password: db_password,
            },
        })
    }

    /// Destination location in s3://bucket/key form.
    pub fn output_location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.output_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CSV_BUCKET", "reports"),
            ("OUTPUT_KEY", "mismatches.csv"),
            ("SF_USERNAME", "svc@example.com"),
            ("SF_PASSWORD", "hunter2"),
            ("SF_TOKEN", "token123"),
            ("DB_HOST", "warehouse.example.com"),
            ("DB_NAME", "analytics"),
            ("DB_USER", "readonly"),
            ("DB_PASSWORD", "secret"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_loads_complete_environment() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.bucket, "reports");
        assert_eq!(config.output_key, "mismatches.csv");
        assert_eq!(config.crm.username, "svc@example.com");
        assert_eq!(config.warehouse.port, WAREHOUSE_PORT);
        assert_eq!(config.crm.login_url, "https://login.salesforce.com");
        assert_eq!(config.output_location(), "s3://reports/mismatches.csv");
    }

    #[test]
    fn test_reports_all_missing_variables_at_once() {
        let mut env = full_env();
        env.remove("SF_PASSWORD");
        env.remove("DB_HOST");
        env.remove("OUTPUT_KEY");

        let err = load(&env).unwrap_err().to_string();
        assert!(err.contains("SF_PASSWORD"), "missing SF_PASSWORD in: {err}");
        assert!(err.contains("DB_HOST"), "missing DB_HOST in: {err}");
        assert!(err.contains("OUTPUT_KEY"), "missing OUTPUT_KEY in: {err}");
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("CSV_BUCKET", "   ");

        let err = load(&env).unwrap_err().to_string();
        assert!(err.contains("CSV_BUCKET"));
    }

    #[test]
    fn test_login_url_override() {
        let mut env = full_env();
        env.insert("SF_LOGIN_URL", "https://test.salesforce.com");

        let config = load(&env).unwrap();
        assert_eq!(config.crm.login_url, "https://test.salesforce.com");
    }
}
