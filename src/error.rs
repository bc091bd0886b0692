use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for permigrate
#[derive(Error, Debug)]
pub enum MigrateError {
    // Catalog Inspection Errors
    #[error("Catalog query failed: {message}")]
    Query {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    // Dependency Resolution Errors
    #[error("Foreign key {from_table}.{from_column} references {to_table}.{to_column}, which is outside the inspected table set")]
    DanglingReference {
        from_table: String,
        from_column: String,
        to_table: String,
        to_column: String,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency {
        cycle: Vec<String>,
    },

    // Database Connection Errors
    #[error("Failed to connect to database: {message}")]
    DatabaseConnection {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Gave up connecting after {attempts} attempts ({elapsed:?}): {last_error}")]
    ConnectTimeout {
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    // File System Errors
    #[error("Failed to write {path}: {message}")]
    FileWrite {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad {
        path: PathBuf,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

impl From<tokio_postgres::Error> for MigrateError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() || err.to_string().contains("connect") {
            MigrateError::DatabaseConnection {
                message: err.to_string(),
                source: err,
            }
        } else {
            MigrateError::Query {
                message: describe_postgres_error(&err),
                source: err,
            }
        }
    }
}

impl From<serde_json::Error> for MigrateError {
    fn from(err: serde_json::Error) -> Self {
        MigrateError::Other(format!("Failed to serialize report: {}", err))
    }
}

/// Result type alias for permigrate operations
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Wrap a driver error raised while reading catalog metadata
    pub fn query(context: &str, err: tokio_postgres::Error) -> Self {
        MigrateError::Query {
            message: format!("{}: {}", context, describe_postgres_error(&err)),
            source: err,
        }
    }
}

/// Prefer the server's message over the driver's generic "db error"
fn describe_postgres_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db_err) => match db_err.hint() {
            Some(hint) => format!("{} ({}; hint: {})", db_err.message(), db_err.code().code(), hint),
            None => format!("{} ({})", db_err.message(), db_err.code().code()),
        },
        None => err.to_string(),
    }
}

/// Helper function to format error with all its causes
pub fn format_error_chain(err: &MigrateError) -> String {
    use std::error::Error;

    let mut output = format!("Error: {}", err);

    let mut current_err: &dyn Error = err;
    while let Some(source) = current_err.source() {
        output.push_str(&format!("\n  Caused by: {}", source));
        current_err = source;
    }

    output
}

/// Helper function to suggest fixes for common errors
pub fn suggest_fix(err: &MigrateError) -> Option<String> {
    match err {
        MigrateError::DatabaseConnection { .. } | MigrateError::ConnectTimeout { .. } => Some(
            "Suggestions:\n\
             - Check if PostgreSQL is running\n\
             - Verify the connection string is correct\n\
             - Ensure the database exists and you have permission to access it\n\
             - Try: psql <your-connection-string> to test the connection".to_string()
        ),
        MigrateError::InvalidConnectionString(_) => Some(
            "Connection string should be in format:\n\
             postgres://[user[:password]@][host][:port][/dbname][?param1=value1&...]".to_string()
        ),
        MigrateError::Query { .. } => Some(
            "Suggestions:\n\
             - Ensure the connecting role can read pg_catalog for the inspected schema\n\
             - Check that the schema name is spelled correctly".to_string()
        ),
        MigrateError::DanglingReference { to_table, .. } => Some(
            format!("Table '{}' is referenced but was not inspected.\n\
                    - Include the schema that owns '{}'\n\
                    - Or rerun with --skip-dangling to ignore the edge", to_table, to_table)
        ),
        MigrateError::CyclicDependency { cycle } => Some(
            format!("No insertion order exists for: {}\n\
                    - Break the cycle with a deferrable constraint\n\
                    - Or load one of the tables in two passes (insert, then update the foreign key)",
                    cycle.join(" -> "))
        ),
        MigrateError::Configuration(_) => Some(
            "Run `permigrate init` to generate permigrate.toml.example".to_string()
        ),
        _ => None,
    }
}
