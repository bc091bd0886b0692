pub mod connection;

pub use connection::{DatabaseConfig, connect, connect_with_retry, check_connection};
