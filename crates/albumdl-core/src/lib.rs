pub mod batch;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod input;
pub mod logging;
pub mod lookup;
pub mod oracle;
pub mod report;
pub mod resolver;
pub mod retry;
