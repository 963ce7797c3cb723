pub mod access;
pub mod airlines;
pub mod app;
pub mod config;
pub mod errors;
pub mod events;
pub mod flights;
pub mod insurance;
pub mod oracles;
pub mod types;
pub mod utils;

// Re-export the types most callers need
pub use app::SuretyApp;
pub use config::{ConfigError, SuretyConfig};
pub use errors::SuretyError;
pub use events::SuretyEvent;
pub use flights::FlightStatus;
pub use insurance::{LedgerPayments, PaymentHandler};
pub use oracles::worker::OracleWorker;
pub use oracles::SubmissionOutcome;
pub use types::{AccountId, FlightKey};
