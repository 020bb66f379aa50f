// Application layer: use cases on top of the repository.
// Clients (CLI, chat bot, exporters) go through LedgerService only.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
