pub mod console;
pub mod router;
#[cfg(feature = "telegram")]
pub mod telegram;

pub use router::{Command, Reply};
