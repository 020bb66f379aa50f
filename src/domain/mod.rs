mod classifier;
mod ledger;
mod money;
mod transaction;

pub use classifier::*;
pub use ledger::*;
pub use money::*;
pub use transaction::*;
