mod holding;
mod ledger;
mod portfolio;

pub use holding::*;
pub use ledger::*;
pub use portfolio::*;
