pub mod badge;
pub mod ledger;
pub mod level;
