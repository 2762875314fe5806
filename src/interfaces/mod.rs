pub mod ai_provider;
pub mod clock;
pub mod ledger;
