pub mod ledger;
pub mod lifecycle;
pub mod slots;
