// src/lib.rs
//
// Core of the team absence calendar: date-grid arithmetic, the
// vacation-day ledger, the approval workflow and holiday
// reconciliation. Storage and transport adapters plug in through the
// traits in `store`.

pub mod calendar;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod holidays;
pub mod ledger;
pub mod mem_store;
pub mod models;
pub mod notify;
pub mod store;
pub mod workflow;

mod calendar_tests;
mod ledger_tests;

pub use config::Config;
pub use error::CoreError;
pub use export::SickDayExport;
pub use holidays::{HolidayApi, HolidayReconciler};
pub use ledger::VacationLedger;
pub use mem_store::MemStore;
pub use notify::Notifier;
pub use workflow::EventWorkflow;
