//! Background network work: one-shot fetches and import status polling.

pub mod fetch_worker;
pub mod import_poller;

pub use fetch_worker::{FetchOutcome, FetchWorker};
pub use import_poller::{ImportPoller, PollEvent};
