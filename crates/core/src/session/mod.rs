//! View state: what a page shows for the selected ticker, kept consistent
//! when requests overlap.

pub mod dashboard;
pub mod slot;

pub use dashboard::{Dashboard, DashboardSnapshot};
pub use slot::{FetchState, RequestSlot, RequestToken};
