pub mod contract;
pub mod insights;
pub mod price;
pub mod ticker;
