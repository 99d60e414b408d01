//! Alert classification and priority ranking

pub mod classifier;
pub mod ranking;

pub use classifier::{AlertCounts, AlertLevel, EntityAlertState, classify};
pub use ranking::{RankedEntity, rank};
