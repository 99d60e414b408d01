//! Route handlers

pub mod entities;
pub mod health;
pub mod history;
pub mod polling;
pub mod thresholds;
