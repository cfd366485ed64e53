pub mod app;
pub mod health;
pub mod metrics;
pub mod predict;
