// Application layer - Acquisition use cases and their scheduling
pub mod acquisition;
pub mod config_store;
pub mod controller;
pub mod reading_source;
pub mod scheduler;
pub mod simulator;

#[cfg(test)]
pub mod fakes;
