// Domain layer - Plain data and the rules that govern it
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod reading;
pub mod statistics;
pub mod window;
