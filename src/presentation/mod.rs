// Presentation layer - HTTP handlers and the interactive chart
pub mod app_state;
pub mod chart;
pub mod handlers;
