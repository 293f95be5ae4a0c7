// Application state for HTTP handlers
use crate::application::controller::ControllerHandle;
use crate::presentation::chart::session::ChartSession;
use std::sync::Mutex;

pub struct AppState {
    pub controller: ControllerHandle,
    /// Only ever locked synchronously, never across an await.
    pub chart: Mutex<ChartSession>,
    pub chart_color: String,
}

impl AppState {
    pub fn new(controller: ControllerHandle, chart_color: String) -> Self {
        Self {
            controller,
            chart: Mutex::new(ChartSession::default()),
            chart_color,
        }
    }
}
