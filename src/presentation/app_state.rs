// Application state for HTTP handlers
use crate::application::analysis_service::AnalysisService;
use crate::application::overview_service::OverviewService;
use crate::application::sensor_service::SensorService;

#[derive(Clone)]
pub struct AppState {
    pub sensor_service: SensorService,
    pub analysis_service: AnalysisService,
    pub overview_service: OverviewService,
}
