use crate::utils::auth::AuthGate;
use crate::utils::report::ReportEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub reports: Arc<ReportEngine>,
}
