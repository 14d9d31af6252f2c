use ledger_app::AppState;

#[derive(Clone)]
pub struct HttpState {
    pub app_state: AppState,
}

impl HttpState {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }
}
