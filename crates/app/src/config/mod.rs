use serde::{Deserialize, Serialize};

/// Date selection as sent by the dashboard date picker.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    /// Preset name: `all`, `7d`, `14d` or `30d`.
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query string of a stats request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub bust: bool,
}

impl StatsParams {
    pub fn range_params(&self) -> RangeParams {
        RangeParams {
            range: self.range.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}
