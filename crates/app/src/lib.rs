pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use cache::{DEFAULT_CACHE_TTL, MemoryCache, ResponseCache};
pub use config::{RangeParams, StatsParams};
pub use error::{ApiError, AppError, Result};
pub use query::StatsQuery;
pub use services::AppServices;
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{parse_date, resolve_range};
