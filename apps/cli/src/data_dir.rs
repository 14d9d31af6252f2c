use std::path::PathBuf;

use ledger_app::startup::DB_FILE_NAME;

const DATA_DIR_NAME: &str = "usage-ledger";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

/// Picks the data dir: an explicit override, then the platform data dir
/// (`$XDG_DATA_HOME` or `~/.local/share` on Linux).
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<DataDirResolution, String> {
    let dir = match explicit {
        Some(dir) => dir,
        None => default_base()?.join(DATA_DIR_NAME),
    };
    let matched_existing = dir.join(DB_FILE_NAME).exists();
    Ok(DataDirResolution {
        dir,
        matched_existing,
    })
}

fn default_base() -> Result<PathBuf, String> {
    dirs::data_dir().ok_or_else(|| "cannot determine data directory".to_string())
}
