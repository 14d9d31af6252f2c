use std::path::PathBuf;

/// `USAGE_LEDGER_PATH` when set, otherwise `~/.openclaw/usage-ledger.jsonl`.
pub fn default_log_path() -> PathBuf {
    if let Some(path) = std::env::var_os("USAGE_LEDGER_PATH").filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".openclaw").join("usage-ledger.jsonl");
    }
    PathBuf::from("usage-ledger.jsonl")
}
