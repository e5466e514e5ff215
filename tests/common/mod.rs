use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// A complete configuration with every service pointed at `base_url`
#[allow(dead_code)]
pub fn service_config(base_url: &str) -> String {
    format!(
        "chat:\n  api_url: {base}\n  token: bot-token\n  room_name: HotSpot-Connect\n\
         network_controller:\n  api_url: {base}/api/v1\n  username: admin\n  password: pass\n\
         location:\n  api_url: {base}/\n  username: ops\n  password: secret\n\
         infrastructure:\n  api_url: {base}\n  username: ops\n  password: secret\n\
         logging:\n  level: warn\n",
        base = base_url
    )
}
