use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub activation_url: Option<String>,
    pub employees_url: Option<String>,
    #[serde(alias = "add_url")]
    pub add_employee_url: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub page_size: Option<usize>,
    #[serde(alias = "threshold")]
    pub search_threshold: Option<f64>,
    pub refresh_interval: Option<u64>,
    pub no_color: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub map_output: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".staffscope").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# staffscope config
#
# Location (default):
#   ~/.staffscope/config.yml

# API
base_url: https://api.findofficers.com/hiring_test/
# Override single endpoints if they do not share a base:
# activation_url: https://api.findofficers.com/hiring_test/get_activation_code
# employees_url: https://api.findofficers.com/hiring_test/get_all_employee
# add_employee_url: https://api.findofficers.com/hiring_test/add_employee

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Table
page_size: 20
# 0.0 only accepts exact substrings, 1.0 accepts anything.
search_threshold: 0.3

# Map
refresh_interval: 30
map_output: ./employees-map.html

# Output (optional)
# output: ./employees.json
# output_format: json

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
