//! API key lookup
//!
//! The key comes from the environment first, then from `<dir>/.env`.
//! Absence is reported as `None` so it can be detected before any request.

use std::fs;
use std::path::Path;

pub fn load_api_key(env_var: &str, dir: &Path) -> Option<String> {
    if let Ok(key) = std::env::var(env_var)
        && !key.trim().is_empty()
    {
        return Some(key.trim().to_string());
    }

    let env_file = dir.join(".env");
    let content = match fs::read_to_string(&env_file) {
        Ok(content) => content,
        Err(_) => {
            log::debug!("No {} in environment or {}", env_var, env_file.display());
            return None;
        }
    };

    find_in_dotenv(&content, env_var)
}

fn find_in_dotenv(content: &str, env_var: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=')
            && key.trim() == env_var
        {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}
