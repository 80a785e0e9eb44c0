use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, ensure_dir},
    errors::{FinanceError, Result},
};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_book: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            last_opened_book: None,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(app_data_dir())
    }

    #[cfg(test)]
    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let config_root = base.join(CONFIG_DIR);
        ensure_dir(&config_root)?;
        let backups_dir = config_root.join(BACKUP_DIR);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: config_root.join(CONFIG_FILE),
            backups_dir,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let mut name = format!("config_{}", Utc::now().format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{}", BACKUP_EXTENSION));
        let path = self.backups_dir.join(&name);
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&path, &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(FinanceError::Storage(format!(
                "configuration backup `{}` not found",
                backup_name
            )));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| parse_timestamp(b).cmp(&parse_timestamp(a)));
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut label = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            label.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '.')
            && !label.is_empty()
            && !label.ends_with('-')
        {
            label.push('-');
        }
    }
    let label = label.trim_matches('-');
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Digs the `YYYYMMDD_HHMM` pair out of a backup file name; a note segment
/// may follow the pair, so the scan keeps the last match.
fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let segments: Vec<&str> = trimmed.split('_').collect();
    let mut raw = None;
    for pair in segments.windows(2) {
        if is_digits(pair[0], 8) && is_digits(pair[1], 4) {
            raw = Some(format!("{}{}", pair[0], pair[1]));
        }
    }
    chrono::NaiveDateTime::parse_from_str(&raw?, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => path.with_extension(format!("{existing}.{TMP_SUFFIX}")),
        None => path.with_extension(TMP_SUFFIX),
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager() -> (TempDir, ConfigManager) {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, manager)
    }

    #[test]
    fn load_returns_defaults_when_file_missing() {
        let (_dir, manager) = manager();
        let config = manager.load().unwrap();
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.currency, "USD");
        assert!(config.last_opened_book.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, manager) = manager();
        let mut config = Config::default();
        config.currency = "BRL".into();
        config.last_opened_book = Some("household".into());
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "BRL");
        assert_eq!(loaded.last_opened_book.as_deref(), Some("household"));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let (_dir, manager) = manager();
        manager.save(&Config::default()).unwrap();
        let tmp = tmp_path(manager.path());
        assert!(manager.path().exists());
        assert!(!tmp.exists());
    }

    #[test]
    fn backup_and_restore_round_trip() {
        let (_dir, manager) = manager();
        let mut config = Config::default();
        config.locale = "pt-BR".into();
        let name = manager.backup(&config, Some("before migration")).unwrap();
        assert!(name.contains("before-migration"));
        assert!(manager.list_backups().unwrap().contains(&name));

        let restored = manager.restore(&name).unwrap();
        assert_eq!(restored.locale, "pt-BR");
    }

    #[test]
    fn restore_unknown_backup_fails() {
        let (_dir, manager) = manager();
        assert!(matches!(
            manager.restore("config_19990101_0000.json"),
            Err(FinanceError::Storage(_))
        ));
    }

    #[test]
    fn list_backups_ignores_foreign_files() {
        let (_dir, manager) = manager();
        manager.backup(&Config::default(), None).unwrap();
        fs::write(manager.backups_dir.join("notes.txt"), "ignored").unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].starts_with("config_"));
    }
}
