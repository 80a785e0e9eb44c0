use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, ensure_dir},
    errors::{FinanceError, Result},
    ledger::Book,
};

use super::StorageBackend;

const BOOK_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-backed persistence: one pretty-printed JSON document per book under
/// the data directory, with timestamped backup snapshots beside it.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&app_root)?;
        let books_dir = app_root.join(BOOK_DIR);
        let backups_dir = app_root.join(BACKUP_DIR);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            books_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir.join(format!("{}.json", canonical_name(name)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn write_backup_file(&self, book: &Book, name: &str, note: Option<&str>) -> Result<()> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let mut file_stem = format!("{}_{}", canonical_name(name), backup_timestamp());
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        let json = serde_json::to_string_pretty(book)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let backup_name = format!(
            "{}_{}.{}",
            canonical_name(name),
            backup_timestamp(),
            BACKUP_EXTENSION
        );
        let backup_path = dir.join(&backup_name);
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for stale in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(name, stale));
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &Book, name: &str) -> Result<()> {
        let path = self.book_path(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        if path.exists() {
            self.backup_existing_file(name, &path)?;
        }
        let json = serde_json::to_string_pretty(book)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Book> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(FinanceError::Storage(format!(
                "book `{}` not found under {}",
                name,
                self.books_dir.display()
            )));
        }
        load_book_from_path(&path)
    }

    fn list_books(&self) -> Result<Vec<String>> {
        if !self.books_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup(&self, book: &Book, name: &str, note: Option<&str>) -> Result<()> {
        self.write_backup_file(book, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Book> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(FinanceError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.book_path(name);
        fs::copy(&backup_path, &target)?;
        load_book_from_path(&target)
    }
}

pub fn save_book_to_path(book: &Book, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_book_from_path(path: &Path) -> Result<Book> {
    let data = fs::read_to_string(path)?;
    let book: Book = serde_json::from_str(&data)?;
    Ok(book)
}

/// Referential-integrity sweep over a loaded document. Warnings are advisory;
/// loading never fails on them.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let account_ids: HashSet<_> = book.accounts.iter().map(|a| a.id).collect();
    let card_ids: HashSet<_> = book.cards.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    for tx in &book.transactions {
        match (tx.account_id, tx.card_id) {
            (Some(account), None) => {
                if !account_ids.contains(&account) {
                    warnings.push(format!(
                        "transaction {} references unknown account {}",
                        tx.id, account
                    ));
                }
            }
            (None, Some(card)) => {
                if !card_ids.contains(&card) {
                    warnings.push(format!(
                        "transaction {} references unknown card {}",
                        tx.id, card
                    ));
                }
            }
            _ => warnings.push(format!(
                "transaction {} has an ambiguous funding source",
                tx.id
            )),
        }
    }

    for card in &book.cards {
        if let Some(account) = card.account_id {
            if !account_ids.contains(&account) {
                warnings.push(format!(
                    "card {} settles into unknown account {}",
                    card.id, account
                ));
            }
        }
    }

    let mut seen = HashSet::new();
    for invoice in &book.invoices {
        if !card_ids.contains(&invoice.card_id) {
            warnings.push(format!(
                "invoice {} references unknown card {}",
                invoice.id, invoice.card_id
            ));
        }
        if !seen.insert((invoice.card_id, invoice.period)) {
            warnings.push(format!(
                "duplicate invoice for card {} period {}",
                invoice.card_id, invoice.period
            ));
        }
    }

    warnings
}

fn canonical_name(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if slug.trim_matches('_').is_empty() {
        "book".into()
    } else {
        slug
    }
}

/// Lowercases a note into a dash-separated label; returns `None` when
/// nothing printable survives.
fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
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

/// Digs the `YYYYMMDD_HHMM` pair out of a backup file name. The pair may be
/// followed by a sanitized note segment, and the book slug before it may
/// itself contain underscores, so the scan keeps the last matching pair.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    let mut raw = None;
    for pair in parts.windows(2) {
        if is_digits(pair[0], 8) && is_digits(pair[1], 4) {
            raw = Some(format!("{}{}", pair[0], pair[1]));
        }
    }
    NaiveDateTime::parse_from_str(&raw?, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn backup_timestamp() -> String {
    Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
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
