//! Loading typed sheets from an exported game data directory.
//!
//! Each sheet is a JSON array of rows stored as `<Sheet>.<lang>.json` (or
//! `<Sheet>.json` for language-neutral exports) somewhere below the sheet
//! directory. A file may carry a `<file>.b3` sidecar holding the BLAKE3 hex
//! digest of its contents, which is verified on load.
//!
//! ```no_run
//! use coffer_core::sheet::{GameData, GameDataOptions};
//!
//! let game_data = GameData::open("/games/ffxiv", GameDataOptions::default())?;
//! let (items, recipes) = game_data.load_tables()?;
//! println!("{} items, {} recipes", items.len(), recipes.len());
//! # Ok::<(), coffer_core::Error>(())
//! ```

mod records;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

pub use records::{ClassJob, ClassJobCategory, EquipSlotCategory, Item, Recipe, RecipeLevel};

/// Directory below the data root that holds the exported sheets, if present
const SHEET_SUBDIR: &str = "game/sheets";

/// How deep below the sheet directory sheet files are searched for
const MAX_SEARCH_DEPTH: usize = 3;

/// Extension of checksum sidecar files
const CHECKSUM_EXTENSION: &str = "b3";

/// A row type that can be loaded from a sheet file
pub trait SheetRow: DeserializeOwned + Send {
    /// Sheet name, which is also the file stem of the exported sheet
    const NAME: &'static str;

    /// Row id of this row
    fn row_id(&self) -> u32;
}

/// An ordered, indexed table of rows
#[derive(Debug, Clone)]
pub struct Sheet<T> {
    rows: Vec<T>,
    index: HashMap<u32, usize>,
}

impl<T: SheetRow> Sheet<T> {
    /// Builds a sheet from rows in table order.
    ///
    /// When two rows share an id, lookups return the first one; iteration
    /// still yields both.
    pub fn from_rows(rows: Vec<T>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            index.entry(row.row_id()).or_insert(position);
        }
        Self { rows, index }
    }

    /// Looks up a row by id
    pub fn get_row(&self, row_id: u32) -> Option<&T> {
        self.index.get(&row_id).map(|&position| &self.rows[position])
    }

    /// Looks up a row by id, failing with [`Error::MissingRow`]
    pub fn row(&self, row_id: u32) -> Result<&T> {
        self.get_row(row_id)
            .ok_or_else(|| Error::missing_row(T::NAME, row_id))
    }

    /// Iterates rows in table order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the sheet has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Sheet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Language of the text columns to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Japanese
    Japanese,
    /// German
    German,
    /// French
    French,
}

impl Language {
    /// File name suffix used by exported sheets
    pub fn suffix(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
            Language::German => "de",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ja" | "japanese" => Ok(Language::Japanese),
            "de" | "german" => Ok(Language::German),
            "fr" | "french" => Ok(Language::French),
            other => Err(Error::internal(format!("unknown language: '{}'", other))),
        }
    }
}

/// Options for opening game data
#[derive(Debug, Clone)]
pub struct GameDataOptions {
    /// Load the item and recipe sheets on separate threads
    pub load_multithreaded: bool,
    /// Keep raw sheet bytes in memory after the first read
    pub cache_file_resources: bool,
    /// Treat a checksum mismatch as a fatal error instead of a warning
    pub panic_on_checksum_mismatch: bool,
    /// Language of text columns
    pub language: Language,
}

impl Default for GameDataOptions {
    fn default() -> Self {
        Self {
            load_multithreaded: true,
            cache_file_resources: true,
            panic_on_checksum_mismatch: true,
            language: Language::English,
        }
    }
}

impl GameDataOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether sheets are loaded concurrently
    pub fn load_multithreaded(mut self, enabled: bool) -> Self {
        self.load_multithreaded = enabled;
        self
    }

    /// Sets whether raw sheet bytes are cached
    pub fn cache_file_resources(mut self, enabled: bool) -> Self {
        self.cache_file_resources = enabled;
        self
    }

    /// Sets whether a checksum mismatch aborts loading
    pub fn panic_on_checksum_mismatch(mut self, enabled: bool) -> Self {
        self.panic_on_checksum_mismatch = enabled;
        self
    }

    /// Sets the language of text columns
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Handle to an exported game data directory
#[derive(Debug)]
pub struct GameData {
    data_path: PathBuf,
    options: GameDataOptions,
    cache: Mutex<HashMap<PathBuf, Arc<[u8]>>>,
}

impl GameData {
    /// Opens the game data below `root`.
    ///
    /// Sheets are read from `<root>/game/sheets` when that directory exists,
    /// otherwise from `root` itself.
    pub fn open(root: impl AsRef<Path>, options: GameDataOptions) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::data_root_not_found(root));
        }

        let nested = root.join(SHEET_SUBDIR);
        let data_path = if nested.is_dir() {
            nested
        } else {
            root.to_path_buf()
        };
        debug!("Using sheet directory {}", data_path.display());

        Ok(Self {
            data_path,
            options,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Directory sheets are read from
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Options this handle was opened with
    pub fn options(&self) -> &GameDataOptions {
        &self.options
    }

    /// Loads the item and recipe sheets
    pub fn load_tables(&self) -> Result<(Sheet<Item>, Sheet<Recipe>)> {
        if !self.options.load_multithreaded {
            return Ok((self.sheet()?, self.sheet()?));
        }

        std::thread::scope(|scope| -> Result<_> {
            let items = scope.spawn(|| self.sheet::<Item>());
            let recipes = self.sheet::<Recipe>();
            let items = items
                .join()
                .map_err(|_| Error::internal("item sheet loader panicked"))?;
            Ok((items?, recipes?))
        })
    }

    /// Loads one sheet
    pub fn sheet<T: SheetRow>(&self) -> Result<Sheet<T>> {
        let path = self.locate(T::NAME)?;
        let bytes = self.read_file(&path)?;
        self.verify_checksum(&path, &bytes)?;

        let rows: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| Error::sheet_parse(&path, e))?;
        debug!("Loaded {} rows from {}", rows.len(), path.display());

        Ok(Sheet::from_rows(rows))
    }

    /// Finds the file for `sheet`, preferring the configured language
    fn locate(&self, sheet: &'static str) -> Result<PathBuf> {
        let localized = format!("{}.{}.json", sheet, self.options.language.suffix());
        let neutral = format!("{}.json", sheet);

        let mut fallback = None;
        for entry in WalkDir::new(&self.data_path)
            .max_depth(MAX_SEARCH_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };

            if name.eq_ignore_ascii_case(&localized) {
                trace!("Found {} at {}", sheet, entry.path().display());
                return Ok(entry.into_path());
            }
            if fallback.is_none() && name.eq_ignore_ascii_case(&neutral) {
                fallback = Some(entry.into_path());
            }
        }

        fallback.ok_or_else(|| Error::sheet_not_found(sheet, &self.data_path))
    }

    fn read_file(&self, path: &Path) -> Result<Arc<[u8]>> {
        if !self.options.cache_file_resources {
            return read_bytes(path);
        }

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::internal("sheet cache lock poisoned"))?;
        if let Some(bytes) = cache.get(path) {
            trace!("Cache hit for {}", path.display());
            return Ok(Arc::clone(bytes));
        }

        let bytes = read_bytes(path)?;
        cache.insert(path.to_path_buf(), Arc::clone(&bytes));
        Ok(bytes)
    }

    fn verify_checksum(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let sidecar = checksum_path(path);
        if !sidecar.is_file() {
            return Ok(());
        }

        let expected = std::fs::read_to_string(&sidecar)
            .map_err(|e| Error::file_read(&sidecar, e))?
            .trim()
            .to_ascii_lowercase();
        let actual = blake3::hash(bytes).to_hex().to_string();

        if expected == actual {
            trace!("Checksum ok for {}", path.display());
            return Ok(());
        }

        if self.options.panic_on_checksum_mismatch {
            return Err(Error::checksum_mismatch(path, expected, actual));
        }
        warn!(
            "Checksum mismatch for {} (expected {}, found {}), continuing",
            path.display(),
            expected,
            actual
        );
        Ok(())
    }
}

fn read_bytes(path: &Path) -> Result<Arc<[u8]>> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|e| Error::file_read(path, e))
}

/// `Item.en.json` -> `Item.en.json.b3`
fn checksum_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(CHECKSUM_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const ITEMS: &str = r#"[
        { "RowId": 1, "Name": "Weathered Weapon Coffer (IL 50)" },
        { "RowId": 2, "Name": "Bronze Sword", "LevelItem": 50 }
    ]"#;

    const RECIPES: &str = r#"[
        { "RowId": 10, "ItemResult": 2 }
    ]"#;

    fn write_sheets(dir: &Path) {
        fs::write(dir.join("Item.en.json"), ITEMS).unwrap();
        fs::write(dir.join("Recipe.json"), RECIPES).unwrap();
    }

    #[test]
    fn test_sheet_first_row_wins() {
        let sheet = Sheet::from_rows(vec![
            Recipe {
                row_id: 1,
                item_result: 5,
                secret_recipe_book: None,
                recipe_level_table: None,
            },
            Recipe {
                row_id: 1,
                item_result: 6,
                secret_recipe_book: None,
                recipe_level_table: None,
            },
        ]);

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get_row(1).map(|r| r.item_result), Some(5));
        assert!(sheet.get_row(2).is_none());
        assert!(matches!(
            sheet.row(2),
            Err(Error::MissingRow { sheet: "Recipe", row_id: 2 })
        ));
    }

    #[test]
    fn test_open_missing_root() {
        let err = GameData::open("/definitely/not/here", GameDataOptions::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_open_prefers_nested_sheet_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("game").join("sheets");
        fs::create_dir_all(&nested).unwrap();

        let game_data = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        assert_eq!(game_data.data_path(), nested.as_path());
    }

    #[test]
    fn test_load_tables() {
        let temp_dir = TempDir::new().unwrap();
        write_sheets(temp_dir.path());

        for multithreaded in [true, false] {
            let options = GameDataOptions::new().load_multithreaded(multithreaded);
            let game_data = GameData::open(temp_dir.path(), options).unwrap();
            let (items, recipes) = game_data.load_tables().unwrap();

            assert_eq!(items.len(), 2);
            assert_eq!(recipes.len(), 1);
            assert_eq!(items.row(2).unwrap().name, "Bronze Sword");
        }
    }

    #[test]
    fn test_language_preference() {
        let temp_dir = TempDir::new().unwrap();
        write_sheets(temp_dir.path());
        let sub = temp_dir.path().join("de");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("Item.de.json"), r#"[{ "RowId": 2, "Name": "Bronzeschwert" }]"#)
            .unwrap();

        let options = GameDataOptions::new().language(Language::German);
        let game_data = GameData::open(temp_dir.path(), options).unwrap();
        let items = game_data.sheet::<Item>().unwrap();
        assert_eq!(items.row(2).unwrap().name, "Bronzeschwert");

        // No German recipe export, the neutral file is used
        let recipes = game_data.sheet::<Recipe>().unwrap();
        assert_eq!(recipes.len(), 1);
    }

    #[test]
    fn test_missing_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let game_data = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        let err = game_data.sheet::<Item>().unwrap_err();
        assert!(matches!(err, Error::SheetNotFound { sheet: "Item", .. }));
    }

    #[test]
    fn test_malformed_sheet() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Item.json"), "{ not json").unwrap();
        let game_data = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        assert!(matches!(
            game_data.sheet::<Item>(),
            Err(Error::SheetParse { .. })
        ));
    }

    #[test]
    fn test_checksum_verification() {
        let temp_dir = TempDir::new().unwrap();
        write_sheets(temp_dir.path());
        let item_path = temp_dir.path().join("Item.en.json");
        let sidecar = checksum_path(&item_path);

        let digest = blake3::hash(ITEMS.as_bytes()).to_hex().to_string();
        fs::write(&sidecar, format!("{}\n", digest.to_uppercase())).unwrap();
        let game_data = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        assert!(game_data.sheet::<Item>().is_ok());

        fs::write(&sidecar, "00").unwrap();
        let strict = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        assert!(matches!(
            strict.sheet::<Item>(),
            Err(Error::ChecksumMismatch { .. })
        ));

        let lenient = GameData::open(
            temp_dir.path(),
            GameDataOptions::new().panic_on_checksum_mismatch(false),
        )
        .unwrap();
        assert_eq!(lenient.sheet::<Item>().unwrap().len(), 2);
    }

    #[test]
    fn test_cached_bytes_survive_file_removal() {
        let temp_dir = TempDir::new().unwrap();
        write_sheets(temp_dir.path());
        let game_data = GameData::open(temp_dir.path(), GameDataOptions::default()).unwrap();
        let first = game_data.sheet::<Recipe>().unwrap();

        // locate() still needs the file, so truncate it instead of deleting
        fs::write(temp_dir.path().join("Recipe.json"), "").unwrap();
        let second = game_data.sheet::<Recipe>().unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_checksum_path() {
        assert_eq!(
            checksum_path(Path::new("/data/Item.en.json")),
            PathBuf::from("/data/Item.en.json.b3")
        );
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!("japanese".parse::<Language>().unwrap(), Language::Japanese);
        assert!("klingon".parse::<Language>().is_err());
    }
}
