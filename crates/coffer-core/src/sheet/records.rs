//! Row types for the two sheets the pipeline reads.
//!
//! Column names follow the game's sheet schema (`PascalCase`). Flag columns
//! are stored as signed bytes in the game files and as booleans by some
//! exporters, so both forms are accepted.

use super::SheetRow;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// A flag column value: either a JSON boolean or an integer where non-zero
/// means set.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Flag::deserialize(deserializer).map(bool::from)
}

fn class_jobs<'de, D>(deserializer: D) -> std::result::Result<ClassJobCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Flag>::deserialize(deserializer)?;
    let jobs = raw
        .into_iter()
        .map(|(abbr, flag)| (abbr.to_ascii_uppercase(), bool::from(flag)))
        .collect();
    Ok(ClassJobCategory { jobs })
}

/// Row of the `Item` sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// Unique row id
    pub row_id: u32,
    /// Display name in the loaded language
    #[serde(default)]
    pub name: String,
    /// Item level (row id into the `ItemLevel` sheet)
    #[serde(default)]
    pub level_item: u32,
    /// Slots the item can be equipped in
    #[serde(default)]
    pub equip_slot_category: EquipSlotCategory,
    /// Classes and jobs that can use the item
    #[serde(default, deserialize_with = "class_jobs")]
    pub class_job_category: ClassJobCategory,
}

impl SheetRow for Item {
    const NAME: &'static str = "Item";

    fn row_id(&self) -> u32 {
        self.row_id
    }
}

/// Equip slot flags of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EquipSlotCategory {
    /// Main hand weapon or tool
    #[serde(deserialize_with = "flag")]
    pub main_hand: bool,
    /// Off hand weapon, shield or tool
    #[serde(deserialize_with = "flag")]
    pub off_hand: bool,
    /// Head
    #[serde(deserialize_with = "flag")]
    pub head: bool,
    /// Body
    #[serde(deserialize_with = "flag")]
    pub body: bool,
    /// Hands
    #[serde(deserialize_with = "flag")]
    pub gloves: bool,
    /// Legs
    #[serde(deserialize_with = "flag")]
    pub legs: bool,
    /// Feet
    #[serde(deserialize_with = "flag")]
    pub feet: bool,
    /// Earrings
    #[serde(deserialize_with = "flag")]
    pub ears: bool,
    /// Necklace
    #[serde(deserialize_with = "flag")]
    pub neck: bool,
    /// Bracelets
    #[serde(deserialize_with = "flag")]
    pub wrists: bool,
    /// Left ring
    #[serde(deserialize_with = "flag", rename = "FingerL")]
    pub finger_l: bool,
    /// Right ring
    #[serde(deserialize_with = "flag", rename = "FingerR")]
    pub finger_r: bool,
}

/// Crafting and gathering classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassJob {
    /// Carpenter
    Carpenter,
    /// Blacksmith
    Blacksmith,
    /// Armorer
    Armorer,
    /// Goldsmith
    Goldsmith,
    /// Leatherworker
    Leatherworker,
    /// Weaver
    Weaver,
    /// Alchemist
    Alchemist,
    /// Culinarian
    Culinarian,
    /// Miner
    Miner,
    /// Botanist
    Botanist,
    /// Fisher
    Fisher,
}

impl ClassJob {
    /// Every crafting and gathering class, in game order
    pub const ALL: [ClassJob; 11] = [
        ClassJob::Carpenter,
        ClassJob::Blacksmith,
        ClassJob::Armorer,
        ClassJob::Goldsmith,
        ClassJob::Leatherworker,
        ClassJob::Weaver,
        ClassJob::Alchemist,
        ClassJob::Culinarian,
        ClassJob::Miner,
        ClassJob::Botanist,
        ClassJob::Fisher,
    ];

    /// Column name of this class in the `ClassJobCategory` sheet
    pub fn abbreviation(self) -> &'static str {
        match self {
            ClassJob::Carpenter => "CRP",
            ClassJob::Blacksmith => "BSM",
            ClassJob::Armorer => "ARM",
            ClassJob::Goldsmith => "GSM",
            ClassJob::Leatherworker => "LTW",
            ClassJob::Weaver => "WVR",
            ClassJob::Alchemist => "ALC",
            ClassJob::Culinarian => "CUL",
            ClassJob::Miner => "MIN",
            ClassJob::Botanist => "BTN",
            ClassJob::Fisher => "FSH",
        }
    }
}

impl fmt::Display for ClassJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Set of classes and jobs allowed to use an item, keyed by abbreviation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassJobCategory {
    jobs: BTreeMap<String, bool>,
}

impl ClassJobCategory {
    /// Builds a category with the given abbreviations set
    pub fn from_abbreviations<'a>(abbreviations: impl IntoIterator<Item = &'a str>) -> Self {
        let jobs = abbreviations
            .into_iter()
            .map(|abbr| (abbr.to_ascii_uppercase(), true))
            .collect();
        Self { jobs }
    }

    /// Returns true if the flag for `abbreviation` is set
    pub fn allows(&self, abbreviation: &str) -> bool {
        self.jobs
            .get(&abbreviation.to_ascii_uppercase())
            .copied()
            .unwrap_or(false)
    }

    /// Returns true if `job` may use the item
    pub fn contains(&self, job: ClassJob) -> bool {
        self.allows(job.abbreviation())
    }
}

/// Row of the `Recipe` sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recipe {
    /// Unique row id
    pub row_id: u32,
    /// Row id of the produced item (0 for empty rows)
    #[serde(default)]
    pub item_result: u32,
    /// Master recipe book required to learn the recipe
    #[serde(default)]
    pub secret_recipe_book: Option<u32>,
    /// Difficulty row of the recipe
    #[serde(default)]
    pub recipe_level_table: Option<RecipeLevel>,
}

impl Recipe {
    /// True if the recipe needs a master book and carries difficulty stars
    pub fn is_master_starred(&self) -> bool {
        let book = self.secret_recipe_book.is_some_and(|id| id > 0);
        let stars = self
            .recipe_level_table
            .as_ref()
            .is_some_and(|level| level.stars > 0);
        book && stars
    }
}

impl SheetRow for Recipe {
    const NAME: &'static str = "Recipe";

    fn row_id(&self) -> u32 {
        self.row_id
    }
}

/// Row of the `RecipeLevelTable` sheet, embedded in its recipe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecipeLevel {
    /// Row id in `RecipeLevelTable`
    #[serde(default)]
    pub row_id: u32,
    /// Difficulty tier
    #[serde(default)]
    pub stars: u8,
}
