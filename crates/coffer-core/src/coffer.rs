//! Recognising gear coffers by name.
//!
//! Single-slot coffers follow the naming scheme
//! `<Series> <Slot>[ Gear] Coffer (IL <level>)`, e.g.
//! `Weathered Weapon Coffer (IL 50)` or `Augmented Ironworks Hand Gear Coffer (IL 130)`.

use crate::sheet::{Item, Sheet};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Pattern matched against lowercased item names
const COFFER_PATTERN: &str =
    r"(.*) (weapon|head|chest|hand|leg|foot|earring|necklace|bracelet|ring)(| gear) coffer \(il ([0-9]+)\)";

/// Substring that marks any gear coffer in list mode (lowercased)
const COFFER_MARKER: &str = "coffer (il";

fn coffer_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(COFFER_PATTERN).expect("coffer pattern is valid"))
}

/// Equipment slot a coffer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Main or off hand weapon
    Weapon,
    /// Head
    Head,
    /// Body
    Body,
    /// Hands
    Hands,
    /// Legs
    Legs,
    /// Feet
    Feet,
    /// Earrings
    Earring,
    /// Necklace
    Neck,
    /// Bracelets
    Bracelet,
    /// Either ring
    Ring,
}

impl Slot {
    /// Every slot, in equipment order
    pub const ALL: [Slot; 10] = [
        Slot::Weapon,
        Slot::Head,
        Slot::Body,
        Slot::Hands,
        Slot::Legs,
        Slot::Feet,
        Slot::Earring,
        Slot::Neck,
        Slot::Bracelet,
        Slot::Ring,
    ];

    /// Maps a slot word from a coffer name to its slot
    pub fn from_token(token: &str) -> Option<Slot> {
        match token.to_ascii_lowercase().as_str() {
            "weapon" => Some(Slot::Weapon),
            "head" => Some(Slot::Head),
            "chest" => Some(Slot::Body),
            "hand" => Some(Slot::Hands),
            "leg" => Some(Slot::Legs),
            "foot" => Some(Slot::Feet),
            "earring" => Some(Slot::Earring),
            "necklace" => Some(Slot::Neck),
            "bracelet" => Some(Slot::Bracelet),
            "ring" => Some(Slot::Ring),
            _ => None,
        }
    }

    /// Name of the slot as written to reports
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Weapon => "Weapon",
            Slot::Head => "Head",
            Slot::Body => "Body",
            Slot::Hands => "Hands",
            Slot::Legs => "Legs",
            Slot::Feet => "Feet",
            Slot::Earring => "Earring",
            Slot::Neck => "Neck",
            Slot::Bracelet => "Bracelet",
            Slot::Ring => "Ring",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from a coffer name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CofferMatch {
    /// Lowercased series prefix, e.g. `weathered`
    pub series_name: String,
    /// Slot the coffer is for
    pub equip_slot: Slot,
    /// Item level of the contents
    pub item_level: u32,
}

/// Classifies a single item name.
///
/// Returns `None` for names that are not single-slot coffers. Also returns
/// `None` (with a warning) when the item level does not fit in a `u32`.
///
/// # Panics
///
/// Panics if the pattern captures a slot word [`Slot::from_token`] does not
/// know, which means the two have drifted apart.
pub fn classify_name(name: &str) -> Option<CofferMatch> {
    let lowered = name.to_lowercase();
    let captures = coffer_regex().captures(&lowered)?;

    let token = &captures[2];
    let equip_slot = Slot::from_token(token)
        .unwrap_or_else(|| panic!("coffer pattern captured unknown slot word '{}'", token));

    let item_level = match captures[4].parse::<u32>() {
        Ok(level) => level,
        Err(e) => {
            warn!("Ignoring coffer '{}' with bad item level: {}", name, e);
            return None;
        }
    };

    Some(CofferMatch {
        series_name: captures[1].trim().to_string(),
        equip_slot,
        item_level,
    })
}

/// A classified coffer item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CofferInfo {
    /// Display name of the coffer item
    pub name: String,
    /// Lowercased series prefix
    pub series_name: String,
    /// Slot the coffer is for
    pub equip_slot: Slot,
    /// Item level of the contents
    pub item_level: u32,
}

/// Result of classifying the item sheet
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Coffers keyed by item id
    pub coffers: BTreeMap<u32, CofferInfo>,
    /// Number of item rows scanned
    pub rows_scanned: usize,
}

/// Classifies every item in the sheet; the first row wins for repeated ids
pub fn classify_items(items: &Sheet<Item>) -> Classification {
    let mut classification = Classification::default();

    for item in items {
        classification.rows_scanned += 1;
        let Some(found) = classify_name(&item.name) else {
            continue;
        };

        debug!(
            "Coffer {}: {} ({} {} IL {})",
            item.row_id, item.name, found.series_name, found.equip_slot, found.item_level
        );
        classification
            .coffers
            .entry(item.row_id)
            .or_insert_with(|| CofferInfo {
                name: item.name.clone(),
                series_name: found.series_name,
                equip_slot: found.equip_slot,
                item_level: found.item_level,
            });
    }

    classification
}

/// Every item that looks like a gear coffer, used for list mode
#[derive(Debug, Clone, Default)]
pub struct CofferList {
    /// Display names keyed by item id
    pub coffers: BTreeMap<u32, String>,
    /// Number of item rows scanned
    pub rows_scanned: usize,
}

/// Collects items whose name contains `Coffer (IL`, case-insensitively
pub fn find_coffer_candidates(items: &Sheet<Item>) -> CofferList {
    let mut list = CofferList::default();

    for item in items {
        list.rows_scanned += 1;
        if item.name.to_lowercase().contains(COFFER_MARKER) {
            list.coffers
                .entry(item.row_id)
                .or_insert_with(|| item.name.clone());
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(row_id: u32, name: &str) -> Item {
        Item {
            row_id,
            name: name.to_string(),
            level_item: 0,
            equip_slot_category: Default::default(),
            class_job_category: Default::default(),
        }
    }

    #[test]
    fn test_classify_weathered_weapon() {
        assert_eq!(
            classify_name("Weathered Weapon Coffer (IL 50)"),
            Some(CofferMatch {
                series_name: "weathered".to_string(),
                equip_slot: Slot::Weapon,
                item_level: 50,
            })
        );
    }

    #[test]
    fn test_classify_every_slot_word() {
        let words = [
            ("weapon", Slot::Weapon),
            ("head", Slot::Head),
            ("chest", Slot::Body),
            ("hand", Slot::Hands),
            ("leg", Slot::Legs),
            ("foot", Slot::Feet),
            ("earring", Slot::Earring),
            ("necklace", Slot::Neck),
            ("bracelet", Slot::Bracelet),
            ("ring", Slot::Ring),
        ];

        for (word, slot) in words {
            assert_eq!(Slot::from_token(word), Some(slot));
            for gear in ["", " Gear"] {
                let name = format!("Augmented Ironworks {}{} Coffer (IL 130)", word, gear);
                let found = classify_name(&name).unwrap();
                assert_eq!(found.equip_slot, slot, "{}", name);
                assert_eq!(found.series_name, "augmented ironworks");
                assert_eq!(found.item_level, 130);
            }
        }
        assert_eq!(Slot::ALL.len(), words.len());
    }

    #[test]
    fn test_classify_rejects_other_names() {
        assert_eq!(classify_name("Bronze Sword"), None);
        assert_eq!(classify_name("Weathered Coffer (IL 50)"), None);
        assert_eq!(classify_name("Weapon Coffer (IL 50)"), None);
        assert_eq!(classify_name("Weathered Weapon Coffer (IL )"), None);
        assert_eq!(classify_name("Weathered Weapon Coffer (IL 99999999999)"), None);
        assert_eq!(classify_name(""), None);
    }

    #[test]
    fn test_unknown_slot_word() {
        assert_eq!(Slot::from_token("waist"), None);
        assert_eq!(Slot::from_token("WEAPON"), Some(Slot::Weapon));
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(Slot::Hands.to_string(), "Hands");
        assert_eq!(Slot::Body.to_string(), "Body");
    }

    #[test]
    fn test_classify_items_first_wins() {
        let items = Sheet::from_rows(vec![
            item(0, ""),
            item(36136, "Vortex Weapon Coffer (IL 70)"),
            item(5, "Bronze Sword"),
            item(36136, "Other Head Coffer (IL 90)"),
        ]);

        let classification = classify_items(&items);
        assert_eq!(classification.rows_scanned, 4);
        assert_eq!(classification.coffers.len(), 1);

        let info = &classification.coffers[&36136];
        assert_eq!(info.name, "Vortex Weapon Coffer (IL 70)");
        assert_eq!(info.series_name, "vortex");
        assert_eq!(info.equip_slot, Slot::Weapon);
        assert_eq!(info.item_level, 70);
    }

    #[test]
    fn test_find_coffer_candidates() {
        let items = Sheet::from_rows(vec![
            item(1, "Weathered Weapon Coffer (IL 50)"),
            item(2, "Ironworks Accessory Coffer (IL 130)"),
            item(3, "Materiel Container 3.0"),
            item(4, "Sturdy COFFER (il 600)"),
        ]);

        let list = find_coffer_candidates(&items);
        let ids: Vec<_> = list.coffers.keys().copied().collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(list.coffers[&4], "Sturdy COFFER (il 600)");
        assert_eq!(list.rows_scanned, 4);
    }
}
