//! Matching coffers to the crafted gear they can contain.
//!
//! A recipe's result belongs in a coffer when its item level equals the
//! coffer's, it fits the coffer's slot, and no crafting or gathering class
//! can equip it. Series names are not compared: pieces of one series are not
//! always named after it (the ruthenium ring coffer has no item carrying the
//! series name), so manifests still need a manual review pass.

use crate::coffer::{Classification, Slot};
use crate::sheet::{ClassJob, EquipSlotCategory, Item, Recipe, Sheet};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Coffers that pass every automatic check but whose contents do not come
/// from recipes.
pub const BLACKLISTED_COFFERS: [u32; 11] = [
    31691, // Level 50 Weapon Coffer (IL 70)
    35884, // High Allagan Weapon Coffer (IL 115)
    36136, // Vortex Weapon Coffer (IL 70)
    36146, // Sophic Weapon Coffer (IL 255)
    36147, // Zurvanite Weapon Coffer (IL 265)
    36152, // Suzaku Weapon Coffer (IL 385)
    36153, // Seiryu Weapon Coffer (IL 395)
    36158, // Emerald Weapon Coffer (IL 515)
    36159, // Diamond Zeta Weapon Coffer (IL 525)
    40296, // Voidcast Weapon Coffer (IL 645)
    41054, // Voidvessel Weapon Coffer (IL 655)
];

/// Returns true if an item with these slot flags fits in a coffer for `slot`
pub fn slot_matches(category: &EquipSlotCategory, slot: Slot) -> bool {
    match slot {
        Slot::Weapon => category.main_hand || category.off_hand,
        Slot::Head => category.head,
        Slot::Body => category.body,
        Slot::Hands => category.gloves,
        Slot::Legs => category.legs,
        Slot::Feet => category.feet,
        Slot::Earring => category.ears,
        Slot::Neck => category.neck,
        Slot::Bracelet => category.wrists,
        Slot::Ring => category.finger_l || category.finger_r,
    }
}

/// Rules deciding which recipe results qualify
#[derive(Debug, Clone)]
pub struct ManifestRules {
    /// Results usable by any of these classes are rejected
    pub excluded_jobs: Vec<ClassJob>,
    /// Reject recipes that need a master book and have difficulty stars
    pub exclude_master_recipes: bool,
    /// Coffer ids skipped entirely
    pub blacklist: BTreeSet<u32>,
}

impl Default for ManifestRules {
    fn default() -> Self {
        Self {
            excluded_jobs: ClassJob::ALL.to_vec(),
            exclude_master_recipes: true,
            blacklist: BLACKLISTED_COFFERS.into_iter().collect(),
        }
    }
}

impl ManifestRules {
    /// Creates the default rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether starred master recipes are rejected
    pub fn exclude_master_recipes(mut self, enabled: bool) -> Self {
        self.exclude_master_recipes = enabled;
        self
    }

    /// Replaces the set of excluded classes
    pub fn excluded_jobs(mut self, jobs: impl IntoIterator<Item = ClassJob>) -> Self {
        self.excluded_jobs = jobs.into_iter().collect();
        self
    }

    /// Replaces the coffer blacklist
    pub fn blacklist(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.blacklist = ids.into_iter().collect();
        self
    }

    /// Returns true if `result`, produced by `recipe`, belongs in a coffer
    /// for `slot` at `item_level`
    pub fn qualifies(&self, recipe: &Recipe, result: &Item, slot: Slot, item_level: u32) -> bool {
        result.level_item == item_level
            && !(self.exclude_master_recipes && recipe.is_master_starred())
            && slot_matches(&result.equip_slot_category, slot)
            && !self
                .excluded_jobs
                .iter()
                .any(|&job| result.class_job_category.contains(job))
    }
}

/// Coffer contents keyed by coffer id
#[derive(Debug, Clone, Default)]
pub struct Manifests {
    /// Produced item ids per coffer, in recipe order; never empty
    pub entries: BTreeMap<u32, Vec<u32>>,
    /// Number of classified coffers skipped because they are blacklisted
    pub blacklisted: usize,
    /// Size of the blacklist the rules were built with
    pub blacklist_size: usize,
}

impl Manifests {
    /// Number of coffers with a manifest
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no coffer got a manifest
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds manifests by joining classified coffers against recipes
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    rules: ManifestRules,
}

impl ManifestBuilder {
    /// Creates a builder with the default rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with custom rules
    pub fn with_rules(rules: ManifestRules) -> Self {
        Self { rules }
    }

    /// Rules in use
    pub fn rules(&self) -> &ManifestRules {
        &self.rules
    }

    /// Scans every recipe for every non-blacklisted coffer
    pub fn build(
        &self,
        classification: &Classification,
        items: &Sheet<Item>,
        recipes: &Sheet<Recipe>,
    ) -> Manifests {
        let results = resolve_results(items, recipes);
        let mut manifests = Manifests {
            blacklist_size: self.rules.blacklist.len(),
            ..Manifests::default()
        };

        for (&coffer_id, coffer) in &classification.coffers {
            if self.rules.blacklist.contains(&coffer_id) {
                debug!("Skipping blacklisted coffer {} ({})", coffer_id, coffer.name);
                manifests.blacklisted += 1;
                continue;
            }

            let contents: Vec<u32> = results
                .iter()
                .filter(|(recipe, result)| {
                    self.rules
                        .qualifies(recipe, result, coffer.equip_slot, coffer.item_level)
                })
                .map(|(_, result)| result.row_id)
                .collect();

            if contents.is_empty() {
                trace!("No recipes for coffer {} ({})", coffer_id, coffer.name);
                continue;
            }

            debug!(
                "Coffer {} ({}) holds {} item(s)",
                coffer_id,
                coffer.name,
                contents.len()
            );
            manifests.entries.insert(coffer_id, contents);
        }

        manifests
    }
}

/// Pairs each recipe with its produced item, in recipe order
fn resolve_results<'a>(
    items: &'a Sheet<Item>,
    recipes: &'a Sheet<Recipe>,
) -> Vec<(&'a Recipe, &'a Item)> {
    recipes
        .iter()
        .filter_map(|recipe| {
            if recipe.item_result == 0 {
                return None;
            }
            let result = items.get_row(recipe.item_result);
            if result.is_none() {
                trace!(
                    "Recipe {} produces unknown item {}",
                    recipe.row_id,
                    recipe.item_result
                );
            }
            result.map(|item| (recipe, item))
        })
        .collect()
}
