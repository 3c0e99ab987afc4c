//! # coffer-core
//!
//! A library for working out which crafted gear each gear coffer can contain.
//!
//! This crate provides the core functionality for:
//! - Loading the `Item` and `Recipe` sheets from exported game data
//! - Recognising single-slot gear coffers by name
//! - Joining coffers against recipes to build content manifests
//! - Writing the results as CSV reports
//!
//! ## Architecture
//!
//! - [`sheet`]: Typed sheet loading
//! - [`coffer`]: Coffer classification
//! - [`manifest`]: Coffer/recipe matching
//! - [`report`]: CSV output
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use coffer_core::{classify_items, GameData, GameDataOptions, ManifestBuilder, ReportWriter};
//!
//! let game_data = GameData::open("/games/ffxiv", GameDataOptions::default())?;
//! let (items, recipes) = game_data.load_tables()?;
//!
//! let classification = classify_items(&items);
//! let manifests = ManifestBuilder::new().build(&classification, &items, &recipes);
//!
//! let writer = ReportWriter::new(".");
//! writer.write_manifests(&manifests)?;
//! writer.write_resolved_manifests(&manifests, &items)?;
//! # Ok::<(), coffer_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod coffer;
pub mod error;
pub mod manifest;
pub mod report;
pub mod sheet;

// Re-export primary types for convenience
pub use coffer::{
    classify_items, classify_name, find_coffer_candidates, Classification, CofferInfo, CofferList,
    CofferMatch, Slot,
};
pub use error::{Error, Result};
pub use manifest::{ManifestBuilder, ManifestRules, Manifests, BLACKLISTED_COFFERS};
pub use report::ReportWriter;
pub use sheet::{GameData, GameDataOptions, Item, Language, Recipe, Sheet};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
