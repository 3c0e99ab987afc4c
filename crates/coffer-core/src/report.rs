//! CSV reports.
//!
//! Fields are comma-separated and written as-is, lines end in CRLF.

use crate::coffer::{Classification, CofferList};
use crate::error::{Error, Result};
use crate::manifest::Manifests;
use crate::sheet::{Item, Sheet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Line terminator of every report
pub const LINE_ENDING: &str = "\r\n";

/// File name of the list-mode coffer list
pub const COFFER_LIST_FILE: &str = "CofferList.csv";
/// File name of the coffer classification report
pub const COFFER_DATA_FILE: &str = "CofferData.csv";
/// File name of the id-only manifest report
pub const MANIFESTS_FILE: &str = "CofferManifests.csv";
/// File name of the manifest report with names resolved
pub const RESOLVED_MANIFESTS_FILE: &str = "CofferManifests_Resolved.csv";

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(LINE_ENDING);
}

/// Renders `CofferList.csv`
pub fn render_coffer_list(list: &CofferList) -> String {
    let mut out = String::new();
    push_line(&mut out, "Item ID, Name");
    for (id, name) in &list.coffers {
        push_line(&mut out, &format!("{},{}", id, name));
    }
    out
}

/// Renders `CofferData.csv`
pub fn render_coffer_data(classification: &Classification) -> String {
    let mut out = String::new();
    push_line(&mut out, "Item ID, Name, Series, Equip Slot, Item Level");
    for (id, info) in &classification.coffers {
        push_line(
            &mut out,
            &format!(
                "{},{},{},{},{}",
                id, info.name, info.series_name, info.equip_slot, info.item_level
            ),
        );
    }
    out
}

/// Renders `CofferManifests.csv`: coffer id followed by content ids
pub fn render_manifests(manifests: &Manifests) -> String {
    let mut out = String::new();
    for (id, contents) in &manifests.entries {
        let mut line = id.to_string();
        for item in contents {
            // Writing to a String cannot fail
            let _ = write!(line, ",{}", item);
        }
        push_line(&mut out, &line);
    }
    out
}

/// Renders `CofferManifests_Resolved.csv`: coffer id, coffer name, then
/// the name of every content item.
///
/// Fails with [`Error::MissingRow`] if any id is not in `items`.
pub fn render_resolved_manifests(manifests: &Manifests, items: &Sheet<Item>) -> Result<String> {
    let mut out = String::new();
    push_line(&mut out, "Item ID, Name, Contents...");
    for (&id, contents) in &manifests.entries {
        let mut line = format!("{},{}", id, items.row(id)?.name);
        for &item in contents {
            line.push(',');
            line.push_str(&items.row(item)?.name);
        }
        push_line(&mut out, &line);
    }
    Ok(out)
}

/// Writes reports into an output directory, overwriting existing files
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer for `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory reports are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `CofferList.csv`
    pub fn write_coffer_list(&self, list: &CofferList) -> Result<PathBuf> {
        self.write(COFFER_LIST_FILE, &render_coffer_list(list))
    }

    /// Writes `CofferData.csv`
    pub fn write_coffer_data(&self, classification: &Classification) -> Result<PathBuf> {
        self.write(COFFER_DATA_FILE, &render_coffer_data(classification))
    }

    /// Writes `CofferManifests.csv`
    pub fn write_manifests(&self, manifests: &Manifests) -> Result<PathBuf> {
        self.write(MANIFESTS_FILE, &render_manifests(manifests))
    }

    /// Writes `CofferManifests_Resolved.csv`
    pub fn write_resolved_manifests(
        &self,
        manifests: &Manifests,
        items: &Sheet<Item>,
    ) -> Result<PathBuf> {
        let contents = render_resolved_manifests(manifests, items)?;
        self.write(RESOLVED_MANIFESTS_FILE, &contents)
    }

    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        fs::write(&path, contents).map_err(|e| Error::file_write(&path, e))?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coffer::{CofferInfo, Slot};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn named(row_id: u32, name: &str) -> Item {
        Item {
            row_id,
            name: name.to_string(),
            level_item: 0,
            equip_slot_category: Default::default(),
            class_job_category: Default::default(),
        }
    }

    fn sample_manifests() -> Manifests {
        let mut manifests = Manifests::default();
        manifests.entries.insert(100, vec![1, 2, 1]);
        manifests.entries.insert(50, vec![2]);
        manifests
    }

    fn sample_items() -> Sheet<Item> {
        Sheet::from_rows(vec![
            named(1, "Bronze Sword"),
            named(2, "Iron Shield"),
            named(50, "Iron Weapon Coffer (IL 20)"),
            named(100, "Weathered Weapon Coffer (IL 50)"),
        ])
    }

    #[test]
    fn test_render_coffer_list() {
        let mut list = CofferList::default();
        list.coffers.insert(7, "Sturdy Coffer (IL 600)".to_string());

        assert_eq!(
            render_coffer_list(&list),
            "Item ID, Name\r\n7,Sturdy Coffer (IL 600)\r\n"
        );
    }

    #[test]
    fn test_render_coffer_data() {
        let mut classification = Classification::default();
        classification.coffers.insert(
            100,
            CofferInfo {
                name: "Weathered Hand Gear Coffer (IL 50)".to_string(),
                series_name: "weathered".to_string(),
                equip_slot: Slot::Hands,
                item_level: 50,
            },
        );

        assert_eq!(
            render_coffer_data(&classification),
            "Item ID, Name, Series, Equip Slot, Item Level\r\n\
             100,Weathered Hand Gear Coffer (IL 50),weathered,Hands,50\r\n"
        );
    }

    #[test]
    fn test_render_manifests() {
        assert_eq!(render_manifests(&sample_manifests()), "50,2\r\n100,1,2,1\r\n");
        assert_eq!(render_manifests(&Manifests::default()), "");
    }

    #[test]
    fn test_resolved_names_match_lookups() {
        let manifests = sample_manifests();
        let items = sample_items();
        let resolved = render_resolved_manifests(&manifests, &items).unwrap();
        let mut lines = resolved.split(LINE_ENDING).filter(|l| !l.is_empty());

        assert_eq!(lines.next(), Some("Item ID, Name, Contents..."));
        for ((id, contents), line) in manifests.entries.iter().zip(lines) {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields[0], id.to_string());
            assert_eq!(fields[1], items.row(*id).unwrap().name);
            let names: Vec<&str> = contents
                .iter()
                .map(|item| items.row(*item).unwrap().name.as_str())
                .collect();
            assert_eq!(&fields[2..], names.as_slice());
        }
    }

    #[test]
    fn test_resolved_missing_item() {
        let mut manifests = sample_manifests();
        manifests.entries.insert(100, vec![999]);

        let err = render_resolved_manifests(&manifests, &sample_items()).unwrap_err();
        assert!(matches!(err, Error::MissingRow { row_id: 999, .. }));
    }

    #[test]
    fn test_writer_files() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());

        let path = writer.write_manifests(&sample_manifests()).unwrap();
        assert_eq!(path, temp_dir.path().join(MANIFESTS_FILE));
        assert_eq!(fs::read_to_string(&path).unwrap(), "50,2\r\n100,1,2,1\r\n");

        let path = writer
            .write_resolved_manifests(&sample_manifests(), &sample_items())
            .unwrap();
        assert!(fs::read_to_string(path)
            .unwrap()
            .contains("100,Weathered Weapon Coffer (IL 50),Bronze Sword,Iron Shield,Bronze Sword\r\n"));
    }

    #[test]
    fn test_writer_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("missing"));

        let err = writer.write_coffer_list(&CofferList::default()).unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
    }
}
