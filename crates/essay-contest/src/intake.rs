//! Essay intake: one zone folder in, one `ZoneInput` out.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use judging::{CompetitionMode, Item, ZoneInput};
use tracing::{debug, warn};

use crate::cli::ZoneSpec;
use crate::error::ContestError;

/// File extensions treated as essays.
pub const ESSAY_EXTENSIONS: [&str; 3] = ["txt", "md", "rtf"];

/// Lists essay files directly inside a zone folder.
pub struct EssayWalker {
    root: PathBuf,
}

impl EssayWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Essay files in the folder itself (subfolders such as `wrong_files/`
    /// are not entered), sorted by name.
    pub fn essay_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .max_depth(Some(1))
            .hidden(true)
            .git_ignore(false)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() && is_essay(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files
    }

    /// Read every essay into an `Item`. Unreadable files are skipped.
    pub fn load_zone(&self, zone_name: &str) -> Result<ZoneInput, ContestError> {
        if !self.root.is_dir() {
            return Err(ContestError::FolderNotFound(self.root.clone()));
        }

        let mut items = Vec::new();
        for path in self.essay_files() {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable essay");
                    continue;
                }
            };
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).into_owned();
            debug!(zone = %zone_name, item = %id, bytes = bytes.len(), "loaded essay");
            items.push(Item::new(id, text, path, zone_name));
        }

        Ok(ZoneInput::new(zone_name, items))
    }
}

/// Load every requested zone, paired with its folder.
///
/// In single-zone mode a missing folder or an empty one is an error. In
/// multi-zone mode a missing folder is skipped with a warning and an empty
/// one is kept; the orchestrator decides whether enough zones remain.
pub fn load_zones(
    zones: &[ZoneSpec],
    mode: CompetitionMode,
) -> Result<Vec<(PathBuf, ZoneInput)>, ContestError> {
    let mut loaded = Vec::with_capacity(zones.len());
    for zone in zones {
        let input = match EssayWalker::new(&zone.folder).load_zone(&zone.name) {
            Ok(input) => input,
            Err(e @ ContestError::FolderNotFound(_)) if mode == CompetitionMode::MultiZone => {
                warn!(zone = %zone.name, error = %e, "skipping zone");
                continue;
            }
            Err(e) => return Err(e),
        };
        if input.items.is_empty() {
            if mode == CompetitionMode::SingleZone {
                return Err(ContestError::NoEssays(zone.folder.clone()));
            }
            warn!(zone = %zone.name, folder = %zone.folder.display(), "no essay files found");
        }
        loaded.push((zone.folder.clone(), input));
    }
    Ok(loaded)
}

fn is_essay(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ESSAY_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_essays_sorted_and_skips_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "second").unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("c.RTF"), "third").unwrap();
        fs::write(dir.path().join("notes.pdf"), "not an essay").unwrap();
        let wrong = dir.path().join("wrong_files");
        fs::create_dir(&wrong).unwrap();
        fs::write(wrong.join("old.txt"), "moved earlier").unwrap();

        let names: Vec<String> = EssayWalker::new(dir.path())
            .essay_files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.txt", "b.md", "c.RTF"]);
    }

    #[test]
    fn load_zone_builds_items_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("z.txt"), "last essay").unwrap();
        fs::write(dir.path().join("m.txt"), "middle essay").unwrap();

        let zone = EssayWalker::new(dir.path()).load_zone("North").unwrap();
        assert_eq!(zone.zone_name, "North");
        let ids: Vec<&str> = zone.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["m.txt", "z.txt"]);
        assert_eq!(zone.items[0].raw_text, "middle essay");
        assert_eq!(zone.items[0].zone_name, "North");
        assert_eq!(zone.items[0].source, dir.path().join("m.txt"));
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("e.txt"), [b'o', b'k', 0xFF]).unwrap();
        let zone = EssayWalker::new(dir.path()).load_zone("Z").unwrap();
        assert_eq!(zone.items.len(), 1);
        assert!(zone.items[0].raw_text.starts_with("ok"));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EssayWalker::new(dir.path().join("absent"))
            .load_zone("Z")
            .unwrap_err();
        assert!(matches!(err, ContestError::FolderNotFound(_)));
    }

    #[test]
    fn empty_folder_gives_empty_zone() {
        let dir = tempfile::tempdir().unwrap();
        let zone = EssayWalker::new(dir.path()).load_zone("Z").unwrap();
        assert!(zone.items.is_empty());
    }

    fn spec(name: &str, folder: &Path) -> ZoneSpec {
        ZoneSpec {
            name: name.to_string(),
            folder: folder.to_path_buf(),
        }
    }

    #[test]
    fn multi_zone_skips_missing_folder() {
        let north = tempfile::tempdir().unwrap();
        let south = tempfile::tempdir().unwrap();
        fs::write(north.path().join("a.txt"), "north essay").unwrap();
        let absent = south.path().join("absent");
        let specs = [
            spec("North", north.path()),
            spec("East", &absent),
            spec("South", south.path()),
        ];

        let loaded = load_zones(&specs, CompetitionMode::MultiZone).unwrap();
        let names: Vec<&str> = loaded.iter().map(|(_, z)| z.zone_name.as_str()).collect();
        assert_eq!(names, ["North", "South"]);
        assert_eq!(loaded[0].0, north.path());
        assert!(loaded[1].1.items.is_empty());
    }

    #[test]
    fn single_zone_rejects_missing_or_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = [spec("Z", &dir.path().join("absent"))];
        assert!(matches!(
            load_zones(&missing, CompetitionMode::SingleZone),
            Err(ContestError::FolderNotFound(_))
        ));

        let empty = [spec("Z", dir.path())];
        assert!(matches!(
            load_zones(&empty, CompetitionMode::SingleZone),
            Err(ContestError::NoEssays(_))
        ));
    }
}
