use crate::Result;
use aicf_store::StoreLayout;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MigrateOutcome {
    /// File names moved into `legacy_memory/`, verbatim.
    pub preserved: Vec<String>,
}

/// Move pre-existing files out of the `.aicf/` root into `legacy_memory/`
/// and lay down the tiered skeleton.
///
/// Legacy files are preserved byte-for-byte; the migration renames, it
/// never rewrites.
pub fn migrate(project_root: &Path) -> Result<MigrateOutcome> {
    let layout = StoreLayout::new(project_root);
    let mut outcome = MigrateOutcome::default();

    let aicf_dir = layout.aicf_dir();
    if aicf_dir.is_dir() {
        for entry in std::fs::read_dir(&aicf_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if StoreLayout::is_skeleton_entry(&name) {
                continue;
            }

            std::fs::create_dir_all(layout.legacy_dir())?;
            let dest = layout.legacy_dir().join(&name);
            std::fs::rename(entry.path(), &dest)?;
            outcome.preserved.push(name);
        }
    }

    layout.ensure_skeleton().map_err(crate::Error::Store)?;
    outcome.preserved.sort();
    Ok(outcome)
}
