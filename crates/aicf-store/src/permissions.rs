//! Per-source opt-in, persisted as an append-only audit log.
//!
//! `.aicf/.permissions.aicf` holds one `@PERMISSION|<ts>|<action>|<source>`
//! line per grant or revoke, newest last. The file doubles as configuration
//! (latest record per source wins) and audit trail (nothing is ever
//! rewritten).

use crate::{Error, Result};
use aicf_types::Source;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    Grant,
    Revoke,
}

impl PermissionAction {
    fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Grant => "grant",
            PermissionAction::Revoke => "revoke",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "grant" => Some(PermissionAction::Grant),
            "revoke" => Some(PermissionAction::Revoke),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PermissionRecord {
    pub timestamp: String,
    pub action: PermissionAction,
    pub source: Source,
}

pub struct PermissionsLog {
    path: PathBuf,
}

impl PermissionsLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// All records in file order. A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<PermissionRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() != 4 || parts[0] != "@PERMISSION" {
                return Err(Error::Format(format!("bad permission line: {}", line)));
            }
            let action = PermissionAction::parse(parts[2])
                .ok_or_else(|| Error::Format(format!("bad permission action: {}", parts[2])))?;
            let source = Source::parse(parts[3])
                .map_err(|_| Error::Format(format!("bad permission source: {}", parts[3])))?;
            records.push(PermissionRecord {
                timestamp: parts[1].to_string(),
                action,
                source,
            });
        }
        Ok(records)
    }

    /// Current state: latest record per source.
    pub fn state(&self) -> Result<BTreeMap<Source, PermissionAction>> {
        let mut state = BTreeMap::new();
        for record in self.load()? {
            state.insert(record.source, record.action);
        }
        Ok(state)
    }

    pub fn is_granted(&self, source: Source) -> Result<bool> {
        Ok(matches!(
            self.state()?.get(&source),
            Some(PermissionAction::Grant)
        ))
    }

    pub fn grant(&self, source: Source, timestamp: &str) -> Result<()> {
        self.append(PermissionAction::Grant, source, timestamp)
    }

    pub fn revoke(&self, source: Source, timestamp: &str) -> Result<()> {
        self.append(PermissionAction::Revoke, source, timestamp)
    }

    fn append(&self, action: PermissionAction, source: Source, timestamp: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(
            file,
            "@PERMISSION|{}|{}|{}",
            timestamp,
            action.as_str(),
            source
        )?;
        Ok(())
    }
}
