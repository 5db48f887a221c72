//! Reading VCF files back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::VcfError;

/// One data line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcfRecord {
    pub chrom: String,
    pub pos: String,
    pub id: String,
    pub reference: String,
    pub alternate: String,
    pub qual: String,
    pub filter: String,
    pub info: String,
}

impl VcfRecord {
    /// Value of an INFO key. Flags yield an empty string.
    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.split(';').find_map(|entry| match entry.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            None if entry == key => Some(""),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VcfSummary {
    pub path: PathBuf,
    pub header_lines: usize,
    pub records: Vec<VcfRecord>,
}

impl VcfSummary {
    pub fn data_lines(&self) -> usize {
        self.records.len()
    }
}

/// Read a VCF, checking that every data line has the eight fixed columns.
pub fn inspect(path: &Path) -> Result<VcfSummary, VcfError> {
    let content = fs::read_to_string(path).map_err(|e| VcfError::io(path, e))?;

    let mut header_lines = 0;
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('#') {
            header_lines += 1;
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            return Err(VcfError::Malformed {
                line: index + 1,
                columns: fields.len(),
            });
        }

        records.push(VcfRecord {
            chrom: fields[0].to_string(),
            pos: fields[1].to_string(),
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alternate: fields[4].to_string(),
            qual: fields[5].to_string(),
            filter: fields[6].to_string(),
            info: fields[7].to_string(),
        });
    }

    Ok(VcfSummary {
        path: path.to_path_buf(),
        header_lines,
        records,
    })
}
