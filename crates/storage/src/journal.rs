// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSON-lines journal of store mutations

use kord_core::{Object, ObjectKey};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single recorded mutation, holding the object as stored after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalOp {
    Create { object: Object },
    UpdateStatus { object: Object },
    Delete { key: ObjectKey },
}

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    seq: u64,
    op: JournalOp,
}

/// Durable log of store mutations
pub struct Journal {
    path: PathBuf,
    file: File,
    sequence: u64,
}

impl Journal {
    /// Open or create a journal at the given path
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        let reader = BufReader::new(File::open(path)?);
        let mut sequence = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                sequence += 1;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sequence,
        })
    }

    /// Append a mutation and flush it to disk
    pub fn append(&mut self, op: &JournalOp) -> Result<u64, JournalError> {
        let entry = JournalEntry {
            seq: self.sequence + 1,
            op: op.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_data()?;
        self.sequence += 1;
        Ok(self.sequence)
    }

    /// Number of entries written so far
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every mutation in order; a missing file is an empty journal
    pub fn replay(path: &Path) -> Result<Vec<JournalOp>, JournalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ops = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry =
                serde_json::from_str(&line).map_err(|source| JournalError::Json {
                    line: index as u64 + 1,
                    source,
                })?;
            ops.push(entry.op);
        }
        Ok(ops)
    }

    /// Replace the journal with one `Create` per live object.
    ///
    /// Writes to a sibling temp file and renames it over the original.
    pub fn compact<'a>(
        path: &Path,
        objects: impl IntoIterator<Item = &'a Object>,
    ) -> Result<(), JournalError> {
        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for (index, object) in objects.into_iter().enumerate() {
                let entry = JournalEntry {
                    seq: index as u64 + 1,
                    op: JournalOp::Create {
                        object: object.clone(),
                    },
                };
                serde_json::to_writer(&mut writer, &entry)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
