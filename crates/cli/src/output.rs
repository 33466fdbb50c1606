// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use kord_core::Object;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// One stored object as a table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRow {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub phase: String,
    pub version: u64,
}

impl From<&Object> for ObjectRow {
    fn from(object: &Object) -> Self {
        let meta = object.metadata();
        Self {
            kind: object.kind().to_string(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            phase: object.phase().unwrap_or_else(|| "-".to_string()),
            version: meta.resource_version.0,
        }
    }
}

impl fmt::Display for ObjectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<12} {:<32} {:<10} {}",
            self.kind, self.namespace, self.name, self.phase, self.version
        )
    }
}

/// Render objects as a table with a header row
pub fn object_table(objects: &[Object]) -> String {
    let mut out = format!(
        "{:<12} {:<12} {:<32} {:<10} {}",
        "KIND", "NAMESPACE", "NAME", "PHASE", "VERSION"
    );
    for object in objects {
        out.push('\n');
        out.push_str(&ObjectRow::from(object).to_string());
    }
    out
}

/// Print a single object: full JSON, or a one-row table
pub fn print_object(object: &Object, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", object_table(std::slice::from_ref(object))),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(object) {
                println!("{}", json);
            }
        }
    }
}

pub fn print_objects(objects: &[Object], format: OutputFormat) {
    match format {
        OutputFormat::Table if objects.is_empty() => println!("No resources found"),
        OutputFormat::Table => println!("{}", object_table(objects)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(objects) {
                println!("{}", json);
            }
        }
    }
}

/// Human-friendly duration, e.g. "3h 5m" or "42s"
pub fn format_uptime(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m {}s", minutes, seconds),
        _ => format!("{}h {}m", hours, minutes),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
