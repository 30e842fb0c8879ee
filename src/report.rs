use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::diagnostics::ValidationError;
use crate::typeck::types::Arrow;

/// One `external: internal` pair of an object export clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportEntry {
    pub external: String,
    pub internal: String,
}

/// Shape of the module's export clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Exports {
    /// `return f;`
    Single { name: String },
    /// `return { a: f, b: g };`, in source order.
    Multiple { entries: Vec<ExportEntry> },
}

/// Result of a successful validation: every function's signature and the
/// export surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    functions: BTreeMap<String, Arrow>,
    exports: Exports,
    #[serde(skip)]
    aliases: HashMap<String, Vec<String>>,
}

impl Report {
    pub fn new(functions: BTreeMap<String, Arrow>, exports: Exports) -> Self {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        if let Exports::Multiple { entries } = &exports {
            for entry in entries {
                aliases.entry(entry.internal.clone()).or_default().push(entry.external.clone());
            }
        }
        Self { functions, exports, aliases }
    }

    /// Signature of the module function named `name`.
    pub fn get_function(&self, name: &str) -> Option<&Arrow> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &BTreeMap<String, Arrow> {
        &self.functions
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    pub fn is_single_export(&self) -> bool {
        matches!(self.exports, Exports::Single { .. })
    }

    /// Internal name of the single exported function.
    pub fn get_export(&self) -> Option<&str> {
        match &self.exports {
            Exports::Single { name } => Some(name),
            Exports::Multiple { .. } => None,
        }
    }

    /// First external alias of the internal function `internal`.
    pub fn get_export_for(&self, internal: &str) -> Option<&str> {
        self.exported_as(internal).first().map(String::as_str)
    }

    /// Internal function bound to the external name `external`.
    pub fn internal_name(&self, external: &str) -> Option<&str> {
        match &self.exports {
            Exports::Single { .. } => None,
            Exports::Multiple { entries } => entries
                .iter()
                .find(|e| e.external == external)
                .map(|e| e.internal.as_str()),
        }
    }

    /// External names under which `internal` is exported, in source order.
    /// Empty for a single-function export.
    pub fn exported_as(&self, internal: &str) -> &[String] {
        self.aliases.get(internal).map_or(&[], Vec::as_slice)
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::internal(e.to_string()))
    }
}
