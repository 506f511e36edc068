//! Extraction for JSON lockfiles (`package-lock.json`, `npm-shrinkwrap.json`).
//!
//! Two dialects are read from the same document, both when present:
//!
//! ```json
//! {
//!   "lockfileVersion": 2,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/lodash": { "version": "4.17.21" },
//!     "node_modules/foo/node_modules/@scope/bar": { "version": "2.0.0" }
//!   },
//!   "dependencies": {
//!     "lodash": { "version": "4.17.21" },
//!     "foo": {
//!       "version": "1.0.0",
//!       "dependencies": { "@scope/bar": { "version": "2.0.0" } }
//!     }
//!   }
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{LockfileExtractor, LockfileFormat};
use crate::error::ScanError;
use crate::model::CandidatePair;

const NODE_MODULES: &str = "node_modules/";

pub struct JsonTreeExtractor;

impl LockfileExtractor for JsonTreeExtractor {
    fn name(&self) -> &'static str {
        "JSON lockfile"
    }

    fn format(&self) -> LockfileFormat {
        LockfileFormat::JsonTree
    }

    fn extract(&self, content: &str, label: &str) -> Result<Vec<CandidatePair>, ScanError> {
        let document = parse_document(content).map_err(|e| ScanError::LockfileParse {
            path: label.to_owned(),
            reason: e.to_string(),
        })?;

        let mut candidates = Vec::new();

        if let Some(packages) = document.get("packages").and_then(Value::as_object) {
            collect_flat(packages, &mut candidates);
        }

        if let Some(dependencies) = document.get("dependencies").and_then(Value::as_object) {
            collect_nested(dependencies, &mut candidates);
        }

        Ok(candidates)
    }
}

/// Parses without serde_json's nesting limit; legacy trees are as deep as
/// the project's dependency chains.
fn parse_document(content: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let document = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(document)
}

/// Package name from an install path, taken after the last `node_modules/`.
///
/// Returns `None` for the root entry and other paths outside `node_modules`.
fn package_name_from_path(key: &str) -> Option<&str> {
    let pos = key.rfind(NODE_MODULES)?;
    let name = &key[pos + NODE_MODULES.len()..];
    (!name.is_empty()).then_some(name)
}

fn collect_flat(packages: &Map<String, Value>, out: &mut Vec<CandidatePair>) {
    for (key, entry) in packages {
        let Some(name) = package_name_from_path(key) else {
            continue;
        };
        let Some(version) = entry.get("version").and_then(Value::as_str) else {
            continue;
        };
        out.push(CandidatePair::new(name, version));
    }
}

// Depth-first with an explicit stack: each node is emitted before its
// children, and children before the node's later siblings.
fn collect_nested(dependencies: &Map<String, Value>, out: &mut Vec<CandidatePair>) {
    let mut stack = vec![dependencies.iter()];

    while let Some(level) = stack.last_mut() {
        let Some((name, node)) = level.next() else {
            stack.pop();
            continue;
        };

        if let Some(version) = node.get("version").and_then(Value::as_str) {
            out.push(CandidatePair::new(name.as_str(), version));
        }

        if let Some(children) = node.get("dependencies").and_then(Value::as_object) {
            stack.push(children.iter());
        }
    }
}
