//! Check metadata: which modules and methods a question type offers, what
//! parameters each method declares, and its default feedback templates.
//!
//! Metadata lives on disk as one JSON document per module, named after the
//! module (`basic.json` describes module `basic`). Where those documents live
//! is decided by a [`CheckLayout`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use graphchecker_types::{GraderError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File stems that are never treated as check modules.
pub const RESERVED_NAMES: &[&str] = &["types", "type"];

/// Per-type descriptor file inside a type's metadata directory.
pub const TYPE_DESCRIPTOR_FILE: &str = "type.json";

/// Repository-wide file mapping each question type to its UI parameters.
pub const TYPES_FILE: &str = "types.json";

// ---------------------------------------------------------------------------
// Layout: where metadata documents live
// ---------------------------------------------------------------------------

/// Base-path resolution strategy for metadata documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum CheckLayout {
    /// Every document sits directly in `root` (a server deployment for one type).
    Shared { root: PathBuf },
    /// Documents for type `T` sit in `root/T/` (a checkout with all types).
    PerType { root: PathBuf },
}

impl CheckLayout {
    pub fn root(&self) -> &Path {
        match self {
            CheckLayout::Shared { root } | CheckLayout::PerType { root } => root,
        }
    }

    /// Directory holding the module documents of `question_type`.
    pub fn type_dir(&self, question_type: &str) -> PathBuf {
        match self {
            CheckLayout::Shared { root } => root.clone(),
            CheckLayout::PerType { root } => root.join(question_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata documents
// ---------------------------------------------------------------------------

/// Declared type of a check parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    Integer,
    StringList,
    Graph,
    /// Any other declared type; values pass through unconverted.
    Other(String),
}

impl From<String> for ParamType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "integer" => ParamType::Integer,
            "string_list" => ParamType::StringList,
            "graph" => ParamType::Graph,
            _ => ParamType::Other(s),
        }
    }
}

impl From<ParamType> for String {
    fn from(t: ParamType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Integer => f.write_str("integer"),
            ParamType::StringList => f.write_str("string_list"),
            ParamType::Graph => f.write_str("graph"),
            ParamType::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub param: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Authoring-form fields (display name, help text) kept for round-tripping.
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl ParamSpec {
    pub fn new(param: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            param: param.into(),
            param_type,
            other: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodMetadata {
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Feedback key → default template with `[[placeholder]]` markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl MethodMetadata {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.param == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleMetadata {
    #[serde(default)]
    pub checks: BTreeMap<String, MethodMetadata>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// Contents of `type.json`: UI parameters and extra runtime modules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(default)]
    pub ui_params: serde_json::Map<String, serde_json::Value>,
    #[serde(default, alias = "python_modules")]
    pub modules: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| GraderError::Metadata {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Scan the metadata directory of `question_type` and load every module document.
pub fn available_checks(
    layout: &CheckLayout,
    question_type: &str,
) -> Result<BTreeMap<String, ModuleMetadata>> {
    let dir = layout.type_dir(question_type);
    let mut modules = BTreeMap::new();

    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if RESERVED_NAMES.contains(&stem) {
            continue;
        }
        let module: ModuleMetadata = read_json(&path)?;
        debug!(module = stem, checks = module.checks.len(), "loaded check metadata");
        modules.insert(stem.to_string(), module);
    }

    Ok(modules)
}

/// Load `type.json` for `question_type`; a missing file yields the default descriptor.
pub fn load_type_descriptor(layout: &CheckLayout, question_type: &str) -> Result<TypeDescriptor> {
    let path = layout.type_dir(question_type).join(TYPE_DESCRIPTOR_FILE);
    if !path.exists() {
        return Ok(TypeDescriptor::default());
    }
    read_json(&path)
}

/// UI parameters of `question_type` from the repository-wide `types.json`.
pub fn load_ui_params(
    layout: &CheckLayout,
    question_type: &str,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let path = layout.root().join(TYPES_FILE);
    let types: BTreeMap<String, TypeDescriptor> = read_json(&path)?;
    types
        .get(question_type)
        .map(|t| t.ui_params.clone())
        .ok_or_else(|| GraderError::Other(format!("Unknown question type '{question_type}'")))
}

// ---------------------------------------------------------------------------
// Catalog: loaded metadata for one question type
// ---------------------------------------------------------------------------

/// Immutable metadata for one question type, loaded once and shared by runs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    question_type: String,
    modules: BTreeMap<String, ModuleMetadata>,
    descriptor: TypeDescriptor,
}

impl Catalog {
    /// Load module documents and the type descriptor from disk.
    pub fn load(layout: &CheckLayout, question_type: &str) -> Result<Self> {
        let modules = available_checks(layout, question_type)?;
        let descriptor = load_type_descriptor(layout, question_type)?;
        debug!(
            question_type,
            modules = modules.len(),
            dir = %layout.type_dir(question_type).display(),
            "catalog loaded"
        );
        Ok(Self {
            question_type: question_type.to_string(),
            modules,
            descriptor,
        })
    }

    /// Build a catalog from in-memory metadata.
    pub fn from_modules(
        question_type: impl Into<String>,
        modules: BTreeMap<String, ModuleMetadata>,
    ) -> Self {
        Self {
            question_type: question_type.into(),
            modules,
            descriptor: TypeDescriptor::default(),
        }
    }

    pub fn with_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn question_type(&self) -> &str {
        &self.question_type
    }

    pub fn modules(&self) -> &BTreeMap<String, ModuleMetadata> {
        &self.modules
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Metadata of `module.method`, or the matching lookup error.
    pub fn method(&self, module: &str, method: &str) -> Result<&MethodMetadata> {
        let m = self
            .modules
            .get(module)
            .ok_or_else(|| GraderError::UnknownModule {
                module: module.to_string(),
            })?;
        m.checks.get(method).ok_or_else(|| GraderError::UnknownMethod {
            module: module.to_string(),
            method: method.to_string(),
        })
    }
}
