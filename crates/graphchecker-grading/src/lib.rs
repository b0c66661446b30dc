//! Check registry, argument conversion, feedback rendering, and the grading engine.
//!
//! This crate implements the GraphChecker grading core: metadata catalog
//! loading, typed argument conversion, two-tier feedback templates, the
//! ordered check/grade fold, check-list lint rules, and the built-in
//! `undirected` and `directed` graph question types.

pub mod arguments;
pub mod catalog;
pub mod check;
pub mod checks;
pub mod engine;
pub mod feedback;
pub mod graph;
pub mod preprocess;
pub mod question;
pub mod validation;

pub use arguments::{convert, parse_integer, split_string_list, Argument, Arguments};
pub use catalog::{
    available_checks, load_type_descriptor, load_ui_params, Catalog, CheckLayout, MethodMetadata,
    ModuleMetadata, ParamSpec, ParamType, TypeDescriptor,
};
pub use check::{Check, CheckContext, CheckRegistry};
pub use checks::{builtin, default_registry, BUILTIN_TYPES};
pub use engine::{GradeAccumulator, Grader, GraderConfig, LayoutKind};
pub use feedback::{fill_placeholders, render};
pub use graph::{Graph, GraphEdge, GraphVertex};
pub use preprocess::Preprocess;
pub use question::QuestionType;
pub use validation::{validate, validate_or_raise, Diagnostic, LintRule, Severity};
