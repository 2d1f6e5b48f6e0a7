use bevy::prelude::Entity;
use proptree_catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    #[error("`{input}` is not a valid `{type_path}` for `{path}`")]
    Format {
        path: String,
        input: String,
        type_path: String,
    },
    #[error("no constructible type can fill `{path}`")]
    MissingCandidateType { path: String },
    #[error("row `{path}` refers to a parent row that is not live")]
    StaleTokenReference { path: String },
    #[error("{0} is not a property editor")]
    NotAnEditor(Entity),
    #[error("the property editor has no bound root")]
    NoRoot,
    #[error("cannot reach `{path}`: {reason}")]
    Path { path: String, reason: String },
    #[error("`{path}` is read-only")]
    ReadOnly { path: String },
    #[error("`{path}` is not a list")]
    NotAList { path: String },
    #[error("index {index} is out of range for `{path}` of length {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("cannot store a `{type_path}` in `{path}`")]
    Apply { path: String, type_path: String },
}
