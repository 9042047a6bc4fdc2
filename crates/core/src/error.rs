use crate::roles::{Action, Category};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] wardview_types::TextError),

    #[error("storage substrate failure: {0}")]
    Storage(#[from] StoreError),
    #[error("failed to serialize collection {collection}: {source}")]
    Serialization {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("collection {collection} is malformed ({detail}), refusing to rewrite it")]
    MalformedCollection { collection: String, detail: String },
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),

    #[error("{role} may not {action} {category} records")]
    NotPermitted {
        role: String,
        action: Action,
        category: Category,
    },
    #[error("no {collection} record with id {id}")]
    RecordNotFound { collection: String, id: String },

    #[error("attachment storage error: {0}")]
    Files(#[from] wardview_files::FilesError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
