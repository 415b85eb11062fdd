#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropsError {
    #[error("property path is empty")]
    EmptyPath,

    #[error("property path '{path}' has an empty segment")]
    EmptySegment { path: String },

    #[error("property path '{path}' crosses the non-group value at '{at}'")]
    NotAGroup { path: String, at: String },

    #[error("no dictionary node at '{0}'")]
    MissingNode(String),
}

pub type PropsResult<T> = Result<T, PropsError>;
