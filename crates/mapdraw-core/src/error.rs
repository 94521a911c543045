#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    /// Missing operand or malformed number; `index` is the offending token.
    #[error("path parse error at token {index}: {message}")]
    Parse { index: usize, message: String },
    #[error("unsupported path command `{0}`")]
    UnsupportedCommand(char),
}

impl PathError {
    pub(crate) fn parse(index: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            index,
            message: message.into(),
        }
    }
}
