use mapdraw_core::PathError;

#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode image: {0}")]
    Encode(String),
    #[error("drawing surface: {0}")]
    Surface(String),
}
