pub type PixelcastResult<T> = Result<T, PixelcastError>;

#[derive(thiserror::Error, Debug)]
pub enum PixelcastError {
    #[error("invalid length: {0}")]
    InvalidLength(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("empty timeline: {0}")]
    EmptyTimeline(String),

    #[error("import failed: {0}")]
    ImportDecode(String),

    #[error("no device selected")]
    NoDevice,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelcastError {
    pub fn invalid_length(msg: impl Into<String>) -> Self {
        Self::InvalidLength(msg.into())
    }

    pub fn invalid_hex(msg: impl Into<String>) -> Self {
        Self::InvalidHex(msg.into())
    }

    pub fn index_out_of_range(msg: impl Into<String>) -> Self {
        Self::IndexOutOfRange(msg.into())
    }

    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    pub fn empty_timeline(msg: impl Into<String>) -> Self {
        Self::EmptyTimeline(msg.into())
    }

    pub fn import_decode(msg: impl Into<String>) -> Self {
        Self::ImportDecode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PixelcastError::invalid_hex("x")
                .to_string()
                .contains("invalid hex:")
        );
        assert!(
            PixelcastError::invalid_length("x")
                .to_string()
                .contains("invalid length:")
        );
        assert!(
            PixelcastError::import_decode("x")
                .to_string()
                .contains("import failed:")
        );
        assert!(
            PixelcastError::storage("x")
                .to_string()
                .contains("storage error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PixelcastError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
