use std::path::PathBuf;

pub type VizResult<T> = Result<T, VizError>;

#[derive(thiserror::Error, Debug)]
pub enum VizError {
    #[error("container not found: #{0}")]
    ContainerNotFound(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("no scene to export; load data first")]
    NoScene,

    #[error("failed to parse scene markup: {0}")]
    Parse(String),

    #[error("failed to allocate a {width}x{height} bitmap")]
    Allocate { width: u32, height: u32 },

    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("failed to convert bitmap to PDF: {0}")]
    Pdf(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn encode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_failure() {
        assert_eq!(
            VizError::ContainerNotFound("tree".into()).to_string(),
            "container not found: #tree"
        );
        assert!(ExportError::NoScene.to_string().contains("no scene"));
        assert!(
            ExportError::encode("PNG", "boom")
                .to_string()
                .starts_with("failed to encode PNG")
        );
    }
}
