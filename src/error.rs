use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a run
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: file is not valid UTF-8", path.display())]
    Decode { path: PathBuf, line: usize },

    #[error("{}:{line}:{column}: {message}", path.display())]
    DescriptorSyntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{}:{line}:{column}: {message}", path.display())]
    DescriptorSecurity {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Decode failure for `bytes` read from `path`, pointing at the line that
    /// holds the first invalid byte
    pub fn decode(path: impl AsRef<Path>, bytes: &[u8], valid_up_to: usize) -> Self {
        let line = bytes[..valid_up_to].iter().filter(|&&b| b == b'\n').count() + 1;
        Error::Decode {
            path: path.as_ref().to_path_buf(),
            line,
        }
    }

    /// Name of the failure class as shown to the user
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io { .. } => "IOError",
            Error::Decode { .. } => "DecodeError",
            Error::DescriptorSyntax { .. } => "DescriptorSyntaxError",
            Error::DescriptorSecurity { .. } => "DescriptorSecurityError",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Error::Io { path, .. }
            | Error::Decode { path, .. }
            | Error::DescriptorSyntax { path, .. }
            | Error::DescriptorSecurity { path, .. } => path,
        }
    }
}

/// Read `path` as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        let valid_up_to = e.utf8_error().valid_up_to();
        Error::decode(path, e.as_bytes(), valid_up_to)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_decode_error_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.c");
        fs::write(&path, b"int a;\nint b;\n\xff\xfe\n").unwrap();

        let err = read_text(&path).unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
        assert!(matches!(err, Error::Decode { line: 3, .. }));
        assert!(err.to_string().ends_with(":3: file is not valid UTF-8"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.gyp");

        let err = read_text(&path).unwrap_err();
        assert_eq!(err.kind(), "IOError");
        assert_eq!(err.path(), path.as_path());
    }
}
