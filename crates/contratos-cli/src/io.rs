/// File and stdin reading with size enforcement.
///
/// This module is the single entry point for input I/O in the `contratos`
/// binary. `contratos-core` never touches the filesystem, and the loader
/// crate only sees bytes handed to it from here.
///
/// - Disk files: size checked via `std::fs::metadata` before any read.
/// - Stdin: buffered through `Read::take` so allocation is bounded.
/// - All I/O errors become [`CliError`] variants with exit code 2.
use std::io::Read as _;
use std::path::Path;

use crate::cli::PathOrStdin;
use crate::error::CliError;

/// Display name used for provenance when reading stdin.
pub const STDIN_NAME: &str = "stdin";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Raw input bytes plus the file name used for provenance.
#[derive(Debug)]
pub struct Input {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reads the entire contents of `source`, refusing anything over `max_size` bytes.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) for a missing file, a permission
/// problem, an oversized input, or any other I/O error.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<Input, CliError> {
    match source {
        PathOrStdin::Path(path) => Ok(Input {
            file_name: file_name_of(path),
            bytes: read_file(path, max_size)?,
        }),
        PathOrStdin::Stdin => Ok(Input {
            file_name: STDIN_NAME.to_owned(),
            bytes: read_stdin(max_size)?,
        }),
    }
}

/// Returns the last path component, or the whole path when there is none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

// ---------------------------------------------------------------------------
// Disk file reading
// ---------------------------------------------------------------------------

fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| io_error_to_cli(&e, path))?
        .len();
    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }
    std::fs::read(path).map_err(|e| io_error_to_cli(&e, path))
}

/// Maps a `std::io::Error` arising from a disk-file operation to a [`CliError`].
pub fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == std::io::ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == std::io::ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stdin reading
// ---------------------------------------------------------------------------

/// Reads stdin, capped at `max_size` bytes.
///
/// If exactly `max_size` bytes arrive, one more byte is probed to tell
/// "at the limit" from "over the limit".
fn read_stdin(max_size: u64) -> Result<Vec<u8>, CliError> {
    let stdin = std::io::stdin();
    let mut limited = stdin.lock().take(max_size);
    let mut buf: Vec<u8> = Vec::new();
    limited
        .read_to_end(&mut buf)
        .map_err(|e| CliError::StdinReadError {
            detail: e.to_string(),
        })?;

    if buf.len() as u64 == max_size {
        let mut probe = [0u8; 1];
        let extra = std::io::stdin()
            .lock()
            .read(&mut probe)
            .map_err(|e| CliError::StdinReadError {
                detail: e.to_string(),
            })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use std::io::Write as _;
    use std::path::PathBuf;

    use super::*;

    fn temp_file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents).expect("write temp file");
        f
    }

    #[test]
    fn reads_bytes_and_file_name() {
        let f = temp_file_with(b"N\xFAmero;Valor\n");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let input = read_input(&source, 1024).expect("should read file");
        assert_eq!(input.bytes, b"N\xFAmero;Valor\n");
        assert_eq!(input.file_name, file_name_of(f.path()));
    }

    #[test]
    fn file_exactly_at_limit_succeeds() {
        let f = temp_file_with(b"hello");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        assert!(read_input(&source, 5).is_ok());
    }

    #[test]
    fn file_over_limit_reports_actual_size() {
        let f = temp_file_with(b"hello world");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_input(&source, 4).expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
        match err {
            CliError::FileTooLarge {
                actual: Some(n), ..
            } => assert_eq!(n, 11),
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn nonexistent_file_returns_file_not_found() {
        let source = PathOrStdin::Path(PathBuf::from("/no/such/dir/contratos.xlsx"));
        let err = read_input(&source, 1024).expect_err("should fail");
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }
}
