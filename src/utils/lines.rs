use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Something that can hand back the lines of a text file.
pub trait LineSource {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads lines straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLines;

impl LineSource for FsLines {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        read_lines(path)
    }
}

pub fn read_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    BufReader::new(file).lines().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_lines_strips_terminators() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first line\r\nsecond\n\nlast").unwrap();

        let lines = FsLines.read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["first line", "second", "", "last"]);
    }

    #[test]
    fn test_read_lines_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_lines(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_lines_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok\n\xff\xfe\n").unwrap();
        let err = read_lines(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
