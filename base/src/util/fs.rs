use std::fs::{read, write, File};
use std::path::Path;

use crate::defs::{IntoResult, Result};

fn describe(action: &str, path: &Path) -> String {
    if let Some(path) = path.to_str() {
        format!("failed to {} file '{}'", action, path)
    } else {
        format!("failed to {} file", action)
    }
}

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    File::open(path).res(|| describe("open", path))
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    read(path).res(|| describe("read", path))
}

// Writes into a sibling `.part` file and renames it into place.
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    write(&tmp, data).res(|| describe("write", path))?;
    std::fs::rename(&tmp, path).res(|| describe("rename", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_file() {
        let path = std::env::temp_dir()
            .join(format!("base-fs-test-{}.bin", std::process::id()));
        write_file(&path, b"glTF").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"glTF".to_vec());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_file("/nonexistent/face.glb").unwrap_err();
        assert_eq!(
            err.description,
            "failed to open file '/nonexistent/face.glb'"
        );
    }
}
