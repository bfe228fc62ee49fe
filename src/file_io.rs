use std::convert::AsRef;
use std::fs;
use std::path::{Path, PathBuf};

/// The sibling file a document is staged in before it replaces the original.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the contents of a file so that readers only ever see the old
/// or the new contents, creating the parent directory if needed.
pub fn write_atomically(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent)?;
        }
    }

    // Stage next to the target so the rename stays on one filesystem.
    let staging = staging_path(path);
    fs::write(&staging, contents)?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_staging_path() {
        let result = staging_path(Path::new("/some/dir/categories.json"));
        assert_eq!(result, PathBuf::from("/some/dir/categories.json.tmp"));
    }

    #[test]
    fn test_write_atomically_replaces_contents() {
        let temp = tempdir::TempDir::new("test").unwrap();
        let path = temp.path().join("a.json");
        fs::write(&path, "old text\n").unwrap();

        write_atomically(&path, "new text\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new text\n");
        // The staging file does not linger.
        assert!(!fs::exists(staging_path(&path)).unwrap());
    }

    #[test]
    fn test_write_atomically_creates_parent() {
        let temp = tempdir::TempDir::new("test").unwrap();
        let path = temp.path().join("nested").join("deeper").join("a.json");

        write_atomically(&path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_failed_rename_cleans_up() {
        let temp = tempdir::TempDir::new("test").unwrap();
        let path = temp.path().join("taken");
        fs::create_dir(&path).unwrap();

        assert!(write_atomically(&path, "text").is_err());
        assert!(path.is_dir());
        assert!(!fs::exists(staging_path(&path)).unwrap());
    }
}
