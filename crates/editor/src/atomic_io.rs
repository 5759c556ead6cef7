use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes `text` to a sibling staging file and renames it over `path`.
/// Readers of `path` never observe a partially written file.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path_for(path);
    if let Err(error) = write_staging(&staging, text.as_bytes()) {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    promote(&staging, path)
}

fn write_staging(staging: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(staging)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn promote(staging: &Path, final_path: &Path) -> io::Result<()> {
    // rename() does not replace an existing file on every platform.
    match fs::remove_file(final_path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(staging);
            return Err(error);
        }
    }

    fs::rename(staging, final_path).inspect_err(|_| {
        let _ = fs::remove_file(staging);
    })
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("export");
    path.with_file_name(format!(".{file_name}.partial"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("map.json");

        write_text_atomic(&path, "first").expect("first write");
        write_text_atomic(&path, "second").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
        assert!(!staging_path_for(&path).exists());
    }

    #[test]
    fn staging_file_sits_beside_target() {
        let staging = staging_path_for(Path::new("out/map.json"));
        assert_eq!(staging, PathBuf::from("out/.map.json.partial"));
    }
}
