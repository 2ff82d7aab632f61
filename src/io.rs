use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extension of sequencer source files.
pub const SEQ_FILE_EXT: &str = "seq";
/// Older sequencer files are plain text files.
pub const TXT_FILE_EXT: &str = "txt";

/// Returns `path` if it is a sequencer file, or every sequencer file found
/// below `path` if it is a directory.  Files are sorted by path.
///
/// A directory is searched for files with extension `ext` only.  A file named
/// directly may also have the `.txt` extension.
pub fn get_files(path: &Path, ext: &str) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = vec![];
    if path.is_dir() {
        for f in std::fs::read_dir(path)? {
            let f = f?;
            let fty = f.file_type()?;
            if fty.is_file() {
                match f.path().extension() {
                    Some(ex) if ex.to_ascii_lowercase() == ext => {
                        files.push(f.path());
                    }
                    _ => (),
                }
            } else if fty.is_dir() {
                let mut sub_files = get_files(&f.path(), ext)?;
                files.append(&mut sub_files);
            }
        }
        files.sort();
    } else {
        let accepted = |ex: &OsStr| {
            let ex = ex.to_ascii_lowercase();
            ex == ext || ex == TXT_FILE_EXT
        };
        match path.extension() {
            Some(ex) if accepted(ex) => files.push(path.to_path_buf()),
            ex => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "{} is not a sequencer file, expected extension {} or {} but got {}",
                        path.display(),
                        ext,
                        TXT_FILE_EXT,
                        ex.map(|e| e.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "none".into())
                    ),
                ));
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn directory_is_searched_recursively() {
        let root = std::env::temp_dir().join(format!("reb-seq-files-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("b.seq"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("sub").join("a.SEQ"), "").unwrap();

        let files = get_files(&root, SEQ_FILE_EXT).unwrap();
        fs::remove_dir_all(&root).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(&root).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"b.seq".to_string()));
        assert!(names.iter().any(|n| n.ends_with("a.SEQ")));
    }

    #[test]
    fn single_file() {
        let files = get_files(Path::new("readout.seq"), SEQ_FILE_EXT).unwrap();
        assert_eq!(files, vec![PathBuf::from("readout.seq")]);

        let files = get_files(Path::new("seq/readout.TXT"), SEQ_FILE_EXT).unwrap();
        assert_eq!(files, vec![PathBuf::from("seq/readout.TXT")]);

        let err = get_files(Path::new("readout.yaml"), SEQ_FILE_EXT).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("expected extension seq or txt but got yaml"));

        let err = get_files(Path::new("readout"), SEQ_FILE_EXT).unwrap_err();
        assert!(err.to_string().ends_with("but got none"));
    }
}
