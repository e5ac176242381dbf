use serde::Serialize;
use std::{
    fs::{self, ReadDir},
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("No file named '{0}' in '{1}' or its ancestors")]
        NotFoundInAncestors(String, PathBuf),

        #[error("Cannot serialize to JSON (dest='{0}'): {1}")]
        SerializeToJson(PathBuf, #[source] serde_json::Error),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

/// Fails instead of overwriting an existing file.
#[must_use]
pub fn create_new_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    use std::io::Write as _;

    let filepath = filepath.as_ref();
    if let Some(dir) = filepath.parent() {
        self::mkdir_all(dir)?;
    }
    let mut f = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(filepath)
        .map_err(|e| Error::SingleIO("Cannot create file", filepath.to_owned(), e))?;
    f.write_all(contents.as_ref())
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.to_owned(), e))
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_json_pretty_with_mkdir<P, T>(filepath: P, data: &T) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let s = serde_json::to_string_pretty(data)
        .map_err(|e| Error::SerializeToJson(filepath.as_ref().to_owned(), e))?;
    write_with_mkdir(filepath, s)
}

/// Looks for `filename` in `start_dir` and then in each of its ancestors.
pub fn find_file_in_ancestors(start_dir: impl AsRef<Path>, filename: &str) -> Result<PathBuf> {
    let start_dir = start_dir.as_ref();
    start_dir
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|path| path.is_file())
        .ok_or_else(|| Error::NotFoundInAncestors(filename.to_owned(), start_dir.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("fsutil-test")
            .join(format!("{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn find_file_in_ancestors_walks_up() {
        let root = tmp_dir("ancestors");
        let nested = root.join("a/b/c");
        mkdir_all(&nested).unwrap();
        write(root.join("marker.toml"), "x = 1").unwrap();

        let found = find_file_in_ancestors(&nested, "marker.toml").unwrap();
        assert_eq!(found, root.join("marker.toml"));

        let err = find_file_in_ancestors(&nested, "missing.toml").unwrap_err();
        assert!(matches!(err, Error::NotFoundInAncestors(name, _) if name == "missing.toml"));
    }

    #[test]
    fn create_new_refuses_to_overwrite() {
        let root = tmp_dir("create-new");
        let path = root.join("sub/file.txt");
        create_new_with_mkdir(&path, "first").unwrap();
        assert!(create_new_with_mkdir(&path, "second").is_err());
        assert_eq!(read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn json_is_written_pretty() {
        let root = tmp_dir("json");
        let path = root.join("out/data.json");
        write_json_pretty_with_mkdir(&path, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "{\n  \"a\": 1\n}");
    }
}
