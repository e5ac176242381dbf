use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single (input, expected output) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Test case stored as a `NAME.in` / `NAME.out` file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsTestcase {
    name: String,
    input_data_path: PathBuf,
    expected_data_path: PathBuf,
}

impl FsTestcase {
    pub const INPUT_EXT: &str = "in";
    pub const EXPECTED_EXT: &str = "out";

    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        expected: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_data_path: input.into(),
            expected_data_path: expected.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a test case if `path` is a `.in` file with a sibling `.out` file.
    pub fn find_by_input_file_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if path.extension()? != Self::INPUT_EXT {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy().into_owned();
        let expected = path.with_extension(Self::EXPECTED_EXT);
        if !expected.is_file() {
            log::warn!(
                "Skipping {}: no matching '.{}' file",
                path.to_string_lossy(),
                Self::EXPECTED_EXT
            );
            return None;
        }
        Some(Self::new(name, path, expected))
    }

    /// Lists the test cases in `dir`, sorted by name.
    pub fn enumerate(dir: impl AsRef<Path>) -> fsutil::Result<Vec<Self>> {
        let mut res = Vec::new();
        for entry in fsutil::read_dir(&dir)?.filter_map(Result::ok) {
            let Ok(ft) = entry.file_type() else {
                continue
            };
            if ft.is_dir() {
                continue;
            }
            if let Some(t) = Self::find_by_input_file_path(entry.path()) {
                res.push(t)
            }
        }
        res.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(res)
    }

    pub fn load(&self) -> fsutil::Result<TestCase> {
        Ok(TestCase {
            input: fsutil::read_to_string(&self.input_data_path)?,
            expected_output: fsutil::read_to_string(&self.expected_data_path)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enumerate_pairs_in_and_out_files_sorted() {
        let dir = std::env::temp_dir()
            .join("chill-core-test")
            .join(format!("testcases-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        fsutil::mkdir_all(&dir).unwrap();
        for (name, input, output) in [("sample-2", "2\n", "4\n"), ("sample-1", "1\n", "1\n")] {
            fsutil::write(dir.join(format!("{}.in", name)), input).unwrap();
            fsutil::write(dir.join(format!("{}.out", name)), output).unwrap();
        }
        // orphan input and unrelated file are ignored
        fsutil::write(dir.join("orphan.in"), "0\n").unwrap();
        fsutil::write(dir.join("notes.txt"), "hello").unwrap();

        let cases = FsTestcase::enumerate(&dir).unwrap();
        let names: Vec<_> = cases.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["sample-1", "sample-2"]);
        assert_eq!(cases[1].load().unwrap(), TestCase::new("2\n", "4\n"));
    }
}
