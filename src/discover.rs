use anyhow::Result;
use glob::{glob_with, GlobResult, MatchOptions, Pattern};
use std::{collections::BTreeSet, path::Path};
use tracing::{debug, warn};

use crate::{config::Config, error::TallyError};

/// Name of a matched regular file. Unreadable entries and names that are
/// not valid UTF-8 are logged and dropped.
fn file_name(entry: GlobResult) -> Option<String> {
    let path = match entry {
        Ok(path) => path,
        Err(e) => {
            warn!(path = %e.path().display(), "skipping unreadable entry: {}", e.error());
            return None;
        }
    };
    if !path.is_file() {
        return None;
    }

    let name = path.file_name()?;
    match name.to_str() {
        Some(n) => Some(n.to_string()),
        None => {
            warn!(path = %path.display(), "skipping file with non UTF-8 name");
            None
        }
    }
}

/// Bare file names of regular files in `dir` matching `pattern`. Like a
/// shell glob, wildcards never match a leading dot.
fn matching_names(dir: &Path, pattern: &str) -> Result<BTreeSet<String>> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob_with(&full, options).map_err(|source| TallyError::InvalidPattern {
        pattern: full.clone(),
        source,
    })?;

    Ok(paths.filter_map(file_name).collect())
}

/// Return every candidate input in `cfg.dir`: files matching the input
/// pattern minus files matching the output pattern, so earlier results are
/// never picked up as new inputs.
///
/// Fails with [`TallyError::NoInput`] when nothing is left.
pub fn discover(cfg: &Config) -> Result<BTreeSet<String>> {
    let inputs = matching_names(&cfg.dir, &cfg.input_glob)?;
    let outputs = matching_names(&cfg.dir, &cfg.exclude_glob)?;
    debug!(
        inputs = inputs.len(),
        outputs = outputs.len(),
        "scanned {}",
        cfg.dir.display()
    );

    let candidates: BTreeSet<String> = inputs.difference(&outputs).cloned().collect();
    if candidates.is_empty() {
        return Err(TallyError::NoInput {
            dir: cfg.dir.clone(),
        }
        .into());
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> Result<()> {
        fs::write(dir.join(name), "x\n")?;
        Ok(())
    }

    #[test]
    fn excludes_previous_outputs() -> Result<()> {
        let dir = tempdir()?;
        for name in ["a.csv", "b.csv", "output_a.csv", "notes.txt"] {
            touch(dir.path(), name)?;
        }

        let found = discover(&Config::in_dir(dir.path()))?;
        let expected: BTreeSet<String> = ["a.csv", "b.csv"].iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected);
        Ok(())
    }

    #[test]
    fn only_outputs_is_no_input() -> Result<()> {
        let dir = tempdir()?;
        touch(dir.path(), "output_a.csv")?;
        touch(dir.path(), "readme.md")?;

        let err = discover(&Config::in_dir(dir.path())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TallyError>(),
            Some(TallyError::NoInput { .. })
        ));
        Ok(())
    }

    #[test]
    fn skips_directories_named_like_csv() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("archive.csv"))?;
        touch(dir.path(), "real.csv")?;

        let found = discover(&Config::in_dir(dir.path()))?;
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["real.csv"]);
        Ok(())
    }

    #[test]
    fn ignores_hidden_files() -> Result<()> {
        let dir = tempdir()?;
        touch(dir.path(), "a.csv")?;
        touch(dir.path(), ".hidden.csv")?;

        let found = discover(&Config::in_dir(dir.path()))?;
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["a.csv"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn skips_non_utf8_names() -> Result<()> {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempdir()?;
        touch(dir.path(), "a.csv")?;
        let odd = OsStr::from_bytes(b"bad\xff.csv");
        if fs::write(dir.path().join(odd), "x\n").is_err() {
            // filesystem rejects the name
            return Ok(());
        }

        let found = discover(&Config::in_dir(dir.path()))?;
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["a.csv"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_dir_yields_no_input() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let root = tempdir()?;
        let locked = root.path().join("locked");
        fs::create_dir(&locked)?;
        touch(&locked, "a.csv")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // root ignores the mode bits, nothing to check then
        let readable = fs::read_dir(&locked).is_ok();
        let result = discover(&Config::in_dir(&locked));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        if readable {
            return Ok(());
        }

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TallyError>(),
            Some(TallyError::NoInput { .. })
        ));
        Ok(())
    }

    #[test]
    fn handles_glob_metacharacters_in_dir() -> Result<()> {
        let root = tempdir()?;
        let odd = root.path().join("data[2024]");
        fs::create_dir(&odd)?;
        touch(&odd, "a.csv")?;

        let found = discover(&Config::in_dir(&odd))?;
        assert!(found.contains("a.csv"));
        Ok(())
    }
}
