use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub trait PathExt {
    fn has_extension(&self, ext: &str) -> bool;
    /// A single relative file name without directory components.
    fn is_bare_name(&self) -> bool;
}

impl PathExt for Path {
    fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }

    fn is_bare_name(&self) -> bool {
        self.is_relative() && self.components().count() == 1
    }
}

/// Expands `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Places bare file names under `output_dir`; other paths are used as given.
pub fn resolve_output(output_dir: &Path, path: &Path) -> PathBuf {
    if path.is_bare_name() {
        output_dir.join(path)
    } else {
        path.to_path_buf()
    }
}
