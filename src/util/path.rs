use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

pub trait PathExt {
    /// Expanded path, joined onto `base` when still relative.
    fn resolve_from(&self, base: &Path) -> PathBuf;
}

impl PathExt for Path {
    fn resolve_from(&self, base: &Path) -> PathBuf {
        let expanded = PathBuf::from(expand_env_vars(&self.to_string_lossy()));
        if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        }
    }
}
