//! Filesystem traversal.

use std::any::Any;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{trace, warn};

use crate::{Field, Rule, RuleType, Session};

/// `file-filter`: walks a path (or its direct children) and calls the `then`
/// rule sets for every entry that passes the filter.
///
/// The input must be a path given as `PathBuf`, `String` or `&'static str`.
/// Before each call the entry's full path and file name are stored in the
/// `varpath` and `varname` variables.
#[derive(Debug, Clone)]
pub struct FileFilterRule {
    pub then: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub file: bool,
    pub folder: bool,
    pub inverse: bool,
    pub children_files: bool,
    pub children_folders: bool,
    pub var_name: String,
    pub var_path: String,
}

impl Default for FileFilterRule {
    fn default() -> Self {
        Self {
            then: None,
            name: None,
            path: None,
            file: false,
            folder: false,
            inverse: false,
            children_files: false,
            children_folders: false,
            var_name: "file-name".to_owned(),
            var_path: "file-path".to_owned(),
        }
    }
}

impl FileFilterRule {
    #[must_use]
    pub fn rule_type() -> RuleType {
        RuleType::builder::<FileFilterRule>("file-filter")
            .description("Filter files using advanced filter settings")
            .field(
                Field::new("then", "Defines the rulesets that will be run if the filter matches")
                    .required(),
                |r: &mut FileFilterRule, v| r.then = v,
            )
            .field(
                Field::new("name", "Filter by name (Regex)"),
                |r: &mut FileFilterRule, v| r.name = v,
            )
            .field(
                Field::new("path", "Filter by path (Regex)"),
                |r: &mut FileFilterRule, v| r.path = v,
            )
            .field(
                Field::new("file", "Check if the path is a file"),
                |r: &mut FileFilterRule, v| r.file = v,
            )
            .field(
                Field::new("folder", "Check if the path is a folder"),
                |r: &mut FileFilterRule, v| r.folder = v,
            )
            .field(
                Field::new("inverse", "Defines if the filter will be inverse").default_value(false),
                |r: &mut FileFilterRule, v| r.inverse = v,
            )
            .field(
                Field::new("childrenfiles", "Iterate over children files (Folder Only)"),
                |r: &mut FileFilterRule, v| r.children_files = v,
            )
            .field(
                Field::new("childrenfolders", "Iterate over children folders (Folder Only)"),
                |r: &mut FileFilterRule, v| r.children_folders = v,
            )
            .field(
                Field::new("varname", "Defines the output name variable").default_value("file-name"),
                |r: &mut FileFilterRule, v| r.var_name = v,
            )
            .field(
                Field::new("varpath", "Defines the output path variable").default_value("file-path"),
                |r: &mut FileFilterRule, v| r.var_path = v,
            )
            .build()
    }

    /// Whether `path` passes the filter, after applying `inverse`.
    #[must_use]
    pub fn filter(&self, path: &Path) -> bool {
        self.matches(path) != self.inverse
    }

    fn matches(&self, path: &Path) -> bool {
        if self.folder && !path.is_dir() {
            return false;
        }
        if self.file && !path.is_file() {
            return false;
        }

        let name = file_name(path);
        if let Some(pattern) = &self.name
            && !is_match(pattern, &name)
        {
            return false;
        }
        if let Some(pattern) = &self.path
            && !is_match(pattern, &path.to_string_lossy())
        {
            return false;
        }

        true
    }

    fn call_next(&self, path: &Path, session: &mut Session<'_>) {
        if !self.filter(path) {
            trace!(path = %path.display(), "filtered out");
            return;
        }

        session.set_variable(self.var_path.as_str(), path.to_string_lossy());
        session.set_variable(self.var_name.as_str(), file_name(path));

        if let Some(then) = &self.then {
            session.call(then, &path.to_path_buf());
        }
    }
}

impl Rule for FileFilterRule {
    fn test(&self, session: &mut Session<'_>, input: &dyn Any) -> bool {
        let Some(root) = input_path(input) else {
            warn!("file-filter input is not a path");
            return true;
        };

        if root.is_dir() && (self.children_files || self.children_folders) {
            let entries = children(&root);
            if self.children_files {
                for entry in entries.iter().filter(|p| p.is_file()) {
                    self.call_next(entry, session);
                }
            }
            if self.children_folders {
                for entry in entries.iter().filter(|p| p.is_dir()) {
                    self.call_next(entry, session);
                }
            }
        }

        if !self.children_files && !self.children_folders {
            self.call_next(&root, session);
        }

        true
    }
}

fn input_path(input: &dyn Any) -> Option<PathBuf> {
    if let Some(path) = input.downcast_ref::<PathBuf>() {
        Some(path.clone())
    } else if let Some(path) = input.downcast_ref::<String>() {
        Some(PathBuf::from(path))
    } else {
        input.downcast_ref::<&str>().map(|path| PathBuf::from(*path))
    }
}

/// Direct children of `dir`, sorted by path. Unreadable entries are skipped.
fn children(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(read) => read.filter_map(Result::ok).map(|e| e.path()).collect(),
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "cannot read directory");
            Vec::new()
        }
    };
    entries.sort();
    entries
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_match(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(err) => {
            warn!(pattern, error = %err, "invalid file-filter pattern");
            false
        }
    }
}
