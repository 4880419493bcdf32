//! File name patterns used while searching for project files.

use std::fmt;

/// `*.ext` (extension, case-insensitive) or an exact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePattern {
    Extension(String),
    Name(String),
}

impl FilePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix("*.") {
            Some(ext) => FilePattern::Extension(ext.to_ascii_lowercase()),
            None => FilePattern::Name(pattern.to_string()),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            FilePattern::Extension(ext) => file_name
                .rsplit_once('.')
                .is_some_and(|(stem, e)| !stem.is_empty() && e.eq_ignore_ascii_case(ext)),
            FilePattern::Name(name) => file_name == name,
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilePattern::Extension(ext) => write!(f, "*.{ext}"),
            FilePattern::Name(name) => f.write_str(name),
        }
    }
}
