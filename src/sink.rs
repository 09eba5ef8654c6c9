//! Output sinks
//!
//! Generation only produces text. Where it goes is decided here: the root
//! element's output-file tag wins over the caller's fallback path, and
//! without either the text goes to stdout.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::model::Element;
use crate::vocabulary::Vocabulary;

/// Destination for rendered schema text
pub trait OutputSink {
    fn write(&self, text: &str) -> Result<()>;
}

/// Writes to a file, creating parent directories
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for FileSink {
    fn write(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        info!(path = %self.path.display(), bytes = text.len(), "schema written");
        Ok(())
    }
}

/// Prints to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// Pick the output path: the root's file-name tag, else `fallback`
///
/// A relative tag value is resolved against `base_dir` when one is given.
pub fn resolve_output_path(
    root: &Element,
    vocabulary: &Vocabulary,
    fallback: Option<&Path>,
    base_dir: Option<&Path>,
) -> Option<PathBuf> {
    let tagged = root
        .tag(&vocabulary.output_file_tag)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    match tagged {
        Some(path) if path.is_relative() => Some(match base_dir {
            Some(base) => base.join(path),
            None => path,
        }),
        Some(path) => Some(path),
        None => fallback.map(Path::to_path_buf),
    }
}

/// Sink for a resolved path, stdout when there is none
pub fn sink_for(path: Option<PathBuf>) -> Box<dyn OutputSink> {
    match path {
        Some(path) => Box::new(FileSink::new(path)),
        None => Box::new(StdoutSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_wins_over_fallback() {
        let vocabulary = Vocabulary::default();
        let root = Element::class("Person").with_tag("schemaFileName", "person.schema.json");
        let path = resolve_output_path(&root, &vocabulary, Some(Path::new("other.json")), Some(Path::new("out")));
        assert_eq!(path, Some(PathBuf::from("out/person.schema.json")));
    }

    #[test]
    fn test_fallback_without_tag() {
        let vocabulary = Vocabulary::default();
        let root = Element::class("Person");
        assert_eq!(
            resolve_output_path(&root, &vocabulary, Some(Path::new("other.json")), None),
            Some(PathBuf::from("other.json"))
        );
        assert_eq!(resolve_output_path(&root, &vocabulary, None, None), None);
    }

    #[test]
    fn test_file_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/person.json");
        FileSink::new(&path).write("{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}
