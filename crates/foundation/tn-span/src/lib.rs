//! Source positions for declarations and diagnostics
//!
//! The resolver only ever reports line granularity, so a position is a file
//! plus a 1-based line. Line 0 is never produced by the front end; positions
//! that come from imported packages are modelled as `None` by callers.

use derive_more::From;
use serde::{Deserialize, Serialize};

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, From, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A line in a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub file: FileId,
    pub line: u32,
}

impl Pos {
    pub fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }

    /// Same file, another line
    pub fn with_line(self, line: u32) -> Self {
        Self { line, ..self }
    }
}

/// Names of the files of one compilation unit
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    files: Vec<String>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id
    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(name.into());
        id
    }

    /// Name of a registered file
    pub fn file_name(&self, file: FileId) -> Option<&str> {
        self.files.get(file.0 as usize).map(String::as_str)
    }

    /// Render a position as `file:line`
    pub fn render(&self, pos: Pos) -> String {
        match self.file_name(pos.file) {
            Some(name) => format!("{name}:{}", pos.line),
            None => format!("<unknown>:{}", pos.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_known_and_unknown_files() {
        let mut map = SourceMap::new();
        let main = map.add_file("main.go");
        assert_eq!(map.render(Pos::new(main, 12)), "main.go:12");
        assert_eq!(map.render(Pos::new(FileId::from(7), 3)), "<unknown>:3");
    }
}
