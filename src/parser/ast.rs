// Import types extracted from Python source files
//
// These are produced by the line-oriented importer and later resolved
// against the project by the linker.

use crate::analysis::FileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One import declaration inside a source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Import {
    /// The referenced module name as written
    pub target_name: String,
    /// `import x` imports the entire module, `from x import y` does not
    pub entire_file: bool,
    /// Names pulled in by a `from` import; may contain `*`
    pub imported_symbols: Vec<String>,
    /// 1-based line where the statement starts
    pub line: usize,
    /// Project file this import points to, set by the linker
    #[serde(skip)]
    pub resolved: Option<FileId>,
}

impl Import {
    /// Create an `import x` style import
    pub fn entire(target_name: &str, line: usize) -> Self {
        Self {
            target_name: target_name.to_string(),
            entire_file: true,
            imported_symbols: Vec::new(),
            line,
            resolved: None,
        }
    }

    /// Create a `from x import y` style import
    pub fn partial(target_name: &str, symbols: Vec<String>, line: usize) -> Self {
        Self {
            target_name: target_name.to_string(),
            entire_file: false,
            imported_symbols: symbols,
            line,
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// `from x import *`
    pub fn is_wildcard(&self) -> bool {
        !self.entire_file && self.imported_symbols.iter().any(|s| s == "*")
    }

    /// Relative imports (`from . import x`) are never resolved
    pub fn is_relative(&self) -> bool {
        self.target_name.starts_with('.')
    }
}

/// Something the importer noticed but skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    /// 1-based line where the statement starts
    pub line: usize,
    pub kind: ImportWarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarningKind {
    /// `from x` with no `import` clause
    MissingImportKeyword { module: String },
    /// `import` or `from x import` with nothing after it
    NoNames,
    /// File ended inside a continuation or an open parenthesis
    UnterminatedStatement,
}

impl ImportWarning {
    pub fn new(line: usize, kind: ImportWarningKind) -> Self {
        Self { line, kind }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ImportWarningKind::MissingImportKeyword { module } => write!(
                f,
                "line {}: 'from {}' has no import clause",
                self.line, module
            ),
            ImportWarningKind::NoNames => {
                write!(f, "line {}: import statement names nothing", self.line)
            }
            ImportWarningKind::UnterminatedStatement => write!(
                f,
                "line {}: import statement is cut off at end of file",
                self.line
            ),
        }
    }
}

/// Output of scanning one file's text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScan {
    /// Imports in source order
    pub imports: Vec<Import>,
    pub warnings: Vec<ImportWarning>,
}
