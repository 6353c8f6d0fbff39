// Line-oriented import extraction for Python files
//
// This does not parse Python. Each physical line is trimmed, joined with
// its continuation lines, and then checked for a leading `import` or
// `from` keyword. Everything else is skipped without complaint.

use crate::analysis::SourceFile;
use crate::error::{Error, Result};
use crate::parser::ast::*;
use crate::parser::import_line::parse_import_names;
use crate::text::{self, strip_comment, strip_continuation, strip_keyword, trim};
use std::path::Path;
use tracing::debug;

/// Extracts import statements from Python source files
#[derive(Debug, Clone, Default)]
pub struct PythonImporter;

/// A logical line still being assembled from several physical lines
struct Pending {
    start_line: usize,
    text: String,
}

impl PythonImporter {
    pub fn new() -> Self {
        Self
    }

    /// Read a file and return it with its (unresolved) imports. The file
    /// name is the file stem; notes, to-dos and back references are empty.
    pub fn extract_imports(&self, path: &Path) -> Result<SourceFile> {
        let (file, warnings) = self.extract_with_warnings(path)?;
        for warning in &warnings {
            debug!("{}: {}", path.display(), warning);
        }
        Ok(file)
    }

    /// Like [`extract_imports`](Self::extract_imports) but also hands back
    /// whatever the scan flagged.
    pub fn extract_with_warnings(&self, path: &Path) -> Result<(SourceFile, Vec<ImportWarning>)> {
        let bytes = std::fs::read(path).map_err(|e| Error::read(path, e))?;
        let source = String::from_utf8_lossy(&bytes);

        let scan = self.extract_from_source(&source);
        debug!(
            "{}: {} imports, {} warnings",
            path.display(),
            scan.imports.len(),
            scan.warnings.len()
        );

        let mut file = SourceFile::new(&text::module_name(path), path);
        file.imports = scan.imports;
        Ok((file, scan.warnings))
    }

    /// Scan Python source text for imports, in source order
    pub fn extract_from_source(&self, source: &str) -> ImportScan {
        let mut scan = ImportScan::default();
        let mut pending: Option<Pending> = None;

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let physical = trim(raw);
            let physical = strip_comment(&physical);

            let (start_line, line) = match pending.take() {
                Some(p) => (p.start_line, format!("{}{}", p.text, physical)),
                None => (line_no, physical.to_string()),
            };

            // "import a, \" + "b, c" -> "import a, b, c"
            if let Some(head) = strip_continuation(&line) {
                pending = Some(Pending {
                    start_line,
                    text: head.to_string(),
                });
                continue;
            }

            // "from a import (b," + "c)" -> "from a import (b, c)"
            if opens_name_list(&line) {
                pending = Some(Pending {
                    start_line,
                    text: format!("{} ", line),
                });
                continue;
            }

            self.classify_line(&line, start_line, &mut scan);
        }

        if let Some(p) = pending {
            if is_import_statement(p.text.trim()) {
                scan.warnings.push(ImportWarning::new(
                    p.start_line,
                    ImportWarningKind::UnterminatedStatement,
                ));
            }
        }

        scan
    }

    /// Turn one logical line into zero or more imports
    fn classify_line(&self, line: &str, line_no: usize, scan: &mut ImportScan) {
        if let Some(rest) = strip_keyword(line, "import") {
            let names = parse_import_names(rest);
            if names.is_empty() {
                scan.warnings
                    .push(ImportWarning::new(line_no, ImportWarningKind::NoNames));
            }
            for name in names {
                scan.imports.push(Import::entire(&name, line_no));
            }
        } else if let Some(rest) = strip_keyword(line, "from") {
            let (module, remainder) = match rest.split_once(char::is_whitespace) {
                Some((module, remainder)) => (module, remainder.trim_start()),
                None => (rest, ""),
            };

            let symbols = match import_clause(remainder) {
                Some(names) => {
                    let symbols = parse_import_names(names);
                    if symbols.is_empty() {
                        scan.warnings
                            .push(ImportWarning::new(line_no, ImportWarningKind::NoNames));
                    }
                    symbols
                }
                None => {
                    scan.warnings.push(ImportWarning::new(
                        line_no,
                        ImportWarningKind::MissingImportKeyword {
                            module: module.to_string(),
                        },
                    ));
                    Vec::new()
                }
            };

            scan.imports.push(Import::partial(module, symbols, line_no));
        }
    }
}

/// `true` for lines that start an `import` or `from` statement
fn is_import_statement(line: &str) -> bool {
    strip_keyword(line, "import").is_some() || strip_keyword(line, "from").is_some()
}

/// `true` when the name list of an import statement starts with `(` that
/// is not closed on the same line
fn opens_name_list(line: &str) -> bool {
    let names = match strip_keyword(line, "import") {
        Some(rest) => Some(rest),
        None => strip_keyword(line, "from")
            .and_then(|rest| rest.split_once(char::is_whitespace))
            .and_then(|(_, remainder)| import_clause(remainder.trim_start())),
    };

    names.map_or(false, |names| {
        names.trim_start().starts_with('(') && !names.contains(')')
    })
}

/// The name list after the `import` keyword of a `from` statement
fn import_clause(remainder: &str) -> Option<&str> {
    let rest = remainder.strip_prefix("import")?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == '(' || c == '*' => Some(rest),
        Some(_) => None,
    }
}
