// Parser module: extracting import statements from Python source files

pub mod ast;
pub mod import_line;
mod python;

pub use ast::*;
pub use import_line::parse_import_names;
pub use python::PythonImporter;
