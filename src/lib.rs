//! Pypeline - Map the imports of a Python project
//!
//! Reads the import statements of every Python file in a directory, links
//! them into a dependency graph, finds the head files nothing imports and
//! assigns each file an import level. Notes and to-dos per file can be
//! saved to and loaded from a JSON settings file.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod persist;
pub mod text;

// Re-export main types
pub use analysis::{
    assign_import_levels, FileId, ImportLevels, LevelStrategy, LoadWarning, LoadedProject,
    Project, ProjectLoader, SourceFile, ToDo,
};
pub use config::Config;
pub use error::{Error, Result};
pub use output::{DiagramGenerator, ProjectReport};
pub use parser::{Import, PythonImporter};
