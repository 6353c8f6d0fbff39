// Project settings file: notes and to-dos per file, stored as JSON
//
// Only annotations are stored. Imports and back references are rebuilt
// from the source files every time a settings file is loaded.

use crate::analysis::{LoadWarning, LoadedProject, Project, SourceFile, ToDo};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::PythonImporter;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One file in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub todos: Vec<ToDoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoRecord {
    pub content: String,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub done: bool,
}

/// Older settings files store `done` as 0 or 1
fn bool_or_int<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

impl From<&SourceFile> for FileRecord {
    fn from(file: &SourceFile) -> Self {
        Self {
            name: file.file_name.clone(),
            path: file.file_path.clone(),
            notes: file.notes.clone(),
            todos: file
                .to_dos
                .iter()
                .map(|t| ToDoRecord {
                    content: t.content.clone(),
                    done: t.done,
                })
                .collect(),
        }
    }
}

impl FileRecord {
    fn to_dos(&self) -> Vec<ToDo> {
        self.todos
            .iter()
            .map(|t| ToDo {
                content: t.content.clone(),
                done: t.done,
            })
            .collect()
    }
}

/// Where a project's settings file goes by default
pub fn settings_path(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.settings.file_name)
}

/// Directory of a settings file; `.` for a bare file name
pub fn settings_root(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Records for every file of the project, in project order
pub fn to_records(project: &Project) -> Vec<FileRecord> {
    project.files().iter().map(FileRecord::from).collect()
}

/// Write the project's annotations to `path`
pub fn save(project: &Project, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&to_records(project))?;
    std::fs::write(path, json).map_err(|e| Error::settings(path, e.to_string()))?;
    info!("saved {} files to {}", project.len(), path.display());
    Ok(())
}

/// Read the records of a settings file without touching any source file
pub fn read_records(path: &Path) -> Result<Vec<FileRecord>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::settings(path, e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::settings(path, format!("invalid settings JSON: {}", e)))
}

/// Load a settings file and rebuild the project from it.
///
/// Every recorded file except `General` is imported again from its path
/// and the project is re-linked. A file that cannot be read fails the
/// load when `strict` is set; otherwise it keeps its notes, gets no
/// imports, and a warning is returned.
pub fn load(path: &Path, importer: &PythonImporter, strict: bool) -> Result<LoadedProject> {
    let records = read_records(path)?;
    let mut warnings = Vec::new();

    let root = settings_root(path).to_path_buf();
    let mut project = Project::new();
    project.set_root(root.clone());

    for record in &records {
        let mut file = if record.path.as_os_str().is_empty() {
            SourceFile::new(&record.name, PathBuf::new())
        } else {
            // Relative paths are relative to the settings file
            let source = root.join(&record.path);
            match importer.extract_with_warnings(&source) {
                Ok((file, file_warnings)) => {
                    warnings.extend(file_warnings.into_iter().map(|warning| {
                        LoadWarning::Import {
                            file: record.name.clone(),
                            warning,
                        }
                    }));
                    file
                }
                Err(e) if !strict => {
                    warnings.push(LoadWarning::MissingSourceFile {
                        name: record.name.clone(),
                        path: record.path.clone(),
                        message: e.to_string(),
                    });
                    SourceFile::new(&record.name, &record.path)
                }
                Err(e) => return Err(e),
            }
        };

        file.file_name = record.name.clone();
        file.notes = record.notes.clone();
        file.to_dos = record.to_dos();
        project.push(file);
    }

    project.link();
    project.ensure_general();

    let mut loaded = LoadedProject { project, warnings };
    loaded.check_duplicates();
    loaded.log_warnings();
    info!("loaded {} files from {}", loaded.project.len(), path.display());

    Ok(loaded)
}
