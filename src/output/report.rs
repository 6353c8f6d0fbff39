// Summary of an opened project as text or JSON

use crate::analysis::{FileId, ImportLevels, LoadWarning, Project, GENERAL_FILE_NAME};
use serde::Serialize;
use std::path::PathBuf;

/// One import as shown in a report
#[derive(Debug, Clone, Serialize)]
pub struct ImportEntry {
    pub target: String,
    pub entire_file: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
    pub line: usize,
    pub resolved: bool,
    pub relative: bool,
}

/// One file as shown in a report
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub level: Option<usize>,
    pub head: bool,
    pub imports: Vec<ImportEntry>,
    pub imported_by: Vec<String>,
    pub notes: String,
    pub open_todos: usize,
    pub done_todos: usize,
}

/// Serializable view of a linked project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub root: Option<PathBuf>,
    pub files: Vec<FileEntry>,
    pub head_files: Vec<String>,
    pub max_level: Option<usize>,
    pub warnings: Vec<String>,
}

impl ProjectReport {
    pub fn new(project: &Project, levels: &ImportLevels, warnings: &[LoadWarning]) -> Self {
        let name_of = |id: FileId| {
            project
                .file(id)
                .map(|f| f.file_name.clone())
                .unwrap_or_default()
        };

        let files = project
            .iter()
            .map(|(id, file)| FileEntry {
                name: file.file_name.clone(),
                path: file.file_path.clone(),
                level: levels.get(id),
                head: file.is_head_file(),
                imports: file
                    .imports
                    .iter()
                    .map(|i| ImportEntry {
                        target: i.target_name.clone(),
                        entire_file: i.entire_file,
                        symbols: i.imported_symbols.clone(),
                        line: i.line,
                        resolved: i.is_resolved(),
                        relative: i.is_relative(),
                    })
                    .collect(),
                imported_by: file.imported_by.iter().map(|id| name_of(*id)).collect(),
                notes: file.notes.clone(),
                open_todos: file.open_to_dos(),
                done_todos: file.to_dos.len() - file.open_to_dos(),
            })
            .collect();

        Self {
            root: project.root().map(|p| p.to_path_buf()),
            files,
            head_files: project.head_files().into_iter().map(name_of).collect(),
            max_level: levels.max_level(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain text listing, files grouped by import level
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        if let Some(root) = &self.root {
            lines.push(format!("Project: {}", root.display()));
        }
        let file_count = self.files.iter().filter(|f| f.name != GENERAL_FILE_NAME).count();
        lines.push(format!(
            "Files: {}  Head files: {}",
            file_count,
            self.head_files.join(", ")
        ));

        let max = self.max_level.map_or(0, |m| m + 1);
        for level in 0..max {
            lines.push(String::new());
            lines.push(format!("Level {}", level));
            for file in self.files.iter().filter(|f| f.level == Some(level)) {
                lines.extend(file_lines(file));
            }
        }

        let unleveled: Vec<&FileEntry> = self
            .files
            .iter()
            .filter(|f| f.level.is_none() && f.name != GENERAL_FILE_NAME)
            .collect();
        if !unleveled.is_empty() {
            lines.push(String::new());
            lines.push("Not reachable from a head file".to_string());
            for file in unleveled {
                lines.extend(file_lines(file));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!("Warnings ({}):", self.warnings.len()));
            for warning in &self.warnings {
                lines.push(format!("  {}", warning));
            }
        }

        lines.join("\n")
    }
}

/// Lines for one file: its name, then its imports and annotations
fn file_lines(file: &FileEntry) -> Vec<String> {
    let mut lines = vec![format!("  {}", file.name)];

    let groups = [
        ("imports", targets(file, |i| i.resolved)),
        ("relative", targets(file, |i| !i.resolved && i.relative)),
        ("external", targets(file, |i| !i.resolved && !i.relative)),
    ];
    for (label, names) in groups {
        if !names.is_empty() {
            lines.push(format!("    {}: {}", label, names.join(", ")));
        }
    }
    if !file.imported_by.is_empty() {
        lines.push(format!("    imported by: {}", file.imported_by.join(", ")));
    }
    if file.open_todos + file.done_todos > 0 {
        lines.push(format!(
            "    to-dos: {} open, {} done",
            file.open_todos, file.done_todos
        ));
    }

    lines
}

fn targets(file: &FileEntry, keep: impl Fn(&ImportEntry) -> bool) -> Vec<&str> {
    file.imports
        .iter()
        .filter(|i| keep(i))
        .map(|i| i.target.as_str())
        .collect()
}
