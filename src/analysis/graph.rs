// Project graph: source files, their imports and the back references
//
// The project owns every file and every import. Links between files are
// plain `FileId` indices into the project's file list, so replacing a
// project never leaves anything dangling.

use crate::error::{Error, Result};
use crate::parser::Import;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the placeholder file holding project-wide notes
pub const GENERAL_FILE_NAME: &str = "General";

/// Index of a file within its project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub usize);

/// A to-do item attached to a file
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToDo {
    pub content: String,
    pub done: bool,
}

impl ToDo {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
        }
    }
}

/// One file of the project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFile {
    /// Module name, unique within a project; used to resolve imports
    pub file_name: String,
    pub file_path: PathBuf,
    pub notes: String,
    pub to_dos: Vec<ToDo>,
    /// Imports declared by this file, in source order
    pub imports: Vec<Import>,
    /// Files importing this one, filled in by [`Project::link`]
    pub imported_by: Vec<FileId>,
}

impl SourceFile {
    pub fn new(file_name: &str, file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// The `General` placeholder
    pub fn general() -> Self {
        Self::new(GENERAL_FILE_NAME, PathBuf::new())
    }

    pub fn is_general(&self) -> bool {
        self.file_name == GENERAL_FILE_NAME
    }

    /// Entry point: nothing in the project imports this file. The
    /// `General` placeholder is never a head file.
    pub fn is_head_file(&self) -> bool {
        self.imported_by.is_empty() && !self.is_general()
    }

    /// Project files this file imports, in import order
    pub fn resolved_imports(&self) -> impl Iterator<Item = FileId> + '_ {
        self.imports.iter().filter_map(|i| i.resolved)
    }

    /// Imports that point outside the project
    pub fn unresolved_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| i.resolved.is_none())
    }

    pub fn open_to_dos(&self) -> usize {
        self.to_dos.iter().filter(|t| !t.done).count()
    }
}

/// Counts over a linked project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub files: usize,
    pub imports: usize,
    pub resolved_imports: usize,
    pub head_files: usize,
}

/// All files of one opened directory or loaded settings file
#[derive(Debug, Clone, Default)]
pub struct Project {
    files: Vec<SourceFile>,
    root: Option<PathBuf>,
}

impl Project {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a project rooted at `root` that starts with the `General`
    /// placeholder
    pub fn with_general(root: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![SourceFile::general()],
            root: Some(root.into()),
        }
    }

    /// Create from a list of files. Call [`link`](Self::link) afterwards.
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self { files, root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = Some(root.into());
    }

    /// Add a file. Links are not updated until the next [`link`](Self::link).
    pub fn push(&mut self, file: SourceFile) -> FileId {
        self.files.push(file);
        FileId(self.files.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0)
    }

    /// Iterate over all files with their IDs
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().enumerate().map(|(idx, f)| (FileId(idx), f))
    }

    /// First file with the given name
    pub fn file_by_name(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .position(|f| f.file_name == name)
            .map(FileId)
    }

    /// Resolve every import against the file names of the project and
    /// rebuild the `imported_by` back references.
    ///
    /// Resolution is an exact, case-sensitive name match; the first file
    /// in project order wins when names repeat. Imports with no match
    /// stay unresolved. Previous links are discarded, so linking twice
    /// gives the same result as linking once.
    pub fn link(&mut self) {
        let mut by_name: HashMap<&str, FileId> = HashMap::new();
        for (idx, file) in self.files.iter().enumerate() {
            if !file.is_general() {
                by_name.entry(file.file_name.as_str()).or_insert(FileId(idx));
            }
        }

        let mut resolutions = Vec::new();
        let mut back_refs = Vec::new();
        for (idx, file) in self.files.iter().enumerate() {
            for import in &file.imports {
                let target = by_name.get(import.target_name.as_str()).copied();
                if let Some(target) = target {
                    back_refs.push((target, FileId(idx)));
                }
                resolutions.push(target);
            }
        }

        let mut resolutions = resolutions.into_iter();
        for file in &mut self.files {
            file.imported_by.clear();
            for import in &mut file.imports {
                import.resolved = resolutions.next().flatten();
            }
        }

        for (target, importer) in back_refs {
            let imported_by = &mut self.files[target.0].imported_by;
            if !imported_by.contains(&importer) {
                imported_by.push(importer);
            }
        }
    }

    /// Make sure the `General` placeholder is the first file, then re-link
    pub fn ensure_general(&mut self) {
        match self.files.iter().position(|f| f.is_general()) {
            Some(0) => return,
            Some(idx) => {
                let general = self.files.remove(idx);
                self.files.insert(0, general);
            }
            None => self.files.insert(0, SourceFile::general()),
        }
        self.link();
    }

    /// Files nothing else imports, in project order
    pub fn head_files(&self) -> Vec<FileId> {
        self.iter()
            .filter(|(_, f)| f.is_head_file())
            .map(|(id, _)| id)
            .collect()
    }

    /// Resolved import edges `(importer, imported)`, without repeats
    pub fn edges(&self) -> Vec<(FileId, FileId)> {
        let mut edges = Vec::new();
        for (id, file) in self.iter() {
            for target in file.resolved_imports() {
                if !edges.contains(&(id, target)) {
                    edges.push((id, target));
                }
            }
        }
        edges
    }

    /// Names shared by more than one file, with every file using them
    pub fn duplicate_names(&self) -> Vec<(String, Vec<FileId>)> {
        let mut seen: Vec<(String, Vec<FileId>)> = Vec::new();
        for (id, file) in self.iter() {
            match seen.iter_mut().find(|(name, _)| *name == file.file_name) {
                Some((_, ids)) => ids.push(id),
                None => seen.push((file.file_name.clone(), vec![id])),
            }
        }
        seen.retain(|(_, ids)| ids.len() > 1);
        seen
    }

    pub fn stats(&self) -> ProjectStats {
        let imports: usize = self.files.iter().map(|f| f.imports.len()).sum();
        let resolved_imports: usize = self
            .files
            .iter()
            .map(|f| f.resolved_imports().count())
            .sum();

        ProjectStats {
            files: self.files.len(),
            imports,
            resolved_imports,
            head_files: self.head_files().len(),
        }
    }

    fn named_mut(&mut self, name: &str) -> Result<&mut SourceFile> {
        self.files
            .iter_mut()
            .find(|f| f.file_name == name)
            .ok_or_else(|| Error::UnknownFile(name.to_string()))
    }

    /// Replace the notes of a file
    pub fn set_notes(&mut self, name: &str, notes: impl Into<String>) -> Result<()> {
        self.named_mut(name)?.notes = notes.into();
        Ok(())
    }

    /// Append a to-do to a file, returning its index
    pub fn add_todo(&mut self, name: &str, content: impl Into<String>) -> Result<usize> {
        let file = self.named_mut(name)?;
        file.to_dos.push(ToDo::new(content));
        Ok(file.to_dos.len() - 1)
    }

    /// Mark a to-do done or open again
    pub fn set_todo_done(&mut self, name: &str, index: usize, done: bool) -> Result<()> {
        let file = self.named_mut(name)?;
        let count = file.to_dos.len();
        let todo = file.to_dos.get_mut(index).ok_or_else(|| {
            Error::other(format!(
                "'{}' has {} to-dos, no to-do at index {}",
                name, count, index
            ))
        })?;
        todo.done = done;
        Ok(())
    }

    /// Remove a to-do from a file
    pub fn remove_todo(&mut self, name: &str, index: usize) -> Result<ToDo> {
        let file = self.named_mut(name)?;
        if index >= file.to_dos.len() {
            return Err(Error::other(format!(
                "'{}' has {} to-dos, no to-do at index {}",
                name,
                file.to_dos.len(),
                index
            )));
        }
        Ok(file.to_dos.remove(index))
    }

    /// Copy notes and to-dos from `other` onto files with the same name.
    /// Returns how many files received annotations.
    pub fn merge_annotations(&mut self, other: &Project) -> usize {
        let mut merged = 0;
        for file in &mut self.files {
            let Some(id) = other.file_by_name(&file.file_name) else {
                continue;
            };
            let Some(source) = other.file(id) else {
                continue;
            };
            if source.notes.is_empty() && source.to_dos.is_empty() {
                continue;
            }
            file.notes = source.notes.clone();
            file.to_dos = source.to_dos.clone();
            merged += 1;
        }
        merged
    }
}
