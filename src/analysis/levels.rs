// Import levels: distance of each file from the project's entry points
//
// Levels are a layout hint (which column a file is drawn in), not a graph
// property anything else relies on.

use crate::analysis::graph::{FileId, Project};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::trace;

/// How levels are propagated from the head files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelStrategy {
    /// Breadth-first search; each file keeps the level of the first path
    /// that reaches it, which is the shortest one. Always terminates.
    #[default]
    BreadthFirst,
    /// Re-queue a file every time an importer is processed and keep the
    /// level from its last dequeue. Fails once any file has been dequeued
    /// more than `max_visits_per_file` times, which happens on import
    /// cycles.
    Legacy { max_visits_per_file: usize },
}

/// Level per file; files no head file reaches have none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportLevels {
    levels: Vec<Option<usize>>,
}

impl ImportLevels {
    pub fn get(&self, id: FileId) -> Option<usize> {
        self.levels.get(id.0).copied().flatten()
    }

    pub fn max_level(&self) -> Option<usize> {
        self.levels.iter().flatten().copied().max()
    }

    /// Files grouped by level, index 0 holding the head files
    pub fn by_level(&self) -> Vec<Vec<FileId>> {
        let mut columns: Vec<Vec<FileId>> = match self.max_level() {
            Some(max) => vec![Vec::new(); max + 1],
            None => Vec::new(),
        };
        for (idx, level) in self.levels.iter().enumerate() {
            if let Some(level) = level {
                columns[*level].push(FileId(idx));
            }
        }
        columns
    }

    /// Files without a level, such as `General` or files only reachable
    /// through an import cycle
    pub fn unleveled(&self) -> Vec<FileId> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.is_none())
            .map(|(idx, _)| FileId(idx))
            .collect()
    }
}

/// Assign every file reachable from a head file its import level. Head
/// files are level 0 and a file imported from level `n` is level `n + 1`.
pub fn assign_import_levels(project: &Project, strategy: LevelStrategy) -> Result<ImportLevels> {
    match strategy {
        LevelStrategy::BreadthFirst => Ok(breadth_first(project)),
        LevelStrategy::Legacy {
            max_visits_per_file,
        } => requeue(project, max_visits_per_file),
    }
}

fn breadth_first(project: &Project) -> ImportLevels {
    let mut levels = vec![None; project.len()];
    let mut queued = vec![false; project.len()];
    let mut queue = VecDeque::new();

    for head in project.head_files() {
        queued[head.0] = true;
        queue.push_back((head, 0));
    }

    while let Some((id, level)) = queue.pop_front() {
        levels[id.0] = Some(level);
        trace!("level {} for file #{}", level, id.0);

        let Some(file) = project.file(id) else {
            continue;
        };
        for target in file.resolved_imports() {
            if !queued[target.0] {
                queued[target.0] = true;
                queue.push_back((target, level + 1));
            }
        }
    }

    ImportLevels { levels }
}

fn requeue(project: &Project, max_visits_per_file: usize) -> Result<ImportLevels> {
    let mut levels = vec![None; project.len()];
    let mut visits = vec![0usize; project.len()];
    let mut queue: VecDeque<(FileId, usize)> =
        project.head_files().into_iter().map(|id| (id, 0)).collect();

    while let Some((id, level)) = queue.pop_front() {
        let Some(file) = project.file(id) else {
            continue;
        };

        visits[id.0] += 1;
        if visits[id.0] > max_visits_per_file {
            return Err(Error::analysis(format!(
                "import level of '{}' did not settle after {} visits; the project likely has an import cycle",
                file.file_name, max_visits_per_file
            )));
        }
        levels[id.0] = Some(level);

        for target in file.resolved_imports() {
            // the newest pending entry for a file replaces older ones
            queue.retain(|(pending, _)| *pending != target);
            trace!("queue file #{} at level {}", target.0, level + 1);
            queue.push_back((target, level + 1));
        }
    }

    Ok(ImportLevels { levels })
}
