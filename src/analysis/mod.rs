// Analysis module: building and querying the project import graph

pub mod graph;
pub mod levels;

pub use graph::*;
pub use levels::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{ImportWarning, PythonImporter};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Something worth reporting about a freshly opened or loaded project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// Several files share a name; imports resolve to the first one
    DuplicateFileName { name: String, paths: Vec<PathBuf> },
    /// A file recorded in a settings file could not be read
    MissingSourceFile {
        name: String,
        path: PathBuf,
        message: String,
    },
    /// The importer skipped part of an import statement
    Import { file: String, warning: ImportWarning },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::DuplicateFileName { name, paths } => {
                let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "duplicate file name '{}' ({}); imports resolve to the first",
                    name,
                    paths.join(", ")
                )
            }
            LoadWarning::MissingSourceFile {
                name,
                path,
                message,
            } => write!(
                f,
                "cannot read '{}' at {}: {}; keeping its notes without imports",
                name,
                path.display(),
                message
            ),
            LoadWarning::Import { file, warning } => write!(f, "{}: {}", file, warning),
        }
    }
}

/// A linked project plus what was noticed while building it
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub project: Project,
    pub warnings: Vec<LoadWarning>,
}

impl LoadedProject {
    /// Add a warning for every name that more than one file uses
    pub(crate) fn check_duplicates(&mut self) {
        for (name, ids) in self.project.duplicate_names() {
            let paths = ids
                .iter()
                .filter_map(|id| self.project.file(*id))
                .map(|f| f.file_path.clone())
                .collect();
            self.warnings
                .push(LoadWarning::DuplicateFileName { name, paths });
        }
    }

    pub(crate) fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

/// Opens project directories: lists the source files, extracts their
/// imports and links them into a project
pub struct ProjectLoader {
    config: Config,
    importer: PythonImporter,
    exclude: Vec<glob::Pattern>,
    verbose: bool,
}

impl ProjectLoader {
    /// Create a new loader with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let exclude = config
            .scan
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            importer: PythonImporter::new(),
            exclude,
            verbose: false,
        })
    }

    /// Show a progress bar while importing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn importer(&self) -> &PythonImporter {
        &self.importer
    }

    /// Open a project directory. The returned project starts with the
    /// `General` placeholder followed by one file per source file, sorted
    /// by path, with all imports linked.
    pub fn open(&self, root: &Path) -> Result<LoadedProject> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::analysis(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        // Recorded file paths are absolute
        let root = root.canonicalize().map_err(|e| Error::read(root, e))?;

        let paths = self.discover_files(&root)?;
        if paths.is_empty() {
            warn!(
                "no .{} files found in {}",
                self.config.scan.extension,
                root.display()
            );
        }

        let mut project = Project::with_general(root.clone());
        let mut warnings = Vec::new();

        let progress = if self.verbose {
            let pb = ProgressBar::new(paths.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for path in &paths {
            if let Some(ref pb) = progress {
                let msg = path.file_name().unwrap_or_default().to_string_lossy().to_string();
                pb.set_message(msg);
                pb.inc(1);
            }

            let (file, file_warnings) = self.importer.extract_with_warnings(path)?;
            warnings.extend(file_warnings.into_iter().map(|warning| LoadWarning::Import {
                file: file.file_name.clone(),
                warning,
            }));
            project.push(file);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Imports extracted");
        }

        project.link();

        let mut loaded = LoadedProject { project, warnings };
        loaded.check_duplicates();
        loaded.log_warnings();

        let stats = loaded.project.stats();
        info!(
            "opened {}: {} files, {} imports ({} within the project), {} head files",
            root.display(),
            stats.files - 1,
            stats.imports,
            stats.resolved_imports,
            stats.head_files
        );

        Ok(loaded)
    }

    /// Load a settings file written by [`crate::persist::save`], re-reading
    /// every recorded source file
    pub fn load(&self, settings: &Path) -> Result<LoadedProject> {
        crate::persist::load(settings, &self.importer, self.config.settings.strict)
    }

    /// List the source files under `root`, sorted by path
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let max_depth = if self.config.scan.recursive { usize::MAX } else { 1 };

        for entry in WalkDir::new(root)
            .follow_links(self.config.scan.follow_links)
            .max_depth(max_depth)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            // Check it has the configured extension
            match path.extension() {
                Some(ext) if ext == self.config.scan.extension.as_str() => {}
                _ => continue,
            }

            if self.should_exclude(path, root) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Check if a path should be excluded based on config patterns. A
    /// pattern matches the path relative to the root or any trailing part
    /// of it, so `__pycache__/**` also excludes `pkg/__pycache__/x.py`.
    fn should_exclude(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let components: Vec<_> = relative.components().collect();

        (0..components.len()).any(|start| {
            let tail: PathBuf = components[start..].iter().collect();
            self.exclude.iter().any(|pattern| pattern.matches_path(&tail))
        })
    }
}
