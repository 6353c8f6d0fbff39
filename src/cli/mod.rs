//! CLI module for Pypeline

mod args;

pub use args::{Args, Command};

use crate::analysis::{assign_import_levels, LoadedProject, ProjectLoader};
use crate::config::{Config, OutputFormat, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{DiagramGenerator, ProjectReport};
use crate::persist;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    let verbose = args.verbose > 0;

    match args.command {
        Command::Open {
            path,
            config,
            recursive,
            exclude,
            format,
            strategy,
        } => {
            let mut cfg = load_config(config.as_deref(), &path)?;
            cfg.merge_cli(recursive, exclude, format, strategy)?;

            let loader = ProjectLoader::new(cfg)?.with_verbose(verbose);
            let loaded = loader.open(&path)?;
            println!("{}", render(&loaded, loader.config())?);
            Ok(())
        }

        Command::Save {
            path,
            output,
            config,
            recursive,
            exclude,
        } => {
            let mut cfg = load_config(config.as_deref(), &path)?;
            cfg.merge_cli(recursive, exclude, None, None)?;

            let loader = ProjectLoader::new(cfg)?.with_verbose(verbose);
            let mut loaded = loader.open(&path)?;
            let output = output.unwrap_or_else(|| persist::settings_path(&path, loader.config()));

            if output.exists() {
                let existing = persist::load(&output, loader.importer(), false)?;
                let merged = loaded.project.merge_annotations(&existing.project);
                debug!("kept annotations of {} files from {}", merged, output.display());
            }

            persist::save(&loaded.project, &output)?;
            println!(
                "Saved {} files to {}",
                loaded.project.len(),
                output.display()
            );
            Ok(())
        }

        Command::Load {
            settings,
            config,
            format,
            strategy,
        } => {
            let mut cfg = load_config(config.as_deref(), persist::settings_root(&settings))?;
            cfg.merge_cli(false, Vec::new(), format, strategy)?;

            let loader = ProjectLoader::new(cfg)?.with_verbose(verbose);
            let loaded = loader.load(&settings)?;
            println!("{}", render(&loaded, loader.config())?);
            Ok(())
        }

        Command::Annotate {
            settings,
            file,
            notes,
            todo,
            done,
            undo,
            remove,
        } => {
            let cfg = load_config(None, persist::settings_root(&settings))?;
            let loader = ProjectLoader::new(cfg)?;
            let mut project = loader.load(&settings)?.project;

            if let Some(notes) = notes {
                project.set_notes(&file, notes)?;
            }
            for index in done {
                project.set_todo_done(&file, index, true)?;
            }
            for index in undo {
                project.set_todo_done(&file, index, false)?;
            }

            // Highest index first so earlier removals don't shift later ones
            let mut remove = remove;
            remove.sort_unstable_by(|a, b| b.cmp(a));
            remove.dedup();
            for index in remove {
                let removed = project.remove_todo(&file, index)?;
                info!("removed to-do '{}' from {}", removed.content, file);
            }

            for content in todo {
                project.add_todo(&file, content)?;
            }

            persist::save(&project, &settings)?;

            let id = project
                .file_by_name(&file)
                .ok_or_else(|| Error::UnknownFile(file.clone()))?;
            if let Some(source) = project.file(id) {
                println!("{}", source.file_name);
                if !source.notes.is_empty() {
                    println!("  notes: {}", source.notes);
                }
                for (idx, todo) in source.to_dos.iter().enumerate() {
                    let mark = if todo.done { "x" } else { " " };
                    println!("  [{}] {}: {}", mark, idx, todo.content);
                }
            }
            Ok(())
        }

        Command::Version => {
            println!("pypeline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// An explicit config file must load; otherwise `pypeline.toml` in `dir`
/// is used when present
fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::PathNotFound(path.to_path_buf()));
            }
            Config::load(path)
        }
        None => Ok(Config::load_or_default(&dir.join(DEFAULT_CONFIG_FILE))),
    }
}

/// Levels plus the configured rendering of a loaded project
fn render(loaded: &LoadedProject, config: &Config) -> Result<String> {
    let levels = assign_import_levels(&loaded.project, config.level_strategy())?;
    let diagrams = DiagramGenerator::new().with_direction(&config.output.direction);

    let rendered = match config.output.format {
        OutputFormat::Text => {
            ProjectReport::new(&loaded.project, &levels, &loaded.warnings).to_text()
        }
        OutputFormat::Json => {
            ProjectReport::new(&loaded.project, &levels, &loaded.warnings).to_json()?
        }
        OutputFormat::Mermaid => diagrams.generate_mermaid(&loaded.project, &levels),
        OutputFormat::Dot => diagrams.generate_dot(&loaded.project, &levels),
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_prefers_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[output]\nformat = \"mermaid\"\n",
        )
        .unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Mermaid);
    }

    #[test]
    fn test_load_config_missing_explicit() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("none.toml")), dir.path());
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_render_formats() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "import utils\n").unwrap();
        fs::write(dir.path().join("utils.py"), "").unwrap();

        let mut config = Config::default();
        let loaded = ProjectLoader::new(config.clone())
            .unwrap()
            .open(dir.path())
            .unwrap();

        assert!(render(&loaded, &config).unwrap().contains("Level 1"));

        config.output.format = OutputFormat::Mermaid;
        assert!(render(&loaded, &config).unwrap().starts_with("graph LR"));

        config.output.format = OutputFormat::Dot;
        assert!(render(&loaded, &config).unwrap().starts_with("digraph"));

        config.output.format = OutputFormat::Json;
        let json = render(&loaded, &config).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
