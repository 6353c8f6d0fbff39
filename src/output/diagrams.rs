// Diagram generation for Pypeline
//
// Renders the project import graph as Mermaid or Graphviz DOT, with each
// file labelled by its import level.

use crate::analysis::{FileId, ImportLevels, Project};
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Diagram generator for creating Mermaid and DOT diagrams
pub struct DiagramGenerator {
    /// Layout direction (TB, LR, BT, RL)
    direction: String,
}

impl DiagramGenerator {
    /// Create a new diagram generator
    pub fn new() -> Self {
        Self {
            direction: "LR".to_string(),
        }
    }

    /// Set layout direction
    pub fn with_direction(mut self, dir: &str) -> Self {
        self.direction = dir.to_string();
        self
    }

    /// Mermaid flowchart of every file and its resolved imports. The
    /// `General` placeholder is left out.
    pub fn generate_mermaid(&self, project: &Project, levels: &ImportLevels) -> String {
        let mut lines = Vec::new();
        lines.push(format!("graph {}", self.direction));

        for (id, file) in project.iter().filter(|(_, f)| !f.is_general()) {
            let style = if file.is_head_file() { ":::head" } else { "" };
            lines.push(format!(
                "    {}[\"{}\"]{}",
                node_id(project, id),
                label(&file.file_name, levels.get(id)),
                style
            ));
        }

        for (from, to) in project.edges() {
            lines.push(format!(
                "    {} --> {}",
                node_id(project, from),
                node_id(project, to)
            ));
        }

        lines.push("    classDef head stroke-width:3px".to_string());
        lines.join("\n")
    }

    /// Graphviz DOT rendering of the same graph
    pub fn generate_dot(&self, project: &Project, levels: &ImportLevels) -> String {
        let mut graph: DiGraph<String, &str> = DiGraph::new();
        let mut nodes: HashMap<FileId, NodeIndex> = HashMap::new();

        for (id, file) in project.iter().filter(|(_, f)| !f.is_general()) {
            let node = graph.add_node(label(&file.file_name, levels.get(id)));
            nodes.insert(id, node);
        }

        for (from, to) in project.edges() {
            if let (Some(&a), Some(&b)) = (nodes.get(&from), nodes.get(&to)) {
                graph.add_edge(a, b, "");
            }
        }

        format!("{}", Dot::with_config(&graph, &[DotConfig::EdgeNoLabel]))
    }
}

impl Default for DiagramGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn label(name: &str, level: Option<usize>) -> String {
    match level {
        Some(level) => format!("{} (level {})", name, level),
        None => name.to_string(),
    }
}

/// Mermaid node ID; the index keeps files with the same name apart
fn node_id(project: &Project, id: FileId) -> String {
    let name = project.file(id).map(|f| f.file_name.as_str()).unwrap_or("file");
    format!("{}_{}", sanitize_id(name), id.0)
}

/// Sanitize a string for use as a Mermaid node ID
fn sanitize_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{assign_import_levels, LevelStrategy, SourceFile};
    use crate::parser::Import;

    fn sample() -> (Project, ImportLevels) {
        let mut project = Project::with_general("/p");
        let mut main = SourceFile::new("main", "main.py");
        main.imports = vec![
            Import::entire("data-utils", 1),
            Import::partial("data-utils", vec!["load".to_string()], 2),
            Import::entire("os", 3),
        ];
        project.push(main);
        project.push(SourceFile::new("data-utils", "data-utils.py"));
        project.link();
        let levels = assign_import_levels(&project, LevelStrategy::BreadthFirst).unwrap();
        (project, levels)
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("my.module"), "my_module");
        assert_eq!(sanitize_id("MyClass"), "MyClass");
        assert_eq!(sanitize_id("foo-bar"), "foo_bar");
    }

    #[test]
    fn test_diagram_generator_new() {
        let gen = DiagramGenerator::new();
        assert_eq!(gen.direction, "LR");
    }

    #[test]
    fn test_with_direction() {
        let gen = DiagramGenerator::new().with_direction("TB");
        assert_eq!(gen.direction, "TB");
    }

    #[test]
    fn test_mermaid() {
        let (project, levels) = sample();
        let diagram = DiagramGenerator::new().generate_mermaid(&project, &levels);

        assert!(diagram.starts_with("graph LR"));
        assert!(diagram.contains("main_1[\"main (level 0)\"]:::head"));
        assert!(diagram.contains("data_utils_2[\"data-utils (level 1)\"]"));
        assert_eq!(diagram.matches("main_1 --> data_utils_2").count(), 1);
        assert!(!diagram.contains("General"));
        assert!(!diagram.contains("os"));
    }

    #[test]
    fn test_dot() {
        let (project, levels) = sample();
        let dot = DiagramGenerator::new().generate_dot(&project, &levels);

        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("main (level 0)"));
        assert!(dot.contains("data-utils (level 1)"));
        assert!(dot.contains("0 -> 1"));
        assert!(!dot.contains("General"));
    }
}
