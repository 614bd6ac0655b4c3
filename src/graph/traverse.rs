//! Subtopic tree export.
//!
//! Walks the graph depth-first from a root concept, following only triples
//! with one chosen predicate, and renders an indented outline. The visited set
//! spans the whole walk: a concept reached a second time, by a cycle or by a
//! different branch, is printed once more with a `-> *` marker and not expanded.

use std::collections::HashSet;
use std::io::Write;

use crate::error::GraphError;
use crate::store::{KnowledgeStore, StoreResult};

use super::GraphResult;

/// Root concept used when none is configured.
pub const DEFAULT_ROOT: &str = "Physics";
/// Predicate followed when none is configured.
pub const SUBTOPIC_PREDICATE: &str = "has specific subtopic";
/// Header line of the written outline.
pub const OUTLINE_HEADER: &str = "Subtopic Tree";

/// What to walk.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Concept the outline starts from.
    pub root: String,
    /// Only edges with this predicate are followed.
    pub predicate: String,
    /// Indentation per depth level.
    pub indent: &'static str,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.into(),
            predicate: SUBTOPIC_PREDICATE.into(),
            indent: "  ",
        }
    }
}

/// Build the outline lines (without header) for `config.root`.
pub fn subtopic_outline(store: &KnowledgeStore, config: &OutlineConfig) -> StoreResult<Vec<String>> {
    let mut visited = HashSet::new();
    let mut lines = Vec::new();
    walk(store, config, &config.root, 0, &mut visited, &mut lines)?;
    Ok(lines)
}

fn walk(
    store: &KnowledgeStore,
    config: &OutlineConfig,
    concept: &str,
    depth: usize,
    visited: &mut HashSet<String>,
    lines: &mut Vec<String>,
) -> StoreResult<()> {
    let prefix = config.indent.repeat(depth);
    if !visited.insert(concept.to_string()) {
        lines.push(format!("{prefix}{concept} -> *"));
        return Ok(());
    }
    lines.push(format!("{prefix}{concept}"));

    let subtopics: Vec<String> = store
        .triples_with_subject(concept)?
        .into_iter()
        .filter(|(_, t)| t.predicate == config.predicate)
        .map(|(_, t)| t.object)
        .collect();
    for subtopic in &subtopics {
        walk(store, config, subtopic, depth + 1, visited, lines)?;
    }
    Ok(())
}

/// Write the full outline, header included, to `out`.
pub fn write_subtopic_tree<W: Write>(
    store: &KnowledgeStore,
    config: &OutlineConfig,
    mut out: W,
) -> GraphResult<usize> {
    let lines = subtopic_outline(store, config)?;
    let io = |e| GraphError::Output { source: e };
    writeln!(out, "{OUTLINE_HEADER}\n").map_err(io)?;
    for line in &lines {
        writeln!(out, "{line}").map_err(io)?;
    }
    out.flush().map_err(io)?;
    tracing::debug!(root = %config.root, lines = lines.len(), "wrote subtopic tree");
    Ok(lines.len())
}
