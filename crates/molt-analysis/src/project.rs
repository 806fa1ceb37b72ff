//! The project model: lowered source files plus per-file import and export
//! tables.
//!
//! The core performs no I/O. A project is built from in-memory
//! `(path, source)` pairs handed over by the surrounding program's loader;
//! paths are project-relative, `/`-separated strings. Sources are sorted by
//! path on construction so every downstream iteration order is independent of
//! presentation order.

use rustc_hash::FxHashMap;

use crate::error::{AnalysisError, Result};
use crate::syntax::{lower_source, SyntaxTree};

/// Index of a file within one project, in sorted-path order.
pub type FileId = usize;

/// One input file.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub path: String,
    pub source: String,
}

impl SourceSpec {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// How a locally-bound name was imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEntry {
    /// `import { imported as local } from "module"` (or a default import,
    /// with `imported == "default"`).
    Named { module: String, imported: String },
    /// `import * as local from "module"`.
    Namespace { module: String },
}

/// Per-file map from locally-bound name to its import entry.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    entries: FxHashMap<String, ImportEntry>,
}

impl ImportMap {
    pub fn insert(&mut self, local: String, entry: ImportEntry) {
        self.entries.insert(local, entry);
    }

    pub fn get(&self, local: &str) -> Option<&ImportEntry> {
        self.entries.get(local)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where an exported name leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Declared in this module under `local`.
    Local { local: String },
    /// `export { imported as exported } from "module"`.
    ReExport { module: String, imported: String },
}

/// Per-file export surface.
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    entries: FxHashMap<String, ExportTarget>,
    /// Modules re-exported wholesale via `export * from "..."`, in source
    /// order.
    stars: Vec<String>,
}

impl ExportTable {
    pub fn insert(&mut self, exported: String, target: ExportTarget) {
        self.entries.insert(exported, target);
    }

    pub fn add_star(&mut self, module: String) {
        self.stars.push(module);
    }

    pub fn get(&self, exported: &str) -> Option<&ExportTarget> {
        self.entries.get(exported)
    }

    pub fn stars(&self) -> &[String] {
        &self.stars
    }

    /// True if `local` is exported under any name.
    pub fn exports_local(&self, local: &str) -> bool {
        self.entries
            .values()
            .any(|t| matches!(t, ExportTarget::Local { local: l } if l == local))
    }
}

/// Fast line/column lookup using pre-calculated line offsets.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    source_len: u32,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            source_len: source.len() as u32,
        }
    }

    /// Calculate line and column from byte offset.
    /// Returns (line, column) where line is 1-indexed and column is 0-indexed.
    pub fn line_column(&self, offset: u32, source: &str) -> (u32, u32) {
        // When offset is less than all line starts, binary_search returns
        // Err(0); map it to the first line to avoid an index underflow.
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };

        let line_start = self.line_starts[line_idx] as usize;
        let line = (line_idx + 1) as u32;

        let column = if offset > self.source_len {
            0
        } else {
            // Character count, not byte count.
            source[line_start..offset as usize].chars().count() as u32
        };

        (line, column)
    }
}

/// A lowered source file.
#[derive(Debug)]
pub struct SourceModule {
    pub path: String,
    pub source: String,
    pub tree: SyntaxTree,
    pub imports: ImportMap,
    pub exports: ExportTable,
    pub module_scope_decls: FxHashMap<String, u32>,
    line_index: LineIndex,
}

impl SourceModule {
    /// Line/column of a byte offset in this file.
    pub fn line_column(&self, offset: u32) -> (u32, u32) {
        self.line_index.line_column(offset, &self.source)
    }
}

/// A loaded, lowered project.
#[derive(Debug)]
pub struct Project {
    modules: Vec<SourceModule>,
    by_path: FxHashMap<String, FileId>,
}

/// Extensions probed when a specifier has none, in priority order.
const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs"];

impl Project {
    /// Build a project from in-memory sources.
    ///
    /// Sources are sorted by path; duplicate paths are a hard error. Files
    /// that fail to parse become empty modules (soft skip).
    pub fn from_sources(mut sources: Vec<SourceSpec>) -> Result<Self> {
        sources.sort_by(|a, b| a.path.cmp(&b.path));
        for pair in sources.windows(2) {
            if pair[0].path == pair[1].path {
                return Err(AnalysisError::DuplicatePath(pair[0].path.clone()));
            }
        }

        let mut modules = Vec::with_capacity(sources.len());
        let mut by_path = FxHashMap::default();
        for (id, spec) in sources.into_iter().enumerate() {
            let lowered = lower_source(&spec.path, &spec.source);
            by_path.insert(spec.path.clone(), id);
            modules.push(SourceModule {
                line_index: LineIndex::new(&spec.source),
                path: spec.path,
                source: spec.source,
                tree: lowered.tree,
                imports: lowered.imports,
                exports: lowered.exports,
                module_scope_decls: lowered.module_scope_decls,
            });
        }

        Ok(Self { modules, by_path })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, file: FileId) -> &SourceModule {
        &self.modules[file]
    }

    pub fn modules(&self) -> impl Iterator<Item = (FileId, &SourceModule)> {
        self.modules.iter().enumerate()
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    /// Resolve a relative import specifier from `from` to a project file.
    ///
    /// Only relative specifiers resolve; bare specifiers are external
    /// packages and return `None`. Probes the exact path, then known
    /// extensions, then directory index files.
    pub fn resolve_specifier(&self, from: FileId, specifier: &str) -> Option<FileId> {
        if !specifier.starts_with("./") && !specifier.starts_with("../") {
            return None;
        }

        let from_dir = match self.modules[from].path.rfind('/') {
            Some(idx) => &self.modules[from].path[..idx],
            None => "",
        };
        let joined = normalize_path(from_dir, specifier)?;

        if let Some(id) = self.file_by_path(&joined) {
            return Some(id);
        }
        for ext in EXTENSIONS {
            if let Some(id) = self.file_by_path(&format!("{joined}.{ext}")) {
                return Some(id);
            }
        }
        for ext in EXTENSIONS {
            if let Some(id) = self.file_by_path(&format!("{joined}/index.{ext}")) {
                return Some(id);
            }
        }
        None
    }
}

/// Join `base` and a relative `specifier`, resolving `.` and `..` segments.
/// Returns `None` when `..` escapes the project root.
fn normalize_path(base: &str, specifier: &str) -> Option<String> {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_sorted_by_path() {
        let project = Project::from_sources(vec![
            SourceSpec::new("src/b.ts", "export const b = 1;"),
            SourceSpec::new("src/a.ts", "export const a = 1;"),
        ])
        .unwrap();
        assert_eq!(project.module(0).path, "src/a.ts");
        assert_eq!(project.module(1).path, "src/b.ts");
    }

    #[test]
    fn test_duplicate_path_is_hard_error() {
        let err = Project::from_sources(vec![
            SourceSpec::new("src/a.ts", ""),
            SourceSpec::new("src/a.ts", ""),
        ]);
        assert!(matches!(err, Err(AnalysisError::DuplicatePath(_))));
    }

    #[test]
    fn test_parse_error_degrades_to_empty_module() {
        let project =
            Project::from_sources(vec![SourceSpec::new("src/bad.ts", "const x = {{{{")]).unwrap();
        assert!(project.module(0).tree.is_empty());
    }

    #[test]
    fn test_resolve_specifier_probes_extensions() {
        let project = Project::from_sources(vec![
            SourceSpec::new("src/app.tsx", "import { a } from './state';"),
            SourceSpec::new("src/state.ts", "export const a = 1;"),
            SourceSpec::new("src/widgets/index.tsx", "export const w = 1;"),
        ])
        .unwrap();

        let app = project.file_by_path("src/app.tsx").unwrap();
        let state = project.file_by_path("src/state.ts").unwrap();
        let widgets = project.file_by_path("src/widgets/index.tsx").unwrap();

        assert_eq!(project.resolve_specifier(app, "./state"), Some(state));
        assert_eq!(project.resolve_specifier(app, "./widgets"), Some(widgets));
        assert_eq!(project.resolve_specifier(app, "recoil"), None);
        assert_eq!(project.resolve_specifier(app, "./missing"), None);
    }

    #[test]
    fn test_line_index() {
        let source = "line 1\nline 2\nline 3";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(0, source), (1, 0));
        assert_eq!(index.line_column(7, source), (2, 0));
        assert_eq!(index.line_column(14, source), (3, 0));
    }

    #[test]
    fn test_import_map_collects_aliases() {
        let project = Project::from_sources(vec![SourceSpec::new(
            "src/app.tsx",
            "import { atom as recoilAtom } from 'recoil';\nimport * as Jotai from 'jotai';",
        )])
        .unwrap();

        let imports = &project.module(0).imports;
        assert_eq!(
            imports.get("recoilAtom"),
            Some(&ImportEntry::Named {
                module: "recoil".into(),
                imported: "atom".into()
            })
        );
        assert_eq!(
            imports.get("Jotai"),
            Some(&ImportEntry::Namespace {
                module: "jotai".into()
            })
        );
    }
}
