//! Directory loader: turns a repository checkout into [`Document`]s.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use repoqa_core::{Document, Error, SourceMeta};

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "py", "js", "java", "c", "cpp", "cs", "go", "rb", "php", "scala", "html", "htm",
    "xml", "json", "yaml", "yml", "ini", "toml", "cfg", "conf", "sh", "bash", "css", "scss", "sql", "gitignore",
    "dockerignore", "editorconfig", "ipynb",
];

/// Characters of the first stream output kept per notebook cell.
const MAX_OUTPUT_CHARS: usize = 20;

/// `[loader]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect() }
    }
}

impl LoaderConfig {
    fn accepts(&self, kind: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(kind))
    }
}

#[derive(Debug, Default)]
pub struct LoadedCorpus {
    /// Sorted by source path.
    pub documents: Vec<Document>,
    /// Loaded files per kind.
    pub file_types: BTreeMap<String, usize>,
}

/// Lowercased extension, or the name without its leading dot for dotfiles
/// such as `.gitignore`.
pub fn file_kind(path: &Path) -> Option<String> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        return Some(ext.to_lowercase());
    }
    let name = path.file_name()?.to_str()?;
    name.strip_prefix('.').filter(|rest| !rest.is_empty()).map(str::to_lowercase)
}

/// Files under `root` whose kind is accepted, as (relative source, path)
/// pairs sorted by source. `.git` is never entered.
pub fn discover(root: &Path, config: &LoaderConfig) -> Result<Vec<(String, PathBuf)>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("directory {}", root.display())).into());
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| e.file_name() != ".git");
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !file_kind(path).is_some_and(|kind| config.accepts(&kind)) {
            continue;
        }
        files.push((relative_source(root, path), path.to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Load every accepted file under `root`, ticking `progress` once per file.
///
/// Files that cannot be read or parsed are logged and left out.
pub fn load_directory(root: &Path, config: &LoaderConfig, progress: &ProgressBar) -> Result<LoadedCorpus> {
    let files = discover(root, config)?;
    progress.set_length(files.len() as u64);

    let mut corpus = LoadedCorpus::default();
    for (source, path) in files {
        progress.set_message(source.clone());
        match load_file(&source, &path) {
            Ok(doc) => {
                if let Some(kind) = file_kind(&path) {
                    *corpus.file_types.entry(kind).or_default() += 1;
                }
                corpus.documents.push(doc);
            }
            Err(err) => tracing::warn!(source = %source, error = %err, "skipping file"),
        }
        progress.inc(1);
    }
    tracing::info!(
        root = %root.display(),
        documents = corpus.documents.len(),
        kinds = corpus.file_types.len(),
        "loaded corpus"
    );
    Ok(corpus)
}

/// Read one file into a document whose id is the blake3 hash of `source`.
pub fn load_file(source: &str, path: &Path) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let raw = String::from_utf8_lossy(&bytes);
    let text = if file_kind(path).as_deref() == Some("ipynb") {
        flatten_notebook(&raw).with_context(|| format!("parsing notebook {source}"))?
    } else {
        raw.into_owned()
    };
    let file_id = blake3::hash(source.as_bytes()).to_hex().to_string();
    Ok(Document::new(file_id.clone(), text, SourceMeta::new(source, file_id)))
}

fn relative_source(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// One `'<cell_type>' cell: '<source>'` block per cell, newlines removed.
/// Code cells carry their first output: an error name or a truncated stream.
pub fn flatten_notebook(raw: &str) -> Result<String> {
    let notebook: Value = serde_json::from_str(raw)?;
    let cells = notebook
        .get("cells")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("notebook has no cells array"))?;
    Ok(cells.iter().map(render_cell).collect())
}

fn render_cell(cell: &Value) -> String {
    let kind = cell.get("cell_type").and_then(Value::as_str).unwrap_or("unknown");
    let source = joined_text(cell.get("source")).replace('\n', "");
    let output = if kind == "code" {
        cell.get("outputs").and_then(Value::as_array).and_then(|outs| outs.first())
    } else {
        None
    };
    match output {
        Some(out) if out.get("ename").is_some() => {
            let name = out.get("ename").and_then(Value::as_str).unwrap_or_default();
            let value = out.get("evalue").and_then(Value::as_str).unwrap_or_default();
            format!("'{kind}' cell: '{source}'\n, gives error '{name}', with description '{value}'\n\n")
        }
        Some(out) if out.get("output_type").and_then(Value::as_str) == Some("stream") => {
            let text: String = joined_text(out.get("text")).replace('\n', "").chars().take(MAX_OUTPUT_CHARS).collect();
            format!("'{kind}' cell: '{source}'\n with output: '{text}'\n\n")
        }
        _ => format!("'{kind}' cell: '{source}'\n\n"),
    }
}

// nbformat stores multi-line strings either whole or as a list of lines
fn joined_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_extensions_and_dotfiles() {
        assert_eq!(file_kind(Path::new("src/Main.PY")).as_deref(), Some("py"));
        assert_eq!(file_kind(Path::new(".gitignore")).as_deref(), Some("gitignore"));
        assert_eq!(file_kind(Path::new("a/.editorconfig")).as_deref(), Some("editorconfig"));
        assert_eq!(file_kind(Path::new("Makefile")), None);
        assert_eq!(file_kind(Path::new(".")), None);
    }

    #[test]
    fn notebook_cells_are_flattened() {
        let raw = r##"{"cells": [
            {"cell_type": "markdown", "source": ["# Title\n", "intro"]},
            {"cell_type": "code", "source": "print('hello world, again')",
             "outputs": [{"output_type": "stream", "text": ["hello world, again and again\n"]}]},
            {"cell_type": "code", "source": "1/0",
             "outputs": [{"output_type": "error", "ename": "ZeroDivisionError", "evalue": "division by zero"}]}
        ]}"##;
        let text = flatten_notebook(raw).expect("valid notebook");
        assert_eq!(
            text,
            "'markdown' cell: '# Titleintro'\n\n\
             'code' cell: 'print('hello world, again')'\n with output: 'hello world, again a'\n\n\
             'code' cell: '1/0'\n, gives error 'ZeroDivisionError', with description 'division by zero'\n\n"
        );
    }

    #[test]
    fn malformed_notebook_is_an_error() {
        assert!(flatten_notebook("not json").is_err());
        assert!(flatten_notebook(r#"{"metadata": {}}"#).is_err());
    }

    #[test]
    fn custom_extension_list_is_case_insensitive() {
        let config = LoaderConfig { extensions: vec!["RS".into()] };
        assert!(config.accepts("rs"));
        assert!(!config.accepts("md"));
    }
}
