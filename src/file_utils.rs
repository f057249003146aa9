use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

// @module: File discovery, routing and output mapping

/// Placeholder replaced with the target language code in output paths
pub const LANG_PLACEHOLDER: &str = "$langcode$";

/// How a discovered file is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    /// Markdown or MDX document
    Markdown,
    /// JSON data file
    Json,
    /// YAML data file
    Yaml,
    /// Not a translatable document; copied or skipped
    Other,
}

impl DocumentType {
    /// Classify a path by its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "md" | "mdx" => Self::Markdown,
            "json" => Self::Json,
            "yml" | "yaml" => Self::Yaml,
            _ => Self::Other,
        }
    }

    /// Whether files of this type go through the translation pipeline
    pub fn is_translatable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A file found under the source directory
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the scanned source directory
    pub relative: PathBuf,
    /// Routing decision for the file
    pub document_type: DocumentType,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Walk the source directory and classify every file, pruning excluded
    /// directory names. Entries come back in a stable sorted order.
    pub fn find_source_files<P: AsRef<Path>>(
        source_dir: P,
        excluded_dirs: &[String],
    ) -> Result<Vec<SourceFile>> {
        let source_dir = source_dir.as_ref();
        let mut files = Vec::new();

        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_excluded(entry, excluded_dirs));

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let relative = path
                .strip_prefix(source_dir)
                .context("Discovered file outside the source directory")?
                .to_path_buf();
            let document_type = DocumentType::from_path(&path);

            files.push(SourceFile {
                path,
                relative,
                document_type,
            });
        }

        Ok(files)
    }

    fn is_excluded(entry: &DirEntry, excluded_dirs: &[String]) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| excluded_dirs.iter().any(|excluded| excluded == name))
    }

    // @generates: Output path for one relative source path and language
    pub fn output_path(relative: &Path, output_dir: &str, language: &str) -> PathBuf {
        PathBuf::from(output_dir.replace(LANG_PLACEHOLDER, language)).join(relative)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file atomically.
    ///
    /// The content lands in a temporary file next to the target and is
    /// renamed over it, so a crash never leaves a half-written document.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut file = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        file.persist(path)
            .with_context(|| format!("Failed to replace file: {:?}", path))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
