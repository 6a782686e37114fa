use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classify::{self, Category};
use crate::size::format_size;

pub const DEFAULT_DISPLAY_LIMIT: usize = 20;
pub const TRASH_FOLDER: &str = "$RECYCLE.BIN";
pub const UNCATEGORIZED: &str = "Uncategorized";

const DISPLAY_NAME_MAX_CHARS: usize = 50;

/// Snapshot of a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name, or the path below the scanned folder for nested files
    pub name: String,
    pub display_name: String,
    pub extension: String,
    #[serde(rename = "type")]
    pub file_type: Category,
    pub icon: String,
    pub size_bytes: u64,
    pub size: String,
    pub modified: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub name: String,
    pub icon: String,
    pub category: Category,
    /// Largest files first, at most the display limit
    pub files: Vec<FileRecord>,
    pub total_files: usize,
    /// Files counted in `total_files` but left out of `files`
    pub hidden_files: usize,
    pub total_size: u64,
    pub total_size_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub total_size: u64,
    pub total_size_formatted: String,
    /// Number of folders in the result
    pub categories: usize,
    /// Number of distinct non-empty extensions
    pub file_types: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub folders: Vec<FolderSummary>,
    pub stats: ScanStats,
    pub scanned_at: DateTime<Local>,
}

/// Outcome of reading one file's metadata
#[derive(Debug)]
pub enum Probe {
    Found(FileRecord),
    /// The file could not be read and is left out of the scan
    Unavailable(io::ErrorKind),
}

impl Probe {
    pub fn into_record(self) -> Option<FileRecord> {
        match self {
            Probe::Found(record) => Some(record),
            Probe::Unavailable(_) => None,
        }
    }
}

/// Everything a scan needs to know, fixed at construction
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub display_limit: usize,
    /// Entry names skipped at any depth, in addition to hidden ones
    pub excluded_names: Vec<String>,
}

impl ScanOptions {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            display_limit: DEFAULT_DISPLAY_LIMIT,
            excluded_names: vec![TRASH_FOLDER.to_string()],
        }
    }

    pub fn with_display_limit(mut self, display_limit: usize) -> Self {
        self.display_limit = display_limit;
        self
    }

    pub fn with_excluded_names(mut self, excluded_names: Vec<String>) -> Self {
        self.excluded_names = excluded_names;
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        is_hidden(name) || self.excluded_names.iter().any(|excluded| excluded == name)
    }
}

pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan the root folder. A missing or unreadable root gives an empty result.
    pub fn scan(&self) -> ScanResult {
        let root = &self.options.root;

        let read_dir = match fs::read_dir(root) {
            Ok(rd) => rd,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", root.display(), e);
                return ScanResult::from_folders(Vec::new());
            }
        };

        // Sort children so repeated scans list equal-sized entries the same way
        let mut children: Vec<_> = read_dir.filter_map(|e| e.ok()).collect();
        children.sort_by_key(|entry| entry.file_name());

        let mut folders = Vec::new();
        let mut root_files = Vec::new();

        for entry in children {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.options.is_excluded(&name) {
                continue;
            }

            let path = entry.path();
            if path.is_dir() {
                let folder = scan_folder(&path, &self.options);
                if !folder.files.is_empty() {
                    folders.push(folder);
                }
            } else if let Some(record) = probe_file(&path, None).into_record() {
                root_files.push(record);
            }
        }

        if !root_files.is_empty() {
            folders.push(FolderSummary::uncategorized(root_files));
        }

        folders.sort_by(|a, b| b.total_size.cmp(&a.total_size));

        let result = ScanResult::from_folders(folders);
        tracing::info!(
            "Scanned {}: {} files in {} folders ({})",
            root.display(),
            result.stats.total_files,
            result.stats.categories,
            result.stats.total_size_formatted
        );
        result
    }
}

impl ScanResult {
    fn from_folders(folders: Vec<FolderSummary>) -> Self {
        let displayed = || folders.iter().flat_map(|folder| folder.files.iter());

        let total_files = displayed().count();
        let total_size: u64 = displayed().map(|file| file.size_bytes).sum();
        let file_types = displayed()
            .filter(|file| !file.extension.is_empty())
            .map(|file| file.extension.as_str())
            .collect::<HashSet<_>>()
            .len();

        let stats = ScanStats {
            total_files,
            total_size,
            total_size_formatted: format_size(total_size),
            categories: folders.len(),
            file_types,
        };

        Self {
            folders,
            stats,
            scanned_at: Local::now(),
        }
    }
}

impl FolderSummary {
    /// Loose files from the root. Not subject to the display limit.
    fn uncategorized(mut files: Vec<FileRecord>) -> Self {
        sort_largest_first(&mut files);
        let total_size = files.iter().map(|f| f.size_bytes).sum();

        Self {
            name: UNCATEGORIZED.to_string(),
            icon: classify::UNCATEGORIZED_ICON.to_string(),
            category: Category::Other,
            total_files: files.len(),
            hidden_files: 0,
            files,
            total_size,
            total_size_formatted: format_size(total_size),
        }
    }
}

/// Summarize every non-hidden file below `folder`, at any depth.
///
/// Entries that cannot be read are skipped; the summary covers whatever the
/// walk could reach.
pub fn scan_folder(folder: &Path, options: &ScanOptions) -> FolderSummary {
    let name = folder
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !options.is_excluded(&entry.file_name().to_string_lossy()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };

        // Follow symlinks when deciding what is a file
        if !entry.path().is_file() {
            continue;
        }

        if let Some(record) = probe_file(entry.path(), Some(folder)).into_record() {
            files.push(record);
        }
    }

    let total_files = files.len();
    let total_size = files.iter().map(|f| f.size_bytes).sum();

    sort_largest_first(&mut files);
    files.truncate(options.display_limit);

    FolderSummary {
        icon: classify::folder_icon(&name).to_string(),
        category: classify::folder_category(&name),
        name,
        files,
        total_files,
        hidden_files: total_files.saturating_sub(options.display_limit),
        total_size,
        total_size_formatted: format_size(total_size),
    }
}

/// Read one file's metadata into a record.
///
/// With `relative_to`, the record name is the path below that folder when the
/// file lives inside it.
pub fn probe_file(path: &Path, relative_to: Option<&Path>) -> Probe {
    match read_record(path, relative_to) {
        Ok(record) => Probe::Found(record),
        Err(e) => {
            tracing::debug!("Cannot read {}: {}", path.display(), e);
            Probe::Unavailable(e.kind())
        }
    }
}

fn read_record(path: &Path, relative_to: Option<&Path>) -> io::Result<FileRecord> {
    let metadata = fs::metadata(path)?;
    let modified = DateTime::<Local>::from(metadata.modified()?);

    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let name = relative_to
        .and_then(|base| path.strip_prefix(base).ok())
        .map(|relative| relative.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.clone());

    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let size_bytes = metadata.len();

    Ok(FileRecord {
        name,
        display_name: truncate_display_name(&stem),
        extension: classify::extension_of(&file_name),
        file_type: classify::file_category(&file_name),
        icon: classify::file_icon(&file_name, false).to_string(),
        size_bytes,
        size: format_size(size_bytes),
        modified,
    })
}

fn truncate_display_name(stem: &str) -> String {
    if stem.chars().count() > DISPLAY_NAME_MAX_CHARS {
        let truncated: String = stem.chars().take(DISPLAY_NAME_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        stem.to_string()
    }
}

fn sort_largest_first(files: &mut [FileRecord]) {
    files.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
