//! File and folder classification
//!
//! Files are classified by their lowercased extension. Folders are classified
//! from their name alone, never from what they contain.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Video,
    Audio,
    Image,
    Document,
    Archive,
    Installer,
    Data,
    Code,
    Other,
}

pub const FOLDER_ICON: &str = "📁";
pub const UNCATEGORIZED_ICON: &str = "📂";
const DEFAULT_FILE_ICON: &str = "📄";

/// Ordered substring rules for folder names. The first rule with a matching
/// needle wins, so "video projects" is video and not archive.
const FOLDER_RULES: &[(&[&str], Category)] = &[
    (&["video"], Category::Video),
    (&["music", "audio"], Category::Audio),
    (&["image", "screenshot", "photo"], Category::Image),
    (&["document", "form"], Category::Document),
    (&["install", "archive"], Category::Installer),
    (&["financial", "finance"], Category::Document),
    (&["ai", "eval"], Category::Document),
    (&["podcast", "parenting", "education"], Category::Audio),
    (&["code", "project"], Category::Archive),
    (&["manual", "reference"], Category::Document),
];

/// Lowercased extension without the dot, or an empty string.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Semantic category of a file, from its extension.
pub fn file_category(name: &str) -> Category {
    category_for_extension(&extension_of(name))
}

fn category_for_extension(ext: &str) -> Category {
    match ext {
        "mp4" | "mov" | "avi" | "mkv" | "webm" | "m4v" => Category::Video,
        "mp3" | "m4a" | "wav" | "flac" | "aac" | "ogg" | "wma" => Category::Audio,
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "heic" | "tiff" => {
            Category::Image
        }
        "pdf" | "doc" | "docx" | "txt" | "rtf" | "odt" | "xls" | "xlsx" | "ppt" | "pptx"
        | "csv" => Category::Document,
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" => Category::Archive,
        "dmg" | "pkg" | "app" | "exe" | "msi" => Category::Installer,
        "json" | "xml" | "yaml" | "yml" | "sql" | "db" => Category::Data,
        "py" | "js" | "ts" | "html" | "css" | "java" | "cpp" | "c" | "go" | "rs" | "rb" => {
            Category::Code
        }
        _ => Category::Other,
    }
}

/// Display icon for a file (or the generic folder icon for directories).
pub fn file_icon(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return FOLDER_ICON;
    }

    match extension_of(name).as_str() {
        "mp4" | "mov" | "avi" => "🎥",
        "mp3" => "🎙️",
        "m4a" | "wav" => "🎵",
        "jpg" | "jpeg" => "📸",
        "png" => "📱",
        "webp" => "🌐",
        "gif" => "🎞️",
        "pdf" => "📄",
        "doc" | "docx" | "txt" => "📝",
        "zip" | "rar" | "7z" => "📦",
        "dmg" => "💿",
        "pkg" => "📀",
        "json" | "xml" => "📊",
        "py" => "🐍",
        "js" => "📜",
        "html" => "🌐",
        "srt" => "📝",
        "ics" => "📅",
        "pkpass" => "🎟️",
        _ => DEFAULT_FILE_ICON,
    }
}

/// Heuristic category of a folder, from substrings of its name.
pub fn folder_category(name: &str) -> Category {
    let lower = name.to_lowercase();
    FOLDER_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lower.contains(needle)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

/// Icon for a folder with one of the well-known organizer names.
pub fn folder_icon(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "video" => "🎬",
        "music" => "🎵",
        "images & screenshots" => "🖼️",
        "ai & evals" => "🤖",
        "forms & documents" => "📋",
        "financial" => "💰",
        "parenting & education podcasts" => "👨‍👩‍👧",
        "installers & archives" => "📦",
        "code projects" => "💻",
        "manuals & reference" => "📖",
        "misc" => "✨",
        _ => FOLDER_ICON,
    }
}
