use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @const: Characters not allowed in generated file names
static INVALID_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());

// @const: Byte budget for a file stem; suffix and extension must still fit in 255 bytes
pub const MAX_STEM_BYTES: usize = 200;

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
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Remove characters that are not allowed in file names
    pub fn clean_filename(name: &str) -> String {
        INVALID_FILENAME_CHARS.replace_all(name, "").trim().to_string()
    }

    /// Cut a stem to at most `MAX_STEM_BYTES` bytes on a char boundary
    pub fn truncate_stem(stem: &str) -> &str {
        if stem.len() <= MAX_STEM_BYTES {
            return stem;
        }
        let mut end = MAX_STEM_BYTES;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem[..end].trim_end()
    }

    // @generates: Output path for a generated document
    // @params: output_dir, title, fallback stem, suffix, extension
    pub fn document_path<P: AsRef<Path>>(
        output_dir: P,
        title: &str,
        fallback: &str,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let mut stem = Self::clean_filename(title);
        if stem.is_empty() {
            stem = Self::clean_filename(fallback);
        }

        output_dir
            .as_ref()
            .join(format!("{}_{}.{}", Self::truncate_stem(&stem), suffix, extension))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Create (or truncate) a file for writing, creating its directory first
    pub fn create_file<P: AsRef<Path>>(path: P) -> Result<File> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        File::create(&path).with_context(|| format!("Failed to create file: {:?}", path.as_ref()))
    }
}
