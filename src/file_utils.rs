use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::catalog::Drama;

// @module: Annotation store and directory utilities

/// Directory under an episode folder holding its annotation files
const ANNOTATION_DIR: &str = "subtitles";
const SUBTITLE_FILE: &str = "subtitle.txt";
const NAMES_FILE: &str = "names.txt";

// @struct: Locations of one episode's annotation files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPaths {
    pub subtitles: PathBuf,
    pub names: PathBuf,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `{root}/{episode}/subtitles/{subtitle,names}.txt`
    pub fn annotation_paths(drama: &Drama, episode_id: &str) -> AnnotationPaths {
        let dir = drama.annotation_root.join(episode_id).join(ANNOTATION_DIR);
        AnnotationPaths {
            subtitles: dir.join(SUBTITLE_FILE),
            names: dir.join(NAMES_FILE),
        }
    }

    /// Episode identifiers of the configured range that have a folder on disk.
    ///
    /// Order follows the episode range, not the directory listing. A missing
    /// annotation root yields no episodes.
    pub fn existing_episodes(drama: &Drama) -> Result<Vec<String>> {
        if !Self::dir_exists(&drama.annotation_root) {
            warn!("Annotation root not found for {}: {:?}", drama.id, drama.annotation_root);
            return Ok(Vec::new());
        }

        let mut present = HashSet::new();
        for entry in WalkDir::new(&drama.annotation_root).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_dir() {
                present.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }

        Ok(drama
            .episode_names()
            .into_iter()
            .filter(|name| present.contains(name))
            .collect())
    }

    /// Read an annotation file; a missing or unreadable file reads as empty.
    pub fn read_annotation<P: AsRef<Path>>(path: P) -> String {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Annotation file missing: {:?}", path);
                String::new()
            }
            Err(e) => {
                warn!("Failed to read annotation file {:?}: {}", path, e);
                String::new()
            }
        }
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
}
