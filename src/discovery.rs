//! Discovery Module for the component compiler
//!
//! Finds component files under a directory and compiles many documents at
//! once. Documents share nothing, so they are compiled in parallel.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::compiler::compile_source;
use crate::config::{CompileOptions, FileMeta};
use crate::finalize::{CompileResult, Engines};
use crate::validate::CompileError;

pub const COMPONENT_EXTENSION: &str = "vue";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<CompileResult, BatchError>,
}

/// Recursively find all component files in a directory, sorted by path.
pub fn find_component_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping unreadable entry under {:?}: {}", dir, err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == COMPONENT_EXTENSION)
        })
        .collect();
    files.sort();
    files
}

/// Path of `file` relative to `root`, with `/` separators.
fn path_in_package(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn compile_file(
    root: &Path,
    file: &Path,
    package_name: Option<&str>,
    options: &CompileOptions,
    engines: Engines<'_>,
) -> Result<CompileResult, BatchError> {
    let source = fs::read_to_string(file).map_err(|source| BatchError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let meta = FileMeta::from_source(
        path_in_package(root, file),
        package_name.map(str::to_string),
        &source,
    );
    Ok(compile_source(&source, &meta, options, engines)?)
}

/// Compile every file, one entry per file in input order.
pub fn compile_batch(
    root: &Path,
    files: &[PathBuf],
    package_name: Option<&str>,
    options: &CompileOptions,
    engines: Engines<'_>,
) -> Vec<BatchEntry> {
    files
        .par_iter()
        .map(|file| {
            let result = compile_file(root, file, package_name, options, engines);
            if let Err(err) = &result {
                log::warn!("[vue-component] {:?}: {}", file, err);
            }
            BatchEntry {
                path: file.clone(),
                result,
            }
        })
        .collect()
}

/// Discover component files under `root` and compile them all.
pub fn compile_directory(
    root: &Path,
    package_name: Option<&str>,
    options: &CompileOptions,
    engines: Engines<'_>,
) -> Vec<BatchEntry> {
    let files = find_component_files(root);
    log::debug!("discovered {} component(s) under {:?}", files.len(), root);
    compile_batch(root, &files, package_name, options, engines)
}
