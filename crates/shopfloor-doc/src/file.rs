//! Whole-file document IO.
//!
//! Writes are atomic: the document lands in a temporary sibling file that
//! is fsynced and renamed over the target, so a reader never observes a
//! half-written document. The parent directory is fsynced after the rename
//! to persist the directory entry.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use shopfloor_model::{Entity, Problem};

use crate::codec::{
    DocumentError, decode_problem, encode_entity, encode_problem, ingest_entity, parse_document,
    to_compact_string, to_pretty_string,
};

/// Rendering used when a document is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentStyle {
    /// No insignificant whitespace.
    Compact,
    /// Indented for human readers.
    #[default]
    Pretty,
}

impl DocumentStyle {
    fn render(self, document: &Value) -> String {
        match self {
            DocumentStyle::Compact => to_compact_string(document),
            DocumentStyle::Pretty => to_pretty_string(document),
        }
    }
}

/// Read and parse one document file.
pub fn read_document(path: impl AsRef<Path>) -> Result<Value, DocumentError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|error| io_error(path, error))?;
    parse_document(&text)
}

/// Write one document file atomically, replacing any previous content.
pub fn write_document(
    path: impl AsRef<Path>,
    document: &Value,
    style: DocumentStyle,
) -> Result<(), DocumentError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| io_error(parent, error))?;
    }

    let text = style.render(document);
    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), DocumentError> {
        let file = File::create(&tmp_path).map_err(|error| io_error(&tmp_path, error))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|error| io_error(&tmp_path, error))?;
        writer.flush().map_err(|error| io_error(&tmp_path, error))?;
        let file = writer
            .into_inner()
            .map_err(|error| io_error(&tmp_path, error))?;
        file.sync_all().map_err(|error| io_error(&tmp_path, error))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|error| {
        let _ = fs::remove_file(&tmp_path);
        io_error(path, error)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|error| io_error(parent, error))?;
        dir.sync_all().map_err(|error| io_error(parent, error))?;
    }

    Ok(())
}

/// Encode a whole problem and write it to `path`.
pub fn write_problem_file(
    path: impl AsRef<Path>,
    problem: &Problem,
    style: DocumentStyle,
) -> Result<(), DocumentError> {
    write_document(path, &encode_problem(problem)?, style)
}

/// Read a whole-problem document from `path`.
pub fn read_problem_file(path: impl AsRef<Path>) -> Result<Problem, DocumentError> {
    decode_problem(&read_document(path)?)
}

/// Encode one entity of `problem` and write it to `path`.
pub fn write_entity_file(
    path: impl AsRef<Path>,
    problem: &Problem,
    entity: &Entity,
    style: DocumentStyle,
) -> Result<(), DocumentError> {
    write_document(path, &encode_entity(problem, entity)?, style)
}

/// Read an entity document from `path` and register it into `problem`.
/// Returns the registered name.
pub fn ingest_entity_file(
    problem: &mut Problem,
    path: impl AsRef<Path>,
) -> Result<String, DocumentError> {
    ingest_entity(problem, &read_document(path)?)
}

fn io_error(path: &Path, error: impl std::fmt::Display) -> DocumentError {
    DocumentError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
