//! Generation and publication of the header/source pair.
use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::Path,
};

use tempfile::{NamedTempFile, PathPersistError, TempPath};

use crate::{
    Error, Job, Result,
    encode,
    job::{INDENT, Outputs},
    wrap,
};

pub const HEADER_EXT: &str = "h";
pub const SOURCE_EXT: &str = "cpp";

/// The generated text of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// `None` when the job was configured without a header.
    pub header: Option<String>,
    pub source: String,
}

/// Symbol of the byte array for `identifier`.
pub fn data_symbol(identifier: &str) -> String {
    format!("{identifier}_data")
}

/// Symbol of the length constant for `identifier`.
pub fn size_symbol(identifier: &str) -> String {
    format!("{identifier}_size")
}

/// Symbol of the registry entry count for the array `array`.
pub fn count_symbol(array: &str) -> String {
    format!("{array}_SIZE")
}

/// Include guard around the definition of the record type `struct_name`.
pub fn guard_symbol(struct_name: &str) -> String {
    format!("{}_DEFINED", struct_name.to_ascii_uppercase())
}

pub(crate) fn render(job: &Job) -> Artifacts {
    Artifacts {
        header: job.has_header().then(|| render_header(job)),
        source: render_source(job),
    }
}

// Writing into a String cannot fail, hence the ignored results below.

fn render_header(job: &Job) -> String {
    let st = job.struct_name();
    let guard = guard_symbol(st);
    let pad = " ".repeat(INDENT);

    let mut out = String::new();
    out.push_str("#pragma once\n#include <stddef.h>\n#include <stdint.h>\n\n");
    let _ = writeln!(out, "#ifndef {guard}\n#define {guard}");
    let _ = writeln!(out, "struct {st} {{");
    let _ = writeln!(
        out,
        "{pad}{st}(const char* name, const uint8_t* data, size_t size) : name(name), data(data), size(size) {{}}"
    );
    let _ = writeln!(out, "{pad}const char* name; const uint8_t* data; const size_t size;");
    out.push_str("};\n#endif\n\n");

    for entry in job.entries() {
        let _ = writeln!(
            out,
            "extern const uint8_t {}[{}];",
            data_symbol(&entry.identifier),
            encode::array_len(entry.byte_count())
        );
        let _ = writeln!(out, "extern const size_t {};", size_symbol(&entry.identifier));
    }

    if let Some(array) = job.array() {
        let _ = writeln!(out, "\nextern const {st} {array}[];");
        let _ = writeln!(out, "extern const size_t {};", count_symbol(array));
    }
    reflow(&out, job.wrap_width())
}

fn render_source(job: &Job) -> String {
    // Without a header nothing declares the symbols extern beforehand, and a
    // namespace-scope const would otherwise get internal linkage.
    let linkage = if job.has_header() { "" } else { "extern " };

    let mut out = String::new();
    if job.has_header() {
        let _ = writeln!(out, "#include \"{}\"\n", job.header_name());
    } else {
        out.push_str("#include <stddef.h>\n#include <stdint.h>\n\n");
    }

    for entry in job.entries() {
        let _ = writeln!(
            out,
            "{linkage}const uint8_t {}[{}] = {};",
            data_symbol(&entry.identifier),
            encode::array_len(entry.byte_count()),
            encode::array_literal(&entry.payload)
        );
        let _ = writeln!(
            out,
            "{linkage}const size_t {} = {};\n",
            size_symbol(&entry.identifier),
            entry.byte_count()
        );
    }

    if let Some(array) = job.array() {
        let st = job.struct_name();
        let pad = " ".repeat(INDENT);
        let _ = writeln!(out, "const {st} {array}[] = {{");
        for entry in job.entries() {
            let _ = writeln!(
                out,
                "{pad}{st}({}, {}, {}),",
                string_literal(&entry.name),
                data_symbol(&entry.identifier),
                size_symbol(&entry.identifier)
            );
        }
        out.push_str("};\n");
        let _ = writeln!(
            out,
            "const size_t {} = {};",
            count_symbol(array),
            job.entries().len()
        );
    }
    reflow(&out, job.wrap_width())
}

/// Wraps every line except preprocessor directives, which cannot continue
/// onto another line without a backslash.
fn reflow(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for line in text.split_inclusive('\n') {
        if line.starts_with('#') {
            out.push_str(line);
        } else {
            out.push_str(&wrap::wrap_tokens(line, width, INDENT));
        }
    }
    out
}

/// Quotes `s` as a C string literal.
///
/// Control characters use three-digit octal escapes, which cannot swallow the
/// characters that follow them.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Stages every artifact in `dir`, then moves them into place.
///
/// Existing outputs are moved aside first. If any step fails, every file
/// published so far is replaced by its previous contents (or removed if there
/// were none), so the pair is never left out of sync.
pub(crate) fn publish(dir: &Path, artifacts: &Artifacts, outputs: &Outputs) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut staged = Vec::with_capacity(2);
    if let (Some(text), Some(path)) = (&artifacts.header, &outputs.header) {
        staged.push((stage(dir, text)?, path.as_path()));
    }
    staged.push((stage(dir, &artifacts.source)?, outputs.source.as_path()));

    let mut published = Vec::with_capacity(staged.len());
    for (file, path) in staged {
        let backup = match set_aside(dir, path) {
            Ok(backup) => backup,
            Err(err) => return Err(roll_back(published, err)),
        };
        if let Err(err) = file.persist(path) {
            let err = Error::Write {
                path: path.to_path_buf(),
                source: err.error,
            };
            if backup.is_some() {
                published.push(Published { path, backup });
            }
            return Err(roll_back(published, err));
        }
        tracing::debug!(path = %path.display(), "published");
        published.push(Published { path, backup });
    }
    // Dropping the backups deletes them.
    Ok(())
}

/// A file moved into place, with the previous contents of its path.
struct Published<'a> {
    path: &'a Path,
    backup: Option<TempPath>,
}

impl Published<'_> {
    fn undo(self) -> io::Result<()> {
        match self.backup {
            Some(backup) => backup.persist(self.path).map_err(|PathPersistError { error, path }| {
                if let Ok(kept) = path.keep() {
                    tracing::warn!(backup = %kept.display(), "previous output kept");
                }
                error
            }),
            None => fs::remove_file(self.path),
        }
    }
}

/// Moves an existing regular file at `path` to a temporary name in `dir`.
fn set_aside(dir: &Path, path: &Path) -> Result<Option<TempPath>> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_file() => {}
        _ => return Ok(None),
    }
    let backup = tempfile::Builder::new()
        .prefix(".res2src-")
        .tempfile_in(dir)
        .map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?
        .into_temp_path();
    fs::rename(path, &backup).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(backup))
}

/// Undoes `published` in reverse order and returns the error to report.
fn roll_back(published: Vec<Published<'_>>, failed: Error) -> Error {
    let mut restore = None;
    for done in published.into_iter().rev() {
        let path = done.path;
        if let Err(source) = done.undo() {
            tracing::error!(path = %path.display(), error = %source, "rollback failed");
            if restore.is_none() {
                restore = Some((path.to_path_buf(), source));
            }
        }
    }
    match restore {
        Some((path, source)) => Error::Restore {
            path,
            source,
            failed: Box::new(failed),
        },
        None => failed,
    }
}

fn stage(dir: &Path, text: &str) -> Result<NamedTempFile> {
    let write_err = |source: std::io::Error| Error::Write {
        path: dir.to_path_buf(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix(".res2src-")
        .tempfile_in(dir)
        .map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    Ok(file)
}
