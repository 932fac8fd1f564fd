//! Locating asset files: direct inputs and scaled variant families.
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use crate::{Error, Result};

/// Marker that introduces a scale factor in a file name, as in `icon@2.png`.
pub const SCALE_MARKER: char = '@';

/// An asset file to embed, together with its registry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Where the bytes are read from.
    pub path: PathBuf,
    /// The lookup key recorded in the registry.
    pub name: String,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Reads the whole file. The handle is closed before returning.
    ///
    /// # Errors
    /// [`Error::InputNotFound`] if the file is missing, [`Error::Read`] otherwise.
    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound {
                path: self.path.clone(),
            },
            _ => Error::Read {
                path: self.path.clone(),
                source,
            },
        })
    }
}

/// Renders `path` with `/` separators, without `.` components and with each
/// `..` folded into the directory before it.
///
/// This is the only place a path is turned into a registry name, so generated
/// files are the same whichever host produced them. Folding is lexical:
/// symlinks are not resolved.
pub fn normalize(path: &Path) -> String {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    let mut out = String::new();
    for part in parts {
        match part {
            Component::Prefix(p) => out.push_str(&p.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    if out.is_empty() { ".".to_owned() } else { out }
}

/// Finds `path` and every scaled variant of it in the same directory.
///
/// For `dir/icon.png` this yields `icon.png`, `icon@2.png`, `icon@3.png`, ...
/// (whichever exist), sorted by file name. Each variant is named after its
/// own file name.
///
/// # Errors
/// [`Error::InputNotFound`] if the directory or the unscaled file is missing.
pub fn scaled_variants(path: &Path) -> Result<Vec<Source>> {
    let not_found = |path: &Path| Error::InputNotFound {
        path: path.to_path_buf(),
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| not_found(path))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let (stem, ext) = split_extension(file_name);

    let listing = fs::read_dir(dir).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => not_found(dir),
        _ => Error::Read {
            path: dir.to_path_buf(),
            source,
        },
    })?;

    let mut names = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|source| Error::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_variant(&name, stem, ext) && entry.path().is_file() {
            names.push(name);
        }
    }
    if !names.iter().any(|n| n == file_name) {
        return Err(not_found(path));
    }
    names.sort_unstable();

    if names.len() == 1 {
        tracing::warn!(path = %path.display(), "no scaled variants found");
    }
    Ok(names
        .into_iter()
        .map(|name| Source::new(dir.join(&name), name))
        .collect())
}

/// Splits `icon.png` into `("icon", ".png")`. Leading dots do not start an extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) if i > 0 => file_name.split_at(i),
        _ => (file_name, ""),
    }
}

fn is_variant(name: &str, stem: &str, ext: &str) -> bool {
    let Some(middle) = name
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_suffix(ext))
    else {
        return false;
    };
    middle.is_empty() || is_scale_suffix(middle)
}

fn is_scale_suffix(s: &str) -> bool {
    s.strip_prefix(SCALE_MARKER)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
