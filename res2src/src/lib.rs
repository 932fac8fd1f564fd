//! Compile binary resources into C++ source arrays.
//!
//! This crate turns arbitrary files (images, fonts, data blobs) into a
//! `.cpp`/`.h` pair of constant byte arrays, so a native build can link its
//! resources statically instead of reading them at runtime.
//!
//! ## How It Works
//!
//! 1.  **Discovery:** Inputs are taken as given, or expanded into a family of
//!     scaled variants (`icon.png`, `icon@2.png`, ...) sorted by file name.
//! 2.  **Compression:** Each file is optionally compressed with gzip, bzip2,
//!     xz or zstd. The generated code never decompresses; that is left to the
//!     consumer.
//! 3.  **Naming:** Every resource name is mapped onto a C identifier. Two
//!     resources mapping to the same identifier abort the run.
//! 4.  **Emission:** Payloads are rendered as decimal array initializers,
//!     wrapped to a maximum line width, and written out together with an
//!     optional registry table of `(name, data, size)` records.
//!
//! The output is a pure function of the inputs and settings, so repeated runs
//! produce byte-identical files. Both files are staged and published together;
//! a failed run leaves nothing behind.
//!
//! ## Usage
//!
//! From a `build.rs` script:
//!
//! ```no_run
//! res2src::Config::from_out_dir()?
//!     .file("assets/font.ttf")
//!     .scaled("assets/icon.png")
//!     .compress(res2src::Method::Zstd)
//!     .array("RESOURCES")
//!     .cargo_rerun(true)
//!     .run()?;
//! # Ok::<(), res2src::Error>(())
//! ```
//!
//! The generated header then declares, for each resource `icon.png`:
//!
//! ```c
//! extern const uint8_t icon_png_data[N];
//! extern const size_t icon_png_size;
//! ```
//!
//! and with a registry, `extern const resource_t RESOURCES[];` plus
//! `RESOURCES_SIZE`. Look resources up by name; the position of an entry in
//! the registry follows input order and is not stable across changes to the
//! input list.

mod compress;
mod discover;
mod emit;
mod encode;
mod error;
mod job;
mod sanitize;
mod wrap;

pub use compress::{DEFAULT_ZSTD_LEVEL, Method};
pub use discover::{Source, normalize, scaled_variants};
pub use emit::{Artifacts, HEADER_EXT, SOURCE_EXT, data_symbol, size_symbol, string_literal};
pub use encode::{array_literal, parse_array_literal};
pub use error::{Error, Result};
pub use job::{
    Config, DEFAULT_BASENAME, DEFAULT_STRUCT_NAME, DEFAULT_WRAP_WIDTH, Entry, INDENT, Input, Job,
    Outputs,
};
pub use sanitize::{is_identifier, is_reserved, sanitize};
pub use wrap::{wrap, wrap_tokens};
