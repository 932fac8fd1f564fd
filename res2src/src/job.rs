//! Configuration builder and the validated job it produces.
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    Artifacts, Error, Result,
    compress::Method,
    discover::{self, Source},
    emit,
    sanitize::{self, Identifiers},
};

/// Default maximum width of generated lines.
pub const DEFAULT_WRAP_WIDTH: usize = 120;
/// Indentation of wrapped continuation lines and registry rows.
pub const INDENT: usize = 2;
/// Default name of the registry record type.
pub const DEFAULT_STRUCT_NAME: &str = "resource_t";
/// Default basename of the generated files.
pub const DEFAULT_BASENAME: &str = "resources";

/// One requested input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A single file. Without an explicit name the normalized path is used.
    File { path: PathBuf, name: Option<String> },
    /// A file plus all of its `@<n>` scaled siblings.
    Scaled(PathBuf),
}

impl Input {
    /// Parses a `path[=name]` token.
    pub fn parse(token: &str) -> Self {
        match token.split_once('=') {
            Some((path, name)) => Self::File {
                path: path.into(),
                name: Some(name.to_owned()),
            },
            None => Self::File {
                path: token.into(),
                name: None,
            },
        }
    }

    /// Parses legacy `path name path name ...` arguments.
    ///
    /// # Errors
    /// [`Error::Argument`] if the number of arguments is odd.
    pub fn pairs<S: AsRef<str>>(args: &[S]) -> Result<Vec<Self>> {
        if args.len() % 2 != 0 {
            return Err(Error::argument(format!(
                "paired inputs must come as `path name` pairs, got {} arguments",
                args.len()
            )));
        }
        Ok(args
            .chunks_exact(2)
            .map(|pair| Self::File {
                path: pair[0].as_ref().into(),
                name: Some(pair[1].as_ref().to_owned()),
            })
            .collect())
    }
}

/// A builder for configuring a resource compilation run.
///
/// # Example
/// ```no_run
/// // in build.rs
/// res2src::Config::from_out_dir()?
///     .file("assets/logo.png")
///     .scaled("assets/icon.png")
///     .compress(res2src::Method::Gzip)
///     .array("RESOURCES")
///     .cargo_rerun(true)
///     .run()?;
/// # Ok::<(), res2src::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    inputs: Vec<Input>,
    output_dir: PathBuf,
    basename: String,
    base_dir: Option<PathBuf>,
    method: Method,
    level: Option<u32>,
    array: Option<String>,
    struct_name: String,
    prefix: String,
    header: bool,
    wrap_width: usize,
    verify: bool,
    cargo_rerun: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Config {
    /// Creates a configuration writing into `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: output_dir.as_ref().to_path_buf(),
            basename: DEFAULT_BASENAME.to_owned(),
            base_dir: None,
            method: Method::None,
            level: None,
            array: None,
            struct_name: DEFAULT_STRUCT_NAME.to_owned(),
            prefix: String::new(),
            header: true,
            wrap_width: DEFAULT_WRAP_WIDTH,
            verify: false,
            cargo_rerun: false,
        }
    }

    /// Creates a configuration writing into Cargo's `OUT_DIR`.
    ///
    /// # Errors
    /// [`Error::Var`] when not running inside a build script.
    pub fn from_out_dir() -> Result<Self> {
        let out_dir = env::var_os("OUT_DIR").ok_or(Error::Var("OUT_DIR"))?;
        Ok(Self::new(out_dir))
    }

    /// Adds an input.
    #[must_use]
    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    /// Adds several inputs, keeping their order.
    #[must_use]
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = Input>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Adds a file registered under its normalized path.
    #[must_use]
    pub fn file(self, path: impl Into<PathBuf>) -> Self {
        self.input(Input::File {
            path: path.into(),
            name: None,
        })
    }

    /// Adds a file registered under `name`.
    #[must_use]
    pub fn named(self, path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.input(Input::File {
            path: path.into(),
            name: Some(name.into()),
        })
    }

    /// Adds a file and its scaled variants.
    #[must_use]
    pub fn scaled(self, path: impl Into<PathBuf>) -> Self {
        self.input(Input::Scaled(path.into()))
    }

    /// Sets the basename of the generated `.cpp`/`.h` pair.
    #[must_use]
    pub fn basename(mut self, name: impl Into<String>) -> Self {
        self.basename = name.into();
        self
    }

    /// Resolves relative input paths against `dir` instead of the current directory.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Sets the compression method.
    #[must_use]
    pub const fn compress(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the codec level. Each method has its own range, see [`Method::levels`].
    #[must_use]
    pub const fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Emits a registry table named `name` plus a `<name>_SIZE` count.
    #[must_use]
    pub fn array(mut self, name: impl Into<String>) -> Self {
        self.array = Some(name.into());
        self
    }

    /// Sets the registry record type name.
    #[must_use]
    pub fn struct_name(mut self, name: impl Into<String>) -> Self {
        self.struct_name = name.into();
        self
    }

    /// Prepends `prefix` to every resource name before it becomes an identifier.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enables or disables the header. A registry table requires one.
    #[must_use]
    pub const fn header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }

    /// Sets the maximum width of generated lines.
    #[must_use]
    pub const fn wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    /// Decompresses every payload after compression and checks it against the input.
    #[must_use]
    pub const fn verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Prints `cargo:rerun-if-changed` for every input file and scanned directory.
    #[must_use]
    pub const fn cargo_rerun(mut self, enabled: bool) -> Self {
        self.cargo_rerun = enabled;
        self
    }

    /// Validates the configuration, then reads and compresses every asset.
    ///
    /// Nothing is written.
    ///
    /// # Errors
    /// [`Error::Argument`] for an invalid configuration (checked before any I/O),
    /// [`Error::NameCollision`] if two assets map to one identifier (checked
    /// before any asset is read), and read or compression errors.
    pub fn build(self) -> Result<Job> {
        let level = self.validate()?;
        let sources = self.discover()?;

        let mut identifiers = Identifiers::default();
        let mut named = Vec::with_capacity(sources.len());
        for source in sources {
            let identifier = sanitize::sanitize(&format!("{}{}", self.prefix, source.name));
            identifiers.claim(&identifier, &source.name)?;
            named.push((source, identifier));
        }
        self.claim_symbols(&named)?;

        let entries = load_all(named, self.method, level, self.verify)?;

        Ok(Job {
            entries,
            output_dir: self.output_dir,
            basename: self.basename,
            wrap_width: self.wrap_width,
            method: self.method,
            header: self.header,
            array: self.array,
            struct_name: self.struct_name,
        })
    }

    /// Builds the job and writes both generated files.
    ///
    /// # Errors
    /// See [`Config::build`] and [`Job::write`].
    pub fn run(self) -> Result<Outputs> {
        self.build()?.write()
    }

    fn validate(&self) -> Result<u32> {
        if self.inputs.is_empty() {
            return Err(Error::argument("no inputs given"));
        }
        if self.array.is_some() && !self.header {
            return Err(Error::argument(
                "a registry array requires a header to declare its type",
            ));
        }
        if let Some(array) = &self.array {
            check_symbol_name("array", array)?;
        }
        check_symbol_name("struct", &self.struct_name)?;
        if STRUCT_MEMBERS.contains(&self.struct_name.as_str()) {
            return Err(Error::argument(format!(
                "struct name '{}' clashes with one of its members",
                self.struct_name
            )));
        }
        if self.basename.is_empty() || self.basename.contains(['/', '\\']) {
            return Err(Error::argument(format!(
                "output name '{}' must be a plain file name",
                self.basename
            )));
        }
        if self.wrap_width < INDENT + 2 {
            return Err(Error::argument(format!(
                "line length {} is too small (minimum {})",
                self.wrap_width,
                INDENT + 2
            )));
        }
        for input in &self.inputs {
            if let Input::File { name: Some(name), path } = input {
                if name.is_empty() {
                    return Err(Error::argument(format!(
                        "empty resource name for '{}'",
                        path.display()
                    )));
                }
            }
        }
        let level = self.level.unwrap_or(self.method.default_level());
        if !self.method.levels().contains(&level) {
            return Err(Error::argument(format!(
                "level {level} is out of range for {} ({}..={})",
                self.method,
                self.method.levels().start(),
                self.method.levels().end()
            )));
        }
        Ok(level)
    }

    /// Claims every global name the generated pair declares, so no two of
    /// them coincide.
    fn claim_symbols(&self, named: &[(Source, String)]) -> Result<()> {
        let mut symbols = Identifiers::default();
        for (source, identifier) in named {
            symbols.claim(&emit::data_symbol(identifier), &source.name)?;
            symbols.claim(&emit::size_symbol(identifier), &source.name)?;
        }
        if self.header {
            symbols.claim(&self.struct_name, "struct name")?;
            symbols.claim(&emit::guard_symbol(&self.struct_name), "struct guard")?;
        }
        if let Some(array) = &self.array {
            symbols.claim(array, "registry array")?;
            symbols.claim(&emit::count_symbol(array), "registry array count")?;
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Expands inputs into sources in request order.
    fn discover(&self) -> Result<Vec<Source>> {
        let mut sources = Vec::new();
        for input in &self.inputs {
            match input {
                Input::File { path, name } => {
                    let name = name.clone().unwrap_or_else(|| discover::normalize(path));
                    let resolved = self.resolve(path);
                    if self.cargo_rerun {
                        println!("cargo:rerun-if-changed={}", resolved.display());
                    }
                    sources.push(Source::new(resolved, name));
                }
                Input::Scaled(path) => {
                    let resolved = self.resolve(path);
                    if self.cargo_rerun {
                        if let Some(dir) = resolved.parent() {
                            println!("cargo:rerun-if-changed={}", dir.display());
                        }
                    }
                    sources.extend(discover::scaled_variants(&resolved)?);
                }
            }
        }
        Ok(sources)
    }
}

/// Member names of the generated record type.
const STRUCT_MEMBERS: [&str; 3] = ["name", "data", "size"];

fn check_symbol_name(what: &str, name: &str) -> Result<()> {
    if !sanitize::is_identifier(name) {
        return Err(Error::argument(format!(
            "{what} name '{name}' is not a valid identifier"
        )));
    }
    if sanitize::is_reserved(name) {
        return Err(Error::argument(format!("{what} name '{name}' is a reserved word")));
    }
    Ok(())
}

/// Reads, compresses and optionally verifies every source, keeping their order.
fn load_all(
    named: Vec<(Source, String)>,
    method: Method,
    level: u32,
    verify: bool,
) -> Result<Vec<Entry>> {
    let load = |(source, identifier): (Source, String)| -> Result<Entry> {
        let raw = source.read()?;
        let payload = method.compress(&raw, level)?;
        if verify && method.decompress(&payload).ok().as_deref() != Some(raw.as_slice()) {
            return Err(Error::RoundTrip { name: source.name });
        }
        tracing::debug!(
            path = %source.path.display(),
            identifier = %identifier,
            raw = raw.len(),
            encoded = payload.len(),
            "loaded asset"
        );
        Ok(Entry {
            name: source.name,
            identifier,
            payload,
        })
    };

    #[cfg(feature = "parallel")]
    let loaded: Vec<Result<Entry>> = {
        use rayon::prelude::*;
        named.into_par_iter().map(load).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let loaded: Vec<Result<Entry>> = named.into_iter().map(load).collect();

    // The first failure in request order wins, however the work was scheduled.
    loaded.into_iter().collect()
}

/// One embedded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The registry lookup key, as given.
    pub name: String,
    /// The sanitized, unique identifier its symbols derive from.
    pub identifier: String,
    /// The bytes after compression.
    pub payload: Vec<u8>,
}

impl Entry {
    /// Length of the embedded payload (not of the original file).
    pub fn byte_count(&self) -> usize {
        self.payload.len()
    }
}

/// A validated, fully loaded compilation job.
///
/// Rendering a job is a pure function of its contents.
#[derive(Debug, Clone)]
pub struct Job {
    entries: Vec<Entry>,
    output_dir: PathBuf,
    basename: String,
    wrap_width: usize,
    method: Method,
    header: bool,
    array: Option<String>,
    struct_name: String,
}

impl Job {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub const fn method(&self) -> Method {
        self.method
    }

    pub const fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    pub const fn has_header(&self) -> bool {
        self.header
    }

    /// Name of the registry array, if one is emitted.
    pub fn array(&self) -> Option<&str> {
        self.array.as_deref()
    }

    pub fn struct_name(&self) -> &str {
        &self.struct_name
    }

    /// File name of the generated header.
    pub fn header_name(&self) -> String {
        format!("{}.{}", self.basename, emit::HEADER_EXT)
    }

    /// File name of the generated source.
    pub fn source_name(&self) -> String {
        format!("{}.{}", self.basename, emit::SOURCE_EXT)
    }

    /// Renders the generated files without touching the filesystem.
    pub fn render(&self) -> Artifacts {
        emit::render(self)
    }

    /// Renders and publishes the generated files.
    ///
    /// Both files are staged next to their destination and only then moved into
    /// place, so a failure never leaves a half-written file behind.
    ///
    /// # Errors
    /// [`Error::Write`] if staging or publishing fails.
    pub fn write(&self) -> Result<Outputs> {
        let artifacts = self.render();
        let outputs = Outputs {
            source: self.output_dir.join(self.source_name()),
            header: self.header.then(|| self.output_dir.join(self.header_name())),
        };
        emit::publish(&self.output_dir, &artifacts, &outputs)?;
        tracing::info!(
            entries = self.entries.len(),
            method = %self.method(),
            source = %outputs.source.display(),
            "generated resources"
        );
        Ok(outputs)
    }
}

/// Paths of the files written by [`Job::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    pub source: PathBuf,
    pub header: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn assets(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, data) in files {
            fs::write(dir.path().join(name), data).unwrap();
        }
        dir
    }

    #[test]
    fn parses_direct_tokens() {
        assert_eq!(
            Input::parse("img/a.png=logo"),
            Input::File {
                path: "img/a.png".into(),
                name: Some("logo".into())
            }
        );
        assert_eq!(
            Input::parse("img/a.png"),
            Input::File {
                path: "img/a.png".into(),
                name: None
            }
        );
    }

    #[test]
    fn odd_pairs_are_rejected() {
        assert!(matches!(Input::pairs(&["a.bin"]), Err(Error::Argument(_))));
        let pairs = Input::pairs(&["a.bin", "first", "b.bin", "second"]).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[1],
            Input::File {
                path: "b.bin".into(),
                name: Some("second".into())
            }
        );
    }

    #[test]
    fn array_without_header_fails_before_io() {
        let err = Config::new("out")
            .file("does/not/exist.bin")
            .header(false)
            .array("RES")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Argument(_)), "{err}");
    }

    #[test]
    fn bad_level_fails_before_io() {
        let err = Config::new("out")
            .file("does/not/exist.bin")
            .compress(Method::Bz2)
            .level(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Argument(_)), "{err}");
    }

    #[test]
    fn collisions_fail_before_reading() {
        // Neither file exists; the collision must be reported first.
        let err = Config::new("out")
            .file("a.png")
            .file("a-png")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }), "{err}");
    }

    #[test]
    fn array_name_may_not_shadow_entry_symbols() {
        let dir = assets(&[("x", b"1")]);
        let err = Config::new(dir.path())
            .base_dir(dir.path())
            .file("x")
            .array("x_data")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }), "{err}");
    }

    #[test]
    fn struct_name_may_not_shadow_other_symbols() {
        let dir = assets(&[("x", b"1")]);
        let config = || Config::new(dir.path()).base_dir(dir.path()).file("x");

        let err = config().array("RES").struct_name("RES").build().unwrap_err();
        match err {
            Error::NameCollision { identifier, .. } => assert_eq!(identifier, "RES"),
            other => panic!("unexpected error: {other}"),
        }
        let err = config().struct_name("x_data").build().unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }), "{err}");
        let job = config().array("RES").struct_name("RES_size").build();
        assert!(job.is_ok(), "case differs from the count symbol");
        let err = config().array("ALL").struct_name("ALL_SIZE").build().unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }), "{err}");
    }

    #[test]
    fn struct_name_is_free_without_a_header() {
        let dir = assets(&[("x", b"1")]);
        let job = Config::new(dir.path())
            .base_dir(dir.path())
            .file("x")
            .header(false)
            .struct_name("x_data")
            .build();
        assert!(job.is_ok());
    }

    #[test]
    fn reserved_names_are_rejected_before_io() {
        for config in [
            Config::new("out").file("does/not/exist.bin").array("int"),
            Config::new("out").file("does/not/exist.bin").struct_name("class"),
            Config::new("out").file("does/not/exist.bin").struct_name("data"),
        ] {
            let err = config.build().unwrap_err();
            assert!(matches!(err, Error::Argument(_)), "{err}");
        }
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::new(dir.path())
            .base_dir(dir.path())
            .file("missing.bin")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }), "{err}");
    }

    #[test]
    fn entries_keep_request_order() {
        let dir = assets(&[
            ("b.bin", b"b"),
            ("a.bin", b"a"),
            ("icon.png", b"1x"),
            ("icon@2.png", b"2x"),
        ]);
        let job = Config::new(dir.path())
            .base_dir(dir.path())
            .file("b.bin")
            .named("a.bin", "alpha")
            .scaled("icon.png")
            .build()
            .unwrap();
        let names: Vec<_> = job.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.bin", "alpha", "icon.png", "icon@2.png"]);
        let ids: Vec<_> = job.entries().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, ["b_bin", "alpha", "icon_png", "icon_2_png"]);
    }

    #[test]
    fn prefix_is_part_of_the_identifier_only() {
        let dir = assets(&[("a.bin", b"a")]);
        let job = Config::new(dir.path())
            .base_dir(dir.path())
            .file("a.bin")
            .prefix("res/")
            .build()
            .unwrap();
        assert_eq!(job.entries()[0].identifier, "res_a_bin");
        assert_eq!(job.entries()[0].name, "a.bin");
    }

    #[test]
    fn byte_count_is_the_compressed_length() {
        let data = vec![7u8; 4096];
        let dir = assets(&[("big.bin", data.as_slice())]);
        let job = Config::new(dir.path())
            .base_dir(dir.path())
            .file("big.bin")
            .compress(Method::Gzip)
            .verify(true)
            .build()
            .unwrap();
        assert_eq!(job.method(), Method::Gzip);
        let entry = &job.entries()[0];
        assert!(entry.byte_count() < data.len());
        assert_eq!(Method::Gzip.decompress(&entry.payload).unwrap(), data);
    }
}
