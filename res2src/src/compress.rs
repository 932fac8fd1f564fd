//! The compression stage applied to each asset before encoding.
use std::{
    fmt,
    io::{self, Read, Write},
    ops::RangeInclusive,
    str::FromStr,
};

use crate::{Error, Result};

/// The default zstd compression level, matching the packing helper's default.
pub const DEFAULT_ZSTD_LEVEL: u32 = 6;

/// A compression method for embedded payloads.
///
/// The generated code never decompresses anything; the consumer is expected to
/// know which method the resources were built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Bytes are embedded as-is.
    #[default]
    None,
    /// A gzip member (deflate), as written by `gzip -9`.
    Gzip,
    /// A bzip2 stream.
    Bz2,
    /// An xz container around LZMA2.
    Xz,
    /// A zstd frame.
    Zstd,
}

impl Method {
    /// All methods, in the order they are listed in help output.
    pub const ALL: [Self; 5] = [Self::None, Self::Gzip, Self::Bz2, Self::Xz, Self::Zstd];

    /// The name accepted by [`FromStr`] and shown in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bz2 => "bz2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Levels accepted by this method's encoder. `None` accepts only `0`.
    pub const fn levels(self) -> RangeInclusive<u32> {
        match self {
            Self::None => 0..=0,
            Self::Gzip | Self::Xz => 0..=9,
            Self::Bz2 => 1..=9,
            Self::Zstd => 1..=22,
        }
    }

    /// The level used when none is configured.
    pub const fn default_level(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Gzip | Self::Bz2 => 9,
            // Preset 9 needs ~700 MiB to compress; 6 is xz's own default.
            Self::Xz => 6,
            Self::Zstd => DEFAULT_ZSTD_LEVEL,
        }
    }

    /// Compresses `data` in one shot.
    ///
    /// # Errors
    /// [`Error::Compress`] if the encoder fails.
    pub fn compress(self, data: &[u8], level: u32) -> Result<Vec<u8>> {
        let out = match self {
            Self::None => Ok(data.to_vec()),
            Self::Gzip => encode(
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::new(level)),
                data,
                flate2::write::GzEncoder::finish,
            ),
            Self::Bz2 => encode(
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::new(level)),
                data,
                bzip2::write::BzEncoder::finish,
            ),
            Self::Xz => encode(
                xz2::write::XzEncoder::new(Vec::new(), level),
                data,
                xz2::write::XzEncoder::finish,
            ),
            Self::Zstd => zstd::encode_all(data, level as i32),
        };
        out.map_err(|source| Error::Compress {
            method: self,
            source,
        })
    }

    /// Reverses [`Method::compress`].
    ///
    /// # Errors
    /// Returns an I/O error if `data` is not a valid stream for this method.
    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::None => out.extend_from_slice(data),
            Self::Gzip => {
                flate2::read::GzDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Bz2 => {
                bzip2::read::BzDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Xz => {
                xz2::read::XzDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Zstd => out = zstd::decode_all(data)?,
        }
        Ok(out)
    }
}

fn encode<W: Write>(
    mut encoder: W,
    data: &[u8],
    finish: impl FnOnce(W) -> io::Result<Vec<u8>>,
) -> io::Result<Vec<u8>> {
    encoder.write_all(data)?;
    finish(encoder)
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|m| m.name()).collect();
                Error::argument(format!(
                    "unknown compression method '{s}' (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}
