//! Media probing for the preview surface.
//!
//! [`probe`] reads just enough of a file header to describe it: container,
//! dimensions and, for videos, the running time. Pixel decoding is never
//! attempted.
//!
//! - `.HEIC` files that start with an `ftyp` box are described from their
//!   Exif item (`exif`); `.MOV` files from the `moov` headers (`mp4`)
//! - A `.HEIC` that is not ISO base media is handed to the `image` crate, so
//!   a misnamed PNG or GIF still previews
//! - A `.MOV` without a `moov` box cannot be described and is rejected
//!
//! # Example
//!
//! ```no_run
//! use dupereview::media;
//! use dupereview::scanner::FileEntry;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let entry = FileEntry::new(PathBuf::from("/photos/IMG_0001.HEIC"), 0, SystemTime::now());
//! match media::probe(&entry) {
//!     Ok(info) => println!("{} {:?}", info.container, info.dimensions),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

#[cfg(test)]
pub(crate) mod testdata;

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mp4::{BoxHeader, BoxType, FtypBox, Mp4Reader, ReadBox};
use thiserror::Error;

use crate::scanner::{FileEntry, MediaKind};

/// Errors that can occur while probing a file.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file is not in a format this tool can describe.
    #[error("unsupported media format for {path}: {reason}")]
    Unsupported {
        /// File that was probed
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that was probed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl MediaError {
    fn unsupported(path: &Path, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Description of one previewable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    /// Classification from the scan
    pub kind: MediaKind,
    /// Human-readable container name, e.g. `HEIF (heic)`
    pub container: String,
    /// Pixel dimensions, when the header carries them
    pub dimensions: Option<(u32, u32)>,
    /// Running time for videos
    pub duration: Option<Duration>,
    /// File size in bytes at probe time
    pub size: u64,
}

/// Probe a scanned file.
///
/// # Errors
///
/// Returns [`MediaError::Unsupported`] for files that are neither ISO base
/// media nor (for images) a format the `image` crate recognises, and
/// [`MediaError::Io`] when the file cannot be opened or read.
pub fn probe(entry: &FileEntry) -> Result<MediaInfo, MediaError> {
    let path = entry.path.as_path();
    if !entry.kind.is_reviewable() {
        return Err(MediaError::unsupported(path, "not an image or video"));
    }

    let file = File::open(path).map_err(|e| MediaError::io(path, e))?;
    let len = file.metadata().map_err(|e| MediaError::io(path, e))?.len();
    let mut reader = BufReader::new(file);
    let brand = major_brand(&mut reader, path)?;

    match (entry.kind, brand) {
        (MediaKind::Image, Some(brand)) => probe_heif(&mut reader, path, len, &brand),
        (MediaKind::Image, None) => probe_raster(path, len),
        (MediaKind::Video, Some(brand)) => probe_movie(&mut reader, path, len, &brand),
        (MediaKind::Video, None) => Err(MediaError::unsupported(
            path,
            "not a QuickTime or ISO base media file",
        )),
        (MediaKind::Other, _) => Err(MediaError::unsupported(path, "not an image or video")),
    }
}

/// Major brand of a leading `ftyp` box, trimmed of padding.
///
/// `None` when the file does not start with one.
fn major_brand<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Option<String>, MediaError> {
    let brand = match BoxHeader::read(reader) {
        Ok(header) if header.name == BoxType::FtypBox => FtypBox::read_box(&mut *reader, header.size)
            .ok()
            .map(|ftyp| String::from_utf8_lossy(&ftyp.major_brand.value).trim_end().to_string()),
        Ok(_) => None,
        Err(mp4::Error::IoError(e)) if e.kind() != io::ErrorKind::UnexpectedEof => {
            return Err(MediaError::io(path, e));
        }
        Err(_) => None,
    };
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| MediaError::io(path, e))?;
    Ok(brand)
}

fn probe_heif<R: io::BufRead + Seek>(
    reader: &mut R,
    path: &Path,
    len: u64,
    brand: &str,
) -> Result<MediaInfo, MediaError> {
    let container = match brand {
        "heic" | "heix" | "heim" | "heis" | "mif1" | "msf1" => format!("HEIF ({brand})"),
        "avif" => "AVIF".to_string(),
        "" => "ISO media".to_string(),
        _ => format!("ISO media ({brand})"),
    };

    let dimensions = match exif::Reader::new().read_from_container(reader) {
        Ok(exif) => exif_dimensions(&exif),
        Err(exif::Error::NotFound(_)) => {
            log::debug!("No Exif item in {}", path.display());
            None
        }
        Err(exif::Error::Io(e)) if e.kind() != io::ErrorKind::UnexpectedEof => {
            return Err(MediaError::io(path, e));
        }
        Err(e) => return Err(MediaError::unsupported(path, format!("unreadable HEIF metadata ({e})"))),
    };

    Ok(MediaInfo {
        kind: MediaKind::Image,
        container,
        dimensions,
        duration: None,
        size: len,
    })
}

/// Pixel size as recorded by the camera, else the primary image size.
fn exif_dimensions(exif: &exif::Exif) -> Option<(u32, u32)> {
    let read = |tag| {
        exif.get_field(tag, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|&v| v > 0)
    };
    read(exif::Tag::PixelXDimension)
        .zip(read(exif::Tag::PixelYDimension))
        .or_else(|| read(exif::Tag::ImageWidth).zip(read(exif::Tag::ImageLength)))
}

fn probe_movie<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    len: u64,
    brand: &str,
) -> Result<MediaInfo, MediaError> {
    let movie = Mp4Reader::read_header(reader, len).map_err(|e| match e {
        mp4::Error::IoError(e) if e.kind() != io::ErrorKind::UnexpectedEof => MediaError::io(path, e),
        mp4::Error::BoxNotFound(BoxType::MoovBox) => {
            MediaError::unsupported(path, "no movie header (moov) box")
        }
        e => MediaError::unsupported(path, format!("malformed movie ({e})")),
    })?;

    let container = match brand {
        "qt" | "" => "QuickTime".to_string(),
        _ => format!("MPEG-4 ({brand})"),
    };
    let dimensions = movie.moov.traks.iter().find_map(|trak| {
        let (w, h) = (trak.tkhd.width.value(), trak.tkhd.height.value());
        (w > 0 && h > 0).then_some((u32::from(w), u32::from(h)))
    });

    Ok(MediaInfo {
        kind: MediaKind::Video,
        container,
        dimensions,
        duration: movie_duration(movie.moov.mvhd.timescale, movie.moov.mvhd.duration),
        size: len,
    })
}

/// Running time from `mvhd`, unless the header says it is unknown.
fn movie_duration(timescale: u32, duration: u64) -> Option<Duration> {
    if timescale == 0 || duration == u64::from(u32::MAX) || duration == u64::MAX {
        return None;
    }
    let timescale = u64::from(timescale);
    let nanos = (duration % timescale) * 1_000_000_000 / timescale;
    Some(Duration::new(duration / timescale, nanos as u32))
}

/// Fallback for image files that are not ISO base media.
fn probe_raster(path: &Path, len: u64) -> Result<MediaInfo, MediaError> {
    let reader = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| MediaError::io(path, e))?;

    let Some(format) = reader.format() else {
        return Err(MediaError::unsupported(path, "unrecognised image header"));
    };
    let dimensions = reader
        .into_dimensions()
        .map_err(|e| MediaError::unsupported(path, e.to_string()))?;

    let name = format
        .extensions_str()
        .first()
        .map_or_else(|| format!("{format:?}"), |ext| ext.to_uppercase());

    Ok(MediaInfo {
        kind: MediaKind::Image,
        container: format!("{name} (misnamed)"),
        dimensions: Some(dimensions),
        duration: None,
        size: len,
    })
}
