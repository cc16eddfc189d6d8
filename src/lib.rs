//! # rethumb
//!
//! Rebuilds the embedded Exif preview thumbnail inside a JPEG file,
//! replacing a low-quality or stale thumbnail with a freshly rendered,
//! correctly sized, correctly oriented one, while leaving every other byte
//! of the file (full-resolution pixel data, all other metadata) untouched.
//!
//! # The Pipeline
//!
//! ```text
//! 1. Patch     scratch copy, orientation flag → standard
//! 2. Render    decode → scale to the target long edge → sharpen
//! 3. Encode    JPEG under a size-capped quality fallback ladder
//! 4. Splice    replace the IFD1 thumbnail range in the original bytes
//! ```
//!
//! The orientation flag is reset on a scratch copy only: embedded thumbnails
//! are stored in as-is pixel orientation because viewers apply the file's
//! orientation tag to thumbnail and full image alike. The output keeps the
//! source's tag untouched; only the thumbnail render is neutral.
//!
//! Everything works on byte slices; the caller's buffer is never mutated, so
//! a failed rebuild always leaves the original file authoritative.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`exif`] | Container access: JPEG segment scanning, TIFF/IFD walking, orientation patching, thumbnail splicing |
//! | [`imaging`] | Pixel work: decode, proportional scaling, sharpening, JPEG encoding |
//! | [`rebuild`] | The orchestrator composing both, with the quality fallback ladder |
//! | [`output`] | CLI result formatting — pure format functions plus a JSON rendering |

pub mod exif;
pub mod imaging;
pub mod output;
pub mod rebuild;

pub use exif::{ExifError, extract_thumbnail, reset_orientation, update_thumbnail};
pub use rebuild::{
    DEFAULT_SIZE, MAX_EMBEDDED_THUMBNAIL_BYTES, RebuildError, RebuildOptions, rebuild_thumbnail,
};

#[cfg(test)]
pub(crate) mod test_helpers;
