/*!
# jpegls

A pure Rust implementation of the JPEG-LS (ISO/IEC 14495-1 / ITU-T T.87)
lossless and near-lossless image codec, ported from CharLS.

## Features

- Lossless and near-lossless compression, 2-16 bit depth per sample.
- 1-255 components, with `None` / `Line` / `Sample` interleave modes.
- HP1/HP2/HP3 lossless color transforms for 3-component 8/16-bit images.
- Full marker-segment stream framing: SPIFF headers, LSE preset parameters
  and mapping tables, restart markers, oversize image dimensions.

## Safety

This crate contains no `unsafe` code.
*/
#![forbid(unsafe_code)]

pub mod coding_parameters;
pub mod constants;
pub mod error;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod jpeg_stream_writer;
pub mod jpegls;
pub mod mapping_table;

pub use error::JpeglsError;
pub use jpegls::{JpeglsDecoder, JpeglsEncoder};

/// Basic information about a JPEG-LS image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Width of the frame in pixels (1..=2^32-1).
    pub width: u32,
    /// Height of the frame in pixels.
    pub height: u32,
    /// Bits per sample (2-16).
    pub bits_per_sample: i32,
    /// Number of components (1-255).
    pub component_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_info_default_is_zeroed() {
        let fi = FrameInfo::default();
        assert_eq!(fi.width, 0);
        assert_eq!(fi.height, 0);
        assert_eq!(fi.bits_per_sample, 0);
        assert_eq!(fi.component_count, 0);
    }
}
