use crate::FrameInfo;
use crate::error::JpeglsError;
use crate::jpeg_stream_reader::JpegStreamReader;
use crate::jpegls::color_transform;
use crate::jpegls::scan_decoder::ScanDecoder;
use crate::jpegls::traits::JpeglsSample;
use crate::jpegls::validate_spiff_header::validate_spiff_header;
use crate::jpegls::{
    CodingParameters, ColorTransformation, InterleaveMode, JpeglsPcParameters, SpiffHeader,
};

/// Drives a single decode session: source_set -> (spiff_header_read) ->
/// header_read -> completed.
pub struct JpeglsDecoder<'a> {
    reader: JpegStreamReader<'a>,
    header_read: bool,
}

impl<'a> JpeglsDecoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            reader: JpegStreamReader::new(source),
            header_read: false,
        }
    }

    /// Reads SOI plus a leading APP8 SPIFF header, if present, without
    /// consuming the rest of the header section. Returns `true` if a SPIFF
    /// header was found.
    pub fn read_spiff_header(&mut self) -> Result<bool, JpeglsError> {
        self.reader.read_spiff_header()
    }

    pub fn spiff_header(&self) -> Option<SpiffHeader> {
        self.reader.spiff_header()
    }

    /// Reads the remaining header section (SOF55, LSE segments) up to the
    /// first SOS, validating a SPIFF header against the frame info if one
    /// was present.
    pub fn read_header(&mut self) -> Result<(), JpeglsError> {
        self.reader.read_header()?;
        self.header_read = true;
        if let Some(spiff) = self.reader.spiff_header() {
            validate_spiff_header(&spiff, &self.reader.frame_info())?;
        }
        Ok(())
    }

    pub fn frame_info(&self) -> FrameInfo {
        self.reader.frame_info()
    }

    pub fn near_lossless(&self) -> i32 {
        self.reader.parameters().near_lossless
    }

    pub fn interleave_mode(&self) -> InterleaveMode {
        self.reader.parameters().interleave_mode
    }

    pub fn color_transformation(&self) -> ColorTransformation {
        self.reader.parameters().transformation
    }

    pub fn preset_coding_parameters(&self) -> JpeglsPcParameters {
        self.reader.preset_coding_parameters()
    }

    pub fn mapping_table(&self, table_id: u8) -> Option<&[u8]> {
        self.reader.mapping_table(table_id)
    }

    /// Row pitch, in samples, of the minimum-size destination buffer.
    fn minimum_stride(&self, frame_info: &FrameInfo) -> usize {
        frame_info.width as usize * frame_info.component_count as usize
    }

    /// Size in samples of the decoded image for a destination buffer with
    /// the given row pitch (`stride` elements between rows); pass 0 for the
    /// minimum, tightly-packed size.
    pub fn destination_size(&self, stride: usize) -> usize {
        let frame_info = self.frame_info();
        let min_stride = self.minimum_stride(&frame_info);
        let stride = if stride == 0 { min_stride } else { stride };
        let height = frame_info.height as usize;
        stride * height - (stride - min_stride)
    }

    /// Decodes a single scan (`interleave_mode::line`/`sample`, or a
    /// single-component `none` image) into `destination`. `stride` is the
    /// number of samples between the start of consecutive rows; pass 0 to
    /// use the minimum (`width * component_count`), or a larger value to
    /// decode into a buffer with an unused tail on every row, which is left
    /// untouched.
    pub fn decode<T: JpeglsSample>(
        &mut self,
        destination: &mut [T],
        stride: usize,
    ) -> Result<(), JpeglsError> {
        if !self.header_read {
            self.read_header()?;
        }
        let frame_info = self.frame_info();
        let min_stride = self.minimum_stride(&frame_info);
        let stride = if stride == 0 { min_stride } else { stride };
        if stride < min_stride {
            return Err(JpeglsError::InvalidArgumentStride);
        }
        let height = frame_info.height as usize;
        if destination.len() < stride * height.saturating_sub(1) + min_stride {
            return Err(JpeglsError::InvalidArgumentSize);
        }

        self.reader.read_start_of_scan_segment_jpegls()?;
        let parameters = self.reader.parameters();

        if parameters.interleave_mode == InterleaveMode::None && frame_info.component_count > 1 {
            return self.decode_planar_components(destination, frame_info, parameters, stride);
        }

        let mut scan_decoder = ScanDecoder::new(
            frame_info,
            self.reader.preset_coding_parameters(),
            parameters,
            self.reader.remaining_data(),
        )?;
        let bytes_consumed = scan_decoder.decode_scan(destination, stride)?;
        drop(scan_decoder);
        self.reader.advance(bytes_consumed);

        if parameters.transformation != ColorTransformation::None {
            Self::apply_inverse_color_transform(parameters.transformation, destination, &frame_info, stride);
        }
        Ok(())
    }

    /// Applies the inverse transform row-by-row, honoring `stride` so a
    /// padded tail on each row isn't treated as pixel data.
    fn apply_inverse_color_transform<T: JpeglsSample>(
        transformation: ColorTransformation,
        destination: &mut [T],
        frame_info: &FrameInfo,
        stride: usize,
    ) {
        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        for row in 0..height {
            let row_start = row * stride;
            for pixel in destination[row_start..row_start + width * 3].chunks_exact_mut(3) {
                let (v1, v2, v3) = color_transform::inverse::<T>(
                    transformation,
                    pixel[0].to_i32(),
                    pixel[1].to_i32(),
                    pixel[2].to_i32(),
                );
                pixel[0] = v1;
                pixel[1] = v2;
                pixel[2] = v3;
            }
        }
    }

    /// Decodes a `component_count > 1`, `interleave_mode::none` image that
    /// was written as one scan per component, re-interleaving samples back
    /// into `destination`. The first component's SOS segment has already
    /// been read by `decode` (that's how the planar-vs-interleaved choice
    /// gets made), so its parameters are passed in rather than re-read.
    /// `stride` is `destination`'s row pitch in samples.
    fn decode_planar_components<T: JpeglsSample>(
        &mut self,
        destination: &mut [T],
        frame_info: FrameInfo,
        first_component_parameters: CodingParameters,
        stride: usize,
    ) -> Result<(), JpeglsError> {
        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        let total_components = frame_info.component_count as usize;
        let pixel_count = width * height;

        let mut plane_frame_info = frame_info;
        plane_frame_info.component_count = 1;

        for c in 0..total_components {
            let parameters = if c == 0 {
                first_component_parameters
            } else {
                self.reader.read_start_of_scan_segment_jpegls()?;
                self.reader.parameters()
            };

            let mut plane_data = vec![T::default(); pixel_count];
            let mut scan_decoder = ScanDecoder::new(
                plane_frame_info,
                self.reader.preset_coding_parameters(),
                parameters,
                self.reader.remaining_data(),
            )?;
            let bytes_consumed = scan_decoder.decode_scan(&mut plane_data, width)?;
            drop(scan_decoder);
            self.reader.advance(bytes_consumed);

            for row in 0..height {
                for x in 0..width {
                    destination[row * stride + x * total_components + c] =
                        plane_data[row * width + x];
                }
            }
        }
        Ok(())
    }
}
