use crate::FrameInfo;
use crate::error::JpeglsError;
use crate::jpeg_stream_writer::JpegStreamWriter;
use crate::jpegls::coding_parameters::{compute_default, compute_limit_parameter};
use crate::jpegls::color_transform;
use crate::jpegls::scan_encoder::ScanEncoder;
use crate::jpegls::traits::JpeglsSample;
use crate::jpegls::{CodingParameters, ColorTransformation, InterleaveMode, JpeglsPcParameters};
use crate::mapping_table::MappingTableStore;

/// Drives a single encode session: destination_set -> (spiff_header) ->
/// tables_and_miscellaneous -> completed.
pub struct JpeglsEncoder<'a> {
    writer: JpegStreamWriter<'a>,
    started: bool,
    frame_info: Option<FrameInfo>,
    near_lossless: i32,
    interleave_mode: InterleaveMode,
    pc_parameters: Option<JpeglsPcParameters>,
    restart_interval: u32,
    color_transformation: ColorTransformation,
    mapping_table_id: i32,
    mapping_tables: MappingTableStore,
}

impl<'a> JpeglsEncoder<'a> {
    pub fn new(destination: &'a mut [u8]) -> Self {
        Self {
            writer: JpegStreamWriter::new(destination),
            started: false,
            frame_info: None,
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            pc_parameters: None,
            restart_interval: 0,
            color_transformation: ColorTransformation::None,
            mapping_table_id: 0,
            mapping_tables: MappingTableStore::new(),
        }
    }

    /// Writes SOI once, the first time anything is written to this session.
    fn ensure_started(&mut self) -> Result<(), JpeglsError> {
        if !self.started {
            self.writer.write_start_of_image()?;
            self.started = true;
        }
        Ok(())
    }

    pub fn set_frame_info(&mut self, frame_info: FrameInfo) -> Result<(), JpeglsError> {
        if frame_info.width == 0 || frame_info.height == 0 {
            return Err(JpeglsError::InvalidParameterWidth);
        }
        if !(2..=16).contains(&frame_info.bits_per_sample) {
            return Err(JpeglsError::InvalidParameterBitsPerSample);
        }
        if !(1..=255).contains(&frame_info.component_count) {
            return Err(JpeglsError::InvalidParameterComponentCount);
        }
        self.frame_info = Some(frame_info);
        Ok(())
    }

    pub fn set_near_lossless(&mut self, near_lossless: i32) -> Result<(), JpeglsError> {
        self.near_lossless = near_lossless;
        Ok(())
    }

    pub fn set_interleave_mode(
        &mut self,
        interleave_mode: InterleaveMode,
    ) -> Result<(), JpeglsError> {
        self.interleave_mode = interleave_mode;
        Ok(())
    }

    pub fn set_restart_interval(&mut self, restart_interval: u32) -> Result<(), JpeglsError> {
        self.restart_interval = restart_interval;
        Ok(())
    }

    pub fn set_color_transformation(
        &mut self,
        transformation: ColorTransformation,
    ) -> Result<(), JpeglsError> {
        self.color_transformation = transformation;
        Ok(())
    }

    pub fn set_preset_coding_parameters(
        &mut self,
        pc_parameters: JpeglsPcParameters,
    ) -> Result<(), JpeglsError> {
        self.pc_parameters = Some(pc_parameters);
        Ok(())
    }

    pub fn set_mapping_table_id(&mut self, mapping_table_id: i32) -> Result<(), JpeglsError> {
        self.mapping_table_id = mapping_table_id;
        Ok(())
    }

    pub fn write_mapping_table(
        &mut self,
        table_id: u8,
        entry_size: u8,
        table_data: &[u8],
    ) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.mapping_tables
            .add_table_spec(table_id, entry_size, table_data.to_vec())?;
        self.writer
            .write_jpegls_mapping_table_segment(table_id, entry_size, table_data)
    }

    pub fn write_comment(&mut self, comment: &[u8]) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.writer.write_comment_segment(comment)
    }

    pub fn write_application_data(
        &mut self,
        application_data_id: u8,
        data: &[u8],
    ) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.writer
            .write_application_data_segment(application_data_id, data)
    }

    pub fn write_standard_spiff_header(
        &mut self,
        color_space: crate::jpegls::SpiffColorSpace,
    ) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        let frame_info = *self
            .frame_info
            .as_ref()
            .ok_or(JpeglsError::InvalidOperation)?;
        self.writer
            .write_standard_spiff_header(color_space, &frame_info)
    }

    pub fn write_spiff_header(
        &mut self,
        spiff_header: &crate::jpegls::SpiffHeader,
    ) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.writer.write_spiff_header(spiff_header)
    }

    pub fn write_spiff_entry(
        &mut self,
        entry_tag: u32,
        entry_data: &[u8],
    ) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.writer.write_spiff_entry(entry_tag, entry_data)
    }

    pub fn write_spiff_end_of_directory_entry(&mut self) -> Result<(), JpeglsError> {
        self.ensure_started()?;
        self.writer.write_spiff_end_of_directory_entry()
    }

    /// Finishes the session as an "abbreviated format for table
    /// specification" stream (ISO/IEC 14495-1 Annex C): SOI, whatever
    /// mapping tables were already written, EOI — no frame or scan data.
    pub fn create_abbreviated_format(&mut self) -> Result<usize, JpeglsError> {
        self.ensure_started()?;
        self.writer.write_end_of_image()?;
        Ok(self.writer.len())
    }

    /// Resets the session to its just-constructed state so the same
    /// destination buffer can be re-encoded into from scratch. Parameters
    /// set via the `set_*` methods are preserved.
    pub fn rewind(&mut self) -> Result<(), JpeglsError> {
        self.writer.reset();
        self.started = false;
        self.mapping_tables = MappingTableStore::new();
        Ok(())
    }

    fn coding_parameters(&self, frame_info: &FrameInfo) -> CodingParameters {
        CodingParameters {
            near_lossless: self.near_lossless,
            interleave_mode: self.interleave_mode,
            restart_interval: self.restart_interval,
            limit: compute_limit_parameter(
                frame_info.bits_per_sample,
                self.near_lossless,
                frame_info.component_count,
            ),
            quantized_bits_per_sample: frame_info.bits_per_sample,
            transformation: self.color_transformation,
            mapping_table_id: self.mapping_table_id,
            include_pc_parameters_jai: false,
        }
    }

    /// Row pitch, in `T` elements, of the minimum-size buffer for the frame
    /// currently set via `set_frame_info`.
    fn minimum_stride(&self, frame_info: &FrameInfo) -> usize {
        frame_info.width as usize * frame_info.component_count as usize
    }

    /// Encodes an interleaved or single-component source buffer. `T::BITS`
    /// must be wide enough to hold `frame_info().bits_per_sample`. `stride`
    /// is the number of `T` elements between the start of consecutive rows
    /// of `source`; pass 0 to use the minimum row size, or a value greater
    /// than the minimum to encode from a buffer with an unused tail on every
    /// row (ISO/IEC 14495-1 stride handling).
    pub fn encode<T: JpeglsSample>(
        &mut self,
        source: &[T],
        stride: usize,
    ) -> Result<usize, JpeglsError> {
        let frame_info = *self
            .frame_info
            .as_ref()
            .ok_or(JpeglsError::InvalidParameterComponentCount)?;

        if self.interleave_mode == InterleaveMode::None && frame_info.component_count > 1 {
            return Err(JpeglsError::InvalidParameterInterleaveMode);
        }
        self.validate_color_transformation(&frame_info)?;

        let min_stride = self.minimum_stride(&frame_info);
        let stride = if stride == 0 { min_stride } else { stride };
        if stride < min_stride {
            return Err(JpeglsError::InvalidArgumentStride);
        }
        let height = frame_info.height as usize;
        if source.len() < stride * height.saturating_sub(1) + min_stride {
            return Err(JpeglsError::InvalidArgumentSize);
        }

        let max_sample_value = (1 << frame_info.bits_per_sample) - 1;
        let pc = match self.pc_parameters {
            Some(p) => p,
            None => compute_default(max_sample_value, self.near_lossless),
        };
        let coding_parameters = self.coding_parameters(&frame_info);

        self.ensure_started()?;
        if self.color_transformation != ColorTransformation::None {
            self.writer
                .write_hp_color_transform_segment(self.color_transformation)?;
        }
        self.writer.write_start_of_frame_jpegls(&frame_info)?;
        self.writer.write_jpegls_preset_parameters_segment(&pc)?;
        if self.restart_interval != 0 {
            self.writer.write_dri(self.restart_interval)?;
        }

        self.writer.write_start_of_scan_segment(
            frame_info.component_count,
            self.near_lossless,
            self.interleave_mode,
        )?;

        if self.color_transformation != ColorTransformation::None {
            let transformed = self.apply_forward_color_transform(source, &frame_info, stride);
            let transformed_stride = min_stride;
            self.encode_scan_typed(
                &transformed,
                &frame_info,
                pc,
                coding_parameters,
                false,
                transformed_stride,
            )?;
        } else {
            self.encode_scan_typed(source, &frame_info, pc, coding_parameters, false, stride)?;
        }

        self.writer.write_end_of_image()?;
        Ok(self.writer.len())
    }

    /// HP1/HP2/HP3 only apply to 3-component 8/16-bit, sample-interleaved
    /// data: the transform needs all three co-located samples of a pixel
    /// in hand at once, which only `interleave_mode::sample` guarantees.
    fn validate_color_transformation(&self, frame_info: &FrameInfo) -> Result<(), JpeglsError> {
        if self.color_transformation == ColorTransformation::None {
            return Ok(());
        }
        if !color_transform::color_transformation_possible(
            frame_info.component_count,
            frame_info.bits_per_sample,
        ) {
            return Err(JpeglsError::ColorTransformNotSupported);
        }
        if self.interleave_mode != InterleaveMode::Sample {
            return Err(JpeglsError::InvalidParameterInterleaveMode);
        }
        Ok(())
    }

    /// Applies the forward transform row-by-row, honoring `stride` so a
    /// padded tail on each source row isn't mistaken for pixel data; the
    /// returned buffer is tightly packed (row pitch `width * 3`).
    fn apply_forward_color_transform<T: JpeglsSample>(
        &self,
        source: &[T],
        frame_info: &FrameInfo,
        stride: usize,
    ) -> Vec<T> {
        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        let mut transformed = Vec::with_capacity(width * height * 3);
        for row in 0..height {
            let row_start = row * stride;
            for pixel in source[row_start..row_start + width * 3].chunks_exact(3) {
                let (v1, v2, v3) = color_transform::forward::<T>(
                    self.color_transformation,
                    pixel[0].to_i32(),
                    pixel[1].to_i32(),
                    pixel[2].to_i32(),
                );
                transformed.push(v1);
                transformed.push(v2);
                transformed.push(v3);
            }
        }
        transformed
    }

    /// Encodes a component-count > 1 image as one scan per component
    /// (`interleave_mode::none`). `source` remains sample-interleaved; each
    /// component is de-interleaved into its own scan.
    pub fn encode_components<T: JpeglsSample>(
        &mut self,
        source: &[T],
    ) -> Result<usize, JpeglsError> {
        let frame_info = *self
            .frame_info
            .as_ref()
            .ok_or(JpeglsError::InvalidParameterComponentCount)?;
        if self.color_transformation != ColorTransformation::None {
            return Err(JpeglsError::InvalidParameterColorTransformation);
        }

        let max_sample_value = (1 << frame_info.bits_per_sample) - 1;
        let pc = match self.pc_parameters {
            Some(p) => p,
            None => compute_default(max_sample_value, self.near_lossless),
        };
        let coding_parameters = self.coding_parameters(&frame_info);

        self.ensure_started()?;
        self.writer.write_start_of_frame_jpegls(&frame_info)?;
        self.writer.write_jpegls_preset_parameters_segment(&pc)?;
        if self.restart_interval != 0 {
            self.writer.write_dri(self.restart_interval)?;
        }

        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        let total_components = frame_info.component_count as usize;
        let pixel_count = width * height;

        for c in 0..total_components {
            self.writer.write_start_of_scan_segment_planar(
                c as u8 + 1,
                self.near_lossless,
                InterleaveMode::None,
            )?;

            let mut plane_data = vec![T::default(); pixel_count];
            for i in 0..pixel_count {
                plane_data[i] = source[i * total_components + c];
            }
            self.encode_scan_typed(&plane_data, &frame_info, pc, coding_parameters, true, width)?;
        }

        self.writer.write_end_of_image()?;
        Ok(self.writer.len())
    }

    fn encode_scan_typed<T: JpeglsSample>(
        &mut self,
        source: &[T],
        frame_info: &FrameInfo,
        pc: JpeglsPcParameters,
        mut coding_params: CodingParameters,
        is_planar_component: bool,
        stride: usize,
    ) -> Result<usize, JpeglsError> {
        let dest_slice = self.writer.remaining_slice();

        let mut scan_frame_info = *frame_info;
        if is_planar_component {
            scan_frame_info.component_count = 1;
            coding_params.interleave_mode = InterleaveMode::None;
        }

        let mut scan_encoder = ScanEncoder::new(scan_frame_info, pc, coding_params, dest_slice);

        let bytes_written = scan_encoder.encode_scan(source, stride)?;
        drop(scan_encoder);

        self.writer.advance(bytes_written);

        Ok(bytes_written)
    }
}
