//! JPEG-LS codestream writer: emits markers and segments (SOI, SOF55, LSE,
//! SOS, DRI, SPIFF, COM, APPn, EOI) with byte-accounted bounds checking.

use crate::FrameInfo;
use crate::constants::SPIFF_END_OF_DIRECTORY_ENTRY_TYPE;
use crate::error::JpeglsError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};
use crate::jpegls::{
    InterleaveMode, JpeglsPcParameters, SpiffColorSpace, SpiffCompressionType, SpiffHeader,
    SpiffProfileId, SpiffResolutionUnits,
};

/// Largest table-data chunk that fits in an LSE(2) mapping-table-spec
/// segment alongside its table_id/entry_size bytes and the u16 length field.
const MAX_MAPPING_TABLE_FIRST_CHUNK: usize = 65530;
/// Largest chunk that fits in an LSE(3) continuation segment.
const MAX_MAPPING_TABLE_CONTINUATION_CHUNK: usize = 65531;

pub struct JpegStreamWriter<'a> {
    destination: &'a mut [u8],
    position: usize,
}

impl<'a> JpegStreamWriter<'a> {
    pub fn new(destination: &'a mut [u8]) -> Self {
        Self {
            destination,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.position
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), JpeglsError> {
        if self.position >= self.destination.len() {
            return Err(JpeglsError::DestinationTooSmall);
        }
        self.destination[self.position] = value;
        self.position += 1;
        Ok(())
    }

    pub fn write_bytes(&mut self, values: &[u8]) -> Result<(), JpeglsError> {
        for &b in values {
            self.write_byte(b)?;
        }
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), JpeglsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), JpeglsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_marker(&mut self, marker: JpegMarkerCode) -> Result<(), JpeglsError> {
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(marker as u8)?;
        Ok(())
    }

    pub fn write_start_of_image(&mut self) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::StartOfImage)
    }

    pub fn write_end_of_image(&mut self) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::EndOfImage)
    }

    /// Pads the stream with one 0xFF byte if its current length is odd
    /// (`even_destination_size`), then writes EOI.
    pub fn write_end_of_image_with_even_padding(
        &mut self,
        even_destination_size: bool,
    ) -> Result<(), JpeglsError> {
        if even_destination_size && self.position % 2 != 0 {
            self.write_byte(0xFF)?;
        }
        self.write_end_of_image()
    }

    pub fn write_start_of_frame_jpegls(
        &mut self,
        frame_info: &FrameInfo,
    ) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::StartOfFrameJpegls)?;
        let length = 2 + 6 + (frame_info.component_count as usize * 3);
        self.write_u16(length as u16)?;

        self.write_byte(frame_info.bits_per_sample as u8)?;
        self.write_u16(frame_info.height as u16)?;
        self.write_u16(frame_info.width as u16)?;
        self.write_byte(frame_info.component_count as u8)?;

        for i in 0..frame_info.component_count {
            self.write_byte((i + 1) as u8)?; // Component ID
            self.write_byte(0x11)?; // H=1, V=1
            self.write_byte(0)?; // Tq
        }
        Ok(())
    }

    /// Writes a DRI segment. The restart interval field is 2, 3, or 4 bytes
    /// wide depending on magnitude (spec §6: DRI = 2/3/4 bytes).
    pub fn write_dri(&mut self, restart_interval: u32) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::DefineRestartInterval)?;
        if restart_interval <= 0xFFFF {
            self.write_u16(4)?;
            self.write_u16(restart_interval as u16)?;
        } else if restart_interval <= 0x00FF_FFFF {
            self.write_u16(5)?;
            let bytes = restart_interval.to_be_bytes();
            self.write_bytes(&bytes[1..4])?;
        } else {
            self.write_u16(6)?;
            self.write_u32(restart_interval)?;
        }
        Ok(())
    }

    pub fn write_start_of_scan_segment(
        &mut self,
        component_count: i32,
        near_lossless: i32,
        interleave_mode: InterleaveMode,
    ) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::StartOfScan)?;
        let length = 2 + 1 + (component_count as usize * 2) + 3;
        self.write_u16(length as u16)?;

        self.write_byte(component_count as u8)?;
        for i in 0..component_count {
            self.write_byte((i + 1) as u8)?; // Component selector
            self.write_byte(0)?; // Mapping table selector
        }

        self.write_byte(near_lossless as u8)?;
        self.write_byte(interleave_mode as u8)?;
        self.write_byte(0)?; // point transform, always 0
        Ok(())
    }

    /// SOS for a single named component, used by planar (`interleave_mode::none`,
    /// component_count > 1) multi-scan encoding.
    pub fn write_start_of_scan_segment_planar(
        &mut self,
        component_id: u8,
        near_lossless: i32,
        interleave_mode: InterleaveMode,
    ) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::StartOfScan)?;
        let length = 2 + 1 + 2 + 3;
        self.write_u16(length as u16)?;

        self.write_byte(1)?; // Ns
        self.write_byte(component_id)?;
        self.write_byte(0)?; // Mapping table selector

        self.write_byte(near_lossless as u8)?;
        self.write_byte(interleave_mode as u8)?;
        self.write_byte(0)?;
        Ok(())
    }

    /// LSE(1): preset coding parameters.
    pub fn write_jpegls_preset_parameters_segment(
        &mut self,
        pc: &JpeglsPcParameters,
    ) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::JpeglsPresetParameters)?;
        let length = 2 + 1 + 5 * 2;
        self.write_u16(length as u16)?;
        self.write_byte(1)?; // Type 1

        self.write_u16(pc.maximum_sample_value as u16)?;
        self.write_u16(pc.threshold1 as u16)?;
        self.write_u16(pc.threshold2 as u16)?;
        self.write_u16(pc.threshold3 as u16)?;
        self.write_u16(pc.reset_value as u16)?;
        Ok(())
    }

    /// LSE(4): oversize image dimension, `Wxy` bytes wide (1, 2, 3, or 4),
    /// followed by height and width each encoded in `Wxy` bytes.
    pub fn write_jpegls_oversize_image_dimension_segment(
        &mut self,
        dimension_size_bytes: u8,
        height: u32,
        width: u32,
    ) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::JpeglsPresetParameters)?;
        let length = 2 + 1 + 1 + 2 * dimension_size_bytes as usize;
        self.write_u16(length as u16)?;
        self.write_byte(4)?; // Type 4
        self.write_byte(dimension_size_bytes)?;
        let height_bytes = height.to_be_bytes();
        let width_bytes = width.to_be_bytes();
        self.write_bytes(&height_bytes[4 - dimension_size_bytes as usize..])?;
        self.write_bytes(&width_bytes[4 - dimension_size_bytes as usize..])?;
        Ok(())
    }

    /// LSE(2)/LSE(3): a mapping table spec segment followed by as many
    /// continuation segments as needed, split per the 65530/65531-byte
    /// chunk limits a u16 segment length imposes.
    pub fn write_jpegls_mapping_table_segment(
        &mut self,
        table_id: u8,
        entry_size: u8,
        table_data: &[u8],
    ) -> Result<(), JpeglsError> {
        let (first, rest) = if table_data.len() > MAX_MAPPING_TABLE_FIRST_CHUNK {
            table_data.split_at(MAX_MAPPING_TABLE_FIRST_CHUNK)
        } else {
            (table_data, &table_data[table_data.len()..])
        };

        self.write_marker(JpegMarkerCode::JpeglsPresetParameters)?;
        let length = 2 + 1 + 1 + 1 + first.len();
        self.write_u16(length as u16)?;
        self.write_byte(2)?; // Type 2: mapping table spec
        self.write_byte(table_id)?;
        self.write_byte(entry_size)?;
        self.write_bytes(first)?;

        let mut remaining = rest;
        while !remaining.is_empty() {
            let chunk_len = remaining.len().min(MAX_MAPPING_TABLE_CONTINUATION_CHUNK);
            let (chunk, next) = remaining.split_at(chunk_len);
            self.write_marker(JpegMarkerCode::JpeglsPresetParameters)?;
            let length = 2 + 1 + 1 + chunk.len();
            self.write_u16(length as u16)?;
            self.write_byte(3)?; // Type 3: mapping table continuation
            self.write_byte(table_id)?;
            self.write_bytes(chunk)?;
            remaining = next;
        }
        Ok(())
    }

    /// APP8 HP color transform segment: tag "mrfx" + transformation byte,
    /// the de facto signaling CharLS uses for the HP1/HP2/HP3 transforms.
    pub fn write_hp_color_transform_segment(
        &mut self,
        transformation: crate::jpegls::ColorTransformation,
    ) -> Result<(), JpeglsError> {
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(JpegMarkerCode::ApplicationData8 as u8)?;
        self.write_u16(7)?; // length field (2) + "mrfx" (4) + transformation (1)
        self.write_bytes(b"mrfx")?;
        self.write_byte(transformation as u8)?;
        Ok(())
    }

    pub fn write_comment_segment(&mut self, comment: &[u8]) -> Result<(), JpeglsError> {
        if comment.len() > crate::constants::SEGMENT_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        self.write_marker(JpegMarkerCode::Comment)?;
        self.write_u16((2 + comment.len()) as u16)?;
        self.write_bytes(comment)
    }

    pub fn write_application_data_segment(
        &mut self,
        application_data_id: u8,
        data: &[u8],
    ) -> Result<(), JpeglsError> {
        if !(crate::constants::MINIMUM_APPLICATION_DATA_ID
            ..=crate::constants::MAXIMUM_APPLICATION_DATA_ID)
            .contains(&(application_data_id as i32))
        {
            return Err(JpeglsError::InvalidArgument);
        }
        if data.len() > crate::constants::SEGMENT_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(JpegMarkerCode::ApplicationData0 as u8 + application_data_id)?;
        self.write_u16((2 + data.len()) as u16)?;
        self.write_bytes(data)
    }

    /// APP8 "SPIFF\0" header (ISO/IEC 14495-1 Annex E), 34 bytes total
    /// including marker and length field.
    pub fn write_spiff_header(&mut self, header: &SpiffHeader) -> Result<(), JpeglsError> {
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(JpegMarkerCode::ApplicationData8 as u8)?;
        self.write_u16(32)?; // length field: 2 (itself) + 30-byte payload
        self.write_bytes(b"SPIFF\0")?;
        self.write_byte(crate::constants::SPIFF_MAJOR_REVISION_NUMBER)?;
        self.write_byte(crate::constants::SPIFF_MINOR_REVISION_NUMBER)?;
        self.write_byte(header.profile_id as u8)?;
        self.write_byte(header.component_count as u8)?;
        self.write_u32(header.height)?;
        self.write_u32(header.width)?;
        self.write_byte(header.color_space as u8)?;
        self.write_byte(header.bits_per_sample as u8)?;
        self.write_byte(header.compression_type as u8)?;
        self.write_byte(header.resolution_units as u8)?;
        self.write_u32(header.vertical_resolution)?;
        self.write_u32(header.horizontal_resolution)?;
        Ok(())
    }

    /// Writes a standard SPIFF header for `frame_info` (profile none,
    /// aspect-ratio resolution units, JPEG-LS compression) plus the
    /// mandatory end-of-directory entry, so no further entries are expected.
    pub fn write_standard_spiff_header(
        &mut self,
        color_space: SpiffColorSpace,
        frame_info: &FrameInfo,
    ) -> Result<(), JpeglsError> {
        let header = SpiffHeader {
            profile_id: SpiffProfileId::None,
            component_count: frame_info.component_count,
            height: frame_info.height,
            width: frame_info.width,
            color_space,
            bits_per_sample: frame_info.bits_per_sample,
            compression_type: SpiffCompressionType::JpegLs,
            resolution_units: SpiffResolutionUnits::AspectRatio,
            vertical_resolution: 1,
            horizontal_resolution: 1,
        };
        self.write_spiff_header(&header)?;
        self.write_spiff_end_of_directory_entry()
    }

    /// A SPIFF directory entry: a 4-byte big-endian tag followed by `entry_data`.
    pub fn write_spiff_entry(
        &mut self,
        entry_tag: u32,
        entry_data: &[u8],
    ) -> Result<(), JpeglsError> {
        if entry_data.len() > crate::constants::SPIFF_ENTRY_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(JpegMarkerCode::ApplicationData8 as u8)?;
        self.write_u16((2 + 4 + entry_data.len()) as u16)?;
        self.write_u32(entry_tag)?;
        self.write_bytes(entry_data)
    }

    /// The mandatory terminator of the SPIFF directory: an 8-byte entry
    /// whose data is a fresh SOI marker, so a plain JPEG decoder that
    /// doesn't understand SPIFF directories can resynchronize on it.
    pub fn write_spiff_end_of_directory_entry(&mut self) -> Result<(), JpeglsError> {
        self.write_spiff_entry(
            SPIFF_END_OF_DIRECTORY_ENTRY_TYPE as u32,
            &[JPEG_MARKER_START_BYTE, JpegMarkerCode::StartOfImage as u8],
        )
    }

    pub fn remaining_slice(&mut self) -> &mut [u8] {
        if self.position >= self.destination.len() {
            &mut []
        } else {
            &mut self.destination[self.position..]
        }
    }

    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }

    /// Rewinds the writer to the start of its destination buffer, so a
    /// session can be re-run (`JpeglsEncoder::rewind`).
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding_parameters::compute_default;

    #[test]
    fn write_byte_reports_destination_too_small() {
        let mut dest = [0u8; 1];
        let mut writer = JpegStreamWriter::new(&mut dest);
        writer.write_byte(1).unwrap();
        assert_eq!(writer.write_byte(2), Err(JpeglsError::DestinationTooSmall));
    }

    #[test]
    fn spiff_header_segment_is_34_bytes() {
        let mut dest = [0u8; 64];
        let frame_info = FrameInfo {
            width: 4,
            height: 3,
            bits_per_sample: 8,
            component_count: 1,
        };
        let mut writer = JpegStreamWriter::new(&mut dest);
        writer
            .write_standard_spiff_header(SpiffColorSpace::Grayscale, &frame_info)
            .unwrap();
        // standard header + mandatory EOD entry (8 bytes).
        assert_eq!(writer.len(), crate::constants::SPIFF_HEADER_SIZE_IN_BYTES + 8);
        assert_eq!(&dest[4..10], b"SPIFF\0");
    }

    #[test]
    fn dri_uses_minimal_width_for_small_intervals() {
        let mut dest = [0u8; 16];
        let mut writer = JpegStreamWriter::new(&mut dest);
        writer.write_dri(10).unwrap();
        assert_eq!(writer.len(), 6); // marker(2) + length(2) + u16 value(2)
    }

    #[test]
    fn mapping_table_segment_splits_large_tables() {
        let mut dest = vec![0u8; 200_000];
        let mut writer = JpegStreamWriter::new(&mut dest);
        let data = vec![7u8; 70_000];
        writer
            .write_jpegls_mapping_table_segment(1, 1, &data)
            .unwrap();
        // One spec segment (65530 bytes of data) plus one continuation segment.
        assert!(writer.len() > 70_000);
    }

    #[test]
    fn preset_parameters_round_trip_through_writer() {
        let mut dest = [0u8; 32];
        let mut writer = JpegStreamWriter::new(&mut dest);
        let pc = compute_default(255, 0);
        writer.write_jpegls_preset_parameters_segment(&pc).unwrap();
        assert_eq!(writer.len(), 2 + 2 + 1 + 5 * 2);
    }
}
