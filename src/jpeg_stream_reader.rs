//! JPEG-LS codestream reader: parses markers and segments (SOI, SOF55, LSE,
//! SOS, DRI, DNL, SPIFF) from a byte slice, driving `FrameInfo` and
//! `CodingParameters` from what it finds.

use crate::FrameInfo;
use crate::error::JpeglsError;
use crate::coding_parameters::{CodingParameters, JpeglsPcParameters};
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};
use crate::jpegls::{InterleaveMode, SpiffHeader};
use crate::mapping_table::MappingTableStore;
use std::convert::{TryFrom, TryInto};

/// Internal state of the stream reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegStreamReaderState {
    BeforeStartOfImage,
    HeaderSection,
    ScanSection,
    EndOfImage,
}

/// A reader for JPEG-LS codestreams that manages marker parsing and segment state.
pub struct JpegStreamReader<'a> {
    source: &'a [u8],
    position: usize,
    state: JpegStreamReaderState,
    frame_info: FrameInfo,
    parameters: CodingParameters,
    preset_coding_parameters: JpeglsPcParameters,
    spiff_header: Option<SpiffHeader>,
    spiff_header_looked_for: bool,
    mapping_tables: MappingTableStore,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            state: JpegStreamReaderState::BeforeStartOfImage,
            frame_info: FrameInfo::default(),
            parameters: CodingParameters::default(),
            preset_coding_parameters: JpeglsPcParameters::default(),
            spiff_header: None,
            spiff_header_looked_for: false,
            mapping_tables: MappingTableStore::new(),
        }
    }

    pub fn frame_info(&self) -> FrameInfo {
        self.frame_info
    }

    pub fn parameters(&self) -> CodingParameters {
        self.parameters
    }

    pub fn preset_coding_parameters(&self) -> JpeglsPcParameters {
        self.preset_coding_parameters
    }

    pub fn spiff_header(&self) -> Option<SpiffHeader> {
        self.spiff_header
    }

    pub fn mapping_table(&self, table_id: u8) -> Option<&[u8]> {
        self.mapping_tables.get(table_id).map(|t| t.data.as_slice())
    }

    pub fn remaining_data(&self) -> &[u8] {
        &self.source[self.position..]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Reads SOI and an optional leading APP8 SPIFF header, stopping
    /// without consuming anything else. Mirrors the `source_set ->
    /// (spiff_header_read | spiff_header_not_found)` session transition.
    pub fn read_spiff_header(&mut self) -> Result<bool, JpeglsError> {
        if self.state == JpegStreamReaderState::BeforeStartOfImage {
            self.read_start_of_image()?;
        }
        self.spiff_header_looked_for = true;

        match self.peek_marker()? {
            JpegMarkerCode::ApplicationData8 => {
                self.position += 2;
                let spiff = self.read_spiff_header_segment()?;
                self.spiff_header = spiff;
                Ok(spiff.is_some())
            }
            _ => Ok(false),
        }
    }

    /// Reads the remaining header section: SOF55, LSE segments, SPIFF (if
    /// `read_spiff_header` wasn't already called), up to (not including)
    /// the first SOS.
    pub fn read_header(&mut self) -> Result<(), JpeglsError> {
        if self.state == JpegStreamReaderState::BeforeStartOfImage {
            self.read_start_of_image()?;
        }

        loop {
            let marker = self.read_marker()?;
            match marker {
                JpegMarkerCode::StartOfFrameJpegls => {
                    self.read_start_of_frame_segment()?;
                }
                JpegMarkerCode::JpeglsPresetParameters => {
                    self.read_jpegls_preset_parameters_segment()?;
                }
                JpegMarkerCode::StartOfScan => {
                    self.position -= 2;
                    self.state = JpegStreamReaderState::HeaderSection;
                    break;
                }
                JpegMarkerCode::ApplicationData8 => {
                    self.read_application_data8_segment()?;
                }
                JpegMarkerCode::DefineRestartInterval => {
                    self.read_dri_segment()?;
                }
                JpegMarkerCode::DefineNumberOfLines => {
                    self.read_dnl_segment()?;
                }
                _ => {
                    self.skip_segment()?;
                }
            }
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, JpeglsError> {
        if self.position >= self.source.len() {
            return Err(JpeglsError::NeedMoreData);
        }
        let b = self.source[self.position];
        self.position += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, JpeglsError> {
        let b1 = self.read_u8()? as u16;
        let b2 = self.read_u8()? as u16;
        Ok((b1 << 8) | b2)
    }

    pub fn read_u32(&mut self) -> Result<u32, JpeglsError> {
        let b1 = self.read_u8()? as u32;
        let b2 = self.read_u8()? as u32;
        let b3 = self.read_u8()? as u32;
        let b4 = self.read_u8()? as u32;
        Ok((b1 << 24) | (b2 << 16) | (b3 << 8) | b4)
    }

    /// Reads `width` bytes (1..=4) as a big-endian unsigned value.
    fn read_uint_of_width(&mut self, width: u8) -> Result<u32, JpeglsError> {
        let mut value: u32 = 0;
        for _ in 0..width {
            value = (value << 8) | self.read_u8()? as u32;
        }
        Ok(value)
    }

    pub fn peek_marker(&self) -> Result<JpegMarkerCode, JpeglsError> {
        if self.position + 1 >= self.source.len() {
            return Err(JpeglsError::NeedMoreData);
        }
        if self.source[self.position] != JPEG_MARKER_START_BYTE {
            return Err(JpeglsError::JpegMarkerStartByteNotFound);
        }
        JpegMarkerCode::try_from(self.source[self.position + 1])
    }

    pub fn read_marker(&mut self) -> Result<JpegMarkerCode, JpeglsError> {
        if self.read_u8()? != JPEG_MARKER_START_BYTE {
            return Err(JpeglsError::JpegMarkerStartByteNotFound);
        }
        let marker_byte = self.read_u8()?;
        JpegMarkerCode::try_from(marker_byte)
    }

    fn read_start_of_image(&mut self) -> Result<(), JpeglsError> {
        if self.read_marker()? != JpegMarkerCode::StartOfImage {
            return Err(JpeglsError::StartOfImageMarkerNotFound);
        }
        self.state = JpegStreamReaderState::HeaderSection;
        Ok(())
    }

    fn read_start_of_frame_segment(&mut self) -> Result<(), JpeglsError> {
        let _length = self.read_u16()?;
        self.frame_info.bits_per_sample = self.read_u8()? as i32;
        self.frame_info.height = self.read_u16()? as u32;
        self.frame_info.width = self.read_u16()? as u32;
        self.frame_info.component_count = self.read_u8()? as i32;

        for _ in 0..self.frame_info.component_count {
            let _id = self.read_u8()?;
            let _sampling = self.read_u8()?;
            let _tq = self.read_u8()?;
        }
        Ok(())
    }

    fn read_jpegls_preset_parameters_segment(&mut self) -> Result<(), JpeglsError> {
        let length = self.read_u16()? as usize;
        let param_type = self.read_u8()?;
        match param_type {
            1 => {
                self.preset_coding_parameters.maximum_sample_value = self.read_u16()? as i32;
                self.preset_coding_parameters.threshold1 = self.read_u16()? as i32;
                self.preset_coding_parameters.threshold2 = self.read_u16()? as i32;
                self.preset_coding_parameters.threshold3 = self.read_u16()? as i32;
                self.preset_coding_parameters.reset_value = self.read_u16()? as i32;
            }
            2 => {
                let table_id = self.read_u8()?;
                let entry_size = self.read_u8()?;
                let data_len = length.checked_sub(5).ok_or(JpeglsError::InvalidMarkerSegmentSize)?;
                let mut data = vec![0u8; data_len];
                for b in &mut data {
                    *b = self.read_u8()?;
                }
                self.mapping_tables.add_table_spec(table_id, entry_size, data)?;
            }
            3 => {
                let table_id = self.read_u8()?;
                let data_len = length.checked_sub(4).ok_or(JpeglsError::InvalidMarkerSegmentSize)?;
                let mut data = vec![0u8; data_len];
                for b in &mut data {
                    *b = self.read_u8()?;
                }
                self.mapping_tables.add_continuation(table_id, &data)?;
            }
            4 => {
                let dimension_size_bytes = self.read_u8()?;
                self.frame_info.height = self.read_uint_of_width(dimension_size_bytes)?;
                self.frame_info.width = self.read_uint_of_width(dimension_size_bytes)?;
            }
            _ => return Err(JpeglsError::InvalidJpeglsPresetParameterType),
        }
        Ok(())
    }

    pub fn read_start_of_scan_segment_jpegls(&mut self) -> Result<(), JpeglsError> {
        if self.read_marker()? != JpegMarkerCode::StartOfScan {
            return Err(JpeglsError::UnexpectedStartOfScanMarker);
        }
        let length = self.read_u16()?;
        let mut consumed = 2i32; // length field itself

        let components_in_scan = self.read_u8()? as i32;
        consumed += 1;
        for _ in 0..components_in_scan {
            let _id = self.read_u8()?;
            let _mapping = self.read_u8()?;
            consumed += 2;
        }
        self.parameters.near_lossless = self.read_u8()? as i32;
        self.parameters.interleave_mode = InterleaveMode::try_from(self.read_u8()?)?;
        let point_transform = self.read_u8()?;
        consumed += 3;

        if point_transform != 0 {
            return Err(JpeglsError::ParameterValueNotSupported);
        }

        if (length as i32) > consumed {
            let skip = (length as i32) - consumed;
            self.advance(skip as usize);
        }

        self.state = JpegStreamReaderState::ScanSection;
        Ok(())
    }

    /// APP8 carries either a SPIFF header (>=30 bytes of payload) or the HP
    /// color transform segment (exactly 5 bytes: "mrfx" + transformation id).
    fn read_application_data8_segment(&mut self) -> Result<(), JpeglsError> {
        let length = self.read_u16()? as usize;
        let data_len = length
            .checked_sub(2)
            .ok_or(JpeglsError::InvalidMarkerSegmentSize)?;

        if data_len == 5 {
            let mut tag = [0u8; 4];
            for b in &mut tag {
                *b = self.read_u8()?;
            }
            let transformation_byte = self.read_u8()?;
            if &tag == b"mrfx" {
                self.parameters.transformation = transformation_byte.try_into()?;
            }
            return Ok(());
        }

        if !self.spiff_header_looked_for && data_len >= 30 {
            self.position -= 2;
            let spiff = self.read_spiff_header_segment()?;
            if spiff.is_some() {
                self.spiff_header = spiff;
            }
            self.spiff_header_looked_for = true;
            return Ok(());
        }

        self.spiff_header_looked_for = true;
        self.position += data_len;
        Ok(())
    }

    fn read_spiff_header_segment(&mut self) -> Result<Option<SpiffHeader>, JpeglsError> {
        let length = self.read_u16()? as usize;
        if length < 32 {
            self.position += length - 2;
            return Ok(None);
        }

        let mut identifier = [0u8; 6];
        for b in &mut identifier {
            *b = self.read_u8()?;
        }

        if identifier != [b'S', b'P', b'I', b'F', b'F', 0] {
            self.position += length - 8;
            return Ok(None);
        }

        let _version_major = self.read_u8()?;
        let _version_minor = self.read_u8()?;
        let profile_id = self.read_u8()?;
        let component_count = self.read_u8()?;
        let height = self.read_u32()?;
        let width = self.read_u32()?;
        let color_space = self.read_u8()?;
        let bits_per_sample = self.read_u8()?;
        let compression_type = self.read_u8()?;
        let resolution_units = self.read_u8()?;
        let vertical_resolution = self.read_u32()?;
        let horizontal_resolution = self.read_u32()?;

        Ok(Some(SpiffHeader {
            profile_id: profile_id.try_into()?,
            component_count: component_count as i32,
            height,
            width,
            color_space: color_space.try_into()?,
            bits_per_sample: bits_per_sample as i32,
            compression_type: compression_type.try_into()?,
            resolution_units: resolution_units.try_into()?,
            vertical_resolution,
            horizontal_resolution,
        }))
    }

    pub fn skip_segment(&mut self) -> Result<(), JpeglsError> {
        let length = self.read_u16()?;
        if length < 2 {
            return Err(JpeglsError::InvalidMarkerSegmentSize);
        }
        self.position += (length as usize) - 2;
        Ok(())
    }

    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }

    /// DRI: 2, 3, or 4 byte restart interval depending on the segment's
    /// recorded length (spec §6).
    fn read_dri_segment(&mut self) -> Result<(), JpeglsError> {
        let length = self.read_u16()? as usize;
        let width = length.checked_sub(2).ok_or(JpeglsError::InvalidMarkerSegmentSize)?;
        if !(2..=4).contains(&width) {
            return Err(JpeglsError::InvalidMarkerSegmentSize);
        }
        self.parameters.restart_interval = self.read_uint_of_width(width as u8)?;
        Ok(())
    }

    /// DNL: 2, 3, or 4 byte number-of-lines field.
    fn read_dnl_segment(&mut self) -> Result<(), JpeglsError> {
        let length = self.read_u16()? as usize;
        let width = length.checked_sub(2).ok_or(JpeglsError::InvalidMarkerSegmentSize)?;
        if !(2..=4).contains(&width) {
            return Err(JpeglsError::InvalidMarkerSegmentSize);
        }
        let number_of_lines = self.read_uint_of_width(width as u8)?;
        if number_of_lines > 0 {
            self.frame_info.height = number_of_lines;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg_stream_writer::JpegStreamWriter;

    #[test]
    fn reads_back_a_written_frame_header() {
        let mut dest = [0u8; 64];
        let frame_info = FrameInfo {
            width: 8,
            height: 6,
            bits_per_sample: 8,
            component_count: 1,
        };
        let pc = crate::coding_parameters::compute_default(255, 0);
        {
            let mut writer = JpegStreamWriter::new(&mut dest);
            writer.write_start_of_image().unwrap();
            writer.write_start_of_frame_jpegls(&frame_info).unwrap();
            writer.write_jpegls_preset_parameters_segment(&pc).unwrap();
            writer
                .write_start_of_scan_segment(1, 0, InterleaveMode::None)
                .unwrap();
        }

        let mut reader = JpegStreamReader::new(&dest);
        reader.read_header().unwrap();
        assert_eq!(reader.frame_info(), frame_info);
        assert_eq!(reader.preset_coding_parameters(), pc);
    }

    #[test]
    fn reads_back_variable_length_restart_interval() {
        let mut dest = [0u8; 64];
        {
            let mut writer = JpegStreamWriter::new(&mut dest);
            writer.write_start_of_image().unwrap();
            writer
                .write_start_of_frame_jpegls(&FrameInfo {
                    width: 4,
                    height: 4,
                    bits_per_sample: 8,
                    component_count: 1,
                })
                .unwrap();
            writer.write_dri(300_000).unwrap();
            writer
                .write_start_of_scan_segment(1, 0, InterleaveMode::None)
                .unwrap();
        }

        let mut reader = JpegStreamReader::new(&dest);
        reader.read_header().unwrap();
        assert_eq!(reader.parameters().restart_interval, 300_000);
    }

    #[test]
    fn rejects_nonzero_point_transform() {
        let mut dest = [0u8; 16];
        {
            let mut writer = JpegStreamWriter::new(&mut dest);
            writer.write_marker(JpegMarkerCode::StartOfScan).unwrap();
            writer.write_u16(8).unwrap();
            writer.write_byte(1).unwrap();
            writer.write_byte(1).unwrap();
            writer.write_byte(0).unwrap();
            writer.write_byte(0).unwrap();
            writer.write_byte(0).unwrap();
            writer.write_byte(1).unwrap(); // nonzero point transform
        }
        let mut reader = JpegStreamReader::new(&dest);
        assert_eq!(
            reader.read_start_of_scan_segment_jpegls(),
            Err(JpeglsError::ParameterValueNotSupported)
        );
    }
}
