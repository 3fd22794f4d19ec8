use crate::error::JpeglsError;
use crate::jpegls::{
    SpiffColorSpace, SpiffCompressionType, SpiffHeader, SpiffProfileId, SpiffResolutionUnits,
};

fn is_valid_color_space(color_space: SpiffColorSpace, component_count: i32) -> bool {
    match color_space {
        SpiffColorSpace::None => true,
        SpiffColorSpace::BiLevelBlack | SpiffColorSpace::BiLevelWhite => false,
        SpiffColorSpace::Grayscale => component_count == 1,
        SpiffColorSpace::YCbCrItuBt709Video
        | SpiffColorSpace::YCbCrItuBt6011Rgb
        | SpiffColorSpace::YCbCrItuBt6011Video
        | SpiffColorSpace::Rgb
        | SpiffColorSpace::Cmy
        | SpiffColorSpace::PhotoYcc
        | SpiffColorSpace::CieLab => component_count == 3,
        SpiffColorSpace::Cmyk | SpiffColorSpace::Ycck => component_count == 4,
    }
}

fn is_valid_resolution_units(resolution_units: SpiffResolutionUnits) -> bool {
    match resolution_units {
        SpiffResolutionUnits::AspectRatio
        | SpiffResolutionUnits::DotsPerCentimeter
        | SpiffResolutionUnits::DotsPerInch => true,
    }
}

/// Cross-checks a parsed SPIFF header against the frame info read from the
/// JPEG-LS SOF segment (ISO/IEC 14495-1 Annex E.1.1): the two must agree on
/// every field they both carry.
pub fn validate_spiff_header(
    spiff_header: &SpiffHeader,
    frame_info: &crate::FrameInfo,
) -> Result<(), JpeglsError> {
    if spiff_header.compression_type != SpiffCompressionType::JpegLs {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.profile_id != SpiffProfileId::None {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if !is_valid_resolution_units(spiff_header.resolution_units) {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.horizontal_resolution == 0 || spiff_header.vertical_resolution == 0 {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.component_count != frame_info.component_count {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if !is_valid_color_space(spiff_header.color_space, spiff_header.component_count) {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.bits_per_sample != frame_info.bits_per_sample {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.height != frame_info.height {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    if spiff_header.width != frame_info.width {
        return Err(JpeglsError::InvalidSpiffHeader);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpegls::{SpiffColorSpace, SpiffCompressionType, SpiffProfileId, SpiffResolutionUnits};
    use crate::FrameInfo;

    fn matching_header(frame_info: &FrameInfo) -> SpiffHeader {
        SpiffHeader {
            profile_id: SpiffProfileId::None,
            component_count: frame_info.component_count,
            height: frame_info.height,
            width: frame_info.width,
            color_space: SpiffColorSpace::Grayscale,
            bits_per_sample: frame_info.bits_per_sample,
            compression_type: SpiffCompressionType::JpegLs,
            resolution_units: SpiffResolutionUnits::AspectRatio,
            vertical_resolution: 1,
            horizontal_resolution: 1,
        }
    }

    #[test]
    fn matching_header_is_valid() {
        let frame_info = FrameInfo {
            width: 4,
            height: 3,
            bits_per_sample: 8,
            component_count: 1,
        };
        assert!(validate_spiff_header(&matching_header(&frame_info), &frame_info).is_ok());
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let frame_info = FrameInfo {
            width: 4,
            height: 3,
            bits_per_sample: 8,
            component_count: 1,
        };
        let mut header = matching_header(&frame_info);
        header.width = 5;
        assert!(validate_spiff_header(&header, &frame_info).is_err());
    }

    #[test]
    fn non_jpegls_compression_type_is_rejected() {
        let frame_info = FrameInfo {
            width: 4,
            height: 3,
            bits_per_sample: 8,
            component_count: 1,
        };
        let mut header = matching_header(&frame_info);
        header.compression_type = SpiffCompressionType::Jpeg;
        assert!(validate_spiff_header(&header, &frame_info).is_err());
    }
}
