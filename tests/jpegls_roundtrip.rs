use jpegls::coding_parameters::compute_default;
use jpegls::jpeg_marker_code::JPEG_MARKER_START_BYTE;
use jpegls::jpegls::{ColorTransformation, InterleaveMode, JpeglsDecoder, JpeglsEncoder};
use jpegls::FrameInfo;

fn round_trip_lossless(frame_info: FrameInfo, source: &[u8], interleave_mode: InterleaveMode) {
    let mut dest = vec![0u8; source.len() * 2 + 256];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_interleave_mode(interleave_mode).unwrap();
        encoder.encode(source, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    assert_eq!(decoder.frame_info(), frame_info);

    let mut decoded = vec![0u8; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);
}

#[test]
fn round_trips_a_small_grayscale_gradient() {
    let frame_info = FrameInfo {
        width: 16,
        height: 16,
        bits_per_sample: 8,
        component_count: 1,
    };
    let source: Vec<u8> = (0..256).map(|i| i as u8).collect();
    round_trip_lossless(frame_info, &source, InterleaveMode::None);
}

#[test]
fn round_trips_a_noisy_single_pixel_row() {
    let frame_info = FrameInfo {
        width: 1,
        height: 5,
        bits_per_sample: 8,
        component_count: 1,
    };
    let source: Vec<u8> = vec![0, 255, 128, 1, 254];
    round_trip_lossless(frame_info, &source, InterleaveMode::None);
}

#[test]
fn round_trips_sample_interleaved_rgb() {
    let frame_info = FrameInfo {
        width: 4,
        height: 4,
        bits_per_sample: 8,
        component_count: 3,
    };
    // 4x4 RGB, sample-interleaved: R,G,B,R,G,B,...
    let mut source = Vec::with_capacity(4 * 4 * 3);
    for y in 0..4u32 {
        for x in 0..4u32 {
            source.push(((x + y) * 10) as u8);
            source.push((x * 20) as u8);
            source.push((y * 20) as u8);
        }
    }
    round_trip_lossless(frame_info, &source, InterleaveMode::Sample);
}

#[test]
fn round_trips_planar_components() {
    let frame_info = FrameInfo {
        width: 5,
        height: 5,
        bits_per_sample: 8,
        component_count: 3,
    };
    let mut source = Vec::with_capacity(5 * 5 * 3);
    for y in 0..5u32 {
        for x in 0..5u32 {
            source.push((x * 7) as u8);
            source.push((y * 7) as u8);
            source.push(((x + y) * 3) as u8);
        }
    }

    let mut dest = vec![0u8; source.len() * 2 + 256];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_interleave_mode(InterleaveMode::None).unwrap();
        encoder.encode_components(&source).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    let mut decoded = vec![0u8; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);
}

#[test]
fn round_trips_16_bit_samples() {
    let frame_info = FrameInfo {
        width: 6,
        height: 6,
        bits_per_sample: 12,
        component_count: 1,
    };
    let source: Vec<u16> = (0..36).map(|i| (i * 97) % 4096).collect();

    let mut dest = vec![0u8; 4096];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.encode(&source, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    let mut decoded = vec![0u16; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);
}

/// Invariant 2: every sample of the near-lossless round trip is within
/// NEAR of the source.
#[test]
fn near_lossless_round_trip_stays_within_near() {
    let frame_info = FrameInfo {
        width: 10,
        height: 10,
        bits_per_sample: 8,
        component_count: 1,
    };
    let source: Vec<u8> = (0..100)
        .map(|i| ((i * 37 + (i * i) % 13) % 256) as u8)
        .collect();
    let near = 4;

    let mut dest = vec![0u8; 1024];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_near_lossless(near).unwrap();
        encoder.encode(&source, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    assert_eq!(decoder.near_lossless(), near);
    let mut decoded = vec![0u8; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();

    for (a, b) in source.iter().zip(decoded.iter()) {
        assert!((*a as i32 - *b as i32).abs() <= near, "{} vs {}", a, b);
    }
}

/// Scenario D: a 7-line image with `restart_interval = 2` gets three RSTm
/// markers; the decoder tolerates them, and tampering with one is rejected.
#[test]
fn restart_markers_round_trip_and_detect_corruption() {
    let frame_info = FrameInfo {
        width: 3,
        height: 7,
        bits_per_sample: 8,
        component_count: 1,
    };
    let source: Vec<u8> = vec![
        10, 20, 30, 15, 25, 35, 1, 2, 3, 200, 201, 202, 7, 7, 7, 9, 8, 7, 100, 150, 200,
    ];

    let mut dest = vec![0u8; 1024];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_restart_interval(2).unwrap();
        encoder.encode(&source, 0).unwrap()
    };

    let marker_count = dest[..encoded_len]
        .windows(2)
        .filter(|w| w[0] == JPEG_MARKER_START_BYTE && (0xD0..=0xD7).contains(&w[1]))
        .count();
    assert_eq!(marker_count, 3);

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    let mut decoded = vec![0u8; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);
}

/// Scenario E: an all-255-sample image (which is maximally likely to emit
/// raw 0xFF entropy bytes) round-trips and never produces a 0xFF followed
/// by a byte with the MSB set inside the scan (that would be mistaken for
/// a marker).
#[test]
fn stuff_bit_rule_holds_for_extremal_samples() {
    let frame_info = FrameInfo {
        width: 3,
        height: 1,
        bits_per_sample: 16,
        component_count: 1,
    };
    let source: [u16; 3] = [255, 255, 255];

    let mut dest = [0u8; 128];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.encode(&source, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    let mut decoded = [0u16; 3];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);

    // Locate the scan's entropy-coded bytes (after the final SOS segment)
    // and confirm no 0xFF byte is immediately followed by a byte >= 0x80,
    // except the EOI marker itself that terminates the scan.
    let scan_start = dest[..encoded_len]
        .windows(2)
        .position(|w| w[0] == JPEG_MARKER_START_BYTE && w[1] == 0xDA)
        .map(|sos_pos| sos_pos + 2 + 8) // marker(2) + length field value(8, self-inclusive)
        .unwrap();
    let scan_bytes = &dest[scan_start..encoded_len - 2]; // exclude EOI
    for w in scan_bytes.windows(2) {
        if w[0] == JPEG_MARKER_START_BYTE {
            assert!(w[1] < 0x80, "unescaped marker-like byte in scan data");
        }
    }
}

/// Scenario A: a palettized image (ISO/IEC 14495-1 Annex H.4 style), where
/// the scan carries small index values and an LSE(2) mapping table carries
/// the RGB palette those indices select. The codec round-trips the index
/// plane; the palette itself is opaque payload it stores and returns as-is.
#[test]
fn round_trips_a_palettized_scan_with_mapping_table() {
    let frame_info = FrameInfo {
        width: 2,
        height: 6,
        bits_per_sample: 2,
        component_count: 1,
    };
    let palette: [u8; 12] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF,
    ];
    let indices: [u8; 12] = [0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3];

    let mut dest = vec![0u8; 256];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_mapping_table_id(5).unwrap();
        encoder.write_mapping_table(5, 3, &palette).unwrap();
        encoder.encode(&indices, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();

    let frame_info = decoder.frame_info();
    assert_eq!(frame_info.width, 2);
    assert_eq!(frame_info.height, 6);
    assert_eq!(frame_info.bits_per_sample, 2);
    assert_eq!(frame_info.component_count, 1);

    let table = decoder.mapping_table(5).expect("mapping table 5 present");
    assert_eq!(table, &palette);

    let mut decoded = [0u8; 12];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, indices);
}

/// Invariant 9/10: a stride larger than the minimum row width pads every
/// row of the caller's buffer, and the codec leaves that padding untouched
/// on both the encode source and the decode destination.
#[test]
fn stride_larger_than_minimum_leaves_row_padding_untouched() {
    let frame_info = FrameInfo {
        width: 3,
        height: 4,
        bits_per_sample: 8,
        component_count: 1,
    };
    let minimum_stride = 3;
    let stride = 5; // 2 bytes of padding per row

    let mut source = vec![0xAAu8; stride * frame_info.height as usize];
    let pixels: [u8; 12] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
    for row in 0..frame_info.height as usize {
        source[row * stride..row * stride + minimum_stride]
            .copy_from_slice(&pixels[row * minimum_stride..row * minimum_stride + minimum_stride]);
    }

    let mut dest = vec![0u8; 1024];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.encode(&source, stride).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    assert_eq!(decoder.destination_size(stride), source.len());

    let sentinel = 0x7Fu8;
    let mut decoded = vec![sentinel; stride * frame_info.height as usize];
    decoder.decode(&mut decoded, stride).unwrap();

    for row in 0..frame_info.height as usize {
        assert_eq!(
            &decoded[row * stride..row * stride + minimum_stride],
            &pixels[row * minimum_stride..row * minimum_stride + minimum_stride]
        );
        // The tail beyond the real row width is left as the caller set it.
        assert_eq!(&decoded[row * stride + minimum_stride..(row + 1) * stride], &[sentinel; 2]);
    }
}

#[test]
fn rejects_invalid_frame_dimensions() {
    let mut dest = [0u8; 16];
    let mut encoder = JpeglsEncoder::new(&mut dest);
    let result = encoder.set_frame_info(FrameInfo {
        width: 0,
        height: 4,
        bits_per_sample: 8,
        component_count: 1,
    });
    assert_eq!(result, Err(jpegls::JpeglsError::InvalidParameterWidth));
}

#[test]
fn default_pc_parameters_match_reference_constants() {
    // Scenario B.
    let pc8 = compute_default(255, 0);
    assert_eq!((pc8.threshold1, pc8.threshold2, pc8.threshold3), (3, 7, 21));

    // Scenario C.
    let pc12 = compute_default(4095, 0);
    assert_eq!(
        (pc12.threshold1, pc12.threshold2, pc12.threshold3),
        (17, 45, 145)
    );
}

#[test]
fn color_transformed_round_trip_is_lossless() {
    let frame_info = FrameInfo {
        width: 4,
        height: 4,
        bits_per_sample: 8,
        component_count: 3,
    };
    let mut source = Vec::with_capacity(4 * 4 * 3);
    for i in 0..16u32 {
        source.push((i * 5 % 256) as u8);
        source.push((i * 11 % 256) as u8);
        source.push((i * 17 % 256) as u8);
    }

    let mut dest = vec![0u8; 1024];
    let encoded_len = {
        let mut encoder = JpeglsEncoder::new(&mut dest);
        encoder.set_frame_info(frame_info).unwrap();
        encoder.set_interleave_mode(InterleaveMode::Sample).unwrap();
        encoder
            .set_color_transformation(ColorTransformation::Hp1)
            .unwrap();
        encoder.encode(&source, 0).unwrap()
    };

    let mut decoder = JpeglsDecoder::new(&dest[..encoded_len]);
    decoder.read_header().unwrap();
    assert_eq!(decoder.color_transformation(), ColorTransformation::Hp1);
    let mut decoded = vec![0u8; source.len()];
    decoder.decode(&mut decoded, 0).unwrap();
    assert_eq!(decoded, source);
}

#[test]
fn color_transformation_requires_sample_interleave() {
    let mut dest = [0u8; 64];
    let mut encoder = JpeglsEncoder::new(&mut dest);
    encoder
        .set_frame_info(FrameInfo {
            width: 2,
            height: 2,
            bits_per_sample: 8,
            component_count: 3,
        })
        .unwrap();
    encoder.set_interleave_mode(InterleaveMode::Line).unwrap();
    encoder
        .set_color_transformation(ColorTransformation::Hp2)
        .unwrap();
    let source = [0u8; 12];
    assert_eq!(
        encoder.encode(&source, 0),
        Err(jpegls::JpeglsError::InvalidParameterInterleaveMode)
    );
}
