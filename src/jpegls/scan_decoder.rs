use crate::FrameInfo;
use crate::error::JpeglsError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, restart_marker_code};
use crate::jpegls::regular_mode_context::RegularModeContext;
use crate::jpegls::run_mode_context::RunModeContext;
use crate::jpegls::traits::JpeglsSample;
use crate::jpegls::{CodingParameters, InterleaveMode, JpeglsPcParameters};

pub struct ScanDecoder<'a> {
    frame_info: FrameInfo,
    pc_parameters: JpeglsPcParameters,
    coding_parameters: CodingParameters,
    source: &'a [u8],
    position: usize,
    valid_bits: i32,
    read_cache: u32,
    marker_found: bool,

    // regular_mode_contexts[component_index][context_id]
    regular_mode_contexts: Vec<Vec<RegularModeContext>>,
    // run_mode_contexts[component_index][0..1]
    run_mode_contexts: Vec<Vec<RunModeContext>>,
    // run_index[component_index]
    run_index: Vec<usize>,

    t1: i32,
    t2: i32,
    t3: i32,
    reset_threshold: i32,
}

impl<'a> ScanDecoder<'a> {
    pub fn new(
        frame_info: FrameInfo,
        pc_parameters: JpeglsPcParameters,
        coding_parameters: CodingParameters,
        source: &'a [u8],
    ) -> Result<Self, JpeglsError> {
        let range = pc_parameters.maximum_sample_value + 1;
        let num_components = if coding_parameters.interleave_mode == InterleaveMode::None {
            1
        } else {
            frame_info.component_count as usize
        };

        let mut regular_mode_contexts = Vec::with_capacity(num_components);
        let mut run_mode_contexts = Vec::with_capacity(num_components);
        let mut run_index = Vec::with_capacity(num_components);

        for _ in 0..num_components {
            regular_mode_contexts.push(vec![RegularModeContext::new(range); 365]);
            run_mode_contexts.push(vec![
                RunModeContext::new(0, range),
                RunModeContext::new(1, range),
            ]);
            run_index.push(0);
        }

        let mut decoder = Self {
            frame_info,
            pc_parameters,
            coding_parameters,
            source,
            position: 0,
            valid_bits: 0,
            read_cache: 0,
            marker_found: false,
            regular_mode_contexts,
            run_mode_contexts,
            run_index,
            t1: pc_parameters.threshold1,
            t2: pc_parameters.threshold2,
            t3: pc_parameters.threshold3,
            reset_threshold: pc_parameters.reset_value,
        };
        decoder.fill_read_cache();
        Ok(decoder)
    }

    /// `stride` is the number of `T` elements between the start of
    /// consecutive rows of `destination`; pass 0 to use the minimum
    /// (`width * components`), or a larger value to decode into a buffer
    /// with an unused tail on every row, which is left untouched.
    pub fn decode_scan<T: JpeglsSample>(
        &mut self,
        destination: &mut [T],
        stride: usize,
    ) -> Result<usize, JpeglsError> {
        self.decode_lines(destination, stride)?;
        Ok(self.position)
    }

    fn decode_lines<T: JpeglsSample>(
        &mut self,
        destination: &mut [T],
        stride: usize,
    ) -> Result<(), JpeglsError> {
        let width = self.frame_info.width as usize;
        let height = self.frame_info.height as usize;
        let interleave_mode = self.coding_parameters.interleave_mode;

        let components = if interleave_mode == InterleaveMode::None {
            1
        } else {
            self.frame_info.component_count as usize
        };

        let pixel_stride = width * components;
        let row_stride = if stride == 0 { pixel_stride } else { stride };
        let buffer_width = (width + 1) * components;

        let init_value = T::from_i32(1 << (self.frame_info.bits_per_sample - 1));
        let mut line_buffer: Vec<T> = vec![init_value; buffer_width * 2];
        let mut dest_idx = 0;

        let restart_interval = self.coding_parameters.restart_interval as usize;
        let mut restart_marker_index: u8 = 0;

        for line in 0..height {
            let (prev_line_slice, curr_line_slice) = line_buffer.split_at_mut(buffer_width);
            let (prev, curr) = if (line & 1) == 1 {
                (curr_line_slice, prev_line_slice)
            } else {
                (prev_line_slice, curr_line_slice)
            };

            for c in 0..components {
                curr[c] = prev[components + c];
            }

            self.decode_sample_line(prev, curr, width, components, line == 0)?;

            destination[dest_idx..dest_idx + pixel_stride]
                .copy_from_slice(&curr[components..buffer_width]);
            dest_idx += row_stride;

            if restart_interval > 0 && (line + 1) % restart_interval == 0 && line + 1 != height {
                self.read_restart_marker(restart_marker_index)?;
                restart_marker_index = (restart_marker_index + 1) % 8;
                self.reset_contexts();
                for v in curr.iter_mut() {
                    *v = init_value;
                }
            }
        }
        Ok(())
    }

    /// Discards the cached zero pad bits written by the encoder's
    /// byte-alignment, reads the 2-byte RSTm marker directly, and verifies
    /// it matches the expected cycling restart count.
    fn read_restart_marker(&mut self, expected_m: u8) -> Result<(), JpeglsError> {
        self.read_cache = 0;
        self.valid_bits = 0;
        self.marker_found = false;
        self.fill_read_cache();

        if self.source.get(self.position) != Some(&JPEG_MARKER_START_BYTE) {
            return Err(JpeglsError::RestartMarkerNotFound);
        }
        let code = *self
            .source
            .get(self.position + 1)
            .ok_or(JpeglsError::RestartMarkerNotFound)?;
        if code != restart_marker_code(expected_m) {
            return Err(JpeglsError::RestartMarkerNotFound);
        }
        self.position += 2;
        self.marker_found = false;
        self.fill_read_cache();
        Ok(())
    }

    /// Mirrors `ScanEncoder::reset_contexts`: re-initializes all
    /// per-component context state after a restart marker.
    fn reset_contexts(&mut self) {
        let range = self.pc_parameters.maximum_sample_value + 1;
        for comp in 0..self.regular_mode_contexts.len() {
            self.regular_mode_contexts[comp] = vec![RegularModeContext::new(range); 365];
            self.run_mode_contexts[comp] =
                vec![RunModeContext::new(0, range), RunModeContext::new(1, range)];
            self.run_index[comp] = 0;
        }
    }

    fn decode_sample_line<T: JpeglsSample>(
        &mut self,
        prev_line: &[T],
        curr_line: &mut [T],
        width: usize,
        components: usize,
        is_first_line: bool,
    ) -> Result<(), JpeglsError> {
        let mut pixel_idx = 0;
        let mut current_buf_idx = components;

        let mut rb = vec![0i32; components];
        let mut rd = vec![0i32; components];

        for c in 0..components {
            rb[c] = prev_line[c].to_i32();
            rd[c] = prev_line[components + c].to_i32();
        }

        while pixel_idx < width {
            let mut all_qs_zero = true;
            let mut component_qs = vec![0; components];
            let mut component_pred = vec![0; components];

            let is_last_pixel = pixel_idx == width - 1;

            for c in 0..components {
                let idx = current_buf_idx + c;
                let ra = curr_line[idx - components].to_i32();
                let rc = rb[c];
                rb[c] = rd[c];

                if is_last_pixel {
                    rd[c] = rb[c];
                } else {
                    rd[c] = prev_line[idx + components].to_i32();
                }

                let d1 = rd[c] - rb[c];
                let d2 = rb[c] - rc;
                let d3 = rc - ra;

                let q1 = self.quantize_gradient(d1);
                let q2 = self.quantize_gradient(d2);
                let q3 = self.quantize_gradient(d3);

                let qs = self.compute_context_id(q1, q2, q3);
                component_qs[c] = qs;
                if qs != 0 {
                    all_qs_zero = false;
                }

                component_pred[c] = self.compute_predicted_value(ra, rb[c], rc);
            }

            // The encoder always uses regular mode for pixel 0 of line 0,
            // even when all gradients quantize to zero.
            let use_regular_mode = !all_qs_zero || (is_first_line && pixel_idx == 0);

            if use_regular_mode {
                for c in 0..components {
                    let idx = current_buf_idx + c;
                    let value =
                        self.decode_regular::<T>(component_qs[c], component_pred[c], c)?;
                    curr_line[idx] = T::from_i32(value);
                }
                pixel_idx += 1;
                current_buf_idx += components;
            } else {
                let start_pixel_idx = pixel_idx;
                let decoded_len = self.decode_run_mode_interleaved(
                    start_pixel_idx,
                    prev_line,
                    curr_line,
                    width,
                    components,
                )?;

                pixel_idx += decoded_len;
                current_buf_idx += decoded_len * components;

                if pixel_idx < width {
                    let is_last = pixel_idx == width - 1;
                    for c in 0..components {
                        let comp_offset = components + c;
                        rb[c] = prev_line[(pixel_idx - 1) * components + comp_offset].to_i32();
                        rd[c] = if is_last {
                            rb[c]
                        } else {
                            prev_line[pixel_idx * components + comp_offset].to_i32()
                        };
                    }
                }
            }
        }
        Ok(())
    }

    fn decode_regular<T: JpeglsSample>(
        &mut self,
        qs: i32,
        predicted: i32,
        component_index: usize,
    ) -> Result<i32, JpeglsError> {
        let sign = Self::bit_wise_sign(qs);
        let ctx_index = crate::jpegls::traits::apply_sign_for_index(qs, sign);

        let limit = self.coding_parameters.limit;
        let near_lossless = self.coding_parameters.near_lossless;
        let maximum_sample_value = self.pc_parameters.maximum_sample_value;

        let k: i32;
        let c_val: i32;
        let correction: i32;
        {
            let context = &mut self.regular_mode_contexts[component_index][ctx_index];
            k = context.compute_golomb_coding_parameter(31)?;
            c_val = context.c();
            correction = context.get_error_correction(k);
        }

        let mapped_error = self.decode_mapped_value(k, limit);
        let error_val = correction ^ self.unmap_error_value(mapped_error);

        let reset_threshold = self.reset_threshold;
        let context = &mut self.regular_mode_contexts[component_index][ctx_index];
        context.update_variables_and_bias(error_val, near_lossless, reset_threshold)?;

        let predicted_value = T::correct_prediction(
            predicted + Self::apply_sign(c_val, sign),
            maximum_sample_value,
        );
        let reconstructed_error = Self::apply_sign(error_val, sign);
        Ok(T::compute_reconstructed_sample_near_lossless(
            predicted_value,
            reconstructed_error,
            maximum_sample_value,
            near_lossless,
        ))
    }

    fn unmap_error_value(&self, mapped_value: i32) -> i32 {
        if (mapped_value & 1) == 0 {
            mapped_value >> 1
        } else {
            -((mapped_value + 1) >> 1)
        }
    }

    /// Inverse of `ScanEncoder::encode_mapped_value`: reads the unary prefix
    /// of zero bits (counting up to the escape threshold `limit - qbpp - 1`),
    /// then either `k` (normal path) or `qbpp` (escape path) low bits.
    fn decode_mapped_value(&mut self, k: i32, limit: i32) -> i32 {
        let qbpp = self.coding_parameters.quantized_bits_per_sample;
        let escape_threshold = limit - qbpp - 1;

        let mut high_bits = 0;
        while high_bits < escape_threshold && self.peek_bit() == 0 {
            self.skip_bits(1);
            high_bits += 1;
        }

        if high_bits < escape_threshold {
            self.skip_bits(1); // terminating one bit
            if k == 0 {
                high_bits
            } else {
                let k_clamped = k.min(31);
                (high_bits << k_clamped) | self.read_value(k_clamped)
            }
        } else {
            self.skip_bits(1); // terminating one bit
            let qbpp_clamped = qbpp.min(31);
            self.read_value(qbpp_clamped) + 1
        }
    }

    fn quantize_gradient(&self, di: i32) -> i32 {
        if di <= -self.t3 {
            return -4;
        }
        if di <= -self.t2 {
            return -3;
        }
        if di <= -self.t1 {
            return -2;
        }
        if di < -self.coding_parameters.near_lossless {
            return -1;
        }
        if di <= self.coding_parameters.near_lossless {
            return 0;
        }
        if di < self.t1 {
            return 1;
        }
        if di < self.t2 {
            return 2;
        }
        if di < self.t3 {
            return 3;
        }
        4
    }

    fn compute_context_id(&self, q1: i32, q2: i32, q3: i32) -> i32 {
        (q1 * 9 + q2) * 9 + q3
    }

    fn compute_predicted_value(&self, ra: i32, rb: i32, rc: i32) -> i32 {
        let sign = Self::bit_wise_sign(rb - ra);
        let predicted = if (sign ^ (rc - ra)) < 0 {
            rb
        } else if (sign ^ (rb - rc)) < 0 {
            ra
        } else {
            ra + rb - rc
        };

        let max_val = (1 << self.frame_info.bits_per_sample) - 1;
        predicted.clamp(0, max_val)
    }

    fn bit_wise_sign(val: i32) -> i32 {
        crate::jpegls::traits::bit_wise_sign(val)
    }

    fn apply_sign(val: i32, sign: i32) -> i32 {
        crate::jpegls::traits::apply_sign(val, sign)
    }

    fn decode_run_mode_interleaved<T: JpeglsSample>(
        &mut self,
        start_pixel_idx: usize,
        prev_line: &[T],
        curr_line: &mut [T],
        width: usize,
        components: usize,
    ) -> Result<usize, JpeglsError> {
        let base_offset = components;
        let count_type_remain = width - start_pixel_idx;

        let mut ra = vec![T::default(); components];
        for c in 0..components {
            let ra_idx = if start_pixel_idx > 0 {
                base_offset + (start_pixel_idx - 1) * components + c
            } else {
                c
            };
            ra[c] = curr_line[ra_idx];
        }

        let run_length = self.decode_run_pixels(count_type_remain, 0);
        for i in 0..run_length {
            for c in 0..components {
                curr_line[base_offset + (start_pixel_idx + i) * components + c] = ra[c];
            }
        }

        if run_length == count_type_remain {
            return Ok(run_length);
        }

        // The breaking component is always component 0 (see the matching
        // comment in `ScanEncoder::encode_run_mode_interleaved`): any
        // components before it can never differ from Ra by more than
        // `near_lossless`, so they don't need their own code.
        let interruption_pixel_idx = start_pixel_idx + run_length;
        let c = 0;
        let up_val = prev_line[base_offset + interruption_pixel_idx * components + c].to_i32();
        let interruption_val =
            self.decode_run_interruption_pixel::<T>(ra[c].to_i32(), up_val, c)?;
        curr_line[base_offset + interruption_pixel_idx * components + c] =
            T::from_i32(interruption_val);

        self.decrement_run_index(0);

        for next_c in (c + 1)..components {
            let idx = base_offset + interruption_pixel_idx * components + next_c;

            let r_a = curr_line[idx - components].to_i32();
            let r_up = prev_line[idx].to_i32();
            let r_up_left = prev_line[idx - components].to_i32();
            let r_up_right = if interruption_pixel_idx == width - 1 {
                r_up
            } else {
                prev_line[idx + components].to_i32()
            };

            let d1 = r_up_right - r_up;
            let d2 = r_up - r_up_left;
            let d3 = r_up_left - r_a;

            let q1 = self.quantize_gradient(d1);
            let q2 = self.quantize_gradient(d2);
            let q3 = self.quantize_gradient(d3);

            let qs = self.compute_context_id(q1, q2, q3);
            let predicted = self.compute_predicted_value(r_a, r_up, r_up_left);

            let value = self.decode_regular::<T>(qs, predicted, next_c)?;
            curr_line[idx] = T::from_i32(value);
        }

        Ok(run_length + 1)
    }

    /// Inverse of `ScanEncoder::encode_run_pixels`. Each full run-length unit
    /// is confirmed by a `1` bit (with the run index incrementing after
    /// each); once adding another unit would pass `count_type_remain`, a
    /// final bit disambiguates "run reaches end of line" (`1`, nothing
    /// further to read) from "run is interrupted" (`0`, followed by the
    /// remainder in `J[run_index]` bits).
    fn decode_run_pixels(&mut self, count_type_remain: usize, comp: usize) -> usize {
        let mut accumulated = 0;
        loop {
            if accumulated == count_type_remain {
                return accumulated;
            }
            let unit = 1usize << crate::constants::J[self.run_index[comp]];
            let at_tail = accumulated + unit > count_type_remain;

            if self.read_bit() == 1 {
                if at_tail {
                    return count_type_remain;
                }
                accumulated += unit;
                self.increment_run_index(comp);
            } else {
                let remainder_bits = crate::constants::J[self.run_index[comp]];
                let remainder = self.read_value(remainder_bits) as usize;
                return accumulated + remainder;
            }
        }
    }

    fn decode_run_interruption_pixel<T: JpeglsSample>(
        &mut self,
        ra: i32,
        rb: i32,
        comp: usize,
    ) -> Result<i32, JpeglsError> {
        let near_lossless = self.coding_parameters.near_lossless;
        let maximum_sample_value = self.pc_parameters.maximum_sample_value;

        if (ra - rb).abs() <= near_lossless {
            let error_value = self.decode_run_interruption_error(1, comp);
            Ok(T::compute_reconstructed_sample_near_lossless(
                ra,
                error_value,
                maximum_sample_value,
                near_lossless,
            ))
        } else {
            let sign = Self::bit_wise_sign(rb - ra);
            let error_value = self.decode_run_interruption_error(0, comp);
            Ok(T::compute_reconstructed_sample_near_lossless(
                rb,
                error_value * sign,
                maximum_sample_value,
                near_lossless,
            ))
        }
    }

    fn decode_run_interruption_error(&mut self, context_index: usize, comp: usize) -> i32 {
        let k = self.run_mode_contexts[comp][context_index].compute_golomb_coding_parameter();
        let run_interruption_type =
            self.run_mode_contexts[comp][context_index].run_interruption_type();

        let limit = self.coding_parameters.limit - crate::constants::J[self.run_index[comp]] - 1;
        let mapped_error = self.decode_mapped_value(k, limit);

        let error_value = self.run_mode_contexts[comp][context_index]
            .decode_error_value(mapped_error + run_interruption_type, k);

        let reset_threshold = self.reset_threshold;
        self.run_mode_contexts[comp][context_index].update_variables(
            error_value,
            mapped_error,
            reset_threshold,
        );

        error_value
    }

    fn increment_run_index(&mut self, comp: usize) {
        if self.run_index[comp] < 31 {
            self.run_index[comp] += 1;
        }
    }

    fn decrement_run_index(&mut self, comp: usize) {
        if self.run_index[comp] > 0 {
            self.run_index[comp] -= 1;
        }
    }

    // --- Bit reading, undoing the encoder's 0xFF-stuffing as it goes. ---

    fn fill_read_cache(&mut self) {
        while self.valid_bits <= 24 && !self.marker_found {
            let byte = match self.source.get(self.position) {
                Some(&b) => {
                    self.position += 1;
                    b
                }
                None => {
                    self.marker_found = true;
                    break;
                }
            };

            if byte == JPEG_MARKER_START_BYTE {
                match self.source.get(self.position) {
                    Some(0x00) => {
                        self.position += 1;
                    }
                    _ => {
                        self.marker_found = true;
                        self.position -= 1;
                        break;
                    }
                }
            }

            self.read_cache |= (byte as u32) << (24 - self.valid_bits);
            self.valid_bits += 8;
        }
    }

    fn peek_bit(&mut self) -> u32 {
        if self.valid_bits < 1 {
            self.fill_read_cache();
        }
        if self.valid_bits < 1 {
            return 0;
        }
        self.read_cache >> 31
    }

    fn read_bit(&mut self) -> u32 {
        let bit = self.peek_bit();
        self.skip_bits(1);
        bit
    }

    fn skip_bits(&mut self, count: i32) {
        self.read_cache <<= count;
        self.valid_bits -= count;
    }

    /// Reads `count` (0..=24) bits as an unsigned value, most significant
    /// bit first.
    fn read_value(&mut self, count: i32) -> i32 {
        if count == 0 {
            return 0;
        }
        if self.valid_bits < count {
            self.fill_read_cache();
        }
        if self.valid_bits < count {
            // Source exhausted; treat missing bits as zero, matching a
            // decoder that has already consumed the whole entropy segment.
            let available = self.valid_bits.max(0);
            let value = if available > 0 {
                self.read_cache >> (32 - available)
            } else {
                0
            };
            self.read_cache = 0;
            self.valid_bits = 0;
            return (value << (count - available)) as i32;
        }
        let value = self.read_cache >> (32 - count);
        self.read_cache <<= count;
        self.valid_bits -= count;
        value as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding_parameters::compute_default;
    use crate::jpegls::scan_encoder::ScanEncoder;
    use crate::jpegls::ColorTransformation;

    fn lossless_8bit_params() -> (JpeglsPcParameters, CodingParameters) {
        let pc = compute_default(255, 0);
        let coding = CodingParameters {
            near_lossless: 0,
            restart_interval: 0,
            interleave_mode: InterleaveMode::None,
            transformation: ColorTransformation::None,
            limit: crate::coding_parameters::compute_limit_parameter(8, 0, 1),
            quantized_bits_per_sample: 8,
            mapping_table_id: 0,
            include_pc_parameters_jai: false,
        };
        (pc, coding)
    }

    #[test]
    fn unmap_error_value_is_inverse_of_map_error_value() {
        let (pc, coding) = lossless_8bit_params();
        let decoder = ScanDecoder::new(
            FrameInfo { width: 1, height: 1, bits_per_sample: 8, component_count: 1 },
            pc,
            coding,
            &[],
        )
        .unwrap();
        assert_eq!(decoder.unmap_error_value(0), 0);
        assert_eq!(decoder.unmap_error_value(2), 1);
        assert_eq!(decoder.unmap_error_value(1), -1);
        assert_eq!(decoder.unmap_error_value(4), 2);
        assert_eq!(decoder.unmap_error_value(3), -2);
    }

    #[test]
    fn round_trips_a_small_grayscale_scan() {
        let frame = FrameInfo {
            width: 4,
            height: 3,
            bits_per_sample: 8,
            component_count: 1,
        };
        let (pc, coding) = lossless_8bit_params();
        let source: [u8; 12] = [10, 20, 30, 40, 40, 40, 40, 40, 5, 250, 5, 250];

        let mut encoded = [0u8; 256];
        let encoded_len = {
            let mut encoder = ScanEncoder::new(frame, pc, coding, &mut encoded);
            encoder.encode_scan(&source, 4).unwrap()
        };

        let mut decoder =
            ScanDecoder::new(frame, pc, coding, &encoded[..encoded_len]).unwrap();
        let mut decoded = [0u8; 12];
        decoder.decode_scan(&mut decoded, 4).unwrap();

        assert_eq!(decoded, source);
    }

    #[test]
    fn round_trips_with_restart_markers() {
        let frame = FrameInfo {
            width: 3,
            height: 7,
            bits_per_sample: 8,
            component_count: 1,
        };
        let (pc, mut coding) = lossless_8bit_params();
        coding.restart_interval = 2;
        let source: [u8; 21] = [
            10, 20, 30, 15, 25, 35, 1, 2, 3, 200, 201, 202, 7, 7, 7, 9, 8, 7, 100, 150, 200,
        ];

        let mut encoded = [0u8; 512];
        let encoded_len = {
            let mut encoder = ScanEncoder::new(frame, pc, coding, &mut encoded);
            encoder.encode_scan(&source, 3).unwrap()
        };

        // Three restart markers should have been emitted: after lines 2, 4, 6.
        let marker_count = encoded[..encoded_len]
            .windows(2)
            .filter(|w| w[0] == JPEG_MARKER_START_BYTE && (0xD0..=0xD7).contains(&w[1]))
            .count();
        assert_eq!(marker_count, 3);

        let mut decoder = ScanDecoder::new(frame, pc, coding, &encoded[..encoded_len]).unwrap();
        let mut decoded = [0u8; 21];
        decoder.decode_scan(&mut decoded, 3).unwrap();
        assert_eq!(decoded, source);
    }

    #[test]
    fn missing_restart_marker_is_rejected() {
        let frame = FrameInfo {
            width: 3,
            height: 7,
            bits_per_sample: 8,
            component_count: 1,
        };
        let (pc, mut coding) = lossless_8bit_params();
        coding.restart_interval = 2;
        let source: [u8; 21] = [
            10, 20, 30, 15, 25, 35, 1, 2, 3, 200, 201, 202, 7, 7, 7, 9, 8, 7, 100, 150, 200,
        ];

        let mut encoded = [0u8; 512];
        let encoded_len = {
            let mut encoder = ScanEncoder::new(frame, pc, coding, &mut encoded);
            encoder.encode_scan(&source, 3).unwrap()
        };

        // Corrupt the first restart marker's cycling code so it no longer
        // matches what the decoder expects at that point.
        let marker_pos = encoded[..encoded_len]
            .windows(2)
            .position(|w| w[0] == JPEG_MARKER_START_BYTE && (0xD0..=0xD7).contains(&w[1]))
            .unwrap();
        let mut tampered = encoded;
        tampered[marker_pos + 1] = 0xD0 + ((tampered[marker_pos + 1] - 0xD0 + 1) % 8);

        let mut decoder =
            ScanDecoder::new(frame, pc, coding, &tampered[..encoded_len]).unwrap();
        let mut decoded = [0u8; 21];
        assert_eq!(
            decoder.decode_scan(&mut decoded, 3),
            Err(JpeglsError::RestartMarkerNotFound)
        );
    }
}
