use std::convert::TryInto;
use std::fmt::Debug;

pub trait JpeglsSample:
    Copy
    + Clone
    + Debug
    + Default
    + PartialEq
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + From<u8>
    + TryInto<u8>
    + TryInto<i32>
{
    const BITS: u32;
    const MAX_VALUE: i32;

    fn to_i32(self) -> i32;
    fn from_i32(val: i32) -> Self;

    fn is_near(lhs: i32, rhs: i32, near: i32) -> bool {
        (lhs - rhs).abs() <= near
    }

    /// Clamps a bias-corrected predicted value to `[0, maximum_sample_value]`.
    /// `maximum_sample_value` is the component's actual MAXVAL, which may be
    /// smaller than `Self::MAX_VALUE` when the storage type is wider than the
    /// bit depth (e.g. 12-bit samples in a `u16`) — using `Self::MAX_VALUE`
    /// here would let the prediction drift out of band and desync the
    /// reconstruction's wraparound from the encoder's.
    fn correct_prediction(predicted: i32, maximum_sample_value: i32) -> i32 {
        if predicted < 0 {
            0
        } else if predicted > maximum_sample_value {
            maximum_sample_value
        } else {
            predicted
        }
    }

    /// Reconstructs a sample from a predicted value and a decoded,
    /// quantized error value (the same quantized scale `quantize_gradient`'s
    /// sibling, the error-value quantizer, produces). `maximum_sample_value`
    /// is the actual MAXVAL of the component (`(1 << bits_per_sample) - 1`),
    /// which may be smaller than `Self::MAX_VALUE` when the sample's storage
    /// type is wider than its bit depth (e.g. 12-bit samples in a `u16`).
    fn compute_reconstructed_sample(
        predicted: i32,
        error_value: i32,
        maximum_sample_value: i32,
    ) -> i32 {
        Self::compute_reconstructed_sample_near_lossless(
            predicted,
            error_value,
            maximum_sample_value,
            0,
        )
    }

    /// Same as `compute_reconstructed_sample`, but dequantizes `error_value`
    /// by `2 * near_lossless + 1` first (ISO/IEC 14495-1 A.6) and widens the
    /// wraparound band to `[-near_lossless, maximum_sample_value +
    /// near_lossless]` with period `(maximum_sample_value + 1) * (2 *
    /// near_lossless + 1)`, matching the encoder's `modulo_range`/`quantize`
    /// pairing.
    fn compute_reconstructed_sample_near_lossless(
        predicted: i32,
        error_value: i32,
        maximum_sample_value: i32,
        near_lossless: i32,
    ) -> i32 {
        let scale = 2 * near_lossless + 1;
        let period = (maximum_sample_value + 1) * scale;
        let mut reconstructed = predicted + error_value * scale;
        if reconstructed < -near_lossless {
            reconstructed += period;
        } else if reconstructed > maximum_sample_value + near_lossless {
            reconstructed -= period;
        }
        reconstructed.clamp(0, maximum_sample_value)
    }
}

impl JpeglsSample for u8 {
    const BITS: u32 = 8;
    const MAX_VALUE: i32 = 255;
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(val: i32) -> Self {
        val as u8
    }
}

impl JpeglsSample for u16 {
    const BITS: u32 = 16;
    const MAX_VALUE: i32 = 65535;
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(val: i32) -> Self {
        val as u16
    }
}

pub fn bit_wise_sign(i: i32) -> i32 {
    if i < 0 {
        -1
    } else if i > 0 {
        1
    } else {
        0
    }
}

pub fn apply_sign(val: i32, sign: i32) -> i32 {
    if sign < 0 { -val } else { val }
}

pub fn apply_sign_for_index(val: i32, sign: i32) -> usize {
    if sign < 0 {
        (-val) as usize
    } else {
        val as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstruction_wraps_below_zero() {
        assert_eq!(u8::compute_reconstructed_sample(2, -5, 255), 252);
    }

    #[test]
    fn reconstruction_wraps_above_maximum() {
        assert_eq!(u8::compute_reconstructed_sample(250, 10, 255), 4);
    }

    #[test]
    fn reconstruction_uses_component_maxval_not_storage_width() {
        // 12-bit samples stored in a u16: MAX_VALUE is 65535 but the
        // component's actual MAXVAL is 4095.
        assert_eq!(u16::compute_reconstructed_sample(4094, 3, 4095), 1);
    }

    #[test]
    fn correct_prediction_clamps_to_component_maxval_not_storage_width() {
        // A 2-bit image (maximum_sample_value 3) stored in u8 (MAX_VALUE 255):
        // a bias-corrected prediction above 3 must clamp to 3, not 255.
        assert_eq!(u8::correct_prediction(5, 3), 3);
        assert_eq!(u8::correct_prediction(-1, 3), 0);
        assert_eq!(u8::correct_prediction(2, 3), 2);
    }

    #[test]
    fn bit_wise_sign_matches_definition() {
        assert_eq!(bit_wise_sign(-5), -1);
        assert_eq!(bit_wise_sign(0), 0);
        assert_eq!(bit_wise_sign(5), 1);
    }
}
