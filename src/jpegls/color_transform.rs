//! HP1/HP2/HP3 lossless color transforms for 3-component images.
//!
//! These are not part of ISO/IEC 14495-1 itself; they are the de facto
//! reversible RGB decorrelation transforms used by the reference HP
//! implementation and signaled with the "mrfx" APP8 marker. All arithmetic
//! wraps modulo `2^bits_per_sample`, which Rust's `as` cast between integer
//! widths already performs for us.

use crate::jpegls::traits::JpeglsSample;
use crate::jpegls::ColorTransformation;

/// Applies the forward color transform to one RGB triplet.
pub fn forward<T: JpeglsSample>(
    transformation: ColorTransformation,
    red: i32,
    green: i32,
    blue: i32,
) -> (T, T, T) {
    let range = 1i32 << T::BITS;
    let half = range / 2;

    match transformation {
        ColorTransformation::None => (T::from_i32(red), T::from_i32(green), T::from_i32(blue)),
        ColorTransformation::Hp1 => (
            T::from_i32(red - green + half),
            T::from_i32(green),
            T::from_i32(blue - green + half),
        ),
        ColorTransformation::Hp2 => (
            T::from_i32(red - green + half),
            T::from_i32(green),
            T::from_i32(blue - ((red + green) >> 1) - half),
        ),
        ColorTransformation::Hp3 => {
            let v2 = T::from_i32(blue - green + half).to_i32();
            let v3 = T::from_i32(red - green + half).to_i32();
            (
                T::from_i32(green + ((v2 + v3) >> 2) - range / 4),
                T::from_i32(v2),
                T::from_i32(v3),
            )
        }
    }
}

/// Applies the inverse color transform to one encoded triplet, reconstructing
/// the original RGB values.
pub fn inverse<T: JpeglsSample>(
    transformation: ColorTransformation,
    v1: i32,
    v2: i32,
    v3: i32,
) -> (T, T, T) {
    let range = 1i32 << T::BITS;
    let half = range / 2;

    match transformation {
        ColorTransformation::None => (T::from_i32(v1), T::from_i32(v2), T::from_i32(v3)),
        ColorTransformation::Hp1 => (
            T::from_i32(v1 + v2 - half),
            T::from_i32(v2),
            T::from_i32(v3 + v2 - half),
        ),
        ColorTransformation::Hp2 => {
            let r = T::from_i32(v1 + v2 - half).to_i32();
            (
                T::from_i32(r),
                T::from_i32(v2),
                T::from_i32(v3 + ((r + v2) >> 1) - half),
            )
        }
        ColorTransformation::Hp3 => {
            let g = v1 - ((v3 + v2) >> 2) + range / 4;
            (
                T::from_i32(v3 + g - half),
                T::from_i32(g),
                T::from_i32(v2 + g - half),
            )
        }
    }
}

/// Color transforms other than `None` only apply to 3-component 8/16-bit
/// frames (ISO/IEC 14495-1 does not define them at all; they are an HP
/// extension layered on top).
pub fn color_transformation_possible(component_count: i32, bits_per_sample: i32) -> bool {
    component_count == 3 && (bits_per_sample == 8 || bits_per_sample == 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_u8(transformation: ColorTransformation, r: i32, g: i32, b: i32) {
        let (v1, v2, v3) = forward::<u8>(transformation, r, g, b);
        let (r2, g2, b2) = inverse::<u8>(transformation, v1 as i32, v2 as i32, v3 as i32);
        assert_eq!((r2, g2, b2), (r as u8, g as u8, b as u8));
    }

    #[test]
    fn hp1_round_trips() {
        round_trip_u8(ColorTransformation::Hp1, 10, 200, 5);
        round_trip_u8(ColorTransformation::Hp1, 255, 0, 128);
    }

    #[test]
    fn hp2_round_trips() {
        round_trip_u8(ColorTransformation::Hp2, 10, 200, 5);
        round_trip_u8(ColorTransformation::Hp2, 255, 0, 128);
    }

    #[test]
    fn hp3_round_trips() {
        round_trip_u8(ColorTransformation::Hp3, 10, 200, 5);
        round_trip_u8(ColorTransformation::Hp3, 255, 0, 128);
    }

    #[test]
    fn none_is_identity() {
        let (v1, v2, v3) = forward::<u8>(ColorTransformation::None, 1, 2, 3);
        assert_eq!((v1, v2, v3), (1, 2, 3));
    }

    #[test]
    fn requires_three_component_8_or_16_bit() {
        assert!(color_transformation_possible(3, 8));
        assert!(color_transformation_possible(3, 16));
        assert!(!color_transformation_possible(3, 12));
        assert!(!color_transformation_possible(1, 8));
    }
}
