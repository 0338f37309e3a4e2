use half::f16;

/// Convert to IEEE-754 binary16 bits, rounding to nearest even.
///
/// Values below the smallest subnormal flush to signed zero, values above 65504 become
/// infinity, and NaN stays NaN (quiet, payload truncated).
pub fn float_to_half(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Expand binary16 bits to `f32`. Exact for every half value, subnormals included.
pub fn half_to_float(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_representative_values() {
        let min_subnormal = f32::from_bits(0x3380_0000); // 2^-24
        for value in [0.0f32, 1.0, -2.5, 65504.0, min_subnormal, f32::INFINITY, f32::NEG_INFINITY] {
            let back = half_to_float(float_to_half(value));
            assert_eq!(back.to_bits(), value.to_bits(), "value {value:e}");
        }
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let bits = float_to_half(-0.0);
        assert_eq!(bits, 0x8000);
        assert!(half_to_float(bits).is_sign_negative());
    }

    #[test]
    fn nan_survives() {
        assert!(half_to_float(float_to_half(f32::NAN)).is_nan());
    }

    #[test]
    fn known_encodings() {
        assert_eq!(float_to_half(1.0), 0x3C00);
        assert_eq!(float_to_half(65504.0), 0x7BFF);
        assert_eq!(float_to_half(f32::from_bits(0x3380_0000)), 0x0001);
        assert_eq!(float_to_half(f32::INFINITY), 0x7C00);
        // Past the largest finite half.
        assert_eq!(float_to_half(70000.0), 0x7C00);
        assert_eq!(half_to_float(0x03FF), 6.097_555_2e-5);
    }
}
