//! Float to 16-bit PCM conversion
//!
//! Negative samples scale by 0x8000 and non-negative samples by 0x7FFF so the
//! full signed 16-bit range (-32768..=32767) is reachable from [-1.0, 1.0].
//! Products are truncated toward zero, which is what MP3 codecs fed from a
//! typed 16-bit buffer expect.

/// Scale applied to negative samples
const NEGATIVE_SCALE: f32 = 32768.0;

/// Scale applied to non-negative samples
const POSITIVE_SCALE: f32 = 32767.0;

/// Convert a single float sample to i16.
///
/// Out-of-range input is clamped to [-1.0, 1.0]; NaN maps to 0.
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 {
        s * NEGATIVE_SCALE
    } else {
        s * POSITIVE_SCALE
    };
    // Float-to-int `as` truncates toward zero, saturates, and maps NaN to 0
    scaled as i16
}

/// Convert a block of float samples to 16-bit PCM.
/// The output has the same length as the input.
pub fn convert(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| float_to_i16(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_i16_range() {
        assert_eq!(float_to_i16(-1.0), i16::MIN);
        assert_eq!(float_to_i16(1.0), i16::MAX);
        assert_eq!(float_to_i16(0.0), 0);
    }

    #[test]
    fn asymmetric_scaling() {
        assert_eq!(float_to_i16(-0.5), -16384);
        assert_eq!(float_to_i16(0.5), 16383);
        assert_eq!(float_to_i16(-0.25), -8192);
        assert_eq!(float_to_i16(0.25), 8191);
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(float_to_i16(-3.0), i16::MIN);
        assert_eq!(float_to_i16(7.5), i16::MAX);
        assert_eq!(float_to_i16(f32::INFINITY), i16::MAX);
        assert_eq!(float_to_i16(f32::NEG_INFINITY), i16::MIN);
    }

    #[test]
    fn nan_is_silence() {
        assert_eq!(float_to_i16(f32::NAN), 0);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.1 * 32767 = 3276.7
        assert_eq!(float_to_i16(0.1), 3276);
        // tiny negative values do not round away to -1
        assert_eq!(float_to_i16(-0.00001), 0);
    }

    #[test]
    fn matches_floor_rule_on_exact_grid() {
        // On the 1/256 grid both products are exact, so truncation and floor agree
        for i in -256..=256 {
            let x = i as f32 / 256.0;
            let expected = if x < 0.0 {
                (x as f64 * 32768.0).floor()
            } else {
                (x as f64 * 32767.0).floor()
            };
            let expected = expected.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            assert_eq!(float_to_i16(x), expected, "sample {}", x);
        }
    }

    #[test]
    fn convert_preserves_length_and_order() {
        let input = [0.0, 1.0, -1.0, 0.5];
        let out = convert(&input);
        assert_eq!(out, vec![0, 32767, -32768, 16383]);
        assert!(convert(&[]).is_empty());
    }
}
