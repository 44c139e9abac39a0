// SPDX-License-Identifier: GPL-3.0-only

//! Frame types delivered by sensor sources

/// One raw depth frame as delivered by the sensor
///
/// Samples are millimeters in row-major order; 0 means the sensor had no
/// reading for that pixel. `min_reliable` and `max_reliable` are the inclusive
/// bounds the sensor reports for this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDepthFrame {
    pub samples: Vec<i16>,
    pub width: u32,
    pub height: u32,
    pub min_reliable: i16,
    pub max_reliable: i16,
}

impl RawDepthFrame {
    /// Build from unsigned samples, saturating values above `i16::MAX`
    pub fn from_u16(
        samples: &[u16],
        width: u32,
        height: u32,
        min_reliable: i16,
        max_reliable: i16,
    ) -> Self {
        Self {
            samples: samples
                .iter()
                .map(|&d| d.min(i16::MAX as u16) as i16)
                .collect(),
            width,
            height,
            min_reliable,
            max_reliable,
        }
    }
}

/// One color frame, packed 8-bit RGB, clocked independently of depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColorFrame {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u16_saturates() {
        let frame = RawDepthFrame::from_u16(&[0, 1200, 40_000], 3, 1, 400, 4000);
        assert_eq!(frame.samples, vec![0, 1200, i16::MAX]);
    }
}
