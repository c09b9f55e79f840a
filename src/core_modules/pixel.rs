// THEORY:
// The `Pixel` module is the most fundamental unit of the diff engine. It is a
// "dumb" data container for a single RGBA sample plus the one pairwise
// operation the whole system is built on: the color-distance comparator.
//
// Key architectural principles:
// 1.  **Data Container**: A `Pixel` holds four 8-bit channels and nothing else.
//     It knows how to measure its distance to another sample but has no idea
//     where it sits in an image; spatial knowledge lives in `Chunk` and above.
// 2.  **Two-Axis Distance**: Color difference is the Euclidean distance across
//     the RGB channels. Alpha is deliberately kept out of that sum (a change
//     in coverage is a different kind of change than a change in color) and
//     is measured as its own absolute delta. The larger of the two axes is the
//     distance that gets compared against the tolerance.
// 3.  **Threshold Flow**: The tolerance is always passed in by the caller. A
//     `Pixel` holds no global state, so the tolerance a run was configured
//     with is the tolerance every comparison actually uses.

pub mod pixel {
    /// A single RGBA sample with 8-bit channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: u8,
        pub green: u8,
        pub blue: u8,
        pub alpha: u8,
    }

    impl From<&[u8]> for Pixel {
        fn from(bytes: &[u8]) -> Self {
            Self {
                red: bytes[0],
                green: bytes[1],
                blue: bytes[2],
                alpha: bytes[3],
            }
        }
    }

    impl Pixel {
        pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
            Self {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Distance to `other`: the Euclidean distance across the RGB
        /// channels and the absolute alpha delta, whichever is larger.
        pub fn distance(&self, other: &Pixel) -> f32 {
            let r = (self.red as f32 - other.red as f32).powi(2);
            let g = (self.green as f32 - other.green as f32).powi(2);
            let b = (self.blue as f32 - other.blue as f32).powi(2);
            let rgb = (r + g + b).sqrt();
            let alpha = (self.alpha as f32 - other.alpha as f32).abs();
            rgb.max(alpha)
        }

        /// Two samples are considered equal when their distance does not
        /// exceed `threshold` (expressed in the 0-255 channel scale).
        pub fn matches(&self, other: &Pixel, threshold: f32) -> bool {
            self.distance(other) <= threshold
        }
    }
}
