use crate::AssetError;
use std::path::Path;

/// Toon shading ramp: an ordered row of grayscale tones.
///
/// The lit intensity indexes into the ramp with nearest filtering, which
/// quantizes smooth diffuse shading into hard bands. Loaded from the first
/// row of an image, or built in.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientRamp {
    steps: Vec<u8>,
}

impl GradientRamp {
    /// The classic three-band ramp: dark, half, full.
    pub fn three_tone() -> Self {
        Self {
            steps: vec![64, 128, 255],
        }
    }

    /// Reads the first pixel row of an image as the ramp, darkest expected
    /// on the left.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let img = image::open(path.as_ref())?.to_luma8();
        let steps = (0..img.width()).map(|x| img.get_pixel(x, 0).0[0]).collect();
        tracing::debug!(path = %path.as_ref().display(), "loaded gradient ramp");
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Nearest-neighbor lookup for `t` in `[0, 1]`, returning the band
    /// value in `[0, 1]`. Mirrors what the GPU sampler does.
    pub fn sample(&self, t: f32) -> f32 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let n = self.steps.len();
        let idx = ((t.clamp(0.0, 1.0) * n as f32) as usize).min(n - 1);
        self.steps[idx] as f32 / 255.0
    }
}

impl Default for GradientRamp {
    fn default() -> Self {
        Self::three_tone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tone_has_ascending_bands() {
        let ramp = GradientRamp::three_tone();
        assert_eq!(ramp.len(), 3);
        let s = ramp.steps();
        assert!(s[0] < s[1] && s[1] < s[2]);
    }

    #[test]
    fn sample_quantizes_into_bands() {
        let ramp = GradientRamp::three_tone();
        // Within one band the output is constant.
        assert_eq!(ramp.sample(0.0), ramp.sample(0.3));
        assert_eq!(ramp.sample(0.4), ramp.sample(0.6));
        assert_eq!(ramp.sample(0.7), ramp.sample(1.0));
        // Across bands it steps up.
        assert!(ramp.sample(0.0) < ramp.sample(0.5));
        assert!(ramp.sample(0.5) < ramp.sample(1.0));
    }

    #[test]
    fn sample_clamps_out_of_range_input() {
        let ramp = GradientRamp::three_tone();
        assert_eq!(ramp.sample(-1.0), ramp.sample(0.0));
        assert_eq!(ramp.sample(2.0), ramp.sample(1.0));
    }

    #[test]
    fn loading_a_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GradientRamp::load(dir.path().join("absent.png"));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_the_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.png");
        let img = image::GrayImage::from_fn(3, 2, |x, y| {
            // Second row is noise the loader must ignore.
            image::Luma([if y == 0 { (x as u8 + 1) * 60 } else { 7 }])
        });
        img.save(&path).unwrap();

        let ramp = GradientRamp::load(&path).unwrap();
        assert_eq!(ramp.steps(), &[60, 120, 180]);
    }
}
