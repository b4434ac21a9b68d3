/// Coherent noise primitives shared by height generation and colour dithering.
use noise::{NoiseFn, Perlin};

/// A deterministic coherent-noise source with octave summation.
///
/// Both samplers return values in `[-1.0, 1.0]` and must give identical
/// output for identical input.  Seeding is the implementor's business.
pub trait NoiseSource {
    /// Octave noise sampled on the horizontal plane.
    ///
    /// * `x, z`       : sample coordinates, scaled by `frequency`.
    /// * `octaves`    : number of layers; each doubles the frequency.
    /// * `persistence`: amplitude multiplier between successive octaves.
    /// * `frequency`  : base frequency of the first octave.
    fn noise2d(&self, x: f64, z: f64, octaves: u32, persistence: f64, frequency: f64) -> f64;

    /// Octave noise sampled in 3-D space, same parameters as [`Self::noise2d`].
    fn noise3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> f64;
}

/// Perlin-backed [`NoiseSource`].
#[derive(Clone)]
pub struct PerlinSource {
    perlin: Perlin,
    seed: u32,
}

impl PerlinSource {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoiseSource for PerlinSource {
    fn noise2d(&self, x: f64, z: f64, octaves: u32, persistence: f64, frequency: f64) -> f64 {
        octave_sum(octaves, persistence, frequency, |f| {
            self.perlin.get([x * f, z * f])
        })
    }

    fn noise3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> f64 {
        octave_sum(octaves, persistence, frequency, |f| {
            self.perlin.get([x * f, y * f, z * f])
        })
    }
}

/// Fractional Brownian Motion over an arbitrary sampler.
///
/// `sample` receives the current octave frequency and returns raw noise.
/// The weighted sum is divided by the total amplitude so the result stays in
/// `[-1.0, 1.0]`; it is clamped as well because Perlin may overshoot slightly.
/// Zero octaves yields `0.0`.
pub fn octave_sum(
    octaves: u32,
    persistence: f64,
    frequency: f64,
    mut sample: impl FnMut(f64) -> f64,
) -> f64 {
    let mut value = 0.0f64;
    let mut amplitude = 1.0f64;
    let mut frequency = frequency;
    let mut max_value = 0.0f64;

    for _ in 0..octaves {
        value += sample(frequency) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }
    if max_value == 0.0 {
        return 0.0;
    }
    (value / max_value).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_is_deterministic() {
        let a = PerlinSource::new(7);
        let b = PerlinSource::new(7);
        for i in 0..50 {
            let x = i as f64 * 1.37;
            let z = i as f64 * 0.61;
            assert_eq!(
                a.noise2d(x, z, 4, 0.25, 1.0 / 28.0),
                b.noise2d(x, z, 4, 0.25, 1.0 / 28.0)
            );
            assert_eq!(
                a.noise3d(x, 3.0, z, 2, 0.5, 0.1),
                b.noise3d(x, 3.0, z, 2, 0.5, 0.1)
            );
        }
    }

    #[test]
    fn perlin_reports_its_seed() {
        assert_eq!(PerlinSource::new(90210).seed(), 90210);
    }

    #[test]
    fn perlin_stays_in_unit_range() {
        let source = PerlinSource::new(42);
        for x in 0..40 {
            for z in 0..40 {
                let v = source.noise2d(x as f64 * 0.9, z as f64 * 1.3, 4, 0.25, 1.0 / 28.0);
                assert!((-1.0..=1.0).contains(&v), "{v} out of range");
            }
        }
    }

    #[test]
    fn octave_sum_normalises_by_total_amplitude() {
        // Every octave returns 1.0, so the normalised sum is exactly 1.0.
        let v = octave_sum(4, 0.25, 1.0, |_| 1.0);
        assert_eq!(v, 1.0);
    }

    #[test]
    fn octave_sum_doubles_frequency_each_octave() {
        let mut seen = Vec::new();
        octave_sum(3, 0.5, 0.25, |f| {
            seen.push(f);
            0.0
        });
        assert_eq!(seen, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn zero_octaves_is_silent() {
        assert_eq!(octave_sum(0, 0.25, 1.0, |_| 1.0), 0.0);
    }
}
