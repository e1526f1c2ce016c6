//! Multi-octave fractal Brownian motion over the unit sphere.
//!
//! Sampling in 3D on the unit direction keeps the field continuous across
//! icosahedron faces, so neighbouring tiles agree on shared vertices.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

use crate::HeightProvider;

/// Configuration for the fBm height field.
#[derive(Clone, Debug, PartialEq)]
pub struct FbmParams {
    /// Noise seed.
    pub seed: u32,
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per unit of direction.
    pub frequency: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.5,
        }
    }
}

/// Simplex fBm sampled on the unit direction, normalized to `[-1, 1]`.
pub struct FbmHeightProvider {
    noise: Simplex,
    params: FbmParams,
    max_amplitude: f64,
}

impl FbmHeightProvider {
    /// Create a provider with the given parameters.
    pub fn new(params: FbmParams) -> Self {
        let noise = Simplex::new(params.seed);
        let mut max_amplitude = 0.0;
        let mut amp = 1.0;
        for _ in 0..params.octaves {
            max_amplitude += amp;
            amp *= params.persistence;
        }
        Self {
            noise,
            params,
            max_amplitude,
        }
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &FbmParams {
        &self.params
    }

    fn fbm(&self, point: DVec3) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            let p = point * frequency;
            total += self.noise.get([p.x, p.y, p.z]) * amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }
}

impl Default for FbmHeightProvider {
    fn default() -> Self {
        Self::new(FbmParams::default())
    }
}

impl HeightProvider for FbmHeightProvider {
    fn sample(&self, direction: DVec3, _resolution: u32) -> f64 {
        if self.max_amplitude <= 0.0 {
            return 0.0;
        }
        (self.fbm(direction) / self.max_amplitude).clamp(-1.0, 1.0)
    }
}
