use rand::distributions::Open01;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws in the open interval (0, 1).
///
/// Simulation code takes entropy only through this trait so tests can pin
/// every draw.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for ChaCha8Rng {
    fn next_uniform(&mut self) -> f64 {
        self.sample(Open01)
    }
}

impl<U: UniformSource + ?Sized> UniformSource for &mut U {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Pre-computed draws replayed in order, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct UniformSequence {
    values: Vec<f64>,
    position: usize,
}

impl UniformSequence {
    pub fn new(values: Vec<f64>) -> Self {
        UniformSequence { values, position: 0 }
    }

    /// The same draw forever.
    pub fn constant(value: f64) -> Self {
        UniformSequence::new(vec![value])
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl UniformSource for UniformSequence {
    fn next_uniform(&mut self) -> f64 {
        // An empty sequence yields NaN, which the sampler rejects
        let value = if self.values.is_empty() {
            f64::NAN
        } else {
            self.values[self.position % self.values.len()]
        };
        self.position += 1;
        value
    }
}
