use std::marker::PhantomData;

use rand::RngCore;

use crate::ChainError;

/// Floating point tolerance used when checking probability sums.
pub const PROB_TOLERANCE: f64 = 1e-9;

/// A probability distribution over outcomes of type `T`.
///
/// The random source is always passed in by the caller, so a distribution
/// itself carries no mutable state and can be shared freely.
pub trait Distribution<T> {
    /// Draw one outcome according to the distribution's probabilities.
    fn sample(&self, rng: &mut dyn RngCore) -> T;
}

/// A distribution with finite support that can be enumerated exactly.
pub trait FiniteDistribution<T>: Distribution<T> {
    /// The deduplicated `(outcome, probability)` pairs, in first-seen order.
    /// Probabilities are non-negative and sum to 1.0 within [`PROB_TOLERANCE`].
    fn table(&self) -> &[(T, f64)];
}

impl<T, D> Distribution<T> for &D
where
    D: Distribution<T> + ?Sized,
{
    fn sample(&self, rng: &mut dyn RngCore) -> T {
        (**self).sample(rng)
    }
}

/// Map a `u64` draw onto the unit interval `[0, 1)`.
pub(crate) fn uniform_unit(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0)
}

#[derive(Debug, Clone, PartialEq)]
/// A finite distribution built from weighted outcomes, with a precomputed
/// CDF for sampling by cumulative probability.
pub struct Categorical<T> {
    table: Vec<(T, f64)>,
    cdf: Vec<f64>,
}

impl<T: PartialEq> Categorical<T> {
    /// Build a categorical distribution from `(outcome, weight)` pairs.
    ///
    /// Weights for an outcome supplied more than once are summed, never
    /// overwritten, so callers may feed overlapping generators. Weights are
    /// normalized by their total. Fails with
    /// [`ChainError::InvalidDistribution`] on an empty support, a negative or
    /// non-finite weight, or zero total mass.
    pub fn new(weights: impl IntoIterator<Item = (T, f64)>) -> Result<Self, ChainError> {
        let mut table: Vec<(T, f64)> = Vec::new();

        for (outcome, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ChainError::InvalidDistribution {
                    reason: format!("weight {weight} is negative or not finite"),
                });
            }

            match table.iter_mut().find(|(seen, _)| *seen == outcome) {
                Some((_, mass)) => *mass += weight,
                None => table.push((outcome, weight)),
            }
        }

        let total: f64 = table.iter().map(|(_, mass)| mass).sum();
        if table.is_empty() || total <= 0.0 {
            return Err(ChainError::InvalidDistribution {
                reason: "support is empty or has zero total mass".to_string(),
            });
        }

        let mut cdf = Vec::with_capacity(table.len());
        let mut cumulative = 0.0_f64;
        for (_, mass) in &mut table {
            *mass /= total;
            cumulative += *mass;
            cdf.push(cumulative);
        }

        Ok(Self { table, cdf })
    }

    /// The probability assigned to `outcome`, or 0.0 if it is not in the support.
    pub fn probability(&self, outcome: &T) -> f64 {
        self.table
            .iter()
            .find(|(seen, _)| seen == outcome)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    /// Transform every outcome, merging any that map to the same value.
    pub fn map<U: PartialEq>(self, mut f: impl FnMut(T) -> U) -> Categorical<U> {
        let mut table: Vec<(U, f64)> = Vec::with_capacity(self.table.len());

        for (outcome, mass) in self.table {
            let mapped = f(outcome);
            match table.iter_mut().find(|(seen, _)| *seen == mapped) {
                Some((_, seen_mass)) => *seen_mass += mass,
                None => table.push((mapped, mass)),
            }
        }

        let mut cdf = Vec::with_capacity(table.len());
        let mut cumulative = 0.0_f64;
        for (_, mass) in &table {
            cumulative += mass;
            cdf.push(cumulative);
        }

        Categorical { table, cdf }
    }
}

impl<T: Clone> Distribution<T> for Categorical<T> {
    /// Select by cumulative probability over the table in enumeration order,
    /// using one uniform draw in `[0, 1)`.
    fn sample(&self, rng: &mut dyn RngCore) -> T {
        let sample = uniform_unit(rng);
        let mut chosen_idx = self.cdf.partition_point(|p| *p < sample);
        if chosen_idx >= self.table.len() {
            chosen_idx = self.table.len() - 1;
        }

        self.table[chosen_idx].0.clone()
    }
}

impl<T: Clone> FiniteDistribution<T> for Categorical<T> {
    fn table(&self) -> &[(T, f64)] {
        &self.table
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The distribution that always produces the same value.
pub struct Constant<T> {
    table: [(T, f64); 1],
}

impl<T: Clone> Constant<T> {
    pub fn new(value: T) -> Self {
        Self {
            table: [(value, 1.0)],
        }
    }

    pub fn value(&self) -> &T {
        &self.table[0].0
    }
}

impl<T: Clone> Distribution<T> for Constant<T> {
    fn sample(&self, _rng: &mut dyn RngCore) -> T {
        self.table[0].0.clone()
    }
}

impl<T: Clone> FiniteDistribution<T> for Constant<T> {
    fn table(&self) -> &[(T, f64)] {
        &self.table
    }
}

/// A distribution defined only by a sampling procedure.
///
/// This is the general, non-enumerable case: the closure is free to compose
/// other draws (an action, then an outcome) as long as each call is one
/// independent draw from the intended marginal.
pub struct Sampled<T, F>
where
    F: Fn(&mut dyn RngCore) -> T,
{
    sampler: F,
    _outcome: PhantomData<fn() -> T>,
}

impl<T, F> Sampled<T, F>
where
    F: Fn(&mut dyn RngCore) -> T,
{
    pub fn new(sampler: F) -> Self {
        Self {
            sampler,
            _outcome: PhantomData,
        }
    }
}

impl<T, F> Distribution<T> for Sampled<T, F>
where
    F: Fn(&mut dyn RngCore) -> T,
{
    fn sample(&self, rng: &mut dyn RngCore) -> T {
        (self.sampler)(rng)
    }
}
