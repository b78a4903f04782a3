use indexmap::IndexMap;

use chainkit_core::{Categorical, ChainError, FiniteMarkovDecisionProcess};

/// One lilypad across the river, numbered 0 (the snake) to `length` (the
/// far bank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pad {
    pub position: u32,
}

/// The two sounds the frog can make before jumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Croak {
    A,
    B,
}

/// The frog-escape river crossing as a decision process.
///
/// A frog on pad `i` of a river `length` pads wide croaks A or B and jumps:
///
/// - Croak A: back to pad `i - 1` with probability `i / length`, forward to
///   pad `i + 1` otherwise.
/// - Croak B: to any other pad `0..=length` uniformly.
///
/// Pad 0 and pad `length` are terminal; landing on the far bank earns
/// reward 1.0 and everything else earns nothing, so the expected return
/// under an undiscounted policy is its escape probability.
pub fn frog_escape(length: u32) -> Result<FiniteMarkovDecisionProcess<Pad, Croak>, ChainError> {
    let n = f64::from(length);
    let mut mapping = IndexMap::new();

    for position in 1..length {
        let p_back = f64::from(position) / n;
        let mut actions = IndexMap::new();

        let mut croak_a = Vec::with_capacity(2);
        croak_a.push(((Pad { position: position - 1 }, 0.0), p_back));
        let forward = position + 1;
        let reward = if forward == length { 1.0 } else { 0.0 };
        croak_a.push(((Pad { position: forward }, reward), 1.0 - p_back));
        actions.insert(Croak::A, Categorical::new(croak_a)?);

        let mut croak_b = Vec::with_capacity(length as usize);
        for landing in 0..length {
            if landing == position {
                continue;
            }
            croak_b.push(((Pad { position: landing }, 0.0), 1.0 / n));
        }
        croak_b.push(((Pad { position: length }, 1.0), 1.0 / n));
        actions.insert(Croak::B, Categorical::new(croak_b)?);

        mapping.insert(Pad { position }, actions);
    }

    FiniteMarkovDecisionProcess::new(mapping)
}
