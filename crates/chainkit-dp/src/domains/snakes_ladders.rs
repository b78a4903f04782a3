use std::collections::HashMap;

use indexmap::IndexMap;

use chainkit_core::{Categorical, ChainError, FiniteMarkovProcess};

/// One square of the board, numbered 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub position: u32,
}

/// The board of a classic snakes-and-ladders game as a Markov process.
///
/// From each square below 100 a fair die moves the token one to six squares
/// forward; a landing square that is the foot of a ladder or the head of a
/// snake redirects through `jumps` before being recorded. Rolls that would
/// overshoot square 100 leave the token in place. Square 100 is the sole
/// terminal state.
///
/// Two rolls from the same square can land on the same final square once
/// jumps are applied; their probability mass is summed.
pub fn snakes_and_ladders(
    jumps: &HashMap<u32, u32>,
) -> Result<FiniteMarkovProcess<Square>, ChainError> {
    let mut transition_map = IndexMap::new();

    for position in 1..100_u32 {
        let mut landings = Vec::with_capacity(6);

        for roll in 1..=6_u32 {
            let landing = position + roll;
            if landing > 100 {
                continue;
            }

            let landing = jumps.get(&landing).copied().unwrap_or(landing);
            landings.push((Square { position: landing }, 1.0 / 6.0));
        }

        // Overshooting rolls keep the token on its square.
        if position > 94 {
            landings.push((Square { position }, f64::from(position - 94) / 6.0));
        }

        transition_map.insert(Square { position }, Categorical::new(landings)?);
    }

    FiniteMarkovProcess::new(transition_map)
}

/// The snake and ladder placements of the classic board.
pub fn classic_jumps() -> HashMap<u32, u32> {
    HashMap::from([
        (1, 38),
        (4, 14),
        (9, 31),
        (28, 84),
        (36, 44),
        (21, 42),
        (51, 67),
        (71, 91),
        (80, 100),
        (16, 6),
        (47, 26),
        (49, 11),
        (56, 53),
        (64, 60),
        (87, 24),
        (93, 73),
        (95, 75),
        (98, 78),
    ])
}
