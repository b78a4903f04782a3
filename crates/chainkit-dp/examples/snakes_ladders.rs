use chainkit_core::{Constant, MarkovProcess, NonTerminal};
use chainkit_dp::domains::{Square, classic_jumps, snakes_and_ladders};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let board = snakes_and_ladders(&classic_jumps())?;
    let start = Constant::new(NonTerminal(Square { position: 1 }));

    println!("turns to finish, over ten games:");
    let mut total = 0;
    for (game, trace) in board.traces(&start, 2024).take(10).enumerate() {
        let states = trace.collect::<Result<Vec<_>, _>>()?;
        let turns = states.len() - 1;
        total += turns;
        println!("  game {:>2}: {:>3} turns", game + 1, turns);
    }
    println!("average: {:.1} turns", total as f64 / 10.0);

    Ok(())
}
