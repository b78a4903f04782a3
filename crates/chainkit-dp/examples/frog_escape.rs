use chainkit_dp::domains::frog_escape;
use chainkit_dp::{converge, greedy_policy, policy_iteration, value_iteration, vf_close};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let length = 10;
    let mdp = frog_escape(length)?;

    let vf = converge(value_iteration(&mdp, 1.0), |a, b| vf_close(a, b, 1e-9))
        .expect("value iteration is infinite");
    let policy = greedy_policy(&mdp, &vf, 1.0);

    println!("escape probability by pad, river {length} pads wide:");
    for (pad, value) in &vf {
        let croak = policy.action_for(pad)?;
        println!("  pad {:>2}: {value:.4}  croak {croak:?}", pad.0.position);
    }

    let (pi_vf, _) = converge(policy_iteration(&mdp, 1.0), |(a, _), (b, _)| {
        vf_close(a, b, 1e-9)
    })
    .expect("policy iteration is infinite");

    let disagreement = vf
        .iter()
        .map(|(pad, value)| (value - pi_vf.get(pad).copied().unwrap_or(0.0)).abs())
        .fold(0.0, f64::max);
    println!("max disagreement between the two solvers: {disagreement:.2e}");

    Ok(())
}
