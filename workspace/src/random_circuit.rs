use chp_sim::{
    circuit::Circuit,
    trials::{ run_trials, tally_bits, TrialConfig },
};
use itertools::Itertools;
use rand::{ rngs::StdRng, SeedableRng };
use tracing::{ error, info, warn };
use tracing_subscriber::EnvFilter;

const N: usize = 64; // number of qubits

fn main() {
    const MC: usize = 200;
    const DEPTH: usize = 100;
    const P_MEAS: f64 = 0.1;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    // one fixed circuit; trials differ only in measurement coin flips
    let mut rng = StdRng::seed_from_u64(10546);
    let circuit = Circuit::brickwork(N, DEPTH, P_MEAS, &mut rng);
    info!(ops = circuit.len(), "generated brickwork circuit");

    let config = TrialConfig { qubits: N, trials: MC, seed: 0 };
    let results
        = run_trials(&config, |sim| {
            let record = circuit.run(sim)?;
            let n_rand = record.iter().filter(|(_, o)| o.is_random()).count();
            let bits = record.bits().collect_vec();
            Ok((sim.tableau().is_valid(), n_rand, bits))
        });
    let results
        = match results {
            Ok(results) => results,
            Err(e) => {
                error!("random circuit run failed: {e}");
                std::process::exit(1);
            },
        };

    let invalid = results.iter().filter(|(valid, ..)| !valid).count();
    if invalid > 0 { warn!(invalid, "final tableaux failed validity check"); }

    let n_meas: usize = results.iter().map(|(_, _, bits)| bits.len()).sum();
    let n_rand: usize = results.iter().map(|(_, n_rand, _)| n_rand).sum();
    let tally = tally_bits(results.into_iter().flat_map(|(_, _, bits)| bits));
    info!(n_meas, n_rand, "done");

    println!("measurements = {}", n_meas);
    println!(
        "random fraction = {:.4}",
        n_rand as f64 / n_meas.max(1) as f64,
    );
    println!(
        "P(1) = {:.4}",
        tally.fraction_ones().unwrap_or(f64::NAN),
    );
    if invalid > 0 { std::process::exit(1); }
}
