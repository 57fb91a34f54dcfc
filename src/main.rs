// Trains the 4-8-4 bit-complement network and prints what it learned.
//
//   cargo run                      -- built-in architecture and settings
//   cargo run -- spec.json         -- architecture and settings from a NetworkSpec file
//   cargo run -- -v [spec.json]    -- per-epoch debug logging
use std::process::ExitCode;
use std::time::Instant;

use backprop_nn::{ActivationFunction, NetError, NetworkSpec, TrainingSample};
use tracing::{error, Level};

/// Widest input the full truth table is built for (65536 rows).
const MAX_TABLE_BITS: usize = 16;

fn bit_complement_samples(bits: usize) -> backprop_nn::Result<Vec<TrainingSample>> {
    if bits > MAX_TABLE_BITS {
        return Err(NetError::InvalidConfiguration(format!(
            "input width {bits} is too wide for a full bit-complement table (at most {MAX_TABLE_BITS})"
        )));
    }

    let samples = (0..1usize << bits)
        .map(|row| {
            let inputs: Vec<f64> = (0..bits)
                .rev()
                .map(|bit| ((row >> bit) & 1) as f64)
                .collect();
            let targets = inputs.iter().map(|x| 1.0 - x).collect();
            TrainingSample::new(inputs, targets)
        })
        .collect();
    Ok(samples)
}

fn run() -> backprop_nn::Result<()> {
    let mut verbose = false;
    let mut spec_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ => spec_path = Some(arg),
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let spec = match spec_path {
        Some(path) => NetworkSpec::load_json(path)?,
        None => NetworkSpec::uniform("bit-complement", &[4, 8, 4], ActivationFunction::Sigmoid),
    };

    let mut network = spec.build(&mut rand::thread_rng())?;
    let samples = bit_complement_samples(network.input_width())?;

    let start = Instant::now();
    let training_error = network.train(&samples, &spec.settings)?;
    let duration = start.elapsed();

    println!("Network training data:\n{network}\n");
    println!("Training error: {training_error}");
    println!("Training duration: {} ms", duration.as_millis());
    println!("Test trained network:");

    for sample in &samples {
        let output = network.test(&sample.inputs)?;
        let inputs: Vec<String> = sample.inputs.iter().map(|x| x.to_string()).collect();
        let rounded: Vec<String> = output.iter().map(|y| format!("{}", y.round() as i64)).collect();
        println!("{} = {}", inputs.join(" "), rounded.join(" "));
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
