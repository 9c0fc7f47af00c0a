// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `smrt` CLI: run a single microwave radiative transfer solve described by
//! a YAML config, with a few geometry overrides for quick parameter sweeps.
//!
//! Grounded on the teacher's `#[derive(clap::Parser)]` argument-struct
//! style; logging setup is `smrt::logging::init_logging`, never called by
//! library code itself (spec: "library code never calls this").

use clap::Parser;
use smrt::config::Config;

/// Compute brightness temperature (passive) or backscatter (active) for a
/// layered snow/soil medium.
#[derive(Parser, Debug)]
#[command(name = "smrt", author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML config describing the sensor, quadrature and snowpack.
    config: String,

    /// Override the sensor frequency, in Hz.
    #[arg(long)]
    frequency_hz: Option<f64>,

    /// Override the incidence angle, in degrees.
    #[arg(long)]
    theta_inc_deg: Option<f64>,

    /// Override the number of streams per hemisphere.
    #[arg(long)]
    n_streams: Option<usize>,

    /// Increase logging verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = smrt::logging::init_logging(args.verbose) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), smrt::SmrtError> {
    let mut config = Config::from_yaml_file(&args.config)?;
    if let Some(f) = args.frequency_hz {
        config.sensor.frequency_hz = f;
    }
    if let Some(theta) = args.theta_inc_deg {
        config.sensor.theta_inc_deg = theta;
    }
    if let Some(n) = args.n_streams {
        config.quadrature.n_streams = n;
    }

    log::info!(
        "solving f={:.3} GHz theta_inc={:.2} deg n_streams={}",
        config.sensor.frequency_hz / 1e9,
        config.sensor.theta_inc_deg,
        config.n_streams()
    );

    let sensor = config.build_sensor()?;
    let snowpack = config.build_snowpack()?;
    let scheme = config.stream_scheme()?;

    let result = smrt::compute(&snowpack, &sensor, config.n_streams(), scheme)?;
    println!("{result}");
    Ok(())
}
