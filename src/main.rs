//! auramgr - headless aura scenario runner

use std::process::ExitCode;

use auramgr::cli::parse_args;
use auramgr::headless::{run_headless_scenario, RunOptions, ScenarioConfig};

fn main() -> ExitCode {
    let args = parse_args();

    let Some(config_path) = args.headless else {
        eprintln!("Nothing to do: pass --headless <CONFIG_FILE> to run a scenario");
        return ExitCode::FAILURE;
    };

    let config = match ScenarioConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        output_path: args.output,
        spells_path: args.spells,
        max_frames: args.max_frames,
        with_logging: true,
    };

    match run_headless_scenario(config, options) {
        Ok(result) if result.invariant_violations == 0 && result.malformed_packets == 0 => ExitCode::SUCCESS,
        Ok(_) => {
            eprintln!("Scenario finished with invariant violations");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Scenario failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
