use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use graph_energy::datasets::MoonsConfig;
use graph_energy_cli::run::{
    load_run_config, run_fit, run_propagation, run_validation, write_fit_output, write_moons,
    write_report, RunConfig,
};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("GRAPH_ENERGY_LOG", "error,graph_energy=info"))
        .init();

    let matches = Command::new("graph-energy")
        .version(clap::crate_version!())
        .about("Semi-supervised classification by graph energy minimization")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("fit")
                .about("Score every row of a partially labeled CSV/TSV file")
                .arg(data_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the scores (TSV). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("standardize")
                        .long("standardize")
                        .help("Standardize feature columns before building the graph.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("propagate")
                .about("Score every row by synchronous pressure propagation")
                .arg(data_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the scores (TSV). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("rounds")
                        .short('r')
                        .long("rounds")
                        .help("Number of rounds. Overrides pressure.rounds.")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Run leave-one-group-out validation")
                .arg(data_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("group_column")
                        .short('g')
                        .long("group-column")
                        .help("Column assigning rows to groups. Overrides reader.group_column.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the JSON report. Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("moons")
                .about("Generate a two-moons dataset as CSV")
                .arg(
                    Arg::new("n_samples")
                        .short('n')
                        .long("samples")
                        .help("Number of samples")
                        .default_value("200")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("noise")
                        .long("noise")
                        .help("Half-width of the uniform coordinate jitter")
                        .default_value("0.05")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("labeled")
                        .long("labeled")
                        .help("Fraction of samples that keep their label")
                        .default_value("0.1")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("groups")
                        .long("groups")
                        .help("Number of round-robin groups (0 for none)")
                        .default_value("0")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Random seed")
                        .default_value("42")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the dataset (CSV). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("fit", sub_m)) => handle_fit(sub_m),
        Some(("propagate", sub_m)) => handle_propagate(sub_m),
        Some(("validate", sub_m)) => handle_validate(sub_m),
        Some(("moons", sub_m)) => handle_moons(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1)
    }
    Ok(())
}

fn data_arg() -> Arg {
    Arg::new("data")
        .help("Path to the input data file (*.csv or *.tsv)")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to a JSON run configuration file")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn resolve_config(matches: &ArgMatches) -> Result<RunConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(config_path) => {
            eprintln!("[graph-energy] Using config: {:?}", config_path);
            load_run_config(config_path)
        }
        None => {
            let config = RunConfig::default();
            let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
            eprintln!("[graph-energy] No config provided; using defaults:\n{}", default_json);
            Ok(config)
        }
    }
}

fn handle_fit(matches: &ArgMatches) -> Result<()> {
    let data_path = matches
        .get_one::<PathBuf>("data")
        .ok_or_else(|| anyhow::anyhow!("Missing data path"))?;
    let output_path = matches.get_one::<PathBuf>("output_file");

    let mut config = resolve_config(matches)?;
    if matches.get_flag("standardize") {
        config.standardize = true;
    }

    eprintln!("[graph-energy] Fitting: {:?}", data_path);
    let result = run_fit(data_path, &config)?;
    write_fit_output(&result, output_path.map(PathBuf::as_path))?;
    eprintln!(
        "[graph-energy] Scored {} samples ({} labeled).",
        result.dataset.n_samples(),
        result.dataset.n_labeled()
    );
    Ok(())
}

fn handle_propagate(matches: &ArgMatches) -> Result<()> {
    let data_path = matches
        .get_one::<PathBuf>("data")
        .ok_or_else(|| anyhow::anyhow!("Missing data path"))?;
    let output_path = matches.get_one::<PathBuf>("output_file");

    let mut config = resolve_config(matches)?;
    if let Some(&rounds) = matches.get_one::<usize>("rounds") {
        config.pressure.rounds = rounds;
    }

    eprintln!("[graph-energy] Propagating: {:?}", data_path);
    let result = run_propagation(data_path, &config)?;
    write_fit_output(&result, output_path.map(PathBuf::as_path))?;
    eprintln!(
        "[graph-energy] Scored {} samples ({} labeled).",
        result.dataset.n_samples(),
        result.dataset.n_labeled()
    );
    Ok(())
}

fn handle_validate(matches: &ArgMatches) -> Result<()> {
    let data_path = matches
        .get_one::<PathBuf>("data")
        .ok_or_else(|| anyhow::anyhow!("Missing data path"))?;
    let output_path = matches.get_one::<PathBuf>("output_file");

    let mut config = resolve_config(matches)?;
    if let Some(column) = matches.get_one::<String>("group_column") {
        config.reader.group_column = Some(column.clone());
    }

    eprintln!("[graph-energy] Validating: {:?}", data_path);
    let report = run_validation(data_path, &config)?;
    write_report(&report, output_path.map(PathBuf::as_path))?;
    match report.error_rate() {
        Some(rate) => eprintln!(
            "[graph-energy] {} of {} held-out samples misclassified ({:.4}).",
            report.errors, report.evaluated, rate
        ),
        None => eprintln!("[graph-energy] No labeled samples were held out."),
    }
    Ok(())
}

fn handle_moons(matches: &ArgMatches) -> Result<()> {
    let defaults = MoonsConfig::default();
    let config = MoonsConfig {
        n_samples: matches.get_one::<usize>("n_samples").copied().unwrap_or(defaults.n_samples),
        noise: matches.get_one::<f64>("noise").copied().unwrap_or(defaults.noise),
        labeled_fraction: matches
            .get_one::<f64>("labeled")
            .copied()
            .unwrap_or(defaults.labeled_fraction),
        n_groups: matches.get_one::<usize>("groups").copied().unwrap_or(defaults.n_groups),
        seed: matches.get_one::<u64>("seed").copied().unwrap_or(defaults.seed),
    };
    let output_path = matches.get_one::<PathBuf>("output_file");
    let n = write_moons(&config, output_path.map(PathBuf::as_path))?;
    eprintln!("[graph-energy] Wrote {} samples.", n);
    Ok(())
}
