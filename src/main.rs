mod cli;

use std::io;
use std::path::Path;

use clap::Parser;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_shaper::config::{load_user_config, UserConfig};
use osm_shaper::errors::Result;
use osm_shaper::etl::process_osm::ProcessOsmEtl;
use osm_shaper::etl::reader::open_document;
use osm_shaper::etl::sample::SampleEtl;
use osm_shaper::etl::Etl;

use crate::cli::{Cli, Command};

fn setup_logging(config: &UserConfig) {
    Builder::with_level(&config.log_level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn run_etl(etl: &mut impl Etl, dir: &Path, force: bool) -> Result<()> {
    if force {
        etl.reprocess(dir)
    } else {
        etl.process(dir)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut user_config = load_user_config(&cli.config)?;
    if let Some(input) = cli.input {
        user_config.data_path = input;
    }
    setup_logging(&user_config);

    let output_dir = Path::new(&user_config.dest_path).to_path_buf();
    match cli.command {
        Command::Process { force } => {
            let mut etl = ProcessOsmEtl::new(&user_config);
            run_etl(&mut etl, &output_dir, force)?;
        },
        Command::Sample { every, force } => {
            if let Some(every) = every {
                user_config.sample_every = every;
                user_config.validate()?;
            }
            let mut etl = SampleEtl::new(&user_config);
            run_etl(&mut etl, &output_dir, force)?;
        },
        Command::Audit { report } => {
            let source = open_document(Path::new(&user_config.data_path))?;
            let result = report.run(source)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        },
    }

    Ok(())
}
