use crate::cli::ExtractArgs;
use crate::config::PartialMetadataConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use abmeta::engine::progress::ProgressReporter;
use abmeta::workflows::metadata::{self, MetadataInputs};
use tracing::{debug, info, warn};

pub fn run(args: ExtractArgs) -> Result<()> {
    let partial_config = PartialMetadataConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let (config, side_tables) = partial_config.merge_with_cli(&args)?;
    debug!("Final configuration: {:?}", config);

    let inputs = MetadataInputs {
        input_dir: args.input_dir.clone(),
        param_csvs: side_tables.param_csvs,
        predictions: side_tables.predictions,
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Extracting metadata from {}...", inputs.input_dir.display());
    info!("Invoking the metadata workflow...");
    let result = metadata::run(&inputs, &config, &reporter)?;

    let written = result.write_all(&args.out_dir)?;
    info!("Wrote {} file(s) to {:?}", written.len(), &args.out_dir);

    println!(
        "✓ {} structure(s) processed, tables written to: {}",
        result.tables.structures.len(),
        args.out_dir.display()
    );
    if !result.bad_files.is_empty() {
        warn!(
            "{} structure file(s) could not be read; see bad_files.csv.",
            result.bad_files.len()
        );
        println!(
            "  {} unreadable file(s) listed in bad_files.csv ({} reported during the run)",
            result.bad_files.len(),
            progress_handler.bad_files()
        );
    }

    Ok(())
}
