use clap::Parser;
use qh_core::PipelineConfig;
use qh_table::{exit_on_error, run_generate, GenerateCli};
use std::path::Path;

fn main() {
    qh_table::init_tracing();
    let cli = GenerateCli::parse();

    let config = exit_on_error(PipelineConfig::load(cli.config.as_deref()));
    exit_on_error(run_generate(&config, cli.curated.as_deref(), Path::new(".")));
}
