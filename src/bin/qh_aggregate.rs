use clap::Parser;
use qh_core::PipelineConfig;
use qh_table::{exit_on_error, run_aggregate, AggregateCli};

fn main() {
    qh_table::init_tracing();
    let cli = AggregateCli::parse();

    let config = exit_on_error(PipelineConfig::load(cli.config.as_deref()));
    exit_on_error(run_aggregate(&config, &cli.captures));
}
