mod args;
mod dash;

use clap::Parser;
use log::{debug, LevelFilter};

use crate::args::Args;
use crate::dash::{report_error, run_dashboard, DashOptions};

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    debug!("args: {:?}", args);

    let opts = DashOptions {
        config: args.config,
        input: args.input,
        category: args.category,
        out: args.out,
        preview: args.preview,
        timeline: args.timeline,
        reference: args.reference,
    };

    if let Err(e) = run_dashboard(&opts) {
        report_error(&e);
        std::process::exit(1);
    }
}
