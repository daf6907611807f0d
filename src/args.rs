use clap::Parser;

/// This program reads outbreak reports and builds the data of an animated map of the cases.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file describing the input, the regions and the rules.
    /// For more information about the file format, read the manual of the outbreak_events crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The CSV file containing the events. Setting this option overrides the path
    /// that may be specified with the --config option. Defaults to H5N1_US_2024.csv.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (category name, optional) If specified, only the events of this category are put on the map.
    #[clap(long, value_parser)]
    pub category: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, outbreakdash will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 5) The number of rows of the input to display. 0 disables the preview.
    #[clap(long, value_parser)]
    pub preview: Option<usize>,

    /// If passed as an argument, prints the events of each category in chronological order.
    #[clap(long, takes_value = false)]
    pub timeline: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
