// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// hgtdist - Distribution-based detection of horizontal gene transfer
pub struct Args {
    /// input NEXUS file with an ALLDISTANCES block
    #[argh(option, short = 'i')]
    pub input: Option<String>,

    /// output file (default: output.nex)
    #[argh(option, short = 'o')]
    pub output: Option<String>,

    /// fraction of the sibling distribution treated as anomalous (0.0-1.0, default: 0.05)
    #[argh(option, short = 'p', default = "0.05")]
    pub percentage: f64,

    /// evaluate species sequentially on the calling thread
    #[argh(switch)]
    pub disable_multithreading: bool,

    /// number of worker threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// relation directions to scan: lesser, higher, both (default: both)
    #[argh(option, default = "String::from(\"both\")")]
    pub run_mode: String,

    /// only print severe messages
    #[argh(switch, short = 's')]
    pub silent: bool,

    /// also print every potential candidate
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// output format: nexus, tsv, json (default: nexus)
    #[argh(option, default = "String::from(\"nexus\")")]
    pub format: String,

    /// seconds between progress reports (default: 30)
    #[argh(option, default = "30")]
    pub progress_interval: u64,

    /// write a JSON run summary to this file
    #[argh(option)]
    pub summary: Option<String>,

    /// load and validate the input, print dataset statistics and exit
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
