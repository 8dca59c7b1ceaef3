// relation_evaluator.rs - Score detected HGT relations against reference relations

use clap::{Arg, ArgAction, Command};
use std::path::Path;

use hgtdist::core::evaluation::{evaluate, report_evaluation};
use hgtdist::data::read_nexus_file;
use hgtdist::output::write_summary;
use hgtdist::reporting::{ConsoleReporter, Reporter, Verbosity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("Relation Evaluator")
        .version(hgtdist::VERSION)
        .about("Compares hgtdist relation matrices with reference relations")
        .arg(Arg::new("result")
            .long("result")
            .value_name("FILE")
            .help("NEXUS file written by hgtdist (HGTRELATIONS block)")
            .required(true))
        .arg(Arg::new("reference")
            .long("reference")
            .value_name("FILE")
            .help("NEXUS file with reference relations (RELATIONS block, type=rcb preferred)")
            .required(true))
        .arg(Arg::new("output")
            .long("output")
            .value_name("FILE")
            .help("Write the evaluation counts as JSON"))
        .arg(Arg::new("verbose")
            .long("verbose")
            .short('v')
            .help("List every gene pair without a reference relation")
            .action(ArgAction::SetTrue))
        .get_matches();

    let result_path = matches
        .get_one::<String>("result")
        .ok_or("--result is required")?;
    let reference_path = matches
        .get_one::<String>("reference")
        .ok_or("--reference is required")?;
    let verbosity = if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let reporter = ConsoleReporter::new(verbosity);

    reporter.notice(&format!("🔬 {}", hgtdist::get_info()));
    reporter.notice("================================");
    reporter.notice(&format!("📂 Result: {}", result_path));
    reporter.notice(&format!("📂 Reference: {}", reference_path));

    let found = read_nexus_file(Path::new(result_path))
        .map_err(|e| format!("Failed to load result: {}", e))?;
    let reference = read_nexus_file(Path::new(reference_path))
        .map_err(|e| format!("Failed to load reference: {}", e))?;

    if found.relation_matrices.is_empty() {
        return Err(format!("No relation matrices found in {}", result_path).into());
    }
    reporter.notice(&format!(
        "✅ Loaded {} result and {} reference matrices",
        found.relation_matrices.len(),
        reference.relation_matrices.len()
    ));

    let report = evaluate(&found.relation_matrices, &reference.relation_matrices, &reporter)?;
    report_evaluation(&report, &reporter);

    if let Some(output_path) = matches.get_one::<String>("output") {
        let value = serde_json::to_value(&report)
            .map_err(|e| format!("Failed to serialize evaluation: {}", e))?;
        write_summary(output_path, &value, &reporter)?;
    }

    Ok(())
}
