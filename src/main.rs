// main.rs - CLI entry point

use hgtdist::cli::Config;
use hgtdist::core::MINIMUM_GENES;
use hgtdist::output::write_summary;
use hgtdist::prelude::*;
use std::path::Path;
use std::time::Instant;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation_result = validate_args(&args)?;
    let reporter = ConsoleReporter::new(validation_result.verbosity);
    let engine_config = &validation_result.engine;

    reporter.notice(&format!("🚀 hgtdist v{}", hgtdist::VERSION));
    reporter.notice(&format!(
        "🎯 Percentage: {} | Run mode: {:?}",
        engine_config.percentage, engine_config.run_mode
    ));
    if !engine_config.multithreading {
        reporter.notice("🧵 Threads: 1 (multithreading disabled)");
    } else if let Some(n) = engine_config.threads {
        reporter.notice(&format!("🧵 Threads: {}", n));
    } else {
        reporter.notice(&format!(
            "🧵 Threads: {} (auto-detected)",
            rayon::current_num_threads()
        ));
    }

    let total_start = Instant::now();

    let mut dataset = Dataset::from_nexus_file(Path::new(&validation_result.input), &reporter)?;
    let stats = dataset.stats(MINIMUM_GENES);

    if args.dry_run {
        reporter.notice("✅ Dry run completed successfully");
        reporter.notice(&format!(
            "📊 Dataset: {} gene trees, {} species, {} genes",
            stats.gene_trees, stats.species, stats.genes
        ));
        reporter.notice(&format!(
            "📊 Genes per species: min {}, max {}, avg {:.2}",
            stats.min_genes_per_species, stats.max_genes_per_species, stats.avg_genes_per_species
        ));
        if stats.species_below_minimum > 0 {
            reporter.notice(&format!(
                "⚠️  {} species have less than {} genes and will be skipped",
                stats.species_below_minimum, MINIMUM_GENES
            ));
        }
        return Ok(());
    }

    let detection_start = Instant::now();
    let summary = run_detection(&mut dataset, engine_config, &reporter)?;
    let detection_elapsed = detection_start.elapsed();
    reporter.notice(&format!(
        "✅ Detection completed in {:.2}s: {} LESSER, {} HIGHER",
        detection_elapsed.as_secs_f64(),
        summary.count(RelationType::Lesser),
        summary.count(RelationType::Higher)
    ));

    write_relations(
        &validation_result.output,
        validation_result.output_format,
        &dataset,
        &summary.relations,
        &command_line,
        &reporter,
    )?;

    let total_elapsed = total_start.elapsed();

    if let Some(summary_path) = &args.summary {
        let report = serde_json::json!({
            "version": hgtdist::VERSION,
            "command": command_line,
            "generated": chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            "input": validation_result.input,
            "output": validation_result.output,
            "parameters": {
                "percentage": engine_config.percentage,
                "run_mode": engine_config.run_mode,
                "multithreading": engine_config.multithreading,
                "threads": engine_config.threads,
            },
            "dataset": stats,
            "processed_genes": summary.processed_genes,
            "total_genes": summary.total_genes,
            "skipped_species": summary.skipped_species,
            "candidates": {
                "lesser": summary.lesser_candidates,
                "higher": summary.higher_candidates,
            },
            "relations": summary.records(&dataset),
            "elapsed_seconds": total_elapsed.as_secs_f64(),
        });
        write_summary(summary_path, &report, &reporter)?;
    }

    reporter.notice("\n🎉 === HGTDIST COMPLETED SUCCESSFULLY ===");
    reporter.notice(&format!(
        "⏱️  Total execution time: {:.2}s",
        total_elapsed.as_secs_f64()
    ));
    reporter.notice(&format!(
        "📊 Relations found: {}",
        summary.relations.len()
    ));
    reporter.notice(&format!("📁 Output written to: {}", validation_result.output));
    reporter.notice(&format!("🔧 Command: {}", command_line));

    Ok(())
}
