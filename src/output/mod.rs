// mod.rs - Output formatters module

use crate::data::dataset::Dataset;
use crate::data::loaders::nexus::RelationMatrix;
use crate::data::relation::{RelationRecord, RelationTuple};
use crate::reporting::Reporter;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Supported relation output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Nexus,
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nexus" | "nex" => Ok(OutputFormat::Nexus),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {}. Use: nexus, tsv, json", s)),
        }
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent).map_err(|e| {
            format!(
                "Failed to create parent directory '{}': {}",
                parent.display(),
                e
            )
        })?;
    }
    Ok(())
}

fn create_output(file_path: &str) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    Ok(BufWriter::new(file))
}

/// One square relation matrix per gene tree, rows in input gene order.
/// Cells hold -1 (LESSER), 0 (no relation) or 1 (HIGHER); the diagonal is 0.
pub fn build_relation_matrices(dataset: &Dataset, relations: &[RelationTuple]) -> Vec<RelationMatrix> {
    let mut matrices = Vec::with_capacity(dataset.gene_trees.len());
    let mut position = HashMap::new();

    for (t, tree) in dataset.gene_trees.iter().enumerate() {
        for (i, gene_ref) in tree.genes.iter().enumerate() {
            position.insert(*gene_ref, (t, i));
        }
        let n = tree.genes.len();
        matrices.push(RelationMatrix {
            name: tree.name.clone(),
            kind: None,
            labels: tree.genes.iter().map(|g| dataset.identifier(*g)).collect(),
            values: vec![vec![0; n]; n],
        });
    }

    for tuple in relations {
        if let (Some(&(t, i)), Some(&(u, j))) = (position.get(&tuple.first), position.get(&tuple.second)) {
            if t == u && i != j {
                let value = tuple.relation.matrix_value();
                matrices[t].values[i][j] = value;
                matrices[t].values[j][i] = value;
            }
        }
    }

    matrices
}

/// Write relation matrices as a NEXUS HGTRELATIONS block
pub fn write_nexus_to<W: Write>(
    writer: &mut W,
    matrices: &[RelationMatrix],
    command_line: &str,
) -> Result<(), String> {
    let map_err = |e: std::io::Error| format!("Write error: {}", e);

    writeln!(writer, "#NEXUS").map_err(map_err)?;
    writeln!(writer, "[Command: {}]", command_line).map_err(map_err)?;
    writeln!(
        writer,
        "[Generated: {}]",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(map_err)?;
    writeln!(writer, "[hgtdist v{}]", env!("CARGO_PKG_VERSION")).map_err(map_err)?;
    writeln!(writer).map_err(map_err)?;
    writeln!(writer, "BEGIN HGTRELATIONS;").map_err(map_err)?;
    writeln!(writer, "[LESSER=-1, EQUALORDEFAULT=0, GREATER=1]").map_err(map_err)?;

    for matrix in matrices {
        let width = matrix.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        writeln!(writer, "\thgtrelation").map_err(map_err)?;
        writeln!(writer, "\tname={} triangle=both", matrix.name).map_err(map_err)?;
        for (label, row) in matrix.labels.iter().zip(&matrix.values) {
            write!(writer, "\t\t{:<width$}", label, width = width).map_err(map_err)?;
            for value in row {
                write!(writer, " {:>2}", value).map_err(map_err)?;
            }
            writeln!(writer).map_err(map_err)?;
        }
        writeln!(writer, "\t;").map_err(map_err)?;
    }

    writeln!(writer, "END;").map_err(map_err)?;
    Ok(())
}

/// Write relations as tab-separated rows, one per confirmed pair
pub fn write_tsv_to<W: Write>(
    writer: &mut W,
    records: &[RelationRecord],
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(
        writer,
        "# Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# hgtdist v{}", env!("CARGO_PKG_VERSION"))
        .map_err(|e| format!("Write error: {}", e))?;

    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    tsv.write_record(["gene_tree", "first", "second", "relation"])
        .map_err(|e| format!("Write error: {}", e))?;
    for record in records {
        let relation = record.relation.to_string();
        tsv.write_record([
            record.gene_tree.as_str(),
            record.first.as_str(),
            record.second.as_str(),
            relation.as_str(),
        ])
        .map_err(|e| format!("Write error: {}", e))?;
    }
    tsv.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

/// Write relations as a pretty-printed JSON array
pub fn write_json_to<W: Write>(writer: &mut W, records: &[RelationRecord]) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut *writer, records)
        .map_err(|e| format!("Failed to serialize relations: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

/// Write confirmed relations to `file_path` in the requested format
pub fn write_relations(
    file_path: &str,
    format: OutputFormat,
    dataset: &Dataset,
    relations: &[RelationTuple],
    command_line: &str,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_output(file_path)?;

    match format {
        OutputFormat::Nexus => {
            let matrices = build_relation_matrices(dataset, relations);
            write_nexus_to(&mut writer, &matrices, command_line)?;
        }
        OutputFormat::Tsv => {
            let records: Vec<RelationRecord> = relations
                .iter()
                .map(|t| RelationRecord::from_tuple(dataset, t))
                .collect();
            write_tsv_to(&mut writer, &records, command_line)?;
        }
        OutputFormat::Json => {
            let records: Vec<RelationRecord> = relations
                .iter()
                .map(|t| RelationRecord::from_tuple(dataset, t))
                .collect();
            write_json_to(&mut writer, &records)?;
        }
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    reporter.notice(&format!("✅ Relations written to: {}", file_path));
    Ok(())
}

/// Write a JSON run summary
pub fn write_summary(
    file_path: &str,
    summary: &serde_json::Value,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_output(file_path)?;
    serde_json::to_writer_pretty(&mut writer, summary)
        .map_err(|e| format!("Failed to serialize summary: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    reporter.notice(&format!("📝 Summary written to: {}", file_path));
    Ok(())
}
