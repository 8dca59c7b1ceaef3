// nexus.rs - NEXUS loader for gene-tree distance matrices and relation matrices

use crate::data::dataset::Dataset;
use crate::reporting::Reporter;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::str::FromStr;

/// "species/gene" label of a matrix row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneLabel {
    pub species: String,
    pub gene: String,
}

impl GeneLabel {
    pub fn parse(label: &str) -> Result<Self, String> {
        match label.split_once('/') {
            Some((species, gene)) if !species.is_empty() && !gene.is_empty() => Ok(Self {
                species: species.to_string(),
                gene: gene.to_string(),
            }),
            _ => Err(format!(
                "Malformed gene label '{}', expected species/gene",
                label
            )),
        }
    }
}

/// Which part of a square matrix the rows carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triangle {
    Lower,
    Upper,
    Both,
}

impl FromStr for Triangle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower" => Ok(Triangle::Lower),
            "upper" => Ok(Triangle::Upper),
            "both" => Ok(Triangle::Both),
            _ => Err(format!("Matrix format unknown: {}", s)),
        }
    }
}

/// Distance matrix of one gene tree, expanded to a full square matrix
#[derive(Debug, Clone)]
pub struct DistanceTree {
    pub name: String,
    pub labels: Vec<GeneLabel>,
    pub matrix: Vec<Vec<f64>>,
}

/// Relation matrix with cells in {-1, 0, 1}
#[derive(Debug, Clone)]
pub struct RelationMatrix {
    pub name: String,
    /// Value of the `type=` sub-command, if any
    pub kind: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<Vec<i8>>,
}

/// Everything this tool reads from a NEXUS file
#[derive(Debug, Clone, Default)]
pub struct NexusDocument {
    pub distance_trees: Vec<DistanceTree>,
    pub relation_matrices: Vec<RelationMatrix>,
}

/// Matrix command as it appears in a block, before numeric parsing
struct RawMatrix {
    name: String,
    kind: Option<String>,
    triangle: Triangle,
    start_line: usize,
    rows: Vec<(usize, String, Vec<String>)>,
}

enum ReaderState {
    Start,
    Outside,
    InBlock(String, Vec<(usize, String)>),
}

/// Open and parse a NEXUS file
pub fn read_nexus_file(path: &Path) -> Result<NexusDocument, String> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => format!("Couldn't find file {}", path.display()),
        _ => format!("Failed to open NEXUS file '{}': {}", path.display(), e),
    })?;
    read_nexus(BufReader::new(file))
}

/// Parse NEXUS text. Unknown blocks are skipped.
pub fn read_nexus<R: BufRead>(reader: R) -> Result<NexusDocument, String> {
    let begin_block = Regex::new(r"(?i)^BEGIN\s+([A-Z_]+)\s*;$")
        .map_err(|e| format!("Invalid BEGIN pattern: {}", e))?;

    let mut document = NexusDocument::default();
    let mut state = ReaderState::Start;
    let mut in_comment = false;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| format!("Failed to read line {}: {}", line_number, e))?;
        let line = strip_comments(&line, &mut in_comment);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        state = match state {
            ReaderState::Start => {
                if !line.eq_ignore_ascii_case("#NEXUS") {
                    return Err(format!(
                        "Line {}: File must start with #NEXUS",
                        line_number
                    ));
                }
                ReaderState::Outside
            }
            ReaderState::Outside => match begin_block.captures(line) {
                Some(captures) => ReaderState::InBlock(captures[1].to_uppercase(), Vec::new()),
                None => {
                    return Err(format!(
                        "Line {}: Error parsing BEGIN statement",
                        line_number
                    ))
                }
            },
            ReaderState::InBlock(name, mut lines) => {
                if line.eq_ignore_ascii_case("END;") || line.eq_ignore_ascii_case("ENDBLOCK;") {
                    read_block(&name, &lines, &mut document)?;
                    ReaderState::Outside
                } else {
                    lines.push((line_number, line.to_string()));
                    ReaderState::InBlock(name, lines)
                }
            }
        };
    }

    match state {
        ReaderState::Start => Err("File seems empty".to_string()),
        ReaderState::InBlock(name, _) => Err(format!(
            "Didn't close block {} at end of file",
            name
        )),
        ReaderState::Outside => Ok(document),
    }
}

/// Remove `[...]` comments; `in_comment` carries an open comment across lines.
fn strip_comments(line: &str, in_comment: &mut bool) -> String {
    let mut cleaned = String::with_capacity(line.len());
    for c in line.chars() {
        match (c, *in_comment) {
            (']', true) => *in_comment = false,
            (_, true) => {}
            ('[', false) => *in_comment = true,
            (_, false) => cleaned.push(c),
        }
    }
    cleaned
}

fn read_block(
    name: &str,
    lines: &[(usize, String)],
    document: &mut NexusDocument,
) -> Result<(), String> {
    match name {
        "ALLDISTANCES" => {
            for raw in collect_matrices(lines, "distances")? {
                if document.distance_trees.iter().any(|t| t.name == raw.name) {
                    return Err(format!(
                        "Line {}: Gene tree '{}' is defined more than once",
                        raw.start_line, raw.name
                    ));
                }
                document.distance_trees.push(to_distance_tree(raw)?);
            }
        }
        "RELATIONS" => {
            for raw in collect_matrices(lines, "relation")? {
                document.relation_matrices.push(to_relation_matrix(raw)?);
            }
        }
        "HGTRELATIONS" => {
            for raw in collect_matrices(lines, "hgtrelation")? {
                document.relation_matrices.push(to_relation_matrix(raw)?);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Walk the lines of a block and cut out every `command name=.. triangle=..`
/// matrix. Lines outside a matrix command are ignored.
fn collect_matrices(lines: &[(usize, String)], command: &str) -> Result<Vec<RawMatrix>, String> {
    let mut matrices = Vec::new();
    let mut config: Option<(usize, Option<String>, Option<Triangle>, Option<String>)> = None;
    let mut current: Option<RawMatrix> = None;

    for (line_number, line) in lines {
        let line_number = *line_number;

        if let Some(mut matrix) = current.take() {
            if line == ";" {
                matrices.push(matrix);
                continue;
            }
            let mut tokens = line.split_whitespace();
            let label = tokens.next().unwrap_or_default().to_string();
            let values: Vec<String> = tokens
                .map(|t| t.trim_end_matches(';'))
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
                .collect();
            matrix.rows.push((line_number, label, values));
            if line.ends_with(';') {
                matrices.push(matrix);
            } else {
                current = Some(matrix);
            }
            continue;
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if config.is_none() {
            if tokens.first().is_some_and(|t| t.eq_ignore_ascii_case(command)) {
                config = Some((line_number, None, None, None));
                tokens.remove(0);
            } else {
                continue;
            }
        }

        if let Some((start_line, mut name, mut triangle, mut kind)) = config.take() {
            for token in tokens {
                let (key, value) = token.split_once('=').ok_or_else(|| {
                    format!("Line {}: No data given to sub-command '{}'", line_number, token)
                })?;
                if value.is_empty() {
                    return Err(format!(
                        "Line {}: No data given to sub-command '{}'",
                        line_number, token
                    ));
                }
                match key.to_lowercase().as_str() {
                    "name" => name = Some(value.to_string()),
                    "triangle" => {
                        triangle = Some(
                            value
                                .parse::<Triangle>()
                                .map_err(|e| format!("Line {}: {}", line_number, e))?,
                        )
                    }
                    "type" => kind = Some(value.to_string()),
                    _ => {}
                }
            }

            match (name, triangle) {
                (Some(name), Some(triangle)) => {
                    current = Some(RawMatrix {
                        name,
                        kind,
                        triangle,
                        start_line,
                        rows: Vec::new(),
                    });
                }
                (name, triangle) => config = Some((start_line, name, triangle, kind)),
            }
        }
    }

    if let Some(matrix) = current {
        return Err(format!(
            "Line {}: Matrix '{}' is not terminated with ';'",
            matrix.start_line, matrix.name
        ));
    }
    if let Some((start_line, _, _, _)) = config {
        return Err(format!(
            "Line {}: {} command needs both name= and triangle=",
            start_line, command
        ));
    }
    Ok(matrices)
}

fn to_distance_tree(raw: RawMatrix) -> Result<DistanceTree, String> {
    let mut labels = Vec::with_capacity(raw.rows.len());
    let mut rows = Vec::with_capacity(raw.rows.len());

    for (line_number, label, values) in &raw.rows {
        labels.push(GeneLabel::parse(label).map_err(|e| {
            format!("Line {}: {} (gene tree {})", line_number, e, raw.name)
        })?);
        let parsed = values
            .iter()
            .map(|v| match v.parse::<f64>() {
                Ok(d) if !d.is_nan() => Ok(d),
                _ => Err(format!("Line {}: Cannot read number '{}'", line_number, v)),
            })
            .collect::<Result<Vec<f64>, String>>()?;
        rows.push((*line_number, parsed));
    }

    Ok(DistanceTree {
        matrix: expand_triangle(rows, raw.triangle)?,
        name: raw.name,
        labels,
    })
}

fn to_relation_matrix(raw: RawMatrix) -> Result<RelationMatrix, String> {
    let mut labels = Vec::with_capacity(raw.rows.len());
    let mut rows = Vec::with_capacity(raw.rows.len());

    for (line_number, label, values) in &raw.rows {
        labels.push(label.clone());
        let parsed = values
            .iter()
            .map(|v| match v.parse::<i8>() {
                Ok(r) if (-1..=1).contains(&r) => Ok(r),
                _ => Err(format!(
                    "Line {}: Invalid relation value '{}'",
                    line_number, v
                )),
            })
            .collect::<Result<Vec<i8>, String>>()?;
        rows.push((*line_number, parsed));
    }

    Ok(RelationMatrix {
        values: expand_triangle(rows, raw.triangle)?,
        name: raw.name,
        kind: raw.kind,
        labels,
    })
}

/// Expand triangular rows into a full symmetric matrix. A triangle row may
/// carry the diagonal or omit it; a missing diagonal defaults to zero.
fn expand_triangle<T: Copy + Default>(
    rows: Vec<(usize, Vec<T>)>,
    triangle: Triangle,
) -> Result<Vec<Vec<T>>, String> {
    let n = rows.len();
    let mut full = vec![vec![T::default(); n]; n];

    for (i, (line_number, values)) in rows.into_iter().enumerate() {
        let (expected, alternative) = match triangle {
            Triangle::Both => (n, n),
            Triangle::Lower => (i + 1, i),
            Triangle::Upper => (n - i, n - i - 1),
        };
        if values.len() != expected && values.len() != alternative {
            let wanted = if expected == alternative {
                expected.to_string()
            } else {
                format!("{} or {}", alternative, expected)
            };
            return Err(format!(
                "Line {}: Expected {} values, found {}",
                line_number,
                wanted,
                values.len()
            ));
        }

        match triangle {
            Triangle::Both => full[i] = values,
            Triangle::Lower => {
                for (j, value) in values.into_iter().enumerate() {
                    full[i][j] = value;
                    full[j][i] = value;
                }
            }
            Triangle::Upper => {
                let offset = if values.len() == n - i { i } else { i + 1 };
                for (k, value) in values.into_iter().enumerate() {
                    let j = offset + k;
                    full[i][j] = value;
                    full[j][i] = value;
                }
            }
        }
    }

    Ok(full)
}

impl Dataset {
    /// Load a dataset from the ALLDISTANCES block of a NEXUS file
    pub fn from_nexus_file(path: &Path, reporter: &dyn Reporter) -> Result<Self, String> {
        reporter.notice(&format!("📂 Loading gene distances: {}", path.display()));
        let document = read_nexus_file(path)?;
        if document.distance_trees.is_empty() {
            return Err(format!(
                "No ALLDISTANCES block with distance matrices found in {}",
                path.display()
            ));
        }
        let dataset = Dataset::from_distance_trees(&document.distance_trees)?;
        reporter.notice(&format!(
            "✅ NEXUS loaded: {} gene trees, {} species, {} genes",
            dataset.gene_trees.len(),
            dataset.species.len(),
            dataset.total_genes()
        ));
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<NexusDocument, String> {
        read_nexus(Cursor::new(text.as_bytes()))
    }

    #[test]
    fn test_read_full_matrix() {
        let doc = parse(
            "#NEXUS\n\
             [a comment]\n\
             BEGIN ALLDISTANCES;\n\
             \tdistances name=T1 triangle=both\n\
             \t\tA/1 0 1.5 2\n\
             \t\tB/1 1.5 0 3\n\
             \t\tC/1 2 3 0\n\
             \t;\n\
             END;\n",
        )
        .unwrap();

        assert_eq!(doc.distance_trees.len(), 1);
        let tree = &doc.distance_trees[0];
        assert_eq!(tree.name, "T1");
        assert_eq!(tree.labels[1], GeneLabel::parse("B/1").unwrap());
        assert_eq!(tree.matrix[0][1], 1.5);
        assert_eq!(tree.matrix[2][1], 3.0);
    }

    #[test]
    fn test_config_on_following_lines_and_inline_terminator() {
        let doc = parse(
            "#nexus\n\
             begin alldistances;\n\
             distances\n\
             name=T1\n\
             triangle=lower\n\
             A/1 0\n\
             B/1 4 0\n\
             C/1 5 6 0;\n\
             end;\n",
        )
        .unwrap();
        let tree = &doc.distance_trees[0];
        assert_eq!(tree.matrix[0][2], 5.0);
        assert_eq!(tree.matrix[1][2], 6.0);
        assert_eq!(tree.matrix[2][2], 0.0);
    }

    #[test]
    fn test_lower_triangle_without_diagonal() {
        let doc = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=lower\nA/1\nB/1 4\nC/1 5 6\n;\nEND;\n",
        )
        .unwrap();
        let m = &doc.distance_trees[0].matrix;
        assert_eq!(m[1][0], 4.0);
        assert_eq!(m[0][1], 4.0);
        assert_eq!(m[2][1], 6.0);
        assert_eq!(m[1][1], 0.0);
    }

    #[test]
    fn test_upper_triangle() {
        let doc = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=upper\nA/1 0 4 5\nB/1 0 6\nC/1 0\n;\nEND;\n",
        )
        .unwrap();
        let m = &doc.distance_trees[0].matrix;
        assert_eq!(m[0][1], 4.0);
        assert_eq!(m[2][0], 5.0);
        assert_eq!(m[2][1], 6.0);
    }

    #[test]
    fn test_multiline_comment_and_unknown_block() {
        let doc = parse(
            "#NEXUS\n\
             [multi\n\
             line comment]\n\
             BEGIN TAXA;\n\
             dimensions ntax=2;\n\
             END;\n\
             BEGIN ALLDISTANCES;\n\
             distances name=T1 triangle=both [inline]\n\
             A/1 0 1\n\
             B/1 1 0\n\
             ;\n\
             END;\n",
        )
        .unwrap();
        assert_eq!(doc.distance_trees.len(), 1);
        assert_eq!(doc.distance_trees[0].labels.len(), 2);
    }

    #[test]
    fn test_two_trees_in_one_block() {
        let doc = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\n\
             distances name=T1 triangle=both\nA/1 0 1\nB/1 1 0\n;\n\
             distances name=T2 triangle=both\nA/2 0 2\nB/2 2 0\n;\n\
             END;\n",
        )
        .unwrap();
        let names: Vec<&str> = doc.distance_trees.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2"]);
    }

    #[test]
    fn test_duplicate_tree_name_reports_line() {
        let err = parse(
            "#NEXUS\n\
             BEGIN ALLDISTANCES;\n\
             distances name=T1 triangle=both\n\
             A/1 0 1\n\
             B/1 1 0\n\
             ;\n\
             distances name=T1 triangle=both\n\
             A/2 0 1\n\
             B/2 1 0\n\
             ;\n\
             END;\n",
        )
        .unwrap_err();
        assert!(err.starts_with("Line 7:"), "{}", err);
        assert!(err.contains("T1"));
    }

    #[test]
    fn test_duplicate_tree_name_across_blocks() {
        let block = "BEGIN ALLDISTANCES;\n\
                     distances name=T1 triangle=lower\n\
                     A/1 0\n\
                     B/1 1 0;\n\
                     END;\n";
        let text = format!("#NEXUS\n{}{}", block, block);
        assert!(parse(&text).is_err());
    }

    #[test]
    fn test_relation_blocks() {
        let doc = parse(
            "#NEXUS\n\
             BEGIN RELATIONS;\n\
             relation type=rcb name=T1 triangle=both\n\
             A/1 0 -1\n\
             B/1 -1 0\n\
             ;\n\
             END;\n\
             BEGIN HGTRELATIONS;\n\
             hgtrelation\n\
             name=T1 triangle=both\n\
             A/1  0  1\n\
             B/1  1  0\n\
             ;\n\
             END;\n",
        )
        .unwrap();
        assert_eq!(doc.relation_matrices.len(), 2);
        assert_eq!(doc.relation_matrices[0].kind.as_deref(), Some("rcb"));
        assert_eq!(doc.relation_matrices[0].values[0][1], -1);
        assert_eq!(doc.relation_matrices[1].kind, None);
        assert_eq!(doc.relation_matrices[1].values[1][0], 1);
    }

    #[test]
    fn test_missing_header() {
        let err = parse("BEGIN ALLDISTANCES;\nEND;\n").unwrap_err();
        assert!(err.contains("Line 1"));
        assert!(err.contains("#NEXUS"));
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse("\n[only a comment]\n").unwrap_err(), "File seems empty");
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("#NEXUS\nBEGIN ALLDISTANCES;\n").unwrap_err();
        assert!(err.contains("Didn't close block"));
    }

    #[test]
    fn test_bad_begin_line() {
        let err = parse("#NEXUS\nBEGIN ALLDISTANCES\n").unwrap_err();
        assert!(err.starts_with("Line 2"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=both\nA/1 0 x\nB/1 1 0\n;\nEND;\n",
        )
        .unwrap_err();
        assert!(err.starts_with("Line 4"), "{}", err);
    }

    #[test]
    fn test_malformed_label_reports_line() {
        let err = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=both\nA1 0 1\nB/1 1 0\n;\nEND;\n",
        )
        .unwrap_err();
        assert!(err.starts_with("Line 4"), "{}", err);
    }

    #[test]
    fn test_unknown_triangle() {
        let err = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=diagonal\n;\nEND;\n",
        )
        .unwrap_err();
        assert!(err.contains("Matrix format unknown"));
    }

    #[test]
    fn test_sub_command_without_value() {
        let err = parse("#NEXUS\nBEGIN ALLDISTANCES;\ndistances name\nEND;\n").unwrap_err();
        assert!(err.contains("No data given"));
    }

    #[test]
    fn test_wrong_row_length() {
        let err = parse(
            "#NEXUS\nBEGIN ALLDISTANCES;\ndistances name=T triangle=both\nA/1 0 1 2\nB/1 1 0\n;\nEND;\n",
        )
        .unwrap_err();
        assert!(err.contains("Expected 2 values"), "{}", err);
    }

    #[test]
    fn test_missing_file() {
        let err = read_nexus_file(Path::new("/definitely/not/here.nex")).unwrap_err();
        assert!(err.starts_with("Couldn't find file"));
    }
}
