// relation.rs - Relation types and canonical gene pairs

use crate::data::dataset::{Dataset, GeneRef};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Direction of a detected transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationType {
    Higher,
    Equal,
    Lesser,
}

impl RelationType {
    /// Cell value used in relation matrices
    pub fn matrix_value(&self) -> i8 {
        match self {
            RelationType::Lesser => -1,
            RelationType::Equal => 0,
            RelationType::Higher => 1,
        }
    }

    pub fn from_matrix_value(value: i8) -> Option<Self> {
        match value {
            -1 => Some(RelationType::Lesser),
            0 => Some(RelationType::Equal),
            1 => Some(RelationType::Higher),
            _ => None,
        }
    }
}

impl Display for RelationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelationType::Higher => "HIGHER",
            RelationType::Equal => "EQUAL",
            RelationType::Lesser => "LESSER",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "higher" | "greater" => Ok(RelationType::Higher),
            "equal" => Ok(RelationType::Equal),
            "lesser" => Ok(RelationType::Lesser),
            _ => Err(format!("Invalid relation type: {}. Use: lesser, equal, higher", s)),
        }
    }
}

/// Unordered gene pair with a direction tag.
///
/// The pair is canonicalised on construction: `first` is the gene whose
/// "species/id" identifier sorts lower, so equality and lookups do not
/// depend on the order the genes were given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationTuple {
    pub first: GeneRef,
    pub second: GeneRef,
    pub relation: RelationType,
}

impl RelationTuple {
    pub fn new(dataset: &Dataset, a: GeneRef, b: GeneRef, relation: RelationType) -> Self {
        let (first, second) = if dataset.identifier(a) <= dataset.identifier(b) {
            (a, b)
        } else {
            (b, a)
        };
        Self {
            first,
            second,
            relation,
        }
    }

    pub fn contains_genes(&self, a: GeneRef, b: GeneRef) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }

    /// Human readable form, e.g. `A/1 with C/1 (LESSER)`
    pub fn describe(&self, dataset: &Dataset) -> String {
        format!(
            "{} with {} ({}), gene tree {}",
            dataset.identifier(self.first),
            dataset.identifier(self.second),
            self.relation,
            dataset.gene(self.first).gene_tree
        )
    }
}

/// Serializable view of a confirmed relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub gene_tree: String,
    pub first: String,
    pub second: String,
    pub relation: RelationType,
}

impl RelationRecord {
    pub fn from_tuple(dataset: &Dataset, tuple: &RelationTuple) -> Self {
        Self {
            gene_tree: dataset.gene(tuple.first).gene_tree.clone(),
            first: dataset.identifier(tuple.first),
            second: dataset.identifier(tuple.second),
            relation: tuple.relation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loaders::nexus::{DistanceTree, GeneLabel};

    fn dataset() -> Dataset {
        let tree = DistanceTree {
            name: "T1".to_string(),
            labels: vec![
                GeneLabel::parse("B/1").unwrap(),
                GeneLabel::parse("A/1").unwrap(),
            ],
            matrix: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
        };
        Dataset::from_distance_trees(&[tree]).unwrap()
    }

    #[test]
    fn test_tuple_is_canonical() {
        let dataset = dataset();
        let a = dataset.find_gene("A/1").unwrap();
        let b = dataset.find_gene("B/1").unwrap();

        let forward = RelationTuple::new(&dataset, a, b, RelationType::Lesser);
        let backward = RelationTuple::new(&dataset, b, a, RelationType::Lesser);
        assert_eq!(forward, backward);
        assert_eq!(forward.first, a);
        assert!(forward.contains_genes(a, b));
        assert!(forward.contains_genes(b, a));
    }

    #[test]
    fn test_matrix_values() {
        for relation in [RelationType::Lesser, RelationType::Equal, RelationType::Higher] {
            assert_eq!(
                RelationType::from_matrix_value(relation.matrix_value()),
                Some(relation)
            );
        }
        assert_eq!(RelationType::from_matrix_value(2), None);
    }

    #[test]
    fn test_parse_relation_type() {
        assert_eq!("LESSER".parse::<RelationType>().unwrap(), RelationType::Lesser);
        assert_eq!("greater".parse::<RelationType>().unwrap(), RelationType::Higher);
        assert!("sideways".parse::<RelationType>().is_err());
    }

    #[test]
    fn test_record_serializes_uppercase() {
        let dataset = dataset();
        let a = dataset.find_gene("A/1").unwrap();
        let b = dataset.find_gene("B/1").unwrap();
        let tuple = RelationTuple::new(&dataset, b, a, RelationType::Higher);
        let record = RelationRecord::from_tuple(&dataset, &tuple);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"gene_tree":"T1","first":"A/1","second":"B/1","relation":"HIGHER"}"#
        );
    }
}
