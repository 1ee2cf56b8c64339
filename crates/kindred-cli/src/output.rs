//! Output formatting utilities

use kindred_core::{Ancestor, AncestorSet, Classification, Lineage, Path, SnapshotStats};
use kindred_query::PathResponse;
use kindred_store::SnapshotInfo;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Print `data` as JSON, or the table rendering otherwise
pub fn emit<T: Serialize>(
    data: &T,
    format: OutputFormat,
    table: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Table => print!("{}", table(data)),
    }
    Ok(())
}

fn lineage_tags(lineages: &[Lineage]) -> String {
    let mut tags: Vec<&str> = lineages
        .iter()
        .filter(|l| !l.is_biological())
        .map(|l| match (l.adoptive, l.step) {
            (true, true) => "adoptive+step",
            (true, false) => "adoptive",
            _ => "step",
        })
        .collect();
    tags.sort_unstable();
    tags.dedup();
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

fn path_lines(path: &Path, out: &mut String) {
    for step in &path.steps {
        match step.via {
            None => out.push_str(&format!("  {}\n", step.individual)),
            Some(hop) => out.push_str(&format!(
                "  -> {} ({}) {}\n",
                hop.direction,
                hop.kind,
                step.individual
            )),
        }
    }
}

pub fn path_table(response: &PathResponse) -> String {
    let mut out = String::new();
    let Some(first) = response.path() else {
        return out;
    };
    let count = response.paths.len();
    out.push_str(&format!(
        "Path from {} to {} ({} edges):\n",
        first.start, first.end, response.length
    ));
    for (i, path) in response.paths.iter().enumerate() {
        if count > 1 {
            out.push_str(&format!("Path {}:\n", i + 1));
        }
        path_lines(path, &mut out);
    }
    if response.truncated {
        out.push_str("(more shortest paths exist)\n");
    }
    out
}

pub fn classification_table(classification: &Classification) -> String {
    let mut out = String::new();
    for result in &classification.results {
        out.push_str(&format!(
            "{} is {}'s {}",
            classification.a, classification.b, result.label
        ));
        if !result.via.is_empty() {
            let via: Vec<&str> = result.via.iter().map(|id| id.as_str()).collect();
            out.push_str(&format!(" (via {})", via.join(", ")));
        }
        out.push('\n');
    }
    out
}

pub fn common_ancestors_table(set: &AncestorSet) -> String {
    let mut out = format!(
        "Common ancestors of {} and {} (combined distance {}):\n",
        set.a, set.b, set.combined_distance
    );
    for member in &set.members {
        out.push_str(&format!(
            "  {}  generations {}/{}{}\n",
            member.ancestor,
            member.generations_a,
            member.generations_b,
            lineage_tags(&[member.lineages_a.as_slice(), member.lineages_b.as_slice()].concat())
        ));
    }
    out
}

pub fn ancestors_table(ancestors: &Vec<Ancestor>) -> String {
    if ancestors.is_empty() {
        return "No ancestors recorded\n".to_string();
    }
    ancestors
        .iter()
        .map(|a| format!("  {:>3}  {}{}\n", a.generations, a.ancestor, lineage_tags(&a.lineages)))
        .collect()
}

/// Counts for the published snapshot alongside its publication metadata
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub snapshot: SnapshotInfo,
    #[serde(flatten)]
    pub stats: SnapshotStats,
}

pub fn stats_table(report: &GraphReport) -> String {
    let stats = &report.stats;
    let mut out = format!(
        "Version:      {} (published {})\nIndividuals:  {}\nEdges:        {}\n",
        report.snapshot.version, report.snapshot.published_at, stats.individuals, stats.edges
    );
    for (kind, count) in &stats.edges_by_kind {
        out.push_str(&format!("  {:<18} {}\n", kind.as_str(), count));
    }
    out.push_str(&format!(
        "Founders:     {}\nMulti-parent: {}\nMax parents:  {}\nMax children: {}\n",
        stats.founders, stats.multi_parent, stats.max_parents, stats.max_children
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::{
        AncestorOptions, PathFinder, PathOptions, RelationshipClassifier, RelationshipEdge,
        SearchBudget, Snapshot,
    };

    fn snapshot() -> Snapshot {
        Snapshot::load(
            ["mum", "kid"],
            vec![RelationshipEdge::adoptive("mum", "kid")],
        )
        .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Table);
    }

    #[test]
    fn test_path_table() {
        let path = PathFinder::shortest_path(
            &snapshot(),
            &"kid".into(),
            &"mum".into(),
            &PathOptions::default(),
            &SearchBudget::unlimited(),
        )
        .unwrap();
        let table = path_table(&PathResponse {
            length: path.length,
            paths: vec![path],
            truncated: false,
        });
        assert!(table.starts_with("Path from kid to mum (1 edges):"));
        assert!(table.contains("-> up (adoptive-parent) mum"));
    }

    #[test]
    fn test_classification_table() {
        let classification = RelationshipClassifier::classify(
            &snapshot(),
            &"mum".into(),
            &"kid".into(),
            &AncestorOptions::default(),
            &SearchBudget::unlimited(),
        )
        .unwrap();
        assert_eq!(
            classification_table(&classification),
            "mum is kid's adoptive parent (via mum)\n"
        );
    }
}
