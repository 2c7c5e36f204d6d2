//! Flow-graph preparation for the import diagram.
//!
//! Import rows are many (origin, period, quantity) records for a single
//! destination; the diagram wants one summed edge per origin plus a node list.
//! Origins keep their first-appearance order from the file so the rendering is
//! stable run to run, and the destination node exists even when no edge does.

use std::collections::HashMap;

use chrono::Datelike;

use crate::domain::{FlowEdge, FlowGraph, FlowRecord, FlowTotal};

/// Every import record flows into the same place.
pub const DEFAULT_DESTINATION: &str = "USA";

/// Keep only records whose period falls in `year`.
pub fn filter_year(records: &[FlowRecord], year: i32) -> Vec<FlowRecord> {
    records
        .iter()
        .filter(|r| r.period.year() == year)
        .cloned()
        .collect()
}

/// Keep only records from the named origins; an empty list keeps everything.
pub fn filter_origins(records: &[FlowRecord], origins: &[String]) -> Vec<FlowRecord> {
    if origins.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| origins.iter().any(|o| o == &r.origin))
        .cloned()
        .collect()
}

/// Distinct years present in the records, newest first.
pub fn available_years(records: &[FlowRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.period.year()).collect();
    years.sort_unstable();
    years.dedup();
    years.reverse();
    years
}

/// Collapse the records into one summed edge per origin.
///
/// Node order is origins by first appearance, destination appended last; an
/// origin that happens to equal the destination is not listed twice. Empty
/// input yields the destination-only graph with no edges.
pub fn build_flow_graph(records: &[FlowRecord], destination: &str) -> FlowGraph {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut sums: Vec<f64> = Vec::new();
    for record in records {
        match index.get(record.origin.as_str()) {
            Some(&i) => sums[i] += record.quantity,
            None => {
                index.insert(record.origin.as_str(), order.len());
                order.push(record.origin.clone());
                sums.push(record.quantity);
            }
        }
    }

    let mut nodes = order.clone();
    if !nodes.iter().any(|n| n == destination) {
        nodes.push(destination.to_string());
    }
    let edges = order
        .into_iter()
        .zip(sums)
        .map(|(origin, quantity)| FlowEdge {
            origin,
            destination: destination.to_string(),
            quantity,
        })
        .collect();

    FlowGraph { nodes, edges }
}

/// Total shipped quantity per origin, largest first.
///
/// Equal totals keep first-appearance order (stable sort).
pub fn rank_origin_totals(records: &[FlowRecord]) -> Vec<FlowTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<FlowTotal> = Vec::new();
    for record in records {
        match index.get(record.origin.as_str()) {
            Some(&i) => totals[i].quantity += record.quantity,
            None => {
                index.insert(record.origin.as_str(), totals.len());
                totals.push(FlowTotal {
                    origin: record.origin.clone(),
                    quantity: record.quantity,
                });
            }
        }
    }
    totals.sort_by(|a, b| {
        b.quantity
            .partial_cmp(&a.quantity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, origin: &str, quantity: f64) -> FlowRecord {
        FlowRecord {
            period: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            origin: origin.to_string(),
            quantity,
        }
    }

    #[test]
    fn edges_sum_per_origin_and_nodes_keep_first_seen_order() {
        let records = vec![
            rec(2024, 1, "Canada", 200.0),
            rec(2024, 1, "Saudi Arabia", 300.0),
            rec(2024, 2, "Canada", 300.0),
        ];
        let graph = build_flow_graph(&records, "USA");

        assert_eq!(graph.nodes, vec!["Canada", "Saudi Arabia", "USA"]);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].origin, "Canada");
        assert!((graph.edges[0].quantity - 500.0).abs() < 1e-12);
        assert_eq!(graph.edges[1].origin, "Saudi Arabia");
        assert!((graph.edges[1].quantity - 300.0).abs() < 1e-12);
        assert!(graph.edges.iter().all(|e| e.destination == "USA"));
    }

    #[test]
    fn empty_input_yields_destination_only_graph() {
        let graph = build_flow_graph(&[], "USA");
        assert_eq!(graph.nodes, vec!["USA"]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn origin_equal_to_destination_is_not_listed_twice() {
        let records = vec![rec(2024, 1, "USA", 10.0), rec(2024, 1, "Mexico", 5.0)];
        let graph = build_flow_graph(&records, "USA");
        assert_eq!(graph.nodes, vec!["USA", "Mexico"]);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn totals_rank_descending_with_stable_ties() {
        let records = vec![
            rec(2024, 1, "Mexico", 100.0),
            rec(2024, 1, "Canada", 400.0),
            rec(2024, 2, "Iraq", 100.0),
            rec(2024, 2, "Mexico", 50.0),
        ];
        let totals = rank_origin_totals(&records);
        let order: Vec<&str> = totals.iter().map(|t| t.origin.as_str()).collect();
        // Mexico and Iraq tie at 150/100? Mexico=150, Iraq=100: strict order.
        assert_eq!(order, vec!["Canada", "Mexico", "Iraq"]);

        let tied = vec![
            rec(2024, 1, "Nigeria", 70.0),
            rec(2024, 1, "Angola", 70.0),
        ];
        let totals = rank_origin_totals(&tied);
        let order: Vec<&str> = totals.iter().map(|t| t.origin.as_str()).collect();
        assert_eq!(order, vec!["Nigeria", "Angola"]);
    }

    #[test]
    fn year_and_origin_filters_subset_the_records() {
        let records = vec![
            rec(2023, 12, "Canada", 1.0),
            rec(2024, 1, "Canada", 2.0),
            rec(2024, 6, "Mexico", 3.0),
        ];
        assert_eq!(filter_year(&records, 2024).len(), 2);
        assert_eq!(filter_year(&records, 2022).len(), 0);

        let only = filter_origins(&records, &["Mexico".to_string()]);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].origin, "Mexico");
        assert_eq!(filter_origins(&records, &[]).len(), 3);
    }

    #[test]
    fn available_years_are_unique_and_newest_first() {
        let records = vec![
            rec(2022, 3, "Canada", 1.0),
            rec(2024, 1, "Canada", 1.0),
            rec(2022, 9, "Mexico", 1.0),
            rec(2023, 5, "Iraq", 1.0),
        ];
        assert_eq!(available_years(&records), vec![2024, 2023, 2022]);
        assert!(available_years(&[]).is_empty());
    }
}
