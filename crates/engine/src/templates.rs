//! The built-in template catalogue.
//!
//! A template names its sources and destinations; instantiating it yields
//! `sources → "Data Processor" → destinations`, linked in sequence.

use serde::Serialize;

use crate::graph::PipelineGraph;
use crate::models::{StageKind, StageSpec};
use crate::EngineError;

/// Label of the transform every template puts between its sources and
/// destinations.
pub const TEMPLATE_TRANSFORM: &str = "Data Processor";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub estimated_time: &'static str,
    pub rating: f32,
    pub uses: u32,
    pub sources: &'static [&'static str],
    pub destinations: &'static [&'static str],
}

impl Template {
    pub fn stage_specs(&self) -> Vec<StageSpec> {
        self.sources
            .iter()
            .map(|name| StageSpec::new(StageKind::Source, *name))
            .chain(std::iter::once(StageSpec::new(StageKind::Transform, TEMPLATE_TRANSFORM)))
            .chain(
                self.destinations
                    .iter()
                    .map(|name| StageSpec::new(StageKind::Destination, *name)),
            )
            .collect()
    }

    /// A fresh graph pre-populated from this template.
    pub fn instantiate(&self) -> PipelineGraph {
        PipelineGraph::from_specs(self.stage_specs(), true)
    }
}

static CATALOGUE: [Template; 6] = [
    Template {
        id: "1",
        name: "Customer 360 Analytics",
        description: "Complete customer data pipeline combining CRM, support tickets, and website analytics",
        category: "Analytics",
        estimated_time: "30 minutes",
        rating: 4.8,
        uses: 1247,
        sources: &["Salesforce", "Zendesk", "Google Analytics"],
        destinations: &["Snowflake", "PowerBI"],
    },
    Template {
        id: "2",
        name: "E-commerce Data Warehouse",
        description: "ETL pipeline for online retail data including orders, inventory, and customer behavior",
        category: "E-commerce",
        estimated_time: "45 minutes",
        rating: 4.6,
        uses: 892,
        sources: &["Shopify", "Stripe", "Facebook Ads"],
        destinations: &["BigQuery", "Tableau"],
    },
    Template {
        id: "3",
        name: "Financial Reporting Pipeline",
        description: "Automated financial data aggregation and reporting for compliance and analysis",
        category: "Finance",
        estimated_time: "60 minutes",
        rating: 4.9,
        uses: 634,
        sources: &["QuickBooks", "Stripe", "Bank APIs"],
        destinations: &["Oracle DB", "Excel"],
    },
    Template {
        id: "4",
        name: "Marketing Attribution Model",
        description: "Multi-touch attribution pipeline tracking customer journey across all channels",
        category: "Marketing",
        estimated_time: "40 minutes",
        rating: 4.7,
        uses: 567,
        sources: &["Google Ads", "Facebook Ads", "Email Platform"],
        destinations: &["Data Warehouse", "Analytics"],
    },
    Template {
        id: "5",
        name: "IoT Sensor Data Processing",
        description: "Real-time processing of IoT sensor data with anomaly detection and alerting",
        category: "IoT",
        estimated_time: "50 minutes",
        rating: 4.5,
        uses: 423,
        sources: &["MQTT", "InfluxDB", "Kafka"],
        destinations: &["TimescaleDB", "Grafana"],
    },
    Template {
        id: "6",
        name: "HR Analytics Dashboard",
        description: "Employee data pipeline for HR metrics, performance tracking, and workforce analytics",
        category: "HR",
        estimated_time: "35 minutes",
        rating: 4.4,
        uses: 389,
        sources: &["BambooHR", "Slack", "Jira"],
        destinations: &["Data Warehouse", "Looker"],
    },
];

pub fn catalogue() -> &'static [Template] {
    &CATALOGUE
}

/// Look a template up by id or by exact (case-insensitive) name.
pub fn find(key: &str) -> Result<&'static Template, EngineError> {
    CATALOGUE
        .iter()
        .find(|t| t.id == key || t.name.eq_ignore_ascii_case(key))
        .ok_or_else(|| EngineError::UnknownTemplate(key.to_owned()))
}

pub fn by_category(category: &str) -> Vec<&'static Template> {
    CATALOGUE
        .iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category))
        .collect()
}

/// Templates whose name or description contains `query`, ignoring case.
pub fn search(query: &str) -> Vec<&'static Template> {
    let needle = query.to_lowercase();
    CATALOGUE
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle) || t.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Templates passing both filters; a missing filter passes everything.
pub fn filter(category: Option<&str>, query: Option<&str>) -> Vec<&'static Template> {
    let hits = match query {
        Some(query) => search(query),
        None => CATALOGUE.iter().collect(),
    };
    match category {
        Some(category) => hits
            .into_iter()
            .filter(|t| t.category.eq_ignore_ascii_case(category))
            .collect(),
        None => hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiate_orders_sources_processor_destinations() {
        let graph = find("2").unwrap().instantiate();

        let labels: Vec<&str> = graph.list_stages().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Shopify", "Stripe", "Facebook Ads", "Data Processor", "BigQuery", "Tableau"]
        );
        assert_eq!(graph.list_stages()[3].kind(), StageKind::Transform);
        assert_eq!(graph.list_stages()[4].kind(), StageKind::Destination);
        assert_eq!(graph.links().len(), 5);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        assert_eq!(find("hr analytics dashboard").unwrap().id, "6");
        assert!(matches!(find("nope"), Err(EngineError::UnknownTemplate(_))));
    }

    #[test]
    fn category_filter_and_search() {
        assert_eq!(by_category("analytics").len(), 1);
        let hits: Vec<&str> = search("ANOMALY").iter().map(|t| t.id).collect();
        assert_eq!(hits, vec!["5"]);
    }

    #[test]
    fn category_and_search_combine() {
        let ids = |hits: Vec<&'static Template>| hits.iter().map(|t| t.id).collect::<Vec<_>>();

        assert_eq!(ids(filter(None, Some("analytics"))), vec!["1", "6"]);
        assert_eq!(ids(filter(Some("hr"), Some("analytics"))), vec!["6"]);
        assert!(filter(Some("Finance"), Some("analytics")).is_empty());
        assert_eq!(filter(None, None).len(), catalogue().len());
    }
}
