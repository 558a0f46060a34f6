//! Report definitions: which item keys feed each metric category, how each
//! category turns into columns, and the fixed column order of each report.

use strum::{Display, EnumIter, EnumString};

use crate::units::ValueScale;

pub const HOST_ID_COLUMN: &str = "Host ID";
pub const HOSTNAME_COLUMN: &str = "Hostname";
pub const IP_COLUMN: &str = "IP Address";
pub const IDENTITY_COLUMNS: [&str; 3] = [HOST_ID_COLUMN, HOSTNAME_COLUMN, IP_COLUMN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutput {
    /// `<label> Min`, `<label> Avg`, `<label> Max`.
    Triple,
    /// A single `<label>` column holding the average.
    AverageOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCategory {
    pub label: String,
    /// Literal item keys; matched exactly, never as wildcards.
    pub keys: Vec<String>,
    pub output: CategoryOutput,
    pub scale: ValueScale,
}

impl MetricCategory {
    pub fn triple(label: &str, keys: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            output: CategoryOutput::Triple,
            scale: ValueScale::Identity,
        }
    }

    pub fn gib_average(label: &str, key: &str) -> Self {
        Self {
            label: label.to_string(),
            keys: vec![key.to_string()],
            output: CategoryOutput::AverageOnly,
            scale: ValueScale::BytesToGib,
        }
    }

    pub fn columns(&self) -> Vec<String> {
        match self.output {
            CategoryOutput::Triple => vec![
                format!("{} Min", self.label),
                format!("{} Avg", self.label),
                format!("{} Max", self.label),
            ],
            CategoryOutput::AverageOnly => vec![self.label.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    /// CPU, memory and disk utilisation for individually named hosts.
    Host,
    /// CPU and memory utilisation for every host in the given groups.
    Group,
    /// Per-drive used/available/total GiB for every host in the given groups.
    Drive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub kind: ReportKind,
    pub title: &'static str,
    pub file_stem: &'static str,
    /// Fetch order.
    pub categories: Vec<MetricCategory>,
    /// Metric columns in the order they are exported.
    pub metric_columns: Vec<String>,
}

impl ReportDefinition {
    pub fn columns(&self) -> Vec<String> {
        IDENTITY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.metric_columns.iter().cloned())
            .collect()
    }
}

const CPU_KEYS: &[&str] = &["system.cpu.util"];
const MEMORY_KEYS: &[&str] = &["vm.memory.util", "vm.memory.utilization"];
const DISK_KEYS: &[&str] = &[
    r#"perf_counter_en["\PhysicalDisk(0 C:)\% Idle Time",60]"#,
    "vfs.dev.util[sda]",
];
const DRIVES: &[&str] = &["C", "D", "E", "F"];

fn triple_columns(categories: &[MetricCategory]) -> Vec<String> {
    categories.iter().flat_map(MetricCategory::columns).collect()
}

fn drive_categories() -> Vec<MetricCategory> {
    let mut categories = Vec::new();
    for drive in DRIVES {
        for (label, mode) in [("Total", "total"), ("Used", "used"), ("Available", "free")] {
            categories.push(MetricCategory::gib_average(
                &format!("{drive}: {label}(GB)"),
                &format!("vfs.fs.dependent.size[{drive}:,{mode}]"),
            ));
        }
    }
    categories
}

fn drive_columns() -> Vec<String> {
    DRIVES
        .iter()
        .flat_map(|drive| {
            ["Used", "Available", "Total"]
                .into_iter()
                .map(move |label| format!("{drive}: {label}(GB)"))
        })
        .collect()
}

impl ReportKind {
    pub fn definition(self) -> ReportDefinition {
        match self {
            ReportKind::Host => {
                let categories = vec![
                    MetricCategory::triple("CPU", CPU_KEYS),
                    MetricCategory::triple("Memory", MEMORY_KEYS),
                    MetricCategory::triple("Disk", DISK_KEYS),
                ];
                ReportDefinition {
                    kind: self,
                    title: "Zabbix Report",
                    file_stem: "Zabbix_report",
                    metric_columns: triple_columns(&categories),
                    categories,
                }
            }
            ReportKind::Group => {
                let categories = vec![
                    MetricCategory::triple("CPU", CPU_KEYS),
                    MetricCategory::triple("Memory", MEMORY_KEYS),
                ];
                ReportDefinition {
                    kind: self,
                    title: "Zabbix Report",
                    file_stem: "Report-Servers-CPU-MEM-New",
                    metric_columns: triple_columns(&categories),
                    categories,
                }
            }
            ReportKind::Drive => ReportDefinition {
                kind: self,
                title: "Drive Report",
                file_stem: "Report-Servers-W-Disk-New",
                categories: drive_categories(),
                metric_columns: drive_columns(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn host_report_columns_are_fixed() {
        let definition = ReportKind::Host.definition();
        assert_eq!(
            definition.columns(),
            vec![
                "Host ID", "Hostname", "IP Address", "CPU Min", "CPU Avg", "CPU Max",
                "Memory Min", "Memory Avg", "Memory Max", "Disk Min", "Disk Avg", "Disk Max",
            ]
        );
        assert_eq!(definition.file_stem, "Zabbix_report");
        assert_eq!(
            definition.categories[2].keys[0],
            "perf_counter_en[\"\\PhysicalDisk(0 C:)\\% Idle Time\",60]"
        );
    }

    #[test]
    fn memory_keys_are_distinct_literals() {
        let definition = ReportKind::Group.definition();
        assert_eq!(
            definition.categories[1].keys,
            vec!["vm.memory.util", "vm.memory.utilization"]
        );
        assert_eq!(definition.columns().len(), 9);
    }

    #[test]
    fn drive_columns_are_used_available_total() {
        let definition = ReportKind::Drive.definition();
        let columns = definition.columns();
        assert_eq!(columns.len(), 3 + 12);
        assert_eq!(
            &columns[3..6],
            &["C: Used(GB)", "C: Available(GB)", "C: Total(GB)"]
        );
        assert_eq!(columns.last().unwrap(), "F: Total(GB)");

        let available = definition
            .categories
            .iter()
            .find(|c| c.label == "D: Available(GB)")
            .unwrap();
        assert_eq!(available.keys, vec!["vfs.fs.dependent.size[D:,free]"]);
        assert_eq!(available.scale, ValueScale::BytesToGib);
        assert_eq!(available.output, CategoryOutput::AverageOnly);
    }

    #[test]
    fn every_metric_column_is_produced_by_a_category() {
        for kind in ReportKind::iter() {
            let definition = kind.definition();
            assert_eq!(definition.kind, kind);
            let produced: HashSet<String> = definition
                .categories
                .iter()
                .flat_map(MetricCategory::columns)
                .collect();
            let exported: HashSet<String> = definition.metric_columns.iter().cloned().collect();
            assert_eq!(produced, exported, "{kind}");
            assert_eq!(exported.len(), definition.metric_columns.len(), "{kind}");
        }
    }

    #[test]
    fn kinds_parse_and_display_lowercase() {
        assert_eq!(ReportKind::Drive.to_string(), "drive");
        assert_eq!(ReportKind::from_str("group").unwrap(), ReportKind::Group);
    }
}
