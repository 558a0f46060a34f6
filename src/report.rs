//! Joins resolved hosts with aggregated trend columns.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};

use crate::aggregate::{aggregate, fetch_trends};
use crate::api::{Session, Transport};
use crate::catalog::{
    CategoryOutput, MetricCategory, ReportDefinition, HOSTNAME_COLUMN, HOST_ID_COLUMN, IP_COLUMN,
};
use crate::error::ZabbixError;
use crate::model::{Aggregate, HostRecord};
use crate::resolver::resolve_items;
use crate::timeframe::ReportWindow;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub host: HostRecord,
    pub values: BTreeMap<String, Option<f64>>,
}

impl ReportRow {
    pub fn new(host: HostRecord) -> Self {
        Self {
            host,
            values: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, category: &MetricCategory, stats: Aggregate) {
        match category.output {
            CategoryOutput::Triple => {
                self.values.insert(format!("{} Min", category.label), stats.min);
                self.values.insert(format!("{} Avg", category.label), stats.avg);
                self.values.insert(format!("{} Max", category.label), stats.max);
            }
            CategoryOutput::AverageOnly => {
                self.values.insert(category.label.clone(), stats.avg);
            }
        }
    }

    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub window: ReportWindow,
    /// Export order, identity columns first.
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn header(&self) -> &[String] {
        &self.columns
    }

    /// Project a row through the fixed column order.
    pub fn cells(&self, row: &ReportRow) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|column| match column.as_str() {
                HOST_ID_COLUMN => CellValue::Text(row.host.id.clone()),
                HOSTNAME_COLUMN => CellValue::Text(row.host.name.clone()),
                IP_COLUMN => row
                    .host
                    .ip
                    .clone()
                    .map(CellValue::Text)
                    .unwrap_or(CellValue::Empty),
                other => row
                    .value(other)
                    .map(CellValue::Number)
                    .unwrap_or(CellValue::Empty),
            })
            .collect()
    }

    pub fn table(&self) -> Vec<Vec<CellValue>> {
        self.rows.iter().map(|row| self.cells(row)).collect()
    }
}

fn category_aggregate<T: Transport>(
    session: &Session<T>,
    host: &HostRecord,
    category: &MetricCategory,
    window: &ReportWindow,
    time_from: i64,
    time_till: i64,
) -> Result<Aggregate, ZabbixError> {
    let items = resolve_items(session, &host.id, &category.keys)?;
    if items.is_empty() {
        debug!("{}: no items for {}", host.name, category.label);
        return Ok(Aggregate::default());
    }
    let item_ids: Vec<String> = items.into_iter().map(|item| item.id).collect();
    let samples = fetch_trends(session, &item_ids, time_from, time_till)?;
    debug!(
        "{}: {} trend bucket(s) for {} over {} day(s)",
        host.name,
        samples.len(),
        category.label,
        window.total_days()
    );
    Ok(aggregate(&samples, category.scale))
}

fn build_row<T: Transport>(
    session: &Session<T>,
    host: &HostRecord,
    definition: &ReportDefinition,
    window: &ReportWindow,
    time_from: i64,
    time_till: i64,
) -> ReportRow {
    let mut row = ReportRow::new(host.clone());
    for category in &definition.categories {
        let stats =
            match category_aggregate(session, host, category, window, time_from, time_till) {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(
                        "{} ({}): {} left empty: {err}",
                        host.name, host.id, category.label
                    );
                    Aggregate::default()
                }
            };
        row.record(category, stats);
    }
    row
}

/// One row per host, in the order given. With `jobs > 1` hosts are spread
/// over a bounded pool of scoped threads and the rows are put back into
/// input order afterwards.
pub fn assemble<T: Transport>(
    session: &Session<T>,
    definition: &ReportDefinition,
    hosts: &[HostRecord],
    window: &ReportWindow,
    jobs: usize,
) -> anyhow::Result<Report> {
    let time_from = window.time_from()?;
    let time_till = window.time_till()?;
    info!(
        "Building {} for {} host(s), {} to {}",
        definition.title,
        hosts.len(),
        window.start_label(),
        window.end_label()
    );

    let workers = jobs.clamp(1, hosts.len().max(1));
    let rows: Vec<ReportRow> = if workers == 1 {
        hosts
            .iter()
            .map(|host| build_row(session, host, definition, window, time_from, time_till))
            .collect()
    } else {
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(host) = hosts.get(index) else {
                        break;
                    };
                    let row = build_row(session, host, definition, window, time_from, time_till);
                    if tx.send((index, row)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);
        let mut indexed: Vec<(usize, ReportRow)> = rx.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, row)| row).collect()
    };

    Ok(Report {
        title: definition.title.to_string(),
        window: *window,
        columns: definition.columns(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::catalog::ReportKind;
    use serde_json::{json, Value};

    fn host(id: &str, name: &str, ip: Option<&str>) -> HostRecord {
        HostRecord {
            id: id.to_string(),
            name: name.to_string(),
            host: name.to_lowercase(),
            ip: ip.map(|s| s.to_string()),
        }
    }

    fn cpu_only() -> ReportDefinition {
        let categories = vec![MetricCategory::triple("CPU", &["system.cpu.util"])];
        ReportDefinition {
            kind: ReportKind::Group,
            title: "Zabbix Report",
            file_stem: "test",
            metric_columns: vec!["CPU Min".into(), "CPU Avg".into(), "CPU Max".into()],
            categories,
        }
    }

    fn two_host_transport() -> ScriptedTransport {
        ScriptedTransport::new()
            .on("item.get", |params| {
                let item = match params["hostids"].as_str() {
                    Some("1") => "100",
                    Some("2") => "200",
                    _ => return Ok(json!([])),
                };
                Ok(json!([{"itemid": item, "name": "CPU utilization", "key_": "system.cpu.util"}]))
            })
            .on("trend.get", |params| {
                let bucket = match params["itemids"][0].as_str() {
                    Some("100") => ("10", "20", "30"),
                    _ => ("5", "15", "25"),
                };
                Ok(json!([{"itemid": params["itemids"][0], "clock": "1704067200", "num": "60",
                           "value_min": bucket.0, "value_avg": bucket.1, "value_max": bucket.2}]))
            })
    }

    #[test]
    fn two_hosts_one_bucket_each() {
        let session = two_host_transport().into_session();
        let hosts = vec![host("1", "Alpha", Some("10.0.0.1")), host("2", "Beta", None)];
        let window = ReportWindow::parse("2024-01-01", "2024-01-03").unwrap();

        let report = assemble(&session, &cpu_only(), &hosts, &window, 1).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.window.total_days(), 3);
        assert_eq!(
            report.header(),
            &["Host ID", "Hostname", "IP Address", "CPU Min", "CPU Avg", "CPU Max"]
        );
        assert_eq!(
            report.cells(&report.rows[0]),
            vec![
                CellValue::Text("1".into()),
                CellValue::Text("Alpha".into()),
                CellValue::Text("10.0.0.1".into()),
                CellValue::Number(10.0),
                CellValue::Number(20.0),
                CellValue::Number(30.0),
            ]
        );
        assert_eq!(
            report.cells(&report.rows[1]),
            vec![
                CellValue::Text("2".into()),
                CellValue::Text("Beta".into()),
                CellValue::Empty,
                CellValue::Number(5.0),
                CellValue::Number(15.0),
                CellValue::Number(25.0),
            ]
        );
    }

    #[test]
    fn host_without_items_still_gets_a_null_row() {
        let session = two_host_transport().into_session();
        let hosts = vec![host("1", "Alpha", None), host("9", "NoItems", None)];
        let window = ReportWindow::parse("2024-01-01", "2024-01-01").unwrap();

        let report = assemble(&session, &cpu_only(), &hosts, &window, 1).unwrap();

        assert_eq!(report.rows.len(), hosts.len());
        let empty = &report.rows[1];
        assert_eq!(empty.host.id, "9");
        assert_eq!(empty.values.get("CPU Min"), Some(&None));
        assert_eq!(empty.value("CPU Avg"), None);
        // No items means no trend.get for that host.
        let trend_calls = session
            .transport()
            .requests()
            .iter()
            .filter(|r| r["method"] == "trend.get")
            .count();
        assert_eq!(trend_calls, 1);
    }

    #[test]
    fn failures_for_one_host_do_not_abort_the_report() {
        let session = ScriptedTransport::new()
            .on("item.get", |params| {
                if params["hostids"] == "bad" {
                    return Err(ZabbixError::Transport("timed out".into()));
                }
                Ok(json!([{"itemid": "1", "name": "CPU", "key_": "system.cpu.util"}]))
            })
            .on("trend.get", |_| {
                Ok(json!([{"itemid": "1", "clock": "0", "num": "1",
                           "value_min": "0", "value_avg": "0", "value_max": "0"}]))
            })
            .into_session();
        let hosts = vec![host("bad", "Broken", None), host("ok", "Fine", None)];
        let window = ReportWindow::parse("2024-01-01", "2024-01-02").unwrap();

        let report = assemble(&session, &cpu_only(), &hosts, &window, 1).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].value("CPU Max"), None);
        assert_eq!(report.rows[1].value("CPU Max"), Some(0.0));
    }

    #[test]
    fn parallel_assembly_keeps_resolution_order() {
        let session = ScriptedTransport::new()
            .on("item.get", |params| {
                let id = params["hostids"].as_str().unwrap_or_default().to_string();
                Ok(json!([{"itemid": id, "name": "CPU", "key_": "system.cpu.util"}]))
            })
            .on("trend.get", |params| {
                let id: f64 = params["itemids"][0].as_str().unwrap_or("0").parse().unwrap();
                Ok(json!([{"itemid": params["itemids"][0], "clock": "0", "num": "1",
                           "value_min": id, "value_avg": id, "value_max": id}]))
            })
            .into_session();
        let hosts: Vec<HostRecord> = (0..25)
            .map(|i| host(&i.to_string(), &format!("host{i}"), None))
            .collect();
        let window = ReportWindow::parse("2024-01-01", "2024-01-31").unwrap();

        let report = assemble(&session, &cpu_only(), &hosts, &window, 4).unwrap();

        let ids: Vec<&str> = report.rows.iter().map(|r| r.host.id.as_str()).collect();
        let expected: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
        for (i, row) in report.rows.iter().enumerate() {
            assert_eq!(row.value("CPU Avg"), Some(i as f64));
        }
    }

    #[test]
    fn drive_rows_hold_gib_averages_in_column_order() {
        let session = ScriptedTransport::new()
            .on("item.get", |params| {
                let key = params["filter"]["key_"][0].as_str().unwrap_or_default();
                if !key.contains("[C:") {
                    return Ok(json!([]));
                }
                Ok(json!([{"itemid": key, "name": key, "key_": key}]))
            })
            .on("trend.get", |params| {
                let key = params["itemids"][0].as_str().unwrap_or_default();
                let gib: f64 = if key.ends_with("total]") {
                    100.0
                } else if key.ends_with("used]") {
                    60.0
                } else {
                    40.0
                };
                let bytes = Value::from(gib * 1_073_741_824.0);
                Ok(json!([{"itemid": key, "clock": "0", "num": "1",
                           "value_min": bytes, "value_avg": bytes, "value_max": bytes}]))
            })
            .into_session();
        let definition = ReportKind::Drive.definition();
        let window = ReportWindow::parse("2024-01-01", "2024-01-01").unwrap();
        let report = assemble(&session, &definition, &[host("1", "Win", None)], &window, 1).unwrap();

        let cells = report.cells(&report.rows[0]);
        assert_eq!(cells.len(), 15);
        assert_eq!(cells[3], CellValue::Number(60.0));
        assert_eq!(cells[4], CellValue::Number(40.0));
        assert_eq!(cells[5], CellValue::Number(100.0));
        assert!(cells[6..].iter().all(|c| *c == CellValue::Empty));
    }
}
