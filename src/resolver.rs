use std::collections::HashSet;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::api::{Session, Transport};
use crate::error::ZabbixError;
use crate::model::{GroupFilter, HostIdentifier, HostRecord, ItemRecord};
use crate::protocol::{
    HostDetailRecord, HostGetParams, HostGroupGetParams, HostGroupRecord, ItemExtendParams,
    ItemGetParams, ItemKeyFilter, ItemRow,
};

/// How the hosts of a report are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSelection {
    Hosts(Vec<HostIdentifier>),
    Groups(GroupFilter),
}

impl HostSelection {
    pub fn hosts<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        HostSelection::Hosts(
            tokens
                .into_iter()
                .filter(|t| !t.as_ref().trim().is_empty())
                .map(|t| HostIdentifier::classify(t.as_ref()))
                .collect(),
        )
    }

    pub fn groups<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        HostSelection::Groups(GroupFilter::classify(tokens))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HostSelection::Hosts(ids) => ids.is_empty(),
            HostSelection::Groups(filter) => filter.is_empty(),
        }
    }
}

fn host_from_detail(detail: HostDetailRecord) -> HostRecord {
    HostRecord {
        id: detail.hostid,
        name: detail.name,
        host: detail.host,
        ip: detail.interfaces.into_iter().next().map(|i| i.ip),
    }
}

/// Hosts of every matching group, in group order, with each host's primary
/// IP looked up separately. No matching group yields an empty list.
pub fn resolve_hosts<T: Transport>(
    session: &Session<T>,
    filter: &GroupFilter,
) -> Result<Vec<HostRecord>, ZabbixError> {
    let groups: Vec<HostGroupRecord> = session.call(
        "hostgroup.get",
        &HostGroupGetParams {
            output: &["groupid"],
            filter: filter.to_param(),
            select_hosts: &["hostid", "host", "name"],
        },
    )?;
    debug!("{} group(s) matched {:?}", groups.len(), filter.tokens());

    let mut seen: HashSet<String> = HashSet::new();
    let mut hosts = Vec::new();
    for summary in groups.into_iter().flat_map(|g| g.hosts) {
        if !seen.insert(summary.hostid.clone()) {
            continue;
        }
        let ip = match resolve_host_detail(session, &HostIdentifier::Id(summary.hostid.clone())) {
            Ok(Some(detail)) => detail.ip,
            Ok(None) => {
                warn!("Host {} has no detail record; IP left empty", summary.hostid);
                None
            }
            Err(err) => {
                warn!("IP lookup for host {} failed: {err}", summary.hostid);
                None
            }
        };
        hosts.push(HostRecord {
            id: summary.hostid,
            name: summary.name,
            host: summary.host,
            ip,
        });
    }
    Ok(hosts)
}

/// Look up a single host with its interfaces. `None` when nothing matches.
pub fn resolve_host_detail<T: Transport>(
    session: &Session<T>,
    identifier: &HostIdentifier,
) -> Result<Option<HostRecord>, ZabbixError> {
    let found: Vec<HostDetailRecord> = session.call(
        "host.get",
        &HostGetParams {
            output: &["hostid", "host", "name"],
            select_interfaces: &["ip"],
            filter: identifier.to_param(),
        },
    )?;
    Ok(found.into_iter().next().map(host_from_detail))
}

/// Items on `host_id` whose key is exactly one of `keys`, ordered by name.
pub fn resolve_items<T: Transport>(
    session: &Session<T>,
    host_id: &str,
    keys: &[String],
) -> Result<Vec<ItemRecord>, ZabbixError> {
    let rows: Vec<ItemRow> = session.call(
        "item.get",
        &ItemGetParams {
            output: &["itemid", "name", "key_"],
            hostids: host_id,
            filter: ItemKeyFilter { key: keys },
            sortfield: "name",
        },
    )?;
    Ok(rows
        .into_iter()
        .map(|row| ItemRecord {
            id: row.itemid,
            name: row.name,
            key: row.key,
        })
        .collect())
}

/// Field names available on the items of the given hosts, taken from the
/// first item returned.
pub fn list_item_fields<T: Transport>(
    session: &Session<T>,
    host_ids: &[String],
) -> Result<Vec<String>, ZabbixError> {
    let items: Vec<Map<String, Value>> = session.call(
        "item.get",
        &ItemExtendParams {
            output: "extend",
            hostids: host_ids,
        },
    )?;
    let mut fields: Vec<String> = items
        .into_iter()
        .next()
        .map(|item| item.into_iter().map(|(key, _)| key).collect())
        .unwrap_or_default();
    fields.sort();
    Ok(fields)
}

/// Resolve a selection to concrete hosts. Individually named hosts that
/// cannot be found are skipped with a warning; a failed group lookup is
/// returned as an error.
pub fn select_hosts<T: Transport>(
    session: &Session<T>,
    selection: &HostSelection,
) -> Result<Vec<HostRecord>, ZabbixError> {
    match selection {
        HostSelection::Groups(filter) => resolve_hosts(session, filter),
        HostSelection::Hosts(identifiers) => {
            let mut hosts = Vec::with_capacity(identifiers.len());
            for identifier in identifiers {
                let lookup = resolve_host_detail(session, identifier).and_then(|found| {
                    found.ok_or_else(|| ZabbixError::NotFound(format!("host {identifier}")))
                });
                match lookup {
                    Ok(host) => hosts.push(host),
                    Err(ZabbixError::NotFound(what)) => warn!("Skipping {what}: not found"),
                    Err(err) => warn!("Skipping host {identifier}: {err}"),
                }
            }
            Ok(hosts)
        }
    }
}
