//! JSON-RPC envelopes and the per-method request/response structures.
//!
//! Responses are decoded strictly: a record missing one of the requested
//! output fields fails at this boundary instead of deep in aggregation.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a P,
    pub auth: Option<&'a str>,
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

// ---------------------------------------------------------------------------
// user.login

#[derive(Debug, Serialize)]
pub struct LoginParams<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// ---------------------------------------------------------------------------
// hostgroup.get

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GroupFilterParam {
    #[serde(rename = "groupid")]
    GroupId(Vec<String>),
    #[serde(rename = "name")]
    Name(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct HostGroupGetParams {
    pub output: &'static [&'static str],
    pub filter: GroupFilterParam,
    #[serde(rename = "selectHosts")]
    pub select_hosts: &'static [&'static str],
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostGroupRecord {
    pub groupid: String,
    #[serde(default)]
    pub hosts: Vec<HostSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostSummary {
    pub hostid: String,
    pub host: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// host.get

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HostFilterParam {
    #[serde(rename = "hostid")]
    HostId(String),
    #[serde(rename = "host")]
    Host(String),
}

#[derive(Debug, Serialize)]
pub struct HostGetParams {
    pub output: &'static [&'static str],
    #[serde(rename = "selectInterfaces")]
    pub select_interfaces: &'static [&'static str],
    pub filter: HostFilterParam,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostDetailRecord {
    pub hostid: String,
    pub host: String,
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceRecord {
    pub ip: String,
}

// ---------------------------------------------------------------------------
// item.get

#[derive(Debug, Serialize)]
pub struct ItemKeyFilter<'a> {
    #[serde(rename = "key_")]
    pub key: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ItemGetParams<'a> {
    pub output: &'static [&'static str],
    pub hostids: &'a str,
    pub filter: ItemKeyFilter<'a>,
    pub sortfield: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ItemExtendParams<'a> {
    pub output: &'static str,
    pub hostids: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRow {
    pub itemid: String,
    pub name: String,
    #[serde(rename = "key_")]
    pub key: String,
}

// ---------------------------------------------------------------------------
// trend.get

#[derive(Debug, Serialize)]
pub struct TrendGetParams<'a> {
    pub output: &'static [&'static str],
    pub itemids: &'a [String],
    pub time_from: i64,
    pub time_till: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendRow {
    pub itemid: String,
    #[serde(deserialize_with = "int_from_str_or_number")]
    pub clock: i64,
    #[serde(deserialize_with = "int_from_str_or_number")]
    pub num: i64,
    #[serde(deserialize_with = "float_from_str_or_number")]
    pub value_min: f64,
    #[serde(deserialize_with = "float_from_str_or_number")]
    pub value_avg: f64,
    #[serde(deserialize_with = "float_from_str_or_number")]
    pub value_max: f64,
}

// The API encodes most numbers as JSON strings.
fn float_from_str_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {text:?}"))),
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| de::Error::custom("number out of range")),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn int_from_str_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {text:?}"))),
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| de::Error::custom("integer out of range")),
        other => Err(de::Error::custom(format!("expected an integer, got {other}"))),
    }
}
