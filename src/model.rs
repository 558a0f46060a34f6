use serde::Serialize;

use crate::protocol::{GroupFilterParam, HostFilterParam};

/// Opaque token returned by `user.login`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Host-group selection: either every token is a numeric group ID, or the
/// whole list is treated as group names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    Ids(Vec<String>),
    Names(Vec<String>),
}

impl GroupFilter {
    pub fn classify<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !tokens.is_empty() && tokens.iter().all(|t| is_numeric_token(t)) {
            GroupFilter::Ids(tokens)
        } else {
            GroupFilter::Names(tokens)
        }
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            GroupFilter::Ids(tokens) | GroupFilter::Names(tokens) => tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }

    pub(crate) fn to_param(&self) -> GroupFilterParam {
        match self {
            GroupFilter::Ids(ids) => GroupFilterParam::GroupId(ids.clone()),
            GroupFilter::Names(names) => GroupFilterParam::Name(names.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostIdentifier {
    Id(String),
    Name(String),
}

impl HostIdentifier {
    pub fn classify(token: &str) -> Self {
        let token = token.trim();
        if is_numeric_token(token) {
            HostIdentifier::Id(token.to_string())
        } else {
            HostIdentifier::Name(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HostIdentifier::Id(value) | HostIdentifier::Name(value) => value,
        }
    }

    pub(crate) fn to_param(&self) -> HostFilterParam {
        match self {
            HostIdentifier::Id(id) => HostFilterParam::HostId(id.clone()),
            HostIdentifier::Name(name) => HostFilterParam::Host(name.clone()),
        }
    }
}

impl std::fmt::Display for HostIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    pub id: String,
    /// Visible name (`name` in the API).
    pub name: String,
    /// Technical name (`host` in the API).
    pub host: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub key: String,
}

/// One trend bucket as returned by `trend.get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSample {
    pub item_id: String,
    pub clock: i64,
    pub count: i64,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Reduced min/avg/max for one host and metric category. All three are
/// `None` when there was no data; zero is a real measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}
