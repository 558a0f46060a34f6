pub mod aggregate;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod cli_helpers;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod protocol;
pub mod report;
pub mod resolver;
pub mod timeframe;
pub mod units;

pub use aggregate::{aggregate, fetch_trends};
pub use api::{ApiClient, HttpTransport, Session, Transport};
pub use catalog::{ReportDefinition, ReportKind};
pub use config::AppConfig;
pub use error::ZabbixError;
pub use model::{Aggregate, GroupFilter, HostIdentifier, HostRecord, ItemRecord, TrendSample};
pub use report::{assemble, Report};
pub use timeframe::{ReportWindow, TimeframeError};
