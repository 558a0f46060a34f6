use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use crate::api::{ApiClient, HttpTransport, Session};
use crate::catalog::{ReportDefinition, ReportKind};
use crate::cli_helpers::{
    item_fields_table, report_table, split_list, summary_table, value_or_prompt,
};
use crate::config::AppConfig;
use crate::export::{default_output_path, export, OutputFormat};
use crate::report::assemble;
use crate::resolver::{list_item_fields, select_hosts, HostSelection};
use crate::timeframe::ReportWindow;
use crate::units::format_bytes;

#[derive(Parser)]
#[command(name = "zabbix-report", version)]
#[command(about = "Zabbix trend reports exported to spreadsheets")]
pub struct Cli {
    /// Path to a TOML config file (or set ZABBIX_REPORT_CONFIG)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// CPU, memory and disk usage for individually named hosts
    Host {
        /// Host IDs or technical host names, comma separated (prompted when omitted)
        #[arg(long = "hosts")]
        hosts: Option<String>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// CPU and memory usage for every host in the given host groups
    Group {
        /// Host group names or IDs, comma separated (prompted when omitted)
        #[arg(long = "groups")]
        groups: Option<String>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Per-drive used/available/total GiB for every host in the given host groups
    Drive {
        /// Host group names or IDs, comma separated (prompted when omitted)
        #[arg(long = "groups")]
        groups: Option<String>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// List the item fields the API exposes for a host
    Fields {
        /// Host IDs, comma separated
        #[arg(long = "host")]
        hosts: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// First day of the report, YYYY-MM-DD (prompted when omitted)
    #[arg(long = "start")]
    pub start: Option<String>,
    /// Last day of the report, inclusive, YYYY-MM-DD (prompted when omitted)
    #[arg(long = "end")]
    pub end: Option<String>,
    /// Output file; defaults to the report's fixed file name
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Xlsx)]
    pub format: OutputFormat,
    /// Hosts processed concurrently (overrides report.jobs)
    #[arg(long = "jobs", short = 'j')]
    pub jobs: Option<usize>,
}

/// Global level forced on top of `RUST_LOG`. `-v` always wins; without it a
/// set `RUST_LOG` is left alone.
fn forced_level(verbose: bool, rust_log: Option<&str>) -> Option<log::LevelFilter> {
    if verbose {
        Some(log::LevelFilter::Debug)
    } else if rust_log.map_or(true, |v| v.trim().is_empty()) {
        Some(log::LevelFilter::Info)
    } else {
        None
    }
}

fn configure_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    let rust_log = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    if let Some(level) = forced_level(verbose, rust_log.as_deref()) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn connect(config: &AppConfig) -> Result<Session<HttpTransport>> {
    let transport = HttpTransport::new(&config.api).context("building HTTP client")?;
    info!("Logging in to {} as {}", transport.url(), config.api.username);
    let session = ApiClient::new(transport)
        .login(&config.api.username, &config.api.password)
        .context("login failed")?;
    Ok(session)
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    configure_logging(cli.verbose);
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Host { hosts, report } => {
            let raw = value_or_prompt(hosts, "Enter host IDs separated by commas: ")?;
            let selection = HostSelection::hosts(split_list(&raw));
            run_report(&config, ReportKind::Host.definition(), selection, report)
        }
        Commands::Group { groups, report } => {
            let raw = value_or_prompt(
                groups,
                "Enter host group names or IDs separated by commas: ",
            )?;
            let selection = HostSelection::groups(split_list(&raw));
            run_report(&config, ReportKind::Group.definition(), selection, report)
        }
        Commands::Drive { groups, report } => {
            let raw = value_or_prompt(
                groups,
                "Enter host group names or IDs separated by commas: ",
            )?;
            let selection = HostSelection::groups(split_list(&raw));
            run_report(&config, ReportKind::Drive.definition(), selection, report)
        }
        Commands::Fields { hosts } => {
            let host_ids = split_list(&hosts);
            anyhow::ensure!(!host_ids.is_empty(), "no host IDs given");
            let session = connect(&config)?;
            let fields = list_item_fields(&session, &host_ids)?;
            if fields.is_empty() {
                println!("No items found for this host.");
            } else {
                println!("Available item fields\n{}", item_fields_table(&fields));
            }
            Ok(())
        }
    }
}

fn run_report(
    config: &AppConfig,
    definition: ReportDefinition,
    selection: HostSelection,
    args: ReportArgs,
) -> Result<()> {
    anyhow::ensure!(!selection.is_empty(), "no hosts or host groups given");
    let start = value_or_prompt(args.start, "Enter start date (YYYY-MM-DD): ")?;
    let end = value_or_prompt(args.end, "Enter end date (YYYY-MM-DD): ")?;
    let window = ReportWindow::parse(&start, &end)?;
    let jobs = args.jobs.unwrap_or(config.report.jobs);
    anyhow::ensure!(jobs > 0, "--jobs must be at least 1");

    let session = connect(config)?;
    let hosts = select_hosts(&session, &selection).context("resolving hosts")?;
    if hosts.is_empty() {
        warn!(
            "No hosts found for the {} report; nothing written.",
            definition.kind
        );
        return Ok(());
    }

    let report = assemble(&session, &definition, &hosts, &window, jobs)?;
    println!("\n{}", summary_table(&report));
    println!("\n{}", report_table(&report));

    let path = args.output.unwrap_or_else(|| {
        default_output_path(&definition, args.format, config.report.output_dir.as_deref())
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    export(&report, args.format, &path)?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    info!(
        "Report saved as '{}' ({})",
        path.display(),
        format_bytes(size as f64)
    );
    Ok(())
}
