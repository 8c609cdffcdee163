use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use conformance_core::{
    Config, HttpServiceClient, RunReport, Runner, Selection, ServiceEndpoint, Suite, Verdict,
    catalog, config::API_KEY_ENV,
};
use inquire::{Password, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "conformance", version, about = "Weather service conformance suite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Filter {
    /// Suite to include: city_name, lon_lat or zip. Repeatable; all by default.
    #[arg(long = "suite", value_parser = parse_suite)]
    pub suites: Vec<Suite>,

    /// Only scenarios whose name contains this text.
    #[arg(short = 'k', long = "filter")]
    pub name_filter: Option<String>,
}

impl Filter {
    fn selection(self) -> Selection {
        Selection {
            suites: self.suites,
            name_filter: self.name_filter,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run scenarios against the service.
    Run {
        /// Valid API key. Falls back to the configured key, then to "".
        #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,

        /// Base URI of the current-weather endpoint.
        #[arg(long)]
        service_uri: Option<String>,

        #[command(flatten)]
        filter: Filter,

        /// Stop at the first scenario that does not pass.
        #[arg(short = 'x', long)]
        fail_fast: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List scenario names without running them.
    List {
        #[command(flatten)]
        filter: Filter,
    },

    /// Store the API key (and optionally the service URI) in the config file.
    Configure,
}

fn parse_suite(value: &str) -> Result<Suite, String> {
    Suite::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Run {
                api_key,
                service_uri,
                filter,
                fail_fast,
                json,
            } => {
                let (api_key, endpoint) = resolve_settings(api_key, service_uri, Config::load)?;
                let scenarios = filter.selection().apply(catalog::all());
                if scenarios.is_empty() {
                    anyhow::bail!("No scenarios match the given filter.");
                }

                tracing::info!(
                    count = scenarios.len(),
                    endpoint = endpoint.base_uri(),
                    "running scenarios"
                );

                let client = HttpServiceClient::new();
                let report = Runner::new(&client, endpoint, api_key)
                    .fail_fast(fail_fast)
                    .run(&scenarios)
                    .await;

                if json {
                    let out = serde_json::to_string_pretty(&report)
                        .context("Failed to serialize run report")?;
                    println!("{out}");
                } else {
                    print_report(&report);
                }

                Ok(if report.is_success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Command::List { filter } => {
                for scenario in filter.selection().apply(catalog::all()) {
                    println!("{}", scenario.name);
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Key and endpoint for a run. The config file is only read when one of
/// them is not given on the command line.
fn resolve_settings(
    api_key: Option<String>,
    service_uri: Option<String>,
    load: impl FnOnce() -> anyhow::Result<Config>,
) -> anyhow::Result<(String, ServiceEndpoint)> {
    if let (Some(key), Some(uri)) = (&api_key, &service_uri) {
        return Ok((key.clone(), ServiceEndpoint::new(uri.clone())));
    }

    let cfg = load()
        .context("Failed to load configuration; pass --api-key and --service-uri to skip it")?;
    Ok((
        cfg.resolve_api_key(api_key.as_deref()),
        cfg.resolve_endpoint(service_uri.as_deref()),
    ))
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_help_message("Key of a registered account; leave empty to clear")
        .prompt()
        .context("Failed to read API key")?;

    let current_uri = cfg.resolve_endpoint(None).base_uri().to_string();
    let service_uri = Text::new("Service URI:")
        .with_default(&current_uri)
        .prompt()
        .context("Failed to read service URI")?;

    if api_key.is_empty() {
        cfg.api_key = None;
    } else {
        cfg.set_api_key(api_key);
    }
    cfg.service_uri = Some(service_uri);
    cfg.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_report(report: &RunReport) {
    for result in &report.results {
        match &result.verdict {
            Verdict::Passed => println!("PASSED  {}", result.name),
            Verdict::Failed(msg) => {
                println!("FAILED  {}", result.name);
                println!("{}", indent(msg));
            }
            Verdict::Errored(msg) => {
                println!("ERROR   {}", result.name);
                println!("{}", indent(msg));
            }
        }
    }

    println!(
        "\n{} passed, {} failed, {} errored (started {})",
        report.passed(),
        report.failed(),
        report.errored(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("        {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_suites_and_filter() {
        let cli = Cli::try_parse_from([
            "conformance",
            "run",
            "--api-key",
            "KEY",
            "--suite",
            "zip",
            "--suite",
            "lon-lat",
            "-k",
            "xml",
            "-x",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::Run {
                api_key,
                filter,
                fail_fast,
                json,
                ..
            } => {
                assert_eq!(api_key.as_deref(), Some("KEY"));
                assert_eq!(filter.suites, vec![Suite::Zip, Suite::LonLat]);
                assert_eq!(filter.name_filter.as_deref(), Some("xml"));
                assert!(fail_fast);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_suite_is_rejected() {
        let err = Cli::try_parse_from(["conformance", "list", "--suite", "weather"]).unwrap_err();
        assert!(err.to_string().contains("Unknown suite"));
    }

    #[test]
    fn explicit_settings_skip_the_config_file() {
        let (key, endpoint) = resolve_settings(
            Some("KEY".into()),
            Some("http://localhost:8080/weather".into()),
            || anyhow::bail!("unreadable config"),
        )
        .expect("config is not needed");

        assert_eq!(key, "KEY");
        assert_eq!(endpoint.base_uri(), "http://localhost:8080/weather?");
    }

    #[test]
    fn missing_setting_reads_the_config_file() {
        let err = resolve_settings(Some("KEY".into()), None, || {
            anyhow::bail!("unreadable config")
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));

        let stored = Config {
            api_key: Some("STORED".into()),
            service_uri: None,
        };
        let (key, endpoint) =
            resolve_settings(None, Some("http://localhost/w?".into()), || Ok(stored))
                .expect("config loads");
        assert_eq!(key, "STORED");
        assert_eq!(endpoint.base_uri(), "http://localhost/w?");
    }

    #[test]
    fn indent_every_line() {
        assert_eq!(indent("a\nb"), "        a\n        b");
    }
}
