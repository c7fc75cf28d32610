//! `braintree-tr`: operator tool for Transparent Redirect payloads.
//!
//! Prints form action URLs, builds trData, verifies and confirms redirect
//! query strings and self-checks a gateway configuration. Results go to
//! stdout as JSON; logs go to stderr.

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

mod observability;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use braintree_tr::{
    BraintreeGateway, GatewayError, GatewayResult, Result,
    config::{Environment, GatewayConfig},
    models::CreditCardRequest,
    tr::{ConfirmedResource, Node, OperationKind, ResourceKind, TrKind},
};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::observability::{HealthCheck, HealthReport, HealthStatus, LogFormat, init_observability};

#[derive(Debug, Parser)]
#[command(name = "braintree-tr", version, about = "Build and verify Transparent Redirect payloads")]
struct Cli {
    /// Gateway configuration file (TOML).
    #[arg(short, long, default_value = "braintree.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the form action URL of every resource and operation.
    Urls,
    /// Build signed trData for a payment form.
    TrData {
        /// e.g. `create_payment_method`, `update_customer`.
        #[arg(long)]
        kind: TrKind,
        /// Where the gateway sends the browser afterwards.
        #[arg(long)]
        redirect_url: String,
        /// Fixed form field, repeatable.
        #[arg(long = "field", value_name = "PATH=VALUE")]
        fields: Vec<String>,
    },
    /// Verify a redirect query string and print its fields.
    Verify {
        query: String,
    },
    /// Verify a redirect query string and confirm it with the gateway.
    Confirm {
        query: String,
    },
    /// Validate the configuration without contacting the gateway.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Check => {
            let report = check(&cli.config);
            println!("{:#}", report.to_json());
            return if report.status == HealthStatus::Unhealthy { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
        command => command,
    };

    match run(&cli.config, command).await {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Path, command: Command) -> Result<Value> {
    let gateway = BraintreeGateway::from_file(config)?;
    info!(base_url = gateway.base_url(), "gateway loaded");

    match command {
        Command::Urls => Ok(urls(&gateway)),
        Command::TrData { kind, redirect_url, fields } => {
            let params = parse_fields(&fields)?;
            let tr_data = gateway.transparent_redirect().tr_data(kind, &params, &redirect_url)?;
            Ok(json!({
                "action": gateway.transparent_redirect().url_for(kind.resource, kind.operation),
                "tr_data": tr_data,
            }))
        }
        Command::Verify { query } => {
            let redirect = gateway.transparent_redirect().parse_query_string(&query)?;
            let fields: serde_json::Map<String, Value> = redirect
                .query()
                .pairs()
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect();
            Ok(json!({
                "http_status": redirect.http_status(),
                "id": redirect.id(),
                "kind": redirect.kind().map(|kind| kind.to_string()),
                "fields": fields,
            }))
        }
        Command::Confirm { query } => {
            let result = gateway.transparent_redirect().confirm(&query).await?;
            Ok(confirmation_json(&result))
        }
        Command::Check => Ok(check(config).to_json()),
    }
}

fn urls(gateway: &BraintreeGateway) -> Value {
    let redirect = gateway.transparent_redirect();
    let mut out = serde_json::Map::new();
    for resource in [ResourceKind::CreditCard, ResourceKind::Customer] {
        for operation in [OperationKind::Create, OperationKind::Update] {
            let kind = TrKind::new(resource, operation);
            out.insert(kind.to_string(), Value::String(redirect.url_for(resource, operation)));
        }
    }
    Value::Object(out)
}

/// Parses repeated `path=value` arguments into a field tree.
fn parse_fields(fields: &[String]) -> Result<Node> {
    let pairs = fields
        .iter()
        .map(|field| {
            field.split_once('=').ok_or_else(|| {
                GatewayError::InvalidInput(format!("field '{field}' is not PATH=VALUE"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Node::unflatten(pairs)
}

fn confirmation_json(result: &GatewayResult<ConfirmedResource>) -> Value {
    match result {
        GatewayResult::Success(ConfirmedResource::CreditCard(card)) => {
            json!({ "success": true, "credit_card": card })
        }
        GatewayResult::Success(ConfirmedResource::Customer(customer)) => {
            json!({ "success": true, "customer": customer })
        }
        GatewayResult::Failure(failure) => {
            let errors: Vec<Value> = failure
                .errors()
                .deep_all()
                .into_iter()
                .map(|e| json!({ "attribute": e.attribute, "code": e.code, "message": e.message }))
                .collect();
            json!({
                "success": false,
                "message": failure.message(),
                "errors": errors,
                "verification_status": failure
                    .credit_card_verification()
                    .map(|v| format!("{:?}", v.status)),
            })
        }
    }
}

/// Runs every offline check against the configuration at `path`.
fn check(path: &Path) -> HealthReport {
    let config = match GatewayConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => return HealthReport::new(None, vec![HealthCheck::fail("configuration", e.to_string())]),
    };
    let environment = Some(format!("{:?}", config.environment).to_lowercase());
    let mut checks = Vec::new();

    match config.validate() {
        Ok(()) => checks.push(HealthCheck::pass("configuration", format!("loaded {}", path.display()))),
        Err(e) => {
            checks.push(HealthCheck::fail("configuration", e.to_string()));
            return HealthReport::new(environment, checks);
        }
    }

    match config.credentials() {
        Ok(_) if config.private_key.is_some() && config.environment == Environment::Production => checks.push(
            HealthCheck::warn("private_key", "production private key stored inline; prefer private_key_env"),
        ),
        Ok(_) => checks.push(HealthCheck::pass("private_key", "resolved")),
        Err(e) => checks.push(HealthCheck::fail("private_key", e.to_string())),
    }

    match config.base_merchant_url() {
        Ok(url) => checks.push(HealthCheck::pass("base_url", url)),
        Err(e) => checks.push(HealthCheck::fail("base_url", e.to_string())),
    }

    let signing = BraintreeGateway::new(config).and_then(|gateway| {
        let tr_data = gateway.tr_data(&CreditCardRequest::default(), "https://localhost/check")?;
        Ok(gateway.transparent_redirect().is_tr_data_valid(&tr_data))
    });
    checks.push(match signing {
        Ok(true) => HealthCheck::pass("signing", "trData signs and verifies"),
        Ok(false) => HealthCheck::fail("signing", "trData failed to verify with its own key"),
        Err(e) => HealthCheck::fail("signing", e.to_string()),
    });

    HealthReport::new(environment, checks)
}
