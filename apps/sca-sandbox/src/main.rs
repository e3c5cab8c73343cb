//! SCA sandbox
//!
//! Wires the SCA authorisation module to the static bank backend and drives
//! one authorisation from creation to a terminal status, printing every step
//! as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sca_authorisation::config::{MODULE_NAME, config_figment, module_config};
use sca_authorisation::{
    AuthenticationBackends, InMemoryAuthorisationStore, ModuleDeps, ScaAuthorisationConfig,
    ScaAuthorisationModule,
};
use sca_authorisation_sdk::{
    AuthorisationResponse, AuthorisationType, CreateAuthorisationRequest, PsuCredentials,
    PsuIdData, ScaApproach, ScaAuthorisationClient, ScaStatus, UpdateAuthorisationRequest,
};
use serde_json::json;
use static_sca_backend_plugin::{StaticScaBackendConfig, StaticScaBackendPlugin};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Upper bound on update calls for one run; a flow needs at most three.
const MAX_STEPS: usize = 8;

#[derive(Parser)]
#[command(name = "sca-sandbox")]
#[command(about = "Drive PSD2 SCA flows against a static bank backend", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, default_value = "config/sca-sandbox.yaml")]
    config: PathBuf,

    /// Log as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an authorisation and drive it to a terminal status
    Run(RunArgs),

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[derive(Args)]
struct RunArgs {
    /// Payment or consent the authorisation belongs to
    #[arg(long, default_value = "payment-1")]
    parent_id: String,

    #[arg(long, value_enum, default_value = "payment")]
    kind: Kind,

    #[arg(long, default_value = "alice")]
    psu_id: String,

    #[arg(long, default_value = "12345")]
    password: String,

    /// SCA method to select when several are offered (default: the first)
    #[arg(long)]
    method: Option<String>,

    /// TAN sent for code-based methods
    #[arg(long, default_value = "123456")]
    tan: String,

    /// TPP-Redirect-Preferred
    #[arg(long)]
    prefer_redirect: Option<bool>,

    /// TPP-Decoupled-Preferred
    #[arg(long)]
    prefer_decoupled: Option<bool>,

    /// Code the PSU brings back from the bank's redirect page
    #[arg(long, default_value = "confirmed")]
    confirmation_code: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Payment,
    Cancellation,
    Consent,
    FundsConfirmation,
}

impl From<Kind> for AuthorisationType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Payment => Self::PaymentCreation,
            Kind::Cancellation => Self::PaymentCancellation,
            Kind::Consent => Self::Consent,
            Kind::FundsConfirmation => Self::FundsConfirmationConsent,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let (sca_cfg, bank_cfg) = load(&cli.config)?;
    match cli.command {
        Command::CheckConfig => {
            info!(
                config = %cli.config.display(),
                approaches = sca_cfg.sca_approaches.len(),
                psus = bank_cfg.psus.len(),
                "configuration is valid"
            );
            Ok(())
        }
        Command::Run(args) => {
            let client = wire(&sca_cfg, &bank_cfg)?;
            run(client.as_ref(), &args).await
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(path: &Path) -> anyhow::Result<(ScaAuthorisationConfig, StaticScaBackendConfig)> {
    let figment = config_figment(path);
    let sca_cfg: ScaAuthorisationConfig = module_config(&figment, MODULE_NAME)
        .with_context(|| format!("loading {}", path.display()))?;
    sca_cfg.validate()?;
    let bank_cfg: StaticScaBackendConfig =
        module_config(&figment, static_sca_backend_plugin::config::MODULE_NAME)
            .with_context(|| format!("loading {}", path.display()))?;
    Ok((sca_cfg, bank_cfg))
}

fn wire(
    sca_cfg: &ScaAuthorisationConfig,
    bank_cfg: &StaticScaBackendConfig,
) -> anyhow::Result<Arc<dyn ScaAuthorisationClient>> {
    let bank = StaticScaBackendPlugin::new().init(bank_cfg)?;
    ScaAuthorisationModule::new().init(
        sca_cfg,
        ModuleDeps {
            store: Arc::new(InMemoryAuthorisationStore::new()),
            backends: AuthenticationBackends::uniform(bank.backend),
            objects: bank.objects,
        },
    )
}

async fn run(client: &dyn ScaAuthorisationClient, args: &RunArgs) -> anyhow::Result<()> {
    let authorisation_type = AuthorisationType::from(args.kind);
    let request = CreateAuthorisationRequest::new(&args.parent_id, authorisation_type)
        .with_psu_data(PsuIdData::new(&args.psu_id))
        .with_credentials(PsuCredentials::new(&args.password))
        .with_preferences(args.prefer_redirect, args.prefer_decoupled);

    let created = client.create_authorisation(request).await?;
    print_step("create", &serde_json::to_value(&created)?)?;
    if let Some(link) = &created.sca_redirect_link {
        info!(link = %link, "PSU is sent to the bank's SCA page");
    }

    let mut current = created.authorisation;
    let mut steps = 0;
    while !current.sca_status.is_terminal() {
        steps += 1;
        if steps > MAX_STEPS {
            anyhow::bail!("authorisation did not settle after {MAX_STEPS} updates");
        }

        let update = next_update(&current, args);
        let result = if authorisation_type == AuthorisationType::PaymentCancellation {
            client.update_cancellation_authorisation(update).await
        } else {
            client.update_authorisation(update).await
        };
        current = match result {
            Ok(next) => next,
            Err(e) => {
                print_step("rejected", &json!({ "code": e.code(), "message": e.to_string() }))?;
                return Err(e.into());
            }
        };
        print_step("update", &serde_json::to_value(&current)?)?;
    }

    info!(
        authorisation_id = %current.authorisation_id,
        sca_status = %current.sca_status,
        sca_approach = %current.sca_approach,
        "authorisation settled"
    );
    Ok(())
}

/// The request a PSU (through the TPP) would send next.
fn next_update(current: &AuthorisationResponse, args: &RunArgs) -> UpdateAuthorisationRequest {
    let update = UpdateAuthorisationRequest::new(&args.parent_id, current.authorisation_id);
    match (current.sca_approach, current.sca_status) {
        (ScaApproach::Redirect, _) => update.with_confirmation_code(&args.confirmation_code),
        (_, ScaStatus::Received | ScaStatus::PsuIdentified) => update.with_credentials(
            PsuIdData::new(&args.psu_id),
            PsuCredentials::new(&args.password),
        ),
        (_, ScaStatus::PsuAuthenticated) => {
            let method = args.method.clone().or_else(|| {
                current
                    .available_sca_methods
                    .first()
                    .map(|m| m.authentication_method_id.clone())
            });
            if let Some(method) = method {
                update.with_method(method)
            } else {
                update
            }
        }
        (ScaApproach::Decoupled, _) => update,
        _ => update.with_authentication_data(&args.tan),
    }
}

fn print_step(step: &str, body: &serde_json::Value) -> anyhow::Result<()> {
    let line = serde_json::to_string_pretty(&json!({ "step": step, "body": body }))?;
    println!("{line}");
    Ok(())
}
