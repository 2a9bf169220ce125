use akamai_purge_ccu::{
    Ccu, Config as CcuConfig, Credential, Network, PurgeAction, PurgeObjectType,
};
use akamai_purge_config::AppConfig as _;
use akamai_purge_opentelemetry::{Config as OtelConfig, get_meter_provider};
use akamai_purge_signals::{PurgeSignals, PurgeSubject};
use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser};
use std::{
    io::{self, Write as _},
    path::PathBuf,
    sync::Arc,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = akamai_purge_logging::init().context("error initializing logging")?;

    if let Err(err) = CommandLine::parse().handle_args().await {
        eprintln!("error running akamai-purge: {:?}", err);
        drop(_guard);
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version,
    rename_all = "kebab-case",
)]
enum CommandLine {
    /// Purge URLs, CP codes or cache tags
    Purge {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// `invalidate` or `delete`
        #[arg(long)]
        action: Option<PurgeAction>,

        /// `production` or `staging`
        #[arg(long)]
        network: Option<Network>,

        /// `url`, `cpcode` or `tag`
        #[arg(long = "type")]
        object_type: Option<PurgeObjectType>,

        /// Objects to purge, read line by line from stdin when empty
        #[arg(name = "OBJECT")]
        objects: Vec<String>,
    },

    /// Check that credentials can be found, without calling the API
    CheckCredentials {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct CredentialArgs {
    /// credential file, overrides `AKAMAI_EDGERC`
    #[arg(long)]
    edgerc: Option<PathBuf>,

    /// section in the credential file, overrides `AKAMAI_EDGERC_SECTION`
    #[arg(long)]
    section: Option<String>,
}

impl CredentialArgs {
    fn apply(self, config: &mut CcuConfig) {
        if let Some(edgerc) = self.edgerc {
            config.edgerc_path = edgerc;
        }
        if let Some(section) = self.section {
            config.edgerc_section = section;
        }
    }
}

impl CommandLine {
    async fn handle_args(self) -> Result<()> {
        let mut config = CcuConfig::from_environment()?;

        match self {
            Self::Purge {
                credentials,
                action,
                network,
                object_type,
                objects,
            } => {
                credentials.apply(&mut config);
                if let Some(action) = action {
                    config.options.action = action;
                }
                if let Some(network) = network {
                    config.options.network = network;
                }
                if let Some(object_type) = object_type {
                    config.options.object_type = object_type;
                }

                let objects = if objects.is_empty() {
                    read_objects(io::stdin().lock())?
                } else {
                    objects
                };
                if objects.is_empty() {
                    bail!("nothing to purge");
                }

                let meter_provider = get_meter_provider(&OtelConfig::from_environment()?)?;
                let ccu = Ccu::from_config(&config, &meter_provider)
                    .context("failed to set up CCU client")?;
                let signals = PurgeSignals::new(Arc::new(ccu));

                let outcomes = signals
                    .purge_request(PurgeSubject::Urls(objects))
                    .await
                    .context("failed to purge")?;

                let mut stdout = io::stdout().lock();
                for outcome in &outcomes {
                    serde_json::to_writer(&mut stdout, outcome)?;
                    writeln!(stdout)?;
                }
                info!(requests = outcomes.len(), "purge finished");
            }
            Self::CheckCredentials { credentials } => {
                credentials.apply(&mut config);
                let credential = Credential::resolve(&config)?;
                println!("credentials found for {}", credential.host);
            }
        }

        Ok(())
    }
}

/// one object per line, blank lines and `#` comments are skipped.
fn read_objects(input: impl io::BufRead) -> Result<Vec<String>> {
    let mut objects = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read objects")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        objects.push(line.to_string());
    }
    Ok(objects)
}
