use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tc_core::{
    DEFAULT_IP, DEFAULT_PORT, GuiConfig, compile_pattern, resolve_interfaces, split_dev_list,
};
use tc_doctor::{Doctor, is_root};
use tc_shaper::TcsetBackend;
use tc_web::{RuleController, ToolMetrics};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tcgui")]
#[command(version, about = "TC web GUI", long_about = None)]
struct Cli {
    /// The IP where the server is listening
    #[arg(long, env = "TCGUI_IP")]
    ip: Option<IpAddr>,

    /// The port where the server is listening
    #[arg(long, env = "TCGUI_PORT")]
    port: Option<u16>,

    /// The interfaces to restrict to (space separated)
    #[arg(long, env = "TCGUI_DEV", num_args = 1.., value_delimiter = ' ')]
    dev: Option<Vec<String>>,

    /// A regex to match interfaces
    #[arg(long, env = "TCGUI_REGEX")]
    regex: Option<String>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check privileges, shaping tools and interfaces, then exit
    Doctor,
}

impl Cli {
    /// Device names from `--dev`/`TCGUI_DEV`, with blanks dropped
    fn devices(&self) -> Option<Vec<String>> {
        let devices: Vec<String> = self
            .dev
            .as_ref()?
            .iter()
            .flat_map(|entry| split_dev_list(entry))
            .collect();

        if devices.is_empty() {
            None
        } else {
            Some(devices)
        }
    }

    fn bind(&self) -> SocketAddr {
        SocketAddr::new(
            self.ip.unwrap_or(DEFAULT_IP),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let doctor_only = matches!(cli.command, Some(Commands::Doctor));

    if !doctor_only && !is_root() {
        eprintln!(
            "You need to have root privileges to run this program.\n\
             Please try again, this time using 'sudo'. Exiting."
        );
        std::process::exit(1);
    }

    tokio::runtime::Runtime::new()?.block_on(async {
        let config = build_config(&cli).await?;

        if doctor_only {
            run_doctor(&config).await
        } else {
            run_server(config).await
        }
    })
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn build_config(cli: &Cli) -> anyhow::Result<GuiConfig> {
    let pattern = cli.regex.as_deref().map(compile_pattern).transpose()?;
    let devices = cli.devices();

    let discovered = match devices {
        Some(_) => vec![],
        None => {
            let lister = tc_nl::LinkLister::new()
                .await
                .context("Failed to open netlink connection")?;
            lister
                .link_names()
                .await
                .context("Failed to list network interfaces")?
        }
    };

    let interfaces = resolve_interfaces(devices.as_deref(), pattern.as_ref(), &discovered)?;
    tracing::info!(interfaces = ?interfaces, "managing interfaces");

    Ok(GuiConfig::new(interfaces)
        .with_pattern(pattern)
        .with_bind(cli.bind())
        .with_debug(cli.debug))
}

async fn run_server(config: GuiConfig) -> anyhow::Result<()> {
    let tools = Doctor::new(&config).check_tools().await;
    for finding in tools.findings() {
        finding.log();
    }
    if !tools.is_ready() {
        tracing::warn!("shaping tools missing; requests will fail until tcconfig is installed");
    }

    let backend = Arc::new(TcsetBackend::new(config.tools.clone()));
    let metrics = ToolMetrics::new()?;
    let bind = config.bind;

    let controller = Arc::new(RuleController::new(config, backend, metrics));
    tc_web::serve(controller, bind).await
}

async fn run_doctor(config: &GuiConfig) -> anyhow::Result<()> {
    let backend = TcsetBackend::new(config.tools.clone());
    let report = Doctor::new(config)
        .run_all(&backend, &config.interfaces)
        .await;
    print!("{}", report);

    if !report.is_ready() {
        anyhow::bail!(
            "{} check(s) failed; tcgui is not ready to run on this host",
            report.failures().count()
        );
    }
    Ok(())
}
