//! Point d'entrée CLI pour carte-elus

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Explorer les élus de l'Hérault par département, EPCI et commune
#[derive(Parser)]
#[command(name = "carte-elus")]
#[command(author, version)]
#[command(about = "Explorer les élus de l'Hérault: départements, EPCI et communes")]
#[command(long_about = "Charge les couches GeoJSON et les listes d'élus, puis permet d'inspecter une entité, ses élus et le style de chaque couche.\n\nLes ressources sont lues depuis un preset embarqué (défaut: herault) ou un fichier JSON, surchargeables par les variables CARTE_ELUS_*.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Preset embarqué ou chemin d'un fichier de configuration JSON
    #[arg(short, long, default_value = "herault", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config = cli::load_config(&cli.config)?;

    match cli.command {
        Commands::Inspect {
            scale,
            feature,
            elu,
            finance,
            contact,
            json,
        } => {
            info!(scale = %scale, feature = %feature, "Inspection");
            cli::cmd_inspect(&config, scale, &feature, elu, finance, contact, json).await?;
        }
        Commands::Styles {
            scale,
            output,
            finance,
            contact,
        } => {
            info!(scale = %scale, output = %output.display(), "Export des styles");
            cli::cmd_styles(&config, scale, &output, finance, contact).await?;
        }
        Commands::Report { output } => {
            cli::cmd_report(&config, output.as_deref()).await?;
        }
        Commands::Session => {
            cli::cmd_session(&config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Les logs vont sur stderr: stdout reste réservé aux fiches et au JSON
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
