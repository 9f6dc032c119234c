use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use ratings_export::config::redact_url;
use ratings_export::database_ops::ratings::DEFAULT_CUTOFF;
use ratings_export::export::{run, ExportOptions};
use ratings_export::logging::init_tracing;
use ratings_export::model::Variant;
use ratings_export::util::env;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "export_ratings",
    version,
    about = "Export current ratings as Swiss Perfect and Swiss Manager player lists"
)]
struct Cli {
    /// Application root; config and output defaults are relative to it
    #[arg(short = 'r', long, default_value = ".")]
    rails_root: PathBuf,
    /// Config section to read (default: $RAILS_ENV, then production)
    #[arg(short = 'e', long)]
    environment: Option<String>,
    /// Database config file (default: <rails-root>/config/database.yml)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    /// Output directory (default: <rails-root>/public/downloads)
    #[arg(short = 'o', long)]
    outdir: Option<PathBuf>,
    /// Database URL; overrides $DATABASE_URL and the config file
    #[arg(long)]
    db_url: Option<String>,
    /// Ignore published lists issued before this date
    #[arg(long, default_value = DEFAULT_CUTOFF)]
    cutoff: NaiveDate,
    /// Run date used for the file headers (default: today)
    #[arg(long)]
    as_of: Option<NaiveDate>,
    /// Export only one variant: pub or live (default: both)
    #[arg(long)]
    variant: Option<Variant>,
}

impl Cli {
    fn into_options(self) -> ExportOptions {
        let environment = self
            .environment
            .or_else(|| env::env_opt("RAILS_ENV"))
            .unwrap_or_else(|| "production".to_string());
        let config_path = self
            .config
            .unwrap_or_else(|| self.rails_root.join("config").join("database.yml"));
        let outdir = self
            .outdir
            .unwrap_or_else(|| self.rails_root.join("public").join("downloads"));
        ExportOptions {
            rails_root: self.rails_root,
            environment,
            config_path,
            outdir,
            database_url: self.db_url.or_else(|| env::env_opt("DATABASE_URL")),
            cutoff: self.cutoff,
            as_of: self.as_of.unwrap_or_else(|| Local::now().date_naive()),
            variants: self.variant.map_or_else(|| Variant::ALL.to_vec(), |v| vec![v]),
        }
    }
}

async fn export(cli: Cli) -> Result<()> {
    let opts = cli.into_options();
    info!(
        environment = %opts.environment,
        config = %opts.config_path.display(),
        outdir = %opts.outdir.display(),
        as_of = %opts.as_of,
        "export_ratings: starting"
    );
    if let Some(url) = &opts.database_url {
        info!(url = %redact_url(url), "using database url override");
    }
    let summary = run(&opts).await.context("ratings export failed")?;
    for out in &summary.outputs {
        info!(
            variant = %out.variant,
            ratings = out.ratings,
            dbf_bytes = out.swiss_perfect_bytes,
            txt_bytes = out.swiss_manager_bytes,
            archive = %out.archive.display(),
            "export_ratings: variant complete"
        );
    }
    info!(
        players = summary.players,
        variants = summary.outputs.len(),
        "export_ratings: done"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env::init_env();
    if let Err(err) = init_tracing("info,sqlx=warn") {
        eprintln!("{err}");
    }

    let cli = Cli::parse();
    match export(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "export_ratings: aborted");
            eprintln!("export_ratings: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_under_the_rails_root() {
        let opts = Cli::parse_from([
            "export_ratings",
            "-r",
            "/srv/app",
            "-e",
            "staging",
            "--db-url",
            "sqlite::memory:",
            "--as-of",
            "2011-09-01",
        ])
        .into_options();
        assert_eq!(opts.environment, "staging");
        assert_eq!(opts.config_path, PathBuf::from("/srv/app/config/database.yml"));
        assert_eq!(opts.outdir, PathBuf::from("/srv/app/public/downloads"));
        assert_eq!(opts.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(opts.as_of, NaiveDate::from_ymd_opt(2011, 9, 1).unwrap());
        assert_eq!(opts.variants, Variant::ALL.to_vec());
    }

    #[test]
    fn variant_flag_limits_the_run() {
        let opts = Cli::parse_from(["export_ratings", "--variant", "live"]).into_options();
        assert_eq!(opts.variants, vec![Variant::Live]);
    }
}
