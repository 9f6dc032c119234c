//! The export run: load, merge, emit, archive.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::archive::archive;
use crate::config::resolve_database_url;
use crate::database_ops::players::load_players;
use crate::database_ops::ratings::{legacy_ratings, primary_ratings};
use crate::error::{ExportError, Result};
use crate::formats::swiss_manager::{emit_fixedwidth, month_label};
use crate::formats::swiss_perfect::emit_tabular;
use crate::merge::merge;
use crate::model::{Players, RatingEntry, RatingMap, Variant};
use crate::util::db::Db;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub rails_root: PathBuf,
    pub environment: String,
    pub config_path: PathBuf,
    pub outdir: PathBuf,
    /// Explicit DSN; skips the config file when set.
    pub database_url: Option<String>,
    pub cutoff: NaiveDate,
    /// Run date stamped into the dBase header and the rating column heading.
    pub as_of: NaiveDate,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone)]
pub struct VariantOutput {
    pub variant: Variant,
    pub ratings: usize,
    pub swiss_perfect: PathBuf,
    pub swiss_perfect_bytes: u64,
    pub swiss_manager: PathBuf,
    pub swiss_manager_bytes: u64,
    pub archive: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub players: usize,
    pub outputs: Vec<VariantOutput>,
}

/// Everything the export needs from the database.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub players: Players,
    pub legacy: Vec<RatingEntry>,
    pub primary: Vec<(Variant, Vec<RatingEntry>)>,
}

pub fn swiss_perfect_path(outdir: &Path, variant: Variant) -> PathBuf {
    outdir.join(format!("swiss_perfect_{}.dbf", variant.short_name()))
}

pub fn swiss_manager_path(outdir: &Path, variant: Variant) -> PathBuf {
    outdir.join(format!("swiss_manager_{}.txt", variant.short_name()))
}

pub async fn run(opts: &ExportOptions) -> Result<ExportSummary> {
    let url = match &opts.database_url {
        Some(url) => url.clone(),
        None => {
            resolve_database_url(&opts.config_path, &opts.environment, &opts.rails_root)?
        }
    };
    let db = Db::connect(&url).await?;
    let sources = fetch_sources(&db, &opts.variants, opts.cutoff).await;
    db.close().await;
    export_sources(sources?, opts)
}

pub async fn fetch_sources(
    db: &Db,
    variants: &[Variant],
    cutoff: NaiveDate,
) -> Result<Sources> {
    let players = load_players(db).await?;
    let legacy = legacy_ratings(db).await?;
    let mut primary = Vec::with_capacity(variants.len());
    for &variant in variants {
        primary.push((variant, primary_ratings(db, variant, cutoff).await?));
    }
    Ok(Sources {
        players,
        legacy,
        primary,
    })
}

pub fn export_sources(sources: Sources, opts: &ExportOptions) -> Result<ExportSummary> {
    std::fs::create_dir_all(&opts.outdir).map_err(ExportError::output(&opts.outdir))?;

    let mut summary = ExportSummary {
        players: sources.players.len(),
        outputs: Vec::with_capacity(sources.primary.len()),
    };
    for (variant, primary) in sources.primary {
        info!(variant = %variant, players = summary.players, "exporting variant");
        let ratings = merge(primary, sources.legacy.clone());
        let output =
            write_variant(&sources.players, &ratings, variant, &opts.outdir, opts.as_of)?;
        summary.outputs.push(output);
    }
    Ok(summary)
}

/// Emit both files for one variant and bundle them.
pub fn write_variant(
    players: &Players,
    ratings: &RatingMap,
    variant: Variant,
    outdir: &Path,
    as_of: NaiveDate,
) -> Result<VariantOutput> {
    let swiss_perfect = swiss_perfect_path(outdir, variant);
    let swiss_perfect_bytes = emit_tabular(players, ratings, &swiss_perfect, as_of)?;

    let swiss_manager = swiss_manager_path(outdir, variant);
    let swiss_manager_bytes =
        emit_fixedwidth(players, ratings, &month_label(as_of), &swiss_manager)?;

    let archive = archive(
        outdir,
        variant,
        &[swiss_perfect.clone(), swiss_manager.clone()],
    )?;
    Ok(VariantOutput {
        variant,
        ratings: ratings.len(),
        swiss_perfect,
        swiss_perfect_bytes,
        swiss_manager,
        swiss_manager_bytes,
        archive,
    })
}
