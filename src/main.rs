use std::path::PathBuf;

use anyhow::bail;
use structopt::StructOpt;

use sf6_frame_data::config::Paths;
use sf6_frame_data::ime::render_fighter_text;
use sf6_frame_data::localize::{Lang, NAME_COLUMN, cell_value};
use sf6_frame_data::normalize::normalize_category;
use sf6_frame_data::notation::{DisplayMode, format_input};
use sf6_frame_data::pipeline::{self, BatchSummary};
use sf6_frame_data::search::SearchOptions;
use sf6_frame_data::store::FrameDataStore;

#[derive(StructOpt, Debug)]
#[structopt(name = "sf6-frame-data")]
struct Opt {
    /// Project checkout the default directories are resolved against
    #[structopt(long, default_value = ".")]
    root: PathBuf,
    #[structopt(long, env = "SF6_CSV_DIR")]
    csv_dir: Option<PathBuf>,
    #[structopt(long, env = "SF6_UPSTREAM_DIR")]
    upstream_dir: Option<PathBuf>,
    #[structopt(long, env = "SF6_JSON_DIR")]
    json_dir: Option<PathBuf>,
    #[structopt(long, env = "SF6_EXPORT_DIR")]
    export_dir: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Hand-edited CSV to JSON, one character or every CSV file
    ImportCsv {
        id: Option<String>,
    },
    /// Upstream TOML to JSON, the given characters or every TOML file
    ImportToml {
        ids: Vec<String>,
    },
    /// JSON back to round-trip CSV
    ExportCsv {
        id: Option<String>,
    },
    Search {
        id: String,
        query: Vec<String>,
        #[structopt(long)]
        category: Option<String>,
        #[structopt(long, default_value = "zh")]
        lang: Lang,
        #[structopt(long, default_value = "50")]
        max: usize,
        #[structopt(long)]
        numeric: bool,
    },
    Format {
        input: String,
        #[structopt(long)]
        numeric: bool,
    },
    /// Render note text the way the fighter input mode shows it
    Fighter {
        text: String,
    },
}

fn display_mode(numeric: bool) -> DisplayMode {
    if numeric { DisplayMode::Numeric } else { DisplayMode::Directional }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

fn targets(ids: Vec<String>, dir: &std::path::Path, ext: &str) -> anyhow::Result<Vec<String>> {
    if ids.is_empty() {
        let found = pipeline::list_ids(dir, ext)?;
        log::info!("Found {} {} files in {}", found.len(), ext, dir.display());
        return Ok(found);
    }
    Ok(ids.iter().map(|id| normalize_id(id)).collect())
}

fn report(verb: &str, summary: BatchSummary) -> anyhow::Result<()> {
    for id in &summary.succeeded {
        println!("{} {}", verb, id);
    }
    for (id, e) in &summary.failed {
        eprintln!("FAILED {}: {}", id, e);
    }
    println!(
        "{} {} character(s), {} failed",
        verb,
        summary.succeeded.len(),
        summary.failed.len()
    );
    if !summary.is_success() {
        bail!("{} character(s) failed", summary.failed.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let paths = Paths::under(&opt.root).with_overrides(
        opt.csv_dir,
        opt.upstream_dir,
        opt.json_dir,
        opt.export_dir,
    );
    match opt.cmd {
        Command::ImportCsv { id } => {
            let ids = targets(id.into_iter().collect(), &paths.csv_dir, "csv")?;
            let today = pipeline::today();
            let summary = pipeline::run_batch(&ids, |id| {
                pipeline::import_csv_character(&paths, id, &today).map(|_| ())
            });
            report("Imported", summary)?;
        }

        Command::ImportToml { ids } => {
            let ids = targets(ids, &paths.upstream_dir, "toml")?;
            let today = pipeline::today();
            let summary = pipeline::run_batch(&ids, |id| {
                pipeline::import_upstream_character(&paths, id, &today).map(|_| ())
            });
            report("Imported", summary)?;
        }

        Command::ExportCsv { id } => {
            let ids = targets(id.into_iter().collect(), &paths.json_dir, "json")?;
            let summary =
                pipeline::run_batch(&ids, |id| pipeline::export_csv_character(&paths, id));
            report("Exported", summary)?;
        }

        Command::Search { id, query, category, lang, max, numeric } => {
            let id = normalize_id(&id);
            let store = FrameDataStore::load_dir(&paths.json_dir)?;
            if !store.contains(&id) {
                bail!("No frame data for {}", id);
            }
            let opts = SearchOptions {
                lang,
                category: category.as_deref().map(|c| normalize_category(Some(c))),
                max_results: max,
            };
            let mode = display_mode(numeric);
            for m in store.search(&id, &query.join(" "), &opts) {
                println!(
                    "{}\t{}\t{}\t{}",
                    m.id(),
                    cell_value(m, NAME_COLUMN, lang, mode),
                    cell_value(m, "input", lang, mode),
                    cell_value(m, "hitType", lang, mode),
                );
            }
        }

        Command::Format { input, numeric } => {
            println!("{}", format_input(&input, display_mode(numeric)));
        }

        Command::Fighter { text } => {
            println!("{}", render_fighter_text(&text));
        }
    }
    Ok(())
}
