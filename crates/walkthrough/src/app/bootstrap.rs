use std::fs;
use std::path::PathBuf;

use showroom_engine::{resolve_app_paths, FileStore, ZoneCatalog, DEFAULT_SPEED};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::script::WalkScript;

const ZONES_ENV_VAR: &str = "SHOWROOM_ZONES";
const SPEED_ENV_VAR: &str = "SHOWROOM_SPEED";
const RESET_FLAG: &str = "--reset";

pub(crate) struct AppWiring {
    pub(crate) script: WalkScript,
    pub(crate) catalog: ZoneCatalog,
    pub(crate) store: FileStore,
    pub(crate) initial_speed: f32,
    pub(crate) reset_progress: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CliArgs {
    pub(crate) script_path: PathBuf,
    pub(crate) reset_progress: bool,
}

pub(crate) fn build_app(args: impl IntoIterator<Item = String>) -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Showroom Walkthrough Startup ===");

    let args = parse_cli_args(args)?;
    let app_paths = resolve_app_paths().map_err(|error| format!("resolve app paths: {error}"))?;

    let raw = fs::read_to_string(&args.script_path).map_err(|error| {
        format!(
            "read walk script '{}': {error}",
            args.script_path.display()
        )
    })?;
    let script = WalkScript::parse_json(&raw)?;

    let catalog = match std::env::var(ZONES_ENV_VAR) {
        Ok(path) => {
            let catalog = ZoneCatalog::from_xml_file(&PathBuf::from(&path))
                .map_err(|error| format!("load zone catalog: {error}"))?;
            info!(path = %path, zones = catalog.len(), "zone_catalog_loaded");
            catalog
        }
        Err(_) => ZoneCatalog::museum(),
    };

    Ok(AppWiring {
        script,
        catalog,
        store: FileStore::new(app_paths.progress_dir),
        initial_speed: parse_speed(std::env::var(SPEED_ENV_VAR).ok().as_deref())?,
        reset_progress: args.reset_progress,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub(crate) fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut script_path: Option<PathBuf> = None;
    let mut reset_progress = false;
    for arg in args {
        if arg == RESET_FLAG {
            reset_progress = true;
        } else if arg.starts_with("--") {
            return Err(format!("unknown flag '{arg}'"));
        } else if script_path.is_none() {
            script_path = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected extra argument '{arg}'"));
        }
    }
    let script_path =
        script_path.ok_or_else(|| "usage: walkthrough <script.json> [--reset]".to_string())?;
    Ok(CliArgs {
        script_path,
        reset_progress,
    })
}

fn parse_speed(raw: Option<&str>) -> Result<f32, String> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_SPEED);
    };
    match raw.parse::<f32>() {
        Ok(speed) if speed.is_finite() => Ok(speed),
        _ => Err(format!("{SPEED_ENV_VAR} '{raw}' is not a finite number")),
    }
}
