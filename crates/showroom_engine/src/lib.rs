use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod geometry;
pub mod motion;
pub mod progress;

pub use geometry::{horizontal_distance, Vec3};
pub use motion::{
    can_move, movement_vector, museum_barriers, museum_button_anchors, Aabb, BlockReason,
    ButtonAnchor, CameraRig, CircularBarrier, DirectionState, FirstPersonCamera, Locomotion,
    MoveDirection, MoveIntent, MoveOutcome, Obstacle, ObstacleSet, Ray, RayTarget, TriangleMesh,
    BARRIER_CLEARANCE, COLLISION_MARGIN, DEFAULT_SPEED, EYE_HEIGHT,
};
pub use progress::{
    BrandProgress, CatalogError, CatalogErrorCode, FileStore, KeyValueStore, MemoryStore,
    ProgressDetails, ProgressRecord, ProgressTracker, SourceLocation, StoreError, SubscriptionId,
    Zone, ZoneBounds, ZoneCatalog, PROGRESS_STORE_KEY,
};

pub const ROOT_ENV_VAR: &str = "SHOWROOM_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub progress_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create progress directory at {path}: {source}")]
    CreateProgressDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "SHOWROOM_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/showroom\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_for_root(root)
}

pub fn app_paths_for_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let cache_dir = root.join("cache");
    let progress_dir = cache_dir.join("progress");

    fs::create_dir_all(&progress_dir).map_err(|source| StartupError::CreateProgressDir {
        path: progress_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        cache_dir,
        progress_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
