use std::process::ExitCode;

use showroom_engine::{
    museum_barriers, Aabb, CameraRig, FirstPersonCamera, KeyValueStore, Locomotion, MoveOutcome,
    ObstacleSet, ProgressDetails, ProgressTracker, Vec3,
};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::script::{key_code_from_name, WalkScript};

/// Half extent of the museum floor; the outer walls sit just past it.
const MUSEUM_HALF_EXTENT: f32 = 130.0;
const WALL_THICKNESS: f32 = 1.0;
const WALL_HEIGHT: f32 = 12.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WalkReport {
    pub(crate) frames: u64,
    pub(crate) moved_frames: u64,
    pub(crate) blocked_frames: u64,
    /// Zone ids in the order the walker stepped into them, repeats included.
    pub(crate) zone_entries: Vec<String>,
    pub(crate) final_position: Vec3,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let mut tracker = ProgressTracker::load(app.catalog, app.store);
    if app.reset_progress {
        tracker.reset();
    }
    tracker.subscribe(|details: &ProgressDetails| {
        info!(
            percentage = details.percentage,
            explored = details.explored,
            total = details.total,
            "progress_updated"
        );
    });

    let mut locomotion = Locomotion::new(app.initial_speed);
    let obstacles = museum_obstacles();
    let report = walk(&app.script, &mut locomotion, &obstacles, &mut tracker);
    info!(
        frames = report.frames,
        moved = report.moved_frames,
        blocked = report.blocked_frames,
        x = report.final_position.x,
        z = report.final_position.z,
        "walk_finished"
    );

    match serde_json::to_string_pretty(&tracker.progress_details()) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "summary_encode_failed");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn museum_obstacles() -> ObstacleSet {
    let outer = MUSEUM_HALF_EXTENT + WALL_THICKNESS;
    let mut obstacles = ObstacleSet::new()
        .with(Aabb::new(
            Vec3::new(-outer, 0.0, -outer),
            Vec3::new(outer, WALL_HEIGHT, -MUSEUM_HALF_EXTENT),
        ))
        .with(Aabb::new(
            Vec3::new(-outer, 0.0, MUSEUM_HALF_EXTENT),
            Vec3::new(outer, WALL_HEIGHT, outer),
        ))
        .with(Aabb::new(
            Vec3::new(-outer, 0.0, -outer),
            Vec3::new(-MUSEUM_HALF_EXTENT, WALL_HEIGHT, outer),
        ))
        .with(Aabb::new(
            Vec3::new(MUSEUM_HALF_EXTENT, 0.0, -outer),
            Vec3::new(outer, WALL_HEIGHT, outer),
        ));
    obstacles.extend_barriers(museum_barriers());
    obstacles
}

pub(crate) fn walk<S: KeyValueStore>(
    script: &WalkScript,
    locomotion: &mut Locomotion,
    obstacles: &ObstacleSet,
    tracker: &mut ProgressTracker<S>,
) -> WalkReport {
    let mut camera = FirstPersonCamera::at(script.start.x, script.start.z);
    camera.set_yaw_degrees(script.yaw_degrees);
    camera.lock();

    let mut report = WalkReport::default();
    let mut last_zone: Option<String> = None;

    for segment in &script.segments {
        if let Some(yaw) = segment.yaw_degrees {
            camera.set_yaw_degrees(yaw);
        }
        if let Some(speed) = segment.speed {
            locomotion.set_speed(speed);
        }
        match segment.locked {
            Some(true) => camera.lock(),
            Some(false) => camera.unlock(),
            None => {}
        }
        locomotion.release_all();
        for key in segment.keys.iter().filter_map(|name| key_code_from_name(name)) {
            locomotion.handle_key(key, true);
        }

        for _ in 0..segment.repeat {
            report.frames += 1;
            match locomotion.step(&mut camera, obstacles) {
                MoveOutcome::Moved { .. } => report.moved_frames += 1,
                MoveOutcome::Blocked(_) => report.blocked_frames += 1,
                MoveOutcome::Inactive | MoveOutcome::Idle => {}
            }

            let zone_id = tracker
                .check_position(camera.position())
                .map(|zone| zone.id.clone());
            if zone_id != last_zone {
                if let Some(id) = &zone_id {
                    debug!(zone = %id, frame = report.frames, "zone_entered");
                    report.zone_entries.push(id.clone());
                }
                last_zone = zone_id;
            }
        }
    }

    report.final_position = camera.position();
    report
}
