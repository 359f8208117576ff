use tracing::trace;

use crate::geometry::{horizontal_distance, Vec3};

/// Extra distance kept between the camera and mesh geometry along the
/// movement direction.
pub const COLLISION_MARGIN: f32 = 0.5;
pub const BARRIER_CLEARANCE: f32 = 2.0;

const RAY_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }
}

pub trait RayTarget {
    fn ray_distance(&self, ray: &Ray) -> Option<f32>;
}

/// Axis-aligned box. A ray starting inside reports the exit distance, so the
/// walls of a room modeled as one box still block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }
}

impl RayTarget for Aabb {
    fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
        let direction = [ray.direction.x, ray.direction.y, ray.direction.z];
        let min = [self.min.x, self.min.y, self.min.z];
        let max = [self.max.x, self.max.y, self.max.z];

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            if direction[axis].abs() < RAY_EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = direction[axis].recip();
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            None
        } else if t_near >= 0.0 {
            Some(t_near)
        } else {
            Some(t_far)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    triangles: Vec<[Vec3; 3]>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<[Vec3; 3]>) -> Self {
        Self { triangles }
    }

    pub fn wall(from: Vec3, to: Vec3, bottom: f32, top: f32) -> Self {
        let a = Vec3::new(from.x, bottom, from.z);
        let b = Vec3::new(to.x, bottom, to.z);
        let c = Vec3::new(to.x, top, to.z);
        let d = Vec3::new(from.x, top, from.z);
        Self::new(vec![[a, b, c], [a, c, d]])
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl RayTarget for TriangleMesh {
    fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        self.triangles
            .iter()
            .filter_map(|triangle| intersect_triangle(ray, triangle))
            .min_by(f32::total_cmp)
    }
}

fn intersect_triangle(ray: &Ray, [a, b, c]: &[Vec3; 3]) -> Option<f32> {
    let edge1 = *b - *a;
    let edge2 = *c - *a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < RAY_EPSILON {
        return None;
    }
    let inv_det = det.recip();
    let s = ray.origin - *a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularBarrier {
    pub center_x: f32,
    pub center_z: f32,
    pub radius: f32,
}

impl CircularBarrier {
    pub fn new(center_x: f32, center_z: f32, radius: f32) -> Self {
        Self {
            center_x,
            center_z,
            radius,
        }
    }

    pub fn blocks(&self, point: Vec3) -> bool {
        let center = Vec3::new(self.center_x, point.y, self.center_z);
        horizontal_distance(point, center) < self.radius + BARRIER_CLEARANCE
    }
}

pub enum Obstacle {
    Mesh(Box<dyn RayTarget>),
    Barrier(CircularBarrier),
}

impl From<CircularBarrier> for Obstacle {
    fn from(barrier: CircularBarrier) -> Self {
        Obstacle::Barrier(barrier)
    }
}

impl From<Aabb> for Obstacle {
    fn from(aabb: Aabb) -> Self {
        Obstacle::Mesh(Box::new(aabb))
    }
}

impl From<TriangleMesh> for Obstacle {
    fn from(mesh: TriangleMesh) -> Self {
        Obstacle::Mesh(Box::new(mesh))
    }
}

#[derive(Default)]
pub struct ObstacleSet {
    meshes: Vec<Box<dyn RayTarget>>,
    barriers: Vec<CircularBarrier>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, obstacle: impl Into<Obstacle>) {
        match obstacle.into() {
            Obstacle::Mesh(mesh) => self.meshes.push(mesh),
            Obstacle::Barrier(barrier) => self.barriers.push(barrier),
        }
    }

    pub fn with(mut self, obstacle: impl Into<Obstacle>) -> Self {
        self.push(obstacle);
        self
    }

    pub fn extend_barriers(&mut self, barriers: impl IntoIterator<Item = CircularBarrier>) {
        self.barriers.extend(barriers);
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn barriers(&self) -> &[CircularBarrier] {
        &self.barriers
    }

    pub fn nearest_mesh_hit(&self, ray: &Ray) -> Option<f32> {
        self.meshes
            .iter()
            .filter_map(|mesh| mesh.ray_distance(ray))
            .min_by(f32::total_cmp)
    }
}

impl FromIterator<Obstacle> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = Obstacle>>(iter: I) -> Self {
        let mut set = ObstacleSet::new();
        for obstacle in iter {
            set.push(obstacle);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockReason {
    Mesh { distance: f32 },
    Barrier { index: usize },
}

pub fn can_move(movement: Vec3, position: Vec3, obstacles: &ObstacleSet) -> Result<(), BlockReason> {
    // A zero-length move has no ray; only the barriers apply to it.
    if let Some(ray) = Ray::new(position, movement) {
        let travel = movement.length();
        if let Some(distance) = obstacles.nearest_mesh_hit(&ray) {
            if distance < travel + COLLISION_MARGIN {
                trace!(distance, travel, "move_blocked_by_mesh");
                return Err(BlockReason::Mesh { distance });
            }
        }
    }

    let candidate = position + movement;
    if let Some(index) = obstacles
        .barriers
        .iter()
        .position(|barrier| barrier.blocks(candidate))
    {
        trace!(index, "move_blocked_by_barrier");
        return Err(BlockReason::Barrier { index });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at_z(z: f32) -> Aabb {
        Aabb::new(Vec3::new(-50.0, 0.0, z - 0.5), Vec3::new(50.0, 10.0, z))
    }

    #[test]
    fn aabb_reports_entry_distance_from_outside() {
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).expect("ray");
        let distance = wall_at_z(-10.0).ray_distance(&ray).expect("hit");
        assert!((distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_reports_exit_distance_from_inside() {
        let room = Aabb::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 10.0, 5.0));
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).expect("ray");
        let distance = room.ray_distance(&ray).expect("hit");
        assert!((distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_behind_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 1.0)).expect("ray");
        assert_eq!(wall_at_z(-10.0).ray_distance(&ray), None);
    }

    #[test]
    fn triangle_wall_is_hit_from_either_side() {
        let wall = TriangleMesh::wall(
            Vec3::new(-5.0, 0.0, -3.0),
            Vec3::new(5.0, 0.0, -3.0),
            0.0,
            8.0,
        );
        assert_eq!(wall.triangle_count(), 2);
        let toward = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).expect("ray");
        let back = Ray::new(Vec3::new(0.0, 3.0, -6.0), Vec3::new(0.0, 0.0, 1.0)).expect("ray");
        assert!((wall.ray_distance(&toward).expect("front") - 3.0).abs() < 1e-5);
        assert!((wall.ray_distance(&back).expect("back") - 3.0).abs() < 1e-5);
    }

    #[test]
    fn mesh_closer_than_travel_plus_margin_rejects() {
        let obstacles = ObstacleSet::new().with(wall_at_z(-0.8));
        let result = can_move(
            Vec3::new(0.0, 0.0, -0.4),
            Vec3::new(0.0, 4.0, 0.0),
            &obstacles,
        );
        assert!(matches!(result, Err(BlockReason::Mesh { .. })));
    }

    #[test]
    fn mesh_beyond_travel_plus_margin_accepts() {
        let obstacles = ObstacleSet::new().with(wall_at_z(-1.0));
        let result = can_move(
            Vec3::new(0.0, 0.0, -0.4),
            Vec3::new(0.0, 4.0, 0.0),
            &obstacles,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn mesh_exactly_at_travel_plus_margin_accepts() {
        let obstacles = ObstacleSet::new().with(wall_at_z(-1.0));
        let result = can_move(
            Vec3::new(0.0, 0.0, -0.5),
            Vec3::new(0.0, 4.0, 0.0),
            &obstacles,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn barrier_rejects_inside_clearance_and_accepts_just_outside() {
        let barrier = CircularBarrier::new(10.0, 0.0, 8.0);
        let obstacles = ObstacleSet::new().with(barrier);
        let limit = 8.0 + BARRIER_CLEARANCE;
        let origin = Vec3::new(0.0, 4.0, 0.0);

        let inside = Vec3::new(10.0 - limit + 0.01, 0.0, 0.0);
        assert_eq!(
            can_move(inside, origin, &obstacles),
            Err(BlockReason::Barrier { index: 0 })
        );

        let outside = Vec3::new(10.0 - limit - 1e-3, 0.0, 0.0);
        assert_eq!(can_move(outside, origin, &obstacles), Ok(()));
    }

    #[test]
    fn barrier_is_independent_of_approach_angle() {
        let barrier = CircularBarrier::new(0.0, 0.0, 1.0);
        for degrees in [0.0_f32, 45.0, 135.0, 270.0] {
            let (sin, cos) = degrees.to_radians().sin_cos();
            assert!(barrier.blocks(Vec3::new(cos * 2.9, 4.0, sin * 2.9)));
            assert!(!barrier.blocks(Vec3::new(cos * 3.1, 4.0, sin * 3.1)));
        }
    }

    #[test]
    fn empty_obstacles_always_pass() {
        let obstacles = ObstacleSet::new();
        assert_eq!(
            can_move(Vec3::new(3.0, 0.0, 4.0), Vec3::ZERO, &obstacles),
            Ok(())
        );
    }

    #[test]
    fn zero_movement_is_never_raycast() {
        let room = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 10.0, 1.0));
        let obstacles: ObstacleSet = [Obstacle::from(room)].into_iter().collect();
        assert_eq!(can_move(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), &obstacles), Ok(()));
    }

    #[test]
    fn zero_movement_inside_barrier_ring_is_rejected() {
        let obstacles = ObstacleSet::new().with(CircularBarrier::new(0.0, 0.0, 8.0));
        assert_eq!(
            can_move(Vec3::ZERO, Vec3::new(1.0, 4.0, 0.0), &obstacles),
            Err(BlockReason::Barrier { index: 0 })
        );
    }

    #[test]
    fn nearest_hit_spans_all_meshes() {
        let obstacles = ObstacleSet::new()
            .with(wall_at_z(-20.0))
            .with(wall_at_z(-5.0));
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).expect("ray");
        let distance = obstacles.nearest_mesh_hit(&ray).expect("hit");
        assert!((distance - 5.0).abs() < 1e-5);
        assert_eq!(obstacles.mesh_count(), 2);
    }
}
