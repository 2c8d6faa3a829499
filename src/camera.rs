use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Units per second for WASD movement.
pub const MOVE_SPEED: f32 = 50.0;
/// Radians per second for arrow-key rotation.
pub const ROTATE_SPEED: f32 = 1.5;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perspective {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov: 45.0,
            aspect: 1.0,
            near: 0.1,
        }
    }
}

impl Perspective {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_infinite_rh(self.fov.to_radians(), self.aspect, self.near)
    }
}

/// Free-flying camera, -z forward in its own space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub projection: Perspective,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(25.0, 18.0, 45.0),
            yaw: -7.0_f32.to_radians(),
            pitch: -10.0_f32.to_radians(),
            projection: Perspective::default(),
        }
    }
}

impl Camera {
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.projection.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera-to-world transform.
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection.projection() * self.view().inverse()
    }

    /// Applies one frame of fly-controls. `movement` is in camera space
    /// (x strafe, y up, -z forward), `look` is (yaw, pitch) input.
    pub fn drive(&mut self, movement: Vec3, look: Vec2, delta_time: f32) {
        self.yaw += look.x * ROTATE_SPEED * delta_time;
        self.pitch += look.y * ROTATE_SPEED * delta_time;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        if movement != Vec3::ZERO {
            let step = self.rotation() * (movement.normalize() * MOVE_SPEED * delta_time);
            self.position += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_camera() -> Camera {
        Camera {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            projection: Perspective::default(),
        }
    }

    #[test]
    fn forward_movement_follows_negative_z() {
        let mut camera = level_camera();
        camera.drive(Vec3::NEG_Z, Vec2::ZERO, 1.0);
        assert!(camera.position.z < -49.0);
        assert!(camera.position.x.abs() < 1e-4);
    }

    #[test]
    fn quarter_turn_redirects_forward() {
        let mut camera = level_camera();
        camera.yaw = std::f32::consts::FRAC_PI_2;
        let forward = camera.rotation() * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut camera = level_camera();
        camera.drive(Vec3::ZERO, Vec2::new(0.0, 10.0), 10.0);
        assert!(camera.pitch <= PITCH_LIMIT);
        camera.drive(Vec3::ZERO, Vec2::new(0.0, -10.0), 10.0);
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn view_proj_projects_points_ahead_into_clip_space() {
        let mut camera = level_camera();
        camera.set_aspect(1920, 1080);
        let clip = camera.view_proj().project_point3(Vec3::new(0.0, 0.0, -10.0));
        assert!(clip.x.abs() < 1e-4);
        assert!(clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z <= 1.0);
    }

    #[test]
    fn diagonal_movement_is_speed_limited() {
        let mut camera = level_camera();
        camera.drive(Vec3::new(1.0, 0.0, -1.0), Vec2::ZERO, 1.0);
        assert!((camera.position.length() - MOVE_SPEED).abs() < 1e-3);
    }
}
