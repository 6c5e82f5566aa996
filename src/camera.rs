use glam::{Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Rotate,
    Translate,
    Scale,
}

/// Mouse-driven orbit camera: drag rotates, ctrl-drag pans, shift-drag zooms
pub struct Camera {
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    pub rotations: Vec2,
    pub translations: Vec3,
    mouse_prev: Vec2,
    mode: CameraMode,
    rfactor: f32,
    tfactor: f32,
    sfactor: f32,
}

impl Camera {
    pub fn new(translations: Vec3) -> Camera {
        Camera {
            aspect: 1.0,
            fovy: 45.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
            rotations: Vec2::ZERO,
            translations,
            mouse_prev: Vec2::ZERO,
            mode: CameraMode::Rotate,
            rfactor: 0.01,
            tfactor: 0.001,
            sfactor: 0.005,
        }
    }

    pub fn set_aspect(self: &mut Self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn mouse_clicked(self: &mut Self, x: f32, y: f32, shift: bool, ctrl: bool, _alt: bool) {
        self.mouse_prev = Vec2::new(x, y);

        self.mode = if shift {
            CameraMode::Scale
        }
        else if ctrl {
            CameraMode::Translate
        }
        else {
            CameraMode::Rotate
        };
    }

    pub fn mouse_moved(self: &mut Self, x: f32, y: f32) {
        let mouse_curr = Vec2::new(x, y);
        let dv = mouse_curr - self.mouse_prev;

        match self.mode {
            CameraMode::Rotate => {
                self.rotations += self.rfactor * dv;
            }
            CameraMode::Translate => {
                self.translations.x -= self.tfactor * dv.x;
                self.translations.y += self.tfactor * dv.y;
            }
            CameraMode::Scale => {
                self.translations.z *= 1.0 - self.sfactor * dv.y;
            }
        }

        self.mouse_prev = mouse_curr;
    }

    pub fn mode(self: &Self) -> CameraMode {
        self.mode
    }

    pub fn projection_matrix(self: &Self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(self: &Self) -> Mat4 {
        Mat4::from_translation(self.translations)
            * Mat4::from_axis_angle(Vec3::X, self.rotations.y)
            * Mat4::from_axis_angle(Vec3::Y, self.rotations.x)
    }
}
