use glam::Vec3;
use serde::{Deserialize, Serialize};
use trackway_common::Pose;

use crate::follow::{CameraConfig, CameraState, FollowCamera};
use crate::free::FreeCamera;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Follow,
    Free,
}

impl std::fmt::Display for CameraMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraMode::Follow => f.write_str("follow"),
            CameraMode::Free => f.write_str("free"),
        }
    }
}

/// Owns both cameras and decides which one drives the view each tick.
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    mode: CameraMode,
    follow: FollowCamera,
    free: FreeCamera,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            mode: CameraMode::Follow,
            follow: FollowCamera::new(config),
            free: FreeCamera::default(),
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn follow(&self) -> &FollowCamera {
        &self.follow
    }

    pub fn free(&self) -> &FreeCamera {
        &self.free
    }

    /// Switch modes. Entering free mode starts from the follow camera's
    /// current view; returning to follow glides from the free camera's view.
    pub fn toggle(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::Follow => {
                if let Some(view) = self.follow.state() {
                    self.free = FreeCamera::looking_at(view.position, view.look_at);
                }
                CameraMode::Free
            }
            CameraMode::Free => {
                self.follow.place(self.free.state());
                CameraMode::Follow
            }
        };
        tracing::debug!(mode = %self.mode, "camera mode changed");
        self.mode
    }

    /// Drive the active camera for one tick. `free_delta` only applies in
    /// free mode; the vehicle pose only matters in follow mode.
    pub fn update(&mut self, vehicle: &Pose, free_delta: Vec3) -> CameraState {
        match self.mode {
            CameraMode::Follow => {
                let lerp = self.follow.config().lerp_factor;
                self.follow.update(vehicle, lerp)
            }
            CameraMode::Free => {
                self.free.translate(free_delta);
                self.free.state()
            }
        }
    }

    /// Current view, `None` in follow mode before the first update.
    pub fn view(&self) -> Option<CameraState> {
        match self.mode {
            CameraMode::Follow => self.follow.state(),
            CameraMode::Free => Some(self.free.state()),
        }
    }
}
