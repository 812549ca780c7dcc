use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::{WINDOW_HEIGHT, WINDOW_WIDTH};

/// Logical size of the primary window, refreshed every frame.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

impl Viewport {
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Window px (origin top-left, y down) to 2d world units for a camera
    /// centered on the window.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.width / 2.0, self.height / 2.0 - screen.y)
    }
}

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .add_systems(PreUpdate, track_viewport);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(PreUpdate, handle_browser_resize.before(track_viewport));
    }
}

fn track_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    let current = Viewport {
        width: window.width(),
        height: window.height(),
    };
    if *viewport != current {
        *viewport = current;
    }
}

#[cfg(target_arch = "wasm32")]
fn handle_browser_resize(mut primary_query: Query<&mut Window, With<PrimaryWindow>>) {
    // wgpu refuses surfaces bigger than this on most browsers.
    const MAX_SIZE: f32 = 2048.0;

    let Some(wasm_window) = web_sys::window() else {
        return;
    };
    let (Ok(inner_width), Ok(inner_height)) = (wasm_window.inner_width(), wasm_window.inner_height())
    else {
        return;
    };
    let (Some(target_width), Some(target_height)) = (inner_width.as_f64(), inner_height.as_f64())
    else {
        return;
    };

    let width = (target_width as f32).min(MAX_SIZE);
    let height = (target_height as f32).min(MAX_SIZE);

    for mut window in &mut primary_query {
        if (window.resolution.width() - width).abs() > f32::EPSILON
            || (window.resolution.height() - height).abs() > f32::EPSILON
        {
            window.resolution.set(width, height);
        }
    }
}
