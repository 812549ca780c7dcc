use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};

/// Identifies which physical pointer produced an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch(u64),
}

/// Raw pointer samples in window coordinates (logical px, y grows downward).
///
/// Samples without coordinate data are never emitted, so consumers can treat
/// every event as actionable.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Pressed {
        source: PointerSource,
        position: Vec2,
    },
    Moved {
        source: PointerSource,
        position: Vec2,
    },
    Released {
        source: PointerSource,
        position: Vec2,
    },
    /// The platform aborted a touch.
    Cancelled { source: PointerSource },
    /// The mouse left the window, or was released somewhere we can't see.
    Left { source: PointerSource },
}

impl PointerInput {
    pub const fn source(&self) -> PointerSource {
        match *self {
            Self::Pressed { source, .. }
            | Self::Moved { source, .. }
            | Self::Released { source, .. }
            | Self::Cancelled { source }
            | Self::Left { source } => source,
        }
    }
}

pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointerInput>()
            .add_systems(
                PreUpdate,
                (sample_mouse, sample_touches).chain().after(InputSystem),
            );
    }
}

fn sample_mouse(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cursor_moved: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    mut writer: EventWriter<PointerInput>,
) {
    let source = PointerSource::Mouse;

    // Only the latest position matters, deltas are measured from the origin.
    if let Some(moved) = cursor_moved.read().last() {
        writer.send(PointerInput::Moved {
            source,
            position: moved.position,
        });
    }

    let cursor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position);

    if buttons.just_pressed(MouseButton::Left) {
        if let Some(position) = cursor {
            writer.send(PointerInput::Pressed { source, position });
        }
    }

    if buttons.just_released(MouseButton::Left) {
        match cursor {
            Some(position) => {
                writer.send(PointerInput::Released { source, position });
            }
            None => {
                writer.send(PointerInput::Left { source });
            }
        }
    }

    if cursor_left.read().next().is_some() {
        writer.send(PointerInput::Left { source });
    }
}

fn sample_touches(touches: Res<Touches>, mut writer: EventWriter<PointerInput>) {
    for touch in touches.iter_just_pressed() {
        writer.send(PointerInput::Pressed {
            source: PointerSource::Touch(touch.id()),
            position: touch.position(),
        });
    }

    for touch in touches.iter() {
        if touches.just_pressed(touch.id()) || touch.delta() == Vec2::ZERO {
            continue;
        }
        writer.send(PointerInput::Moved {
            source: PointerSource::Touch(touch.id()),
            position: touch.position(),
        });
    }

    for touch in touches.iter_just_released() {
        writer.send(PointerInput::Released {
            source: PointerSource::Touch(touch.id()),
            position: touch.position(),
        });
    }

    for touch in touches.iter_just_canceled() {
        writer.send(PointerInput::Cancelled {
            source: PointerSource::Touch(touch.id()),
        });
    }
}
