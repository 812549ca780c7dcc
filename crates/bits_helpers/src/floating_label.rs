use core::time::Duration;

use bevy::prelude::*;

/// How far a label travels upward over its lifetime, in px.
const RISE: f32 = 120.0;

/// A UI text that drifts upward and fades out, then despawns itself.
#[derive(Component)]
pub struct FloatingLabel {
    timer: Timer,
    origin: Vec2,
}

impl FloatingLabel {
    pub fn new(origin: Vec2, lifetime: Duration) -> Self {
        Self {
            timer: Timer::new(lifetime, TimerMode::Once),
            origin,
        }
    }

    /// Screen position and opacity at the current point of the animation.
    pub fn sample(&self) -> (Vec2, f32) {
        let progress = self.timer.fraction();
        let position = Vec2::new(self.origin.x, RISE.mul_add(-progress, self.origin.y));
        (position, 1.0 - progress)
    }
}

pub struct FloatingLabelPlugin;

impl Plugin for FloatingLabelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, animate_floating_labels);
    }
}

pub fn spawn_floating_label(
    commands: &mut Commands,
    font: Handle<Font>,
    position: Vec2,
    text: &str,
    font_size: f32,
    color: Srgba,
    lifetime: Duration,
) {
    commands.spawn((
        Text::new(text),
        TextFont {
            font,
            font_size,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        TextLayout::new_with_no_wrap(),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(position.x),
            top: Val::Px(position.y),
            ..default()
        },
        FloatingLabel::new(position, lifetime),
    ));
}

fn animate_floating_labels(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Node, &mut TextColor, &mut FloatingLabel)>,
) {
    for (entity, mut node, mut color, mut label) in &mut query {
        label.timer.tick(time.delta());
        let (position, alpha) = label.sample();

        node.top = Val::Px(position.y);
        color.0 = color.0.with_alpha(alpha);

        if label.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
