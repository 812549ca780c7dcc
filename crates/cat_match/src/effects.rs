use core::time::Duration;

use bevy::color::palettes::css::CRIMSON;
use bevy::prelude::*;
use bits_helpers::floating_label::{FloatingLabelPlugin, spawn_floating_label};
use bits_helpers::viewport::Viewport;

use crate::exit::CardResolved;
use crate::swipe::Verdict;
use crate::{CardSet, GameState, UiFont};

const HEART: &str = "♥";
const HEARTS_PER_LIKE: usize = 5;
const HEART_LIFETIME: Duration = Duration::from_secs(2);

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FloatingLabelPlugin).add_systems(
            Update,
            celebrate_likes
                .after(CardSet::Resolve)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Where the hearts of one like start and how big they are: random x across
/// the screen, half way down, 15 to 25 px.
pub fn scatter_hearts(rng: &mut fastrand::Rng, viewport: &Viewport) -> Vec<(Vec2, f32)> {
    (0..HEARTS_PER_LIKE)
        .map(|_| {
            let position = Vec2::new(rng.f32() * viewport.width, viewport.height / 2.0);
            let size = rng.f32().mul_add(10.0, 15.0);
            (position, size)
        })
        .collect()
}

/// Hearts go up once a like has landed in the deck, not when the card
/// starts flying.
fn celebrate_likes(
    mut commands: Commands,
    mut resolved: EventReader<CardResolved>,
    font: Res<UiFont>,
    viewport: Res<Viewport>,
) {
    let mut rng = fastrand::Rng::new();
    for card in resolved.read() {
        if card.verdict != Verdict::Like {
            continue;
        }
        for (position, size) in scatter_hearts(&mut rng, &viewport) {
            spawn_floating_label(
                &mut commands,
                font.0.clone(),
                position,
                HEART,
                size,
                CRIMSON,
                HEART_LIFETIME,
            );
        }
    }
}
