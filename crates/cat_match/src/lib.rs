use bevy::prelude::*;
use bits_helpers::restart::RestartPlugin;
use bits_helpers::{BitOptions, FONT};

pub mod cards;
pub mod deck;
pub mod effects;
pub mod exit;
pub mod pointer;
pub mod preferences;
pub mod ribbit;
pub mod screen;
pub mod source;
pub mod swipe;

use cards::CardPlugin;
use deck::Deck;
use effects::EffectsPlugin;
use preferences::PreferencesPlugin;
use screen::ScreenPlugin;
use source::SourcePlugin;
use swipe::SwipePlugin;

const BACKGROUND: Color = Color::srgb(0.99, 0.96, 0.96);

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Items are being fetched, entered on start and on every restart.
    #[default]
    Loading,
    Playing,
    Summary,
    FetchFailed,
}

/// Deck mutations happen in `Resolve`, everything drawn from the deck in
/// `Present`, so a frame never shows a card the deck already moved past.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSet {
    Resolve,
    Present,
}

#[derive(Resource)]
pub struct UiFont(pub Handle<Font>);

impl FromWorld for UiFont {
    fn from_world(world: &mut World) -> Self {
        world
            .get_resource::<AssetServer>()
            .map_or_else(|| Self(Handle::default()), |asset_server| Self(asset_server.load(FONT)))
    }
}

pub fn run() {
    bits_helpers::get_default_app::<ribbit::CatMatch>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        BitOptions {
            capture_pointer: true,
            web_assets: true,
            clear_color: BACKGROUND,
        },
    )
    .init_state::<GameState>()
    .init_resource::<UiFont>()
    .configure_sets(Update, (CardSet::Resolve, CardSet::Present).chain())
    .add_plugins((
        SwipePlugin,
        SourcePlugin,
        PreferencesPlugin,
        CardPlugin,
        ScreenPlugin,
        EffectsPlugin,
        RestartPlugin::<Deck>::default(),
    ))
    .add_systems(Startup, setup)
    .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
