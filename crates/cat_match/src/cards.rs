use core::time::Duration;

use bevy::image::{ImageFormatSetting, ImageLoaderSettings};
use bevy::prelude::*;
use bits_helpers::viewport::Viewport;

use crate::deck::{CardKey, Deck, Item};
use crate::pointer::PointerTracker;
use crate::swipe::{CardTransform, Intent, SwipeCard, SwipeConfig};
use crate::{CardSet, GameState, UiFont};

pub const CARD_SIZE: Vec2 = Vec2::new(280.0, 360.0);
const PHOTO_SIZE: Vec2 = Vec2::new(256.0, 296.0);
const PREVIEW_SCALE: f32 = 0.95;
/// The preview peeks out below the top card, in screen px.
const PREVIEW_DROP: f32 = 12.0;

const CARD_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const PREVIEW_COLOR: Color = Color::srgb(0.93, 0.93, 0.95);
const NAME_COLOR: Color = Color::srgb(0.2, 0.2, 0.25);
const LIKE_COLOR: Color = Color::srgb(0.13, 0.77, 0.37);
const PASS_COLOR: Color = Color::srgb(0.94, 0.27, 0.27);

/// The next item, drawn behind the top card.
#[derive(Component, Debug)]
pub struct PreviewCard {
    pub position: usize,
}

#[derive(Component)]
pub struct IntentBadge;

/// The picture of a card's item, drawn over its placeholder.
#[derive(Component)]
pub struct CardPhoto;

/// What is actually drawn. Follows the swipe target instantly while the card
/// is held, eases toward it (ease-out cubic) otherwise.
#[derive(Component, Debug)]
pub struct CardMotion {
    from: CardTransform,
    to: CardTransform,
    shown: CardTransform,
    timer: Timer,
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(3)
}

impl CardMotion {
    pub fn new(ease_duration: Duration) -> Self {
        Self {
            from: CardTransform::IDENTITY,
            to: CardTransform::IDENTITY,
            shown: CardTransform::IDENTITY,
            timer: Timer::new(ease_duration, TimerMode::Once),
        }
    }

    pub const fn shown(&self) -> CardTransform {
        self.shown
    }

    pub fn step(&mut self, target: CardTransform, dragging: bool, delta: Duration) {
        if dragging {
            self.from = target;
            self.to = target;
            self.shown = target;
            return;
        }

        if target != self.to {
            self.from = self.shown;
            self.to = target;
            self.timer.reset();
        }
        self.timer.tick(delta);
        self.shown = self.from.lerp(self.to, ease_out_cubic(self.timer.fraction()));
    }
}

pub struct CardPlugin;

impl Plugin for CardPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (sync_cards, animate_cards, sync_tracker_bounds, update_badges)
                .chain()
                .in_set(CardSet::Present)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(OnExit(GameState::Playing), despawn_cards);
    }
}

/// Clockwise-positive degrees in screen space become a z rotation in world
/// space (y up).
fn world_transform(offset: CardTransform, rest: Vec2, viewport: &Viewport, z: f32) -> Transform {
    let position = viewport.to_world(rest + Vec2::new(offset.x, offset.y));
    Transform::from_xyz(position.x, position.y, z)
        .with_rotation(Quat::from_rotation_z(-offset.rotation_degrees.to_radians()))
}

fn photo_color(item: &Item) -> Color {
    let hue = (item.id % 10) as f32 * 36.0;
    Color::hsl(hue, 0.45, 0.72)
}

/// Item URLs have no file extension. The trailing `.jpg` picks the image
/// loader, the bytes decide the actual format.
fn photo_path(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}format=.jpg")
}

fn load_photo(asset_server: Option<&AssetServer>, item: &Item) -> Option<Handle<Image>> {
    asset_server.map(|asset_server| {
        asset_server.load_with_settings(
            photo_path(&item.url),
            |settings: &mut ImageLoaderSettings| settings.format = ImageFormatSetting::Guess,
        )
    })
}

/// The placeholder stays visible until the photo is loaded, and for good if
/// it never is.
fn spawn_card_face(
    parent: &mut ChildBuilder,
    item: &Item,
    photo: Option<Handle<Image>>,
    font: &UiFont,
) {
    parent.spawn((
        Sprite::from_color(photo_color(item), PHOTO_SIZE),
        Transform::from_xyz(0.0, 20.0, 0.1),
    ));
    if let Some(image) = photo {
        parent.spawn((
            CardPhoto,
            Sprite {
                image,
                custom_size: Some(PHOTO_SIZE),
                ..default()
            },
            Transform::from_xyz(0.0, 20.0, 0.15),
        ));
    }
    parent.spawn((
        Text2d::new(item.name.clone()),
        TextFont {
            font: font.0.clone(),
            font_size: 22.0,
            ..default()
        },
        TextColor(NAME_COLOR),
        Transform::from_xyz(0.0, -152.0, 0.2),
    ));
}

fn spawn_active_card(
    commands: &mut Commands,
    key: CardKey,
    item: &Item,
    photo: Option<Handle<Image>>,
    font: &UiFont,
    config: &SwipeConfig,
    viewport: &Viewport,
) {
    let rest = viewport.center();
    commands
        .spawn((
            SwipeCard::new(key),
            PointerTracker::attach(Rect::from_center_size(rest, CARD_SIZE)),
            CardMotion::new(config.ease_duration),
            Sprite::from_color(CARD_COLOR, CARD_SIZE),
            world_transform(CardTransform::IDENTITY, rest, viewport, 1.0),
        ))
        .with_children(|parent| {
            spawn_card_face(parent, item, photo, font);
            parent.spawn((
                IntentBadge,
                Text2d::default(),
                TextFont {
                    font: font.0.clone(),
                    font_size: 36.0,
                    ..default()
                },
                TextColor(LIKE_COLOR),
                Transform::from_xyz(0.0, 130.0, 0.3),
                Visibility::Hidden,
            ));
        });
    debug!("Showing {} at {}", item.name, key.position);
}

fn spawn_preview_card(
    commands: &mut Commands,
    position: usize,
    item: &Item,
    photo: Option<Handle<Image>>,
    font: &UiFont,
    viewport: &Viewport,
) {
    let rest = viewport.center() + Vec2::new(0.0, PREVIEW_DROP);
    commands
        .spawn((
            PreviewCard { position },
            Sprite::from_color(PREVIEW_COLOR, CARD_SIZE),
            world_transform(CardTransform::IDENTITY, rest, viewport, 0.0)
                .with_scale(Vec3::splat(PREVIEW_SCALE)),
        ))
        .with_children(|parent| spawn_card_face(parent, item, photo, font));
}

/// A card belongs to exactly one deck slot; when the deck moves on the old
/// card goes away and a fresh one (identity transform, no badge) takes over.
pub fn sync_cards(
    mut commands: Commands,
    deck: Option<Res<Deck>>,
    asset_server: Option<Res<AssetServer>>,
    font: Res<UiFont>,
    config: Res<SwipeConfig>,
    viewport: Res<Viewport>,
    cards: Query<(Entity, &SwipeCard)>,
    previews: Query<(Entity, &PreviewCard)>,
) {
    let Some(deck) = deck else {
        return;
    };

    let current = deck.current_key();
    let mut current_shown = false;
    for (entity, card) in &cards {
        if Some(card.key()) == current {
            current_shown = true;
        } else {
            commands.entity(entity).despawn_recursive();
        }
    }
    if let (false, Some(key), Some(item)) = (current_shown, current, deck.current()) {
        let photo = load_photo(asset_server.as_deref(), item);
        spawn_active_card(&mut commands, key, item, photo, &font, &config, &viewport);
    }

    let preview_position = deck.position() + 1;
    let mut preview_shown = false;
    for (entity, preview) in &previews {
        if preview.position == preview_position {
            preview_shown = true;
        } else {
            commands.entity(entity).despawn_recursive();
        }
    }
    if let (false, Some(item)) = (preview_shown, deck.next_preview()) {
        let photo = load_photo(asset_server.as_deref(), item);
        spawn_preview_card(&mut commands, preview_position, item, photo, &font, &viewport);
    }
}

pub fn animate_cards(
    time: Res<Time>,
    viewport: Res<Viewport>,
    mut cards: Query<(&SwipeCard, &mut CardMotion, &mut Transform)>,
) {
    for (card, mut motion, mut transform) in &mut cards {
        motion.step(card.target(), card.is_dragging(), time.delta());
        *transform = world_transform(motion.shown(), viewport.center(), &viewport, 1.0);
    }
}

pub fn sync_tracker_bounds(
    viewport: Res<Viewport>,
    mut cards: Query<(&CardMotion, &mut PointerTracker)>,
) {
    for (motion, mut tracker) in &mut cards {
        let shown = motion.shown();
        let center = viewport.center() + Vec2::new(shown.x, shown.y);
        tracker.set_bounds(Rect::from_center_size(center, CARD_SIZE));
    }
}

pub fn update_badges(
    cards: Query<(&SwipeCard, &Children), Changed<SwipeCard>>,
    mut badges: Query<(&mut Text2d, &mut TextColor, &mut Visibility), With<IntentBadge>>,
) {
    for (card, children) in &cards {
        let intent = card.intent();
        for &child in children {
            let Ok((mut text, mut color, mut visibility)) = badges.get_mut(child) else {
                continue;
            };
            text.0 = intent.to_string();
            *visibility = match intent {
                Intent::None => Visibility::Hidden,
                Intent::Like => {
                    color.0 = LIKE_COLOR;
                    Visibility::Inherited
                }
                Intent::Dislike => {
                    color.0 = PASS_COLOR;
                    Visibility::Inherited
                }
            };
        }
    }
}

fn despawn_cards(
    mut commands: Commands,
    cards: Query<Entity, Or<(With<SwipeCard>, With<PreviewCard>)>>,
) {
    for entity in &cards {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::items;

    const EASE: Duration = Duration::from_millis(300);

    fn offset(x: f32) -> CardTransform {
        CardTransform {
            x,
            y: 0.0,
            rotation_degrees: x * 0.1,
        }
    }

    #[test]
    fn easing_curve_hits_both_ends() {
        assert!(ease_out_cubic(0.0).abs() < f32::EPSILON, "starts at zero");
        assert!((ease_out_cubic(1.0) - 1.0).abs() < f32::EPSILON, "ends at one");
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6, "fast start, slow end");
        assert!((ease_out_cubic(2.0) - 1.0).abs() < f32::EPSILON, "clamped");
    }

    #[test]
    fn held_card_has_no_lag() {
        let mut motion = CardMotion::new(EASE);
        motion.step(offset(80.0), true, Duration::ZERO);
        assert_eq!(motion.shown(), offset(80.0), "shown equals target while held");
        motion.step(offset(-15.0), true, Duration::from_millis(1));
        assert_eq!(motion.shown(), offset(-15.0), "still no lag");
    }

    #[test]
    fn released_card_eases_home() {
        let mut motion = CardMotion::new(EASE);
        motion.step(offset(100.0), true, Duration::ZERO);

        motion.step(CardTransform::IDENTITY, false, Duration::ZERO);
        assert_eq!(motion.shown(), offset(100.0), "easing starts where the card was");

        motion.step(CardTransform::IDENTITY, false, Duration::from_millis(150));
        assert!((motion.shown().x - 12.5).abs() < 1e-3, "halfway in time, got {:?}", motion.shown());

        motion.step(CardTransform::IDENTITY, false, Duration::from_millis(150));
        assert_eq!(motion.shown(), CardTransform::IDENTITY, "home after the ease");
    }

    #[test]
    fn new_target_mid_ease_starts_from_the_shown_position() {
        let mut motion = CardMotion::new(EASE);
        motion.step(offset(360.0), false, Duration::from_millis(150));
        let halfway = motion.shown();

        motion.step(offset(-360.0), false, Duration::ZERO);
        assert_eq!(motion.shown(), halfway, "no jump when retargeting");
    }

    #[test]
    fn world_transform_flips_y_and_rotation() {
        let viewport = Viewport::default();
        let transform = world_transform(
            CardTransform {
                x: 10.0,
                y: 20.0,
                rotation_degrees: 90.0,
            },
            viewport.center(),
            &viewport,
            1.0,
        );
        assert_eq!(transform.translation, Vec3::new(10.0, -20.0, 1.0), "down is negative y");
        let (axis, angle) = transform.rotation.to_axis_angle();
        assert!(
            (axis.z * angle + core::f32::consts::FRAC_PI_2).abs() < 1e-4,
            "clockwise on screen is negative around z"
        );
    }

    fn card_app(count: u32) -> App {
        let mut app = App::new();
        app.init_resource::<UiFont>()
            .init_resource::<SwipeConfig>()
            .init_resource::<Viewport>()
            .insert_resource(Deck::new(items(count)))
            .add_systems(Update, sync_cards);
        app
    }

    fn shown_keys(app: &mut App) -> Vec<CardKey> {
        app.world_mut()
            .query::<&SwipeCard>()
            .iter(app.world())
            .map(SwipeCard::key)
            .collect()
    }

    fn preview_positions(app: &mut App) -> Vec<usize> {
        app.world_mut()
            .query::<&PreviewCard>()
            .iter(app.world())
            .map(|preview| preview.position)
            .collect()
    }

    #[test]
    fn one_card_per_deck_slot() {
        let mut app = card_app(3);
        app.update();
        app.update();

        let expected = app.world().resource::<Deck>().current_key();
        assert_eq!(shown_keys(&mut app), expected.into_iter().collect::<Vec<_>>(), "top card");
        assert_eq!(preview_positions(&mut app), vec![1], "preview of the next item");
    }

    #[test]
    fn advancing_replaces_the_card() {
        let mut app = card_app(2);
        app.update();

        app.world_mut()
            .resource_mut::<Deck>()
            .reject_current()
            .expect("first item exists");
        app.update();

        let keys = shown_keys(&mut app);
        assert_eq!(keys.len(), 1, "old card gone, new card in");
        assert_eq!(keys.first().map(|key| key.position), Some(1), "second slot");
        assert!(preview_positions(&mut app).is_empty(), "nothing left to preview");

        let mut query = app.world_mut().query::<(&SwipeCard, &PointerTracker)>();
        let (card, tracker) = query.single(app.world());
        assert_eq!(card.target(), CardTransform::IDENTITY, "fresh card at rest");
        assert_eq!(card.intent(), Intent::None, "fresh card has no badge");
        assert!(tracker.is_attached(), "fresh card listens to the pointer");
    }

    #[test]
    fn finished_deck_shows_no_card() {
        let mut app = card_app(1);
        app.update();
        app.world_mut()
            .resource_mut::<Deck>()
            .accept_current()
            .expect("item exists");
        app.update();

        assert!(shown_keys(&mut app).is_empty(), "summary has no card");
    }

    #[test]
    fn photo_path_picks_the_image_loader() {
        assert_eq!(
            photo_path("https://cataas.com/cat?abc123&width=400&height=500"),
            "https://cataas.com/cat?abc123&width=400&height=500&format=.jpg",
            "query gets one more parameter"
        );
        assert_eq!(
            photo_path("https://example.test/0"),
            "https://example.test/0?format=.jpg",
            "bare url gets a query"
        );
    }

    #[test]
    fn photo_sits_over_the_placeholder() {
        let mut app = App::new();
        app.init_resource::<UiFont>().add_systems(
            Update,
            |mut commands: Commands, font: Res<UiFont>| {
                let item = items(1).remove(0);
                commands.spawn_empty().with_children(|parent| {
                    spawn_card_face(parent, &item, Some(Handle::default()), &font);
                });
            },
        );
        app.update();

        let mut photos = app
            .world_mut()
            .query_filtered::<(&Sprite, &Transform), With<CardPhoto>>();
        let (photo, photo_transform) = photos.single(app.world());
        assert_eq!(photo.custom_size, Some(PHOTO_SIZE), "photo fills the frame");
        let photo_z = photo_transform.translation.z;

        let mut placeholders = app
            .world_mut()
            .query_filtered::<(&Sprite, &Transform), Without<CardPhoto>>();
        let (placeholder, placeholder_transform) = placeholders.single(app.world());
        assert_eq!(placeholder.custom_size, Some(PHOTO_SIZE), "same frame");
        assert!(placeholder_transform.translation.z < photo_z, "placeholder underneath");
    }

    #[test]
    fn cards_without_an_asset_server_keep_the_placeholder() {
        let mut app = card_app(2);
        app.update();

        let photos = app
            .world_mut()
            .query_filtered::<(), With<CardPhoto>>()
            .iter(app.world())
            .count();
        assert_eq!(photos, 0, "nothing to load with");
        let mut query = app.world_mut().query::<(&Sprite, &Parent)>();
        assert_eq!(
            query.iter(app.world()).count(),
            2,
            "one placeholder on the card and one on the preview"
        );
    }
}
