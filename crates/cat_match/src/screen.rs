use bevy::prelude::*;
use bits_helpers::restart::RestartButton;

use crate::deck::{Deck, Phase};
use crate::exit::CommitRequest;
use crate::source::FetchFailure;
use crate::swipe::Verdict;
use crate::{CardSet, GameState, UiFont};

const TITLE: &str = "CatMatch";
const INK: Color = Color::srgb(0.2, 0.25, 0.33);
const MUTED: Color = Color::srgb(0.42, 0.45, 0.5);
const LIKE_BUTTON: Color = Color::srgb(0.18, 0.75, 0.66);
const PASS_BUTTON: Color = Color::srgb(0.97, 0.44, 0.44);
const NEUTRAL_BUTTON: Color = Color::srgb(0.85, 0.86, 0.88);
const TRACK: Color = Color::srgb(0.9, 0.9, 0.92);

#[derive(Component)]
pub struct LoadingScreen;

#[derive(Component)]
pub struct HudScreen;

#[derive(Component)]
pub struct SummaryScreen;

#[derive(Component)]
pub struct ErrorScreen;

#[derive(Component)]
pub struct ProgressText;

#[derive(Component)]
pub struct ProgressFill;

/// Like/pass without swiping.
#[derive(Component, Clone, Copy, Debug)]
pub struct ControlButton(pub Verdict);

pub struct ScreenPlugin;

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), spawn_loading_screen)
            .add_systems(OnExit(GameState::Loading), despawn_screen::<LoadingScreen>)
            .add_systems(OnEnter(GameState::Playing), spawn_hud)
            .add_systems(
                Update,
                press_control_buttons
                    .before(CardSet::Resolve)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (update_progress, enter_summary)
                    .in_set(CardSet::Present)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnExit(GameState::Playing), despawn_screen::<HudScreen>)
            .add_systems(OnEnter(GameState::Summary), spawn_summary_screen)
            .add_systems(OnExit(GameState::Summary), despawn_screen::<SummaryScreen>)
            .add_systems(OnEnter(GameState::FetchFailed), spawn_error_screen)
            .add_systems(OnExit(GameState::FetchFailed), despawn_screen::<ErrorScreen>);
    }
}

fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn counter_label(deck: &Deck) -> String {
    format!("{} of {}", (deck.position() + 1).min(deck.len()), deck.len())
}

pub fn summary_label(deck: &Deck) -> String {
    format!("You liked {} out of {} cats!", deck.accepted().len(), deck.len())
}

fn text(font: &UiFont, value: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(value),
        TextFont {
            font: font.0.clone(),
            font_size: size,
            ..default()
        },
        TextColor(color),
        TextLayout::new_with_justify(JustifyText::Center),
    )
}

fn spawn_button(
    parent: &mut ChildBuilder,
    font: &UiFont,
    label: &str,
    color: Color,
    width: f32,
    marker: impl Bundle,
) {
    parent
        .spawn((
            Node {
                width: Val::Px(width),
                height: Val::Px(52.0),
                margin: UiRect::horizontal(Val::Px(8.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BorderRadius::all(Val::Px(26.0)),
            BackgroundColor(color),
            Button,
            marker,
        ))
        .with_children(|parent| {
            parent.spawn(text(font, label, 22.0, Color::WHITE));
        });
}

fn full_screen_column() -> Node {
    Node {
        position_type: PositionType::Absolute,
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        justify_content: JustifyContent::Center,
        row_gap: Val::Px(12.0),
        ..default()
    }
}

fn spawn_loading_screen(mut commands: Commands, font: Res<UiFont>) {
    commands
        .spawn((full_screen_column(), LoadingScreen))
        .with_children(|parent| {
            parent.spawn(text(&font, TITLE, 32.0, INK));
            parent.spawn(text(&font, "Loading adorable cats...", 18.0, MUTED));
        });
}

fn spawn_hud(mut commands: Commands, font: Res<UiFont>, deck: Option<Res<Deck>>) {
    let counter = deck.as_deref().map(counter_label).unwrap_or_default();

    commands
        .spawn((
            Node {
                justify_content: JustifyContent::SpaceBetween,
                ..full_screen_column()
            },
            HudScreen,
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    width: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(12.0)),
                    row_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|header| {
                    header
                        .spawn(Node {
                            width: Val::Percent(100.0),
                            justify_content: JustifyContent::SpaceBetween,
                            align_items: AlignItems::Center,
                            ..default()
                        })
                        .with_children(|row| {
                            row.spawn(text(&font, TITLE, 24.0, INK));
                            row.spawn((text(&font, counter, 16.0, MUTED), ProgressText));
                            spawn_button(row, &font, "Reset", NEUTRAL_BUTTON, 90.0, RestartButton);
                        });
                    header
                        .spawn((
                            Node {
                                width: Val::Percent(100.0),
                                height: Val::Px(6.0),
                                ..default()
                            },
                            BorderRadius::all(Val::Px(3.0)),
                            BackgroundColor(TRACK),
                        ))
                        .with_children(|track| {
                            track.spawn((
                                Node {
                                    width: Val::Percent(0.0),
                                    height: Val::Percent(100.0),
                                    ..default()
                                },
                                BorderRadius::all(Val::Px(3.0)),
                                BackgroundColor(LIKE_BUTTON),
                                ProgressFill,
                            ));
                        });
                    header.spawn(text(
                        &font,
                        "Swipe right to like, left to pass",
                        14.0,
                        MUTED,
                    ));
                });

            parent
                .spawn(Node {
                    padding: UiRect::bottom(Val::Px(24.0)),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, &font, "Pass", PASS_BUTTON, 120.0, ControlButton(Verdict::Pass));
                    spawn_button(row, &font, "Like", LIKE_BUTTON, 120.0, ControlButton(Verdict::Like));
                });
        });
}

fn press_control_buttons(
    interaction_query: Query<(&Interaction, &ControlButton), (Changed<Interaction>, With<Button>)>,
    mut requests: EventWriter<CommitRequest>,
) {
    for (interaction, button) in &interaction_query {
        if *interaction == Interaction::Pressed {
            requests.send(CommitRequest(button.0));
        }
    }
}

fn update_progress(
    deck: Option<Res<Deck>>,
    mut counters: Query<&mut Text, With<ProgressText>>,
    mut fills: Query<&mut Node, With<ProgressFill>>,
) {
    let Some(deck) = deck else {
        return;
    };

    let label = counter_label(&deck);
    for mut counter in &mut counters {
        if counter.0 != label {
            counter.0.clone_from(&label);
        }
    }

    let width = Val::Percent(deck.progress() * 100.0);
    for mut fill in &mut fills {
        if fill.width != width {
            fill.width = width;
        }
    }
}

pub fn enter_summary(deck: Option<Res<Deck>>, mut next_state: ResMut<NextState<GameState>>) {
    let Some(deck) = deck else {
        return;
    };
    if deck.phase() == Phase::Summary {
        next_state.set(GameState::Summary);
    }
}

fn spawn_summary_screen(mut commands: Commands, font: Res<UiFont>, deck: Option<Res<Deck>>) {
    let Some(deck) = deck else {
        return;
    };

    commands
        .spawn((full_screen_column(), SummaryScreen))
        .with_children(|parent| {
            parent.spawn(text(&font, "Your Matches!", 30.0, INK));
            parent.spawn(text(&font, summary_label(&deck), 20.0, MUTED));

            if deck.accepted().is_empty() {
                parent.spawn(text(&font, "No matches this time!", 18.0, MUTED));
                parent.spawn(text(&font, "Maybe try again?", 14.0, MUTED));
            } else {
                for liked in deck.accepted() {
                    parent.spawn(text(&font, liked.item.name.clone(), 18.0, INK));
                }
            }

            spawn_button(parent, &font, "Find More Cats", LIKE_BUTTON, 220.0, RestartButton);
        });
}

fn spawn_error_screen(
    mut commands: Commands,
    font: Res<UiFont>,
    failure: Option<Res<FetchFailure>>,
) {
    let detail = failure.map_or_else(String::new, |failure| failure.0.to_string());

    commands
        .spawn((full_screen_column(), ErrorScreen))
        .with_children(|parent| {
            parent.spawn(text(&font, "Oops! Something went wrong", 24.0, INK));
            parent.spawn(text(
                &font,
                "We couldn't load the cats. Please check your connection and try again.",
                16.0,
                MUTED,
            ));
            if !detail.is_empty() {
                parent.spawn(text(&font, detail, 12.0, MUTED));
            }
            spawn_button(parent, &font, "Try Again", PASS_BUTTON, 180.0, RestartButton);
        });
}
