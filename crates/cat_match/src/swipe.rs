use core::time::Duration;

use bevy::prelude::*;
use bits_helpers::viewport::Viewport;
use strum::Display;

use crate::deck::CardKey;
use crate::exit::{
    CardResolved, CommitRequest, ExitCoordinator, handle_commit_requests, schedule_exits,
    settle_exits,
};
use crate::pointer::{Gesture, GestureEvent, track_gestures};
use crate::{CardSet, GameState};

/// Tunables of the swipe interaction. The dead zone only drives the live
/// indicator, the commit threshold only drives the end-of-gesture decision.
#[derive(Resource, Clone, Debug)]
pub struct SwipeConfig {
    /// Degrees of rotation per px of horizontal drag
    pub rotation_factor: f32,
    /// Horizontal drag (px) beyond which the like/pass badge shows
    pub indicator_dead_zone: f32,
    /// Horizontal drag (px) beyond which a release commits
    pub commit_threshold: f32,
    /// Rotation of a card flying off screen
    pub exit_rotation_degrees: f32,
    /// Delay between a commit and the deck moving on
    pub settle_delay: Duration,
    /// Duration of the eased motion when the card is not held
    pub ease_duration: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            rotation_factor: 0.1,
            indicator_dead_zone: 30.0,
            commit_threshold: 60.0,
            exit_rotation_degrees: 30.0,
            settle_delay: Duration::from_millis(300),
            ease_duration: Duration::from_millis(300),
        }
    }
}

/// Offset of a card from its resting place, in screen px (y down) and
/// degrees (clockwise).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CardTransform {
    pub x: f32,
    pub y: f32,
    pub rotation_degrees: f32,
}

impl CardTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation_degrees: 0.0,
    };

    pub fn follow(delta: Vec2, rotation_factor: f32) -> Self {
        Self {
            x: delta.x,
            y: delta.y,
            rotation_degrees: delta.x * rotation_factor,
        }
    }

    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            x: (to.x - self.x).mul_add(t, self.x),
            y: (to.y - self.y).mul_add(t, self.y),
            rotation_degrees: (to.rotation_degrees - self.rotation_degrees)
                .mul_add(t, self.rotation_degrees),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Intent {
    #[default]
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "LIKE")]
    Like,
    #[strum(serialize = "PASS")]
    Dislike,
}

impl Intent {
    /// Strictly beyond the dead zone, sitting exactly on it shows nothing.
    pub fn from_offset(delta_x: f32, dead_zone: f32) -> Self {
        if delta_x > dead_zone {
            Self::Like
        } else if delta_x < -dead_zone {
            Self::Dislike
        } else {
            Self::None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Verdict {
    Like,
    Pass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitDecision {
    CommitAccept,
    CommitReject,
    SnapBack,
}

impl CommitDecision {
    pub fn classify(delta_x: f32, commit_threshold: f32) -> Self {
        if delta_x.abs() <= commit_threshold {
            Self::SnapBack
        } else if delta_x > 0.0 {
            Self::CommitAccept
        } else {
            Self::CommitReject
        }
    }

    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Self::CommitAccept => Some(Verdict::Like),
            Self::CommitReject => Some(Verdict::Pass),
            Self::SnapBack => None,
        }
    }
}

/// A card has been committed and is on its way off screen.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardCommitted {
    pub card: Entity,
    pub key: CardKey,
    pub verdict: Verdict,
}

/// Interaction state of the top card. A new card always starts from
/// [`CardTransform::IDENTITY`] with no indicator.
#[derive(Component, Debug)]
pub struct SwipeCard {
    key: CardKey,
    target: CardTransform,
    intent: Intent,
    dragging: bool,
    verdict: Option<Verdict>,
}

impl SwipeCard {
    pub const fn new(key: CardKey) -> Self {
        Self {
            key,
            target: CardTransform::IDENTITY,
            intent: Intent::None,
            dragging: false,
            verdict: None,
        }
    }

    pub const fn key(&self) -> CardKey {
        self.key
    }

    /// Where the card should be, presentation eases toward it.
    pub const fn target(&self) -> CardTransform {
        self.target
    }

    pub const fn intent(&self) -> Intent {
        self.intent
    }

    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub const fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Returns false once the card is committed, it can't be grabbed again.
    pub fn begin_drag(&mut self) -> bool {
        if self.verdict.is_some() {
            return false;
        }
        self.dragging = true;
        true
    }

    pub fn drag(&mut self, delta: Vec2, config: &SwipeConfig) {
        if self.verdict.is_some() {
            return;
        }
        self.target = CardTransform::follow(delta, config.rotation_factor);
        self.intent = Intent::from_offset(delta.x, config.indicator_dead_zone);
    }

    /// Ends the drag and decides the card's fate. `None` if the card was
    /// already committed by another path.
    pub fn release(
        &mut self,
        delta: Vec2,
        config: &SwipeConfig,
        viewport_width: f32,
    ) -> Option<CommitDecision> {
        self.dragging = false;
        if self.verdict.is_some() {
            return None;
        }

        let decision = CommitDecision::classify(delta.x, config.commit_threshold);
        match decision.verdict() {
            Some(verdict) => {
                self.commit(verdict, config, viewport_width);
            }
            None => {
                self.target = CardTransform::IDENTITY;
                self.intent = Intent::None;
            }
        }
        Some(decision)
    }

    /// Sends the card off screen on the verdict's side. Only the first
    /// commit counts.
    pub fn commit(&mut self, verdict: Verdict, config: &SwipeConfig, viewport_width: f32) -> bool {
        if self.verdict.is_some() {
            return false;
        }

        let side = match verdict {
            Verdict::Like => 1.0,
            Verdict::Pass => -1.0,
        };
        self.verdict = Some(verdict);
        self.dragging = false;
        self.intent = Intent::None;
        self.target = CardTransform {
            x: side * viewport_width,
            y: 0.0,
            rotation_degrees: side * config.exit_rotation_degrees,
        };
        true
    }
}

/// Pointer input to deck mutation: gestures, the swipe decision, the button
/// path and the settle delay, in that order every frame.
pub struct SwipePlugin;

impl Plugin for SwipePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SwipeConfig>()
            .init_resource::<ExitCoordinator>()
            .add_event::<GestureEvent>()
            .add_event::<CardCommitted>()
            .add_event::<CommitRequest>()
            .add_event::<CardResolved>()
            .add_systems(
                Update,
                (
                    track_gestures,
                    apply_gestures,
                    handle_commit_requests,
                    schedule_exits,
                    settle_exits,
                )
                    .chain()
                    .in_set(CardSet::Resolve)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

pub fn apply_gestures(
    mut gestures: EventReader<GestureEvent>,
    mut cards: Query<&mut SwipeCard>,
    config: Res<SwipeConfig>,
    viewport: Res<Viewport>,
    mut commits: EventWriter<CardCommitted>,
) {
    for event in gestures.read() {
        let Ok(mut card) = cards.get_mut(event.card) else {
            continue;
        };

        match event.gesture {
            Gesture::Start => {
                if !card.begin_drag() {
                    debug!("Ignoring drag on committed card {:?}", card.key());
                }
            }
            Gesture::Move(delta) => card.drag(delta, &config),
            Gesture::End(delta) => {
                let Some(decision) = card.release(delta, &config, viewport.width) else {
                    continue;
                };
                if let Some(verdict) = decision.verdict() {
                    commits.send(CardCommitted {
                        card: event.card,
                        key: card.key(),
                        verdict,
                    });
                }
            }
        }
    }
}
