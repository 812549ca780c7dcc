use bevy::prelude::*;
use bits_helpers::input::{PointerInput, PointerSource};

/// Lifecycle of one drag, deltas are measured from where it started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Start,
    Move(Vec2),
    End(Vec2),
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub card: Entity,
    pub gesture: Gesture,
}

#[derive(Clone, Copy, Debug)]
struct ActiveGesture {
    source: PointerSource,
    origin: Vec2,
    last_delta: Vec2,
}

/// Turns raw pointer input over one card into a single gesture at a time.
///
/// The tracker lives on the card entity: `attach` creates it, `detach` (or
/// despawning the card) releases it, and nothing is emitted afterwards.
#[derive(Component, Debug)]
pub struct PointerTracker {
    bounds: Rect,
    active: Option<ActiveGesture>,
    attached: bool,
}

impl PointerTracker {
    pub const fn attach(bounds: Rect) -> Self {
        Self {
            bounds,
            active: None,
            attached: true,
        }
    }

    pub fn detach(&mut self) {
        self.attached = false;
        self.active = None;
    }

    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    pub const fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    /// Hit area in screen coordinates, moves with the card.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn handle(&mut self, input: &PointerInput) -> Option<Gesture> {
        if !self.attached {
            return None;
        }

        if let PointerInput::Pressed { source, position } = *input {
            if self.active.is_some() || !self.bounds.contains(position) {
                return None;
            }
            self.active = Some(ActiveGesture {
                source,
                origin: position,
                last_delta: Vec2::ZERO,
            });
            return Some(Gesture::Start);
        }

        let active = self.active.as_mut()?;
        if active.source != input.source() {
            return None;
        }

        match *input {
            PointerInput::Moved { source, position } => {
                let delta = position - active.origin;
                // Bounds were taken with the card at the last delta; this move
                // carries it along by the difference before anything is drawn.
                let shift = delta - active.last_delta;
                let drawn = Rect {
                    min: self.bounds.min + shift,
                    max: self.bounds.max + shift,
                };
                // A mouse sliding off the card ends the drag where it began.
                if source == PointerSource::Mouse && !drawn.contains(position) {
                    self.active = None;
                    return Some(Gesture::End(Vec2::ZERO));
                }
                active.last_delta = delta;
                Some(Gesture::Move(delta))
            }
            PointerInput::Released { position, .. } => {
                let delta = position - active.origin;
                self.active = None;
                Some(Gesture::End(delta))
            }
            PointerInput::Cancelled { .. } => {
                let delta = active.last_delta;
                self.active = None;
                Some(Gesture::End(delta))
            }
            PointerInput::Left { .. } => {
                self.active = None;
                Some(Gesture::End(Vec2::ZERO))
            }
            PointerInput::Pressed { .. } => None,
        }
    }
}

pub fn track_gestures(
    mut inputs: EventReader<PointerInput>,
    mut trackers: Query<(Entity, &mut PointerTracker)>,
    mut gestures: EventWriter<GestureEvent>,
) {
    for input in inputs.read() {
        for (card, mut tracker) in &mut trackers {
            if let Some(gesture) = tracker.handle(input) {
                gestures.send(GestureEvent { card, gesture });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUSE: PointerSource = PointerSource::Mouse;
    const FINGER: PointerSource = PointerSource::Touch(1);

    fn tracker() -> PointerTracker {
        PointerTracker::attach(Rect::from_center_size(
            Vec2::new(180.0, 320.0),
            Vec2::new(280.0, 360.0),
        ))
    }

    fn press(source: PointerSource, x: f32, y: f32) -> PointerInput {
        PointerInput::Pressed {
            source,
            position: Vec2::new(x, y),
        }
    }

    fn moved(source: PointerSource, x: f32, y: f32) -> PointerInput {
        PointerInput::Moved {
            source,
            position: Vec2::new(x, y),
        }
    }

    fn release(source: PointerSource, x: f32, y: f32) -> PointerInput {
        PointerInput::Released {
            source,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn deltas_are_measured_from_the_origin() {
        let mut tracker = tracker();
        assert_eq!(tracker.handle(&press(FINGER, 180.0, 300.0)), Some(Gesture::Start), "start");
        assert_eq!(
            tracker.handle(&moved(FINGER, 200.0, 310.0)),
            Some(Gesture::Move(Vec2::new(20.0, 10.0))),
            "first move"
        );
        assert_eq!(
            tracker.handle(&moved(FINGER, 250.0, 290.0)),
            Some(Gesture::Move(Vec2::new(70.0, -10.0))),
            "second move is not incremental"
        );
        assert_eq!(
            tracker.handle(&release(FINGER, 260.0, 300.0)),
            Some(Gesture::End(Vec2::new(80.0, 0.0))),
            "end carries the final delta"
        );
        assert!(!tracker.is_tracking(), "gesture finished");
    }

    #[test]
    fn moves_before_a_press_do_nothing() {
        let mut tracker = tracker();
        assert_eq!(tracker.handle(&moved(MOUSE, 180.0, 320.0)), None, "hover only");
        assert_eq!(tracker.handle(&release(MOUSE, 180.0, 320.0)), None, "stray release");
    }

    #[test]
    fn only_one_gesture_at_a_time() {
        let mut tracker = tracker();
        tracker.handle(&press(FINGER, 180.0, 320.0));
        assert_eq!(tracker.handle(&press(FINGER, 190.0, 320.0)), None, "same finger again");
        assert_eq!(tracker.handle(&press(MOUSE, 190.0, 320.0)), None, "mouse while touching");
        assert_eq!(
            tracker.handle(&moved(PointerSource::Touch(2), 300.0, 320.0)),
            None,
            "second finger is ignored"
        );
        assert_eq!(
            tracker.handle(&release(MOUSE, 300.0, 320.0)),
            None,
            "other source can't end the gesture"
        );
        assert_eq!(
            tracker.handle(&release(FINGER, 200.0, 320.0)),
            Some(Gesture::End(Vec2::new(20.0, 0.0))),
            "the owning finger ends it"
        );
        assert_eq!(tracker.handle(&press(MOUSE, 180.0, 320.0)), Some(Gesture::Start), "free again");
    }

    #[test]
    fn presses_outside_the_card_are_ignored() {
        let mut tracker = tracker();
        assert_eq!(tracker.handle(&press(MOUSE, 5.0, 5.0)), None, "outside");
        assert!(!tracker.is_tracking(), "nothing started");
    }

    #[test]
    fn mouse_leaving_the_card_ends_at_zero() {
        let mut tracker = tracker();
        tracker.handle(&press(MOUSE, 180.0, 320.0));
        tracker.handle(&moved(MOUSE, 250.0, 320.0));
        // The card is drawn away from the grab point.
        tracker.set_bounds(Rect::from_center_size(Vec2::new(250.0, 600.0), Vec2::new(280.0, 360.0)));
        assert_eq!(
            tracker.handle(&moved(MOUSE, 260.0, 320.0)),
            Some(Gesture::End(Vec2::ZERO)),
            "leaving the card is a neutral end"
        );
        assert_eq!(tracker.handle(&release(MOUSE, 260.0, 320.0)), None, "already ended");
    }

    #[test]
    fn fast_mouse_flick_keeps_its_delta() {
        let mut tracker = tracker();
        tracker.handle(&press(MOUSE, 180.0, 320.0));
        assert_eq!(
            tracker.handle(&moved(MOUSE, 380.0, 320.0)),
            Some(Gesture::Move(Vec2::new(200.0, 0.0))),
            "one frame past half the card width is still a drag"
        );
        assert_eq!(
            tracker.handle(&release(MOUSE, 380.0, 320.0)),
            Some(Gesture::End(Vec2::new(200.0, 0.0))),
            "release carries the full flick"
        );
    }

    #[test]
    fn mouse_drag_follows_the_drawn_card() {
        let mut tracker = tracker();
        tracker.handle(&press(MOUSE, 180.0, 320.0));
        for x in [30.0, -120.0, -270.0, -420.0] {
            assert_eq!(
                tracker.handle(&moved(MOUSE, x, 320.0)),
                Some(Gesture::Move(Vec2::new(x - 180.0, 0.0))),
                "move to {x} stays on the card"
            );
            tracker.set_bounds(Rect::from_center_size(Vec2::new(x, 320.0), Vec2::new(280.0, 360.0)));
        }
        assert!(tracker.is_tracking(), "still held far off the rest area");
    }

    #[test]
    fn mouse_leaving_the_window_ends_at_zero() {
        let mut tracker = tracker();
        tracker.handle(&press(MOUSE, 180.0, 320.0));
        tracker.handle(&moved(MOUSE, 290.0, 320.0));
        assert_eq!(
            tracker.handle(&PointerInput::Left { source: MOUSE }),
            Some(Gesture::End(Vec2::ZERO)),
            "left the window"
        );
    }

    #[test]
    fn touch_may_leave_the_card() {
        let mut tracker = tracker();
        tracker.handle(&press(FINGER, 180.0, 320.0));
        assert_eq!(
            tracker.handle(&moved(FINGER, 400.0, 320.0)),
            Some(Gesture::Move(Vec2::new(220.0, 0.0))),
            "fingers keep dragging off the card"
        );
    }

    #[test]
    fn cancelled_touch_ends_with_last_delta() {
        let mut tracker = tracker();
        tracker.handle(&press(FINGER, 180.0, 320.0));
        tracker.handle(&moved(FINGER, 110.0, 330.0));
        assert_eq!(
            tracker.handle(&PointerInput::Cancelled { source: FINGER }),
            Some(Gesture::End(Vec2::new(-70.0, 10.0))),
            "cancel keeps the last known delta"
        );
    }

    #[test]
    fn detached_tracker_is_silent() {
        let mut tracker = tracker();
        tracker.handle(&press(FINGER, 180.0, 320.0));
        tracker.detach();

        assert!(!tracker.is_attached(), "detached");
        assert_eq!(tracker.handle(&moved(FINGER, 200.0, 320.0)), None, "no move after detach");
        assert_eq!(tracker.handle(&release(FINGER, 200.0, 320.0)), None, "no end after detach");
        assert_eq!(tracker.handle(&press(FINGER, 180.0, 320.0)), None, "no start after detach");
    }

    #[test]
    fn bounds_follow_the_card() {
        let mut tracker = tracker();
        tracker.set_bounds(Rect::from_center_size(Vec2::new(20.0, 20.0), Vec2::splat(10.0)));
        assert_eq!(tracker.handle(&press(MOUSE, 180.0, 320.0)), None, "old area is dead");
        assert_eq!(tracker.handle(&press(MOUSE, 22.0, 18.0)), Some(Gesture::Start), "new area");
    }

    #[test]
    fn system_tags_gestures_with_the_card() {
        let mut app = App::new();
        app.add_event::<PointerInput>()
            .add_event::<GestureEvent>()
            .add_systems(Update, track_gestures);
        let card = app.world_mut().spawn(tracker()).id();

        app.world_mut().send_event(press(MOUSE, 180.0, 320.0));
        app.world_mut().send_event(moved(MOUSE, 200.0, 320.0));
        app.update();

        let events = app.world().resource::<Events<GestureEvent>>();
        let mut cursor = events.get_cursor();
        let received: Vec<_> = cursor.read(events).copied().collect();
        assert_eq!(
            received,
            vec![
                GestureEvent {
                    card,
                    gesture: Gesture::Start
                },
                GestureEvent {
                    card,
                    gesture: Gesture::Move(Vec2::new(20.0, 0.0))
                },
            ],
            "inputs become gestures for that card"
        );
    }
}
