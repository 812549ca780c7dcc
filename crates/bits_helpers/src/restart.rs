use core::marker::PhantomData;

use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

/// Any UI button carrying this marker restarts the bit when pressed.
#[derive(Component)]
pub struct RestartButton;

/// Every restart source (buttons, platform messages) funnels through this event.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RestartRequested;

pub trait Restartable: Resource {
    type State: States + FreelyMutableState;

    /// Puts the resource back to where a fresh run starts.
    fn restart(&mut self);
    fn restart_state() -> Self::State;
}

pub struct RestartPlugin<T: Restartable>(PhantomData<T>);

impl<T: Restartable> Default for RestartPlugin<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Restartable> Plugin for RestartPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_event::<RestartRequested>().add_systems(
            Update,
            (press_restart_buttons, apply_restart::<T>).chain(),
        );
    }
}

pub fn press_restart_buttons(
    interaction_query: Query<&Interaction, (Changed<Interaction>, With<RestartButton>)>,
    mut requests: EventWriter<RestartRequested>,
) {
    for interaction in &interaction_query {
        if *interaction == Interaction::Pressed {
            requests.send(RestartRequested);
        }
    }
}

/// The restartable resource may not exist yet (e.g. before the first load),
/// the state transition happens regardless.
pub fn apply_restart<T: Restartable>(
    mut requests: EventReader<RestartRequested>,
    restartable: Option<ResMut<T>>,
    mut next_state: ResMut<NextState<T::State>>,
) {
    if requests.read().count() == 0 {
        return;
    }

    if let Some(mut restartable) = restartable {
        restartable.restart();
    }
    next_state.set(T::restart_state());
}
