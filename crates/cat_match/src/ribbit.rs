use bevy::prelude::*;
use bits_helpers::RibbitMessageHandler;
use bits_helpers::restart::RestartRequested;
use ribbit_bits::{BitDuration, BitResult};

use crate::GameState;
use crate::deck::Deck;

#[derive(Default, Clone, Copy)]
pub struct CatMatch;

/// Number of liked cats, the score reported to the platform.
pub fn liked_count(world: &World) -> u32 {
    world
        .get_resource::<Deck>()
        .map_or(0, |deck| u32::try_from(deck.accepted().len()).unwrap_or(u32::MAX))
}

impl RibbitMessageHandler for CatMatch {
    fn restart(world: &mut World) {
        info!("Restarting CatMatch");
        world.send_event(RestartRequested);
    }

    fn end(world: &mut World) -> BitResult {
        info!("Ending CatMatch");

        // Loading and error screens have no session of their own to summarize.
        let playing = world
            .get_resource::<State<GameState>>()
            .is_some_and(|state| *state.get() == GameState::Playing);
        if playing {
            world
                .resource_mut::<NextState<GameState>>()
                .set(GameState::Summary);
        }

        BitResult::HighestScore(liked_count(world).into())
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::deck::items;

    #[test]
    fn score_is_the_number_of_likes() {
        let mut world = World::new();
        assert_eq!(liked_count(&world), 0, "no session yet");

        let mut deck = Deck::new(items(3));
        deck.accept_current().expect("item exists");
        deck.reject_current().expect("item exists");
        deck.accept_current().expect("item exists");
        world.insert_resource(deck);

        assert_eq!(liked_count(&world), 2, "two likes");
    }

    fn ended_in(state: GameState) -> GameState {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .insert_state(state)
            .insert_resource(Deck::new(items(3)));
        app.update();

        let result = CatMatch::end(app.world_mut());
        assert!(matches!(result, BitResult::HighestScore(_)), "score is always reported");
        app.update();
        *app.world().resource::<State<GameState>>().get()
    }

    #[test]
    fn ending_a_session_shows_the_summary() {
        assert_eq!(ended_in(GameState::Playing), GameState::Summary, "summary of the session");
    }

    #[test]
    fn ending_outside_a_session_keeps_the_screen() {
        assert_eq!(ended_in(GameState::FetchFailed), GameState::FetchFailed, "error stays");
        assert_eq!(ended_in(GameState::Loading), GameState::Loading, "still loading");
        assert_eq!(ended_in(GameState::Summary), GameState::Summary, "already summarized");
    }
}
