use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};
use thiserror::Error;

use crate::GameState;
use crate::deck::{Deck, Item};
use crate::exit::ExitCoordinator;

pub const DEFAULT_ITEM_COUNT: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("the item source returned nothing")]
    Empty,
    #[error("the item source is unavailable: {0}")]
    Unavailable(String),
}

/// Produces the items of one session. Called once per session start, off the
/// main thread.
pub trait ItemSource: Send + Sync + 'static {
    fn fetch_items(&self, count: usize) -> Result<Vec<Item>, FetchError>;
}

/// Random cat pictures from cataas.com, a cache-busting query per item keeps
/// them distinct.
pub struct CataasSource;

impl CataasSource {
    const BUSTER_LEN: usize = 6;

    fn url(rng: &mut fastrand::Rng) -> String {
        let buster: String = core::iter::repeat_with(|| rng.alphanumeric().to_ascii_lowercase())
            .take(Self::BUSTER_LEN)
            .collect();
        format!("https://cataas.com/cat?{buster}&width=400&height=500")
    }
}

impl ItemSource for CataasSource {
    fn fetch_items(&self, count: usize) -> Result<Vec<Item>, FetchError> {
        let mut rng = fastrand::Rng::new();
        (0..count)
            .map(|index| {
                let id = u32::try_from(index)
                    .map_err(|err| FetchError::Unavailable(err.to_string()))?;
                Ok(Item {
                    id,
                    url: Self::url(&mut rng),
                    name: format!("Cat {}", id + 1),
                })
            })
            .collect()
    }
}

/// Where sessions get their items from, and how many.
#[derive(Resource, Clone)]
pub struct ItemFeed {
    pub source: Arc<dyn ItemSource>,
    pub count: usize,
}

impl Default for ItemFeed {
    fn default() -> Self {
        Self {
            source: Arc::new(CataasSource),
            count: DEFAULT_ITEM_COUNT,
        }
    }
}

#[derive(Resource)]
pub struct PendingFetch(Task<Result<Vec<Item>, FetchError>>);

/// Why the last fetch failed, shown on the error screen.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure(pub FetchError);

pub struct SourcePlugin;

impl Plugin for SourcePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemFeed>()
            .add_systems(OnEnter(GameState::Loading), start_fetch)
            .add_systems(Update, poll_fetch.run_if(in_state(GameState::Loading)));
    }
}

/// Every session start invalidates the exits still pending from the last one.
pub fn start_fetch(
    mut commands: Commands,
    feed: Res<ItemFeed>,
    mut coordinator: ResMut<ExitCoordinator>,
) {
    coordinator.invalidate();
    commands.remove_resource::<FetchFailure>();

    let source = Arc::clone(&feed.source);
    let count = feed.count;
    info!("Fetching {count} items");
    let task = IoTaskPool::get().spawn(async move { source.fetch_items(count) });
    commands.insert_resource(PendingFetch(task));
}

fn non_empty(items: Vec<Item>) -> Result<Vec<Item>, FetchError> {
    if items.is_empty() {
        Err(FetchError::Empty)
    } else {
        Ok(items)
    }
}

/// The deck only exists (or changes) once a fetch succeeded.
pub fn poll_fetch(
    mut commands: Commands,
    pending: Option<ResMut<PendingFetch>>,
    deck: Option<ResMut<Deck>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut pending) = pending else {
        return;
    };
    let Some(result) = block_on(future::poll_once(&mut pending.0)) else {
        return;
    };
    commands.remove_resource::<PendingFetch>();

    match result.and_then(non_empty) {
        Ok(items) => {
            info!("Session started with {} items", items.len());
            match deck {
                Some(mut deck) => deck.load(items),
                None => commands.insert_resource(Deck::new(items)),
            }
            next_state.set(GameState::Playing);
        }
        Err(err) => {
            warn!("Fetch failed: {err}");
            commands.insert_resource(FetchFailure(err));
            next_state.set(GameState::FetchFailed);
        }
    }
}
