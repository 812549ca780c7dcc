use bevy::prelude::*;
use bits_helpers::restart::Restartable;
use thiserror::Error;

use crate::GameState;

/// One swipeable picture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub url: String,
    pub name: String,
}

/// A liked item together with where it sat in the deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedItem {
    pub item: Item,
    pub position: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Playing,
    Summary,
}

/// Identity of the card shown for one deck slot during one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub generation: u64,
    pub position: usize,
    pub item_id: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("no current item, the deck is exhausted")]
    Exhausted,
}

/// Ordered items of a session, the cursor into them and the liked items.
///
/// `position` only moves forward (except on reset) and never passes the end,
/// the phase is derived from it.
#[derive(Resource, Debug, Default)]
pub struct Deck {
    items: Vec<Item>,
    position: usize,
    accepted: Vec<AcceptedItem>,
    generation: u64,
}

impl Deck {
    pub const fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            position: 0,
            accepted: Vec::new(),
            generation: 0,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn accepted(&self) -> &[AcceptedItem] {
        &self.accepted
    }

    pub fn phase(&self) -> Phase {
        if self.position >= self.items.len() {
            Phase::Summary
        } else {
            Phase::Playing
        }
    }

    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.position)
    }

    pub fn next_preview(&self) -> Option<&Item> {
        self.items.get(self.position + 1)
    }

    pub fn current_key(&self) -> Option<CardKey> {
        self.current().map(|item| CardKey {
            generation: self.generation,
            position: self.position,
            item_id: item.id,
        })
    }

    /// Fraction of the deck reached, counting the card on screen.
    pub fn progress(&self) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        ((self.position + 1).min(self.items.len())) as f32 / self.items.len() as f32
    }

    pub fn accept_current(&mut self) -> Result<AcceptedItem, DeckError> {
        let item = self.current().cloned().ok_or(DeckError::Exhausted)?;
        let accepted = AcceptedItem {
            item,
            position: self.position,
        };
        self.accepted.push(accepted.clone());
        self.advance();
        Ok(accepted)
    }

    pub fn reject_current(&mut self) -> Result<(), DeckError> {
        if self.current().is_none() {
            return Err(DeckError::Exhausted);
        }
        self.advance();
        Ok(())
    }

    /// Moves to the next item. Callers guarantee one call per resolved card.
    pub fn advance(&mut self) {
        if self.position >= self.items.len() {
            return;
        }
        self.position += 1;
        if self.phase() == Phase::Summary {
            info!(
                "Deck finished, {} of {} liked",
                self.accepted.len(),
                self.items.len()
            );
        }
    }

    /// Starts a new pass over freshly fetched items.
    pub fn load(&mut self, items: Vec<Item>) {
        self.items = items;
        self.reset();
    }

    /// Back to the first item with nothing liked. Cards from the previous
    /// pass no longer match any key handed out after this.
    pub fn reset(&mut self) {
        self.position = 0;
        self.accepted.clear();
        self.generation += 1;
    }
}

impl Restartable for Deck {
    type State = GameState;

    fn restart(&mut self) {
        self.reset();
    }

    fn restart_state() -> GameState {
        GameState::Loading
    }
}

/// Items named "Cat 1", "Cat 2", ... with ids from zero.
#[cfg(test)]
pub(crate) fn items(count: u32) -> Vec<Item> {
    (0..count)
        .map(|id| Item {
            id,
            url: format!("https://example.test/{id}"),
            name: format!("Cat {}", id + 1),
        })
        .collect()
}
