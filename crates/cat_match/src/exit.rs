use core::time::Duration;

use bevy::prelude::*;
use bits_helpers::viewport::Viewport;

use crate::deck::{CardKey, Deck, DeckError, Item};
use crate::pointer::PointerTracker;
use crate::swipe::{CardCommitted, SwipeCard, SwipeConfig, Verdict};

/// Like/pass pressed on the control surface, same effect as a swipe.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitRequest(pub Verdict);

/// The deck moved past a card after its exit settled.
#[derive(Event, Clone, Debug, PartialEq, Eq)]
pub struct CardResolved {
    pub verdict: Verdict,
    pub item: Item,
    pub position: usize,
}

#[derive(Debug)]
struct PendingExit {
    epoch: u64,
    key: CardKey,
    verdict: Verdict,
    timer: Timer,
}

/// Defers deck mutations until a card's exit animation settles.
///
/// Each commit is bound to the card it was made on; when its timer fires
/// after the deck already moved on (or a new session started) it does
/// nothing.
#[derive(Resource, Debug, Default)]
pub struct ExitCoordinator {
    epoch: u64,
    pending: Vec<PendingExit>,
}

impl ExitCoordinator {
    /// Returns false if this card already has a commit on its way.
    pub fn schedule(&mut self, key: CardKey, verdict: Verdict, delay: Duration) -> bool {
        if self.is_pending(key) {
            return false;
        }
        self.pending.push(PendingExit {
            epoch: self.epoch,
            key,
            verdict,
            timer: Timer::new(delay, TimerMode::Once),
        });
        true
    }

    pub fn is_pending(&self, key: CardKey) -> bool {
        self.pending
            .iter()
            .any(|exit| exit.epoch == self.epoch && exit.key == key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Starts a new epoch, commits made before it will never apply.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
    }

    /// Advances the timers and applies every due commit still aimed at the
    /// deck's current card.
    pub fn settle(&mut self, delta: Duration, deck: &mut Deck) -> Vec<CardResolved> {
        for exit in &mut self.pending {
            exit.timer.tick(delta);
        }

        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|exit| exit.timer.finished());
        self.pending = waiting;

        let mut resolved = Vec::new();
        for exit in due {
            if exit.epoch != self.epoch || deck.current_key() != Some(exit.key) {
                debug!("Dropping stale {} for {:?}", exit.verdict, exit.key);
                continue;
            }

            let applied = match exit.verdict {
                Verdict::Like => deck.accept_current().map(|accepted| accepted.item),
                Verdict::Pass => match deck.current().cloned() {
                    Some(item) => deck.reject_current().map(|()| item),
                    None => Err(DeckError::Exhausted),
                },
            };

            match applied {
                Ok(item) => {
                    info!("{} {} ({})", exit.verdict, item.name, exit.key.position);
                    resolved.push(CardResolved {
                        verdict: exit.verdict,
                        item,
                        position: exit.key.position,
                    });
                }
                Err(err) => warn!("Could not apply {}: {err}", exit.verdict),
            }
        }
        resolved
    }
}

/// Routes control-surface likes/passes through the same fly-out as a swipe.
pub fn handle_commit_requests(
    mut requests: EventReader<CommitRequest>,
    mut cards: Query<(Entity, &mut SwipeCard)>,
    config: Res<SwipeConfig>,
    viewport: Res<Viewport>,
    mut commits: EventWriter<CardCommitted>,
) {
    for CommitRequest(verdict) in requests.read() {
        let Some((card, mut swipe)) = cards.iter_mut().find(|(_, swipe)| swipe.verdict().is_none())
        else {
            debug!("No card to {verdict}");
            continue;
        };

        if swipe.commit(*verdict, &config, viewport.width) {
            commits.send(CardCommitted {
                card,
                key: swipe.key(),
                verdict: *verdict,
            });
        }
    }
}

/// A committed card stops listening to the pointer and its deck mutation is
/// queued behind the settle delay.
pub fn schedule_exits(
    mut commits: EventReader<CardCommitted>,
    mut trackers: Query<&mut PointerTracker>,
    mut coordinator: ResMut<ExitCoordinator>,
    config: Res<SwipeConfig>,
) {
    for commit in commits.read() {
        if let Ok(mut tracker) = trackers.get_mut(commit.card) {
            tracker.detach();
        }
        if !coordinator.schedule(commit.key, commit.verdict, config.settle_delay) {
            warn!("{:?} was already committed", commit.key);
        }
    }
}

pub fn settle_exits(
    time: Res<Time>,
    deck: Option<ResMut<Deck>>,
    mut coordinator: ResMut<ExitCoordinator>,
    mut resolved: EventWriter<CardResolved>,
) {
    let Some(mut deck) = deck else {
        return;
    };
    if coordinator.pending_count() == 0 {
        return;
    }

    for event in coordinator.settle(time.delta(), &mut deck) {
        resolved.send(event);
    }
}
