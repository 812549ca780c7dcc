use core::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::CardSet;
use crate::exit::CardResolved;
use crate::swipe::Verdict;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPreference {
    pub user_id: Option<u32>,
    pub item_url: String,
    pub liked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceRecord {
    pub id: u64,
    pub user_id: Option<u32>,
    pub item_url: String,
    pub liked: bool,
    /// Time since the app started.
    pub created_at: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("invalid preference: {0}")]
    InvalidRecord(&'static str),
}

/// Persistence for like/pass decisions, handed to the app as a resource
/// rather than reached through a global.
pub trait PreferenceStore: Send + Sync + 'static {
    fn save(
        &mut self,
        preference: NewPreference,
        created_at: Duration,
    ) -> Result<PreferenceRecord, PreferenceError>;

    /// Records of one user (or of anonymous players for `None`), oldest first.
    fn query(&self, user_id: Option<u32>) -> Vec<PreferenceRecord>;
}

#[derive(Debug)]
pub struct MemoryPreferenceStore {
    records: Vec<PreferenceRecord>,
    next_id: u64,
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn save(
        &mut self,
        preference: NewPreference,
        created_at: Duration,
    ) -> Result<PreferenceRecord, PreferenceError> {
        if preference.item_url.trim().is_empty() {
            return Err(PreferenceError::InvalidRecord("item url is empty"));
        }

        let record = PreferenceRecord {
            id: self.next_id,
            user_id: preference.user_id,
            item_url: preference.item_url,
            liked: preference.liked,
            created_at,
        };
        self.next_id += 1;
        self.records.push(record.clone());
        Ok(record)
    }

    fn query(&self, user_id: Option<u32>) -> Vec<PreferenceRecord> {
        self.records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// The store every resolved card is written to, and who is playing.
#[derive(Resource)]
pub struct Preferences {
    pub store: Box<dyn PreferenceStore>,
    pub user_id: Option<u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            store: Box::new(MemoryPreferenceStore::default()),
            user_id: None,
        }
    }
}

pub struct PreferencesPlugin;

impl Plugin for PreferencesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Preferences>()
            .add_systems(Update, record_preferences.after(CardSet::Resolve));
    }
}

pub fn record_preferences(
    mut resolved: EventReader<CardResolved>,
    mut preferences: ResMut<Preferences>,
    time: Res<Time>,
) {
    for card in resolved.read() {
        let preference = NewPreference {
            user_id: preferences.user_id,
            item_url: card.item.url.clone(),
            liked: card.verdict == Verdict::Like,
        };
        match preferences.store.save(preference, time.elapsed()) {
            Ok(record) => debug!("Saved preference {} for {}", record.id, card.item.name),
            Err(err) => warn!("Could not save preference for {}: {err}", card.item.name),
        }
    }
}
