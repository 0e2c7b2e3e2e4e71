//! Client-side state
//!
//! Each feature keeps an ordered list of entities plus the status of the
//! last request touching it. State only changes through [`RootState::reduce`],
//! driven by the pending/fulfilled/rejected lifecycle of a thunk. Every action
//! carries the generation of the request it belongs to. A listing supersedes
//! the listings started before it, whose results are then dropped. Mutations
//! never supersede anything and always land.

use std::collections::BTreeMap;

use crate::models::{Album, Artist, Entity, Track, TrackHistory, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// How a successful response changes a feature's list
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// A fresh listing
    Replace(Vec<T>),
    /// A created entity for a newest-first list
    Prepend(T),
    /// A created entity for a list in running order
    Append(T),
    /// A changed entity; replaced where it sits, ignored when not listed
    Update(T),
    Remove(i64),
}

/// What a request does to its feature's list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Loads the whole list; a newer listing makes it stale
    Listing,
    /// Touches single entries
    Mutation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    Pending { generation: u64, kind: RequestKind },
    Fulfilled { generation: u64, payload: Payload<T> },
    Rejected { generation: u64, error: String },
}

impl<T> Action<T> {
    pub fn generation(&self) -> u64 {
        match self {
            Action::Pending { generation, .. }
            | Action::Fulfilled { generation, .. }
            | Action::Rejected { generation, .. } => *generation,
        }
    }
}

/// `{entities, status, error}` for one feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureState<T> {
    pub entities: Vec<T>,
    pub status: Status,
    pub error: Option<String>,
    /// Generation of the newest listing started on this feature
    latest_listing: u64,
    /// Requests still awaiting a result
    in_flight: BTreeMap<u64, RequestKind>,
}

impl<T> Default for FeatureState<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            status: Status::Idle,
            error: None,
            latest_listing: 0,
            in_flight: BTreeMap::new(),
        }
    }
}

impl<T: Entity> FeatureState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Apply an action; returns false when it was stale and ignored
    pub fn reduce(&mut self, action: Action<T>) -> bool {
        match action {
            Action::Pending { generation, kind } => {
                if kind == RequestKind::Listing {
                    if generation < self.latest_listing {
                        return false;
                    }
                    self.latest_listing = generation;
                    self.in_flight.retain(|_, k| *k == RequestKind::Mutation);
                }
                self.in_flight.insert(generation, kind);
                self.status = Status::Loading;
                self.error = None;
            }
            Action::Fulfilled { generation, payload } => {
                if self.in_flight.remove(&generation).is_none() {
                    return false;
                }
                self.apply(payload);
                self.settle();
            }
            Action::Rejected { generation, error } => {
                if self.in_flight.remove(&generation).is_none() {
                    return false;
                }
                self.error = Some(error);
                self.settle();
            }
        }
        true
    }

    /// Status once the last outstanding request has resolved
    fn settle(&mut self) {
        if !self.in_flight.is_empty() {
            return;
        }
        self.status = if self.error.is_some() {
            Status::Failed
        } else {
            Status::Succeeded
        };
    }

    fn apply(&mut self, payload: Payload<T>) {
        match payload {
            Payload::Replace(entities) => self.entities = entities,
            Payload::Prepend(entity) => {
                self.entities.retain(|e| e.id() != entity.id());
                self.entities.insert(0, entity);
            }
            Payload::Append(entity) => {
                self.entities.retain(|e| e.id() != entity.id());
                self.entities.push(entity);
            }
            Payload::Update(entity) => {
                if let Some(slot) = self.entities.iter_mut().find(|e| e.id() == entity.id()) {
                    *slot = entity;
                }
            }
            Payload::Remove(id) => self.entities.retain(|e| e.id() != id),
        }
    }
}

/// An action addressed to one feature
#[derive(Debug, Clone, PartialEq)]
pub enum RootAction {
    Artists(Action<Artist>),
    Albums(Action<Album>),
    Tracks(Action<Track>),
    TrackHistory(Action<TrackHistory>),
    /// The signed-in user; the list holds at most one entry
    Session(Action<User>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub artists: FeatureState<Artist>,
    pub albums: FeatureState<Album>,
    pub tracks: FeatureState<Track>,
    pub track_history: FeatureState<TrackHistory>,
    pub session: FeatureState<User>,
}

impl RootState {
    pub fn reduce(&mut self, action: RootAction) -> bool {
        match action {
            RootAction::Artists(a) => self.artists.reduce(a),
            RootAction::Albums(a) => self.albums.reduce(a),
            RootAction::Tracks(a) => self.tracks.reduce(a),
            RootAction::TrackHistory(a) => self.track_history.reduce(a),
            RootAction::Session(a) => self.session.reduce(a),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.entities.first()
    }
}
