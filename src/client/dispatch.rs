//! Runs thunks against the shared store

use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::gateway::{ApiClient, ClientError, MessageResponse};
use super::store::{Action, Payload, RequestKind, RootAction, RootState};
use super::thunks::{self, AlbumForm, ArtistForm, RegisterForm, TrackForm};
use crate::models::{Album, Artist, Track, TrackHistory, User};

/// Owns the API client and the store, and turns every call into
/// pending/fulfilled/rejected actions.
pub struct Dispatcher {
    client: ApiClient,
    store: Arc<RwLock<RootState>>,
    generation: AtomicU64,
}

impl Dispatcher {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            store: Arc::new(RwLock::new(RootState::default())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Shared handle for readers (the UI)
    pub fn store(&self) -> Arc<RwLock<RootState>> {
        Arc::clone(&self.store)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RootState {
        self.store.read().clone()
    }

    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn apply(&self, action: RootAction) {
        if !self.store.write().reduce(action) {
            tracing::debug!("Dropped stale action");
        }
    }

    async fn run<T, R, Fut>(
        &self,
        wrap: fn(Action<T>) -> RootAction,
        kind: RequestKind,
        call: Fut,
        payload: impl FnOnce(&R) -> Payload<T>,
    ) -> Result<R, ClientError>
    where
        Fut: Future<Output = Result<R, ClientError>>,
    {
        let generation = self.next_generation();
        self.apply(wrap(Action::Pending { generation, kind }));

        match call.await {
            Ok(value) => {
                self.apply(wrap(Action::Fulfilled {
                    generation,
                    payload: payload(&value),
                }));
                Ok(value)
            }
            Err(e) => {
                self.apply(wrap(Action::Rejected {
                    generation,
                    error: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    // artists

    pub async fn load_artists(&self) -> Result<Vec<Artist>, ClientError> {
        self.run(
            RootAction::Artists,
            RequestKind::Listing,
            thunks::fetch_artists(&self.client),
            |list| Payload::Replace(list.clone()),
        )
        .await
    }

    pub async fn create_artist(&self, form: ArtistForm) -> Result<Artist, ClientError> {
        self.run(
            RootAction::Artists,
            RequestKind::Mutation,
            thunks::create_artist(&self.client, form),
            |artist| Payload::Prepend(artist.clone()),
        )
        .await
    }

    pub async fn delete_artist(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.run(
            RootAction::Artists,
            RequestKind::Mutation,
            thunks::delete_artist(&self.client, id),
            move |_| Payload::Remove(id),
        )
        .await
    }

    pub async fn toggle_artist(&self, id: i64) -> Result<Artist, ClientError> {
        self.run(
            RootAction::Artists,
            RequestKind::Mutation,
            thunks::toggle_artist(&self.client, id),
            |artist| Payload::Update(artist.clone()),
        )
        .await
    }

    // albums

    pub async fn load_albums(&self, artist: Option<&str>) -> Result<Vec<Album>, ClientError> {
        self.run(
            RootAction::Albums,
            RequestKind::Listing,
            thunks::fetch_albums(&self.client, artist),
            |list| Payload::Replace(list.clone()),
        )
        .await
    }

    pub async fn create_album(&self, form: AlbumForm) -> Result<Album, ClientError> {
        self.run(
            RootAction::Albums,
            RequestKind::Mutation,
            thunks::create_album(&self.client, form),
            |album| Payload::Prepend(album.clone()),
        )
        .await
    }

    pub async fn delete_album(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.run(
            RootAction::Albums,
            RequestKind::Mutation,
            thunks::delete_album(&self.client, id),
            move |_| Payload::Remove(id),
        )
        .await
    }

    pub async fn toggle_album(&self, id: i64) -> Result<Album, ClientError> {
        self.run(
            RootAction::Albums,
            RequestKind::Mutation,
            thunks::toggle_album(&self.client, id),
            |album| Payload::Update(album.clone()),
        )
        .await
    }

    // tracks

    pub async fn load_tracks(&self, album: Option<i64>) -> Result<Vec<Track>, ClientError> {
        self.run(
            RootAction::Tracks,
            RequestKind::Listing,
            thunks::fetch_tracks(&self.client, album),
            |list| Payload::Replace(list.clone()),
        )
        .await
    }

    pub async fn create_track(&self, form: TrackForm) -> Result<Track, ClientError> {
        self.run(
            RootAction::Tracks,
            RequestKind::Mutation,
            thunks::create_track(&self.client, form),
            |track| Payload::Append(track.clone()),
        )
        .await
    }

    pub async fn delete_track(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.run(
            RootAction::Tracks,
            RequestKind::Mutation,
            thunks::delete_track(&self.client, id),
            move |_| Payload::Remove(id),
        )
        .await
    }

    pub async fn toggle_track(&self, id: i64) -> Result<Track, ClientError> {
        self.run(
            RootAction::Tracks,
            RequestKind::Mutation,
            thunks::toggle_track(&self.client, id),
            |track| Payload::Update(track.clone()),
        )
        .await
    }

    // session

    pub async fn register(&self, form: RegisterForm) -> Result<User, ClientError> {
        self.run(
            RootAction::Session,
            RequestKind::Listing,
            thunks::register(&self.client, form),
            |user| Payload::Replace(vec![user.clone()]),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        self.run(
            RootAction::Session,
            RequestKind::Listing,
            thunks::login(&self.client, username, password),
            |user| Payload::Replace(vec![user.clone()]),
        )
        .await
    }

    pub async fn load_me(&self) -> Result<User, ClientError> {
        self.run(
            RootAction::Session,
            RequestKind::Listing,
            thunks::fetch_me(&self.client),
            |user| Payload::Replace(vec![user.clone()]),
        )
        .await
    }

    /// Log out. The session and the caller's history are cleared locally
    /// whatever the server answers.
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let result = self
            .run(
                RootAction::Session,
                RequestKind::Listing,
                thunks::logout(&self.client),
                |_| Payload::Replace(Vec::new()),
            )
            .await;

        let mut store = self.store.write();
        store.session.entities.clear();
        store.track_history.entities.clear();

        result
    }

    // track history

    pub async fn record_play(&self, track: i64) -> Result<TrackHistory, ClientError> {
        self.run(
            RootAction::TrackHistory,
            RequestKind::Mutation,
            thunks::record_play(&self.client, track),
            |entry| Payload::Prepend(entry.clone()),
        )
        .await
    }

    pub async fn load_history(&self) -> Result<Vec<TrackHistory>, ClientError> {
        self.run(
            RootAction::TrackHistory,
            RequestKind::Listing,
            thunks::fetch_history(&self.client),
            |list| Payload::Replace(list.clone()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::store::Status;

    #[test]
    fn test_generations_increase() {
        let dispatcher = Dispatcher::new(ApiClient::new("http://127.0.0.1:9").unwrap());

        let a = dispatcher.next_generation();
        let b = dispatcher.next_generation();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_transport_failure_is_recorded() {
        // nothing listens on the discard port
        let dispatcher = Dispatcher::new(ApiClient::new("http://127.0.0.1:9").unwrap());

        let err = dispatcher.load_artists().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));

        let state = dispatcher.state();
        assert_eq!(state.artists.status, Status::Failed);
        assert!(state.artists.error.is_some());
    }
}
