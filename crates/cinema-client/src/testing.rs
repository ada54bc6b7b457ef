//! In-memory backend double for unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use cinema_shared::error::{CatalogError, Result};
use cinema_shared::{
    CreateReceipt, Credentials, Movie, MovieDraft, MovieId, MoviePrimary, RelationKind,
    RelationSet, UpsertMode,
};

use crate::backend::CatalogBackend;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create,
    Update(MovieId),
    Delete(MovieId),
    Upsert {
        kind: RelationKind,
        movie_id: MovieId,
        item: String,
        mode: UpsertMode,
    },
}

#[derive(Default)]
struct State {
    movies: BTreeMap<MovieId, Movie>,
    next_id: u64,
    calls: Vec<Call>,
    create_error: Option<CatalogError>,
    create_without_id: bool,
    update_error: Option<CatalogError>,
    delete_error: Option<CatalogError>,
    list_fails: bool,
    failing_relations: HashSet<(RelationKind, String)>,
    relation_delays: HashMap<(RelationKind, String), Duration>,
    list_delay: Option<Duration>,
}

/// Behaves like the reference backend: ids count up, relation upserts are
/// idempotent per `(movie, name)`, unknown ids are 404s.
///
/// Upserts are logged when they land, after any configured delay.
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Insert a committed movie directly, bypassing the call log.
    pub fn seed(&self, primary: MoviePrimary, genres: &[&str], directors: &[&str]) -> MovieId {
        let mut state = self.state.lock().unwrap();
        let id = MovieId(state.next_id);
        state.next_id += 1;
        state.movies.insert(
            id,
            Movie {
                id,
                primary,
                genres: genres.iter().collect(),
                directors: directors.iter().collect(),
            },
        );
        id
    }

    pub fn set_next_id(&self, next: u64) {
        self.state.lock().unwrap().next_id = next;
    }

    pub fn fail_create(&self, error: CatalogError) {
        self.state.lock().unwrap().create_error = Some(error);
    }

    /// Store created movies but answer with a body that carries no id.
    pub fn create_without_id(&self, enabled: bool) {
        self.state.lock().unwrap().create_without_id = enabled;
    }

    pub fn fail_update(&self, error: CatalogError) {
        self.state.lock().unwrap().update_error = Some(error);
    }

    pub fn fail_delete(&self, error: CatalogError) {
        self.state.lock().unwrap().delete_error = Some(error);
    }

    pub fn fail_list(&self, enabled: bool) {
        self.state.lock().unwrap().list_fails = enabled;
    }

    pub fn fail_relation(&self, kind: RelationKind, item: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_relations
            .insert((kind, item.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn upsert_count(&self, kind: RelationKind) -> usize {
        self.count(|c| matches!(c, Call::Upsert { kind: k, .. } if *k == kind))
    }

    pub fn relations(&self, id: MovieId, kind: RelationKind) -> RelationSet {
        let state = self.state.lock().unwrap();
        state
            .movies
            .get(&id)
            .map(|m| match kind {
                RelationKind::Genre => m.genres.clone(),
                RelationKind::Director => m.directors.clone(),
            })
            .unwrap_or_default()
    }

    /// Hold the upsert of `item` for `delay` before it lands.
    pub fn delay_relation(&self, kind: RelationKind, item: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .relation_delays
            .insert((kind, item.to_string()), delay);
    }

    /// Take the listing snapshot immediately but answer after `delay`.
    pub fn delay_list(&self, delay: Duration) {
        self.state.lock().unwrap().list_delay = Some(delay);
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.state.lock().unwrap().calls.iter().position(|c| pred(c))
    }

    fn not_found(id: MovieId) -> CatalogError {
        CatalogError::server(Some(404), format!("Movie {id} not found"))
    }
}

#[async_trait]
impl CatalogBackend for FakeBackend {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let (movies, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::List);
            if state.list_fails {
                return Err(CatalogError::Network("listing unavailable".into()));
            }
            let movies: Vec<Movie> = state.movies.values().cloned().collect();
            (movies, state.list_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(movies)
    }

    async fn create_movie(
        &self,
        primary: &MoviePrimary,
        _credentials: &Credentials,
    ) -> Result<CreateReceipt> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create);
        if let Some(e) = state.create_error.clone() {
            return Err(e);
        }

        let id = MovieId(state.next_id);
        state.next_id += 1;
        state.movies.insert(
            id,
            Movie {
                id,
                primary: primary.clone(),
                genres: RelationSet::new(),
                directors: RelationSet::new(),
            },
        );

        let id = (!state.create_without_id).then_some(id);
        Ok(CreateReceipt { id })
    }

    async fn update_movie(&self, id: MovieId, primary: &MoviePrimary) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(id));
        if let Some(e) = state.update_error.clone() {
            return Err(e);
        }
        let movie = state.movies.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        movie.primary = primary.clone();
        Ok(())
    }

    async fn delete_movie(&self, id: MovieId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(id));
        if let Some(e) = state.delete_error.clone() {
            return Err(e);
        }
        state
            .movies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn upsert_genre(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        self.upsert(RelationKind::Genre, movie_id, name, credentials, mode)
            .await
    }

    async fn upsert_director(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        self.upsert(RelationKind::Director, movie_id, name, credentials, mode)
            .await
    }
}

impl FakeBackend {
    async fn upsert(
        &self,
        kind: RelationKind,
        movie_id: MovieId,
        name: &str,
        _credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        let delay = self
            .state
            .lock()
            .unwrap()
            .relation_delays
            .get(&(kind, name.to_string()))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Upsert {
            kind,
            movie_id,
            item: name.to_string(),
            mode,
        });

        if state.failing_relations.contains(&(kind, name.to_string())) {
            return Err(CatalogError::server(Some(500), kind.fallback_message()));
        }

        let movie = state
            .movies
            .get_mut(&movie_id)
            .ok_or_else(|| Self::not_found(movie_id))?;
        match kind {
            RelationKind::Genre => movie.genres.insert(name),
            RelationKind::Director => movie.directors.insert(name),
        };
        Ok(())
    }
}

pub fn admin() -> Credentials {
    Credentials::new("admin@cinema.test", "hunter2")
}

pub fn sample_primary(name: &str) -> MoviePrimary {
    MoviePrimary {
        name: name.to_string(),
        image_path: format!("/posters/{}.jpg", name.to_lowercase().replace(' ', "-")),
        language: "English".into(),
        synopsis: "A crew of professionals plans one last job.".into(),
        rating: 8.3,
        duration: "170 min".into(),
        cast: "Al Pacino, Robert De Niro".into(),
        release_date: "1995-12-15".into(),
    }
}

/// A draft that passes validation.
pub fn sample_draft(name: &str) -> MovieDraft {
    let p = sample_primary(name);
    MovieDraft {
        name: p.name,
        image_path: p.image_path,
        language: p.language,
        synopsis: p.synopsis,
        rating: Some(p.rating),
        duration: p.duration,
        cast: p.cast,
        release_date: p.release_date,
        genres: RelationSet::parse_list("Crime, Drama"),
        directors: RelationSet::parse_list("Michael Mann"),
    }
}
