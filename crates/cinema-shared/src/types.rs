use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    FALLBACK_DIRECTOR, FALLBACK_GENRE, PATH_DIRECTOR_UPSERT, PATH_GENRE_UPSERT,
    RELATION_LIST_SEPARATOR,
};
use crate::error::ValidationError;
use crate::validation;

// Server-assigned movie identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentials of the authenticated admin.
///
/// Forwarded verbatim on credentialed writes; the client never inspects them.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The two many-valued relations hanging off a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Genre,
    Director,
}

impl RelationKind {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Genre => PATH_GENRE_UPSERT,
            Self::Director => PATH_DIRECTOR_UPSERT,
        }
    }

    /// JSON field carrying the item name in an upsert body.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Director => "director",
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Genre => FALLBACK_GENRE,
            Self::Director => FALLBACK_DIRECTOR,
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// Selects POST (insert) or PUT (update) against a relation endpoint.
///
/// Both are upserts keyed by `(movie id, item name)` on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertMode {
    Insert,
    Update,
}

/// Ordered set of trimmed, non-empty relation names.
///
/// Duplicates collapse onto their first occurrence; insertion order is kept
/// for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RelationSet(Vec<String>);

impl RelationSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse the comma separated text typed into the admin form.
    pub fn parse_list(raw: &str) -> Self {
        raw.split(RELATION_LIST_SEPARATOR).collect()
    }

    /// Insert an item, returning `false` when it was blank or already present.
    pub fn insert(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() || self.contains(item) {
            return false;
        }
        self.0.push(item.to_string());
        true
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|existing| existing == item.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Display form used by the admin form input.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for RelationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for RelationSet {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

impl From<RelationSet> for Vec<String> {
    fn from(set: RelationSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Primary record of a movie, without its relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePrimary {
    pub name: String,
    pub image_path: String,
    pub language: String,
    pub synopsis: String,
    pub rating: f64,
    pub duration: String,
    #[serde(rename = "top_cast")]
    pub cast: String,
    pub release_date: String,
}

/// A committed movie as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(flatten)]
    pub primary: MoviePrimary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: RelationSet,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub directors: RelationSet,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<RelationSet, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RelationSet>::deserialize(deserializer)?.unwrap_or_default())
}

/// Editable form of a movie. Has no identity until a create succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDraft {
    pub name: String,
    pub image_path: String,
    pub language: String,
    pub synopsis: String,
    pub rating: Option<f64>,
    pub duration: String,
    pub cast: String,
    pub release_date: String,
    pub genres: RelationSet,
    pub directors: RelationSet,
}

impl MovieDraft {
    /// Load a committed movie back into editable form.
    pub fn from_movie(movie: &Movie) -> Self {
        let p = &movie.primary;
        Self {
            name: p.name.clone(),
            image_path: p.image_path.clone(),
            language: p.language.clone(),
            synopsis: p.synopsis.clone(),
            rating: Some(p.rating),
            duration: p.duration.clone(),
            cast: p.cast.clone(),
            release_date: p.release_date.clone(),
            genres: movie.genres.clone(),
            directors: movie.directors.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// A draft that passed validation, split into what each write step sends.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub primary: MoviePrimary,
    pub genres: RelationSet,
    pub directors: RelationSet,
}

impl TryFrom<&MovieDraft> for Submission {
    type Error = ValidationError;

    fn try_from(draft: &MovieDraft) -> Result<Self, Self::Error> {
        validation::validate(draft)?;
        let rating = draft.rating.ok_or(ValidationError::InvalidRating)?;

        Ok(Self {
            primary: MoviePrimary {
                name: draft.name.trim().to_string(),
                image_path: draft.image_path.trim().to_string(),
                language: draft.language.trim().to_string(),
                synopsis: draft.synopsis.trim().to_string(),
                rating,
                duration: draft.duration.trim().to_string(),
                cast: draft.cast.trim().to_string(),
                release_date: draft.release_date.trim().to_string(),
            },
            genres: draft.genres.clone(),
            directors: draft.directors.clone(),
        })
    }
}

/// What the create endpoint told us about the new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateReceipt {
    pub id: Option<MovieId>,
}

impl CreateReceipt {
    /// Read the new identifier from a create response body.
    ///
    /// Accepts `{"last_id": n}`, `[{"last_id": n}]` and `{"id": n}`; ids sent
    /// as numeric strings are accepted too. Anything else yields no id.
    pub fn from_response(body: &serde_json::Value) -> Self {
        let record = match body {
            serde_json::Value::Array(items) => items.first(),
            other => Some(other),
        };

        let id = record
            .and_then(|r| r.get("last_id").or_else(|| r.get("id")))
            .and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .map(MovieId);

        Self { id }
    }
}
