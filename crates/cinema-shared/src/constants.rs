/// Default backend base URL used by the client
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default transport timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Inclusive rating bounds
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

/// Release dates are checked against this pattern only, no calendar check.
pub const RELEASE_DATE_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$";

/// Separator used by the admin form for genre/director lists
pub const RELATION_LIST_SEPARATOR: char = ',';

/// Backend endpoint paths
pub const PATH_MOVIES: &str = "/movies";
pub const PATH_MOVIE_CREATE: &str = "/adminMovieAdd";
pub const PATH_GENRE_UPSERT: &str = "/genreInsert";
pub const PATH_DIRECTOR_UPSERT: &str = "/directorInsert";
pub const PATH_HEALTH: &str = "/health";

/// Fallback operator messages when a failure payload carries no `message`
pub const FALLBACK_CREATE: &str = "Failed to add movie";
pub const FALLBACK_UPDATE: &str = "Failed to update movie";
pub const FALLBACK_DELETE: &str = "Failed to delete movie";
pub const FALLBACK_LIST: &str = "Failed to load movies";
pub const FALLBACK_GENRE: &str = "Failed to save genre";
pub const FALLBACK_DIRECTOR: &str = "Failed to save director";
