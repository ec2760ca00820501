//! Movie domain models and DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use marquee_core::Validator;
use marquee_core::validator::unique;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Sort keys accepted by the movie listing.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Earliest year a movie can have been released.
pub const FIRST_FILM_YEAR: i32 = 1888;

/// Movie running time in minutes.
///
/// Travels over JSON as the string `"<minutes> mins"` and is stored as a
/// plain integer column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct Runtime(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (minutes, unit) = s.split_once(' ').ok_or(InvalidRuntimeFormat)?;
        if unit != "mins" {
            return Err(InvalidRuntimeFormat);
        }
        minutes
            .parse::<i32>()
            .map(Runtime)
            .map_err(|_| InvalidRuntimeFormat)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// A catalog entry.
///
/// `version` starts at 1 and increases by one on every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Movie {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[schema(value_type = String, example = "102 mins")]
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub version: i32,
}

/// Body for creating or fully replacing a movie.
///
/// Omitted fields are treated as empty and rejected by validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct MovieInputDto {
    pub title: String,
    pub year: i32,
    #[schema(value_type = String, example = "102 mins")]
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

impl MovieInputDto {
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.genres.is_some(), "genres", "must be provided");
        validate_movie_fields(
            v,
            &self.title,
            self.year,
            self.runtime,
            self.genres.as_deref().unwrap_or_default(),
        );
    }

    /// Overwrites every editable field of `movie`.
    pub fn replace(self, movie: &mut Movie) {
        movie.title = self.title;
        movie.year = self.year;
        movie.runtime = self.runtime;
        movie.genres = self.genres.unwrap_or_default();
    }
}

/// Body for a partial update.
///
/// A field that is absent (or `null`) leaves the stored value untouched; a
/// field that is present overwrites it, even when it is an empty string.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PatchMovieDto {
    pub title: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "102 mins")]
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl PatchMovieDto {
    pub fn apply(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
    }
}

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    validate_movie_fields(v, &movie.title, movie.year, movie.runtime, &movie.genres);
}

fn validate_movie_fields(
    v: &mut Validator,
    title: &str,
    year: i32,
    runtime: Runtime,
    genres: &[String],
) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(title.len() <= 500, "title", "must not be more than 500 bytes long");

    v.check(year != 0, "year", "must be provided");
    v.check(year >= FIRST_FILM_YEAR, "year", "must be greater than 1888");
    v.check(year <= Utc::now().year(), "year", "must not be in the future");

    v.check(runtime.0 != 0, "runtime", "must be provided");
    v.check(runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(genres.len() <= 5, "genres", "must not contain more than 5 genres");
    v.check(unique(genres), "genres", "must not contain duplicate values");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn casablanca() -> Movie {
        Movie {
            id: 1,
            created_at: Utc::now(),
            title: "Casablanca".to_string(),
            year: 1942,
            runtime: Runtime(102),
            genres: vec!["drama".to_string(), "romance".to_string()],
            version: 1,
        }
    }

    #[test]
    fn test_runtime_json_format() {
        assert_eq!(serde_json::to_string(&Runtime(102)).unwrap(), r#""102 mins""#);
        let parsed: Runtime = serde_json::from_str(r#""95 mins""#).unwrap();
        assert_eq!(parsed, Runtime(95));
    }

    #[test]
    fn test_runtime_rejects_other_formats() {
        for raw in [r#""95""#, r#""95 minutes""#, r#""ninety mins""#, "95"] {
            assert!(serde_json::from_str::<Runtime>(raw).is_err(), "{raw}");
        }
        let err = serde_json::from_str::<Runtime>(r#""95 hours""#).unwrap_err();
        assert!(err.to_string().contains("invalid runtime format"));
    }

    #[test]
    fn test_movie_serialization_hides_created_at() {
        let value = serde_json::to_value(casablanca()).unwrap();
        assert!(value.get("created_at").is_none());
        assert_eq!(value["runtime"], "102 mins");
        assert_eq!(value["version"], 1);
    }

    #[test]
    fn test_valid_movie_passes() {
        let mut v = Validator::new();
        validate_movie(&mut v, &casablanca());
        assert!(v.is_valid(), "{:?}", v.errors());
    }

    #[test]
    fn test_invalid_movie_reports_each_field() {
        let mut movie = casablanca();
        movie.title = String::new();
        movie.year = 1700;
        movie.runtime = Runtime(-5);
        movie.genres = vec!["drama".to_string(), "drama".to_string()];

        let mut v = Validator::new();
        validate_movie(&mut v, &movie);

        let errors = v.errors();
        assert_eq!(errors["title"], "must be provided");
        assert_eq!(errors["year"], "must be greater than 1888");
        assert_eq!(errors["runtime"], "must be a positive integer");
        assert_eq!(errors["genres"], "must not contain duplicate values");
    }

    #[test]
    fn test_future_year_rejected() {
        let mut movie = casablanca();
        movie.year = Utc::now().year() + 1;
        let mut v = Validator::new();
        validate_movie(&mut v, &movie);
        assert_eq!(v.errors()["year"], "must not be in the future");
    }

    #[test]
    fn test_input_requires_genres() {
        let dto: MovieInputDto =
            serde_json::from_str(r#"{"title": "Heat", "year": 1995, "runtime": "170 mins"}"#)
                .unwrap();
        let mut v = Validator::new();
        dto.validate(&mut v);
        assert_eq!(v.errors()["genres"], "must be provided");
    }

    #[test]
    fn test_input_rejects_unknown_fields() {
        let result = serde_json::from_str::<MovieInputDto>(r#"{"title": "Heat", "rating": 5}"#);
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut movie = casablanca();
        let patch: PatchMovieDto = serde_json::from_str(r#"{"year": 2000}"#).unwrap();
        patch.apply(&mut movie);

        assert_eq!(movie.year, 2000);
        assert_eq!(movie.title, "Casablanca");
        assert_eq!(movie.runtime, Runtime(102));
        assert_eq!(movie.genres, vec!["drama", "romance"]);
    }

    #[test]
    fn test_patch_empty_string_overwrites() {
        let mut movie = casablanca();
        let patch: PatchMovieDto = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        patch.apply(&mut movie);
        assert_eq!(movie.title, "");
    }

    #[test]
    fn test_patch_null_is_treated_as_absent() {
        let mut movie = casablanca();
        let patch: PatchMovieDto = serde_json::from_str(r#"{"title": null}"#).unwrap();
        patch.apply(&mut movie);
        assert_eq!(movie.title, "Casablanca");
    }

    #[test]
    fn test_replace_overwrites_everything() {
        let mut movie = casablanca();
        let dto = MovieInputDto {
            title: "Heat".to_string(),
            year: 1995,
            runtime: Runtime(170),
            genres: Some(vec!["crime".to_string()]),
        };
        dto.replace(&mut movie);
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.genres, vec!["crime"]);
        assert_eq!(movie.version, 1);
    }
}
