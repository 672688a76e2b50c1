use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use super::movie::MovieDetail;

/// Whether a completed run produced anything to show
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Found,
    NoneFound,
}

/// Movies filed under each genre label they carry.
///
/// Serializes as a JSON object keyed by genre, keys in order of first use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreGroups(Vec<(String, Vec<MovieDetail>)>);

impl GenreGroups {
    pub fn get(&self, genre: &str) -> Option<&[MovieDetail]> {
        self.0
            .iter()
            .find(|(name, _)| name == genre)
            .map(|(_, movies)| movies.as_slice())
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GenreGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (genre, movies) in &self.0 {
            map.serialize_entry(genre, movies)?;
        }
        map.end()
    }
}

/// Response body for a completed recommendation run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResponse {
    pub status: RecommendationStatus,
    pub movies: Vec<MovieDetail>,
    pub by_genre: GenreGroups,
}

impl RecommendationResponse {
    pub fn new(movies: Vec<MovieDetail>) -> Self {
        let status = if movies.is_empty() {
            RecommendationStatus::NoneFound
        } else {
            RecommendationStatus::Found
        };
        let by_genre = group_by_genre(&movies);

        Self {
            status,
            movies,
            by_genre,
        }
    }
}

/// Groups movies under every genre they carry.
///
/// Groups appear in order of first use; a movie is listed once per group.
pub fn group_by_genre(movies: &[MovieDetail]) -> GenreGroups {
    let mut groups: Vec<(String, Vec<MovieDetail>)> = Vec::new();

    for movie in movies {
        for genre in &movie.genres {
            let index = match groups.iter().position(|(name, _)| name == genre) {
                Some(index) => index,
                None => {
                    groups.push((genre.clone(), Vec::new()));
                    groups.len() - 1
                }
            };

            let filed = &mut groups[index].1;
            if !filed.iter().any(|m| m.id() == movie.id()) {
                filed.push(movie.clone());
            }
        }
    }

    GenreGroups(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, MovieId, MovieSummary};

    fn movie(id: &str, genres: &[&str]) -> MovieDetail {
        MovieDetail {
            summary: MovieSummary {
                id: MovieId::new(id),
                title: format!("Movie {}", id),
                year: "2000".to_string(),
                poster_url: None,
                media_type: MediaType::Movie,
            },
            plot: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn ids(movies: &[MovieDetail]) -> Vec<&str> {
        movies.iter().map(|m| m.id().as_str()).collect()
    }

    #[test]
    fn test_group_by_genre_first_use_order() {
        let movies = vec![
            movie("tt1", &["Drama", "Crime"]),
            movie("tt2", &["Comedy"]),
            movie("tt3", &["Crime", "Drama", "Crime"]),
        ];

        let groups = group_by_genre(&movies);
        assert_eq!(groups.genres().collect::<Vec<_>>(), vec!["Drama", "Crime", "Comedy"]);
        assert_eq!(ids(groups.get("Drama").unwrap()), vec!["tt1", "tt3"]);
        assert_eq!(ids(groups.get("Crime").unwrap()), vec!["tt1", "tt3"]);
        assert_eq!(ids(groups.get("Comedy").unwrap()), vec!["tt2"]);
        assert!(groups.get("Horror").is_none());
    }

    #[test]
    fn test_groups_serialize_as_object_keyed_by_genre() {
        let response = RecommendationResponse::new(vec![
            movie("tt1", &["Drama", "Crime"]),
            movie("tt2", &["Crime"]),
        ]);

        let json = serde_json::to_string(&response.by_genre).unwrap();
        assert!(json.starts_with(r#"{"Drama":[{"id":"tt1""#));
        assert!(json.find(r#""Drama""#).unwrap() < json.find(r#""Crime""#).unwrap());

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["by_genre"]["Crime"][1]["id"], "tt2");
        assert_eq!(value["by_genre"]["Drama"][0]["title"], "Movie tt1");
    }

    #[test]
    fn test_movies_without_genres_are_ungrouped() {
        let groups = group_by_genre(&[movie("tt1", &[])]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_response_status() {
        assert_eq!(
            RecommendationResponse::new(vec![]).status,
            RecommendationStatus::NoneFound
        );

        let response = RecommendationResponse::new(vec![movie("tt1", &["Drama"])]);
        assert_eq!(response.status, RecommendationStatus::Found);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["status"],
            "found"
        );
    }
}
