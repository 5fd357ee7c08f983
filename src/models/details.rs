use serde::{Deserialize, Serialize};

use super::{Item, TmdbItem};

/// Certification shown when no US rating is published
pub const NOT_RATED: &str = "Not Rated";

/// A title's detail page: the base item plus credits, trailer, rating and artwork
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TitleDetails {
    #[serde(flatten)]
    pub item: Item,
    pub overview: Option<String>,
    pub runtime_minutes: Option<u32>,
    /// US certification, or [`NOT_RATED`]
    pub certification: String,
    pub trailer_url: Option<String>,
    pub director: Option<String>,
    pub writers: Vec<String>,
    pub cast: Vec<CastMember>,
    pub gallery: Gallery,
}

/// Fields of the details endpoint that the list-level [`Item`] does not carry
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    pub item: Item,
    pub overview: Option<String>,
    pub runtime_minutes: Option<u32>,
    /// Series creators, used when no crew member is credited as director
    pub creators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
    pub known_for_department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credits {
    /// Billing order
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    pub video_type: String,
}

/// Certifications published for one country
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRelease {
    /// ISO 3166-1 country code
    pub region: String,
    /// One entry per release; empty strings mean unrated
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Images {
    pub backdrops: Vec<String>,
    pub posters: Vec<String>,
}

/// Artwork picked for the detail page
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Gallery {
    pub backdrop: Option<String>,
    pub posters: Vec<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTitleRecord {
    #[serde(flatten)]
    pub item: TmdbItem,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub created_by: Vec<TmdbPerson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideoList {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
}

/// `/movie/{id}/release_dates`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbReleaseDates {
    #[serde(default)]
    pub results: Vec<TmdbCountryReleases>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCountryReleases {
    pub iso_3166_1: String,
    #[serde(default)]
    pub release_dates: Vec<TmdbRelease>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbRelease {
    #[serde(default)]
    pub certification: String,
}

/// `/tv/{id}/content_ratings`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbContentRatings {
    #[serde(default)]
    pub results: Vec<TmdbContentRating>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbContentRating {
    pub iso_3166_1: String,
    #[serde(default)]
    pub rating: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImages {
    #[serde(default)]
    pub backdrops: Vec<TmdbImage>,
    #[serde(default)]
    pub posters: Vec<TmdbImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImage {
    pub file_path: String,
}

impl TmdbTitleRecord {
    /// Series report a list of episode runtimes; the first one stands in for the title
    pub fn into_record(self, default_kind: super::MediaKind) -> Option<TitleRecord> {
        let runtime_minutes = self
            .runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| self.episode_run_time.first().copied());

        Some(TitleRecord {
            item: self.item.into_item(default_kind)?,
            overview: self.overview.filter(|o| !o.trim().is_empty()),
            runtime_minutes,
            creators: self.created_by.into_iter().map(|p| p.name).collect(),
        })
    }
}

impl From<TmdbCredits> for Credits {
    fn from(raw: TmdbCredits) -> Self {
        Credits {
            cast: raw
                .cast
                .into_iter()
                .map(|c| CastMember {
                    name: c.name,
                    character: c.character.filter(|ch| !ch.is_empty()),
                    profile_ref: c.profile_path,
                })
                .collect(),
            crew: raw
                .crew
                .into_iter()
                .map(|c| CrewMember {
                    name: c.name,
                    job: c.job,
                    known_for_department: c.known_for_department,
                })
                .collect(),
        }
    }
}

impl From<TmdbVideoList> for Vec<Video> {
    fn from(raw: TmdbVideoList) -> Self {
        raw.results
            .into_iter()
            .map(|v| Video {
                key: v.key,
                site: v.site,
                video_type: v.video_type,
            })
            .collect()
    }
}

impl From<TmdbReleaseDates> for Vec<RegionRelease> {
    fn from(raw: TmdbReleaseDates) -> Self {
        raw.results
            .into_iter()
            .map(|country| RegionRelease {
                region: country.iso_3166_1,
                certifications: country
                    .release_dates
                    .into_iter()
                    .map(|r| r.certification)
                    .collect(),
            })
            .collect()
    }
}

impl From<TmdbContentRatings> for Vec<RegionRelease> {
    fn from(raw: TmdbContentRatings) -> Self {
        raw.results
            .into_iter()
            .map(|r| RegionRelease {
                region: r.iso_3166_1,
                certifications: vec![r.rating],
            })
            .collect()
    }
}

impl From<TmdbImages> for Images {
    fn from(raw: TmdbImages) -> Self {
        Images {
            backdrops: raw.backdrops.into_iter().map(|i| i.file_path).collect(),
            posters: raw.posters.into_iter().map(|i| i.file_path).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    #[test]
    fn test_series_record_uses_episode_runtime_and_creators() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "genres": [{"id": 18, "name": "Drama"}],
            "vote_average": 8.9,
            "popularity": 300.1,
            "overview": "A chemistry teacher turns to crime.",
            "episode_run_time": [45, 47],
            "created_by": [{"id": 66633, "name": "Vince Gilligan"}]
        }"#;

        let raw: TmdbTitleRecord = serde_json::from_str(json).unwrap();
        let record = raw.into_record(MediaKind::Series).unwrap();

        assert_eq!(record.item.title, "Breaking Bad");
        assert_eq!(record.item.genre_ids, vec![18]);
        assert_eq!(record.runtime_minutes, Some(45));
        assert_eq!(record.creators, vec!["Vince Gilligan"]);
    }

    #[test]
    fn test_blank_overview_and_zero_runtime_dropped() {
        let json = r#"{"id": 9, "title": "Untitled", "overview": " ", "runtime": 0}"#;
        let record = serde_json::from_str::<TmdbTitleRecord>(json)
            .unwrap()
            .into_record(MediaKind::Film)
            .unwrap();

        assert_eq!(record.overview, None);
        assert_eq!(record.runtime_minutes, None);
    }

    #[test]
    fn test_video_type_field_renamed() {
        let json = r#"{"results": [{"key": "SUXWAEX2jlg", "site": "YouTube", "type": "Trailer"}]}"#;
        let videos: Vec<Video> = serde_json::from_str::<TmdbVideoList>(json).unwrap().into();

        assert_eq!(videos[0].video_type, "Trailer");
        assert_eq!(videos[0].key, "SUXWAEX2jlg");
    }

    #[test]
    fn test_content_ratings_map_to_regions() {
        let json = r#"{"results": [{"iso_3166_1": "US", "rating": "TV-MA"}]}"#;
        let regions: Vec<RegionRelease> =
            serde_json::from_str::<TmdbContentRatings>(json).unwrap().into();

        assert_eq!(regions[0].region, "US");
        assert_eq!(regions[0].certifications, vec!["TV-MA"]);
    }
}
