use crate::{
    error::AppResult,
    models::{
        details::NOT_RATED, CastMember, Credits, CrewMember, Gallery, Images, MediaKind,
        RegionRelease, TitleDetails, TitleRecord, Video,
    },
    services::providers::MetadataProvider,
};
use rand::{seq::IndexedRandom, Rng};
use std::collections::HashSet;

/// Billed cast members shown on the detail page
pub const TOP_CAST: usize = 5;
/// Posters sampled into the gallery
pub const GALLERY_POSTERS: usize = 3;

const CERTIFICATION_REGION: &str = "US";
const WRITING_JOBS: [&str; 3] = ["Writer", "Screenplay", "Story"];
const WRITING_DEPARTMENT: &str = "Writing";

/// Builds the detail page for a title
///
/// The base record is required; credits, videos, certifications and images
/// are fetched concurrently and each falls back to empty when its lookup fails.
pub async fn fetch_title_details(
    provider: &dyn MetadataProvider,
    kind: MediaKind,
    id: u64,
) -> AppResult<TitleDetails> {
    let (record, credits, videos, releases, images) = tokio::join!(
        provider.get_record(kind, id),
        provider.get_credits(kind, id),
        provider.get_videos(kind, id),
        provider.get_release_dates(kind, id),
        provider.get_images(kind, id),
    );

    let record = record?;
    let credits = or_empty("credits", id, credits);
    let videos = or_empty("videos", id, videos);
    let releases = or_empty("release_dates", id, releases);
    let images = or_empty("images", id, images);

    Ok(assemble(record, credits, &videos, &releases, images))
}

fn or_empty<T: Default>(section: &str, id: u64, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(
            title_id = id,
            section = section,
            error = %e,
            "Detail section unavailable"
        );
        T::default()
    })
}

fn assemble(
    record: TitleRecord,
    credits: Credits,
    videos: &[Video],
    releases: &[RegionRelease],
    images: Images,
) -> TitleDetails {
    let director = select_director(&credits.crew, &record.creators);
    let writers = select_writers(&credits.crew);
    let gallery = pick_gallery(images, &mut rand::rng());

    TitleDetails {
        item: record.item,
        overview: record.overview,
        runtime_minutes: record.runtime_minutes,
        certification: select_certification(releases),
        trailer_url: select_trailer(videos),
        director,
        writers,
        cast: top_cast(credits.cast),
        gallery,
    }
}

/// First non-empty US certification
pub fn select_certification(releases: &[RegionRelease]) -> String {
    releases
        .iter()
        .find(|r| r.region == CERTIFICATION_REGION)
        .and_then(|r| r.certifications.iter().find(|c| !c.trim().is_empty()))
        .cloned()
        .unwrap_or_else(|| NOT_RATED.to_string())
}

/// YouTube link for the first trailer
pub fn select_trailer(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site.eq_ignore_ascii_case("YouTube"))
        .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
}

/// First credited director; series without one fall back to their first creator
pub fn select_director(crew: &[CrewMember], creators: &[String]) -> Option<String> {
    crew.iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.clone())
        .or_else(|| creators.first().cloned())
}

/// Writing credits in crew order, one entry per person
pub fn select_writers(crew: &[CrewMember]) -> Vec<String> {
    let mut seen = HashSet::new();
    crew.iter()
        .filter(|member| {
            WRITING_JOBS.contains(&member.job.as_str())
                || member.known_for_department.as_deref() == Some(WRITING_DEPARTMENT)
        })
        .filter(|member| seen.insert(member.name.as_str()))
        .map(|member| member.name.clone())
        .collect()
}

pub fn top_cast(mut cast: Vec<CastMember>) -> Vec<CastMember> {
    cast.truncate(TOP_CAST);
    cast
}

/// One random backdrop and up to [`GALLERY_POSTERS`] random posters
pub fn pick_gallery<R: Rng + ?Sized>(images: Images, rng: &mut R) -> Gallery {
    let backdrop = images.backdrops.choose(rng).cloned();
    let posters = if images.posters.len() > GALLERY_POSTERS {
        images
            .posters
            .choose_multiple(rng, GALLERY_POSTERS)
            .cloned()
            .collect()
    } else {
        images.posters
    };

    Gallery { backdrop, posters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Item;
    use crate::services::providers::MockMetadataProvider;
    use rand::{rngs::StdRng, SeedableRng};

    fn crew(name: &str, job: &str, department: Option<&str>) -> CrewMember {
        CrewMember {
            name: name.to_string(),
            job: job.to_string(),
            known_for_department: department.map(str::to_string),
        }
    }

    fn video(key: &str, site: &str, video_type: &str) -> Video {
        Video {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
        }
    }

    fn region(code: &str, certifications: &[&str]) -> RegionRelease {
        RegionRelease {
            region: code.to_string(),
            certifications: certifications.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn actor(name: &str) -> CastMember {
        CastMember {
            name: name.to_string(),
            character: None,
            profile_ref: None,
        }
    }

    fn record(id: u64, creators: &[&str]) -> TitleRecord {
        TitleRecord {
            item: Item {
                id,
                title: "Fight Club".to_string(),
                kind: MediaKind::Film,
                release_year: Some(1999),
                genre_ids: vec![18],
                rating: Some(8.4),
                popularity: 60.0,
                poster_ref: None,
            },
            overview: Some("An insomniac office worker...".to_string()),
            runtime_minutes: Some(139),
            creators: creators.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_certification_prefers_first_non_empty_us_entry() {
        let releases = vec![
            region("GB", &["18"]),
            region("US", &["", "R", "NC-17"]),
        ];
        assert_eq!(select_certification(&releases), "R");
    }

    #[test]
    fn test_certification_falls_back_to_not_rated() {
        assert_eq!(select_certification(&[region("US", &["", " "])]), NOT_RATED);
        assert_eq!(select_certification(&[region("DE", &["16"])]), NOT_RATED);
        assert_eq!(select_certification(&[]), NOT_RATED);
    }

    #[test]
    fn test_trailer_is_first_youtube_trailer() {
        let videos = vec![
            video("teaser1", "YouTube", "Teaser"),
            video("vimeo1", "Vimeo", "Trailer"),
            video("SUXWAEX2jlg", "YouTube", "Trailer"),
            video("later", "YouTube", "Trailer"),
        ];
        assert_eq!(
            select_trailer(&videos).as_deref(),
            Some("https://www.youtube.com/watch?v=SUXWAEX2jlg")
        );
        assert_eq!(select_trailer(&[video("t", "YouTube", "Clip")]), None);
    }

    #[test]
    fn test_director_from_crew_or_first_creator() {
        let film_crew = vec![
            crew("Jim Uhls", "Screenplay", Some("Writing")),
            crew("David Fincher", "Director", Some("Directing")),
        ];
        assert_eq!(
            select_director(&film_crew, &[]).as_deref(),
            Some("David Fincher")
        );

        let creators = vec!["Vince Gilligan".to_string(), "Someone Else".to_string()];
        assert_eq!(
            select_director(&[crew("Bryan Cranston", "Producer", None)], &creators).as_deref(),
            Some("Vince Gilligan")
        );
        assert_eq!(select_director(&[], &[]), None);
    }

    #[test]
    fn test_writers_by_job_or_department_without_repeats() {
        let crew = vec![
            crew("Chuck Palahniuk", "Novel", Some("Writing")),
            crew("Jim Uhls", "Screenplay", Some("Writing")),
            crew("David Fincher", "Director", Some("Directing")),
            crew("Jim Uhls", "Story", Some("Writing")),
            crew("Jane Doe", "Writer", None),
        ];
        assert_eq!(
            select_writers(&crew),
            vec!["Chuck Palahniuk", "Jim Uhls", "Jane Doe"]
        );
    }

    #[test]
    fn test_top_cast_keeps_billing_order() {
        let cast: Vec<CastMember> = (1..=8).map(|n| actor(&format!("Actor {}", n))).collect();
        let names: Vec<String> = top_cast(cast).into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["Actor 1", "Actor 2", "Actor 3", "Actor 4", "Actor 5"]
        );
    }

    #[test]
    fn test_gallery_samples_three_distinct_posters() {
        let images = Images {
            backdrops: vec!["/b1.jpg".to_string(), "/b2.jpg".to_string()],
            posters: (1..=6).map(|n| format!("/p{}.jpg", n)).collect(),
        };
        let mut rng = StdRng::seed_from_u64(3);
        let gallery = pick_gallery(images.clone(), &mut rng);

        assert!(images.backdrops.contains(gallery.backdrop.as_ref().unwrap()));
        assert_eq!(gallery.posters.len(), GALLERY_POSTERS);
        let distinct: HashSet<&String> = gallery.posters.iter().collect();
        assert_eq!(distinct.len(), GALLERY_POSTERS);
        assert!(gallery.posters.iter().all(|p| images.posters.contains(p)));
    }

    #[test]
    fn test_gallery_keeps_few_posters_as_is() {
        let images = Images {
            backdrops: vec![],
            posters: vec!["/p1.jpg".to_string(), "/p2.jpg".to_string()],
        };
        let gallery = pick_gallery(images, &mut StdRng::seed_from_u64(1));

        assert_eq!(gallery.backdrop, None);
        assert_eq!(gallery.posters, vec!["/p1.jpg", "/p2.jpg"]);
    }

    #[tokio::test]
    async fn test_details_assembled_from_all_sections() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_get_record()
            .times(1)
            .returning(|_, id| Ok(record(id, &[])));
        mock.expect_get_credits().times(1).returning(|_, _| {
            Ok(Credits {
                cast: (1..=7).map(|n| actor(&format!("Actor {}", n))).collect(),
                crew: vec![
                    crew("David Fincher", "Director", Some("Directing")),
                    crew("Jim Uhls", "Screenplay", Some("Writing")),
                ],
            })
        });
        mock.expect_get_videos()
            .times(1)
            .returning(|_, _| Ok(vec![video("SUXWAEX2jlg", "YouTube", "Trailer")]));
        mock.expect_get_release_dates()
            .times(1)
            .returning(|_, _| Ok(vec![region("US", &["R"])]));
        mock.expect_get_images()
            .times(1)
            .returning(|_, _| Ok(Images::default()));

        let details = fetch_title_details(&mock, MediaKind::Film, 550).await.unwrap();

        assert_eq!(details.item.id, 550);
        assert_eq!(details.certification, "R");
        assert_eq!(details.director.as_deref(), Some("David Fincher"));
        assert_eq!(details.writers, vec!["Jim Uhls"]);
        assert_eq!(details.cast.len(), TOP_CAST);
        assert!(details.trailer_url.unwrap().ends_with("SUXWAEX2jlg"));
        assert_eq!(details.gallery, Gallery::default());
    }

    #[tokio::test]
    async fn test_failed_sections_fall_back_to_empty() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_get_record()
            .returning(|_, id| Ok(record(id, &["Vince Gilligan"])));
        mock.expect_get_credits()
            .returning(|_, _| Err(AppError::ExternalApi("credits down".to_string())));
        mock.expect_get_videos()
            .returning(|_, _| Err(AppError::ExternalApi("videos down".to_string())));
        mock.expect_get_release_dates()
            .returning(|_, _| Err(AppError::NotFound("release dates".to_string())));
        mock.expect_get_images()
            .returning(|_, _| Err(AppError::ExternalApi("images down".to_string())));

        let details = fetch_title_details(&mock, MediaKind::Series, 1396)
            .await
            .unwrap();

        assert_eq!(details.certification, NOT_RATED);
        assert_eq!(details.trailer_url, None);
        assert_eq!(details.director.as_deref(), Some("Vince Gilligan"));
        assert!(details.writers.is_empty());
        assert!(details.cast.is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_is_an_error() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_get_record()
            .returning(|_, id| Err(AppError::NotFound(format!("TMDB resource /movie/{}", id))));
        mock.expect_get_credits().returning(|_, _| Ok(Credits::default()));
        mock.expect_get_videos().returning(|_, _| Ok(vec![]));
        mock.expect_get_release_dates().returning(|_, _| Ok(vec![]));
        mock.expect_get_images().returning(|_, _| Ok(Images::default()));

        let result = fetch_title_details(&mock, MediaKind::Film, 9).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
