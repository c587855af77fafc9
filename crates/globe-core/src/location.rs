use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_MARKERS;
use crate::error::GlobeError;
use crate::geo::GeoPoint;

/// A trip shown on the globe. Immutable once a scene is built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Unique slug.
    pub id: String,
    pub title: String,
    pub place_name: String,
    pub geo: GeoPoint,
    pub host_name: String,
    pub host_image: String,
}

// Wire shape of one trip record as the embedding page supplies it.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct TripRecord {
    title: String,
    location: PlaceRecord,
    host: HostRecord,
    slug: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceRecord {
    name: String,
    lat: f32,
    lng: f32,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct HostRecord {
    name: String,
    #[serde(default)]
    image: String,
}

impl TryFrom<TripRecord> for Location {
    type Error = GlobeError;

    fn try_from(r: TripRecord) -> Result<Self, Self::Error> {
        Ok(Location {
            geo: GeoPoint::new(r.location.lat, r.location.lng)?,
            id: r.slug,
            title: r.title,
            place_name: r.location.name,
            host_name: r.host.name,
            host_image: r.host.image,
        })
    }
}

/// Parse and validate a JSON array of trip records.
pub fn locations_from_json(json: &str) -> Result<Vec<Location>, GlobeError> {
    let records: Vec<TripRecord> = serde_json::from_str(json)?;
    let locations = records
        .into_iter()
        .map(Location::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    validate_locations(locations)
}

/// Enforce unique non-empty ids and the marker cap.
pub fn validate_locations(locations: Vec<Location>) -> Result<Vec<Location>, GlobeError> {
    if locations.len() > MAX_MARKERS {
        return Err(GlobeError::TooManyLocations {
            count: locations.len(),
            max: MAX_MARKERS,
        });
    }
    let mut seen = FnvHashSet::default();
    for (index, loc) in locations.iter().enumerate() {
        if loc.id.trim().is_empty() {
            return Err(GlobeError::EmptyId { index });
        }
        if !seen.insert(loc.id.as_str()) {
            return Err(GlobeError::DuplicateId(loc.id.clone()));
        }
    }
    Ok(locations)
}

fn trip(slug: &str, title: &str, place: &str, lat: f32, lng: f32, host: &str, image: &str) -> Location {
    Location {
        id: slug.to_string(),
        title: title.to_string(),
        place_name: place.to_string(),
        geo: GeoPoint::clamped(lat, lng),
        host_name: host.to_string(),
        host_image: image.to_string(),
    }
}

const IMAGE_BASE: &str = "https://supersquad.blob.core.windows.net/trip-assets/image/";

/// Built-in trips used when the page supplies none.
pub fn sample_locations() -> Vec<Location> {
    let img = |name: &str| format!("{IMAGE_BASE}{name}");
    vec![
        trip("epic-europe", "Epic Europe With Khushbu", "Europe", 48.8566, 2.3522, "Khushbu Shah", &img("45dec4f8.jpeg")),
        trip(
            "thailand-with-komal",
            "Thailand with Komal",
            "Thailand",
            15.87,
            100.9925,
            "Komal Maheshwari",
            &img("e1c8674b.jpeg"),
        ),
        trip(
            "peakfit-retreat-with-sid-and-vera",
            "Peakfit Retreat with Sid and Vera",
            "Manali",
            32.2432,
            77.1892,
            "Siddhartha & Vera",
            &img("e5e653be.webp"),
        ),
        trip(
            "the-founders-camp-with-arihant-jaidev-and-vivek",
            "The Founder's Camp With Arihant, Jaidev & Vivek",
            "Kainchi Dhaam (Bhimtal)",
            29.3803,
            79.5556,
            "Arihant, Jaidev & Vivek",
            &img("45a10b17.jpeg"),
        ),
        trip(
            "bali-escape-with-garima",
            "Bali Escape with Garima",
            "Bali",
            -8.3405,
            115.092,
            "Garima Vardhan",
            &img("a542d33c.webp"),
        ),
        trip(
            "the-polecamp-vietnam-edition-5day",
            "The Pole Camp Vietnam Chapter",
            "Vietnam",
            14.0583,
            108.2772,
            "Anusha Swamy",
            &img("f119eaa0.jpeg"),
        ),
    ]
}
