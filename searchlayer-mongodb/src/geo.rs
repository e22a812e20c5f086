//! Geo-point mapping between store and model representations.
//!
//! MongoDB stores locations as GeoJSON-style points; application models
//! expose separate latitude/longitude fields. [`GeoPointMapper`] bridges the
//! two: as a post-fetch [`ResultMapper`] it flattens the stored point into
//! the two scalar fields, and [`GeoPointMapper::collapse`] folds them back
//! into a point for writes.
//!
//! The stored coordinate order is `[latitude, longitude]`.

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use searchlayer_core::{
    error::{SearchError, SearchResult},
    searcher::ResultMapper,
};

/// A GeoJSON-style point as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// The GeoJSON type tag, always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[latitude, longitude]`.
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![latitude, longitude],
        }
    }
}

/// Maps a stored geo point to and from flat latitude/longitude fields.
#[derive(Debug, Clone)]
pub struct GeoPointMapper {
    point: String,
    latitude: String,
    longitude: String,
}

impl GeoPointMapper {
    /// Creates a mapper for the given point column with the default
    /// `latitude`/`longitude` target fields.
    pub fn new(point: impl Into<String>) -> Self {
        Self {
            point: point.into(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }

    /// Overrides the flat target field names.
    pub fn with_fields(
        mut self,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        self.latitude = latitude.into();
        self.longitude = longitude.into();
        self
    }

    /// Replaces the point field with flat latitude/longitude fields.
    ///
    /// A document without the point field is left untouched; a present but
    /// malformed point is an error.
    pub fn flatten(&self, document: &mut Document) -> SearchResult<()> {
        let Some(point) = document.remove(&self.point) else {
            return Ok(());
        };

        let coordinates = point
            .as_document()
            .and_then(|point| point.get_array("coordinates").ok())
            .ok_or_else(|| {
                SearchError::Mapping(format!("field {} is not a geo point", self.point))
            })?;
        let scalar = |index: usize| -> SearchResult<f64> {
            coordinates
                .get(index)
                .and_then(Bson::as_f64)
                .ok_or_else(|| {
                    SearchError::Mapping(format!(
                        "field {} has no numeric coordinate {index}",
                        self.point
                    ))
                })
        };

        document.insert(&self.latitude, scalar(0)?);
        document.insert(&self.longitude, scalar(1)?);

        Ok(())
    }

    /// Folds flat latitude/longitude fields back into the point field.
    ///
    /// Documents missing either flat field are left untouched.
    pub fn collapse(&self, document: &mut Document) -> SearchResult<()> {
        let (Ok(latitude), Ok(longitude)) = (
            document.get_f64(&self.latitude),
            document.get_f64(&self.longitude),
        ) else {
            return Ok(());
        };

        document.remove(&self.latitude);
        document.remove(&self.longitude);
        let point = bson::ser::serialize_to_bson(&GeoPoint::new(latitude, longitude))?;
        document.insert(&self.point, point);

        Ok(())
    }
}

#[async_trait]
impl ResultMapper for GeoPointMapper {
    async fn map(&self, document: &mut Bson) -> SearchResult<()> {
        match document.as_document_mut() {
            Some(body) => self.flatten(body),
            None => Err(SearchError::Mapping("expected document".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn flatten_assigns_each_coordinate_to_its_own_field() {
        let mapper = GeoPointMapper::new("location");
        let mut document = doc! {
            "name": "depot",
            "location": { "type": "Point", "coordinates": [10.0, 20.0] },
        };
        mapper.flatten(&mut document).unwrap();

        // Regression: longitude must receive the second coordinate, never a
        // copy of the latitude.
        assert_eq!(document.get_f64("latitude").unwrap(), 10.0);
        assert_eq!(document.get_f64("longitude").unwrap(), 20.0);
        assert!(document.get("location").is_none());
    }

    #[test]
    fn flatten_skips_documents_without_the_point() {
        let mapper = GeoPointMapper::new("location");
        let mut document = doc! { "name": "depot" };
        mapper.flatten(&mut document).unwrap();
        assert_eq!(document, doc! { "name": "depot" });
    }

    #[test]
    fn flatten_rejects_malformed_points() {
        let mapper = GeoPointMapper::new("location");
        let mut document = doc! { "location": { "type": "Point" } };
        assert!(mapper.flatten(&mut document).is_err());
    }

    #[test]
    fn collapse_round_trips_flatten() {
        let mapper = GeoPointMapper::new("location").with_fields("lat", "lon");
        let mut document = doc! { "lat": -5.5, "lon": 101.25 };
        mapper.collapse(&mut document).unwrap();

        let point = document.get_document("location").unwrap();
        assert_eq!(point.get_str("type").unwrap(), "Point");
        assert_eq!(
            point.get_array("coordinates").unwrap(),
            &[Bson::Double(-5.5), Bson::Double(101.25)]
        );

        mapper.flatten(&mut document).unwrap();
        assert_eq!(document.get_f64("lat").unwrap(), -5.5);
        assert_eq!(document.get_f64("lon").unwrap(), 101.25);
    }

    #[tokio::test]
    async fn mapper_transforms_fetched_documents() {
        let mapper = GeoPointMapper::new("location");
        let mut document = Bson::Document(doc! {
            "location": { "type": "Point", "coordinates": [1.0, 2.0] },
        });
        mapper.map(&mut document).await.unwrap();
        let body = document.as_document().unwrap();
        assert_eq!(body.get_f64("longitude").unwrap(), 2.0);
    }
}
