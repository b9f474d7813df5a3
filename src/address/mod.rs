//! Structured addresses resolved from a postal code

use crate::geo::Coordinate;
use crate::postal::PostalCode;
use serde::Serialize;

/// Address returned by a postal-code lookup
///
/// Any component may be empty when the lookup service has no data for it
/// (ViaCEP leaves `logradouro` and `bairro` blank for city-wide codes).
/// `coordinate` is filled in once the address has been forward-geocoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAddress {
    pub postal_code: PostalCode,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub region: String,
    pub coordinate: Option<Coordinate>,
}

impl ResolvedAddress {
    pub fn new(
        postal_code: PostalCode,
        street: impl Into<String>,
        neighborhood: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            postal_code,
            street: street.into(),
            neighborhood: neighborhood.into(),
            city: city.into(),
            region: region.into(),
            coordinate: None,
        }
    }

    /// Text used as the forward-geocoding key:
    /// `"{street}, {neighborhood}, {city} - {region}"`
    pub fn geocoding_query(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.street, self.neighborhood, self.city, self.region
        )
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}
