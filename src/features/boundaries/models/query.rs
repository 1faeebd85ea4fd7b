use geo::{coord, Intersects, Rect};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::features::boundaries::models::{BoundaryGeometry, BoundaryPolygon};

/// Map viewport rectangle in lon/lat degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ViewportBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl ViewportBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        let bounds = Self {
            west,
            south,
            east,
            north,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Parse the `bounds` query parameter, a JSON object with all four edges.
    pub fn parse(raw: &str) -> Result<Self> {
        let bounds: Self = serde_json::from_str(raw)
            .map_err(|_| AppError::InvalidParameter("Invalid bounds parameter".to_string()))?;
        bounds.validate()?;
        Ok(bounds)
    }

    fn validate(&self) -> Result<()> {
        let edges = [self.west, self.south, self.east, self.north];
        if edges.iter().any(|v| !v.is_finite()) || self.west > self.east || self.south > self.north
        {
            return Err(AppError::InvalidParameter(
                "Invalid bounds parameter".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    pub fn intersects(&self, geometry: &BoundaryGeometry) -> bool {
        let rect = self.to_rect();
        match geometry {
            BoundaryGeometry::Polygon(polygon) => polygon.intersects(&rect),
            BoundaryGeometry::MultiPolygon(multi) => multi.intersects(&rect),
        }
    }

    /// JSON form used as the `bounds` query parameter
    pub fn to_query_value(&self) -> String {
        format!(
            r#"{{"west":{},"south":{},"east":{},"north":{}}}"#,
            self.west, self.south, self.east, self.north
        )
    }
}

/// Parse a zoom level the way the map sends it: leading integer part of the
/// string, so `"8.7"` is 8 and `"abc"` is rejected.
pub fn parse_zoom(raw: Option<&str>) -> Result<i32> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidParameter("Zoom level is required".to_string()))?;

    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits_len = raw[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits_len == 0 {
        return Err(AppError::InvalidParameter("Invalid zoom level".to_string()));
    }

    raw[..sign_len + digits_len]
        .parse::<i32>()
        .map_err(|_| AppError::InvalidParameter("Invalid zoom level".to_string()))
}

/// Selection criteria for the LOD boundary resolver
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryQuery {
    pub zoom: i32,
    pub bounds: Option<ViewportBounds>,
    /// Province code filter (kodeProvinsi)
    pub provinsi: Option<String>,
    /// Regency code filter (kodeKabupaten)
    pub kabupaten: Option<String>,
}

impl BoundaryQuery {
    pub fn at_zoom(zoom: i32) -> Self {
        Self {
            zoom,
            bounds: None,
            provinsi: None,
            kabupaten: None,
        }
    }

    pub fn with_bounds(mut self, bounds: ViewportBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Build a query from raw request parameters. Empty code filters are ignored.
    pub fn from_params(
        zoom: Option<&str>,
        bounds: Option<&str>,
        provinsi: Option<String>,
        kabupaten: Option<String>,
    ) -> Result<Self> {
        let zoom = parse_zoom(zoom)?;
        let bounds = bounds
            .filter(|s| !s.trim().is_empty())
            .map(ViewportBounds::parse)
            .transpose()?;

        Ok(Self {
            zoom,
            bounds,
            provinsi: provinsi.filter(|s| !s.is_empty()),
            kabupaten: kabupaten.filter(|s| !s.is_empty()),
        })
    }

    /// Exact selection rule: zoom inside the boundary's range, geometry
    /// intersecting the bounds, and every supplied code filter equal.
    pub fn matches(&self, boundary: &BoundaryPolygon) -> bool {
        if !boundary.covers_zoom(self.zoom) {
            return false;
        }

        if let Some(kode) = &self.provinsi {
            if &boundary.identity.provinsi().kode != kode {
                return false;
            }
        }

        if let Some(kode) = &self.kabupaten {
            match boundary.identity.kabupaten() {
                Some(kabupaten) if &kabupaten.kode == kode => {}
                _ => return false,
            }
        }

        match &self.bounds {
            Some(bounds) => bounds.intersects(&boundary.geometry),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{kabupaten_boundary, provinsi_boundary, square};

    #[test]
    fn test_parse_zoom_leading_integer() {
        assert_eq!(parse_zoom(Some("8")).unwrap(), 8);
        assert_eq!(parse_zoom(Some("8.7")).unwrap(), 8);
        assert_eq!(parse_zoom(Some(" 12px")).unwrap(), 12);
        assert_eq!(parse_zoom(Some("-1")).unwrap(), -1);
    }

    #[test]
    fn test_parse_zoom_rejects_missing_and_garbage() {
        match parse_zoom(None) {
            Err(AppError::InvalidParameter(msg)) => assert_eq!(msg, "Zoom level is required"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_zoom(Some("")),
            Err(AppError::InvalidParameter(_))
        ));
        match parse_zoom(Some("abc")) {
            Err(AppError::InvalidParameter(msg)) => assert_eq!(msg, "Invalid zoom level"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_zoom(Some("-")).is_err());
    }

    #[test]
    fn test_parse_bounds() {
        let bounds =
            ViewportBounds::parse(r#"{"west":95,"south":2,"east":98.5,"north":6}"#).unwrap();
        assert_eq!(bounds.west, 95.0);
        assert_eq!(bounds.north, 6.0);

        assert!(ViewportBounds::parse("not json").is_err());
        assert!(ViewportBounds::parse(r#"{"west":95,"south":2,"east":98.5}"#).is_err());
        assert!(ViewportBounds::parse(r#"{"west":99,"south":2,"east":98,"north":6}"#).is_err());
    }

    #[test]
    fn test_bounds_query_value_parses_back() {
        let bounds = ViewportBounds::new(94.5, -6.0, 106.5, 6.5).unwrap();
        assert_eq!(ViewportBounds::parse(&bounds.to_query_value()).unwrap(), bounds);
    }

    #[test]
    fn test_from_params_ignores_empty_filters() {
        let query = BoundaryQuery::from_params(Some("5"), Some(""), Some(String::new()), None)
            .unwrap();
        assert_eq!(query, BoundaryQuery::at_zoom(5));
    }

    #[test]
    fn test_matches_zoom_range_inclusive() {
        let aceh = provinsi_boundary("11", "ACEH", square(95.0, 2.0, 98.0, 6.0));
        assert!(BoundaryQuery::at_zoom(4).matches(&aceh));
        assert!(BoundaryQuery::at_zoom(7).matches(&aceh));
        assert!(!BoundaryQuery::at_zoom(8).matches(&aceh));
        assert!(!BoundaryQuery::at_zoom(3).matches(&aceh));
    }

    #[test]
    fn test_matches_bounds_intersection() {
        let aceh = provinsi_boundary("11", "ACEH", square(95.0, 2.0, 98.0, 6.0));
        let inside = ViewportBounds::new(96.0, 3.0, 97.0, 4.0).unwrap();
        let touching = ViewportBounds::new(98.0, 1.0, 99.0, 2.0).unwrap();
        let outside = ViewportBounds::new(100.0, -3.0, 102.0, -1.0).unwrap();

        assert!(BoundaryQuery::at_zoom(5).with_bounds(inside).matches(&aceh));
        assert!(BoundaryQuery::at_zoom(5).with_bounds(touching).matches(&aceh));
        assert!(!BoundaryQuery::at_zoom(5).with_bounds(outside).matches(&aceh));
    }

    #[test]
    fn test_matches_code_filters() {
        let simeulue = kabupaten_boundary(
            ("11", "ACEH"),
            ("1101", "SIMEULUE"),
            square(95.5, 2.3, 96.5, 3.0),
        );
        let provinsi = provinsi_boundary("11", "ACEH", square(95.0, 2.0, 98.0, 6.0));

        let mut query = BoundaryQuery::at_zoom(7);
        query.provinsi = Some("11".into());
        assert!(query.matches(&simeulue));
        assert!(query.matches(&provinsi));

        query.kabupaten = Some("1101".into());
        assert!(query.matches(&simeulue));
        assert!(!query.matches(&provinsi));

        query.provinsi = Some("12".into());
        assert!(!query.matches(&simeulue));
    }
}
