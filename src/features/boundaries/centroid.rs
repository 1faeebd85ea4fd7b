//! Label anchor points for boundary polygons.
//!
//! The anchor is the arithmetic mean of the outer ring's vertices (the
//! closing vertex counts, as stored). It is not an area-weighted centroid
//! and may fall outside concave shapes; it always lies inside the ring's
//! convex hull.

use geo::{LineString, MultiPolygon, Point, Polygon};

use crate::features::boundaries::models::BoundaryGeometry;

/// Mean of every vertex of `ring`, `None` for an empty ring.
pub fn ring_vertex_mean(ring: &LineString<f64>) -> Option<Point<f64>> {
    let count = ring.0.len();
    if count == 0 {
        return None;
    }
    let (sum_x, sum_y) = ring
        .0
        .iter()
        .fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));
    Some(Point::new(sum_x / count as f64, sum_y / count as f64))
}

/// Absolute shoelace area of a ring in squared degrees.
pub fn ring_area(ring: &LineString<f64>) -> f64 {
    let twice_area: f64 = ring
        .0
        .windows(2)
        .map(|pair| pair[0].x * pair[1].y - pair[1].x * pair[0].y)
        .sum();
    (twice_area / 2.0).abs()
}

pub fn polygon_label_point(polygon: &Polygon<f64>) -> Option<Point<f64>> {
    ring_vertex_mean(polygon.exterior())
}

/// Anchor of the member polygon whose outer ring has the largest area.
/// Ties keep the earliest member.
pub fn multipolygon_label_point(multi: &MultiPolygon<f64>) -> Option<Point<f64>> {
    let mut dominant: Option<(&Polygon<f64>, f64)> = None;
    for polygon in &multi.0 {
        let area = ring_area(polygon.exterior());
        match dominant {
            Some((_, best)) if area <= best => {}
            _ => dominant = Some((polygon, area)),
        }
    }
    dominant.and_then(|(polygon, _)| polygon_label_point(polygon))
}

pub fn label_point(geometry: &BoundaryGeometry) -> Option<Point<f64>> {
    match geometry {
        BoundaryGeometry::Polygon(polygon) => polygon_label_point(polygon),
        BoundaryGeometry::MultiPolygon(multi) => multipolygon_label_point(multi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{multi_square, square, square_polygon};
    use geo::{polygon, ConvexHull, Intersects};

    #[test]
    fn test_vertex_mean_counts_closing_vertex() {
        let point = polygon_label_point(&square_polygon(0.0, 0.0, 2.0, 2.0)).unwrap();
        assert!((point.x() - 0.8).abs() < 1e-12);
        assert!((point.y() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_ring_area() {
        let polygon = square_polygon(0.0, 0.0, 2.0, 3.0);
        assert!((ring_area(polygon.exterior()) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_ring_has_no_anchor() {
        assert_eq!(ring_vertex_mean(&LineString::new(vec![])), None);
        assert_eq!(multipolygon_label_point(&MultiPolygon::new(vec![])), None);
    }

    #[test]
    fn test_multipolygon_uses_dominant_ring() {
        // Ring areas 10, 1000 and 5; the 1000 ring wins.
        let geometry = multi_square(&[
            (0.0, 0.0, 2.0, 5.0),
            (100.0, 100.0, 125.0, 140.0),
            (-10.0, -10.0, -5.0, -9.0),
        ]);
        let anchor = label_point(&geometry).unwrap();
        let expected = polygon_label_point(&square_polygon(100.0, 100.0, 125.0, 140.0)).unwrap();
        assert_eq!(anchor, expected);
    }

    #[test]
    fn test_multipolygon_tie_keeps_first() {
        let geometry = multi_square(&[(0.0, 0.0, 1.0, 1.0), (5.0, 5.0, 6.0, 6.0)]);
        let anchor = label_point(&geometry).unwrap();
        assert!(anchor.x() < 1.0);
    }

    #[test]
    fn test_anchor_inside_convex_hull() {
        let concave = geo::polygon![
            (x: 95.0, y: 2.0),
            (x: 98.0, y: 2.0),
            (x: 98.0, y: 6.0),
            (x: 97.5, y: 6.0),
            (x: 97.5, y: 2.5),
            (x: 95.0, y: 2.5),
            (x: 95.0, y: 2.0),
        ];
        let anchor = polygon_label_point(&concave).unwrap();
        assert!(concave.convex_hull().intersects(&anchor));

        let simple = square(96.0, 2.3, 96.3, 2.6);
        let anchor = label_point(&simple).unwrap();
        assert!(square_polygon(96.0, 2.3, 96.3, 2.6).intersects(&anchor));
    }
}
