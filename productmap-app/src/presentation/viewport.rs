use crate::domain::Coordinate;
use productmap_errors::AppError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_ZOOM: f64 = 22.0;
/// Latitude where the Web-Mercator square ends.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Screen position in pixels, origin at the top-left corner of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The visible part of a Web-Mercator map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: Coordinate,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    pub fn new(center: Coordinate, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Converts a touch point to the coordinate under it.
    pub fn coordinate_at(&self, point: ScreenPoint) -> Result<Coordinate, AppError> {
        self.validate()?;
        if !(0.0..=self.width).contains(&point.x) || !(0.0..=self.height).contains(&point.y) {
            return Err(AppError::InvalidInput(format!(
                "point ({}, {}) is outside the {}x{} viewport",
                point.x, point.y, self.width, self.height
            )));
        }

        let world = self.world_size();
        let (center_x, center_y) = project(self.center, world);
        let world_x = center_x + point.x - self.width / 2.0;
        let world_y = (center_y + point.y - self.height / 2.0).clamp(0.0, world);

        let longitude = (world_x / world * 360.0).rem_euclid(360.0) - 180.0;
        let latitude = (PI * (1.0 - 2.0 * world_y / world)).sinh().atan().to_degrees();
        Coordinate::new(latitude, longitude).validated()
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn validate(&self) -> Result<(), AppError> {
        self.center.validated()?;
        if !(0.0..=MAX_ZOOM).contains(&self.zoom) {
            return Err(AppError::InvalidInput(format!("zoom out of range: {}", self.zoom)));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(AppError::InvalidInput("viewport has no area".to_string()));
        }
        Ok(())
    }
}

/// Pixel position of `coordinate` on a world of `world` pixels.
fn project(coordinate: Coordinate, world: f64) -> (f64, f64) {
    let latitude = coordinate.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (coordinate.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (latitude.tan() + 1.0 / latitude.cos()).ln() / PI) / 2.0 * world;
    (x, y)
}
