//! Map viewport state: center, zoom, tile layer and pins.
//!
//! Coordinates follow the Web Mercator convention used by slippy-map tile
//! servers: at zoom `z` the world is `256 * 2^z` pixels wide, `y` grows
//! southwards.

use std::f64::consts::PI;

use crate::config::MarkerPolicy;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
pub const MIN_ZOOM: u8 = 0;

pub const DEFAULT_CENTER: LatLng = LatLng::new(51.505, -0.09);
pub const DEFAULT_ZOOM: u8 = 13;
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_MAX_ZOOM: u8 = 19;
pub const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Pixel position in the projected world at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

pub fn project(at: LatLng, zoom: f64) -> Point {
    let size = world_size(zoom);
    let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Point {
        x: (at.lng + 180.0) / 360.0 * size,
        y: (1.0 - lat.tan().asinh() / PI) / 2.0 * size,
    }
}

pub fn unproject(point: Point, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * point.y / size;
    LatLng {
        lat: n.sinh().atan().to_degrees(),
        lng: point.x / size * 360.0 - 180.0,
    }
}

/// Size of the map container in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinIcon {
    pub width: u16,
    pub height: u16,
}

impl Default for PinIcon {
    fn default() -> Self {
        Self {
            width: 30,
            height: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub icon: PinIcon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl TileLayer {
    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Tile column and row containing `at`.
    pub fn tile_at(at: LatLng, zoom: u8) -> (u32, u32) {
        let point = project(at, f64::from(zoom));
        let last = 1_u32
            .checked_shl(u32::from(zoom))
            .map_or(u32::MAX, |count| count - 1);
        let index = |pixel: f64| {
            let tile = (pixel / TILE_SIZE).floor().max(0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let tile = tile as u32;
            tile.min(last)
        };
        (index(point.x), index(point.y))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub tile_url: String,
    pub max_zoom: u8,
    pub attribution: String,
    pub icon: PinIcon,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            max_zoom: DEFAULT_MAX_ZOOM,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            icon: PinIcon::default(),
        }
    }
}

/// Geographic extent currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: LatLng,
    zoom: u8,
    tile_layer: TileLayer,
    icon: PinIcon,
    markers: Vec<Marker>,
    viewport: Viewport,
    marker_policy: MarkerPolicy,
}

impl MapView {
    /// Centers on the configured default, attaches the tile layer and drops
    /// the first pin on the default center.
    pub fn initialize(options: &MapOptions) -> Self {
        let tile_layer = TileLayer {
            url_template: options.tile_url.clone(),
            max_zoom: options.max_zoom,
            attribution: options.attribution.clone(),
        };

        let mut map = Self {
            center: options.center,
            zoom: options.zoom.min(options.max_zoom),
            tile_layer,
            icon: options.icon,
            markers: Vec::new(),
            viewport: Viewport::default(),
            marker_policy: MarkerPolicy::default(),
        };
        map.add_marker(options.center);
        map
    }

    #[must_use]
    pub const fn with_marker_policy(mut self, policy: MarkerPolicy) -> Self {
        self.marker_policy = policy;
        self
    }

    pub const fn center(&self) -> LatLng {
        self.center
    }

    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub const fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub const fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub const fn set_view(&mut self, at: LatLng) {
        self.center = at;
    }

    pub fn add_marker(&mut self, at: LatLng) {
        self.markers.push(Marker {
            position: at,
            icon: self.icon,
        });
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Recenters on `at` and pins it.
    pub fn update(&mut self, at: LatLng) {
        self.set_view(at);
        if self.marker_policy == MarkerPolicy::Replace {
            self.clear_markers();
        }
        self.add_marker(at);
    }

    /// Moves the view by a pixel offset at the current zoom.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let zoom = f64::from(self.zoom);
        let mut point = project(self.center, zoom);
        point.x += dx;
        point.y += dy;
        self.center = unproject(point, zoom);
    }

    /// Pans up by `ratio` of the viewport height when the viewport is no wider
    /// than `breakpoint`. Returns whether the pan happened.
    pub fn apply_mobile_offset(&mut self, breakpoint: f64, ratio: f64) -> bool {
        if self.viewport.width > breakpoint {
            return false;
        }
        let offset = self.viewport.height * ratio;
        self.pan_by(0.0, -offset);
        true
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.saturating_add(1).min(self.tile_layer.max_zoom);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    pub fn visible_bounds(&self) -> Bounds {
        let zoom = f64::from(self.zoom);
        let center = project(self.center, zoom);
        let half_w = self.viewport.width / 2.0;
        let half_h = self.viewport.height / 2.0;

        let north_west = unproject(
            Point {
                x: center.x - half_w,
                y: center.y - half_h,
            },
            zoom,
        );
        let south_east = unproject(
            Point {
                x: center.x + half_w,
                y: center.y + half_h,
            },
            zoom,
        );

        Bounds {
            west: north_west.lng,
            south: south_east.lat,
            east: south_east.lng,
            north: north_west.lat,
        }
    }

    /// URL of the tile under the current center.
    pub fn center_tile_url(&self) -> String {
        let (x, y) = TileLayer::tile_at(self.center, self.zoom);
        self.tile_layer.tile_url(self.zoom, x, y)
    }
}
