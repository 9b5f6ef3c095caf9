// Map defaults
pub const DEFAULT_ZOOM_LEVEL: f64 = 9.0;
pub const DEFAULT_CENTER: (f64, f64) = (52.196665, 5.0811767);

// Zoom level at which icons are drawn at their native pixel size
pub const NATIVE_SIZE_ZOOM_LEVEL: f64 = 18.0;
pub const BASE_OPACITY: f64 = 0.5;
pub const OPACITY_ZOOM_DIVISOR: f64 = 40.0;

// Sidebar swipe
pub const MIN_DRAG_TO_DISMISS: f64 = 200.0;
pub const DRAG_TRANSITION: &str = "transform .015s";
pub const SNAP_BACK_TRANSITION: &str = "transform .2s";

// Detail view has a fixed number of text lines
pub const TEXT_SLOTS: usize = 4;

// Resource locations, relative to the page
pub const DATA_FILE: &str = "data.json";
pub const IMAGES_PATH: &str = "./images";

// Host page element ids
pub const MAP_ELEMENT_ID: &str = "map";
pub const SIDEBAR_ELEMENT_ID: &str = "sidebar";
pub const CLOSE_BUTTON_ELEMENT_ID: &str = "close-button";

// Tiles
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
pub const DATA_ATTRIBUTION: &str = "Data: <a href=\"http://opendata.ndw.nu/\">opendata.ndw.nu/</a>";
