//! Core constants shared by the compositor, the pack context and the command protocol.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Style specification version emitted in every composed document.
pub const STYLE_VERSION: u8 = 8;

/// Source definition key holding the highest zoom a source serves tiles for.
pub const SOURCE_MAXZOOM: &str = "maxzoom";

/// Source definition key holding the lowest zoom a source serves tiles for.
pub const SOURCE_MINZOOM: &str = "minzoom";

/// Command message key: jump to a coordinate.
pub const COMMAND_GO: &str = "go";

/// Command message key: import a layer definition from a URL.
pub const COMMAND_IMPORT: &str = "import";

/// Command message key: start an offline pack download.
pub const COMMAND_DOWNLOAD: &str = "download";

/// Command message key: clear the tile cache.
pub const COMMAND_CLEAR_CACHE: &str = "clearCache";

/// Default lowest zoom for an offline pack.
pub const DEFAULT_PACK_MIN_ZOOM: f64 = 0.0;

/// Default highest zoom for an offline pack.
pub const DEFAULT_PACK_MAX_ZOOM: f64 = 16.0;
