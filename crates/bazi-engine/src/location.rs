//! Resolving a place to coordinates.
//!
//! Location lookup is the only asynchronous step of a computation: a real
//! resolver typically calls out to a geocoding service. The engine depends
//! only on the [`LocationResolver`] trait; [`Gazetteer`] is an offline
//! implementation over a built-in table of cities.

use std::future::Future;

use serde::Serialize;

use crate::error::LocationError;

/// A point on the Earth, in degrees (east and north positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// Source of coordinates for free-text addresses and for "here".
///
/// Failures are reported once and never retried by the engine.
pub trait LocationResolver {
    /// Resolve a free-text address.
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;

    /// The caller's current location.
    fn current_location(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Built-in places: Chinese name, pinyin, longitude, latitude.
const PLACES: &[(&str, &str, f64, f64)] = &[
    ("北京", "beijing", 116.41, 39.90),
    ("上海", "shanghai", 121.47, 31.23),
    ("广州", "guangzhou", 113.26, 23.13),
    ("深圳", "shenzhen", 114.06, 22.54),
    ("成都", "chengdu", 104.07, 30.57),
    ("眉山", "meishan", 103.85, 30.08),
    ("重庆", "chongqing", 106.55, 29.56),
    ("西安", "xian", 108.94, 34.34),
    ("武汉", "wuhan", 114.31, 30.59),
    ("杭州", "hangzhou", 120.16, 30.27),
    ("南京", "nanjing", 118.80, 32.06),
    ("天津", "tianjin", 117.20, 39.13),
    ("沈阳", "shenyang", 123.43, 41.80),
    ("哈尔滨", "harbin", 126.53, 45.80),
    ("乌鲁木齐", "urumqi", 87.62, 43.83),
    ("拉萨", "lhasa", 91.13, 29.65),
    ("昆明", "kunming", 102.83, 24.88),
    ("兰州", "lanzhou", 103.83, 36.06),
    ("长沙", "changsha", 112.94, 28.23),
    ("郑州", "zhengzhou", 113.63, 34.75),
    ("济南", "jinan", 117.00, 36.65),
    ("福州", "fuzhou", 119.30, 26.08),
    ("台北", "taipei", 121.56, 25.04),
    ("香港", "hongkong", 114.17, 22.32),
    ("澳门", "macau", 113.54, 22.20),
];

/// Offline resolver over a built-in city table.
///
/// Matching ignores ASCII case, spaces, hyphens and a trailing `市`, so
/// `"Hong Kong"`, `"hongkong"` and `"香港"` all resolve. An address that
/// contains a known Chinese city name (`"四川省眉山市东坡区"`) resolves to
/// that city.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    home: Option<Coordinates>,
}

impl Gazetteer {
    /// A gazetteer with no current location configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `home` as the answer to [`LocationResolver::current_location`].
    pub fn with_home(mut self, home: Coordinates) -> Self {
        self.home = Some(home);
        self
    }

    /// Synchronous lookup behind [`LocationResolver::resolve`].
    pub fn lookup(&self, address: &str) -> Option<Coordinates> {
        let key = normalize(address);
        if key.is_empty() {
            return None;
        }
        let found = PLACES
            .iter()
            .find(|(name, pinyin, _, _)| *name == key || *pinyin == key)
            .or_else(|| PLACES.iter().find(|(name, _, _, _)| key.contains(name)));
        found.map(|&(_, _, longitude, latitude)| Coordinates {
            longitude,
            latitude,
        })
    }

    /// Names of all built-in places, Chinese first.
    pub fn place_names() -> impl Iterator<Item = (&'static str, &'static str)> {
        PLACES.iter().map(|&(name, pinyin, _, _)| (name, pinyin))
    }
}

fn normalize(address: &str) -> String {
    let key: String = address
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '\'')
        .flat_map(char::to_lowercase)
        .collect();
    key.strip_suffix('市').map(str::to_string).unwrap_or(key)
}

impl LocationResolver for Gazetteer {
    async fn resolve(&self, address: &str) -> Result<Coordinates, LocationError> {
        self.lookup(address)
            .ok_or_else(|| LocationError::NotFound(address.to_string()))
    }

    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        self.home.ok_or_else(|| {
            LocationError::Unavailable("no home location configured".to_string())
        })
    }
}
