//! Chart computation: civil instant and place in, Four Pillars chart out.
//!
//! The pipeline is:
//!
//! 1. resolve the longitude (the only `async` step, and skipped when the
//!    caller supplies one);
//! 2. shift the civil instant to true solar time;
//! 3. convert to the lunar calendar and locate the surrounding solar terms;
//! 4. compose the four pillars and the secondary points.
//!
//! Steps 2–4 are synchronous and deterministic, exposed directly as
//! [`BaziEngine::compute_at_longitude`].

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::branch::{Branch, HiddenStem};
use crate::cycle::{NaYin, StemBranch};
use crate::error::Result;
use crate::location::LocationResolver;
use crate::lunar::{to_lunar_date, LunarDate};
use crate::options::{BaziOptions, YearBoundary, ZiHourPolicy};
use crate::pillars::{
    combined_pillar, da_yun, day_pillar, days_since_jie, hour_pillar, ming_gong, month_pillar,
    si_ling, tai_yuan, year_pillar, year_pillar_from_start_of_spring, DaYun, Gender, SiLing,
};
use crate::solar_term::{jie_bounds, solar_terms_around, SolarTermPair};
use crate::solar_time::{true_solar_time, SolarTimeCorrection};
use crate::stem::{ten_god, Stem};
use crate::tables::Tables;

// ── Input ───────────────────────────────────────────────────────────────────

/// Where the chart is cast.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Longitude in degrees east.
    Longitude(f64),
    /// Free-text address for the [`LocationResolver`].
    Address(String),
}

/// A chart request.
#[derive(Debug, Clone, PartialEq)]
pub struct BaziInput {
    /// Civil (wall-clock) instant on the configured reference meridian.
    pub instant: NaiveDateTime,
    /// `None` asks the resolver for the current location.
    pub location: Option<LocationQuery>,
    /// Required for the decade cycle.
    pub gender: Option<Gender>,
}

// ── Result ──────────────────────────────────────────────────────────────────

/// The four pillars, in year-month-day-hour order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourPillars {
    pub year: StemBranch,
    pub month: StemBranch,
    pub day: StemBranch,
    pub hour: StemBranch,
}

impl FourPillars {
    pub fn iter(&self) -> impl Iterator<Item = &StemBranch> {
        [&self.year, &self.month, &self.day, &self.hour].into_iter()
    }

    /// Space-separated names, e.g. `丙子 己亥 己酉 乙丑`.
    pub fn names(&self) -> String {
        self.iter()
            .map(|pillar| pillar.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ten Gods of the other three stems relative to the day stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenGods {
    pub year: &'static str,
    pub month: &'static str,
    pub hour: &'static str,
}

/// A computed Four Pillars chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bazi {
    /// The civil instant requested.
    pub civil: NaiveDateTime,
    /// Longitude the chart was cast for, degrees east.
    pub longitude: f64,
    pub gender: Option<Gender>,
    pub solar_time: SolarTimeCorrection,
    /// Lunar date of the true-solar instant.
    pub lunar: LunarDate,
    /// Solar term in effect at the civil instant, and the next one.
    pub solar_terms: SolarTermPair,
    pub pillars: FourPillars,
    /// Stems of the four pillars.
    pub stems: Vec<Stem>,
    /// Branches of the four pillars.
    pub branches: Vec<Branch>,
    /// Hidden stems of the four branches.
    pub hidden_stems: Vec<Vec<HiddenStem>>,
    /// Na Yin of the four pillars.
    pub na_yin: Vec<NaYin>,
    pub tai_yuan: StemBranch,
    pub tai_xi: StemBranch,
    pub bian_xing: StemBranch,
    pub ming_gong: StemBranch,
    pub si_ling: SiLing,
    pub ten_gods: TenGods,
    /// Present when a gender was supplied.
    pub da_yun: Option<DaYun>,
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// Computes charts from one set of tables and options.
///
/// # Examples
///
/// ```
/// use bazi_engine::BaziEngine;
/// use chrono::NaiveDate;
///
/// let engine = BaziEngine::new().unwrap();
/// let birth = NaiveDate::from_ymd_opt(1996, 11, 8).unwrap().and_hms_opt(2, 28, 0).unwrap();
/// let chart = engine.compute_at_longitude(birth, 103.85, None).unwrap();
/// assert_eq!(chart.pillars.names(), "丙子 己亥 己酉 乙丑");
/// ```
#[derive(Debug, Clone)]
pub struct BaziEngine {
    tables: Tables,
    options: BaziOptions,
}

impl BaziEngine {
    /// An engine with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(BaziOptions::default())
    }

    /// An engine with custom options.
    ///
    /// # Errors
    ///
    /// Returns [`BaziError::InvalidInput`](crate::error::BaziError::InvalidInput)
    /// if the options fail validation.
    pub fn with_options(options: BaziOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            tables: Tables::build()?,
            options,
        })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn options(&self) -> &BaziOptions {
        &self.options
    }

    /// Compute a chart, resolving the location through `resolver` when the
    /// input does not carry a longitude.
    ///
    /// # Errors
    ///
    /// - [`BaziError::Location`](crate::error::BaziError::Location) when the
    ///   resolver fails
    /// - [`BaziError::InvalidInput`](crate::error::BaziError::InvalidInput)
    ///   for an instant outside 1900-01-31..=2101-01-28 (after correction) or
    ///   a longitude outside ±180°
    pub async fn compute<R: LocationResolver>(
        &self,
        input: BaziInput,
        resolver: &R,
    ) -> Result<Bazi> {
        let longitude = match input.location {
            Some(LocationQuery::Longitude(longitude)) => longitude,
            Some(LocationQuery::Address(address)) => {
                let coordinates = resolver.resolve(&address).await?;
                debug!(%address, longitude = coordinates.longitude, "resolved address");
                coordinates.longitude
            }
            None => {
                let coordinates = resolver.current_location().await?;
                debug!(
                    longitude = coordinates.longitude,
                    "resolved current location"
                );
                coordinates.longitude
            }
        };
        self.compute_at_longitude(input.instant, longitude, input.gender)
    }

    /// Compute a chart for a known longitude.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute), minus location failures.
    pub fn compute_at_longitude(
        &self,
        civil: NaiveDateTime,
        longitude: f64,
        gender: Option<Gender>,
    ) -> Result<Bazi> {
        let options = &self.options;
        let tables = &self.tables;
        let meridian = options.reference_meridian;

        let solar_time = true_solar_time(civil, longitude, meridian)?;
        let true_solar = solar_time.true_solar;
        debug!(
            %civil,
            longitude,
            %true_solar,
            correction = solar_time.correction_seconds,
            "true solar time"
        );

        let lunar = to_lunar_date(true_solar)?;
        let solar_terms = solar_terms_around(civil, meridian)?;
        let bounds = jie_bounds(civil, meridian)?;

        let year = match options.year_boundary {
            YearBoundary::LunarNewYear => year_pillar(tables, lunar.year)?,
            YearBoundary::StartOfSpring => {
                year_pillar_from_start_of_spring(tables, civil, solar_terms.current.index)?
            }
        };
        let month = month_pillar(tables, year.stem, solar_terms.current.name)?;

        let mut day_date = true_solar.date();
        if options.zi_hour == ZiHourPolicy::NextDay && true_solar.hour() == 23 {
            day_date += Duration::days(1);
        }
        let day = day_pillar(tables, day_date)?;
        let hour = hour_pillar(tables, day.stem, true_solar.hour())?;

        let pillars = FourPillars {
            year: year.clone(),
            month: month.clone(),
            day: day.clone(),
            hour: hour.clone(),
        };
        debug!(pillars = %pillars.names(), "composed pillars");

        let stems = pillars
            .iter()
            .map(|pillar| tables.stem(pillar.stem).cloned())
            .collect::<Result<Vec<_>>>()?;
        let branches = pillars
            .iter()
            .map(|pillar| tables.branch(pillar.branch).cloned())
            .collect::<Result<Vec<_>>>()?;
        let hidden_stems = branches
            .iter()
            .map(|branch| branch.hidden_stems.clone())
            .collect();
        let na_yin = pillars.iter().map(|pillar| pillar.na_yin.clone()).collect();

        let day_stem = tables.stem(day.stem)?;
        let ten_gods = TenGods {
            year: ten_god(day_stem, tables.stem(year.stem)?, &tables.elements)?,
            month: ten_god(day_stem, tables.stem(month.stem)?, &tables.elements)?,
            hour: ten_god(day_stem, tables.stem(hour.stem)?, &tables.elements)?,
        };

        let da_yun = gender
            .map(|gender| {
                da_yun(
                    tables,
                    year.stem,
                    month,
                    gender,
                    civil,
                    &bounds,
                    options.decade_count,
                )
            })
            .transpose()?;

        Ok(Bazi {
            civil,
            longitude,
            gender,
            solar_time,
            lunar,
            si_ling: si_ling(tables, month.branch, days_since_jie(civil, &bounds))?,
            solar_terms,
            tai_yuan: tai_yuan(tables, month)?.clone(),
            tai_xi: combined_pillar(tables, day)?.clone(),
            bian_xing: combined_pillar(tables, hour)?.clone(),
            ming_gong: ming_gong(tables, year.stem, month.branch, hour.branch)?.clone(),
            pillars,
            stems,
            branches,
            hidden_stems,
            na_yin,
            ten_gods,
            da_yun,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BaziError, LocationError};
    use crate::location::{Coordinates, Gazetteer};
    use chrono::NaiveDate;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn engine() -> BaziEngine {
        BaziEngine::new().unwrap()
    }

    /// Fails every lookup, to prove a lookup never happened.
    struct OfflineResolver;

    impl LocationResolver for OfflineResolver {
        async fn resolve(&self, address: &str) -> std::result::Result<Coordinates, LocationError> {
            Err(LocationError::NotFound(address.to_string()))
        }

        async fn current_location(&self) -> std::result::Result<Coordinates, LocationError> {
            Err(LocationError::Unavailable("offline".to_string()))
        }
    }

    // ── Pillar composition tests ────────────────────────────────────────

    #[test]
    fn test_meishan_1996_chart() {
        let chart = engine()
            .compute_at_longitude(datetime(1996, 11, 8, 2, 28), 103.85, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "丙子 己亥 己酉 乙丑");
        let true_solar = datetime(1996, 11, 8, 1, 39) + Duration::seconds(16);
        assert_eq!(chart.solar_time.true_solar, true_solar);
        assert_eq!(chart.lunar.text, "1996年 九月 廿八");
        assert_eq!(chart.solar_terms.current.name, "立冬");
        assert!(chart.da_yun.is_none());
    }

    #[test]
    fn test_meishan_1996_secondary_points() {
        let chart = engine()
            .compute_at_longitude(datetime(1996, 11, 8, 2, 28), 103.85, None)
            .unwrap();
        assert_eq!(chart.tai_yuan.name, "庚寅");
        assert_eq!(chart.tai_xi.name, "甲辰");
        assert_eq!(chart.bian_xing.name, "庚子");
        assert_eq!(chart.ming_gong.name, "辛卯");
        assert_eq!(chart.si_ling.name, "戊土");
        assert_eq!(chart.si_ling.days_since_jie, 1);
        assert_eq!(
            chart.ten_gods,
            TenGods {
                year: "正印",
                month: "比肩",
                hour: "七杀",
            }
        );
    }

    #[test]
    fn test_stems_branches_and_hidden_stems() {
        let chart = engine()
            .compute_at_longitude(datetime(1996, 11, 8, 2, 28), 103.85, None)
            .unwrap();
        let stems: Vec<_> = chart.stems.iter().map(|s| s.name).collect();
        let branches: Vec<_> = chart.branches.iter().map(|b| b.name).collect();
        assert_eq!(stems, vec!["丙", "己", "己", "乙"]);
        assert_eq!(branches, vec!["子", "亥", "酉", "丑"]);
        assert_eq!(chart.hidden_stems[1].len(), 2);
        assert_eq!(chart.hidden_stems[1][0].name, "壬");
        assert_eq!(chart.na_yin[0].name, "涧下水");
    }

    #[test]
    fn test_before_start_of_spring() {
        let chart = engine()
            .compute_at_longitude(datetime(2024, 2, 4, 12, 0), 120.0, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "癸卯 乙丑 戊戌 戊午");
        assert_eq!(
            (chart.lunar.year, chart.lunar.month, chart.lunar.day),
            (2023, 12, 25)
        );
    }

    #[test]
    fn test_millennium() {
        let chart = engine()
            .compute_at_longitude(datetime(2000, 1, 1, 12, 0), 120.0, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "己卯 丙子 戊午 戊午");
    }

    #[test]
    fn test_lunar_new_year_2024_in_beijing() {
        let chart = engine()
            .compute_at_longitude(datetime(2024, 2, 10, 8, 30), 116.41, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "甲辰 丙寅 甲辰 戊辰");
        assert_eq!(chart.lunar.text, "2024年 正月 初一");
    }

    #[test]
    fn test_lunar_epoch_day() {
        let chart = engine()
            .compute_at_longitude(datetime(1900, 1, 31, 12, 0), 120.0, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "庚子 己丑 甲辰 庚午");
        assert_eq!(chart.si_ling.name, "己土");
    }

    #[test]
    fn test_correction_crosses_midnight() {
        let civil = datetime(2000, 1, 1, 0, 10);
        let on_meridian = engine().compute_at_longitude(civil, 120.0, None).unwrap();
        assert_eq!(on_meridian.pillars.names(), "己卯 丙子 戊午 壬子");

        // 20° west of the meridian the sun puts the chart back on New Year's Eve.
        let west = engine().compute_at_longitude(civil, 100.0, None).unwrap();
        let new_years_eve = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(west.solar_time.true_solar.date(), new_years_eve);
        assert_eq!(west.pillars.names(), "己卯 丙子 丁巳 辛亥");
        assert_eq!(
            (west.lunar.year, west.lunar.month, west.lunar.day),
            (1999, 11, 24)
        );
    }

    #[test]
    fn test_si_ling_just_after_midnight_jie_west_of_meridian() {
        // 大雪 1950 falls a few minutes after civil midnight; at 100° the
        // true-solar instant is still the previous evening.
        let chart = engine()
            .compute_at_longitude(datetime(1950, 12, 8, 0, 12), 100.0, None)
            .unwrap();
        assert_eq!(chart.solar_terms.current.name, "大雪");
        let previous_evening = NaiveDate::from_ymd_opt(1950, 12, 7).unwrap();
        assert_eq!(chart.solar_time.true_solar.date(), previous_evening);
        assert_eq!(chart.pillars.month.name, "戊子");
        assert_eq!(chart.si_ling.days_since_jie, 0);
        assert_eq!(chart.si_ling.name, "壬水");
    }

    #[test]
    fn test_before_lunar_table_is_invalid_input() {
        let err = engine()
            .compute_at_longitude(datetime(1899, 6, 1, 12, 0), 120.0, None)
            .unwrap_err();
        assert!(matches!(err, BaziError::InvalidInput(_)), "got: {err}");
    }

    #[test]
    fn test_bad_longitude_is_invalid_input() {
        let err = engine()
            .compute_at_longitude(datetime(2000, 1, 1, 12, 0), 500.0, None)
            .unwrap_err();
        assert!(matches!(err, BaziError::InvalidInput(_)), "got: {err}");
    }

    // ── Option tests ────────────────────────────────────────────────────

    #[test]
    fn test_late_zi_hour_same_day() {
        let chart = engine()
            .compute_at_longitude(datetime(2024, 6, 21, 23, 30), 120.0, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "甲辰 庚午 丙辰 戊子");
    }

    #[test]
    fn test_late_zi_hour_next_day() {
        let engine = BaziEngine::with_options(BaziOptions {
            zi_hour: ZiHourPolicy::NextDay,
            ..BaziOptions::default()
        })
        .unwrap();
        let chart = engine
            .compute_at_longitude(datetime(2024, 6, 21, 23, 30), 120.0, None)
            .unwrap();
        assert_eq!(chart.pillars.names(), "甲辰 庚午 丁巳 庚子");
    }

    #[test]
    fn test_year_boundary_start_of_spring() {
        let civil = datetime(2024, 2, 5, 12, 0);
        let lunar_year = engine().compute_at_longitude(civil, 120.0, None).unwrap();
        assert_eq!(lunar_year.pillars.year.name, "癸卯");
        assert_eq!(lunar_year.pillars.month.name, "甲寅");

        let engine = BaziEngine::with_options(BaziOptions {
            year_boundary: YearBoundary::StartOfSpring,
            ..BaziOptions::default()
        })
        .unwrap();
        let spring = engine.compute_at_longitude(civil, 120.0, None).unwrap();
        assert_eq!(spring.pillars.year.name, "甲辰");
        assert_eq!(spring.pillars.month.name, "丙寅");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = BaziEngine::with_options(BaziOptions {
            reference_meridian: f64::INFINITY,
            ..BaziOptions::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_decade_count_option() {
        let engine = BaziEngine::with_options(BaziOptions {
            decade_count: 10,
            ..BaziOptions::default()
        })
        .unwrap();
        let chart = engine
            .compute_at_longitude(datetime(1996, 11, 8, 2, 28), 103.85, Some(Gender::Male))
            .unwrap();
        assert_eq!(chart.da_yun.unwrap().decades.len(), 10);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let engine = engine();
        let civil = datetime(1988, 8, 8, 8, 8);
        let first = engine
            .compute_at_longitude(civil, 113.26, Some(Gender::Female))
            .unwrap();
        let second = engine
            .compute_at_longitude(civil, 113.26, Some(Gender::Female))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chart_serializes() {
        let chart = engine()
            .compute_at_longitude(datetime(1996, 11, 8, 2, 28), 103.85, Some(Gender::Male))
            .unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["pillars"]["day"]["name"], "己酉");
        assert_eq!(json["gender"], "Male");
        assert_eq!(json["da_yun"]["forward"], true);
    }

    // ── Async entry point tests ─────────────────────────────────────────

    #[tokio::test]
    async fn test_compute_resolves_address() {
        let input = BaziInput {
            instant: datetime(1996, 11, 8, 2, 28),
            location: Some(LocationQuery::Address("眉山".to_string())),
            gender: Some(Gender::Male),
        };
        let chart = engine().compute(input, &Gazetteer::new()).await.unwrap();
        assert_eq!(chart.longitude, 103.85);
        assert_eq!(chart.pillars.names(), "丙子 己亥 己酉 乙丑");
        assert_eq!(chart.da_yun.unwrap().decades[0].pillar.name, "庚子");
    }

    #[tokio::test]
    async fn test_compute_with_longitude_skips_resolver() {
        let input = BaziInput {
            instant: datetime(2000, 1, 1, 12, 0),
            location: Some(LocationQuery::Longitude(120.0)),
            gender: None,
        };
        let chart = engine().compute(input, &OfflineResolver).await.unwrap();
        assert_eq!(chart.pillars.names(), "己卯 丙子 戊午 戊午");
    }

    #[tokio::test]
    async fn test_compute_uses_current_location() {
        let home = Coordinates {
            longitude: 116.41,
            latitude: 39.90,
        };
        let input = BaziInput {
            instant: datetime(2024, 2, 10, 8, 30),
            location: None,
            gender: None,
        };
        let chart = engine()
            .compute(input, &Gazetteer::new().with_home(home))
            .await
            .unwrap();
        assert_eq!(chart.longitude, 116.41);
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates() {
        let input = BaziInput {
            instant: datetime(2000, 1, 1, 12, 0),
            location: Some(LocationQuery::Address("Atlantis".to_string())),
            gender: None,
        };
        let err = engine().compute(input, &OfflineResolver).await.unwrap_err();
        match err {
            BaziError::Location(LocationError::NotFound(name)) => assert_eq!(name, "Atlantis"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_current_location_unavailable_propagates() {
        let input = BaziInput {
            instant: datetime(2000, 1, 1, 12, 0),
            location: None,
            gender: None,
        };
        let err = engine().compute(input, &OfflineResolver).await.unwrap_err();
        assert!(
            err.to_string().contains("current location unavailable"),
            "got: {err}"
        );
    }
}
