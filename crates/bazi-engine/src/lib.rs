//! # bazi-engine
//!
//! Deterministic Four Pillars (八字) computation.
//!
//! Converts a civil date/time and a place into the four stem-branch pillars
//! of year, month, day and hour, read off true solar time, the Chinese
//! lunisolar calendar and the 24 solar terms. Alongside the pillars it
//! derives hidden stems, Na Yin, Tai Yuan, Tai Xi, Bian Xing, Ming Gong,
//! the governing qi, Ten Gods and the decade cycle.
//!
//! ## Modules
//!
//! - [`astronomy`] — Julian Day conversion, solar longitude, crossing search
//! - [`solar_time`] — Equation of time and true solar time
//! - [`lunar_table`] — Packed lunar month data for 1900–2100
//! - [`lunar`] — Gregorian → lunar date conversion
//! - [`solar_term`] — Locating the 24 solar terms
//! - [`elements`] — Polarity, five elements, directions, seasons
//! - [`relation`] — Generic table-driven relation lookup
//! - [`stem`], [`branch`] — Heavenly Stems and Earthly Branches
//! - [`cycle`] — The sixty-pair cycle and Na Yin
//! - [`tables`] — The immutable base tables
//! - [`pillars`] — Pillar and secondary-point arithmetic
//! - [`bazi`] — The chart pipeline and [`BaziEngine`]
//! - [`location`] — Location resolver trait and offline gazetteer
//! - [`options`] — Engine configuration
//! - [`error`] — Error types
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` per computation, `trace` inside
//! the solar-term search) and installs no subscriber.

pub mod astronomy;
pub mod bazi;
pub mod branch;
pub mod cycle;
pub mod elements;
pub mod error;
pub mod location;
pub mod lunar;
pub mod lunar_table;
pub mod options;
pub mod pillars;
pub mod relation;
pub mod solar_term;
pub mod solar_time;
pub mod stem;
pub mod tables;

pub use bazi::{Bazi, BaziEngine, BaziInput, FourPillars, LocationQuery, TenGods};
pub use error::{BaziError, LocationError};
pub use location::{Coordinates, Gazetteer, LocationResolver};
pub use lunar::{to_lunar_date, LunarDate};
pub use options::{BaziOptions, YearBoundary, ZiHourPolicy};
pub use pillars::{DaYun, Decade, Gender, SiLing};
pub use solar_term::{
    jie_bounds, solar_terms_around, solar_terms_for_year, SolarTerm, SolarTermPair,
};
pub use solar_time::{equation_of_time_minutes, true_solar_time, SolarTimeCorrection};
pub use tables::Tables;
