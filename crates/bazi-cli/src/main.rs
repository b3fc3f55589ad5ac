//! `bazi` — Four Pillars charts and solar term tables from the command line.
//!
//! ```text
//! bazi chart "1996-11-08 02:28" --place 眉山 --gender male
//! bazi chart 2024-02-10T08:30 --longitude 116.41 --json
//! bazi terms 2024 --timezone Asia/Shanghai
//! ```
//!
//! Set `RUST_LOG=bazi_engine=debug` to trace the pipeline on stderr.

use anyhow::{anyhow, Context, Result};
use bazi_engine::{
    solar_terms_for_year, Bazi, BaziEngine, BaziInput, BaziOptions, Gazetteer, Gender,
    LocationQuery, SolarTerm, YearBoundary, ZiHourPolicy,
};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Parser)]
#[command(name = "bazi", version, about = "Four Pillars (八字) charts and solar terms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cast a chart for a civil date and time
    Chart(ChartArgs),
    /// List the 24 solar terms of a Gregorian year
    Terms(TermsArgs),
}

#[derive(Args)]
struct ChartArgs {
    /// Civil date and time: YYYY-MM-DD HH:MM[:SS] (a `T` separator also works)
    datetime: String,
    /// Longitude in degrees east (negative for west)
    #[arg(long, allow_hyphen_values = true, conflicts_with = "place")]
    longitude: Option<f64>,
    /// Place name or address, resolved offline (e.g. 眉山, beijing)
    #[arg(long)]
    place: Option<String>,
    /// Gender, enables the decade cycle
    #[arg(long, value_enum)]
    gender: Option<GenderArg>,
    #[command(flatten)]
    clock: ClockArgs,
    /// Start the next day at 23:00 instead of midnight
    #[arg(long)]
    late_zi_next_day: bool,
    /// Where the year pillar changes
    #[arg(long, value_enum, default_value = "lunar-new-year")]
    year_boundary: YearBoundaryArg,
    /// Number of decade pillars to list
    #[arg(long, default_value = "8")]
    decades: usize,
    /// Print the chart as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TermsArgs {
    /// Gregorian year (1900-2100)
    year: i32,
    #[command(flatten)]
    clock: ClockArgs,
    /// Print the terms as JSON
    #[arg(long)]
    json: bool,
}

/// How the civil clock relates to the sun.
#[derive(Args)]
struct ClockArgs {
    /// IANA timezone of the civil time; sets the reference meridian
    #[arg(long)]
    timezone: Option<String>,
    /// Reference meridian in degrees, overrides --timezone [default: 120]
    #[arg(long, allow_hyphen_values = true)]
    meridian: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

#[derive(Clone, Copy, ValueEnum)]
enum YearBoundaryArg {
    LunarNewYear,
    StartOfSpring,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

impl From<YearBoundaryArg> for YearBoundary {
    fn from(arg: YearBoundaryArg) -> Self {
        match arg {
            YearBoundaryArg::LunarNewYear => YearBoundary::LunarNewYear,
            YearBoundaryArg::StartOfSpring => YearBoundary::StartOfSpring,
        }
    }
}

impl ClockArgs {
    fn options(&self) -> Result<BaziOptions> {
        let mut options = match &self.timezone {
            Some(name) => {
                let tz: Tz = name
                    .parse()
                    .map_err(|e| anyhow!("unknown timezone '{name}': {e}"))?;
                BaziOptions::for_timezone(tz)
            }
            None => BaziOptions::default(),
        };
        if let Some(meridian) = self.meridian {
            options.reference_meridian = meridian;
        }
        Ok(options)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Chart(args) => chart(args).await,
        Commands::Terms(args) => terms(args),
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

async fn chart(args: ChartArgs) -> Result<()> {
    let instant = parse_datetime(&args.datetime)?;
    let options = BaziOptions {
        zi_hour: if args.late_zi_next_day {
            ZiHourPolicy::NextDay
        } else {
            ZiHourPolicy::SameDay
        },
        year_boundary: args.year_boundary.into(),
        decade_count: args.decades,
        ..args.clock.options()?
    };
    let meridian = options.reference_meridian;
    let engine = BaziEngine::with_options(options).context("invalid options")?;

    // Without a place the chart is cast on the reference meridian itself.
    let location = match (args.longitude, args.place) {
        (Some(longitude), _) => LocationQuery::Longitude(longitude),
        (None, Some(place)) => LocationQuery::Address(place),
        (None, None) => LocationQuery::Longitude(meridian),
    };
    debug!(%instant, ?location, "casting chart");
    let input = BaziInput {
        instant,
        location: Some(location),
        gender: args.gender.map(Gender::from),
    };

    let chart = engine
        .compute(input, &Gazetteer::new())
        .await
        .with_context(|| format!("failed to compute chart for {}", args.datetime))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print_chart(&chart);
    }
    Ok(())
}

fn terms(args: TermsArgs) -> Result<()> {
    let options = args.clock.options()?;
    options.validate().context("invalid options")?;
    debug!(
        year = args.year,
        meridian = options.reference_meridian,
        "listing solar terms"
    );
    let terms = solar_terms_for_year(args.year, options.reference_meridian)
        .with_context(|| format!("failed to list solar terms for {}", args.year))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&terms)?);
    } else {
        for term in &terms {
            println!("{}", term_line(term));
        }
    }
    Ok(())
}

fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| anyhow!("invalid datetime '{input}': expected YYYY-MM-DD HH:MM[:SS]"))
}

// ── Text output ─────────────────────────────────────────────────────────────

fn print_chart(chart: &Bazi) {
    let correction = chart.solar_time.correction_seconds;
    let sign = if correction < 0 { '-' } else { '+' };
    let minutes = correction.abs() / 60;
    let seconds = correction.abs() % 60;
    let hour_branch = chart.branches.get(3).map(|b| b.name).unwrap_or_default();

    let civil = chart.civil.format("%Y-%m-%d %H:%M:%S");
    println!("Civil time:       {civil}");
    println!("Longitude:        {:.2}°", chart.longitude);
    println!(
        "True solar time:  {} ({sign}{minutes}m{seconds:02}s)",
        chart.solar_time.true_solar.format("%Y-%m-%d %H:%M:%S")
    );
    println!("Lunar date:       {} {hour_branch}时", chart.lunar.text);
    let current = term_line(&chart.solar_terms.current);
    let next = term_line(&chart.solar_terms.next);
    println!("Solar term:       {current}");
    println!("Next term:        {next}");
    println!();
    println!("Pillars:          {}", chart.pillars.names());
    println!(
        "Ten Gods:         {} {} 日主 {}",
        chart.ten_gods.year, chart.ten_gods.month, chart.ten_gods.hour
    );
    let hidden: Vec<String> = chart
        .hidden_stems
        .iter()
        .map(|stems| stems.iter().map(|s| s.name).collect::<Vec<_>>().join(""))
        .collect();
    println!("Hidden stems:     {}", hidden.join(" "));
    let na_yin: Vec<&str> = chart.na_yin.iter().map(|n| n.name).collect();
    println!("Na Yin:           {}", na_yin.join(" "));
    println!();
    println!(
        "Tai Yuan 胎元 {}   Tai Xi 胎息 {}   Bian Xing 变星 {}   Ming Gong 命宫 {}",
        chart.tai_yuan.name, chart.tai_xi.name, chart.bian_xing.name, chart.ming_gong.name
    );
    println!(
        "Si Ling 司令:     {} (day {} since the month's jie)",
        chart.si_ling.name, chart.si_ling.days_since_jie
    );

    if let Some(da_yun) = &chart.da_yun {
        println!();
        println!(
            "Da Yun 大运:      {}, starts after {}y {}m on {}",
            if da_yun.forward { "forward" } else { "backward" },
            da_yun.start_years,
            da_yun.start_months,
            da_yun.start_date
        );
        for decade in &da_yun.decades {
            println!(
                "  age {:>3}  {}  {}",
                decade.start_age, decade.start_year, decade.pillar.name
            );
        }
    }
}

fn term_line(term: &SolarTerm) -> String {
    let instant = term.instant.format("%Y-%m-%d %H:%M:%S");
    format!("{}  {instant}", term.name)
}
