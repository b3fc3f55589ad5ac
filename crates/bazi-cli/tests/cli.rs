use assert_cmd::Command;
use predicates::prelude::*;

fn bazi() -> Command {
    Command::cargo_bin("bazi").unwrap()
}

// ── chart ───────────────────────────────────────────────────────────────────

#[test]
fn test_chart_text_at_longitude() {
    bazi()
        .args(["chart", "1996-11-08 02:28", "--longitude", "103.85"])
        .assert()
        .success()
        .stdout(predicate::str::contains("丙子 己亥 己酉 乙丑"))
        .stdout(predicate::str::contains("1996-11-08 01:39:16"))
        .stdout(predicate::str::contains("1996年 九月 廿八 丑时"))
        .stdout(predicate::str::contains("Da Yun").not());
}

#[test]
fn test_chart_with_place_and_gender() {
    bazi()
        .args([
            "chart",
            "1996-11-08T02:28",
            "--place",
            "眉山",
            "--gender",
            "male",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("丙子 己亥 己酉 乙丑"))
        .stdout(predicate::str::contains("Da Yun"))
        .stdout(predicate::str::contains("庚子"));
}

#[test]
fn test_chart_json() {
    let output = bazi()
        .args([
            "chart",
            "1996-11-08 02:28",
            "--place",
            "meishan",
            "--gender",
            "female",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let chart: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(chart["pillars"]["day"]["name"], "己酉");
    assert_eq!(chart["longitude"], 103.85);
    assert_eq!(chart["da_yun"]["forward"], false);
    assert_eq!(chart["da_yun"]["decades"].as_array().unwrap().len(), 8);
    assert_eq!(chart["da_yun"]["decades"][0]["pillar"]["name"], "戊戌");
}

#[test]
fn test_chart_decades_option() {
    let output = bazi()
        .args([
            "chart",
            "1996-11-08 02:28",
            "--longitude",
            "103.85",
            "--gender",
            "male",
            "--decades",
            "3",
            "--json",
        ])
        .output()
        .unwrap();
    let chart: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(chart["da_yun"]["decades"].as_array().unwrap().len(), 3);
}

#[test]
fn test_chart_defaults_to_reference_meridian() {
    bazi()
        .args(["chart", "2000-01-01 12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("己卯 丙子 戊午 戊午"))
        .stdout(predicate::str::contains("120.00°"));
}

#[test]
fn test_chart_late_zi_next_day() {
    bazi()
        .args(["chart", "2024-06-21 23:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("甲辰 庚午 丙辰 戊子"));

    bazi()
        .args(["chart", "2024-06-21 23:30", "--late-zi-next-day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("甲辰 庚午 丁巳 庚子"));
}

#[test]
fn test_chart_year_boundary() {
    bazi()
        .args([
            "chart",
            "2024-02-05 12:00",
            "--year-boundary",
            "start-of-spring",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("甲辰 丙寅"));
}

#[test]
fn test_chart_negative_longitude() {
    bazi()
        .args([
            "chart",
            "2000-06-01 12:00",
            "--longitude",
            "-74.0",
            "--timezone",
            "America/New_York",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("-74.00°"));
}

#[test]
fn test_chart_invalid_datetime() {
    bazi()
        .args(["chart", "November 8th"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("invalid datetime"));
}

#[test]
fn test_chart_unknown_place() {
    bazi()
        .args(["chart", "2000-01-01 12:00", "--place", "Atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("location not found: 'Atlantis'"));
}

#[test]
fn test_chart_out_of_range() {
    bazi()
        .args(["chart", "1850-01-01 12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_chart_unknown_timezone() {
    bazi()
        .args(["chart", "2000-01-01 12:00", "--timezone", "Mars/Olympus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown timezone 'Mars/Olympus'"));
}

#[test]
fn test_chart_longitude_conflicts_with_place() {
    bazi()
        .args([
            "chart",
            "2000-01-01 12:00",
            "--longitude",
            "120",
            "--place",
            "北京",
        ])
        .assert()
        .failure();
}

// ── terms ───────────────────────────────────────────────────────────────────

#[test]
fn test_terms_text() {
    let output = bazi().args(["terms", "2024"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 24);
    let first = stdout.lines().next().unwrap();
    assert!(first.starts_with("立春  2024-02-04"));
    assert!(stdout.contains("冬至  2024-12-21"));
}

#[test]
fn test_terms_json() {
    let output = bazi().args(["terms", "2024", "--json"]).output().unwrap();
    assert!(output.status.success());
    let terms: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let terms = terms.as_array().unwrap();
    assert_eq!(terms.len(), 24);
    assert_eq!(terms[0]["name"], "立春");
    assert_eq!(terms[23]["name"], "大寒");
}

#[test]
fn test_terms_bad_meridian() {
    bazi()
        .args(["terms", "2024", "--meridian", "200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid options"));
}
