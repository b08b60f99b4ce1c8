//! Integration tests for csvtab
//!
//! This file contains end-to-end tests that run the csvtab binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::{coaches_file, create_custom_file, create_temp_dir, players_file};

#[test]
fn test_print_whole_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Player,Tm,PTS,TRB,Starter"))
        .stdout(predicate::str::contains("LeBron James,LAL,30,8,true"))
        .stdout(predicate::str::contains("Anthony Davis,LAL,,12,true"))
        .stdout(predicate::str::contains("\"Green, Draymond\",GSW,9,7,false"));

    Ok(())
}

#[test]
fn test_filter_columns_and_sort() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap())
        .arg("-w")
        .arg("PTS > 20")
        .arg("-c")
        .arg("Player,PTS")
        .arg("--sort")
        .arg("PTS")
        .arg("--desc");

    cmd.assert().success().stdout(
        "Player,PTS\nLeBron James,30\nJayson Tatum,27\nStephen Curry,25\n",
    );

    Ok(())
}

#[test]
fn test_grouped_average() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let file = create_custom_file(
        temp_dir.path(),
        "scores.csv",
        "Player,Tm,PTS\nA,LAL,30\nB,GSW,25\nC,LAL,\n",
    )?;

    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(file.to_str().unwrap())
        .arg("--aggregate")
        .arg("avg")
        .arg("--target")
        .arg("PTS")
        .arg("--group-by")
        .arg("Tm");

    cmd.assert()
        .success()
        .stdout("Tm,avg(PTS)\nLAL,30.0\nGSW,25.0\n");

    Ok(())
}

#[test]
fn test_join_with_second_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap())
        .arg("--join")
        .arg(coaches_file().to_str().unwrap())
        .arg("--left-on")
        .arg("Tm")
        .arg("--right-on")
        .arg("Tm")
        .arg("-c")
        .arg("Player,Coach");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Stephen Curry,Steve Kerr"))
        .stdout(predicate::str::contains("LeBron James,Darvin Ham"))
        .stdout(predicate::str::contains("Jayson Tatum").not())
        .stdout(predicate::str::contains("Jacque Vaughn").not());

    Ok(())
}

#[test]
fn test_join_files_with_same_name() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let left_dir = temp_dir.path().join("a");
    let right_dir = temp_dir.path().join("b");
    std::fs::create_dir_all(&left_dir)?;
    std::fs::create_dir_all(&right_dir)?;
    let left = create_custom_file(&left_dir, "data.csv", "Tm,Player\nLAL,LeBron\n")?;
    let right = create_custom_file(&right_dir, "data.csv", "Tm,Coach\nLAL,Ham\n")?;

    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(left.to_str().unwrap())
        .arg("--join")
        .arg(right.to_str().unwrap())
        .arg("--left-on")
        .arg("Tm")
        .arg("--right-on")
        .arg("Tm");

    cmd.assert()
        .success()
        .stdout("Tm,Player,Coach\nLAL,LeBron,Ham\n");

    Ok(())
}

#[test]
fn test_tab_delimiter_and_chunking() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let file = create_custom_file(
        temp_dir.path(),
        "employees.tsv",
        "id\tname\tsalary\n1\tAlice\t75000\n2\tBob\t65000\n3\tCharlie\t85000\n",
    )?;

    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(file.to_str().unwrap())
        .arg("-F")
        .arg("\\t")
        .arg("--chunk-size")
        .arg("2")
        .arg("-w")
        .arg("salary >= 70000");

    cmd.assert()
        .success()
        .stdout("id\tname\tsalary\n1\tAlice\t75000\n3\tCharlie\t85000\n");

    Ok(())
}

#[test]
fn test_summary_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap()).arg("--summary");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"dataset\": \"players\""))
        .stdout(predicate::str::contains("\"PTS\": \"int\""))
        .stdout(predicate::str::contains("\"Starter\": \"bool\""))
        .stdout(predicate::str::contains("\"strategy\": \"full\""));

    Ok(())
}

#[test]
fn test_missing_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg("tests/data/does_not_exist.csv");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load file"))
        .stderr(predicate::str::contains("Source not found"));

    Ok(())
}

#[test]
fn test_unknown_column_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap())
        .arg("--sort")
        .arg("AST");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Column 'AST' not found"));

    Ok(())
}

#[test]
fn test_unsupported_aggregation_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("csvtab")?;
    cmd.arg(players_file().to_str().unwrap())
        .arg("--aggregate")
        .arg("median")
        .arg("--target")
        .arg("PTS");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported aggregation: median"));

    Ok(())
}
