use std::fs;

use assert_cmd::Command;
use clap::Parser;
use kira_powersim::cli::{Cli, Commands};
use kira_powersim::config::{DesignConfig, InteractionSelector, SampleSizes};
use kira_powersim::grid::SampleSizeRange;
use tempfile::TempDir;

#[test]
fn run_flags_override_config() {
    let cli = Cli::parse_from([
        "kira-powersim",
        "run",
        "--groups",
        "a,b,c",
        "--times",
        "3",
        "--means=-1,0,1,-1,0,1,-1,0,1",
        "--sds",
        "2,2,2,2,2,2,2,2,2",
        "--support-min",
        "-10",
        "--support-max",
        "10",
        "--replications",
        "12",
        "--n-max",
        "120",
        "--omnibus",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run command");
    };
    let mut config = DesignConfig::default();
    args.apply_to(&mut config);
    assert_eq!(config.groups, vec!["a", "b", "c"]);
    assert_eq!(config.times, 3);
    assert_eq!(config.means[0], -1.0);
    assert_eq!(config.support.min, -10);
    assert_eq!(config.replications, 12);
    assert_eq!(
        config.sample_sizes,
        SampleSizes::Range(SampleSizeRange {
            min: 30,
            max: 120,
            step: 30
        })
    );
    assert_eq!(config.interaction, InteractionSelector::Omnibus);
    assert!(config.validate().is_ok());
}

#[test]
fn explicit_sizes_win_over_range_flags() {
    let cli = Cli::parse_from([
        "kira-powersim",
        "run",
        "--sample-sizes",
        "5,10",
        "--n-min",
        "40",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run command");
    };
    let mut config = DesignConfig::default();
    args.apply_to(&mut config);
    assert_eq!(config.sample_sizes, SampleSizes::List(vec![5, 10]));
}

#[test]
fn unset_flags_keep_defaults() {
    let cli = Cli::parse_from(["kira-powersim", "run"]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run command");
    };
    let mut config = DesignConfig::default();
    args.apply_to(&mut config);
    assert_eq!(config, DesignConfig::default());
}

#[test]
fn run_command_writes_tsv() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("res");
    Command::cargo_bin("kira-powersim")
        .unwrap()
        .args(["run", "--sample-sizes", "6,12", "--replications", "4", "--tsv", "--out"])
        .arg(&dir)
        .assert()
        .success();
    let tsv = fs::read_to_string(dir.join("power_curve.tsv")).unwrap();
    assert_eq!(tsv.lines().count(), 3);
}

#[test]
fn run_command_rejects_bad_design() {
    Command::cargo_bin("kira-powersim")
        .unwrap()
        .args(["run", "--sds", "10,10,10", "--replications", "2"])
        .assert()
        .failure();
}

#[test]
fn run_reads_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("design.toml");
    fs::write(
        &config,
        "sample_sizes = [6]\nreplications = 3\n\n[interaction]\nkind = \"omnibus\"\n",
    )
    .unwrap();
    let output = Command::cargo_bin("kira-powersim")
        .unwrap()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("test=group:time (F)"));
    assert!(stdout.contains("n=6: power="));
}

#[test]
fn dataset_command_is_deterministic() {
    let run = || {
        let output = Command::cargo_bin("kira-powersim")
            .unwrap()
            .args(["dataset", "--n", "4", "--seed", "9", "--replication", "2"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };
    let first = run();
    assert_eq!(first, run());
    assert!(first.starts_with("subject_id\tgroup\ttime\tvalue\n"));
    assert_eq!(first.lines().count(), 1 + 16);
}
