//! Tests for the upload and projects subcommands and global options.

use super::{parse, parse_command};
use crate::cli::CliCommand;
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_upload() {
    match parse_command(&["geoup", "upload", "/data/lots.shp", "--asset-id", "raster-9"]) {
        CliCommand::Upload { file, asset_id } => {
            assert_eq!(file, Path::new("/data/lots.shp"));
            assert_eq!(asset_id, "raster-9");
        }
        _ => panic!("expected Upload"),
    }
}

#[test]
fn cli_parse_upload_requires_asset_id() {
    assert!(crate::cli::Cli::try_parse_from(["geoup", "upload", "/data/lots.shp"]).is_err());
}

#[test]
fn cli_parse_projects() {
    match parse_command(&["geoup", "projects"]) {
        CliCommand::Projects => {}
        _ => panic!("expected Projects"),
    }
}

#[test]
fn cli_parse_global_retry() {
    let cli = parse(&["geoup", "--retry", "3", "projects"]);
    assert_eq!(cli.retry, Some(3));
    assert!(cli.chunk_size.is_none());
}

#[test]
fn cli_parse_global_chunk_size_after_subcommand() {
    let cli = parse(&[
        "geoup",
        "upload",
        "/data/ortho.tif",
        "--asset-id",
        "r1",
        "--chunk-size",
        "262144",
    ]);
    assert_eq!(cli.chunk_size, Some(262144));
}

#[test]
fn cli_parse_defaults_absent() {
    let cli = parse(&["geoup", "projects"]);
    assert!(cli.retry.is_none());
    assert!(cli.chunk_size.is_none());
}
