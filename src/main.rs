//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, ArgMatches};
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use std::str::FromStr;
use tile_stitcher_core::core::{read_config, ApplicationCfg, Config};
use tile_stitcher_core::{Retriever, StitchConfig, StitchError, Stitcher};
use time;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let verbose = bool_arg(args, "Verbose", true);
    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (Some("debug"), _) => "debug,tokio=info,hyper=info,reqwest=info",
        (Some(loglevel), _) => loglevel,
        (None, Ok(rust_log)) => rust_log.as_str(),
        (None, Err(_)) if verbose => "info",
        (None, Err(_)) => "warn",
    };
    builder.parse_filters(rust_log);

    builder.init();
}

fn bool_arg(args: &ArgMatches<'_>, name: &str, default: bool) -> bool {
    args.value_of(name)
        .map_or(default, |s| bool::from_str(s).unwrap_or(default))
}

fn parse_arg<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Result<Option<T>, StitchError> {
    match args.value_of(name) {
        None => Ok(None),
        Some(s) => s.trim().parse::<T>().map(Some).map_err(|_| {
            StitchError::Config(format!("Error parsing '{}' value '{}'", name, s))
        }),
    }
}

/// Configuration file (if any) with command line overrides
fn config_from_args(args: &ArgMatches<'_>) -> Result<StitchConfig, StitchError> {
    let mut config: ApplicationCfg = if let Some(cfgpath) = args.value_of("config") {
        info!("Reading configuration from '{}'", cfgpath);
        read_config(cfgpath).map_err(StitchError::Config)?
    } else {
        ApplicationCfg::default()
    };

    let grid = &mut config.grid;
    grid.zoom = parse_arg(args, "ZoomLevel")?.or(grid.zoom);
    grid.tile_size = parse_arg(args, "TileSize")?.or(grid.tile_size);
    grid.xmin = parse_arg(args, "Xmin")?.or(grid.xmin);
    grid.xmax = parse_arg(args, "Xmax")?.or(grid.xmax);
    grid.ymin = parse_arg(args, "Ymin")?.or(grid.ymin);
    grid.ymax = parse_arg(args, "Ymax")?.or(grid.ymax);

    if let Some(location) = args.value_of("Location") {
        config.tiles.location = Some(location.to_string());
    }
    if let Some(pattern) = args.value_of("Pattern") {
        config.tiles.pattern = Some(pattern.to_string());
    }
    if let Some(root) = args.value_of("DownloadRoot") {
        config.download.root = Some(root.to_string());
    }
    config.download.timeout = parse_arg(args, "timeout")?.or(config.download.timeout);
    config.download.threads = parse_arg(args, "threads")?.or(config.download.threads);
    if let Some(file) = args.value_of("OutputFile") {
        config.output.file = Some(file.to_string());
    }

    let mut stitch_config = StitchConfig::from_config(&config).map_err(StitchError::Config)?;
    stitch_config.force = args.is_present("ForceStitch");
    stitch_config.progress = bool_arg(args, "Verbose", true);
    Ok(stitch_config)
}

/// Ask the user to continue, unless forced
fn prompt_to_continue(config: &StitchConfig) -> bool {
    if config.force {
        return true;
    }
    let stdin = io::stdin();
    loop {
        println!("Press Y to continue or N to cancel.");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(0) | Err(_) => break,
            Ok(_) => match answer.trim() {
                "y" | "Y" => return true,
                "n" | "N" => break,
                _ => continue,
            },
        }
    }
    println!("Job canceled by user.");
    false
}

fn download(config: &StitchConfig) {
    if config.download_root().is_none() {
        warn!("Download requested without --DownloadRoot, skipping download");
        return;
    }
    println!("Preparing to download the tiles.");
    println!("Destination: {}", config.location.display());
    if !prompt_to_continue(config) {
        return;
    }
    match Retriever::new(config).retrieve() {
        Ok(report) => {
            if report.failed.is_empty() {
                info!("{}", report);
            } else {
                warn!("{}", report);
            }
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1)
        }
    }
}

fn stitch(config: &StitchConfig) {
    let (width, height) = config.canvas_size().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1)
    });
    println!("Preparing to build the image.");
    println!("Looking in: {}", config.location.display());
    println!("Image will be {} x {}", width, height);
    if !prompt_to_continue(config) {
        return;
    }
    match Stitcher::new(config).stitch() {
        Ok(result) => {
            if result.failed.is_empty() {
                info!("{}", result);
            } else {
                warn!("{}, {} tiles failed", result, result.failed.len());
            }
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1)
        }
    }
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let app = App::new("tile_stitcher")
        .version(crate_version!())
        .about("Download map tiles and stitch them together into one image")
        .args_from_usage("-d, --Download 'Download missing tiles'
                          -u, --DownloadRoot=[URL] 'Download root URL, the tile file name is appended'
                          -z, --ZoomLevel=[LEVEL] 'Zoom level, set to 0 if not used'
                          -t, --TileSize=[PIXELS] 'Width / height of tiles in pixels'
                          -l, --Location=[DIR] 'Folder where tiles are located (Default: current directory)'
                          -p, --Pattern=[PATTERN] 'File name pattern of tiles (Default: Z_X_Y.jpg)'
                          -x, --Xmin=[NUM] 'First column of tiles, beginning with 0 (Default: 0)'
                          -X, --Xmax=[NUM] 'Last column of tiles'
                          -y, --Ymin=[NUM] 'First row of tiles, beginning with 0 (Default: 0)'
                          -Y, --Ymax=[NUM] 'Last row of tiles'
                          -o, --OutputFile=[FILE] 'JPEG output file (Default: auto-named in tile folder)'
                          -s, --StitchImage 'Stitch the tiles together into one image'
                          -f, --ForceStitch 'Do not ask for confirmation'
                          -v, --Verbose=[true|false] 'Show progress and tile messages (Default: true)'
                          -c, --config=[FILE] 'Load from custom config file'
                          --genconfig 'Print configuration template'
                          --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                          --timeout=[SECONDS] 'Download timeout per tile (Default: 30)'
                          --threads=[NUM] 'Number of parallel downloads'");

    let matches = app.get_matches_from_safe(env::args()).unwrap_or_else(|e| e.exit());

    if matches.is_present("genconfig") {
        println!("{}", StitchConfig::gen_config());
        return;
    }
    init_logger(&matches);

    let config = config_from_args(&matches).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1)
    });
    let do_download = matches.is_present("Download");
    let do_stitch = matches.is_present("StitchImage");
    if !do_download && !do_stitch {
        warn!("Nothing to do, use --Download and/or --StitchImage");
    }
    if do_download {
        download(&config);
    }
    if do_stitch {
        stitch(&config);
    }
}

#[test]
fn test_config_from_args() {
    use std::time::Duration;

    let dir = env::temp_dir();
    let app = App::new("test").args_from_usage(
        "-z, --ZoomLevel=[LEVEL] 'zoom'
         -t, --TileSize=[PIXELS] 'size'
         -l, --Location=[DIR] 'location'
         -X, --Xmax=[NUM] 'xmax'
         -Y, --Ymax=[NUM] 'ymax'
         -f, --ForceStitch 'force'
         -v, --Verbose=[true|false] 'verbose'
         --timeout=[SECONDS] 'timeout'",
    );
    let matches = app.get_matches_from(vec![
        "test",
        "-z",
        "5",
        "-t",
        "256",
        "-l",
        &dir.to_string_lossy(),
        "-X",
        "3",
        "-Y",
        "1",
        "-f",
        "-v",
        "false",
        "--timeout",
        "7",
    ]);
    let config = config_from_args(&matches).unwrap();
    assert_eq!(config.zoom, 5);
    assert_eq!(config.tile_size, 256);
    assert_eq!((config.range.xmax, config.range.ymax), (3, 1));
    assert_eq!(config.canvas_size().unwrap(), (1024, 512));
    assert_eq!(config.timeout, Duration::from_secs(7));
    assert!(config.force);
    assert!(!config.progress);

    let matches = App::new("test")
        .args_from_usage("-z, --ZoomLevel=[LEVEL] 'zoom'")
        .get_matches_from(vec!["test", "-z", "x"]);
    assert!(matches!(
        config_from_args(&matches),
        Err(StitchError::Config(_))
    ));
}
