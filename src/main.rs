//! Headless tour of the desert region map.
//! Mounts the map, replays a KDL tour script and prints what the stats
//! panel and camera show after each step.
//!
//! Usage: cargo run -- [CONFIG_RON] [TOUR_KDL]
//! Defaults: "data/map.ron", "data/tour.kdl". Initial language from
//! MAP_LANG (default "en").

use std::process::ExitCode;
use std::time::Instant;

use sahrawi_map::config::load_map_config;
use sahrawi_map::error::Result;
use sahrawi_map::map::RegionMap;
use sahrawi_map::script::{self, Step};
use sahrawi_map::surface::{Container, HeadlessBackend};

/// Polls allowed for the style to load before giving up.
const MAX_READY_POLLS: u32 = 100;

fn run(config_path: &str, script_path: &str, language: &str) -> Result<()> {
    let config = load_map_config(config_path);
    let steps = script::load_script(script_path)?;
    log::info!("loaded {} steps from {}", steps.len(), script_path);

    let container = Container::new("desert-map", 1024, 768);
    let mut map = RegionMap::mount(HeadlessBackend::new(), &container, config, language)?;

    if let Err(e) = map.pump_until_ready(MAX_READY_POLLS) {
        map.teardown();
        return Err(e);
    }

    let mut now = Instant::now();
    for (i, step) in steps.iter().enumerate() {
        script::run_step(&mut map, step, &mut now)?;
        if *step == Step::Teardown {
            println!("[{:>2}] {:?}", i + 1, step);
            continue;
        }
        let cam = map.camera(now);
        println!(
            "[{:>2}] {:?} | lang={} selected={} camera=({:.2}, {:.2}) z{:.1}",
            i + 1,
            step,
            map.language().tag(),
            map.selected().unwrap_or("-"),
            cam.center.lng,
            cam.center.lat,
            cam.zoom
        );
        for line in map.panel().lines() {
            println!("       {line}");
        }
    }
    map.teardown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("data/map.ron");
    let script_path = args.get(2).map(String::as_str).unwrap_or("data/tour.kdl");
    let language = std::env::var("MAP_LANG").unwrap_or_else(|_| "en".into());

    match run(config_path, script_path, &language) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
