#![windows_subsystem = "windows"]

use anyhow::Result;
use env_logger::Env;
use log::info;

use quickcrop::app::{App, RunOptions};
use quickcrop::config::Config;

const USAGE: &str = "usage: quickcrop [--now] [--once]

  --now    start a capture right away, then keep listening for the hotkey
  --once   capture once and exit";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut options = RunOptions::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--now" => options.capture_now = true,
            "--once" => options.once = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => anyhow::bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }

    let config = Config::load();
    info!("Starting with hotkey {}", config.hotkey);
    App::new(config).run(options)
}
