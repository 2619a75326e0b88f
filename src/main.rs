//! Inkball headless runner
//!
//! Loads a level config, plays a fixed number of frames with no player input
//! and prints the final snapshot as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use inkball::Settings;
    use inkball::consts::FPS;
    use inkball::sim::{GameEvent, GameState, Level, TickInput, tick};

    #[derive(Parser, Debug)]
    #[command(about = "Run inkball levels headless and dump the final state", version)]
    struct Args {
        /// Level config (JSON); layout paths are relative to it
        #[arg(long, default_value = "assets/config.json")]
        config: PathBuf,
        /// RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Frames to simulate
        #[arg(long, default_value_t = 60 * FPS)]
        frames: u32,
        /// Level to start on (1-based)
        #[arg(long, default_value_t = 1)]
        level: usize,
        /// Write the snapshot here instead of stdout
        #[arg(long)]
        snapshot: Option<PathBuf>,
    }

    fn load_levels(config: &Path) -> Result<Vec<Level>> {
        let settings = Settings::load(config)?;
        let base = config.parent().unwrap_or_else(|| Path::new("."));

        let mut levels = Vec::with_capacity(settings.levels.len());
        for (i, level) in settings.levels.iter().enumerate() {
            let path = base.join(&level.layout);
            let layout = fs::read_to_string(&path)
                .with_context(|| format!("reading layout {}", path.display()))?;
            levels.push(settings.build_level(i, &layout)?);
        }
        Ok(levels)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let levels = load_levels(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?;
        if args.level == 0 || args.level > levels.len() {
            bail!("level {} out of range (1..={})", args.level, levels.len());
        }

        let seed = args.seed.unwrap_or_else(rand::random);
        log::info!("Inkball starting, seed {}", seed);

        let mut state = GameState::new(levels, seed);
        if args.level > 1 {
            state.load_level(args.level - 1);
        }
        let input = TickInput::default();
        for _ in 0..args.frames {
            tick(&mut state, &input);
            for event in &state.events {
                log::debug!("frame {}: {:?}", state.frame_counter, event);
            }
            if state.events.contains(&GameEvent::CampaignFinished) {
                break;
            }
        }

        let json = serde_json::to_string_pretty(&state.snapshot())?;
        match &args.snapshot {
            Some(path) => fs::write(path, json)
                .with_context(|| format!("writing snapshot {}", path.display()))?,
            None => println!("{}", json),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive `inkball::sim::tick` from the host page
}
