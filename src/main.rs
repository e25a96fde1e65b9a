use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use rand::{rngs::StdRng, SeedableRng};
use term_2048::config::{Config, Keymap};
use term_2048::save::{self, SaveFile};
use term_2048::session::Session;

#[derive(Parser, Debug)]
#[command(name = "term-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Fixed RNG seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
    /// Save file holding best scores
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
    /// Player name recorded in the save file
    #[arg(short, long)]
    user: Option<String>,
    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed { cfg.seed = Some(seed); }
    if let Some(path) = args.save { cfg.save_path = path; }
    if let Some(user) = args.user { cfg.username = user; }
    if args.no_color { cfg.color = false; }

    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut save_file = SaveFile::load_or_default(&cfg.save_path);
    let best = save_file.best_score(&cfg.username);

    print_intro(&cfg.keys);
    let mut session = Session::new(rng, cfg.keys.clone(), best);
    let outcome = session.run(io::stdin().lock(), &mut io::stdout().lock(), cfg.color)?;
    log::info!("session finished: {outcome:?}");

    println!(
        "Final score: {} | Steps taken: {} | Largest block: {}",
        outcome.score, outcome.moves, outcome.largest_cell
    );
    if save_file.record_session(&cfg.username, outcome.score, outcome.max_merges_per_move) {
        println!("New high score for {}!", cfg.username);
    }
    save::write_to_path(&cfg.save_path, &save_file)
        .with_context(|| format!("failed to write save file {}", cfg.save_path.display()))?;
    Ok(())
}

fn print_intro(keys: &Keymap) {
    println!("Welcome to 2048!\n");
    println!("Move and merge cells that hold the same number to reach larger");
    println!("cells and a higher score.\n");
    println!(
        "Controls: {} up, {} down, {} left, {} right; {} quits. Press enter after each key.\n",
        keys.up, keys.down, keys.left, keys.right, keys.quit
    );
}
