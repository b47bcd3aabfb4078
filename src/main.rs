//! Void Swarm entry point
//!
//! Headless demo driver: runs the full sim loop (entities, weapons, director)
//! at a fixed 60 Hz step with scripted input, auto-resolves level-up menus,
//! and records the finished run on the leaderboard. A renderer front-end
//! would drive the same loop and consume `for_each_sprite` instead of the
//! printed summary.

use glam::Vec2;
use std::path::PathBuf;

use void_swarm::consts::MAX_DELTA_TIME;
use void_swarm::highscores::format_time;
use void_swarm::sim::{Director, EntityManager, FrameInput, WeaponManager};
use void_swarm::{HighScores, Settings};

const FRAME_DT: f32 = 1.0 / 60.0;
/// The demo stops here even if the pilot is still alive
const DEMO_DURATION_SECS: f32 = 180.0;

fn main() {
    env_logger::init();
    log::info!("Void Swarm (headless demo) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("Session seed: {seed}");

    let settings = Settings::load(&PathBuf::from("settings.json"));
    let scores_path = PathBuf::from("highscores.json");
    let mut scores = HighScores::load(&scores_path);

    let mut em = EntityManager::with_particle_capacity(seed, settings.max_particles());
    em.spawn_player();
    let mut weapons = WeaponManager::new();
    let mut director = Director::new();

    let mut frame: u64 = 0;
    while director.survival_time < DEMO_DURATION_SECS && !director.game_over {
        let dt = FRAME_DT.min(MAX_DELTA_TIME);

        em.update(&scripted_input(frame), dt);
        weapons.update(dt, &mut em);
        director.update(dt, &mut em, &mut weapons);

        // The demo pilot always grabs the first offer
        while director.awaiting_choice() {
            director.choose_upgrade(0, &mut em, &mut weapons);
        }

        frame += 1;
    }

    let (level, health) = em
        .player
        .as_ref()
        .map(|p| (p.level, p.health))
        .unwrap_or((1, 0.0));

    println!("=== Run summary ===");
    println!("Survived:  {}", format_time(director.survival_time));
    println!("Level:     {level}");
    println!("Kills:     {}", director.kills);
    println!("XP banked: {}", director.total_xp);
    println!(
        "Outcome:   {}",
        if director.game_over {
            "destroyed"
        } else if health > 0.0 {
            "demo time limit reached"
        } else {
            "unknown"
        }
    );
    println!("Loadout:");
    for weapon in &weapons.weapons {
        println!("  {}", weapon.description());
    }

    if let Some(rank) = scores.add_run(director.survival_time, level, director.kills) {
        println!("New high score! Rank #{rank}");
    }
    scores.save(&scores_path);

    if !scores.is_empty() {
        println!("=== Leaderboard ===");
        for (i, entry) in scores.entries.iter().enumerate() {
            println!(
                "{:2}. {}  Lv.{:<2}  {} kills",
                i + 1,
                format_time(entry.survival_time),
                entry.level,
                entry.kills
            );
        }
    }
}

/// Stand-in for real input: a slow circling intent that keeps the pilot
/// moving through the swarm
fn scripted_input(frame: u64) -> FrameInput {
    let t = frame as f32 / 60.0;
    FrameInput {
        move_dir: Vec2::new((t * 0.7).cos(), (t * 0.7).sin()),
    }
}
