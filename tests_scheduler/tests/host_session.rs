//! Host Session Tests
//!
//! Drives the REPL host with scripted input and the Life game.

use idle_scheduler::{Launcher, SchedulerState, Steppable};
use life_game::{LifeConfig, LifeGame};
use repl_host::{Console, HostConfig, InputScript, ReplHost};
use tick_source::SimTickSource;

fn host(life: LifeConfig) -> ReplHost<SimTickSource> {
    let config = HostConfig {
        idle_backoff_ms: 0,
        echo: false,
        ..HostConfig::default()
    };
    let launcher: Launcher =
        Box::new(move || Ok(Box::new(LifeGame::new(life.clone())?) as Box<dyn Steppable>));
    ReplHost::new(config, launcher, SimTickSource::new(), Console::captured())
}

#[test]
fn test_demo_session() {
    let mut host = host(LifeConfig::default());
    let mut script = InputScript::from_text(include_str!("../../demos/life.script"))
        .expect("demo script should parse");

    host.run(&mut script).expect("session should complete");

    let lines = host.console().lines();
    assert!(lines.contains(&"Game started (REPL mode)...".to_string()));
    assert!(lines.contains(&"Game already running.".to_string()));
    assert!(lines.contains(&"Game stopped.".to_string()));
    assert!(lines.contains(&"Game is not running.".to_string()));
    assert!(lines.iter().any(|line| line.starts_with("generation 20 |")));
    assert_eq!(host.scheduler().state(), SchedulerState::Stopped);
}

#[test]
fn test_game_runs_only_on_idle_polls() {
    let mut host = host(LifeConfig::default());
    let mut script = InputScript::new();
    script.push_line("start");
    script.push_line("status");
    script.push_idle(7);
    script.push_line("status");

    host.run(&mut script).expect("session should complete");

    let lines = host.console().lines();
    assert!(lines[1].ends_with(", 0 frames)."));
    assert!(lines[2].ends_with(", 7 frames)."));
    assert_eq!(host.host_idle_count(), 7);
}

#[test]
fn test_game_ends_at_generation_limit() {
    let mut host = host(LifeConfig {
        max_generations: 4,
        ..LifeConfig::default()
    });
    let mut script = InputScript::new();
    script.push_line("start");
    script.push_idle(10);
    script.push_line("status");

    host.run(&mut script).expect("session should complete");

    let lines = host.console().lines();
    assert_eq!(
        lines,
        vec![
            "Game started (REPL mode)...",
            "Game ended on its own.",
            "Game not running.",
        ]
    );
    assert_eq!(host.scheduler().scheduler().frames(), 4);
    assert_eq!(host.host_idle_count(), 10);
}
