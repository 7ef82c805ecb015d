//! Headless host for the Ecosim world: drives ticks from a real-time frame
//! clock and takes play/pause/speed commands on stdin.

mod controller;
mod telemetry;

use anyhow::{Context, Result};
use controller::{Command, SimulationController};
use ecosim_core::{AppConfig, RunnerConfig};
use ecosim_world::World;
use std::io::BufRead;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => AppConfig::default(),
    };

    telemetry::init_telemetry(&config.runner.log_filter)?;

    info!(
        width = config.sim.world.width,
        height = config.sim.world.height,
        frame_rate_hz = config.runner.frame_rate_hz,
        speed = config.runner.speed,
        "Starting Ecosim"
    );

    let mut world = World::new(config.sim.clone())?;
    let mut controller =
        SimulationController::new(config.runner.speed, !config.runner.start_paused)?;

    run_loop(&mut world, &mut controller, &config.runner).await?;

    let stats = world.stats();
    info!(
        event = "run_summary",
        ticks = stats.tick,
        sim_time = stats.sim_time,
        creatures = stats.creatures,
        foods = stats.foods,
        peak_population = stats.peak_population,
        total_births = stats.total_births,
        total_deaths = stats.total_deaths,
        total_food_eaten = stats.total_food_eaten,
        "Simulation finished"
    );

    Ok(())
}

async fn run_loop(
    world: &mut World,
    controller: &mut SimulationController,
    runner: &RunnerConfig,
) -> Result<()> {
    let frame = Duration::from_secs_f64(1.0 / f64::from(runner.frame_rate_hz));
    let mut ticker = interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_frame = Instant::now();

    let mut commands = spawn_command_reader();
    let mut stdin_open = true;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            line = commands.recv(), if stdin_open => {
                match line {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if !handle_command(&line, world, controller, runner).await? {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }

            _ = ticker.tick() => {
                let now = Instant::now();
                let frame_dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                let Some(dt) = controller.scaled_dt(frame_dt) else {
                    continue;
                };
                world.update(dt);

                let tick = world.stats().tick;
                let every = runner.snapshot_interval_ticks;
                if every > 0 && tick % every == 0 {
                    write_snapshot(world, runner).await?;
                }
                if runner.max_ticks.is_some_and(|max| tick >= max) {
                    info!(tick, "Reached tick limit");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown.
fn spawn_command_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Stopped reading commands: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Apply one stdin command. Returns false when the loop should stop.
async fn handle_command(
    line: &str,
    world: &mut World,
    controller: &mut SimulationController,
    runner: &RunnerConfig,
) -> Result<bool> {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            warn!("{}", e);
            return Ok(true);
        }
    };

    match command {
        Command::TogglePause => controller.toggle_pause(),
        Command::Pause => controller.set_paused(true),
        Command::Resume => controller.set_paused(false),
        Command::Speed(multiplier) => {
            if let Err(e) = controller.set_speed(multiplier) {
                warn!("{}", e);
            }
        }
        Command::FoodInterval(seconds) => {
            if let Err(e) = world.set_food_spawn_interval(seconds) {
                warn!("{}", e);
            }
        }
        Command::Snapshot => write_snapshot(world, runner).await?,
        Command::Quit => return Ok(false),
    }

    info!(
        running = controller.is_running(),
        speed = controller.speed(),
        food_interval = world.config().food.spawn_interval,
        "Controls updated"
    );
    Ok(true)
}

async fn write_snapshot(world: &World, runner: &RunnerConfig) -> Result<()> {
    let Some(path) = runner.snapshot_path.as_deref() else {
        warn!("Snapshot requested but no snapshot_path is configured");
        return Ok(());
    };

    let json = world.snapshot().to_json()?;
    if let Err(e) = tokio::fs::write(path, json).await {
        error!("Failed to write snapshot to {}: {}", path, e);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
