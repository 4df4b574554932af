/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::grid::Grid;
use domain::tile::PlaceKind;
use domain::transform::CellTransform;
use sim::event::GameEvent;
use sim::level::{load_levels, LevelDef};
use sim::step::{self, FrameInput, PlaceAt};
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: could not open log file: {e}");
    }

    let levels = load_levels(&config);
    let Some(first) = levels.first() else {
        eprintln!("No playable levels found.");
        return;
    };

    let mut world = match WorldState::new(first.clone(), 0, levels.len(), config.speed.clone()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Could not start level '{}': {e}", first.name);
            return;
        }
    };

    let mut renderer = Renderer::new(config.display.cell_width);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &levels, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Riverwalk!");
    println!("Levels cleared: {}/{}", levels_cleared(&world), world.total_levels);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    levels: &[LevelDef],
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let dt = tick_rate.as_secs_f32();

    // Input gathered on frames between two ticks.
    let mut pending = FrameInput::default();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        handle_meta(world, &kb, levels)?;

        if world.phase == Phase::Playing {
            pending.merge(decode_input(&kb, &renderer.transform(), &world.grid));
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world, std::mem::take(&mut pending), dt);
            log_events(&events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn levels_cleared(world: &WorldState) -> usize {
    match world.phase {
        Phase::Cleared => world.current_level + 1,
        Phase::Complete => world.total_levels,
        _ => world.current_level,
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_BRIDGE: &[KeyCode] = &[KeyCode::Char('1'), KeyCode::Char('b'), KeyCode::Char('B')];
const KEYS_CRATE: &[KeyCode] = &[KeyCode::Char('2'), KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_PLACE: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RETRY: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Turn this frame's keys and clicks into simulation input.
fn decode_input(kb: &InputState, transform: &CellTransform, grid: &Grid) -> FrameInput {
    let mut input = FrameInput::default();

    if kb.any_pressed(KEYS_BRIDGE) {
        input.select = Some(PlaceKind::Bridge);
    } else if kb.any_pressed(KEYS_CRATE) {
        input.select = Some(PlaceKind::Crate);
    }
    input.cancel = kb.was_pressed(KeyCode::Esc);

    let dx = kb.any_pressed(KEYS_RIGHT) as i32 - kb.any_pressed(KEYS_LEFT) as i32;
    let dy = kb.any_pressed(KEYS_DOWN) as i32 - kb.any_pressed(KEYS_UP) as i32;
    if dx != 0 || dy != 0 {
        input.cursor = Some((dx, dy));
    }

    if kb.any_pressed(KEYS_PLACE) {
        input.place = Some(PlaceAt::Cursor);
    }

    // A click inside the map places there; anywhere else drops the selection.
    if let Some((col, row)) = kb.last_click() {
        let cell = transform.world_to_cell(col as i32, row as i32);
        if grid.in_bounds(cell.x, cell.y) {
            input.place = Some(PlaceAt::Cell(cell));
        } else {
            input.cancel = true;
        }
    }

    input
}

/// Retry / next-level handling, outside the tick.
fn handle_meta(world: &mut WorldState, kb: &InputState, levels: &[LevelDef]) -> Result<(), Box<dyn std::error::Error>> {
    match world.phase {
        Phase::Playing | Phase::GameOver => {
            if kb.any_pressed(KEYS_RETRY) {
                world.restart()?;
                world.set_message("Level restarted", 30);
            }
        }
        Phase::Cleared => {
            if kb.any_pressed(KEYS_NEXT) {
                let next = world.current_level + 1;
                match levels.get(next) {
                    Some(level) => {
                        *world = WorldState::new(level.clone(), next, levels.len(), world.speed.clone())?;
                    }
                    None => {
                        log::info!("all {} levels cleared", levels.len());
                        world.phase = Phase::Complete;
                    }
                }
            } else if kb.any_pressed(KEYS_RETRY) {
                world.restart()?;
            }
        }
        Phase::Complete => {}
    }
    Ok(())
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match *event {
            GameEvent::BlockPlaced { kind, x, y } => log::info!("{} placed at ({x}, {y})", kind.label()),
            GameEvent::PlacementRejected { kind, x, y } => log::debug!("{} rejected at ({x}, {y})", kind.label()),
            GameEvent::Rerouted { len } => log::debug!("new route: {len} cells"),
            GameEvent::Stepped { x, y } => log::trace!("walker settled on ({x}, {y})"),
            GameEvent::Drowned { x, y } => log::info!("walker drowned at ({x}, {y})"),
            GameEvent::CaughtByEnemy { x, y } => log::info!("walker caught at ({x}, {y})"),
            GameEvent::NoRoute => log::info!("goal unreachable"),
            GameEvent::GoalReached => log::info!("goal reached"),
        }
    }
}
