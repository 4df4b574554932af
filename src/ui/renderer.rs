/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Map cells go through a `CellTransform`: each map cell is `cell_width`
/// terminal columns wide and one row tall, starting at `MAP_ROW`. The same
/// transform turns mouse clicks back into map cells.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::Coord;
use crate::domain::tile::{CellType, PlaceKind};
use crate::domain::transform::CellTransform;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// cleared screen and drawn cells share one colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ROUTE_FG: Color = Color::Rgb { r: 200, g: 180, b: 80 };
const CURSOR_OK: Color = Color::Rgb { r: 40, g: 110, b: 40 };
const CURSOR_BAD: Color = Color::Rgb { r: 120, g: 30, b: 30 };
const CURSOR_IDLE: Color = Color::Rgb { r: 60, g: 60, b: 80 };

/// Two glyphs per cell (left column, remaining columns) plus colours.
fn tile_visual(cell: CellType) -> (char, char, Color, Color) {
    match cell {
        CellType::Open | CellType::Character => (' ', ' ', Color::Reset, Color::Reset),
        CellType::Wall    => ('█', '█', Color::Rgb{r:120,g:120,b:120}, Color::Rgb{r:70,g:70,b:70}),
        CellType::River   => ('~', '~', Color::Rgb{r:120,g:180,b:255}, Color::Rgb{r:20,g:50,b:120}),
        CellType::Enemy   => ('◆', '◆', Color::Rgb{r:255,g:80,b:80}, Color::Rgb{r:70,g:10,b:10}),
        CellType::Bridge  => ('═', '═', Color::Rgb{r:200,g:150,b:90}, Color::Rgb{r:20,g:50,b:120}),
        CellType::Crate   => ('[', ']', Color::Rgb{r:230,g:190,b:90}, Color::Rgb{r:100,g:65,b:30}),
        CellType::Goal    => ('▶', '◀', Color::Rgb{r:80,g:255,b:80}, Color::Rgb{r:10,g:60,b:10}),
        CellType::Invalid => (' ', ' ', Color::Reset, Color::Rgb{r:40,g:0,b:40}),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    transform: CellTransform,
}

impl Renderer {
    pub fn new(cell_width: u16) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            transform: CellTransform::new(cell_width as i32, 1).with_origin(0, MAP_ROW as i32),
        }
    }

    /// Terminal position ↔ map cell mapping used for drawing and clicks.
    pub fn transform(&self) -> CellTransform {
        self.transform
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_game(world);
        match world.phase {
            Phase::Playing => {}
            Phase::Cleared => self.compose_banner(world, &[
                "★ GOAL REACHED ★",
                "",
                "N: Next level   R: Retry   Q: Quit",
            ], Color::Rgb{r:80,g:255,b:80}),
            Phase::GameOver => self.compose_banner(world, &[
                "✕ WALKER LOST ✕",
                world.message.as_str(),
                "R: Retry   Q: Quit",
            ], Color::Rgb{r:255,g:60,b:60}),
            Phase::Complete => {
                let line = format!("All {} levels cleared!", world.total_levels);
                self.compose_banner(world, &[
                    "★ RIVERWALK COMPLETE ★",
                    line.as_str(),
                    "Q: Quit",
                ], Color::Rgb{r:255,g:220,b:50});
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        // HUD
        let selected = match w.selected {
            Some(kind) => kind.label(),
            None => "-",
        };
        let hud = format!(
            " {}  ({}/{})   Block: {:<6}  Walker: {:?} {:>3}%  Route: {} ",
            w.level.name, w.current_level + 1, w.total_levels,
            selected, w.walker.state(), (w.walker.fraction() * 100.0) as u32,
            w.walker.route().len(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Map
        for (y, row) in w.grid.rows().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                self.compose_cell(w, Coord::new(x as i32, y as i32), cell);
            }
        }
        self.compose_walker(w);

        // Message + help bars
        let below = MAP_ROW + w.grid.height();
        if !w.message.is_empty() && w.phase == Phase::Playing {
            self.front.fill_row(below + 1, MSG_BG);
            self.front.put_str(0, below + 1, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }
        let help = " 1/B:Bridge  2/C:Crate  Arrows/WASD:Cursor  Enter/Click:Place  Esc:Cancel  R:Retry  Q:Quit";
        self.front.put_str(0, below + 3, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_cell(&mut self, w: &WorldState, at: Coord, cell: CellType) {
        let (mut c0, mut c1, mut fg, mut bg) = tile_visual(cell);

        // Planned route over open ground; hazards on the route stay visible as-is.
        if cell == CellType::Open && w.phase == Phase::Playing && w.walker.route().iter().skip(1).any(|&c| c == at) {
            c0 = '·';
            c1 = ' ';
            fg = ROUTE_FG;
        }

        if at == w.cursor && w.phase == Phase::Playing {
            bg = cursor_bg(w.selected, cell);
            if cell.is_hazard() && w.selected.is_none() {
                fg = Color::White;
            }
        }

        let (wx, wy) = self.transform.cell_to_world(at.x as f32, at.y as f32);
        let (col, row) = (wx as usize, wy as usize);
        self.front.set(col, row, Cell::new(c0, fg, bg));
        for dx in 1..self.transform.cell_w as usize {
            self.front.set(col + dx, row, Cell::new(c1, fg, bg));
        }
    }

    /// The walker at its interpolated position, rounded to whole columns/rows.
    fn compose_walker(&mut self, w: &WorldState) {
        let (fx, fy) = w.walker.position();
        let (wx, wy) = self.transform.cell_to_world(fx, fy);
        let (col, row) = (wx.round() as usize, wy.round() as usize);
        let fg = if w.walker.is_failed() {
            Color::Rgb{r:255,g:60,b:60}
        } else {
            Color::Rgb{r:255,g:255,b:255}
        };
        for dx in 0..self.transform.cell_w as usize {
            let under = self.front.get(col + dx, row);
            let ch = if dx == 0 { '@' } else { ' ' };
            self.front.set(col + dx, row, Cell::new(ch, fg, under.bg));
        }
    }

    /// A boxed message centred over the map.
    fn compose_banner(&mut self, w: &WorldState, lines: &[&str], color: Color) {
        let dim = Color::Rgb{r:40,g:40,b:40};
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let map_cols = w.grid.width() * self.transform.cell_w as usize;
        let box_x = map_cols.saturating_sub(inner + 2) / 2;
        let box_y = MAP_ROW + w.grid.height().saturating_sub(lines.len() + 2) / 2;

        let horiz: String = "═".repeat(inner);
        self.front.put_str(box_x, box_y, &format!("╔{horiz}╗"), color, dim);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner - line.chars().count();
            let text = format!("║{}{}{}║", " ".repeat(pad / 2), line, " ".repeat(pad - pad / 2));
            self.front.put_str(box_x, box_y + 1 + i, &text, color, dim);
        }
        self.front.put_str(box_x, box_y + 1 + lines.len(), &format!("╚{horiz}╝"), color, dim);
    }
}

/// Cursor background: green where the selected block fits, red where it
/// does not, neutral with nothing selected.
fn cursor_bg(selected: Option<PlaceKind>, under: CellType) -> Color {
    match selected {
        Some(kind) if kind.prerequisite() == under => CURSOR_OK,
        Some(_) => CURSOR_BAD,
        None => CURSOR_IDLE,
    }
}
