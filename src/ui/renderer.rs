/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Fit the logical canvas into the terminal, keeping its aspect ratio
///   2. Build the next frame into `front` buffer (array of Cell), two canvas
///      pixels per cell using the upper half block: fg = top, bg = bottom
///   3. Place text overlays on top of the pixel cells
///   4. Compare each cell with `back` buffer (previous frame) and only emit
///      terminal commands for cells that changed
///   5. All commands are batched with `queue!`, flushed once at the end
///   6. Swap front/back

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use super::canvas::{Canvas, Rgb};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for everything outside the canvas. Using the
    /// same RGB for `Clear` and every letterbox cell avoids gap lines on
    /// VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const HALF_BLOCK: char = '▀';

    fn from_char(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }

    fn pixels(top: Rgb, bottom: Rgb) -> Self {
        Cell { ch: Self::HALF_BLOCK, fg: rgb(top), bg: rgb(bottom) }
    }
}

fn rgb([r, g, b]: Rgb) -> Color {
    Color::Rgb { r, g, b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y), one column per char, stopping at `max_x`.
    fn put_str(&mut self, x: usize, y: usize, max_x: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..max_x.min(self.width)).zip(s.chars()) {
            self.set(cx, y, Cell::from_char(ch, fg, bg));
        }
    }
}

// ── Viewport ──

/// Where the canvas lands on the terminal, in cells. Each cell row shows
/// two canvas pixel rows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Viewport {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

/// Largest aspect-preserving fit of a `canvas_w` x `canvas_h` canvas into
/// `term_w` x `term_h` cells, centered.
pub fn fit_viewport(term_w: usize, term_h: usize, canvas_w: usize, canvas_h: usize) -> Viewport {
    let term_w = term_w.max(1);
    let term_h = term_h.max(1);
    let px_h = term_h * 2;

    // scale = min(term_w / canvas_w, px_h / canvas_h), kept in integers
    let (cols, px_rows) = if term_w * canvas_h <= px_h * canvas_w {
        (term_w, term_w * canvas_h / canvas_w)
    } else {
        (px_h * canvas_w / canvas_h, px_h)
    };
    let cols = cols.clamp(1, term_w);
    let rows = px_rows.div_ceil(2).clamp(1, term_h);

    Viewport {
        col: (term_w - cols) / 2,
        row: (term_h - rows) / 2,
        cols,
        rows,
    }
}

// ── Renderer ──

const HELP: &str = " ←/→ A/D: move   Esc/Q: quit ";
const HELP_FG: Color = Color::DarkGrey;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(65536, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held-key tracking exact where supported
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        log::debug!(
            "Terminal {}x{}, keyboard enhancement: {}",
            self.term_w, self.term_h, self.keyboard_enhanced
        );
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Whether the terminal reports key release events.
    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        compose_frame(&mut self.front, canvas);

        self.flush_diff()?;

        // Swap: current front becomes next back
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

        // Set explicit base colors at start of frame. ResetColor would fall
        // back to the terminal's own default, which may differ from BASE_BG.
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
}

// ── Compose: build front buffer content ──

/// Lay out the canvas inside the buffer. The bottom row is kept for the
/// help line when there is room for it.
fn compose_frame(buf: &mut FrameBuffer, canvas: &Canvas) {
    let reserved = if buf.height > 2 { 1 } else { 0 };
    let vp = fit_viewport(buf.width, buf.height - reserved, canvas.width, canvas.height);

    compose_pixels(buf, canvas, vp);
    compose_texts(buf, canvas, vp);

    if reserved == 1 {
        let help_x = buf.width.saturating_sub(HELP.chars().count()) / 2;
        let help_y = buf.height - 1;
        buf.put_str(help_x, help_y, buf.width, HELP, HELP_FG, Cell::BASE_BG);
    }
}

fn compose_pixels(buf: &mut FrameBuffer, canvas: &Canvas, vp: Viewport) {
    let px_rows = vp.rows * 2;
    for r in 0..vp.rows {
        let top_y = (2 * r) * canvas.height / px_rows;
        let bottom_y = (2 * r + 1) * canvas.height / px_rows;
        for c in 0..vp.cols {
            let sx = c * canvas.width / vp.cols;
            let cell = Cell::pixels(canvas.get(sx, top_y), canvas.get(sx, bottom_y));
            buf.set(vp.col + c, vp.row + r, cell);
        }
    }
}

/// Text keeps its canvas anchor but is drawn at terminal resolution, over
/// the colour of the pixel underneath.
fn compose_texts(buf: &mut FrameBuffer, canvas: &Canvas, vp: Viewport) {
    for text in canvas.texts() {
        if text.x < 0 || text.y < 0 { continue; }
        let (x, y) = (text.x as usize, text.y as usize);
        if x >= canvas.width || y >= canvas.height { continue; }

        let col = vp.col + x * vp.cols / canvas.width;
        let row = vp.row + y * vp.rows / canvas.height;
        let max_col = vp.col + vp.cols;
        for (cx, ch) in (col..max_col).zip(text.text.chars()) {
            let under = buf.get(cx, row);
            buf.set(cx, row, Cell::from_char(ch, rgb(text.color), under.bg));
        }
    }
}
