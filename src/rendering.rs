use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, ResetColor, SetForegroundColor},
};

use crate::constants::{CELL_HEIGHT, CELL_WIDTH};
use crate::types::Vector2D;

/// How a closed shape is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Brush {
    Fill,
    Stroke,
}

/// Drawing surface the entities paint themselves onto. Coordinates are in
/// world units; implementations decide how those map to their pixels.
pub trait Renderer {
    fn clear_frame(&mut self);
    fn draw_polygon(&mut self, points: &[Vector2D], color: Color);
    fn draw_circle(&mut self, center: Vector2D, radius: f64, brush: Brush, color: Color);
    fn draw_text(&mut self, text: &str, position: Vector2D, color: Color);
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    cursor_x: u16,
    cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.cursor_y < self.height && self.cursor_x < self.width {
                self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
            }
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(' ');
        }
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn print_to_log(&self, frame: u64) {
        info!("--- Screen Buffer (frame {}) ---", frame);
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    /// Terminal-only commands (colours, cursor visibility); a screen buffer has
    /// nothing to apply them to.
    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                sb.write_str(&String::from_utf8_lossy(buf));
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', color: Color::Reset };
}

// --- GameGrid: rasterises world-space primitives into terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![Cell::BLANK; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_char(&mut self, x: i32, y: i32, ch: char, color: Color) {
        if x >= 0 && y >= 0 && y < self.height as i32 && x < self.width as i32 {
            self.grid[y as usize][x as usize] = Cell { ch, color };
        }
    }

    fn to_cell_space(point: Vector2D) -> (f64, f64) {
        (point.x / CELL_WIDTH, point.y / CELL_HEIGHT)
    }

    fn plot(&mut self, cx: f64, cy: f64, ch: char, color: Color) {
        self.set_char(cx.floor() as i32, cy.floor() as i32, ch, color);
    }

    fn stroke_char(dx: f64, dy: f64) -> char {
        if dy.abs() < dx.abs() * 0.5 {
            '-'
        } else if dx.abs() < dy.abs() * 0.5 {
            '|'
        } else if dx * dy > 0.0 {
            '\\'
        } else {
            '/'
        }
    }

    fn draw_line(&mut self, from: Vector2D, to: Vector2D, color: Color) {
        let (x0, y0) = Self::to_cell_space(from);
        let (x1, y1) = Self::to_cell_space(to);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let ch = Self::stroke_char(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.plot(x0 + dx * t, y0 + dy * t, ch, color);
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            let row = &self.grid[y as usize];
            let mut start = 0;
            while start < row.len() {
                let color = row[start].color;
                let end = row[start..]
                    .iter()
                    .position(|cell| cell.color != color)
                    .map_or(row.len(), |offset| start + offset);
                stdout.execute_other_command(SetForegroundColor(color))?;
                write!(stdout, "{}", row[start..end].iter().map(|cell| cell.ch).collect::<String>())?;
                start = end;
            }
        }
        stdout.execute_other_command(ResetColor)?;
        Ok(())
    }

    pub fn clear_screen_manual(stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        for y in 0..terminal_height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

impl Renderer for GameGrid {
    fn clear_frame(&mut self) {
        for row in &mut self.grid {
            row.fill(Cell::BLANK);
        }
    }

    fn draw_polygon(&mut self, points: &[Vector2D], color: Color) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.draw_line(from, to, color);
        }
    }

    fn draw_circle(&mut self, center: Vector2D, radius: f64, brush: Brush, color: Color) {
        let (cx, cy) = Self::to_cell_space(center);
        let (rx, ry) = (radius / CELL_WIDTH, radius / CELL_HEIGHT);
        match brush {
            Brush::Fill => {
                for y in (cy - ry).floor() as i32..=(cy + ry).floor() as i32 {
                    for x in (cx - rx).floor() as i32..=(cx + rx).floor() as i32 {
                        let nx = (x as f64 + 0.5 - cx) / rx;
                        let ny = (y as f64 + 0.5 - cy) / ry;
                        if nx * nx + ny * ny <= 1.0 {
                            self.set_char(x, y, '*', color);
                        }
                    }
                }
                // Anything smaller than a cell still shows up
                self.plot(cx, cy, '*', color);
            }
            Brush::Stroke => {
                let steps = ((rx.max(ry) * 8.0).ceil() as usize).max(8);
                for i in 0..steps {
                    let angle = std::f64::consts::TAU * i as f64 / steps as f64;
                    self.plot(cx + angle.cos() * rx, cy + angle.sin() * ry, 'o', color);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, position: Vector2D, color: Color) {
        let (cx, cy) = Self::to_cell_space(position);
        let (x, y) = (cx.floor() as i32, cy.floor() as i32);
        for (i, ch) in text.chars().enumerate() {
            self.set_char(x + i as i32, y, ch, color);
        }
    }
}

impl ScreenBuffer {
    /// Copies a rendered grid verbatim, colours dropped.
    pub fn blit(&mut self, game_grid: &GameGrid) {
        self.clear();
        for (y, row) in game_grid.grid.iter().enumerate().take(self.height as usize) {
            for (x, cell) in row.iter().enumerate().take(self.width as usize) {
                self.buffer[y][x] = cell.ch;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl GameGrid {
        fn char_at(&self, x: u16, y: u16) -> Option<char> {
            self.grid.get(y as usize).and_then(|row| row.get(x as usize)).map(|cell| cell.ch)
        }

        fn row_text(&self, y: u16) -> String {
            self.grid
                .get(y as usize)
                .map(|row| row.iter().map(|cell| cell.ch).collect())
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_far_off_grid_coordinates_are_clipped() {
        let mut grid = GameGrid::new(20, 4);
        grid.set_char(65_536, 1, '#', Color::White);
        grid.set_char(1, 65_537, '#', Color::White);
        grid.set_char(-1, 0, '#', Color::White);
        assert!((0..4).all(|y| !grid.row_text(y).contains('#')));
    }

    #[test]
    fn test_draw_text_lands_in_cells() {
        let mut grid = GameGrid::new(20, 4);
        grid.draw_text("Health: 3", Vector2D::new(2.0 * CELL_WIDTH, CELL_HEIGHT), Color::White);
        assert_eq!(grid.row_text(1).trim_end(), "  Health: 3");
    }

    #[test]
    fn test_text_is_clipped_at_edges() {
        let mut grid = GameGrid::new(5, 1);
        grid.draw_text("overflowing", Vector2D::new(-2.0 * CELL_WIDTH, 0.0), Color::White);
        assert_eq!(grid.row_text(0), "erflo");
    }

    #[test]
    fn test_small_filled_circle_marks_its_cell() {
        let mut grid = GameGrid::new(10, 10);
        let center = Vector2D::new(3.5 * CELL_WIDTH, 4.5 * CELL_HEIGHT);
        grid.draw_circle(center, 1.0, Brush::Fill, Color::White);
        assert_eq!(grid.char_at(3, 4), Some('*'));
    }

    #[test]
    fn test_polygon_is_closed() {
        let mut grid = GameGrid::new(20, 10);
        let points = [
            Vector2D::new(1.5 * CELL_WIDTH, 1.5 * CELL_HEIGHT),
            Vector2D::new(10.5 * CELL_WIDTH, 1.5 * CELL_HEIGHT),
            Vector2D::new(10.5 * CELL_WIDTH, 6.5 * CELL_HEIGHT),
        ];
        grid.draw_polygon(&points, Color::White);
        assert_eq!(grid.char_at(5, 1), Some('-'));
        assert_eq!(grid.char_at(10, 4), Some('|'));
        // Closing edge back to the first vertex
        assert_ne!(grid.char_at(1, 1), Some(' '));
    }

    #[test]
    fn test_clear_frame_blanks_grid() {
        let mut grid = GameGrid::new(4, 2);
        grid.draw_text("abcd", Vector2D::ZERO, Color::White);
        grid.clear_frame();
        assert_eq!(grid.row_text(0), "    ");
    }

    #[test]
    fn test_blit_copies_characters() {
        let mut grid = GameGrid::new(6, 2);
        grid.draw_text("ship", Vector2D::new(CELL_WIDTH, CELL_HEIGHT), Color::Red);
        let mut sb = ScreenBuffer::new(6, 2);
        sb.blit(&grid);
        assert_eq!(sb.buffer[1].iter().collect::<String>(), " ship ");
    }

    #[test]
    fn test_screen_buffer_target_ignores_terminal_commands() {
        let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(8, 1));
        target.execute_other_command(SetForegroundColor(Color::Red)).unwrap();
        target.execute_move_to(MoveTo(2, 0)).unwrap();
        write!(target, "hey").unwrap();
        match target {
            OutputTarget::ScreenBuffer(sb) => assert_eq!(sb.buffer[0].iter().collect::<String>(), "  hey   "),
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }
}
