use crate::assets::Sprite;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 50, 50);
    pub const GREEN: Rgb = Rgb::new(50, 255, 50);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const PURPLE: Rgb = Rgb::new(150, 50, 200);
    pub const DARK_BLUE: Rgb = Rgb::new(30, 30, 40);

    pub const fn new(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b }
    }

    /// Mixes `over` on top of `self`, `alpha` 0 keeps `self`, 255 gives `over`.
    pub fn blend(self, over: Rgb, alpha: u8) -> Rgb
    {
        let t = alpha as f32 / 255.0;
        Rgb {
            r: lerp(self.r as f32, over.r as f32, t) as u8,
            g: lerp(self.g as f32, over.g as f32, t) as u8,
            b: lerp(self.b as f32, over.b as f32, t) as u8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell
{
    pub ch: char,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

impl Cell
{
    const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
    };
}

/// A frame of terminal cells. Drawing outside the bounds is clipped.
pub struct Canvas
{
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas
{
    pub fn new(width: usize, height: usize) -> Self
    {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize
    {
        self.width
    }

    pub fn height(&self) -> usize
    {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell>
    {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell>
    {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get_mut(y * self.width + x)
    }

    pub fn fill(&mut self, color: Rgb)
    {
        for cell in &mut self.cells {
            *cell = Cell {
                ch: ' ',
                fg: None,
                bg: Some(color),
            };
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: usize, height: usize, color: Rgb)
    {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                if let Some(cell) = self.cell_mut(x + dx, y + dy) {
                    cell.ch = ' ';
                    cell.bg = Some(color);
                }
            }
        }
    }

    /// Blends every background toward `color`, like a translucent overlay.
    pub fn tint(&mut self, color: Rgb, alpha: u8)
    {
        for cell in &mut self.cells {
            let base = cell.bg.unwrap_or(Rgb::BLACK);
            cell.bg = Some(base.blend(color, alpha));
        }
    }

    pub fn put_str(&mut self, x: i32, y: i32, text: &str, fg: Rgb)
    {
        for (offset, ch) in text.chars().enumerate() {
            if let Some(cell) = self.cell_mut(x + offset as i32, y) {
                cell.ch = ch;
                cell.fg = Some(fg);
            }
        }
    }

    pub fn put_centered(&mut self, y: i32, text: &str, fg: Rgb)
    {
        let x = centered_x(self.width, text.chars().count());
        self.put_str(x, y, text, fg);
    }

    pub fn draw_sprite(&mut self, sprite: &Sprite, x: i32, y: i32)
    {
        match sprite {
            Sprite::Art { rows, color } => {
                for (dy, row) in rows.iter().enumerate() {
                    for (dx, ch) in row.chars().enumerate() {
                        if ch == ' ' {
                            continue;
                        }
                        if let Some(cell) = self.cell_mut(x + dx as i32, y + dy as i32) {
                            cell.ch = ch;
                            cell.fg = Some(*color);
                        }
                    }
                }
            }
            Sprite::Placeholder {
                width,
                height,
                color,
                label,
            } => {
                self.fill_rect(x, y, *width, *height, *color);
                let label_len = label.chars().count().min(*width);
                let label_x = x + centered_x(*width, label_len);
                let label_y = y + (*height as i32) / 2;
                let text: String = label.chars().take(label_len).collect();
                self.put_str(label_x, label_y, &text, Rgb::WHITE);
            }
        }
    }

    pub fn flush(&self, out: &mut impl Write) -> io::Result<()>
    {
        let lines: Vec<String> = self
            .cells
            .chunks(self.width)
            .map(render_row)
            .collect();
        let output = lines.join("\r\n");
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        out.write_all(output.as_bytes())?;
        out.flush()
    }

    #[cfg(test)]
    pub fn row_text(&self, y: usize) -> String
    {
        self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|cell| cell.ch)
            .collect()
    }
}

pub fn centered_x(total: usize, len: usize) -> i32
{
    (total as i32 - len as i32) / 2
}

fn render_row(row: &[Cell]) -> String
{
    let mut line = String::with_capacity(row.len() + 16);
    let mut active: (Option<Rgb>, Option<Rgb>) = (None, None);
    for cell in row {
        let style = (cell.fg, cell.bg);
        if style != active {
            line.push_str("\x1b[0m");
            if let Some(color) = cell.fg {
                line.push_str(&ansi_fg(color));
            }
            if let Some(color) = cell.bg {
                line.push_str(&ansi_bg(color));
            }
            active = style;
        }
        line.push(cell.ch);
    }
    if active != (None, None) {
        line.push_str("\x1b[0m");
    }
    line
}

fn ansi_fg(color: Rgb) -> String
{
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

fn ansi_bg(color: Rgb) -> String
{
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

fn lerp(a: f32, b: f32, t: f32) -> f32
{
    a + (b - a) * t
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn drawing_is_clipped_to_bounds()
    {
        let mut canvas = Canvas::new(5, 2);
        canvas.put_str(-2, 0, "abcdefgh", Rgb::WHITE);
        canvas.put_str(0, 5, "zzz", Rgb::WHITE);
        assert_eq!(canvas.row_text(0), "cdefg");
        assert_eq!(canvas.row_text(1), "     ");
    }

    #[test]
    fn art_sprites_keep_transparent_spaces()
    {
        let mut canvas = Canvas::new(4, 1);
        canvas.fill(Rgb::GREEN);
        let sprite = Sprite::Art {
            rows: vec!["o o".to_string()],
            color: Rgb::RED,
        };
        canvas.draw_sprite(&sprite, 0, 0);
        assert_eq!(canvas.row_text(0), "o o ");
        let gap = canvas.cell(1, 0).unwrap();
        assert_eq!(gap.bg, Some(Rgb::GREEN));
        assert_eq!(gap.fg, None);
    }

    #[test]
    fn placeholder_fills_and_labels()
    {
        let mut canvas = Canvas::new(8, 3);
        let sprite = Sprite::Placeholder {
            width: 8,
            height: 3,
            color: Rgb::PURPLE,
            label: "evil".to_string(),
        };
        canvas.draw_sprite(&sprite, 0, 0);
        assert_eq!(canvas.row_text(1), "  evil  ");
        assert_eq!(canvas.cell(0, 0).unwrap().bg, Some(Rgb::PURPLE));
    }

    #[test]
    fn blend_endpoints()
    {
        let base = Rgb::new(10, 20, 30);
        assert_eq!(base.blend(Rgb::WHITE, 0), base);
        assert_eq!(base.blend(Rgb::WHITE, 255), Rgb::WHITE);
    }

    #[test]
    fn rows_reset_style_between_colors()
    {
        let mut canvas = Canvas::new(2, 1);
        canvas.put_str(0, 0, "a", Rgb::RED);
        let mut out = Vec::new();
        canvas.flush(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[38;2;255;50;50ma"));
        assert!(text.ends_with("a\x1b[0m "));
    }
}
