use crate::assets::{Fallback, Sprite, load_sprite};
use crate::input::HeldKeys;
use crate::render::{Canvas, Rgb};
use crossterm::event::{KeyCode, KeyEventKind};
use std::path::Path;

pub const WORLD_WIDTH: f32 = 1200.0;
pub const WORLD_HEIGHT: f32 = 800.0;
pub const GROUND_Y: f32 = 630.0;
pub const START_X: f32 = 250.0;
const MIN_X: f32 = -100.0;
const WALK_STEP: f32 = 5.0;
const JUMP_VELOCITY: f32 = -15.0;
const GRAVITY: f32 = 0.8;
const FRAME_SWITCH_MS: u64 = 300;
const FRAME_COUNT: usize = 4;
const TRIGGER_X: (f32, f32) = (550.0, 650.0);
const TRIGGER_Y: (f32, f32) = (580.0, 680.0);
const SKY: Rgb = Rgb::new(20, 60, 40);
const GRASS: Rgb = Rgb::new(50, 150, 50);
const SOIL: Rgb = Rgb::new(70, 45, 25);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction
{
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForestSignal
{
    EnterPiano,
    Leave,
}

pub struct CharacterSprites
{
    right: Vec<Sprite>,
    left: Vec<Sprite>,
}

impl CharacterSprites
{
    pub fn load(assets_dir: &Path) -> Self
    {
        let right: Vec<Sprite> = (1..=FRAME_COUNT)
            .map(|i| {
                load_sprite(
                    &assets_dir.join("forest").join(format!("maya_{i}.txt")),
                    Rgb::new(255, 220, 200),
                    Fallback {
                        width: 5,
                        height: 4,
                        color: Rgb::new(200, 100, 100),
                        label: "M",
                    },
                )
            })
            .collect();
        let left = right.iter().map(Sprite::mirrored).collect();
        Self { right, left }
    }

    fn frame(&self, facing: Direction, index: usize) -> &Sprite
    {
        let frames = match facing {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        };
        &frames[index % frames.len()]
    }
}

pub struct Forest
{
    x: f32,
    y: f32,
    y_velocity: f32,
    jumping: bool,
    frame: usize,
    last_switch: u64,
    facing: Direction,
    show_prompt: bool,
    held: HeldKeys<Direction>,
}

impl Forest
{
    pub fn new() -> Self
    {
        Self {
            x: START_X,
            y: GROUND_Y,
            y_velocity: 0.0,
            jumping: false,
            frame: 0,
            last_switch: 0,
            facing: Direction::Right,
            show_prompt: false,
            held: HeldKeys::new(),
        }
    }

    pub fn reset_position(&mut self)
    {
        self.x = START_X;
        self.y = GROUND_Y;
        self.y_velocity = 0.0;
        self.jumping = false;
        self.show_prompt = false;
        self.held.clear();
    }

    pub fn handle_key(&mut self, code: KeyCode, kind: KeyEventKind, now: u64) -> Option<ForestSignal>
    {
        if let Some(direction) = direction_for(code) {
            self.held.apply(direction, kind, now);
            return None;
        }
        if kind != KeyEventKind::Press {
            return None;
        }
        match code {
            KeyCode::Char(' ') => {
                self.jump();
                None
            }
            KeyCode::Char('x') | KeyCode::Char('X') if self.show_prompt => {
                self.held.clear();
                Some(ForestSignal::EnterPiano)
            }
            KeyCode::Esc => Some(ForestSignal::Leave),
            _ => None,
        }
    }

    pub fn jump(&mut self)
    {
        if !self.jumping {
            self.jumping = true;
            self.y_velocity = JUMP_VELOCITY;
        }
    }

    pub fn tick(&mut self, now: u64)
    {
        let left = self.held.is_held(Direction::Left, now);
        let right = self.held.is_held(Direction::Right, now);
        if left {
            self.x = (self.x - WALK_STEP).max(MIN_X);
            self.facing = Direction::Left;
        } else if right {
            self.x = (self.x + WALK_STEP).min(WORLD_WIDTH);
            self.facing = Direction::Right;
        }

        if (left || right) && now.saturating_sub(self.last_switch) > FRAME_SWITCH_MS {
            self.frame = (self.frame + 1) % FRAME_COUNT;
            self.last_switch = now;
        }

        if self.jumping {
            self.y += self.y_velocity;
            self.y_velocity += GRAVITY;
            if self.y >= GROUND_Y {
                self.y = GROUND_Y;
                self.y_velocity = 0.0;
                self.jumping = false;
            }
        }

        self.show_prompt = in_trigger_zone(self.x, self.y);
    }

    pub fn position(&self) -> (f32, f32)
    {
        (self.x, self.y)
    }

    pub fn is_jumping(&self) -> bool
    {
        self.jumping
    }

    pub fn facing(&self) -> Direction
    {
        self.facing
    }

    pub fn frame(&self) -> usize
    {
        self.frame
    }

    pub fn show_prompt(&self) -> bool
    {
        self.show_prompt
    }

    pub fn draw(&self, canvas: &mut Canvas, sprites: &CharacterSprites, stage: u32)
    {
        draw_backdrop(canvas);

        let sprite = sprites.frame(self.facing, self.frame);
        let col = project(self.x, WORLD_WIDTH, canvas.width());
        let row = project(self.y, WORLD_HEIGHT, canvas.height());
        canvas.draw_sprite(sprite, col, row - sprite.height() as i32 + 3);

        if self.show_prompt {
            canvas.put_centered(
                canvas.height() as i32 - 1,
                "Press X for piano challenge",
                Rgb::WHITE,
            );
        }
        if stage > 1 {
            canvas.put_str(2, 1, &format!("Stage {stage}"), Rgb::WHITE);
        }
    }
}

fn direction_for(code: KeyCode) -> Option<Direction>
{
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

pub fn in_trigger_zone(x: f32, y: f32) -> bool
{
    (TRIGGER_X.0..=TRIGGER_X.1).contains(&x) && (TRIGGER_Y.0..=TRIGGER_Y.1).contains(&y)
}

fn project(value: f32, world: f32, cells: usize) -> i32
{
    ((value / world) * cells as f32).floor() as i32
}

fn draw_backdrop(canvas: &mut Canvas)
{
    let width = canvas.width();
    let height = canvas.height();
    canvas.fill(SKY);

    let ground = project(GROUND_Y, WORLD_HEIGHT, height) + 3;
    canvas.fill_rect(0, ground, width, 1, GRASS);
    canvas.fill_rect(0, ground + 1, width, height, SOIL);

    for tree_x in [80.0, 420.0, 900.0, 1100.0] {
        let col = project(tree_x, WORLD_WIDTH, width);
        let top = ground - 6;
        canvas.put_str(col - 1, top, "/\\", GRASS);
        canvas.put_str(col - 2, top + 1, "/  \\", GRASS);
        canvas.put_str(col - 3, top + 2, "/    \\", GRASS);
        canvas.put_str(col - 1, top + 3, "||", SOIL.blend(Rgb::WHITE, 60));
        canvas.put_str(col - 1, top + 4, "||", SOIL.blend(Rgb::WHITE, 60));
        canvas.put_str(col - 1, top + 5, "||", SOIL.blend(Rgb::WHITE, 60));
    }

    let piano_col = project((TRIGGER_X.0 + TRIGGER_X.1) / 2.0, WORLD_WIDTH, width);
    canvas.put_str(piano_col, ground - 2, "[###]", Rgb::new(235, 235, 225));
    canvas.put_str(piano_col, ground - 1, " | | ", Rgb::new(235, 235, 225));
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn walk(forest: &mut Forest, code: KeyCode, ticks: u64, start: u64) -> u64
    {
        let mut now = start;
        for _ in 0..ticks {
            forest.handle_key(code, KeyEventKind::Repeat, now);
            forest.tick(now);
            now += 16;
        }
        now
    }

    #[test]
    fn walking_moves_and_clamps()
    {
        let mut forest = Forest::new();
        walk(&mut forest, KeyCode::Right, 10, 0);
        assert_eq!(forest.position().0, START_X + 50.0);
        assert_eq!(forest.facing(), Direction::Right);

        walk(&mut forest, KeyCode::Char('a'), 200, 1_000);
        assert_eq!(forest.position().0, MIN_X);
        assert_eq!(forest.facing(), Direction::Left);

        walk(&mut forest, KeyCode::Right, 400, 10_000);
        assert_eq!(forest.position().0, WORLD_WIDTH);
    }

    #[test]
    fn idle_character_stays_put()
    {
        let mut forest = Forest::new();
        forest.tick(5_000);
        assert_eq!(forest.position(), (START_X, GROUND_Y));
        assert_eq!(forest.frame(), 0);
    }

    #[test]
    fn animation_advances_while_walking()
    {
        let mut forest = Forest::new();
        walk(&mut forest, KeyCode::Right, 40, 1_000);
        assert!(forest.frame() > 0);
        assert!(forest.frame() < FRAME_COUNT);
    }

    #[test]
    fn jump_rises_and_lands_on_the_ground()
    {
        let mut forest = Forest::new();
        forest.handle_key(KeyCode::Char(' '), KeyEventKind::Press, 0);
        assert!(forest.is_jumping());
        forest.tick(0);
        assert!(forest.position().1 < GROUND_Y);

        let mut now = 0;
        while forest.is_jumping() {
            now += 16;
            forest.tick(now);
            assert!(now < 10_000, "jump never landed");
        }
        assert_eq!(forest.position().1, GROUND_Y);
    }

    #[test]
    fn no_double_jump()
    {
        let mut forest = Forest::new();
        forest.jump();
        forest.tick(0);
        forest.tick(16);
        let (_, y) = forest.position();
        forest.jump();
        forest.tick(32);
        assert!(forest.position().1 > y - 15.0);
    }

    #[test]
    fn trigger_zone_bounds()
    {
        assert!(in_trigger_zone(550.0, 630.0));
        assert!(in_trigger_zone(650.0, 680.0));
        assert!(!in_trigger_zone(549.0, 630.0));
        assert!(!in_trigger_zone(600.0, 560.0));
    }

    #[test]
    fn piano_opens_only_inside_the_zone()
    {
        let mut forest = Forest::new();
        forest.tick(0);
        assert_eq!(forest.handle_key(KeyCode::Char('x'), KeyEventKind::Press, 0), None);

        walk(&mut forest, KeyCode::Right, 70, 100);
        assert!(forest.show_prompt());
        assert_eq!(
            forest.handle_key(KeyCode::Char('x'), KeyEventKind::Press, 2_000),
            Some(ForestSignal::EnterPiano)
        );
    }

    #[test]
    fn reset_returns_to_start()
    {
        let mut forest = Forest::new();
        walk(&mut forest, KeyCode::Right, 20, 0);
        forest.jump();
        forest.reset_position();
        assert_eq!(forest.position(), (START_X, GROUND_Y));
        assert!(!forest.is_jumping());
    }

    #[test]
    fn prompt_is_drawn_in_the_zone()
    {
        let mut forest = Forest::new();
        walk(&mut forest, KeyCode::Right, 70, 0);
        let sprites = CharacterSprites::load(Path::new("/no/such/assets"));
        let mut canvas = Canvas::new(60, 20);
        forest.draw(&mut canvas, &sprites, 1);
        assert!(canvas.row_text(19).contains("Press X for piano challenge"));
    }
}
