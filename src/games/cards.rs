use crate::assets::{Fallback, Sprite, load_sprite};
use crate::config::Config;
use crate::input;
use crate::render::{Canvas, Rgb, centered_x};
use crate::runner::{Flow, Frame, Scene};
use crossterm::event::{Event, KeyCode};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::path::Path;

pub const GRID_COLS: usize = 4;
pub const GRID_ROWS: usize = 3;
pub const START_LIVES: u8 = 3;
pub const GOOD_PAIRS_TO_WIN: u8 = 3;
pub const FLIP_BACK_MS: u64 = 1000;
pub const MESSAGE_MS: u64 = 2000;
pub const FLASH_MS: u64 = 1000;
pub const EXIT_DELAY_MS: u64 = 3000;
const CARD_WIDTH: usize = 14;
const CARD_HEIGHT: usize = 7;
const CARD_GAP: usize = 2;
const BACKGROUND: Rgb = Rgb::new(15, 5, 25);
const CARD_BACK: Rgb = Rgb::new(30, 20, 40);
const GOOD_GLOW: Rgb = Rgb::new(100, 200, 100);
const BAD_GLOW: Rgb = Rgb::new(200, 100, 100);
const TRAUMA_FLASH: Rgb = Rgb::new(150, 0, 0);
const POSITIVE_FLASH: Rgb = Rgb::new(100, 200, 150);
const NEGATIVE_TEXT: Rgb = Rgb::new(255, 80, 80);
const POSITIVE_TEXT: Rgb = Rgb::new(100, 255, 150);

const NEGATIVE_MESSAGES: [&str; 8] = [
    "You are unworthy of love",
    "I hate you",
    "You are miserable",
    "You will never succeed",
    "No one cares about you",
    "Everything is your fault",
    "You're a disappointment",
    "Give up now",
];

const POSITIVE_MESSAGES: [&str; 9] = [
    "You are worthy of love",
    "You are beautiful",
    "You can achieve anything",
    "You are strong and brave",
    "People appreciate you",
    "You bring joy to others",
    "You make a difference",
    "Your future is bright",
    "You are enough",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category
{
    Good,
    Bad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairKey
{
    Flower,
    Diploma,
    Handshake,
    Evil,
    Crying,
    Death,
}

pub const PAIR_KEYS: [PairKey; 6] = [
    PairKey::Flower,
    PairKey::Diploma,
    PairKey::Handshake,
    PairKey::Evil,
    PairKey::Crying,
    PairKey::Death,
];

impl PairKey
{
    pub fn category(self) -> Category
    {
        match self {
            PairKey::Flower | PairKey::Diploma | PairKey::Handshake => Category::Good,
            PairKey::Evil | PairKey::Crying | PairKey::Death => Category::Bad,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            PairKey::Flower => "flower",
            PairKey::Diploma => "diploma",
            PairKey::Handshake => "handshake",
            PairKey::Evil => "evil",
            PairKey::Crying => "crying",
            PairKey::Death => "death",
        }
    }

    fn placeholder_color(self) -> Rgb
    {
        match self {
            PairKey::Flower => Rgb::new(100, 200, 100),
            PairKey::Diploma => Rgb::new(200, 200, 100),
            PairKey::Handshake => Rgb::new(100, 150, 200),
            PairKey::Evil => Rgb::new(200, 50, 50),
            PairKey::Crying => Rgb::new(150, 100, 200),
            PairKey::Death => Rgb::new(100, 100, 100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card
{
    pub key: PairKey,
    pub matched: bool,
    pub selected: bool,
    pub col: usize,
    pub row: usize,
}

impl Card
{
    pub fn category(&self) -> Category
    {
        self.key.category()
    }

    pub fn face_up(&self) -> bool
    {
        self.matched || self.selected
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome
{
    GoodMatch,
    BadMatch,
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood
{
    Positive,
    Negative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message
{
    pub text: &'static str,
    pub mood: Mood,
    pub shown_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending
{
    Win
    {
        exit_at: u64,
    },
    Loss,
}

/// Match engine for the memory card board.
pub struct Board
{
    cards: Vec<Card>,
    selected: Vec<usize>,
    good_matches: u8,
    bad_matches: u8,
    lives: u8,
    ending: Option<Ending>,
    locked_until: Option<u64>,
    message: Option<Message>,
    flash: Option<(Mood, u64)>,
    cursor: usize,
    rng: StdRng,
}

impl Board
{
    pub fn new(rng: StdRng) -> Self
    {
        let mut board = Self {
            cards: Vec::new(),
            selected: Vec::new(),
            good_matches: 0,
            bad_matches: 0,
            lives: START_LIVES,
            ending: None,
            locked_until: None,
            message: None,
            flash: None,
            cursor: 0,
            rng,
        };
        board.reset();
        board
    }

    pub fn reset(&mut self)
    {
        let mut keys: Vec<PairKey> = PAIR_KEYS.iter().flat_map(|&key| [key, key]).collect();
        keys.shuffle(&mut self.rng);
        self.cards = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| Card {
                key,
                matched: false,
                selected: false,
                col: i % GRID_COLS,
                row: i / GRID_COLS,
            })
            .collect();
        self.selected.clear();
        self.good_matches = 0;
        self.bad_matches = 0;
        self.lives = START_LIVES;
        self.ending = None;
        self.locked_until = None;
        self.message = None;
        self.flash = None;
        self.cursor = 0;
        log::info!("new card board dealt");
    }

    pub fn is_locked(&self) -> bool
    {
        self.locked_until.is_some()
    }

    pub fn is_over(&self) -> bool
    {
        self.ending.is_some()
    }

    /// Returns the match outcome when this selection completes a pair.
    pub fn select_card(&mut self, index: usize, now: u64) -> Option<Outcome>
    {
        if self.is_over() || self.is_locked() {
            return None;
        }
        let card = self.cards.get_mut(index)?;
        if card.matched || card.selected {
            return None;
        }
        card.selected = true;
        self.selected.push(index);
        if self.selected.len() < 2 {
            return None;
        }
        self.locked_until = Some(now + FLIP_BACK_MS);
        self.check_match(now)
    }

    fn check_match(&mut self, now: u64) -> Option<Outcome>
    {
        let &[first, second] = self.selected.as_slice() else {
            return None;
        };
        if self.cards[first].matched || self.cards[second].matched {
            return None;
        }
        if self.cards[first].key != self.cards[second].key {
            self.show_message(Mood::Negative, now);
            log::debug!("mismatch");
            return Some(Outcome::Mismatch);
        }

        self.cards[first].matched = true;
        self.cards[second].matched = true;
        let key = self.cards[first].key;
        let outcome = match key.category() {
            Category::Good => {
                self.good_matches += 1;
                self.show_message(Mood::Positive, now);
                self.flash = Some((Mood::Positive, now));
                if self.good_matches >= GOOD_PAIRS_TO_WIN {
                    log::info!("all good memories recovered");
                    self.ending = Some(Ending::Win {
                        exit_at: now + EXIT_DELAY_MS,
                    });
                }
                Outcome::GoodMatch
            }
            Category::Bad => {
                self.bad_matches += 1;
                self.lives = self.lives.saturating_sub(1);
                self.show_message(Mood::Negative, now);
                self.flash = Some((Mood::Negative, now));
                if self.lives == 0 {
                    log::info!("out of lives");
                    self.ending = Some(Ending::Loss);
                }
                Outcome::BadMatch
            }
        };
        log::info!(
            "{} matched ({:?}), lives {}",
            key.name(),
            outcome,
            self.lives
        );
        Some(outcome)
    }

    fn show_message(&mut self, mood: Mood, now: u64)
    {
        let text = match mood {
            Mood::Positive => POSITIVE_MESSAGES[self.rng.gen_range(0..POSITIVE_MESSAGES.len())],
            Mood::Negative => NEGATIVE_MESSAGES[self.rng.gen_range(0..NEGATIVE_MESSAGES.len())],
        };
        self.message = Some(Message {
            text,
            mood,
            shown_at: now,
        });
    }

    /// Runs due deadlines. Returns `Flow::Exit` once a won game has been shown long enough.
    pub fn tick(&mut self, now: u64) -> Flow
    {
        if self.locked_until.is_some_and(|until| now >= until) {
            for &index in &self.selected {
                if !self.cards[index].matched {
                    self.cards[index].selected = false;
                }
            }
            self.selected.clear();
            self.locked_until = None;
        }
        if self.message.is_some_and(|message| now >= message.shown_at + MESSAGE_MS) {
            self.message = None;
        }
        if self.flash.is_some_and(|(_, at)| now >= at + FLASH_MS) {
            self.flash = None;
        }
        match self.ending {
            Some(Ending::Win { exit_at }) if now >= exit_at => Flow::Exit,
            _ => Flow::Continue,
        }
    }

    /// A click or Enter: resets a lost game, otherwise selects `index`.
    pub fn activate(&mut self, index: Option<usize>, now: u64)
    {
        match self.ending {
            Some(Ending::Loss) => self.reset(),
            Some(Ending::Win { .. }) => {}
            None => {
                if let Some(index) = index {
                    self.select_card(index, now);
                }
            }
        }
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32)
    {
        let col = (self.cursor % GRID_COLS) as i32;
        let row = (self.cursor / GRID_COLS) as i32;
        let col = (col + dx).rem_euclid(GRID_COLS as i32) as usize;
        let row = (row + dy).rem_euclid(GRID_ROWS as i32) as usize;
        self.cursor = row * GRID_COLS + col;
    }

    pub fn cards(&self) -> &[Card]
    {
        &self.cards
    }

    pub fn lives(&self) -> u8
    {
        self.lives
    }

    pub fn good_matches(&self) -> u8
    {
        self.good_matches
    }

    pub fn bad_matches(&self) -> u8
    {
        self.bad_matches
    }

    pub fn ending(&self) -> Option<Ending>
    {
        self.ending
    }

    pub fn message(&self) -> Option<Message>
    {
        self.message
    }

    pub fn cursor(&self) -> usize
    {
        self.cursor
    }

    /// Linear fade from 255 to 0 over the message lifetime.
    pub fn message_alpha(&self, now: u64) -> u8
    {
        match self.message {
            Some(message) => fade(now.saturating_sub(message.shown_at), MESSAGE_MS, 255),
            None => 0,
        }
    }

    fn flash_alpha(&self, now: u64) -> Option<(Mood, u8)>
    {
        self.flash
            .map(|(mood, at)| (mood, fade(now.saturating_sub(at), FLASH_MS, 180)))
    }
}

fn fade(elapsed: u64, duration: u64, start: u8) -> u8
{
    if elapsed >= duration {
        return 0;
    }
    let remaining = (duration - elapsed) as f32 / duration as f32;
    (start as f32 * remaining) as u8
}

/// Where the card grid sits on a canvas of a given size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout
{
    pub left: i32,
    pub top: i32,
}

impl Layout
{
    pub fn for_canvas(width: usize, height: usize) -> Self
    {
        let grid_width = GRID_COLS * (CARD_WIDTH + CARD_GAP) - CARD_GAP;
        let grid_height = GRID_ROWS * (CARD_HEIGHT + CARD_GAP / 2) - CARD_GAP / 2;
        Self {
            left: centered_x(width, grid_width),
            top: ((height as i32 - grid_height as i32) / 2).max(3),
        }
    }

    pub fn card_origin(&self, col: usize, row: usize) -> (i32, i32)
    {
        (
            self.left + (col * (CARD_WIDTH + CARD_GAP)) as i32,
            self.top + (row * (CARD_HEIGHT + CARD_GAP / 2)) as i32,
        )
    }

    pub fn hit_test(&self, x: i32, y: i32) -> Option<usize>
    {
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let (cx, cy) = self.card_origin(col, row);
                let inside_x = x >= cx && x < cx + CARD_WIDTH as i32;
                let inside_y = y >= cy && y < cy + CARD_HEIGHT as i32;
                if inside_x && inside_y {
                    return Some(row * GRID_COLS + col);
                }
            }
        }
        None
    }
}

pub struct CardGame
{
    board: Board,
    faces: HashMap<PairKey, Sprite>,
}

impl CardGame
{
    pub fn new(config: &Config) -> Self
    {
        Self {
            board: Board::new(config.rng()),
            faces: load_faces(&config.assets_dir),
        }
    }

    fn draw_card(&self, canvas: &mut Canvas, layout: &Layout, index: usize, card: &Card, now: u64)
    {
        let (x, y) = layout.card_origin(card.col, card.row);
        if card.face_up() {
            let glow = match card.category() {
                Category::Good => GOOD_GLOW,
                Category::Bad => BAD_GLOW,
            };
            canvas.fill_rect(x, y, CARD_WIDTH, CARD_HEIGHT, BACKGROUND.blend(glow, 90));
            if let Some(face) = self.faces.get(&card.key) {
                let fx = x + centered_x(CARD_WIDTH, face.width());
                let fy = y + centered_x(CARD_HEIGHT, face.height());
                canvas.draw_sprite(face, fx, fy);
            }
        } else {
            let pulse = (((now as f32 / 1000.0) * 3.0 + index as f32).sin() * 20.0) as i32;
            let shade = (CARD_BACK.b as i32 + pulse).clamp(0, 255) as u8;
            let back = Rgb::new(CARD_BACK.r, CARD_BACK.g, shade);
            canvas.fill_rect(x, y, CARD_WIDTH, CARD_HEIGHT, back);
            canvas.put_str(x + 3, y + 2, "*   .", Rgb::new(60, 40, 80));
            canvas.put_str(x + 5, y + 4, ".  *", Rgb::new(60, 40, 80));
        }
        if index == self.board.cursor() && !self.board.is_over() {
            canvas.put_str(x, y + CARD_HEIGHT as i32, &"^".repeat(CARD_WIDTH), Rgb::YELLOW);
        }
    }

    fn draw_message(&self, canvas: &mut Canvas, layout: &Layout, now: u64)
    {
        let Some(message) = self.board.message() else {
            return;
        };
        let alpha = self.board.message_alpha(now);
        if alpha == 0 {
            return;
        }
        let color = match message.mood {
            Mood::Positive => POSITIVE_TEXT,
            Mood::Negative => NEGATIVE_TEXT,
        };
        let (dx, dy) = match message.mood {
            Mood::Positive => (0, ((now as f32 / 1000.0) * 6.0).sin().round() as i32),
            Mood::Negative if alpha > 200 => (((now / 40) % 7) as i32 - 3, 0),
            Mood::Negative => (0, 0),
        };
        let x = centered_x(canvas.width(), message.text.chars().count()) + dx;
        let y = (layout.top - 2 + dy).max(0);
        canvas.put_str(x, y, message.text, BACKGROUND.blend(color, alpha));
    }

    fn draw_ending(&self, canvas: &mut Canvas)
    {
        let Some(ending) = self.board.ending() else {
            return;
        };
        canvas.tint(Rgb::BLACK, 180);
        let middle = canvas.height() as i32 / 2;
        match ending {
            Ending::Win { .. } => {
                canvas.put_centered(middle, "Love is within you, remember that...", Rgb::new(150, 255, 150));
            }
            Ending::Loss => {
                canvas.put_centered(middle, "Hateress overtakes you, try again.", Rgb::new(255, 100, 100));
                canvas.put_centered(middle + 2, "Click to try again", Rgb::new(200, 200, 200));
            }
        }
    }
}

fn load_faces(assets_dir: &Path) -> HashMap<PairKey, Sprite>
{
    PAIR_KEYS
        .iter()
        .map(|&key| {
            let sprite = load_sprite(
                &assets_dir.join("cards").join(format!("{}.txt", key.name())),
                Rgb::WHITE,
                Fallback {
                    width: CARD_WIDTH - 2,
                    height: CARD_HEIGHT - 2,
                    color: key.placeholder_color(),
                    label: key.name(),
                },
            );
            (key, sprite)
        })
        .collect()
}

impl Scene for CardGame
{
    fn handle_event(&mut self, event: &Event, frame: &Frame) -> Flow
    {
        if let Some((col, row)) = input::left_click(event) {
            let layout = Layout::for_canvas(frame.width, frame.height);
            let index = layout.hit_test(col as i32, row as i32);
            self.board.activate(index, frame.now);
            return Flow::Continue;
        }

        match input::pressed_key(event) {
            Some(KeyCode::Esc) => return Flow::Exit,
            Some(KeyCode::Left) => self.board.move_cursor(-1, 0),
            Some(KeyCode::Right) => self.board.move_cursor(1, 0),
            Some(KeyCode::Up) => self.board.move_cursor(0, -1),
            Some(KeyCode::Down) => self.board.move_cursor(0, 1),
            Some(KeyCode::Enter) | Some(KeyCode::Char(' ')) => {
                let cursor = self.board.cursor();
                self.board.activate(Some(cursor), frame.now);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn update(&mut self, now: u64) -> Flow
    {
        let flow = self.board.tick(now);
        if flow == Flow::Exit {
            log::info!("leaving card game after win");
        }
        flow
    }

    fn draw(&self, canvas: &mut Canvas, now: u64)
    {
        canvas.fill(BACKGROUND);
        if let Some((mood, alpha)) = self.board.flash_alpha(now) {
            let color = match mood {
                Mood::Positive => POSITIVE_FLASH,
                Mood::Negative => TRAUMA_FLASH,
            };
            canvas.tint(color, alpha);
        }

        let layout = Layout::for_canvas(canvas.width(), canvas.height());
        for (index, card) in self.board.cards().iter().enumerate() {
            self.draw_card(canvas, &layout, index, card, now);
        }

        let hearts = "● ".repeat(self.board.lives() as usize);
        let hearts = hearts.trim_end();
        let x = canvas.width() as i32 - hearts.chars().count() as i32 - 2;
        canvas.put_str(x, canvas.height() as i32 - 1, hearts, Rgb::new(200, 50, 50));
        canvas.put_str(
            1,
            canvas.height() as i32 - 1,
            "Click or arrows+Enter to flip. Esc quits.",
            Rgb::new(120, 110, 140),
        );

        self.draw_message(canvas, &layout, now);
        self.draw_ending(canvas);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;

    fn board() -> Board
    {
        Board::new(StdRng::seed_from_u64(21))
    }

    fn pair_of(board: &Board, key: PairKey) -> (usize, usize)
    {
        let indices: Vec<usize> = board
            .cards()
            .iter()
            .enumerate()
            .filter(|(_, card)| card.key == key)
            .map(|(i, _)| i)
            .collect();
        (indices[0], indices[1])
    }

    fn mismatched(board: &Board) -> (usize, usize)
    {
        let first = board.cards()[0].key;
        let other = board.cards().iter().position(|card| card.key != first).unwrap();
        (0, other)
    }

    fn match_pair(board: &mut Board, key: PairKey, now: u64) -> Option<Outcome>
    {
        let (a, b) = pair_of(board, key);
        board.select_card(a, now);
        let outcome = board.select_card(b, now);
        board.tick(now + FLIP_BACK_MS);
        outcome
    }

    #[test]
    fn deck_has_six_pairs_on_a_four_by_three_grid()
    {
        let board = board();
        assert_eq!(board.cards().len(), 12);
        for key in PAIR_KEYS {
            assert_eq!(board.cards().iter().filter(|card| card.key == key).count(), 2);
        }
        let good = board
            .cards()
            .iter()
            .filter(|card| card.category() == Category::Good)
            .count();
        assert_eq!(good, 6);
        assert!(board.cards().iter().all(|card| card.col < GRID_COLS && card.row < GRID_ROWS));
        assert_eq!(board.lives(), START_LIVES);
    }

    #[test]
    fn good_match_marks_both_once()
    {
        let mut board = board();
        assert_eq!(match_pair(&mut board, PairKey::Flower, 0), Some(Outcome::GoodMatch));
        let (a, b) = pair_of(&board, PairKey::Flower);
        assert!(board.cards()[a].matched && board.cards()[b].matched);
        assert_eq!(board.good_matches(), 1);

        assert_eq!(board.select_card(a, 5_000), None);
        assert_eq!(board.select_card(b, 5_000), None);
        assert_eq!(board.good_matches(), 1);
        assert_eq!(board.message().map(|m| m.mood), Some(Mood::Positive));
    }

    #[test]
    fn reselecting_a_selected_card_is_a_no_op()
    {
        let mut board = board();
        assert_eq!(board.select_card(4, 0), None);
        assert_eq!(board.select_card(4, 0), None);
        assert!(!board.is_locked());
        assert_eq!(board.cards().iter().filter(|card| card.selected).count(), 1);
    }

    #[test]
    fn out_of_range_selection_is_ignored()
    {
        let mut board = board();
        assert_eq!(board.select_card(99, 0), None);
    }

    #[test]
    fn mismatch_flips_back_after_delay()
    {
        let mut board = board();
        let (a, b) = mismatched(&board);
        board.select_card(a, 0);
        assert_eq!(board.select_card(b, 0), Some(Outcome::Mismatch));
        assert!(board.is_locked());
        assert_eq!(board.lives(), START_LIVES);
        assert_eq!(board.message().map(|m| m.mood), Some(Mood::Negative));

        let third = (0..12).find(|&i| i != a && i != b).unwrap();
        assert_eq!(board.select_card(third, 500), None);
        assert!(!board.cards()[third].selected);

        board.tick(FLIP_BACK_MS - 1);
        assert!(board.cards()[a].selected);
        board.tick(FLIP_BACK_MS);
        assert!(!board.cards()[a].selected && !board.cards()[b].selected);
        assert!(!board.is_locked());
    }

    #[test]
    fn bad_matches_cost_lives_until_loss()
    {
        let mut board = board();
        let mut now = 0;
        for (i, key) in [PairKey::Evil, PairKey::Crying, PairKey::Death].into_iter().enumerate() {
            assert_eq!(match_pair(&mut board, key, now), Some(Outcome::BadMatch));
            assert_eq!(board.lives(), START_LIVES - 1 - i as u8);
            now += 2 * FLIP_BACK_MS;
        }
        assert_eq!(board.bad_matches(), 3);
        assert_eq!(board.ending(), Some(Ending::Loss));
        assert_eq!(board.tick(now + 60_000), Flow::Continue);

        let (a, _) = pair_of(&board, PairKey::Flower);
        assert_eq!(board.select_card(a, now), None);

        board.activate(None, now);
        assert_eq!(board.ending(), None);
        assert_eq!(board.lives(), START_LIVES);
        assert!(board.cards().iter().all(|card| !card.matched));
    }

    #[test]
    fn a_selected_pair_is_only_scored_once()
    {
        let mut board = board();
        let (a, b) = pair_of(&board, PairKey::Evil);
        board.select_card(a, 0);
        assert_eq!(board.select_card(b, 0), Some(Outcome::BadMatch));

        assert_eq!(board.check_match(1), None);
        assert_eq!(board.bad_matches(), 1);
        assert_eq!(board.lives(), START_LIVES - 1);
    }

    #[test]
    fn three_good_pairs_win_and_exit_later()
    {
        let mut board = board();
        let mut now = 0;
        for key in [PairKey::Flower, PairKey::Diploma] {
            match_pair(&mut board, key, now);
            now += 2 * FLIP_BACK_MS;
            assert_eq!(board.ending(), None);
        }
        let (a, b) = pair_of(&board, PairKey::Handshake);
        board.select_card(a, now);
        assert_eq!(board.select_card(b, now), Some(Outcome::GoodMatch));
        assert_eq!(
            board.ending(),
            Some(Ending::Win {
                exit_at: now + EXIT_DELAY_MS
            })
        );

        board.activate(Some(0), now + 10);
        assert!(board.is_over());
        assert_eq!(board.tick(now + EXIT_DELAY_MS - 1), Flow::Continue);
        assert_eq!(board.tick(now + EXIT_DELAY_MS), Flow::Exit);
    }

    #[test]
    fn message_fades_out()
    {
        let mut board = board();
        match_pair(&mut board, PairKey::Diploma, 0);
        assert_eq!(board.message_alpha(0), 255);
        let mid = board.message_alpha(MESSAGE_MS / 2);
        assert!(mid > 100 && mid < 155);
        board.tick(MESSAGE_MS);
        assert_eq!(board.message(), None);
        assert_eq!(board.message_alpha(MESSAGE_MS), 0);
    }

    #[test]
    fn cursor_wraps_around_the_grid()
    {
        let mut board = board();
        board.move_cursor(-1, 0);
        assert_eq!(board.cursor(), GRID_COLS - 1);
        board.move_cursor(0, -1);
        assert_eq!(board.cursor(), (GRID_ROWS - 1) * GRID_COLS + GRID_COLS - 1);
        board.move_cursor(1, 1);
        assert_eq!(board.cursor(), 0);
    }

    #[test]
    fn hit_test_maps_cells_to_cards()
    {
        let layout = Layout::for_canvas(80, 30);
        let (x, y) = layout.card_origin(2, 1);
        assert_eq!(layout.hit_test(x, y), Some(GRID_COLS + 2));
        assert_eq!(
            layout.hit_test(x + CARD_WIDTH as i32 - 1, y + CARD_HEIGHT as i32 - 1),
            Some(GRID_COLS + 2)
        );
        assert_eq!(layout.hit_test(x + CARD_WIDTH as i32, y), None);
        assert_eq!(layout.hit_test(0, 0), None);
    }

    proptest::proptest! {
        #[test]
        fn lives_and_counters_stay_consistent(
            picks in proptest::collection::vec(0usize..12, 0..60),
            seed in proptest::prelude::any::<u64>(),
        ) {
            let mut board = Board::new(StdRng::seed_from_u64(seed));
            let mut now = 0;
            for pick in picks {
                board.select_card(pick, now);
                now += FLIP_BACK_MS;
                board.tick(now);
                proptest::prop_assert_eq!(board.lives(), START_LIVES - board.bad_matches());
                proptest::prop_assert!(board.good_matches() <= GOOD_PAIRS_TO_WIN);
                let matched = board.cards().iter().filter(|card| card.matched).count();
                proptest::prop_assert_eq!(
                    matched,
                    2 * (board.good_matches() + board.bad_matches()) as usize
                );
            }
        }
    }
}
