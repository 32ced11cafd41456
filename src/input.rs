use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use std::collections::HashMap;
use std::hash::Hash;

/// How long a key counts as held after a press when the terminal never reports releases.
const HOLD_WINDOW_MS: u64 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hold
{
    Down,
    Until(u64),
}

/// Tracks which keys are held down. Uses release events once the terminal
/// has shown it sends them, otherwise treats every press as a short hold.
pub struct HeldKeys<K>
{
    keys: HashMap<K, Hold>,
    releases_reported: bool,
}

impl<K: Copy + Eq + Hash> HeldKeys<K>
{
    pub fn new() -> Self
    {
        Self {
            keys: HashMap::new(),
            releases_reported: false,
        }
    }

    pub fn apply(&mut self, key: K, kind: KeyEventKind, now: u64)
    {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let hold = if self.releases_reported {
                    Hold::Down
                } else {
                    Hold::Until(now + HOLD_WINDOW_MS)
                };
                self.keys.insert(key, hold);
            }
            KeyEventKind::Release => {
                self.releases_reported = true;
                self.keys.remove(&key);
            }
        }
    }

    pub fn is_held(&self, key: K, now: u64) -> bool
    {
        match self.keys.get(&key) {
            Some(Hold::Down) => true,
            Some(Hold::Until(deadline)) => now < *deadline,
            None => false,
        }
    }

    pub fn clear(&mut self)
    {
        self.keys.clear();
    }
}

pub fn is_quit(event: &Event) -> bool
{
    match event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => modifiers.contains(KeyModifiers::CONTROL),
        Event::Key(KeyEvent {
            code: KeyCode::Char('q') | KeyCode::Char('Q'),
            kind: KeyEventKind::Press,
            ..
        }) => true,
        _ => false,
    }
}

/// Key presses only; releases and repeats are filtered out.
pub fn pressed_key(event: &Event) -> Option<KeyCode>
{
    match event {
        Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) => Some(*code),
        _ => None,
    }
}

pub fn left_click(event: &Event) -> Option<(u16, u16)>
{
    match event {
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}
