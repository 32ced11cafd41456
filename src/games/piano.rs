use crate::render::{Canvas, Rgb, centered_x};
use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;

pub const NOTE_INTERVAL_MS: u64 = 500;
pub const KEY_HIGHLIGHT_MS: u64 = 500;
pub const REPLAY_COOLDOWN_MS: u64 = 1000;
pub const FEEDBACK_MS: u64 = 2000;
const BASE_SEQUENCE_LEN: u32 = 3;
const KEY_WIDTH: usize = 7;
const KEY_HEIGHT: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Note
{
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

pub const NOTES: [Note; 7] = [Note::A, Note::B, Note::C, Note::D, Note::E, Note::F, Note::G];

impl Note
{
    pub fn name(self) -> char
    {
        match self {
            Note::A => 'A',
            Note::B => 'B',
            Note::C => 'C',
            Note::D => 'D',
            Note::E => 'E',
            Note::F => 'F',
            Note::G => 'G',
        }
    }

    pub fn from_char(ch: char) -> Option<Note>
    {
        NOTES
            .iter()
            .copied()
            .find(|note| note.name() == ch.to_ascii_uppercase())
    }

    fn index(self) -> usize
    {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict
{
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState
{
    Idle,
    Presenting,
    AwaitingInput,
    Feedback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress
{
    Continue,
    Victory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PianoRules
{
    pub stages: u32,
    pub phases: u32,
}

impl Default for PianoRules
{
    fn default() -> Self
    {
        Self {
            stages: 1,
            phases: 5,
        }
    }
}

pub fn sequence_len(stage: u32) -> usize
{
    ((BASE_SEQUENCE_LEN + stage) as usize).min(NOTES.len())
}

/// Distinct notes in random order.
pub fn generate_sequence(stage: u32, rng: &mut impl Rng) -> Vec<Note>
{
    index::sample(rng, NOTES.len(), sequence_len(stage))
        .into_iter()
        .map(|i| NOTES[i])
        .collect()
}

pub fn evaluate(sequence: &[Note], input: &[Note]) -> Verdict
{
    if sequence == input {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

pub enum PianoAction
{
    Confirm,
    Undo,
    Replay,
    Play(Note),
    Leave,
}

pub fn action_for(code: KeyCode) -> Option<PianoAction>
{
    match code {
        KeyCode::Enter => Some(PianoAction::Confirm),
        KeyCode::Backspace => Some(PianoAction::Undo),
        KeyCode::Esc => Some(PianoAction::Leave),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PianoAction::Replay),
        KeyCode::Char(ch) => Note::from_char(ch).map(PianoAction::Play),
        _ => None,
    }
}

/// Round controller for the sequence memory challenge.
pub struct PianoGame
{
    rules: PianoRules,
    stage: u32,
    phase: u32,
    state: RoundState,
    sequence: Vec<Note>,
    input: Vec<Note>,
    next_note: usize,
    next_note_at: u64,
    presented: Option<Note>,
    verdict: Option<Verdict>,
    feedback_until: u64,
    last_replay: Option<u64>,
    active_key: Option<(Note, u64)>,
    wrong_key: Option<(Note, u64)>,
    sounds: Vec<Note>,
    rng: StdRng,
}

impl PianoGame
{
    pub fn new(rules: PianoRules, rng: StdRng) -> Self
    {
        let mut game = Self {
            rules,
            stage: 1,
            phase: 1,
            state: RoundState::Idle,
            sequence: Vec::new(),
            input: Vec::new(),
            next_note: 0,
            next_note_at: 0,
            presented: None,
            verdict: None,
            feedback_until: 0,
            last_replay: None,
            active_key: None,
            wrong_key: None,
            sounds: Vec::new(),
            rng,
        };
        game.start_round();
        game
    }

    pub fn start_round(&mut self)
    {
        self.sequence = generate_sequence(self.stage, &mut self.rng);
        self.input.clear();
        self.state = RoundState::Idle;
        self.next_note = 0;
        self.presented = None;
        self.verdict = None;
        self.wrong_key = None;
        log::debug!(
            "stage {} phase {}: new sequence of {} notes",
            self.stage,
            self.phase,
            self.sequence.len()
        );
    }

    /// Drops the round in progress, keeping stage and phase.
    pub fn abandon(&mut self)
    {
        self.active_key = None;
        self.start_round();
    }

    pub fn reset_progress(&mut self)
    {
        self.stage = 1;
        self.phase = 1;
        self.last_replay = None;
        self.abandon();
    }

    pub fn apply(&mut self, action: PianoAction, now: u64)
    {
        match action {
            PianoAction::Confirm => self.confirm(now),
            PianoAction::Undo => self.undo(),
            PianoAction::Replay => {
                self.replay(now);
            }
            PianoAction::Play(note) => self.submit_note(note, now),
            PianoAction::Leave => self.abandon(),
        }
    }

    pub fn confirm(&mut self, now: u64)
    {
        match self.state {
            RoundState::Idle => self.begin_playback(now),
            RoundState::AwaitingInput if self.input.len() == self.sequence.len() => {
                let verdict = evaluate(&self.sequence, &self.input);
                log::info!("stage {} phase {}: {:?}", self.stage, self.phase, verdict);
                self.verdict = Some(verdict);
                self.state = RoundState::Feedback;
                self.feedback_until = now + FEEDBACK_MS;
            }
            _ => {}
        }
    }

    pub fn undo(&mut self)
    {
        if self.state == RoundState::AwaitingInput {
            self.input.pop();
        }
    }

    pub fn can_replay(&self, now: u64) -> bool
    {
        self.state == RoundState::AwaitingInput
            && self
                .last_replay
                .is_none_or(|at| now.saturating_sub(at) >= REPLAY_COOLDOWN_MS)
    }

    pub fn replay(&mut self, now: u64) -> bool
    {
        if !self.can_replay(now) {
            return false;
        }
        self.last_replay = Some(now);
        self.begin_playback(now);
        true
    }

    pub fn submit_note(&mut self, note: Note, now: u64)
    {
        if self.state == RoundState::Feedback {
            return;
        }
        self.sounds.push(note);
        self.active_key = Some((note, now + KEY_HIGHLIGHT_MS));

        if self.state != RoundState::AwaitingInput || self.input.len() >= self.sequence.len() {
            return;
        }
        let position = self.input.len();
        self.input.push(note);
        if self.sequence[position] != note {
            self.wrong_key = Some((note, now + KEY_HIGHLIGHT_MS));
        }
    }

    pub fn tick(&mut self, now: u64) -> Progress
    {
        let mut progress = Progress::Continue;
        match self.state {
            RoundState::Presenting if now >= self.next_note_at => {
                if let Some(&note) = self.sequence.get(self.next_note) {
                    self.sounds.push(note);
                    self.presented = Some(note);
                    self.next_note += 1;
                    self.next_note_at = now + NOTE_INTERVAL_MS;
                } else {
                    self.presented = None;
                    self.state = RoundState::AwaitingInput;
                }
            }
            RoundState::Feedback if now >= self.feedback_until => {
                if self.verdict == Some(Verdict::Correct) {
                    progress = self.advance();
                }
                self.start_round();
            }
            _ => {}
        }

        if self.active_key.is_some_and(|(_, until)| now >= until) {
            self.active_key = None;
        }
        if self.wrong_key.is_some_and(|(_, until)| now >= until) {
            self.wrong_key = None;
        }
        progress
    }

    fn begin_playback(&mut self, now: u64)
    {
        self.state = RoundState::Presenting;
        self.next_note = 0;
        self.presented = None;
        self.next_note_at = now + NOTE_INTERVAL_MS;
    }

    fn advance(&mut self) -> Progress
    {
        self.phase += 1;
        if self.phase <= self.rules.phases {
            return Progress::Continue;
        }
        self.phase = 1;
        if self.stage < self.rules.stages {
            self.stage += 1;
            log::info!("advanced to stage {}", self.stage);
            Progress::Continue
        } else {
            log::info!("piano challenge complete");
            Progress::Victory
        }
    }

    pub fn take_sounds(&mut self) -> Vec<Note>
    {
        std::mem::take(&mut self.sounds)
    }

    pub fn state(&self) -> RoundState
    {
        self.state
    }

    pub fn stage(&self) -> u32
    {
        self.stage
    }

    pub fn phase(&self) -> u32
    {
        self.phase
    }

    pub fn sequence(&self) -> &[Note]
    {
        &self.sequence
    }

    pub fn input(&self) -> &[Note]
    {
        &self.input
    }

    pub fn verdict(&self) -> Option<Verdict>
    {
        self.verdict
    }

    /// The key lit on the keyboard. Nothing is lit while the sequence plays.
    pub fn highlighted_key(&self) -> Option<Note>
    {
        if self.state == RoundState::Presenting {
            return None;
        }
        self.active_key.map(|(note, _)| note)
    }

    /// The note of the current playback step, if one has sounded yet.
    pub fn presented_note(&self) -> Option<Note>
    {
        self.presented
    }

    pub fn wrong_key(&self) -> Option<Note>
    {
        self.wrong_key.map(|(note, _)| note)
    }

    pub fn draw(&self, canvas: &mut Canvas)
    {
        canvas.tint(Rgb::DARK_BLUE, 120);
        self.draw_keyboard(canvas);

        match self.state {
            RoundState::Idle => {
                let lines = [
                    format!(
                        "Stage {} - Phase {}/{}",
                        self.stage, self.phase, self.rules.phases
                    ),
                    "Press ENTER to start".to_string(),
                    format!("Notes: {}", self.sequence.len()),
                ];
                for (i, line) in lines.iter().enumerate() {
                    canvas.put_centered(1 + i as i32 * 2, line, Rgb::WHITE);
                }
            }
            RoundState::Presenting => {
                canvas.put_centered(2, "Listen carefully...", Rgb::WHITE);
            }
            RoundState::AwaitingInput => {
                canvas.put_centered(
                    1,
                    &format!("Phase {}/{}", self.phase, self.rules.phases),
                    Rgb::WHITE,
                );
                canvas.put_centered(3, "Repeat the sequence:", Rgb::WHITE);
                canvas.put_centered(5, "R=Replay | BACKSPACE=Undo", Rgb::YELLOW);
                self.draw_progress(canvas, 7);
                if self.input.len() == self.sequence.len() {
                    canvas.put_centered(9, "Press ENTER to submit", Rgb::CYAN);
                }
            }
            RoundState::Feedback => {
                let correct = self.verdict == Some(Verdict::Correct);
                let (overlay, title) = if correct {
                    (Rgb::new(0, 255, 0), "CORRECT!")
                } else {
                    (Rgb::new(255, 0, 0), "WRONG!")
                };
                canvas.tint(overlay, 180);
                let middle = canvas.height() as i32 / 2;
                canvas.put_centered(middle - 1, title, Rgb::WHITE);
                if !correct {
                    let names: Vec<String> =
                        self.sequence.iter().map(|note| note.name().to_string()).collect();
                    canvas.put_centered(
                        middle + 1,
                        &format!("Sequence: {}", names.join("-")),
                        Rgb::WHITE,
                    );
                }
            }
        }
    }

    fn draw_progress(&self, canvas: &mut Canvas, row: i32)
    {
        let total = self.sequence.len();
        let start = centered_x(canvas.width(), total * 3);
        for i in 0..total {
            let color = match self.input.get(i) {
                None => Rgb::WHITE,
                Some(note) if *note == self.sequence[i] => Rgb::GREEN,
                Some(_) => Rgb::RED,
            };
            canvas.put_str(start + i as i32 * 3, row, "●", color);
        }
    }

    fn draw_keyboard(&self, canvas: &mut Canvas)
    {
        let total_width = NOTES.len() * (KEY_WIDTH + 1);
        let left = centered_x(canvas.width(), total_width);
        let top = canvas.height() as i32 - KEY_HEIGHT as i32 - 2;
        let lit = self.highlighted_key();
        let wrong = self.wrong_key();

        for note in NOTES {
            let x = left + (note.index() * (KEY_WIDTH + 1)) as i32;
            let color = if wrong == Some(note) {
                Rgb::RED
            } else if lit == Some(note) {
                Rgb::new(120, 180, 255)
            } else {
                Rgb::new(235, 235, 225)
            };
            canvas.fill_rect(x, top, KEY_WIDTH, KEY_HEIGHT, color);
            let label = note.name().to_string();
            canvas.put_str(
                x + (KEY_WIDTH / 2) as i32,
                top + KEY_HEIGHT as i32 - 2,
                &label,
                Rgb::BLACK,
            );
        }
    }
}
