use crate::assets::SoundBank;
use crate::config::Config;
use crate::games::forest::{CharacterSprites, Forest, ForestSignal};
use crate::games::piano::{self, Note, PianoGame, PianoRules, Progress};
use crate::input;
use crate::render::{Canvas, Rgb, centered_x};
use crate::runner::{Flow, Frame, Scene};
use crossterm::event::{Event, KeyEvent};

const VICTORY_MS: u64 = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage
{
    Forest,
    Piano,
    Victory
    {
        since: u64,
    },
}

/// The forest walk with the piano challenge inside it.
pub struct Story
{
    stage: Stage,
    forest: Forest,
    piano: PianoGame,
    sprites: CharacterSprites,
    sounds: SoundBank,
}

impl Story
{
    pub fn new(config: &Config, start: Stage) -> Self
    {
        Self::with_parts(
            start,
            PianoGame::new(PianoRules::default(), config.rng()),
            CharacterSprites::load(&config.assets_dir),
            SoundBank::load(&config.assets_dir),
        )
    }

    fn with_parts(
        start: Stage,
        piano: PianoGame,
        sprites: CharacterSprites,
        sounds: SoundBank,
    ) -> Self
    {
        log::info!("story starts in {start:?}");
        Self {
            stage: start,
            forest: Forest::new(),
            piano,
            sprites,
            sounds,
        }
    }

    pub fn stage(&self) -> Stage
    {
        self.stage
    }

    fn switch(&mut self, stage: Stage)
    {
        log::info!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn finish_victory(&mut self)
    {
        self.piano.reset_progress();
        self.forest.reset_position();
        self.switch(Stage::Forest);
    }
}

impl Scene for Story
{
    fn handle_event(&mut self, event: &Event, frame: &Frame) -> Flow
    {
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            return Flow::Continue;
        };

        match self.stage {
            Stage::Forest => match self.forest.handle_key(*code, *kind, frame.now) {
                Some(ForestSignal::EnterPiano) => self.switch(Stage::Piano),
                Some(ForestSignal::Leave) => return Flow::Exit,
                None => {}
            },
            Stage::Piano => {
                if let Some(action) = input::pressed_key(event).and_then(piano::action_for) {
                    let leaving = matches!(action, piano::PianoAction::Leave);
                    self.piano.apply(action, frame.now);
                    if leaving {
                        self.switch(Stage::Forest);
                    }
                }
            }
            Stage::Victory { .. } => {
                if input::pressed_key(event).is_some() {
                    self.finish_victory();
                }
            }
        }
        Flow::Continue
    }

    fn update(&mut self, now: u64) -> Flow
    {
        match self.stage {
            Stage::Forest => self.forest.tick(now),
            Stage::Piano => {
                if self.piano.tick(now) == Progress::Victory {
                    self.switch(Stage::Victory { since: now });
                }
            }
            Stage::Victory { since } => {
                if now.saturating_sub(since) > VICTORY_MS {
                    self.finish_victory();
                }
            }
        }

        for note in self.piano.take_sounds() {
            self.sounds.play(note);
        }
        Flow::Continue
    }

    fn draw(&self, canvas: &mut Canvas, _now: u64)
    {
        match self.stage {
            Stage::Forest => self.forest.draw(canvas, &self.sprites, self.piano.stage()),
            Stage::Piano => {
                self.forest.draw(canvas, &self.sprites, self.piano.stage());
                self.piano.draw(canvas);
                if let Some(note) = self.piano.presented_note() {
                    if !self.sounds.is_audible(note) {
                        draw_note_cue(canvas, note);
                    }
                }
            }
            Stage::Victory { .. } => draw_victory(canvas),
        }
    }
}

/// Shows the note being played when it cannot be heard.
fn draw_note_cue(canvas: &mut Canvas, note: Note)
{
    let label = format!("~ {} ~", note.name());
    let width = label.chars().count() + 4;
    let x = centered_x(canvas.width(), width);
    canvas.fill_rect(x, 4, width, 3, Rgb::new(60, 60, 90));
    canvas.put_centered(5, &label, Rgb::YELLOW);
}

fn draw_victory(canvas: &mut Canvas)
{
    canvas.fill(Rgb::PURPLE);
    let middle = canvas.height() as i32 / 2;
    canvas.put_centered(middle - 3, "CONGRATULATIONS!", Rgb::YELLOW);
    canvas.put_centered(middle, "You completed all the piano stage!", Rgb::WHITE);
    canvas.put_centered(
        middle + 3,
        "But don't get too excited, this is just the beginning.",
        Rgb::WHITE,
    );
}
