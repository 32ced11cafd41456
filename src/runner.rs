use crate::error::GameError;
use crate::input;
use crate::render::Canvas;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow
{
    Continue,
    Exit,
}

/// Time and terminal size for the frame being processed.
#[derive(Clone, Copy, Debug)]
pub struct Frame
{
    pub now: u64,
    pub width: usize,
    pub height: usize,
}

pub trait Scene
{
    fn handle_event(&mut self, event: &Event, frame: &Frame) -> Flow;
    fn update(&mut self, now: u64) -> Flow;
    fn draw(&self, canvas: &mut Canvas, now: u64);
}

pub struct Clock
{
    start: Instant,
}

impl Clock
{
    pub fn start() -> Self
    {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> u64
    {
        self.start.elapsed().as_millis() as u64
    }
}

struct TerminalGuard
{
    stdout: Stdout,
    enhanced_keys: bool,
}

impl TerminalGuard
{
    fn enter() -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture)?;
        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("terminal ready, key release events: {enhanced_keys}");
        Ok(Self {
            stdout,
            enhanced_keys,
        })
    }

    fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        if self.enhanced_keys {
            let _ = execute!(self.stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(self.stdout, DisableMouseCapture, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn poll_events() -> io::Result<Vec<Event>>
{
    let mut events = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        events.push(event::read()?);
    }
    Ok(events)
}

/// Runs `scene` at a fixed rate until it asks to exit or the player quits.
pub fn run(scene: &mut dyn Scene) -> Result<(), GameError>
{
    let mut term = TerminalGuard::enter()?;
    let clock = Clock::start();

    loop {
        let frame_start = Instant::now();
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let frame = Frame {
            now: clock.now(),
            width: cols as usize,
            height: rows as usize,
        };

        for event in poll_events()? {
            if input::is_quit(&event) {
                log::info!("quit requested");
                return Ok(());
            }
            if scene.handle_event(&event, &frame) == Flow::Exit {
                return Ok(());
            }
        }

        if scene.update(frame.now) == Flow::Exit {
            return Ok(());
        }

        let mut canvas = Canvas::new(frame.width, frame.height);
        scene.draw(&mut canvas, frame.now);
        canvas.flush(term.stdout())?;

        let spent = frame_start.elapsed();
        if spent < FRAME {
            std::thread::sleep(FRAME - spent);
        }
    }
}
