use crate::games::piano::{NOTES, Note};
use crate::render::Rgb;
use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Text art loaded from disk, or a coloured block standing in for it.
#[derive(Clone, Debug, PartialEq)]
pub enum Sprite
{
    Art
    {
        rows: Vec<String>,
        color: Rgb,
    },
    Placeholder
    {
        width: usize,
        height: usize,
        color: Rgb,
        label: String,
    },
}

impl Sprite
{
    pub fn width(&self) -> usize
    {
        match self {
            Sprite::Art { rows, .. } => rows.iter().map(|row| row.chars().count()).max().unwrap_or(0),
            Sprite::Placeholder { width, .. } => *width,
        }
    }

    pub fn height(&self) -> usize
    {
        match self {
            Sprite::Art { rows, .. } => rows.len(),
            Sprite::Placeholder { height, .. } => *height,
        }
    }

    pub fn mirrored(&self) -> Sprite
    {
        match self {
            Sprite::Art { rows, color } => {
                let width = self.width();
                let rows = rows
                    .iter()
                    .map(|row| {
                        let padded = format!("{row:<width$}");
                        padded.chars().rev().map(mirror_char).collect::<String>()
                    })
                    .collect();
                Sprite::Art { rows, color: *color }
            }
            Sprite::Placeholder { .. } => self.clone(),
        }
    }
}

/// What to show when a sprite file is missing or unreadable.
pub struct Fallback<'a>
{
    pub width: usize,
    pub height: usize,
    pub color: Rgb,
    pub label: &'a str,
}

pub fn load_sprite(path: &Path, color: Rgb, fallback: Fallback<'_>) -> Sprite
{
    match read_art(path) {
        Ok(rows) => {
            log::debug!("loaded sprite {}", path.display());
            Sprite::Art { rows, color }
        }
        Err(err) => {
            log::warn!("using placeholder for {}: {err}", path.display());
            Sprite::Placeholder {
                width: fallback.width,
                height: fallback.height,
                color: fallback.color,
                label: fallback.label.to_string(),
            }
        }
    }
}

fn read_art(path: &Path) -> io::Result<Vec<String>>
{
    let text = fs::read_to_string(path)?;
    let mut rows: Vec<String> = text.lines().map(|line| line.trim_end().to_string()).collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "sprite file is empty"));
    }
    Ok(rows)
}

fn mirror_char(ch: char) -> char
{
    match ch {
        '/' => '\\',
        '\\' => '/',
        '(' => ')',
        ')' => '(',
        '<' => '>',
        '>' => '<',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        other => other,
    }
}

pub enum Clip
{
    Sound(StaticSoundData),
    Silent,
}

impl Clip
{
    pub fn is_audible(&self) -> bool
    {
        matches!(self, Clip::Sound(_))
    }
}

/// One decoded clip per piano note, played through kira.
pub struct SoundBank
{
    clips: HashMap<Note, Clip>,
    output: Option<AudioManager<DefaultBackend>>,
}

impl SoundBank
{
    pub fn load(assets_dir: &Path) -> Self
    {
        let clips = load_clips(assets_dir);
        let output = if clips.values().any(Clip::is_audible) {
            open_output()
        } else {
            None
        };
        Self { clips, output }
    }

    pub fn silent() -> Self
    {
        Self {
            clips: NOTES.iter().map(|&note| (note, Clip::Silent)).collect(),
            output: None,
        }
    }

    pub fn clip(&self, note: Note) -> Option<&Clip>
    {
        self.clips.get(&note)
    }

    /// False when the note has no clip or there is no audio device to play it on.
    pub fn is_audible(&self, note: Note) -> bool
    {
        self.output.is_some() && self.clip(note).is_some_and(Clip::is_audible)
    }

    pub fn play(&mut self, note: Note)
    {
        log::debug!("note {}", note.name());
        let (Some(output), Some(Clip::Sound(data))) = (self.output.as_mut(), self.clips.get(&note))
        else {
            return;
        };
        if let Err(err) = output.play(data.clone()) {
            log::warn!("could not play note {}: {err:?}", note.name());
        }
    }
}

fn load_clips(assets_dir: &Path) -> HashMap<Note, Clip>
{
    NOTES
        .iter()
        .map(|&note| {
            let path = note_clip_path(assets_dir, note);
            let clip = match StaticSoundData::from_file(&path) {
                Ok(data) => {
                    log::debug!("loaded note clip {}", path.display());
                    Clip::Sound(data)
                }
                Err(err) => {
                    log::warn!("note clip {} unavailable ({err}), using silence", path.display());
                    Clip::Silent
                }
            };
            (note, clip)
        })
        .collect()
}

fn open_output() -> Option<AudioManager<DefaultBackend>>
{
    match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
        Ok(manager) => Some(manager),
        Err(err) => {
            log::warn!("no audio output ({err}), notes will be silent");
            None
        }
    }
}

fn note_clip_path(assets_dir: &Path, note: Note) -> PathBuf
{
    assets_dir.join("notes").join(format!("{}3.wav", note.name()))
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf
    {
        let dir = std::env::temp_dir().join(format!("maya-assets-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fallback() -> Fallback<'static>
    {
        Fallback {
            width: 6,
            height: 3,
            color: Rgb::new(200, 100, 100),
            label: "maya",
        }
    }

    #[test]
    fn missing_file_gives_placeholder()
    {
        let sprite = load_sprite(Path::new("/definitely/not/here.txt"), Rgb::WHITE, fallback());
        assert_eq!(
            sprite,
            Sprite::Placeholder {
                width: 6,
                height: 3,
                color: Rgb::new(200, 100, 100),
                label: "maya".to_string(),
            }
        );
    }

    #[test]
    fn art_file_is_trimmed()
    {
        let dir = scratch_dir("art");
        let path = dir.join("tree.txt");
        fs::write(&path, " /\\  \n/__\\\n ||\n\n\n").unwrap();
        let sprite = load_sprite(&path, Rgb::GREEN, fallback());
        assert_eq!(sprite.height(), 3);
        assert_eq!(sprite.width(), 4);
    }

    #[test]
    fn empty_file_gives_placeholder()
    {
        let dir = scratch_dir("empty");
        let path = dir.join("blank.txt");
        fs::write(&path, "\n\n").unwrap();
        assert!(matches!(
            load_sprite(&path, Rgb::GREEN, fallback()),
            Sprite::Placeholder { .. }
        ));
    }

    #[test]
    fn mirroring_flips_rows_and_slashes()
    {
        let sprite = Sprite::Art {
            rows: vec!["(o".to_string(), "/|\\_".to_string()],
            color: Rgb::WHITE,
        };
        let Sprite::Art { rows, .. } = sprite.mirrored() else {
            panic!("art stays art");
        };
        assert_eq!(rows, vec!["  o)".to_string(), "_/|\\".to_string()]);
    }

    #[test]
    fn missing_or_broken_clips_are_silent()
    {
        let dir = scratch_dir("notes");
        fs::create_dir_all(dir.join("notes")).unwrap();
        fs::write(dir.join("notes").join("C3.wav"), b"RIFF").unwrap();
        let bank = SoundBank::load(&dir);
        assert!(NOTES.iter().all(|&note| !bank.is_audible(note)));
        assert!(matches!(bank.clip(Note::C), Some(Clip::Silent)));
        assert!(matches!(SoundBank::silent().clip(Note::A), Some(Clip::Silent)));
    }

    #[test]
    fn shipped_note_clips_decode()
    {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let clips = load_clips(&assets);
        for note in NOTES {
            assert!(clips[&note].is_audible(), "no clip for {}", note.name());
        }
    }
}
