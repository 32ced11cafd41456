pub mod cards;
pub mod forest;
pub mod piano;
pub mod story;

pub struct GameDescriptor
{
    pub name: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![GameDescriptor {
        name: "forest",
        description: "Walk Maya through the forest to the piano",
    },
    GameDescriptor {
        name: "piano",
        description: "Repeat the melody, note by note",
    },
    GameDescriptor {
        name: "cards",
        description: "Match the good memories before the bad ones win",
    }]
}

pub fn find(name: &str) -> Option<GameDescriptor>
{
    registry()
        .into_iter()
        .find(|game| game.name.eq_ignore_ascii_case(name.trim()))
}
