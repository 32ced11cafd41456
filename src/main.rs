use clap::{Parser, Subcommand};
use fragments_of_maya::config::Config;
use fragments_of_maya::error::GameError;
use fragments_of_maya::games::cards::CardGame;
use fragments_of_maya::games::story::{Stage, Story};
use fragments_of_maya::{games, logging, runner};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fragments",
    about = "Fragments of Maya: a forest walk, a piano memory challenge and a card memory game",
    after_help = "Without a command an interactive menu is shown. Press q or Ctrl+C to quit any game."
)]
struct Cli
{
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding text sprites and note clips.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Seed for sequences, shuffles and messages.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command
{
    /// List the available games.
    List,
    /// Walk through the forest; the piano waits in the clearing.
    Forest,
    /// Start directly at the piano challenge.
    Piano,
    /// Play the memory card game.
    Cards,
}

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GameError>
{
    let cli = Cli::parse();
    let config = Config::resolve(cli.assets, cli.seed)?;
    logging::init(&config)?;

    match cli.command {
        None => interactive_menu(&config),
        Some(Command::List) => {
            list_games();
            Ok(())
        }
        Some(Command::Forest) => run_game("forest", &config),
        Some(Command::Piano) => run_game("piano", &config),
        Some(Command::Cards) => run_game("cards", &config),
    }
}

fn run_game(name: &str, config: &Config) -> Result<(), GameError>
{
    log::info!("starting {name} (seed {:?})", config.seed);
    match name {
        "forest" => {
            let mut story = Story::new(config, Stage::Forest);
            runner::run(&mut story)
        }
        "piano" => {
            let mut story = Story::new(config, Stage::Piano);
            runner::run(&mut story)
        }
        "cards" => {
            let mut game = CardGame::new(config);
            runner::run(&mut game)
        }
        _ => Err(GameError::UnknownGame(name.to_string())),
    }
}

fn interactive_menu(config: &Config) -> Result<(), GameError>
{
    let registry = games::registry();
    println!("Fragments of Maya");
    println!();
    println!("Select a game:");
    for (idx, game) in registry.iter().enumerate() {
        println!("  {}. {} - {}", idx + 1, game.name, game.description);
    }
    println!();
    print!("Enter number or name (default 1, q to quit): ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let choice = input.trim();

    if choice.is_empty() {
        return run_game(registry[0].name, config);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return run_game(registry[index - 1].name, config);
        }
    }

    match games::find(choice) {
        Some(game) => run_game(game.name, config),
        None => Err(GameError::UnknownGame(choice.to_string())),
    }
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<10} - {}", game.name, game.description);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_follow_the_subcommand()
    {
        let cli = Cli::try_parse_from(["fragments", "cards", "--seed", "4", "--assets", "art"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Cards)));
        assert_eq!(cli.seed, Some(4));
        assert_eq!(cli.assets, Some(PathBuf::from("art")));
    }

    #[test]
    fn unknown_game_is_an_error()
    {
        let config = Config {
            assets_dir: PathBuf::from("assets"),
            seed: Some(1),
            log_file: std::env::temp_dir().join("unused.log"),
        };
        assert!(matches!(
            run_game("wordle", &config),
            Err(GameError::UnknownGame(name)) if name == "wordle"
        ));
    }
}
