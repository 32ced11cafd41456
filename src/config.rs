use crate::error::GameError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::env;
use std::path::PathBuf;

const ASSETS_VAR: &str = "MAYA_ASSETS";
const SEED_VAR: &str = "MAYA_SEED";
const LOG_VAR: &str = "MAYA_LOG";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_LOG_NAME: &str = "fragments.log";

#[derive(Clone, Debug, PartialEq)]
pub struct Config
{
    pub assets_dir: PathBuf,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

impl Config
{
    /// Command line values take precedence over `MAYA_*` environment variables.
    pub fn resolve(assets: Option<PathBuf>, seed: Option<u64>) -> Result<Self, GameError>
    {
        Self::from_sources(assets, seed, |name| env::var(name).ok())
    }

    fn from_sources(
        assets: Option<PathBuf>,
        seed: Option<u64>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GameError>
    {
        let assets_dir = assets
            .or_else(|| lookup(ASSETS_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

        let seed = match seed {
            Some(value) => Some(value),
            None => match lookup(SEED_VAR) {
                Some(raw) => Some(parse_seed(&raw)?),
                None => None,
            },
        };

        let log_file = lookup(LOG_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LOG_NAME));

        Ok(Self {
            assets_dir,
            seed,
            log_file,
        })
    }

    pub fn rng(&self) -> StdRng
    {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_seed(value: &str) -> Result<u64, GameError>
{
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| GameError::InvalidConfig {
            name: SEED_VAR,
            reason: format!("'{value}' is not an unsigned integer"),
        })
}
