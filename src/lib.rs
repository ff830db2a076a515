//! Prompts library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "lmstudio")]
    LmStudio,
}

impl Provider {
    /// Name used in the config file and `PROMPTS_PROVIDER`.
    pub fn config_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::LmStudio => "lmstudio",
        }
    }
}
