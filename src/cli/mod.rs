pub mod config_check;
pub mod generate;
pub mod interactive;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::controller::Controller;
use crate::llm::factory;
use crate::pipeline::generator::TestCaseGenerator;
use crate::validator::LanguageValidator;

/// Command-line overrides that win over file and environment values
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref model) = self.model {
            info!("CLI override: model = {}", model);
            config.llm.model = Some(model.clone());
        }
        if let Some(temperature) = self.temperature {
            info!("CLI override: temperature = {}", temperature);
            config.llm.temperature = Some(temperature);
        }
    }
}

/// File, then environment, then CLI overrides. Not validated.
pub fn resolve_config(config_path: Option<String>, overrides: &Overrides) -> Result<Config> {
    if let Some(ref cfg) = config_path {
        info!("Config: {}", cfg);
    }
    let mut config = Config::load_with_path(config_path)?;
    config.apply_env()?;
    overrides.apply(&mut config);
    Ok(config)
}

/// [`resolve_config`], then the bounds check.
pub fn load_config(config_path: Option<String>, overrides: &Overrides) -> Result<Config> {
    let config = resolve_config(config_path, overrides)?;
    config.validate()?;
    Ok(config)
}

/// Wire validator and generator to one shared completion client.
pub fn build_controller(config: &Config, dry_run: bool) -> Result<Controller> {
    let client = factory::create_client(config, dry_run)?;

    let validator = LanguageValidator::new(client.clone())
        .with_custom_instructions(config.prompts.detect_custom.clone());
    let generator = TestCaseGenerator::new(client, config.generation.max_test_cases)
        .with_prompt_ceiling(config.generation.prompt_ceiling)
        .with_custom_instructions(config.prompts.generate_custom.clone());

    Ok(Controller::new(validator, generator))
}
