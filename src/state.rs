use crate::config::Config;
use crate::generator::ReplyGenerator;

pub struct AppState {
    pub generator: ReplyGenerator,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Self {
        Self::new(ReplyGenerator::from_config(config).await)
    }

    pub fn new(generator: ReplyGenerator) -> Self {
        Self { generator }
    }
}
