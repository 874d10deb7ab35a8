use babelrun::engine::config::ServiceConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub optimize: OptimizeSettings,
    pub convert: ConvertSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeSettings {
    pub forcefield: String,
    pub steps: u32,
    pub options: Vec<String>,
}

impl OptimizeSettings {
    /// Options following `--minimize`. `--log` makes obabel write the step
    /// table that drives progress reporting.
    pub fn obabel_options(&self, extra: &[String]) -> Vec<String> {
        let mut options = vec![
            "--ff".to_string(),
            self.forcefield.clone(),
            "--steps".to_string(),
            self.steps.to_string(),
            "--log".to_string(),
        ];
        options.extend(self.options.iter().cloned());
        options.extend(extra.iter().cloned());
        options
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertSettings {
    pub options: Vec<String>,
}

impl ConvertSettings {
    pub fn obabel_options(&self, extra: &[String]) -> Vec<String> {
        self.options.iter().chain(extra).cloned().collect()
    }
}
