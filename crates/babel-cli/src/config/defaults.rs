pub struct DefaultsConfig {
    pub forcefield: String,
    pub steps: u32,
    pub optimize_options: Vec<String>,
    pub convert_options: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            forcefield: "MMFF94".to_string(),
            steps: 2500,
            optimize_options: Vec::new(),
            convert_options: Vec::new(),
        }
    }
}
