pub struct DatabaseSettings {
    pub default_path: &'static str,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            default_path: "carambole_ranking.db",
        }
    }
}

pub struct AppConfig {
    pub database: DatabaseSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            database: DatabaseSettings::default(),
        }
    }

    /// Database path: DATABASE_PATH wins over the built-in default.
    pub fn database_path(&self) -> String {
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| self.database.default_path.to_string())
    }
}
