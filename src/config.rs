use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub xp_per_correct_answer: u64,
    pub max_write_retries: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "trainme-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            xp_per_correct_answer: env::var("XP_PER_CORRECT_ANSWER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_write_retries: env::var("MAX_WRITE_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "trainme-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            xp_per_correct_answer: 10,
            max_write_retries: 5,
        }
    }
}
