//! Server Configuration

use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub bind: String,

    /// Port number
    pub port: u16,

    /// word2vec binary dictionary loaded at startup
    pub dictionary: PathBuf,

    /// Maximum number of vocabulary scans running at once
    pub max_concurrent_queries: usize,

    /// Answer cross-origin requests from any origin
    pub cors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            dictionary: PathBuf::from("wikipedia.bin"),
            max_concurrent_queries: num_cpus::get(),
            cors: true,
        }
    }
}

impl Config {
    /// Create a new config with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new config with custom bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Set dictionary path
    pub fn with_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary = path.into();
        self
    }

    /// Set the concurrent query limit (0 = number of CPUs)
    pub fn with_max_concurrent_queries(mut self, limit: usize) -> Self {
        self.max_concurrent_queries = if limit == 0 { num_cpus::get() } else { limit };
        self
    }

    /// Enable or disable CORS headers
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    /// `bind:port` listen address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_bind("127.0.0.1")
            .with_port(9000)
            .with_dictionary("/data/vectors.bin")
            .with_max_concurrent_queries(3)
            .with_cors(false);

        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.dictionary, PathBuf::from("/data/vectors.bin"));
        assert_eq!(config.max_concurrent_queries, 3);
        assert!(!config.cors);
    }

    #[test]
    fn test_zero_query_limit_means_cpu_count() {
        let config = Config::default().with_max_concurrent_queries(0);
        assert_eq!(config.max_concurrent_queries, num_cpus::get());
        assert!(config.max_concurrent_queries > 0);
    }
}
