// Lab Configuration
//
// Defaults mirror the lab's deployment; the daemon overrides them from
// environment variables.

use crate::domain::PricingConfig;
use serde::{Deserialize, Serialize};

/// Upload acceptance policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_file_size: i64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            allowed_extensions: vec!["stl".to_string(), "obj".to_string(), "3mf".to_string()],
        }
    }
}

impl UploadPolicy {
    pub fn extension_allowed(&self, original_filename: &str) -> bool {
        std::path::Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }
}

/// Everything the lifecycle engine and surfaces need to know about the lab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    pub lab_name: String,
    pub lab_email: String,
    pub pricing: PricingConfig,
    pub upload: UploadPolicy,
    /// Shared static staff password for the review dashboard
    pub staff_password: String,
    /// Base URL used to build mailed confirmation links
    pub public_url: String,
    /// Hex characters in a confirmation token
    pub token_length: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            lab_name: "3D Print Lab".to_string(),
            lab_email: "printlab@university.edu".to_string(),
            pricing: PricingConfig::default(),
            upload: UploadPolicy::default(),
            staff_password: "printlab2024".to_string(),
            public_url: "http://127.0.0.1:9640".to_string(),
            token_length: 32,
        }
    }
}
