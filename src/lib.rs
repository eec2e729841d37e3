pub mod checker;
pub mod config;
pub mod model;
pub mod output;
pub mod scanner;

pub use checker::VulnerabilityIndex;
pub use config::Config;
pub use model::{Finding, ManifestKind, ScanResult};
pub use scanner::ManifestScanner;
