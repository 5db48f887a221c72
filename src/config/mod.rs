//! Configuration loading.
//!
//! Configuration comes from a TOML, YAML or JSON file (picked by extension).
//! Every section's `Default` reads `VARIMPACT_*` environment variables, so
//! the environment supplies values for anything the file leaves out.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::{RetryPolicy, ToolKind};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "VARIMPACT_";

/// Upper bound on `processing.timeout_seconds` (one day).
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Read `VARIMPACT_<name>`, ignoring empty and unparsable values.
fn env_var<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    env_var::<String>(name).map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Annotation database the annotator resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Refseq,
    Ucsc,
    Ensembl,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Refseq => "refseq",
            DatabaseType::Ucsc => "ucsc",
            DatabaseType::Ensembl => "ensembl",
        }
    }

    /// Annotator command-line flag.
    pub fn flag(&self) -> String {
        format!("--{}", self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refseq" => Ok(DatabaseType::Refseq),
            "ucsc" => Ok(DatabaseType::Ucsc),
            "ensembl" => Ok(DatabaseType::Ensembl),
            other => Err(ConfigError::Invalid(format!("unknown database '{}'", other))),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference genome build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceVersion {
    Hg19,
    #[default]
    Hg38,
}

impl ReferenceVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceVersion::Hg19 => "hg19",
            ReferenceVersion::Hg38 => "hg38",
        }
    }
}

impl FromStr for ReferenceVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hg19" | "grch37" => Ok(ReferenceVersion::Hg19),
            "hg38" | "grch38" => Ok(ReferenceVersion::Hg38),
            other => Err(ConfigError::Invalid(format!(
                "unknown reference version '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ReferenceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Annotator (protein notation to genomic coordinates) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    pub executable: PathBuf,
    pub database: DatabaseType,
    pub reference_version: ReferenceVersion,
    /// Restrict to CCDS transcripts.
    pub use_ccds: bool,
    /// Reference FASTA passed with `--reference`.
    pub reference_file: Option<PathBuf>,
    /// Extra flags appended verbatim before the notation.
    pub custom_flags: Vec<String>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            executable: env_var("ANNOTATOR_EXECUTABLE").unwrap_or_else(|| PathBuf::from("transvar")),
            database: env_var("ANNOTATOR_DATABASE").unwrap_or_default(),
            reference_version: env_var("ANNOTATOR_REF_VERSION").unwrap_or_default(),
            use_ccds: env_flag("ANNOTATOR_USE_CCDS").unwrap_or(true),
            reference_file: env_var("ANNOTATOR_REFERENCE_FILE"),
            custom_flags: Vec::new(),
        }
    }
}

impl AnnotatorConfig {
    /// Flags between the subcommand and the notation.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = vec![
            self.database.flag(),
            "--refversion".to_string(),
            self.reference_version.to_string(),
        ];
        if self.use_ccds {
            flags.push("--ccds".to_string());
        }
        if let Some(ref fasta) = self.reference_file {
            flags.push("--reference".to_string());
            flags.push(fasta.to_string_lossy().into_owned());
        }
        flags.extend(self.custom_flags.iter().cloned());
        flags
    }
}

/// Concurrency, timeout and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Upper bound on concurrent external invocations in a fan-out.
    pub max_workers: usize,
    /// Base timeout, scaled per tool.
    pub timeout_seconds: u64,
    /// Attempts per external call, including the first.
    pub retry_attempts: u32,
    /// Base backoff delay, scaled per tool.
    pub retry_base_delay_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: env_var("MAX_WORKERS").unwrap_or(4),
            timeout_seconds: env_var("TIMEOUT_SECONDS").unwrap_or(300),
            retry_attempts: env_var("RETRY_ATTEMPTS").unwrap_or(3),
            retry_base_delay_ms: env_var("RETRY_BASE_DELAY_MS").unwrap_or(1000),
        }
    }
}

/// Locations of external scripts and the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Report-structure generator script.
    pub structure_script: Option<PathBuf>,
    /// Knowledge-base processor executable.
    pub kb_processor: Option<PathBuf>,
    /// JSON to CSV converter script.
    pub converter_script: Option<PathBuf>,
    /// Directory under which run directories are created.
    pub output_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            structure_script: env_var("STRUCTURE_SCRIPT"),
            kb_processor: env_var("KB_PROCESSOR"),
            converter_script: env_var("CONVERTER_SCRIPT"),
            output_dir: env_var("OUTPUT_DIR").unwrap_or_else(|| PathBuf::from("output")),
        }
    }
}

/// A versioned knowledge base consulted by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseSpec {
    pub version: String,
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
}

impl KnowledgeBaseSpec {
    pub fn new(version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            path: path.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn default_knowledge_bases() -> Vec<KnowledgeBaseSpec> {
    vec![
        KnowledgeBaseSpec::new(
            "cosmic_v97",
            env_var::<PathBuf>("KB_COSMIC").unwrap_or_else(|| PathBuf::from("cosmic")),
        )
        .with_description("COSMIC Cancer Gene Census"),
        KnowledgeBaseSpec::new(
            "clinvar_20230801",
            env_var::<PathBuf>("KB_CLINVAR").unwrap_or_else(|| PathBuf::from("clinvar")),
        )
        .with_description("ClinVar clinical significance"),
    ]
}

/// Which stages may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToggles {
    #[serde(alias = "run_transvar")]
    pub annotation: bool,
    #[serde(alias = "run_sarj")]
    pub structure_generation: bool,
    #[serde(alias = "run_tps")]
    pub kb_processing: bool,
    #[serde(alias = "run_json_conversion")]
    pub format_conversion: bool,
    #[serde(alias = "run_report_extraction")]
    pub report_extraction: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            annotation: true,
            structure_generation: true,
            kb_processing: true,
            format_conversion: true,
            report_extraction: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcfConfig {
    /// Add VARIANT_TYPE/AUTO_GENERATED INFO keys and the automation scope header lines.
    pub enhanced: bool,
}

impl Default for VcfConfig {
    fn default() -> Self {
        Self {
            enhanced: env_flag("VCF_ENHANCED").unwrap_or(true),
        }
    }
}

/// JSON to CSV conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Flatten per-knowledge-base JSON in-process instead of running the script.
    pub builtin: bool,
    /// Interpreter the converter script is run with.
    pub interpreter: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            builtin: env_flag("CONVERSION_BUILTIN").unwrap_or(false),
            interpreter: env_var("CONVERTER_INTERPRETER").unwrap_or_else(|| "python3".to_string()),
        }
    }
}

/// How to choose among the transcripts an annotator reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptPreferences {
    /// Accession prefixes treated as preferred, highest priority first.
    pub preferred_prefixes: Vec<String>,
    pub use_mane_select: bool,
    pub use_mane_plus_clinical: bool,
    pub use_ensembl_canonical: bool,
    /// Versioned MANE Select accessions.
    pub mane_select: Vec<String>,
    /// Versioned MANE Plus Clinical accessions.
    pub mane_plus_clinical: Vec<String>,
}

impl Default for TranscriptPreferences {
    fn default() -> Self {
        let owned = |ids: &[&str]| -> Vec<String> { ids.iter().map(|s| s.to_string()).collect() };
        Self {
            preferred_prefixes: owned(&["NM_", "ENST", "uc", "NR_"]),
            use_mane_select: true,
            use_mane_plus_clinical: true,
            use_ensembl_canonical: true,
            mane_select: owned(&["NM_000059.3", "NM_007294.3", "NM_000314.6", "NM_004333.4"]),
            mane_plus_clinical: owned(&["NM_000038.5", "NM_000222.2"]),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub annotator: AnnotatorConfig,
    pub processing: ProcessingConfig,
    pub paths: PathConfig,
    pub knowledge_bases: Vec<KnowledgeBaseSpec>,
    pub stages: StageToggles,
    pub vcf: VcfConfig,
    pub conversion: ConversionConfig,
    /// Ranking applied when neither the input nor `preferred_transcripts`
    /// names a transcript.
    pub transcripts: TranscriptPreferences,
    /// Gene symbol to transcript, used when an input row names no transcript.
    pub preferred_transcripts: BTreeMap<String, String>,
    /// File this configuration was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotator: AnnotatorConfig::default(),
            processing: ProcessingConfig::default(),
            paths: PathConfig::default(),
            knowledge_bases: default_knowledge_bases(),
            stages: StageToggles::default(),
            vcf: VcfConfig::default(),
            conversion: ConversionConfig::default(),
            transcripts: TranscriptPreferences::default(),
            preferred_transcripts: BTreeMap::new(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load from a file, or defaults plus environment when `path` is `None`.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    /// The format is chosen from the extension; anything unknown is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?,
        };

        config.source_path = Some(path.to_path_buf());
        config.expand_paths();
        Ok(config)
    }

    /// Directory relative paths in the file are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative or start with `~`.
    pub fn resolve_path(path: &Path, base_dir: Option<&Path>) -> PathBuf {
        let raw = path.to_string_lossy();
        let expanded = shellexpand::tilde(raw.as_ref());
        let path = Path::new(expanded.as_ref());

        match base_dir {
            Some(base) if path.is_relative() && path.components().count() > 1 => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Expand `~` and resolve multi-component relative paths against the
    /// config file's directory. Bare names (`transvar`) are left for `PATH` lookup.
    fn expand_paths(&mut self) {
        let base = self.base_dir();
        let base = base.as_deref();
        let resolve = |p: &Path| Self::resolve_path(p, base);

        self.annotator.executable = resolve(&self.annotator.executable);
        self.annotator.reference_file = self.annotator.reference_file.as_deref().map(resolve);
        self.paths.structure_script = self.paths.structure_script.as_deref().map(resolve);
        self.paths.kb_processor = self.paths.kb_processor.as_deref().map(resolve);
        self.paths.converter_script = self.paths.converter_script.as_deref().map(resolve);
        self.paths.output_dir = resolve(&self.paths.output_dir);
        for kb in &mut self.knowledge_bases {
            kb.path = resolve(&kb.path);
        }
    }

    /// Check value ranges and knowledge-base versions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let processing = &self.processing;
        if !(1..=32).contains(&processing.max_workers) {
            return Err(ConfigError::Invalid(format!(
                "max_workers must be between 1 and 32, got {}",
                processing.max_workers
            )));
        }
        if !(1..=MAX_TIMEOUT_SECONDS).contains(&processing.timeout_seconds) {
            return Err(ConfigError::Invalid(format!(
                "timeout_seconds must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECONDS, processing.timeout_seconds
            )));
        }
        if processing.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry_attempts must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kb in &self.knowledge_bases {
            if kb.version.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "knowledge base version must not be empty".to_string(),
                ));
            }
            if !is_safe_version(&kb.version) {
                return Err(ConfigError::Invalid(format!(
                    "knowledge base version '{}' must not contain path separators or '..'",
                    kb.version
                )));
            }
            if !seen.insert(kb.version.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate knowledge base version '{}'",
                    kb.version
                )));
            }
        }

        Ok(())
    }

    pub fn base_timeout(&self) -> Duration {
        Duration::from_secs(self.processing.timeout_seconds)
    }

    /// Timeout for one call of `tool`.
    pub fn tool_timeout(&self, tool: ToolKind) -> Duration {
        tool.timeout(self.base_timeout())
    }

    /// Retry policy for `tool`. Slower tools back off longer and the
    /// knowledge-base processor gets one attempt fewer; conversion is not retried.
    pub fn retry_policy(&self, tool: ToolKind) -> RetryPolicy {
        let attempts = self.processing.retry_attempts.max(1);
        let base = Duration::from_millis(self.processing.retry_base_delay_ms);
        match tool {
            ToolKind::Annotator => RetryPolicy::new(attempts, base),
            ToolKind::StructureGenerator => RetryPolicy::new(attempts, base.saturating_mul(2)),
            ToolKind::KnowledgeBase => {
                RetryPolicy::new(attempts.saturating_sub(1).max(1), base.saturating_mul(3))
            }
            ToolKind::Converter => RetryPolicy::once(),
        }
    }

    /// Pretty TOML rendering for `varimpact config`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Versions name output files, so they must stay a single path component.
fn is_safe_version(version: &str) -> bool {
    !version.contains(['/', '\\']) && !version.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.annotator.database, DatabaseType::Refseq);
        assert_eq!(config.annotator.reference_version, ReferenceVersion::Hg38);
        assert_eq!(config.knowledge_bases.len(), 2);
        assert_eq!(config.knowledge_bases[0].version, "cosmic_v97");
        assert!(config.stages.report_extraction);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_annotator_flags() {
        let annotator = AnnotatorConfig {
            executable: PathBuf::from("transvar"),
            database: DatabaseType::Ensembl,
            reference_version: ReferenceVersion::Hg19,
            use_ccds: true,
            reference_file: Some(PathBuf::from("/ref/hg19.fa")),
            custom_flags: vec!["--noheader".to_string()],
        };
        assert_eq!(
            annotator.flags(),
            vec![
                "--ensembl",
                "--refversion",
                "hg19",
                "--ccds",
                "--reference",
                "/ref/hg19.fa",
                "--noheader"
            ]
        );
    }

    #[test]
    fn test_closed_enums_parse() {
        assert_eq!("UCSC".parse::<DatabaseType>().unwrap(), DatabaseType::Ucsc);
        assert_eq!("GRCh37".parse::<ReferenceVersion>().unwrap(), ReferenceVersion::Hg19);
        assert!("hg17".parse::<ReferenceVersion>().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let mut config = Config::default();
        config.processing.max_workers = 0;
        assert!(config.validate().is_err());
        config.processing.max_workers = 33;
        assert!(config.validate().is_err());
        config.processing.max_workers = 8;
        config.processing.retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_kb_versions_rejected() {
        let mut config = Config::default();
        config.knowledge_bases = vec![
            KnowledgeBaseSpec::new("v1", "/a"),
            KnowledgeBaseSpec::new("v1", "/b"),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate knowledge base version 'v1'"));
    }

    #[test]
    fn test_kb_versions_must_be_file_safe() {
        for version in ["../../escaped", "kb/a", "kb\\a", "..", "v1..v2"] {
            let mut config = Config::default();
            config.knowledge_bases = vec![KnowledgeBaseSpec::new(version, "/kb")];
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("path separators"), "{}", version);
        }

        let mut config = Config::default();
        config.knowledge_bases = vec![KnowledgeBaseSpec::new("clinvar_2023.08", "/kb")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_upper_bound() {
        let mut config = Config::default();
        config.processing.timeout_seconds = MAX_TIMEOUT_SECONDS + 1;
        assert!(config.validate().is_err());
        config.processing.timeout_seconds = MAX_TIMEOUT_SECONDS;
        assert!(config.validate().is_ok());

        config.processing.timeout_seconds = u64::MAX;
        assert_eq!(config.tool_timeout(ToolKind::KnowledgeBase), Duration::MAX);
    }

    #[test]
    fn test_retry_policies_per_tool() {
        let mut config = Config::default();
        config.processing.retry_attempts = 3;
        config.processing.retry_base_delay_ms = 1000;

        let kb = config.retry_policy(ToolKind::KnowledgeBase);
        assert_eq!(kb.max_attempts, 2);
        assert_eq!(kb.base_delay, Duration::from_secs(3));
        assert_eq!(config.retry_policy(ToolKind::Converter).max_attempts, 1);
        assert_eq!(
            config.retry_policy(ToolKind::StructureGenerator).base_delay,
            Duration::from_secs(2)
        );
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varimpact.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[annotator]
executable = "bin/transvar"
database = "ucsc"

[processing]
max_workers = 2

[[knowledge_bases]]
version = "kb_a"
path = "/data/kb_a"

[stages]
run_report_extraction = false

[preferred_transcripts]
BRAF = "NM_004333.4"
"#
        )
        .unwrap();

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.annotator.database, DatabaseType::Ucsc);
        assert_eq!(config.annotator.executable, dir.path().join("bin/transvar"));
        assert_eq!(config.processing.max_workers, 2);
        assert_eq!(config.knowledge_bases.len(), 1);
        assert!(!config.stages.report_extraction);
        assert_eq!(
            config.preferred_transcripts.get("BRAF").map(String::as_str),
            Some("NM_004333.4")
        );
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "processing:\n  timeout_seconds: 60\n").unwrap();
        let config = Config::load(Some(&yaml)).await.unwrap();
        assert_eq!(config.processing.timeout_seconds, 60);

        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"vcf": {"enhanced": false}}"#).unwrap();
        let config = Config::load(Some(&json)).await.unwrap();
        assert!(!config.vcf.enhanced);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(matches!(
            Config::load(Some(&path)).await,
            Err(ConfigError::Parse { format: "TOML", .. })
        ));
        assert!(matches!(
            Config::load(Some(&dir.path().join("missing.toml"))).await,
            Err(ConfigError::Read { .. })
        ));
    }
}
