//! TOML configuration deserialisation for Hall-number jobs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use tbhall_core::types::{ChemicalPotentialSweep, HoppingParameters, DEFAULT_RESOLUTION};
use tbhall_core::ModelParams;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub reference: Option<ReferenceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Model parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// `[t, t', t'']`.
    #[serde(default = "default_hoppings")]
    pub hoppings: [f64; 3],
    #[serde(default = "default_broadening")]
    pub broadening: f64,
    #[serde(default)]
    pub omega: f64,
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    #[serde(default)]
    pub use_filter: bool,
    #[serde(default)]
    pub use_reference: bool,
    /// Required unless `use_reference` is set.
    #[serde(default)]
    pub mus: Option<MuSpec>,
    /// Compute backend: "cpu" or "serial". Default: "cpu".
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_hoppings() -> [f64; 3] {
    [1.0, -0.3, 0.2]
}
fn default_broadening() -> f64 {
    0.1
}
fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}
fn default_backend() -> String {
    "cpu".into()
}

/// Chemical-potential specification: either a range or explicit list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MuSpec {
    Range { start: f64, stop: f64, step: f64 },
    List { values: Vec<f64> },
}

impl From<&MuSpec> for ChemicalPotentialSweep {
    fn from(spec: &MuSpec) -> Self {
        match spec {
            MuSpec::Range { start, stop, step } => ChemicalPotentialSweep::Range {
                start: *start,
                stop: *stop,
                step: *step,
            },
            MuSpec::List { values } => ChemicalPotentialSweep::List(values.clone()),
        }
    }
}

/// Location of reference spectral-weight files.
#[derive(Debug, Deserialize)]
pub struct ReferenceConfig {
    pub directory: PathBuf,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the Hall curve as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save transport coefficients as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Synthetic model parameters. Fails when no sweep is given.
    pub fn model_params(&self) -> anyhow::Result<ModelParams> {
        let m = &self.model;
        let mus = m
            .mus
            .as_ref()
            .context("[model] needs 'mus' unless use_reference = true")?;
        Ok(
            ModelParams::new(HoppingParameters::from(m.hoppings), m.broadening, mus.into())
                .with_omega(m.omega)
                .with_resolution(m.resolution)
                .with_filter(m.use_filter),
        )
    }

    /// Reference data directory. Fails when the section is missing.
    pub fn reference_directory(&self) -> anyhow::Result<&Path> {
        match &self.reference {
            Some(r) => Ok(r.directory.as_path()),
            None => bail!("use_reference = true requires a [reference] section with 'directory'"),
        }
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_job_with_defaults() {
        let job: JobConfig = toml::from_str(
            r#"
            [model]
            hoppings = [1.0, -0.25, 0.1]
            broadening = 0.05
            mus = { start = -4.0, stop = 4.0, step = 0.05 }
            "#,
        )
        .unwrap();

        assert_eq!(job.model.resolution, 600);
        assert_eq!(job.model.omega, 0.0);
        assert!(!job.model.use_filter);
        assert!(!job.model.use_reference);
        assert_eq!(job.model.backend, "cpu");
        assert_eq!(job.output.directory, "./output");
        assert!(job.output.save_csv);
        assert!(!job.output.save_json);

        let params = job.model_params().unwrap();
        assert_eq!(params.hoppings, HoppingParameters::new(1.0, -0.25, 0.1));
        assert_eq!(params.validate().unwrap().len(), 160);
    }

    #[test]
    fn test_value_list_job() {
        let job: JobConfig = toml::from_str(
            r#"
            [model]
            broadening = 0.1
            resolution = 64
            use_filter = true
            mus = { values = [-1.0, 0.0, 1.0] }
            backend = "serial"

            [output]
            directory = "runs/a"
            save_json = true
            "#,
        )
        .unwrap();

        let params = job.model_params().unwrap();
        assert_eq!(params.hoppings, HoppingParameters::REFERENCE);
        assert_eq!(params.sweep, ChemicalPotentialSweep::List(vec![-1.0, 0.0, 1.0]));
        assert!(params.use_filter);
        assert_eq!(params.resolution, 64);
        assert!(job.output.save_json);
    }

    #[test]
    fn test_missing_sweep_is_an_error() {
        let job: JobConfig = toml::from_str("[model]\nbroadening = 0.1\n").unwrap();
        assert!(job.model_params().is_err());
        assert!(job.reference_directory().is_err());
    }

    #[test]
    fn test_reference_job() {
        let job: JobConfig = toml::from_str(
            r#"
            [model]
            use_reference = true

            [reference]
            directory = "data/fermi_arcs"
            "#,
        )
        .unwrap();
        assert!(job.model.use_reference);
        assert_eq!(job.reference_directory().unwrap(), Path::new("data/fermi_arcs"));
    }
}
