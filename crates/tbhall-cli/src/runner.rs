//! Job runner: builds the model from a parsed configuration and writes its
//! results.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use tbhall_arcs::{flatten_arcs, ArcSource, NpyArcDirectory};
use tbhall_compute::{ComputeBackend, CpuBackend, SerialBackend};
use tbhall_core::types::TransportCoefficients;
use tbhall_core::{Model, ModelSource};

use crate::config::JobConfig;

/// Build and evaluate the model a job describes.
pub fn run_job(job: &JobConfig) -> Result<Model> {
    let backend = create_backend(&job.model.backend)?;
    let builder = Model::builder().with_backend(backend);

    let model = if job.model.use_reference {
        let directory = job.reference_directory()?;
        println!("Reference data: {}", directory.display());
        let source = NpyArcDirectory::new(directory);
        builder
            .reference(&source)
            .with_context(|| {
                format!("Failed to build reference model from {}", directory.display())
            })?
    } else {
        let params = job.model_params()?;
        let h = params.hoppings;
        println!(
            "Hoppings: t={}, t'={}, t''={}  eta={}  omega={}  grid={}x{}{}",
            h.t,
            h.t_prime,
            h.t_double_prime,
            params.broadening,
            params.omega,
            params.resolution,
            params.resolution,
            if params.use_filter { "  (Fermi-arc filter)" } else { "" }
        );
        builder.synthetic(&params)?
    };

    let curve = model.hall_curve();
    let step = (curve.len() / 10).max(1);
    for (i, point) in curve.iter().enumerate() {
        if i % step == 0 || i == curve.len() - 1 {
            println!(
                "  [{}/{}] mu={:.3}{}: doping={:.4}, n_H={:.4}",
                i + 1,
                curve.len(),
                point.mu,
                point.label.as_deref().map(|l| format!(" ({l})")).unwrap_or_default(),
                point.doping,
                point.hall_number
            );
        }
    }

    Ok(model)
}

/// Check a job without running the pipeline.
pub fn validate_job(job: &JobConfig) -> Result<()> {
    create_backend(&job.model.backend)?;
    if job.model.use_reference {
        let source = NpyArcDirectory::new(job.reference_directory()?);
        let files = source.files()?;
        if files.is_empty() {
            bail!("No .npy files in {}", source.directory().display());
        }
        println!("Reference files: {}", files.len());
    } else {
        let mus = job.model_params()?.validate()?;
        println!("Chemical potentials: {}", mus.len());
    }
    Ok(())
}

/// Write the Hall curve with a metadata header.
pub fn write_hall_csv(model: &Model, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# tbhall Hall-number sweep")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    let h = model.hoppings();
    writeln!(
        file,
        "# hoppings: t={}, t'={}, t''={}",
        h.t, h.t_prime, h.t_double_prime
    )?;
    match model.source() {
        ModelSource::Synthetic { broadening, omega, masks } => {
            let filtered = masks.filter.iter().any(|&v| v == 0.0);
            writeln!(file, "# broadening: {broadening}, omega: {omega}, filter: {filtered}")?;
        }
        ModelSource::Reference { source, .. } => {
            writeln!(file, "# reference: {source}")?;
        }
    }
    writeln!(file, "# grid: {0}x{0}", model.grid().resolution())?;
    writeln!(file, "#")?;

    let has_labels = model.labels().is_some();
    if has_labels {
        writeln!(file, "mu,label,density,doping,sigma_xx,sigma_yy,sigma_xy,hall_number")?;
    } else {
        writeln!(file, "mu,density,doping,sigma_xx,sigma_yy,sigma_xy,hall_number")?;
    }

    for (point, t) in model.hall_curve().iter().zip(model.transport()) {
        write!(file, "{:.6},", point.mu)?;
        if let Some(label) = &point.label {
            write!(file, "{label},")?;
        }
        writeln!(
            file,
            "{:.6},{:.6},{:.6e},{:.6e},{:.6e},{:.6}",
            t.density, point.doping, t.sigma_xx, t.sigma_yy, t.sigma_xy, t.hall_number
        )?;
    }

    println!("Hall curve written to: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct TransportRecord<'a> {
    mu: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    doping: f64,
    #[serde(flatten)]
    coefficients: TransportCoefficients,
}

/// Write per-μ transport coefficients to a JSON file. Non-finite Hall
/// numbers are written as `null`.
pub fn write_transport_json(model: &Model, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let curve = model.hall_curve();
    let records: Vec<TransportRecord<'_>> = curve
        .iter()
        .zip(model.transport())
        .map(|(point, t)| TransportRecord {
            mu: point.mu,
            label: point.label.as_deref(),
            doping: point.doping,
            coefficients: *t,
        })
        .collect();

    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Transport (JSON) written to: {}", path.display());
    Ok(())
}

/// Rewrite every array in `src` as a flat `.npy` file under `dst`.
pub fn flatten_directory(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let arcs = NpyArcDirectory::new(src).load_all()?;
    let written = flatten_arcs(&arcs, dst)?;
    println!("Flattened {} arrays into {}", written.len(), dst.display());
    Ok(written)
}

/// Print the configurations found in a reference directory.
pub fn describe_directory(dir: &Path) -> Result<()> {
    let source = NpyArcDirectory::new(dir);
    let arcs = source.load_all()?;
    println!("{}:", source.name());
    for (label, array) in &arcs {
        let (rows, cols) = array.dim();
        let total: f64 = array.sum();
        println!("  {label:<8} {rows}x{cols}  sum={total:.4e}");
    }
    Ok(())
}

/// Create a compute backend based on the user's preference string.
///
/// - `"cpu"`: Rayon thread pool.
/// - `"serial"`: single thread.
fn create_backend(preference: &str) -> Result<Arc<dyn ComputeBackend>> {
    match preference {
        "cpu" => {
            let cpu = CpuBackend::new();
            println!("Backend: {}", cpu.device_info().name);
            Ok(Arc::new(cpu))
        }
        "serial" => {
            println!("Backend: serial");
            Ok(Arc::new(SerialBackend))
        }
        other => bail!("Unknown backend '{}'. Valid values: cpu, serial", other),
    }
}
