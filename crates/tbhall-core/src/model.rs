//! The model facade.
//!
//! A [`Model`] is built once from either synthetic parameters or a reference
//! data source, runs the full pipeline at construction, and afterwards only
//! answers read-only queries.
//!
//! | Mode | Energies | Spectral weight | Doping |
//! |------|----------|-----------------|--------|
//! | Synthetic | dispersion over the sweep | Lorentzian, optionally filtered | `1 - density` |
//! | Reference | dispersion at fixed μ | loaded arrays | `1 - filling` |

use std::sync::Arc;
use std::time::Instant;

use log::info;
use ndarray::{Array1, ArrayView2};
use tbhall_arcs::{ArcSource, REFERENCE_GRID};
use tbhall_compute::{default_backend, ComputeBackend, DeviceInfo};

use crate::dispersion::{band_energy, derivatives};
use crate::error::ModelError;
use crate::spectral::{fermi_arc_masks, from_reference, spectral_weight};
use crate::transport::transport;
use crate::types::{
    BandEnergy, ChemicalPotentialSweep, DispersionDerivatives, FermiArcMasks, HallCurve,
    HallPoint, HoppingParameters, MomentumGrid, SpectralWeight, TransportCoefficients,
    DEFAULT_RESOLUTION,
};

/// Broadening the reference spectral weight was produced with.
pub const REFERENCE_BROADENING: f64 = 0.1;

/// Chemical potentials paired with the reference configurations.
pub const REFERENCE_MUS: [f64; 5] = [-1.3, -1.0, -0.75, -0.4, 0.0];

/// Band fillings of the reference configurations, in label order.
pub const REFERENCE_FILLINGS: [f64; 5] = [2.0 / 3.0, 7.0 / 9.0, 5.0 / 6.0, 8.0 / 9.0, 1.0];

/// Parameters of a synthetic model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub hoppings: HoppingParameters,
    /// Lorentzian half-width η. Must be finite and positive.
    pub broadening: f64,
    /// Frequency ω at which the spectral function is evaluated.
    pub omega: f64,
    pub sweep: ChemicalPotentialSweep,
    pub resolution: usize,
    pub use_filter: bool,
}

impl ModelParams {
    pub fn new(
        hoppings: HoppingParameters,
        broadening: f64,
        sweep: ChemicalPotentialSweep,
    ) -> Self {
        Self {
            hoppings,
            broadening,
            omega: 0.0,
            sweep,
            resolution: DEFAULT_RESOLUTION,
            use_filter: false,
        }
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_filter(mut self, use_filter: bool) -> Self {
        self.use_filter = use_filter;
        self
    }

    /// Check every numeric parameter and expand the sweep.
    pub fn validate(&self) -> Result<Vec<f64>, ModelError> {
        if !(self.broadening.is_finite() && self.broadening > 0.0) {
            return Err(ModelError::InvalidBroadening(self.broadening));
        }
        if !self.omega.is_finite() {
            return Err(ModelError::InvalidFrequency(self.omega));
        }
        if self.resolution == 0 {
            return Err(ModelError::InvalidResolution(self.resolution));
        }
        self.sweep.values()
    }
}

/// Where a model's spectral weight came from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Synthetic {
        broadening: f64,
        omega: f64,
        masks: FermiArcMasks,
    },
    Reference {
        /// Name of the data source.
        source: String,
        /// Configuration labels, in the order of the weight slices.
        labels: Vec<String>,
        fillings: Vec<f64>,
    },
}

/// Chooses the compute backend before a [`Model`] is built.
pub struct ModelBuilder {
    backend: Arc<dyn ComputeBackend>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl ModelBuilder {
    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Build a model with Lorentzian spectral weight.
    pub fn synthetic(self, params: &ModelParams) -> Result<Model, ModelError> {
        let mus = params.validate()?;
        let start = Instant::now();
        let backend = self.backend;

        let grid = MomentumGrid::new(params.resolution)?;
        let energies = band_energy(backend.as_ref(), &params.hoppings, &grid, &mus)?;
        let derivatives = derivatives(&params.hoppings, &grid);
        let masks = fermi_arc_masks(&grid, params.use_filter);
        let weights = spectral_weight(
            backend.as_ref(),
            &energies,
            &masks,
            params.omega,
            params.broadening,
        )?;
        let transport = transport(
            backend.as_ref(),
            &energies,
            &weights,
            &derivatives,
            grid.norm(),
        )?;

        info!(
            "synthetic model: {} mu values on {}x{} grid (eta {}, filter {}) on {} in {:.1?}",
            mus.len(),
            grid.resolution(),
            grid.resolution(),
            params.broadening,
            params.use_filter,
            backend.device_info().name,
            start.elapsed()
        );

        Ok(Model {
            backend,
            hoppings: params.hoppings,
            grid,
            mus,
            source: ModelSource::Synthetic {
                broadening: params.broadening,
                omega: params.omega,
                masks,
            },
            energies,
            derivatives,
            weights,
            transport,
        })
    }

    /// Build a model from externally supplied spectral weight.
    ///
    /// Hoppings, grid and chemical potentials are fixed to the values the
    /// reference data was produced with; the source must provide exactly one
    /// configuration per entry of [`REFERENCE_FILLINGS`].
    pub fn reference(self, source: &dyn ArcSource) -> Result<Model, ModelError> {
        let start = Instant::now();
        let backend = self.backend;

        let arcs = source.load_all()?;
        if arcs.len() != REFERENCE_FILLINGS.len() {
            return Err(ModelError::ReferenceMismatch {
                labels: arcs.len(),
                fillings: REFERENCE_FILLINGS.len(),
            });
        }

        let hoppings = HoppingParameters::REFERENCE;
        let mus = REFERENCE_MUS.to_vec();
        let grid = MomentumGrid::new(REFERENCE_GRID)?;
        let weights = from_reference(&arcs, REFERENCE_GRID)?;
        let energies = band_energy(backend.as_ref(), &hoppings, &grid, &mus)?;
        let derivatives = derivatives(&hoppings, &grid);
        let transport = transport(
            backend.as_ref(),
            &energies,
            &weights,
            &derivatives,
            grid.norm(),
        )?;

        let labels = arcs.labels();
        info!(
            "reference model from {}: configurations {:?} in {:.1?}",
            source.name(),
            labels,
            start.elapsed()
        );

        Ok(Model {
            backend,
            hoppings,
            grid,
            mus,
            source: ModelSource::Reference {
                source: source.name().to_string(),
                labels,
                fillings: REFERENCE_FILLINGS.to_vec(),
            },
            energies,
            derivatives,
            weights,
            transport,
        })
    }
}

/// A fully evaluated tight-binding transport model.
pub struct Model {
    backend: Arc<dyn ComputeBackend>,
    hoppings: HoppingParameters,
    grid: MomentumGrid,
    mus: Vec<f64>,
    source: ModelSource,
    energies: BandEnergy,
    derivatives: DispersionDerivatives,
    weights: SpectralWeight,
    transport: Vec<TransportCoefficients>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Synthetic model on the default backend.
    pub fn synthetic(params: &ModelParams) -> Result<Self, ModelError> {
        Self::builder().synthetic(params)
    }

    /// Reference model on the default backend.
    pub fn reference(source: &dyn ArcSource) -> Result<Self, ModelError> {
        Self::builder().reference(source)
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.source, ModelSource::Reference { .. })
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.backend.device_info()
    }

    pub fn hoppings(&self) -> &HoppingParameters {
        &self.hoppings
    }

    /// Lorentzian broadening in use, or the one the reference data assumes.
    pub fn broadening(&self) -> f64 {
        match &self.source {
            ModelSource::Synthetic { broadening, .. } => *broadening,
            ModelSource::Reference { .. } => REFERENCE_BROADENING,
        }
    }

    pub fn grid(&self) -> &MomentumGrid {
        &self.grid
    }

    pub fn mus(&self) -> &[f64] {
        &self.mus
    }

    /// Reference configuration labels; `None` for synthetic models.
    pub fn labels(&self) -> Option<&[String]> {
        match &self.source {
            ModelSource::Reference { labels, .. } => Some(labels),
            ModelSource::Synthetic { .. } => None,
        }
    }

    pub fn energies(&self) -> &BandEnergy {
        &self.energies
    }

    pub fn derivatives(&self) -> &DispersionDerivatives {
        &self.derivatives
    }

    pub fn weights(&self) -> &SpectralWeight {
        &self.weights
    }

    /// Diamond masks; synthetic models only.
    pub fn masks(&self) -> Option<&FermiArcMasks> {
        match &self.source {
            ModelSource::Synthetic { masks, .. } => Some(masks),
            ModelSource::Reference { .. } => None,
        }
    }

    pub fn transport(&self) -> &[TransportCoefficients] {
        &self.transport
    }

    fn collect(&self, f: impl Fn(&TransportCoefficients) -> f64) -> Array1<f64> {
        self.transport.iter().map(f).collect()
    }

    pub fn density(&self) -> Array1<f64> {
        self.collect(|t| t.density)
    }

    /// `1 - density`, or `1 - filling` for reference models.
    pub fn doping(&self) -> Array1<f64> {
        match &self.source {
            ModelSource::Synthetic { .. } => self.collect(|t| 1.0 - t.density),
            ModelSource::Reference { fillings, .. } => fillings.iter().map(|f| 1.0 - f).collect(),
        }
    }

    pub fn hall_number(&self) -> Array1<f64> {
        self.collect(|t| t.hall_number)
    }

    pub fn sigma_xx(&self) -> Array1<f64> {
        self.collect(|t| t.sigma_xx)
    }

    pub fn sigma_yy(&self) -> Array1<f64> {
        self.collect(|t| t.sigma_yy)
    }

    pub fn sigma_xy(&self) -> Array1<f64> {
        self.collect(|t| t.sigma_xy)
    }

    /// Doping against Hall number, one point per slice.
    pub fn hall_curve(&self) -> HallCurve {
        let doping = self.doping();
        let labels = self.labels();
        self.transport
            .iter()
            .enumerate()
            .map(|(i, t)| HallPoint {
                mu: self.mus[i],
                label: labels.map(|l| l[i].clone()),
                doping: doping[i],
                hall_number: t.hall_number,
            })
            .collect()
    }

    /// Spectral weight of the slice whose μ is closest to `mu`.
    ///
    /// Returns the matched μ with the slice, or `None` for a NaN target.
    pub fn spectral_slice_near(&self, mu: f64) -> Option<(f64, ArrayView2<'_, f64>)> {
        if mu.is_nan() {
            return None;
        }
        let (index, &nearest) = self
            .mus
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - mu).abs().total_cmp(&(*b - mu).abs()))?;
        Some((nearest, self.weights.slice(index)))
    }
}
