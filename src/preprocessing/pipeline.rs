//! Pipeline for chaining frame transformers.
//!
//! A Pipeline runs its steps in order, the output frame of one step feeding
//! the next. Fitting fits each step on the output of the steps before it.
//! Column names survive every step, so a pipeline can drop identifier
//! columns and then standardize what is left.
//!
//! # Example
//! ```ignore
//! use pipeline_transforms::preprocessing::{DropColumns, Pipeline, StandardScaler};
//!
//! let mut pipeline = Pipeline::new()
//!     .add_drop_columns(DropColumns::new(["id"]))
//!     .add_standard_scaler(StandardScaler::new());
//!
//! pipeline.fit(&train)?;
//! let ready = pipeline.transform(&test)?;
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Dataset, Frame};
use crate::preprocessing::columns::{DropColumns, DropColumnsConfig};
use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::scaling::{StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{
    IncrementalTransformer, InvertibleTransformer, PersistableTransformer, Transformer,
};

/// A step in the pipeline.
#[derive(Clone, Debug)]
pub enum PipelineStep {
    /// DropColumns step.
    DropColumns(DropColumns),
    /// StandardScaler step applied to every remaining column.
    StandardScaler(StandardScaler),
}

impl PipelineStep {
    /// Get the step name for debugging.
    pub fn step_name(&self) -> &'static str {
        match self {
            PipelineStep::DropColumns(_) => "DropColumns",
            PipelineStep::StandardScaler(_) => "StandardScaler",
        }
    }

    fn fit(&mut self, frame: &Frame) -> Result<()> {
        match self {
            PipelineStep::DropColumns(_) => Ok(()),
            PipelineStep::StandardScaler(scaler) => {
                scaler.fit(&Dataset::dense(frame.values().clone()))?;
                Ok(())
            }
        }
    }

    fn partial_fit(&mut self, frame: &Frame) -> Result<()> {
        match self {
            PipelineStep::DropColumns(_) => Ok(()),
            PipelineStep::StandardScaler(scaler) => {
                scaler.partial_fit(&Dataset::dense(frame.values().clone()))?;
                Ok(())
            }
        }
    }

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        match self {
            PipelineStep::DropColumns(dropper) => dropper.transform(frame),
            PipelineStep::StandardScaler(scaler) => {
                let mut data = Dataset::dense(frame.values().clone());
                scaler.transform_inplace(&mut data)?;
                frame.with_values(data.into_dense())
            }
        }
    }

    fn inverse_transform(&self, frame: &Frame) -> Result<Frame> {
        match self {
            PipelineStep::DropColumns(_) => Err(PreprocessingError::InvalidConfiguration(
                "DropColumns cannot be inverted: dropped columns are gone".to_string(),
            )),
            PipelineStep::StandardScaler(scaler) => {
                let mut data = Dataset::dense(frame.values().clone());
                scaler.inverse_transform_inplace(&mut data)?;
                frame.with_values(data.into_dense())
            }
        }
    }
}

/// Serializable form of a [`PipelineStep`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PipelineStepParams {
    /// DropColumns configuration.
    DropColumns(DropColumnsConfig),
    /// StandardScaler configuration and learned state.
    StandardScaler(StandardScalerParams),
}

/// Serializable representation of a pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Steps in execution order.
    pub steps: Vec<PipelineStepParams>,
}

/// Ordered chain of frame transformers.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Create a new empty Pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn add(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a DropColumns step.
    pub fn add_drop_columns(self, dropper: DropColumns) -> Self {
        self.add(PipelineStep::DropColumns(dropper))
    }

    /// Append a StandardScaler step.
    pub fn add_standard_scaler(self, scaler: StandardScaler) -> Self {
        self.add(PipelineStep::StandardScaler(scaler))
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fit every step from scratch, each on the output of the previous ones.
    pub fn fit(&mut self, frame: &Frame) -> Result<&mut Self> {
        self.fit_steps(frame, PipelineStep::fit)?;
        Ok(self)
    }

    /// Fold a new batch into every step.
    pub fn partial_fit(&mut self, frame: &Frame) -> Result<&mut Self> {
        self.fit_steps(frame, PipelineStep::partial_fit)?;
        Ok(self)
    }

    fn fit_steps<F>(&mut self, frame: &Frame, mut fit_step: F) -> Result<()>
    where
        F: FnMut(&mut PipelineStep, &Frame) -> Result<()>,
    {
        let n_steps = self.steps.len();
        let mut current = frame.clone();
        for (i, step) in self.steps.iter_mut().enumerate() {
            fit_step(step, &current)?;
            debug!(step = step.step_name(), index = i, "Pipeline: fitted step");
            if i + 1 < n_steps {
                current = step.transform(&current)?;
            }
        }
        Ok(())
    }

    /// Run every step in order.
    pub fn transform(&self, frame: &Frame) -> Result<Frame> {
        self.steps
            .iter()
            .try_fold(frame.clone(), |current, step| step.transform(&current))
    }

    /// Undo every step in reverse order.
    ///
    /// Fails if any step is not invertible (DropColumns).
    pub fn inverse_transform(&self, frame: &Frame) -> Result<Frame> {
        self.steps
            .iter()
            .rev()
            .try_fold(frame.clone(), |current, step| step.inverse_transform(&current))
    }
}

impl Transformer for Pipeline {
    type Input = Frame;
    type Output = Frame;

    fn fit(&mut self, data: &Frame) -> Result<&mut Self> {
        Pipeline::fit(self, data)
    }

    fn transform(&self, data: &Frame) -> Result<Frame> {
        Pipeline::transform(self, data)
    }
}

impl IncrementalTransformer for Pipeline {
    fn partial_fit(&mut self, data: &Frame) -> Result<&mut Self> {
        Pipeline::partial_fit(self, data)
    }
}

impl InvertibleTransformer for Pipeline {
    fn inverse_transform(&self, data: &Frame) -> Result<Frame> {
        Pipeline::inverse_transform(self, data)
    }
}

impl PersistableTransformer for Pipeline {
    type Params = PipelineParams;

    fn extract_params(&self) -> PipelineParams {
        PipelineParams {
            steps: self
                .steps
                .iter()
                .map(|step| match step {
                    PipelineStep::DropColumns(d) => {
                        PipelineStepParams::DropColumns(d.extract_params())
                    }
                    PipelineStep::StandardScaler(s) => {
                        PipelineStepParams::StandardScaler(s.extract_params())
                    }
                })
                .collect(),
        }
    }

    fn from_params(params: PipelineParams) -> Result<Self> {
        let steps = params
            .steps
            .into_iter()
            .map(|step| match step {
                PipelineStepParams::DropColumns(p) => {
                    DropColumns::from_params(p).map(PipelineStep::DropColumns)
                }
                PipelineStepParams::StandardScaler(p) => {
                    StandardScaler::from_params(p).map(PipelineStep::StandardScaler)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }
}
