//! Human-created vs AI-generated image detection
//!
//! [`AuthenticityChecker`] turns an [`ImageClassifier`] into the normalized
//! [`AuthenticityOutcome`] stored on each figure. Every failure becomes an
//! error label with confidence 0.0 rather than an `Err`.
//!
//! # Example
//! ```no_run
//! use paperlens_authenticity::{AuthenticityChecker, OnnxImageClassifier};
//! use paperlens_common::hub::resolve_model;
//! use paperlens_common::{Config, ServiceHandle};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let classifier = resolve_model(&config.models, &config.models.image_detector)
//!     .map_err(Into::into)
//!     .and_then(|model| OnnxImageClassifier::load(&model));
//! let checker = AuthenticityChecker::new(ServiceHandle::from_load("image detector", classifier));
//! let outcome = checker.check(Path::new("figures_output/figure_1_p1.png"));
//! println!("{} ({:.2})", outcome.label, outcome.confidence);
//! ```

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use paperlens_common::hub::ResolvedModel;
use paperlens_common::onnx::{create_session, load_id2label, rank_predictions, softmax};
use paperlens_common::{AnalysisError, AuthenticityLabel, AuthenticityOutcome, Prediction, ServiceHandle};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Raw label the detector uses for generated images
pub const ARTIFICIAL_LABEL: &str = "artificial";

#[derive(Error, Debug)]
pub enum AuthenticityError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid model output shape: {0:?}")]
    InvalidOutputShape(Vec<i64>),

    #[error("Classifier returned no predictions")]
    NoPredictions,
}

impl From<AnalysisError> for AuthenticityError {
    fn from(err: AnalysisError) -> Self {
        AuthenticityError::Model(err.to_string())
    }
}

impl From<ort::Error> for AuthenticityError {
    fn from(err: ort::Error) -> Self {
        AuthenticityError::Model(err.to_string())
    }
}

impl From<AuthenticityError> for AnalysisError {
    fn from(err: AuthenticityError) -> Self {
        AnalysisError::Model(err.to_string())
    }
}

/// Image classification seam
pub trait ImageClassifier {
    /// Predictions sorted by descending score
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError>;
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for &T {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError> {
        (**self).classify(image)
    }
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for Box<T> {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError> {
        (**self).classify(image)
    }
}

/// Resize and normalization applied before inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessing {
    pub size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            size: 224,
            mean: [0.5, 0.5, 0.5],
            std: [0.5, 0.5, 0.5],
        }
    }
}

/// NCHW tensor of `image` resized to a square of `size`
#[must_use]
pub fn preprocess(image: &DynamicImage, preprocessing: &Preprocessing) -> Array4<f32> {
    let size = preprocessing.size;
    let resized = image::imageops::resize(&image.to_rgb8(), size, size, FilterType::Triangle);
    let mut array = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let value = f32::from(pixel[c]) / 255.0;
            array[[0, c, y as usize, x as usize]] =
                (value - preprocessing.mean[c]) / preprocessing.std[c];
        }
    }
    array
}

/// ViT/Swin-style image classifier exported to ONNX
pub struct OnnxImageClassifier {
    session: Mutex<Session>,
    labels: Vec<String>,
    preprocessing: Preprocessing,
}

impl OnnxImageClassifier {
    pub fn load(model: &ResolvedModel) -> Result<Self, AuthenticityError> {
        Self::from_files(&model.model, model.config_path()?, Preprocessing::default())
    }

    pub fn from_files(
        model_path: &Path,
        config_path: &Path,
        preprocessing: Preprocessing,
    ) -> Result<Self, AuthenticityError> {
        let session = create_session(model_path)?;
        let labels = load_id2label(config_path)?;
        info!("Image classifier labels: {:?}", labels);
        Ok(Self {
            session: Mutex::new(session),
            labels,
            preprocessing,
        })
    }
}

impl ImageClassifier for OnnxImageClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError> {
        let input = preprocess(image, &self.preprocessing);
        let input_tensor = TensorRef::from_array_view(input.view())?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AuthenticityError::Model("Image classifier session poisoned".into()))?;
        let outputs = session.run(ort::inputs![input_tensor])?;
        let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        if shape.len() != 2 || shape[0] != 1 {
            return Err(AuthenticityError::InvalidOutputShape(shape.to_vec()));
        }

        Ok(rank_predictions(&softmax(logits), &self.labels))
    }
}

/// Map a raw classifier label to the figure-level label
#[must_use]
pub fn normalize_label(raw: &str) -> AuthenticityLabel {
    if raw == ARTIFICIAL_LABEL {
        AuthenticityLabel::AiGenerated
    } else {
        AuthenticityLabel::HumanCreated
    }
}

/// Checks figure files with a classifier loaded once at startup
pub struct AuthenticityChecker<C> {
    classifier: ServiceHandle<C>,
}

impl<C: ImageClassifier> AuthenticityChecker<C> {
    pub fn new(classifier: ServiceHandle<C>) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    /// Classify the image at `path`.
    ///
    /// Checked in order: model loaded, file exists, image decodes, inference
    /// succeeds. The top prediction's label `artificial` means AI-generated;
    /// anything else is human-created.
    pub fn check(&self, path: &Path) -> AuthenticityOutcome {
        let Some(classifier) = self.classifier.get() else {
            return AuthenticityOutcome::error(AuthenticityLabel::ModelUnavailable);
        };
        if !path.exists() {
            return AuthenticityOutcome::error(AuthenticityLabel::FileNotFound);
        }

        let result = image::open(path)
            .map_err(|e| e.to_string())
            .and_then(|image| classifier.classify(&image).map_err(|e| e.to_string()))
            .and_then(|predictions| {
                predictions
                    .into_iter()
                    .next()
                    .ok_or_else(|| AuthenticityError::NoPredictions.to_string())
            });

        match result {
            Ok(top) => {
                debug!(
                    "{}: top label {:?} ({:.3})",
                    path.display(),
                    top.label,
                    top.score
                );
                AuthenticityOutcome::new(normalize_label(&top.label), top.score)
            }
            Err(reason) => AuthenticityOutcome::error(AuthenticityLabel::ProcessingFailed(reason)),
        }
    }
}
