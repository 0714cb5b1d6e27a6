/// Errors that can occur during feature extraction
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Feature configuration is inconsistent
    #[error("Invalid feature configuration: {0}")]
    InvalidConfig(String),

    /// Charge and time arrays differ in length
    #[error("Length mismatch: {charges} charges but {times} times")]
    LengthMismatch {
        /// Number of charges supplied
        charges: usize,
        /// Number of times supplied
        times: usize,
    },

    /// No pulses were left to compute features from
    #[error("No pulses available")]
    EmptySeries,

    /// A charge-weighted quantity was requested but the total charge is zero
    #[error("Total charge is zero; charge-weighted features are undefined")]
    ZeroCharge,

    /// Failure while extracting the features of one sensor
    #[error("Sensor {sensor}: {source}")]
    Sensor {
        /// Debug rendering of the sensor key
        sensor: String,
        /// Underlying error
        #[source]
        source: Box<FeatureError>,
    },
}
