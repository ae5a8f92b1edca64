pub mod academic;
pub mod essay;
pub mod music;
pub mod spotify;
pub mod stress;
pub mod users;
pub mod youtube;

/// Predictions at or above this risk score get the distinguished warning
/// treatment in every assessment response.
pub const HIGH_RISK_THRESHOLD: f64 = 80.0;
