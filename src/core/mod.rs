pub mod answer;
pub mod error;
pub mod services;
pub mod traits;
