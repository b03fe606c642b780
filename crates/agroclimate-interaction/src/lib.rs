//! Gemini API client for the AgroClimate Analyst.

pub mod gemini_gateway;

pub use gemini_gateway::{API_KEY_ENV, GeminiGateway};
