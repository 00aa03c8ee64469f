//! Integration tests for Bayesian resampling and posterior summaries

// Resampler runs against a surrogate simulator
mod resampler_tests;
