//! Integration tests for problem descriptions and parameter sampling

// Problem construction, JSON loading and random draws
mod problem_tests;
