// system-tests/src/lib.rs
// ============================================================================
// Module: Fedcheck System Tests Library
// Description: Shared configuration for the federation scenario suites.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the fedcheck scenario
//! suites in `system-tests/tests`. The suites run against an in-process
//! cluster stub by default; environment variables switch individual concerns
//! to live infrastructure.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
