// crates/fedcheck-core/src/naming.rs
// ============================================================================
// Module: Resource Naming
// Description: Unique identifiers for provisioned test resources.
// Purpose: Keep concurrently running scenarios isolated by name alone.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Scenarios run in parallel against shared cloud accounts and clusters.
//! There is no locking between them; the only isolation mechanism is that
//! every provisioned resource (namespace, release, environment) carries a
//! random suffix. Identifiers are 8 characters drawn from the lowercase
//! base-36 alphabet, giving ~2.8e12 combinations per draw.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Alphabet for generated identifiers. Lowercase so the output is valid in
/// Kubernetes namespaces and S3 key prefixes without normalization.
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated identifiers.
const ID_LEN: usize = 8;

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Returns a random 8-character base-36 identifier.
#[must_use]
pub fn unique_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN).map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())])).collect()
}

/// Returns `prefix-<unique id>` for naming a provisioned resource.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", unique_id())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
