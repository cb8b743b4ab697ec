//! Property-Based Test Generators
//!
//! Provides proptest strategies for request data accepted by the
//! partner-facing API.

use proptest::prelude::*;

/// Strategy for sex codes in any case (`m`, `M`, `f`, `F`, `n`, `N`)
pub fn sex_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("m"),
        Just("M"),
        Just("f"),
        Just("F"),
        Just("n"),
        Just("N"),
    ]
    .prop_map(String::from)
}

/// Strategy for ages the provider quotes (0-99)
pub fn age_strategy() -> impl Strategy<Value = u8> {
    0u8..=99
}

/// Strategy for 14-digit CNPJs
pub fn cnpj_strategy() -> impl Strategy<Value = String> {
    "[0-9]{14}"
}

/// Strategy for partner or insured names (3-255 characters)
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{1,60}[A-Za-z]"
}
