//! Attack simulations against the envelope formats.
