//! Cross-crate scenarios for the probe scheduler, driven by fake probers.

#[cfg(test)]
mod utils;

#[cfg(test)]
mod scheduler {
    mod integration;
    mod limits;
}
