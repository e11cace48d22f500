pub(crate) use super::{ProviderError, RunLayout};

mod series;
mod support;
