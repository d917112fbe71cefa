// Text location core: normalization-tolerant search over reconstructed
// documents, plus the strategy chain that performs in-place replacement.
// Everything in here is synchronous and stateless — pure functions over
// their inputs, safe to call from any handler.

pub mod flexible;
pub mod locator;
pub mod normalize;
pub mod replacer;

pub use replacer::{can_locate, replace, try_replace};
