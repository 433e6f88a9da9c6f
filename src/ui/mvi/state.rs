/// Marker trait for screen state.
///
/// States are replaced, never patched from outside the reducer, and compare
/// by value so views can skip redundant redraws.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
