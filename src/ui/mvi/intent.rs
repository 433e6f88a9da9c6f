/// Marker trait for intents: user actions and the outcomes of effects
/// (API responses) that a reducer folds into state.
pub trait Intent: Send + 'static {}
