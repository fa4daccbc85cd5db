pub mod generic;
pub mod router;

pub use generic::GenericSteps;
pub use router::{Route, RoutedStep, StepRouter};
