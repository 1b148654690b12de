pub mod calc;
pub mod fractions;
pub mod session;
pub mod setup;
pub mod ui;
