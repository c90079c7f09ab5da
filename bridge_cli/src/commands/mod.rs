pub mod check;
pub mod once;
pub mod serve;
pub mod validate;
