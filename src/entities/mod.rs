//! Plain data records for the three tables. Derived values live in
//! [`crate::calculations`], never on the models.

pub mod canister;
pub mod canister_type;
pub mod weighing;
