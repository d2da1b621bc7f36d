pub mod answer;
pub mod class;
pub mod question;
pub mod result;
pub mod test_attempt;
pub mod user;
