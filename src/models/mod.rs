pub mod fees;
pub mod invoice;
pub mod ops;
pub mod payment;
pub mod role;
pub mod student;
pub mod user;
