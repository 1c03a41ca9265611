pub mod application;
pub mod company;
pub mod job;
pub mod notification;
pub mod review;
pub mod user;
