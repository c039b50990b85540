pub mod hasher;
pub mod token;
