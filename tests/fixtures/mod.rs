#![allow(dead_code)]

pub mod identity;
