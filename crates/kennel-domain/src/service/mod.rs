//! Domain Services - Logic that spans several entities

pub mod reconciler;
