// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod billing;
pub mod calendar;
pub mod forms;
pub mod hours;
pub mod ids;
pub mod model;
pub mod state;
pub mod suggestions;

pub use billing::*;
pub use calendar::*;
pub use forms::*;
pub use hours::*;
pub use ids::*;
pub use model::*;
pub use state::*;
pub use suggestions::*;
