// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod api;
pub mod forms;
pub mod ids;
pub mod line_items;
pub mod loader;
pub mod modal;
pub mod model;
pub mod numeric;
pub mod page;
pub mod select;
pub mod submit;
pub mod sync;
pub mod toast;
pub mod totals;

pub use api::*;
pub use forms::*;
pub use ids::*;
pub use line_items::*;
pub use loader::*;
pub use modal::*;
pub use model::*;
pub use page::*;
pub use select::*;
pub use submit::*;
pub use sync::*;
pub use toast::*;
pub use totals::*;
