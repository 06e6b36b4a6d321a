//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod cache;
pub mod core;
pub mod retrieve;
pub mod stitch;

pub use crate::core::{StitchConfig, StitchError, TileError};
pub use crate::retrieve::{RetrievalReport, Retriever};
pub use crate::stitch::{StitchResult, Stitcher};
