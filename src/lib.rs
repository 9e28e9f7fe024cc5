// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Library entry exposing the fragment-inclusion generator.
pub mod splice;

pub use splice::dialect::{DirectiveDialect, GlobalKeyword};
pub use splice::emitter::{BuildMode, InclusionAction, UnitEmitter};
pub use splice::manifest::{FragmentRef, Manifest};
pub use splice::{run_unit, UnitReport, UnitRequest};
