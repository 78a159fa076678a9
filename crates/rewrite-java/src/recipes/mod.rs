// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Built-in recipes.
//!
//! - [`ChangeFieldName`]: rename a field and every reference to it
//! - [`ChangeStaticFieldToMethod`]: replace a static field read with a
//!   static method call
//! - [`NoDoubleBraceInitialization`]: replace anonymous-subclass collection
//!   initialization with plain statements

mod change_field_name;
mod change_static_field_to_method;
mod no_double_brace_initialization;

pub use change_field_name::{ChangeFieldName, ChangeFieldNameOptions, ChangeFieldNameVisitor};
pub use change_static_field_to_method::{ChangeStaticFieldToMethod, ChangeStaticFieldToMethodOptions};
pub use no_double_brace_initialization::NoDoubleBraceInitialization;
