// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Function-tool surface of the Maklerd assistant: the definitions
//! advertised to the platform and the local dispatcher that services calls.

pub mod definitions;
pub mod dispatch;

pub use definitions::{assistant_tools, function_tools, names};
pub use dispatch::ToolDispatcher;
