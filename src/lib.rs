// SPDX-License-Identifier: MIT

pub mod config;
pub mod el;
pub mod error;
